use nvml_wrapper::error::NvmlError;
use nvml_wrapper::Nvml;
use thiserror::Error;

use crate::data::Sample;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize NVML: {0}")]
    Init(#[source] NvmlError),
    #[error("Failed to get handle for device {index}: {source}")]
    Device {
        index: u32,
        #[source]
        source: NvmlError,
    },
    #[error("Failed to get utilization rates: {0}")]
    Utilization(#[source] NvmlError),
    #[error("Failed to get power usage: {0}")]
    Power(#[source] NvmlError),
    #[error("Telemetry source has been shut down")]
    Closed,
}

/// Source of utilization and power readings for one device
pub trait Telemetry {
    /// SM utilization, percent
    fn utilization(&self) -> Result<u32, TelemetryError>;

    /// Power draw, milliwatts
    fn power_usage(&self) -> Result<u32, TelemetryError>;

    /// Release the source. Calling this more than once is a no-op.
    fn shutdown(&mut self);

    fn device_name(&self) -> Option<String> {
        None
    }

    fn sample(&self) -> Result<Sample, TelemetryError> {
        let sm_util = self.utilization()?;
        let power_mw = self.power_usage()?;
        Ok(Sample::new(sm_util, power_mw))
    }
}

pub struct NvmlTelemetry {
    nvml: Option<Nvml>,
    device_index: u32,
}

impl NvmlTelemetry {
    /// Initialize NVML and make sure the device at `device_index` exists.
    pub fn open(device_index: u32) -> Result<Self, TelemetryError> {
        let nvml = Nvml::init().map_err(TelemetryError::Init)?;

        let lookup = nvml.device_by_index(device_index).map(|_| ());
        if let Err(source) = lookup {
            if let Err(e) = nvml.shutdown() {
                log::warn!("NVML shutdown after failed device lookup: {}", e);
            }
            return Err(TelemetryError::Device {
                index: device_index,
                source,
            });
        }

        Ok(Self {
            nvml: Some(nvml),
            device_index,
        })
    }

    fn nvml(&self) -> Result<&Nvml, TelemetryError> {
        self.nvml.as_ref().ok_or(TelemetryError::Closed)
    }
}

// Devices borrow the library handle, so they are looked up again per call.
impl Telemetry for NvmlTelemetry {
    fn utilization(&self) -> Result<u32, TelemetryError> {
        let device = self
            .nvml()?
            .device_by_index(self.device_index)
            .map_err(TelemetryError::Utilization)?;
        let rates = device
            .utilization_rates()
            .map_err(TelemetryError::Utilization)?;
        Ok(rates.gpu)
    }

    fn power_usage(&self) -> Result<u32, TelemetryError> {
        let device = self
            .nvml()?
            .device_by_index(self.device_index)
            .map_err(TelemetryError::Power)?;
        device.power_usage().map_err(TelemetryError::Power)
    }

    fn shutdown(&mut self) {
        if let Some(nvml) = self.nvml.take() {
            if let Err(e) = nvml.shutdown() {
                log::warn!("NVML shutdown failed: {}", e);
            }
        }
    }

    fn device_name(&self) -> Option<String> {
        let nvml = self.nvml.as_ref()?;
        nvml.device_by_index(self.device_index).ok()?.name().ok()
    }
}
