/// One reading pair for a single poll tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Percent of the sample period the SMs were busy (0-100)
    pub sm_util: u32,
    /// Board power draw as reported by NVML, in milliwatts
    pub power_mw: u32,
}

impl Sample {
    pub fn new(sm_util: u32, power_mw: u32) -> Self {
        Self { sm_util, power_mw }
    }

    pub fn power_watts(&self) -> f64 {
        self.power_mw as f64 / 1000.0
    }
}
