use anyhow::Result;
use std::future::Future;

use crate::config::Config;
use crate::monitor::Telemetry;
use crate::sink::CsvSink;
use crate::ui::Renderer;

/// Why polling stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The iteration budget ran out
    Completed,
    /// A telemetry read failed; nothing is retried
    SampleFailed,
    /// A CSV row could not be written
    SinkFailed,
    Interrupted,
}

/// Poll until the iteration budget runs out, a read fails, or `interrupt`
/// resolves, then release the telemetry source.
///
/// The interrupt can land at any await point of the loop. The loop future,
/// and with it the CSV sink, is dropped before the closing border is
/// printed; rows are synced as they are written, so none is left half done.
/// An interrupt that is already pending when `run` starts wins immediately.
pub async fn run<T, R, F>(
    config: &Config,
    telemetry: &mut T,
    renderer: &mut R,
    interrupt: F,
) -> Result<Exit>
where
    T: Telemetry,
    R: Renderer,
    F: Future,
{
    let outcome = tokio::select! {
        biased;
        _ = interrupt => Ok(Exit::Interrupted),
        outcome = poll(config, &*telemetry, renderer) => outcome,
    };

    if let Ok(Exit::Interrupted) = outcome {
        if let Err(e) = renderer.interrupted() {
            log::warn!("Failed to close table: {:#}", e);
        }
        eprintln!("Interrupted, shutting down");
    }

    telemetry.shutdown();
    outcome
}

async fn poll<T, R>(
    config: &Config,
    telemetry: &T,
    renderer: &mut R,
) -> Result<Exit>
where
    T: Telemetry,
    R: Renderer,
{
    renderer.start()?;
    let mut sink = config.sink_path().map(CsvSink::open).transpose()?;

    let mut completed = 0;
    while config.should_continue(completed) {
        let sample = match telemetry.sample() {
            Ok(sample) => sample,
            Err(e) => {
                log::error!("{}", e);
                return Ok(Exit::SampleFailed);
            }
        };

        renderer.render(&sample)?;

        if let Some(sink) = sink.as_mut() {
            if let Err(e) = sink.append(&sample) {
                log::error!("{:#}", e);
                return Ok(Exit::SinkFailed);
            }
        }

        tokio::time::sleep(config.interval).await;
        completed += 1;
    }

    Ok(Exit::Completed)
}
