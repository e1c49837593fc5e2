pub mod dashboard;
pub mod table;

use anyhow::Result;

use crate::data::Sample;

pub use dashboard::Dashboard;
pub use table::TableRenderer;

/// Presents samples as they arrive. The variant is fixed for the whole run.
pub trait Renderer {
    /// Called once before the first sample
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn render(&mut self, sample: &Sample) -> Result<()>;

    /// Called when polling is cut short by an interrupt
    fn interrupted(&mut self) -> Result<()> {
        Ok(())
    }
}
