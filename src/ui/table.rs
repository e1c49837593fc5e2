use anyhow::Result;
use std::io::Write;

use super::Renderer;
use crate::data::Sample;

const HEADER: &str = "\
________________________________
| SM Utilization | Power Usage |
|      (%)       |     (W)     |
|----------------+-------------|";

const CLOSING_BORDER: &str = "|________________|_____________|";

/// Format one table row, aligned under `HEADER`
fn format_row(sample: &Sample) -> String {
    format!("| {:>14} | {:>11.2} |", sample.sm_util, sample.power_watts())
}

/// Append-only table on a line-oriented stream
pub struct TableRenderer<W: Write> {
    out: W,
}

impl<W: Write> TableRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Renderer for TableRenderer<W> {
    fn start(&mut self) -> Result<()> {
        self.line(HEADER)
    }

    fn render(&mut self, sample: &Sample) -> Result<()> {
        self.line(&format_row(sample))
    }

    fn interrupted(&mut self) -> Result<()> {
        self.line(CLOSING_BORDER)
    }
}
