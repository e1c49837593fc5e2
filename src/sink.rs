use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};
use std::fmt::Display;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::data::Sample;

const HEADER: [&str; 3] = ["Timestamp", "SM Utilization", "Power Usage"];

/// C `ctime` layout, e.g. `Wed Jun 30 21:49:08 1993`
const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

pub fn format_timestamp<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Append-only CSV log. Every row is on disk before `append` returns.
pub struct CsvSink {
    writer: Writer<File>,
    path: PathBuf,
}

impl CsvSink {
    /// Open `path` for appending. The header row is only written into an
    /// empty file; existing content is never rewritten.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open output file {}", path.display()))?;
        let empty = file
            .metadata()
            .with_context(|| format!("Failed to stat output file {}", path.display()))?
            .len()
            == 0;

        let writer = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(file);

        let mut sink = Self {
            writer,
            path: path.to_path_buf(),
        };
        if empty {
            sink.write_synced(&HEADER)?;
        }
        log::info!(
            "Writing samples to {} ({})",
            sink.path.display(),
            if empty { "new file" } else { "appending" }
        );
        Ok(sink)
    }

    pub fn append(&mut self, sample: &Sample) -> Result<()> {
        let timestamp = format_timestamp(&chrono::Local::now());
        self.append_at(&timestamp, sample)
    }

    pub fn append_at(&mut self, timestamp: &str, sample: &Sample) -> Result<()> {
        let timestamp = timestamp.trim_end_matches(['\r', '\n']);
        let util = sample.sm_util.to_string();
        let watts = format!("{:.2}", sample.power_watts());
        self.write_synced(&[timestamp, util.as_str(), watts.as_str()])
    }

    fn write_synced(&mut self, record: &[&str]) -> Result<()> {
        self.writer
            .write_record(record)
            .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))?;
        self.writer
            .get_ref()
            .sync_all()
            .with_context(|| format!("Failed to sync {}", self.path.display()))
    }
}
