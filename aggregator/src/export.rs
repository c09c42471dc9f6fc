//! Result sinks.
//!
//! The engine defines no storage format of its own. Sinks receive each
//! attribution outcome and serialize it for whoever consumes it:
//!
//! - **JSON lines** ([`JsonSink`]): one JSON-safe report per line
//! - **Wire** ([`WireSink`]): length-prefixed bincode envelopes
//! - **JSON file** ([`write_json_report`]): one pretty-printed report
//!
//! An `Unsupported` outcome is never written: downstream state for that
//! component must stay as it was.

use anyhow::{Context, Result};
use ampere_shared::protocol::wire::ReportEnvelope;
use ampere_shared::types::attribution::{Attribution, AttributionReport};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Receiver of attribution outcomes
pub trait ResultSink {
    fn accept(&mut self, attribution: &Attribution) -> Result<()>;
}

/// Writes each report as one line of JSON.
pub struct JsonSink<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of reports written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for JsonSink<W> {
    fn accept(&mut self, attribution: &Attribution) -> Result<()> {
        let Some(report) = attribution.report() else {
            debug!("Skipping unsupported attribution: {:?}", attribution);
            return Ok(());
        };
        serde_json::to_writer(&mut self.writer, &report.to_json())
            .context("Failed to serialize report to JSON")?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }
}

/// Writes bincode envelopes, each prefixed with its length as a little-endian u32.
pub struct WireSink<W: Write> {
    writer: W,
    sequence: u64,
}

impl<W: Write> WireSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            sequence: 1,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for WireSink<W> {
    fn accept(&mut self, attribution: &Attribution) -> Result<()> {
        if !attribution.is_supported() {
            return Ok(());
        }
        let envelope = ReportEnvelope::new(self.sequence, attribution.clone());
        let bytes = envelope.to_bytes()?;
        let len = u32::try_from(bytes.len()).context("Envelope too large")?;
        self.writer.write_all(&len.to_le_bytes())?;
        self.writer.write_all(&bytes)?;
        self.sequence += 1;
        Ok(())
    }
}

/// Read back every envelope written by a [`WireSink`].
pub fn read_envelopes(mut bytes: &[u8]) -> Result<Vec<ReportEnvelope>> {
    let mut envelopes = Vec::new();
    while !bytes.is_empty() {
        anyhow::ensure!(bytes.len() >= 4, "Truncated envelope length");
        let (len, rest) = bytes.split_at(4);
        let len = u32::from_le_bytes([len[0], len[1], len[2], len[3]]) as usize;
        anyhow::ensure!(rest.len() >= len, "Truncated envelope body");
        let (body, rest) = rest.split_at(len);
        envelopes.push(ReportEnvelope::from_bytes(body)?);
        bytes = rest;
    }
    Ok(envelopes)
}

/// Write a single report to a pretty-printed JSON file.
pub fn write_json_report(report: &AttributionReport, output_path: &Path) -> Result<()> {
    info!("Writing attribution report: {}", output_path.display());

    let file = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, &report.to_json())
        .context("Failed to serialize report to JSON")?;

    Ok(())
}
