//! Console and JSON reporting of replay results.

use crate::replay::ReplayResult;
use crate::request::ReplayRequest;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

const SEPARATOR: &str = "--------------------------------------------------------";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Counts over a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub processed: usize,
    pub responded: usize,
    pub failed: usize,
    pub timed_out: usize,
}

impl ReplaySummary {
    pub fn from_results(results: &[ReplayResult]) -> Self {
        let mut summary = Self {
            processed: results.len(),
            ..Default::default()
        };
        for result in results {
            match result.error() {
                None => summary.responded += 1,
                Some(error) => {
                    summary.failed += 1;
                    if error.is_timeout() {
                        summary.timed_out += 1;
                    }
                }
            }
        }
        summary
    }
}

#[derive(Debug, Serialize)]
struct ReportEntry<'a> {
    index: usize,
    method: &'a str,
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elapsed_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    results: Vec<ReportEntry<'a>>,
    summary: ReplaySummary,
}

pub struct Reporter {
    format: OutputFormat,
    color: bool,
}

impl Reporter {
    pub fn new(format: OutputFormat, color: bool) -> Self {
        Self { format, color }
    }

    fn paint(&self, code: &'static str) -> &'static str {
        if self.color {
            code
        } else {
            ""
        }
    }

    /// Progress output for the parse phase. Suppressed for JSON so stdout stays parseable.
    pub fn write_loaded<W: Write>(
        &self,
        out: &mut W,
        path: &Path,
        requests: &[ReplayRequest],
    ) -> io::Result<()> {
        if self.format == OutputFormat::Json {
            return Ok(());
        }
        let (bold, dim, reset) = (self.paint(BOLD), self.paint(DIM), self.paint(RESET));

        writeln!(out, "{bold}[*]{reset} Successfully opened {}", path.display())?;
        writeln!(out, "{bold}[*]{reset} URLs in file")?;
        for request in requests {
            writeln!(out, "    {dim}({}){reset} {}", request.method, request.url)?;
        }
        writeln!(out, "{SEPARATOR}")
    }

    pub fn write_results<W: Write>(&self, out: &mut W, results: &[ReplayResult]) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => self.write_text(out, results),
            OutputFormat::Json => write_json(out, results),
        }
    }

    fn write_text<W: Write>(&self, out: &mut W, results: &[ReplayResult]) -> io::Result<()> {
        let reset = self.paint(RESET);

        for result in results {
            let request = &result.request;
            match &result.outcome {
                Ok(response) => {
                    let color = self.paint(status_color(response.status.as_u16()));
                    writeln!(
                        out,
                        "{color}[{}]{reset} ({}) {}",
                        response.status_line(),
                        request.method,
                        request.url
                    )?;
                }
                Err(error) => {
                    let red = self.paint(RED);
                    writeln!(
                        out,
                        "{red}[ERROR]{reset} ({}) {} - {}",
                        request.method, request.url, error
                    )?;
                }
            }
        }

        let summary = ReplaySummary::from_results(results);
        let (bold, green, red) = (self.paint(BOLD), self.paint(GREEN), self.paint(RED));
        writeln!(out, "{SEPARATOR}")?;
        writeln!(
            out,
            "{bold}{} requests processed{reset} ({green}{} responded{reset}, {red}{} failed{reset})",
            summary.processed, summary.responded, summary.failed
        )
    }
}

fn status_color(status: u16) -> &'static str {
    match status {
        200..=299 => GREEN,
        300..=399 => CYAN,
        400..=499 => YELLOW,
        _ => RED,
    }
}

fn write_json<W: Write>(out: &mut W, results: &[ReplayResult]) -> io::Result<()> {
    let entries = results
        .iter()
        .map(|result| {
            let response = result.response();
            ReportEntry {
                index: result.request.index,
                method: result.request.method.as_str(),
                url: result.request.url.as_str(),
                status: response.map(|r| r.status.as_u16()),
                reason: response.and_then(|r| r.status.canonical_reason()),
                elapsed_ms: response.map(|r| r.elapsed.as_millis() as u64),
                error: result.error().map(|e| e.to_string()),
            }
        })
        .collect();

    let report = JsonReport {
        results: entries,
        summary: ReplaySummary::from_results(results),
    };
    serde_json::to_writer_pretty(&mut *out, &report).map_err(io::Error::other)?;
    writeln!(out)
}
