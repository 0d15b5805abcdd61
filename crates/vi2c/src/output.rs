use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use vi2c_io::ExchangeReport;

/// Bytes shown before a long buffer is summarised in table/pretty output.
const PREVIEW_BYTES: usize = 32;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ReportOutput<'a> {
    schema_id: &'static str,
    device: String,
    backend: &'a str,
    written: usize,
    sent: String,
    received_size: usize,
    received: String,
    echoed: bool,
    trailing_size: usize,
    timestamp: String,
}

pub fn print_report(report: &ExchangeReport, backend: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ReportOutput {
                schema_id: "https://schemas.3leaps.dev/vi2c/cli/v1/exchange-report.schema.json",
                device: report.path.display().to_string(),
                backend,
                written: report.written,
                sent: hex(report.sent.as_ref()),
                received_size: report.received.len(),
                received: hex(report.received.as_ref()),
                echoed: report.echoed(),
                trailing_size: report.trailing().len(),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["DEVICE", "WRITTEN", "READ", "ECHOED", "DATA"])
                .add_row(vec![
                    report.path.display().to_string(),
                    report.written.to_string(),
                    report.received.len().to_string(),
                    report.echoed().to_string(),
                    hex_preview(report.received.as_ref()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "device={} written={} read={} echoed={} data={}",
                report.path.display(),
                report.written,
                report.received.len(),
                report.echoed(),
                hex_preview(report.received.as_ref())
            );
        }
        OutputFormat::Raw => {
            print_raw(report.received.as_ref());
        }
    }
}

#[derive(Serialize)]
struct WriteOutput {
    schema_id: &'static str,
    device: String,
    written: usize,
    sent: String,
}

pub fn print_written(device: &str, sent: &[u8], written: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = WriteOutput {
                schema_id: "https://schemas.3leaps.dev/vi2c/cli/v1/write-result.schema.json",
                device: device.to_string(),
                written,
                sent: hex(sent),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["DEVICE", "WRITTEN", "DATA"])
                .add_row(vec![device.to_string(), written.to_string(), hex_preview(sent)]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "device={} written={} data={}",
                device,
                written,
                hex_preview(sent)
            );
        }
        OutputFormat::Raw => println!("{written}"),
    }
}

#[derive(Serialize)]
struct ReadOutput {
    schema_id: &'static str,
    device: String,
    size: usize,
    data: String,
}

pub fn print_read(device: &str, data: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ReadOutput {
                schema_id: "https://schemas.3leaps.dev/vi2c/cli/v1/read-result.schema.json",
                device: device.to_string(),
                size: data.len(),
                data: hex(data),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["DEVICE", "SIZE", "DATA"])
                .add_row(vec![device.to_string(), data.len().to_string(), hex_preview(data)]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("device={} size={} data={}", device, data.len(), hex_preview(data));
        }
        OutputFormat::Raw => print_raw(data),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Space-separated lowercase hex.
pub fn hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// [`hex`] truncated to the first few bytes, with a count of the rest.
pub fn hex_preview(data: &[u8]) -> String {
    if data.len() <= PREVIEW_BYTES {
        return hex(data);
    }
    format!(
        "{} … (+{} bytes)",
        hex(&data[..PREVIEW_BYTES]),
        data.len() - PREVIEW_BYTES
    )
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_space_separated() {
        assert_eq!(hex(&[1, 2, 0xab]), "01 02 ab");
        assert_eq!(hex(&[]), "");
    }

    #[test]
    fn short_preview_is_full_hex() {
        assert_eq!(hex_preview(&[1, 2, 3]), "01 02 03");
    }

    #[test]
    fn long_preview_is_summarised() {
        let data = vec![0u8; 1024];
        let preview = hex_preview(&data);
        assert!(preview.ends_with("(+992 bytes)"));
        assert!(preview.starts_with("00 00"));
    }
}
