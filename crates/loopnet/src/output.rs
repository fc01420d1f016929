use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use loopnet_frame::Frame;
use loopnet_transport::{HostEntry, Side};
use serde::Serialize;

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
struct FrameOutput<'a> {
    receiver: String,
    kind: &'a str,
    sequence: Option<u32>,
    payload_size: usize,
    payload: String,
}

pub fn print_frame(frame: &Frame, receiver: Side, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                receiver: receiver.to_string(),
                kind: frame.kind.name(),
                sequence: frame.sequence,
                payload_size: frame.payload.len(),
                payload: payload_preview(frame.payload.as_ref()),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["RECEIVER", "KIND", "SEQ", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    receiver.to_string(),
                    frame.kind.name().to_string(),
                    sequence_label(frame.sequence),
                    frame.payload.len().to_string(),
                    payload_preview(frame.payload.as_ref()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} <- {} seq={} size={} payload={}",
                receiver,
                frame.kind,
                sequence_label(frame.sequence),
                frame.payload.len(),
                payload_preview(frame.payload.as_ref())
            );
        }
        OutputFormat::Raw => {
            print_raw(frame.payload.as_ref());
        }
    }
}

pub fn print_hosts(entries: &[HostEntry], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&entries),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["NAME", "MAP", "USERS", "DRIVER", "CONNECT"]);
            for entry in entries {
                table.add_row(vec![
                    entry.name.clone(),
                    entry.map.clone(),
                    format!("{}/{}", entry.users, entry.max_users),
                    entry.driver.to_string(),
                    entry.cname.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if entries.is_empty() {
                println!("no local host");
            }
            for entry in entries {
                println!(
                    "{:<15} {:<11} {:>2}/{:<2} via {} (connect \"{}\")",
                    entry.name, entry.map, entry.users, entry.max_users, entry.driver, entry.cname
                );
            }
        }
        OutputFormat::Raw => {
            for entry in entries {
                println!("{}", entry.cname);
            }
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn sequence_label(sequence: Option<u32>) -> String {
    sequence.map_or_else(|| "-".to_string(), |seq| seq.to_string())
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}
