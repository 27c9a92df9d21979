//! PNM Capture Decoder
//!
//! Decodes DOCSIS PNM capture files and prints each record as JSON.
//!
//! **Usage**:
//! ```bash
//! cargo run -- rxmer.bin chan_est.bin
//! ```
//!
//! **Output**:
//! One JSON object per line on stdout, `{"path": ..., "type": ..., "capture": ...}`.
//! Unreadable or undecodable files are reported on stderr and make the exit
//! status non-zero.

use std::env;
use std::fs;
use std::process;

use rustypnm::pnm::decode_many;
use rustypnm::tracing_init::init_tracing;
use serde_json::json;
use tracing::info;

fn main() {
    init_tracing();

    let paths: Vec<String> = env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("Usage: rustypnm <capture-file>...");
        eprintln!();
        eprintln!("Decodes DOCSIS PNM captures (PNN1-PNN9) and prints them as JSON.");
        process::exit(2);
    }

    let mut failed = 0;
    let mut loaded = Vec::with_capacity(paths.len());
    for path in &paths {
        match fs::read(path) {
            Ok(bytes) => loaded.push((path, bytes)),
            Err(e) => {
                eprintln!("{path}: {e}");
                failed += 1;
            }
        }
    }

    let buffers: Vec<&[u8]> = loaded.iter().map(|(_, bytes)| bytes.as_slice()).collect();
    let results = decode_many(&buffers);
    info!(files = buffers.len(), "decoded captures");

    for ((path, _), result) in loaded.iter().zip(results) {
        let file = match result {
            Ok(file) => file,
            Err(e) => {
                eprintln!("{path}: {e}");
                failed += 1;
                continue;
            }
        };

        let mut record = match serde_json::to_value(&file) {
            Ok(value) => value,
            Err(e) => {
                eprintln!("{path}: cannot serialize: {e}");
                failed += 1;
                continue;
            }
        };
        if let Some(object) = record.as_object_mut() {
            object.insert("path".to_string(), json!(path));
        }
        println!("{record}");
    }

    if failed > 0 {
        process::exit(1);
    }
}
