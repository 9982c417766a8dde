use std::fs;
use std::io::{self, Write};

use tilepack::Record;

use crate::cli::args::{RecordDecodeArgs, RecordEncodeArgs};
use crate::cli::handlers::read_input;

pub fn encode(args: RecordEncodeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let input = read_input(args.file.as_ref())?;
    let json: serde_json::Value = serde_json::from_slice(&input)?;
    let mut record = Record::from_json(&json)?;

    if let Some(tag) = &args.type_tag {
        // keep the multi marker of an array input
        if record.is_multi() {
            record.set_type_tag(format!("{}{}", tilepack::pack::MULTI_MARKER, tag));
        } else {
            record.set_type_tag(tag.as_str());
        }
    }
    if let Some(details) = &args.details {
        record.set_details(details);
    }

    let mut bytes = record.encode()?;
    tracing::debug!(bytes = bytes.len(), fields = record.len(), "encoded record");
    if args.hex {
        bytes = hex::encode(&bytes).into_bytes();
        bytes.push(b'\n');
    }

    match &args.output {
        Some(path) => fs::write(path, &bytes)?,
        None => io::stdout().write_all(&bytes)?,
    }
    Ok(())
}

pub fn decode(args: RecordDecodeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = read_input(args.file.as_ref())?;
    if args.hex {
        let text = String::from_utf8(input).map_err(|_| "Hex input must be valid UTF-8")?;
        input = hex::decode(text.trim())?;
    }

    let record = Record::decode(&input)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&record.to_json())?);
    } else {
        print!("{}", record.expand());
    }
    Ok(())
}
