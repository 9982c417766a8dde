pub mod list;
pub mod lists;
pub mod query;
pub mod record;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

/// Read a file, or stdin when no file is given.
fn read_input(file: Option<&PathBuf>) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    match file {
        Some(path) => Ok(fs::read(path)?),
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}
