use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Record subcommands
#[derive(Subcommand, Debug)]
pub enum RecordCommand {
    /// Encode a JSON object (or array of objects) into a binary record
    Encode(RecordEncodeArgs),
    /// Decode a binary record and describe it
    Decode(RecordDecodeArgs),
}

/// Arguments for encoding a record
#[derive(Args, Debug)]
pub struct RecordEncodeArgs {
    /// JSON input file (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Record type tag
    #[arg(short = 't', long = "type", value_name = "TAG")]
    pub type_tag: Option<String>,

    /// Record details text (needs --type)
    #[arg(short = 'd', long, requires = "type_tag")]
    pub details: Option<String>,

    /// Write hex text instead of raw bytes
    #[arg(long)]
    pub hex: bool,

    /// Output file (writes to stdout if not provided)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

/// Arguments for decoding a record
#[derive(Args, Debug)]
pub struct RecordDecodeArgs {
    /// Record file (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Input is hex text
    #[arg(long)]
    pub hex: bool,

    /// Print the record as JSON
    #[arg(long)]
    pub json: bool,
}

/// List subcommands
#[derive(Subcommand, Debug)]
pub enum ListCommand {
    /// Parse a list definition and show its entries
    Show {
        /// List definition text, or the name of a configured list
        definition: String,
    },
    /// Show one entry of a list
    Get {
        /// List definition text, or the name of a configured list
        definition: String,

        /// Entry name
        name: String,
    },
}

/// Arguments for the configured list directory
#[derive(Args, Debug)]
pub struct ListsArgs {
    /// Print constant declarations for every entry instead
    #[arg(long)]
    pub defines: bool,
}

/// Arguments for sending a query
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Query text, optionally prefixed with `Kind|`
    pub text: String,

    /// Endpoint URL (overrides configuration)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Print the reply as JSON
    #[arg(long)]
    pub json: bool,
}
