//! Data interchange for tile-based UIs.
//!
//! Two compact formats carry everything between a browser and its store:
//!
//! - [`Record`]: a self-describing binary record of named, typed fields
//!   (numbers, text, raw bytes, nested records).
//! - [`ListCodec`]: a delimiter-terminated text list of named entries with
//!   position-derived IDs, optional `[...]` format annotations, and nested
//!   child lists.
//!
//! On top of those, [`transport`] exchanges records with a peer and
//! [`query`] describes the record shape a store backend consumes.
//!
//! ```
//! use tilepack::Record;
//!
//! let mut record = Record::default();
//! record.add("Q", "SELECT 1").add("0", 42);
//!
//! let bytes = record.encode().unwrap();
//! let back = Record::decode(&bytes).unwrap();
//! assert_eq!(back.text("Q"), Some("SELECT 1"));
//! assert_eq!(back.number("0"), Some(42.0));
//! ```

pub mod config;
pub mod errors;
pub mod list;
pub mod numeric;
pub mod pack;
pub mod prelude;
pub mod query;
pub mod transport;

pub use config::{Config, ListSettings, TransportSettings};
pub use errors::{ConfigError, ListError, PackError, TransportError};
pub use list::{
    EntryView, FormatKind, FormatSpec, FormatValue, ListCodec, ListKind, ListRegistry,
    SharedRegistry,
};
pub use numeric::{decode_number, encode_number};
pub use pack::{Field, FieldType, FieldValue, Record, checksum};
pub use query::{QueryBuilder, QueryExecutor, QueryKind, QueryOutcome};
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use transport::{Channel, Loopback, QueryService, RecordService, Transport, serve_bytes};
