//! Convenient re-exports for common usage.
//!
//! ```
//! use tilepack::prelude::*;
//!
//! let registry = ListRegistry::from_config(&Config::load_default().unwrap()).unwrap();
//! let events = registry.list("Ev").unwrap();
//! assert_eq!(events.id_by_name("Enter"), Some(2));
//! ```

pub use crate::{
    // Errors
    ConfigError,
    ListError,
    PackError,
    TransportError,

    // Config
    Config,

    // Lists
    EntryView,
    FormatKind,
    FormatSpec,
    FormatValue,
    ListCodec,
    ListKind,
    ListRegistry,
    SharedRegistry,

    // Records
    Field,
    FieldType,
    FieldValue,
    Record,

    // Transport
    Channel,
    Loopback,
    QueryKind,
    QueryService,
    RecordService,
    Transport,
};
