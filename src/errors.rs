//! Error types for every layer of the crate.
//!
//! Codec errors ([`PackError`], [`ListError`]) surface to the immediate
//! caller. Annotation problems inside list entries are not errors; they are
//! carried as data on [`crate::FormatSpec`].

/// Errors raised while building, encoding or decoding a [`crate::Record`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PackError {
    #[error("record prefix is {len} bytes, the 4-digit length window allows at most 9999")]
    PrefixTooLong { len: usize },

    #[error("field name {name:?} contains a reserved character (',' or ':')")]
    InvalidFieldName { name: String },

    #[error("type tag {tag:?} contains a reserved character (',' or '[')")]
    InvalidTypeTag { tag: String },

    #[error("input is {available} bytes, need at least {needed} to read the record prefix")]
    Truncated { needed: usize, available: usize },

    #[error("malformed record prefix at byte {position}: {reason}")]
    MalformedPrefix { position: usize, reason: String },

    #[error("field {field:?} declares {declared} bytes but only {available} remain")]
    LengthMismatch {
        field: String,
        declared: usize,
        available: usize,
    },

    #[error("unknown field type '{type_char}' for field {field:?}")]
    UnknownFieldType { type_char: char, field: String },

    #[error("{context} is not valid UTF-8")]
    InvalidUtf8 { context: String },

    #[error("name/value list has {count} items, expected an even count")]
    OddArgumentCount { count: usize },

    #[error("item {position} of name/value list must be a text field name")]
    ExpectedFieldName { position: usize },

    #[error("cannot convert JSON value for {field:?}: {reason}")]
    UnsupportedJson { field: String, reason: String },
}

/// Errors raised by [`crate::ListCodec`] parsing and mutation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ListError {
    #[error("list {text:?} has no delimiter ('|' or a control character TAB..FF)")]
    NoDelimiter { text: String },

    #[error("invalid entry {entry:?}: {reason}")]
    InvalidEntry { entry: String, reason: String },

    #[error("cannot use {delimiter:?} as delimiter: {reason}")]
    InvalidDelimiter { delimiter: char, reason: String },

    #[error("list {name:?} is nested; edit its child lists instead")]
    NestedList { name: String },

    #[error("record has no \"data\" field holding list text")]
    MissingData,
}

/// Errors raised while exchanging records with a peer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport used before a channel was initialized")]
    Uninitialized,

    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("peer answered with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Pack(#[from] PackError),

    #[error("reply carries sequence {received}, request was {sent}")]
    SequenceMismatch { sent: f64, received: f64 },

    #[error("service failed: {0}")]
    Service(String),
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("bad list definition: {0}")]
    List(#[from] ListError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_message() {
        let err = PackError::LengthMismatch {
            field: "Q".to_string(),
            declared: 10,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "field \"Q\" declares 10 bytes but only 3 remain"
        );
    }
}
