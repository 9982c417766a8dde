//! Self-describing binary records.
//!
//! A [`Record`] encodes to an ASCII prefix that names and sizes every field,
//! followed by the concatenated field bytes:
//!
//! ```text
//! NNNN[:type[[details]]](,<typechar><name>:<len>)*<field bytes...>
//! ```
//!
//! Type characters: `#` number, `$` text, `[` raw bytes, `&` nested record.

mod field;
mod packer;
mod record;
mod unpacker;

pub use field::{Field, FieldType, FieldValue, is_data_name};
pub use packer::{LENGTH_WINDOW, MAX_PREFIX_LEN, checksum, prefix};
pub use record::{MULTI_MARKER, Record};
