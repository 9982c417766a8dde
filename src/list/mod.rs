//! Delimiter-driven named lists.
//!
//! A list is a single string such as `Ev:Event|Click|Enter|Exit|`: a
//! `name[:desc]` header followed by entries, each terminated by the
//! delimiter. Entries may carry a `[...]` format annotation at the start of
//! their description. A list whose delimiter is a control character holds one
//! child list per line.

mod codec;
mod entry;
mod format;
mod registry;

pub use codec::{DELIM_FIELD, LIST_RECORD_TYPE, ListCodec, ListKind, PRIME_DELIM, is_delimiter};
pub use entry::{EntryView, NAME_DELIM};
pub use format::{FORMAT_END, FORMAT_START, FormatKind, FormatSpec, FormatValue};
pub use registry::{AGGREGATE_LIST_HEADER, ListRegistry, SharedRegistry};
