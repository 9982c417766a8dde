use std::fmt::Write as _;

use crate::errors::PackError;
use crate::pack::record::Record;

/// Width of the leading prefix-length window.
pub const LENGTH_WINDOW: usize = 4;

/// Largest prefix the length window can describe.
pub const MAX_PREFIX_LEN: usize = 9999;

/// Encode a record into wire bytes: the ASCII prefix, then every field's
/// bytes in prefix order.
pub fn encode(record: &Record) -> Result<Vec<u8>, PackError> {
    let prefix = prefix(record)?;

    let payload_len: usize = record
        .fields()
        .map(|f| f.bytes().map(<[u8]>::len))
        .sum::<Result<usize, _>>()?;

    let mut buffer = Vec::with_capacity(prefix.len() + payload_len);
    buffer.extend_from_slice(prefix.as_bytes());
    for field in record.fields() {
        buffer.extend_from_slice(field.bytes()?);
    }

    tracing::debug!(
        prefix_len = prefix.len(),
        total_len = buffer.len(),
        fields = record.len(),
        "encoded record"
    );
    Ok(buffer)
}

/// Build the record prefix:
/// `NNNN[:type[\[details\]]](,<typechar><name>:<len>)*`.
///
/// `NNNN` is the prefix's own byte length, left-aligned and space-padded
/// to four characters. Details travel only with a type tag.
pub fn prefix(record: &Record) -> Result<String, PackError> {
    let mut body = String::new();

    let tag = record.type_tag();
    if tag.contains([',', '[']) {
        return Err(PackError::InvalidTypeTag {
            tag: tag.to_string(),
        });
    }
    if !tag.is_empty() {
        body.push(':');
        body.push_str(tag);
        if !record.details().is_empty() {
            let _ = write!(body, "[{}]", record.details());
        }
    }

    for field in record.fields() {
        if field.name().contains([',', ':']) {
            return Err(PackError::InvalidFieldName {
                name: field.name().to_string(),
            });
        }
        let len = field.bytes()?.len();
        let _ = write!(
            body,
            ",{}{}:{}",
            field.field_type().type_char(),
            field.name(),
            len
        );
    }

    let total = LENGTH_WINDOW + body.len();
    if total > MAX_PREFIX_LEN {
        return Err(PackError::PrefixTooLong { len: total });
    }
    Ok(format!("{:<4}{}", total, body))
}

/// Position-weighted byte sum, used to compare encodings cheaply.
///
/// The byte at index `i` is weighted `((i + 1) & 31) + 1`, so weights
/// cycle through 2..=32 and then 1.
pub fn checksum(bytes: &[u8]) -> u32 {
    bytes.iter().enumerate().fold(0u32, |acc, (i, &b)| {
        let weight = ((i as u32).wrapping_add(1) & 31) + 1;
        acc.wrapping_add(b as u32 * weight)
    })
}
