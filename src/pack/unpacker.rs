use crate::errors::PackError;
use crate::pack::field::Field;
use crate::pack::packer::LENGTH_WINDOW;
use crate::pack::record::Record;

/// Decode wire bytes into a record.
///
/// Every declared field length must fit in the remaining input. Bytes past
/// the last declared field are ignored.
pub fn decode(data: &[u8]) -> Result<Record, PackError> {
    let mut cursor = Cursor::new(data);

    let prefix_len = read_length_window(&mut cursor)?;
    let prefix = cursor.read_bytes(prefix_len - LENGTH_WINDOW)?;
    let prefix = std::str::from_utf8(prefix).map_err(|_| PackError::InvalidUtf8 {
        context: "record prefix".to_string(),
    })?;

    let (mut record, specs) = parse_prefix(prefix)?;

    for spec in specs {
        if cursor.remaining() < spec.len {
            return Err(PackError::LengthMismatch {
                field: spec.name.to_string(),
                declared: spec.len,
                available: cursor.remaining(),
            });
        }
        let bytes = cursor.read_bytes(spec.len)?;
        let field = Field::from_wire(spec.name, spec.type_char, bytes)?;
        tracing::trace!(name = spec.name, len = spec.len, "decoded field");
        record.push_decoded(field);
    }

    if cursor.remaining() > 0 {
        tracing::debug!(
            trailing = cursor.remaining(),
            "ignoring bytes after last declared field"
        );
    }
    Ok(record)
}

/// Simple cursor for tracking position in byte slice
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], PackError> {
        if self.remaining() < count {
            return Err(PackError::Truncated {
                needed: self.pos + count,
                available: self.data.len(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }
}

fn read_length_window(cursor: &mut Cursor) -> Result<usize, PackError> {
    let window = cursor.read_bytes(LENGTH_WINDOW)?;
    let text = std::str::from_utf8(window)
        .ok()
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| PackError::MalformedPrefix {
            position: 0,
            reason: "length window is not a decimal number".to_string(),
        })?;

    let len: usize = text.parse().map_err(|_| PackError::MalformedPrefix {
        position: 0,
        reason: format!("length {:?} does not parse", text),
    })?;
    if len < LENGTH_WINDOW {
        return Err(PackError::MalformedPrefix {
            position: 0,
            reason: format!("prefix length {} is shorter than its own window", len),
        });
    }
    Ok(len)
}

struct FieldSpec<'a> {
    type_char: char,
    name: &'a str,
    len: usize,
}

/// Split the prefix after the length window into the record header and the
/// field descriptors.
fn parse_prefix(prefix: &str) -> Result<(Record, Vec<FieldSpec<'_>>), PackError> {
    let mut rest = prefix;
    let mut record = Record::default();

    if let Some(header) = rest.strip_prefix(':') {
        let tag_end = header.find([',', '[']).unwrap_or(header.len());
        record.set_type_tag(&header[..tag_end]);
        rest = &header[tag_end..];

        if let Some(details) = rest.strip_prefix('[') {
            let close = details.find(']').ok_or_else(|| PackError::MalformedPrefix {
                position: LENGTH_WINDOW + prefix.len() - rest.len(),
                reason: "unterminated details".to_string(),
            })?;
            record.set_details(&details[..close]);
            rest = &details[close + 1..];
        }
    }

    let mut specs = Vec::new();
    let mut offset = LENGTH_WINDOW + prefix.len() - rest.len();
    for segment in rest.split(',') {
        let position = offset;
        offset += segment.len() + 1;
        if segment.is_empty() {
            continue;
        }

        let mut chars = segment.chars();
        let type_char = chars.next().ok_or_else(|| PackError::MalformedPrefix {
            position,
            reason: "empty field descriptor".to_string(),
        })?;
        let descriptor = chars.as_str();
        let (name, len) = descriptor
            .rsplit_once(':')
            .ok_or_else(|| PackError::MalformedPrefix {
                position,
                reason: format!("field descriptor {:?} has no length", segment),
            })?;
        let len = len.parse().map_err(|_| PackError::MalformedPrefix {
            position,
            reason: format!("field {:?} has a non-numeric length {:?}", name, len),
        })?;
        specs.push(FieldSpec {
            type_char,
            name,
            len,
        });
    }

    Ok((record, specs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_simple() {
        let record = decode(b"14  ,#n:1,$t:2\x07hi").unwrap();
        assert_eq!(record.number("n"), Some(7.0));
        assert_eq!(record.text("t"), Some("hi"));
        assert_eq!(record.type_tag(), "");
    }

    #[test]
    fn test_decode_header() {
        let record = decode(b"14  :Tile[3x2]").unwrap();
        assert_eq!(record.type_tag(), "Tile");
        assert_eq!(record.details(), "3x2");
        assert!(record.is_empty());
    }

    #[test]
    fn test_trailing_comma_tolerated() {
        let record = decode(b"10  ,$a:1,x").unwrap();
        assert_eq!(record.text("a"), Some("x"));
    }

    #[test]
    fn test_declared_length_exceeds_input() {
        let err = decode(b"9   ,$a:5ab").unwrap_err();
        assert_eq!(
            err,
            PackError::LengthMismatch {
                field: "a".to_string(),
                declared: 5,
                available: 2,
            }
        );
    }

    #[test]
    fn test_truncated_prefix() {
        assert!(matches!(decode(b"12"), Err(PackError::Truncated { .. })));
        assert!(matches!(
            decode(b"40  ,$a:1"),
            Err(PackError::Truncated { .. })
        ));
    }

    #[test]
    fn test_bad_length_window() {
        assert!(matches!(
            decode(b"ab  ,$a:1x"),
            Err(PackError::MalformedPrefix { .. })
        ));
        assert!(matches!(
            decode(b"2   "),
            Err(PackError::MalformedPrefix { .. })
        ));
    }

    #[test]
    fn test_missing_field_length() {
        assert!(matches!(
            decode(b"8   ,$abx"),
            Err(PackError::MalformedPrefix { .. })
        ));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let record = decode(b"9   ,$a:1xyz").unwrap();
        assert_eq!(record.text("a"), Some("x"));
    }
}
