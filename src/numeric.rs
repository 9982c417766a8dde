//! Variable-width number encoding.
//!
//! Integers are stored in the smallest of 1, 2 or 4 little-endian bytes that
//! holds them; everything else becomes an 8-byte IEEE-754 double. The byte
//! count alone identifies the representation when decoding.

const I8_LIMIT: f64 = 128.0;
const I16_LIMIT: f64 = 32_000.0;
const I32_LIMIT: f64 = 2_000_000_000.0;

/// Encode a number into its minimal byte form.
///
/// NaN encodes to an empty buffer.
///
/// # Example
///
/// ```
/// use tilepack::numeric::encode_number;
///
/// assert_eq!(encode_number(42.0), vec![42]);
/// assert_eq!(encode_number(-300.0).len(), 2);
/// assert_eq!(encode_number(1.5).len(), 8);
/// assert!(encode_number(f64::NAN).is_empty());
/// ```
pub fn encode_number(n: f64) -> Vec<u8> {
    if n.is_nan() {
        return Vec::new();
    }
    if n.fract() != 0.0 {
        return n.to_le_bytes().to_vec();
    }

    let magnitude = n.abs();
    if magnitude < I8_LIMIT {
        (n as i8).to_le_bytes().to_vec()
    } else if magnitude < I16_LIMIT {
        (n as i16).to_le_bytes().to_vec()
    } else if magnitude < I32_LIMIT {
        (n as i32).to_le_bytes().to_vec()
    } else {
        n.to_le_bytes().to_vec()
    }
}

/// Decode bytes produced by [`encode_number`].
///
/// Lengths other than 1, 2, 4 or 8 decode to NaN.
pub fn decode_number(bytes: &[u8]) -> f64 {
    match bytes.len() {
        1 => i8::from_le_bytes([bytes[0]]) as f64,
        2 => i16::from_le_bytes([bytes[0], bytes[1]]) as f64,
        4 => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
        8 => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(bytes);
            f64::from_le_bytes(buf)
        }
        _ => f64::NAN,
    }
}
