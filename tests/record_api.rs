//! Record codec through the public API.

use serde_json::json;
use tilepack::numeric::{decode_number, encode_number};
use tilepack::{FieldType, FieldValue, PackError, Record};

fn mixed() -> Record {
    let mut inner = Record::new("Cell", "");
    inner.add("x", 3).add("label", "A1");

    let mut record = Record::new("Tile", "main");
    record
        .add("!Q", "S")
        .add("width", 1.5)
        .add("blob", vec![0u8, 255, 7])
        .add("cell", inner)
        .add("0", -40000)
        .add("1", "row text");
    record
}

#[test]
fn test_mixed_record_roundtrip() {
    let record = mixed();
    let back = Record::decode(&record.encode().unwrap()).unwrap();

    assert_eq!(back, record);
    assert_eq!(back.type_tag(), "Tile");
    assert_eq!(back.details(), "main");
    assert_eq!(back.control_fields().len(), 4);
    assert_eq!(back.data_fields().len(), 2);
    assert_eq!(back.number("width"), Some(1.5));
    assert_eq!(back.bytes("blob"), Some(&[0u8, 255, 7][..]));
    assert_eq!(back.record("cell").unwrap().text("label"), Some("A1"));
    assert_eq!(back.number("0"), Some(-40000.0));
    assert_eq!(back.field("cell").unwrap().field_type(), FieldType::Record);
}

#[test]
fn test_select_scenario() {
    let mut record = Record::default();
    record.add("Q", "SELECT 1").add("id", "0");
    record.add("0", 42);

    let bytes = record.encode().unwrap();
    assert!(bytes[..4].iter().all(|b| b.is_ascii_digit() || *b == b' '));
    assert!(bytes[0].is_ascii_digit());

    let back = Record::decode(&bytes).unwrap();
    assert_eq!(back.text("Q"), Some("SELECT 1"));
    assert_eq!(back.number("0"), Some(42.0));
}

#[test]
fn test_wire_layout() {
    let mut record = Record::new("Q", "");
    record.add("1", 5).add("!Q", "SELECT 1");
    let bytes = record.encode().unwrap();

    let expected_prefix = "17  :Q,$!Q:8,#1:1";
    assert_eq!(&bytes[..expected_prefix.len()], expected_prefix.as_bytes());
    assert_eq!(&bytes[expected_prefix.len()..], b"SELECT 1\x05");
}

#[test]
fn test_multi_record_law() {
    let rows: Vec<Record> = (1..=3)
        .map(|i| {
            let mut row = Record::default();
            row.add("id", i).add("name", format!("r{}", i)).add("0", i * 10);
            row
        })
        .collect();

    let mut packed = Record::new("Rows", "");
    packed.add("!Q", "S");
    packed.pack(rows.clone());
    assert!(packed.is_multi());
    assert_eq!(packed.type_tag(), "*Rows");

    let mut back = Record::decode(&packed.encode().unwrap()).unwrap();
    assert!(back.is_multi());
    let unpacked = back.unpack();
    assert_eq!(unpacked, rows);
    assert_eq!(back.type_tag(), "Rows");
    assert!(back.data_fields().is_empty());
    assert_eq!(back.text("!Q"), Some("S"));
}

#[test]
fn test_numeric_codec_widths() {
    for (n, width) in [(0.0, 1), (-128.0, 2), (127.0, 1), (31999.0, 2), (-1_999_999_999.0, 4)] {
        let bytes = encode_number(n);
        assert_eq!(bytes.len(), width, "{}", n);
        assert_eq!(decode_number(&bytes), n);
    }
    assert_eq!(encode_number(0.25).len(), 8);
    assert_eq!(encode_number(3e9).len(), 8);
    assert!(encode_number(f64::NAN).is_empty());
    assert!(decode_number(&[1, 2, 3]).is_nan());
}

#[test]
fn test_truncated_payload_is_fatal() {
    let bytes = mixed().encode().unwrap();
    let err = Record::decode(&bytes[..bytes.len() - 1]).unwrap_err();
    assert!(matches!(err, PackError::LengthMismatch { .. }));
}

#[test]
fn test_add_all_rejects_odd_list() {
    let mut record = Record::default();
    let err = record
        .add_all(vec!["a".into(), 1.into(), "b".into()])
        .unwrap_err();
    assert_eq!(err, PackError::OddArgumentCount { count: 3 });
    assert!(record.is_empty());

    record
        .add_all(vec!["a".into(), 1.into(), "b".into(), "two".into()])
        .unwrap();
    assert_eq!(record.number("a"), Some(1.0));
    assert_eq!(record.text("b"), Some("two"));
}

#[test]
fn test_json_roundtrip() {
    let value = json!({"name": "Ev", "count": 3, "flag": true, "raw": [1, 2], "sub": {"k": "v"}});
    let record = Record::from_json(&value).unwrap();
    assert_eq!(record.number("flag"), Some(1.0));
    assert_eq!(record.value("raw"), Some(&FieldValue::Bytes(vec![1, 2])));

    let back = Record::decode(&record.encode().unwrap()).unwrap();
    let exported = back.to_json();
    assert_eq!(exported["name"], "Ev");
    assert_eq!(exported["count"], 3.0);
    assert_eq!(exported["sub"]["k"], "v");
}

#[test]
fn test_json_keeps_object_order() {
    let record = Record::from_json(&json!({"b": 1, "a": 2, "0": 3})).unwrap();
    let names: Vec<&str> = record.control_fields().iter().map(|f| f.name()).collect();
    assert_eq!(names, ["b", "a"]);

    let bytes = record.encode().unwrap();
    let expected_prefix = "19  ,#b:1,#a:1,#0:1";
    assert_eq!(&bytes[..expected_prefix.len()], expected_prefix.as_bytes());
    let exported = record.to_json();
    let keys: Vec<&String> = exported.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["b", "a", "0"]);
}

#[test]
fn test_prefix_limit() {
    let mut record = Record::default();
    for i in 0..1200 {
        record.add(format!("field{}", i), i);
    }
    assert!(matches!(
        record.encode(),
        Err(PackError::PrefixTooLong { .. })
    ));
}
