use std::fmt::Write as _;

use serde_json::{Map, Value};

use crate::errors::PackError;
use crate::pack::field::{Field, FieldValue, is_data_name};
use crate::pack::{packer, unpacker};

/// Type tag prefix marking a record whose data fields are sub-records.
pub const MULTI_MARKER: char = '*';

/// An ordered set of named fields, split into control and data groups.
///
/// Names are unique within each group: adding a field whose name already
/// exists replaces it in place. Control fields always precede data fields
/// on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    type_tag: String,
    details: String,
    controls: Vec<Field>,
    data: Vec<Field>,
}

impl Record {
    /// Create an empty record. `details` is cut at its first `]`.
    pub fn new(type_tag: impl Into<String>, details: &str) -> Self {
        let mut record = Self {
            type_tag: type_tag.into(),
            ..Self::default()
        };
        record.set_details(details);
        record
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn set_type_tag(&mut self, type_tag: impl Into<String>) {
        self.type_tag = type_tag.into();
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn set_details(&mut self, details: &str) {
        let end = details.find(']').unwrap_or(details.len());
        self.details = details[..end].to_string();
    }

    pub fn control_fields(&self) -> &[Field] {
        &self.controls
    }

    pub fn data_fields(&self) -> &[Field] {
        &self.data
    }

    /// All fields in wire order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.controls.iter().chain(self.data.iter())
    }

    pub fn len(&self) -> usize {
        self.controls.len() + self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty() && self.data.is_empty()
    }

    fn group_mut(&mut self, name: &str) -> &mut Vec<Field> {
        if is_data_name(name) {
            &mut self.data
        } else {
            &mut self.controls
        }
    }

    fn group(&self, name: &str) -> &[Field] {
        if is_data_name(name) {
            &self.data
        } else {
            &self.controls
        }
    }

    /// Insert a field, replacing any same-named field in place.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> &mut Self {
        self.add_field(Field::new(name, value))
    }

    pub fn add_field(&mut self, field: Field) -> &mut Self {
        let group = self.group_mut(field.name());
        match group.iter_mut().find(|f| f.name() == field.name()) {
            Some(slot) => *slot = field,
            None => group.push(field),
        }
        self
    }

    /// Append a decoded field without the same-name check, so multi-record
    /// rows (all nameless) survive decoding.
    pub(crate) fn push_decoded(&mut self, field: Field) {
        if field.is_data() {
            self.data.push(field);
        } else {
            self.controls.push(field);
        }
    }

    /// Add fields from a flat `name, value, name, value, ...` list.
    ///
    /// Nothing is applied unless the whole list is well formed.
    pub fn add_all(&mut self, items: Vec<FieldValue>) -> Result<(), PackError> {
        if items.len() % 2 != 0 {
            return Err(PackError::OddArgumentCount { count: items.len() });
        }
        if let Some(position) = items
            .iter()
            .step_by(2)
            .position(|name| name.as_text().is_none())
        {
            return Err(PackError::ExpectedFieldName {
                position: position * 2,
            });
        }

        let mut items = items.into_iter();
        while let (Some(FieldValue::Text(name)), Some(value)) = (items.next(), items.next()) {
            self.add(name, value);
        }
        Ok(())
    }

    /// Replace an existing field's value. Returns false if the name is absent.
    pub fn replace(&mut self, name: &str, value: impl Into<FieldValue>) -> bool {
        match self.group_mut(name).iter_mut().find(|f| f.name() == name) {
            Some(slot) => {
                *slot = Field::new(name, value);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Field> {
        let group = self.group_mut(name);
        let pos = group.iter().position(|f| f.name() == name)?;
        Some(group.remove(pos))
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.group(name).iter().find(|f| f.name() == name)
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.field(name).map(Field::value)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(FieldValue::as_text)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.value(name).and_then(FieldValue::as_number)
    }

    pub fn bytes(&self, name: &str) -> Option<&[u8]> {
        self.value(name).and_then(FieldValue::as_bytes)
    }

    pub fn record(&self, name: &str) -> Option<&Record> {
        self.value(name).and_then(FieldValue::as_record)
    }

    /// Text value, or `""` when absent or not text.
    pub fn text_or_empty(&self, name: &str) -> &str {
        self.text(name).unwrap_or("")
    }

    /// Numeric value, or NaN when absent or not a number.
    pub fn number_or_nan(&self, name: &str) -> f64 {
        self.number(name).unwrap_or(f64::NAN)
    }

    pub fn clear_data(&mut self) {
        self.data.clear();
    }

    pub fn clear_controls(&mut self) {
        self.controls.clear();
    }

    /// True when the type tag carries the multi-record marker.
    pub fn is_multi(&self) -> bool {
        self.type_tag.starts_with(MULTI_MARKER)
    }

    /// Replace all data fields with one nameless sub-record per input and
    /// mark the record as multi.
    pub fn pack(&mut self, records: Vec<Record>) {
        self.data = records.into_iter().map(|r| Field::new("", r)).collect();
        if !self.is_multi() {
            self.type_tag.insert(0, MULTI_MARKER);
        }
    }

    /// Split a multi-record back into its sub-records.
    ///
    /// The marker is stripped and data fields are cleared. A record that is
    /// not multi yields nothing and is left unchanged.
    pub fn unpack(&mut self) -> Vec<Record> {
        if !self.is_multi() {
            return Vec::new();
        }
        self.type_tag.remove(0);
        std::mem::take(&mut self.data)
            .into_iter()
            .filter(|f| f.name().is_empty())
            .filter_map(|f| match f.into_value() {
                FieldValue::Record(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    /// Encode into wire bytes.
    pub fn encode(&self) -> Result<Vec<u8>, PackError> {
        packer::encode(self)
    }

    /// Decode wire bytes produced by [`Record::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, PackError> {
        unpacker::decode(bytes)
    }

    /// Build a record from a JSON value.
    ///
    /// An object becomes a record with one field per key (numbers, strings,
    /// nested objects, byte arrays; booleans as 1/0; null as empty bytes).
    /// An array of objects becomes a multi-record.
    pub fn from_json(value: &Value) -> Result<Self, PackError> {
        match value {
            Value::Object(map) => Self::from_json_map(map),
            Value::Array(items) => {
                let rows = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| match item {
                        Value::Object(map) => Self::from_json_map(map),
                        _ => Err(PackError::UnsupportedJson {
                            field: format!("[{}]", i),
                            reason: "multi-record rows must be objects".to_string(),
                        }),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let mut record = Record::default();
                record.pack(rows);
                Ok(record)
            }
            _ => Err(PackError::UnsupportedJson {
                field: String::new(),
                reason: "expected an object or an array of objects".to_string(),
            }),
        }
    }

    fn from_json_map(map: &Map<String, Value>) -> Result<Self, PackError> {
        let mut record = Record::default();
        for (name, value) in map {
            record.add(name.as_str(), json_to_value(name, value)?);
        }
        Ok(record)
    }

    /// Export as JSON: an object, or an array of objects for a multi-record.
    pub fn to_json(&self) -> Value {
        if self.is_multi() {
            let rows = self
                .data
                .iter()
                .filter_map(|f| f.value().as_record())
                .map(Record::to_json)
                .collect();
            return Value::Array(rows);
        }

        let map = self
            .fields()
            .map(|f| (f.name().to_string(), value_to_json(f.value())))
            .collect();
        Value::Object(map)
    }

    /// Human-readable dump: a header, the wire prefix and one line per field.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Record {:?}{} ({} control, {} data)",
            self.type_tag,
            if self.details.is_empty() {
                String::new()
            } else {
                format!(" [{}]", self.details)
            },
            self.controls.len(),
            self.data.len()
        );
        match packer::prefix(self) {
            Ok(prefix) => {
                let _ = writeln!(out, "  prefix {}", prefix);
            }
            Err(e) => {
                let _ = writeln!(out, "  prefix unavailable: {}", e);
            }
        }
        for field in self.fields() {
            let _ = writeln!(
                out,
                "  {}{} = {}",
                field.field_type().type_char(),
                field.name(),
                field.value()
            );
        }
        out
    }

    /// [`Record::describe`] followed by the description of every sub-record.
    pub fn expand(&self) -> String {
        let mut out = self.describe();
        if self.is_multi() {
            for (i, sub) in self.data.iter().filter_map(|f| f.value().as_record()).enumerate() {
                let _ = writeln!(out, "[{}]", i);
                out.push_str(&sub.describe());
            }
        }
        out
    }
}

fn json_to_value(name: &str, value: &Value) -> Result<FieldValue, PackError> {
    Ok(match value {
        Value::Null => FieldValue::Bytes(Vec::new()),
        Value::Bool(b) => FieldValue::Number(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => match n.as_f64() {
            Some(n) => FieldValue::Number(n),
            None => {
                return Err(PackError::UnsupportedJson {
                    field: name.to_string(),
                    reason: format!("number {} is not representable", n),
                });
            }
        },
        Value::String(s) => FieldValue::Text(s.clone()),
        Value::Object(map) => FieldValue::Record(Record::from_json_map(map)?),
        Value::Array(items) => {
            let bytes = items
                .iter()
                .map(|v| v.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect::<Option<Vec<u8>>>()
                .ok_or_else(|| PackError::UnsupportedJson {
                    field: name.to_string(),
                    reason: "arrays must hold byte values 0..=255".to_string(),
                })?;
            FieldValue::Bytes(bytes)
        }
    })
}

fn value_to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Number(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        FieldValue::Text(s) => Value::String(s.clone()),
        FieldValue::Bytes(b) => Value::Array(b.iter().map(|&byte| Value::from(byte)).collect()),
        FieldValue::Record(r) => r.to_json(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_details_truncated_at_bracket() {
        let record = Record::new("Tile", "abc]def");
        assert_eq!(record.details(), "abc");
    }

    #[test]
    fn test_add_replaces_in_place() {
        let mut record = Record::default();
        record.add("!Q", "S").add("!T", "Users").add("!Q", "D");
        let names: Vec<_> = record.fields().map(|f| f.name()).collect();
        assert_eq!(names, vec!["!Q", "!T"]);
        assert_eq!(record.text("!Q"), Some("D"));
    }

    #[test]
    fn test_controls_precede_data() {
        let mut record = Record::default();
        record.add("1", 10).add("Name", "x").add("2", 20).add("!Q", "S");
        let names: Vec<_> = record.fields().map(|f| f.name()).collect();
        assert_eq!(names, vec!["Name", "!Q", "1", "2"]);
        assert_eq!(record.data_fields().len(), 2);
    }

    #[test]
    fn test_add_all_rejects_odd_count_without_applying() {
        let mut record = Record::default();
        let err = record
            .add_all(vec!["a".into(), 1.into(), "b".into()])
            .unwrap_err();
        assert_eq!(err, PackError::OddArgumentCount { count: 3 });
        assert!(record.is_empty());
    }

    #[test]
    fn test_add_all_rejects_non_text_name() {
        let mut record = Record::default();
        let err = record
            .add_all(vec!["a".into(), 1.into(), 2.into(), 3.into()])
            .unwrap_err();
        assert_eq!(err, PackError::ExpectedFieldName { position: 2 });
        assert!(record.is_empty());
    }

    #[test]
    fn test_add_all_applies_pairs() {
        let mut record = Record::default();
        record
            .add_all(vec!["a".into(), 1.into(), "b".into(), "two".into()])
            .unwrap();
        assert_eq!(record.number("a"), Some(1.0));
        assert_eq!(record.text("b"), Some("two"));
    }

    #[test]
    fn test_replace_only_existing() {
        let mut record = Record::default();
        assert!(!record.replace("x", 1));
        record.add("x", 1);
        assert!(record.replace("x", "now text"));
        assert_eq!(record.text("x"), Some("now text"));
    }

    #[test]
    fn test_defaulting_getters() {
        let mut record = Record::default();
        record.add("n", 5);
        assert_eq!(record.text_or_empty("n"), "");
        assert!(record.number_or_nan("missing").is_nan());
        assert_eq!(record.number_or_nan("n"), 5.0);
    }

    #[test]
    fn test_pack_unpack() {
        let rows: Vec<Record> = (1..=3)
            .map(|i| {
                let mut r = Record::default();
                r.add("ID", i).add("Name", format!("row{}", i));
                r
            })
            .collect();

        let mut multi = Record::new("Users", "");
        multi.add("!Q", "S").add("1", "stale");
        multi.pack(rows.clone());
        assert!(multi.is_multi());
        assert_eq!(multi.type_tag(), "*Users");
        assert_eq!(multi.data_fields().len(), 3);

        let unpacked = multi.unpack();
        assert_eq!(unpacked, rows);
        assert_eq!(multi.type_tag(), "Users");
        assert!(multi.data_fields().is_empty());
        assert_eq!(multi.text("!Q"), Some("S"));
    }

    #[test]
    fn test_unpack_non_multi_is_empty() {
        let mut record = Record::new("Plain", "");
        record.add("1", "x");
        assert!(record.unpack().is_empty());
        assert_eq!(record.data_fields().len(), 1);
    }

    #[test]
    fn test_json_import() {
        let record = Record::from_json(&json!({
            "Name": "tile",
            "Size": 3,
            "On": true,
            "Blob": [1, 2, 255],
            "Nothing": null,
            "Sub": { "x": 1.5 }
        }))
        .unwrap();

        assert_eq!(record.text("Name"), Some("tile"));
        assert_eq!(record.number("Size"), Some(3.0));
        assert_eq!(record.number("On"), Some(1.0));
        assert_eq!(record.bytes("Blob"), Some(&[1u8, 2, 255][..]));
        assert_eq!(record.bytes("Nothing"), Some(&[][..]));
        assert_eq!(record.record("Sub").and_then(|r| r.number("x")), Some(1.5));
    }

    #[test]
    fn test_json_rejects_bad_bytes() {
        let err = Record::from_json(&json!({ "Blob": [1, 300] })).unwrap_err();
        assert!(matches!(err, PackError::UnsupportedJson { .. }));
    }

    #[test]
    fn test_json_array_is_multi() {
        let record = Record::from_json(&json!([{ "a": 1 }, { "a": 2 }])).unwrap();
        assert!(record.is_multi());
        assert_eq!(record.to_json(), json!([{ "a": 1.0 }, { "a": 2.0 }]));
    }

    #[test]
    fn test_describe_lists_fields() {
        let mut record = Record::new("Q", "");
        record.add("!Q", "SELECT 1").add("1", 42);
        let text = record.describe();
        assert!(text.contains("$!Q = \"SELECT 1\""));
        assert!(text.contains("#1 = 42"));
        assert!(text.contains("prefix"));
    }

    #[test]
    fn test_nested_equality_is_structural() {
        let mut inner_a = Record::default();
        inner_a.add("x", 1);
        let inner_b = inner_a.clone();

        let mut a = Record::default();
        a.add("Sub", inner_a);
        let mut b = Record::default();
        b.add("Sub", inner_b);
        assert_eq!(a, b);

        let mut inner_c = Record::default();
        inner_c.add("x", 2);
        let mut c = Record::default();
        c.add("Sub", inner_c);
        assert_ne!(a, c);
    }
}
