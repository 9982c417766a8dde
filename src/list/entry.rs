use crate::list::format::FormatSpec;

/// Separates an entry's name from its description.
pub const NAME_DELIM: char = ':';

/// True for characters that start a numeric value: digits, `-`, `+` and `.`.
pub(crate) fn starts_number(s: &str) -> bool {
    s.chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
}

/// One entry of a list, built on demand from the list text.
///
/// Changes are written back through [`crate::ListCodec::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct EntryView {
    name: String,
    desc: String,
    format: Option<FormatSpec>,
    values: Vec<f64>,
    id: usize,
}

impl EntryView {
    /// Build an entry from a name and a description that may begin with a
    /// `[...]` format annotation.
    pub fn new(name: impl Into<String>, desc: &str) -> Self {
        let name = name.into();
        let (format, desc) = FormatSpec::split_description(desc);
        let desc = if desc.is_empty() && format.is_none() {
            name.clone()
        } else {
            desc.to_string()
        };
        let values = parse_values(&desc);
        Self {
            name,
            desc,
            format,
            values,
            id: 0,
        }
    }

    /// Parse one `name[:desc]` segment of a list.
    pub fn parse(segment: &str, id: usize) -> Self {
        let mut entry = match segment.split_once(NAME_DELIM) {
            Some((name, desc)) => Self::new(name, desc),
            None => Self::new(segment, ""),
        };
        entry.id = id;
        entry
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }

    pub fn format(&self) -> Option<&FormatSpec> {
        self.format.as_ref()
    }

    pub fn set_format(&mut self, format: Option<FormatSpec>) {
        self.format = format;
    }

    /// Position in the list, starting at 1. Zero for detached entries.
    pub fn id(&self) -> usize {
        self.id
    }

    /// First numeric value of a numeric description.
    pub fn value(&self) -> Option<f64> {
        self.values.first().copied()
    }

    /// All numbers of a comma-separated numeric description.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The segment text stored in the list.
    pub fn to_entry_string(&self) -> String {
        match &self.format {
            None if self.desc.is_empty() || self.desc == self.name => self.name.clone(),
            None => format!("{}{}{}", self.name, NAME_DELIM, self.desc),
            Some(format) => format!("{}{}{}{}", self.name, NAME_DELIM, format, self.desc),
        }
    }

    /// `desc<delim>name:id`, or just the description without a delimiter.
    pub fn to_line(&self, delim: Option<char>) -> String {
        match delim {
            Some(d) => format!("{}{}{}{}{}", self.desc, d, self.name, NAME_DELIM, self.id),
            None => self.desc.clone(),
        }
    }
}

fn parse_values(desc: &str) -> Vec<f64> {
    if !starts_number(desc) {
        return Vec::new();
    }
    desc.split(',')
        .map(|s| s.trim().parse().unwrap_or(f64::NAN))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::format::{FormatKind, FormatValue};

    #[test]
    fn test_bare_name_describes_itself() {
        let entry = EntryView::parse("Click", 1);
        assert_eq!(entry.name(), "Click");
        assert_eq!(entry.desc(), "Click");
        assert_eq!(entry.to_entry_string(), "Click");
        assert_eq!(entry.id(), 1);
    }

    #[test]
    fn test_named_with_description() {
        let entry = EntryView::parse("TL:Top Left", 3);
        assert_eq!(entry.name(), "TL");
        assert_eq!(entry.desc(), "Top Left");
        assert_eq!(entry.to_entry_string(), "TL:Top Left");
    }

    #[test]
    fn test_format_annotation() {
        let entry = EntryView::parse("Answer:[#=42]Meaning", 1);
        let format = entry.format().unwrap();
        assert_eq!(format.kind(), Some(FormatKind::Num));
        assert_eq!(format.value(), &FormatValue::Number(42.0));
        assert_eq!(entry.desc(), "Meaning");
        assert_eq!(entry.to_entry_string(), "Answer:[#=42]Meaning");
    }

    #[test]
    fn test_format_kept_when_desc_matches_name() {
        let entry = EntryView::new("Cost", "[$]Cost");
        assert_eq!(entry.to_entry_string(), "Cost:[$]Cost");

        let entry = EntryView::new("XY", "[P]");
        assert_eq!(entry.desc(), "");
        assert_eq!(entry.to_entry_string(), "XY:[P]");
    }

    #[test]
    fn test_numeric_descriptions() {
        assert_eq!(EntryView::parse("Max:250", 1).value(), Some(250.0));
        assert_eq!(EntryView::parse("Dim:3,4,5", 1).values(), &[3.0, 4.0, 5.0]);
        assert_eq!(EntryView::parse("Neg:-1.5", 1).value(), Some(-1.5));
        assert_eq!(EntryView::parse("Word:abc", 1).value(), None);
    }

    #[test]
    fn test_to_line() {
        let entry = EntryView::parse("TL:Top Left", 3);
        assert_eq!(entry.to_line(Some('\t')), "Top Left\tTL:3");
        assert_eq!(entry.to_line(None), "Top Left");
    }
}
