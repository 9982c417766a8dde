use std::fmt;

use crate::list::registry::ListRegistry;

/// Opening and closing brackets of a format annotation.
pub const FORMAT_START: char = '[';
pub const FORMAT_END: char = ']';

/// Input kinds selectable by the first character of a format annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// `#` any number
    Num,
    /// `I` integer
    Int,
    /// `$` dollar amount with up to two decimals
    Dollar,
    /// `P` number pair
    Pair,
    /// `Onn` non-negative integer, optionally limited to `nn`
    Ordinal,
    /// `Ann` comma-separated numbers, optionally at most `nn` of them
    NumArray,
    /// `%nn` string of at most `nn` characters
    LimitedStr,
    /// `Unn` uppercase string
    Upper,
    /// `@List` a member of the named list
    Member,
    /// `Rlo,hi` number within bounds
    Range,
    /// `{a,b,c}` one of the given strings
    Set,
}

impl FormatKind {
    const TABLE: [(char, FormatKind); 11] = [
        ('#', FormatKind::Num),
        ('I', FormatKind::Int),
        ('$', FormatKind::Dollar),
        ('P', FormatKind::Pair),
        ('O', FormatKind::Ordinal),
        ('A', FormatKind::NumArray),
        ('%', FormatKind::LimitedStr),
        ('U', FormatKind::Upper),
        ('@', FormatKind::Member),
        ('R', FormatKind::Range),
        ('{', FormatKind::Set),
    ];

    /// Case-insensitive lookup of a kind character.
    pub fn from_char(c: char) -> Option<Self> {
        let c = c.to_ascii_uppercase();
        Self::TABLE
            .iter()
            .find(|(ch, _)| *ch == c)
            .map(|(_, kind)| *kind)
    }

    pub fn as_char(self) -> char {
        Self::TABLE
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(ch, _)| *ch)
            .unwrap_or('#')
    }

    fn takes_length(self) -> bool {
        matches!(
            self,
            FormatKind::Ordinal | FormatKind::NumArray | FormatKind::LimitedStr | FormatKind::Upper
        )
    }
}

/// Value seeded by `=value` in an annotation, or an error string when the
/// annotation could not be understood.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatValue {
    None,
    Number(f64),
    Numbers(Vec<f64>),
    Text(String),
    Texts(Vec<String>),
    Invalid(String),
}

/// A parsed `[...]` annotation from the front of an entry description.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatSpec {
    raw: String,
    ch: char,
    kind: Option<FormatKind>,
    suffix: String,
    value_text: Option<String>,
    value: FormatValue,
    length: Option<usize>,
    range: Option<(f64, f64)>,
    set: Option<String>,
}

impl FormatSpec {
    /// Parse the annotation body (the text between the brackets).
    ///
    /// Never fails: problems are reported through [`FormatSpec::error`].
    pub fn parse(body: &str) -> Self {
        let (spec, value_text) = match body.split_once('=') {
            Some((spec, value)) => (spec, Some(value.to_string())),
            None => (body, None),
        };

        let mut chars = spec.chars();
        let ch = chars.next().unwrap_or(' ');
        let suffix = chars.as_str().to_string();
        let kind = FormatKind::from_char(ch);

        let mut format = Self {
            raw: body.to_string(),
            ch: ch.to_ascii_uppercase(),
            kind,
            suffix,
            value_text,
            value: FormatValue::None,
            length: None,
            range: None,
            set: None,
        };

        let Some(kind) = kind else {
            format.value = FormatValue::Invalid(format!("unknown format character {:?}", ch));
            return format;
        };

        if kind.takes_length() && !format.suffix.is_empty() {
            match format.suffix.parse() {
                Ok(n) => format.length = Some(n),
                Err(_) => {
                    format.value =
                        FormatValue::Invalid(format!("bad length qualifier {:?}", format.suffix));
                    return format;
                }
            }
        }

        match kind {
            FormatKind::Member if format.suffix.is_empty() => {
                format.value = FormatValue::Invalid("member format needs a list name".to_string());
                return format;
            }
            FormatKind::Range => match parse_pair(&format.suffix) {
                Some((lo, hi)) => format.range = Some((lo, hi)),
                None => {
                    format.value = FormatValue::Invalid(format!("bad range {:?}", format.suffix));
                    return format;
                }
            },
            FormatKind::Set => {
                let members = format.suffix.strip_suffix('}').unwrap_or(&format.suffix);
                format.set = Some(format!(",{},", members));
            }
            _ => {}
        }

        if let Some(text) = format.value_text.clone() {
            format.value = parse_value(kind, &text);
        }
        format
    }

    /// Split a description into its leading annotation (if any) and the
    /// remaining text.
    ///
    /// ```
    /// use tilepack::{FormatKind, FormatSpec, FormatValue};
    ///
    /// let (format, desc) = FormatSpec::split_description("[#=42]Meaning");
    /// let format = format.unwrap();
    /// assert_eq!(format.kind(), Some(FormatKind::Num));
    /// assert_eq!(format.value(), &FormatValue::Number(42.0));
    /// assert_eq!(desc, "Meaning");
    /// ```
    pub fn split_description(desc: &str) -> (Option<FormatSpec>, &str) {
        if let Some(inner) = desc.strip_prefix(FORMAT_START)
            && let Some(end) = inner.find(FORMAT_END)
        {
            return (Some(Self::parse(&inner[..end])), &inner[end + 1..]);
        }
        (None, desc)
    }

    pub fn kind(&self) -> Option<FormatKind> {
        self.kind
    }

    /// Kind character as written, upper-cased.
    pub fn kind_char(&self) -> char {
        self.ch
    }

    /// Characters after the kind character, before any `=value`.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn value(&self) -> &FormatValue {
        &self.value
    }

    pub fn value_text(&self) -> Option<&str> {
        self.value_text.as_deref()
    }

    pub fn length_qualifier(&self) -> Option<usize> {
        self.length
    }

    pub fn range(&self) -> Option<(f64, f64)> {
        self.range
    }

    /// Name of the list a `Member` format draws from.
    pub fn member_list(&self) -> Option<&str> {
        match self.kind {
            Some(FormatKind::Member) if !self.suffix.is_empty() => Some(&self.suffix),
            _ => None,
        }
    }

    /// Set members wrapped in commas, e.g. `,red,green,`.
    pub fn set_members(&self) -> Option<&str> {
        self.set.as_deref()
    }

    pub fn set_contains(&self, candidate: &str) -> bool {
        self.set
            .as_deref()
            .is_some_and(|set| set.contains(&format!(",{},", candidate)))
    }

    pub fn error(&self) -> Option<&str> {
        match &self.value {
            FormatValue::Invalid(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error().is_none()
    }

    /// Check user input against this format and return its normalized value.
    ///
    /// `Member` formats need `lists` to find the named list.
    pub fn validate(&self, input: &str, lists: Option<&ListRegistry>) -> Result<FormatValue, String> {
        if let Some(e) = self.error() {
            return Err(e.to_string());
        }
        let Some(kind) = self.kind else {
            return Err("no format".to_string());
        };
        let input = input.trim();

        match kind {
            FormatKind::Num => parse_number(input).map(FormatValue::Number),
            FormatKind::Int => parse_integer(input).map(FormatValue::Number),
            FormatKind::Dollar => {
                let amount = input.strip_prefix('$').unwrap_or(input);
                if let Some((_, cents)) = amount.split_once('.')
                    && cents.len() > 2
                {
                    return Err(format!("{:?} has more than two decimal places", input));
                }
                parse_number(amount).map(FormatValue::Number)
            }
            FormatKind::Pair => parse_pair(input)
                .map(|(a, b)| FormatValue::Numbers(vec![a, b]))
                .ok_or_else(|| format!("{:?} is not a number pair", input)),
            FormatKind::Ordinal => {
                let n = parse_integer(input)?;
                if n < 0.0 {
                    return Err(format!("{} is negative", n));
                }
                if let Some(limit) = self.length
                    && n > limit as f64
                {
                    return Err(format!("{} exceeds limit {}", n, limit));
                }
                Ok(FormatValue::Number(n))
            }
            FormatKind::NumArray => {
                let numbers = input
                    .split(',')
                    .map(|s| parse_number(s.trim()))
                    .collect::<Result<Vec<_>, _>>()?;
                if let Some(limit) = self.length
                    && numbers.len() > limit
                {
                    return Err(format!("{} numbers given, limit is {}", numbers.len(), limit));
                }
                Ok(FormatValue::Numbers(numbers))
            }
            FormatKind::LimitedStr | FormatKind::Upper => {
                let text = if kind == FormatKind::Upper {
                    input.to_uppercase()
                } else {
                    input.to_string()
                };
                if let Some(limit) = self.length
                    && text.chars().count() > limit
                {
                    return Err(format!("longer than {} characters", limit));
                }
                Ok(FormatValue::Text(text))
            }
            FormatKind::Set => {
                if input.is_empty() || self.set_contains(input) {
                    Ok(FormatValue::Text(input.to_string()))
                } else {
                    Err(format!("{:?} is not one of {}", input, self.suffix))
                }
            }
            FormatKind::Range => {
                let n = parse_number(input)?;
                match self.range {
                    Some((lo, hi)) if n >= lo && n <= hi => Ok(FormatValue::Number(n)),
                    Some((lo, hi)) => Err(format!("{} is outside {}..{}", n, lo, hi)),
                    None => Err("range bounds missing".to_string()),
                }
            }
            FormatKind::Member => {
                let name = self.member_list().unwrap_or_default();
                let list = lists
                    .and_then(|lists| lists.list(name))
                    .ok_or_else(|| format!("unknown list {:?}", name))?;
                if list.id_by_name(input).is_some() {
                    Ok(FormatValue::Text(input.to_string()))
                } else {
                    Err(format!("{:?} is not a member of {}", input, name))
                }
            }
        }
    }
}

impl fmt::Display for FormatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", FORMAT_START, self.raw, FORMAT_END)
    }
}

fn parse_number(s: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .ok()
        .filter(|n| !n.is_nan())
        .ok_or_else(|| format!("{:?} is not a number", s))
}

fn parse_integer(s: &str) -> Result<f64, String> {
    s.parse::<i64>()
        .map(|n| n as f64)
        .map_err(|_| format!("{:?} is not an integer", s))
}

fn parse_pair(s: &str) -> Option<(f64, f64)> {
    let (a, b) = s.split_once(',')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

fn parse_value(kind: FormatKind, text: &str) -> FormatValue {
    match kind {
        FormatKind::Num
        | FormatKind::Int
        | FormatKind::Dollar
        | FormatKind::Ordinal
        | FormatKind::Range => match parse_number(text) {
            Ok(n) => FormatValue::Number(n),
            Err(e) => FormatValue::Invalid(e),
        },
        FormatKind::Pair | FormatKind::NumArray => {
            match text
                .split(',')
                .map(|s| parse_number(s.trim()))
                .collect::<Result<Vec<_>, _>>()
            {
                Ok(numbers) => FormatValue::Numbers(numbers),
                Err(e) => FormatValue::Invalid(e),
            }
        }
        FormatKind::Member if text.contains(',') => {
            FormatValue::Texts(text.split(',').map(str::to_string).collect())
        }
        FormatKind::LimitedStr | FormatKind::Upper | FormatKind::Set | FormatKind::Member => {
            FormatValue::Text(text.to_string())
        }
    }
}
