use std::fmt::{self, Write as _};
use std::sync::OnceLock;

use crate::errors::ListError;
use crate::list::entry::{EntryView, NAME_DELIM, starts_number};
use crate::list::format::{FORMAT_END, FORMAT_START};
use crate::pack::Record;

/// The default delimiter for flat lists.
pub const PRIME_DELIM: char = '|';

/// Type tag used when a list is stored as a [`Record`].
pub const LIST_RECORD_TYPE: &str = "List";

/// Record field carrying a delimiter that [`is_delimiter`] does not know.
pub const DELIM_FIELD: &str = "delim";

/// Characters recognized as list delimiters without a hint: `|` and the
/// control characters TAB, LF, VT and FF.
pub fn is_delimiter(c: char) -> bool {
    c == PRIME_DELIM || ('\t'..='\x0c').contains(&c)
}

fn is_nested_delimiter(c: char) -> bool {
    (c as u32) < 0x20
}

/// Layout of a parsed list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Entries, at least one with a description.
    Plain,
    /// Entries are bare names only.
    NameOnly,
    /// Entries are numeric IDs referring into another list.
    IdRef,
    /// Every line is itself a list.
    Nested,
}

#[derive(Debug, Clone)]
struct NameIndex {
    joined: String,
    names: Vec<String>,
}

/// An ordered, named list stored as delimiter-separated text.
///
/// ```text
/// [indent]Name[:Desc]|entry|name:desc|name:[fmt]desc|
/// ```
///
/// Entry IDs are 1-based positions. Lookups scan the text; every mutation
/// rewrites the text and parses it again.
#[derive(Debug, Clone)]
pub struct ListCodec {
    text: String,
    name: String,
    desc: String,
    delimiter: char,
    indent: usize,
    first_delim: usize,
    kind: ListKind,
    children: Vec<ListCodec>,
    ref_ids: Vec<usize>,
    index: OnceLock<NameIndex>,
}

impl ListCodec {
    /// Parse a list definition.
    ///
    /// # Example
    ///
    /// ```
    /// use tilepack::ListCodec;
    ///
    /// let list = ListCodec::parse("Ev:Event|Click|Enter|Exit|").unwrap();
    /// assert_eq!(list.name(), "Ev");
    /// assert_eq!(list.desc(), "Event");
    /// assert_eq!(list.id_by_name("Exit"), Some(3));
    /// ```
    pub fn parse(text: &str) -> Result<Self, ListError> {
        Self::parse_with_delimiter(text, None)
    }

    /// Parse lines as one nested list, joined by newlines.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self, ListError> {
        let mut text = String::new();
        for line in lines {
            text.push_str(line.as_ref());
            text.push('\n');
        }
        Self::parse(&text)
    }

    /// Parse with an extra accepted delimiter, needed for lists whose
    /// delimiter was changed with [`ListCodec::set_delimiter`].
    pub fn parse_with_delimiter(input: &str, hint: Option<char>) -> Result<Self, ListError> {
        let accepts = |c: char| is_delimiter(c) || Some(c) == hint;
        let mut text = input.to_string();
        let (indent, name_pos) = scan_indent(&text);

        let delimiter = match text.chars().last() {
            Some(c) if accepts(c) => c,
            _ => {
                let found = text[name_pos..]
                    .chars()
                    .find(|&c| accepts(c))
                    .ok_or_else(|| no_delimiter(input))?;
                text.push(found);
                found
            }
        };

        if is_nested_delimiter(delimiter) {
            return Ok(Self::parse_nested(&text, delimiter));
        }

        let first_delim = text[name_pos..]
            .find(delimiter)
            .map(|p| p + name_pos)
            .ok_or_else(|| no_delimiter(input))?;
        let (name, desc) = split_header(&text[name_pos..first_delim]);

        let mut list = Self {
            name,
            desc,
            delimiter,
            indent,
            first_delim,
            kind: ListKind::Plain,
            children: Vec::new(),
            ref_ids: Vec::new(),
            index: OnceLock::new(),
            text,
        };

        let (kind, ref_ids) = {
            let segments = list.segments();
            if starts_number(&list.text[first_delim + 1..]) {
                let ids: Vec<usize> = segments
                    .iter()
                    .filter_map(|s| match s.trim().parse() {
                        Ok(id) => Some(id),
                        Err(_) => {
                            tracing::warn!(list = %list.name, segment = *s, "skipping unparsable reference");
                            None
                        }
                    })
                    .collect();
                (ListKind::IdRef, ids)
            } else if !segments.is_empty() && segments.iter().all(|s| !s.contains(NAME_DELIM)) {
                (ListKind::NameOnly, Vec::new())
            } else {
                (ListKind::Plain, Vec::new())
            }
        };
        list.kind = kind;
        list.ref_ids = ref_ids;

        Ok(list)
    }

    fn parse_nested(text: &str, delimiter: char) -> Self {
        let mut pieces: Vec<&str> = text.split(delimiter).collect();
        pieces.pop();

        let mut header: Option<&str> = None;
        let mut children = Vec::new();
        for piece in pieces {
            if piece.starts_with('/') || piece.trim().is_empty() {
                continue;
            }
            if header.is_none() {
                header = Some(piece);
                continue;
            }
            match ListCodec::parse(piece) {
                Ok(child) => children.push(child),
                Err(e) => tracing::warn!(line = piece, error = %e, "skipping malformed child list"),
            }
        }

        let header = header.unwrap_or_default();
        let (indent, name_pos) = scan_indent(header);
        let (name, desc) = split_header(&header[name_pos..]);

        Self {
            text: format!("{}{}", header, delimiter),
            name,
            desc,
            delimiter,
            indent,
            first_delim: header.len(),
            kind: ListKind::Nested,
            children,
            ref_ids: Vec::new(),
            index: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Advisory indent parsed from leading whitespace or digits.
    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    pub fn is_nested(&self) -> bool {
        self.kind == ListKind::Nested
    }

    pub fn children(&self) -> &[ListCodec] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&ListCodec> {
        self.children.iter().find(|c| c.name == name)
    }

    /// IDs held by an ID-reference list, in order.
    pub fn ref_ids(&self) -> &[usize] {
        &self.ref_ids
    }

    /// Raw entry segments after the header. Empty for nested lists.
    fn segments(&self) -> Vec<&str> {
        if self.is_nested() {
            return Vec::new();
        }
        let body = &self.text[self.first_delim + 1..];
        let body = body.strip_suffix(self.delimiter).unwrap_or(body);
        if body.is_empty() && self.text.len() == self.first_delim + 1 {
            return Vec::new();
        }
        body.split(self.delimiter).collect()
    }

    fn index(&self) -> &NameIndex {
        self.index.get_or_init(|| {
            let names: Vec<String> = if self.is_nested() {
                self.children.iter().map(|c| c.name.clone()).collect()
            } else {
                self.segments()
                    .into_iter()
                    .map(|s| entry_name(s).to_string())
                    .collect()
            };

            let mut joined = String::new();
            joined.push(self.delimiter);
            for (i, name) in names.iter().enumerate() {
                let _ = write!(joined, "{}{}{}{}", name, NAME_DELIM, i + 1, self.delimiter);
            }
            tracing::trace!(list = %self.name, count = names.len(), "built name index");
            NameIndex { joined, names }
        })
    }

    /// Number of entries (child lists for a nested list).
    pub fn count(&self) -> usize {
        self.index().names.len()
    }

    /// `|name:1|name:2|...` index of every entry.
    pub fn name_list(&self) -> &str {
        &self.index().joined
    }

    pub fn id_by_name(&self, name: &str) -> Option<usize> {
        self.index()
            .names
            .iter()
            .position(|n| n == name)
            .map(|p| p + 1)
    }

    pub fn name_by_id(&self, id: usize) -> Option<&str> {
        let names = &self.index().names;
        id.checked_sub(1)
            .and_then(|i| names.get(i))
            .map(String::as_str)
    }

    /// Byte position of the delimiter in front of entry `name`.
    fn entry_pos(&self, name: &str) -> Option<usize> {
        if self.is_nested() {
            return None;
        }
        let area = &self.text[self.first_delim..];
        let d = self.delimiter;
        area.find(&format!("{d}{name}{NAME_DELIM}"))
            .or_else(|| area.find(&format!("{d}{name}{d}")))
            .map(|p| p + self.first_delim)
    }

    fn entry_end(&self, pos: usize) -> usize {
        self.text[pos + 1..]
            .find(self.delimiter)
            .map_or(self.text.len() - 1, |p| p + pos + 1)
    }

    fn entry_at(&self, pos: usize) -> EntryView {
        let end = self.entry_end(pos);
        let id = self.text[self.first_delim..pos].matches(self.delimiter).count() + 1;
        EntryView::parse(&self.text[pos + 1..end], id)
    }

    pub fn entry(&self, name: &str) -> Option<EntryView> {
        self.entry_pos(name).map(|pos| self.entry_at(pos))
    }

    pub fn entry_by_id(&self, id: usize) -> Option<EntryView> {
        let segments = self.segments();
        let segment = id.checked_sub(1).and_then(|i| segments.get(i))?;
        Some(EntryView::parse(segment, id))
    }

    /// Raw description of a described entry, format annotation included.
    pub fn desc_of(&self, name: &str) -> Option<&str> {
        if self.is_nested() {
            return None;
        }
        let needle = format!("{}{}{}", self.delimiter, name, NAME_DELIM);
        let start = self.text[self.first_delim..].find(&needle)? + self.first_delim + needle.len();
        let end = self.text[start..].find(self.delimiter)? + start;
        Some(&self.text[start..end])
    }

    pub fn number_of(&self, name: &str) -> Option<f64> {
        self.desc_of(name).and_then(|d| d.trim().parse().ok())
    }

    /// Description with any leading format annotation removed.
    pub fn text_of(&self, name: &str) -> Option<&str> {
        let desc = self.desc_of(name)?;
        if desc.starts_with(FORMAT_START)
            && let Some(end) = desc.find(FORMAT_END)
        {
            return Some(&desc[end + 1..]);
        }
        Some(desc)
    }

    pub fn entry_by_desc(&self, desc: &str) -> Option<EntryView> {
        if self.is_nested() {
            return None;
        }
        let d = self.delimiter;
        let area = &self.text[self.first_delim..];

        if let Some(p) = area.find(&format!("{NAME_DELIM}{desc}{d}")) {
            let colon = p + self.first_delim;
            let start = self.text[..colon].rfind(d)?;
            return Some(self.entry_at(start));
        }
        area.find(&format!("{d}{desc}{d}"))
            .map(|p| self.entry_at(p + self.first_delim))
    }

    pub fn name_by_desc(&self, desc: &str) -> Option<String> {
        self.entry_by_desc(desc).map(|e| e.name().to_string())
    }

    /// Every entry in list order.
    pub fn entries(&self) -> Vec<EntryView> {
        self.segments()
            .into_iter()
            .enumerate()
            .map(|(i, s)| EntryView::parse(s, i + 1))
            .collect()
    }

    /// Entries for the given IDs, skipping IDs out of range.
    pub fn entries_by_ids(&self, ids: &[usize]) -> Vec<EntryView> {
        ids.iter().filter_map(|&id| self.entry_by_id(id)).collect()
    }

    /// Entries ordered by description; equal descriptions keep list order.
    pub fn sorted_entries(&self) -> Vec<EntryView> {
        let mut entries = self.entries();
        entries.sort_by(|a, b| a.desc().cmp(b.desc()));
        entries
    }

    /// One line per ID as produced by [`EntryView::to_line`]; missing IDs
    /// give empty lines.
    pub fn lines(&self, ids: &[usize], delim: Option<char>) -> Vec<String> {
        ids.iter()
            .map(|&id| {
                self.entry_by_id(id)
                    .map(|e| e.to_line(delim))
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Entries of this list named by an ID-reference list.
    pub fn resolve_refs(&self, refs: &ListCodec) -> Option<Vec<EntryView>> {
        (refs.kind == ListKind::IdRef).then(|| self.entries_by_ids(&refs.ref_ids))
    }

    /// Build an ID-reference list named after this list.
    pub fn to_ref_list(&self, ids: &[usize]) -> Result<ListCodec, ListError> {
        let d = if self.is_nested() {
            PRIME_DELIM
        } else {
            self.delimiter
        };
        let mut text = format!("{}{}", self.name, d);
        for id in ids {
            let _ = write!(text, "{}{}", id, d);
        }
        ListCodec::parse_with_delimiter(&text, Some(d))
    }

    fn reparse(&mut self, text: &str, delimiter: char) -> Result<(), ListError> {
        *self = Self::parse_with_delimiter(text, Some(delimiter))?;
        tracing::debug!(list = %self.name, len = self.text.len(), "re-parsed list");
        Ok(())
    }

    /// Replace, append or (with `delete`) remove the entry named like
    /// `entry`.
    ///
    /// Returns false only when deleting an entry that does not exist.
    pub fn update(&mut self, entry: &EntryView, delete: bool) -> Result<bool, ListError> {
        if self.is_nested() {
            return Err(ListError::NestedList {
                name: self.name.clone(),
            });
        }

        let d = self.delimiter;
        let segment = entry.to_entry_string();
        let invalid = |reason: &str| ListError::InvalidEntry {
            entry: segment.clone(),
            reason: reason.to_string(),
        };
        if entry.name().is_empty() {
            return Err(invalid("empty name"));
        }
        if entry.name().contains(NAME_DELIM) {
            return Err(invalid("name contains ':'"));
        }
        if segment.contains(d) {
            return Err(invalid("entry contains the list delimiter"));
        }

        let text = match self.entry_pos(entry.name()) {
            Some(pos) => {
                let end = self.entry_end(pos);
                if delete {
                    format!("{}{}", &self.text[..pos], &self.text[end..])
                } else {
                    format!("{}{}{}", &self.text[..=pos], segment, &self.text[end..])
                }
            }
            None if delete => return Ok(false),
            None => format!("{}{}{}", self.text, segment, d),
        };

        self.reparse(&text, d)?;
        Ok(true)
    }

    /// Delete an entry by name. Missing names are a no-op.
    pub fn remove(&mut self, name: &str) -> Result<bool, ListError> {
        self.update(&EntryView::new(name, ""), true)
    }

    /// Swap an entry with its predecessor (`dir <= 0`) or successor
    /// (`dir > 0`). Returns false at the list boundaries or when the name
    /// is absent.
    pub fn bubble(&mut self, name: &str, dir: i32) -> Result<bool, ListError> {
        if self.is_nested() {
            let Some(i) = self.children.iter().position(|c| c.name == name) else {
                return Ok(false);
            };
            let other = if dir <= 0 {
                i.checked_sub(1)
            } else {
                Some(i + 1).filter(|&j| j < self.children.len())
            };
            let Some(j) = other else {
                return Ok(false);
            };
            self.children.swap(i, j);
            self.index = OnceLock::new();
            return Ok(true);
        }

        let Some(pos) = self.entry_pos(name) else {
            return Ok(false);
        };
        let d = self.delimiter;
        let t = &self.text;
        let end = self.entry_end(pos);

        let text = if dir <= 0 {
            let Some(start) = t[..pos].rfind(d).filter(|_| pos > self.first_delim) else {
                return Ok(false);
            };
            format!("{}{}{}{}", &t[..start], &t[pos..end], &t[start..pos], &t[end..])
        } else {
            let Some(next_end) = t[end + 1..].find(d).map(|p| p + end + 1) else {
                return Ok(false);
            };
            format!("{}{}{}{}", &t[..pos], &t[end..next_end], &t[pos..end], &t[next_end..])
        };

        self.reparse(&text, d)?;
        Ok(true)
    }

    /// Merge the entries of `other` into this list.
    ///
    /// A described entry replaces the same-named entry; a bare name already
    /// present is left alone; anything unmatched is appended. Returns true
    /// when the text changed.
    pub fn merge(&mut self, other: &ListCodec) -> Result<bool, ListError> {
        for list in [&*self, other] {
            if list.is_nested() {
                return Err(ListError::NestedList {
                    name: list.name.clone(),
                });
            }
        }

        let d = self.delimiter;
        let body = self.text.strip_suffix(d).unwrap_or(&self.text);
        let mut dest: Vec<String> = body.split(d).map(str::to_string).collect();
        let mut changed = false;

        for add in other.segments() {
            if add.is_empty() {
                continue;
            }
            if add.contains(d) {
                tracing::warn!(entry = add, "skipping merged entry containing the delimiter");
                continue;
            }
            let (name, replacer) = match add.split_once(NAME_DELIM) {
                Some((name, _)) => (name, true),
                None => (add, false),
            };
            let described = format!("{}{}", name, NAME_DELIM);

            let matched = dest
                .iter()
                .skip(1)
                .position(|e| e == name || e.starts_with(&described))
                .map(|p| p + 1);
            match matched {
                Some(j) => {
                    if (replacer || dest[j] == name) && dest[j] != add {
                        dest[j] = add.to_string();
                        changed = true;
                    }
                }
                None => {
                    dest.push(add.to_string());
                    changed = true;
                }
            }
        }

        if changed {
            let mut text = dest.join(&d.to_string());
            text.push(d);
            self.reparse(&text, d)?;
        }
        Ok(changed)
    }

    /// Switch to a different delimiter throughout the text.
    ///
    /// The new delimiter may not be alphanumeric, a space, one of
    /// `: [ ] = , . - + /`, or already present in the text, and it must keep
    /// the list flat or nested as it is. A delimiter other than `|` is not
    /// found by [`ListCodec::parse`]; reload the text with
    /// [`ListCodec::parse_with_delimiter`] or through [`ListCodec::to_record`].
    pub fn set_delimiter(&mut self, new: char) -> Result<(), ListError> {
        if new == self.delimiter {
            return Ok(());
        }
        let reject = |reason: &str| {
            Err(ListError::InvalidDelimiter {
                delimiter: new,
                reason: reason.to_string(),
            })
        };

        if new.is_alphanumeric() || new == ' ' || ":[]=,.-+/".contains(new) {
            return reject("reserved character");
        }
        if is_nested_delimiter(new) != self.is_nested() {
            return reject("would switch between flat and nested layout");
        }
        if is_nested_delimiter(new) && !is_delimiter(new) {
            return reject("only TAB, LF, VT and FF separate nested lists");
        }

        let current = self.to_string();
        if current.contains(new) {
            return reject("already present in the list text");
        }
        let text = current.replace(self.delimiter, &new.to_string());
        self.reparse(&text, new)
    }

    /// Store as a record with the canonical text in its `data` field.
    ///
    /// A delimiter set with [`ListCodec::set_delimiter`] is kept in the
    /// `delim` field so [`ListCodec::from_record`] can read the text back.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new(LIST_RECORD_TYPE, "");
        record
            .add("name", self.name.as_str())
            .add("desc", self.desc.as_str())
            .add("data", self.to_string());
        if !is_delimiter(self.delimiter) {
            record.add(DELIM_FIELD, self.delimiter.to_string());
        }
        record
    }

    pub fn from_record(record: &Record) -> Result<Self, ListError> {
        let data = record.text("data").ok_or(ListError::MissingData)?;
        let hint = record.text(DELIM_FIELD).and_then(|d| d.chars().next());
        Self::parse_with_delimiter(data, hint)
    }

    /// Constant declarations for every entry, sorted by description, with a
    /// comment per formatted entry.
    pub fn to_defines(&self) -> String {
        let prefix = const_ident(&self.name);
        let mut out = String::new();
        let _ = writeln!(
            out,
            "// {}{}{} = {:?}",
            self.name,
            NAME_DELIM,
            self.desc,
            self.to_string()
        );

        let entries = self.sorted_entries();
        for entry in &entries {
            let _ = writeln!(
                out,
                "pub const {}_{}: usize = {};",
                prefix,
                const_ident(entry.name()),
                entry.id()
            );
        }
        for entry in &entries {
            if let Some(format) = entry.format() {
                let _ = write!(out, "//\t{} ~{}", entry.name(), format.kind_char());
                if !format.suffix().is_empty() {
                    let _ = write!(out, " Str={:?}", format.suffix());
                }
                if let Some(value) = format.value_text() {
                    let _ = write!(out, " Value={:?}", value);
                }
                out.push('\n');
            }
        }
        out
    }

    /// Indented tree of this list and its children.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        let _ = writeln!(
            out,
            "{:width$}{} ({}) indent={} kind={:?} count={}",
            "",
            self.name,
            self.desc,
            self.indent,
            self.kind,
            self.count(),
            width = depth * 3
        );
        for child in &self.children {
            child.dump_into(out, depth + 1);
        }
    }
}

impl fmt::Display for ListCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)?;
        for child in &self.children {
            write!(f, "{}{}", child, self.delimiter)?;
        }
        Ok(())
    }
}

impl PartialEq for ListCodec {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl std::str::FromStr for ListCodec {
    type Err = ListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn no_delimiter(input: &str) -> ListError {
    ListError::NoDelimiter {
        text: input.chars().take(40).collect(),
    }
}

/// Leading indent and the byte offset where the name starts.
fn scan_indent(text: &str) -> (usize, usize) {
    let bytes = text.as_bytes();
    match bytes.first() {
        Some(b' ' | b'\t') => {
            let n = bytes
                .iter()
                .take_while(|b| matches!(b, b' ' | b'\t'))
                .count();
            (n, n)
        }
        Some(d) if d.is_ascii_digit() => {
            let first = (d - b'0') as usize;
            match bytes.get(1) {
                Some(e) if e.is_ascii_digit() => (first * 10 + (e - b'0') as usize, 2),
                _ => (first, 1),
            }
        }
        _ => (0, 0),
    }
}

fn split_header(header: &str) -> (String, String) {
    match header.split_once(NAME_DELIM) {
        Some((name, desc)) => (name.to_string(), desc.to_string()),
        None => {
            let end = header.find(|c: char| c <= ' ').unwrap_or(header.len());
            let name = header[..end].to_string();
            (name.clone(), name)
        }
    }
}

fn entry_name(segment: &str) -> &str {
    segment
        .split_once(NAME_DELIM)
        .map_or(segment, |(name, _)| name)
}

fn const_ident(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}
