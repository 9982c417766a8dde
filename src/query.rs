//! The query-builder boundary.
//!
//! A query request is an ordinary [`Record`]. Its control fields say what
//! to do (`!Q`), where (`!T` or `Table`) and to which row (`!I` or `!ID`);
//! every other named field is a column/value pair. Turning that request
//! into SQL and running it belongs to a [`QueryBuilder`] and a
//! [`QueryExecutor`] supplied by the host application.

use std::fmt;

use crate::pack::{Field, FieldValue, Record};

/// Operation kind, and after building, the SQL text.
pub const QUERY_FIELD: &str = "!Q";
pub const TABLE_FIELD: &str = "!T";
pub const TABLE_FIELD_LONG: &str = "Table";
pub const ID_FIELD: &str = "!I";
pub const ID_FIELD_LONG: &str = "!ID";
/// Set on a reply when the peer could not run the request.
pub const ERROR_FIELD: &str = "!E";

/// What a request asks the store to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl QueryKind {
    pub fn as_char(self) -> char {
        match self {
            QueryKind::Select => 'S',
            QueryKind::Insert => 'I',
            QueryKind::Update => 'U',
            QueryKind::Delete => 'D',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'S' => Some(QueryKind::Select),
            'I' => Some(QueryKind::Insert),
            'U' => Some(QueryKind::Update),
            'D' => Some(QueryKind::Delete),
            _ => None,
        }
    }

    /// Reads the kind from a request's `!Q` field. Only a one-letter `!Q`
    /// names a kind; anything longer is already SQL.
    pub fn of_request(request: &Record) -> Option<Self> {
        let text = request.text(QUERY_FIELD)?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
    }

    /// Selects and deletes answer with rows; inserts and updates answer
    /// with a status.
    pub fn returns_rows(self) -> bool {
        matches!(self, QueryKind::Select | QueryKind::Delete)
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

fn table_and_kind(table: &str, id: i64, kind: QueryKind) -> Record {
    let mut record = Record::default();
    record
        .add(TABLE_FIELD, table)
        .add(ID_FIELD, id)
        .add(QUERY_FIELD, kind.as_char().to_string());
    record
}

/// A request for the rows of `table`, or just row `id` when it is non-zero.
pub fn select(table: &str, id: i64) -> Record {
    table_and_kind(table, id, QueryKind::Select)
}

/// A request deleting row `id` of `table`, or every row when `id` is zero.
pub fn delete(table: &str, id: i64) -> Record {
    table_and_kind(table, id, QueryKind::Delete)
}

/// Marks `record` as an update when it names a row, an insert otherwise.
pub fn save(record: &mut Record) -> QueryKind {
    let kind = if row_id(record).is_some() {
        QueryKind::Update
    } else {
        QueryKind::Insert
    };
    record.add(QUERY_FIELD, kind.as_char().to_string());
    kind
}

/// The table a request targets.
pub fn table(request: &Record) -> Option<&str> {
    request
        .text(TABLE_FIELD)
        .or_else(|| request.text(TABLE_FIELD_LONG))
        .filter(|t| !t.is_empty())
}

/// The non-zero row id a request targets.
pub fn row_id(request: &Record) -> Option<i64> {
    request
        .number(ID_FIELD)
        .or_else(|| request.number(ID_FIELD_LONG))
        .filter(|n| n.is_finite() && *n != 0.0)
        .map(|n| n as i64)
}

/// The column/value fields of a request: every field that is not a
/// `!`-prefixed control or the `#` sequence stamp.
pub fn columns(request: &Record) -> impl Iterator<Item = &Field> {
    request
        .fields()
        .filter(|f| !f.name().starts_with('!') && f.name() != "#" && f.name() != TABLE_FIELD_LONG)
}

/// Wraps a query string into a request record.
///
/// `S|SELECT 1` becomes a field `!S` holding `SELECT 1`; text without a
/// short alphanumeric `Kind|` prefix goes into `!Q`.
pub fn text_request(text: &str) -> Record {
    let (name, body) = match text.split_once('|') {
        Some((kind, body)) if is_kind_tag(kind.trim_start_matches('!')) => {
            (format!("!{}", kind.trim_start_matches('!')), body)
        }
        _ => (QUERY_FIELD.to_string(), text),
    };
    let mut record = Record::default();
    record.add(name, body);
    record
}

fn is_kind_tag(kind: &str) -> bool {
    !kind.is_empty() && kind.len() <= 8 && kind.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Turns a request into SQL.
///
/// Implementations write the SQL text into `!Q` and return the positional
/// parameters the SQL expects, in order.
pub trait QueryBuilder {
    fn build(&self, request: &mut Record) -> Result<Vec<FieldValue>, String>;
}

/// What running one statement produced.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// One record per result row.
    Rows(Vec<Record>),
    /// Status fields, such as a change count or the inserted row id.
    Status(Record),
}

/// Runs SQL against the store.
pub trait QueryExecutor {
    fn execute(
        &self,
        kind: Option<QueryKind>,
        sql: &str,
        params: &[FieldValue],
    ) -> Result<QueryOutcome, String>;
}

impl<B: QueryBuilder + ?Sized> QueryBuilder for &B {
    fn build(&self, request: &mut Record) -> Result<Vec<FieldValue>, String> {
        (**self).build(request)
    }
}

impl<E: QueryExecutor + ?Sized> QueryExecutor for &E {
    fn execute(
        &self,
        kind: Option<QueryKind>,
        sql: &str,
        params: &[FieldValue],
    ) -> Result<QueryOutcome, String> {
        (**self).execute(kind, sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_chars() {
        for kind in [
            QueryKind::Select,
            QueryKind::Insert,
            QueryKind::Update,
            QueryKind::Delete,
        ] {
            assert_eq!(QueryKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(QueryKind::from_char('s'), Some(QueryKind::Select));
        assert_eq!(QueryKind::from_char('X'), None);
    }

    #[test]
    fn test_row_returning_kinds() {
        assert!(QueryKind::Select.returns_rows());
        assert!(QueryKind::Delete.returns_rows());
        assert!(!QueryKind::Insert.returns_rows());
        assert!(!QueryKind::Update.returns_rows());
    }

    #[test]
    fn test_select_request() {
        let request = select("S", 7);
        assert_eq!(request.text(QUERY_FIELD), Some("S"));
        assert_eq!(table(&request), Some("S"));
        assert_eq!(row_id(&request), Some(7));
        assert_eq!(QueryKind::of_request(&request), Some(QueryKind::Select));
        assert!(request.data_fields().is_empty());
    }

    #[test]
    fn test_delete_all_has_no_row() {
        let request = delete("Tiles", 0);
        assert_eq!(row_id(&request), None);
        assert_eq!(QueryKind::of_request(&request), Some(QueryKind::Delete));
    }

    #[test]
    fn test_save_picks_insert_or_update() {
        let mut record = Record::default();
        record.add(TABLE_FIELD, "Lists").add("name", "Ev");
        assert_eq!(save(&mut record), QueryKind::Insert);
        assert_eq!(record.text(QUERY_FIELD), Some("I"));

        record.add(ID_FIELD_LONG, 12);
        assert_eq!(save(&mut record), QueryKind::Update);
        assert_eq!(record.text(QUERY_FIELD), Some("U"));
    }

    #[test]
    fn test_long_table_field() {
        let mut record = Record::default();
        record.add(TABLE_FIELD_LONG, "Lists");
        assert_eq!(table(&record), Some("Lists"));
    }

    #[test]
    fn test_columns_skip_controls() {
        let mut record = select("Lists", 3);
        record.add("name", "Ev").add("desc", "Event").add("#", 5);
        let names: Vec<&str> = columns(&record).map(Field::name).collect();
        assert_eq!(names, vec!["name", "desc"]);
    }

    #[test]
    fn test_sql_in_query_field_has_no_kind() {
        let request = text_request("SELECT 1");
        assert_eq!(request.text(QUERY_FIELD), Some("SELECT 1"));
        assert_eq!(QueryKind::of_request(&request), None);
    }

    #[test]
    fn test_text_request_kind_prefix() {
        let request = text_request("!List|Ev");
        assert_eq!(request.text("!List"), Some("Ev"));

        let request = text_request("S|SELECT * FROM T;");
        assert_eq!(request.text("!S"), Some("SELECT * FROM T;"));

        let request = text_request("SELECT a || b FROM T;");
        assert_eq!(request.text(QUERY_FIELD), Some("SELECT a || b FROM T;"));
        assert_eq!(request.len(), 1);
    }
}
