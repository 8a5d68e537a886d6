//! Untyped rows as they come out of a tabular source.
//!
//! A `RawRecord` only lives for the hand-off between a source reader and the
//! normalizer. Column names are untrusted; lookups are exact on the trimmed
//! header text.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A single untyped cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Float(f64),
    Int(i64),
    Bool(bool),
    Empty,
}

impl RawValue {
    /// True for the values alias fallback skips over: absent cells, empty
    /// text and NaN. Zero and `false` are real values.
    pub fn is_empty_sentinel(&self) -> bool {
        match self {
            RawValue::Empty => true,
            RawValue::Text(s) => s.is_empty(),
            RawValue::Float(f) => f.is_nan(),
            RawValue::Int(_) | RawValue::Bool(_) => false,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => f.write_str(s),
            // Spreadsheets store whole numbers as floats; ids and postcodes
            // should not pick up a trailing ".0".
            RawValue::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{}", *v as i64)
            }
            RawValue::Float(v) => write!(f, "{}", v),
            RawValue::Int(v) => write!(f, "{}", v),
            RawValue::Bool(v) => write!(f, "{}", v),
            RawValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Float(v)
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Int(v)
    }
}

/// Column layout shared by every row of one source.
#[derive(Debug, Default)]
pub struct Header {
    positions: HashMap<String, usize>,
}

impl Header {
    /// Build from header cells. Blank names are dropped and the first column
    /// wins when a name repeats.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut positions = HashMap::new();
        for (idx, name) in names.into_iter().enumerate() {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            positions.entry(name.to_string()).or_insert(idx);
        }
        Self { positions }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// One row keyed by source column name.
#[derive(Debug, Clone)]
pub struct RawRecord {
    header: Arc<Header>,
    cells: Vec<RawValue>,
}

impl RawRecord {
    pub fn new(header: Arc<Header>, cells: Vec<RawValue>) -> Self {
        Self { header, cells }
    }

    /// Convenience constructor for ad-hoc rows.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<RawValue>,
    {
        let (names, cells): (Vec<String>, Vec<RawValue>) = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.into()))
            .unzip();
        Self::new(Arc::new(Header::new(names)), cells)
    }

    /// Value under `column`; `None` when the column does not exist or the
    /// row is shorter than the header.
    pub fn get(&self, column: &str) -> Option<&RawValue> {
        self.header
            .position(column)
            .and_then(|idx| self.cells.get(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sentinels() {
        assert!(RawValue::Empty.is_empty_sentinel());
        assert!(RawValue::Text(String::new()).is_empty_sentinel());
        assert!(RawValue::Float(f64::NAN).is_empty_sentinel());
        assert!(!RawValue::Text(" ".to_string()).is_empty_sentinel());
        assert!(!RawValue::Int(0).is_empty_sentinel());
        assert!(!RawValue::Float(0.0).is_empty_sentinel());
        assert!(!RawValue::Bool(false).is_empty_sentinel());
    }

    #[test]
    fn test_display_integral_float_has_no_fraction() {
        assert_eq!(RawValue::Float(12345.0).to_string(), "12345");
        assert_eq!(RawValue::Float(-3.0).to_string(), "-3");
        assert_eq!(RawValue::Float(51.5074).to_string(), "51.5074");
        assert_eq!(RawValue::Int(7).to_string(), "7");
        assert_eq!(RawValue::Bool(true).to_string(), "true");
        assert_eq!(RawValue::Empty.to_string(), "");
    }

    #[test]
    fn test_header_first_duplicate_wins_and_blanks_dropped() {
        let header = Header::new(["name", "", " Name ", "name"]);
        assert_eq!(header.position("name"), Some(0));
        assert_eq!(header.position("Name"), Some(2));
        assert_eq!(header.len(), 2);
    }

    #[test]
    fn test_get_short_row() {
        let header = Arc::new(Header::new(["a", "b", "c"]));
        let row = RawRecord::new(header, vec![RawValue::from("x")]);
        assert_eq!(row.get("a"), Some(&RawValue::from("x")));
        assert_eq!(row.get("c"), None);
        assert_eq!(row.get("missing"), None);
    }
}
