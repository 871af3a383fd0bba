use crate::types::ColumnType;
use std::borrow::Cow;
use std::fmt;

/// Predicate deciding whether a normalized cell parses as a candidate type
pub type ParsePredicate = fn(&str) -> bool;

/// A candidate type with its acceptance test
#[derive(Clone, Copy)]
pub struct Candidate {
    pub column_type: ColumnType,
    pub accepts: ParsePredicate,
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Candidate").field(&self.column_type).finish()
    }
}

impl Candidate {
    pub fn for_type(column_type: ColumnType) -> Self {
        let accepts: ParsePredicate = match column_type {
            ColumnType::Text => accepts_text,
            ColumnType::Real => accepts_real,
            ColumnType::Integer => accepts_integer,
        };
        Candidate {
            column_type,
            accepts,
        }
    }
}

/// Ordered candidate types. The later a type appears, the more it wins ties.
#[derive(Debug, Clone)]
pub struct CandidateTypes {
    candidates: Vec<Candidate>,
}

impl CandidateTypes {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        CandidateTypes { candidates }
    }

    /// Build from type names in priority order, using the built-in predicates
    pub fn from_types(types: &[ColumnType]) -> Self {
        Self::new(types.iter().copied().map(Candidate::for_type).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn types(&self) -> Vec<ColumnType> {
        self.candidates.iter().map(|c| c.column_type).collect()
    }
}

impl Default for CandidateTypes {
    /// text, real, integer: integer wins only when every sample is an integer
    fn default() -> Self {
        Self::from_types(&[ColumnType::Text, ColumnType::Real, ColumnType::Integer])
    }
}

fn accepts_text(_cell: &str) -> bool {
    true
}

fn accepts_real(cell: &str) -> bool {
    cell.parse::<f64>().is_ok()
}

fn accepts_integer(cell: &str) -> bool {
    cell.parse::<i64>().is_ok()
}

/// Parse-assist transform applied before the candidate predicates.
///
/// Cells containing a comma lose every comma, and gain an `E0` suffix when no
/// exponent marker is left, so `"1,234"` is tested as `"1234E0"`. Cells
/// without commas are returned unchanged. The stored value is never affected.
pub fn normalize_numeric(cell: &str) -> Cow<'_, str> {
    if !cell.contains(',') {
        return Cow::Borrowed(cell);
    }

    let mut stripped = cell.replace(',', "");
    if !stripped.contains(['E', 'e']) {
        stripped.push_str("E0");
    }
    Cow::Owned(stripped)
}
