use std::fmt;

use crate::terms::TermSequence;

/// Two terms looked up together in relation mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermPair {
    pub first: String,
    pub second: String,
}

impl TermPair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Query string sent to the single-pair relation endpoint.
    pub fn query(&self) -> String {
        format!("{},{}", self.first, self.second)
    }
}

impl fmt::Display for TermPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ↔ {}", self.first, self.second)
    }
}

/// Group terms into consecutive non-overlapping pairs: `(0,1), (2,3), …`.
///
/// The caller has already checked that the count is even; a trailing
/// unpaired term would be ignored.
pub fn pair_adjacent(terms: &TermSequence) -> Vec<TermPair> {
    terms
        .as_slice()
        .chunks_exact(2)
        .map(|chunk| TermPair::new(chunk[0].clone(), chunk[1].clone()))
        .collect()
}
