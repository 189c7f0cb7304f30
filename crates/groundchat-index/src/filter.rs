//! Document filter expressions.
//!
//! The wire syntax is `document_id in [id1,id2]`. An empty filter matches
//! nothing, which callers use to mean "no grounding".

use crate::error::{IndexError, IndexResult};
use std::str::FromStr;

/// The set of document ids a query or delete is scoped to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFilter {
    ids: Vec<String>,
}

impl DocumentFilter {
    pub fn new(ids: Vec<String>) -> Self {
        Self { ids }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl From<Vec<String>> for DocumentFilter {
    fn from(ids: Vec<String>) -> Self {
        Self::new(ids)
    }
}

impl std::fmt::Display for DocumentFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "document_id in [{}]", self.ids.join(","))
    }
}

impl FromStr for DocumentFilter {
    type Err = IndexError;

    fn from_str(s: &str) -> IndexResult<Self> {
        let s = s.trim();
        let rest = s
            .strip_prefix("document_id in [")
            .ok_or_else(|| IndexError::InvalidFilter(s.to_string()))?;
        let inner = rest
            .strip_suffix(']')
            .ok_or_else(|| IndexError::InvalidFilter(s.to_string()))?;

        let ids = inner
            .split(',')
            .map(|id| id.trim().trim_matches('\'').to_string())
            .filter(|id| !id.is_empty())
            .collect();

        Ok(Self { ids })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let filter = DocumentFilter::new(vec!["a".into(), "b".into()]);
        assert_eq!(filter.to_string(), "document_id in [a,b]");
    }

    #[test]
    fn test_round_trip() {
        let filter = DocumentFilter::new(vec!["d1".into(), "d2".into(), "d3".into()]);
        let parsed: DocumentFilter = filter.to_string().parse().unwrap();
        assert_eq!(parsed, filter);
    }

    #[test]
    fn test_parse_tolerates_spaces_and_quotes() {
        let parsed: DocumentFilter = "document_id in ['d1', 'd2']".parse().unwrap();
        assert_eq!(parsed.ids(), &["d1".to_string(), "d2".to_string()]);
    }

    #[test]
    fn test_parse_rejects_other_expressions() {
        let err = "user_id in [u1]".parse::<DocumentFilter>().unwrap_err();
        assert!(matches!(err, IndexError::InvalidFilter(_)));
    }

    #[test]
    fn test_empty_filter() {
        let parsed: DocumentFilter = "document_id in []".parse().unwrap();
        assert!(parsed.is_empty());
    }
}
