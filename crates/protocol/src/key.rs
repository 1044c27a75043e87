use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered tuple naming a cached view, e.g. `["project-ingestion", "get-summary", task_id]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvalidationKey(Vec<String>);

impl InvalidationKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// True when every segment of `self` matches the leading segments of `other`.
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.0.len() >= self.0.len() && self.0.iter().zip(&other.0).all(|(a, b)| a == b)
    }
}

impl fmt::Display for InvalidationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::InvalidationKey;

    #[test]
    fn prefix_matches_leading_segments() {
        let scope = InvalidationKey::new(["project-ingestion", "get-summary"]);
        let full = InvalidationKey::new(["project-ingestion", "get-summary", "t-1"]);
        assert!(scope.is_prefix_of(&full));
        assert!(full.is_prefix_of(&full));
        assert!(!full.is_prefix_of(&scope));
        assert!(!InvalidationKey::new(["status"]).is_prefix_of(&full));
    }

    #[test]
    fn display_lists_segments() {
        let key = InvalidationKey::new(["a", "b", "c"]);
        assert_eq!(key.to_string(), "[a, b, c]");
    }
}
