use crate::CollectError;

/// One fetched page of a remote collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub is_last: bool,
}

impl<T> Page<T> {
    pub const fn new(items: Vec<T>, is_last: bool) -> Self {
        Self { items, is_last }
    }

    pub const fn last(items: Vec<T>) -> Self {
        Self::new(items, true)
    }
}

/// Outcome of walking a paginated collection.
///
/// `truncated` is set only when an error stopped the walk after at least one
/// page succeeded; a failure on the very first page leaves it `false` with
/// `error` populated. Consumers must present a truncated result as partial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionResult<T> {
    pub items: Vec<T>,
    pub truncated: bool,
    pub error: Option<CollectError>,
}

impl<T> CollectionResult<T> {
    pub const fn complete(items: Vec<T>) -> Self {
        Self {
            items,
            truncated: false,
            error: None,
        }
    }

    pub const fn is_complete(&self) -> bool {
        !self.truncated && self.error.is_none()
    }
}
