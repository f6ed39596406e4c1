//! Errors raised while composing a page request.

use thiserror::Error;

/// Rejections for page, size and sort parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// The zero-based page index was negative.
    #[error("page must not be negative (got {page})")]
    NegativePage {
        /// Value supplied by the caller.
        page: i64,
    },
    /// The page size was zero or negative.
    #[error("size must be at least 1 (got {size})")]
    SizeTooSmall {
        /// Value supplied by the caller.
        size: i64,
    },
    /// The sort field is not sortable for this collection.
    #[error("unknown sort field `{field}`")]
    UnknownSortField {
        /// Field name supplied by the caller.
        field: String,
    },
}

impl PaginationError {
    /// Query parameter the error refers to.
    #[must_use]
    pub const fn parameter(&self) -> &'static str {
        match self {
            Self::NegativePage { .. } => "page",
            Self::SizeTooSmall { .. } => "size",
            Self::UnknownSortField { .. } => "sort",
        }
    }
}
