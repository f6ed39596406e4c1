//! Sort specification parsing and total ordering.

use std::cmp::Ordering;

use crate::PaginationError;

/// Sortable field set for one collection.
///
/// Implementors name the identity field used as the default order and as the
/// final tie breaker.
pub trait SortKey: Copy + Eq + Sized {
    /// Identity field; always sorted ascending as the last comparison.
    const IDENTITY: Self;

    /// Resolve an external field name such as `lastName`.
    fn parse(field: &str) -> Option<Self>;

    /// External field name used when echoing the sort back to callers.
    fn as_str(self) -> &'static str;
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl Direction {
    /// Parse a direction, defaulting to ascending for anything but `desc`.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    /// Lowercase label (`asc` or `desc`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Orient an ascending comparison result.
    #[must_use]
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// A resolved `<field>,<direction>` sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<K> {
    key: K,
    direction: Direction,
}

impl<K: SortKey> Sort<K> {
    /// Build a sort from its parts.
    #[must_use]
    pub const fn new(key: K, direction: Direction) -> Self {
        Self { key, direction }
    }

    /// Identity field ascending.
    #[must_use]
    pub const fn identity() -> Self {
        Self::new(K::IDENTITY, Direction::Asc)
    }

    /// Parse a `<field>,<asc|desc>` specification.
    ///
    /// A missing or blank specification yields [`Sort::identity`]. A missing
    /// or unrecognised direction yields ascending order.
    ///
    /// # Errors
    /// Returns [`PaginationError::UnknownSortField`] when the field is not
    /// sortable for this collection.
    pub fn parse(spec: Option<&str>) -> Result<Self, PaginationError> {
        let Some(raw) = spec.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(Self::identity());
        };
        let (field, direction) = raw.split_once(',').unwrap_or((raw, ""));
        let trimmed_field = field.trim();
        if trimmed_field.is_empty() {
            return Ok(Self::identity());
        }
        let key = K::parse(trimmed_field).ok_or_else(|| PaginationError::UnknownSortField {
            field: trimmed_field.to_owned(),
        })?;
        Ok(Self::new(key, Direction::parse_lenient(direction)))
    }

    /// Sorted field.
    #[must_use]
    pub const fn key(&self) -> K {
        self.key
    }

    /// Sort direction.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Compare two rows, breaking ties on the identity field ascending.
    ///
    /// `by_field` must return the ascending comparison of the two rows on
    /// the requested key.
    pub fn compare<T, F>(&self, left: &T, right: &T, by_field: F) -> Ordering
    where
        F: Fn(K, &T, &T) -> Ordering,
    {
        let primary = self.direction.apply(by_field(self.key, left, right));
        if self.key == K::IDENTITY {
            return primary;
        }
        primary.then_with(|| by_field(K::IDENTITY, left, right))
    }

    /// Echo form such as `lastName,desc`.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{},{}", self.key.as_str(), self.direction.as_str())
    }
}

impl<K: SortKey> Default for Sort<K> {
    fn default() -> Self {
        Self::identity()
    }
}
