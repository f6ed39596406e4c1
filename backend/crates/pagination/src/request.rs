//! Bounded page requests.

use crate::{PaginationError, Sort, SortKey};

/// Default and maximum page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    default_size: u32,
    max_size: u32,
}

impl PageLimits {
    /// Page size used when the caller omits `size`.
    pub const DEFAULT_SIZE: u32 = 20;
    /// Largest page a caller may request.
    pub const MAX_SIZE: u32 = 100;

    /// Build limits, keeping `1 <= default_size <= max_size`.
    #[must_use]
    pub fn new(default_size: u32, max_size: u32) -> Self {
        let max = max_size.max(1);
        Self {
            default_size: default_size.clamp(1, max),
            max_size: max,
        }
    }

    /// Page size applied when none is requested.
    #[must_use]
    pub const fn default_size(&self) -> u32 {
        self.default_size
    }

    /// Upper bound applied to requested sizes.
    #[must_use]
    pub const fn max_size(&self) -> u32 {
        self.max_size
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE, Self::MAX_SIZE)
    }
}

/// A validated zero-based page request with a total ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest<K> {
    page: u32,
    size: u32,
    sort: Sort<K>,
}

impl<K: SortKey> PageRequest<K> {
    /// Compose a request from raw query parameters.
    ///
    /// Missing `page` means the first page; missing `size` means the default
    /// size; sizes above the maximum are clamped to it.
    ///
    /// # Errors
    /// Returns [`PaginationError`] for a negative page, a size below one or
    /// an unknown sort field.
    pub fn compose(
        page: Option<i64>,
        size: Option<i64>,
        sort: Option<&str>,
        limits: PageLimits,
    ) -> Result<Self, PaginationError> {
        let page_index = match page {
            None => 0,
            Some(value) if value < 0 => return Err(PaginationError::NegativePage { page: value }),
            Some(value) => u32::try_from(value).unwrap_or(u32::MAX),
        };
        let page_size = match size {
            None => limits.default_size(),
            Some(value) if value < 1 => return Err(PaginationError::SizeTooSmall { size: value }),
            Some(value) => u32::try_from(value)
                .unwrap_or(u32::MAX)
                .min(limits.max_size()),
        };
        Ok(Self {
            page: page_index,
            size: page_size,
            sort: Sort::parse(sort)?,
        })
    }

    /// First page of the default size in identity order.
    #[must_use]
    pub fn first(limits: PageLimits) -> Self {
        Self {
            page: 0,
            size: limits.default_size(),
            sort: Sort::identity(),
        }
    }

    /// Zero-based page index.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size after clamping.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Resolved sort.
    #[must_use]
    pub const fn sort(&self) -> &Sort<K> {
        &self.sort
    }

    /// Number of rows preceding this page.
    #[must_use]
    pub fn offset(&self) -> usize {
        let rows = u64::from(self.page).saturating_mul(u64::from(self.size));
        usize::try_from(rows).unwrap_or(usize::MAX)
    }
}

/// Normalise an optional text filter: blank values mean "no filter".
///
/// ```
/// assert_eq!(pagination::filter_value(Some("  ")), None);
/// assert_eq!(pagination::filter_value(Some(" ENG ")), Some("ENG".to_owned()));
/// ```
#[must_use]
pub fn filter_value<S: AsRef<str>>(raw: Option<S>) -> Option<String> {
    raw.and_then(|value| {
        let trimmed = value.as_ref().trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    })
}

#[cfg(test)]
mod tests {
    //! Bounds and defaults for page requests.

    use super::*;
    use crate::Direction;
    use rstest::rstest;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Field {
        Id,
    }

    impl SortKey for Field {
        const IDENTITY: Self = Self::Id;

        fn parse(field: &str) -> Option<Self> {
            (field == "id").then_some(Self::Id)
        }

        fn as_str(self) -> &'static str {
            "id"
        }
    }

    #[test]
    fn defaults_apply_when_parameters_are_missing() {
        let request = PageRequest::<Field>::compose(None, None, None, PageLimits::default())
            .expect("valid request");
        assert_eq!(request.page(), 0);
        assert_eq!(request.size(), PageLimits::DEFAULT_SIZE);
        assert_eq!(request.sort().direction(), Direction::Asc);
        assert_eq!(request.offset(), 0);
    }

    #[rstest]
    #[case::within(Some(50), 50)]
    #[case::at_max(Some(100), 100)]
    #[case::above_max(Some(5_000), 100)]
    #[case::huge(Some(i64::MAX), 100)]
    fn size_is_bounded(#[case] size: Option<i64>, #[case] expected: u32) {
        let request = PageRequest::<Field>::compose(Some(0), size, None, PageLimits::default())
            .expect("valid request");
        assert_eq!(request.size(), expected);
    }

    #[rstest]
    #[case::negative_page(Some(-1), Some(10), "page")]
    #[case::zero_size(Some(0), Some(0), "size")]
    #[case::negative_size(Some(0), Some(-4), "size")]
    fn rejects_out_of_range_values(
        #[case] page: Option<i64>,
        #[case] size: Option<i64>,
        #[case] parameter: &str,
    ) {
        let err = PageRequest::<Field>::compose(page, size, None, PageLimits::default())
            .expect_err("invalid request");
        assert_eq!(err.parameter(), parameter);
    }

    #[test]
    fn offset_multiplies_page_and_size() {
        let request = PageRequest::<Field>::compose(Some(3), Some(25), None, PageLimits::default())
            .expect("valid request");
        assert_eq!(request.offset(), 75);
    }

    #[test]
    fn limits_keep_default_within_max() {
        let limits = PageLimits::new(500, 50);
        assert_eq!(limits.default_size(), 50);
        assert_eq!(PageLimits::new(0, 0).max_size(), 1);
    }

    #[rstest]
    #[case::absent(None, None)]
    #[case::empty(Some(""), None)]
    #[case::blank(Some(" \t"), None)]
    #[case::trimmed(Some(" smith "), Some("smith"))]
    fn blank_filters_mean_no_filter(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
        assert_eq!(filter_value(raw).as_deref(), expected);
    }
}
