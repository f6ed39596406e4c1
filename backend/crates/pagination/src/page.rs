//! Serialisable page envelope.

use serde::{Deserialize, Serialize};

use crate::{PageRequest, SortKey};

/// One page of results plus the totals needed to navigate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Rows on this page.
    pub content: Vec<T>,
    /// Zero-based page index.
    pub page: u32,
    /// Requested page size.
    pub size: u32,
    /// Rows matching the query across all pages.
    pub total_elements: u64,
    /// Number of pages of `size` rows.
    pub total_pages: u64,
    /// Effective sort, for example `id,asc`.
    pub sort: String,
    /// Whether this is the first page.
    pub first: bool,
    /// Whether this is the last page.
    pub last: bool,
}

impl<T> Page<T> {
    /// Cut one page out of rows that are already filtered and sorted.
    pub fn paginate<K: SortKey>(rows: Vec<T>, request: &PageRequest<K>) -> Self {
        let total = u64::try_from(rows.len()).unwrap_or(u64::MAX);
        let size = usize::try_from(request.size()).unwrap_or(usize::MAX);
        let content = rows.into_iter().skip(request.offset()).take(size).collect();
        Self::from_parts(content, request, total)
    }

    /// Wrap a slice fetched elsewhere together with its overall total.
    pub fn from_parts<K: SortKey>(content: Vec<T>, request: &PageRequest<K>, total: u64) -> Self {
        let total_pages = total.div_ceil(u64::from(request.size()));
        let page = request.page();
        Self {
            content,
            page,
            size: request.size(),
            total_elements: total,
            total_pages,
            sort: request.sort().describe(),
            first: page == 0,
            last: u64::from(page).saturating_add(1) >= total_pages,
        }
    }

    /// Transform every row, keeping the paging metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            sort: self.sort,
            first: self.first,
            last: self.last,
        }
    }

    /// Replace the rows with an already transformed list.
    ///
    /// Used after a batch step that consumes the whole page at once.
    pub fn with_content<U>(self, content: Vec<U>) -> Page<U> {
        Page {
            content,
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            sort: self.sort,
            first: self.first,
            last: self.last,
        }
    }
}
