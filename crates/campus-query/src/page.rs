//! The paginate stage.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QueryError, Result};

/// Which page to show and how large pages are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    /// Records per page. Must be at least 1.
    pub size: usize,
    /// 1-based page number.
    #[serde(default = "first_page")]
    pub number: usize,
}

fn first_page() -> usize {
    1
}

impl PageRequest {
    pub fn new(size: usize, number: usize) -> Self {
        PageRequest { size, number }
    }

    /// The first page of the given size.
    pub fn first(size: usize) -> Self {
        PageRequest::new(size, 1)
    }

    pub fn validate(&self) -> Result<()> {
        page_size(self.size).map(|_| ())
    }
}

pub(crate) fn page_size(size: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(size).ok_or(QueryError::InvalidPageSize)
}

/// One page of a record sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    /// Records on this page. Empty when the page number is out of range.
    pub records: &'a [T],
    /// The requested 1-based page number.
    pub page_number: usize,
    pub page_size: usize,
    /// Always at least 1, even for empty input.
    pub total_pages: usize,
    /// Length of the whole sequence.
    pub total_count: usize,
}

impl<'a, T> Page<'a, T> {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn has_prev(&self) -> bool {
        self.page_number > 1
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }

    pub fn iter(&self) -> std::slice::Iter<'a, T> {
        self.records.iter()
    }

    /// 1-based inclusive positions of this page's records within the whole
    /// sequence ("Showing 11 to 20 of 45"). `None` for an empty page.
    pub fn span(&self) -> Option<(usize, usize)> {
        if self.records.is_empty() {
            return None;
        }
        let first = (self.page_number - 1) * self.page_size + 1;
        Some((first, first + self.records.len() - 1))
    }
}

impl<'a, T> IntoIterator for &Page<'a, T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Slices out one page of `records`.
///
/// Page numbers are 1-based. A page number of 0 or past the last page
/// yields an empty page with the same totals. A page size of 0 is an error.
///
/// # Example
///
/// ```
/// use campus_query::paginate;
///
/// let ids: Vec<u32> = (1..=45).collect();
/// let page = paginate(&ids, 10, 5).unwrap();
///
/// assert_eq!(page.records, &[41, 42, 43, 44, 45]);
/// assert_eq!(page.total_pages, 5);
/// assert_eq!(page.span(), Some((41, 45)));
/// ```
pub fn paginate<T>(records: &[T], page_size: usize, page_number: usize) -> Result<Page<'_, T>> {
    Ok(page_of(records, self::page_size(page_size)?, page_number))
}

/// Pagination once the page size is known to be valid.
pub(crate) fn page_of<T>(records: &[T], size: NonZeroUsize, page_number: usize) -> Page<'_, T> {
    let total_count = records.len();
    let total_pages = total_count.div_ceil(size.get()).max(1);

    let slice = match page_number.checked_sub(1) {
        Some(index) if page_number <= total_pages => {
            let start = index.saturating_mul(size.get()).min(total_count);
            let end = start.saturating_add(size.get()).min(total_count);
            &records[start..end]
        }
        _ => &records[..0],
    };

    debug!(
        total = total_count,
        page = page_number,
        size = size.get(),
        pages = total_pages,
        "paginate"
    );
    Page {
        records: slice,
        page_number,
        page_size: size.get(),
        total_pages,
        total_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_and_last_pages() {
        let items: Vec<i32> = (1..=25).collect();
        let first = paginate(&items, 10, 1).unwrap();
        assert_eq!(first.records, &items[0..10]);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next());
        assert!(!first.has_prev());

        let last = paginate(&items, 10, 3).unwrap();
        assert_eq!(last.records, &items[20..25]);
        assert!(!last.has_next());
        assert!(last.has_prev());
    }

    #[test]
    fn empty_input_has_one_page() {
        let items: Vec<i32> = Vec::new();
        let page = paginate(&items, 10, 1).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_count, 0);
        assert_eq!(page.span(), None);
    }

    #[test]
    fn out_of_range_pages_are_empty() {
        let items: Vec<i32> = (1..=5).collect();
        for number in [0, 2, 99, usize::MAX] {
            let page = paginate(&items, 5, number).unwrap();
            assert!(page.is_empty(), "page {number} should be empty");
            assert_eq!(page.total_pages, 1);
            assert_eq!(page.total_count, 5);
        }
    }

    #[test]
    fn zero_page_size_is_an_error() {
        let items = [1, 2, 3];
        assert_eq!(paginate(&items, 0, 1), Err(QueryError::InvalidPageSize));
        assert_eq!(
            PageRequest::first(0).validate(),
            Err(QueryError::InvalidPageSize)
        );
    }

    #[test]
    fn exact_multiple() {
        let items: Vec<i32> = (1..=20).collect();
        let page = paginate(&items, 10, 2).unwrap();
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.span(), Some((11, 20)));
    }

    #[test]
    fn huge_page_size() {
        let items: Vec<i32> = (1..=3).collect();
        let page = paginate(&items, usize::MAX, 1).unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn request_defaults_to_first_page() {
        let request: PageRequest = serde_json::from_str(r#"{"size": 8}"#).unwrap();
        assert_eq!(request, PageRequest::first(8));
    }
}
