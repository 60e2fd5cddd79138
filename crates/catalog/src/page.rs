//! Pagination over fully merged result sets.

use core::ops::Range;

use stocklookup_core::{DomainError, DomainResult};

/// 1-based page request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> DomainResult<Self> {
        if page == 0 {
            return Err(DomainError::validation("page must be >= 1"));
        }
        if page_size == 0 {
            return Err(DomainError::validation("page_size must be >= 1"));
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Index of the first item on this page. Saturates for absurd page numbers.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.page_size as usize)
    }

    /// `[(page-1)*page_size, page*page_size)` clamped to `len`.
    pub fn range_within(&self, len: usize) -> Range<usize> {
        let start = self.offset().min(len);
        let end = start.saturating_add(self.page_size as usize).min(len);
        start..end
    }
}

/// One page of a result set plus the size of the whole set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Size of the full (deduplicated) set this page was cut from.
    pub total_count: usize,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn empty(request: PageRequest) -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            page: request.page,
            page_size: request.page_size,
        }
    }

    /// Cut `request`'s window out of an already ordered collection.
    pub fn slice(all: Vec<T>, request: PageRequest) -> Self {
        let total_count = all.len();
        let range = request.range_within(total_count);
        let items = all
            .into_iter()
            .skip(range.start)
            .take(range.end - range.start)
            .collect();

        Self {
            items,
            total_count,
            page: request.page,
            page_size: request.page_size,
        }
    }

    pub fn total_pages(&self) -> usize {
        self.total_count.div_ceil(self.page_size.max(1) as usize)
    }

    pub fn has_more(&self) -> bool {
        (self.page as usize) < self.total_pages()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_rejects_zero_page_and_size() {
        assert!(PageRequest::new(0, 10).is_err());
        assert!(PageRequest::new(1, 0).is_err());
        assert!(PageRequest::new(1, 1).is_ok());
    }

    #[test]
    fn slice_cuts_requested_window() {
        let page = Page::slice((0..25).collect::<Vec<_>>(), PageRequest::new(3, 10).unwrap());
        assert_eq!(page.items, (20..25).collect::<Vec<_>>());
        assert_eq!(page.total_count, 25);
        assert_eq!(page.total_pages(), 3);
        assert!(!page.has_more());
    }

    #[test]
    fn slice_past_the_end_is_empty_but_keeps_total() {
        let page = Page::slice(vec!['a', 'b'], PageRequest::new(7, 10).unwrap());
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 2);
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let req = PageRequest::new(u32::MAX, u32::MAX).unwrap();
        assert_eq!(req.range_within(5), 5..5);
    }

    #[test]
    fn empty_page_echoes_request() {
        let page: Page<u8> = Page::empty(PageRequest::new(2, 5).unwrap());
        assert_eq!((page.page, page.page_size, page.total_count), (2, 5, 0));
        assert_eq!(page.total_pages(), 0);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn pages_partition_the_collection(len in 0usize..200, size in 1u32..30) {
                let all: Vec<usize> = (0..len).collect();
                let first = Page::slice(all.clone(), PageRequest::new(1, size).unwrap());

                let mut joined = Vec::new();
                for p in 1..=first.total_pages().max(1) {
                    let page = Page::slice(all.clone(), PageRequest::new(p as u32, size).unwrap());
                    prop_assert!(page.items.len() <= size as usize);
                    joined.extend(page.items);
                }
                prop_assert_eq!(joined, all);
            }
        }
    }
}
