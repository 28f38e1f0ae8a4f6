//! One page (or an accumulation of pages) of a paged list.

use serde::{Deserialize, Serialize};

/// Immutable page snapshot.
///
/// `has_more` equals `current_page < total_pages` unless the producer set it
/// explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPagedList<T>")]
pub struct PagedList<T> {
    items: Vec<T>,
    current_page: u32,
    total_pages: u32,
    page_size: u32,
    total: u64,
    has_more: bool,
}

#[derive(Deserialize)]
struct RawPagedList<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default = "first_page")]
    current_page: u32,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    page_size: u32,
    #[serde(default)]
    total: u64,
    #[serde(default)]
    has_more: Option<bool>,
}

fn first_page() -> u32 {
    1
}

impl<T> From<RawPagedList<T>> for PagedList<T> {
    fn from(raw: RawPagedList<T>) -> Self {
        let page = PagedList::new(
            raw.items,
            raw.current_page,
            raw.total_pages,
            raw.page_size,
            raw.total,
        );
        match raw.has_more {
            Some(has_more) => page.with_has_more(has_more),
            None => page,
        }
    }
}

impl<T> PagedList<T> {
    /// Page numbers are 1-based; `0` is clamped to `1`.
    pub fn new(items: Vec<T>, current_page: u32, total_pages: u32, page_size: u32, total: u64) -> Self {
        let current_page = current_page.max(1);
        Self {
            items,
            current_page,
            total_pages,
            page_size,
            total,
            has_more: current_page < total_pages,
        }
    }

    /// Page read from a source that knows no totals.
    ///
    /// A full page is assumed to have a successor.
    pub fn from_items(items: Vec<T>, page: u32, page_size: u32) -> Self {
        let page = page.max(1);
        let full = page_size > 0 && items.len() as u64 >= u64::from(page_size);
        let total = u64::from(page - 1) * u64::from(page_size) + items.len() as u64;
        let total_pages = if full { page + 1 } else { page };
        Self::new(items, page, total_pages, page_size, total)
    }

    /// Override the derived `has_more` flag.
    pub fn with_has_more(mut self, has_more: bool) -> Self {
        self.has_more = has_more;
        self
    }

    /// Number this page as `page`.
    ///
    /// When the producer reported a different page number, `has_more` is
    /// derived again from `total_pages`. A producer without totals keeps its
    /// flag.
    pub fn renumbered(mut self, page: u32) -> Self {
        let page = page.max(1);
        if self.current_page != page {
            self.current_page = page;
            if self.total_pages > 0 {
                self.has_more = page < self.total_pages;
            }
        }
        self
    }

    /// Prefix this page's items with everything loaded before it.
    ///
    /// Page metadata stays that of `self`.
    pub fn after(mut self, mut previous: Vec<T>) -> Self {
        previous.append(&mut self.items);
        self.items = previous;
        self
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
