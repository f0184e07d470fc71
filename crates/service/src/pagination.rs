//! Pagination utilities for service layer
//!
//! `Pagination` normalizes the 1-based `page`/`page_size` inputs, `fetch_page`
//! runs a sea-orm paginator, and `PageLinks` renders `next`/`previous` URLs.

use sea_orm::{ConnectionTrait, PaginatorTrait, SelectorTrait};
use serde::Serialize;

use crate::errors::ServiceError;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination parameters
#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self { page: page.unwrap_or(1), per_page: per_page.unwrap_or(DEFAULT_PAGE_SIZE) }
    }

    /// Clamp to sane defaults and convert to `u64` (0-based page index, page size)
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, MAX_PAGE_SIZE);
        ((page - 1) as u64, per_page as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: DEFAULT_PAGE_SIZE } }
}

/// One page of results plus the totals needed to render navigation.
#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    /// 1-based
    pub page: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    pub fn num_pages(&self) -> u64 {
        if self.total == 0 { 1 } else { self.total.div_ceil(self.per_page) }
    }
    pub fn has_next(&self) -> bool { self.page < self.num_pages() }
    pub fn has_previous(&self) -> bool { self.page > 1 }

    /// First page of an empty result set.
    pub fn empty(pagination: Pagination) -> Self {
        let (_, per_page) = pagination.normalize();
        Page { items: Vec::new(), total: 0, page: 1, per_page }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page { items: self.items.into_iter().map(f).collect(), total: self.total, page: self.page, per_page: self.per_page }
    }
}

/// Run `query` through a paginator. A page past the end (other than the
/// first) is `NotFound("invalid page")`.
pub async fn fetch_page<'db, C, S>(
    db: &'db C,
    query: S,
    pagination: Pagination,
) -> Result<Page<<S::Selector as SelectorTrait>::Item>, ServiceError>
where
    C: ConnectionTrait,
    S: PaginatorTrait<'db, C>,
{
    let (idx, per_page) = pagination.normalize();
    let paginator = query.paginate(db, per_page);
    let total = paginator.num_items().await?;
    let page = Page { items: Vec::new(), total, page: idx + 1, per_page };
    if idx > 0 && page.page > page.num_pages() {
        return Err(ServiceError::NotFound("invalid page".into()));
    }
    let items = paginator.fetch_page(idx).await?;
    Ok(Page { items, ..page })
}

/// `next` / `previous` URLs that keep every other query parameter.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PageLinks {
    pub next: Option<String>,
    pub previous: Option<String>,
}

impl PageLinks {
    /// `base` is the path (optionally prefixed with an absolute origin);
    /// `query` is the raw query string of the current request.
    pub fn build<T>(base: &str, query: Option<&str>, page: &Page<T>) -> Self {
        let others: Vec<&str> = query
            .unwrap_or_default()
            .split('&')
            .filter(|kv| !kv.is_empty() && kv.split('=').next() != Some("page"))
            .collect();
        let render = |target: Option<u64>| {
            let mut parts = others.clone();
            let page_kv = target.map(|p| format!("page={p}"));
            if let Some(kv) = page_kv.as_deref() {
                parts.push(kv);
            }
            if parts.is_empty() { base.to_string() } else { format!("{}?{}", base, parts.join("&")) }
        };
        Self {
            next: page.has_next().then(|| render(Some(page.page + 1))),
            // the first page is addressed without an explicit `page` param
            previous: page.has_previous().then(|| render((page.page > 2).then_some(page.page - 1))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total: u64, page: u64, per_page: u64) -> Page<()> {
        Page { items: vec![], total, page, per_page }
    }

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let (idx, per) = Pagination { page: 0, per_page: 0 }.normalize();
        assert_eq!(idx, 0);
        assert_eq!(per, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let (idx, per) = Pagination { page: 5, per_page: 1000 }.normalize();
        assert_eq!(idx, 4);
        assert_eq!(per, 100);
    }

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::new(None, None);
        assert_eq!(d.page, 1);
        assert_eq!(d.per_page, 20);
    }

    #[test]
    fn page_counts() {
        assert_eq!(page(0, 1, 20).num_pages(), 1);
        assert_eq!(page(20, 1, 20).num_pages(), 1);
        assert_eq!(page(21, 1, 20).num_pages(), 2);
        assert!(page(21, 1, 20).has_next());
        assert!(!page(21, 2, 20).has_next());
    }

    #[test]
    fn links_at_boundaries() {
        let first = PageLinks::build("/api/products/", Some("search=oil&page=1"), &page(45, 1, 20));
        assert_eq!(first.next.as_deref(), Some("/api/products/?search=oil&page=2"));
        assert_eq!(first.previous, None);

        let second = PageLinks::build("/api/products/", Some("page=2&search=oil"), &page(45, 2, 20));
        assert_eq!(second.next.as_deref(), Some("/api/products/?search=oil&page=3"));
        assert_eq!(second.previous.as_deref(), Some("/api/products/?search=oil"));

        let last = PageLinks::build("https://salon.example.com/api/products/", Some("page=3"), &page(45, 3, 20));
        assert_eq!(last.next, None);
        assert_eq!(last.previous.as_deref(), Some("https://salon.example.com/api/products/?page=2"));

        let single = PageLinks::build("/api/products/", None, &page(3, 1, 20));
        assert_eq!(single, PageLinks::default());
    }
}
