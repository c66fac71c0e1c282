//! Page sizes and the arithmetic for slicing a list into pages.

use std::fmt;
use std::str::FromStr;

/// Rows per page offered by the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    Five,
    Ten,
    Twenty,
    All,
}

impl PageSize {
    pub const OPTIONS: [PageSize; 4] = [PageSize::Five, PageSize::Ten, PageSize::Twenty, PageSize::All];

    /// Rows per page for a list of `total` items. `All` never yields zero.
    pub fn rows(self, total: usize) -> usize {
        match self {
            PageSize::Five => 5,
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
            PageSize::All => total.max(1),
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSize::Five => f.write_str("5"),
            PageSize::Ten => f.write_str("10"),
            PageSize::Twenty => f.write_str("20"),
            PageSize::All => f.write_str("All"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("page size must be one of 5, 10, 20 or all, got '{0}'")]
pub struct InvalidPageSize(pub String);

impl FromStr for PageSize {
    type Err = InvalidPageSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "5" => Ok(PageSize::Five),
            "10" => Ok(PageSize::Ten),
            "20" => Ok(PageSize::Twenty),
            "all" => Ok(PageSize::All),
            _ => Err(InvalidPageSize(s.to_string())),
        }
    }
}

/// `ceil(total / per_page)`; zero items means zero pages.
pub fn page_count(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page)
}

/// Items on the 1-based `page`: `[(page-1)*per_page, page*per_page)`,
/// clipped to the slice. Out-of-range pages are empty.
pub fn page_slice<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    if page == 0 || per_page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(per_page).min(items.len());
    let end = page.saturating_mul(per_page).min(items.len());
    &items[start..end]
}

/// Clamp a requested page into `[1, max(1, total_pages)]`.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_partition_items_exactly() {
        let items: Vec<u32> = (0..23).collect();
        for per_page in [1, 5, 10, 20, 23, 50] {
            let pages = page_count(items.len(), per_page);
            assert_eq!(pages, items.len().div_ceil(per_page));
            let joined: Vec<u32> = (1..=pages)
                .flat_map(|p| page_slice(&items, p, per_page).iter().copied())
                .collect();
            assert_eq!(joined, items, "per_page={per_page}");
            for p in 1..=pages {
                assert!(!page_slice(&items, p, per_page).is_empty());
            }
        }
    }

    #[test]
    fn last_page_is_partial() {
        let items: Vec<u32> = (1..=12).collect();
        assert_eq!(page_slice(&items, 3, 5), &[11, 12]);
        assert!(page_slice(&items, 4, 5).is_empty());
        assert!(page_slice(&items, 0, 5).is_empty());
    }

    #[test]
    fn empty_list_has_no_pages() {
        assert_eq!(page_count(0, 5), 0);
        assert_eq!(clamp_page(3, 0), 1);
    }

    #[test]
    fn all_shows_everything_on_one_page() {
        assert_eq!(PageSize::All.rows(37), 37);
        assert_eq!(PageSize::All.rows(0), 1);
        assert_eq!(page_count(37, PageSize::All.rows(37)), 1);
    }

    #[test]
    fn page_size_parses_options() {
        assert_eq!("10".parse::<PageSize>().unwrap(), PageSize::Ten);
        assert_eq!("ALL".parse::<PageSize>().unwrap(), PageSize::All);
        assert!("7".parse::<PageSize>().is_err());
        for size in PageSize::OPTIONS {
            assert_eq!(size.to_string().parse::<PageSize>().unwrap(), size);
        }
    }
}
