use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// One page of a filtered, sorted sequence plus the metadata a pager needs.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
    /// 1-based index of the first item shown; 0 when the page is empty.
    pub first_item: usize,
    pub last_item: usize,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            total_pages: self.total_pages,
            total_items: self.total_items,
            page_size: self.page_size,
            first_item: self.first_item,
            last_item: self.last_item,
        }
    }
}

/// Slices `items` into pages of `page_size` (at least 1). The page number is
/// clamped into `[1, total_pages]`, so an out-of-range request returns the
/// nearest page. Upper bounds on the page size are enforced where the request
/// is validated, not here.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let current_page = page.clamp(1, total_pages);

    let start = (current_page - 1) * page_size;
    let end = (start + page_size).min(total_items);
    let slice = items.get(start..end).unwrap_or_default();

    let (first_item, last_item) = if slice.is_empty() {
        (0, 0)
    } else {
        (start + 1, end)
    };

    Page {
        items: slice.to_vec(),
        current_page,
        total_pages,
        total_items,
        page_size,
        first_item,
        last_item,
    }
}
