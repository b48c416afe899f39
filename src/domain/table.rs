// Table domain model - pagination over the historical readings list

pub const DEFAULT_ROWS_PER_PAGE: usize = 20;
pub const ROWS_PER_PAGE_OPTIONS: [usize; 4] = [5, 10, 15, 20];

/// The `page`-th slice of `rows_per_page` items. Pages past the end are empty.
pub fn paginate<T>(items: &[T], page: usize, rows_per_page: usize) -> &[T] {
    let start = page.saturating_mul(rows_per_page).min(items.len());
    let end = start.saturating_add(rows_per_page).min(items.len());
    &items[start..end]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableState {
    page: usize,
    rows_per_page: usize,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            page: 0,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

impl TableState {
    /// `None` when `rows_per_page` is zero.
    pub fn new(rows_per_page: usize) -> Option<Self> {
        (rows_per_page > 0).then_some(Self {
            page: 0,
            rows_per_page,
        })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Changing the page size always returns to the first page.
    /// Returns false (and leaves the state alone) for a zero page size.
    pub fn set_rows_per_page(&mut self, rows_per_page: usize) -> bool {
        if rows_per_page == 0 {
            return false;
        }
        self.rows_per_page = rows_per_page;
        self.page = 0;
        true
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.rows_per_page)
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        paginate(items, self.page, self.rows_per_page)
    }
}
