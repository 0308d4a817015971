//! Page assembly

use serde::Serialize;
use utoipa::ToSchema;

/// Number of pages needed for `total` items; zero when `page_size` is zero
pub fn total_pages(total: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size as u64)
}

/// One slice of a filtered result set
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub current_page: u32,
}

impl<T> Page<T> {
    /// `current_page` is taken as given, even past the last page
    pub fn new(content: Vec<T>, total_elements: u64, page_number: u32, page_size: u32) -> Self {
        Self {
            content,
            total_elements,
            total_pages: total_pages(total_elements, page_size),
            current_page: page_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(95, 10), 10);
        assert_eq!(total_pages(100, 10), 10);
        assert_eq!(total_pages(101, 10), 11);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(0, 1), 0);
        assert_eq!(total_pages(42, 0), 0);
    }

    #[test]
    fn test_page_past_the_end() {
        let page: Page<i32> = Page::new(vec![], 95, 20, 10);
        assert_eq!(page.current_page, 20);
        assert_eq!(page.total_pages, 10);
        assert_eq!(page.total_elements, 95);
        assert!(page.content.is_empty());
    }

    #[test]
    fn test_page_serialization() {
        let page = Page::new(vec!["a", "b"], 2, 0, 10);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "content": ["a", "b"],
                "totalElements": 2,
                "totalPages": 1,
                "currentPage": 0
            })
        );
    }
}
