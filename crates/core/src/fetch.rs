use crate::traits::{ContentSource, PageRequest};
use crate::{ContentError, ContentItem, ContentStatus, IndexerError, Tenant};

pub const DEFAULT_PAGE_SIZE: usize = 100;

pub fn validate_page_size(page_size: usize) -> Result<usize, IndexerError> {
    if page_size == 0 {
        return Err(IndexerError::InvalidArgument(
            "page size must be positive".to_string(),
        ));
    }
    Ok(page_size)
}

/// Walks one content type of one tenant page by page until an empty page.
pub struct PaginatedFetcher<'a, C: ?Sized> {
    source: &'a C,
    tenant: &'a Tenant,
    content_type: &'a str,
    status: ContentStatus,
    page_size: usize,
    next_page: u32,
    exhausted: bool,
}

impl<'a, C> PaginatedFetcher<'a, C>
where
    C: ContentSource + ?Sized,
{
    pub fn new(
        source: &'a C,
        tenant: &'a Tenant,
        content_type: &'a str,
        status: ContentStatus,
        page_size: usize,
    ) -> Result<Self, IndexerError> {
        Ok(Self {
            source,
            tenant,
            content_type,
            status,
            page_size: validate_page_size(page_size)?,
            next_page: 1,
            exhausted: false,
        })
    }

    /// Next non-empty page with its 1-based number, or `None` once drained.
    /// A failed fetch does not advance the cursor.
    pub async fn next_page(&mut self) -> Result<Option<(u32, Vec<ContentItem>)>, ContentError> {
        if self.exhausted {
            return Ok(None);
        }

        let page = self.next_page;
        let items = self
            .source
            .fetch_page(&PageRequest {
                tenant: self.tenant,
                content_type: self.content_type,
                status: self.status,
                page,
                page_size: self.page_size,
            })
            .await?;

        if items.is_empty() {
            self.exhausted = true;
            return Ok(None);
        }

        self.next_page = page.saturating_add(1);
        Ok(Some((page, items)))
    }

    /// Moves past the page that just failed and returns its number.
    pub fn skip_page(&mut self) -> u32 {
        let page = self.next_page;
        self.next_page = page.saturating_add(1);
        page
    }
}
