use crate::types::FeedPage;

/// Cursor over the social feed.
///
/// The backend paginates by cumulative offset: each fetched page advances
/// the offset by the number of items actually returned, and `total` from
/// the latest page decides whether more remain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPager {
    limit: u64,
    offset: u64,
    total: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedRequest {
    pub limit: u64,
    pub offset: u64,
}

impl FeedPager {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            offset: 0,
            total: None,
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Until a first page arrives, more is assumed.
    pub fn has_more(&self) -> bool {
        match self.total {
            None => true,
            Some(total) => self.offset < total,
        }
    }

    /// The next request to issue, or `None` when the feed is exhausted.
    pub fn next_request(&self) -> Option<FeedRequest> {
        if !self.has_more() {
            return None;
        }
        Some(FeedRequest {
            limit: self.limit,
            offset: self.offset,
        })
    }

    /// Record a fetched page.
    pub fn apply_page(&mut self, page: &FeedPage) {
        self.offset += page.items.len() as u64;
        self.total = Some(page.total);
    }

    /// Start over from the top (pull-to-refresh).
    pub fn reset(&mut self) {
        self.offset = 0;
        self.total = None;
    }
}
