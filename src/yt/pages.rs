use tracing::debug;

use super::client::YoutubeApi;
use super::params::SearchRequest;
use super::transport::Transport;
use super::types::RawResponse;
use crate::error::Result;

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Lazily walks the pages of one search, following `nextPageToken`.
///
/// Page tokens only make sense within the result set that produced them, so a
/// sequence cannot be resumed elsewhere; start a new one from the original
/// request instead. Without a limit it runs until the API stops handing out
/// tokens, spending quota on every page.
pub struct SearchPages<'a, T> {
    api: &'a mut YoutubeApi<T>,
    request: SearchRequest,
    cursor: Cursor,
    max_pages: Option<usize>,
    fetched: usize,
}

impl<'a, T: Transport> SearchPages<'a, T> {
    pub(crate) fn new(api: &'a mut YoutubeApi<T>, request: SearchRequest) -> Self {
        Self {
            api,
            request,
            cursor: Cursor::Start,
            max_pages: None,
            fetched: 0,
        }
    }

    /// Stops after `max_pages` pages even if more tokens follow.
    pub fn limit(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn pages_fetched(&self) -> usize {
        self.fetched
    }

    /// The next page, or `None` once the sequence is exhausted. A failed fetch
    /// ends the sequence.
    pub async fn next_page(&mut self) -> Result<Option<RawResponse>> {
        if self.max_pages.is_some_and(|max| self.fetched >= max) {
            self.cursor = Cursor::Done;
        }
        let request = match &self.cursor {
            Cursor::Done => return Ok(None),
            Cursor::Start => self.request.clone(),
            Cursor::Next(token) => self.request.with_page_token(token),
        };

        let page = match self.api.search(&request).await {
            Ok(page) => page,
            Err(err) => {
                self.cursor = Cursor::Done;
                return Err(err);
            }
        };
        self.fetched += 1;

        self.cursor = match &page.next_page_token {
            // an empty page ends the walk even when a token came with it
            Some(token) if !page.items.is_empty() => Cursor::Next(token.clone()),
            _ => Cursor::Done,
        };
        debug!(
            page = self.fetched,
            items = page.items.len(),
            more = matches!(self.cursor, Cursor::Next(_)),
            "search page"
        );
        Ok(Some(page))
    }
}

impl<T: Transport> YoutubeApi<T> {
    /// Page sequence for `request`, starting at its own `pageToken` if any.
    pub fn search_pages(&mut self, request: SearchRequest) -> SearchPages<'_, T> {
        SearchPages::new(self, request)
    }
}
