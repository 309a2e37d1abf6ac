//! Lazy walk over the pages of a `messages.list` search.

use log::debug;

use crate::domain::{ContinuationToken, MessageSummary};
use crate::error::PageFetchError;
use crate::mail::provider::MailProvider;

enum State {
    /// Next page to request. Starts out empty, meaning "first page".
    HasMore(ContinuationToken),
    Done,
}

/// Iterator over batches of message summaries. Each `next` issues exactly one
/// list call. After the provider returns an empty continuation token, or after
/// the first error, the iterator is exhausted.
///
/// Nothing is checkpointed: a new `Pages` always starts from the first page.
pub struct Pages<'a, P: MailProvider + ?Sized> {
    provider: &'a P,
    query: String,
    page_size: u32,
    page: usize,
    state: State,
}

impl<'a, P: MailProvider + ?Sized> Pages<'a, P> {
    pub fn new(provider: &'a P, query: impl Into<String>, page_size: u32) -> Self {
        Self {
            provider,
            query: query.into(),
            page_size,
            page: 0,
            state: State::HasMore(ContinuationToken::default()),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Done)
    }
}

impl<P: MailProvider + ?Sized> Iterator for Pages<'_, P> {
    type Item = Result<Vec<MessageSummary>, PageFetchError>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = match std::mem::replace(&mut self.state, State::Done) {
            State::HasMore(token) => token,
            State::Done => return None,
        };

        let page = self.page;
        self.page += 1;

        match self.provider.list(&self.query, self.page_size, &token) {
            Ok(list) => {
                let next = list.next_token();
                debug!(
                    "page {page}: {} messages, more pages: {}",
                    list.messages.len(),
                    !next.is_empty()
                );
                if !next.is_empty() {
                    self.state = State::HasMore(next);
                }
                Some(Ok(list.messages))
            }
            Err(source) => Some(Err(PageFetchError {
                page,
                token,
                source,
            })),
        }
    }
}

impl<P: MailProvider + ?Sized> std::iter::FusedIterator for Pages<'_, P> {}
