use crate::domain::{ContinuationToken, ListPage, Message};
use crate::error::ProviderError;

/// The two read-only calls the pipeline needs from a mail API.
pub trait MailProvider {
    /// One page of message ids matching `query`. An empty `token` asks for the first page.
    fn list(
        &self,
        query: &str,
        page_size: u32,
        token: &ContinuationToken,
    ) -> Result<ListPage, ProviderError>;

    /// The full message (headers and decoded part tree).
    fn get(&self, id: &str) -> Result<Message, ProviderError>;
}

impl<P: MailProvider + ?Sized> MailProvider for &P {
    fn list(
        &self,
        query: &str,
        page_size: u32,
        token: &ContinuationToken,
    ) -> Result<ListPage, ProviderError> {
        (**self).list(query, page_size, token)
    }

    fn get(&self, id: &str) -> Result<Message, ProviderError> {
        (**self).get(id)
    }
}
