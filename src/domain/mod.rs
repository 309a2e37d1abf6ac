pub mod message;

pub use message::{
    ContinuationToken, ListPage, Message, MessageHeader, MessageId, MessagePartBody,
    MessagePayload, MessageSummary,
};
