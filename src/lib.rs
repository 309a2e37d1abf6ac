//! Lists the messages matching a Gmail search, one page at a time, and prints
//! each message's subject together with the first URL found in its body.

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod mail;
pub mod pagination;
pub mod pipeline;
