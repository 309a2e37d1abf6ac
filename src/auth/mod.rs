pub mod client_secret;
pub mod code_source;
pub mod oauth;
pub mod token_manager;
pub mod tokens_file;
