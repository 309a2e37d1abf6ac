pub mod body;
pub mod gmail;
pub mod headers;
pub mod provider;
pub mod urls;
