//! JSON-RPC request builders and response parsers for the SLSC web service

pub mod request;
pub mod response;
