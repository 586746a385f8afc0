//! httpwire - HTTP/1.1 over raw TCP
//!
//! Incremental request parsing, ordered response writing and a
//! connection-per-task server, built directly on tokio sockets.

pub mod config;
pub mod http;
pub mod server;
