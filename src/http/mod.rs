//! HTTP protocol implementation.
//!
//! This module implements HTTP/1.1 over a raw byte stream, one request per
//! connection.
//!
//! # Architecture
//!
//! - **`headers`**: Case-insensitive header store and header line parsing
//! - **`parser`**: Resumable request parser and the read loop driving it
//! - **`request`**: Parsed request representation
//! - **`response`**: Status codes and default response headers
//! - **`writer`**: Ordered response serialization, fixed or chunked
//! - **`connection`**: Per-connection task gluing the above to a handler
//!
//! # Parser State Machine
//!
//! ```text
//!        ┌──────────────────┐
//!        │   Initialized    │ ← Wait for "METHOD TARGET HTTP/1.1\r\n"
//!        └──────┬───────────┘
//!               │ Request line parsed
//!               ▼
//!        ┌──────────────────┐
//!        │  ParsingHeaders  │ ← One "Name: value\r\n" per step
//!        └──────┬───────────┘
//!               │ Empty line
//!               ▼
//!        ┌──────────────────┐
//!        │   ParsingBody    │ ← Until Content-Length bytes arrived
//!        └──────┬───────────┘
//!               │ No length, zero length, or body complete
//!               ▼
//!        ┌──────────────────┐
//!        │       Done       │
//!        └──────────────────┘
//! ```
//!
//! # Response Writer
//!
//! ```text
//! Reset ─status line─▶ StatusLineDone ─headers─▶ HeadersDone ─body / end_chunks─▶ Completed ─trailers─▶ TrailersDone
//!                                                   │   ▲
//!                                                   └───┘ chunk
//! ```
//!
//! # Example
//!
//! ```no_run
//! use httpwire::http::request::Request;
//! use httpwire::http::response::StatusCode;
//! use httpwire::http::writer::ResponseWriter;
//! use httpwire::server::Server;
//!
//! fn hello(writer: &mut ResponseWriter, _req: &Request) {
//!     let _ = writer.write_response(StatusCode::Ok, "hello\n");
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let server = Server::start(8080, hello).await?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     server.stop()?;
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
