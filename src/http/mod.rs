//! HTTP protocol implementation.
//!
//! This module implements a GET-only HTTP/1.1 file server with persistent connections.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: The per-connection state machine: idle deadline, request loop, close decisions
//! - **`parser`**: Reads CRLF-framed requests off a stream and classifies failures
//! - **`request`**: HTTP request representation and header-key canonicalization
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait (bounded by the idle timeout) for a request
//!        └──────┬──────┘
//!               │ Request received          ── EOF / idle timeout ──→ Closed
//!               ▼                           ── malformed / stalled ─→ Writing(400)
//!        ┌──────────────────┐
//!        │   Processing     │ ← Resolve URL, build 200 or 404
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close → Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use harbor::config::Config;
//! use harbor::http::connection::Connection;
//! use harbor::server::ServerContext;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let ctx = Arc::new(ServerContext::from_config(&Config::default())?);
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let ctx = ctx.clone();
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, ctx);
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod request;
pub mod response;
pub mod parser;
pub mod connection;
pub mod writer;
pub mod mime;
