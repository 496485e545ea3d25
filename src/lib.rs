//! Harbor - static file HTTP/1.1 server
//!
//! Core library for request parsing, document-root resolution and
//! connection handling.

pub mod config;
pub mod http;
pub mod server;
pub mod static_files;
