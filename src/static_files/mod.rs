//! Static file lookup
//!
//! Turns request URLs into files under the document root. Anything that
//! escapes the root, is missing, or is a directory comes back as not-found.

pub mod resolver;

pub use resolver::{NotFoundReason, PathResolver, Resolution, ResolvedFile};
