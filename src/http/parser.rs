use std::collections::HashMap;

use bytes::BytesMut;
use serde::Deserialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::request::{Method, Request, canonical_header_key, is_valid_header_key};

/// Longest line (request line or header) accepted without a terminating CRLF.
pub const MAX_LINE_LEN: usize = 8 * 1024;

const READ_CHUNK: usize = 4096;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed request line {0:?}")]
    MalformedRequestLine(String),
    #[error("unsupported method {0:?}")]
    InvalidMethod(String),
    #[error("malformed header line {0:?}")]
    MalformedHeader(String),
    #[error("invalid header key {0:?}")]
    InvalidHeaderKey(String),
    #[error("missing Host header")]
    MissingHost,
    #[error("line longer than {} bytes", MAX_LINE_LEN)]
    LineTooLong,
    #[error("request is not valid UTF-8")]
    InvalidEncoding,
    #[error("connection closed mid-request")]
    UnexpectedEof,
    #[error("timed out waiting for request")]
    Timeout,
    #[error("read failed: {0}")]
    Io(std::io::ErrorKind),
}

impl ParseError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ParseError::Timeout)
    }
}

/// Result of reading one request off a connection.
#[derive(Debug)]
pub enum ReadOutcome {
    /// A complete, valid request.
    Request(Request),
    /// Reading or validation failed. `bytes_received` tells whether any
    /// byte of this request had arrived before the failure.
    Failed {
        bytes_received: bool,
        error: ParseError,
    },
    /// The peer closed the stream before sending anything.
    Closed,
}

/// How the `Connection` header value is compared against `close`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionCloseMatch {
    /// Raw text after the colon must be exactly `" close"`.
    Exact,
    /// Trimmed value must equal `close` (case-sensitive).
    #[default]
    Trimmed,
}

impl ConnectionCloseMatch {
    fn is_close(self, raw_value: &str) -> bool {
        match self {
            ConnectionCloseMatch::Exact => raw_value == " close",
            ConnectionCloseMatch::Trimmed => raw_value.trim() == "close",
        }
    }
}

/// Reads CRLF-framed requests from a byte stream.
///
/// Bytes are accumulated in an internal buffer, so a `next_request` future
/// can be dropped (e.g. by a timeout) without losing data, and
/// `bytes_received` still reports progress made by the dropped future.
pub struct RequestReader<R> {
    inner: R,
    buffer: BytesMut,
    received: bool,
    close_match: ConnectionCloseMatch,
}

impl<R: AsyncRead + Unpin> RequestReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_close_match(inner, ConnectionCloseMatch::default())
    }

    pub fn with_close_match(inner: R, close_match: ConnectionCloseMatch) -> Self {
        Self {
            inner,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            received: false,
            close_match,
        }
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Whether any byte of the request currently being read has arrived.
    pub fn bytes_received(&self) -> bool {
        self.received
    }

    /// Reads the next request, classifying any failure.
    pub async fn next_request(&mut self) -> ReadOutcome {
        // Pipelined bytes left over from the previous request count as received.
        self.received = !self.buffer.is_empty();

        match self.read_request().await {
            Ok(Some(request)) => ReadOutcome::Request(request),
            Ok(None) => ReadOutcome::Closed,
            Err(error) => ReadOutcome::Failed {
                bytes_received: self.received,
                error,
            },
        }
    }

    async fn read_request(&mut self) -> Result<Option<Request>, ParseError> {
        let Some(line) = self.read_line().await? else {
            return Ok(None);
        };

        let (method, url, version) = parse_request_line(&line)?;

        let mut headers = HashMap::new();
        let mut host = String::new();
        let mut close = false;

        loop {
            let line = self.read_line().await?.ok_or(ParseError::UnexpectedEof)?;
            if line.is_empty() {
                break;
            }

            let (raw_key, raw_value) = line
                .split_once(':')
                .ok_or_else(|| ParseError::MalformedHeader(line.clone()))?;

            let key = canonical_header_key(raw_key);
            if !is_valid_header_key(&key) {
                return Err(ParseError::InvalidHeaderKey(raw_key.to_string()));
            }

            match key.as_str() {
                "Host" => host = raw_value.trim().to_string(),
                "Connection" => close = self.close_match.is_close(raw_value),
                _ => {
                    headers.insert(key, raw_value.trim().to_string());
                }
            }
        }

        if host.is_empty() {
            return Err(ParseError::MissingHost);
        }

        Ok(Some(Request {
            method,
            url,
            version,
            headers,
            host,
            close,
        }))
    }

    /// Returns the next line without its CRLF, or `None` on a clean end of
    /// stream with nothing buffered.
    async fn read_line(&mut self) -> Result<Option<String>, ParseError> {
        let mut scanned = 0;
        loop {
            if let Some(pos) = find_crlf(&self.buffer[scanned..]) {
                let end = scanned + pos;
                let line = self.buffer.split_to(end + 2);
                let text = std::str::from_utf8(&line[..end])
                    .map_err(|_| ParseError::InvalidEncoding)?;
                return Ok(Some(text.to_string()));
            }

            if self.buffer.len() > MAX_LINE_LEN {
                return Err(ParseError::LineTooLong);
            }
            // A trailing '\r' may be the first half of a CRLF split across reads.
            scanned = self.buffer.len().saturating_sub(1);

            self.buffer.reserve(READ_CHUNK);
            let n = self
                .inner
                .read_buf(&mut self.buffer)
                .await
                .map_err(|e| ParseError::Io(e.kind()))?;

            if n == 0 {
                return if self.buffer.is_empty() {
                    Ok(None)
                } else {
                    Err(ParseError::UnexpectedEof)
                };
            }

            self.received = true;
        }
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
    let parts: Vec<&str> = line.split(' ').collect();
    let [method, url, version] = parts.as_slice() else {
        return Err(ParseError::MalformedRequestLine(line.to_string()));
    };

    if !url.starts_with('/') {
        return Err(ParseError::MalformedRequestLine(line.to_string()));
    }

    let method = Method::from_str(method).ok_or_else(|| ParseError::InvalidMethod(method.to_string()))?;

    Ok((method, url.to_string(), version.to_string()))
}
