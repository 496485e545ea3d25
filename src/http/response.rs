use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::http::mime;
use crate::http::request::Request;
use crate::static_files::ResolvedFile;

pub const HTTP_VERSION: &str = "HTTP/1.1";

/// HTTP status codes the server emits.
///
/// - `Ok` (200): file found and served
/// - `BadRequest` (400): malformed or stalled request
/// - `NotFound` (404): nothing servable at the URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use harbor::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
        }
    }
}

/// Represents a complete HTTP response ready to be sent to a client.
///
/// The body is never held here; `file` names the file whose contents are
/// streamed after the head, if any.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub version: String,
    /// Headers keyed by canonical name, kept sorted for serialization
    pub headers: BTreeMap<String, String>,
    /// The valid request this answers, when there is one
    pub request: Option<Request>,
    pub file: Option<PathBuf>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::NotFound)
///     .header("Connection", "close")
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: BTreeMap<String, String>,
    request: Option<Request>,
    file: Option<PathBuf>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            request: None,
            file: None,
        }
    }

    /// Adds or replaces a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn request(mut self, request: Request) -> Self {
        self.request = Some(request);
        self
    }

    /// Sets the file to send as the body.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Builds the final Response.
    ///
    /// Adds a `Date` header for the current time if none was set.
    pub fn build(mut self) -> Response {
        self.headers
            .entry("Date".to_string())
            .or_insert_with(|| httpdate::fmt_http_date(SystemTime::now()));

        Response {
            status: self.status,
            version: HTTP_VERSION.to_string(),
            headers: self.headers,
            request: self.request,
            file: self.file,
        }
    }
}

impl Response {
    /// 200 response serving `file` for `request`.
    pub fn ok(request: Request, file: ResolvedFile) -> Self {
        let modified = file.modified.unwrap_or_else(SystemTime::now);

        let mut builder = ResponseBuilder::new(StatusCode::Ok)
            .header("Last-Modified", httpdate::fmt_http_date(modified))
            .header("Content-Type", mime::content_type(&file.path))
            .header("Content-Length", file.len.to_string());

        if request.close {
            builder = builder.header("Connection", "close");
        }

        builder.request(request).file(file.path).build()
    }

    /// 400 response. The connection is always closed after it.
    pub fn bad_request() -> Self {
        ResponseBuilder::new(StatusCode::BadRequest)
            .header("Connection", "close")
            .build()
    }

    /// 404 response for `request`, keeping the connection open unless the
    /// client asked to close it.
    pub fn not_found(request: &Request) -> Self {
        let builder = ResponseBuilder::new(StatusCode::NotFound);
        if request.close {
            builder.header("Connection", "close").build()
        } else {
            builder.build()
        }
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    /// Whether this response announces that the connection will close.
    pub fn closes_connection(&self) -> bool {
        self.header("Connection") == Some("close")
    }

    /// Declared body length, if a body is attached.
    pub fn content_length(&self) -> Option<u64> {
        self.header("Content-Length").and_then(|v| v.parse().ok())
    }
}
