use std::collections::HashMap;

/// HTTP request methods.
///
/// Only GET is served. Anything else on the request line is rejected by the
/// parser with a 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// # Arguments
    ///
    /// * `s` - String representation of the method (case-sensitive)
    ///
    /// # Returns
    ///
    /// `Some(Method)` if the string names a supported method, `None` otherwise.
    ///
    /// # Example
    ///
    /// ```
    /// # use harbor::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("get"), None);
    /// assert_eq!(Method::from_str("POST"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
        }
    }
}

/// Represents a parsed HTTP request from a client.
///
/// `Host` and `Connection` never appear in `headers`; they are promoted to
/// `host` and `close`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The HTTP method
    pub method: Method,
    /// The request target, always starting with '/'
    pub url: String,
    /// HTTP version as sent by the client (typically "HTTP/1.1")
    pub version: String,
    /// Remaining headers, keyed by canonical name
    pub headers: HashMap<String, String>,
    /// Value of the last Host header
    pub host: String,
    /// Whether the client asked for the connection to be closed
    pub close: bool,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    url: Option<String>,
    version: Option<String>,
    headers: HashMap<String, String>,
    host: Option<String>,
    close: bool,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            url: None,
            version: None,
            headers: HashMap::new(),
            host: None,
            close: false,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.insert(canonical_header_key(key), value.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn close(mut self, close: bool) -> Self {
        self.close = close;
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        let url = self.url.ok_or("url missing")?;
        if !url.starts_with('/') {
            return Err("url must start with '/'");
        }

        let host = self.host.ok_or("host missing")?;
        if host.is_empty() {
            return Err("host missing");
        }

        Ok(Request {
            method: self.method.unwrap_or(Method::GET),
            url,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            headers: self.headers,
            host,
            close: self.close,
        })
    }
}

impl Request {
    /// Retrieves a header value by name.
    ///
    /// The name is canonicalized before lookup, so `"user-agent"` and
    /// `"User-Agent"` find the same entry.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .get(&canonical_header_key(key))
            .map(|v| v.as_str())
    }

    /// Determines whether the connection should remain open after the response.
    ///
    /// HTTP/1.1 connections are persistent unless the client sent
    /// `Connection: close`.
    pub fn keep_alive(&self) -> bool {
        !self.close
    }
}

/// Normalizes a header name: the first letter and every letter following a
/// hyphen are upper-cased, all other letters lower-cased.
///
/// ```
/// # use harbor::http::request::canonical_header_key;
/// assert_eq!(canonical_header_key("content-TYPE"), "Content-Type");
/// assert_eq!(canonical_header_key("Content-Type"), "Content-Type");
/// ```
pub fn canonical_header_key(raw: &str) -> String {
    let mut upper = true;
    raw.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

/// A header key is acceptable when it is non-empty and made only of ASCII
/// alphanumerics and hyphens.
pub fn is_valid_header_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
}
