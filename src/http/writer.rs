use std::path::PathBuf;

use anyhow::Context;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;

/// Serializes the status line and headers, including the blank line that
/// ends the header block. Headers come out in sorted key order.
pub fn serialize_head(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        resp.version,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in &resp.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

pub struct ResponseWriter {
    head: Vec<u8>,
    body: Option<(PathBuf, u64)>,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        let body = response
            .file
            .clone()
            .map(|path| (path, response.content_length().unwrap_or(0)));

        Self {
            head: serialize_head(response),
            body,
        }
    }

    /// Writes the head and, for file responses, the whole file.
    ///
    /// The file is loaded before anything is written; if it can no longer be
    /// read or its size differs from the announced Content-Length, nothing
    /// reaches the stream and an error is returned.
    pub async fn write_to_stream<W: AsyncWrite + Unpin>(
        &mut self,
        stream: &mut W,
    ) -> anyhow::Result<()> {
        let body = match &self.body {
            Some((path, expected)) => {
                let content = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;

                if content.len() as u64 != *expected {
                    anyhow::bail!(
                        "{} changed size: announced {} bytes, read {}",
                        path.display(),
                        expected,
                        content.len()
                    );
                }
                content
            }
            None => Vec::new(),
        };

        write_fully(stream, &self.head).await?;
        write_fully(stream, &body).await?;
        stream.flush().await?;

        Ok(())
    }
}

async fn write_fully<W: AsyncWrite + Unpin>(stream: &mut W, buf: &[u8]) -> anyhow::Result<()> {
    let mut written = 0;
    while written < buf.len() {
        let n = stream.write(&buf[written..]).await?;

        if n == 0 {
            return Err(anyhow::anyhow!("connection closed while writing"));
        }

        written += n;
    }

    Ok(())
}
