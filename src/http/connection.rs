use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::http::parser::{ParseError, ReadOutcome, RequestReader};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::server::ServerContext;
use crate::static_files::Resolution;

pub struct Connection<S> {
    reader: RequestReader<S>,
    ctx: Arc<ServerContext>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Closed,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    pub fn new(stream: S, ctx: Arc<ServerContext>) -> Self {
        Self {
            reader: RequestReader::with_close_match(stream, ctx.close_match),
            ctx,
            state: ConnectionState::Reading,
        }
    }

    /// Serves requests until the connection is done. A write failure ends
    /// the connection with an error.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let result = self.drive().await;
        // Best effort; the peer may already be gone.
        let _ = self.reader.get_mut().shutdown().await;
        result
    }

    async fn drive(&mut self) -> anyhow::Result<()> {
        loop {
            self.state = match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => self.read_request().await,

                ConnectionState::Processing(req) => {
                    let (response, keep_alive) = self.handle_request(req).await;
                    ConnectionState::Writing(ResponseWriter::new(&response), keep_alive)
                }

                ConnectionState::Writing(mut writer, keep_alive) => {
                    writer.write_to_stream(self.reader.get_mut()).await?;

                    if keep_alive {
                        ConnectionState::Reading // go back for next request
                    } else {
                        ConnectionState::Closed
                    }
                }

                ConnectionState::Closed => break,
            };
        }

        Ok(())
    }

    /// Waits up to the idle timeout for the next request and decides what
    /// happens next.
    async fn read_request(&mut self) -> ConnectionState {
        let outcome = match timeout(self.ctx.idle_timeout, self.reader.next_request()).await {
            Ok(outcome) => outcome,
            Err(_) => ReadOutcome::Failed {
                bytes_received: self.reader.bytes_received(),
                error: ParseError::Timeout,
            },
        };

        match outcome {
            ReadOutcome::Request(req) => ConnectionState::Processing(req),

            ReadOutcome::Closed => {
                debug!("client closed connection");
                ConnectionState::Closed
            }

            ReadOutcome::Failed {
                bytes_received: false,
                error,
            } if error.is_timeout() => {
                debug!("idle connection timed out");
                ConnectionState::Closed
            }

            ReadOutcome::Failed { error, .. } => {
                warn!(error = %error, "bad request");
                ConnectionState::Writing(ResponseWriter::new(&Response::bad_request()), false)
            }
        }
    }

    async fn handle_request(&self, mut req: Request) -> (Response, bool) {
        if req.url.ends_with('/') {
            req.url.push_str(&self.ctx.index_file);
        }

        let keep_alive = req.keep_alive();
        let url = req.url.clone();

        let response = match self.ctx.resolver.resolve(&req.url).await {
            Resolution::Found(file) => Response::ok(req, file),
            Resolution::NotFound(reason) => {
                debug!(url = %url, reason = ?reason, "no file to serve");
                Response::not_found(&req)
            }
        };

        info!(
            method = "GET",
            url = %url,
            status = response.status.as_u16(),
            keep_alive,
            "request served"
        );

        (response, keep_alive)
    }
}
