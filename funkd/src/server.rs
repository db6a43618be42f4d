//! Serial connection loop.
//!
//! One logical worker: the loop suspends on `accept`, then processes that
//! connection to completion (handler included) before accepting the next.
//! Requests therefore start and finish in arrival order.

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::handler::RequestHandler;
use crate::proto::http_like::{read_request, send_response};
use crate::router::Router;

pub struct Server<H> {
    router: Router<H>,
    server_name: String,
}

impl<H: RequestHandler> Server<H> {
    pub fn new(config: &ServerConfig, handler: H) -> Self {
        Self {
            router: Router::new(config, handler),
            server_name: config.server_name.clone(),
        }
    }

    /// Run until accepting or answering a connection fails. The error is
    /// returned to the caller and the loop does not resume.
    pub async fn run(&self, listener: TcpListener) -> Result<()> {
        loop {
            let (mut stream, peer) = listener.accept().await.context("accepting connection")?;
            tracing::trace!(peer = %peer, "connection accepted");
            self.serve_connection(&mut stream)
                .await
                .with_context(|| format!("serving connection from {peer}"))?;
        }
    }

    /// Read one request, process it and send the response.
    pub async fn serve_connection<S>(&self, stream: &mut S) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let response = match read_request(stream).await {
            Ok(req) => self.router.handle(req).await,
            Err(code) => {
                tracing::debug!(status = code.as_u16(), "rejecting unreadable request");
                self.router.error(code, code.reason())
            }
        };
        let status = response.code;
        send_response(stream, response, &self.server_name)
            .await
            .context("writing response")?;
        tracing::trace!(status = status.as_u16(), "response sent");
        Ok(())
    }
}
