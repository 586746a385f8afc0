use std::net::SocketAddr;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::http::parser::{ParseError, read_request_with_buffer_size};
use crate::http::response::StatusCode;
use crate::http::writer::ResponseWriter;
use crate::server::Handler;

/// One accepted socket, serving exactly one request.
///
/// The stream is owned here and closed when `run` returns, on every path.
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    read_buffer_size: usize,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr, read_buffer_size: usize) -> Self {
        Self {
            stream,
            peer,
            read_buffer_size,
        }
    }

    /// Reads a request, lets `handler` answer it and flushes the answer.
    ///
    /// Malformed requests get a plain 400 without reaching the handler. Read
    /// failures abort the connection with no response.
    pub async fn run<H>(mut self, handler: &H) -> anyhow::Result<()>
    where
        H: Handler + ?Sized,
    {
        let mut writer = ResponseWriter::new();

        match read_request_with_buffer_size(&mut self.stream, self.read_buffer_size).await {
            Ok(request) => {
                tracing::debug!(
                    peer = %self.peer,
                    method = %request.method(),
                    target = %request.target(),
                    "Request parsed"
                );
                handler.handle(&mut writer, &request);
            }

            Err(ParseError::Io(e)) => {
                return Err(anyhow::anyhow!("read failed: {}", e));
            }

            Err(e) => {
                tracing::warn!(peer = %self.peer, error = %e, "Rejecting malformed request");
                writer.write_response(StatusCode::BadRequest, &e.to_string())?;
            }
        }

        writer.write_to(&mut self.stream).await?;
        self.stream.shutdown().await?;

        Ok(())
    }
}
