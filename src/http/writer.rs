use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::headers::{CRLF, Headers};
use crate::http::response::{StatusCode, default_headers};

const HTTP_VERSION: &str = "HTTP/1.1";
const LAST_CHUNK: &[u8] = b"0\r\n\r\n";

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("cannot write {operation:?} while writer is in state {state:?}")]
    OutOfOrder {
        operation: WriteOp,
        state: WriterState,
    },

    #[error("cannot write a fixed body after chunks were written")]
    ChunkedBodyInProgress,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// How far a response has been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Reset,
    StatusLineDone,
    HeadersDone,
    Completed,
    TrailersDone,
}

/// Every writer operation, paired with the state it needs and the state it
/// leaves behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    StatusLine,
    Headers,
    Body,
    Chunk,
    EndChunks,
    Trailers,
}

impl WriteOp {
    /// `(required, next)` for this operation.
    const fn transition(self) -> (WriterState, WriterState) {
        use WriterState::*;
        match self {
            WriteOp::StatusLine => (Reset, StatusLineDone),
            WriteOp::Headers => (StatusLineDone, HeadersDone),
            WriteOp::Body => (HeadersDone, Completed),
            WriteOp::Chunk => (HeadersDone, HeadersDone),
            WriteOp::EndChunks => (HeadersDone, Completed),
            WriteOp::Trailers => (Completed, TrailersDone),
        }
    }
}

/// Buffers one response, enforcing status line → headers → body → trailers.
///
/// Nothing reaches the network until [`write_to`](Self::write_to); a call
/// made in the wrong state fails without touching the buffer.
#[derive(Debug)]
pub struct ResponseWriter {
    buffer: BytesMut,
    state: WriterState,
    chunked: bool,
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(1024),
            state: WriterState::Reset,
            chunked: false,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Bytes serialized so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Bytes {
        self.buffer.freeze()
    }

    pub fn write_status_line(&mut self, status: StatusCode) -> Result<(), WriterError> {
        let next = self.check(WriteOp::StatusLine)?;

        let status_line = format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            status.as_u16(),
            status.reason_phrase()
        );
        self.buffer.put_slice(status_line.as_bytes());

        self.state = next;
        Ok(())
    }

    /// Writes the header block. `None` falls back to [`default_headers`] with
    /// a zero content length.
    pub fn write_headers(&mut self, headers: Option<&Headers>) -> Result<(), WriterError> {
        let next = self.check(WriteOp::Headers)?;

        match headers {
            Some(headers) => self.put_header_block(headers),
            None => self.put_header_block(&default_headers(0)),
        }

        self.state = next;
        Ok(())
    }

    /// Writes a fixed-length body verbatim and completes the response.
    pub fn write_body(&mut self, body: &[u8]) -> Result<(), WriterError> {
        let next = self.check(WriteOp::Body)?;
        if self.chunked {
            return Err(WriterError::ChunkedBodyInProgress);
        }

        self.buffer.put_slice(body);

        self.state = next;
        Ok(())
    }

    /// Writes one `<hex-len>\r\n<data>\r\n` frame. May be called repeatedly.
    pub fn write_chunk(&mut self, data: &[u8]) -> Result<(), WriterError> {
        let next = self.check(WriteOp::Chunk)?;

        self.buffer.put_slice(format!("{:X}", data.len()).as_bytes());
        self.buffer.put_slice(CRLF);
        self.buffer.put_slice(data);
        self.buffer.put_slice(CRLF);

        self.chunked = true;
        self.state = next;
        Ok(())
    }

    /// Writes the terminating zero-length chunk.
    pub fn end_chunks(&mut self) -> Result<(), WriterError> {
        let next = self.check(WriteOp::EndChunks)?;

        self.buffer.put_slice(LAST_CHUNK);

        self.state = next;
        Ok(())
    }

    /// Writes a trailer block after the body.
    ///
    /// Only meaningful after [`end_chunks`](Self::end_chunks) with a
    /// `Trailer` header declared up front; neither is checked here.
    pub fn write_trailers(&mut self, trailers: &Headers) -> Result<(), WriterError> {
        let next = self.check(WriteOp::Trailers)?;

        self.put_header_block(trailers);

        self.state = next;
        Ok(())
    }

    /// Status line, default headers and `message` as the body in one go.
    pub fn write_response(&mut self, status: StatusCode, message: &str) -> Result<(), WriterError> {
        self.write_status_line(status)?;
        self.write_headers(Some(&default_headers(message.len())))?;
        self.write_body(message.as_bytes())
    }

    /// Copies everything buffered so far onto `stream`.
    pub async fn write_to<W>(&self, stream: &mut W) -> Result<(), WriterError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut written = 0;

        while written < self.buffer.len() {
            let n = stream.write(&self.buffer[written..]).await?;

            if n == 0 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "connection closed while writing",
                )
                .into());
            }

            written += n;
        }

        stream.flush().await?;
        Ok(())
    }

    fn check(&self, operation: WriteOp) -> Result<WriterState, WriterError> {
        let (required, next) = operation.transition();
        if self.state != required {
            return Err(WriterError::OutOfOrder {
                operation,
                state: self.state,
            });
        }
        Ok(next)
    }

    fn put_header_block(&mut self, headers: &Headers) {
        for (name, value) in headers.iter() {
            self.buffer.put_slice(name.as_bytes());
            self.buffer.put_slice(b": ");
            self.buffer.put_slice(value.as_bytes());
            self.buffer.put_slice(CRLF);
        }
        self.buffer.put_slice(CRLF);
    }
}
