use bytes::{Buf, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::headers::{CRLF, HeaderError, Headers, find_crlf};
use crate::http::request::{Request, RequestLine};

/// Scratch buffer size used by [`read_request`].
pub const DEFAULT_READ_SIZE: usize = 1024;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid request line: {0:?}")]
    InvalidRequestLine(String),

    #[error("request method {0:?} is not uppercase")]
    InvalidMethod(String),

    #[error("unsupported HTTP version {0:?}")]
    InvalidVersion(String),

    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error("invalid Content-Length {0:?}")]
    InvalidContentLength(String),

    #[error("body of {received} bytes exceeds Content-Length {declared}")]
    BodyTooLong { declared: usize, received: usize },

    #[error("body of {received} bytes is shorter than Content-Length {declared}")]
    BodyTooShort { declared: usize, received: usize },

    #[error("connection closed before the request was complete")]
    UnexpectedEof,

    #[error("request is not fully parsed")]
    Incomplete,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parser progress. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Initialized,
    ParsingHeaders,
    ParsingBody,
    Done,
}

/// Resumable request parser.
///
/// Feed it the bytes not yet consumed, plus anything newly read, until
/// [`is_done`](Self::is_done) reports true. Each call returns how many bytes
/// it consumed; the caller drops those from its buffer.
#[derive(Debug)]
pub struct RequestParser {
    state: ParserState,
    request_line: Option<RequestLine>,
    headers: Headers,
    body: Vec<u8>,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::Initialized,
            request_line: None,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    /// Body bytes accumulated so far.
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Advances through as many states as `data` allows.
    pub fn feed(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let mut consumed = 0;

        loop {
            let rest = &data[consumed..];

            match self.state {
                ParserState::Initialized => {
                    let n = self.parse_request_line(rest)?;
                    if n == 0 {
                        break;
                    }
                    consumed += n;
                    self.state = ParserState::ParsingHeaders;
                }

                ParserState::ParsingHeaders => {
                    let (n, done) = self.headers.parse_field(rest)?;
                    if n == 0 {
                        break;
                    }
                    consumed += n;
                    if done {
                        self.state = ParserState::ParsingBody;
                    }
                }

                ParserState::ParsingBody => {
                    let declared = match self.declared_length()? {
                        None | Some(0) => {
                            self.state = ParserState::Done;
                            continue;
                        }
                        Some(n) => n,
                    };

                    self.body.extend_from_slice(rest);
                    consumed += rest.len();

                    if self.body.len() > declared {
                        return Err(ParseError::BodyTooLong {
                            declared,
                            received: self.body.len(),
                        });
                    }
                    if self.body.len() < declared {
                        break;
                    }
                    self.state = ParserState::Done;
                }

                ParserState::Done => {
                    // Without a declared length trailing bytes are ignored.
                    let declared = self.declared_length()?.unwrap_or(0);
                    if declared > 0 && !rest.is_empty() {
                        return Err(ParseError::BodyTooLong {
                            declared,
                            received: self.body.len() + rest.len(),
                        });
                    }
                    break;
                }
            }
        }

        Ok(consumed)
    }

    /// Hands out the parsed request once the parser reached `Done`.
    pub fn finish(self) -> Result<Request, ParseError> {
        if self.state != ParserState::Done {
            return Err(ParseError::Incomplete);
        }
        let request_line = self.request_line.ok_or(ParseError::Incomplete)?;

        Ok(Request {
            request_line,
            headers: self.headers,
            body: self.body,
        })
    }

    fn parse_request_line(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let Some(end) = find_crlf(data) else {
            return Ok(0);
        };

        let line = &data[..end];

        let parts: Vec<&[u8]> = line.split(|&b| b == b' ').collect();
        let [method, target, version] = parts[..] else {
            return Err(ParseError::InvalidRequestLine(
                String::from_utf8_lossy(line).into_owned(),
            ));
        };

        let method = match std::str::from_utf8(method) {
            Ok(m) if !m.is_empty() && m.to_uppercase() == m => m,
            _ => {
                return Err(ParseError::InvalidMethod(
                    String::from_utf8_lossy(method).into_owned(),
                ));
            }
        };

        if version != b"HTTP/1.1" {
            return Err(ParseError::InvalidVersion(
                String::from_utf8_lossy(version).into_owned(),
            ));
        }

        // The target is opaque; non-UTF-8 bytes are kept lossily.
        let target = String::from_utf8_lossy(target);

        self.request_line = Some(RequestLine {
            method: method.to_string(),
            target: target.to_string(),
            version: "1.1".to_string(),
        });

        Ok(end + CRLF.len())
    }

    fn declared_length(&self) -> Result<Option<usize>, ParseError> {
        let Some(raw) = self.headers.get("Content-Length") else {
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Some(0));
        }
        raw.parse()
            .map(Some)
            .map_err(|_| ParseError::InvalidContentLength(raw.to_string()))
    }
}

/// Reads one request from `reader` using a [`DEFAULT_READ_SIZE`] scratch buffer.
pub async fn read_request<R>(reader: &mut R) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    read_request_with_buffer_size(reader, DEFAULT_READ_SIZE).await
}

/// Drives a [`RequestParser`] over `reader` until the request is complete.
///
/// End of stream is only tolerated while reading a body: it triggers one last
/// parse attempt, after which a still-incomplete body is an error.
pub async fn read_request_with_buffer_size<R>(
    reader: &mut R,
    buffer_size: usize,
) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut parser = RequestParser::new();
    let mut scratch = vec![0u8; buffer_size.max(1)];
    let mut unparsed = BytesMut::with_capacity(buffer_size);
    let mut received = BytesMut::with_capacity(buffer_size);

    while !parser.is_done() {
        let n = reader.read(&mut scratch).await?;

        if n == 0 {
            if parser.state() != ParserState::ParsingBody {
                return Err(ParseError::UnexpectedEof);
            }

            let consumed = parser.feed(&unparsed)?;
            unparsed.advance(consumed);

            if !parser.is_done() {
                return Err(ParseError::BodyTooShort {
                    declared: parser.declared_length()?.unwrap_or(0),
                    received: parser.body_len(),
                });
            }
            break;
        }

        received.extend_from_slice(&scratch[..n]);
        unparsed.extend_from_slice(&scratch[..n]);

        let consumed = parser.feed(&unparsed)?;
        unparsed.advance(consumed);
    }

    tracing::trace!(
        bytes = received.len(),
        leftover = unparsed.len(),
        "request bytes received"
    );

    parser.finish()
}
