use crate::http::request::Request;
use crate::http::response::StatusCode;
use crate::http::writer::{ResponseWriter, WriterError};

/// Application code invoked once per parsed request.
///
/// A handler writes its response through `writer` in order (status line,
/// headers, body or chunks, optional trailers). Whatever it buffered is sent
/// when it returns, even if it stopped half way.
///
/// Plain functions and closures implement this trait:
///
/// ```
/// use httpwire::http::request::Request;
/// use httpwire::http::response::StatusCode;
/// use httpwire::http::writer::ResponseWriter;
/// use httpwire::server::Handler;
///
/// fn hello(writer: &mut ResponseWriter, _req: &Request) {
///     let _ = writer.write_response(StatusCode::Ok, "hello\n");
/// }
///
/// fn assert_handler<H: Handler>(_: H) {}
/// assert_handler(hello);
/// ```
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, writer: &mut ResponseWriter, request: &Request);
}

impl<F> Handler for F
where
    F: Fn(&mut ResponseWriter, &Request) + Send + Sync + 'static,
{
    fn handle(&self, writer: &mut ResponseWriter, request: &Request) {
        self(writer, request)
    }
}

/// A status and message a handler can bail out with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    pub status: StatusCode,
    pub message: String,
}

impl HandlerError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Writes this error as a complete plain-text response.
    ///
    /// Fails if the writer already started a response.
    pub fn respond(&self, writer: &mut ResponseWriter) -> Result<(), WriterError> {
        writer.write_response(self.status, &self.message)
    }
}
