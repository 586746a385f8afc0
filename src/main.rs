use httpwire::config::Config;
use httpwire::http::headers::Headers;
use httpwire::http::request::Request;
use httpwire::http::response::{StatusCode, default_headers};
use httpwire::http::writer::{ResponseWriter, WriterError};
use httpwire::server::{HandlerError, Server};

/// Bytes per frame on the `/chunked` route.
const CHUNK_SIZE: usize = 128;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let server = Server::start_with_config(&cfg, route).await?;
    tracing::info!(addr = %server.local_addr(), "Server started");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    server.stop()?;

    Ok(())
}

fn route(writer: &mut ResponseWriter, req: &Request) {
    let result = match req.target() {
        "/yourproblem" => html(
            writer,
            StatusCode::BadRequest,
            "Bad Request",
            "Your request honestly kinda sucked.",
        ),
        "/myproblem" => html(
            writer,
            StatusCode::InternalServerError,
            "Internal Server Error",
            "Okay, you know what? This one is on me.",
        ),
        "/chunked" if req.method() == "GET" => chunked(writer),
        "/chunked" => HandlerError::new(StatusCode::MethodNotAllowed, "use GET\n").respond(writer),
        _ => html(
            writer,
            StatusCode::Ok,
            "Success!",
            "Your request was an absolute banger.",
        ),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, target = %req.target(), "Handler failed to write response");
    }
}

fn html(
    writer: &mut ResponseWriter,
    status: StatusCode,
    heading: &str,
    text: &str,
) -> Result<(), WriterError> {
    let body = format!(
        "<html>\n  <head>\n    <title>{code} {reason}</title>\n  </head>\n  <body>\n    <h1>{heading}</h1>\n    <p>{text}</p>\n  </body>\n</html>",
        code = status.as_u16(),
        reason = status.reason_phrase(),
    );

    let mut headers = default_headers(body.len());
    headers.replace("Content-Type", "text/html");

    writer.write_status_line(status)?;
    writer.write_headers(Some(&headers))?;
    writer.write_body(body.as_bytes())
}

/// Streams a generated payload as chunks, announcing its length as a trailer.
fn chunked(writer: &mut ResponseWriter) -> Result<(), WriterError> {
    let payload: Vec<u8> = (0..1000).flat_map(|i| format!("line {}\n", i).into_bytes()).collect();

    let mut headers = default_headers(0);
    headers.remove("Content-Length");
    headers.put("Transfer-Encoding", "chunked");
    headers.put("Trailer", "X-Content-Length");

    writer.write_status_line(StatusCode::Ok)?;
    writer.write_headers(Some(&headers))?;
    for chunk in payload.chunks(CHUNK_SIZE) {
        writer.write_chunk(chunk)?;
    }
    writer.end_chunks()?;

    let mut trailers = Headers::new();
    trailers.put("X-Content-Length", &payload.len().to_string());
    writer.write_trailers(&trailers)
}
