use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use httpwire::http::parser::{
    ParseError, ParserState, RequestParser, read_request, read_request_with_buffer_size,
};
use httpwire::http::request::Request;
use tokio::io::{AsyncRead, ReadBuf};

/// Hands out at most `per_read` bytes per read, then end of stream.
struct ChunkReader {
    data: Vec<u8>,
    per_read: usize,
    pos: usize,
}

impl ChunkReader {
    fn new(data: &[u8], per_read: usize) -> Self {
        Self {
            data: data.to_vec(),
            per_read,
            pos: 0,
        }
    }
}

impl AsyncRead for ChunkReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = &mut *self;
        let end = (this.pos + this.per_read).min(this.data.len());
        let n = (end - this.pos).min(buf.remaining());
        buf.put_slice(&this.data[this.pos..this.pos + n]);
        this.pos += n;
        Poll::Ready(Ok(()))
    }
}

async fn parse_in_chunks(data: &[u8], per_read: usize) -> Result<Request, ParseError> {
    let mut reader = ChunkReader::new(data, per_read);
    read_request(&mut reader).await
}

const GOOD_REQUESTS: &[&[u8]] = &[
    b"GET / HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n",
    b"GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n",
    b"POST /submit HTTP/1.1\r\nHost: localhost:42069\r\nContent-Length: 13\r\n\r\nhello world!\n",
    b"PUT /x HTTP/1.1\r\nSet-Person: a\r\nset-person: b\r\nContent-Length: 4\r\n\r\n\x00\x01\x02\x03",
    b"DELETE /item/7 HTTP/1.1\r\nContent-Length: 0\r\n\r\n",
];

#[tokio::test]
async fn test_chunk_size_invariance() {
    for data in GOOD_REQUESTS {
        let reference = parse_in_chunks(data, data.len()).await.unwrap();

        for per_read in 1..=data.len() {
            let parsed = parse_in_chunks(data, per_read).await.unwrap();
            assert_eq!(parsed, reference, "chunk size {}", per_read);
        }
    }
}

#[tokio::test]
async fn test_get_one_byte_at_a_time() {
    let parsed = parse_in_chunks(b"GET / HTTP/1.1\r\nHost: h\r\n\r\n", 1)
        .await
        .unwrap();

    assert_eq!(parsed.method(), "GET");
    assert_eq!(parsed.target(), "/");
    assert_eq!(parsed.version(), "1.1");
    assert_eq!(parsed.header("host"), Some("h"));
    assert!(parsed.body.is_empty());
}

#[tokio::test]
async fn test_post_with_body() {
    for per_read in [1, 3, 7, 1024] {
        let parsed = parse_in_chunks(
            b"POST /x HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello",
            per_read,
        )
        .await
        .unwrap();

        assert_eq!(parsed.method(), "POST");
        assert_eq!(parsed.target(), "/x");
        assert_eq!(parsed.body, b"hello".to_vec());
    }
}

#[tokio::test]
async fn test_body_shorter_than_content_length() {
    for per_read in [1, 4, 1024] {
        let result = parse_in_chunks(
            b"POST /x HTTP/1.1\r\nContent-Length: 5\r\n\r\nhell",
            per_read,
        )
        .await;

        assert!(
            matches!(
                result,
                Err(ParseError::BodyTooShort {
                    declared: 5,
                    received: 4
                })
            ),
            "chunk size {}: {:?}",
            per_read,
            result
        );
    }
}

#[tokio::test]
async fn test_body_longer_than_content_length() {
    let data = b"POST /x HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello, world";

    let result = parse_in_chunks(data, data.len()).await;

    assert!(matches!(
        result,
        Err(ParseError::BodyTooLong {
            declared: 5,
            received: 12
        })
    ));
}

#[tokio::test]
async fn test_excess_body_in_later_read_is_not_read() {
    let data = b"POST /x HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello, world";

    // Reading stops once the declared body is complete.
    let parsed = parse_in_chunks(data, 1).await.unwrap();
    assert_eq!(parsed.body, b"hello".to_vec());

    // Excess sharing a read with the final body byte is rejected.
    let result = parse_in_chunks(data, 5).await;
    assert!(matches!(
        result,
        Err(ParseError::BodyTooLong {
            declared: 5,
            received: 6
        })
    ));
}

#[tokio::test]
async fn test_non_utf8_target_is_accepted() {
    for per_read in [1, 4, 1024] {
        let parsed = parse_in_chunks(b"GET /caf\xe9 HTTP/1.1\r\nHost: h\r\n\r\n", per_read)
            .await
            .unwrap();

        assert_eq!(parsed.method(), "GET");
        assert_eq!(parsed.target(), "/caf\u{FFFD}");
        assert_eq!(parsed.version(), "1.1");
        assert_eq!(parsed.header("host"), Some("h"));
    }
}

#[tokio::test]
async fn test_non_utf8_method_fails() {
    let result = parse_in_chunks(b"G\xc9T / HTTP/1.1\r\n\r\n", 8).await;

    assert!(matches!(result, Err(ParseError::InvalidMethod(_))));
}

#[tokio::test]
async fn test_zero_content_length_without_body() {
    let parsed = parse_in_chunks(b"POST / HTTP/1.1\r\nContent-Length: 0\r\n\r\n", 2)
        .await
        .unwrap();

    assert!(parsed.body.is_empty());
}

#[tokio::test]
async fn test_missing_content_length_ignores_body_bytes() {
    let data = b"POST /coffee HTTP/1.1\r\nHost: localhost:42069\r\n\r\n -d '{\"flavor\":\"dark mode\"}'";

    for per_read in [1, 5, data.len()] {
        let parsed = parse_in_chunks(data, per_read).await.unwrap();

        assert_eq!(parsed.method(), "POST");
        assert!(parsed.body.is_empty());
    }
}

#[tokio::test]
async fn test_invalid_request_lines() {
    let cases: &[&[u8]] = &[
        b"/coffee HTTP/1.1\r\nHost: localhost:42069\r\n\r\n",
        b"GET  /coffee HTTP/1.1\r\n\r\n",
        b"GET /coffee HTTP/1.1 extra\r\n\r\n",
    ];

    for data in cases {
        let result = parse_in_chunks(data, 3).await;
        assert!(
            matches!(result, Err(ParseError::InvalidRequestLine(_))),
            "{:?}",
            result
        );
    }
}

#[tokio::test]
async fn test_lowercase_method_fails() {
    for method in ["get", "Get", "gET"] {
        let data = format!("{} /coffee HTTP/1.1\r\n\r\n", method);
        let result = parse_in_chunks(data.as_bytes(), 4).await;

        assert!(matches!(result, Err(ParseError::InvalidMethod(_))));
    }
}

#[tokio::test]
async fn test_wrong_http_version_fails() {
    for version in ["HTTP/2.1", "HTTP/1.0", "http/1.1", "HTTP1.1", "HTTPS/1.1"] {
        let data = format!("GET /coffee {}\r\n\r\n", version);
        let result = parse_in_chunks(data.as_bytes(), 5).await;

        assert!(
            matches!(result, Err(ParseError::InvalidVersion(_))),
            "{}",
            version
        );
    }
}

#[tokio::test]
async fn test_malformed_header_fails() {
    let result = parse_in_chunks(b"GET / HTTP/1.1\r\nHost : localhost\r\n\r\n", 3).await;

    assert!(matches!(result, Err(ParseError::Header(_))));
}

#[tokio::test]
async fn test_invalid_content_length_fails() {
    let result = parse_in_chunks(b"POST / HTTP/1.1\r\nContent-Length: five\r\n\r\nhello", 64).await;

    assert!(matches!(result, Err(ParseError::InvalidContentLength(_))));
}

#[tokio::test]
async fn test_eof_before_headers_end() {
    let result = parse_in_chunks(b"GET / HTTP/1.1\r\nHost: localhost\r\n", 8).await;

    assert!(matches!(result, Err(ParseError::UnexpectedEof)));
}

#[tokio::test]
async fn test_empty_stream() {
    let result = parse_in_chunks(b"", 8).await;

    assert!(matches!(result, Err(ParseError::UnexpectedEof)));
}

#[tokio::test]
async fn test_small_scratch_buffer() {
    let data = b"POST /x HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
    let mut reader = ChunkReader::new(data, data.len());

    let parsed = read_request_with_buffer_size(&mut reader, 2).await.unwrap();

    assert_eq!(parsed.body, b"hello".to_vec());
}

#[test]
fn test_feed_reports_consumed_bytes() {
    let mut parser = RequestParser::new();

    let n = parser.feed(b"GET / HTTP/1.1\r\nHost: a\r\nAcc").unwrap();
    assert_eq!(n, 25);
    assert_eq!(parser.state(), ParserState::ParsingHeaders);

    let n = parser.feed(b"Accept: */*\r\n\r\n").unwrap();
    assert_eq!(n, 15);
    assert_eq!(parser.state(), ParserState::Done);

    let parsed = parser.finish().unwrap();
    assert_eq!(parsed.header("Accept"), Some("*/*"));
}

#[test]
fn test_feed_partial_body_waits() {
    let mut parser = RequestParser::new();

    let n = parser
        .feed(b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nhello")
        .unwrap();

    assert_eq!(parser.state(), ParserState::ParsingBody);
    assert_eq!(parser.body_len(), 5);
    assert_eq!(n, 44);

    parser.feed(b"world").unwrap();
    assert!(parser.is_done());
    assert_eq!(parser.finish().unwrap().body, b"helloworld".to_vec());
}

#[test]
fn test_feed_after_done_with_leftover_fails() {
    let mut parser = RequestParser::new();
    parser
        .feed(b"POST / HTTP/1.1\r\nContent-Length: 2\r\n\r\nhi")
        .unwrap();
    assert!(parser.is_done());

    let result = parser.feed(b"!");

    assert!(matches!(
        result,
        Err(ParseError::BodyTooLong {
            declared: 2,
            received: 3
        })
    ));
}

#[test]
fn test_feed_after_done_without_length_is_ignored() {
    let mut parser = RequestParser::new();
    parser.feed(b"GET / HTTP/1.1\r\n\r\n").unwrap();

    assert_eq!(parser.feed(b"trailing").unwrap(), 0);
    assert!(parser.is_done());
}
