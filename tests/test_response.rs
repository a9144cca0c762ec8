use owlet::http::request::Version;
use owlet::http::response::{
    DeliveryMode, Response, StatusCode, content_range, parse_content_range, parse_range,
    resolve_range,
};
use owlet::http::session::Session;
use owlet::http::writer;
use std::io::Write as _;
use tokio::io::AsyncReadExt;

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::PartialContent.as_u16(), 206);
    assert_eq!(StatusCode::NotModified.as_u16(), 304);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
    assert_eq!(StatusCode::MethodNotAllowed.as_u16(), 405);
    assert_eq!(StatusCode::RangeNotSatisfiable.as_u16(), 416);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(StatusCode::PartialContent.reason_phrase(), "Partial Content");
    assert_eq!(StatusCode::NotModified.reason_phrase(), "Not Modified");
    assert_eq!(
        StatusCode::RangeNotSatisfiable.reason_phrase(),
        "Requested Range Not Satisfiable"
    );
}

#[test]
fn test_reason_override() {
    let mut response = Response::new();
    response.set_status_with_reason(StatusCode::NotFound, "no such thing");
    assert_eq!(response.reason(), "no such thing");
    response.set_status(StatusCode::NotFound);
    assert_eq!(response.reason(), "Not Found");
}

#[test]
fn test_redirect_picks_status_by_version() {
    let mut response = Response::new();
    response.redirect("/next", Version::HTTP_11);
    assert_eq!(response.status, StatusCode::SeeOther);
    assert_eq!(response.header("Location"), Some("/next"));

    let mut response = Response::new();
    response.redirect("/next", Version::HTTP_10);
    assert_eq!(response.status, StatusCode::Found);
}

#[test]
fn test_write_error_replaces_body() {
    let mut response = Response::new();
    response.write("partial output");
    response.write_error(StatusCode::NotFound, "/x FILE NOT FOUND");
    assert_eq!(response.status, StatusCode::NotFound);
    assert_eq!(response.body(), b"/x FILE NOT FOUND");
}

#[test]
fn test_parse_range_forms() {
    assert_eq!(parse_range("bytes=0-499"), Some((Some(0), Some(499))));
    assert_eq!(parse_range("bytes=100-"), Some((Some(100), None)));
    assert_eq!(parse_range("bytes=-100"), Some((None, Some(100))));
    assert_eq!(parse_range("bytes = 5-9"), Some((Some(5), Some(9))));
    assert_eq!(parse_range("items=0-5"), None);
    assert_eq!(parse_range("bytes=a-b"), None);
    assert_eq!(parse_range("bytes"), None);
}

#[test]
fn test_resolve_range_full_file_is_satisfiable() {
    let r = resolve_range("bytes=0-499", 500, u64::MAX).unwrap();
    assert_eq!((r.start, r.end, r.len), (0, 499, 500));
}

#[test]
fn test_resolve_range_interior() {
    let r = resolve_range("bytes=100-199", 500, u64::MAX).unwrap();
    assert_eq!((r.start, r.end, r.len), (100, 199, 100));
}

#[test]
fn test_resolve_range_suffix_form() {
    let r = resolve_range("bytes=-100", 500, u64::MAX).unwrap();
    assert_eq!((r.start, r.end, r.len), (400, 499, 100));
    // Suffix longer than the file clamps to the whole file.
    let r = resolve_range("bytes=-9999", 500, u64::MAX).unwrap();
    assert_eq!((r.start, r.end, r.len), (0, 499, 500));
}

#[test]
fn test_resolve_range_open_end() {
    let r = resolve_range("bytes=400-", 500, u64::MAX).unwrap();
    assert_eq!((r.start, r.end, r.len), (400, 499, 100));
}

#[test]
fn test_resolve_range_unsatisfiable() {
    assert!(resolve_range("bytes=500-", 500, u64::MAX).is_none());
    assert!(resolve_range("bytes=0-500", 500, u64::MAX).is_none());
    assert!(resolve_range("bytes=200-100", 500, u64::MAX).is_none());
    assert!(resolve_range("bytes=-0", 500, u64::MAX).is_none());
    assert!(resolve_range("bytes=0-0", 0, u64::MAX).is_none());
}

#[test]
fn test_resolve_range_clamped_to_max_chunk() {
    let r = resolve_range("bytes=0-", 1000, 100).unwrap();
    assert_eq!((r.start, r.end, r.len), (0, 99, 100));
}

#[test]
fn test_content_range_round_trip() {
    let value = content_range(100, 199, 500);
    assert_eq!(value, "bytes 100-199/500");
    assert_eq!(parse_content_range(&value), Some((100, 199, 500)));
    assert_eq!(parse_content_range("bytes */500"), None);
}

#[test]
fn test_enable_range_satisfiable_becomes_partial_content() {
    let mut response = Response::new();
    response.set_file("/tmp/app.js", 500, "text/javascript");
    response.enable_range("bytes=100-199", u64::MAX);

    assert_eq!(response.status, StatusCode::PartialContent);
    assert_eq!(response.header("Content-Range"), Some("bytes 100-199/500"));
    assert_eq!(response.header("Content-Length"), Some("100"));
    let file = response.file().unwrap();
    assert_eq!(file.mode, DeliveryMode::Range { start: 100, len: 100 });
}

#[test]
fn test_enable_range_unsatisfiable_drops_file_body() {
    let mut response = Response::new();
    response.set_file("/tmp/app.js", 500, "text/javascript");
    response.enable_range("bytes=900-999", u64::MAX);

    assert_eq!(response.status, StatusCode::RangeNotSatisfiable);
    assert_eq!(response.header("Content-Range"), Some("bytes */500"));
    assert!(response.file().is_none());
}

fn header_block_and_body(raw: &[u8]) -> (String, Vec<u8>) {
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("no header terminator");
    (
        String::from_utf8(raw[..split + 2].to_vec()).unwrap(),
        raw[split + 4..].to_vec(),
    )
}

#[test]
fn test_serialize_headers_defaults() {
    let mut response = Response::new();
    response.write("hello");
    let block = writer::serialize_headers(&mut response, Version::HTTP_11, false);
    let text = String::from_utf8(block).unwrap();

    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(text.contains("Content-Type: text/html; charset=utf-8\r\n"));
    assert!(text.contains("Content-Length: 5\r\n"));
    assert!(text.contains("Connection: keep-alive\r\n"));
    assert!(text.contains("Date: "));
    assert!(text.ends_with("\r\n\r\n"));
}

#[test]
fn test_serialize_headers_close_and_cookies() {
    let mut response = Response::new();
    response.set_cookie("sid", "abc", "/", None);
    response.set_cookie("theme", "dark", "/ui", Some("Wed, 01 Jan 2030 00:00:00 GMT"));
    let block = writer::serialize_headers(&mut response, Version::HTTP_11, true);
    let text = String::from_utf8(block).unwrap();

    assert!(text.contains("Connection: close\r\n"));
    assert!(text.contains("Set-Cookie: sid=abc; Path=/\r\n"));
    assert!(text.contains(
        "Set-Cookie: theme=dark; Path=/ui; Expires=Wed, 01 Jan 2030 00:00:00 GMT\r\n"
    ));
}

#[test]
fn test_handler_headers_emitted_before_defaults() {
    let mut response = Response::new();
    response.set_header("X-Request-Id", "42");
    response.set_header("Content-Type", "text/plain");
    let text =
        String::from_utf8(writer::serialize_headers(&mut response, Version::HTTP_11, true))
            .unwrap();

    let pos = |needle: &str| text.find(needle).unwrap();
    assert!(pos("X-Request-Id: 42") < pos("Date: "));
    assert!(pos("Content-Type: text/plain") < pos("Date: "));
    assert!(pos("X-Request-Id: 42") < pos("Connection: close"));
}

#[test]
fn test_set_header_replaces_in_place() {
    let mut response = Response::new();
    response.set_header("X-A", "1");
    response.set_header("X-B", "2");
    response.set_header("X-A", "3");
    let text =
        String::from_utf8(writer::serialize_headers(&mut response, Version::HTTP_11, true))
            .unwrap();

    assert_eq!(response.header("X-A"), Some("3"));
    assert_eq!(text.matches("X-A: ").count(), 1);
    assert!(text.find("X-A: 3").unwrap() < text.find("X-B: 2").unwrap());
}

#[test]
fn test_serialize_headers_empty_for_legacy() {
    let mut response = Response::new();
    response.write("raw body only");
    let block = writer::serialize_headers(&mut response, Version::HTTP_09, true);
    assert!(block.is_empty());
}

#[test]
fn test_serialize_headers_file_modes() {
    let mut response = Response::new();
    response.set_file("/srv/static/app.js", 500, "text/javascript");
    let text =
        String::from_utf8(writer::serialize_headers(&mut response, Version::HTTP_11, true))
            .unwrap();
    assert!(text.contains("Content-Length: 500\r\n"));
    assert!(text.contains("Content-Disposition: attachment; filename=app.js\r\n"));

    let mut response = Response::new();
    response.set_file("/srv/static/app.js", 500, "text/javascript");
    response.enable_chunked();
    let text =
        String::from_utf8(writer::serialize_headers(&mut response, Version::HTTP_11, true))
            .unwrap();
    assert!(text.contains("Transfer-Encoding: chunked\r\n"));
    assert!(!text.contains("Content-Length"));
}

async fn send_and_collect(response: &mut Response, version: Version) -> Vec<u8> {
    let (server, mut client) = tokio::io::duplex(1 << 20);
    let mut session = Session::new(server);
    session.close_connection = true;
    writer::send_response(&mut session, response, version, 8)
        .await
        .unwrap();
    drop(session);
    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    out
}

#[tokio::test]
async fn test_send_memory_body() {
    let mut response = Response::new();
    response.write("hello body");
    let raw = send_and_collect(&mut response, Version::HTTP_11).await;
    let (head, body) = header_block_and_body(&raw);
    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(body, b"hello body");
}

#[tokio::test]
async fn test_send_head_response_skips_body() {
    let mut response = Response::new();
    response.write("hidden");
    response.only_header();
    let raw = send_and_collect(&mut response, Version::HTTP_11).await;
    let (head, body) = header_block_and_body(&raw);
    assert!(head.contains("Content-Length: 6\r\n"));
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_send_whole_file_body() {
    let payload: Vec<u8> = (0u32..500).map(|i| (i % 256) as u8).collect();
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(&payload).unwrap();

    let mut response = Response::new();
    response.set_file(tmp.path(), payload.len() as u64, "application/octet-stream");
    let raw = send_and_collect(&mut response, Version::HTTP_11).await;
    let (head, body) = header_block_and_body(&raw);
    assert!(head.contains("Content-Length: 500\r\n"));
    assert_eq!(body, payload);
}

#[tokio::test]
async fn test_send_range_file_body() {
    let payload: Vec<u8> = (0u32..500).map(|i| (i % 256) as u8).collect();
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(&payload).unwrap();

    let mut response = Response::new();
    response.set_file(tmp.path(), payload.len() as u64, "application/octet-stream");
    response.enable_range("bytes=100-199", u64::MAX);
    let raw = send_and_collect(&mut response, Version::HTTP_11).await;
    let (head, body) = header_block_and_body(&raw);
    assert!(head.starts_with("HTTP/1.1 206 Partial Content\r\n"));
    assert!(head.contains("Content-Range: bytes 100-199/500\r\n"));
    assert_eq!(body, &payload[100..200]);
}

#[tokio::test]
async fn test_send_chunked_file_framing() {
    let payload = b"ABCDEFGHIJKLMNOPQRST";
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(payload).unwrap();

    let mut response = Response::new();
    response.set_file(tmp.path(), payload.len() as u64, "application/octet-stream");
    response.enable_chunked();
    // max_chunk_size is 8 in send_and_collect: 8 + 8 + 4 bytes.
    let raw = send_and_collect(&mut response, Version::HTTP_11).await;
    let (head, body) = header_block_and_body(&raw);
    assert!(head.contains("Transfer-Encoding: chunked\r\n"));
    assert_eq!(
        body,
        b"8\r\nABCDEFGH\r\n8\r\nIJKLMNOP\r\n4\r\nQRST\r\n0\r\n\r\n"
    );
}

#[tokio::test]
async fn test_send_not_modified_has_no_body() {
    let mut response = Response::new();
    response.set_status(StatusCode::NotModified);
    response.write("should not appear");
    let raw = send_and_collect(&mut response, Version::HTTP_11).await;
    let (head, body) = header_block_and_body(&raw);
    assert!(head.starts_with("HTTP/1.1 304 Not Modified\r\n"));
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_default_error_page() {
    let (server, mut client) = tokio::io::duplex(1 << 16);
    let mut session = Session::new(server);
    writer::send_default_error(&mut session, Version::HTTP_11, StatusCode::BadRequest)
        .await
        .unwrap();
    drop(session);
    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    let (head, body) = header_block_and_body(&out);

    assert!(head.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(head.contains("Connection: close\r\n"));
    assert_eq!(body, b"400 Bad Request");
}

#[tokio::test]
async fn test_default_error_silent_for_legacy() {
    let (server, mut client) = tokio::io::duplex(1 << 16);
    let mut session = Session::new(server);
    writer::send_default_error(&mut session, Version::HTTP_09, StatusCode::BadRequest)
        .await
        .unwrap();
    drop(session);
    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    assert!(out.is_empty());
}
