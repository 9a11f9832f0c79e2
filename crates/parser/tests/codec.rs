//! The decoders driven by `FramedRead` over a reader that delivers small, uneven reads.

use std::io;

use bytes::Bytes;
use futures::StreamExt;
use indoc::indoc;
use micro_parser::codec::{FormDecoder, MultipartDecoder, RequestHeadDecoder, ResponseHeadDecoder};
use micro_parser::protocol::{BodyPartItem, FormField, ParseError};
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;
use tokio_util::io::StreamReader;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A reader returning `input` in reads of `read_size` bytes.
fn reader(input: &str, read_size: usize) -> impl AsyncRead + Unpin + use<> {
    let reads: Vec<io::Result<Bytes>> =
        input.replace('\n', "\r\n").into_bytes().chunks(read_size).map(|chunk| Ok(Bytes::copy_from_slice(chunk))).collect();
    StreamReader::new(futures::stream::iter(reads))
}

const UPLOAD: &str = indoc! {r#"
    POST /upload HTTP/1.1
    Host: 127.0.0.1:8080
    Content-Type: multipart/form-data; boundary=----WebKitFormBoundary7MA4YWxkTrZu0gW

    ------WebKitFormBoundary7MA4YWxkTrZu0gW
    Content-Disposition: form-data; name="title"

    Quarterly report
    ------WebKitFormBoundary7MA4YWxkTrZu0gW
    Content-Disposition: form-data; name="file"; filename="notes.txt"
    Content-Type: text/plain

    --first line
    ------WebKitFormBoundary7MA4YWxkTrZu0gW--
    "#};

#[tokio::test]
async fn request_with_multipart_body() {
    init_tracing();

    for read_size in [1, 3, 16, 1024] {
        let mut framed = FramedRead::new(reader(UPLOAD, read_size), RequestHeadDecoder::new());

        let header = framed.next().await.unwrap().unwrap();
        assert_eq!(header.method(), &http::Method::POST);
        assert_eq!(header.uri().path(), "/upload");

        let decoder = MultipartDecoder::from_headers(header.headers()).unwrap();
        let mut framed = framed.map_decoder(|_| decoder);

        let mut parts = vec![Vec::new()];
        while let Some(item) = framed.next().await {
            match item.unwrap() {
                BodyPartItem::Chunk(bytes) => parts.last_mut().unwrap().extend_from_slice(&bytes),
                BodyPartItem::PartEnd => parts.push(Vec::new()),
                BodyPartItem::Eof => break,
            }
        }

        assert_eq!(parts.len(), 3, "read size {read_size}");
        assert!(parts[0].is_empty());
        assert_eq!(parts[1], b"Content-Disposition: form-data; name=\"title\"\r\n\r\nQuarterly report");
        assert!(parts[2].ends_with(b"Content-Type: text/plain\r\n\r\n--first line"));
    }
}

#[tokio::test]
async fn keep_alive_request_heads() {
    init_tracing();

    let input = "GET /1 HTTP/1.1\nHost: a\n\nGET /2 HTTP/1.1\nHost: b\n\n";
    let paths: Vec<String> = FramedRead::new(reader(input, 5), RequestHeadDecoder::new())
        .map(|header| header.unwrap().uri().path().to_owned())
        .collect()
        .await;

    assert_eq!(paths, vec!["/1", "/2"]);
}

#[tokio::test]
async fn response_head() {
    init_tracing();

    let input = "HTTP/1.1 503 Service Unavailable\nRetry-After: 120\n\n";
    let mut framed = FramedRead::new(reader(input, 4), ResponseHeadDecoder::new());

    let header = framed.next().await.unwrap().unwrap();
    assert_eq!(header.status(), http::StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(header.reason(), "Service Unavailable");
    assert_eq!(header.headers()[http::header::RETRY_AFTER], "120");
    assert!(framed.next().await.is_none());
}

#[tokio::test]
async fn form_body() {
    init_tracing();

    let mut framed = FramedRead::new(reader("name=micro&tags=http&tags=mime&draft", 3), FormDecoder::new());
    let fields = framed.next().await.unwrap().unwrap();
    assert_eq!(
        fields,
        vec![
            FormField::new(Some("name"), "micro"),
            FormField::new(Some("tags"), "http"),
            FormField::new(Some("tags"), "mime"),
            FormField::new(None, "draft"),
        ]
    );
    assert!(framed.next().await.is_none());
}

#[tokio::test]
async fn form_body_of_exactly_max_size() {
    init_tracing();

    let input = "name=micro&draft";
    for read_size in [1, 4, input.len()] {
        let mut framed = FramedRead::new(reader(input, read_size), FormDecoder::with_max_size(input.len()).unwrap());
        let fields = framed.next().await.unwrap().unwrap();
        assert_eq!(fields, vec![FormField::new(Some("name"), "micro"), FormField::new(None, "draft")]);
    }

    let mut framed = FramedRead::new(reader(input, 4), FormDecoder::with_max_size(input.len() - 1).unwrap());
    assert!(matches!(framed.next().await, Some(Err(ParseError::TooLarge { what: "form body", .. }))));
}

#[tokio::test]
async fn truncated_multipart_body() {
    init_tracing();

    let mut framed = FramedRead::new(reader("--b\npart one\n--b\npart", 4), MultipartDecoder::new("b").unwrap());
    let mut error = None;
    while let Some(item) = framed.next().await {
        if let Err(e) = item {
            error = Some(e);
            break;
        }
    }

    assert!(matches!(error, Some(ParseError::InvalidMultipart { .. })));
}

#[tokio::test]
async fn truncated_head() {
    init_tracing();

    let mut framed = FramedRead::new(reader("GET / HTTP/1.1\nHost: a\n", 7), RequestHeadDecoder::new());
    assert!(matches!(framed.next().await, Some(Err(ParseError::Io { .. }))));
}
