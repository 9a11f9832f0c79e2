use std::hint::black_box;

use bencher::{TestCase, TestFile};
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use micro_parser::codec::{MultipartDecoder, RequestHeadDecoder};
use micro_parser::parser::{HeaderParser, Parser};
use micro_parser::protocol::{BodyPartItem, ParserState};
use tokio_util::bytes::BytesMut;
use tokio_util::codec::Decoder;

static SMALL_HEADER: TestFile = TestFile::new("get_small.txt", include_bytes!("../resources/request/get_small.txt"));
static LARGE_HEADER: TestFile = TestFile::new("get_large.txt", include_bytes!("../resources/request/get_large.txt"));
static UPLOAD: TestFile = TestFile::new("upload.txt", include_bytes!("../resources/multipart/upload.txt"));

const UPLOAD_BOUNDARY: &str = "----micro7MA4YWxkTrZu0gW";

/// Offset of the header block, right after the request line.
fn header_block(file: &TestFile) -> &'static [u8] {
    let content = file.content();
    let start = content.windows(2).position(|w| w == b"\r\n").map_or(0, |i| i + 2);
    &content[start..]
}

fn benchmark_header_parser(criterion: &mut Criterion) {
    let test_cases = [
        TestCase::whole("small_header", SMALL_HEADER),
        TestCase::whole("large_header", LARGE_HEADER),
        TestCase::chunked("large_header_64", LARGE_HEADER, 64),
        TestCase::chunked("large_header_1", LARGE_HEADER, 1),
    ];
    let mut group = criterion.benchmark_group("header_parser");

    for case in test_cases {
        let block = header_block(case.file());
        let chunk_size = case.chunks().next().map_or(1, <[u8]>::len);
        group.throughput(Throughput::Bytes(block.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &block, |b, block| {
            b.iter(|| {
                let mut parser = HeaderParser::default();
                for chunk in block.chunks(chunk_size) {
                    if parser.parse(chunk, false).state != ParserState::NeedMoreData {
                        break;
                    }
                }
                black_box(parser.into_sink())
            });
        });
    }

    group.finish();
}

fn benchmark_request_head_decoder(criterion: &mut Criterion) {
    let test_cases = [TestCase::whole("small_header_decoder", SMALL_HEADER), TestCase::whole("large_header_decoder", LARGE_HEADER)];
    let mut group = criterion.benchmark_group("request_head_decoder");

    for case in test_cases {
        group.throughput(Throughput::Bytes(case.file().content().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            let mut decoder = RequestHeadDecoder::new();
            b.iter_batched_ref(
                || BytesMut::from(case.file().content()),
                |bytes_mut| {
                    let header = decoder.decode(bytes_mut).expect("input should be a valid request head").unwrap();
                    black_box(header);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn benchmark_multipart_decoder(criterion: &mut Criterion) {
    let test_cases =
        [TestCase::whole("upload", UPLOAD), TestCase::chunked("upload_4k", UPLOAD, 4096), TestCase::chunked("upload_64", UPLOAD, 64)];
    let mut group = criterion.benchmark_group("multipart_decoder");

    for case in test_cases {
        group.throughput(Throughput::Bytes(case.file().content().len() as u64));
        group.bench_with_input(BenchmarkId::new(case.name(), case.file_name()), &case, |b, case| {
            b.iter(|| {
                let mut decoder = MultipartDecoder::new(UPLOAD_BOUNDARY).expect("boundary should be valid");
                let mut buffer = BytesMut::new();
                let mut items = 0;
                for chunk in case.chunks() {
                    buffer.extend_from_slice(chunk);
                    while let Some(item) = decoder.decode(&mut buffer).expect("input should be a valid multipart body") {
                        items += 1;
                        if item == BodyPartItem::Eof {
                            break;
                        }
                    }
                }
                black_box(items)
            });
        });
    }

    group.finish();
}

criterion_group!(decoder, benchmark_header_parser, benchmark_request_head_decoder, benchmark_multipart_decoder);
criterion_main!(decoder);
