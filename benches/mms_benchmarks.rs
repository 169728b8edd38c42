// ABOUTME: Benchmark suite for the MMS PDU codec
// ABOUTME: Measures composing, parsing and round trips across header-only and body-carrying PDUs

use bytes::{Bytes, BytesMut};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mms::codec::{decode_uintvar, encode_uintvar};
use mms::datatypes::*;
use mms::pdu::*;
use mms::{Encodable, compose, parse};
use std::io::Cursor;
use std::time::Duration;

fn create_sample_send_req() -> SendReq {
    SendReq::new()
        .transaction_id(Some("T1700000000000".into()))
        .from(Some("+15555550100".into()))
        .date(1_700_000_000)
        .priority(Priority::High)
        .delivery_report(ReportFlag::Yes)
        .expiry(Some(1_700_604_800))
        .subject(Some("Dinner tonight?".into()))
}

fn create_sample_notification() -> NotificationInd {
    NotificationInd::new()
        .transaction_id(Some("N42".into()))
        .content_location(Some("http://mmsc.example.com/mms/get?id=42".into()))
        .message_size(Some(48_213))
        .expiry(Some(1_700_604_800))
        .from(Some("+15555550101".into()))
}

fn create_sample_retrieve_conf(payload_len: usize) -> RetrieveConf {
    let mut body = PduBody::new();
    body.add_part(PduPart::with_data("image/jpeg", Bytes::from(vec![0xAB; payload_len])));
    RetrieveConf::new()
        .transaction_id(Some("R42".into()))
        .message_id(Some("M42".into()))
        .date(1_700_000_000)
        .from(Some("+15555550101".into()))
        .subject(Some("Photo".into()))
        .content_type(Some("application/vnd.wap.multipart.related".into()))
        .body(body)
}

fn bench_compose(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose");
    group.measurement_time(Duration::from_secs(10));

    let send_req = GenericPdu::from(create_sample_send_req());
    let notification = GenericPdu::from(create_sample_notification());
    let send_conf = GenericPdu::from(SendConf::new(0x80).message_id(Some("M1".into())));

    group.bench_function("send_req", |b| b.iter(|| compose(black_box(&send_req))));
    group.bench_function("notification_ind", |b| {
        b.iter(|| compose(black_box(&notification)))
    });
    group.bench_function("send_conf", |b| b.iter(|| compose(black_box(&send_conf))));
    group.bench_function("send_req_direct", |b| {
        let req = create_sample_send_req();
        b.iter(|| black_box(&req).to_bytes().unwrap())
    });

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    group.measurement_time(Duration::from_secs(10));

    let send_req = compose(&create_sample_send_req().into()).unwrap();
    let notification = compose(&create_sample_notification().into()).unwrap();
    let retrieve_conf = compose(&create_sample_retrieve_conf(1024).into()).unwrap();

    group.bench_function("send_req", |b| b.iter(|| parse(black_box(&send_req)).unwrap()));
    group.bench_function("notification_ind", |b| {
        b.iter(|| parse(black_box(&notification)).unwrap())
    });
    group.bench_function("retrieve_conf", |b| {
        b.iter(|| parse(black_box(&retrieve_conf)).unwrap())
    });

    group.finish();
}

fn bench_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("roundtrip");
    group.measurement_time(Duration::from_secs(10));

    let send_req = GenericPdu::from(create_sample_send_req());
    group.bench_function("send_req", |b| {
        b.iter(|| {
            let bytes = compose(black_box(&send_req)).unwrap();
            parse(&bytes).unwrap()
        })
    });

    group.finish();
}

fn bench_body_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("body_sizes");
    group.measurement_time(Duration::from_secs(10));

    // Typical attachment sizes, up to a carrier's 300 KB limit
    let payload_sizes = [1_024, 16_384, 102_400, 307_200];

    for &size in &payload_sizes {
        let bytes = compose(&create_sample_retrieve_conf(size).into()).unwrap();

        group.bench_with_input(
            BenchmarkId::new("retrieve_conf_parse", size),
            &bytes,
            |b, bytes| b.iter(|| parse(black_box(bytes)).unwrap()),
        );
    }

    group.finish();
}

fn bench_primitives(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitives");

    group.bench_function("uintvar_encode", |b| {
        b.iter(|| {
            let mut buf = BytesMut::with_capacity(2);
            encode_uintvar(&mut buf, black_box(1000)).unwrap();
            buf
        })
    });

    group.bench_function("uintvar_decode", |b| {
        let encoded = [0x83, 0xE8];
        b.iter(|| {
            let mut cursor = Cursor::new(black_box(&encoded[..]));
            decode_uintvar(&mut cursor, "bench").unwrap()
        })
    });

    group.bench_function("encoded_string_utf8", |b| {
        let value = EncodedStringValue::from("Grüße aus Köln");
        b.iter(|| black_box(&value).string())
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_compose,
    bench_parse,
    bench_roundtrip,
    bench_body_sizes,
    bench_primitives
);
criterion_main!(benches);
