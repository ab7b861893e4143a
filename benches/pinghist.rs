use chrono::{TimeDelta, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};

fn encode_record(c: &mut Criterion) {
    let ts = Utc.with_ymd_and_hms(2015, 1, 1, 12, 30, 15).unwrap();

    c.bench_function("encode record", |b| {
        let mut buf = Vec::with_capacity(pinghist::record::RECORD_LEN);

        b.iter(|| {
            buf.clear();
            pinghist::record::encode_into(&mut buf, &ts, 14.2).unwrap();
        });
    });

    c.bench_function("decode record", |b| {
        let mut buf = vec![];
        pinghist::record::encode_into(&mut buf, &ts, 14.2).unwrap();

        b.iter(|| pinghist::record::decode(&buf).unwrap());
    });
}

fn sample_key(c: &mut Criterion) {
    let ts = Utc.with_ymd_and_hms(2015, 1, 1, 12, 30, 15).unwrap();

    c.bench_function("create sample key", |b| {
        b.iter(|| pinghist::SampleKey::new("127.0.0.1", &ts).unwrap());
    });

    c.bench_function("parse sample key", |b| {
        let key = pinghist::SampleKey::new("127.0.0.1", &ts).unwrap();
        b.iter(|| pinghist::SampleKey::parse(&key).unwrap());
    });
}

fn insert_sample(c: &mut Criterion) {
    c.bench_function("save single", |b| {
        let dir = tempfile::tempdir().unwrap();
        let db = pinghist::Database::open(&dir).unwrap();

        let mut ts = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();

        b.iter(|| {
            db.save("127.0.0.1", ts, 14.2).unwrap();
            ts += TimeDelta::seconds(1);
        });
    });
}

fn query(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let db = pinghist::Database::builder()
        .hyper_mode(true)
        .open(&dir)
        .unwrap();

    let start = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
    let end = start + TimeDelta::days(1);

    let samples = (0..86_400)
        .map(|s| {
            let rt = if s % 100 == 0 { -1.0 } else { (s % 50) as f32 };
            (start + TimeDelta::seconds(s), rt)
        })
        .collect::<Vec<_>>();

    db.save_all("127.0.0.1", &samples).unwrap();
    db.save_all("127.0.0.2", &samples).unwrap();

    c.bench_function("query day (hourly)", |b| {
        b.iter(|| {
            db.query("127.0.0.1", start, end, TimeDelta::hours(1))
                .unwrap();
        });
    });

    c.bench_function("query hour (per minute)", |b| {
        b.iter(|| {
            db.query("127.0.0.1", start, start + TimeDelta::hours(1), TimeDelta::minutes(1))
                .unwrap();
        });
    });
}

criterion_group!(benches, encode_record, sample_key, insert_sample, query);
criterion_main!(benches);
