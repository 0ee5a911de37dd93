//! # Derivation and Codec Benchmarks
//!
//! Bump search walks down from 255 and hashes once per candidate, so the
//! cost varies per `(authority, id)`.

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use diary_program::codec::{Decode, Encode};
use diary_program::domain::services::diary_address_with_bump;
use diary_program::prelude::*;
use rand::Rng;

fn random_pubkey() -> Pubkey {
    Pubkey::new(rand::thread_rng().gen())
}

pub fn bench_diary_address(c: &mut Criterion) {
    let mut group = c.benchmark_group("diary/derivation");
    let program = DEFAULT_PROGRAM_ID;
    let authority = random_pubkey();

    group.bench_function("derive_diary_address", |b| {
        b.iter(|| derive_diary_address(black_box(&authority), black_box(1), &program))
    });

    let (_, bump) = derive_diary_address(&authority, 1, &program).unwrap_or_default();
    group.bench_function("diary_address_with_bump", |b| {
        b.iter(|| diary_address_with_bump(black_box(&authority), 1, bump, &program))
    });

    for count in [16u32, 128] {
        group.throughput(Throughput::Elements(u64::from(count)));
        group.bench_with_input(BenchmarkId::new("derive_many_ids", count), &count, |b, &n| {
            b.iter(|| {
                (0..n)
                    .filter_map(|id| derive_diary_address(&authority, id, &program).ok())
                    .count()
            })
        });
    }

    group.finish();
}

pub fn bench_diary_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("diary/codec");

    for records in [0usize, 32, MAX_RECORDS] {
        let mut diary = Diary::new(1, random_pubkey(), "benchmark diary", 254);
        diary.records = (0..records).map(|_| random_pubkey()).collect();
        let bytes = diary.encode();

        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", records), &diary, |b, d| {
            b.iter(|| black_box(d.encode()))
        });
        group.bench_with_input(BenchmarkId::new("decode", records), &bytes, |b, data| {
            b.iter(|| Diary::decode(black_box(data)))
        });
    }

    group.finish();
}
