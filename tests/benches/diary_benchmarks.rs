//! # Ledger Diary Benchmarks
//!
//! | Group | Measures |
//! |-------|----------|
//! | `diary/derivation` | Bump search and single-hash re-derivation |
//! | `diary/codec` | Diary encode/decode up to a full reference list |
//! | `diary/transaction` | Signature verification and message serialization |
//! | `diary/add_record` | add_record + remove_record through the service |

use criterion::{criterion_group, criterion_main};
use diary_tests::benchmarks::{derivation, transactions};

criterion_group!(
    benches,
    derivation::bench_diary_address,
    derivation::bench_diary_codec,
    transactions::bench_signature_verification,
    transactions::bench_add_record,
);

criterion_main!(benches);
