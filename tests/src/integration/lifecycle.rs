//! # Diary Lifecycle
//!
//! create_diary, add_record, write_record and remove_record end to end,
//! including the rent each step moves.

#[cfg(test)]
mod tests {
    use crate::fixtures::{DiaryHarness, SOL};
    use diary_program::prelude::*;

    // =========================================================================
    // REFERENCE FLOW
    // =========================================================================

    #[tokio::test]
    async fn test_create_add_remove_keeps_diary() {
        let h = DiaryHarness::new();
        h.create_diary(1, "My diary 1").await.unwrap();

        let record = h.fund_record(10_000);
        let record_key: Pubkey = record.public_key().into();
        h.add_record(&record, 1, "dasdasdasdas").await.unwrap();
        assert_eq!(
            h.service.get_record(&record_key).await.unwrap().text,
            "dasdasdasdas"
        );
        assert_eq!(h.diary(1).await.records, vec![record_key]);

        h.remove_record(&record_key, 1).await.unwrap();

        let diary = h.diary(1).await;
        assert_eq!(diary.id, 1);
        assert_eq!(diary.name, "My diary 1");
        assert!(diary.records.is_empty());
        assert!(matches!(
            h.service.get_record(&record_key).await,
            Err(DiaryError::NotFound(_))
        ));
        assert!(!h.service.ledger().account_exists(&record_key).await.unwrap());
    }

    #[tokio::test]
    async fn test_rent_flows() {
        let h = DiaryHarness::new();
        let start = h.balance(&h.authority()).await;

        h.create_diary(7, "rent").await.unwrap();
        let diary_rent = rent::minimum_balance(DIARY_ACCOUNT_LEN);
        assert_eq!(h.balance(&h.authority()).await, start - diary_rent);
        assert_eq!(h.balance(&h.diary_address(7)).await, diary_rent);

        let record = h.fund_record(128);
        let record_key: Pubkey = record.public_key().into();
        h.add_record(&record, 7, "paid by the caller").await.unwrap();
        assert_eq!(
            h.balance(&h.authority()).await,
            start - diary_rent - rent::minimum_balance(128)
        );

        let receipt = h.remove_record(&record_key, 7).await.unwrap();
        assert!(matches!(
            receipt.events[0],
            DiaryEvent::RecordRemoved { refunded, .. } if refunded == rent::minimum_balance(128)
        ));
        assert_eq!(h.balance(&h.authority()).await, start - diary_rent);
        assert_eq!(h.balance(&h.diary_address(7)).await, diary_rent);
    }

    // =========================================================================
    // CREATE
    // =========================================================================

    #[tokio::test]
    async fn test_double_create_rejected() {
        let h = DiaryHarness::new();
        h.create_diary(1, "first").await.unwrap();
        assert!(matches!(
            h.create_diary(1, "second").await,
            Err(DiaryError::AlreadyExists(_))
        ));
        assert_eq!(h.diary(1).await.name, "first");
    }

    #[tokio::test]
    async fn test_name_bounds() {
        let h = DiaryHarness::new();
        assert!(matches!(
            h.create_diary(1, "").await,
            Err(DiaryError::EmptyName)
        ));
        assert!(matches!(
            h.create_diary(1, &"x".repeat(MAX_NAME_LENGTH)).await,
            Err(DiaryError::NameTooLong { len: 20, max: 20 })
        ));
        h.create_diary(1, &"x".repeat(MAX_NAME_LENGTH - 1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_ids_derive_independent_diaries() {
        let h = DiaryHarness::new();
        for id in [0, 1, 2, 1_000, u32::MAX] {
            h.create_diary(id, &format!("diary {}", id % 100)).await.unwrap();
        }
        for id in [0, 1, 2, 1_000, u32::MAX] {
            assert_eq!(h.diary(id).await.id, id);
        }
        assert_ne!(h.diary_address(1), h.diary_address(2));
    }

    #[tokio::test]
    async fn test_diary_address_is_off_curve() {
        let h = DiaryHarness::new();
        h.create_diary(3, "pda").await.unwrap();
        let diary = h.diary(3).await;
        let (address, bump) =
            derive_diary_address(&h.authority(), 3, &h.program()).unwrap();
        assert_eq!(diary.bump, bump);
        assert!(!address.is_on_curve());
    }

    // =========================================================================
    // ADD
    // =========================================================================

    #[tokio::test]
    async fn test_records_keep_insertion_order() {
        let h = DiaryHarness::new();
        h.create_diary(1, "ordered").await.unwrap();

        let mut keys = Vec::new();
        for i in 0..5 {
            let record = h.fund_record(64);
            h.add_record(&record, 1, &format!("entry {i}")).await.unwrap();
            keys.push(Pubkey::from(record.public_key()));
        }
        assert_eq!(h.diary(1).await.records, keys);

        h.remove_record(&keys[2], 1).await.unwrap();
        keys.remove(2);
        assert_eq!(h.diary(1).await.records, keys);
        for (i, key) in keys.iter().enumerate() {
            let expected = if i < 2 { i } else { i + 1 };
            assert_eq!(
                h.service.get_record(key).await.unwrap().text,
                format!("entry {expected}")
            );
        }
    }

    #[tokio::test]
    async fn test_add_same_record_twice() {
        let h = DiaryHarness::new();
        h.create_diary(1, "dupes").await.unwrap();
        let record = h.fund_record(64);
        h.add_record(&record, 1, "once").await.unwrap();
        assert!(matches!(
            h.add_record(&record, 1, "twice").await,
            Err(DiaryError::AlreadyExists(_))
        ));
        assert_eq!(h.diary(1).await.record_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_record_unit_cannot_join_second_diary() {
        let h = DiaryHarness::new();
        h.create_diary(1, "first").await.unwrap();
        h.create_diary(2, "second").await.unwrap();
        let record = h.fund_record(64);
        let key: Pubkey = record.public_key().into();

        h.add_record(&record, 1, "").await.unwrap();
        assert_eq!(h.service.get_record(&key).await.unwrap().text, "");
        assert!(matches!(
            h.add_record(&record, 2, "").await,
            Err(DiaryError::AlreadyExists(_))
        ));
        assert!(h.diary(2).await.records.is_empty());

        h.remove_record(&key, 1).await.unwrap();
        assert!(h.diary(1).await.records.is_empty());
        assert!(h.diary(2).await.records.is_empty());
        assert!(!h.service.ledger().account_exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_record_too_small() {
        let h = DiaryHarness::new();
        h.create_diary(1, "tight").await.unwrap();
        let record = h.fund_record(8);
        assert!(matches!(
            h.add_record(&record, 1, "more than four bytes").await,
            Err(DiaryError::InsufficientSpace { required: 32, available: 8, .. })
        ));
        assert!(h.diary(1).await.records.is_empty());
    }

    #[tokio::test]
    async fn test_unfunded_record_not_found() {
        let h = DiaryHarness::new();
        h.create_diary(1, "ghost").await.unwrap();
        let record = diary_crypto::Ed25519KeyPair::generate();
        assert!(matches!(
            h.add_record(&record, 1, "nowhere").await,
            Err(DiaryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_add_to_missing_diary() {
        let h = DiaryHarness::new();
        let record = h.fund_record(64);
        assert!(matches!(
            h.add_record(&record, 9, "orphan").await,
            Err(DiaryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_diary_full() {
        let h = DiaryHarness::with_config(ServiceConfig {
            max_records: 2,
            ..ServiceConfig::default()
        });
        h.create_diary(1, "small").await.unwrap();
        for _ in 0..2 {
            let record = h.fund_record(32);
            h.add_record(&record, 1, "fits").await.unwrap();
        }
        let record = h.fund_record(32);
        assert!(matches!(
            h.add_record(&record, 1, "overflow").await,
            Err(DiaryError::DiaryFull { max: 2 })
        ));
    }

    #[tokio::test]
    async fn test_large_record_account() {
        let h = DiaryHarness::new();
        h.create_diary(1, "big").await.unwrap();
        let record = h.fund_record(MAX_PERMITTED_DATA_LENGTH);
        let text = "a".repeat(100_000);
        h.add_record(&record, 1, &text).await.unwrap();
        let key: Pubkey = record.public_key().into();
        assert_eq!(h.service.get_record(&key).await.unwrap().text.len(), 100_000);
        assert!(h.balance(&h.authority()).await < 100 * SOL);
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    #[tokio::test]
    async fn test_write_overwrites_and_extends() {
        let h = DiaryHarness::new();
        h.create_diary(1, "edits").await.unwrap();
        let record = h.fund_record(64);
        let key: Pubkey = record.public_key().into();
        h.add_record(&record, 1, "hello world").await.unwrap();

        h.write_record(&key, 1, 6, "diary").await.unwrap();
        assert_eq!(h.service.get_record(&key).await.unwrap().text, "hello diary");

        let receipt = h.write_record(&key, 1, 11, "!").await.unwrap();
        assert!(matches!(
            receipt.events[0],
            DiaryEvent::RecordWritten { offset: 11, len: 1, .. }
        ));
        assert_eq!(h.service.get_record(&key).await.unwrap().text, "hello diary!");
    }

    #[tokio::test]
    async fn test_write_past_end_zero_pads() {
        let h = DiaryHarness::new();
        h.create_diary(1, "gaps").await.unwrap();
        let record = h.fund_record(64);
        let key: Pubkey = record.public_key().into();
        h.add_record(&record, 1, "ab").await.unwrap();

        h.write_record(&key, 1, 4, "cd").await.unwrap();
        assert_eq!(h.service.get_record(&key).await.unwrap().text, "ab\0\0cd");
    }

    #[tokio::test]
    async fn test_write_beyond_capacity() {
        let h = DiaryHarness::new();
        h.create_diary(1, "cap").await.unwrap();
        let record = h.fund_record(24);
        let key: Pubkey = record.public_key().into();
        h.add_record(&record, 1, "short").await.unwrap();

        assert!(matches!(
            h.write_record(&key, 1, 10, "too long").await,
            Err(DiaryError::InsufficientSpace { .. })
        ));
        assert_eq!(h.service.get_record(&key).await.unwrap().text, "short");
    }

    #[tokio::test]
    async fn test_write_at_far_offset_rejected() {
        let h = DiaryHarness::new();
        h.create_diary(1, "far").await.unwrap();
        let record = h.fund_record(64);
        let key: Pubkey = record.public_key().into();
        h.add_record(&record, 1, "near").await.unwrap();

        assert!(matches!(
            h.write_record(&key, 1, u32::MAX - 8, "x").await,
            Err(DiaryError::InsufficientSpace { available: 64, .. })
        ));
        assert_eq!(h.service.get_record(&key).await.unwrap().text, "near");
        assert_eq!(h.service.stats().await.failed_transactions, 1);
    }

    #[tokio::test]
    async fn test_write_splitting_utf8_rejected() {
        let h = DiaryHarness::new();
        h.create_diary(1, "utf8").await.unwrap();
        let record = h.fund_record(32);
        let key: Pubkey = record.public_key().into();
        h.add_record(&record, 1, "é").await.unwrap();

        assert!(matches!(
            h.write_record(&key, 1, 1, "a").await,
            Err(DiaryError::CorruptRecord(CodecError::InvalidUtf8))
        ));
        assert_eq!(h.service.get_record(&key).await.unwrap().text, "é");
    }

    #[tokio::test]
    async fn test_write_unreferenced_record() {
        let h = DiaryHarness::new();
        h.create_diary(1, "strict").await.unwrap();
        let record = h.fund_record(32);
        let key: Pubkey = record.public_key().into();
        assert!(matches!(
            h.write_record(&key, 1, 0, "x").await,
            Err(DiaryError::NotFound(_))
        ));
    }

    // =========================================================================
    // REMOVE
    // =========================================================================

    #[tokio::test]
    async fn test_remove_twice() {
        let h = DiaryHarness::new();
        h.create_diary(1, "twice").await.unwrap();
        let record = h.fund_record(32);
        let key: Pubkey = record.public_key().into();
        h.add_record(&record, 1, "bye").await.unwrap();
        h.remove_record(&key, 1).await.unwrap();
        assert!(matches!(
            h.remove_record(&key, 1).await,
            Err(DiaryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_removed_address_can_be_reused() {
        let h = DiaryHarness::new();
        h.create_diary(1, "reuse").await.unwrap();
        let record = h.fund_record(32);
        let key: Pubkey = record.public_key().into();
        h.add_record(&record, 1, "first").await.unwrap();
        h.remove_record(&key, 1).await.unwrap();

        h.service
            .ledger()
            .create_account(
                &h.authority(),
                &key,
                rent::minimum_balance(32),
                32,
                &h.program(),
            )
            .unwrap();
        h.add_record(&record, 1, "second").await.unwrap();
        assert_eq!(h.service.get_record(&key).await.unwrap().text, "second");
        assert_eq!(h.diary(1).await.records, vec![key]);
    }

    // =========================================================================
    // STATS
    // =========================================================================

    #[tokio::test]
    async fn test_stats_track_operations() {
        let h = DiaryHarness::new();
        h.create_diary(1, "stats").await.unwrap();
        let record = h.fund_record(32);
        let key: Pubkey = record.public_key().into();
        h.add_record(&record, 1, "abc").await.unwrap();
        h.write_record(&key, 1, 3, "def").await.unwrap();
        h.remove_record(&key, 1).await.unwrap();
        let _ = h.create_diary(1, "stats").await;

        let stats = h.service.stats().await;
        assert_eq!(stats.transactions_processed, 5);
        assert_eq!(stats.successful_transactions, 4);
        assert_eq!(stats.failed_transactions, 1);
        assert_eq!(stats.diaries_created, 1);
        assert_eq!(stats.records_added, 1);
        assert_eq!(stats.records_removed, 1);
        assert_eq!(stats.record_bytes_written, 15 + 3);
    }
}
