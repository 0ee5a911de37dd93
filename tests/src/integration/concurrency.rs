//! # Concurrency
//!
//! Transactions sharing an account conflict instead of interleaving;
//! disjoint transactions run side by side.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::fixtures::{DiaryHarness, SOL};
    use diary_crypto::Ed25519KeyPair;
    use diary_program::prelude::*;
    use rand::distributions::Alphanumeric;
    use rand::Rng;

    async fn submit_until_unlocked(
        service: &DiaryService<InMemoryLedger>,
        tx: &Transaction,
    ) -> Result<TransactionReceipt, DiaryError> {
        loop {
            match service.process_transaction(tx).await {
                Err(DiaryError::Ledger(LedgerError::AccountInUse(_))) => {
                    tokio::task::yield_now().await;
                }
                other => return other,
            }
        }
    }

    #[tokio::test]
    async fn test_locked_diary_conflicts() {
        let h = DiaryHarness::new();
        h.create_diary(1, "busy").await.unwrap();
        let diary = h.diary_address(1);

        h.service.ledger().lock_accounts(&[diary]).unwrap();
        let record = h.fund_record(64);
        assert!(matches!(
            h.add_record(&record, 1, "blocked").await,
            Err(DiaryError::Ledger(LedgerError::AccountInUse(key))) if key == diary
        ));
        assert_eq!(h.service.stats().await.rejected_transactions, 1);

        h.service.ledger().unlock_accounts(&[diary]);
        h.add_record(&record, 1, "through").await.unwrap();
        assert_eq!(h.diary(1).await.record_count(), 1);
    }

    #[tokio::test]
    async fn test_locks_released_after_failure() {
        let h = DiaryHarness::new();
        assert!(h.create_diary(1, "").await.is_err());
        assert_eq!(h.service.ledger().locked_count(), 0);
        h.create_diary(1, "retry").await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_authorities() {
        let h = DiaryHarness::new();
        let mut handles = Vec::new();

        for i in 0..16u32 {
            let service = Arc::clone(&h.service);
            handles.push(tokio::spawn(async move {
                let authority = Ed25519KeyPair::generate();
                let key: Pubkey = authority.public_key().into();
                service.ledger().airdrop(key, SOL);
                let ix = instruction::create_diary(
                    &service.config().program_id,
                    &key,
                    i,
                    format!("diary {i}"),
                )?;
                let tx = Transaction::from_instruction(ix, &[&authority])?;
                service.process_transaction(&tx).await?;
                let address = service.diary_address(&key, i)?;
                service.get_diary(&address).await
            }));
        }

        for (i, handle) in handles.into_iter().enumerate() {
            let diary = handle.await.unwrap().unwrap();
            assert_eq!(diary.id, i as u32);
            assert_eq!(diary.name, format!("diary {i}"));
        }
        assert_eq!(h.service.stats().await.diaries_created, 16);
        assert_eq!(h.service.ledger().locked_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_shared_authority_serializes() {
        let h = DiaryHarness::new();
        let seed = h.authority.to_seed();
        let mut handles = Vec::new();

        for id in 0..12u32 {
            let service = Arc::clone(&h.service);
            handles.push(tokio::spawn(async move {
                let authority = Ed25519KeyPair::from_seed(seed);
                let key: Pubkey = authority.public_key().into();
                let ix = instruction::create_diary(
                    &service.config().program_id,
                    &key,
                    id,
                    "shared",
                )?;
                let tx = Transaction::from_instruction(ix, &[&authority])?;
                submit_until_unlocked(&service, &tx).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        for id in 0..12 {
            assert_eq!(h.diary(id).await.id, id);
        }
        let diary_rent = rent::minimum_balance(DIARY_ACCOUNT_LEN);
        assert_eq!(
            h.balance(&h.authority()).await,
            100 * SOL - 12 * diary_rent
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_records_in_one_diary() {
        let h = Arc::new(DiaryHarness::new());
        h.create_diary(1, "crowded").await.unwrap();

        // Funding locks the authority too, so do it up front.
        let records: Vec<_> = (0..8).map(|_| h.fund_record(64)).collect();

        let mut handles = Vec::new();
        for (i, record) in records.into_iter().enumerate() {
            let h = Arc::clone(&h);
            handles.push(tokio::spawn(async move {
                let ix = instruction::add_record(
                    &h.program(),
                    &h.authority(),
                    &record.public_key().into(),
                    1,
                    format!("entry {i}"),
                )?;
                let tx = Transaction::from_instruction(ix, &[&h.authority, &record])?;
                submit_until_unlocked(&h.service, &tx).await?;
                Ok::<_, DiaryError>(Pubkey::from(record.public_key()))
            }));
        }

        let mut keys = Vec::new();
        for handle in handles {
            keys.push(handle.await.unwrap().unwrap());
        }

        // No lost updates: every record landed exactly once.
        let diary = h.diary(1).await;
        assert_eq!(diary.record_count(), 8);
        for key in &keys {
            assert!(diary.contains_record(key));
        }
    }

    #[tokio::test]
    async fn test_random_text_round_trips() {
        let h = DiaryHarness::new();
        h.create_diary(1, "random").await.unwrap();
        let mut rng = rand::thread_rng();

        for _ in 0..20 {
            let len = rng.gen_range(0..200);
            let text: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(len)
                .map(char::from)
                .collect();
            let record = h.fund_record(256);
            let key: Pubkey = record.public_key().into();
            h.add_record(&record, 1, &text).await.unwrap();
            assert_eq!(h.service.get_record(&key).await.unwrap().text, text);
        }
        assert_eq!(h.diary(1).await.record_count(), 20);
    }
}
