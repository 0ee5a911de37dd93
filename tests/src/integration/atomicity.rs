//! # Atomic Transactions
//!
//! A transaction's instructions commit together or not at all, and lamports
//! are neither created nor destroyed.

#[cfg(test)]
mod tests {
    use crate::fixtures::DiaryHarness;
    use diary_program::prelude::*;

    async fn total_lamports(h: &DiaryHarness, keys: &[Pubkey]) -> Lamports {
        let mut total = 0;
        for key in keys {
            total += h.balance(key).await;
        }
        total
    }

    #[tokio::test]
    async fn test_create_and_add_in_one_transaction() {
        let h = DiaryHarness::new();
        let record = h.fund_record(64);
        let record_key: Pubkey = record.public_key().into();

        let create = instruction::create_diary(&h.program(), &h.authority(), 5, "batch").unwrap();
        let add =
            instruction::add_record(&h.program(), &h.authority(), &record_key, 5, "same tx")
                .unwrap();
        let tx = Transaction::new_signed(
            Message::new(vec![create, add], h.authority()),
            &[&h.authority, &record],
        )
        .unwrap();

        let receipt = h.service.process_transaction(&tx).await.unwrap();
        assert_eq!(receipt.events.len(), 2);
        assert_eq!(receipt.events[0].kind(), "diary_created");
        assert_eq!(receipt.events[1].kind(), "record_added");
        assert_eq!(h.diary(5).await.records, vec![record_key]);
    }

    #[tokio::test]
    async fn test_failing_instruction_rolls_back_earlier_ones() {
        let h = DiaryHarness::new();
        let record = h.fund_record(8);
        let record_key: Pubkey = record.public_key().into();
        let before = h.balance(&h.authority()).await;

        let create = instruction::create_diary(&h.program(), &h.authority(), 5, "doomed").unwrap();
        let add = instruction::add_record(
            &h.program(),
            &h.authority(),
            &record_key,
            5,
            "does not fit in eight bytes",
        )
        .unwrap();
        let tx = Transaction::new_signed(
            Message::new(vec![create, add], h.authority()),
            &[&h.authority, &record],
        )
        .unwrap();

        assert!(matches!(
            h.service.process_transaction(&tx).await,
            Err(DiaryError::InsufficientSpace { .. })
        ));
        assert!(matches!(
            h.service.get_diary(&h.diary_address(5)).await,
            Err(DiaryError::NotFound(_))
        ));
        assert_eq!(h.balance(&h.authority()).await, before);
        assert_eq!(h.service.ledger().locked_count(), 0);

        let stats = h.service.stats().await;
        assert_eq!(stats.failed_transactions, 1);
        assert_eq!(stats.diaries_created, 0);
    }

    #[tokio::test]
    async fn test_add_then_remove_in_one_transaction() {
        let h = DiaryHarness::new();
        h.create_diary(1, "fleeting").await.unwrap();
        let record = h.fund_record(64);
        let record_key: Pubkey = record.public_key().into();
        let rent_before = h.balance(&record_key).await;

        let add = instruction::add_record(&h.program(), &h.authority(), &record_key, 1, "blink")
            .unwrap();
        let remove = instruction::remove_record(&h.program(), &h.authority(), &record_key, 1)
            .unwrap();
        let tx = Transaction::new_signed(
            Message::new(vec![add, remove], h.authority()),
            &[&h.authority, &record],
        )
        .unwrap();

        let receipt = h.service.process_transaction(&tx).await.unwrap();
        assert!(matches!(
            receipt.events[1],
            DiaryEvent::RecordRemoved { refunded, .. } if refunded == rent_before
        ));
        assert!(h.diary(1).await.records.is_empty());
        assert!(!h.service.ledger().account_exists(&record_key).await.unwrap());
    }

    #[tokio::test]
    async fn test_lamports_conserved_across_lifecycle() {
        let h = DiaryHarness::new();
        let record = h.fund_record(256);
        let record_key: Pubkey = record.public_key().into();
        let keys = [h.authority(), h.diary_address(1), record_key];
        let total = total_lamports(&h, &keys).await;

        h.create_diary(1, "ledger").await.unwrap();
        assert_eq!(total_lamports(&h, &keys).await, total);
        h.add_record(&record, 1, "conserved").await.unwrap();
        assert_eq!(total_lamports(&h, &keys).await, total);
        h.write_record(&record_key, 1, 0, "CONSERVED").await.unwrap();
        assert_eq!(total_lamports(&h, &keys).await, total);
        h.remove_record(&record_key, 1).await.unwrap();
        assert_eq!(total_lamports(&h, &keys).await, total);
    }

    #[tokio::test]
    async fn test_insufficient_funds_for_diary_rent() {
        let h = DiaryHarness::new();
        let pauper = h.funded_keypair(1_000);
        let pauper_key: Pubkey = pauper.public_key().into();
        let ix = instruction::create_diary(&h.program(), &pauper_key, 1, "broke").unwrap();

        assert!(matches!(
            h.submit(ix, &[&pauper]).await,
            Err(DiaryError::InsufficientFunds { .. })
        ));
        assert_eq!(h.balance(&pauper_key).await, 1_000);
    }
}
