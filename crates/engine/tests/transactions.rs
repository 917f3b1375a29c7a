mod common;

use chrono::Utc;

use common::{harness, insert_transaction, register};
use engine::{
    EngineError, NewTransaction, TransactionKind, TransactionListFilter, TransactionPatch,
    UpdateOutcome,
};

#[tokio::test]
async fn create_then_list_round_trips() {
    let h = harness().await;
    let user = register(&h.engine, "a@example.com").await;

    let before = Utc::now();
    let created = h
        .engine
        .create_transaction(
            NewTransaction::new(&user, TransactionKind::Expense, 1250, "Food", "lunch")
                .source_account("card"),
        )
        .await
        .unwrap();
    let after = Utc::now();

    assert!(created.transaction_id.starts_with("txn-"));
    assert!(before <= created.created_at && created.created_at <= after);

    let listed = h
        .engine
        .list_transactions(&user, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.transactions.len(), 1);
    let tx = &listed.transactions[0];
    assert_eq!(tx.transaction_id, created.transaction_id);
    assert_eq!(tx.kind, TransactionKind::Expense);
    assert_eq!(tx.amount_minor, 1250);
    assert_eq!(tx.category, "Food");
    assert_eq!(tx.description, "lunch");
    assert_eq!(tx.source_account.as_deref(), Some("card"));
    assert_eq!(tx.destination_account, None);
    // Stored timestamps keep millisecond precision.
    assert_eq!(
        tx.created_at.timestamp_millis(),
        created.created_at.timestamp_millis()
    );
}

#[tokio::test]
async fn create_requires_existing_user() {
    let h = harness().await;
    let err = h
        .engine
        .create_transaction(NewTransaction::new(
            "ghost",
            TransactionKind::Income,
            100,
            "Salary",
            "pay",
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("user".to_string()));
}

#[tokio::test]
async fn create_rejects_invalid_payload() {
    let h = harness().await;
    let user = register(&h.engine, "a@example.com").await;
    let err = h
        .engine
        .create_transaction(NewTransaction::new(
            &user,
            TransactionKind::Expense,
            0,
            "Rent",
            "x",
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation(
            "/amount_minor must be >= 1, /category must be equal to one of the allowed values"
                .to_string()
        )
    );
}

#[tokio::test]
async fn duplicate_submissions_are_both_kept() {
    let h = harness().await;
    let user = register(&h.engine, "a@example.com").await;
    let cmd = NewTransaction::new(&user, TransactionKind::Expense, 500, "Food", "coffee");

    h.engine.create_transaction(cmd.clone()).await.unwrap();
    h.engine.create_transaction(cmd).await.unwrap();

    let listed = h
        .engine
        .list_transactions(&user, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.transactions.len(), 2);
}

#[tokio::test]
async fn list_filters_by_month_and_kind_and_totals_returned_set() {
    let h = harness().await;
    let user = register(&h.engine, "a@example.com").await;
    insert_transaction(&h.db, &user, "txn-a", "income", 300_000, "Salary", "2025-02-01T08:00:00.000Z").await;
    insert_transaction(&h.db, &user, "txn-b", "expense", 4_000, "Food", "2025-02-14T19:30:00.000Z").await;
    insert_transaction(&h.db, &user, "txn-c", "transfer", 10_000, "Other", "2025-02-20T10:00:00.000Z").await;
    insert_transaction(&h.db, &user, "txn-d", "expense", 9_999, "Food", "2025-03-01T00:00:00.000Z").await;

    let february = TransactionListFilter {
        year: Some(2025),
        month: Some(2),
        ..Default::default()
    };
    let listed = h.engine.list_transactions(&user, &february).await.unwrap();
    let ids: Vec<&str> = listed
        .transactions
        .iter()
        .map(|tx| tx.transaction_id.as_str())
        .collect();
    assert_eq!(ids, ["txn-a", "txn-b", "txn-c"]);
    assert_eq!(listed.total_income_minor, 300_000);
    assert_eq!(listed.total_expense_minor, 4_000);

    let expenses = TransactionListFilter {
        kind: Some(TransactionKind::Expense),
        ..february
    };
    let listed = h.engine.list_transactions(&user, &expenses).await.unwrap();
    assert_eq!(listed.transactions.len(), 1);
    assert_eq!(listed.total_income_minor, 0);
    assert_eq!(listed.total_expense_minor, 4_000);

    // A year without a month does not narrow the listing.
    let year_only = TransactionListFilter {
        year: Some(2025),
        ..Default::default()
    };
    let listed = h.engine.list_transactions(&user, &year_only).await.unwrap();
    assert_eq!(listed.transactions.len(), 4);
}

#[tokio::test]
async fn month_window_compares_stored_timestamps_as_text() {
    let h = harness().await;
    let user = register(&h.engine, "a@example.com").await;
    insert_transaction(&h.db, &user, "txn-first", "expense", 100, "Food", "2025-01-01T00:00:00.000Z").await;
    insert_transaction(&h.db, &user, "txn-second", "expense", 200, "Food", "2025-01-01T00:00:01.000Z").await;
    insert_transaction(&h.db, &user, "txn-last", "expense", 300, "Food", "2025-01-31T23:59:59.000Z").await;

    let january = TransactionListFilter {
        year: Some(2025),
        month: Some(1),
        ..Default::default()
    };
    let listed = h.engine.list_transactions(&user, &january).await.unwrap();
    let ids: Vec<&str> = listed
        .transactions
        .iter()
        .map(|tx| tx.transaction_id.as_str())
        .collect();
    // `.000Z` sorts before the `Z` of the lower bound.
    assert_eq!(ids, ["txn-second", "txn-last"]);
}

#[tokio::test]
async fn list_rejects_month_out_of_range() {
    let h = harness().await;
    let user = register(&h.engine, "a@example.com").await;
    let filter = TransactionListFilter {
        year: Some(2025),
        month: Some(13),
        ..Default::default()
    };
    assert!(matches!(
        h.engine.list_transactions(&user, &filter).await,
        Err(EngineError::Validation(_))
    ));
}

#[tokio::test]
async fn list_skips_budget_records() {
    let h = harness().await;
    let user = register(&h.engine, "a@example.com").await;
    h.engine
        .create_budget(engine::NewBudget::new(&user, "Food", 20_000))
        .await
        .unwrap();

    let listed = h
        .engine
        .list_transactions(&user, &TransactionListFilter::default())
        .await
        .unwrap();
    assert!(listed.transactions.is_empty());
}

#[tokio::test]
async fn empty_patch_is_a_no_op() {
    let h = harness().await;
    let user = register(&h.engine, "a@example.com").await;
    let created = h
        .engine
        .create_transaction(NewTransaction::new(
            &user,
            TransactionKind::Expense,
            700,
            "Transport",
            "bus",
        ))
        .await
        .unwrap();

    let outcome = h
        .engine
        .update_transaction(&user, &created.transaction_id, TransactionPatch::new())
        .await
        .unwrap();
    assert_eq!(outcome, UpdateOutcome::NoChanges);

    // Nothing exists under this id, yet an empty patch still succeeds.
    let outcome = h
        .engine
        .update_transaction(&user, "txn-missing", TransactionPatch::new())
        .await
        .unwrap();
    assert_eq!(outcome, UpdateOutcome::NoChanges);

    let listed = h
        .engine
        .list_transactions(&user, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.transactions, vec![created]);
}

#[tokio::test]
async fn patch_updates_only_given_fields() {
    let h = harness().await;
    let user = register(&h.engine, "a@example.com").await;
    let created = h
        .engine
        .create_transaction(NewTransaction::new(
            &user,
            TransactionKind::Expense,
            700,
            "Transport",
            "bus",
        ))
        .await
        .unwrap();

    let outcome = h
        .engine
        .update_transaction(
            &user,
            &created.transaction_id,
            TransactionPatch::new().amount_minor(900).description("taxi"),
        )
        .await
        .unwrap();
    assert_eq!(outcome, UpdateOutcome::Updated);

    let listed = h
        .engine
        .list_transactions(&user, &TransactionListFilter::default())
        .await
        .unwrap();
    let tx = &listed.transactions[0];
    assert_eq!(tx.amount_minor, 900);
    assert_eq!(tx.description, "taxi");
    assert_eq!(tx.category, "Transport");
    assert_eq!(tx.created_at, created.created_at);
}

#[tokio::test]
async fn patch_of_missing_transaction_is_not_found() {
    let h = harness().await;
    let user = register(&h.engine, "a@example.com").await;
    let err = h
        .engine
        .update_transaction(&user, "txn-missing", TransactionPatch::new().amount_minor(1))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("transaction".to_string()));
}

#[tokio::test]
async fn patch_validates_fields() {
    let h = harness().await;
    let user = register(&h.engine, "a@example.com").await;
    let err = h
        .engine
        .update_transaction(&user, "txn-1", TransactionPatch::new().category("Rent"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("/category must be equal to one of the allowed values".to_string())
    );
}

#[tokio::test]
async fn delete_is_unconditional() {
    let h = harness().await;
    let user = register(&h.engine, "a@example.com").await;
    h.engine
        .delete_transaction(&user, "txn-never-existed")
        .await
        .unwrap();

    let created = h
        .engine
        .create_transaction(NewTransaction::new(
            &user,
            TransactionKind::Income,
            100,
            "Salary",
            "bonus",
        ))
        .await
        .unwrap();
    h.engine
        .delete_transaction(&user, &created.transaction_id)
        .await
        .unwrap();
    let listed = h
        .engine
        .list_transactions(&user, &TransactionListFilter::default())
        .await
        .unwrap();
    assert!(listed.transactions.is_empty());
}
