mod common;

use common::{harness, insert_transaction, register};
use engine::TransactionKind;

#[tokio::test]
async fn breakdown_groups_by_category_with_colors() {
    let h = harness().await;
    let user = register(&h.engine, "a@example.com").await;
    insert_transaction(&h.db, &user, "txn-1", "expense", 3_000, "Food", "2025-08-02T12:00:00.000Z").await;
    insert_transaction(&h.db, &user, "txn-2", "expense", 3_000, "Food", "2025-08-09T12:00:00.000Z").await;
    insert_transaction(&h.db, &user, "txn-3", "expense", 2_000, "Transport", "2025-08-10T12:00:00.000Z").await;
    insert_transaction(&h.db, &user, "txn-4", "expense", 1_000, "Shopping", "2025-08-11T12:00:00.000Z").await;
    insert_transaction(&h.db, &user, "txn-5", "income", 90_000, "Salary", "2025-08-01T12:00:00.000Z").await;
    insert_transaction(&h.db, &user, "txn-6", "expense", 7_777, "Food", "2025-09-01T12:00:00.000Z").await;

    let breakdown = h
        .engine
        .category_breakdown(&user, TransactionKind::Expense, Some(2025), Some(8))
        .await
        .unwrap();
    assert_eq!(breakdown.total_minor, 9_000);

    let names: Vec<&str> = breakdown.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Food", "Transport", "Shopping"]);
    assert_eq!(breakdown.categories[0].amount_minor, 6_000);
    assert_eq!(breakdown.categories[0].percentage, 66.67);
    assert_eq!(breakdown.categories[1].percentage, 22.22);
    assert_eq!(breakdown.categories[2].percentage, 11.11);

    let sum: f64 = breakdown.categories.iter().map(|c| c.percentage).sum();
    assert!((sum - 100.0).abs() < 0.05);

    let colors = h.engine.categories();
    for share in &breakdown.categories {
        assert_eq!(share.color, colors.color_of(&share.name));
        assert!(share.color.starts_with('#'));
    }
}

#[tokio::test]
async fn empty_breakdown() {
    let h = harness().await;
    let user = register(&h.engine, "a@example.com").await;
    let breakdown = h
        .engine
        .category_breakdown(&user, TransactionKind::Income, None, None)
        .await
        .unwrap();
    assert!(breakdown.categories.is_empty());
    assert_eq!(breakdown.total_minor, 0);
}

#[tokio::test]
async fn unknown_category_uses_fallback_color() {
    let h = harness().await;
    let user = register(&h.engine, "a@example.com").await;
    insert_transaction(&h.db, &user, "txn-1", "expense", 100, "Legacy", "2025-08-02T12:00:00.000Z").await;

    let breakdown = h
        .engine
        .category_breakdown(&user, TransactionKind::Expense, None, None)
        .await
        .unwrap();
    assert_eq!(breakdown.categories[0].color, engine::FALLBACK_COLOR);
    assert_eq!(breakdown.categories[0].percentage, 100.0);
}
