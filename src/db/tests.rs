#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

// ── Helpers ───────────────────────────────────────────────────

fn seed_refs(db: &Database) -> (i64, i64, i64, i64) {
    let alice = db.insert_user(&User::new("alice".into())).unwrap();
    let food = db.insert_category(&Category::new("Food".into(), alice)).unwrap();
    let transport = db
        .insert_category(&Category::new("Transport".into(), alice))
        .unwrap();
    let cash = db.get_payment_method_by_name("Cash").unwrap().unwrap();
    (alice, food, transport, cash.id.unwrap())
}

fn expense_at(
    user_id: i64,
    category_id: i64,
    payment_method_id: i64,
    amount: Decimal,
    date: &str,
    tag: &str,
    stamp: &str,
) -> Expense {
    Expense {
        id: None,
        user_id,
        category_id,
        payment_method_id,
        amount,
        expense_date: date.into(),
        description: String::new(),
        tag: tag.into(),
        is_deleted: false,
        created_at: stamp.into(),
        updated_at: stamp.into(),
    }
}

fn record(expense_id: i64, amount: Decimal, date: &str, stamp: &str) -> ExpenseRecord {
    ExpenseRecord {
        expense_id,
        username: "alice".into(),
        category_name: "Food".into(),
        payment_method_name: "Cash".into(),
        amount,
        expense_date: date.into(),
        description: String::new(),
        tag: "meal".into(),
        is_deleted: false,
        created_at: stamp.into(),
        updated_at: stamp.into(),
    }
}

// ── Default data ──────────────────────────────────────────────

#[test]
fn test_default_payment_methods_seeded() {
    let db = Database::open_in_memory().unwrap();
    let methods = db.get_payment_methods().unwrap();
    assert!(!methods.is_empty());
    assert!(methods.iter().any(|m| m.name == "Cash"));
    assert!(methods.iter().any(|m| m.name == "Credit Card"));
}

// ── Users ─────────────────────────────────────────────────────

#[test]
fn test_user_insert_and_find() {
    let db = Database::open_in_memory().unwrap();
    let id = db.insert_user(&User::new("alice".into())).unwrap();
    assert!(id > 0);

    let found = db.get_user_by_name("alice").unwrap();
    assert_eq!(found.unwrap().id, Some(id));
    assert!(db.get_user_by_name("nobody").unwrap().is_none());
}

#[test]
fn test_user_duplicate_rejected() {
    let db = Database::open_in_memory().unwrap();
    db.insert_user(&User::new("alice".into())).unwrap();
    let err = db.insert_user(&User::new("alice".into())).unwrap_err();
    assert!(matches!(err, Error::StoreWriteFailure { .. }));
}

#[test]
fn test_users_sorted_by_name() {
    let db = Database::open_in_memory().unwrap();
    db.insert_user(&User::new("carol".into())).unwrap();
    db.insert_user(&User::new("alice".into())).unwrap();
    db.insert_user(&User::new("bob".into())).unwrap();
    let names: Vec<String> = db.get_users().unwrap().into_iter().map(|u| u.username).collect();
    assert_eq!(names, vec!["alice", "bob", "carol"]);
}

// ── Categories ────────────────────────────────────────────────

#[test]
fn test_category_crud() {
    let db = Database::open_in_memory().unwrap();
    let (_, food, _, _) = seed_refs(&db);

    let found = db.get_category_by_name("Food").unwrap().unwrap();
    assert_eq!(found.id, Some(food));

    assert!(db.rename_category(food, "Groceries").unwrap());
    assert!(db.get_category_by_name("Food").unwrap().is_none());
    assert!(db.get_category_by_name("Groceries").unwrap().is_some());

    assert!(db.soft_delete_category(food).unwrap());
    assert!(db.get_category_by_name("Groceries").unwrap().is_none());
    // Second delete is a no-op
    assert!(!db.soft_delete_category(food).unwrap());
}

// ── Expenses ──────────────────────────────────────────────────

#[test]
fn test_expense_insert_and_list() {
    let db = Database::open_in_memory().unwrap();
    let (alice, food, _, cash) = seed_refs(&db);

    let id = db
        .insert_expense(&expense_at(
            alice,
            food,
            cash,
            dec!(12.50),
            "2024-01-10",
            "meal",
            "2024-01-10T08:00:00.000Z",
        ))
        .unwrap();
    assert!(id > 0);

    let expenses = db.get_expenses(false).unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].amount, dec!(12.50));
    assert_eq!(expenses[0].tag, "meal");
}

#[test]
fn test_expense_negative_amount_rejected() {
    let db = Database::open_in_memory().unwrap();
    let (alice, food, _, cash) = seed_refs(&db);
    let err = db
        .insert_expense(&expense_at(
            alice,
            food,
            cash,
            dec!(-5.00),
            "2024-01-10",
            "meal",
            "2024-01-10T08:00:00.000Z",
        ))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidParameter(_)));
}

#[test]
fn test_soft_delete_bumps_updated_at() {
    let db = Database::open_in_memory().unwrap();
    let (alice, food, _, cash) = seed_refs(&db);
    let id = db
        .insert_expense(&expense_at(
            alice,
            food,
            cash,
            dec!(5),
            "2024-01-10",
            "meal",
            "2024-01-10T08:00:00.000Z",
        ))
        .unwrap();

    assert!(db.soft_delete_expense(id).unwrap());
    let all = db.get_expenses(true).unwrap();
    assert!(all[0].is_deleted);
    assert!(all[0].updated_at > "2024-01-10T08:00:00.000Z".to_string());

    // Already deleted: no-op, and excluded from the live listing
    assert!(!db.soft_delete_expense(id).unwrap());
    assert!(db.get_expenses(false).unwrap().is_empty());
}

#[test]
fn test_update_tag_bumps_updated_at() {
    let db = Database::open_in_memory().unwrap();
    let (alice, food, _, cash) = seed_refs(&db);
    let id = db
        .insert_expense(&expense_at(
            alice,
            food,
            cash,
            dec!(5),
            "2024-01-10",
            "meal",
            "2024-01-10T08:00:00.000Z",
        ))
        .unwrap();

    assert!(db.update_expense_tag(id, "snack").unwrap());
    let e = &db.get_expenses(false).unwrap()[0];
    assert_eq!(e.tag, "snack");
    assert!(e.updated_at > "2024-01-10T08:00:00.000Z".to_string());
}

// ── Change feed ───────────────────────────────────────────────

#[test]
fn test_changed_expenses_watermark_is_strict() {
    let db = Database::open_in_memory().unwrap();
    let (alice, food, _, cash) = seed_refs(&db);
    db.insert_expense(&expense_at(
        alice, food, cash, dec!(1), "2024-01-01", "a", "2024-01-01T00:00:00.000Z",
    ))
    .unwrap();
    db.insert_expense(&expense_at(
        alice, food, cash, dec!(2), "2024-01-02", "b", "2024-01-02T00:00:00.000Z",
    ))
    .unwrap();

    // No watermark: everything
    assert_eq!(db.changed_expenses_since(None).unwrap().len(), 2);
    // Boundary is exclusive
    let rows = db
        .changed_expenses_since(Some("2024-01-01T00:00:00.000Z"))
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].expense.tag, "b");
    assert!(db
        .changed_expenses_since(Some("2024-01-02T00:00:00.000Z"))
        .unwrap()
        .is_empty());
}

#[test]
fn test_changed_expenses_resolves_names() {
    let db = Database::open_in_memory().unwrap();
    let (alice, food, _, cash) = seed_refs(&db);
    db.insert_expense(&expense_at(
        alice, food, cash, dec!(1), "2024-01-01", "a", "2024-01-01T00:00:00.000Z",
    ))
    .unwrap();

    let row = &db.changed_expenses_since(None).unwrap()[0];
    assert_eq!(row.username.as_deref(), Some("alice"));
    assert_eq!(row.category_name.as_deref(), Some("Food"));
    assert_eq!(row.payment_method_name.as_deref(), Some("Cash"));
}

#[test]
fn test_changed_expenses_surfaces_referential_gap() {
    let db = Database::open_in_memory().unwrap();
    let (alice, food, _, cash) = seed_refs(&db);
    db.insert_expense(&expense_at(
        alice, food, cash, dec!(1), "2024-01-01", "a", "2024-01-01T00:00:00.000Z",
    ))
    .unwrap();
    db.soft_delete_category(food).unwrap();

    let row = &db.changed_expenses_since(None).unwrap()[0];
    assert_eq!(row.username.as_deref(), Some("alice"));
    assert!(row.category_name.is_none());
}

// ── Sync batch application ────────────────────────────────────

#[test]
fn test_watermark_absent_until_first_batch() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(db.get_last_sync_time().unwrap().is_none());

    db.apply_sync_batch(&[], &[], "2024-01-01T00:00:00.000Z").unwrap();
    assert_eq!(
        db.get_last_sync_time().unwrap().as_deref(),
        Some("2024-01-01T00:00:00.000Z")
    );

    db.apply_sync_batch(&[], &[], "2024-02-01T00:00:00.000Z").unwrap();
    assert_eq!(
        db.get_last_sync_time().unwrap().as_deref(),
        Some("2024-02-01T00:00:00.000Z")
    );
}

#[test]
fn test_apply_sync_batch_upsert_keyed_by_source_id() {
    let mut db = Database::open_in_memory().unwrap();
    let first = record(7, dec!(10), "2024-01-05", "2024-01-05T00:00:00.000Z");
    db.apply_sync_batch(&[first.clone()], &[], "2024-01-05T00:00:00.000Z")
        .unwrap();

    // Same key, new field values: overwrite, not duplicate
    let mut second = record(7, dec!(25), "2024-01-06", "2024-01-06T00:00:00.000Z");
    second.tag = "updated".into();
    db.apply_sync_batch(&[second.clone()], &[], "2024-01-06T00:00:00.000Z")
        .unwrap();

    let records = db.get_report_records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0], second);
}

#[test]
fn test_apply_sync_batch_removals() {
    let mut db = Database::open_in_memory().unwrap();
    db.apply_sync_batch(
        &[
            record(1, dec!(10), "2024-01-05", "2024-01-05T00:00:00.000Z"),
            record(2, dec!(20), "2024-01-06", "2024-01-06T00:00:00.000Z"),
        ],
        &[],
        "2024-01-06T00:00:00.000Z",
    )
    .unwrap();

    db.apply_sync_batch(&[], &[1], "2024-01-07T00:00:00.000Z").unwrap();
    let records = db.get_report_records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].expense_id, 2);
    assert!(db.get_report_record(1).unwrap().is_none());
}

// ── Persistence ───────────────────────────────────────────────

#[test]
fn test_reopen_preserves_data_and_seeds_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spendbook.db");

    {
        let db = Database::open(&path).unwrap();
        let (alice, food, _, cash) = seed_refs(&db);
        db.insert_expense(&expense_at(
            alice, food, cash, dec!(7), "2024-01-10", "meal", "2024-01-10T08:00:00.000Z",
        ))
        .unwrap();
    }

    let db = Database::open(&path).unwrap();
    assert_eq!(db.get_expenses(false).unwrap().len(), 1);
    assert!(db.get_user_by_name("alice").unwrap().is_some());
    // Migration and seeding are idempotent across reopen
    let cash_count = db
        .get_payment_methods()
        .unwrap()
        .iter()
        .filter(|m| m.name == "Cash")
        .count();
    assert_eq!(cash_count, 1);
}

// ── Report queries ────────────────────────────────────────────

fn seed_reporting(db: &mut Database) {
    let mut a = record(1, dec!(10), "2024-01-05", "2024-01-05T00:00:00.000Z");
    a.tag = "x".into();
    let mut b = record(2, dec!(30), "2024-01-20", "2024-01-20T00:00:00.000Z");
    b.username = "bob".into();
    b.tag = "x".into();
    let mut c = record(3, dec!(5), "2024-02-01", "2024-02-01T00:00:00.000Z");
    c.category_name = "Transport".into();
    c.payment_method_name = "Credit Card".into();
    c.tag = "y".into();
    db.apply_sync_batch(&[a, b, c], &[], "2024-02-01T00:00:00.000Z")
        .unwrap();
}

#[test]
fn test_top_expenses_query_ordering_and_limit() {
    let mut db = Database::open_in_memory().unwrap();
    seed_reporting(&mut db);

    let rows = db
        .report_top_expenses(2, "2024-01-01", "2024-02-28")
        .unwrap();
    let ids: Vec<i64> = rows.iter().map(|r| r.expense_id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[test]
fn test_top_expenses_amount_tie_breaks_by_id() {
    let mut db = Database::open_in_memory().unwrap();
    db.apply_sync_batch(
        &[
            record(9, dec!(10), "2024-01-05", "2024-01-05T00:00:00.000Z"),
            record(3, dec!(10), "2024-01-06", "2024-01-06T00:00:00.000Z"),
        ],
        &[],
        "2024-01-06T00:00:00.000Z",
    )
    .unwrap();

    let rows = db
        .report_top_expenses(5, "2024-01-01", "2024-01-31")
        .unwrap();
    let ids: Vec<i64> = rows.iter().map(|r| r.expense_id).collect();
    assert_eq!(ids, vec![3, 9]);
}

#[test]
fn test_category_spending_query() {
    let mut db = Database::open_in_memory().unwrap();
    seed_reporting(&mut db);

    assert_eq!(db.report_category_spending("Food").unwrap(), dec!(40));
    assert_eq!(db.report_category_spending("Transport").unwrap(), dec!(5));
    // No rows is zero, not an error
    assert_eq!(db.report_category_spending("Rent").unwrap(), Decimal::ZERO);
}

#[test]
fn test_above_average_query() {
    let mut db = Database::open_in_memory().unwrap();
    seed_reporting(&mut db);

    // Food mean = 20: only the 30 qualifies. Transport's single row
    // equals its own mean, so it never qualifies.
    let rows = db.report_above_average_expenses().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].expense_id, 2);
}

#[test]
fn test_monthly_grouping_keys() {
    let mut db = Database::open_in_memory().unwrap();
    seed_reporting(&mut db);

    let rows = db.report_monthly_category_spending().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].0, "2024-01");
    assert_eq!(rows[0].1, "Food");
    assert_eq!(rows[0].2, dec!(40));
    assert_eq!(rows[1].0, "2024-02");
    assert_eq!(rows[1].1, "Transport");
}

#[test]
fn test_deleted_rows_excluded_from_reports() {
    let mut db = Database::open_in_memory().unwrap();
    let mut flagged = record(1, dec!(99), "2024-01-05", "2024-01-05T00:00:00.000Z");
    flagged.is_deleted = true;
    db.apply_sync_batch(
        &[
            flagged,
            record(2, dec!(10), "2024-01-06", "2024-01-06T00:00:00.000Z"),
        ],
        &[],
        "2024-01-06T00:00:00.000Z",
    )
    .unwrap();

    let rows = db
        .report_top_expenses(10, "2024-01-01", "2024-01-31")
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].expense_id, 2);
    assert_eq!(db.report_category_spending("Food").unwrap(), dec!(10));
}
