//! Store tests against a fresh, fully-migrated in-memory SQLite database.

use chrono::{Duration, TimeZone, Utc};
use dealscout_core::{ListingRecord, Source};
use dealscout_db::{
    append_items, cancel_search_run, complete_search_run, connect_in_memory, count_favorites,
    count_items, create_search_run, fail_search_run, get_item, get_search_run, list_favorites,
    list_search_runs, promote_favorite, prune_items_before, snapshot_catalog, DbError,
    PromoteOutcome,
};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn test_pool() -> SqlitePool {
    connect_in_memory()
        .await
        .unwrap_or_else(|e| panic!("in-memory pool failed: {e}"))
}

fn make_record(title: &str, cents: i64, link: Option<&str>) -> ListingRecord {
    ListingRecord {
        title: title.to_string(),
        price: Decimal::new(cents, 2),
        condition: "Pre-Owned".to_string(),
        link: link.map(str::to_string),
        source: Source::Ebay,
        category: "Consoles".to_string(),
        search_term: "nintendo nes console".to_string(),
        discovered_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        description: "No description available".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[tokio::test]
async fn append_and_snapshot_preserve_order_and_fields() {
    let pool = test_pool().await;
    let records = vec![
        make_record("NES Console", 2500, Some("https://www.ebay.com/itm/1")),
        make_record("NES Bundle", 4999, None),
    ];

    let inserted = append_items(&pool, &records).await.unwrap();
    assert_eq!(inserted, 2);

    let snapshot = snapshot_catalog(&pool).await.unwrap();
    assert_eq!(snapshot.len(), 2);
    assert!(snapshot[0].id < snapshot[1].id);
    assert_eq!(snapshot[0].to_record(), records[0]);
    assert_eq!(snapshot[1].link, None);
    assert_eq!(snapshot[1].price, Decimal::new(4999, 2));
}

#[tokio::test]
async fn catalog_allows_duplicate_links() {
    let pool = test_pool().await;
    let record = make_record("NES Console", 2500, Some("https://www.ebay.com/itm/1"));

    append_items(&pool, std::slice::from_ref(&record)).await.unwrap();
    append_items(&pool, std::slice::from_ref(&record)).await.unwrap();

    assert_eq!(count_items(&pool).await.unwrap(), 2);
}

#[tokio::test]
async fn append_empty_batch_is_a_no_op() {
    let pool = test_pool().await;
    assert_eq!(append_items(&pool, &[]).await.unwrap(), 0);
    assert!(snapshot_catalog(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn get_item_reports_not_found() {
    let pool = test_pool().await;
    let err = get_item(&pool, 999).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound), "got {err:?}");
}

#[tokio::test]
async fn prune_removes_only_older_items() {
    let pool = test_pool().await;
    let mut old = make_record("Old", 100, None);
    old.discovered_at = Utc::now() - Duration::days(40);
    let mut fresh = make_record("Fresh", 200, None);
    fresh.discovered_at = Utc::now();
    append_items(&pool, &[old, fresh]).await.unwrap();

    let deleted = prune_items_before(&pool, Utc::now() - Duration::days(30))
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    let remaining = snapshot_catalog(&pool).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].title, "Fresh");
}

// ---------------------------------------------------------------------------
// Favorites
// ---------------------------------------------------------------------------

#[tokio::test]
async fn promote_same_link_twice_adds_once() {
    let pool = test_pool().await;
    let record = make_record("NES Console", 2500, Some("https://www.ebay.com/itm/1"));
    append_items(&pool, std::slice::from_ref(&record)).await.unwrap();
    let item = get_item(&pool, 1).await.unwrap();

    let first = promote_favorite(&pool, &item.to_record().to_favorite())
        .await
        .unwrap();
    let second = promote_favorite(&pool, &item.to_record().to_favorite())
        .await
        .unwrap();

    assert!(matches!(first, PromoteOutcome::Added(_)), "got {first:?}");
    assert_eq!(second, PromoteOutcome::AlreadyFavorited);
    assert_eq!(count_favorites(&pool).await.unwrap(), 1);

    let favorites = list_favorites(&pool).await.unwrap();
    assert_eq!(favorites[0].link, "https://www.ebay.com/itm/1");
    assert_eq!(favorites[0].category, "Consoles");
}

#[tokio::test]
async fn concurrent_promotes_yield_exactly_one_added() {
    let pool = test_pool().await;
    let favorite = make_record("NES Console", 2500, Some("https://www.ebay.com/itm/7")).to_favorite();

    let (a, b) = tokio::join!(
        promote_favorite(&pool, &favorite),
        promote_favorite(&pool, &favorite)
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    let added = outcomes
        .iter()
        .filter(|o| matches!(o, PromoteOutcome::Added(_)))
        .count();
    assert_eq!(added, 1);
    assert!(outcomes.contains(&PromoteOutcome::AlreadyFavorited));
    assert_eq!(count_favorites(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn promote_without_link_is_rejected() {
    let pool = test_pool().await;
    let favorite = make_record("Linkless", 1000, None).to_favorite();

    let err = promote_favorite(&pool, &favorite).await.unwrap_err();
    assert!(matches!(err, DbError::MissingLink), "got {err:?}");
    assert_eq!(count_favorites(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn favorites_survive_catalog_prune() {
    let pool = test_pool().await;
    let record = make_record("NES Console", 2500, Some("https://www.ebay.com/itm/1"));
    append_items(&pool, std::slice::from_ref(&record)).await.unwrap();
    promote_favorite(&pool, &record.to_favorite()).await.unwrap();

    prune_items_before(&pool, Utc::now() + Duration::days(1))
        .await
        .unwrap();

    assert_eq!(count_items(&pool).await.unwrap(), 0);
    assert_eq!(count_favorites(&pool).await.unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Search runs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_run_lifecycle_succeeded_and_partial() {
    let pool = test_pool().await;

    let clean = create_search_run(&pool, "all").await.unwrap();
    assert_eq!(clean.status, "running");
    complete_search_run(&pool, clean.id, 12, 0).await.unwrap();
    let clean = get_search_run(&pool, clean.id).await.unwrap();
    assert_eq!(clean.status, "succeeded");
    assert_eq!(clean.records_processed, 12);
    assert!(clean.completed_at.is_some());

    let partial = create_search_run(&pool, "category:Gaming").await.unwrap();
    complete_search_run(&pool, partial.id, 3, 1).await.unwrap();
    let partial = get_search_run(&pool, partial.id).await.unwrap();
    assert_eq!(partial.status, "partial");
    assert_eq!(partial.failed_terms, 1);

    let runs = list_search_runs(&pool, 10).await.unwrap();
    assert_eq!(runs.len(), 2);
}

#[tokio::test]
async fn search_run_terminal_states_reject_second_transition() {
    let pool = test_pool().await;

    let run = create_search_run(&pool, "term:ps5").await.unwrap();
    cancel_search_run(&pool, run.id, 4, 0).await.unwrap();
    assert_eq!(get_search_run(&pool, run.id).await.unwrap().status, "cancelled");

    let err = fail_search_run(&pool, run.id, 4, "late failure")
        .await
        .unwrap_err();
    assert!(
        matches!(err, DbError::InvalidRunTransition { expected_status: "running", .. }),
        "got {err:?}"
    );

    let failed = create_search_run(&pool, "all").await.unwrap();
    fail_search_run(&pool, failed.id, 0, "disk full").await.unwrap();
    let failed = get_search_run(&pool, failed.id).await.unwrap();
    assert_eq!(failed.status, "failed");
    assert_eq!(failed.error_message.as_deref(), Some("disk full"));
}
