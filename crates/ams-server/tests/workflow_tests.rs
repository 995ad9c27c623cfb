//! Integration tests for the workflow completion coordinator
//!
//! These run against a real PostgreSQL database (provisioned by
//! `#[sqlx::test]`) and verify the transactional contract: status write,
//! cascade, and linked audit entry move together.

use ams_server::audit::ActorSnapshot;
use ams_server::workflow::{
    complete_auction, complete_disposal, complete_transfer, CompletionError, CompletionOutcome,
};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

async fn seed_user(pool: &PgPool, username: &str, first: &str, last: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO users (username, email, first_name, last_name, role)
        VALUES ($1, $1 || '@example.com', $2, $3, 'transfer_manager')
        RETURNING id
        "#,
    )
    .bind(username)
    .bind(first)
    .bind(last)
    .fetch_one(pool)
    .await
    .expect("seed user")
}

async fn seed_asset(pool: &PgPool, name: &str, location: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO assets (name, location) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(location)
    .fetch_one(pool)
    .await
    .expect("seed asset")
}

fn actor() -> ActorSnapshot {
    ActorSnapshot {
        user_id: Some(999),
        username: Some("ops".to_string()),
        user_email: Some("ops@example.com".to_string()),
        full_name: Some("Ops Person".to_string()),
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn transfer_completion_relocates_asset(pool: PgPool) {
    let requester = seed_user(&pool, "requester", "Rita", "Okoye").await;
    let approver = seed_user(&pool, "approver", "Ada", "Obi").await;
    let asset_id = seed_asset(&pool, "Forklift", "WH-1").await;

    let transfer_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO transfer_requests
            (asset_id, from_location, to_location, requested_by, approved_by, status)
        VALUES ($1, 'WH-1', 'WH-2', $2, $3, 'approved')
        RETURNING id
        "#,
    )
    .bind(asset_id)
    .bind(requester)
    .bind(approver)
    .fetch_one(&pool)
    .await
    .unwrap();

    let outcome = complete_transfer(&pool, transfer_id, &actor()).await.unwrap();
    assert_eq!(outcome, CompletionOutcome::Completed { cascade_applied: true });

    // Asset relocated and custody handed to the approver
    let (location, custodian): (String, Option<String>) = sqlx::query_as(
        "SELECT location, custodian_name FROM assets WHERE id = $1",
    )
    .bind(asset_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(location, "WH-2");
    assert_eq!(custodian.as_deref(), Some("Ada Obi"));

    // Status is terminal
    let status: String =
        sqlx::query_scalar("SELECT status FROM transfer_requests WHERE id = $1")
            .bind(transfer_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, "completed");

    // Linked audit entry carries the old/new location snapshots
    let (old_values, new_values): (JsonValue, JsonValue) = sqlx::query_as(
        "SELECT old_values, new_values FROM audit_trail \
         WHERE action = 'asset_transfer_completed' AND record_id = $1",
    )
    .bind(asset_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(old_values["location"], "WH-1");
    assert_eq!(new_values["location"], "WH-2");
}

#[sqlx::test(migrations = "../../migrations")]
async fn transfer_completion_without_asset_still_completes(pool: PgPool) {
    let requester = seed_user(&pool, "requester", "Rita", "Okoye").await;

    let transfer_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO transfer_requests (asset_id, from_location, to_location, requested_by, status)
        VALUES (NULL, 'WH-1', 'WH-2', $1, 'approved')
        RETURNING id
        "#,
    )
    .bind(requester)
    .fetch_one(&pool)
    .await
    .unwrap();

    let outcome = complete_transfer(&pool, transfer_id, &actor()).await.unwrap();
    assert_eq!(outcome, CompletionOutcome::Completed { cascade_applied: false });

    let status: String =
        sqlx::query_scalar("SELECT status FROM transfer_requests WHERE id = $1")
            .bind(transfer_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, "completed");

    // No cascade entry was written
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM audit_trail WHERE action = 'asset_transfer_completed'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn recompleting_transfer_does_not_relocate_twice(pool: PgPool) {
    let requester = seed_user(&pool, "requester", "Rita", "Okoye").await;
    let asset_id = seed_asset(&pool, "Forklift", "WH-1").await;

    let transfer_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO transfer_requests (asset_id, from_location, to_location, requested_by, status)
        VALUES ($1, 'WH-1', 'WH-2', $2, 'approved')
        RETURNING id
        "#,
    )
    .bind(asset_id)
    .bind(requester)
    .fetch_one(&pool)
    .await
    .unwrap();

    let first = complete_transfer(&pool, transfer_id, &actor()).await.unwrap();
    assert_eq!(first, CompletionOutcome::Completed { cascade_applied: true });

    let second = complete_transfer(&pool, transfer_id, &actor()).await.unwrap();
    assert_eq!(second, CompletionOutcome::AlreadyCompleted);

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM audit_trail WHERE action = 'asset_transfer_completed'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn auction_completion_retires_asset(pool: PgPool) {
    let asset_id = seed_asset(&pool, "Generator", "WH-1").await;

    let auction_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO auctions (asset_id, winning_bid, winner_name, status)
        VALUES ($1, 1500.0, 'Bola A.', 'bidding_closed')
        RETURNING id
        "#,
    )
    .bind(asset_id)
    .fetch_one(&pool)
    .await
    .unwrap();

    let outcome = complete_auction(&pool, auction_id, &actor()).await.unwrap();
    assert_eq!(outcome, CompletionOutcome::Completed { cascade_applied: true });

    // The asset is gone; the auction row survives with a detached asset
    let asset: Option<i64> = sqlx::query_scalar("SELECT id FROM assets WHERE id = $1")
        .bind(asset_id)
        .fetch_optional(&pool)
        .await
        .unwrap();
    assert!(asset.is_none());

    let (status, linked_asset): (String, Option<i64>) =
        sqlx::query_as("SELECT status, asset_id FROM auctions WHERE id = $1")
            .bind(auction_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, "completed");
    assert!(linked_asset.is_none());

    // Exactly one pre-deletion snapshot with the sale terms
    let rows: Vec<(Option<i64>, JsonValue)> = sqlx::query_as(
        "SELECT record_id, extra FROM audit_trail WHERE action = 'asset_sold_at_auction'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, Some(asset_id));
    assert_eq!(rows[0].1["winning_bid"], 1500.0);
    assert_eq!(rows[0].1["winner"], "Bola A.");
}

#[sqlx::test(migrations = "../../migrations")]
async fn recompleting_disposal_with_asset_gone_is_noop(pool: PgPool) {
    let asset_id = seed_asset(&pool, "Old Server", "WH-1").await;

    let disposal_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO disposals (asset_id, method, proceeds, status)
        VALUES ($1, 'scrap', 50.0, 'approved')
        RETURNING id
        "#,
    )
    .bind(asset_id)
    .fetch_one(&pool)
    .await
    .unwrap();

    let first = complete_disposal(&pool, disposal_id, &actor()).await.unwrap();
    assert_eq!(first, CompletionOutcome::Completed { cascade_applied: true });

    // Second completion: the asset is already deleted; must neither error
    // nor attempt a second deletion
    let second = complete_disposal(&pool, disposal_id, &actor()).await.unwrap();
    assert_eq!(second, CompletionOutcome::AlreadyCompleted);

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM audit_trail WHERE action = 'asset_retired_via_disposal'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn completing_missing_record_is_not_found(pool: PgPool) {
    let result = complete_transfer(&pool, 424242, &actor()).await;
    assert!(matches!(result, Err(CompletionError::NotFound(_))));
}

#[sqlx::test(migrations = "../../migrations")]
async fn asset_deletion_cascades_maintenance_history(pool: PgPool) {
    let asset_id = seed_asset(&pool, "Truck", "WH-1").await;

    sqlx::query("INSERT INTO maintenance (asset_id, description) VALUES ($1, 'oil change')")
        .bind(asset_id)
        .execute(&pool)
        .await
        .unwrap();

    let disposal_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO disposals (asset_id, status) VALUES ($1, 'approved') RETURNING id",
    )
    .bind(asset_id)
    .fetch_one(&pool)
    .await
    .unwrap();

    complete_disposal(&pool, disposal_id, &actor()).await.unwrap();

    // The storage layer removed the dependent history rows
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM maintenance WHERE asset_id = $1")
        .bind(asset_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}
