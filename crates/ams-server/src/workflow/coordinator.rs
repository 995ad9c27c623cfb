//! Workflow completion coordinator
//!
//! Owns the terminal transition of transfer requests, auctions, and
//! disposals. Each completion is one transaction: a conditional status
//! write (which both serializes concurrent completions of the same record
//! and detects re-completion), the planned cascade against the asset
//! entity, and a linked audit entry.
//!
//! Two deliberate asymmetries, both logged rather than raised:
//! - a linked asset that no longer exists skips the cascade while the
//!   status write still stands;
//! - a failed cascade audit write is rolled back to a savepoint so the
//!   physical workflow keeps moving even when its trail cannot be
//!   written.

use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, warn};

use super::transitions::{self, CascadeEffect};
use crate::audit::{insert_audit_entry, ActorSnapshot, AuditAction, AuditedTable, NewAuditEntry};

/// Origin recorded on cascade audit entries: these are system-side
/// effects, not direct client requests.
const SYSTEM_ORIGIN: &str = "system";

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// What a completion call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The record transitioned into `completed` in this call.
    Completed { cascade_applied: bool },
    /// The record was already `completed`; nothing was touched.
    AlreadyCompleted,
}

#[derive(Debug, sqlx::FromRow)]
struct TransferRow {
    id: i64,
    asset_id: Option<i64>,
    from_location: String,
    to_location: String,
    approved_by: Option<i64>,
}

#[derive(Debug, sqlx::FromRow)]
struct AuctionRow {
    id: i64,
    asset_id: Option<i64>,
    winning_bid: Option<f64>,
    winner_name: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct DisposalRow {
    id: i64,
    asset_id: Option<i64>,
    method: Option<String>,
    reason: Option<String>,
    proceeds: Option<f64>,
}

#[derive(Debug, sqlx::FromRow)]
struct AssetRow {
    id: i64,
    name: String,
    location: String,
}

/// Complete a transfer request: relocate the linked asset to the
/// destination, hand custody to the approver when one is recorded, and
/// write the location-change audit entry, all in one unit of work.
#[tracing::instrument(skip(pool, actor))]
pub async fn complete_transfer(
    pool: &PgPool,
    transfer_id: i64,
    actor: &ActorSnapshot,
) -> Result<CompletionOutcome, CompletionError> {
    let mut tx = pool.begin().await?;

    let transfer = sqlx::query_as::<_, TransferRow>(
        r#"
        UPDATE transfer_requests
        SET status = 'completed', updated_at = NOW()
        WHERE id = $1 AND status <> 'completed'
        RETURNING id, asset_id, from_location, to_location, approved_by
        "#,
    )
    .bind(transfer_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(transfer) = transfer else {
        return finish_noop(tx, "transfer_requests", transfer_id, "transfer request").await;
    };

    let approver_name = match transfer.approved_by {
        Some(user_id) => {
            sqlx::query_scalar::<_, String>(
                "SELECT first_name || ' ' || last_name FROM users WHERE id = $1",
            )
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
        },
        None => None,
    };

    let plan = transitions::plan_transfer_completion(
        transfer.asset_id,
        &transfer.to_location,
        approver_name.as_deref(),
    );

    let mut cascade_applied = false;
    for effect in &plan.effects {
        let CascadeEffect::RelocateAsset {
            asset_id,
            to_location,
            new_custodian,
        } = effect
        else {
            continue;
        };

        let Some(asset) = lock_asset(&mut tx, *asset_id).await? else {
            warn!(
                asset_id,
                transfer_id, "Linked asset missing; skipping relocation cascade"
            );
            continue;
        };

        sqlx::query(
            r#"
            UPDATE assets
            SET location = $2,
                custodian_name = COALESCE($3, custodian_name),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(asset.id)
        .bind(to_location)
        .bind(new_custodian.as_deref())
        .execute(&mut *tx)
        .await?;

        let entry = NewAuditEntry::builder(AuditAction::TransferCompleted)
            .actor(actor.clone())
            .table(AuditedTable::Assets)
            .record_id(Some(asset.id))
            .old_values(json!({ "location": asset.location }))
            .new_values(json!({ "location": to_location }))
            .origin(SYSTEM_ORIGIN, SYSTEM_ORIGIN)
            .extra(json!({
                "transfer_request_id": transfer.id,
                "from_location": transfer.from_location,
                "to_location": transfer.to_location,
            }))
            .build();
        write_cascade_audit(&mut tx, entry).await?;

        info!(
            asset_id = asset.id,
            from = %asset.location,
            to = %to_location,
            "Asset relocated on transfer completion"
        );
        cascade_applied = true;
    }

    tx.commit().await?;
    Ok(CompletionOutcome::Completed { cascade_applied })
}

/// Complete an auction: capture the asset identity and sale terms as a
/// pre-deletion snapshot, then remove the asset entity.
#[tracing::instrument(skip(pool, actor))]
pub async fn complete_auction(
    pool: &PgPool,
    auction_id: i64,
    actor: &ActorSnapshot,
) -> Result<CompletionOutcome, CompletionError> {
    let mut tx = pool.begin().await?;

    let auction = sqlx::query_as::<_, AuctionRow>(
        r#"
        UPDATE auctions
        SET status = 'completed'
        WHERE id = $1 AND status <> 'completed'
        RETURNING id, asset_id, winning_bid, winner_name
        "#,
    )
    .bind(auction_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(auction) = auction else {
        return finish_noop(tx, "auctions", auction_id, "auction").await;
    };

    let extra = json!({
        "auction_id": auction.id,
        "winning_bid": auction.winning_bid,
        "winner": auction.winner_name,
    });
    let new_values = json!({ "status": "retired", "auction_id": auction.id });

    let cascade_applied = retire_asset(
        &mut tx,
        auction.asset_id,
        actor,
        AuditAction::AuctionSale,
        new_values,
        extra,
    )
    .await?;

    tx.commit().await?;
    Ok(CompletionOutcome::Completed { cascade_applied })
}

/// Complete a disposal: capture the asset identity and disposal terms as
/// a pre-deletion snapshot, then remove the asset entity.
#[tracing::instrument(skip(pool, actor))]
pub async fn complete_disposal(
    pool: &PgPool,
    disposal_id: i64,
    actor: &ActorSnapshot,
) -> Result<CompletionOutcome, CompletionError> {
    let mut tx = pool.begin().await?;

    let disposal = sqlx::query_as::<_, DisposalRow>(
        r#"
        UPDATE disposals
        SET status = 'completed'
        WHERE id = $1 AND status <> 'completed'
        RETURNING id, asset_id, method, reason, proceeds
        "#,
    )
    .bind(disposal_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(disposal) = disposal else {
        return finish_noop(tx, "disposals", disposal_id, "disposal").await;
    };

    let extra = json!({
        "disposal_id": disposal.id,
        "method": disposal.method,
        "reason": disposal.reason,
        "proceeds": disposal.proceeds,
    });
    let new_values = json!({ "status": "retired", "disposal_id": disposal.id });

    let cascade_applied = retire_asset(
        &mut tx,
        disposal.asset_id,
        actor,
        AuditAction::DisposalRetirement,
        new_values,
        extra,
    )
    .await?;

    tx.commit().await?;
    Ok(CompletionOutcome::Completed { cascade_applied })
}

/// Shared retirement cascade for auction and disposal completion.
async fn retire_asset(
    tx: &mut Transaction<'_, Postgres>,
    asset_id: Option<i64>,
    actor: &ActorSnapshot,
    action: AuditAction,
    new_values: serde_json::Value,
    extra: serde_json::Value,
) -> Result<bool, CompletionError> {
    let plan = transitions::plan_retirement(asset_id);

    let mut cascade_applied = false;
    for effect in &plan.effects {
        let CascadeEffect::RetireAsset { asset_id } = effect else {
            continue;
        };

        let Some(asset) = lock_asset(tx, *asset_id).await? else {
            warn!(asset_id, "Linked asset missing; skipping retirement cascade");
            continue;
        };

        // Pre-deletion snapshot goes in first so the trail always names
        // what was removed.
        let entry = NewAuditEntry::builder(action)
            .actor(actor.clone())
            .table(AuditedTable::Assets)
            .record_id(Some(asset.id))
            .old_values(json!({
                "asset_id": asset.id,
                "asset_name": asset.name,
                "location": asset.location,
            }))
            .new_values(new_values.clone())
            .origin(SYSTEM_ORIGIN, SYSTEM_ORIGIN)
            .extra(extra.clone())
            .build();
        write_cascade_audit(tx, entry).await?;

        // Dependent rows (maintenance history etc.) are removed by the
        // storage layer's referential actions.
        sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(asset.id)
            .execute(&mut **tx)
            .await?;

        info!(asset_id = asset.id, asset_name = %asset.name, "Asset retired on workflow completion");
        cascade_applied = true;
    }

    Ok(cascade_applied)
}

async fn lock_asset(
    tx: &mut Transaction<'_, Postgres>,
    asset_id: i64,
) -> Result<Option<AssetRow>, sqlx::Error> {
    sqlx::query_as::<_, AssetRow>("SELECT id, name, location FROM assets WHERE id = $1 FOR UPDATE")
        .bind(asset_id)
        .fetch_optional(&mut **tx)
        .await
}

/// The conditional write matched no row: either the record is already
/// completed (idempotent no-op) or it does not exist.
async fn finish_noop(
    mut tx: Transaction<'_, Postgres>,
    table: &'static str,
    record_id: i64,
    entity: &'static str,
) -> Result<CompletionOutcome, CompletionError> {
    let sql = format!("SELECT id FROM {} WHERE id = $1", table);
    let exists = sqlx::query_scalar::<_, i64>(&sql)
        .bind(record_id)
        .fetch_optional(&mut *tx)
        .await?;
    tx.rollback().await?;

    match exists {
        Some(_) => {
            info!(record_id, entity, "Record already completed; completion is a no-op");
            Ok(CompletionOutcome::AlreadyCompleted)
        },
        None => Err(CompletionError::NotFound(entity)),
    }
}

/// Write the cascade's linked audit entry under a savepoint so its
/// failure cannot poison the surrounding transaction. The transition
/// outlives its trail by design.
async fn write_cascade_audit(
    tx: &mut Transaction<'_, Postgres>,
    entry: NewAuditEntry,
) -> Result<(), sqlx::Error> {
    sqlx::query("SAVEPOINT cascade_audit").execute(&mut **tx).await?;
    match insert_audit_entry(&mut **tx, entry).await {
        Ok(_) => {
            sqlx::query("RELEASE SAVEPOINT cascade_audit")
                .execute(&mut **tx)
                .await?;
        },
        Err(e) => {
            warn!(error = %e, "Cascade audit write failed; completing without it");
            sqlx::query("ROLLBACK TO SAVEPOINT cascade_audit")
                .execute(&mut **tx)
                .await?;
        },
    }
    Ok(())
}
