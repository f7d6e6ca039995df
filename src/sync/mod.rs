use tracing::{info, warn};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{now_timestamp, ExpenseRecord};

/// What a sync does with the reporting row of a soft-deleted source expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum DeletePolicy {
    /// Remove the reporting row (keeps one row per live source expense).
    #[default]
    Prune,
    /// Keep the row but flag it; reports exclude flagged rows.
    Flag,
}

/// Explicit sync configuration, injected rather than read from global state.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SyncOptions {
    pub delete_policy: DeletePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyncOutcome {
    pub updated: usize,
    pub removed: usize,
    pub skipped: usize,
    pub watermark: String,
}

/// Incremental, idempotent refresh of the reporting store.
///
/// Reads every source expense with `updated_at` strictly past the watermark
/// (all of them when no watermark exists), resolves the referenced names,
/// and applies the whole batch plus the watermark advance as one
/// transaction. Rows with unresolvable references are logged and skipped;
/// the rest of the batch still commits. A failed write leaves the watermark
/// untouched, so the sync is safe to retry.
pub(crate) fn synchronize(db: &mut Database, options: &SyncOptions) -> Result<SyncOutcome> {
    let started = now_timestamp();
    let last_sync = db.get_last_sync_time()?;
    let changed = db.changed_expenses_since(last_sync.as_deref())?;

    if changed.is_empty() {
        // Nothing past the watermark. With an existing watermark this is a
        // strict no-op; a first-ever sync over an empty source still records
        // the start instant so later syncs stay incremental.
        let watermark = match last_sync {
            Some(w) => w,
            None => {
                db.apply_sync_batch(&[], &[], &started)?;
                started
            }
        };
        info!("sync: no changes, watermark {watermark}");
        return Ok(SyncOutcome {
            updated: 0,
            removed: 0,
            skipped: 0,
            watermark,
        });
    }

    let mut upserts: Vec<ExpenseRecord> = Vec::new();
    let mut removals: Vec<i64> = Vec::new();
    let mut skipped = 0usize;
    // Watermark candidate: max updated_at observed, skipped rows included,
    // so a conflicted row is not re-read forever. It resurfaces when the
    // upstream fix bumps its updated_at.
    let mut max_updated: Option<String> = None;

    for row in changed {
        let updated_at = row.expense.updated_at.clone();
        if max_updated.as_deref() < Some(updated_at.as_str()) {
            max_updated = Some(updated_at);
        }

        if row.expense.is_deleted && options.delete_policy == DeletePolicy::Prune {
            if let Some(id) = row.expense.id {
                removals.push(id);
            }
            continue;
        }

        let expense_id = row.expense.id.unwrap_or_default();
        match row.into_record() {
            Ok(record) => upserts.push(record),
            Err(missing) => {
                let e = Error::SyncConflict {
                    expense_id,
                    missing,
                };
                warn!("sync: {e}; row skipped");
                skipped += 1;
            }
        }
    }

    let watermark = max_updated.unwrap_or(started);
    db.apply_sync_batch(&upserts, &removals, &watermark)?;

    let outcome = SyncOutcome {
        updated: upserts.len(),
        removed: removals.len(),
        skipped,
        watermark,
    };
    info!(
        "sync: {} upserted, {} removed, {} skipped, watermark {}",
        outcome.updated, outcome.removed, outcome.skipped, outcome.watermark
    );
    Ok(outcome)
}
