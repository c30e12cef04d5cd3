//! Reviewer assignment engine.
//!
//! Creates pull requests with reviewers, merges them, and swaps one
//! reviewer for another. Each operation holds the pull request's lock from
//! the [`PrLockRegistry`](crate::db::locks::PrLockRegistry) for the whole of
//! its transaction, re-reads everything it depends on after taking it, and
//! rolls back on any error so no partial assignment set is ever committed.

use crate::db::{directory, pull_requests, Database};
use crate::error::AppError;
use crate::models::{NewPullRequest, PullRequest, PullRequestStatus, Reassignment};
use crate::services::selection::{self, REVIEWERS_PER_PULL_REQUEST};
use sqlx::{Sqlite, SqliteConnection, Transaction};
use std::collections::HashSet;

/// Get the current Unix timestamp.
fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Attach the failing step to a storage error.
fn db_err(operation: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |err| AppError::database_with_op(err.to_string(), operation)
}

async fn begin(db: &Database) -> Result<Transaction<'static, Sqlite>, AppError> {
    db.pool().begin().await.map_err(db_err("begin transaction"))
}

async fn commit(tx: Transaction<'static, Sqlite>) -> Result<(), AppError> {
    tx.commit().await.map_err(db_err("commit"))
}

/// Roll back after a failed step. The step's error is what the caller sees.
async fn abandon(tx: Transaction<'static, Sqlite>, operation: &str) {
    if let Err(e) = tx.rollback().await {
        log::warn!("[engine] Rollback after failed {} did not complete: {}", operation, e);
    }
}

/// Create a pull request and assign up to two reviewers from the author's team.
///
/// # Errors
/// * `PrExists` - the id is taken (checked before the author)
/// * `AuthorNotFound` - the author is not a known user
///
/// Fewer than two eligible teammates is not an error; the pull request gets
/// whoever is available, possibly nobody.
pub async fn create_pr(db: &Database, new: NewPullRequest) -> Result<PullRequest, AppError> {
    let _lock = db.pr_locks().acquire(&new.pull_request_id).await;
    let mut tx = begin(db).await?;

    match create_in_tx(&mut tx, &new).await {
        Ok(pr) => {
            commit(tx).await?;
            log::info!(
                "[engine] Created {} by {} with reviewers {:?}",
                pr.pull_request_id,
                pr.author_id,
                pr.assigned_reviewers
            );
            Ok(pr)
        }
        Err(err) => {
            abandon(tx, "create_pr").await;
            Err(err)
        }
    }
}

async fn create_in_tx(
    conn: &mut SqliteConnection,
    new: &NewPullRequest,
) -> Result<PullRequest, AppError> {
    // The insert comes first: it both detects duplicates and takes the
    // write lock before any eligibility read
    let created_at = now();
    let inserted = pull_requests::insert_pull_request(conn, new, created_at)
        .await
        .map_err(db_err("insert pull request"))?;
    if !inserted {
        return Err(AppError::pr_exists(&new.pull_request_id));
    }

    let team = directory::team_of(conn, &new.author_id)
        .await
        .map_err(db_err("resolve author team"))?
        .ok_or_else(|| AppError::author_not_found(&new.author_id))?;

    let members = directory::active_members_of(conn, &team)
        .await
        .map_err(db_err("load team members"))?;
    let exclusions: HashSet<&str> = HashSet::from([new.author_id.as_str()]);
    let candidates = selection::eligible(members, &exclusions);
    let reviewers = selection::pick_reviewers(&candidates, REVIEWERS_PER_PULL_REQUEST);

    for reviewer in &reviewers {
        pull_requests::add_reviewer(conn, &new.pull_request_id, reviewer)
            .await
            .map_err(db_err("insert reviewer"))?;
    }

    Ok(PullRequest {
        pull_request_id: new.pull_request_id.clone(),
        pull_request_name: new.pull_request_name.clone(),
        author_id: new.author_id.clone(),
        status: PullRequestStatus::Open,
        assigned_reviewers: reviewers,
        created_at,
        merged_at: None,
    })
}

/// Mark a pull request as merged.
///
/// Idempotent: merging again keeps the original `merged_at` and reviewers.
///
/// # Errors
/// * `PrNotFound` - unknown id
pub async fn merge_pr(db: &Database, pr_id: &str) -> Result<PullRequest, AppError> {
    let _lock = db.pr_locks().acquire(pr_id).await;
    let mut tx = begin(db).await?;

    match merge_in_tx(&mut tx, pr_id).await {
        Ok(pr) => {
            commit(tx).await?;
            log::info!("[engine] Merged {}", pr_id);
            Ok(pr)
        }
        Err(err) => {
            abandon(tx, "merge_pr").await;
            Err(err)
        }
    }
}

async fn merge_in_tx(conn: &mut SqliteConnection, pr_id: &str) -> Result<PullRequest, AppError> {
    let record = pull_requests::mark_merged(conn, pr_id, now())
        .await
        .map_err(db_err("merge pull request"))?
        .ok_or_else(|| AppError::pr_not_found(pr_id))?;

    let reviewers = pull_requests::reviewers_of(conn, pr_id)
        .await
        .map_err(db_err("load reviewers"))?;

    Ok(PullRequest::from_record(record, reviewers))
}

/// Replace `old_reviewer_id` on an open pull request with a random active
/// member of the author's team who is neither the author nor already
/// reviewing it.
///
/// # Errors
/// * `PrNotFound` - unknown pull request
/// * `PrMerged` - the pull request is merged
/// * `ReviewerNotAssigned` - `old_reviewer_id` is not one of its reviewers
/// * `UserNotFound` - `old_reviewer_id` is not a known user
/// * `NoReplacementCandidate` - nobody is eligible; the old reviewer stays
pub async fn reassign_reviewer(
    db: &Database,
    pr_id: &str,
    old_reviewer_id: &str,
) -> Result<Reassignment, AppError> {
    let _lock = db.pr_locks().acquire(pr_id).await;
    let mut tx = begin(db).await?;

    match reassign_in_tx(&mut tx, pr_id, old_reviewer_id).await {
        Ok(reassignment) => {
            commit(tx).await?;
            log::info!(
                "[engine] Reassigned {} on {} to {}",
                old_reviewer_id,
                pr_id,
                reassignment.replaced_by
            );
            Ok(reassignment)
        }
        Err(err) => {
            abandon(tx, "reassign_reviewer").await;
            log::debug!("[engine] Reassign on {} rejected: {}", pr_id, err);
            Err(err)
        }
    }
}

async fn reassign_in_tx(
    conn: &mut SqliteConnection,
    pr_id: &str,
    old_reviewer_id: &str,
) -> Result<Reassignment, AppError> {
    let record = pull_requests::claim_pull_request(conn, pr_id)
        .await
        .map_err(db_err("lock pull request"))?
        .ok_or_else(|| AppError::pr_not_found(pr_id))?;

    if record.is_merged() {
        return Err(AppError::pr_merged(pr_id));
    }

    let removed = pull_requests::remove_reviewer(conn, pr_id, old_reviewer_id)
        .await
        .map_err(db_err("remove reviewer"))?;
    if !removed {
        return Err(AppError::reviewer_not_assigned(pr_id, old_reviewer_id));
    }

    directory::team_of(conn, old_reviewer_id)
        .await
        .map_err(db_err("resolve reviewer"))?
        .ok_or_else(|| AppError::user_not_found(old_reviewer_id))?;

    // Candidates come from the author's current team even if the old
    // reviewer has since moved elsewhere
    let team = directory::team_of(conn, &record.author_id)
        .await
        .map_err(db_err("resolve author team"))?
        .ok_or_else(|| AppError::author_not_found(&record.author_id))?;

    let remaining = pull_requests::reviewers_of(conn, pr_id)
        .await
        .map_err(db_err("load reviewers"))?;
    let members = directory::active_members_of(conn, &team)
        .await
        .map_err(db_err("load team members"))?;

    let candidates = {
        let mut exclusions: HashSet<&str> =
            HashSet::from([record.author_id.as_str(), old_reviewer_id]);
        exclusions.extend(remaining.iter().map(String::as_str));
        selection::eligible(members, &exclusions)
    };
    let replacement = selection::pick_replacement(&candidates)
        .ok_or_else(|| AppError::no_replacement_candidate(pr_id))?;

    pull_requests::add_reviewer(conn, pr_id, &replacement)
        .await
        .map_err(db_err("insert reviewer"))?;

    let mut reviewers = remaining;
    reviewers.push(replacement.clone());

    Ok(Reassignment {
        pull_request: PullRequest::from_record(record, reviewers),
        replaced_by: replacement,
    })
}
