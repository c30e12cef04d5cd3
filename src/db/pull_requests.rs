//! Pull request and reviewer assignment rows.
//!
//! All functions run on a caller-provided connection, normally the engine's
//! open transaction.

use crate::models::{NewPullRequest, PullRequestRecord};
use sqlx::SqliteConnection;

const RECORD_COLUMNS: &str =
    "pull_request_id, pull_request_name, author_id, status, created_at, merged_at";

/// Insert an OPEN pull request. Returns `false` if the id is already taken.
pub async fn insert_pull_request(
    conn: &mut SqliteConnection,
    new: &NewPullRequest,
    created_at: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO pull_requests (pull_request_id, pull_request_name, author_id, status, created_at)
        VALUES (?, ?, ?, 'OPEN', ?)
        ON CONFLICT (pull_request_id) DO NOTHING
        "#,
    )
    .bind(&new.pull_request_id)
    .bind(&new.pull_request_name)
    .bind(&new.author_id)
    .bind(created_at)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Read a pull request row while taking the write lock on it.
///
/// The no-op update makes this the transaction's first write, so the
/// returned row cannot change until the transaction ends.
pub async fn claim_pull_request(
    conn: &mut SqliteConnection,
    pr_id: &str,
) -> Result<Option<PullRequestRecord>, sqlx::Error> {
    sqlx::query_as::<_, PullRequestRecord>(&format!(
        "UPDATE pull_requests SET status = status WHERE pull_request_id = ? RETURNING {}",
        RECORD_COLUMNS
    ))
    .bind(pr_id)
    .fetch_optional(&mut *conn)
    .await
}

/// Move a pull request to MERGED, keeping the first merge time.
pub async fn mark_merged(
    conn: &mut SqliteConnection,
    pr_id: &str,
    merged_at: i64,
) -> Result<Option<PullRequestRecord>, sqlx::Error> {
    sqlx::query_as::<_, PullRequestRecord>(&format!(
        r#"
        UPDATE pull_requests
        SET status = 'MERGED',
            merged_at = COALESCE(merged_at, ?)
        WHERE pull_request_id = ?
        RETURNING {}
        "#,
        RECORD_COLUMNS
    ))
    .bind(merged_at)
    .bind(pr_id)
    .fetch_optional(&mut *conn)
    .await
}

/// Current reviewers of a pull request, in assignment order.
pub async fn reviewers_of(
    conn: &mut SqliteConnection,
    pr_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT reviewer_id FROM pr_reviewers WHERE pull_request_id = ? ORDER BY rowid",
    )
    .bind(pr_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn add_reviewer(
    conn: &mut SqliteConnection,
    pr_id: &str,
    reviewer_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO pr_reviewers (pull_request_id, reviewer_id) VALUES (?, ?)")
        .bind(pr_id)
        .bind(reviewer_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Delete one assignment. Returns `false` if it did not exist.
pub async fn remove_reviewer(
    conn: &mut SqliteConnection,
    pr_id: &str,
    reviewer_id: &str,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM pr_reviewers WHERE pull_request_id = ? AND reviewer_id = ?")
            .bind(pr_id)
            .bind(reviewer_id)
            .execute(&mut *conn)
            .await?;

    Ok(result.rows_affected() > 0)
}
