use std::collections::HashMap;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;
use tracing::debug;
use shared::models::*;
use crate::store::{CommentStore, PollStore, StoreError, VoteOutcome};

#[derive(sqlx::FromRow)]
struct PollRow {
    id: Uuid,
    question: String,
    option1: String,
    option2: String,
    votes1: i64,
    votes2: i64,
    author_id: Option<Uuid>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

#[derive(sqlx::FromRow)]
struct VoterRow {
    poll_id: Uuid,
    user_id: Uuid,
    choice: VoteOption,
    voted_at: OffsetDateTime,
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    poll_id: Uuid,
    content: String,
    author_id: Uuid,
    username: String,
    created_at: OffsetDateTime,
}

impl PollRow {
    fn into_poll(self, voters: Vec<VoterEntry>) -> Poll {
        Poll {
            id: self.id,
            question: self.question,
            option1: self.option1,
            option2: self.option2,
            votes1: self.votes1,
            votes2: self.votes2,
            voters,
            author_id: self.author_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<VoterRow> for VoterEntry {
    fn from(row: VoterRow) -> Self {
        VoterEntry {
            user_id: row.user_id,
            option: row.choice,
            voted_at: row.voted_at,
        }
    }
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            poll_id: row.poll_id,
            content: row.content,
            author_id: row.author_id,
            username: row.username,
            created_at: row.created_at,
        }
    }
}

const POLL_COLUMNS: &str =
    "id, question, option1, option2, votes1, votes2, author_id, created_at, updated_at";

/// Postgres-backed store. The voter ledger lives in `poll_voters`, whose
/// `unique_voter` constraint on `(poll_id, user_id)` is what rejects a
/// second vote, including one racing in from another instance.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a read-only transaction on a single snapshot, so a poll row and
    /// its `poll_voters` rows are always read at the same moment.
    async fn begin_snapshot(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    async fn fetch_poll(conn: &mut PgConnection, id: Uuid) -> Result<Option<Poll>, StoreError> {
        let record = sqlx::query_as::<_, PollRow>(
            &format!("SELECT {POLL_COLUMNS} FROM polls WHERE id = $1")
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(poll) = record else { return Ok(None) };

        let voters = sqlx::query_as::<_, VoterRow>(
            "SELECT poll_id, user_id, choice, voted_at FROM poll_voters
             WHERE poll_id = $1 ORDER BY voted_at, id"
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(Some(poll.into_poll(voters.into_iter().map(VoterEntry::from).collect())))
    }
}

#[rocket::async_trait]
impl PollStore for PgStore {
    async fn insert_poll(&self, poll: &Poll) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO polls
             (id, question, option1, option2, votes1, votes2, author_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        )
        .bind(poll.id)
        .bind(&poll.question)
        .bind(&poll.option1)
        .bind(&poll.option2)
        .bind(poll.votes1)
        .bind(poll.votes2)
        .bind(poll.author_id)
        .bind(poll.created_at)
        .bind(poll.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_poll(&self, id: Uuid) -> Result<Option<Poll>, StoreError> {
        let mut tx = self.begin_snapshot().await?;
        let poll = Self::fetch_poll(&mut tx, id).await?;
        tx.commit().await?;
        Ok(poll)
    }

    async fn list_polls(&self) -> Result<Vec<Poll>, StoreError> {
        let mut tx = self.begin_snapshot().await?;

        let records = sqlx::query_as::<_, PollRow>(
            &format!("SELECT {POLL_COLUMNS} FROM polls ORDER BY created_at DESC")
        )
        .fetch_all(&mut *tx)
        .await?;

        let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
        let voters = sqlx::query_as::<_, VoterRow>(
            "SELECT poll_id, user_id, choice, voted_at FROM poll_voters
             WHERE poll_id = ANY($1) ORDER BY voted_at, id"
        )
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        let mut ledgers: HashMap<Uuid, Vec<VoterEntry>> = HashMap::with_capacity(ids.len());
        for voter in voters {
            ledgers.entry(voter.poll_id).or_default().push(voter.into());
        }

        Ok(records.into_iter()
            .map(|poll| {
                let ledger = ledgers.remove(&poll.id).unwrap_or_default();
                poll.into_poll(ledger)
            })
            .collect())
    }

    async fn record_vote(&self, poll_id: Uuid, entry: VoterEntry) -> Result<VoteOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO poll_voters (poll_id, user_id, choice, voted_at)
             VALUES ($1, $2, $3, $4)"
        )
        .bind(poll_id)
        .bind(entry.user_id)
        .bind(entry.option)
        .bind(entry.voted_at)
        .execute(&mut *tx)
        .await;

        // Dropping `tx` on the early returns rolls the transaction back.
        if let Err(e) = inserted {
            let violation = e.as_database_error()
                .map(|db| (db.is_unique_violation(), db.is_foreign_key_violation()));
            return match violation {
                Some((true, _)) => {
                    debug!("unique_voter rejected vote on {} by {}", poll_id, entry.user_id);
                    Ok(VoteOutcome::AlreadyVoted)
                }
                Some((_, true)) => Ok(VoteOutcome::PollMissing),
                _ => Err(StoreError::Database(e)),
            };
        }

        sqlx::query(
            "UPDATE polls SET
                votes1 = votes1 + CASE WHEN $2 = 1 THEN 1 ELSE 0 END,
                votes2 = votes2 + CASE WHEN $2 = 2 THEN 1 ELSE 0 END,
                updated_at = $3
             WHERE id = $1"
        )
        .bind(poll_id)
        .bind(entry.option.as_i16())
        .bind(entry.voted_at)
        .execute(&mut *tx)
        .await?;

        let poll = Self::fetch_poll(&mut tx, poll_id).await?;
        tx.commit().await?;

        Ok(match poll {
            Some(poll) => VoteOutcome::Recorded(poll),
            None => VoteOutcome::PollMissing,
        })
    }

    async fn add_participation(&self, user_id: Uuid, poll_id: Uuid) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO user_poll_votes (user_id, poll_id) VALUES ($1, $2)
             ON CONFLICT (user_id, poll_id) DO NOTHING"
        )
        .bind(user_id)
        .bind(poll_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn participation(&self, user_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        let polls = sqlx::query_scalar::<_, Uuid>(
            "SELECT poll_id FROM user_poll_votes WHERE user_id = $1 ORDER BY created_at"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(polls)
    }
}

#[rocket::async_trait]
impl CommentStore for PgStore {
    async fn insert_comment(&self, comment: &Comment) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO comments (id, poll_id, content, author_id, username, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)"
        )
        .bind(comment.id)
        .bind(comment.poll_id)
        .bind(&comment.content)
        .bind(comment.author_id)
        .bind(&comment.username)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_comments(&self, poll_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        let records = sqlx::query_as::<_, CommentRow>(
            "SELECT id, poll_id, content, author_id, username, created_at
             FROM comments WHERE poll_id = $1 ORDER BY created_at DESC"
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records.into_iter().map(Comment::from).collect())
    }
}
