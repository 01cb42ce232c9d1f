use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;
use shared::models::*;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to acquire store lock")]
    LockFailed,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of the conditional vote append.
#[derive(Debug, Clone, PartialEq)]
pub enum VoteOutcome {
    /// Ledger entry appended and tally incremented; carries the updated poll.
    Recorded(Poll),
    /// The user already has a ledger entry on this poll. Nothing changed.
    AlreadyVoted,
    /// No poll with that id. Nothing changed.
    PollMissing,
}

#[rocket::async_trait]
pub trait PollStore: Send + Sync {
    async fn insert_poll(&self, poll: &Poll) -> Result<(), StoreError>;

    async fn load_poll(&self, id: Uuid) -> Result<Option<Poll>, StoreError>;

    /// Newest first.
    async fn list_polls(&self) -> Result<Vec<Poll>, StoreError>;

    /// Appends `entry` to the poll's ledger and increments the tally of
    /// `entry.option` by one, only if no ledger entry has `entry.user_id`.
    /// Check and write happen as one atomic unit in the store.
    async fn record_vote(&self, poll_id: Uuid, entry: VoterEntry) -> Result<VoteOutcome, StoreError>;

    async fn add_participation(&self, user_id: Uuid, poll_id: Uuid) -> Result<(), StoreError>;

    /// Poll ids the user voted on, in the order the votes were recorded.
    async fn participation(&self, user_id: Uuid) -> Result<Vec<Uuid>, StoreError>;
}

#[rocket::async_trait]
pub trait CommentStore: Send + Sync {
    async fn insert_comment(&self, comment: &Comment) -> Result<(), StoreError>;

    /// Newest first.
    async fn list_comments(&self, poll_id: Uuid) -> Result<Vec<Comment>, StoreError>;
}

/// Process-local store. Every poll sits behind its own mutex, so the
/// conditional append for one poll never waits on another poll.
#[derive(Debug, Default)]
pub struct MemoryStore {
    polls: RwLock<HashMap<Uuid, Arc<Mutex<Poll>>>>,
    participation: Mutex<HashMap<Uuid, Vec<Uuid>>>,
    comments: RwLock<Vec<Comment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: Uuid) -> Result<Option<Arc<Mutex<Poll>>>, StoreError> {
        let polls = self.polls.read().map_err(|_| StoreError::LockFailed)?;
        Ok(polls.get(&id).cloned())
    }
}

#[rocket::async_trait]
impl PollStore for MemoryStore {
    async fn insert_poll(&self, poll: &Poll) -> Result<(), StoreError> {
        let mut polls = self.polls.write().map_err(|_| StoreError::LockFailed)?;
        polls.insert(poll.id, Arc::new(Mutex::new(poll.clone())));
        Ok(())
    }

    async fn load_poll(&self, id: Uuid) -> Result<Option<Poll>, StoreError> {
        match self.slot(id)? {
            Some(slot) => {
                let poll = slot.lock().map_err(|_| StoreError::LockFailed)?;
                Ok(Some(poll.clone()))
            }
            None => Ok(None),
        }
    }

    async fn list_polls(&self) -> Result<Vec<Poll>, StoreError> {
        let slots: Vec<_> = {
            let polls = self.polls.read().map_err(|_| StoreError::LockFailed)?;
            polls.values().cloned().collect()
        };

        let mut result = Vec::with_capacity(slots.len());
        for slot in slots {
            let poll = slot.lock().map_err(|_| StoreError::LockFailed)?;
            result.push(poll.clone());
        }
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn record_vote(&self, poll_id: Uuid, entry: VoterEntry) -> Result<VoteOutcome, StoreError> {
        let Some(slot) = self.slot(poll_id)? else {
            return Ok(VoteOutcome::PollMissing);
        };

        let mut poll = slot.lock().map_err(|_| StoreError::LockFailed)?;
        if !poll.append_vote(entry) {
            return Ok(VoteOutcome::AlreadyVoted);
        }
        Ok(VoteOutcome::Recorded(poll.clone()))
    }

    async fn add_participation(&self, user_id: Uuid, poll_id: Uuid) -> Result<(), StoreError> {
        let mut participation = self.participation.lock().map_err(|_| StoreError::LockFailed)?;
        let polls = participation.entry(user_id).or_default();
        if !polls.contains(&poll_id) {
            polls.push(poll_id);
        }
        Ok(())
    }

    async fn participation(&self, user_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        let participation = self.participation.lock().map_err(|_| StoreError::LockFailed)?;
        Ok(participation.get(&user_id).cloned().unwrap_or_default())
    }
}

#[rocket::async_trait]
impl CommentStore for MemoryStore {
    async fn insert_comment(&self, comment: &Comment) -> Result<(), StoreError> {
        let mut comments = self.comments.write().map_err(|_| StoreError::LockFailed)?;
        comments.push(comment.clone());
        Ok(())
    }

    async fn list_comments(&self, poll_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        let comments = self.comments.read().map_err(|_| StoreError::LockFailed)?;
        let mut result: Vec<_> = comments.iter()
            .filter(|c| c.poll_id == poll_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }
}
