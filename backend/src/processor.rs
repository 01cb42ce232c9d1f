use rustrict::CensorStr;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;
use shared::models::*;
use shared::tally::PollResults;
use shared::user_info::AuthUser;
use shared::validation::{validate_comment_content, validate_poll_request, validate_username, ValidationError};
use crate::store::{CommentStore, PollStore, StoreError, VoteOutcome};

#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error("Poll not found")]
    PollNotFound,
    #[error("You have already voted on this poll")]
    DuplicateVote,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Possible profanity detected in {0}")]
    Inappropriate(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn check_options_for_profanity(options: &[&str]) -> Result<(), ProcessorError> {
    for option in options {
        if option.is_inappropriate() {
            return Err(ProcessorError::Inappropriate(format!("option: {}", option)));
        }
    }

    let combined = options.concat();
    if combined.is_inappropriate() {
        return Err(ProcessorError::Inappropriate(format!("options: {}", options.join(", "))));
    }
    Ok(())
}

pub struct PollProcessor;

impl PollProcessor {
    pub async fn create_poll(
        store: &dyn PollStore,
        request: &CreatePollRequest,
        author: &AuthUser,
    ) -> Result<Poll, ProcessorError> {
        let fields = validate_poll_request(request)?;

        if fields.question.is_inappropriate() {
            return Err(ProcessorError::Inappropriate(format!("question: {}", fields.question)));
        }
        check_options_for_profanity(&[&fields.option1, &fields.option2])?;

        let poll = Poll::new(fields, Some(author.id));
        store.insert_poll(&poll).await?;
        info!("📊 Poll {} created by {}", poll.id, author.id);
        Ok(poll)
    }

    pub async fn fetch_all_polls(store: &dyn PollStore) -> Result<Vec<Poll>, ProcessorError> {
        Ok(store.list_polls().await?)
    }

    pub async fn fetch_poll(store: &dyn PollStore, poll_id: Uuid) -> Result<Poll, ProcessorError> {
        store.load_poll(poll_id).await?.ok_or(ProcessorError::PollNotFound)
    }

    /// Records one vote by `user_id`. The duplicate check and the write are
    /// a single conditional operation in the store, so of several
    /// concurrent submissions by the same user exactly one is accepted.
    pub async fn submit_vote(
        store: &dyn PollStore,
        poll_id: Uuid,
        user_id: Uuid,
        option: VoteOption,
    ) -> Result<Poll, ProcessorError> {
        let entry = VoterEntry::now(user_id, option);

        let poll = match store.record_vote(poll_id, entry).await? {
            VoteOutcome::Recorded(poll) => poll,
            VoteOutcome::AlreadyVoted => {
                debug!("Rejected repeat vote on {} by {}", poll_id, user_id);
                return Err(ProcessorError::DuplicateVote);
            }
            VoteOutcome::PollMissing => return Err(ProcessorError::PollNotFound),
        };

        // The ledger is authoritative; the participation set is a cache.
        if let Err(e) = store.add_participation(user_id, poll_id).await {
            warn!("Failed to record participation of {} in {}: {}", user_id, poll_id, e);
        }

        info!("🗳️ Vote for option {} recorded on {}", option.as_i16(), poll_id);
        Ok(poll)
    }

    pub async fn vote_status(
        store: &dyn PollStore,
        poll_id: Uuid,
        user_id: Uuid,
    ) -> Result<VoteStatus, ProcessorError> {
        let poll = Self::fetch_poll(store, poll_id).await?;
        Ok(poll.vote_status(user_id))
    }

    pub async fn results(store: &dyn PollStore, poll_id: Uuid) -> Result<PollResults, ProcessorError> {
        let poll = Self::fetch_poll(store, poll_id).await?;
        Ok(PollResults::from_poll(&poll))
    }

    pub async fn participation(
        store: &dyn PollStore,
        user_id: Uuid,
    ) -> Result<ParticipationResponse, ProcessorError> {
        Ok(ParticipationResponse {
            user_id,
            votes: store.participation(user_id).await?,
        })
    }

    pub async fn add_comment(
        polls: &dyn PollStore,
        comments: &dyn CommentStore,
        poll_id: Uuid,
        request: &CreateCommentRequest,
        author: &AuthUser,
    ) -> Result<Comment, ProcessorError> {
        let content = validate_comment_content(&request.content)?;
        if content.is_inappropriate() {
            return Err(ProcessorError::Inappropriate("comment".into()));
        }

        let username = match &request.username {
            Some(name) => validate_username(name)?,
            None => None,
        }
        .unwrap_or_else(|| author.display_name());

        Self::fetch_poll(polls, poll_id).await?;

        let comment = Comment {
            id: Uuid::new_v4(),
            poll_id,
            content,
            author_id: author.id,
            username,
            created_at: OffsetDateTime::now_utc(),
        };
        comments.insert_comment(&comment).await?;
        debug!("Comment {} added to {}", comment.id, poll_id);
        Ok(comment)
    }

    pub async fn list_comments(
        polls: &dyn PollStore,
        comments: &dyn CommentStore,
        poll_id: Uuid,
    ) -> Result<Vec<Comment>, ProcessorError> {
        Self::fetch_poll(polls, poll_id).await?;
        Ok(comments.list_comments(poll_id).await?)
    }
}
