use serde::{Serialize, Deserialize};
use time::OffsetDateTime;
use uuid::Uuid;
use crate::validation::NewPoll;

/// One of the two choices of a poll. Travels as the bare integer `1` or `2`.
#[cfg_attr(feature = "backend", derive(sqlx::Type))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
#[repr(i16)]
pub enum VoteOption {
    One = 1,
    Two = 2,
}

impl VoteOption {
    pub const fn as_i16(self) -> i16 {
        self as i16
    }
}

impl TryFrom<i64> for VoteOption {
    type Error = String;

    fn try_from(v: i64) -> Result<Self, String> {
        match v {
            1 => Ok(VoteOption::One),
            2 => Ok(VoteOption::Two),
            n => Err(format!("invalid vote option {n}, expected 1 or 2")),
        }
    }
}

impl From<VoteOption> for i64 {
    fn from(option: VoteOption) -> i64 {
        i64::from(option.as_i16())
    }
}

/// A single ledger entry: who voted, for what, and when.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoterEntry {
    pub user_id: Uuid,
    pub option: VoteOption,
    #[serde(with = "time::serde::rfc3339")]
    pub voted_at: OffsetDateTime,
}

impl VoterEntry {
    pub fn now(user_id: Uuid, option: VoteOption) -> Self {
        Self {
            user_id,
            option,
            voted_at: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: Uuid,
    pub question: String,
    pub option1: String,
    pub option2: String,
    pub votes1: i64,
    pub votes2: i64,
    pub voters: Vec<VoterEntry>,
    pub author_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Poll {
    pub fn new(fields: NewPoll, author_id: Option<Uuid>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            question: fields.question,
            option1: fields.option1,
            option2: fields.option2,
            votes1: 0,
            votes2: 0,
            voters: Vec::new(),
            author_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn ballot_of(&self, user_id: Uuid) -> Option<&VoterEntry> {
        self.voters.iter().find(|voter| voter.user_id == user_id)
    }

    pub fn has_voted(&self, user_id: Uuid) -> bool {
        self.ballot_of(user_id).is_some()
    }

    /// Appends `entry` and bumps the matching tally, unless the user is
    /// already in the ledger. Returns whether the entry was accepted.
    pub fn append_vote(&mut self, entry: VoterEntry) -> bool {
        if self.has_voted(entry.user_id) {
            return false;
        }
        match entry.option {
            VoteOption::One => self.votes1 += 1,
            VoteOption::Two => self.votes2 += 1,
        }
        self.updated_at = entry.voted_at;
        self.voters.push(entry);
        true
    }

    pub fn option_text(&self, option: VoteOption) -> &str {
        match option {
            VoteOption::One => &self.option1,
            VoteOption::Two => &self.option2,
        }
    }

    pub fn total_votes(&self) -> i64 {
        self.votes1 + self.votes2
    }

    /// True when the tallies agree with the ledger.
    pub fn is_consistent(&self) -> bool {
        let ledger1 = self.voters.iter().filter(|v| v.option == VoteOption::One).count() as i64;
        let ledger2 = self.voters.len() as i64 - ledger1;
        self.votes1 == ledger1 && self.votes2 == ledger2
    }

    pub fn vote_status(&self, user_id: Uuid) -> VoteStatus {
        self.ballot_of(user_id)
            .map(VoteStatus::from_entry)
            .unwrap_or_else(VoteStatus::not_voted)
    }
}

/// `{hasVoted: false}` or `{hasVoted: true, option, votedAt}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoteStatus {
    pub has_voted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<VoteOption>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
    pub voted_at: Option<OffsetDateTime>,
}

impl VoteStatus {
    pub fn not_voted() -> Self {
        Self { has_voted: false, option: None, voted_at: None }
    }

    pub fn from_entry(entry: &VoterEntry) -> Self {
        Self {
            has_voted: true,
            option: Some(entry.option),
            voted_at: Some(entry.voted_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    pub username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    pub question: String,
    pub option1: String,
    pub option2: String,
}

/// `option` is taken as any JSON value; only the numbers 1 and 2 pass
/// `parse_vote_option`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VoteRequest {
    #[serde(default)]
    pub option: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub poll_id: String,
    pub content: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationResponse {
    pub user_id: Uuid,
    pub votes: Vec<Uuid>,
}
