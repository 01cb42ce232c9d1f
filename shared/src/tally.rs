use serde::{Serialize, Deserialize};
use uuid::Uuid;
use crate::models::{Poll, VoteOption};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OptionResult {
    pub text: String,
    pub votes: i64,
    pub percentage: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PollResults {
    pub poll_id: Uuid,
    pub question: String,
    pub total_votes: i64,
    pub option1: OptionResult,
    pub option2: OptionResult,
    pub leader: Option<VoteOption>,
}

/// Share of `votes` in `total`, rounded half up. Zero when nobody voted.
pub fn percentage(votes: i64, total: i64) -> u32 {
    if total <= 0 {
        return 0;
    }
    (votes as f64 * 100.0 / total as f64).round() as u32
}

impl PollResults {
    pub fn from_poll(poll: &Poll) -> Self {
        let total = poll.total_votes();
        let option = |text: &str, votes: i64| OptionResult {
            text: text.to_owned(),
            votes,
            percentage: percentage(votes, total),
        };

        let leader = match poll.votes1.cmp(&poll.votes2) {
            std::cmp::Ordering::Greater => Some(VoteOption::One),
            std::cmp::Ordering::Less => Some(VoteOption::Two),
            std::cmp::Ordering::Equal => None,
        };

        Self {
            poll_id: poll.id,
            question: poll.question.clone(),
            total_votes: total,
            option1: option(&poll.option1, poll.votes1),
            option2: option(&poll.option2, poll.votes2),
            leader,
        }
    }
}
