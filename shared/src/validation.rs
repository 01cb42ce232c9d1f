use serde_json::Value;
use crate::models::{CreatePollRequest, VoteOption};

pub const MIN_QUESTION_LENGTH: usize = 5;
pub const MAX_QUESTION_LENGTH: usize = 300;
pub const MAX_OPTION_LENGTH: usize = 100;
pub const MAX_COMMENT_LENGTH: usize = 1000;
pub const MAX_USERNAME_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Question must be at least {MIN_QUESTION_LENGTH} characters")]
    QuestionTooShort,
    #[error("Question exceeds maximum length of {MAX_QUESTION_LENGTH}")]
    QuestionTooLong,
    #[error("Option {0} is required")]
    EmptyOption(u8),
    #[error("Option {0} exceeds maximum length of {MAX_OPTION_LENGTH}")]
    OptionTooLong(u8),
    #[error("Options must be different")]
    IdenticalOptions,
    #[error("Comment content is required")]
    EmptyComment,
    #[error("Comment exceeds maximum length of {MAX_COMMENT_LENGTH}")]
    CommentTooLong,
    #[error("Username exceeds maximum length of {MAX_USERNAME_LENGTH}")]
    UsernameTooLong,
    #[error("Invalid option")]
    InvalidOption,
}

/// Poll fields that passed validation, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPoll {
    pub question: String,
    pub option1: String,
    pub option2: String,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn validate_option(text: &str, index: u8) -> Result<String, ValidationError> {
    let text = text.trim();
    if text.is_empty() { return Err(ValidationError::EmptyOption(index)); }
    if char_len(text) > MAX_OPTION_LENGTH { return Err(ValidationError::OptionTooLong(index)); }
    Ok(text.to_owned())
}

/// Options are compared exactly as typed once surrounding whitespace is
/// removed: `"Yes"` and `"yes"` are two different options.
pub fn validate_poll_request(request: &CreatePollRequest) -> Result<NewPoll, ValidationError> {
    let question = request.question.trim();
    if char_len(question) < MIN_QUESTION_LENGTH { return Err(ValidationError::QuestionTooShort); }
    if char_len(question) > MAX_QUESTION_LENGTH { return Err(ValidationError::QuestionTooLong); }

    let option1 = validate_option(&request.option1, 1)?;
    let option2 = validate_option(&request.option2, 2)?;
    if option1 == option2 { return Err(ValidationError::IdenticalOptions); }

    Ok(NewPoll {
        question: question.to_owned(),
        option1,
        option2,
    })
}

pub fn validate_comment_content(content: &str) -> Result<String, ValidationError> {
    let content = content.trim();
    if content.is_empty() { return Err(ValidationError::EmptyComment); }
    if char_len(content) > MAX_COMMENT_LENGTH { return Err(ValidationError::CommentTooLong); }
    Ok(content.to_owned())
}

pub fn validate_username(username: &str) -> Result<Option<String>, ValidationError> {
    let username = username.trim();
    if username.is_empty() { return Ok(None); }
    if char_len(username) > MAX_USERNAME_LENGTH { return Err(ValidationError::UsernameTooLong); }
    Ok(Some(username.to_owned()))
}

/// Only the JSON numbers `1` and `2` are options (`1.0` is the number `1`);
/// strings, fractions, booleans and null are not coerced.
pub fn parse_vote_option(value: &Value) -> Result<VoteOption, ValidationError> {
    let number = match value.as_i64() {
        Some(n) => Some(n),
        None => value.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
            .map(|f| f as i64),
    };
    number
        .and_then(|n| VoteOption::try_from(n).ok())
        .ok_or(ValidationError::InvalidOption)
}
