use std::sync::Arc;
use rocket::{Build, Rocket, State, catchers, get, post, routes, http::Status, serde::json::Json};
use tracing::{debug, instrument};
use shared::{models::*, tally::PollResults, user_info::AuthUser, validation::parse_vote_option};
use crate::{
   catchers::{bad_request, internal_error, not_found, unauthorized, unprocessable},
   config::AppConfig,
   cors::CORS,
   error::ApiError,
   processor::PollProcessor,
   store::{CommentStore, MemoryStore, PollStore},
   utils::parse_poll_id,
};

/// Store handles injected into every handler.
pub struct AppState {
    pub polls: Arc<dyn PollStore>,
    pub comments: Arc<dyn CommentStore>,
}

impl AppState {
    pub fn new<S>(store: Arc<S>) -> Self
    where
        S: PollStore + CommentStore + 'static,
    {
        Self {
            polls: store.clone(),
            comments: store,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }
}

pub fn build_rocket(state: AppState, config: &AppConfig) -> Rocket<Build> {
    rocket::build()
        .attach(CORS::new(config.allowed_origins.clone()))
        .manage(state)
        .mount("/", routes![index])
        .mount(
            "/api",
            routes![
                list_polls,
                get_poll,
                create_poll,
                submit_vote,
                vote_status,
                poll_results,
                my_votes,
                list_comments,
                create_comment,
                all_options
            ],
        )
        .register(
            "/",
            catchers![
                bad_request,
                unauthorized,
                not_found,
                unprocessable,
                internal_error
            ],
        )
}

#[get("/")]
pub fn index() -> &'static str {
    "Poll App API is running..."
}

#[rocket::options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}

#[get("/polls")]
pub async fn list_polls(state: &State<AppState>, _user: AuthUser) -> Result<Json<Vec<Poll>>, ApiError> {
    let polls = PollProcessor::fetch_all_polls(state.polls.as_ref()).await?;
    Ok(Json(polls))
}

#[get("/polls/<id>")]
pub async fn get_poll(state: &State<AppState>, id: &str, _user: AuthUser) -> Result<Json<Poll>, ApiError> {
    let poll_id = parse_poll_id(id)?;
    let poll = PollProcessor::fetch_poll(state.polls.as_ref(), poll_id).await?;
    Ok(Json(poll))
}

#[instrument(skip(state, request, user), fields(user_id = %user.id))]
#[post("/polls", format = "json", data = "<request>")]
pub async fn create_poll(
    state: &State<AppState>,
    request: Json<CreatePollRequest>,
    user: AuthUser,
) -> Result<(Status, Json<Poll>), ApiError> {
    let poll = PollProcessor::create_poll(state.polls.as_ref(), &request, &user).await?;
    Ok((Status::Created, Json(poll)))
}

#[instrument(skip(state, request, user), fields(poll_id = %id, user_id = %user.id))]
#[post("/polls/<id>/vote", format = "json", data = "<request>")]
pub async fn submit_vote(
    state: &State<AppState>,
    id: &str,
    request: Json<VoteRequest>,
    user: AuthUser,
) -> Result<Json<Poll>, ApiError> {
    let poll_id = parse_poll_id(id)?;
    let option = parse_vote_option(&request.option).map_err(|_| {
        debug!("Rejected vote option {}", request.option);
        ApiError::InvalidOption
    })?;

    let poll = PollProcessor::submit_vote(state.polls.as_ref(), poll_id, user.id, option).await?;
    Ok(Json(poll))
}

#[instrument(skip(state, user), fields(poll_id = %id, user_id = %user.id))]
#[get("/polls/<id>/vote")]
pub async fn vote_status(state: &State<AppState>, id: &str, user: AuthUser) -> Result<Json<VoteStatus>, ApiError> {
    let poll_id = parse_poll_id(id)?;
    let status = PollProcessor::vote_status(state.polls.as_ref(), poll_id, user.id).await?;
    Ok(Json(status))
}

#[get("/polls/<id>/results")]
pub async fn poll_results(state: &State<AppState>, id: &str, _user: AuthUser) -> Result<Json<PollResults>, ApiError> {
    let poll_id = parse_poll_id(id)?;
    let results = PollProcessor::results(state.polls.as_ref(), poll_id).await?;
    Ok(Json(results))
}

#[get("/me/votes")]
pub async fn my_votes(state: &State<AppState>, user: AuthUser) -> Result<Json<ParticipationResponse>, ApiError> {
    let participation = PollProcessor::participation(state.polls.as_ref(), user.id).await?;
    Ok(Json(participation))
}

#[get("/comments/<poll_id>")]
pub async fn list_comments(state: &State<AppState>, poll_id: &str, _user: AuthUser) -> Result<Json<Vec<Comment>>, ApiError> {
    let poll_id = parse_poll_id(poll_id)?;
    let comments = PollProcessor::list_comments(state.polls.as_ref(), state.comments.as_ref(), poll_id).await?;
    Ok(Json(comments))
}

#[post("/comments", format = "json", data = "<request>")]
pub async fn create_comment(
    state: &State<AppState>,
    request: Json<CreateCommentRequest>,
    user: AuthUser,
) -> Result<(Status, Json<Comment>), ApiError> {
    let poll_id = parse_poll_id(&request.poll_id)?;
    let comment = PollProcessor::add_comment(
        state.polls.as_ref(),
        state.comments.as_ref(),
        poll_id,
        &request,
        &user,
    )
    .await?;
    Ok((Status::Created, Json(comment)))
}
