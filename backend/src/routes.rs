use rocket::form::Form;
use rocket::http::{Cookie, CookieJar, Status};
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::{delete, get, post, FromForm, State};
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{info, instrument};

use shared::models::{Dashboard, FlushResponse, VoteCountsResponse};
use crate::catalog::CharityCatalog;
use crate::error::ApiError;
use crate::facebook::FacebookClient;
use crate::ledger::{VoteLedger, RECENT_VOTES_LIMIT};
use crate::session::{CurrentUser, SESSION_COOKIE};
use crate::tally::compute_tallies;

pub struct AppState {
    pub db: PgPool,
    pub catalog: CharityCatalog,
    pub facebook: FacebookClient,
}

#[derive(FromForm)]
pub struct VoteForm {
    pub charity_id: String,
}

// Tallies are recomputed per request, never cached.
async fn current_tallies(state: &AppState) -> Result<HashMap<String, i64>, ApiError> {
    let charities = state.catalog.get_charities().await?;
    let counts = VoteLedger::counts_by_charity(&state.db).await?;
    Ok(compute_tallies(&charities, &counts))
}

#[get("/")]
pub async fn index(
    state: &State<AppState>,
    user: CurrentUser,
) -> Result<Json<Dashboard>, ApiError> {
    let charities = state.catalog.get_charities().await?;
    let counts = VoteLedger::counts_by_charity(&state.db).await?;
    let vote_counts = compute_tallies(&charities, &counts);

    let user_vote = VoteLedger::vote_for_user(&state.db, &user.id).await?;
    let recent_votes = VoteLedger::recent_votes(&state.db, RECENT_VOTES_LIMIT).await?;
    let total_votes = VoteLedger::total_votes(&state.db).await?;

    Ok(Json(Dashboard {
        user_id: user.id,
        charities,
        vote_counts,
        user_vote,
        recent_votes,
        total_votes,
    }))
}

// Facebook canvas apps POST to the landing page; bounce to the GET.
#[post("/")]
pub async fn index_post() -> Redirect {
    Redirect::to(rocket::uri!(index))
}

#[instrument(skip(state, user, form), fields(user_id = %user.id))]
#[post("/vote", data = "<form>")]
pub async fn cast_vote(
    state: &State<AppState>,
    user: CurrentUser,
    form: Form<VoteForm>,
) -> Result<Json<VoteCountsResponse>, ApiError> {
    let charity = state
        .catalog
        .get_charity(&form.charity_id)
        .await?
        .ok_or(ApiError::CharityNotFound)?;

    // A duplicate is the already-voted outcome, still an HTTP 200.
    let success = VoteLedger::cast_vote(&state.db, &user.id, &charity.id).await?;
    if success {
        info!("Vote recorded for charity {}", charity.id);
    } else {
        info!("Duplicate vote rejected");
    }

    Ok(Json(VoteCountsResponse {
        success,
        vote_counts: current_tallies(state).await?,
    }))
}

#[get("/charityvotes")]
pub async fn charity_votes(state: &State<AppState>) -> Result<Json<VoteCountsResponse>, ApiError> {
    Ok(Json(VoteCountsResponse {
        success: true,
        vote_counts: current_tallies(state).await?,
    }))
}

#[delete("/charitycache")]
pub async fn flush_charity_cache(state: &State<AppState>) -> Json<FlushResponse> {
    Json(FlushResponse {
        success: state.catalog.flush(),
    })
}

#[get("/auth/facebook")]
pub async fn facebook_login(state: &State<AppState>, cookies: &CookieJar<'_>) -> Redirect {
    cookies.remove_private(Cookie::from(SESSION_COOKIE));
    Redirect::to(state.facebook.authorize_url())
}

#[get("/auth/facebook/callback?<code>")]
pub async fn facebook_callback(
    state: &State<AppState>,
    cookies: &CookieJar<'_>,
    code: &str,
) -> Result<Redirect, ApiError> {
    let access_token = state.facebook.exchange_code(code).await?;
    cookies.add_private(Cookie::new(SESSION_COOKIE, access_token));
    Ok(Redirect::to(rocket::uri!(index)))
}

#[rocket::options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}
