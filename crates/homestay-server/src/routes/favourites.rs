use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::auth::middleware::{current_user, MaybeUser};
use crate::models::ObjectId;
use crate::routes::AppState;
use crate::services::favourites::{self, FavouriteChange, FavouritesError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeIdRequest {
    pub home_id: Option<String>,
}

/// Response shape shared by every favourites mutation, success or failure.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavouriteResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favourite: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub logged_in: bool,
}

pub async fn check_session(MaybeUser(user): MaybeUser) -> Json<SessionStatus> {
    Json(SessionStatus {
        logged_in: user.is_some(),
    })
}

pub async fn add(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<HomeIdRequest>, JsonRejection>,
) -> Response {
    let result = caller(&state, &jar).and_then(|user_id| {
        let home_id = home_id_from(body)?;
        favourites::add(&state.db, Some(&user_id), &home_id)
    });
    respond("add", result, StatusCode::CREATED)
}

pub async fn toggle(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<HomeIdRequest>, JsonRejection>,
) -> Response {
    let result = caller(&state, &jar).and_then(|user_id| {
        let home_id = home_id_from(body)?;
        favourites::toggle(&state.db, Some(&user_id), &home_id)
    });
    respond("toggle", result, StatusCode::OK)
}

pub async fn remove(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(home_id): Path<String>,
) -> Response {
    let result = caller(&state, &jar)
        .and_then(|user_id| favourites::remove(&state.db, Some(&user_id), &home_id));
    respond("remove", result, StatusCode::OK)
}

/// Resolve the session before anything else is looked at.
fn caller(state: &AppState, jar: &CookieJar) -> Result<ObjectId, FavouritesError> {
    current_user(&state.db, jar)?
        .map(|user| user.id)
        .ok_or(FavouritesError::Unauthenticated)
}

fn home_id_from(body: Result<Json<HomeIdRequest>, JsonRejection>) -> Result<String, FavouritesError> {
    let home_id = match body {
        Ok(Json(req)) => req.home_id,
        Err(rejection) => {
            tracing::debug!("Unreadable favourites body: {rejection}");
            None
        }
    };
    match home_id {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err(FavouritesError::InvalidArgument("Home ID is required".into())),
    }
}

fn respond(
    action: &str,
    result: Result<FavouriteChange, FavouritesError>,
    added_status: StatusCode,
) -> Response {
    match result {
        Ok(FavouriteChange::Added) => (
            added_status,
            envelope(true, "Added to favourites", Some(true)),
        )
            .into_response(),
        Ok(FavouriteChange::AlreadyFavourited) => (
            StatusCode::OK,
            envelope(false, "Already in favourites", Some(true)),
        )
            .into_response(),
        Ok(FavouriteChange::Removed) => (
            StatusCode::OK,
            envelope(true, "Removed from favourites", Some(false)),
        )
            .into_response(),
        Err(err) => failure(action, err),
    }
}

fn failure(action: &str, err: FavouritesError) -> Response {
    let (status, message) = match &err {
        FavouritesError::Unauthenticated => (StatusCode::UNAUTHORIZED, err.to_string()),
        FavouritesError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        FavouritesError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        FavouritesError::PersistenceFailure(e) => {
            tracing::error!(action, "Favourites persistence failure: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to {action} favourite"),
            )
        }
    };
    if status != StatusCode::INTERNAL_SERVER_ERROR {
        tracing::warn!(action, status = status.as_u16(), "Favourites request rejected: {message}");
    }
    (status, envelope(false, &message, None)).into_response()
}

fn envelope(success: bool, message: &str, is_favourite: Option<bool>) -> Json<FavouriteResponse> {
    Json(FavouriteResponse {
        success,
        message: message.to_string(),
        is_favourite,
    })
}
