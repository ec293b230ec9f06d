use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::auth::middleware::MaybeUser;
use crate::db::homes;
use crate::error::{AppError, AppResult};
use crate::models::{Home, ObjectId};
use crate::routes::AppState;
use crate::services::favourites::{self, FavouritesError};

const INDEX_LIMIT: u32 = 6;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeDetail {
    pub home: Home,
    pub is_favourite: bool,
}

pub async fn index(State(state): State<AppState>) -> AppResult<Json<Vec<Home>>> {
    let conn = state.db.get()?;
    Ok(Json(homes::list(&conn, Some(INDEX_LIMIT))?))
}

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Home>>> {
    let conn = state.db.get()?;
    Ok(Json(homes::list(&conn, None)?))
}

pub async fn detail(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(home_id): Path<String>,
) -> AppResult<Json<HomeDetail>> {
    let id: ObjectId = home_id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid home id: {home_id}")))?;

    let home = {
        let conn = state.db.get()?;
        homes::find_by_id(&conn, &id)?
    }
    .ok_or_else(|| AppError::NotFound("Home not found".into()))?;

    let is_favourite = match user {
        Some(user) => favourites::contains(&state.db, Some(&user.id), &id).map_err(into_app_error)?,
        None => false,
    };

    Ok(Json(HomeDetail { home, is_favourite }))
}

/// The caller's favourite listings. Guests get an empty list.
pub async fn favourite_list(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> AppResult<Json<Vec<Home>>> {
    let Some(user) = user else {
        return Ok(Json(Vec::new()));
    };
    let homes = favourites::list(&state.db, Some(&user.id)).map_err(into_app_error)?;
    Ok(Json(homes))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingsPage {
    pub logged_in: bool,
    pub bookings: Vec<Home>,
}

/// Bookings are not recorded yet, so the page is always empty.
pub async fn bookings(MaybeUser(user): MaybeUser) -> Json<BookingsPage> {
    Json(BookingsPage {
        logged_in: user.is_some(),
        bookings: Vec::new(),
    })
}

fn into_app_error(err: FavouritesError) -> AppError {
    match err {
        FavouritesError::Unauthenticated => AppError::Unauthorized,
        FavouritesError::InvalidArgument(msg) => AppError::BadRequest(msg),
        FavouritesError::NotFound(msg) => AppError::NotFound(msg),
        FavouritesError::PersistenceFailure(e) => e.into(),
    }
}
