use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::db::homes::{self, HomeFields};
use crate::error::{AppError, AppResult};
use crate::models::{Home, ObjectId, User};
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeRequest {
    pub house_name: Option<String>,
    pub price: Option<f64>,
    pub location: Option<String>,
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub photo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditHomeRequest {
    pub id: Option<String>,
    #[serde(flatten)]
    pub home: HomeRequest,
}

impl HomeRequest {
    fn validate(self) -> AppResult<HomeFields> {
        let (Some(house_name), Some(price), Some(location), Some(rating)) =
            (self.house_name, self.price, self.location, self.rating)
        else {
            return Err(AppError::Unprocessable(
                "Missing required fields: houseName, price, location, and rating are required"
                    .into(),
            ));
        };
        if house_name.trim().is_empty() || location.trim().is_empty() {
            return Err(AppError::Unprocessable(
                "Missing required fields: houseName, price, location, and rating are required"
                    .into(),
            ));
        }
        if !price.is_finite() || price <= 0.0 {
            return Err(AppError::Unprocessable("Price must be a positive number".into()));
        }
        if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
            return Err(AppError::Unprocessable(
                "Rating must be a number between 0 and 5".into(),
            ));
        }

        Ok(HomeFields {
            house_name,
            price,
            location,
            rating,
            description: self.description.unwrap_or_default(),
            photo: self.photo.filter(|p| !p.is_empty()),
        })
    }
}

fn parse_id(raw: &str) -> AppResult<ObjectId> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid home id: {raw}")))
}

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Home>>> {
    let conn = state.db.get()?;
    Ok(Json(homes::list(&conn, None)?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(body): Json<HomeRequest>,
) -> AppResult<(StatusCode, Json<Home>)> {
    let fields = body.validate()?;
    let conn = state.db.get()?;
    let home = homes::insert(&conn, &fields)?;

    tracing::info!(home_id = %home.id, host = %user.id, "Home saved");
    Ok((StatusCode::CREATED, Json(home)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(home_id): Path<String>,
) -> AppResult<Json<Home>> {
    let id = parse_id(&home_id)?;
    let conn = state.db.get()?;
    homes::find_by_id(&conn, &id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Home not found".into()))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(body): Json<EditHomeRequest>,
) -> AppResult<Json<Home>> {
    let id = body
        .id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Home ID is required".into()))?;
    let id = parse_id(id)?;

    let conn = state.db.get()?;
    if !homes::exists(&conn, &id)? {
        return Err(AppError::NotFound("Home not found".into()));
    }

    let fields = body.home.validate()?;
    if !homes::update(&conn, &id, &fields)? {
        return Err(AppError::NotFound("Home not found".into()));
    }

    tracing::info!(home_id = %id, host = %user.id, "Home updated");
    homes::find_by_id(&conn, &id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Home not found".into()))
}

/// Favourites pointing at the deleted listing are left in place.
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(home_id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&home_id)?;
    let conn = state.db.get()?;
    if !homes::delete(&conn, &id)? {
        return Err(AppError::NotFound("Home not found".into()));
    }

    tracing::info!(home_id = %id, host = %user.id, "Home deleted");
    Ok(StatusCode::NO_CONTENT)
}
