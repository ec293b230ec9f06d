//! Favourites service: keeps each user's favourite set valid and unique.
//!
//! Every operation reads the user record once, normalizing its favourites on
//! the way in, and writes it back at most once. The write happens when the
//! membership changed or when the stored document needed cleaning, so even a
//! failed or no-op call leaves the stored collection clean. There is no
//! per-user lock; concurrent writers converge on the next read.

use rusqlite::Connection;

use crate::db::{homes, users, users::StoredUser, DbPool, StoreError};
use crate::models::{Home, ObjectId};

#[derive(Debug, thiserror::Error)]
pub enum FavouritesError {
    #[error("User not logged in")]
    Unauthenticated,

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Failed to persist favourites: {0}")]
    PersistenceFailure(#[from] StoreError),
}

impl From<rusqlite::Error> for FavouritesError {
    fn from(e: rusqlite::Error) -> Self {
        FavouritesError::PersistenceFailure(e.into())
    }
}

impl From<r2d2::Error> for FavouritesError {
    fn from(e: r2d2::Error) -> Self {
        FavouritesError::PersistenceFailure(e.into())
    }
}

/// What a successful call did to the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavouriteChange {
    Added,
    AlreadyFavourited,
    Removed,
}

impl FavouriteChange {
    /// Membership after the call.
    pub fn is_favourite(self) -> bool {
        !matches!(self, FavouriteChange::Removed)
    }
}

pub fn parse_listing_id(raw: &str) -> Result<ObjectId, FavouritesError> {
    raw.parse()
        .map_err(|_| FavouritesError::InvalidArgument(format!("Invalid home id: {raw}")))
}

fn authenticate(user_id: Option<&ObjectId>) -> Result<&ObjectId, FavouritesError> {
    user_id.ok_or(FavouritesError::Unauthenticated)
}

fn load(conn: &Connection, user_id: &ObjectId) -> Result<StoredUser, FavouritesError> {
    users::find_by_id(conn, user_id)?
        .ok_or_else(|| FavouritesError::NotFound("User not found".into()))
}

/// Write the set back if it changed or if reading it had to clean it.
fn commit(conn: &Connection, record: &StoredUser, changed: bool) -> Result<(), FavouritesError> {
    if !changed && !record.favourites_dirty {
        return Ok(());
    }
    let updated = users::save_favourites(conn, &record.user.id, &record.user.favourites)?;
    if updated == 0 {
        return Err(FavouritesError::NotFound("User not found".into()));
    }
    if !changed {
        tracing::info!(user_id = %record.user.id, "Rewrote sanitized favourites");
    }
    Ok(())
}

fn add_loaded(
    conn: &Connection,
    mut record: StoredUser,
    home_id: ObjectId,
) -> Result<FavouriteChange, FavouritesError> {
    if record.user.favourites.contains(&home_id) {
        commit(conn, &record, false)?;
        return Ok(FavouriteChange::AlreadyFavourited);
    }
    if !homes::exists(conn, &home_id)? {
        commit(conn, &record, false)?;
        return Err(FavouritesError::NotFound("Home not found".into()));
    }

    record.user.favourites.push(home_id);
    commit(conn, &record, true)?;
    Ok(FavouriteChange::Added)
}

fn remove_loaded(
    conn: &Connection,
    mut record: StoredUser,
    home_id: &ObjectId,
) -> Result<FavouriteChange, FavouritesError> {
    let before = record.user.favourites.len();
    record.user.favourites.retain(|id| id != home_id);
    if record.user.favourites.len() == before {
        commit(conn, &record, false)?;
        return Err(FavouritesError::NotFound("Home is not in favourites".into()));
    }

    commit(conn, &record, true)?;
    Ok(FavouriteChange::Removed)
}

pub fn add(
    pool: &DbPool,
    user_id: Option<&ObjectId>,
    home_id: &str,
) -> Result<FavouriteChange, FavouritesError> {
    let user_id = authenticate(user_id)?;
    let home_id = parse_listing_id(home_id)?;
    let conn = pool.get()?;
    let record = load(&conn, user_id)?;
    add_loaded(&conn, record, home_id)
}

/// Remove a listing from the set. The listing itself need not exist, so stale
/// references can still be dropped.
pub fn remove(
    pool: &DbPool,
    user_id: Option<&ObjectId>,
    home_id: &str,
) -> Result<FavouriteChange, FavouritesError> {
    let user_id = authenticate(user_id)?;
    let home_id = parse_listing_id(home_id)?;
    let conn = pool.get()?;
    let record = load(&conn, user_id)?;
    remove_loaded(&conn, record, &home_id)
}

/// Flip membership, deciding from the stored record rather than the caller.
pub fn toggle(
    pool: &DbPool,
    user_id: Option<&ObjectId>,
    home_id: &str,
) -> Result<FavouriteChange, FavouritesError> {
    let user_id = authenticate(user_id)?;
    let home_id = parse_listing_id(home_id)?;
    let conn = pool.get()?;
    let record = load(&conn, user_id)?;

    if record.user.favourites.contains(&home_id) {
        remove_loaded(&conn, record, &home_id)
    } else {
        add_loaded(&conn, record, home_id)
    }
}

pub fn contains(
    pool: &DbPool,
    user_id: Option<&ObjectId>,
    home_id: &ObjectId,
) -> Result<bool, FavouritesError> {
    let user_id = authenticate(user_id)?;
    let conn = pool.get()?;
    let record = load(&conn, user_id)?;
    commit(&conn, &record, false)?;
    Ok(record.user.favourites.contains(home_id))
}

/// The user's favourites as listings, in favourites order. References to
/// deleted listings are skipped, not repaired.
pub fn list(pool: &DbPool, user_id: Option<&ObjectId>) -> Result<Vec<Home>, FavouritesError> {
    let user_id = authenticate(user_id)?;
    let conn = pool.get()?;
    let record = load(&conn, user_id)?;
    commit(&conn, &record, false)?;
    Ok(homes::resolve(&conn, &record.user.favourites)?)
}
