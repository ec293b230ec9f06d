use rusqlite::{Connection, OptionalExtension, Row};

use crate::models::{Home, ObjectId};

const COLUMNS: &str =
    "id, house_name, price, location, rating, description, photo, created_at, updated_at";

/// Validated listing fields, shared by create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeFields {
    pub house_name: String,
    pub price: f64,
    pub location: String,
    pub rating: f64,
    pub description: String,
    pub photo: Option<String>,
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<Home> {
    Ok(Home {
        id: row.get(0)?,
        house_name: row.get(1)?,
        price: row.get(2)?,
        location: row.get(3)?,
        rating: row.get(4)?,
        description: row.get(5)?,
        photo: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub fn insert(conn: &Connection, fields: &HomeFields) -> rusqlite::Result<Home> {
    let id = ObjectId::generate();
    let now = super::timestamp();

    conn.execute(
        "INSERT INTO homes (id, house_name, price, location, rating, description, photo, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            id,
            fields.house_name,
            fields.price,
            fields.location,
            fields.rating,
            fields.description,
            fields.photo,
            now,
            now
        ],
    )?;

    Ok(Home {
        id,
        house_name: fields.house_name.clone(),
        price: fields.price,
        location: fields.location.clone(),
        rating: fields.rating,
        description: fields.description.clone(),
        photo: fields.photo.clone(),
        created_at: now.clone(),
        updated_at: now,
    })
}

/// Listings in insertion order, optionally capped.
pub fn list(conn: &Connection, limit: Option<u32>) -> rusqlite::Result<Vec<Home>> {
    let limit = limit.map(i64::from).unwrap_or(-1);
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM homes ORDER BY created_at, rowid LIMIT ?1"
    ))?;
    let rows = stmt.query_map(rusqlite::params![limit], from_row)?;
    rows.collect()
}

pub fn find_by_id(conn: &Connection, id: &ObjectId) -> rusqlite::Result<Option<Home>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM homes WHERE id = ?1"),
        rusqlite::params![id],
        from_row,
    )
    .optional()
}

pub fn exists(conn: &Connection, id: &ObjectId) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM homes WHERE id = ?1)",
        rusqlite::params![id],
        |row| row.get(0),
    )
}

/// Resolve ids to listings, keeping the order of `ids` and skipping any
/// that no longer exist.
pub fn resolve(conn: &Connection, ids: &[ObjectId]) -> rusqlite::Result<Vec<Home>> {
    let mut homes = Vec::with_capacity(ids.len());
    for id in ids {
        match find_by_id(conn, id)? {
            Some(home) => homes.push(home),
            None => tracing::debug!(home_id = %id, "Skipping dangling favourite"),
        }
    }
    Ok(homes)
}

/// Returns `false` when no listing has this id.
pub fn update(conn: &Connection, id: &ObjectId, fields: &HomeFields) -> rusqlite::Result<bool> {
    let affected = conn.execute(
        "UPDATE homes SET house_name = ?1, price = ?2, location = ?3, rating = ?4,
                description = ?5, photo = COALESCE(?6, photo), updated_at = ?7
         WHERE id = ?8",
        rusqlite::params![
            fields.house_name,
            fields.price,
            fields.location,
            fields.rating,
            fields.description,
            fields.photo,
            super::timestamp(),
            id
        ],
    )?;
    Ok(affected > 0)
}

pub fn delete(conn: &Connection, id: &ObjectId) -> rusqlite::Result<bool> {
    let affected = conn.execute("DELETE FROM homes WHERE id = ?1", rusqlite::params![id])?;
    Ok(affected > 0)
}
