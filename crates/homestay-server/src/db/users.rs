use rusqlite::{Connection, OptionalExtension, Row};

use crate::models::{decode_favourites, encode_favourites, ObjectId, User, UserType};

const COLUMNS: &str =
    "id, email, first_name, last_name, password_hash, user_type, favourites, created_at, updated_at";

/// A user as read from storage, favourites already normalized.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user: User,
    /// Normalization changed what is stored, so the next write must persist it.
    pub favourites_dirty: bool,
}

#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: Option<&'a str>,
    pub password_hash: &'a str,
    pub user_type: UserType,
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<StoredUser> {
    let stored: String = row.get(6)?;
    let favourites = decode_favourites(&stored);
    let favourites_dirty = encode_favourites(&favourites) != stored;
    let user_type: String = row.get(5)?;

    Ok(StoredUser {
        user: User {
            id: row.get(0)?,
            email: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            password_hash: row.get(4)?,
            user_type: UserType::from_stored(&user_type),
            favourites,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        },
        favourites_dirty,
    })
}

pub fn insert(conn: &Connection, new: &NewUser<'_>) -> rusqlite::Result<User> {
    let id = ObjectId::generate();
    let now = super::timestamp();

    conn.execute(
        "INSERT INTO users (id, email, first_name, last_name, password_hash, user_type, favourites, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, '[]', ?7, ?8)",
        rusqlite::params![
            id,
            new.email,
            new.first_name,
            new.last_name,
            new.password_hash,
            new.user_type.as_str(),
            now,
            now
        ],
    )?;

    Ok(User {
        id,
        email: new.email.to_string(),
        first_name: new.first_name.to_string(),
        last_name: new.last_name.map(str::to_string),
        password_hash: new.password_hash.to_string(),
        user_type: new.user_type,
        favourites: Vec::new(),
        created_at: now.clone(),
        updated_at: now,
    })
}

pub fn find_by_id(conn: &Connection, id: &ObjectId) -> rusqlite::Result<Option<StoredUser>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM users WHERE id = ?1"),
        rusqlite::params![id],
        from_row,
    )
    .optional()
}

pub fn find_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<StoredUser>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM users WHERE email = ?1"),
        rusqlite::params![email],
        from_row,
    )
    .optional()
}

/// Persist a user's favourites. The list is normalized again before it is
/// written, whoever the caller is. Returns the number of rows updated.
pub fn save_favourites(
    conn: &Connection,
    user_id: &ObjectId,
    favourites: &[ObjectId],
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE users SET favourites = ?1, updated_at = ?2 WHERE id = ?3",
        rusqlite::params![encode_favourites(favourites), super::timestamp(), user_id],
    )
}
