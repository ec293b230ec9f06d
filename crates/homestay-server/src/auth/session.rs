use chrono::{Duration, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::auth::middleware::ClientInfo;
use crate::db::{self, users, DbPool, StoreError};
use crate::error::{AppError, AppResult};
use crate::models::{ObjectId, Session, User};

pub const SESSION_DURATION_DAYS: i64 = 30;

pub fn create_session(
    pool: &DbPool,
    user_id: &ObjectId,
    client: &ClientInfo,
) -> AppResult<Session> {
    let conn = pool.get()?;
    let id = Uuid::new_v4().to_string();
    let token = generate_token();
    let created_at = db::timestamp();
    let expires_at = (Utc::now() + Duration::days(SESSION_DURATION_DAYS))
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string();

    conn.execute(
        "INSERT INTO sessions (id, user_id, token, expires_at, ip_address, user_agent, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            id,
            user_id,
            token,
            expires_at,
            client.ip_address,
            client.user_agent,
            created_at
        ],
    )?;

    tracing::debug!(%user_id, "Session created");

    Ok(Session {
        id,
        user_id: user_id.clone(),
        token,
        expires_at,
        ip_address: client.ip_address.clone(),
        user_agent: client.user_agent.clone(),
        created_at,
    })
}

/// Look up a live session and its user. Expired tokens, unknown tokens and
/// sessions whose user is gone all resolve to `None`.
pub fn lookup_session(pool: &DbPool, token: &str) -> Result<Option<(Session, User)>, StoreError> {
    let conn = pool.get()?;
    let now = db::timestamp();

    let session = conn
        .query_row(
            "SELECT id, user_id, token, expires_at, ip_address, user_agent, created_at
             FROM sessions
             WHERE token = ?1 AND expires_at > ?2",
            rusqlite::params![token, now],
            |row| {
                Ok(Session {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    token: row.get(2)?,
                    expires_at: row.get(3)?,
                    ip_address: row.get(4)?,
                    user_agent: row.get(5)?,
                    created_at: row.get(6)?,
                })
            },
        )
        .optional()?;

    let Some(session) = session else {
        return Ok(None);
    };

    let user = users::find_by_id(&conn, &session.user_id)?;
    Ok(user.map(|stored| (session, stored.user)))
}

pub fn validate_session(pool: &DbPool, token: &str) -> AppResult<(Session, User)> {
    lookup_session(pool, token)?.ok_or(AppError::Unauthorized)
}

pub fn delete_session(pool: &DbPool, token: &str) -> AppResult<()> {
    let conn = pool.get()?;
    conn.execute("DELETE FROM sessions WHERE token = ?1", rusqlite::params![token])?;
    Ok(())
}

fn generate_token() -> String {
    use base64::Engine;
    let mut bytes = [0u8; 32];
    use rand::RngCore;
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
