mod favourites;
mod object_id;

pub use favourites::{decode_favourites, encode_favourites, normalize_favourites};
pub use object_id::{InvalidObjectId, ObjectId};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Guest,
    Host,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Guest => "guest",
            UserType::Host => "host",
        }
    }

    /// Unknown stored values fall back to `guest`.
    pub fn from_stored(raw: &str) -> Self {
        match raw {
            "host" => UserType::Host,
            _ => UserType::Guest,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: ObjectId,
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub user_type: UserType,
    pub favourites: Vec<ObjectId>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: ObjectId,
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub user_type: UserType,
    pub favourites: Vec<ObjectId>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserPublic {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            user_type: u.user_type,
            favourites: u.favourites,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Home {
    pub id: ObjectId,
    pub house_name: String,
    pub price: f64,
    pub location: String,
    pub rating: f64,
    pub description: String,
    pub photo: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: ObjectId,
    pub token: String,
    pub expires_at: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: String,
}
