use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Store-native record identifier: 24 hex characters, kept in lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid object id: {0:?}")]
pub struct InvalidObjectId(pub String);

impl ObjectId {
    pub const LEN: usize = 24;

    /// Generate a fresh identifier from 12 random bytes.
    pub fn generate() -> Self {
        let mut bytes = [0u8; Self::LEN / 2];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn is_valid(raw: &str) -> bool {
        raw.len() == Self::LEN && raw.bytes().all(|b| b.is_ascii_hexdigit())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ObjectId {
    type Err = InvalidObjectId;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if Self::is_valid(raw) {
            Ok(Self(raw.to_ascii_lowercase()))
        } else {
            Err(InvalidObjectId(raw.to_string()))
        }
    }
}

impl TryFrom<String> for ObjectId {
    type Error = InvalidObjectId;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl ToSql for ObjectId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.as_str()))
    }
}

impl FromSql for ObjectId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        raw.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn generated_ids_are_valid_and_distinct() {
        let a = ObjectId::generate();
        let b = ObjectId::generate();
        assert!(ObjectId::is_valid(a.as_str()));
        assert_ne!(a, b);
    }

    #[rstest]
    #[case("")]
    #[case("not-an-id")]
    #[case("L1")]
    #[case("65a1f0c2e4b0a1b2c3d4e5f")]
    #[case("65a1f0c2e4b0a1b2c3d4e5f67")]
    #[case("65a1f0c2e4b0a1b2c3d4e5fz")]
    fn rejects_malformed_ids(#[case] raw: &str) {
        assert!(raw.parse::<ObjectId>().is_err());
    }

    #[test]
    fn parsing_canonicalises_case() {
        let upper: ObjectId = "65A1F0C2E4B0A1B2C3D4E5F6".parse().unwrap();
        let lower: ObjectId = "65a1f0c2e4b0a1b2c3d4e5f6".parse().unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.to_string(), "65a1f0c2e4b0a1b2c3d4e5f6");
    }

    #[test]
    fn deserialising_rejects_bad_ids() {
        let ok: Result<ObjectId, _> = serde_json::from_str("\"65a1f0c2e4b0a1b2c3d4e5f6\"");
        assert!(ok.is_ok());
        let bad: Result<ObjectId, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }
}
