use std::collections::HashSet;

use serde_json::Value;

use super::ObjectId;

/// Reduce a stored favourites collection to valid, unique listing ids.
///
/// Missing and malformed entries are dropped. Duplicates are removed by id
/// equality, keeping the first occurrence.
pub fn normalize_favourites<'a, I>(entries: I) -> Vec<ObjectId>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .flatten()
        .filter_map(|raw| raw.parse::<ObjectId>().ok())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Decode the JSON document stored in `users.favourites`.
///
/// Anything that is not an array decodes as empty. Non-string elements
/// count as missing entries.
pub fn decode_favourites(stored: &str) -> Vec<ObjectId> {
    match serde_json::from_str::<Value>(stored) {
        Ok(Value::Array(items)) => normalize_favourites(items.iter().map(Value::as_str)),
        _ => Vec::new(),
    }
}

pub fn encode_favourites(favourites: &[ObjectId]) -> String {
    let clean = normalize_favourites(favourites.iter().map(|id| Some(id.as_str())));
    serde_json::to_string(&clean).unwrap_or_else(|_| "[]".to_string())
}
