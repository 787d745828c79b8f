//! Operator configuration module for loading operator nicknames from the environment.
//!
//! Cash-register operations and day closes record who performed them. The
//! `OPERATORS` variable maps Discord user IDs to display names, formatted as
//! `id:name,id:name`. Unknown users fall back to their Discord username.

use std::collections::HashMap;

/// Parses an `id:name,id:name` list into a map. Malformed entries are skipped.
#[must_use]
pub fn parse_operators(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|entry| {
            let (id, name) = entry.split_once(':')?;
            let (id, name) = (id.trim(), name.trim());
            (!id.is_empty() && !name.is_empty()).then(|| (id.to_string(), name.to_string()))
        })
        .collect()
}

/// Gets the operator map from the `OPERATORS` environment variable.
#[must_use]
pub fn get_operators() -> HashMap<String, String> {
    std::env::var("OPERATORS")
        .map(|raw| parse_operators(&raw))
        .unwrap_or_default()
}

/// Gets the configured display name for a user ID, if any.
#[must_use]
pub fn get_operator_name(user_id: &str) -> Option<String> {
    get_operators().get(user_id).cloned()
}
