//! Tolerant parsing of the mapping document.
//!
//! The file is hand-editable, so records are validated one at a time and bad
//! ones are dropped with a warning instead of failing the whole load.

use serde_json::Value;
use tracing::warn;

use crate::{GuildId, GuildRecord, MappingEntry, MessageId, RoleId};

/// Extract every usable guild record from the top-level array.
pub fn parse_records(items: &[Value]) -> Vec<GuildRecord> {
    items.iter().filter_map(parse_record).collect()
}

/// Parse one guild record, or `None` if it has to be skipped.
pub fn parse_record(value: &Value) -> Option<GuildRecord> {
    let object = value.as_object()?;

    // Missing or structured guild ids are dropped quietly.
    let guild_value = object.get("guild").filter(|v| is_primitive(v))?;
    let Some(guild) = snowflake(guild_value).map(GuildId) else {
        warn!(guild = %guild_value, "Guild id is not a snowflake, skipping record");
        return None;
    };

    let entries = match object.get("entries").and_then(Value::as_array) {
        Some(entries) if !entries.is_empty() => entries,
        _ => {
            warn!(%guild, "No mappings were provided for guild, skipping record");
            return None;
        }
    };

    let entries: Vec<MappingEntry> = entries
        .iter()
        .filter_map(|entry| parse_entry(guild, entry))
        .collect();
    if entries.is_empty() {
        return None;
    }

    Some(GuildRecord { guild, entries })
}

fn parse_entry(guild: GuildId, value: &Value) -> Option<MappingEntry> {
    let Some(object) = value.as_object() else {
        warn!(%guild, entry = %value, "Mapping entry is not an object, skipping");
        return None;
    };

    let (Some(message), Some(role)) = (object.get("message"), object.get("role")) else {
        warn!(%guild, "The message or role property was missing from an entry, skipping");
        return None;
    };

    match (snowflake(message), snowflake(role)) {
        (Some(message), Some(role)) => Some(MappingEntry {
            message: MessageId(message),
            role: RoleId(role),
        }),
        _ => {
            warn!(%guild, entry = %value, "Mapping entry holds a non-snowflake id, skipping");
            None
        }
    }
}

fn is_primitive(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_))
}

/// Read an unsigned id from a JSON number or numeric string.
fn snowflake(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
