//! Decoding of task plan documents.
//!
//! Plan nodes are not tagged: a series entry may be a bare string, an object
//! with a `cmd` key, an object with a `parallel` key, or a list. Each shape is
//! tried in a fixed order and anything left over is rejected with its raw
//! content in the error.

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use crate::error::ConfigError;

use super::types::{Command, Meta, Plan, SeriesItem};

/// Parse YAML text and decode it into a [`Plan`].
pub fn decode_str(text: &str) -> Result<Plan, ConfigError> {
    let doc: Value = serde_yaml::from_str(text).map_err(ConfigError::Parse)?;
    decode_plan(&doc)
}

/// Decode a parsed document. An empty document is an empty plan.
pub fn decode_plan(doc: &Value) -> Result<Plan, ConfigError> {
    let map = match doc {
        Value::Null => return Ok(Plan::default()),
        Value::Mapping(map) => map,
        other => return Err(ConfigError::UnsupportedNode(render(other))),
    };

    let meta: Meta = field(map, "meta")?;

    let series = sequence(map, "series")?
        .iter()
        .map(|node| decode_series_item(node, &meta))
        .collect::<Result<Vec<_>, _>>()?;

    let parallel = sequence(map, "parallel")?
        .iter()
        .map(|node| decode_command(node).map(|cmd| cmd.resolved(&meta)))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        series = series.len(),
        parallel = parallel.len(),
        "plan decoded"
    );

    Ok(Plan {
        meta,
        series,
        parallel,
    })
}

/// Decode one series entry, resolving inheritance against `top`.
pub fn decode_series_item(node: &Value, top: &Meta) -> Result<SeriesItem, ConfigError> {
    if let Some(cmd) = scalar_text(node) {
        let cmd = non_empty(cmd, node)?;
        return Ok(SeriesItem::Single(Command::inheriting(cmd).resolved(top)));
    }

    if let Value::Mapping(map) = node {
        if map.contains_key("cmd") {
            return decode_object(map, node).map(|cmd| SeriesItem::Single(cmd.resolved(top)));
        }
        if map.contains_key("parallel") {
            let group_meta = field::<Meta>(map, "meta")?.inherit_from(top);
            return match map.get("parallel") {
                Some(Value::Sequence(items)) => decode_group(items, &group_meta, node),
                _ => Err(ConfigError::UnsupportedNode(render(node))),
            };
        }
    }

    if let Value::Sequence(items) = node {
        return decode_group(items, top, node);
    }

    Err(ConfigError::UnsupportedNode(render(node)))
}

/// Decode one leaf command. Inheritance is left to the caller.
pub fn decode_command(node: &Value) -> Result<Command, ConfigError> {
    if let Some(cmd) = scalar_text(node) {
        return Ok(Command::inheriting(non_empty(cmd, node)?));
    }

    if let Value::Mapping(map) = node {
        if map.contains_key("cmd") {
            return decode_object(map, node);
        }
    }

    Err(ConfigError::UnsupportedNode(render(node)))
}

fn decode_object(map: &Mapping, node: &Value) -> Result<Command, ConfigError> {
    let cmd = map
        .get("cmd")
        .and_then(scalar_text)
        .ok_or_else(|| ConfigError::UnsupportedNode(render(node)))?;
    let cmd = non_empty(cmd, node)?;
    let meta: Meta = field(map, "meta")?;
    let inherits: bool = field(map, "update_meta")?;

    Ok(Command::with_meta(cmd, meta, inherits))
}

fn decode_group(items: &[Value], parent: &Meta, node: &Value) -> Result<SeriesItem, ConfigError> {
    if items.is_empty() {
        return Err(ConfigError::EmptyGroup(render(node)));
    }

    let commands = items
        .iter()
        .map(|item| decode_command(item).map(|cmd| cmd.resolved(parent)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SeriesItem::Parallel(commands))
}

/// Scalars usable as command text. YAML reads `true` or `42` as non-strings,
/// but both are valid shell input.
fn scalar_text(node: &Value) -> Option<String> {
    match node {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(cmd: String, node: &Value) -> Result<String, ConfigError> {
    if cmd.trim().is_empty() {
        return Err(ConfigError::EmptyCommand(render(node)));
    }
    Ok(cmd)
}

fn field<T>(map: &Mapping, name: &'static str) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    match map.get(name) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_yaml::from_value(value.clone())
            .map_err(|source| ConfigError::Field { field: name, source }),
    }
}

fn sequence<'a>(map: &'a Mapping, name: &'static str) -> Result<&'a [Value], ConfigError> {
    match map.get(name) {
        None | Some(Value::Null) => Ok(Default::default()),
        Some(Value::Sequence(items)) => Ok(items.as_slice()),
        Some(other) => Err(ConfigError::UnsupportedNode(render(other))),
    }
}

fn render(node: &Value) -> String {
    serde_yaml::to_string(node)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_else(|_| format!("{node:?}"))
}
