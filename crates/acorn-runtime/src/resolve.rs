use acorn_cfg::Value;
use acorn_core::{Environment, ModelEntry, Resolved};

/// Resolve a configuration value against an environment's model.
///
/// Strings resolve by name: the `model` keyword first, then class
/// names, then model entries; a name that matches nothing stays a
/// literal string. Lists resolve element-wise. In a mapping, a key
/// whose value is `true` is treated as a name to resolve, so a block
/// of bare keys reads as a set of references; all other values stay
/// literal.
pub fn resolve(env: &Environment, value: &Value) -> Resolved {
    match value {
        Value::Str(name) => resolve_token(env, name),
        Value::List(items) => Resolved::List(items.iter().map(|v| resolve(env, v)).collect()),
        Value::Map(fields) => Resolved::Map(
            fields
                .iter()
                .map(|(key, value)| {
                    let resolved = if matches!(value, Value::Bool(true)) {
                        resolve_token(env, key)
                    } else {
                        Resolved::Value(value.clone())
                    };
                    (key.to_string(), resolved)
                })
                .collect(),
        ),
        other => Resolved::Value(other.clone()),
    }
}

/// Resolve one name against the model.
pub fn resolve_token(env: &Environment, token: &str) -> Resolved {
    if token == "model" {
        return Resolved::Model;
    }
    if env.classes().contains(token) {
        return Resolved::Class(token.to_string());
    }
    match env.find(token) {
        Some(ModelEntry::Entity(id)) => Resolved::Entity(*id),
        Some(ModelEntry::Group(id)) => Resolved::Group(*id),
        Some(ModelEntry::Data(value)) => value.clone(),
        None => Resolved::Value(Value::Str(token.to_string())),
    }
}

/// Flatten a resolved value into call arguments: a list spreads into
/// its elements, anything else is a single argument.
pub fn spread(resolved: Resolved) -> Vec<Resolved> {
    match resolved {
        Resolved::List(items) => items,
        other => vec![other],
    }
}
