use logos::Logos;

use crate::value::Value;

/// Scalar literal tokens.
///
/// A scalar is typed only when a single token spans the entire input;
/// anything else falls back to the bare-string / list rules below. All
/// multi-word strings therefore stay strings without the lexer needing
/// a catch-all word rule.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum RawScalar {
    #[regex(r"-?[0-9]+")]
    Int,

    #[regex(r"-?[0-9]+\.[0-9]+")]
    Float,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[token("null")]
    Null,

    #[regex(r#""[^"]*""#)]
    Quoted,
}

fn lex_scalar(s: &str) -> Option<Value> {
    let mut lexer = RawScalar::lexer(s);
    let token = lexer.next()?.ok()?;
    if lexer.span() != (0..s.len()) {
        return None;
    }
    Some(match token {
        RawScalar::Int => match s.parse::<i64>() {
            Ok(n) => Value::Int(n),
            // digits that overflow i64 keep their float reading
            Err(_) => Value::from_f64(s.parse::<f64>().unwrap_or(0.0)),
        },
        RawScalar::Float => Value::from_f64(s.parse::<f64>().unwrap_or(0.0)),
        RawScalar::True => Value::Bool(true),
        RawScalar::False => Value::Bool(false),
        RawScalar::Null => Value::Null,
        RawScalar::Quoted => Value::Str(s[1..s.len() - 1].to_string()),
    })
}

/// Decode one scalar expression into a [`Value`].
///
/// Numeric strings become `Int` when whole-valued, otherwise `Float`.
/// `true` / `false` / `null` map to their keyword values. A quoted
/// string preserves its literal content including commas. An unquoted
/// comma-free string is a bare string; comma-separated tokens become a
/// list; one trailing comma forces a singleton list.
pub fn to_value(s: &str) -> Value {
    if let Some(value) = lex_scalar(s) {
        return value;
    }

    if !s.contains(',') {
        return Value::Str(s.to_string());
    }

    if let Some(head) = s.strip_suffix(',') {
        return Value::List(vec![to_value(head)]);
    }

    let mut parts: Vec<&str> = s.split(", ").collect();
    if parts.last() == Some(&"") {
        parts.pop();
    }
    // a comma with no following space is not a list separator
    if parts.len() == 1 && parts[0] == s {
        return Value::Str(s.to_string());
    }
    Value::List(parts.into_iter().map(to_value).collect())
}

/// Encode a [`Value`] back to its scalar text form.
///
/// Mirrors [`to_value`]: keyword literals are lower-cased, a scalar
/// string containing a comma is quoted, and a one-element list gets a
/// trailing comma to disambiguate it from a bare scalar. Maps have no
/// scalar form; the document encoder lays them out structurally.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Int(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Str(s) => {
            if s.contains(',') {
                format!("\"{s}\"")
            } else {
                s.clone()
            }
        }
        Value::List(items) => {
            let parts: Vec<String> = items.iter().map(to_text).collect();
            let mut text = parts.join(", ");
            if items.len() == 1 {
                text.push(',');
            }
            text
        }
        Value::Map(_) => "{...}".to_string(),
    }
}
