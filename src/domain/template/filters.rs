//! Helper functions available to templates.

use minijinja::value::ValueKind;
use minijinja::{Environment, Error, ErrorKind, Value};

pub(super) fn register(env: &mut Environment<'static>) {
    env.add_filter("pairs", pairs);
    env.add_filter("indent", indent);
    env.add_filter("nindent", nindent);
    env.add_filter("quote", quote);
    env.add_filter("squote", squote);
    env.add_filter("default", default);
    env.add_filter("toJson", to_json);
}

/// Text form of a value; missing values render as nothing.
fn text(value: &Value) -> String {
    if value.is_undefined() || value.is_none() { String::new() } else { value.to_string() }
}

/// `(key, value)` pairs for a mapping, `(index, item)` pairs for a sequence.
fn pairs(value: &Value) -> Result<Value, Error> {
    match value.kind() {
        ValueKind::Map => {
            let mut items = Vec::new();
            for key in value.try_iter()? {
                let item = value.get_item(&key)?;
                items.push(Value::from(vec![key, item]));
            }
            Ok(Value::from(items))
        }
        ValueKind::Seq | ValueKind::Iterable => Ok(Value::from(
            value
                .try_iter()?
                .enumerate()
                .map(|(index, item)| Value::from(vec![Value::from(index), item]))
                .collect::<Vec<_>>(),
        )),
        ValueKind::Undefined | ValueKind::None => Ok(Value::from(Vec::<Value>::new())),
        other => Err(Error::new(ErrorKind::InvalidOperation, format!("cannot range over {}", other))),
    }
}

/// Prefix every line with `width` spaces.
fn indent(value: &Value, width: usize) -> String {
    let pad = " ".repeat(width);
    text(value).split('\n').map(|line| format!("{}{}", pad, line)).collect::<Vec<_>>().join("\n")
}

/// Newline followed by the indented value.
fn nindent(value: &Value, width: usize) -> String {
    format!("\n{}", indent(value, width))
}

fn quote(value: &Value) -> String {
    format!("\"{}\"", text(value).replace('\\', "\\\\").replace('"', "\\\""))
}

fn squote(value: &Value) -> String {
    format!("'{}'", text(value))
}

/// `fallback` when the value is missing or empty.
fn default(value: Value, fallback: Value) -> Value {
    if value.is_true() { value } else { fallback }
}

fn to_json(value: &Value) -> Result<String, Error> {
    serde_json::to_string(value)
        .map_err(|err| Error::new(ErrorKind::InvalidOperation, format!("toJson: {}", err)))
}
