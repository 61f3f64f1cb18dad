use machine_learning::{Record, Value};

/// Parses a free-text message of whitespace separated `key=value` tokens.
///
/// Tokens without `=` or with an empty key are skipped. The `sex` value is uppercased, any
/// other value becomes an integer when it has no decimal point and parses as one, else a float
/// when it parses as one, else it's kept as text. Empty values stay empty strings.
pub fn parse_kv_message(text: &str) -> Record {
    let mut record = Record::new();

    for token in text.split_whitespace() {
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        let value = value.trim();
        let value = if value.is_empty() {
            Value::Str(String::new())
        } else if key == "sex" {
            Value::Str(value.to_uppercase())
        } else {
            coerce(value)
        };

        record.insert(key.to_string(), value);
    }

    record
}

fn coerce(value: &str) -> Value {
    if !value.contains('.') {
        if let Ok(i) = value.parse::<i64>() {
            return Value::Int(i);
        }
    }

    match value.parse::<f64>() {
        Ok(x) => Value::Float(x),
        Err(_) => Value::Str(value.to_string()),
    }
}
