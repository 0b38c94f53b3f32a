use serde_json::{Number, Value};

/// Converts a CamelCase (or mixed case) name to snake_case.
///
/// An underscore is inserted before an uppercase letter that follows a
/// lowercase letter or a digit, and before the last capital of an acronym
/// followed by a lowercase letter (`HTTPServer` -> `http_server`). Dashes
/// become underscores. snake_case input comes back unchanged.
pub fn snakize(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' {
            out.push('_');
            continue;
        }
        if !c.is_uppercase() {
            out.push(c);
            continue;
        }
        if i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }

    out
}

/// Coerces a JSON value to an integer the way Ruby's `to_i` does: leading
/// whitespace, an optional sign, then as many digits as are present.
/// Anything without leading digits is `0`, floats are truncated and values
/// outside `i64` saturate.
pub fn coerce_integer(value: &Value) -> Value {
    let n = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => parse_leading_integer(s),
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => 0,
    };
    Value::Number(Number::from(n))
}

fn parse_leading_integer(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut acc: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(b - b'0');
        acc = if negative {
            acc.saturating_mul(10).saturating_sub(d)
        } else {
            acc.saturating_mul(10).saturating_add(d)
        };
    }
    acc
}
