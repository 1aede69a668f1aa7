use {num_format::Locale, serde_json::Value};

/// Renders `value` with `decimals` fractional digits and `,` between
/// thousands groups of the integer part, e.g. `1234567.891` with 2 decimals
/// is `1,234,567.89`. Non-finite values are rendered as is.
pub(crate) fn format_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rendered = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match rendered.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (rendered.as_str(), None),
    };

    let grouped = group_digits(integer, Locale::en.separator());

    let sign = if value.is_sign_negative() { "-" } else { "" };

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Inserts `separator` between every group of three digits, counted from the
/// right. Works on any number of digits, unlike the integer formatters.
fn group_digits(digits: &str, separator: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 * separator.len());

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push_str(separator);
        }

        grouped.push(digit);
    }

    grouped
}

/// Whether an upstream payload carries nothing: `null`, `false`, zero, or an
/// empty string, list or object.
pub(crate) fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}
