use crate::core::Scalar;

/// Parses the longest numeric prefix of `input`.
///
/// Leading whitespace is skipped and trailing garbage is ignored, so
/// `"12.5kb"` yields `12.5`. Returns `NaN` when no digits lead the string.
#[must_use]
pub fn parse_float(input: &str) -> f64 {
    let text = input.trim_start();
    let bytes = text.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if text[end..].starts_with("Infinity") {
        return if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_digits = leading_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = leading_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = leading_digits(&bytes[exp_end.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    text[..end].parse::<f64>().unwrap_or(f64::NAN)
}

fn leading_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|byte| byte.is_ascii_digit()).count()
}

/// Coerces a cell to a finite number.
///
/// Absent cells, non-numeric strings and non-finite results all become `0.0`.
#[must_use]
pub fn coerce_number(value: Option<&Scalar>) -> f64 {
    let parsed = match value {
        Some(Scalar::Number(number)) => *number,
        Some(Scalar::String(text)) => parse_float(text),
        Some(Scalar::Bool(_) | Scalar::Null) | None => f64::NAN,
    };
    if parsed.is_finite() { parsed } else { 0.0 }
}
