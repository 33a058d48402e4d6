//! Number formatting for calculator results.

/// Default number of fractional digits.
pub const DEFAULT_PRECISION: usize = 6;

/// Magnitudes above this are shown in scientific notation.
const SCIENTIFIC_UPPER: f64 = 1e12;
/// Non-zero magnitudes below this are shown in scientific notation.
const SCIENTIFIC_LOWER: f64 = 1e-6;

/// Format a number for display.
///
/// - Non-finite values become `"0"`.
/// - Very large or very small magnitudes use scientific notation with
///   `precision` fractional digits and a signed exponent (`1.500000e+13`).
/// - Everything else is rounded to `precision` fractional digits with
///   trailing zeros and a dangling decimal point removed.
pub fn format_number(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if magnitude > SCIENTIFIC_UPPER || (value != 0.0 && magnitude < SCIENTIFIC_LOWER) {
        return format_scientific(value, precision);
    }

    let formatted = format!("{:.*}", precision, value);
    let trimmed = if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted.as_str()
    };

    // Rounding can leave "-0" behind for tiny negatives.
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Like [`format_number`], with thousands separators in the integer part.
pub fn format_grouped(value: f64, precision: usize) -> String {
    let plain = format_number(value, precision);
    if plain.contains('e') {
        return plain;
    }

    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain.as_str()),
    };
    let (int_part, dec_part) = match unsigned.find('.') {
        Some(dot_pos) => unsigned.split_at(dot_pos),
        None => (unsigned, ""),
    };

    format!("{}{}{}", sign, group_digits(int_part), dec_part)
}

/// `1234567` -> `1,234,567`.
fn group_digits(digits: &str) -> String {
    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Scientific form with an explicit exponent sign.
fn format_scientific(value: f64, precision: usize) -> String {
    let formatted = format!("{:.*e}", precision, value);
    if let Some((mantissa, exponent)) = formatted.split_once('e')
        && !exponent.starts_with('-')
    {
        return format!("{mantissa}e+{exponent}");
    }
    formatted
}
