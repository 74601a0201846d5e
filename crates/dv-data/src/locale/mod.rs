//! Locale-aware number parsing
//!
//! Cells are classified in three ways: a number, plain text, or a string
//! that is made only of digits and separators but does not follow the
//! locale's grouping rules. The last kind is reported as an error instead of
//! being guessed at, since it usually means the file was written with a
//! different locale than the one it is being read with.

use dv_core::NumberLocale;

use crate::DataError;

/// Width of every digit group after the first
const GROUP_WIDTH: usize = 3;

/// Parse a cell according to `locale`.
///
/// Returns `Ok(Some(value))` for a number, `Ok(None)` for text that is not
/// a number at all, and `Err(DataError::NumberFormat)` for a number-like
/// string whose separators are inconsistent or whose value overflows `f64`.
pub fn parse_number(text: &str, locale: &NumberLocale) -> Result<Option<f64>, DataError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let (sign, unsigned) = match trimmed.as_bytes()[0] {
        b'-' => ("-", &trimmed[1..]),
        b'+' => ("", &trimmed[1..]),
        _ => ("", trimmed),
    };

    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(pos) => {
            let exponent = &unsigned[pos + 1..];
            if !is_exponent(exponent) {
                return Ok(None);
            }
            (&unsigned[..pos], Some(exponent))
        }
        None => (unsigned, None),
    };

    let decimal = locale.decimal_separator;
    let grouping = locale.grouping_separator;
    if !mantissa
        .chars()
        .all(|c| c.is_ascii_digit() || c == decimal || c == grouping)
    {
        return Ok(None);
    }
    if !mantissa.chars().any(|c| c.is_ascii_digit()) {
        return Ok(None);
    }

    let malformed = || DataError::NumberFormat {
        value: trimmed.to_string(),
    };

    let mut halves = mantissa.split(decimal);
    let integer_part = halves.next().unwrap_or_default();
    let fraction_part = halves.next();
    if halves.next().is_some() {
        return Err(malformed());
    }
    if fraction_part.is_some_and(|f| f.contains(grouping)) {
        return Err(malformed());
    }

    let integer_digits = if integer_part.contains(grouping) {
        if !groups_are_well_formed(integer_part, grouping) {
            return Err(malformed());
        }
        integer_part.replace(grouping, "")
    } else {
        integer_part.to_string()
    };

    let mut canonical = String::with_capacity(trimmed.len() + 2);
    canonical.push_str(sign);
    canonical.push_str(if integer_digits.is_empty() { "0" } else { &integer_digits });
    if let Some(fraction) = fraction_part.filter(|f| !f.is_empty()) {
        canonical.push('.');
        canonical.push_str(fraction);
    }
    if let Some(exponent) = exponent {
        canonical.push('e');
        canonical.push_str(exponent);
    }

    match canonical.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(malformed()),
    }
}

/// Format a value for display using `locale`'s decimal separator
pub fn format_number(value: f64, locale: &NumberLocale) -> String {
    let text = value.to_string();
    if locale.decimal_separator == '.' {
        text
    } else {
        text.replace('.', &locale.decimal_separator.to_string())
    }
}

/// First group holds one to three digits, every following group exactly three.
fn groups_are_well_formed(integer_part: &str, grouping: char) -> bool {
    let mut groups = integer_part.split(grouping);
    let leading_ok = groups
        .next()
        .is_some_and(|g| (1..=GROUP_WIDTH).contains(&g.len()));
    leading_ok && groups.all(|g| g.len() == GROUP_WIDTH)
}

fn is_exponent(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}
