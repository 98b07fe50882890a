use crate::WfError;

/// Floating point type used throughout the workspace.
pub type Real = f64;

/// Tolerance pair for float comparisons.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, WfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(WfError::NonFinite { what, value: v })
    }
}

/// Parse a form field as a finite number. Accepts a decimal comma.
pub fn parse_number(raw: &str, field: &str) -> Result<Real, WfError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WfError::invalid_input(field, "value is required"));
    }
    let normalized = trimmed.replace(',', ".");
    match normalized.parse::<Real>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(WfError::invalid_input(
            field,
            format!("'{trimmed}' is not a number"),
        )),
    }
}

/// Parse a field that must be zero or more (lengths, distances).
pub fn parse_non_negative(raw: &str, field: &str) -> Result<Real, WfError> {
    let v = parse_number(raw, field)?;
    if v < 0.0 {
        return Err(WfError::invalid_input(field, "must not be negative"));
    }
    Ok(v)
}

/// Parse a field that must be strictly positive (diameters, durations).
pub fn parse_positive(raw: &str, field: &str) -> Result<Real, WfError> {
    let v = parse_number(raw, field)?;
    if v <= 0.0 {
        return Err(WfError::invalid_input(field, "must be greater than zero"));
    }
    Ok(v)
}

/// Parse a percentage in [0, 100].
pub fn parse_percentage(raw: &str, field: &str) -> Result<Real, WfError> {
    let v = parse_number(raw, field)?;
    if !(0.0..=100.0).contains(&v) {
        return Err(WfError::invalid_input(field, "must be between 0 and 100"));
    }
    Ok(v)
}

/// Reject an empty text or dropdown selection.
pub fn require_text<'a>(raw: &'a str, field: &str) -> Result<&'a str, WfError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WfError::invalid_input(field, "a value must be selected"));
    }
    Ok(trimmed)
}

/// Render a number for a form field without a trailing `.0`.
pub fn format_number(v: Real) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances::default();
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        assert!(format!("{err}").contains("Non-finite"));
    }

    #[test]
    fn parse_number_accepts_decimal_comma() {
        assert_eq!(parse_number(" 1,5 ", "length").unwrap(), 1.5);
    }

    #[test]
    fn parse_number_rejects_text_and_empty() {
        assert!(matches!(
            parse_number("abc", "length"),
            Err(WfError::InvalidInput { .. })
        ));
        let err = parse_number("  ", "length").unwrap_err();
        assert_eq!(format!("{err}"), "length: value is required");
        assert!(parse_number("inf", "length").is_err());
    }

    #[test]
    fn range_checks() {
        assert!(parse_non_negative("-1", "d").is_err());
        assert_eq!(parse_non_negative("0", "d").unwrap(), 0.0);
        assert!(parse_positive("0", "d").is_err());
        assert!(parse_percentage("100.5", "p").is_err());
        assert_eq!(parse_percentage("85", "p").unwrap(), 85.0);
        assert!(require_text(" ", "supplier").is_err());
    }

    #[test]
    fn format_number_drops_integral_fraction() {
        assert_eq!(format_number(8.0), "8");
        assert_eq!(format_number(2.5), "2.5");
    }
}
