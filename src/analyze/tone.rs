//! Parsing of "first element of a delimited string" fields.
//!
//! GDELT packs several values into one column: the tone column is
//! `tone,positive,negative,polarity,activity_density,self_ref_density` and
//! only the first value is used as the sentiment score. Every such lookup goes
//! through [`leading_field`] so failures are explicit instead of defaulted.

use std::str::FromStr;

use crate::error::FieldError;

pub const TONE_DELIMITER: char = ',';

/// Parse the first `delim`-separated element of `raw`.
pub fn leading_field<T: FromStr>(raw: Option<&str>, delim: char) -> Result<T, FieldError> {
    let raw = raw.ok_or(FieldError::Missing)?;
    let first = raw.split(delim).next().unwrap_or_default().trim();
    if first.is_empty() {
        return Err(FieldError::Empty);
    }
    first
        .parse::<T>()
        .map_err(|_| FieldError::Unparseable(first.to_string()))
}

/// Sentiment score from a composite tone string. Non-finite values are rejected.
pub fn parse_tone(raw: Option<&str>) -> Result<f64, FieldError> {
    let v: f64 = leading_field(raw, TONE_DELIMITER)?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(FieldError::Unparseable(v.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_value_of_gdelt_tone() {
        let raw = "-2.43111831442464,1.45867098865478,3.88978930307942,5.3484602917342,17.5040518638574,0.972447325769854";
        let v = parse_tone(Some(raw)).unwrap();
        assert!((v - -2.43111831442464).abs() < 1e-12);
        assert_eq!(parse_tone(Some("0,1,1")).unwrap(), 0.0);
        assert_eq!(parse_tone(Some(" 3.0 ,x")).unwrap(), 3.0);
        assert_eq!(parse_tone(Some("7")).unwrap(), 7.0);
    }

    #[test]
    fn failures_are_explicit() {
        assert_eq!(parse_tone(None), Err(FieldError::Missing));
        assert_eq!(parse_tone(Some("")), Err(FieldError::Empty));
        assert_eq!(parse_tone(Some(",1.2,3")), Err(FieldError::Empty));
        assert_eq!(
            parse_tone(Some("abc,1,2")),
            Err(FieldError::Unparseable("abc".into()))
        );
        assert!(matches!(
            parse_tone(Some("NaN,1")),
            Err(FieldError::Unparseable(_))
        ));
        assert!(matches!(
            parse_tone(Some("inf")),
            Err(FieldError::Unparseable(_))
        ));
    }

    #[test]
    fn leading_field_is_generic() {
        let s: String = leading_field(Some("ECON_STOCKMARKET;TAX"), ';').unwrap();
        assert_eq!(s, "ECON_STOCKMARKET");
        let n: Result<u32, _> = leading_field(Some("-1;2"), ';');
        assert!(n.is_err());
    }
}
