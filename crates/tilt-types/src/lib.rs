//! Validated primitive types shared across the tilt test workspace.
//!
//! These types carry their invariants with them so that downstream code can rely on them
//! without re-checking:
//! - [`NonEmptyText`] for identifiers and labels that must contain visible characters
//! - [`Percent`] for completion figures bounded to `0..=100`
//! - [`ClinicalRange`] for the declared input range of a form field

use std::fmt;

/// Errors that can occur when constructing validated types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TypesError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    EmptyText,

    /// A numeric value fell outside the declared range for its field
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },
}

// ============================================================================
// NonEmptyText
// ============================================================================

/// A string type that guarantees non-empty content.
///
/// Input is trimmed on construction. A patient identifier typed as only spaces is treated the
/// same as no identifier at all, which is why optional identifiers are modelled as
/// `Option<NonEmptyText>` rather than a possibly blank `String`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TypesError::EmptyText` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TypesError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TypesError::EmptyText);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Builds an optional value, mapping blank input to `None`.
    pub fn optional(input: impl AsRef<str>) -> Option<Self> {
        Self::new(input).ok()
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Percent
// ============================================================================

/// A whole-number percentage in `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct Percent(u8);

impl Percent {
    pub const ZERO: Percent = Percent(0);
    pub const FULL: Percent = Percent(100);

    /// Computes `round(100 * part / whole)`.
    ///
    /// A zero `whole` yields 0 and the result saturates at 100 when `part` exceeds `whole`.
    /// Halves round away from zero.
    pub fn from_ratio(part: usize, whole: usize) -> Self {
        if whole == 0 {
            return Self::ZERO;
        }
        let pct = (100.0 * part as f64 / whole as f64).round();
        Self(pct.min(100.0) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// ============================================================================
// ClinicalRange
// ============================================================================

/// Inclusive range declared for a numeric form field.
///
/// Ranges are declared as constants next to the field they govern and applied at the input
/// boundary. Core computations never re-check them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClinicalRange<T> {
    min: T,
    max: T,
}

impl<T> ClinicalRange<T>
where
    T: PartialOrd + Copy + fmt::Display,
{
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }

    /// Returns `value` unchanged when it lies inside the range.
    ///
    /// # Errors
    ///
    /// Returns `TypesError::OutOfRange` naming `field` when the value is outside the range.
    pub fn check(&self, field: &'static str, value: T) -> Result<T, TypesError> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(TypesError::OutOfRange {
                field,
                value: value.to_string(),
                min: self.min.to_string(),
                max: self.max.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims_input() {
        let text = NonEmptyText::new("  PT-001 ").unwrap();
        assert_eq!(text.as_str(), "PT-001");
    }

    #[test]
    fn test_non_empty_text_rejects_blank() {
        assert_eq!(NonEmptyText::new(""), Err(TypesError::EmptyText));
        assert_eq!(NonEmptyText::new("   "), Err(TypesError::EmptyText));
        assert!(NonEmptyText::optional("  ").is_none());
    }

    #[test]
    fn test_non_empty_text_deserialize_rejects_blank() {
        let err = serde_json::from_str::<NonEmptyText>("\"  \"");
        assert!(err.is_err());
        let ok: NonEmptyText = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(ok.as_str(), "abc");
    }

    #[test]
    fn test_percent_from_ratio_rounds() {
        assert_eq!(Percent::from_ratio(3, 11).value(), 27);
        assert_eq!(Percent::from_ratio(2, 3).value(), 67);
        assert_eq!(Percent::from_ratio(11, 11), Percent::FULL);
    }

    #[test]
    fn test_percent_from_ratio_handles_degenerate_inputs() {
        assert_eq!(Percent::from_ratio(5, 0), Percent::ZERO);
        assert_eq!(Percent::from_ratio(12, 11), Percent::FULL);
    }

    #[test]
    fn test_percent_display() {
        assert_eq!(Percent::from_ratio(3, 11).to_string(), "27%");
        assert_eq!(Percent::FULL.to_string(), "100%");
    }

    #[test]
    fn test_clinical_range_check() {
        const AGE: ClinicalRange<u8> = ClinicalRange::new(10, 100);
        assert_eq!(AGE.check("age", 45), Ok(45));
        assert_eq!(AGE.check("age", 10), Ok(10));

        let err = AGE.check("age", 101).unwrap_err();
        assert_eq!(err.to_string(), "age must be between 10 and 100, got 101");
    }

    #[test]
    fn test_clinical_range_inclusive_float_bounds() {
        let weight = ClinicalRange::new(30.0_f64, 200.0);
        assert!(weight.contains(30.0));
        assert!(weight.contains(200.0));
        assert!(!weight.contains(200.1));
    }
}
