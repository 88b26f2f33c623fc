use std::fmt;

use serde::{Deserialize, Serialize};

/// Drawable area handed over by the host, in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Closed numeric interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Extent of the finite values, `None` when there are none.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut range: Option<Self> = None;
        for value in values.into_iter().filter(|v| v.is_finite()) {
            range = Some(match range {
                None => Self::new(value, value),
                Some(r) => Self::new(r.min.min(value), r.max.max(value)),
            });
        }
        range
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.max - self.min
    }
}

/// One cell of a host query column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimitiveValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl PrimitiveValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of the cell. Text is parsed, booleans are not numbers.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Some(*value),
            Self::Text(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    /// String form used for legend categories and tooltip cells; `None` for null.
    #[must_use]
    pub fn to_display_string(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(value) => Some(value.to_string()),
            Self::Number(value) => Some(format_number(*value)),
            Self::Text(text) => Some(text.clone()),
        }
    }
}

impl From<f64> for PrimitiveValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for PrimitiveValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Option<f64>> for PrimitiveValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Null, Self::Number)
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_display_string() {
            Some(text) => f.write_str(&text),
            None => f.write_str("null"),
        }
    }
}

/// Integral values print without a fractional part.
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{PrimitiveValue, ValueRange, Viewport, format_number};

    #[test]
    fn viewport_rejects_zero_and_nan() {
        assert!(Viewport::new(10.0, 10.0).is_valid());
        assert!(!Viewport::new(0.0, 10.0).is_valid());
        assert!(!Viewport::new(10.0, f64::NAN).is_valid());
    }

    #[test]
    fn range_skips_non_finite_values() {
        let range = ValueRange::from_values([3.0, f64::NAN, -1.0, 7.5]).expect("range");
        assert_eq!(range, ValueRange::new(-1.0, 7.5));
        assert!(ValueRange::from_values(std::iter::empty()).is_none());
    }

    #[test]
    fn integral_numbers_print_without_fraction() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(
            PrimitiveValue::Number(12.0).to_display_string().as_deref(),
            Some("12")
        );
        assert_eq!(PrimitiveValue::Null.to_display_string(), None);
    }

    #[test]
    fn untagged_json_maps_to_variants() {
        let values: Vec<PrimitiveValue> =
            serde_json::from_str(r#"[1.5, null, "OZE", true]"#).expect("parse");
        assert_eq!(
            values,
            vec![
                PrimitiveValue::Number(1.5),
                PrimitiveValue::Null,
                PrimitiveValue::Text("OZE".to_owned()),
                PrimitiveValue::Bool(true),
            ]
        );
    }
}
