use crate::error::{ChartError, ChartResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Parses `#rgb`, `#rrggbb` or the same without the leading `#`.
    pub fn from_hex(text: &str) -> ChartResult<Self> {
        let hex = text.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(ChartError::InvalidData(format!(
                "color `{text}` is not a hex color"
            )));
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_owned(),
            _ => {
                return Err(ChartError::InvalidData(format!(
                    "color `{text}` is not a hex color"
                )));
            }
        };

        let channel = |offset: usize| -> ChartResult<f64> {
            u8::from_str_radix(&expanded[offset..offset + 2], 16)
                .map(|v| f64::from(v) / 255.0)
                .map_err(|_| ChartError::InvalidData(format!("color `{text}` is not a hex color")))
        };
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Lower-case `#rrggbb`; alpha is not encoded.
    #[must_use]
    pub fn to_hex(self) -> String {
        let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            byte(self.red),
            byte(self.green),
            byte(self.blue)
        )
    }

    /// Linear interpolation in RGB space, `t` clamped to `[0, 1]`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self::rgba(
            mix(self.red, other.red),
            mix(self.green, other.green),
            mix(self.blue, other.blue),
            mix(self.alpha, other.alpha),
        )
    }

    pub fn validate(self) -> ChartResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Horizontal text anchoring, mirrors SVG `text-anchor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// Rough advance width of `text`; the scene has no font metrics.
#[must_use]
pub fn estimate_text_width(text: &str, font_size_px: f64) -> f64 {
    text.chars().count() as f64 * font_size_px * 0.6
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn hex_round_trip() {
        let color = Color::from_hex("#e41a1c").expect("hex");
        assert_eq!(color.to_hex(), "#e41a1c");
        assert_eq!(Color::from_hex("FFFFFF").expect("hex"), Color::WHITE);
        assert_eq!(Color::from_hex("#000").expect("hex"), Color::BLACK);
    }

    #[test]
    fn invalid_hex_is_rejected() {
        assert!(Color::from_hex("blue").is_err());
        assert!(Color::from_hex("#12345z").is_err());
    }

    #[test]
    fn lerp_midpoint() {
        let mid = Color::BLACK.lerp(Color::WHITE, 0.5);
        assert_eq!(mid.to_hex(), "#808080");
    }
}
