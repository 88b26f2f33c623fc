use tracing::warn;

use crate::core::ValueRange;
use crate::render::Color;

/// Named sequential ramps accepted by `colorSettings.heatmapColorScheme`.
///
/// Each ramp is sampled from the light end, the middle and the dark end of
/// the corresponding ColorBrewer scale.
const SCHEMES: &[(&str, [&str; 3])] = &[
    ("Blues", ["#f7fbff", "#6baed6", "#08306b"]),
    ("Greens", ["#f7fcf5", "#74c476", "#00441b"]),
    ("Greys", ["#ffffff", "#969696", "#000000"]),
    ("Oranges", ["#fff5eb", "#fd8d3c", "#7f2704"]),
    ("Purples", ["#fcfbfd", "#9e9ac8", "#3f007d"]),
    ("Reds", ["#fff5f0", "#fb6a4a", "#67000d"]),
    ("BuGn", ["#f7fcfd", "#66c2a4", "#00441b"]),
    ("BuPu", ["#f7fcfd", "#8c96c6", "#4d004b"]),
    ("GnBu", ["#f7fcf0", "#7bccc4", "#084081"]),
    ("OrRd", ["#fff7ec", "#fc8d59", "#7f0000"]),
    ("PuBu", ["#fff7fb", "#74a9cf", "#023858"]),
    ("PuBuGn", ["#fff7fb", "#67a9cf", "#014636"]),
    ("PuRd", ["#f7f4f9", "#df65b0", "#67001f"]),
    ("RdPu", ["#fff7f3", "#f768a1", "#49006a"]),
    ("YlGn", ["#ffffe5", "#78c679", "#004529"]),
    ("YlGnBu", ["#ffffd9", "#41b6c4", "#081d58"]),
    ("YlOrBr", ["#ffffe5", "#fe9929", "#662506"]),
    ("YlOrRd", ["#ffffcc", "#fd8d3c", "#800026"]),
];

const DEFAULT_SCHEME: &str = "Blues";

/// Maps a numeric domain onto a three-stop color ramp.
#[derive(Debug, Clone, PartialEq)]
pub struct SequentialColorScale {
    name: &'static str,
    stops: [Color; 3],
    domain: ValueRange,
}

impl SequentialColorScale {
    /// Resolves `interpolateBlues`-style or bare scheme names.
    ///
    /// Unknown names fall back to `Blues`.
    #[must_use]
    pub fn from_scheme(scheme: &str, domain: ValueRange) -> Self {
        let bare = scheme.strip_prefix("interpolate").unwrap_or(scheme);
        let (name, stops) = SCHEMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(bare))
            .or_else(|| {
                warn!(scheme, fallback = DEFAULT_SCHEME, "unknown heatmap color scheme");
                SCHEMES.iter().find(|(name, _)| *name == DEFAULT_SCHEME)
            })
            .copied()
            .unwrap_or(SCHEMES[0]);

        let parse = |hex: &str| Color::from_hex(hex).unwrap_or(Color::BLACK);
        Self {
            name,
            stops: [parse(stops[0]), parse(stops[1]), parse(stops[2])],
            domain,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn domain(&self) -> ValueRange {
        self.domain
    }

    /// Color at relative position `t` in `[0, 1]`.
    #[must_use]
    pub fn interpolate(&self, t: f64) -> Color {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        if t <= 0.5 {
            self.stops[0].lerp(self.stops[1], t * 2.0)
        } else {
            self.stops[1].lerp(self.stops[2], (t - 0.5) * 2.0)
        }
    }

    #[must_use]
    pub fn color_for(&self, value: f64) -> Color {
        let span = self.domain.span();
        let t = if span == 0.0 {
            0.5
        } else {
            (value - self.domain.min) / span
        };
        self.interpolate(t)
    }
}

#[cfg(test)]
mod tests {
    use super::SequentialColorScale;
    use crate::core::ValueRange;

    #[test]
    fn prefixed_names_resolve() {
        let scale = SequentialColorScale::from_scheme("interpolateReds", ValueRange::new(0.0, 1.0));
        assert_eq!(scale.name(), "Reds");
        assert_eq!(scale.color_for(0.0).to_hex(), "#fff5f0");
        assert_eq!(scale.color_for(1.0).to_hex(), "#67000d");
    }

    #[test]
    fn unknown_scheme_falls_back_to_blues() {
        let scale = SequentialColorScale::from_scheme("interpolateMagma", ValueRange::new(0.0, 1.0));
        assert_eq!(scale.name(), "Blues");
    }

    #[test]
    fn flat_domain_uses_middle_stop() {
        let scale = SequentialColorScale::from_scheme("Blues", ValueRange::new(2.0, 2.0));
        assert_eq!(scale.color_for(2.0).to_hex(), "#6baed6");
    }
}
