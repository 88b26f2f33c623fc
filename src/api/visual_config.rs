use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Space kept free around every plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 10.0,
            right: 45.0,
            bottom: 10.0,
            left: 40.0,
        }
    }
}

/// Geometry of the heatmap strip and its color legend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapLayout {
    #[serde(default = "default_heatmap_height")]
    pub height: f64,
    #[serde(default = "default_heatmap_margin")]
    pub margin: f64,
    #[serde(default = "default_heatmap_legend_width")]
    pub legend_width: f64,
    #[serde(default = "default_heatmap_legend_margin")]
    pub legend_margin: f64,
    #[serde(default = "default_heatmap_tick_translation")]
    pub tick_translation: f64,
    #[serde(default = "default_heatmap_legend_tick_count")]
    pub legend_tick_count: usize,
}

impl Default for HeatmapLayout {
    fn default() -> Self {
        Self {
            height: default_heatmap_height(),
            margin: default_heatmap_margin(),
            legend_width: default_heatmap_legend_width(),
            legend_margin: default_heatmap_legend_margin(),
            tick_translation: default_heatmap_tick_translation(),
            legend_tick_count: default_heatmap_legend_tick_count(),
        }
    }
}

impl HeatmapLayout {
    /// Vertical room one heatmap strip takes below its plot.
    #[must_use]
    pub fn space(self) -> f64 {
        self.margin + self.height
    }
}

/// Layout constants and presentation defaults of the visual.
///
/// Serializable so hosts can persist a tuned layout; every field has a default
/// and missing fields deserialize to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualConfig {
    #[serde(default)]
    pub svg_top_padding: f64,
    #[serde(default = "default_svg_bottom_padding")]
    pub svg_bottom_padding: f64,
    #[serde(default = "default_plot_title_height")]
    pub plot_title_height: f64,
    #[serde(default = "default_legend_height")]
    pub legend_height: f64,
    #[serde(default = "default_legend_separation_margin")]
    pub legend_separation_margin: f64,
    #[serde(default = "default_x_label_space")]
    pub x_label_space: f64,
    #[serde(default = "default_dot_margin")]
    pub dot_margin: f64,
    #[serde(default)]
    pub margins: Margins,
    #[serde(default = "default_minimum_plot_width")]
    pub minimum_plot_width: f64,
    #[serde(default = "default_minimum_plot_height")]
    pub minimum_plot_height: f64,
    #[serde(default)]
    pub heatmap: HeatmapLayout,
    #[serde(default = "default_font_size_px")]
    pub font_size_px: f64,
    #[serde(default = "default_dot_radius")]
    pub dot_radius: f64,
    #[serde(default = "default_dependent_dot_radius")]
    pub dependent_dot_radius: f64,
    #[serde(default = "default_legend_dot_radius")]
    pub legend_dot_radius: f64,
    #[serde(default = "default_dependent_marker")]
    pub dependent_marker: String,
    #[serde(default = "default_legend_unselected_opacity")]
    pub legend_unselected_opacity: f64,
    #[serde(default = "default_rollout_opacity")]
    pub rollout_opacity: f64,
    #[serde(default = "default_tooltip_offset")]
    pub tooltip_offset: f64,
    #[serde(default = "default_y_tick_spacing")]
    pub y_tick_spacing: f64,
    #[serde(default = "default_x_tick_count")]
    pub x_tick_count: usize,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            svg_top_padding: 0.0,
            svg_bottom_padding: default_svg_bottom_padding(),
            plot_title_height: default_plot_title_height(),
            legend_height: default_legend_height(),
            legend_separation_margin: default_legend_separation_margin(),
            x_label_space: default_x_label_space(),
            dot_margin: default_dot_margin(),
            margins: Margins::default(),
            minimum_plot_width: default_minimum_plot_width(),
            minimum_plot_height: default_minimum_plot_height(),
            heatmap: HeatmapLayout::default(),
            font_size_px: default_font_size_px(),
            dot_radius: default_dot_radius(),
            dependent_dot_radius: default_dependent_dot_radius(),
            legend_dot_radius: default_legend_dot_radius(),
            dependent_marker: default_dependent_marker(),
            legend_unselected_opacity: default_legend_unselected_opacity(),
            rollout_opacity: default_rollout_opacity(),
            tooltip_offset: default_tooltip_offset(),
            y_tick_spacing: default_y_tick_spacing(),
            x_tick_count: default_x_tick_count(),
        }
    }
}

impl VisualConfig {
    #[must_use]
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    #[must_use]
    pub fn with_minimum_plot_height(mut self, minimum_plot_height: f64) -> Self {
        self.minimum_plot_height = minimum_plot_height;
        self
    }

    #[must_use]
    pub fn with_minimum_plot_width(mut self, minimum_plot_width: f64) -> Self {
        self.minimum_plot_width = minimum_plot_width;
        self
    }

    #[must_use]
    pub fn with_dependent_marker(mut self, marker: impl Into<String>) -> Self {
        self.dependent_marker = marker.into();
        self
    }

    #[must_use]
    pub fn with_heatmap(mut self, heatmap: HeatmapLayout) -> Self {
        self.heatmap = heatmap;
        self
    }

    #[must_use]
    pub fn with_font_size_px(mut self, font_size_px: f64) -> Self {
        self.font_size_px = font_size_px;
        self
    }

    /// CSS font size used by every text node.
    #[must_use]
    pub fn font_size(&self) -> String {
        format!("{}px", crate::core::format_number(self.font_size_px))
    }

    pub fn validate(&self) -> ChartResult<()> {
        let lengths = [
            ("svg_top_padding", self.svg_top_padding),
            ("svg_bottom_padding", self.svg_bottom_padding),
            ("plot_title_height", self.plot_title_height),
            ("legend_height", self.legend_height),
            ("legend_separation_margin", self.legend_separation_margin),
            ("x_label_space", self.x_label_space),
            ("dot_margin", self.dot_margin),
            ("margins.top", self.margins.top),
            ("margins.right", self.margins.right),
            ("margins.bottom", self.margins.bottom),
            ("margins.left", self.margins.left),
            ("minimum_plot_width", self.minimum_plot_width),
            ("minimum_plot_height", self.minimum_plot_height),
            ("heatmap.height", self.heatmap.height),
            ("heatmap.margin", self.heatmap.margin),
            ("heatmap.legend_width", self.heatmap.legend_width),
            ("heatmap.legend_margin", self.heatmap.legend_margin),
            ("tooltip_offset", self.tooltip_offset),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "`{name}` must be finite and >= 0"
                )));
            }
        }

        let positive = [
            ("font_size_px", self.font_size_px),
            ("dot_radius", self.dot_radius),
            ("dependent_dot_radius", self.dependent_dot_radius),
            ("legend_dot_radius", self.legend_dot_radius),
            ("y_tick_spacing", self.y_tick_spacing),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "`{name}` must be finite and > 0"
                )));
            }
        }

        for (name, value) in [
            ("legend_unselected_opacity", self.legend_unselected_opacity),
            ("rollout_opacity", self.rollout_opacity),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidData(format!(
                    "`{name}` must be in [0, 1]"
                )));
            }
        }

        if self.heatmap.legend_tick_count < 2 {
            return Err(ChartError::InvalidData(
                "`heatmap.legend_tick_count` must be >= 2".to_owned(),
            ));
        }
        if self.x_tick_count == 0 {
            return Err(ChartError::InvalidData(
                "`x_tick_count` must be > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_svg_bottom_padding() -> f64 {
    10.0
}

fn default_plot_title_height() -> f64 {
    10.0
}

fn default_legend_height() -> f64 {
    20.0
}

fn default_legend_separation_margin() -> f64 {
    20.0
}

fn default_x_label_space() -> f64 {
    10.0
}

fn default_dot_margin() -> f64 {
    4.0
}

fn default_minimum_plot_width() -> f64 {
    120.0
}

fn default_minimum_plot_height() -> f64 {
    40.0
}

fn default_heatmap_height() -> f64 {
    10.0
}

fn default_heatmap_margin() -> f64 {
    6.0
}

fn default_heatmap_legend_width() -> f64 {
    10.0
}

fn default_heatmap_legend_margin() -> f64 {
    20.0
}

fn default_heatmap_tick_translation() -> f64 {
    3.0
}

fn default_heatmap_legend_tick_count() -> usize {
    3
}

fn default_font_size_px() -> f64 {
    10.0
}

fn default_dot_radius() -> f64 {
    2.0
}

fn default_dependent_dot_radius() -> f64 {
    3.0
}

fn default_legend_dot_radius() -> f64 {
    7.0
}

fn default_dependent_marker() -> String {
    "DEF".to_owned()
}

fn default_legend_unselected_opacity() -> f64 {
    0.3
}

fn default_rollout_opacity() -> f64 {
    0.2
}

fn default_tooltip_offset() -> f64 {
    10.0
}

fn default_y_tick_spacing() -> f64 {
    20.0
}

fn default_x_tick_count() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::VisualConfig;

    #[test]
    fn empty_json_yields_defaults() {
        let config: VisualConfig = serde_json::from_str("{}").expect("defaults");
        assert_eq!(config, VisualConfig::default());
        assert_eq!(config.heatmap.space(), 16.0);
        assert_eq!(config.font_size(), "10px");
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn negative_lengths_are_rejected() {
        let config = VisualConfig::default().with_minimum_plot_height(-1.0);
        assert!(config.validate().is_err());
    }
}
