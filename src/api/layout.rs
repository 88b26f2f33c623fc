use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{Margins, VisualConfig};
use crate::core::{LinearScale, ValueRange, Viewport};
use crate::error::{ChartError, ChartResult, PlotDirection};

/// Counts that drive the vertical split of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutRequest {
    pub plot_count: usize,
    pub titled_plots: usize,
    pub labeled_plots: usize,
    pub heatmap_plots: usize,
    pub has_legend: bool,
}

/// Shared horizontal axis of all plots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XAxisSettings {
    pub x_name: String,
    pub x_range: ValueRange,
    /// Base scale from the x domain onto `[0, plot_width]`; zooming rescales a copy.
    pub x_scale: LinearScale,
}

/// Geometry shared by every plot of one update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralPlotSettings {
    pub plot_title_height: f64,
    pub dot_margin: f64,
    pub plot_height: f64,
    pub plot_width: f64,
    pub legend_height: f64,
    pub margins: Margins,
    pub legend_y_position: f64,
    pub font_size: String,
    pub x_axis: XAxisSettings,
}

/// Splits the viewport between plots and builds the shared x-scale.
pub fn compute_layout(
    viewport: Viewport,
    request: LayoutRequest,
    x_name: &str,
    x_values: &[f64],
    config: &VisualConfig,
) -> ChartResult<GeneralPlotSettings> {
    if !viewport.is_valid() {
        return Err(ChartError::SvgSize);
    }
    if request.plot_count == 0 {
        return Err(ChartError::NoValues);
    }

    let legend_height = if request.has_legend {
        config.legend_height
    } else {
        0.0
    };
    let plot_height_space = (viewport.height
        - config.svg_top_padding
        - config.svg_bottom_padding
        - legend_height
        - config.plot_title_height * request.titled_plots as f64
        - config.x_label_space * request.labeled_plots as f64
        - config.heatmap.space() * request.heatmap_plots as f64)
        / request.plot_count as f64;
    if plot_height_space < config.minimum_plot_height {
        return Err(ChartError::PlotSize {
            direction: PlotDirection::Vertical,
        });
    }

    let plot_width = viewport.width - config.margins.left - config.margins.right;
    if plot_width < config.minimum_plot_width {
        return Err(ChartError::PlotSize {
            direction: PlotDirection::Horizontal,
        });
    }

    let x_range = ValueRange::from_values(x_values.iter().copied())
        .unwrap_or_else(|| ValueRange::new(0.0, 0.0));
    let x_scale = LinearScale::from_range(x_range)?.with_range(0.0, plot_width)?;
    let plot_height = plot_height_space - config.margins.top - config.margins.bottom;

    debug!(
        plot_count = request.plot_count,
        plot_height,
        plot_width,
        x_min = x_range.min,
        x_max = x_range.max,
        "computed layout"
    );

    Ok(GeneralPlotSettings {
        plot_title_height: config.plot_title_height,
        dot_margin: config.dot_margin,
        plot_height,
        plot_width,
        legend_height,
        margins: config.margins,
        legend_y_position: 0.0,
        font_size: config.font_size(),
        x_axis: XAxisSettings {
            x_name: x_name.to_owned(),
            x_range,
            x_scale,
        },
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{LayoutRequest, compute_layout};
    use crate::api::VisualConfig;
    use crate::core::Viewport;
    use crate::error::{ChartError, PlotDirection};

    fn request(plot_count: usize) -> LayoutRequest {
        LayoutRequest {
            plot_count,
            ..LayoutRequest::default()
        }
    }

    #[test]
    fn single_plot_height_and_width() {
        let config = VisualConfig::default();
        let layout = compute_layout(
            Viewport::new(400.0, 300.0),
            request(1),
            "x",
            &[1.0, 2.0, 3.0],
            &config,
        )
        .expect("layout");
        assert_relative_eq!(layout.plot_width, 315.0);
        assert_relative_eq!(layout.plot_height, 270.0);
        assert_relative_eq!(layout.x_axis.x_scale.map(3.0), 315.0);
    }

    #[test]
    fn zero_viewport_is_svg_size_error() {
        let err = compute_layout(
            Viewport::new(0.0, 300.0),
            request(1),
            "x",
            &[1.0],
            &VisualConfig::default(),
        )
        .expect_err("zero width");
        assert!(matches!(err, ChartError::SvgSize));
    }

    #[test]
    fn narrow_viewport_is_horizontal_plot_size_error() {
        let err = compute_layout(
            Viewport::new(150.0, 300.0),
            request(1),
            "x",
            &[1.0],
            &VisualConfig::default(),
        )
        .expect_err("too narrow");
        assert!(matches!(
            err,
            ChartError::PlotSize {
                direction: PlotDirection::Horizontal
            }
        ));
    }

    #[test]
    fn legend_titles_labels_and_heatmaps_reduce_height() {
        let config = VisualConfig::default();
        let request = LayoutRequest {
            plot_count: 2,
            titled_plots: 2,
            labeled_plots: 1,
            heatmap_plots: 1,
            has_legend: true,
        };
        let layout = compute_layout(Viewport::new(400.0, 300.0), request, "x", &[0.0, 1.0], &config)
            .expect("layout");
        // (300 - 10 - 20 - 2*10 - 10 - 16) / 2 - 20
        assert_relative_eq!(layout.plot_height, 92.0);
        assert_relative_eq!(layout.legend_height, 20.0);
    }
}
