use std::fmt;

use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

/// Direction in which the viewport ran out of room for the plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotDirection {
    Vertical,
    Horizontal,
}

impl PlotDirection {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
        }
    }
}

impl fmt::Display for PlotDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drawing sub-step that failed while materializing the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    ClipPath,
    BasicPlot,
    XAxis,
    YAxis,
    PlotTitle,
    VerticalRuler,
    Slabs,
    DrawPlot,
    Tooltip,
    Zoom,
    Heatmap,
    Legend,
    Rollout,
}

impl RenderStage {
    /// Stable error name shown in the error panel.
    #[must_use]
    pub fn error_name(self) -> &'static str {
        match self {
            Self::ClipPath => "AddClipPathError",
            Self::BasicPlot => "BuildBasicPlotError",
            Self::XAxis => "BuildXAxisError",
            Self::YAxis => "BuildYAxisError",
            Self::PlotTitle => "AddPlotTitlesError",
            Self::VerticalRuler => "AddVerticalRulerError",
            Self::Slabs => "SlabInformationError",
            Self::DrawPlot => "DrawPlotError",
            Self::Tooltip => "CustomTooltipError",
            Self::Zoom => "AddZoomError",
            Self::Heatmap => "HeatmapError",
            Self::Legend => "DrawLegendError",
            Self::Rollout => "DrawRolloutError",
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::ClipPath => "add clip paths",
            Self::BasicPlot => "build plot group",
            Self::XAxis => "build x-axis",
            Self::YAxis => "build y-axis",
            Self::PlotTitle => "add plot title",
            Self::VerticalRuler => "add vertical ruler",
            Self::Slabs => "draw slabs",
            Self::DrawPlot => "draw plot",
            Self::Tooltip => "wire up tooltips",
            Self::Zoom => "wire up zoom",
            Self::Heatmap => "draw heatmap",
            Self::Legend => "draw legend",
            Self::Rollout => "draw rollout rectangles",
        }
    }
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: f64, height: f64 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("{0}")]
    ParseAndTransform(String),

    #[error("no values were added to the y-axis")]
    NoValues,

    #[error("no values were added to the x-axis")]
    NoAxis,

    #[error("the number of x-axis columns must be one or equal to the number of y-axis columns")]
    Axis,

    #[error("x-axis `{axis_name}` contains null values")]
    AxisNullValues { axis_name: String },

    #[error("unknown axis information `{value}`")]
    AxisInformation { value: String },

    #[error("the visual has no drawable size")]
    SvgSize,

    #[error("not enough {direction} space to draw the plots")]
    PlotSize { direction: PlotDirection },

    #[error("plot `{plot_name}` uses legend colors but no legend column was added")]
    PlotLegend { plot_name: String },

    #[error("a slab overlay was requested but no slab rectangles are available")]
    SlabInformation,

    #[error("scene graph: {0}")]
    Scene(String),

    #[error("failed to {stage}: {source}")]
    Render {
        stage: RenderStage,
        #[source]
        source: Box<ChartError>,
    },

    #[error("error in {operation}: {source}")]
    Interaction {
        operation: &'static str,
        #[source]
        source: Box<ChartError>,
    },
}

impl ChartError {
    /// Wraps a lower-level failure with the drawing step it happened in.
    #[must_use]
    pub fn render(stage: RenderStage, source: ChartError) -> Self {
        Self::Render {
            stage,
            source: Box::new(source),
        }
    }

    /// Annotates a failure raised from an interactive callback.
    #[must_use]
    pub fn interaction(operation: &'static str, source: ChartError) -> Self {
        Self::Interaction {
            operation,
            source: Box::new(source),
        }
    }

    /// Name shown in the headline of the error panel.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidViewport { .. } => "InvalidViewportError",
            Self::InvalidData(_) => "InvalidDataError",
            Self::ParseAndTransform(_) => "ParseAndTransformError",
            Self::NoValues => "NoValuesError",
            Self::NoAxis => "NoAxisError",
            Self::Axis => "AxisError",
            Self::AxisNullValues { .. } => "AxisNullValuesError",
            Self::AxisInformation { .. } => "GetAxisInformationError",
            Self::SvgSize => "SVGSizeError",
            Self::PlotSize { .. } => "PlotSizeError",
            Self::PlotLegend { .. } => "PlotLegendError",
            Self::SlabInformation => "SlabInformationError",
            Self::Scene(_) => "SceneError",
            Self::Render { stage, .. } => stage.error_name(),
            Self::Interaction { source, .. } => source.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChartError, PlotDirection, RenderStage};

    #[test]
    fn render_errors_keep_stage_name_and_inner_message() {
        let err = ChartError::render(
            RenderStage::Heatmap,
            ChartError::InvalidData("bins must be > 0".to_owned()),
        );
        assert_eq!(err.name(), "HeatmapError");
        assert_eq!(
            err.to_string(),
            "failed to draw heatmap: invalid data: bins must be > 0"
        );
    }

    #[test]
    fn interaction_errors_are_prefixed_with_the_operation() {
        let err = ChartError::interaction("zoom function", ChartError::Scene("gone".to_owned()));
        assert_eq!(err.to_string(), "error in zoom function: scene graph: gone");
    }

    #[test]
    fn plot_size_mentions_direction() {
        let err = ChartError::PlotSize {
            direction: PlotDirection::Vertical,
        };
        assert_eq!(err.name(), "PlotSizeError");
        assert!(err.to_string().contains("vertical"));
    }
}
