mod axis;
#[cfg(feature = "cairo-backend")]
mod cairo_backend;
mod color_scheme;
mod draw;
mod heatmap;
mod legend;
mod null_renderer;
mod primitives;
mod scene;
mod svg;

#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoContextRenderer, CairoRenderStats, CairoRenderer};
pub use axis::{AxisNodes, AxisOrientation, draw_axis, format_tick, update_axis};
pub use color_scheme::SequentialColorScale;
pub use draw::{
    PlotNodes, RenderOutcome, SceneClasses, TooltipNodes, draw_error_panel, draw_view_model,
    hide_hover, move_hover, rebind_zoom, redraw_plot, show_hover, tooltip_size,
};
pub use heatmap::{HeatmapNodes, draw_heatmap, heatmap_offset, update_heatmap};
pub use legend::{
    LEGEND_ENTRY_CLASS, LegendLayout, category_class, draw_legend, draw_rollout_legend,
    set_category_opacity,
};
pub use null_renderer::NullRenderer;
pub use primitives::{Color, TextAnchor, estimate_text_width};
pub use scene::{AttrValue, Datum, NodeId, NodeKind, Scene, SceneNode};
pub use svg::SvgRenderer;

use crate::error::ChartResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive the fully materialized `Scene` so drawing code stays
/// isolated from the data pipeline and interaction logic.
pub trait Renderer {
    fn render(&mut self, scene: &Scene) -> ChartResult<()>;
}
