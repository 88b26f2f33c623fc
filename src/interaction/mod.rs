//! Interaction state: zoom scales, legend filters and tooltip hover.
//!
//! Every state here is a value. Event handlers compute the next value with a
//! pure function and the render layer projects it onto the scene.

mod legend;
mod tooltip;
mod zoom;

pub use legend::{CategorySelection, LegendEvent, LegendSelection};
pub use tooltip::{HoverState, HoveredPoint, TooltipPlacement, place_tooltip, tooltip_lines};
pub use zoom::{RenderState, ZoomPhase, apply_zoom, base_y_scale};
