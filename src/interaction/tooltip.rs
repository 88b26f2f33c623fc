use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::api::TooltipModel;

/// `title : value` lines of every tooltip row at `x`, first occurrence kept.
#[must_use]
pub fn tooltip_lines(models: &[TooltipModel], x: f64) -> Vec<String> {
    let mut lines: IndexSet<String> = IndexSet::new();
    for model in models {
        for point in model.points_at(x) {
            let value = point.value.as_deref().unwrap_or("-");
            lines.insert(format!("{} : {value}", model.title));
        }
    }
    lines.into_iter().collect()
}

/// Top-left corner of the tooltip box in svg coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TooltipPlacement {
    pub left: f64,
    pub top: f64,
}

/// Places the box on the side of the pointer facing the svg center.
///
/// The box never leaves the svg vertically.
#[must_use]
pub fn place_tooltip(
    pointer: (f64, f64),
    size: (f64, f64),
    svg_size: (f64, f64),
    offset: f64,
) -> TooltipPlacement {
    let (x, y) = pointer;
    let (width, height) = size;
    let (svg_width, svg_height) = svg_size;

    let left = if x > svg_width / 2.0 {
        x - width - offset
    } else {
        x + offset
    };
    let top = if y > svg_height / 2.0 {
        y - height - offset
    } else {
        y + offset
    };
    TooltipPlacement {
        left,
        top: top.min(svg_height - height).max(0.0),
    }
}

/// Point currently under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoveredPoint {
    pub plot_id: usize,
    pub index: usize,
}

/// Tooltip and ruler state between pointer events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HoverState {
    pub hovered: Option<HoveredPoint>,
    pub lines: Vec<String>,
    pub placement: Option<TooltipPlacement>,
    /// Ruler position relative to the plot area.
    pub ruler_x: Option<f64>,
}

impl HoverState {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.hovered.is_some()
    }

    #[must_use]
    pub fn over(point: HoveredPoint) -> Self {
        Self {
            hovered: Some(point),
            ..Self::default()
        }
    }

    /// Fills lines, box placement and ruler for a pointer move over the
    /// hovered point.
    #[must_use]
    pub fn moved(
        self,
        lines: Vec<String>,
        placement: TooltipPlacement,
        ruler_x: f64,
    ) -> Self {
        Self {
            lines,
            placement: Some(placement),
            ruler_x: Some(ruler_x),
            ..self
        }
    }
}
