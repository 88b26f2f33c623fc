use tracing::{debug, trace};

use crate::core::PrimitiveValue;

/// Overlay spanning `[x, x + length]` and `[y, y + width]` in data units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlabRectangle {
    pub x: f64,
    pub length: f64,
    pub width: f64,
    pub y: f64,
}

/// Pairs the slab columns with the x-values.
///
/// Rectangle `i` starts at `x[i]`, spans `slab_x[i]` along x and `slab_y[i]`
/// along y. Both columns must be non-empty and of equal length. Rectangles
/// with a missing or non-positive x or width are dropped; `None` when
/// nothing remains.
#[must_use]
pub fn build_slab_rectangles(
    slab_x: &[PrimitiveValue],
    slab_y: &[PrimitiveValue],
    x_values: &[f64],
) -> Option<Vec<SlabRectangle>> {
    if slab_x.len() != slab_y.len() || slab_y.is_empty() {
        if !slab_x.is_empty() || !slab_y.is_empty() {
            trace!(
                slab_x = slab_x.len(),
                slab_y = slab_y.len(),
                "slab columns differ in length, skipping slabs"
            );
        }
        return None;
    }

    let rectangles: Vec<SlabRectangle> = slab_x
        .iter()
        .zip(slab_y)
        .enumerate()
        .filter_map(|(i, (length, width))| {
            let x = x_values.get(i).copied()?;
            let width = width.as_f64()?;
            (x > 0.0 && width > 0.0).then(|| SlabRectangle {
                x,
                length: length.as_f64().unwrap_or(0.0),
                width,
                y: 0.0,
            })
        })
        .collect();

    debug!(rectangles = rectangles.len(), "built slab rectangles");
    (!rectangles.is_empty()).then_some(rectangles)
}
