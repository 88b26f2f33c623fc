use crate::core::LinearScale;
use crate::error::ChartResult;
use crate::render::{NodeId, NodeKind, Scene, TextAnchor};

const TICK_SIZE: f64 = 6.0;
const TICK_PADDING: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrientation {
    /// Horizontal axis with ticks below the line.
    Bottom,
    /// Vertical axis with ticks left of the line.
    Left,
}

/// Handle to a drawn axis so zooming can regenerate its ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisNodes {
    pub group: NodeId,
    pub orientation: AxisOrientation,
    pub tick_count: usize,
    pub show_ticks: bool,
}

/// Appends an axis group under `parent` and draws it for `scale`.
///
/// Without ticks only the domain line is drawn.
pub fn draw_axis(
    scene: &mut Scene,
    parent: NodeId,
    class: &str,
    orientation: AxisOrientation,
    scale: LinearScale,
    tick_count: usize,
    show_ticks: bool,
) -> ChartResult<AxisNodes> {
    let group = scene.append(parent, NodeKind::Group)?;
    scene.add_class(group, class)?;
    let axis = AxisNodes {
        group,
        orientation,
        tick_count,
        show_ticks,
    };
    update_axis(scene, &axis, scale)?;
    Ok(axis)
}

/// Redraws domain line and ticks of `axis` for a new scale.
pub fn update_axis(scene: &mut Scene, axis: &AxisNodes, scale: LinearScale) -> ChartResult<()> {
    scene.remove_children(axis.group)?;
    let group = axis.group;
    scene.set_attr(group, "fill", "none")?;
    scene.set_attr(group, "font-size", 10.0)?;
    scene.set_attr(group, "font-family", "sans-serif")?;
    scene.set_attr(
        group,
        "text-anchor",
        match axis.orientation {
            AxisOrientation::Bottom => TextAnchor::Middle,
            AxisOrientation::Left => TextAnchor::End,
        }
        .as_str(),
    )?;

    let (r0, r1) = scale.range();
    let domain = scene.append(group, NodeKind::Path)?;
    scene.add_class(domain, "domain")?;
    scene.set_attr(domain, "stroke", "currentColor")?;
    let d = match axis.orientation {
        AxisOrientation::Bottom => format!("M{r0},{TICK_SIZE}V0H{r1}V{TICK_SIZE}"),
        AxisOrientation::Left => format!("M-{TICK_SIZE},{r0}H0V{r1}H-{TICK_SIZE}"),
    };
    scene.set_attr(domain, "d", d)?;
    if !axis.show_ticks {
        return Ok(());
    }

    let step = scale.tick_step(axis.tick_count);
    for value in scale.ticks(axis.tick_count) {
        let position = scale.map(value);
        let tick = scene.append(group, NodeKind::Group)?;
        scene.add_class(tick, "tick")?;
        scene.set_attr(tick, "opacity", 1.0)?;

        let line = scene.append(tick, NodeKind::Line)?;
        scene.set_attr(line, "stroke", "currentColor")?;
        let text = scene.append(tick, NodeKind::Text)?;
        scene.set_attr(text, "fill", "currentColor")?;
        scene.set_text(text, format_tick(value, step))?;

        match axis.orientation {
            AxisOrientation::Bottom => {
                scene.set_attr(tick, "transform", format!("translate({position},0)"))?;
                scene.set_attr(line, "y2", TICK_SIZE)?;
                scene.set_attr(text, "y", TICK_SIZE + TICK_PADDING)?;
                scene.set_attr(text, "dy", "0.71em")?;
            }
            AxisOrientation::Left => {
                scene.set_attr(tick, "transform", format!("translate(0,{position})"))?;
                scene.set_attr(line, "x2", -TICK_SIZE)?;
                scene.set_attr(text, "x", -(TICK_SIZE + TICK_PADDING))?;
                scene.set_attr(text, "dy", "0.32em")?;
            }
        }
    }
    Ok(())
}

/// Tick label with as many decimals as `step` needs and thousands grouping.
#[must_use]
pub fn format_tick(value: f64, step: f64) -> String {
    let precision = if step.is_finite() && step > 0.0 {
        decimal_exponent(step).min(0).unsigned_abs() as usize
    } else {
        0
    };
    let text = format!("{:.*}", precision, value.abs());
    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(text.len() + integer.len() / 3 + 1);
    let negative = value < 0.0 && text.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    if negative {
        grouped.push('-');
    }
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

/// Power of ten of the leading digit, read from the exact decimal form.
fn decimal_exponent(value: f64) -> i32 {
    format!("{value:e}")
        .split_once('e')
        .and_then(|(_, exponent)| exponent.parse().ok())
        .unwrap_or(0)
}
