use crate::api::{Legend, LegendKind, RolloutRectangles, RolloutStatus, VisualConfig};
use crate::error::ChartResult;
use crate::interaction::LegendSelection;
use crate::render::{Datum, NodeId, NodeKind, Scene, estimate_text_width};

pub const LEGEND_ENTRY_CLASS: &str = "legendEntry";

const TITLE_GAP: f64 = 15.0;
const ENTRY_GAP: f64 = 25.0;
const DOT_TEXT_GAP: f64 = 10.0;
const ROW_OFFSET: f64 = 10.0;

/// Horizontal extent of one drawn legend.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendLayout {
    /// `None` for the rollout legend.
    pub kind: Option<LegendKind>,
    pub group: NodeId,
    pub start_x: f64,
    pub end_x: f64,
    /// Dot center per entry, in entry order.
    pub dot_x: Vec<f64>,
}

/// Class shared by every element tagged with a category of one legend.
///
/// Category values are free text, so anything outside `[A-Za-z0-9_-]` is
/// replaced to keep the class a single token.
#[must_use]
pub fn category_class(kind: LegendKind, category: &str) -> String {
    let mut class = String::with_capacity(category.len() + 4);
    class.push_str(match kind {
        LegendKind::Error => "cat-",
        LegendKind::Control => "ctl-",
    });
    class.extend(category.chars().map(|c| {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            c
        } else {
            '_'
        }
    }));
    class
}

fn legend_class(kind: LegendKind) -> &'static str {
    match kind {
        LegendKind::Error => "errorLegend",
        LegendKind::Control => "controlLegend",
    }
}

/// Title then one dot + label per category, left to right from `start_x`.
pub fn draw_legend(
    scene: &mut Scene,
    legend: &Legend,
    selection: &LegendSelection,
    start_x: f64,
    legend_y: f64,
    config: &VisualConfig,
) -> ChartResult<LegendLayout> {
    let root = scene.root();
    let group = scene.append(root, NodeKind::Group)?;
    scene.add_class(group, legend_class(legend.kind))?;
    let y = legend_y + ROW_OFFSET;

    let mut width = start_x;
    width = legend_title(scene, group, &legend.title, width, y, config)?;

    let mut dot_x = Vec::with_capacity(legend.values.len());
    for value in &legend.values {
        let class = format!(
            "{LEGEND_ENTRY_CLASS} {}",
            category_class(legend.kind, &value.value)
        );
        let opacity = selection.opacity(
            legend.kind,
            &value.value,
            config.legend_unselected_opacity,
        );

        let text = scene.append(group, NodeKind::Text)?;
        scene.set_text(text, value.value.clone())?;
        scene.add_class(text, &class)?;
        scene.set_attr(text, "x", DOT_TEXT_GAP + width)?;
        scene.set_attr(text, "y", y)?;
        scene.set_style(text, "alignment-baseline", "middle")?;
        scene.set_style(text, "font-size", config.font_size())?;
        scene.set_style(text, "opacity", opacity)?;
        scene.bind(text, Datum::LegendEntry(value.value.clone()))?;

        let dot = scene.append(group, NodeKind::Circle)?;
        scene.add_class(dot, &class)?;
        scene.set_attr(dot, "cx", width)?;
        scene.set_attr(dot, "cy", y)?;
        scene.set_attr(dot, "r", config.legend_dot_radius)?;
        scene.set_style(dot, "fill", value.color.clone())?;
        scene.set_style(dot, "stroke", "grey")?;
        scene.set_style(dot, "opacity", opacity)?;
        scene.bind(dot, Datum::LegendEntry(value.value.clone()))?;

        dot_x.push(width);
        width += ENTRY_GAP + estimate_text_width(&value.value, config.font_size_px);
    }

    Ok(LegendLayout {
        kind: Some(legend.kind),
        group,
        start_x,
        end_x: width,
        dot_x,
    })
}

/// Status legend of the rollout bands; not clickable.
pub fn draw_rollout_legend(
    scene: &mut Scene,
    rollout: &RolloutRectangles,
    start_x: f64,
    legend_y: f64,
    config: &VisualConfig,
) -> ChartResult<LegendLayout> {
    let root = scene.root();
    let group = scene.append(root, NodeKind::Group)?;
    scene.add_class(group, "rolloutLegend")?;
    let y = legend_y + ROW_OFFSET;

    let mut width = legend_title(scene, group, &rollout.name, start_x, y, config)?;
    let mut dot_x = Vec::with_capacity(RolloutStatus::ALL.len());
    for status in RolloutStatus::ALL {
        let text = scene.append(group, NodeKind::Text)?;
        scene.set_text(text, status.label())?;
        scene.set_attr(text, "x", DOT_TEXT_GAP + width)?;
        scene.set_attr(text, "y", y)?;
        scene.set_style(text, "alignment-baseline", "middle")?;
        scene.set_style(text, "font-size", config.font_size())?;

        let dot = scene.append(group, NodeKind::Circle)?;
        scene.set_attr(dot, "cx", width)?;
        scene.set_attr(dot, "cy", y)?;
        scene.set_attr(dot, "r", config.legend_dot_radius)?;
        scene.set_style(dot, "fill", status.color())?;
        scene.set_style(dot, "stroke", "grey")?;
        scene.set_style(dot, "opacity", rollout.opacity * 2.0)?;

        dot_x.push(width);
        width += ENTRY_GAP + estimate_text_width(status.label(), config.font_size_px);
    }

    Ok(LegendLayout {
        kind: None,
        group,
        start_x,
        end_x: width,
        dot_x,
    })
}

fn legend_title(
    scene: &mut Scene,
    group: NodeId,
    title: &str,
    x: f64,
    y: f64,
    config: &VisualConfig,
) -> ChartResult<f64> {
    let text = scene.append(group, NodeKind::Text)?;
    scene.add_class(text, "legendTitle")?;
    scene.set_text(text, title)?;
    scene.set_attr(text, "x", x)?;
    scene.set_attr(text, "y", y)?;
    scene.set_style(text, "alignment-baseline", "middle")?;
    scene.set_style(text, "font-size", config.font_size())?;
    Ok(x + estimate_text_width(title, config.font_size_px) + TITLE_GAP)
}

/// Sets the opacity of every element tagged with `category`: the legend
/// entry and, for the error legend, the points colored by it.
pub fn set_category_opacity(
    scene: &mut Scene,
    kind: LegendKind,
    category: &str,
    opacity: f64,
) -> ChartResult<()> {
    for id in scene.select_class(&category_class(kind, category)) {
        scene.set_style(id, "opacity", opacity)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::category_class;
    use crate::api::LegendKind;

    #[test]
    fn category_classes_are_single_tokens() {
        assert_eq!(category_class(LegendKind::Error, "OZE"), "cat-OZE");
        assert_eq!(
            category_class(LegendKind::Error, "no defect / ok"),
            "cat-no_defect___ok"
        );
        assert_eq!(category_class(LegendKind::Control, "OZE"), "ctl-OZE");
    }
}
