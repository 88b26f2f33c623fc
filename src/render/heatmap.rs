use tracing::trace;

use crate::api::{GeneralPlotSettings, PlotModel, VisualConfig};
use crate::core::{LinearScale, ValueRange, ZoomTransform, bin_by_x};
use crate::error::ChartResult;
use crate::render::{Datum, NodeId, NodeKind, Scene, SequentialColorScale, format_tick};

/// Gradient rows of the color legend.
const LEGEND_STEPS: usize = 32;

/// Drawn heatmap strip of one plot.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapNodes {
    pub group: NodeId,
    pub cells: Vec<NodeId>,
    /// Maps bin index `[0, n]` onto the plot width; zooming rescales it.
    pub index_scale: LinearScale,
}

/// Offset of the strip below the plot's own top.
#[must_use]
pub fn heatmap_offset(plot: &PlotModel, general: &GeneralPlotSettings, config: &VisualConfig) -> f64 {
    let x_axis = plot.format_settings.x_axis;
    let mut offset = general.plot_height + general.margins.bottom;
    if x_axis.labels() || x_axis.ticks() {
        offset += config.heatmap.margin;
    }
    if x_axis.labels() && x_axis.ticks() {
        offset += config.x_label_space;
    }
    offset
}

/// Bins the plot's points by x and draws one cell per bin colored by the
/// y spread inside it, plus the color legend right of the strip.
pub fn draw_heatmap(
    scene: &mut Scene,
    plot: &PlotModel,
    general: &GeneralPlotSettings,
    color_scheme: &str,
    bin_count: usize,
    config: &VisualConfig,
) -> ChartResult<HeatmapNodes> {
    let samples: Vec<(f64, f64)> = plot.drawable_points().map(|(_, x, y)| (x, y)).collect();
    let bins = bin_by_x(&samples, bin_count);
    let spread_range = ValueRange::from_values(bins.iter().filter_map(|b| b.spread))
        .unwrap_or_else(|| ValueRange::new(0.0, 0.0));
    let colors = SequentialColorScale::from_scheme(color_scheme, spread_range);
    let index_scale =
        LinearScale::new(0.0, bins.len() as f64)?.with_range(0.0, general.plot_width)?;

    let offset = heatmap_offset(plot, general, config);
    let root = scene.root();
    let group = scene.append(root, NodeKind::Group)?;
    scene.add_class(group, &format!("Heatmap{}", plot.plot_id))?;
    scene.set_attr(group, "width", general.plot_width)?;
    scene.set_attr(group, "height", general.plot_height)?;
    scene.set_attr(
        group,
        "transform",
        format!(
            "translate({},{})",
            general.margins.left,
            plot.plot_top + offset
        ),
    )?;

    let outline = scene.append(group, NodeKind::Rect)?;
    scene.set_attr(outline, "width", general.plot_width)?;
    scene.set_attr(outline, "height", config.heatmap.height)?;
    scene.set_attr(outline, "fill", "transparent")?;
    scene.set_attr(outline, "stroke", "#000000")?;

    let cell_group = scene.append(group, NodeKind::Group)?;
    scene.add_class(cell_group, "heatmapCells")?;
    scene.set_attr(cell_group, "clip-path", "url(#hclip)")?;
    let mut cells = Vec::with_capacity(bins.len());
    for (index, bin) in bins.iter().enumerate() {
        let cell = scene.append(cell_group, NodeKind::Rect)?;
        scene.add_class(cell, "heatmapCell")?;
        scene.set_attr(cell, "y", 0.0)?;
        scene.set_attr(cell, "height", config.heatmap.height)?;
        let fill = bin
            .spread
            .map_or_else(|| "transparent".to_owned(), |s| colors.color_for(s).to_hex());
        scene.set_attr(cell, "fill", fill)?;
        scene.bind(
            cell,
            Datum::HeatmapCell {
                plot_id: plot.plot_id,
                index,
            },
        )?;
        cells.push(cell);
    }
    let nodes = HeatmapNodes {
        group,
        cells,
        index_scale,
    };
    place_cells(scene, &nodes, index_scale)?;

    draw_heatmap_legend(scene, group, &colors, offset, general, config)?;
    trace!(plot_id = plot.plot_id, bins = bins.len(), "drew heatmap");
    Ok(nodes)
}

fn place_cells(scene: &mut Scene, nodes: &HeatmapNodes, scale: LinearScale) -> ChartResult<()> {
    for (index, &cell) in nodes.cells.iter().enumerate() {
        let x0 = scale.map(index as f64);
        let x1 = scale.map(index as f64 + 1.0);
        scene.set_attr(cell, "x", x0)?;
        scene.set_attr(cell, "width", x1 - x0)?;
    }
    Ok(())
}

/// Moves the cells horizontally for a zoom transform; bins stay as built.
pub fn update_heatmap(scene: &mut Scene, nodes: &HeatmapNodes, transform: ZoomTransform) -> ChartResult<()> {
    let scale = transform.rescale_x(nodes.index_scale)?;
    place_cells(scene, nodes, scale)
}

fn draw_heatmap_legend(
    scene: &mut Scene,
    parent: NodeId,
    colors: &SequentialColorScale,
    offset: f64,
    general: &GeneralPlotSettings,
    config: &VisualConfig,
) -> ChartResult<()> {
    let layout = config.heatmap;
    let legend_height = offset + layout.height;
    let legend = scene.append(parent, NodeKind::Group)?;
    scene.add_class(legend, "heatmapLegend")?;
    scene.set_attr(
        legend,
        "transform",
        format!("translate({},{})", general.plot_width + layout.legend_margin, -offset),
    )?;

    let step_height = legend_height / LEGEND_STEPS as f64;
    for step in 0..LEGEND_STEPS {
        let band = scene.append(legend, NodeKind::Rect)?;
        scene.set_attr(band, "x", 0.0)?;
        scene.set_attr(band, "y", step as f64 * step_height)?;
        scene.set_attr(band, "width", layout.legend_width)?;
        scene.set_attr(band, "height", step_height)?;
        let t = step as f64 / (LEGEND_STEPS - 1) as f64;
        scene.set_attr(band, "fill", colors.interpolate(t).to_hex())?;
    }

    let domain = colors.domain();
    let scale = LinearScale::from_range(domain)?.with_range(0.0, legend_height)?;
    let ticks = scene.append(legend, NodeKind::Group)?;
    scene.set_attr(ticks, "transform", format!("translate({},0)", layout.tick_translation))?;
    scene.set_attr(ticks, "font-size", 10.0)?;
    let count = layout.legend_tick_count.max(2);
    let tick_step = domain.span() / (count - 1) as f64;
    for i in 0..count {
        let value = domain.min + tick_step * i as f64;
        let y = scale.map(value).round();
        let tick = scene.append(ticks, NodeKind::Group)?;
        scene.add_class(tick, "tick")?;
        scene.set_attr(tick, "transform", format!("translate(0,{y})"))?;
        let line = scene.append(tick, NodeKind::Line)?;
        scene.set_attr(line, "stroke", "currentColor")?;
        scene.set_attr(line, "x1", layout.legend_width - layout.tick_translation)?;
        scene.set_attr(line, "x2", -layout.tick_translation)?;
        let text = scene.append(tick, NodeKind::Text)?;
        scene.set_attr(text, "x", 9.0)?;
        scene.set_attr(text, "dy", "0.32em")?;
        scene.set_text(text, format_tick(value, tick_step))?;
    }
    Ok(())
}
