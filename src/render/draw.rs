//! Projects a view model and its render state onto the scene.
//!
//! `draw_view_model` materializes one update, `rebind_zoom` moves the drawn
//! nodes after a zoom frame, and the hover helpers project tooltip state.

use tracing::{debug, trace, warn};

use crate::api::{LegendKind, PlotModel, PlotType, RolloutRectangles, SlabType, ViewModel, VisualConfig};
use crate::core::{LinearScale, ValueRange, ZoomTransform};
use crate::error::{ChartError, ChartResult, RenderStage};
use crate::interaction::{HoverState, HoveredPoint, LegendSelection, RenderState, base_y_scale};
use crate::render::{
    AxisNodes, AxisOrientation, Datum, HeatmapNodes, LegendLayout, NodeId, NodeKind, Scene,
    category_class, draw_axis, draw_heatmap, draw_legend, draw_rollout_legend,
    TextAnchor, estimate_text_width, update_axis, update_heatmap,
};

/// Class names the drawing code and the interaction callbacks agree on.
pub struct SceneClasses;

impl SceneClasses {
    pub const DOT: &'static str = "dot";
    pub const BAR: &'static str = "bar";
    pub const LINE: &'static str = "path";
    pub const SLABS: &'static str = "slabBars";
    pub const RULER: &'static str = "hover-line";
    pub const ROLLOUT: &'static str = "rollout";
    pub const TOOLTIP: &'static str = "tooltip";
    pub const PLOT_TITLE: &'static str = "plotTitle";
    pub const X_AXIS: &'static str = "xAxis";
    pub const Y_AXIS: &'static str = "yAxis";
    pub const X_LABEL: &'static str = "xLabel";
    pub const Y_LABEL: &'static str = "yLabel";

    /// Root group class of a plot, e.g. `LinePlot0`.
    #[must_use]
    pub fn plot(plot: &PlotModel) -> String {
        format!("{}{}", plot.plot_settings.plot_type.as_str(), plot.plot_id)
    }

    #[must_use]
    pub fn heatmap(plot_id: usize) -> String {
        format!("Heatmap{plot_id}")
    }
}

const CLIP: &str = "clip";
const SLAB_CLIP: &str = "slabClip";
const HEATMAP_CLIP: &str = "hclip";
const ROLLOUT_CLIP: &str = "rolloutClip";

const LINE_STROKE_WIDTH: f64 = 1.5;
const HOVER_OPACITY: f64 = 0.8;
const TOOLTIP_PADDING: f64 = 10.0;

/// Handles to the nodes of one drawn plot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotNodes {
    pub plot_id: usize,
    pub root: NodeId,
    pub x_axis: AxisNodes,
    pub y_axis: AxisNodes,
    pub slabs: Option<NodeId>,
    pub ruler: NodeId,
    /// Drawn circles with the index of their data point.
    pub points: Vec<(NodeId, usize)>,
    pub bars: Vec<(NodeId, usize)>,
    pub line: Option<NodeId>,
    pub heatmap: Option<HeatmapNodes>,
    pub dot_radius: f64,
}

/// Hidden tooltip box, shown while hovering a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooltipNodes {
    pub group: NodeId,
    pub background: NodeId,
    pub lines: NodeId,
}

/// Everything one `draw_view_model` call produced.
///
/// A plot whose drawing failed is `None` in `plots` and its error is kept
/// in `errors`; the other plots are drawn regardless.
#[derive(Debug, Default)]
pub struct RenderOutcome {
    pub plots: Vec<Option<PlotNodes>>,
    pub rollouts: Vec<(NodeId, usize)>,
    pub legends: Vec<LegendLayout>,
    pub tooltip: Option<TooltipNodes>,
    pub errors: Vec<ChartError>,
}

impl RenderOutcome {
    #[must_use]
    pub fn plot(&self, plot_id: usize) -> Option<&PlotNodes> {
        self.plots.get(plot_id).and_then(Option::as_ref)
    }

    fn record(&mut self, error: ChartError) {
        warn!(error = %error, name = error.name(), "render step failed");
        self.errors.push(error);
    }
}

fn at<T>(stage: RenderStage, result: ChartResult<T>) -> ChartResult<T> {
    result.map_err(|source| ChartError::render(stage, source))
}

/// Clears the scene and draws the whole view model.
pub fn draw_view_model(
    scene: &mut Scene,
    view_model: &ViewModel,
    state: &RenderState,
    selection: &LegendSelection,
    config: &VisualConfig,
) -> RenderOutcome {
    scene.clear();
    scene.set_size(view_model.svg_width, view_model.svg_height);
    let mut outcome = RenderOutcome::default();

    if let Err(err) = at(RenderStage::ClipPath, add_clip_paths(scene, view_model, state, config)) {
        outcome.record(err);
    }

    for plot in &view_model.plot_models {
        let nodes = match draw_plot(scene, plot, view_model, state, selection, config) {
            Ok(nodes) => Some(nodes),
            Err(err) => {
                outcome.record(err);
                if let Err(err) = discard_plot(scene, plot) {
                    outcome.record(err);
                }
                None
            }
        };
        outcome.plots.push(nodes);
    }

    if let Some(rollout) = &view_model.rollout_rectangles {
        match at(
            RenderStage::Rollout,
            draw_rollout_rectangles(scene, rollout, view_model, state.x_scale),
        ) {
            Ok(nodes) => outcome.rollouts = nodes,
            Err(err) => outcome.record(err),
        }
    }

    let legend_y = view_model.general.legend_y_position;
    let mut legend_end: Option<f64> = None;
    for legend in view_model.legends() {
        let start_x = legend_end.map_or(view_model.general.margins.left, |end| {
            end + config.legend_separation_margin
        });
        match at(
            RenderStage::Legend,
            draw_legend(scene, legend, selection, start_x, legend_y, config),
        ) {
            Ok(layout) => {
                legend_end = Some(layout.end_x);
                outcome.legends.push(layout);
            }
            Err(err) => outcome.record(err),
        }
    }
    if let Some(rollout) = &view_model.rollout_rectangles {
        let start_x = legend_end.map_or(view_model.general.margins.left, |end| {
            end + config.legend_separation_margin
        });
        match at(
            RenderStage::Legend,
            draw_rollout_legend(scene, rollout, start_x, legend_y, config),
        ) {
            Ok(layout) => outcome.legends.push(layout),
            Err(err) => outcome.record(err),
        }
    }

    match at(RenderStage::Tooltip, draw_tooltip(scene)) {
        Ok(nodes) => outcome.tooltip = Some(nodes),
        Err(err) => outcome.record(err),
    }

    debug!(
        plots = outcome.plots.iter().flatten().count(),
        failed = outcome.errors.len(),
        legends = outcome.legends.len(),
        "drew view model"
    );
    outcome
}

/// Erases one plot and draws it again with the current scales and legend
/// filter.
pub fn redraw_plot(
    scene: &mut Scene,
    outcome: &mut RenderOutcome,
    plot: &PlotModel,
    view_model: &ViewModel,
    state: &RenderState,
    selection: &LegendSelection,
    config: &VisualConfig,
) -> ChartResult<()> {
    discard_plot(scene, plot)?;
    let nodes = draw_plot(scene, plot, view_model, state, selection, config);
    let slot = plot.plot_id;
    if outcome.plots.len() <= slot {
        outcome.plots.resize(slot + 1, None);
    }
    let drawn = match nodes {
        Ok(nodes) => {
            outcome.plots[slot] = Some(nodes);
            Ok(())
        }
        Err(err) => {
            discard_plot(scene, plot)?;
            outcome.plots[slot] = None;
            Err(err)
        }
    };
    // The new plot group lands last; the tooltip has to stay on top of it.
    if let Some(tooltip) = &outcome.tooltip {
        scene.raise(tooltip.group)?;
    }
    drawn
}

fn discard_plot(scene: &mut Scene, plot: &PlotModel) -> ChartResult<()> {
    let classes = [SceneClasses::plot(plot), SceneClasses::heatmap(plot.plot_id)];
    for class in &classes {
        for id in scene.select_class(class) {
            // Skip nodes a removed parent already took with it.
            if scene.node(id).is_some() {
                scene.remove(id)?;
            }
        }
    }
    Ok(())
}

fn add_clip_paths(
    scene: &mut Scene,
    view_model: &ViewModel,
    state: &RenderState,
    config: &VisualConfig,
) -> ChartResult<()> {
    let general = &view_model.general;
    let (width, height) = (general.plot_width, general.plot_height);
    let margin = general.dot_margin;

    clip_rect(
        scene,
        CLIP,
        (-margin, -margin),
        (width + 2.0 * margin, height + 2.0 * margin),
    )?;
    clip_rect(scene, SLAB_CLIP, (0.0, 0.0), (width, height))?;
    clip_rect(
        scene,
        HEATMAP_CLIP,
        (0.0, 0.0),
        (width, config.heatmap.height),
    )?;
    if let Some(first) = view_model
        .rollout_rectangles
        .as_ref()
        .and_then(|r| r.rectangles.first())
    {
        clip_rect(
            scene,
            ROLLOUT_CLIP,
            (state.x_scale.map(first.x), first.y),
            (width, first.width),
        )?;
    }
    Ok(())
}

fn clip_rect(scene: &mut Scene, id: &str, (x, y): (f64, f64), (width, height): (f64, f64)) -> ChartResult<()> {
    let root = scene.root();
    let defs = scene.append(root, NodeKind::Defs)?;
    let clip = scene.append(defs, NodeKind::ClipPath)?;
    scene.set_attr(clip, "id", id)?;
    let rect = scene.append(clip, NodeKind::Rect)?;
    scene.set_attr(rect, "x", x)?;
    scene.set_attr(rect, "y", y)?;
    scene.set_attr(rect, "width", width)?;
    scene.set_attr(rect, "height", height)?;
    Ok(())
}

fn draw_plot(
    scene: &mut Scene,
    plot: &PlotModel,
    view_model: &ViewModel,
    state: &RenderState,
    selection: &LegendSelection,
    config: &VisualConfig,
) -> ChartResult<PlotNodes> {
    let general = &view_model.general;
    let (root, slab_group) = at(RenderStage::BasicPlot, build_basic_plot(scene, plot, view_model))?;

    let x_axis = at(
        RenderStage::XAxis,
        build_x_axis(scene, root, plot, view_model, state.x_scale, config),
    )?;
    let y_scale = at(RenderStage::YAxis, plot_y_scale(plot, state, general.plot_height))?;
    let y_axis = at(
        RenderStage::YAxis,
        build_y_axis(scene, root, plot, view_model, y_scale, config),
    )?;
    at(RenderStage::PlotTitle, add_plot_title(scene, root, plot, view_model))?;
    let ruler = at(RenderStage::VerticalRuler, add_vertical_ruler(scene, root, view_model))?;
    let slabs = at(
        RenderStage::Slabs,
        draw_slabs(scene, slab_group, plot, view_model, state.x_scale, y_scale),
    )?;

    let mut nodes = PlotNodes {
        plot_id: plot.plot_id,
        root,
        x_axis,
        y_axis,
        slabs,
        ruler,
        points: Vec::new(),
        bars: Vec::new(),
        line: None,
        heatmap: None,
        dot_radius: config.dot_radius,
    };
    at(
        RenderStage::DrawPlot,
        draw_points(scene, &mut nodes, plot, view_model, state, y_scale, selection, config),
    )?;

    if plot.plot_settings.show_heatmap {
        nodes.heatmap = Some(at(
            RenderStage::Heatmap,
            draw_heatmap(
                scene,
                plot,
                general,
                &view_model.color_settings.heatmap_color_scheme,
                view_model.heatmap_settings.heatmap_bins,
                config,
            ),
        )?);
        if let Some(heatmap) = &nodes.heatmap {
            at(
                RenderStage::Heatmap,
                update_heatmap(scene, heatmap, state.transform),
            )?;
        }
    }
    trace!(plot_id = plot.plot_id, points = nodes.points.len(), "drew plot");
    Ok(nodes)
}

fn plot_y_scale(plot: &PlotModel, state: &RenderState, plot_height: f64) -> ChartResult<LinearScale> {
    match state.y_scale(plot.plot_id) {
        Some(scale) => Ok(scale),
        None => base_y_scale(plot, plot_height),
    }
}

fn build_basic_plot(
    scene: &mut Scene,
    plot: &PlotModel,
    view_model: &ViewModel,
) -> ChartResult<(NodeId, NodeId)> {
    let general = &view_model.general;
    let root_node = scene.root();
    let root = scene.append(root_node, NodeKind::Group)?;
    scene.add_class(root, &SceneClasses::plot(plot))?;
    scene.set_attr(root, "width", general.plot_width)?;
    scene.set_attr(root, "height", general.plot_height)?;
    scene.set_attr(
        root,
        "transform",
        format!("translate({},{})", general.margins.left, plot.plot_top),
    )?;

    let slabs = scene.append(root, NodeKind::Group)?;
    scene.add_class(slabs, SceneClasses::SLABS)?;
    scene.set_attr(slabs, "clip-path", format!("url(#{SLAB_CLIP})"))?;
    Ok((root, slabs))
}

fn build_x_axis(
    scene: &mut Scene,
    root: NodeId,
    plot: &PlotModel,
    view_model: &ViewModel,
    x_scale: LinearScale,
    config: &VisualConfig,
) -> ChartResult<AxisNodes> {
    let general = &view_model.general;
    let information = plot.format_settings.x_axis;
    let axis = draw_axis(
        scene,
        root,
        SceneClasses::X_AXIS,
        AxisOrientation::Bottom,
        x_scale,
        config.x_tick_count,
        information.ticks(),
    )?;
    scene.set_attr(
        axis.group,
        "transform",
        format!("translate(0,{})", general.plot_height),
    )?;

    if information.labels() {
        let label = scene.append(root, NodeKind::Text)?;
        scene.add_class(label, SceneClasses::X_LABEL)?;
        scene.set_attr(label, "text-anchor", TextAnchor::End.as_str())?;
        scene.set_attr(label, "x", general.plot_width / 2.0)?;
        let below = if information.ticks() { 28.0 } else { 15.0 };
        scene.set_attr(label, "y", general.plot_height + below)?;
        scene.set_style(label, "font-size", general.font_size.clone())?;
        scene.set_text(label, plot.label_names.x_label.clone())?;
    }
    Ok(axis)
}

fn y_tick_count(plot_height: f64, config: &VisualConfig) -> usize {
    (plot_height / config.y_tick_spacing).floor().max(1.0) as usize
}

fn build_y_axis(
    scene: &mut Scene,
    root: NodeId,
    plot: &PlotModel,
    view_model: &ViewModel,
    y_scale: LinearScale,
    config: &VisualConfig,
) -> ChartResult<AxisNodes> {
    let general = &view_model.general;
    let information = plot.format_settings.y_axis;
    if information.labels() {
        let label = scene.append(root, NodeKind::Text)?;
        scene.add_class(label, SceneClasses::Y_LABEL)?;
        scene.set_attr(label, "text-anchor", TextAnchor::Middle.as_str())?;
        scene.set_attr(label, "y", -general.margins.left)?;
        scene.set_attr(label, "x", -general.plot_height / 2.0)?;
        scene.set_attr(label, "dy", "1em")?;
        scene.set_attr(label, "transform", "rotate(-90)")?;
        scene.set_style(label, "font-size", general.font_size.clone())?;
        scene.set_text(label, plot.label_names.y_label.clone())?;
    }
    draw_axis(
        scene,
        root,
        SceneClasses::Y_AXIS,
        AxisOrientation::Left,
        y_scale,
        y_tick_count(general.plot_height, config),
        information.ticks(),
    )
}

fn add_plot_title(
    scene: &mut Scene,
    root: NodeId,
    plot: &PlotModel,
    view_model: &ViewModel,
) -> ChartResult<()> {
    if !plot.plot_title_settings.has_title() {
        return Ok(());
    }
    let general = &view_model.general;
    let title = scene.append(root, NodeKind::Text)?;
    scene.add_class(title, SceneClasses::PLOT_TITLE)?;
    scene.set_attr(title, "x", 0.0)?;
    scene.set_attr(title, "y", -general.plot_title_height - general.margins.top)?;
    scene.set_attr(title, "dy", "1em")?;
    scene.set_style(title, "font-size", general.font_size.clone())?;
    scene.set_text(title, plot.plot_title_settings.title.clone())?;
    Ok(())
}

fn add_vertical_ruler(scene: &mut Scene, root: NodeId, view_model: &ViewModel) -> ChartResult<NodeId> {
    let group = scene.append(root, NodeKind::Group)?;
    scene.add_class(group, SceneClasses::RULER)?;
    let line = scene.append(group, NodeKind::Line)?;
    scene.set_attr(
        line,
        "stroke",
        view_model.color_settings.vertical_ruler_color.clone(),
    )?;
    scene.set_attr(line, "x1", 10.0)?;
    scene.set_attr(line, "x2", 10.0)?;
    scene.set_attr(line, "y1", 0.0)?;
    scene.set_attr(line, "y2", view_model.general.plot_height)?;
    scene.set_style(line, "opacity", 0.0)?;
    Ok(line)
}

/// Draws the overlay chosen for this plot; the slab group is dropped when
/// the plot has none or no slab columns were bound.
fn draw_slabs(
    scene: &mut Scene,
    group: NodeId,
    plot: &PlotModel,
    view_model: &ViewModel,
    x_scale: LinearScale,
    y_scale: LinearScale,
) -> ChartResult<Option<NodeId>> {
    let slab_type = plot.overlay_plot_settings.slab_type;
    let slabs = match (&view_model.slab_rectangles, slab_type) {
        (Some(slabs), SlabType::Rectangle | SlabType::Line) => slabs,
        _ => {
            scene.remove(group)?;
            return Ok(None);
        }
    };
    if slabs.is_empty() {
        return Err(ChartError::SlabInformation);
    }

    let color = view_model.color_settings.slab_color.clone();
    for (index, slab) in slabs.iter().enumerate() {
        let node = match slab_type {
            SlabType::Line => {
                let line = scene.append(group, NodeKind::Line)?;
                scene.set_attr(line, "stroke", color.clone())?;
                scene.set_attr(line, "y1", 0.0)?;
                scene.set_attr(line, "y2", view_model.general.plot_height)?;
                scene.set_style(line, "opacity", 1.0)?;
                line
            }
            _ => {
                let rect = scene.append(group, NodeKind::Rect)?;
                scene.set_attr(rect, "fill", "transparent")?;
                scene.set_attr(rect, "stroke", color.clone())?;
                rect
            }
        };
        scene.bind(node, Datum::Slab(index))?;
    }
    place_slabs(scene, group, view_model, x_scale, y_scale)?;
    Ok(Some(group))
}

fn place_slabs(
    scene: &mut Scene,
    group: NodeId,
    view_model: &ViewModel,
    x_scale: LinearScale,
    y_scale: LinearScale,
) -> ChartResult<()> {
    let Some(slabs) = &view_model.slab_rectangles else {
        return Ok(());
    };
    for &id in scene.children(group).to_vec().iter() {
        let Some(node) = scene.node(id) else {
            continue;
        };
        let (kind, Some(Datum::Slab(index))) = (node.kind, node.datum.clone()) else {
            continue;
        };
        let Some(slab) = slabs.get(index) else {
            continue;
        };
        let x = x_scale.map(slab.x);
        match kind {
            NodeKind::Line => {
                scene.set_attr(id, "x1", x)?;
                scene.set_attr(id, "x2", x)?;
            }
            _ => {
                scene.set_attr(id, "x", x)?;
                scene.set_attr(id, "width", x_scale.map(slab.x + slab.length) - x)?;
                scene.set_attr(id, "y", y_scale.map(slab.width - slab.y))?;
                scene.set_attr(id, "height", y_scale.map(slab.y) - y_scale.map(slab.width))?;
            }
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn draw_points(
    scene: &mut Scene,
    nodes: &mut PlotNodes,
    plot: &PlotModel,
    view_model: &ViewModel,
    state: &RenderState,
    y_scale: LinearScale,
    selection: &LegendSelection,
    config: &VisualConfig,
) -> ChartResult<()> {
    let dependent = plot.is_dependent(&config.dependent_marker);
    let visible: Vec<(usize, f64, f64)> = plot
        .drawable_points()
        .filter(|&(_, x, _)| {
            !dependent
                || selection.dependent_point_visible(
                    view_model.error_legend.as_ref(),
                    view_model.control_legend.as_ref(),
                    x,
                )
        })
        .collect();
    if dependent {
        nodes.dot_radius = config.dependent_dot_radius;
    }

    let x_scale = state.x_scale;
    match plot.plot_settings.plot_type {
        PlotType::Line => {
            let path = scene.append(nodes.root, NodeKind::Path)?;
            scene.add_class(path, SceneClasses::LINE)?;
            scene.set_attr(path, "d", line_path(&visible, x_scale, y_scale))?;
            scene.set_attr(path, "fill", "none")?;
            scene.set_attr(path, "stroke", plot.plot_settings.fill.clone())?;
            scene.set_attr(path, "stroke-width", LINE_STROKE_WIDTH)?;
            scene.set_attr(path, "clip-path", format!("url(#{CLIP})"))?;
            nodes.line = Some(path);
        }
        PlotType::Bar => {
            for &(index, _, _) in &visible {
                let bar = scene.append(nodes.root, NodeKind::Rect)?;
                scene.add_class(bar, SceneClasses::BAR)?;
                scene.set_attr(bar, "fill", plot.data_points[index].color.clone())?;
                scene.set_attr(bar, "clip-path", format!("url(#{CLIP})"))?;
                scene.bind(
                    bar,
                    Datum::Point {
                        plot_id: plot.plot_id,
                        index,
                    },
                )?;
                nodes.bars.push((bar, index));
            }
        }
        PlotType::Scatter => {}
    }

    let legend_classes = plot.plot_settings.use_legend_color;
    for &(index, x, _) in &visible {
        let point = &plot.data_points[index];
        let dot = scene.append(nodes.root, NodeKind::Circle)?;
        scene.add_class(dot, SceneClasses::DOT)?;
        if legend_classes {
            if let Some(category) = view_model
                .error_legend
                .as_ref()
                .and_then(|legend| legend.category_at(x))
            {
                scene.add_class(dot, &category_class(LegendKind::Error, category))?;
                scene.set_style(
                    dot,
                    "opacity",
                    selection.opacity(
                        LegendKind::Error,
                        category,
                        config.legend_unselected_opacity,
                    ),
                )?;
            }
        }
        scene.set_attr(dot, "fill", point.color.clone())?;
        scene.set_attr(dot, "stroke", "none")?;
        scene.set_attr(dot, "r", nodes.dot_radius)?;
        scene.set_attr(dot, "clip-path", format!("url(#{CLIP})"))?;
        scene.bind(
            dot,
            Datum::Point {
                plot_id: plot.plot_id,
                index,
            },
        )?;
        nodes.points.push((dot, index));
    }
    place_points(scene, nodes, plot, x_scale, y_scale)
}

fn line_path(points: &[(usize, f64, f64)], x_scale: LinearScale, y_scale: LinearScale) -> String {
    let mut d = String::new();
    for (i, &(_, x, y)) in points.iter().enumerate() {
        d.push(if i == 0 { 'M' } else { 'L' });
        d.push_str(&format!("{},{}", x_scale.map(x), y_scale.map(y)));
    }
    d
}

/// Baseline of bars: zero when inside the y-domain, else the nearest end.
fn bar_baseline(y_scale: LinearScale) -> f64 {
    let ValueRange { min, max } = y_scale.domain_extent();
    0.0_f64.clamp(min, max)
}

fn place_points(
    scene: &mut Scene,
    nodes: &PlotNodes,
    plot: &PlotModel,
    x_scale: LinearScale,
    y_scale: LinearScale,
) -> ChartResult<()> {
    let coordinates = |index: usize| plot.data_points.get(index).and_then(|p| p.xy());

    for &(dot, index) in &nodes.points {
        if let Some((x, y)) = coordinates(index) {
            scene.set_attr(dot, "cx", x_scale.map(x))?;
            scene.set_attr(dot, "cy", y_scale.map(y))?;
        }
    }

    let baseline = y_scale.map(bar_baseline(y_scale));
    for &(bar, index) in &nodes.bars {
        if let Some((x, y)) = coordinates(index) {
            let top = y_scale.map(y);
            scene.set_attr(bar, "x", x_scale.map(x) - nodes.dot_radius)?;
            scene.set_attr(bar, "width", 2.0 * nodes.dot_radius)?;
            scene.set_attr(bar, "y", top.min(baseline))?;
            scene.set_attr(bar, "height", (top - baseline).abs())?;
        }
    }

    if let Some(line) = nodes.line {
        let drawn: Vec<(usize, f64, f64)> = nodes
            .points
            .iter()
            .filter_map(|&(_, index)| coordinates(index).map(|(x, y)| (index, x, y)))
            .collect();
        scene.set_attr(line, "d", line_path(&drawn, x_scale, y_scale))?;
    }
    Ok(())
}

fn draw_rollout_rectangles(
    scene: &mut Scene,
    rollout: &RolloutRectangles,
    view_model: &ViewModel,
    x_scale: LinearScale,
) -> ChartResult<Vec<(NodeId, usize)>> {
    let root = scene.root();
    let group = scene.append(root, NodeKind::Group)?;
    scene.add_class(group, "rolloutRectangles")?;
    scene.set_attr(
        group,
        "transform",
        format!("translate({},0)", view_model.general.margins.left),
    )?;

    let mut nodes = Vec::with_capacity(rollout.rectangles.len());
    for (index, rectangle) in rollout.rectangles.iter().enumerate() {
        let rect = scene.append(group, NodeKind::Rect)?;
        scene.add_class(rect, SceneClasses::ROLLOUT)?;
        scene.set_attr(rect, "y", rectangle.y)?;
        scene.set_attr(rect, "height", rectangle.width)?;
        scene.set_attr(rect, "fill", rectangle.color())?;
        scene.set_attr(rect, "clip-path", format!("url(#{ROLLOUT_CLIP})"))?;
        scene.set_style(rect, "opacity", rollout.opacity)?;
        scene.bind(rect, Datum::Rollout(index))?;
        nodes.push((rect, index));
    }
    place_rollouts(scene, &nodes, rollout, x_scale)?;
    scene.lower(group)?;
    Ok(nodes)
}

fn place_rollouts(
    scene: &mut Scene,
    nodes: &[(NodeId, usize)],
    rollout: &RolloutRectangles,
    x_scale: LinearScale,
) -> ChartResult<()> {
    for &(rect, index) in nodes {
        if let Some(rectangle) = rollout.rectangles.get(index) {
            let x = x_scale.map(rectangle.x);
            scene.set_attr(rect, "x", x)?;
            scene.set_attr(rect, "width", x_scale.map(rectangle.x + rectangle.length) - x)?;
        }
    }
    Ok(())
}

/// Moves every drawn element to the scales of `state`.
///
/// Heatmap cells follow `transform` directly because their scale maps bin
/// indices, not x-values.
pub fn rebind_zoom(
    scene: &mut Scene,
    outcome: &RenderOutcome,
    view_model: &ViewModel,
    state: &RenderState,
) -> ChartResult<()> {
    let x_scale = state.x_scale;
    if let Some(rollout) = &view_model.rollout_rectangles {
        place_rollouts(scene, &outcome.rollouts, rollout, x_scale)?;
    }

    for nodes in outcome.plots.iter().flatten() {
        let Some(plot) = view_model.plot(nodes.plot_id) else {
            continue;
        };
        let y_scale = plot_y_scale(plot, state, view_model.general.plot_height)?;
        update_axis(scene, &nodes.x_axis, x_scale)?;
        update_axis(scene, &nodes.y_axis, y_scale)?;
        place_points(scene, nodes, plot, x_scale, y_scale)?;
        if let Some(group) = nodes.slabs {
            place_slabs(scene, group, view_model, x_scale, y_scale)?;
        }
        if let Some(heatmap) = &nodes.heatmap {
            update_heatmap(scene, heatmap, state.transform)?;
        }
    }
    trace!(k = state.transform.k, x = state.transform.x, "rebound zoom");
    Ok(())
}

fn draw_tooltip(scene: &mut Scene) -> ChartResult<TooltipNodes> {
    let root = scene.root();
    let group = scene.append(root, NodeKind::Group)?;
    scene.add_class(group, SceneClasses::TOOLTIP)?;
    scene.set_style(group, "visibility", "hidden")?;

    let background = scene.append(group, NodeKind::Rect)?;
    scene.set_attr(background, "rx", 5.0)?;
    scene.set_attr(background, "fill", "#484848")?;
    scene.set_attr(background, "stroke", "#000000")?;
    scene.set_attr(background, "stroke-width", 1.0)?;
    let lines = scene.append(group, NodeKind::Group)?;
    Ok(TooltipNodes {
        group,
        background,
        lines,
    })
}

/// Size of the tooltip box holding `lines`.
#[must_use]
pub fn tooltip_size(lines: &[String], config: &VisualConfig) -> (f64, f64) {
    let line_height = config.font_size_px + 4.0;
    let text_width = lines
        .iter()
        .map(|line| estimate_text_width(line, config.font_size_px))
        .fold(0.0, f64::max);
    (
        text_width + 2.0 * TOOLTIP_PADDING,
        lines.len().max(1) as f64 * line_height + 2.0 * TOOLTIP_PADDING,
    )
}

fn set_rulers_opacity(scene: &mut Scene, outcome: &RenderOutcome, opacity: f64) -> ChartResult<()> {
    for nodes in outcome.plots.iter().flatten() {
        scene.set_style(nodes.ruler, "opacity", opacity)?;
    }
    Ok(())
}

fn hovered_dot(outcome: &RenderOutcome, point: HoveredPoint) -> Option<(NodeId, f64)> {
    let nodes = outcome.plot(point.plot_id)?;
    nodes
        .points
        .iter()
        .find(|(_, index)| *index == point.index)
        .map(|&(dot, _)| (dot, nodes.dot_radius))
}

/// Pointer entered a point: enlarge it, show the rulers and the box.
pub fn show_hover(scene: &mut Scene, outcome: &RenderOutcome, point: HoveredPoint) -> ChartResult<()> {
    if let Some((dot, radius)) = hovered_dot(outcome, point) {
        scene.set_attr(dot, "r", radius * 2.0)?;
        scene.set_style(dot, "stroke", "black")?;
        scene.set_style(dot, "opacity", 1.0)?;
    }
    set_rulers_opacity(scene, outcome, 1.0)?;
    if let Some(tooltip) = outcome.tooltip {
        scene.set_style(tooltip.group, "visibility", "visible")?;
    }
    Ok(())
}

/// Writes the tooltip lines, places the box and moves every ruler.
pub fn move_hover(
    scene: &mut Scene,
    outcome: &RenderOutcome,
    hover: &HoverState,
    config: &VisualConfig,
) -> ChartResult<()> {
    if let Some(tooltip) = outcome.tooltip {
        scene.remove_children(tooltip.lines)?;
        let line_height = config.font_size_px + 4.0;
        for (i, line) in hover.lines.iter().enumerate() {
            let text = scene.append(tooltip.lines, NodeKind::Text)?;
            scene.set_attr(text, "x", TOOLTIP_PADDING)?;
            scene.set_attr(text, "y", TOOLTIP_PADDING + line_height * (i as f64 + 1.0))?;
            scene.set_style(text, "fill", "#F0F0F0")?;
            scene.set_style(text, "font-size", config.font_size())?;
            scene.set_text(text, line.clone())?;
        }
        let (width, height) = tooltip_size(&hover.lines, config);
        scene.set_attr(tooltip.background, "width", width)?;
        scene.set_attr(tooltip.background, "height", height)?;
        if let Some(placement) = hover.placement {
            scene.set_attr(
                tooltip.group,
                "transform",
                format!("translate({},{})", placement.left, placement.top),
            )?;
        }
    }

    if let Some(x) = hover.ruler_x {
        for nodes in outcome.plots.iter().flatten() {
            scene.set_attr(nodes.ruler, "x1", x)?;
            scene.set_attr(nodes.ruler, "x2", x)?;
        }
    }
    Ok(())
}

/// Pointer left the point: restore it, hide rulers and box.
pub fn hide_hover(scene: &mut Scene, outcome: &RenderOutcome, point: HoveredPoint) -> ChartResult<()> {
    if let Some(tooltip) = outcome.tooltip {
        scene.set_style(tooltip.group, "visibility", "hidden")?;
    }
    if let Some((dot, radius)) = hovered_dot(outcome, point) {
        scene.set_attr(dot, "r", radius)?;
        scene.set_style(dot, "stroke", "none")?;
        scene.set_style(dot, "opacity", HOVER_OPACITY)?;
    }
    set_rulers_opacity(scene, outcome, 0.0)
}

/// Clears the scene and shows `error` instead of the chart.
pub fn draw_error_panel(scene: &mut Scene, error: &ChartError) -> ChartResult<()> {
    scene.clear();
    let root = scene.root();
    let headline = scene.append(root, NodeKind::Text)?;
    scene.add_class(headline, "errorName")?;
    scene.set_attr(headline, "x", 0.0)?;
    scene.set_attr(headline, "y", 20.0)?;
    scene.set_text(headline, format!("ERROR: {}", error.name()))?;

    let message = scene.append(root, NodeKind::Text)?;
    scene.add_class(message, "errorMessage")?;
    scene.set_attr(message, "x", 0.0)?;
    scene.set_attr(message, "y", 30.0)?;
    scene.set_style(message, "font-size", "12px")?;
    scene.set_text(message, error.to_string())?;
    Ok(())
}
