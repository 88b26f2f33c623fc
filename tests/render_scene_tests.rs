use approx::assert_relative_eq;
use multiplot_rs::api::{
    DataView, DataViewColumn, DefaultIdentityService, LegendKind, MetadataColumn, RoleName, SettingsBag,
    SettingsCategory, ViewModel, VisualConfig, keys, visual_transform,
};
use multiplot_rs::core::{PrimitiveValue, Viewport, ZoomTransform};
use multiplot_rs::error::{ChartError, RenderStage};
use multiplot_rs::interaction::{LegendEvent, LegendSelection, RenderState, apply_zoom};
use multiplot_rs::render::{
    NodeKind, Renderer, Scene, SceneClasses, SvgRenderer, draw_error_panel, draw_view_model,
    rebind_zoom, redraw_plot,
};

const LEN: usize = 10;

fn column(name: &str, index: usize, role: RoleName, values: Vec<PrimitiveValue>) -> DataViewColumn {
    DataViewColumn::new(MetadataColumn::new(name, index).with_role(role, None), values)
}

fn numbers(f: impl Fn(usize) -> f64) -> Vec<PrimitiveValue> {
    (0..LEN).map(|i| PrimitiveValue::from(f(i))).collect()
}

fn labels(f: impl Fn(usize) -> &'static str) -> Vec<PrimitiveValue> {
    (0..LEN).map(|i| PrimitiveValue::from(f(i))).collect()
}

/// Line plot with rectangle slabs above a dependent bar plot with a heatmap,
/// plus both legends and a rollout column.
fn full_data_view() -> DataView {
    let line = DataViewColumn::new(
        MetadataColumn::new("temp", 1)
            .with_role(RoleName::YAxis, Some(0))
            .with_objects(SettingsBag::new().with(
                SettingsCategory::OverlayPlotSettings,
                keys::SLAB_TYPE,
                "Rectangle",
            )),
        numbers(|i| (i as f64).sin() * 10.0 + 20.0),
    );
    let bars = DataViewColumn::new(
        MetadataColumn::new("pressure DEF", 2)
            .with_role(RoleName::YAxis, Some(1))
            .with_objects(
                SettingsBag::new()
                    .with(SettingsCategory::PlotSettings, keys::PLOT_TYPE, "BarPlot")
                    .with(SettingsCategory::PlotSettings, keys::USE_LEGEND_COLOR, true)
                    .with(SettingsCategory::PlotSettings, keys::SHOW_HEATMAP, true),
            ),
        numbers(|i| (i * 3 % 7) as f64),
    );
    DataView::from_columns(
        vec![
            column("time", 0, RoleName::XAxis, numbers(|i| (i + 1) as f64)),
            column(
                "defect",
                3,
                RoleName::Legend,
                labels(|i| if i % 2 == 0 { "OZE" } else { "GZE" }),
            ),
            column(
                "control",
                4,
                RoleName::ControlLegend,
                labels(|i| if i < 5 { "A" } else { "B" }),
            ),
        ],
        vec![
            line,
            bars,
            column("slab length", 5, RoleName::SlabX, numbers(|_| 0.5)),
            column("slab width", 6, RoleName::SlabY, numbers(|i| (i % 3) as f64)),
            column(
                "rollout",
                7,
                RoleName::Rollout,
                numbers(|i| if i < 4 { 0.0 } else { 2.0 }),
            ),
        ],
        None,
    )
}

fn view_model() -> ViewModel {
    visual_transform(
        &full_data_view(),
        Viewport::new(800.0, 600.0),
        &DefaultIdentityService,
        &VisualConfig::default(),
    )
    .expect("view model")
}

fn synced_selection(view_model: &ViewModel) -> LegendSelection {
    view_model
        .legends()
        .fold(LegendSelection::new(), |selection, legend| {
            selection.reduce(&LegendEvent::Sync {
                kind: legend.kind,
                categories: legend.categories().map(str::to_owned).collect(),
            })
        })
}

#[test]
fn full_view_model_draws_every_layer() {
    let view_model = view_model();
    let config = VisualConfig::default();
    let state = RenderState::new(&view_model).expect("state");
    let selection = synced_selection(&view_model);
    let mut scene = Scene::new(0.0, 0.0);

    let outcome = draw_view_model(&mut scene, &view_model, &state, &selection, &config);
    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    assert_eq!(scene.size(), (800.0, 600.0));

    assert_eq!(scene.select_class("LinePlot0").len(), 1);
    assert_eq!(scene.select_class("BarPlot1").len(), 1);
    assert_eq!(scene.select_class("Heatmap1").len(), 1);
    assert_eq!(scene.select_class(SceneClasses::PLOT_TITLE).len(), 2);
    assert_eq!(scene.select_class(SceneClasses::RULER).len(), 2);

    let line = outcome.plot(0).expect("line plot");
    assert!(line.slabs.is_some());
    assert!(line.line.is_some());
    assert_eq!(line.points.len(), LEN);
    // Slabs with zero width are dropped.
    let slab_rects = scene
        .children(line.slabs.expect("slab group"))
        .iter()
        .filter(|id| scene.node(**id).is_some_and(|n| n.kind == NodeKind::Rect))
        .count();
    assert_eq!(slab_rects, view_model.slab_rectangles.as_ref().map_or(0, Vec::len));

    let bars = outcome.plot(1).expect("bar plot");
    assert!(bars.slabs.is_none());
    assert_eq!(bars.bars.len(), LEN);
    assert_eq!(bars.points.len(), LEN);
    assert_relative_eq!(bars.dot_radius, config.dependent_dot_radius);
    assert!(bars.heatmap.as_ref().is_some_and(|h| !h.cells.is_empty()));

    // Legend entry text and dot plus the error-colored points.
    assert_eq!(scene.select_class("cat-OZE").len(), 2 + LEN / 2);
    assert_eq!(scene.select_class("ctl-A").len(), 2);

    assert_eq!(outcome.legends.len(), 3);
    assert_relative_eq!(outcome.legends[0].start_x, view_model.general.margins.left);
    for pair in outcome.legends.windows(2) {
        assert_relative_eq!(
            pair[1].start_x,
            pair[0].end_x + config.legend_separation_margin
        );
    }
    assert!(outcome.legends[2].kind.is_none());
    assert_eq!(
        outcome.rollouts.len(),
        view_model
            .rollout_rectangles
            .as_ref()
            .map_or(0, |r| r.rectangles.len())
    );
    assert!(outcome.tooltip.is_some());

    let mut renderer = SvgRenderer::new();
    renderer.render(&scene).expect("svg");
    let svg = renderer.svg();
    for id in ["clip", "slabClip", "hclip", "rolloutClip"] {
        assert!(svg.contains(&format!("id=\"{id}\"")), "missing clip {id}");
    }
    assert!(svg.contains("class=\"rolloutRectangles\""));
    assert!(svg.contains("class=\"slabBars\""));
    assert!(svg.contains("url(#clip)"));
    assert!(svg.contains(">pressure DEF</text>"));
}

#[test]
fn failing_plot_is_dropped_while_the_others_draw() {
    let mut view_model = view_model();
    view_model.slab_rectangles = Some(Vec::new());
    let state = RenderState::new(&view_model).expect("state");
    let selection = synced_selection(&view_model);
    let mut scene = Scene::new(0.0, 0.0);

    let outcome = draw_view_model(
        &mut scene,
        &view_model,
        &state,
        &selection,
        &VisualConfig::default(),
    );

    assert_eq!(outcome.errors.len(), 1);
    let err = &outcome.errors[0];
    assert_eq!(err.name(), "SlabInformationError");
    match err {
        ChartError::Render { stage, source } => {
            assert_eq!(*stage, RenderStage::Slabs);
            assert!(matches!(**source, ChartError::SlabInformation));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(outcome.plot(0).is_none());
    assert!(scene.select_class("LinePlot0").is_empty());
    assert!(outcome.plot(1).is_some());
    assert_eq!(scene.select_class("BarPlot1").len(), 1);
}

#[test]
fn hidden_category_filters_the_dependent_plot() {
    let view_model = view_model();
    let state = RenderState::new(&view_model).expect("state");
    let selection = synced_selection(&view_model).reduce(&LegendEvent::Toggle {
        kind: LegendKind::Control,
        category: "B".to_owned(),
    });
    let mut scene = Scene::new(0.0, 0.0);
    let outcome = draw_view_model(
        &mut scene,
        &view_model,
        &state,
        &selection,
        &VisualConfig::default(),
    );

    assert_eq!(outcome.plot(0).map(|p| p.points.len()), Some(LEN));
    let bars = outcome.plot(1).expect("bar plot");
    assert_eq!(bars.points.len(), LEN / 2);
    assert_eq!(bars.bars.len(), LEN / 2);
    let legend_b = scene.select_class("ctl-B");
    assert_eq!(legend_b.len(), 2);
    for id in legend_b {
        let opacity = scene.node(id).and_then(|n| n.style_f64("opacity"));
        assert_eq!(opacity, Some(0.3));
    }
}

#[test]
fn redrawn_plot_stays_below_the_tooltip() {
    let view_model = view_model();
    let config = VisualConfig::default();
    let state = RenderState::new(&view_model).expect("state");
    let selection = synced_selection(&view_model).reduce(&LegendEvent::Toggle {
        kind: LegendKind::Error,
        category: "GZE".to_owned(),
    });
    let mut scene = Scene::new(0.0, 0.0);
    let mut outcome = draw_view_model(&mut scene, &view_model, &state, &selection, &config);
    let tooltip = outcome.tooltip.as_ref().expect("tooltip").group;

    let dependent = &view_model.plot_models[1];
    redraw_plot(
        &mut scene,
        &mut outcome,
        dependent,
        &view_model,
        &state,
        &selection,
        &config,
    )
    .expect("redraw");

    assert_eq!(scene.children(scene.root()).last(), Some(&tooltip));
    assert_eq!(scene.select_class("BarPlot1").len(), 1);
    assert_eq!(scene.select_class("Heatmap1").len(), 1);
    assert_eq!(outcome.plot(1).map(|p| p.points.len()), Some(LEN / 2));
    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
}

#[test]
fn zoom_moves_points_and_axes() {
    let view_model = view_model();
    let state = RenderState::new(&view_model).expect("state");
    let selection = synced_selection(&view_model);
    let mut scene = Scene::new(0.0, 0.0);
    let outcome = draw_view_model(
        &mut scene,
        &view_model,
        &state,
        &selection,
        &VisualConfig::default(),
    );

    let plot = outcome.plot(0).expect("line plot");
    let (last_dot, _) = *plot.points.last().expect("points");
    let cx = |scene: &Scene| scene.node(last_dot).and_then(|n| n.attr_f64("cx"));
    let width = view_model.general.plot_width;
    assert_relative_eq!(cx(&scene).expect("cx"), width);

    let zoomed = apply_zoom(
        &state,
        ZoomTransform::new(2.0, 0.0, 0.0),
        &view_model.plot_models,
        view_model.zooming_settings.maximum_zoom,
    )
    .expect("zoom");
    assert!(zoomed.is_zoomed());
    rebind_zoom(&mut scene, &outcome, &view_model, &zoomed).expect("rebind");
    assert_relative_eq!(cx(&scene).expect("cx"), 2.0 * width, epsilon = 1e-9);
    assert!(!scene.select_class_within(plot.y_axis.group, "tick").is_empty());
}

#[test]
fn error_panel_replaces_the_chart() {
    let view_model = view_model();
    let state = RenderState::new(&view_model).expect("state");
    let mut scene = Scene::new(0.0, 0.0);
    let _ = draw_view_model(
        &mut scene,
        &view_model,
        &state,
        &synced_selection(&view_model),
        &VisualConfig::default(),
    );

    draw_error_panel(&mut scene, &ChartError::NoAxis).expect("panel");
    assert_eq!(scene.count(NodeKind::Text), 2);
    assert_eq!(scene.count(NodeKind::Circle), 0);

    let mut renderer = SvgRenderer::new();
    renderer.render(&scene).expect("svg");
    assert!(renderer.svg().contains("ERROR: NoAxisError"));
    assert!(renderer.svg().contains("no values were added to the x-axis"));
}
