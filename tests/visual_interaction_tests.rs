use multiplot_rs::api::{
    DataView, DataViewColumn, LegendKind, MetadataColumn, RoleName, SettingsBag, SettingsCategory,
    ValueType, Visual, VisualConfig, keys,
};
use multiplot_rs::core::{PrimitiveValue, Viewport, ZoomTransform};
use multiplot_rs::error::ChartError;
use multiplot_rs::interaction::{HoveredPoint, ZoomPhase};
use multiplot_rs::render::{NodeKind, NullRenderer, Scene, SceneClasses};

const LEN: usize = 8;

fn viewport() -> Viewport {
    Viewport::new(800.0, 500.0)
}

fn data_view(objects: Option<SettingsBag>) -> DataView {
    let x = DataViewColumn::new(
        MetadataColumn::new("time", 0).with_role(RoleName::XAxis, None),
        (1..=LEN).map(|i| PrimitiveValue::from(i as f64)).collect(),
    );
    let legend = DataViewColumn::new(
        MetadataColumn::new("defect", 1).with_role(RoleName::Legend, None),
        (0..LEN)
            .map(|i| PrimitiveValue::from(if i % 2 == 0 { "OZE" } else { "GZE" }))
            .collect(),
    );
    let temp = DataViewColumn::new(
        MetadataColumn::new("temp", 2).with_role(RoleName::YAxis, Some(0)),
        (0..LEN).map(|i| PrimitiveValue::from(i as f64 * 2.0)).collect(),
    );
    let dependent = DataViewColumn::new(
        MetadataColumn::new("size DEF", 3)
            .with_role(RoleName::YAxis, Some(1))
            .with_objects(
                SettingsBag::new()
                    .with(SettingsCategory::PlotSettings, keys::PLOT_TYPE, "ScatterPlot")
                    .with(SettingsCategory::PlotSettings, keys::USE_LEGEND_COLOR, true),
            ),
        (0..LEN).map(|i| PrimitiveValue::from(i as f64 + 1.0)).collect(),
    );
    let amount = DataViewColumn::new(
        MetadataColumn::new("amount", 4)
            .with_role(RoleName::Tooltip, Some(0))
            .with_type(ValueType::numeric()),
        (0..LEN).map(|i| PrimitiveValue::from(i as f64 + 0.25)).collect(),
    );
    DataView::from_columns(vec![x, legend], vec![temp, dependent, amount], objects)
}

fn visual() -> Visual<NullRenderer> {
    let mut visual =
        Visual::new(NullRenderer::default(), VisualConfig::default()).expect("visual");
    visual.update(data_view(None), viewport()).expect("update");
    visual
}

fn opacity(scene: &Scene, class: &str) -> Vec<Option<f64>> {
    scene
        .select_class(class)
        .into_iter()
        .map(|id| scene.node(id).and_then(|n| n.style_f64("opacity")))
        .collect()
}

fn style_text(scene: &Scene, class: &str, name: &str) -> Option<String> {
    let id = *scene.select_class(class).first()?;
    scene
        .node(id)
        .and_then(|n| n.styles.get(name))
        .map(ToString::to_string)
}

#[test]
fn update_draws_and_renders_once() {
    let visual = visual();
    assert_eq!(visual.renderer().render_count, 1);
    assert!(visual.render_errors().is_empty());
    assert!(visual.renderer().last_circle_count >= 2 * LEN);

    let view_model = visual.view_model().expect("view model");
    assert_eq!(view_model.plot_models.len(), 2);
    assert!(visual.legend_selection().is_visible(LegendKind::Error, "OZE"));
    assert!(visual.legend_selection().is_visible(LegendKind::Error, "GZE"));
    assert_eq!(
        visual.render_state().map(|s| s.phase),
        Some(ZoomPhase::Idle)
    );
    assert_eq!(visual.scene().select_class("LinePlot0").len(), 1);
    assert_eq!(visual.scene().select_class("ScatterPlot1").len(), 1);
}

#[test]
fn build_error_replaces_the_chart_with_the_error_panel() {
    let mut visual = visual();
    let broken = DataView::from_columns(
        vec![DataViewColumn::new(
            MetadataColumn::new("time", 0).with_role(RoleName::XAxis, None),
            vec![PrimitiveValue::from(1.0), PrimitiveValue::Null],
        )],
        vec![DataViewColumn::new(
            MetadataColumn::new("temp", 1).with_role(RoleName::YAxis, Some(0)),
            vec![PrimitiveValue::from(1.0), PrimitiveValue::from(2.0)],
        )],
        None,
    );

    let err = visual.update(broken, viewport()).expect_err("null x");
    assert!(matches!(err, ChartError::AxisNullValues { .. }));
    assert!(visual.view_model().is_none());
    assert!(visual.render_state().is_none());
    assert_eq!(visual.renderer().render_count, 2);
    assert_eq!(visual.scene().count(NodeKind::Text), 2);
    assert_eq!(visual.scene().select_class("errorName").len(), 1);

    // Interactions on an errored visual are ignored.
    visual
        .on_zoom(ZoomTransform::new(2.0, 0.0, 0.0))
        .expect("no-op zoom");
    assert_eq!(visual.renderer().render_count, 2);
}

#[test]
fn zoom_then_pan_resets_to_the_identity() {
    let mut visual = visual();
    visual
        .on_zoom(ZoomTransform::new(3.0, -100.0, 0.0))
        .expect("zoom");
    let state = visual.render_state().expect("state");
    assert!(state.is_zoomed());
    assert_eq!(state.transform.k, 3.0);

    visual
        .on_zoom(ZoomTransform::new(1.0, 40.0, 0.0))
        .expect("pan");
    let state = visual.render_state().expect("state");
    assert_eq!(state.phase, ZoomPhase::Idle);
    assert_eq!(state.transform, ZoomTransform::IDENTITY);
    assert_eq!(visual.renderer().render_count, 3);
}

#[test]
fn zoom_is_clamped_to_the_configured_maximum() {
    let objects = SettingsBag::new().with(SettingsCategory::ZoomingSettings, keys::MAXIMUM, 4.0);
    let mut visual =
        Visual::new(NullRenderer::default(), VisualConfig::default()).expect("visual");
    visual.update(data_view(Some(objects)), viewport()).expect("update");

    visual
        .on_zoom(ZoomTransform::new(50.0, 0.0, 0.0))
        .expect("zoom");
    assert_eq!(visual.render_state().map(|s| s.transform.k), Some(4.0));
}

#[test]
fn disabled_zoom_ignores_gestures() {
    let objects = SettingsBag::new().with(SettingsCategory::ZoomingSettings, keys::SHOW, false);
    let mut visual =
        Visual::new(NullRenderer::default(), VisualConfig::default()).expect("visual");
    visual.update(data_view(Some(objects)), viewport()).expect("update");

    visual
        .on_zoom(ZoomTransform::new(2.0, 0.0, 0.0))
        .expect("ignored");
    assert_eq!(visual.renderer().render_count, 1);
    assert_eq!(
        visual.render_state().map(|s| s.phase),
        Some(ZoomPhase::Idle)
    );
}

#[test]
fn invalid_zoom_frame_is_reported_as_interaction_error() {
    let mut visual = visual();
    let err = visual
        .on_zoom(ZoomTransform::new(f64::NAN, 0.0, 0.0))
        .expect_err("invalid transform");
    match &err {
        ChartError::Interaction { operation, source } => {
            assert_eq!(*operation, "zoom function");
            assert!(matches!(**source, ChartError::InvalidData(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(visual.scene().select_class("errorMessage").len(), 1);
}

#[test]
fn legend_click_toggles_category_and_filters_dependent_plot() {
    let mut visual = visual();
    let dependent_points = |visual: &Visual<NullRenderer>| {
        visual.outcome().plot(1).map(|p| p.points.len())
    };
    assert_eq!(dependent_points(&visual), Some(LEN));

    visual
        .on_legend_click(LegendKind::Error, "GZE")
        .expect("click");
    assert!(!visual.legend_selection().is_visible(LegendKind::Error, "GZE"));
    assert_eq!(dependent_points(&visual), Some(LEN / 2));
    // The plain plot keeps every point.
    assert_eq!(visual.outcome().plot(0).map(|p| p.points.len()), Some(LEN));
    // Only the legend entry is left tagged with the hidden category.
    assert_eq!(
        opacity(visual.scene(), "cat-GZE"),
        vec![Some(0.3), Some(0.3)]
    );
    assert!(
        opacity(visual.scene(), "cat-OZE")
            .iter()
            .all(|o| *o == Some(1.0))
    );

    visual
        .on_legend_click(LegendKind::Error, "GZE")
        .expect("click again");
    assert!(visual.legend_selection().is_visible(LegendKind::Error, "GZE"));
    assert_eq!(dependent_points(&visual), Some(LEN));
    assert!(
        opacity(visual.scene(), "cat-GZE")
            .iter()
            .all(|o| *o == Some(1.0))
    );
}

#[test]
fn legend_selection_survives_an_update() {
    let mut visual = visual();
    visual
        .on_legend_click(LegendKind::Error, "OZE")
        .expect("click");
    visual.update(data_view(None), viewport()).expect("update");
    assert!(!visual.legend_selection().is_visible(LegendKind::Error, "OZE"));
    assert_eq!(visual.outcome().plot(1).map(|p| p.points.len()), Some(LEN / 2));
}

#[test]
fn hover_shows_tooltip_and_rulers_until_pointer_leaves() {
    let mut visual = visual();
    let point = HoveredPoint {
        plot_id: 0,
        index: 2,
    };
    visual.on_pointer_over(point).expect("over");
    assert!(visual.hover().is_active());
    assert_eq!(
        style_text(visual.scene(), SceneClasses::TOOLTIP, "visibility").as_deref(),
        Some("visible")
    );
    let (dot, _) = visual
        .outcome()
        .plot(0)
        .and_then(|p| p.points.iter().find(|(_, i)| *i == 2).copied())
        .expect("hovered dot");
    let radius = visual.config().dot_radius;
    assert_eq!(
        visual.scene().node(dot).and_then(|n| n.attr_f64("r")),
        Some(radius * 2.0)
    );

    visual.on_pointer_move((120.0, 80.0)).expect("move");
    let hover = visual.hover();
    assert_eq!(hover.lines, vec!["amount : 2.25".to_owned()]);
    assert_eq!(hover.ruler_x, Some(80.0));
    let placement = hover.placement.expect("placement");
    assert_eq!(placement.left, 130.0);
    assert_eq!(placement.top, 90.0);
    let ruler = visual.outcome().plot(1).map(|p| p.ruler).expect("ruler");
    assert_eq!(
        visual.scene().node(ruler).and_then(|n| n.attr_f64("x1")),
        Some(80.0)
    );

    visual.on_pointer_out().expect("out");
    assert!(!visual.hover().is_active());
    assert_eq!(
        style_text(visual.scene(), SceneClasses::TOOLTIP, "visibility").as_deref(),
        Some("hidden")
    );
    assert_eq!(
        visual.scene().node(dot).and_then(|n| n.attr_f64("r")),
        Some(radius)
    );
    assert_eq!(
        visual.scene().node(ruler).and_then(|n| n.style_f64("opacity")),
        Some(0.0)
    );
}

#[test]
fn pointer_events_without_hover_do_nothing() {
    let mut visual = visual();
    visual.on_pointer_move((10.0, 10.0)).expect("move");
    visual.on_pointer_out().expect("out");
    assert_eq!(visual.renderer().render_count, 1);
}

#[test]
fn enumeration_lists_resolved_settings() {
    let empty = Visual::new(NullRenderer::default(), VisualConfig::default()).expect("visual");
    assert!(
        empty
            .enumerate_object_instances("plotSettings")
            .expect("enumerate")
            .is_empty()
    );

    let visual = visual();
    let plot_settings = visual
        .enumerate_object_instances("plotSettings")
        .expect("enumerate");
    assert!(!plot_settings.is_empty());
    assert!(plot_settings.iter().all(|i| i.object_name == "plotSettings"));

    let zooming = visual
        .enumerate_object_instances("zoomingSettings")
        .expect("enumerate");
    assert_eq!(zooming.len(), 1);
    assert!(zooming[0].property(keys::MAXIMUM).is_some());

    let tooltips = visual
        .enumerate_object_instances("tooltipTitleSettings")
        .expect("enumerate");
    assert_eq!(tooltips.len(), 1);
    assert_eq!(tooltips[0].display_name.as_deref(), Some("amount"));

    assert!(
        visual
            .enumerate_object_instances("noSuchObject")
            .expect("enumerate")
            .is_empty()
    );
}
