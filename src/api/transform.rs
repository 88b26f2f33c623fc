use tracing::debug;

use crate::api::{
    ColorSettings, HeatmapSettings, IdentityService, LayoutRequest, LegendKind, ViewModel,
    VisualConfig, ZoomingSettings, build_legend, build_plot_models, build_rollout_rectangles,
    build_slab_rectangles, build_tooltip_models, classify_columns, compute_layout,
    legend_y_position, resolve_plot_settings, unify_columns, validate_columns, DataView,
};
use crate::core::Viewport;
use crate::error::ChartResult;

/// Turns one host data view into the view model of one render cycle.
///
/// Stages run in order: unify columns, classify roles, validate, resolve
/// per-plot settings, lay out, then build legends, tooltips, overlays and
/// plot models. Any failure aborts the whole build.
pub fn visual_transform(
    data_view: &DataView,
    viewport: Viewport,
    identity: &dyn IdentityService,
    config: &VisualConfig,
) -> ChartResult<ViewModel> {
    let (metadata, categorical) = data_view.parts()?;
    let objects = metadata.objects.as_ref();

    let columns = unify_columns(categorical);
    let validated = validate_columns(classify_columns(&columns, metadata))?;
    let settings = resolve_plot_settings(&validated.x, &validated.y, metadata)?;

    let has_legend = validated.legend.is_some()
        || validated.control_legend.is_some()
        || validated.rollout.is_some();
    let request = LayoutRequest {
        plot_count: validated.y.len(),
        titled_plots: settings
            .iter()
            .filter(|s| s.plot_title_settings.has_title())
            .count(),
        labeled_plots: settings
            .iter()
            .filter(|s| s.format_settings.x_label_space())
            .count(),
        heatmap_plots: settings
            .iter()
            .filter(|s| s.plot_settings.show_heatmap)
            .count(),
        has_legend,
    };
    let mut general = compute_layout(
        viewport,
        request,
        &validated.x.name,
        &validated.x.values,
        config,
    )?;

    let x_values = &validated.x.values;
    let error_legend = validated
        .legend
        .as_ref()
        .map(|data| build_legend(LegendKind::Error, data, x_values, objects, identity));
    let control_legend = validated
        .control_legend
        .as_ref()
        .map(|data| build_legend(LegendKind::Control, data, x_values, objects, identity));

    let tooltip_models = build_tooltip_models(
        validated.shared_x_axis,
        &validated.x,
        &validated.tooltips,
        metadata,
    );
    let slab_rectangles = build_slab_rectangles(&validated.slab_x, &validated.slab_y, x_values);

    let plot_models = build_plot_models(
        &validated.x,
        &validated.y,
        settings,
        &general,
        error_legend.as_ref(),
        identity,
        config,
    )?;

    let rollout_rectangles = match (&validated.rollout, plot_models.first(), plot_models.last()) {
        (Some(rollout), Some(first), Some(last)) => {
            let y = first.plot_top;
            let height = last.plot_top + general.plot_height - y;
            Some(build_rollout_rectangles(
                &rollout.name,
                x_values,
                &rollout.values,
                y,
                height,
                config.rollout_opacity,
            ))
        }
        _ => None,
    };

    general.legend_y_position = legend_y_position(&plot_models, &general, config);

    debug!(
        plots = plot_models.len(),
        tooltips = tooltip_models.len(),
        slabs = slab_rectangles.as_ref().map_or(0, Vec::len),
        legend_y = general.legend_y_position,
        "built view model"
    );

    Ok(ViewModel {
        plot_models,
        general,
        color_settings: ColorSettings::resolve(objects),
        heatmap_settings: HeatmapSettings::resolve(objects),
        zooming_settings: ZoomingSettings::resolve(objects),
        tooltip_models,
        slab_rectangles,
        rollout_rectangles,
        error_legend,
        control_legend,
        svg_width: viewport.width,
        svg_height: viewport.height,
        svg_top_padding: config.svg_top_padding,
    })
}
