use tracing::{debug, trace};

use crate::api::{
    AxisLabelSettings, DataViewMetadata, FormatSettings, GeneralPlotSettings, IdentityService,
    Legend, OverlayPlotSettings, PlotSettings, PlotTitleSettings, SelectionId, SettingsBag,
    VisualConfig, XAxisData, YAxisData, YRange,
};
use crate::core::format_number;
use crate::error::{ChartError, ChartResult};

/// One x/y pair of a plot. Either side may be missing when the columns
/// differ in length; such points keep their index but are not drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub x_value: Option<f64>,
    pub y_value: Option<f64>,
    pub color: String,
    pub identity: SelectionId,
}

impl DataPoint {
    /// Coordinates when both sides are present.
    #[must_use]
    pub fn xy(&self) -> Option<(f64, f64)> {
        Some((self.x_value?, self.y_value?))
    }
}

/// Settings of one plot, resolved from its y column's property bag.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlotSettings {
    pub format_settings: FormatSettings,
    pub plot_settings: PlotSettings,
    pub plot_title_settings: PlotTitleSettings,
    pub overlay_plot_settings: OverlayPlotSettings,
    pub label_names: AxisLabelSettings,
    pub y_range: YRange,
}

impl ResolvedPlotSettings {
    pub fn resolve(
        objects: Option<&SettingsBag>,
        x_name: &str,
        y: &YAxisData,
    ) -> ChartResult<Self> {
        let data_max = y.max().unwrap_or(0.0);
        Ok(Self {
            format_settings: FormatSettings::resolve(objects)?,
            plot_settings: PlotSettings::resolve(objects),
            plot_title_settings: PlotTitleSettings::resolve(objects, &y.name),
            overlay_plot_settings: OverlayPlotSettings::resolve(objects),
            label_names: AxisLabelSettings::resolve(objects, x_name, &y.name),
            y_range: YRange::resolve(objects, data_max),
        })
    }
}

/// Settings for every y slot, in slot order.
pub fn resolve_plot_settings(
    x: &XAxisData,
    y: &[YAxisData],
    metadata: &DataViewMetadata,
) -> ChartResult<Vec<ResolvedPlotSettings>> {
    y.iter()
        .map(|column| {
            let objects = metadata
                .column(column.column_id)
                .and_then(|c| c.objects.as_ref());
            ResolvedPlotSettings::resolve(objects, &x.name, column)
        })
        .collect()
}

/// The unit of rendering: one y column with its settings and placement.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotModel {
    pub plot_id: usize,
    pub x_name: String,
    pub y_name: String,
    pub format_settings: FormatSettings,
    pub plot_settings: PlotSettings,
    pub plot_title_settings: PlotTitleSettings,
    pub overlay_plot_settings: OverlayPlotSettings,
    pub label_names: AxisLabelSettings,
    pub y_range: YRange,
    pub data_points: Vec<DataPoint>,
    /// Vertical offset of the plot area inside the svg.
    pub plot_top: f64,
}

impl PlotModel {
    /// Plots filtered by both legends on every redraw.
    #[must_use]
    pub fn is_dependent(&self, marker: &str) -> bool {
        !marker.is_empty() && self.y_name.contains(marker)
    }

    /// Indices and coordinates of the points that can be drawn.
    pub fn drawable_points(&self) -> impl Iterator<Item = (usize, f64, f64)> + '_ {
        self.data_points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.xy().map(|(x, y)| (i, x, y)))
    }
}

/// Builds the plot models in slot order.
///
/// `plot_top` accumulates over the predecessors: title height, x-label room,
/// plot height with its margins, and heatmap room.
pub fn build_plot_models(
    x: &XAxisData,
    y: &[YAxisData],
    settings: Vec<ResolvedPlotSettings>,
    general: &GeneralPlotSettings,
    legend: Option<&Legend>,
    identity: &dyn IdentityService,
    config: &VisualConfig,
) -> ChartResult<Vec<PlotModel>> {
    let mut plot_top = config.svg_top_padding + config.margins.top;
    let mut models = Vec::with_capacity(y.len());

    for (plot_id, (column, resolved)) in y.iter().zip(settings).enumerate() {
        let legend_colors = if resolved.plot_settings.use_legend_color {
            Some(legend.ok_or_else(|| ChartError::PlotLegend {
                plot_name: column.name.clone(),
            })?)
        } else {
            None
        };

        let point_count = x.values.len().max(column.values.len());
        let data_points = (0..point_count)
            .map(|i| {
                let x_value = x.values.get(i).copied();
                let color = x_value
                    .and_then(|xv| legend_colors.and_then(|l| l.color_at(xv)))
                    .unwrap_or(resolved.plot_settings.fill.as_str())
                    .to_owned();
                DataPoint {
                    identity: match x_value {
                        Some(xv) => identity.measure_identity(&format_number(xv)),
                        None => identity.empty_identity(),
                    },
                    x_value,
                    y_value: column.values.get(i).copied().flatten(),
                    color,
                }
            })
            .collect::<Vec<_>>();

        if resolved.plot_title_settings.has_title() {
            plot_top += config.plot_title_height;
        }

        trace!(plot_id, plot_top, points = data_points.len(), "built plot model");
        models.push(PlotModel {
            plot_id,
            x_name: x.name.clone(),
            y_name: column.name.clone(),
            format_settings: resolved.format_settings,
            plot_settings: resolved.plot_settings,
            plot_title_settings: resolved.plot_title_settings,
            overlay_plot_settings: resolved.overlay_plot_settings,
            label_names: resolved.label_names,
            y_range: resolved.y_range,
            data_points,
            plot_top,
        });

        let model = &models[plot_id];
        if model.format_settings.x_label_space() {
            plot_top += config.x_label_space;
        }
        plot_top += general.plot_height + config.margins.top + config.margins.bottom;
        if model.plot_settings.show_heatmap {
            plot_top += config.heatmap.space();
        }
    }

    debug!(plots = models.len(), legend_y = plot_top, "built plot models");
    Ok(models)
}

/// Vertical position right below the last plot, where legends go.
#[must_use]
pub fn legend_y_position(models: &[PlotModel], general: &GeneralPlotSettings, config: &VisualConfig) -> f64 {
    models.last().map_or(config.svg_top_padding + config.margins.top, |last| {
        let mut bottom = last.plot_top;
        if last.format_settings.x_label_space() {
            bottom += config.x_label_space;
        }
        bottom += general.plot_height + config.margins.top + config.margins.bottom;
        if last.plot_settings.show_heatmap {
            bottom += config.heatmap.space();
        }
        bottom
    })
}
