//! Property-pane enumeration: resolved values per settings category.

use indexmap::IndexMap;
use tracing::trace;

use crate::api::{
    AxisInformation, ColorSettings, DataView, FormatSettings, HeatmapSettings, MetadataColumn,
    OverlayPlotSettings, PlotSettings, PlotTitleSettings, RoleName, SelectionId, SettingValue,
    SettingsCategory, ViewModel, ZoomingSettings, get_value, keys,
};
use crate::error::ChartResult;

/// Where the host stores an edited property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Visual-level objects.
    Visual,
    /// The column with this query name.
    Column(String),
    /// Every data instance; `alt` points at one category value.
    Instances { alt: SelectionId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInstance {
    pub object_name: String,
    pub display_name: Option<String>,
    pub properties: IndexMap<String, SettingValue>,
    pub selector: Selector,
}

impl ObjectInstance {
    fn visual(category: SettingsCategory, properties: IndexMap<String, SettingValue>) -> Self {
        Self {
            object_name: category.as_str().to_owned(),
            display_name: None,
            properties,
            selector: Selector::Visual,
        }
    }

    /// Single-property value, for callers that know the key.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&SettingValue> {
        self.properties.get(key)
    }
}

/// Resolved values of `object_name` for the host's property pane.
///
/// Column-scoped categories yield one instance per property and y column,
/// ordered by the column's y slot. Unknown names yield nothing.
pub fn enumerate_object_instances(
    object_name: &str,
    data_view: &DataView,
    view_model: &ViewModel,
) -> ChartResult<Vec<ObjectInstance>> {
    let Some(category) = SettingsCategory::from_name(object_name) else {
        trace!(object_name, "unknown settings category");
        return Ok(Vec::new());
    };
    let (metadata, _) = data_view.parts()?;
    let objects = metadata.objects.as_ref();

    let instances = match category {
        SettingsCategory::PlotSettings
        | SettingsCategory::AxisSettings
        | SettingsCategory::AxisLabelSettings
        | SettingsCategory::YRangeSettings
        | SettingsCategory::OverlayPlotSettings
        | SettingsCategory::PlotTitleSettings => {
            column_instances(category, &metadata.columns, view_model)?
        }
        SettingsCategory::ColorSelector => Vec::new(),
        SettingsCategory::TooltipTitleSettings => {
            let mut slots: Vec<Option<ObjectInstance>> = Vec::new();
            for column in metadata.columns.iter().filter(|c| c.has_role(RoleName::Tooltip)) {
                let slot = column.role_slot(RoleName::Tooltip).unwrap_or(slots.len());
                let title = get_value(
                    column.objects.as_ref(),
                    category,
                    keys::TITLE,
                    column.display_name.clone(),
                );
                let instance = ObjectInstance {
                    object_name: category.as_str().to_owned(),
                    display_name: Some(column.display_name.clone()),
                    properties: IndexMap::from([(keys::TITLE.to_owned(), title.into())]),
                    selector: Selector::Column(column.query_name.clone()),
                };
                if slots.len() <= slot {
                    slots.resize(slot + 1, None);
                }
                slots[slot] = Some(instance);
            }
            slots.into_iter().flatten().collect()
        }
        SettingsCategory::ColorSettings => {
            let colors = ColorSettings::resolve(objects);
            vec![ObjectInstance::visual(
                category,
                IndexMap::from([
                    (
                        keys::VERTICAL_RULER_COLOR.to_owned(),
                        SettingValue::color(colors.vertical_ruler_color),
                    ),
                    (
                        keys::SLAB_COLOR.to_owned(),
                        SettingValue::color(colors.slab_color),
                    ),
                    (
                        keys::HEATMAP_COLOR_SCHEME.to_owned(),
                        colors.heatmap_color_scheme.into(),
                    ),
                ]),
            )]
        }
        SettingsCategory::HeatmapSettings => {
            let heatmap = HeatmapSettings::resolve(objects);
            vec![ObjectInstance::visual(
                category,
                IndexMap::from([(
                    keys::HEATMAP_BINS.to_owned(),
                    SettingValue::Number(heatmap.heatmap_bins as f64),
                )]),
            )]
        }
        SettingsCategory::LegendSettings => legend_instances(view_model),
        SettingsCategory::ZoomingSettings => {
            let zoom = ZoomingSettings::resolve(objects);
            vec![ObjectInstance::visual(
                category,
                IndexMap::from([
                    (keys::SHOW.to_owned(), zoom.enable_zoom.into()),
                    (keys::MAXIMUM.to_owned(), zoom.maximum_zoom.into()),
                ]),
            )]
        }
    };
    Ok(instances)
}

fn legend_instances(view_model: &ViewModel) -> Vec<ObjectInstance> {
    let category = SettingsCategory::LegendSettings;
    let Some(error_legend) = &view_model.error_legend else {
        return Vec::new();
    };

    let mut titles = IndexMap::from([(
        keys::LEGEND_TITLE.to_owned(),
        SettingValue::from(error_legend.title.clone()),
    )]);
    if let Some(control_legend) = &view_model.control_legend {
        titles.insert(
            keys::CONTROL_LEGEND_TITLE.to_owned(),
            control_legend.title.clone().into(),
        );
    }

    let mut instances = vec![ObjectInstance::visual(category, titles)];
    instances.extend(error_legend.values.iter().map(|value| ObjectInstance {
        object_name: category.as_str().to_owned(),
        display_name: Some(value.value.clone()),
        properties: IndexMap::from([(
            keys::LEGEND_COLOR.to_owned(),
            SettingValue::color(value.color.clone()),
        )]),
        selector: Selector::Instances {
            alt: value.selection_id.clone(),
        },
    }));
    instances
}

fn column_instances(
    category: SettingsCategory,
    columns: &[MetadataColumn],
    view_model: &ViewModel,
) -> ChartResult<Vec<ObjectInstance>> {
    let mut slots: Vec<Option<ObjectInstance>> = Vec::new();
    let mut seen = 0;

    for column in columns.iter().filter(|c| c.has_role(RoleName::YAxis)) {
        let y_slot = column.role_slot(RoleName::YAxis).unwrap_or(seen);
        seen += 1;
        let objects = column.objects.as_ref();
        let name = &column.display_name;
        let plot = view_model.plot(y_slot);

        let entries: Vec<(String, &str, SettingValue)> = match category {
            SettingsCategory::PlotSettings => {
                let settings = PlotSettings::resolve(objects);
                vec![
                    (format!("{name} Plot Type"), keys::PLOT_TYPE, settings.plot_type.as_str().into()),
                    (format!("{name} Plot Color"), keys::FILL, SettingValue::color(settings.fill)),
                    (format!("{name} Use Legend Color"), keys::USE_LEGEND_COLOR, settings.use_legend_color.into()),
                    (format!("{name} Show Heatmap"), keys::SHOW_HEATMAP, settings.show_heatmap.into()),
                ]
            }
            SettingsCategory::AxisSettings => {
                let settings = FormatSettings::resolve(objects)?;
                vec![
                    (format!("{name} X-Axis"), keys::X_AXIS, axis_value(settings.x_axis)),
                    (format!("{name} Y-Axis"), keys::Y_AXIS, axis_value(settings.y_axis)),
                ]
            }
            SettingsCategory::AxisLabelSettings => {
                let (x_default, y_default) = plot.map_or_else(
                    || (String::new(), name.clone()),
                    |p| (p.label_names.x_label.clone(), p.label_names.y_label.clone()),
                );
                vec![
                    (
                        format!("{name} x-Label"),
                        keys::X_LABEL,
                        get_value(objects, category, keys::X_LABEL, x_default).into(),
                    ),
                    (
                        format!("{name} y-Label"),
                        keys::Y_LABEL,
                        get_value(objects, category, keys::Y_LABEL, y_default).into(),
                    ),
                ]
            }
            SettingsCategory::YRangeSettings => {
                let data_max = plot.map_or(0.0, |p| p.y_range.max);
                vec![
                    (
                        format!("{name} Minimum Value"),
                        keys::MIN,
                        get_value(objects, category, keys::MIN, 0.0).into(),
                    ),
                    (
                        format!("{name} Maximum Value"),
                        keys::MAX,
                        get_value(objects, category, keys::MAX, data_max).into(),
                    ),
                    (
                        format!("{name} Fixed Minimum"),
                        keys::MIN_FIXED,
                        get_value(objects, category, keys::MIN_FIXED, true).into(),
                    ),
                    (
                        format!("{name} Fixed Maximum"),
                        keys::MAX_FIXED,
                        get_value(objects, category, keys::MAX_FIXED, false).into(),
                    ),
                ]
            }
            SettingsCategory::OverlayPlotSettings => {
                let settings = OverlayPlotSettings::resolve(objects);
                vec![(
                    format!("{name} Overlay Type"),
                    keys::SLAB_TYPE,
                    settings.slab_type.as_str().into(),
                )]
            }
            SettingsCategory::PlotTitleSettings => {
                let settings = PlotTitleSettings::resolve(objects, name);
                vec![(format!("{name} Plot Title"), keys::TITLE, settings.title.into())]
            }
            _ => Vec::new(),
        };

        let per_column = entries.len();
        for (i, (display_name, key, value)) in entries.into_iter().enumerate() {
            let index = y_slot * per_column + i;
            if slots.len() <= index {
                slots.resize(index + 1, None);
            }
            slots[index] = Some(ObjectInstance {
                object_name: category.as_str().to_owned(),
                display_name: Some(display_name),
                properties: IndexMap::from([(key.to_owned(), value)]),
                selector: Selector::Column(column.query_name.clone()),
            });
        }
    }

    Ok(slots.into_iter().flatten().collect())
}

fn axis_value(information: AxisInformation) -> SettingValue {
    information.as_str().into()
}
