use std::collections::HashMap;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use tracing::debug;

use crate::api::{
    IdentityService, LegendData, SelectionId, SettingsBag, SettingsCategory, get_value, keys,
};

/// The two legends feeding the dependent-plot filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegendKind {
    /// Legend role; also supplies per-point colors.
    Error,
    /// Control/group legend role.
    Control,
}

impl LegendKind {
    fn title_key(self) -> &'static str {
        match self {
            Self::Error => keys::LEGEND_TITLE,
            Self::Control => keys::CONTROL_LEGEND_TITLE,
        }
    }
}

/// Built-in colors of known categories.
#[must_use]
pub fn default_legend_color(category: &str) -> &'static str {
    match category {
        "OZE" => "#e41a1c",
        "GZE" => "#377eb8",
        "RAS" => "#4daf4a",
        _ => "#FFFFFF",
    }
}

/// One distinct category shown in the legend.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendValue {
    pub value: String,
    pub color: String,
    pub selection_id: SelectionId,
    /// Row of the first occurrence in the legend column.
    pub first_row: usize,
}

/// Category of the legend column at one x position.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendDataPoint {
    pub x_value: f64,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub kind: LegendKind,
    pub title: String,
    pub column_id: usize,
    pub values: Vec<LegendValue>,
    /// Pairs `x[i]` with `legend[i]` for `i < min(x.len(), legend.len())`.
    pub data_points: Vec<LegendDataPoint>,
    by_x: HashMap<OrderedFloat<f64>, usize>,
}

impl Legend {
    /// Category at `x`; the first data point with that x wins.
    #[must_use]
    pub fn category_at(&self, x: f64) -> Option<&str> {
        self.by_x
            .get(&OrderedFloat(x))
            .and_then(|&i| self.data_points[i].category.as_deref())
    }

    /// Whether any data point sits at `x`, whatever its category.
    #[must_use]
    pub fn has_point_at(&self, x: f64) -> bool {
        self.by_x.contains_key(&OrderedFloat(x))
    }

    #[must_use]
    pub fn value(&self, category: &str) -> Option<&LegendValue> {
        self.values.iter().find(|v| v.value == category)
    }

    /// Display color for the point at `x`, if the legend has a category there.
    #[must_use]
    pub fn color_at(&self, x: f64) -> Option<&str> {
        self.category_at(x)
            .and_then(|category| self.value(category))
            .map(|v| v.color.as_str())
    }

    #[must_use]
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|v| v.value.as_str())
    }
}

/// Derives the deduplicated legend from its raw column.
///
/// Null cells are not categories. The title comes from `legendSettings`
/// with the column name as fallback; each category color from the row
/// objects of its first occurrence with the built-in palette as fallback.
#[must_use]
pub fn build_legend(
    kind: LegendKind,
    data: &LegendData,
    x_values: &[f64],
    objects: Option<&SettingsBag>,
    identity: &dyn IdentityService,
) -> Legend {
    let mut first_rows: IndexMap<String, usize> = IndexMap::new();
    for (row, cell) in data.values.iter().enumerate() {
        if let Some(category) = cell.to_display_string() {
            first_rows.entry(category).or_insert(row);
        }
    }

    let values = first_rows
        .into_iter()
        .map(|(value, first_row)| {
            let row_objects = data
                .row_objects
                .as_ref()
                .and_then(|rows| rows.get(first_row))
                .and_then(Option::as_ref);
            let color = get_value(
                row_objects,
                SettingsCategory::LegendSettings,
                keys::LEGEND_COLOR,
                default_legend_color(&value).to_owned(),
            );
            LegendValue {
                selection_id: identity.category_identity(data.column_id, first_row),
                color,
                value,
                first_row,
            }
        })
        .collect::<Vec<_>>();

    let data_points: Vec<LegendDataPoint> = x_values
        .iter()
        .zip(&data.values)
        .map(|(&x_value, cell)| LegendDataPoint {
            x_value,
            category: cell.to_display_string(),
        })
        .collect();

    let mut by_x = HashMap::with_capacity(data_points.len());
    for (i, point) in data_points.iter().enumerate() {
        by_x.entry(OrderedFloat(point.x_value)).or_insert(i);
    }

    let default_title = if data.name.is_empty() {
        "Legend".to_owned()
    } else {
        data.name.clone()
    };
    let title = get_value(
        objects,
        SettingsCategory::LegendSettings,
        kind.title_key(),
        default_title,
    );

    debug!(
        ?kind,
        categories = values.len(),
        data_points = data_points.len(),
        "built legend"
    );

    Legend {
        kind,
        title,
        column_id: data.column_id,
        values,
        data_points,
        by_x,
    }
}

#[cfg(test)]
mod tests {
    use super::{LegendKind, build_legend};
    use crate::api::{
        DefaultIdentityService, LegendData, SettingValue, SettingsBag, SettingsCategory, keys,
    };
    use crate::core::PrimitiveValue;

    fn data(values: Vec<PrimitiveValue>) -> LegendData {
        LegendData {
            name: "defect".to_owned(),
            values,
            column_id: 4,
            row_objects: None,
        }
    }

    #[test]
    fn categories_are_distinct_non_null_in_first_seen_order() {
        let legend = build_legend(
            LegendKind::Error,
            &data(vec![
                "GZE".into(),
                PrimitiveValue::Null,
                "OZE".into(),
                "GZE".into(),
            ]),
            &[1.0, 2.0, 3.0, 4.0],
            None,
            &DefaultIdentityService,
        );
        let categories: Vec<_> = legend.categories().collect();
        assert_eq!(categories, vec!["GZE", "OZE"]);
        assert_eq!(legend.values[0].color, "#377eb8");
        assert_eq!(legend.title, "defect");
        assert_eq!(legend.category_at(2.0), None);
        assert!(legend.has_point_at(2.0));
        assert_eq!(legend.color_at(3.0), Some("#e41a1c"));
    }

    #[test]
    fn data_points_stop_at_the_shorter_column() {
        let legend = build_legend(
            LegendKind::Control,
            &data(vec!["A".into(), "B".into(), "C".into()]),
            &[1.0, 2.0],
            None,
            &DefaultIdentityService,
        );
        assert_eq!(legend.data_points.len(), 2);
        assert_eq!(legend.values.len(), 3);
        assert_eq!(legend.values[2].color, "#FFFFFF");
    }

    #[test]
    fn row_objects_and_title_settings_override_defaults() {
        let mut raw = data(vec!["X".into(), "Y".into()]);
        raw.row_objects = Some(vec![
            None,
            Some(SettingsBag::new().with(
                SettingsCategory::LegendSettings,
                keys::LEGEND_COLOR,
                SettingValue::color("#00ff00"),
            )),
        ]);
        let objects = SettingsBag::new().with(
            SettingsCategory::LegendSettings,
            keys::CONTROL_LEGEND_TITLE,
            "Groups",
        );
        let legend = build_legend(
            LegendKind::Control,
            &raw,
            &[1.0, 2.0],
            Some(&objects),
            &DefaultIdentityService,
        );
        assert_eq!(legend.title, "Groups");
        assert_eq!(legend.value("Y").map(|v| v.color.as_str()), Some("#00ff00"));
        assert_eq!(legend.value("X").map(|v| v.color.as_str()), Some("#FFFFFF"));
    }
}
