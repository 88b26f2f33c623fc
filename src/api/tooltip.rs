use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ordered_float::OrderedFloat;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use crate::api::{ColumnData, DataViewMetadata, TooltipTitleSettings, XAxisData};
use crate::core::PrimitiveValue;

/// One tooltip cell aligned to an x position; `None` shows as `-`.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipDataPoint {
    pub x_value: f64,
    pub value: Option<String>,
}

/// Formatted values of one tooltip column.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipModel {
    pub title: String,
    pub column_id: usize,
    pub data: Vec<TooltipDataPoint>,
    by_x: HashMap<OrderedFloat<f64>, Vec<usize>>,
}

impl TooltipModel {
    #[must_use]
    pub fn new(title: impl Into<String>, column_id: usize, data: Vec<TooltipDataPoint>) -> Self {
        let mut by_x: HashMap<OrderedFloat<f64>, Vec<usize>> = HashMap::new();
        for (i, point) in data.iter().enumerate() {
            by_x.entry(OrderedFloat(point.x_value)).or_default().push(i);
        }
        Self {
            title: title.into(),
            column_id,
            data,
            by_x,
        }
    }

    /// Every cell whose x equals `x`, in row order.
    pub fn points_at(&self, x: f64) -> impl Iterator<Item = &TooltipDataPoint> {
        self.by_x
            .get(&OrderedFloat(x))
            .into_iter()
            .flatten()
            .map(|&i| &self.data[i])
    }
}

/// Builds one tooltip model per tooltip column.
///
/// Only a shared x-axis can align tooltips, so per-plot x-axes yield none.
/// Cells are formatted once here: dates as `dd.mm.yyyy hh:mm`, non-integer
/// numbers with two decimals.
#[must_use]
pub fn build_tooltip_models(
    shared_x_axis: bool,
    x: &XAxisData,
    tooltips: &[ColumnData],
    metadata: &DataViewMetadata,
) -> Vec<TooltipModel> {
    if !shared_x_axis {
        debug!("per-plot x-axes, skipping tooltips");
        return Vec::new();
    }

    tooltips
        .iter()
        .map(|column| {
            let formatted: Vec<Option<String>> = column
                .values
                .iter()
                .map(|cell| format_tooltip_cell(column, cell))
                .collect();
            let data = x
                .values
                .iter()
                .zip(formatted)
                .map(|(&x_value, value)| TooltipDataPoint { x_value, value })
                .collect();

            let metadata_column = metadata.column(column.column_id);
            let display_name = metadata_column
                .map(|c| c.display_name.as_str())
                .unwrap_or(column.name.as_str());
            let settings = TooltipTitleSettings::resolve(
                metadata_column.and_then(|c| c.objects.as_ref()),
                display_name,
            );
            TooltipModel::new(settings.title, column.column_id, data)
        })
        .collect()
}

fn format_tooltip_cell(column: &ColumnData, cell: &PrimitiveValue) -> Option<String> {
    if cell.is_null() {
        return None;
    }
    if column.value_type.date_time {
        return match cell {
            PrimitiveValue::Text(text) => Some(format_date(text).unwrap_or_else(|| {
                warn!(column = %column.name, value = %text, "unparseable date in tooltip column");
                text.clone()
            })),
            other => {
                warn!(column = %column.name, value = %other, "tooltip date column holds a non-date value");
                other.to_display_string()
            }
        };
    }
    if column.value_type.numeric && !column.value_type.integer {
        if let PrimitiveValue::Number(value) = cell {
            return Some(format_two_decimals(*value));
        }
    }
    cell.to_display_string()
}

/// `dd.mm.yyyy hh:mm`; accepts RFC 3339, ISO date-times and plain dates.
#[must_use]
pub fn format_date(text: &str) -> Option<String> {
    const OUTPUT: &str = "%d.%m.%Y %H:%M";
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.naive_local().format(OUTPUT).to_string());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, pattern) {
            return Some(parsed.format(OUTPUT).to_string());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|parsed| parsed.format(OUTPUT).to_string())
}

/// Rounds half away from zero and always prints two decimals.
#[must_use]
pub fn format_two_decimals(value: f64) -> String {
    match Decimal::from_f64(value) {
        Some(decimal) => {
            let mut rounded =
                decimal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(2);
            rounded.to_string()
        }
        None => format!("{value:.2}"),
    }
}
