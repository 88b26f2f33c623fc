use tracing::{debug, trace};

use crate::api::{ClassifiedColumns, ColumnData, LegendData};
use crate::core::PrimitiveValue;
use crate::error::{ChartError, ChartResult};

/// The shared or per-plot x-axis column; never contains nulls.
#[derive(Debug, Clone, PartialEq)]
pub struct XAxisData {
    pub name: String,
    pub values: Vec<f64>,
    pub column_id: usize,
}

/// One plot's y-axis column; `None` cells are not drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct YAxisData {
    pub name: String,
    pub values: Vec<Option<f64>>,
    pub column_id: usize,
}

impl YAxisData {
    /// Largest non-null value.
    #[must_use]
    pub fn max(&self) -> Option<f64> {
        self.values
            .iter()
            .flatten()
            .copied()
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
    }
}

/// Role bindings that passed every structural check.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedColumns {
    /// One x column serves every plot.
    pub shared_x_axis: bool,
    pub x: XAxisData,
    pub y: Vec<YAxisData>,
    pub tooltips: Vec<ColumnData>,
    pub legend: Option<LegendData>,
    pub control_legend: Option<LegendData>,
    pub slab_x: Vec<PrimitiveValue>,
    pub slab_y: Vec<PrimitiveValue>,
    pub rollout: Option<ColumnData>,
}

/// Checks, in order: y present, x present, x/y counts compatible, x free of nulls.
pub fn validate_columns(classified: ClassifiedColumns) -> ChartResult<ValidatedColumns> {
    if classified.y_count == 0 {
        return Err(ChartError::NoValues);
    }
    if classified.x_count == 0 {
        return Err(ChartError::NoAxis);
    }
    let shared_x_axis = classified.x_count == 1;
    if classified.x_count != classified.y_count && !shared_x_axis {
        return Err(ChartError::Axis);
    }

    let x_column = classified.x.ok_or(ChartError::NoAxis)?;
    if x_column.values.iter().any(PrimitiveValue::is_null) {
        return Err(ChartError::AxisNullValues {
            axis_name: x_column.name,
        });
    }
    let x_values = x_column
        .values
        .iter()
        .map(|v| {
            v.as_f64().ok_or_else(|| {
                ChartError::ParseAndTransform(format!(
                    "x-axis `{}` contains the non-numeric value `{v}`",
                    x_column.name
                ))
            })
        })
        .collect::<ChartResult<Vec<f64>>>()?;
    let x = XAxisData {
        name: x_column.name,
        values: x_values,
        column_id: x_column.column_id,
    };

    let mut y = Vec::with_capacity(classified.y.len());
    for (slot, column) in classified.y.into_iter().enumerate() {
        let column = column.ok_or_else(|| {
            ChartError::ParseAndTransform(format!("no y-axis column is bound to slot {slot}"))
        })?;
        y.push(YAxisData {
            values: column
                .values
                .iter()
                .map(|v| {
                    let value = v.as_f64();
                    if value.is_none() && !v.is_null() {
                        trace!(column = %column.name, value = %v, "non-numeric y value is not drawn");
                    }
                    value
                })
                .collect(),
            name: column.name,
            column_id: column.column_id,
        });
    }

    let tooltips: Vec<ColumnData> = classified.tooltips.into_iter().flatten().collect();

    debug!(
        plots = y.len(),
        shared_x_axis,
        x_len = x.values.len(),
        tooltips = tooltips.len(),
        "validated columns"
    );

    Ok(ValidatedColumns {
        shared_x_axis,
        x,
        y,
        tooltips,
        legend: classified.legend,
        control_legend: classified.control_legend,
        slab_x: classified.slab_x.map(|c| c.values).unwrap_or_default(),
        slab_y: classified.slab_y.map(|c| c.values).unwrap_or_default(),
        rollout: classified.rollout,
    })
}
