//! Role classification over the unified column list.

use std::collections::HashSet;

use tracing::{debug, trace, warn};

use crate::api::{
    Categorical, DataViewColumn, DataViewMetadata, RoleName, SettingsBag, ValueType,
};
use crate::core::PrimitiveValue;

/// Which host list a column came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOrigin {
    Category,
    Value,
}

/// A host column after the category and value lists were merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub origin: ColumnOrigin,
    pub inner: DataViewColumn,
}

impl Column {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.source.display_name
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.inner.source.index
    }

    #[must_use]
    pub fn has_role(&self, role: RoleName) -> bool {
        self.inner.source.has_role(role)
    }
}

/// Merges the category and value lists into one list.
///
/// Within each list, a column repeating an earlier column's host index is
/// dropped. Categories come first.
#[must_use]
pub fn unify_columns(categorical: &Categorical) -> Vec<Column> {
    let mut columns = Vec::with_capacity(categorical.categories.len() + categorical.values.len());
    for (origin, list) in [
        (ColumnOrigin::Category, &categorical.categories),
        (ColumnOrigin::Value, &categorical.values),
    ] {
        let mut seen = HashSet::new();
        for column in list {
            if !seen.insert(column.source.index) {
                trace!(
                    name = %column.source.display_name,
                    index = column.source.index,
                    "dropping duplicate column"
                );
                continue;
            }
            columns.push(Column {
                origin,
                inner: column.clone(),
            });
        }
    }
    columns
}

/// Raw values of one role-bound column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnData {
    pub name: String,
    pub values: Vec<PrimitiveValue>,
    pub column_id: usize,
    pub value_type: ValueType,
}

/// Category column feeding a legend.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendData {
    pub name: String,
    pub values: Vec<PrimitiveValue>,
    pub column_id: usize,
    pub row_objects: Option<Vec<Option<SettingsBag>>>,
}

/// Role bindings of one update, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedColumns {
    pub x_count: usize,
    pub y_count: usize,
    pub tooltip_count: usize,
    pub x: Option<ColumnData>,
    /// Indexed by the host-assigned y slot.
    pub y: Vec<Option<ColumnData>>,
    /// Indexed by the host-assigned tooltip slot.
    pub tooltips: Vec<Option<ColumnData>>,
    pub legend: Option<LegendData>,
    pub control_legend: Option<LegendData>,
    pub slab_x: Option<ColumnData>,
    pub slab_y: Option<ColumnData>,
    pub rollout: Option<ColumnData>,
}

/// Groups columns by role.
///
/// y-axis and tooltip columns land at the slot the host assigned in
/// `rolesIndex` (order of appearance when absent). Single-cardinality roles
/// keep the last matching column.
#[must_use]
pub fn classify_columns(columns: &[Column], metadata: &DataViewMetadata) -> ClassifiedColumns {
    let mut classified = ClassifiedColumns::default();

    for column in columns {
        if column.has_role(RoleName::XAxis) {
            classified.x_count += 1;
            if classified.x.is_some() {
                debug!(name = column.name(), "x-axis column replaces an earlier one");
            }
            classified.x = Some(column_data(column, column.index()));
        }
        if column.has_role(RoleName::YAxis) {
            let slot = column
                .inner
                .source
                .role_slot(RoleName::YAxis)
                .unwrap_or(classified.y_count);
            classified.y_count += 1;
            place(&mut classified.y, slot, column_data(column, column.index()));
        }
        if column.has_role(RoleName::Tooltip) {
            let slot = column
                .inner
                .source
                .role_slot(RoleName::Tooltip)
                .unwrap_or(classified.tooltip_count);
            classified.tooltip_count += 1;
            let column_id = resolve_column_id(column, columns, metadata);
            place(&mut classified.tooltips, slot, column_data(column, column_id));
        }
        if column.has_role(RoleName::Legend) {
            classified.legend = Some(legend_data(column, columns, metadata));
        }
        if column.has_role(RoleName::ControlLegend) {
            classified.control_legend = Some(legend_data(column, columns, metadata));
        }
        if column.has_role(RoleName::SlabX) {
            classified.slab_x = Some(column_data(column, column.index()));
        }
        if column.has_role(RoleName::SlabY) {
            classified.slab_y = Some(column_data(column, column.index()));
        }
        if column.has_role(RoleName::Rollout) {
            classified.rollout = Some(column_data(column, column.index()));
        }
    }

    debug!(
        x_count = classified.x_count,
        y_count = classified.y_count,
        tooltip_count = classified.tooltip_count,
        has_legend = classified.legend.is_some(),
        has_control_legend = classified.control_legend.is_some(),
        has_rollout = classified.rollout.is_some(),
        "classified columns"
    );
    classified
}

fn column_data(column: &Column, column_id: usize) -> ColumnData {
    ColumnData {
        name: column.name().to_owned(),
        values: column.inner.values.clone(),
        column_id,
        value_type: column.inner.source.value_type,
    }
}

fn legend_data(column: &Column, columns: &[Column], metadata: &DataViewMetadata) -> LegendData {
    LegendData {
        name: column.name().to_owned(),
        values: column.inner.values.clone(),
        column_id: resolve_column_id(column, columns, metadata),
        row_objects: column.inner.objects.clone(),
    }
}

fn place(slots: &mut Vec<Option<ColumnData>>, slot: usize, data: ColumnData) {
    if slots.len() <= slot {
        slots.resize(slot + 1, None);
    }
    if let Some(previous) = &slots[slot] {
        warn!(slot, previous = %previous.name, name = %data.name, "slot assigned twice");
    }
    slots[slot] = Some(data);
}

/// Host index to use for metadata lookups of `column`.
///
/// When the metadata table has no entry for the column's own index, the
/// column is looked up by display name in the other host list.
fn resolve_column_id(column: &Column, columns: &[Column], metadata: &DataViewMetadata) -> usize {
    if metadata.column(column.index()).is_some() {
        return column.index();
    }
    match columns
        .iter()
        .find(|other| other.origin != column.origin && other.name() == column.name())
    {
        Some(other) => {
            trace!(
                name = column.name(),
                from = column.index(),
                to = other.index(),
                "resolved column index by name"
            );
            other.index()
        }
        None => column.index(),
    }
}

#[cfg(test)]
mod tests {
    use super::{ColumnOrigin, classify_columns, unify_columns};
    use crate::api::{Categorical, DataViewColumn, DataViewMetadata, MetadataColumn, RoleName};
    use crate::core::PrimitiveValue;

    fn column(name: &str, index: usize, role: RoleName, slot: Option<usize>) -> DataViewColumn {
        DataViewColumn::new(
            MetadataColumn::new(name, index).with_role(role, slot),
            vec![PrimitiveValue::from(1.0)],
        )
    }

    #[test]
    fn duplicates_within_a_list_are_dropped_first_wins() {
        let categorical = Categorical {
            categories: vec![
                column("a", 0, RoleName::XAxis, None),
                column("a-copy", 0, RoleName::XAxis, None),
            ],
            values: vec![column("b", 0, RoleName::YAxis, Some(0))],
        };
        let columns = unify_columns(&categorical);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name(), "a");
        assert_eq!(columns[0].origin, ColumnOrigin::Category);
        assert_eq!(columns[1].origin, ColumnOrigin::Value);
    }

    #[test]
    fn tooltip_index_missing_from_metadata_resolves_by_name() {
        let categorical = Categorical {
            categories: vec![column("speed", 7, RoleName::Tooltip, Some(0))],
            values: vec![column("speed", 3, RoleName::YAxis, Some(0))],
        };
        let metadata = DataViewMetadata {
            columns: vec![MetadataColumn::new("speed", 3)],
            objects: None,
        };
        let classified = classify_columns(&unify_columns(&categorical), &metadata);
        let tooltip = classified.tooltips[0].as_ref().expect("tooltip slot");
        assert_eq!(tooltip.column_id, 3);
    }

    #[test]
    fn missing_slot_falls_back_to_order_of_appearance() {
        let categorical = Categorical {
            categories: vec![],
            values: vec![
                column("first", 1, RoleName::YAxis, None),
                column("second", 2, RoleName::YAxis, None),
            ],
        };
        let classified = classify_columns(&unify_columns(&categorical), &DataViewMetadata::default());
        let names: Vec<_> = classified
            .y
            .iter()
            .map(|slot| slot.as_ref().map(|c| c.name.as_str()))
            .collect();
        assert_eq!(names, vec![Some("first"), Some("second")]);
    }
}
