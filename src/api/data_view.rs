use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::api::SettingsBag;
use crate::core::PrimitiveValue;
use crate::error::{ChartError, ChartResult};

/// Semantic role the host attaches to a query column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoleName {
    #[serde(rename = "x_axis")]
    XAxis,
    #[serde(rename = "y_axis")]
    YAxis,
    #[serde(rename = "tooltip")]
    Tooltip,
    #[serde(rename = "legend")]
    Legend,
    #[serde(rename = "controlLegend")]
    ControlLegend,
    #[serde(rename = "slabX")]
    SlabX,
    #[serde(rename = "slabY")]
    SlabY,
    #[serde(rename = "rollout")]
    Rollout,
}

impl RoleName {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::XAxis => "x_axis",
            Self::YAxis => "y_axis",
            Self::Tooltip => "tooltip",
            Self::Legend => "legend",
            Self::ControlLegend => "controlLegend",
            Self::SlabX => "slabX",
            Self::SlabY => "slabY",
            Self::Rollout => "rollout",
        }
    }
}

/// Host-side type flags of a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueType {
    #[serde(default)]
    pub numeric: bool,
    #[serde(default)]
    pub integer: bool,
    #[serde(default)]
    pub date_time: bool,
    #[serde(default)]
    pub text: bool,
}

impl ValueType {
    #[must_use]
    pub fn numeric() -> Self {
        Self {
            numeric: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn integer() -> Self {
        Self {
            numeric: true,
            integer: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn date_time() -> Self {
        Self {
            date_time: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn text() -> Self {
        Self {
            text: true,
            ..Self::default()
        }
    }
}

/// Column descriptor as listed in the host's metadata table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataColumn {
    pub display_name: String,
    #[serde(default)]
    pub query_name: String,
    pub index: usize,
    #[serde(default)]
    pub roles: IndexMap<RoleName, bool>,
    #[serde(default)]
    pub roles_index: IndexMap<RoleName, Vec<usize>>,
    #[serde(default, rename = "type")]
    pub value_type: ValueType,
    #[serde(default)]
    pub objects: Option<SettingsBag>,
}

impl MetadataColumn {
    #[must_use]
    pub fn new(display_name: impl Into<String>, index: usize) -> Self {
        let display_name = display_name.into();
        Self {
            query_name: display_name.clone(),
            display_name,
            index,
            roles: IndexMap::new(),
            roles_index: IndexMap::new(),
            value_type: ValueType::numeric(),
            objects: None,
        }
    }

    /// Adds `role`, optionally with the host-assigned slot among same-role columns.
    #[must_use]
    pub fn with_role(mut self, role: RoleName, slot: Option<usize>) -> Self {
        self.roles.insert(role, true);
        if let Some(slot) = slot {
            self.roles_index.entry(role).or_default().push(slot);
        }
        self
    }

    #[must_use]
    pub fn with_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    #[must_use]
    pub fn with_objects(mut self, objects: SettingsBag) -> Self {
        self.objects = Some(objects);
        self
    }

    #[must_use]
    pub fn has_role(&self, role: RoleName) -> bool {
        self.roles.get(&role).copied().unwrap_or(false)
    }

    /// First slot index the host assigned for `role`.
    #[must_use]
    pub fn role_slot(&self, role: RoleName) -> Option<usize> {
        self.roles_index
            .get(&role)
            .and_then(|slots| slots.first().copied())
    }
}

/// One column of the categorical result: descriptor plus cell values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataViewColumn {
    pub source: MetadataColumn,
    #[serde(default)]
    pub values: Vec<PrimitiveValue>,
    /// Per-row property bags (category columns only).
    #[serde(default)]
    pub objects: Option<Vec<Option<SettingsBag>>>,
}

impl DataViewColumn {
    #[must_use]
    pub fn new(source: MetadataColumn, values: Vec<PrimitiveValue>) -> Self {
        Self {
            source,
            values,
            objects: None,
        }
    }

    #[must_use]
    pub fn with_row_objects(mut self, objects: Vec<Option<SettingsBag>>) -> Self {
        self.objects = Some(objects);
        self
    }

    /// Property bag attached to row `row`, if any.
    #[must_use]
    pub fn row_objects(&self, row: usize) -> Option<&SettingsBag> {
        self.objects
            .as_ref()
            .and_then(|rows| rows.get(row))
            .and_then(Option::as_ref)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Categorical {
    #[serde(default)]
    pub categories: Vec<DataViewColumn>,
    #[serde(default)]
    pub values: Vec<DataViewColumn>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataViewMetadata {
    #[serde(default)]
    pub columns: Vec<MetadataColumn>,
    #[serde(default)]
    pub objects: Option<SettingsBag>,
}

impl DataViewMetadata {
    /// Metadata entry carrying host index `index`.
    #[must_use]
    pub fn column(&self, index: usize) -> Option<&MetadataColumn> {
        self.columns.iter().find(|c| c.index == index)
    }
}

/// Query result handed over by the host on every update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataView {
    #[serde(default)]
    pub metadata: Option<DataViewMetadata>,
    #[serde(default)]
    pub categorical: Option<Categorical>,
}

impl DataView {
    /// Builds a data view whose metadata table lists every column once.
    #[must_use]
    pub fn from_columns(
        categories: Vec<DataViewColumn>,
        values: Vec<DataViewColumn>,
        objects: Option<SettingsBag>,
    ) -> Self {
        let mut columns: Vec<MetadataColumn> = Vec::new();
        for column in categories.iter().chain(values.iter()) {
            if !columns.iter().any(|c| c.index == column.source.index) {
                columns.push(column.source.clone());
            }
        }
        Self {
            metadata: Some(DataViewMetadata { columns, objects }),
            categorical: Some(Categorical { categories, values }),
        }
    }

    pub fn from_json(json: &str) -> ChartResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ChartError::ParseAndTransform(format!("failed to parse data view: {e}")))
    }

    /// Metadata and categorical parts, or the error shown when either is missing.
    pub fn parts(&self) -> ChartResult<(&DataViewMetadata, &Categorical)> {
        match (&self.metadata, &self.categorical) {
            (Some(metadata), Some(categorical)) => Ok((metadata, categorical)),
            _ => Err(ChartError::ParseAndTransform(
                "No categorical data in Axis or Values".to_owned(),
            )),
        }
    }
}
