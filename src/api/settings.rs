//! Host property bag access and the typed settings resolved from it.
//!
//! The host stores formatting choices as `category -> key -> value`. Every
//! lookup goes through [`get_value`]; the rest of the crate only sees the
//! typed structs below.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::error::{ChartError, ChartResult};

/// Solid fill as the host encodes colors: `{"solid": {"color": "#rrggbb"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub solid: SolidColor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolidColor {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Fill(Fill),
}

impl SettingValue {
    #[must_use]
    pub fn color(color: impl Into<String>) -> Self {
        Self::Fill(Fill {
            solid: SolidColor {
                color: color.into(),
            },
        })
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// `category -> key -> value` property bag attached to the visual or a column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsBag(IndexMap<String, IndexMap<String, SettingValue>>);

impl SettingsBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(
        mut self,
        category: SettingsCategory,
        key: &str,
        value: impl Into<SettingValue>,
    ) -> Self {
        self.insert(category, key, value);
        self
    }

    pub fn insert(&mut self, category: SettingsCategory, key: &str, value: impl Into<SettingValue>) {
        self.0
            .entry(category.as_str().to_owned())
            .or_default()
            .insert(key.to_owned(), value.into());
    }

    #[must_use]
    pub fn get(&self, category: SettingsCategory, key: &str) -> Option<&SettingValue> {
        self.0.get(category.as_str()).and_then(|c| c.get(key))
    }
}

/// Conversion from a raw bag entry into a typed value.
pub trait FromSettingValue: Sized {
    fn from_setting(value: &SettingValue) -> Option<Self>;
}

impl FromSettingValue for bool {
    fn from_setting(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

impl FromSettingValue for f64 {
    fn from_setting(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Number(value) if value.is_finite() => Some(*value),
            SettingValue::Text(text) => text.parse().ok(),
            _ => None,
        }
    }
}

impl FromSettingValue for usize {
    fn from_setting(value: &SettingValue) -> Option<Self> {
        f64::from_setting(value)
            .filter(|v| *v >= 0.0)
            .map(|v| v.round() as usize)
    }
}

/// Text settings; fills are accepted so color entries read as `#rrggbb`.
impl FromSettingValue for String {
    fn from_setting(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Text(text) => Some(text.clone()),
            SettingValue::Fill(fill) => Some(fill.solid.color.clone()),
            _ => None,
        }
    }
}

/// Resolves `objects[category][key]`, falling back to `default` when the bag,
/// the entry, or a value of the right type is missing.
pub fn get_value<T: FromSettingValue>(
    objects: Option<&SettingsBag>,
    category: SettingsCategory,
    key: &str,
    default: T,
) -> T {
    let Some(raw) = objects.and_then(|o| o.get(category, key)) else {
        return default;
    };
    match T::from_setting(raw) {
        Some(value) => value,
        None => {
            trace!(category = category.as_str(), key, "setting has unexpected type, using default");
            default
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsCategory {
    PlotSettings,
    AxisSettings,
    AxisLabelSettings,
    ColorSelector,
    ColorSettings,
    HeatmapSettings,
    LegendSettings,
    OverlayPlotSettings,
    PlotTitleSettings,
    TooltipTitleSettings,
    YRangeSettings,
    ZoomingSettings,
}

impl SettingsCategory {
    pub const ALL: [Self; 12] = [
        Self::PlotSettings,
        Self::AxisSettings,
        Self::AxisLabelSettings,
        Self::ColorSelector,
        Self::ColorSettings,
        Self::HeatmapSettings,
        Self::LegendSettings,
        Self::OverlayPlotSettings,
        Self::PlotTitleSettings,
        Self::TooltipTitleSettings,
        Self::YRangeSettings,
        Self::ZoomingSettings,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlotSettings => "plotSettings",
            Self::AxisSettings => "axisSettings",
            Self::AxisLabelSettings => "axisLabelSettings",
            Self::ColorSelector => "colorSelector",
            Self::ColorSettings => "colorSettings",
            Self::HeatmapSettings => "heatmapSettings",
            Self::LegendSettings => "legendSettings",
            Self::OverlayPlotSettings => "overlayPlotSettings",
            Self::PlotTitleSettings => "plotTitleSettings",
            Self::TooltipTitleSettings => "tooltipTitleSettings",
            Self::YRangeSettings => "yRangeSettings",
            Self::ZoomingSettings => "zoomingSettings",
        }
    }

    /// Inverse of [`Self::as_str`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

/// Property keys, grouped by category.
pub mod keys {
    pub const PLOT_TYPE: &str = "plotType";
    pub const FILL: &str = "fill";
    pub const USE_LEGEND_COLOR: &str = "useLegendColor";
    pub const SHOW_HEATMAP: &str = "showHeatmap";

    pub const X_AXIS: &str = "xAxis";
    pub const Y_AXIS: &str = "yAxis";

    pub const X_LABEL: &str = "xLabel";
    pub const Y_LABEL: &str = "yLabel";

    pub const VERTICAL_RULER_COLOR: &str = "verticalRulerColor";
    pub const SLAB_COLOR: &str = "slabColor";
    pub const HEATMAP_COLOR_SCHEME: &str = "heatmapColorScheme";

    pub const HEATMAP_BINS: &str = "heatmapBins";

    pub const LEGEND_TITLE: &str = "legendTitle";
    pub const CONTROL_LEGEND_TITLE: &str = "controlLegendTitle";
    pub const LEGEND_COLOR: &str = "legendColor";

    pub const SLAB_TYPE: &str = "slabType";

    pub const TITLE: &str = "title";

    pub const MIN: &str = "min";
    pub const MAX: &str = "max";
    pub const MIN_FIXED: &str = "minFixed";
    pub const MAX_FIXED: &str = "maxFixed";

    pub const SHOW: &str = "show";
    pub const MAXIMUM: &str = "maximum";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlotType {
    #[serde(rename = "BarPlot")]
    Bar,
    #[serde(rename = "ScatterPlot")]
    Scatter,
    #[serde(rename = "LinePlot")]
    Line,
}

impl PlotType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "BarPlot",
            Self::Scatter => "ScatterPlot",
            Self::Line => "LinePlot",
        }
    }
}

impl fmt::Display for PlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlotType {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BarPlot" | "Bar" => Ok(Self::Bar),
            "ScatterPlot" | "Scatter" => Ok(Self::Scatter),
            "LinePlot" | "Line" => Ok(Self::Line),
            other => Err(ChartError::InvalidData(format!("unknown plot type `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlabType {
    None,
    Rectangle,
    Line,
}

impl SlabType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Rectangle => "Rectangle",
            Self::Line => "Line",
        }
    }
}

impl FromStr for SlabType {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(Self::None),
            "Rectangle" => Ok(Self::Rectangle),
            "Line" => Ok(Self::Line),
            other => Err(ChartError::InvalidData(format!("unknown slab type `{other}`"))),
        }
    }
}

/// Which parts of an axis are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisInformation {
    None,
    Ticks,
    Labels,
    TicksLabels,
}

impl AxisInformation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Ticks => "Ticks",
            Self::Labels => "Labels",
            Self::TicksLabels => "TicksLabels",
        }
    }

    #[must_use]
    pub fn ticks(self) -> bool {
        matches!(self, Self::Ticks | Self::TicksLabels)
    }

    #[must_use]
    pub fn labels(self) -> bool {
        matches!(self, Self::Labels | Self::TicksLabels)
    }
}

impl FromStr for AxisInformation {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(Self::None),
            "Ticks" => Ok(Self::Ticks),
            "Labels" => Ok(Self::Labels),
            "TicksLabels" => Ok(Self::TicksLabels),
            other => Err(ChartError::AxisInformation {
                value: other.to_owned(),
            }),
        }
    }
}

fn enum_setting<T: FromStr<Err = ChartError> + Copy>(
    objects: Option<&SettingsBag>,
    category: SettingsCategory,
    key: &str,
    default: T,
) -> T
where
    T: EnumName,
{
    let raw = get_value(objects, category, key, default.name().to_owned());
    raw.parse().unwrap_or_else(|err: ChartError| {
        warn!(category = category.as_str(), key, error = %err, "falling back to default");
        default
    })
}

/// Name lookup shared by the setting enums.
pub trait EnumName {
    fn name(self) -> &'static str;
}

impl EnumName for PlotType {
    fn name(self) -> &'static str {
        self.as_str()
    }
}

impl EnumName for SlabType {
    fn name(self) -> &'static str {
        self.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSettings {
    pub fill: String,
    pub plot_type: PlotType,
    pub use_legend_color: bool,
    pub show_heatmap: bool,
}

impl PlotSettings {
    pub const DEFAULT_FILL: &'static str = "#000000";

    #[must_use]
    pub fn resolve(objects: Option<&SettingsBag>) -> Self {
        let category = SettingsCategory::PlotSettings;
        Self {
            fill: get_value(objects, category, keys::FILL, Self::DEFAULT_FILL.to_owned()),
            plot_type: enum_setting(objects, category, keys::PLOT_TYPE, PlotType::Line),
            use_legend_color: get_value(objects, category, keys::USE_LEGEND_COLOR, false),
            show_heatmap: get_value(objects, category, keys::SHOW_HEATMAP, false),
        }
    }
}

/// Per-axis tick/label visibility of one plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSettings {
    pub x_axis: AxisInformation,
    pub y_axis: AxisInformation,
}

impl FormatSettings {
    pub fn resolve(objects: Option<&SettingsBag>) -> ChartResult<Self> {
        let category = SettingsCategory::AxisSettings;
        let x_axis = get_value(
            objects,
            category,
            keys::X_AXIS,
            AxisInformation::Ticks.as_str().to_owned(),
        );
        let y_axis = get_value(
            objects,
            category,
            keys::Y_AXIS,
            AxisInformation::Ticks.as_str().to_owned(),
        );
        Ok(Self {
            x_axis: x_axis.parse()?,
            y_axis: y_axis.parse()?,
        })
    }

    /// Whether the x-axis reserves extra room for its label under the ticks.
    #[must_use]
    pub fn x_label_space(self) -> bool {
        self.x_axis.ticks() && self.x_axis.labels()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisLabelSettings {
    pub x_label: String,
    pub y_label: String,
}

impl AxisLabelSettings {
    #[must_use]
    pub fn resolve(objects: Option<&SettingsBag>, x_default: &str, y_default: &str) -> Self {
        let category = SettingsCategory::AxisLabelSettings;
        Self {
            x_label: get_value(objects, category, keys::X_LABEL, x_default.to_owned()),
            y_label: get_value(objects, category, keys::Y_LABEL, y_default.to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotTitleSettings {
    pub title: String,
}

impl PlotTitleSettings {
    #[must_use]
    pub fn resolve(objects: Option<&SettingsBag>, default: &str) -> Self {
        Self {
            title: get_value(
                objects,
                SettingsCategory::PlotTitleSettings,
                keys::TITLE,
                default.to_owned(),
            ),
        }
    }

    #[must_use]
    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayPlotSettings {
    pub slab_type: SlabType,
}

impl OverlayPlotSettings {
    #[must_use]
    pub fn resolve(objects: Option<&SettingsBag>) -> Self {
        Self {
            slab_type: enum_setting(
                objects,
                SettingsCategory::OverlayPlotSettings,
                keys::SLAB_TYPE,
                SlabType::None,
            ),
        }
    }
}

/// Y-axis range of one plot and which ends survive zoom auto-fitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YRange {
    pub min: f64,
    pub max: f64,
    pub min_fixed: bool,
    pub max_fixed: bool,
}

impl YRange {
    #[must_use]
    pub fn resolve(objects: Option<&SettingsBag>, data_max: f64) -> Self {
        let category = SettingsCategory::YRangeSettings;
        Self {
            min: get_value(objects, category, keys::MIN, 0.0),
            max: get_value(objects, category, keys::MAX, data_max),
            min_fixed: get_value(objects, category, keys::MIN_FIXED, true),
            max_fixed: get_value(objects, category, keys::MAX_FIXED, false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSettings {
    pub vertical_ruler_color: String,
    pub slab_color: String,
    pub heatmap_color_scheme: String,
}

impl ColorSettings {
    #[must_use]
    pub fn resolve(objects: Option<&SettingsBag>) -> Self {
        let category = SettingsCategory::ColorSettings;
        Self {
            vertical_ruler_color: get_value(
                objects,
                category,
                keys::VERTICAL_RULER_COLOR,
                "#000000".to_owned(),
            ),
            slab_color: get_value(objects, category, keys::SLAB_COLOR, "#000000".to_owned()),
            heatmap_color_scheme: get_value(
                objects,
                category,
                keys::HEATMAP_COLOR_SCHEME,
                "interpolateBlues".to_owned(),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapSettings {
    pub heatmap_bins: usize,
}

impl HeatmapSettings {
    #[must_use]
    pub fn resolve(objects: Option<&SettingsBag>) -> Self {
        Self {
            heatmap_bins: get_value(
                objects,
                SettingsCategory::HeatmapSettings,
                keys::HEATMAP_BINS,
                100,
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomingSettings {
    pub enable_zoom: bool,
    pub maximum_zoom: f64,
}

impl ZoomingSettings {
    #[must_use]
    pub fn resolve(objects: Option<&SettingsBag>) -> Self {
        let category = SettingsCategory::ZoomingSettings;
        Self {
            enable_zoom: get_value(objects, category, keys::SHOW, true),
            maximum_zoom: get_value(objects, category, keys::MAXIMUM, 10.0_f64).max(1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipTitleSettings {
    pub title: String,
}

impl TooltipTitleSettings {
    #[must_use]
    pub fn resolve(objects: Option<&SettingsBag>, default: &str) -> Self {
        Self {
            title: get_value(
                objects,
                SettingsCategory::TooltipTitleSettings,
                keys::TITLE,
                default.to_owned(),
            ),
        }
    }
}
