//! Data pipeline from the host's data view to the view model, plus the
//! [`Visual`] that owns a render cycle.

mod classify;
mod data_view;
mod enumeration;
mod identity;
mod layout;
mod legend;
mod plot_model;
mod rollout;
mod settings;
mod slab;
mod tooltip;
mod transform;
mod validate;
mod view_model;
mod visual;
mod visual_config;

pub use classify::{
    ClassifiedColumns, Column, ColumnData, ColumnOrigin, LegendData, classify_columns,
    unify_columns,
};
pub use data_view::{
    Categorical, DataView, DataViewColumn, DataViewMetadata, MetadataColumn, RoleName, ValueType,
};
pub use enumeration::{ObjectInstance, Selector, enumerate_object_instances};
pub use identity::{DefaultIdentityService, IdentityService, SelectionId};
pub use layout::{GeneralPlotSettings, LayoutRequest, XAxisSettings, compute_layout};
pub use legend::{
    Legend, LegendDataPoint, LegendKind, LegendValue, build_legend, default_legend_color,
};
pub use plot_model::{
    DataPoint, PlotModel, ResolvedPlotSettings, build_plot_models, legend_y_position,
    resolve_plot_settings,
};
pub use rollout::{RolloutRectangle, RolloutRectangles, RolloutStatus, build_rollout_rectangles};
pub use settings::{
    AxisInformation, AxisLabelSettings, ColorSettings, EnumName, Fill, FormatSettings,
    FromSettingValue, HeatmapSettings, OverlayPlotSettings, PlotSettings, PlotTitleSettings,
    PlotType, SettingValue, SettingsBag, SettingsCategory, SlabType, SolidColor,
    TooltipTitleSettings, YRange, ZoomingSettings, get_value, keys,
};
pub use slab::{SlabRectangle, build_slab_rectangles};
pub use tooltip::{
    TooltipDataPoint, TooltipModel, build_tooltip_models, format_date, format_two_decimals,
};
pub use transform::visual_transform;
pub use validate::{ValidatedColumns, XAxisData, YAxisData, validate_columns};
pub use view_model::ViewModel;
pub use visual::Visual;
pub use visual_config::{HeatmapLayout, Margins, VisualConfig};
