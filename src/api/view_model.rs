use crate::api::{
    ColorSettings, GeneralPlotSettings, HeatmapSettings, Legend, PlotModel, RolloutRectangles,
    SlabRectangle, TooltipModel, ZoomingSettings,
};

/// Everything one render cycle draws. Rebuilt from scratch on every update.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub plot_models: Vec<PlotModel>,
    pub general: GeneralPlotSettings,
    pub color_settings: ColorSettings,
    pub heatmap_settings: HeatmapSettings,
    pub zooming_settings: ZoomingSettings,
    pub tooltip_models: Vec<TooltipModel>,
    pub slab_rectangles: Option<Vec<SlabRectangle>>,
    pub rollout_rectangles: Option<RolloutRectangles>,
    pub error_legend: Option<Legend>,
    pub control_legend: Option<Legend>,
    pub svg_width: f64,
    pub svg_height: f64,
    pub svg_top_padding: f64,
}

impl ViewModel {
    #[must_use]
    pub fn plot(&self, plot_id: usize) -> Option<&PlotModel> {
        self.plot_models.get(plot_id)
    }

    /// Both legends, error legend first.
    pub fn legends(&self) -> impl Iterator<Item = &Legend> {
        self.error_legend.iter().chain(self.control_legend.iter())
    }

    #[must_use]
    pub fn has_legend_row(&self) -> bool {
        self.error_legend.is_some()
            || self.control_legend.is_some()
            || self.rollout_rectangles.is_some()
    }
}
