use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::api::{PlotModel, ViewModel};
use crate::core::{LinearScale, ValueRange, ZoomTransform};
use crate::error::ChartResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoomPhase {
    /// Scales equal the layout scales.
    Idle,
    /// A non-identity transform is applied.
    Zoomed,
}

/// Live scales of one render cycle.
///
/// Created from the view model after every update; replaced, never mutated,
/// by [`apply_zoom`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderState {
    /// Layout x-scale every transform is applied to.
    pub base_x: LinearScale,
    pub x_scale: LinearScale,
    /// One y-scale per plot, indexed by plot id.
    pub y_scales: Vec<LinearScale>,
    pub transform: ZoomTransform,
    pub phase: ZoomPhase,
}

impl RenderState {
    pub fn new(view_model: &ViewModel) -> ChartResult<Self> {
        let base_x = view_model.general.x_axis.x_scale;
        let y_scales = view_model
            .plot_models
            .iter()
            .map(|plot| base_y_scale(plot, view_model.general.plot_height))
            .collect::<ChartResult<Vec<_>>>()?;
        Ok(Self {
            base_x,
            x_scale: base_x,
            y_scales,
            transform: ZoomTransform::IDENTITY,
            phase: ZoomPhase::Idle,
        })
    }

    #[must_use]
    pub fn y_scale(&self, plot_id: usize) -> Option<LinearScale> {
        self.y_scales.get(plot_id).copied()
    }

    /// Visible x interval in data units.
    #[must_use]
    pub fn visible_x(&self) -> ValueRange {
        self.x_scale.domain_extent()
    }

    #[must_use]
    pub fn is_zoomed(&self) -> bool {
        self.phase == ZoomPhase::Zoomed
    }
}

/// Y-scale from the plot's configured range onto `[plot_height, 0]`.
pub fn base_y_scale(plot: &PlotModel, plot_height: f64) -> ChartResult<LinearScale> {
    LinearScale::new(plot.y_range.min, plot.y_range.max)?.with_range(plot_height, 0.0)
}

/// Next render state for a zoom gesture frame.
///
/// The factor is clamped to `[1, max_zoom]` first. A pure pan (`k == 1`,
/// non-zero translate) then resets the transform to the identity and leaves
/// every y-scale as it was. Otherwise the base x-scale is rescaled and each
/// plot's y-domain is fitted to the points inside the visible x interval.
/// Pinned bounds keep their configured value. A plot with no visible points
/// keeps its previous y-domain.
pub fn apply_zoom(
    state: &RenderState,
    transform: ZoomTransform,
    plots: &[PlotModel],
    max_zoom: f64,
) -> ChartResult<RenderState> {
    let transform = transform.validate()?.clamp_scale(1.0, max_zoom);
    if transform.is_pan_only() {
        trace!(x = transform.x, y = transform.y, "pan without zoom, resetting transform");
        return Ok(RenderState {
            x_scale: state.base_x,
            transform: ZoomTransform::IDENTITY,
            phase: ZoomPhase::Idle,
            ..state.clone()
        });
    }

    let x_scale = transform.rescale_x(state.base_x)?;
    let visible = x_scale.domain_extent();

    let mut y_scales = Vec::with_capacity(plots.len());
    for plot in plots {
        let Some(previous) = state.y_scales.get(plot.plot_id).copied() else {
            continue;
        };
        let fitted = ValueRange::from_values(
            plot.drawable_points()
                .filter(|(_, x, _)| visible.contains(*x))
                .map(|(_, _, y)| y),
        );
        let scale = match fitted {
            Some(range) => {
                let min = if plot.y_range.min_fixed {
                    plot.y_range.min
                } else {
                    range.min
                };
                let max = if plot.y_range.max_fixed {
                    plot.y_range.max
                } else {
                    range.max
                };
                previous.with_domain(min, max)?
            }
            None => previous,
        };
        y_scales.push(scale);
    }

    let phase = if transform.is_identity() {
        ZoomPhase::Idle
    } else {
        ZoomPhase::Zoomed
    };
    debug!(
        k = transform.k,
        x = transform.x,
        visible_min = visible.min,
        visible_max = visible.max,
        "applied zoom"
    );
    Ok(RenderState {
        base_x: state.base_x,
        x_scale,
        y_scales,
        transform,
        phase,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::{RenderState, ZoomPhase, apply_zoom};
    use crate::api::{
        DataView, DefaultIdentityService, MetadataColumn, RoleName, SettingsBag, SettingsCategory,
        DataViewColumn, VisualConfig, keys, visual_transform,
    };
    use crate::core::{PrimitiveValue, Viewport, ZoomTransform};

    fn view_model(y_objects: Option<SettingsBag>) -> crate::api::ViewModel {
        let x = DataViewColumn::new(
            MetadataColumn::new("x", 0).with_role(RoleName::XAxis, None),
            (0..=10).map(|v| PrimitiveValue::from(f64::from(v))).collect(),
        );
        let mut y_meta = MetadataColumn::new("y", 1).with_role(RoleName::YAxis, Some(0));
        if let Some(objects) = y_objects {
            y_meta = y_meta.with_objects(objects);
        }
        let y = DataViewColumn::new(
            y_meta,
            (0..=10).map(|v| PrimitiveValue::from(f64::from(v * 10))).collect(),
        );
        let data_view = DataView::from_columns(vec![x], vec![y], None);
        visual_transform(
            &data_view,
            Viewport::new(585.0, 300.0),
            &DefaultIdentityService,
            &VisualConfig::default(),
        )
        .expect("view model")
    }

    #[test]
    fn pure_pan_resets_and_keeps_y_domains() {
        let model = view_model(None);
        let state = RenderState::new(&model).expect("state");
        let zoomed = apply_zoom(
            &state,
            ZoomTransform::new(2.0, -250.0, 0.0),
            &model.plot_models,
            10.0,
        )
        .expect("zoom");
        let panned = apply_zoom(
            &zoomed,
            ZoomTransform::new(1.0, 40.0, 0.0),
            &model.plot_models,
            10.0,
        )
        .expect("pan");
        assert_eq!(panned.transform, ZoomTransform::IDENTITY);
        assert_eq!(panned.phase, ZoomPhase::Idle);
        assert_eq!(panned.x_scale, state.base_x);
        assert_eq!(panned.y_scales, zoomed.y_scales);
    }

    #[test]
    fn zoom_out_with_translate_clamps_into_a_reset() {
        let model = view_model(None);
        let state = RenderState::new(&model).expect("state");
        let next = apply_zoom(
            &state,
            ZoomTransform::new(0.5, 300.0, 0.0),
            &model.plot_models,
            10.0,
        )
        .expect("zoom");
        assert_eq!(next.transform, ZoomTransform::IDENTITY);
        assert_eq!(next.phase, ZoomPhase::Idle);
        assert_eq!(next.x_scale, state.base_x);
        assert_eq!(next.y_scales, state.y_scales);
    }

    #[test]
    fn zoom_fits_unpinned_max_to_visible_points() {
        let model = view_model(None);
        let state = RenderState::new(&model).expect("state");
        // plot width 500 over x in [0, 10]: k=2, x=-250 shows [2.5, 7.5]
        let zoomed = apply_zoom(
            &state,
            ZoomTransform::new(2.0, -250.0, 0.0),
            &model.plot_models,
            10.0,
        )
        .expect("zoom");
        assert_eq!(zoomed.phase, ZoomPhase::Zoomed);
        let (min, max) = zoomed.y_scales[0].domain();
        assert_abs_diff_eq!(min, 0.0);
        assert_abs_diff_eq!(max, 70.0);
    }

    #[test]
    fn unpinned_min_follows_visible_points() {
        let objects = SettingsBag::new().with(SettingsCategory::YRangeSettings, keys::MIN_FIXED, false);
        let model = view_model(Some(objects));
        let state = RenderState::new(&model).expect("state");
        let zoomed = apply_zoom(
            &state,
            ZoomTransform::new(2.0, -250.0, 0.0),
            &model.plot_models,
            10.0,
        )
        .expect("zoom");
        let (min, max) = zoomed.y_scales[0].domain();
        assert_abs_diff_eq!(min, 30.0);
        assert_abs_diff_eq!(max, 70.0);
    }

    #[test]
    fn factor_is_clamped_to_maximum() {
        let model = view_model(None);
        let state = RenderState::new(&model).expect("state");
        let zoomed = apply_zoom(
            &state,
            ZoomTransform::new(50.0, 0.0, 0.0),
            &model.plot_models,
            4.0,
        )
        .expect("zoom");
        assert_abs_diff_eq!(zoomed.transform.k, 4.0);
    }

    #[test]
    fn empty_window_keeps_previous_domain() {
        let model = view_model(None);
        let state = RenderState::new(&model).expect("state");
        // shows x in [12.5, 17.5], beyond the data
        let zoomed = apply_zoom(
            &state,
            ZoomTransform::new(2.0, -1250.0, 0.0),
            &model.plot_models,
            10.0,
        )
        .expect("zoom");
        assert_eq!(zoomed.y_scales, state.y_scales);
    }

    #[test]
    fn invalid_transform_is_rejected() {
        let model = view_model(None);
        let state = RenderState::new(&model).expect("state");
        assert!(
            apply_zoom(
                &state,
                ZoomTransform::new(f64::NAN, 0.0, 0.0),
                &model.plot_models,
                10.0
            )
            .is_err()
        );
    }
}
