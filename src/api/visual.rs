use tracing::{debug, warn};

use crate::api::{
    DataView, DefaultIdentityService, IdentityService, LegendKind, ObjectInstance, ViewModel,
    VisualConfig, enumerate_object_instances, visual_transform,
};
use crate::core::{Viewport, ZoomTransform};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{
    HoverState, HoveredPoint, LegendEvent, LegendSelection, RenderState, apply_zoom,
    place_tooltip, tooltip_lines,
};
use crate::render::{
    RenderOutcome, Renderer, Scene, draw_error_panel, draw_view_model, hide_hover, move_hover,
    rebind_zoom, redraw_plot, set_category_opacity, show_hover, tooltip_size,
};

/// The visual a host drives: feed it data views and pointer events, read
/// the scene back through the renderer.
pub struct Visual<R: Renderer> {
    renderer: R,
    config: VisualConfig,
    identity: Box<dyn IdentityService>,
    scene: Scene,
    data_view: Option<DataView>,
    view_model: Option<ViewModel>,
    render_state: Option<RenderState>,
    outcome: RenderOutcome,
    legend_selection: LegendSelection,
    hover: HoverState,
}

impl<R: Renderer> Visual<R> {
    pub fn new(renderer: R, config: VisualConfig) -> ChartResult<Self> {
        Self::with_identity(renderer, config, Box::new(DefaultIdentityService))
    }

    pub fn with_identity(
        renderer: R,
        config: VisualConfig,
        identity: Box<dyn IdentityService>,
    ) -> ChartResult<Self> {
        config.validate()?;
        Ok(Self {
            renderer,
            config,
            identity,
            scene: Scene::new(0.0, 0.0),
            data_view: None,
            view_model: None,
            render_state: None,
            outcome: RenderOutcome::default(),
            legend_selection: LegendSelection::new(),
            hover: HoverState::default(),
        })
    }

    /// Rebuilds the view model and redraws everything.
    ///
    /// A failed build clears the chart, shows the error panel and returns
    /// the error. Failures of single plots only drop those plots; they are
    /// listed by [`Visual::render_errors`].
    pub fn update(&mut self, data_view: DataView, viewport: Viewport) -> ChartResult<()> {
        self.hover = HoverState::default();
        self.scene.set_size(viewport.width, viewport.height);

        let built = visual_transform(&data_view, viewport, self.identity.as_ref(), &self.config)
            .and_then(|view_model| {
                let state = RenderState::new(&view_model)?;
                Ok((view_model, state))
            });
        let (view_model, state) = match built {
            Ok(built) => built,
            Err(err) => {
                self.data_view = Some(data_view);
                self.view_model = None;
                self.render_state = None;
                self.outcome = RenderOutcome::default();
                self.display_error(&err)?;
                return Err(err);
            }
        };

        let mut selection = std::mem::take(&mut self.legend_selection);
        for legend in view_model.legends() {
            selection = selection.reduce(&LegendEvent::Sync {
                kind: legend.kind,
                categories: legend.categories().map(str::to_owned).collect(),
            });
        }
        self.legend_selection = selection;

        self.outcome = draw_view_model(
            &mut self.scene,
            &view_model,
            &state,
            &self.legend_selection,
            &self.config,
        );
        debug!(
            plots = view_model.plot_models.len(),
            failed = self.outcome.errors.len(),
            "visual updated"
        );
        self.data_view = Some(data_view);
        self.view_model = Some(view_model);
        self.render_state = Some(state);
        self.render()
    }

    /// Replaces the scene with the error panel.
    pub fn display_error(&mut self, error: &ChartError) -> ChartResult<()> {
        warn!(error = %error, name = error.name(), "displaying error");
        draw_error_panel(&mut self.scene, error)?;
        self.render()
    }

    /// Applies one zoom frame. Does nothing when zooming is disabled or no
    /// chart is drawn.
    pub fn on_zoom(&mut self, transform: ZoomTransform) -> ChartResult<()> {
        let (Some(view_model), Some(state)) = (&self.view_model, &self.render_state) else {
            return Ok(());
        };
        if !view_model.zooming_settings.enable_zoom {
            return Ok(());
        }

        let zoomed = apply_zoom(
            state,
            transform,
            &view_model.plot_models,
            view_model.zooming_settings.maximum_zoom,
        )
        .and_then(|next| {
            rebind_zoom(&mut self.scene, &self.outcome, view_model, &next)?;
            Ok(next)
        });
        match zoomed {
            Ok(next) => {
                self.render_state = Some(next);
                self.render()
            }
            Err(err) => self.fail_interaction("zoom function", err),
        }
    }

    /// Toggles a legend category, updates the legend entry and redraws the
    /// plots filtered by the legends.
    pub fn on_legend_click(&mut self, kind: LegendKind, category: &str) -> ChartResult<()> {
        let (Some(view_model), Some(state)) = (&self.view_model, &self.render_state) else {
            return Ok(());
        };
        let selection = std::mem::take(&mut self.legend_selection).reduce(&LegendEvent::Toggle {
            kind,
            category: category.to_owned(),
        });
        self.legend_selection = selection;

        let opacity =
            self.legend_selection
                .opacity(kind, category, self.config.legend_unselected_opacity);
        let mut result = set_category_opacity(&mut self.scene, kind, category, opacity);
        for plot in view_model
            .plot_models
            .iter()
            .filter(|plot| plot.is_dependent(&self.config.dependent_marker))
        {
            if result.is_err() {
                break;
            }
            result = redraw_plot(
                &mut self.scene,
                &mut self.outcome,
                plot,
                view_model,
                state,
                &self.legend_selection,
                &self.config,
            );
        }
        match result {
            Ok(()) => self.render(),
            Err(err) => self.fail_interaction("legend click", err),
        }
    }

    /// Pointer entered a drawn point.
    pub fn on_pointer_over(&mut self, point: HoveredPoint) -> ChartResult<()> {
        if self.view_model.is_none() {
            return Ok(());
        }
        self.hover = HoverState::over(point);
        match show_hover(&mut self.scene, &self.outcome, point) {
            Ok(()) => self.render(),
            Err(err) => self.fail_interaction("tooltip mouseover", err),
        }
    }

    /// Pointer moved over the hovered point; `pointer` is in svg coordinates.
    pub fn on_pointer_move(&mut self, pointer: (f64, f64)) -> ChartResult<()> {
        let (Some(view_model), Some(point)) = (&self.view_model, self.hover.hovered) else {
            return Ok(());
        };
        let Some(x) = view_model
            .plot(point.plot_id)
            .and_then(|plot| plot.data_points.get(point.index))
            .and_then(|p| p.x_value)
        else {
            return Ok(());
        };

        let lines = tooltip_lines(&view_model.tooltip_models, x);
        let placement = place_tooltip(
            pointer,
            tooltip_size(&lines, &self.config),
            (view_model.svg_width, view_model.svg_height),
            self.config.tooltip_offset,
        );
        let ruler_x = pointer.0 - view_model.general.margins.left;
        self.hover = std::mem::take(&mut self.hover).moved(lines, placement, ruler_x);

        match move_hover(&mut self.scene, &self.outcome, &self.hover, &self.config) {
            Ok(()) => self.render(),
            Err(err) => self.fail_interaction("tooltip mousemove", err),
        }
    }

    /// Pointer left the hovered point.
    pub fn on_pointer_out(&mut self) -> ChartResult<()> {
        let Some(point) = std::mem::take(&mut self.hover).hovered else {
            return Ok(());
        };
        match hide_hover(&mut self.scene, &self.outcome, point) {
            Ok(()) => self.render(),
            Err(err) => self.fail_interaction("tooltip mouseout", err),
        }
    }

    /// Property instances the host shows in its formatting pane.
    pub fn enumerate_object_instances(&self, object_name: &str) -> ChartResult<Vec<ObjectInstance>> {
        match (&self.data_view, &self.view_model) {
            (Some(data_view), Some(view_model)) => {
                enumerate_object_instances(object_name, data_view, view_model)
            }
            _ => Ok(Vec::new()),
        }
    }

    pub fn render(&mut self) -> ChartResult<()> {
        self.renderer.render(&self.scene)
    }

    fn fail_interaction(&mut self, operation: &'static str, source: ChartError) -> ChartResult<()> {
        let err = ChartError::interaction(operation, source);
        self.display_error(&err)?;
        Err(err)
    }

    #[must_use]
    pub fn view_model(&self) -> Option<&ViewModel> {
        self.view_model.as_ref()
    }

    #[must_use]
    pub fn render_state(&self) -> Option<&RenderState> {
        self.render_state.as_ref()
    }

    #[must_use]
    pub fn legend_selection(&self) -> &LegendSelection {
        &self.legend_selection
    }

    #[must_use]
    pub fn hover(&self) -> &HoverState {
        &self.hover
    }

    /// Errors of plots that could not be drawn in the last update.
    #[must_use]
    pub fn render_errors(&self) -> &[ChartError] {
        &self.outcome.errors
    }

    #[must_use]
    pub fn outcome(&self) -> &RenderOutcome {
        &self.outcome
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn config(&self) -> &VisualConfig {
        &self.config
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }
}
