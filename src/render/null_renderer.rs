use crate::error::ChartResult;
use crate::render::{NodeKind, Renderer, Scene};

/// No-op renderer used by tests and headless usage.
///
/// It still validates the scene so tests can catch invalid geometry before
/// it reaches a real backend.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub render_count: usize,
    pub last_circle_count: usize,
    pub last_rect_count: usize,
    pub last_text_count: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, scene: &Scene) -> ChartResult<()> {
        scene.validate()?;
        self.render_count += 1;
        self.last_circle_count = scene.count(NodeKind::Circle);
        self.last_rect_count = scene.count(NodeKind::Rect);
        self.last_text_count = scene.count(NodeKind::Text);
        Ok(())
    }
}
