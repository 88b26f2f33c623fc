use std::collections::HashMap;

use cairo::{Context, Format, ImageSurface};
use pango::FontDescription;

use crate::error::{ChartError, ChartResult};
use crate::render::{
    AttrValue, Color, NodeId, NodeKind, Renderer, Scene, SceneNode, TextAnchor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub shapes_drawn: usize,
    pub texts_drawn: usize,
    pub hidden_skipped: usize,
}

/// Optional extension trait for renderers that can draw into an external Cairo
/// context (for example a GTK `DrawingArea` callback).
pub trait CairoContextRenderer {
    fn render_on_cairo_context(&mut self, context: &Context, scene: &Scene) -> ChartResult<()>;
}

/// Cairo + Pango + PangoCairo renderer backend.
///
/// Paints the scene tree into an offscreen image surface through
/// `Renderer::render`, or into a host context through `CairoContextRenderer`.
/// Group transforms, clip rectangles, opacity and visibility are honored.
#[derive(Debug)]
pub struct CairoRenderer {
    surface: ImageSurface,
    clear_color: Color,
    last_stats: CairoRenderStats,
}

type ClipRects = HashMap<String, (f64, f64, f64, f64)>;

impl CairoRenderer {
    pub fn new(width: i32, height: i32) -> ChartResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(ChartError::InvalidData(
                "cairo surface size must be > 0".to_owned(),
            ));
        }

        let surface = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| map_backend_error("failed to create cairo surface", err))?;
        Ok(Self {
            surface,
            clear_color: Color::WHITE,
            last_stats: CairoRenderStats::default(),
        })
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        "cairo+pango+pangocairo"
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    pub fn set_clear_color(&mut self, color: Color) -> ChartResult<()> {
        color.validate()?;
        self.clear_color = color;
        Ok(())
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    /// Encodes the last rendered surface as PNG.
    pub fn write_png(&self, out: &mut impl std::io::Write) -> ChartResult<()> {
        self.surface
            .write_to_png(out)
            .map_err(|err| ChartError::InvalidData(format!("failed to encode png: {err}")))
    }

    fn render_with_context(&mut self, context: &Context, scene: &Scene) -> ChartResult<()> {
        scene.validate()?;
        apply_color(context, self.clear_color, 1.0);
        context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;

        let clips = collect_clip_rects(scene);
        let mut stats = CairoRenderStats::default();
        paint_node(context, scene, scene.root(), &clips, 1.0, &mut stats)?;
        self.last_stats = stats;
        Ok(())
    }
}

impl Renderer for CairoRenderer {
    fn render(&mut self, scene: &Scene) -> ChartResult<()> {
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        self.render_with_context(&context, scene)
    }
}

impl CairoContextRenderer for CairoRenderer {
    fn render_on_cairo_context(&mut self, context: &Context, scene: &Scene) -> ChartResult<()> {
        self.render_with_context(context, scene)
    }
}

fn collect_clip_rects(scene: &Scene) -> ClipRects {
    let mut clips = ClipRects::new();
    for id in scene.descendants(scene.root()) {
        let Some(node) = scene.node(id) else {
            continue;
        };
        if node.kind != NodeKind::ClipPath {
            continue;
        }
        let Some(AttrValue::Text(name)) = node.attrs.get("id") else {
            continue;
        };
        let rect = node
            .children
            .first()
            .and_then(|child| scene.node(*child))
            .map(|r| {
                (
                    r.attr_f64("x").unwrap_or(0.0),
                    r.attr_f64("y").unwrap_or(0.0),
                    r.attr_f64("width").unwrap_or(0.0),
                    r.attr_f64("height").unwrap_or(0.0),
                )
            });
        if let Some(rect) = rect {
            clips.insert(name.clone(), rect);
        }
    }
    clips
}

fn paint_node(
    context: &Context,
    scene: &Scene,
    id: NodeId,
    clips: &ClipRects,
    parent_opacity: f64,
    stats: &mut CairoRenderStats,
) -> ChartResult<()> {
    let Some(node) = scene.node(id) else {
        return Ok(());
    };
    if matches!(node.kind, NodeKind::Defs | NodeKind::ClipPath) {
        return Ok(());
    }
    if paint_value(node, "visibility").as_deref() == Some("hidden") {
        stats.hidden_skipped += 1;
        return Ok(());
    }
    let opacity = parent_opacity * node_opacity(node);
    if opacity <= 0.0 {
        return Ok(());
    }

    context.save().map_err(|err| map_backend_error("failed to save context", err))?;
    if let Some(AttrValue::Text(transform)) = node.attrs.get("transform") {
        apply_transform(context, transform);
    }
    if let Some(rect) = clip_rect(node, clips) {
        context.rectangle(rect.0, rect.1, rect.2, rect.3);
        context.clip();
    }

    match node.kind {
        NodeKind::Root | NodeKind::Group => {
            for child in &node.children {
                paint_node(context, scene, *child, clips, opacity, stats)?;
            }
        }
        NodeKind::Rect => {
            context.rectangle(
                attr(node, "x"),
                attr(node, "y"),
                attr(node, "width"),
                attr(node, "height"),
            );
            fill_and_stroke(context, node, opacity)?;
            stats.shapes_drawn += 1;
        }
        NodeKind::Circle => {
            context.new_sub_path();
            context.arc(
                attr(node, "cx"),
                attr(node, "cy"),
                attr(node, "r"),
                0.0,
                std::f64::consts::TAU,
            );
            fill_and_stroke(context, node, opacity)?;
            stats.shapes_drawn += 1;
        }
        NodeKind::Line => {
            context.move_to(attr(node, "x1"), attr(node, "y1"));
            context.line_to(attr(node, "x2"), attr(node, "y2"));
            stroke(context, node, opacity)?;
            stats.shapes_drawn += 1;
        }
        NodeKind::Path => {
            if let Some(AttrValue::Text(d)) = node.attrs.get("d") {
                append_path(context, d);
            }
            fill_and_stroke(context, node, opacity)?;
            stats.shapes_drawn += 1;
        }
        NodeKind::Text => {
            paint_text(context, node, opacity)?;
            stats.texts_drawn += 1;
        }
        NodeKind::Defs | NodeKind::ClipPath => {}
    }

    context
        .restore()
        .map_err(|err| map_backend_error("failed to restore context", err))
}

fn paint_text(context: &Context, node: &SceneNode, opacity: f64) -> ChartResult<()> {
    let Some(text) = &node.text else {
        return Ok(());
    };
    let font_size = paint_value(node, "font-size")
        .and_then(|size| size.trim_end_matches("px").parse::<f64>().ok())
        .unwrap_or(10.0);
    let layout = pangocairo::functions::create_layout(context);
    let font_description = FontDescription::from_string(&format!("Sans {font_size}px"));
    layout.set_font_description(Some(&font_description));
    layout.set_text(text);

    let (text_width, text_height) = layout.pixel_size();
    let x = match paint_value(node, "text-anchor").as_deref() {
        Some(anchor) if anchor == TextAnchor::Middle.as_str() => {
            attr(node, "x") - f64::from(text_width) / 2.0
        }
        Some(anchor) if anchor == TextAnchor::End.as_str() => {
            attr(node, "x") - f64::from(text_width)
        }
        _ => attr(node, "x"),
    };
    // Pango places the top edge, svg places the baseline.
    let y = attr(node, "y") - f64::from(text_height) * 0.8 + em_offset(node, font_size);

    let color = paint_value(node, "fill")
        .and_then(|fill| parse_paint(&fill))
        .unwrap_or(Color::BLACK);
    apply_color(context, color, opacity);
    context.move_to(x, y);
    pangocairo::functions::show_layout(context, &layout);
    Ok(())
}

fn em_offset(node: &SceneNode, font_size: f64) -> f64 {
    match node.attrs.get("dy") {
        Some(AttrValue::Text(dy)) => dy
            .strip_suffix("em")
            .and_then(|em| em.parse::<f64>().ok())
            .map_or(0.0, |em| em * font_size),
        Some(AttrValue::Number(dy)) => *dy,
        None => 0.0,
    }
}

fn attr(node: &SceneNode, name: &str) -> f64 {
    node.attr_f64(name).unwrap_or(0.0)
}

/// Style wins over the attribute of the same name, as in svg.
fn paint_value(node: &SceneNode, name: &str) -> Option<String> {
    node.styles
        .get(name)
        .or_else(|| node.attrs.get(name))
        .map(ToString::to_string)
}

fn node_opacity(node: &SceneNode) -> f64 {
    node.style_f64("opacity")
        .or_else(|| node.attr_f64("opacity"))
        .unwrap_or(1.0)
        .clamp(0.0, 1.0)
}

fn clip_rect(node: &SceneNode, clips: &ClipRects) -> Option<(f64, f64, f64, f64)> {
    let value = node.attrs.get("clip-path")?.to_string();
    let name = value.strip_prefix("url(#")?.strip_suffix(')')?;
    clips.get(name).copied()
}

fn fill_and_stroke(context: &Context, node: &SceneNode, opacity: f64) -> ChartResult<()> {
    let fill = paint_value(node, "fill").map_or(Some(Color::BLACK), |f| parse_paint(&f));
    if let Some(color) = fill {
        apply_color(context, color, opacity);
        context
            .fill_preserve()
            .map_err(|err| map_backend_error("failed to fill shape", err))?;
    }
    stroke(context, node, opacity)
}

fn stroke(context: &Context, node: &SceneNode, opacity: f64) -> ChartResult<()> {
    match paint_value(node, "stroke").and_then(|s| parse_paint(&s)) {
        Some(color) => {
            apply_color(context, color, opacity);
            context.set_line_width(
                node.attr_f64("stroke-width")
                    .or_else(|| node.style_f64("stroke-width"))
                    .unwrap_or(1.0),
            );
            context
                .stroke()
                .map_err(|err| map_backend_error("failed to stroke shape", err))
        }
        None => {
            context.new_path();
            Ok(())
        }
    }
}

/// `none` and `transparent` paint nothing; unknown names fall back to black.
fn parse_paint(value: &str) -> Option<Color> {
    match value.trim() {
        "none" | "transparent" => None,
        "black" | "currentColor" => Some(Color::BLACK),
        "white" => Some(Color::WHITE),
        "grey" | "gray" => Some(Color::rgb(0.5, 0.5, 0.5)),
        hex => Some(Color::from_hex(hex).unwrap_or(Color::BLACK)),
    }
}

fn apply_transform(context: &Context, transform: &str) {
    for part in transform.split(')') {
        let Some((name, args)) = part.trim().split_once('(') else {
            continue;
        };
        let values: Vec<f64> = args
            .split([',', ' '])
            .filter_map(|v| v.trim().parse().ok())
            .collect();
        match (name.trim(), values.as_slice()) {
            ("translate", [x]) => context.translate(*x, 0.0),
            ("translate", [x, y, ..]) => context.translate(*x, *y),
            ("rotate", [degrees, ..]) => context.rotate(degrees.to_radians()),
            ("scale", [k]) => context.scale(*k, *k),
            _ => {}
        }
    }
}

/// Absolute `M`, `L`, `H` and `V` commands, which is all the scene emits.
fn append_path(context: &Context, d: &str) {
    let mut command = 'M';
    let mut numbers = Vec::new();
    let mut current = (0.0, 0.0);
    let flush = |command: char, numbers: &mut Vec<f64>, current: &mut (f64, f64)| {
        match command {
            'M' | 'L' => {
                for pair in numbers.chunks_exact(2) {
                    *current = (pair[0], pair[1]);
                    if command == 'M' {
                        context.move_to(pair[0], pair[1]);
                    } else {
                        context.line_to(pair[0], pair[1]);
                    }
                }
            }
            'H' => {
                for x in numbers.iter() {
                    current.0 = *x;
                    context.line_to(current.0, current.1);
                }
            }
            'V' => {
                for y in numbers.iter() {
                    current.1 = *y;
                    context.line_to(current.0, current.1);
                }
            }
            _ => {}
        }
        numbers.clear();
    };

    let mut token = String::new();
    for ch in d.chars() {
        if ch.is_ascii_alphabetic() && ch != 'e' {
            if let Ok(value) = token.parse() {
                numbers.push(value);
            }
            token.clear();
            flush(command, &mut numbers, &mut current);
            command = ch;
        } else if ch == ',' || ch.is_whitespace() {
            if let Ok(value) = token.parse() {
                numbers.push(value);
            }
            token.clear();
        } else {
            token.push(ch);
        }
    }
    if let Ok(value) = token.parse() {
        numbers.push(value);
    }
    flush(command, &mut numbers, &mut current);
}

fn apply_color(context: &Context, color: Color, opacity: f64) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha * opacity);
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::InvalidData(format!("{prefix}: {err}"))
}
