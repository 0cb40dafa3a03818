//! Wheel drawing over an abstract immediate-mode surface.

pub mod cairo_surface;

use crate::color;
use crate::geometry::{CanvasSize, Point};
use crate::layer::Layer;
use crate::text;
use palette::Srgba;
use std::f64::consts::PI;

pub use cairo_surface::{CairoSurface, RenderError, render_png};

/// Screen angle of the pointer (12 o'clock) in radians.
pub const POINTER_ANGLE: f64 = -PI / 2.0;
pub const POINTER_HALF_WIDTH: f64 = 10.0;
pub const POINTER_REACH: f64 = 12.0;
/// Innermost edge used for the pointer when the wheel has no layers.
pub const EMPTY_WHEEL_INNER_RADIUS: f64 = 20.0;
pub const OUTLINE_WIDTH: f64 = 0.8;
pub const MIN_FONT_SIZE: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    Alphabetic,
    Middle,
}

/// The drawing primitives the wheel needs, modelled on a 2D canvas context:
/// fills and strokes keep the current path, `clip` intersects with it.
pub trait Surface {
    type Error;

    fn clear(&mut self, width: f64, height: f64) -> Result<(), Self::Error>;
    fn begin_path(&mut self);
    fn close_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    /// Arc around `center`, clockwise on screen unless `counter_clockwise`.
    fn arc(&mut self, center: Point, radius: f64, start: f64, end: f64, counter_clockwise: bool);
    fn set_fill_color(&mut self, color: Srgba<f64>);
    fn set_stroke(&mut self, color: Srgba<f64>, width: f64);
    fn fill(&mut self) -> Result<(), Self::Error>;
    fn stroke(&mut self) -> Result<(), Self::Error>;
    fn clip(&mut self) -> Result<(), Self::Error>;
    fn save(&mut self) -> Result<(), Self::Error>;
    fn restore(&mut self) -> Result<(), Self::Error>;
    fn translate(&mut self, dx: f64, dy: f64);
    fn rotate(&mut self, radians: f64);
    fn set_font_size(&mut self, size: f64);
    fn set_text_layout(&mut self, align: TextAlign, baseline: TextBaseline);
    fn measure_text(&mut self, text: &str) -> f64;
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WheelStyle {
    pub background: Option<Srgba<f64>>,
    pub outline: Srgba<f64>,
    pub label: Srgba<f64>,
    pub pointer: Srgba<f64>,
}

impl Default for WheelStyle {
    fn default() -> Self {
        Self {
            background: None,
            outline: Srgba::new(0.0, 0.0, 0.0, 0.35),
            label: color::hex("#031428").unwrap_or(Srgba::new(0.0, 0.0, 0.0, 1.0)),
            pointer: Srgba::new(1.0, 1.0, 1.0, 1.0),
        }
    }
}

/// Start and end screen angles (radians) of a sector wedge.
pub fn wedge_angles(index: usize, count: usize, rotation_deg: f64) -> (f64, f64) {
    let arc = 2.0 * PI / count as f64;
    let a0 = POINTER_ANGLE + index as f64 * arc + rotation_deg.to_radians();
    (a0, a0 + arc)
}

pub fn draw<S: Surface>(
    surface: &mut S,
    layers: &[Layer],
    canvas: CanvasSize,
    style: &WheelStyle,
) -> Result<(), S::Error> {
    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
    surface.clear(w, h)?;
    if let Some(bg) = style.background {
        surface.begin_path();
        surface.move_to(0.0, 0.0);
        surface.line_to(w, 0.0);
        surface.line_to(w, h);
        surface.line_to(0.0, h);
        surface.close_path();
        surface.set_fill_color(bg);
        surface.fill()?;
    }

    let center = canvas.center();
    for (layer_index, layer) in layers.iter().enumerate() {
        LayerRenderer::new(layer, layer_index, center, style).draw(surface)?;
    }

    let innermost = layers
        .last()
        .map(|l| l.bounds().inner)
        .unwrap_or(EMPTY_WHEEL_INNER_RADIUS);
    draw_pointer(surface, center, innermost, style)
}

struct LayerRenderer<'a> {
    layer: &'a Layer,
    layer_index: usize,
    center: Point,
    style: &'a WheelStyle,
}

impl<'a> LayerRenderer<'a> {
    fn new(layer: &'a Layer, layer_index: usize, center: Point, style: &'a WheelStyle) -> Self {
        Self {
            layer,
            layer_index,
            center,
            style,
        }
    }

    fn draw<S: Surface>(&self, surface: &mut S) -> Result<(), S::Error> {
        let count = self.layer.sector_count();
        for (i, sector) in self.layer.sectors().iter().enumerate() {
            let (a0, a1) = wedge_angles(i, count, self.layer.rotation_deg());
            self.wedge_path(surface, a0, a1);
            surface.set_fill_color(color::sector_fill(self.layer_index, i));
            surface.fill()?;
            surface.set_stroke(self.style.outline, OUTLINE_WIDTH);
            surface.stroke()?;
            self.draw_label(surface, &sector.label, a0, a1)?;
        }
        Ok(())
    }

    fn wedge_path<S: Surface>(&self, surface: &mut S, a0: f64, a1: f64) {
        let bounds = self.layer.bounds();
        surface.begin_path();
        surface.arc(self.center, bounds.outer, a0, a1, false);
        surface.arc(self.center, bounds.inner, a1, a0, true);
        surface.close_path();
    }

    fn draw_label<S: Surface>(
        &self,
        surface: &mut S,
        label: &str,
        a0: f64,
        a1: f64,
    ) -> Result<(), S::Error> {
        let bounds = self.layer.bounds();
        let ring_width = bounds.width();
        let mid = (a0 + a1) / 2.0;
        let font_size = (ring_width * 0.25).max(MIN_FONT_SIZE);
        let line_height = font_size * 0.9;

        surface.save()?;
        // the wedge path is still current
        surface.clip()?;
        surface.begin_path();
        surface.translate(
            self.center.x + mid.cos() * bounds.mid(),
            self.center.y + mid.sin() * bounds.mid(),
        );
        surface.rotate(mid + PI / 2.0);
        surface.set_font_size(font_size);
        surface.set_text_layout(TextAlign::Center, TextBaseline::Middle);
        surface.set_fill_color(self.style.label);

        let lines = text::wrap_words(label, ring_width * 1.4, |t| surface.measure_text(t));
        let top = -(lines.len() as f64 - 1.0) * line_height / 2.0;
        for (k, line) in lines.iter().enumerate() {
            surface.fill_text(line, 0.0, top + k as f64 * line_height)?;
        }
        surface.restore()
    }
}

fn draw_pointer<S: Surface>(
    surface: &mut S,
    center: Point,
    inner_radius: f64,
    style: &WheelStyle,
) -> Result<(), S::Error> {
    surface.begin_path();
    surface.move_to(center.x, center.y - inner_radius - POINTER_REACH);
    surface.line_to(
        center.x - POINTER_HALF_WIDTH,
        center.y - inner_radius + POINTER_REACH,
    );
    surface.line_to(
        center.x + POINTER_HALF_WIDTH,
        center.y - inner_radius + POINTER_REACH,
    );
    surface.close_path();
    surface.set_fill_color(style.pointer);
    surface.fill()
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Op {
        Clear,
        BeginPath,
        ClosePath,
        MoveTo(f64, f64),
        LineTo(f64, f64),
        Arc { radius: f64, start: f64, end: f64, ccw: bool },
        FillColor(Srgba<f64>),
        Stroke(Srgba<f64>, f64),
        Fill,
        StrokePath,
        Clip,
        Save,
        Restore,
        Translate(f64, f64),
        Rotate(f64),
        FontSize(f64),
        Layout(TextAlign, TextBaseline),
        Text(String, f64, f64),
    }

    /// Records every call; text is measured as half the font size per char.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub ops: Vec<Op>,
        font_size: f64,
    }

    impl RecordingSurface {
        pub fn texts(&self) -> Vec<&str> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Text(t, _, _) => Some(t.as_str()),
                    _ => None,
                })
                .collect()
        }

        pub fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
            self.ops.iter().filter(|op| pred(op)).count()
        }
    }

    impl Surface for RecordingSurface {
        type Error = std::convert::Infallible;

        fn clear(&mut self, _: f64, _: f64) -> Result<(), Self::Error> {
            self.ops.push(Op::Clear);
            Ok(())
        }
        fn begin_path(&mut self) {
            self.ops.push(Op::BeginPath);
        }
        fn close_path(&mut self) {
            self.ops.push(Op::ClosePath);
        }
        fn move_to(&mut self, x: f64, y: f64) {
            self.ops.push(Op::MoveTo(x, y));
        }
        fn line_to(&mut self, x: f64, y: f64) {
            self.ops.push(Op::LineTo(x, y));
        }
        fn arc(&mut self, _: Point, radius: f64, start: f64, end: f64, ccw: bool) {
            self.ops.push(Op::Arc {
                radius,
                start,
                end,
                ccw,
            });
        }
        fn set_fill_color(&mut self, color: Srgba<f64>) {
            self.ops.push(Op::FillColor(color));
        }
        fn set_stroke(&mut self, color: Srgba<f64>, width: f64) {
            self.ops.push(Op::Stroke(color, width));
        }
        fn fill(&mut self) -> Result<(), Self::Error> {
            self.ops.push(Op::Fill);
            Ok(())
        }
        fn stroke(&mut self) -> Result<(), Self::Error> {
            self.ops.push(Op::StrokePath);
            Ok(())
        }
        fn clip(&mut self) -> Result<(), Self::Error> {
            self.ops.push(Op::Clip);
            Ok(())
        }
        fn save(&mut self) -> Result<(), Self::Error> {
            self.ops.push(Op::Save);
            Ok(())
        }
        fn restore(&mut self) -> Result<(), Self::Error> {
            self.ops.push(Op::Restore);
            Ok(())
        }
        fn translate(&mut self, dx: f64, dy: f64) {
            self.ops.push(Op::Translate(dx, dy));
        }
        fn rotate(&mut self, radians: f64) {
            self.ops.push(Op::Rotate(radians));
        }
        fn set_font_size(&mut self, size: f64) {
            self.font_size = size;
            self.ops.push(Op::FontSize(size));
        }
        fn set_text_layout(&mut self, align: TextAlign, baseline: TextBaseline) {
            self.ops.push(Op::Layout(align, baseline));
        }
        fn measure_text(&mut self, text: &str) -> f64 {
            text.chars().count() as f64 * self.font_size * 0.5
        }
        fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), Self::Error> {
            self.ops.push(Op::Text(text.to_string(), x, y));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::recording::{Op, RecordingSurface};
    use super::*;
    use crate::geometry::ring_bounds;
    use crate::layer::LayerId;
    use crate::sector::resolve_sector;

    const EPSILON: f64 = 1e-9;

    fn layers_with_bounds(counts: &[usize], canvas: CanvasSize) -> Vec<Layer> {
        let bounds = ring_bounds(counts.len(), canvas);
        counts
            .iter()
            .zip(bounds)
            .enumerate()
            .map(|(i, (&n, b))| {
                let mut layer = Layer::new(LayerId::new(format!("l{i}")), format!("Layer {i}"), n);
                layer.bounds = b;
                layer
            })
            .collect()
    }

    /// Sector whose wedge contains the pointer angle, found from draw angles.
    fn wedge_under_pointer(count: usize, rotation_deg: f64) -> usize {
        let pointer = POINTER_ANGLE.rem_euclid(2.0 * PI);
        (0..count)
            .find(|&i| {
                let (a0, a1) = wedge_angles(i, count, rotation_deg);
                let start = a0.rem_euclid(2.0 * PI);
                let offset = (pointer - start).rem_euclid(2.0 * PI);
                offset < a1 - a0
            })
            .unwrap()
    }

    #[test]
    fn test_wedge_at_pointer_matches_resolution() {
        for count in [2, 3, 4, 5, 7, 12, 24] {
            for step in 0..97 {
                let rotation = step as f64 * 7.3 + 0.05;
                assert_eq!(
                    wedge_under_pointer(count, rotation),
                    resolve_sector(rotation, count),
                    "count {count}, rotation {rotation}"
                );
            }
        }
    }

    #[test]
    fn test_first_wedge_starts_at_pointer() {
        let (a0, a1) = wedge_angles(0, 4, 0.0);
        assert!((a0 + PI / 2.0).abs() < EPSILON);
        assert!((a1 - 0.0).abs() < EPSILON);
    }

    #[test]
    fn test_draw_emits_every_sector_and_label() {
        let canvas = CanvasSize::default();
        let layers = layers_with_bounds(&[4, 3], canvas);
        let mut surface = RecordingSurface::default();
        draw(&mut surface, &layers, canvas, &WheelStyle::default()).unwrap();

        assert_eq!(surface.ops[0], Op::Clear);
        // two arcs per wedge
        assert_eq!(surface.count(|op| matches!(op, Op::Arc { .. })), 14);
        assert_eq!(surface.count(|op| matches!(op, Op::Clip)), 7);
        assert_eq!(surface.count(|op| *op == Op::Save), surface.count(|op| *op == Op::Restore));
        let texts = surface.texts();
        assert_eq!(texts, ["Item 1", "Item 2", "Item 3", "Item 4", "Item 1", "Item 2", "Item 3"]);
    }

    #[test]
    fn test_wedges_use_layer_radii() {
        let canvas = CanvasSize::default();
        let layers = layers_with_bounds(&[2], canvas);
        let mut surface = RecordingSurface::default();
        draw(&mut surface, &layers, canvas, &WheelStyle::default()).unwrap();

        let radii: Vec<(f64, bool)> = surface
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Arc { radius, ccw, .. } => Some((*radius, *ccw)),
                _ => None,
            })
            .collect();
        let b = layers[0].bounds();
        assert_eq!(radii, [(b.outer, false), (b.inner, true), (b.outer, false), (b.inner, true)]);
    }

    #[test]
    fn test_long_label_wraps_inside_ring() {
        let canvas = CanvasSize::default();
        let mut layers = layers_with_bounds(&[2], canvas);
        layers[0].sectors[0].label = "A very long label that cannot fit".to_string();
        let mut surface = RecordingSurface::default();
        draw(&mut surface, &layers, canvas, &WheelStyle::default()).unwrap();

        let texts = surface.texts();
        assert!(texts.len() > 3);
        assert_eq!(texts.join(" "), "A very long label that cannot fit Item 2");
    }

    #[test]
    fn test_pointer_sits_on_innermost_ring() {
        let canvas = CanvasSize::default();
        let layers = layers_with_bounds(&[4, 6], canvas);
        let mut surface = RecordingSurface::default();
        draw(&mut surface, &layers, canvas, &WheelStyle::default()).unwrap();

        let inner = layers[1].bounds().inner;
        let c = canvas.center();
        let tip = Op::MoveTo(c.x, c.y - inner - POINTER_REACH);
        assert!(surface.ops.contains(&tip));
        assert_eq!(surface.ops.last(), Some(&Op::Fill));
    }

    #[test]
    fn test_empty_wheel_draws_pointer_only() {
        let canvas = CanvasSize::default();
        let mut surface = RecordingSurface::default();
        draw(&mut surface, &[], canvas, &WheelStyle::default()).unwrap();
        let c = canvas.center();
        assert!(
            surface
                .ops
                .contains(&Op::MoveTo(c.x, c.y - EMPTY_WHEEL_INNER_RADIUS - POINTER_REACH))
        );
        assert_eq!(surface.count(|op| matches!(op, Op::Arc { .. })), 0);
    }
}
