use super::{Surface, TextAlign, TextBaseline, WheelStyle};
use crate::geometry::{CanvasSize, Point};
use crate::layer::Layer;
use cairo::{Context, FontSlant, FontWeight, Format, ImageSurface, Operator};
use palette::Srgba;
use std::path::Path;
use thiserror::Error;

pub const FONT_FAMILY: &str = "Sans";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),
    #[error("PNG export failed: {0}")]
    Png(#[from] cairo::IoError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Canvas-style adapter over a cairo context. Cairo has one source color and
/// consumes paths on fill, so this keeps separate fill/stroke styles and uses
/// the `_preserve` variants.
pub struct CairoSurface<'a> {
    cr: &'a Context,
    fill: Srgba<f64>,
    stroke: Srgba<f64>,
    line_width: f64,
    align: TextAlign,
    baseline: TextBaseline,
}

impl<'a> CairoSurface<'a> {
    pub fn new(cr: &'a Context) -> Self {
        cr.select_font_face(FONT_FAMILY, FontSlant::Normal, FontWeight::Normal);
        Self {
            cr,
            fill: Srgba::new(0.0, 0.0, 0.0, 1.0),
            stroke: Srgba::new(0.0, 0.0, 0.0, 1.0),
            line_width: 1.0,
            align: TextAlign::Left,
            baseline: TextBaseline::Alphabetic,
        }
    }

    fn set_source(&self, color: Srgba<f64>) {
        let (r, g, b, a) = color.into_components();
        self.cr.set_source_rgba(r, g, b, a);
    }
}

impl Surface for CairoSurface<'_> {
    type Error = cairo::Error;

    fn clear(&mut self, width: f64, height: f64) -> Result<(), Self::Error> {
        self.cr.save()?;
        self.cr.set_operator(Operator::Clear);
        self.cr.rectangle(0.0, 0.0, width, height);
        self.cr.fill()?;
        self.cr.restore()
    }

    fn begin_path(&mut self) {
        self.cr.new_path();
    }

    fn close_path(&mut self) {
        self.cr.close_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.cr.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.cr.line_to(x, y);
    }

    fn arc(&mut self, center: Point, radius: f64, start: f64, end: f64, counter_clockwise: bool) {
        if counter_clockwise {
            self.cr.arc_negative(center.x, center.y, radius, start, end);
        } else {
            self.cr.arc(center.x, center.y, radius, start, end);
        }
    }

    fn set_fill_color(&mut self, color: Srgba<f64>) {
        self.fill = color;
    }

    fn set_stroke(&mut self, color: Srgba<f64>, width: f64) {
        self.stroke = color;
        self.line_width = width;
    }

    fn fill(&mut self) -> Result<(), Self::Error> {
        self.set_source(self.fill);
        self.cr.fill_preserve()
    }

    fn stroke(&mut self) -> Result<(), Self::Error> {
        self.set_source(self.stroke);
        self.cr.set_line_width(self.line_width);
        self.cr.stroke_preserve()
    }

    fn clip(&mut self) -> Result<(), Self::Error> {
        self.cr.clip_preserve();
        Ok(())
    }

    fn save(&mut self) -> Result<(), Self::Error> {
        self.cr.save()
    }

    fn restore(&mut self) -> Result<(), Self::Error> {
        self.cr.restore()
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.cr.translate(dx, dy);
    }

    fn rotate(&mut self, radians: f64) {
        self.cr.rotate(radians);
    }

    fn set_font_size(&mut self, size: f64) {
        self.cr.set_font_size(size);
    }

    fn set_text_layout(&mut self, align: TextAlign, baseline: TextBaseline) {
        self.align = align;
        self.baseline = baseline;
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        self.cr
            .text_extents(text)
            .map(|ext| ext.x_advance())
            .unwrap_or(0.0)
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), Self::Error> {
        let dx = match self.align {
            TextAlign::Left => 0.0,
            TextAlign::Center => -self.measure_text(text) / 2.0,
        };
        let dy = match self.baseline {
            TextBaseline::Alphabetic => 0.0,
            TextBaseline::Middle => {
                let fe = self.cr.font_extents()?;
                (fe.ascent() - fe.descent()) / 2.0
            }
        };
        self.set_source(self.fill);
        self.cr.move_to(x + dx, y + dy);
        self.cr.show_text(text)
    }
}

/// Draws the layers onto an image surface and writes it as PNG.
pub fn render_png(
    layers: &[Layer],
    canvas: CanvasSize,
    style: &WheelStyle,
    path: &Path,
) -> Result<(), RenderError> {
    let surface = ImageSurface::create(Format::ARgb32, canvas.width as i32, canvas.height as i32)?;
    {
        let cr = Context::new(&surface)?;
        let mut target = CairoSurface::new(&cr);
        super::draw(&mut target, layers, canvas, style)?;
    }
    surface.flush();
    let mut file = fs_err::File::create(path)?;
    surface.write_to_png(&mut file)?;
    Ok(())
}
