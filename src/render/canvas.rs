//! Thin wrapper over a printpdf page layer.
//!
//! All layout code positions elements in millimetres with the origin at the
//! top-left corner (the convention the document layouts were designed in);
//! the canvas flips the y axis into printpdf's bottom-left coordinate space.

use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocumentReference, PdfLayerReference, Point,
};

use super::RenderError;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// Rough advance width of Helvetica in mm for a given point size, used only
/// for centering header lines.
const HELVETICA_AVG_WIDTH: f32 = 0.176;

pub struct PageCanvas {
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl PageCanvas {
    pub fn new(doc: &PdfDocumentReference, layer: PdfLayerReference) -> Result<Self, RenderError> {
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        layer.set_outline_thickness(0.4);
        Ok(Self {
            layer,
            regular,
            bold,
        })
    }

    fn flip(y: f32) -> Mm {
        Mm(PAGE_HEIGHT_MM - y)
    }

    pub fn text(&self, content: &str, size: f32, x: f32, y: f32) {
        self.layer
            .use_text(content, size, Mm(x), Self::flip(y), &self.regular);
    }

    pub fn text_bold(&self, content: &str, size: f32, x: f32, y: f32) {
        self.layer
            .use_text(content, size, Mm(x), Self::flip(y), &self.bold);
    }

    pub fn text_centered(&self, content: &str, size: f32, y: f32, bold: bool) {
        let width = content.chars().count() as f32 * size * HELVETICA_AVG_WIDTH;
        let x = ((PAGE_WIDTH_MM - width) / 2.0).max(0.0);
        if bold {
            self.text_bold(content, size, x, y);
        } else {
            self.text(content, size, x, y);
        }
    }

    pub fn line(&self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let line = Line {
            points: vec![
                (Point::new(Mm(x1), Self::flip(y1)), false),
                (Point::new(Mm(x2), Self::flip(y2)), false),
            ],
            is_closed: false,
        };
        self.layer.add_line(line);
    }

    /// Stroke a rectangle with its top-left corner at (x, y).
    pub fn rect(&self, x: f32, y: f32, width: f32, height: f32) {
        let line = Line {
            points: vec![
                (Point::new(Mm(x), Self::flip(y)), false),
                (Point::new(Mm(x + width), Self::flip(y)), false),
                (Point::new(Mm(x + width), Self::flip(y + height)), false),
                (Point::new(Mm(x), Self::flip(y + height)), false),
            ],
            is_closed: true,
        };
        self.layer.add_line(line);
    }
}
