//! PDF serialization of a [`DocumentLayout`].
//!
//! The layout measures offsets from the top of the page; PDF measures from
//! the bottom. This module flips the y axis and emits each operation with the
//! built-in Helvetica faces, so no font files are needed.

use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};

use crate::layout::{DocumentLayout, DrawOp, FontWeight, Page};
use crate::{ExportError, Result, DOCUMENT_TITLE};

const LAYER_NAME: &str = "Content";
const RULE_THICKNESS: f32 = 0.2;

/// Serializes a laid-out lesson plan to PDF bytes.
pub struct PdfGenerator<'a> {
    layout: &'a DocumentLayout,
}

impl<'a> PdfGenerator<'a> {
    /// Creates a new PDF generator for the given layout.
    #[must_use]
    pub const fn new(layout: &'a DocumentLayout) -> Self {
        Self { layout }
    }

    /// Builds the PDF document in memory.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Pdf`] if the PDF backend fails.
    pub fn generate(&self) -> Result<Vec<u8>> {
        let width = Mm(self.layout.page_width);
        let height = Mm(self.layout.page_height);

        let (doc, first_page, first_layer) =
            PdfDocument::new(DOCUMENT_TITLE, width, height, LAYER_NAME);
        let fonts = Fonts {
            regular: doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(pdf_error)?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(pdf_error)?,
        };

        for (index, page) in self.layout.pages.iter().enumerate() {
            let layer = if index == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page_index, layer_index) = doc.add_page(width, height, LAYER_NAME);
                doc.get_page(page_index).get_layer(layer_index)
            };
            draw_page(&layer, page, self.layout.page_height, &fonts);
        }

        tracing::debug!(pages = self.layout.pages.len(), "PDF document built");
        doc.save_to_bytes().map_err(pdf_error)
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    const fn get(&self, weight: FontWeight) -> &IndirectFontRef {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }
}

fn draw_page(layer: &PdfLayerReference, page: &Page, page_height: f32, fonts: &Fonts) {
    layer.set_outline_thickness(RULE_THICKNESS);

    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                size,
                weight,
                text,
            } => {
                layer.use_text(
                    text.as_str(),
                    *size,
                    Mm(*x),
                    Mm(page_height - *y),
                    fonts.get(*weight),
                );
            }
            DrawOp::Rule { from, to } => {
                layer.add_line(Line {
                    points: vec![
                        (Point::new(Mm(from.0), Mm(page_height - from.1)), false),
                        (Point::new(Mm(to.0), Mm(page_height - to.1)), false),
                    ],
                    is_closed: false,
                });
            }
        }
    }
}

#[allow(clippy::needless_pass_by_value)]
fn pdf_error(err: impl std::fmt::Display) -> ExportError {
    ExportError::Pdf(err.to_string())
}
