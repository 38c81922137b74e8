//! Text rasterization through `ab_glyph` with the bundled DejaVu Sans.
//!
//! Glyphs are rendered one at a time so they can be cached per character,
//! pixel height and color. Offsets are relative to the pen position on the
//! top edge of the line box.

use ab_glyph::{Font, FontRef, GlyphId, PxScale, ScaleFont, point};
use anyhow::{Context, Result};
use tiny_skia::{Pixmap, PremultipliedColorU8};

static DEJAVU_SANS: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// One rasterized glyph and where it sits relative to the pen.
#[derive(Debug, Clone)]
pub struct GlyphBitmap {
    pub pixmap: Pixmap,
    pub left: i32,
    pub top: i32,
}

/// Pen positions of a laid-out line.
#[derive(Debug, Clone, Default)]
pub struct LineLayout {
    pub glyphs: Vec<(char, f32)>,
    pub width: f32,
}

#[derive(Clone)]
pub struct GlyphFont {
    font: FontRef<'static>,
}

impl GlyphFont {
    pub fn bundled() -> Result<Self> {
        let font = FontRef::try_from_slice(DEJAVU_SANS).context("bundled font is invalid")?;
        Ok(Self { font })
    }

    /// Lays out `text` at a line height of `height` pixels, with kerning.
    pub fn layout_line(&self, text: &str, height: f32) -> LineLayout {
        let sf = self.font.as_scaled(PxScale::from(height));
        let mut pen_x = 0.0f32;
        let mut prev: Option<GlyphId> = None;
        let mut glyphs = Vec::with_capacity(text.len());
        for ch in text.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(p) = prev {
                pen_x += sf.kern(p, id);
            }
            glyphs.push((ch, pen_x));
            pen_x += sf.h_advance(id);
            prev = Some(id);
        }
        LineLayout {
            glyphs,
            width: pen_x,
        }
    }

    pub fn text_width(&self, text: &str, height: f32) -> f32 {
        self.layout_line(text, height).width
    }

    /// Rasterizes `ch` in premultiplied `color`. `None` for characters
    /// without an outline, such as spaces.
    pub fn render_glyph(&self, ch: char, height: f32, color: [u8; 4]) -> Option<GlyphBitmap> {
        let scale = PxScale::from(height);
        let sf = self.font.as_scaled(scale);
        let glyph = self
            .font
            .glyph_id(ch)
            .with_scale_and_position(scale, point(0.0, sf.ascent()));
        let outline = self.font.outline_glyph(glyph)?;
        let bounds = outline.px_bounds();
        let left = bounds.min.x.floor();
        let top = bounds.min.y.floor();
        let w = (bounds.max.x.ceil() - left).max(1.0) as u32;
        let h = (bounds.max.y.ceil() - top).max(1.0) as u32;

        let mut pm = Pixmap::new(w, h)?;
        let stride = w as usize;
        let pixels = pm.pixels_mut();
        let [r, g, b, a] = color.map(u32::from);
        outline.draw(|x, y, coverage| {
            let alpha = (coverage.clamp(0.0, 1.0) * a as f32).round() as u32;
            if alpha == 0 {
                return;
            }
            let premul = |c: u32| ((c * alpha + 127) / 255) as u8;
            let fx = x as i32 + (bounds.min.x - left) as i32;
            let fy = y as i32 + (bounds.min.y - top) as i32;
            if fx < 0 || fy < 0 || fx as u32 >= w || fy as u32 >= h {
                return;
            }
            if let Some(px) =
                PremultipliedColorU8::from_rgba(premul(r), premul(g), premul(b), alpha as u8)
            {
                pixels[fy as usize * stride + fx as usize] = px;
            }
        });

        Some(GlyphBitmap {
            pixmap: pm,
            left: left as i32,
            top: top as i32,
        })
    }
}
