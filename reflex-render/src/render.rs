use anyhow::{Context, Result, ensure};
use bytemuck::{cast_slice, cast_slice_mut};
use reflex_core::{Color as StimulusColor, Screen};
use reflex_store::{RankingRow, RankingView};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Rect, Transform};
use tracing::{debug, trace};

use crate::glyph::{GlyphBitmap, GlyphFont};
use crate::layout::{Bounds, Layout};
use crate::scene::{SaveStatus, SceneState};

const BACKGROUND: [u8; 4] = [17, 24, 39, 255];
const TEXT: [u8; 4] = [241, 245, 249, 255];
const MUTED: [u8; 4] = [148, 163, 184, 255];
const TILE: [u8; 4] = [30, 41, 59, 255];
const MODAL: [u8; 4] = [2, 6, 23, 255];
const OPTION: [u8; 4] = [51, 65, 85, 255];
const FLASH: [u8; 4] = [153, 27, 27, 255];
const HINT: [u8; 4] = [71, 85, 105, 255];
const HIGHLIGHT: [u8; 4] = [30, 58, 138, 255];
const WARN: [u8; 4] = [248, 113, 113, 255];
const GOLD: [u8; 4] = [250, 204, 21, 255];
const SILVER: [u8; 4] = [203, 213, 225, 255];
const BRONZE: [u8; 4] = [217, 119, 6, 255];

/// Pre-rendered shapes, indexing the static cache.
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    GreenDisk = 0,
    RedDisk = 1,
    BlueDisk = 2,
    Note = 3,
    ArrowLeft = 4,
    ArrowRight = 5,
}

impl Shape {
    const COUNT: usize = 6;

    pub fn disk(color: StimulusColor) -> Self {
        match color {
            StimulusColor::Green => Shape::GreenDisk,
            StimulusColor::Red => Shape::RedDisk,
            StimulusColor::Blue => Shape::BlueDisk,
        }
    }
}

type GlyphKey = (char, u32, [u8; 4]);

/// Rasterized glyphs by character, pixel height and color. Blanks are
/// cached as `None` so they are not re-rendered every frame.
struct GlyphCache {
    font: GlyphFont,
    map: HashMap<GlyphKey, Option<Arc<GlyphBitmap>>>,
}

impl GlyphCache {
    fn new(font: GlyphFont) -> Self {
        Self {
            font,
            map: HashMap::new(),
        }
    }

    fn get_or_render(
        &mut self,
        ch: char,
        height: u32,
        color: [u8; 4],
    ) -> Option<Arc<GlyphBitmap>> {
        let font = &self.font;
        self.map
            .entry((ch, height, color))
            .or_insert_with(|| font.render_glyph(ch, height as f32, color).map(Arc::new))
            .clone()
    }
}

/// Glyph heights snap to whole pixels so the cache stays small.
fn text_px(height: f32) -> u32 {
    height.round().max(4.0) as u32
}

#[derive(Debug, Clone, Copy)]
pub struct FrameStats {
    pub clear: Duration,
    pub scene: Duration,
    pub copy: Duration,
    pub total: Duration,
    pub dirty_count: usize,
}

pub trait Renderer {
    fn clear_dirty(&mut self, dirty: &[Rect]);
    fn blit_cached(&mut self, shape: Shape, center: (f32, f32));
    fn draw_text(&mut self, text: &str, center: (f32, f32), height: f32, color: [u8; 4]);
}

pub trait SceneRenderer: Renderer {
    fn render_scene(&mut self, scene: &SceneState) -> Result<()>;
}

/// Software renderer drawing into an offscreen canvas and copying only the
/// regions touched since the last frame into the caller's RGBA buffer.
pub struct SkiaRenderer {
    width: u32,
    height: u32,
    layout: Layout,

    static_cache: Vec<Pixmap>,
    glyphs: GlyphCache,

    canvas: Pixmap,
    dirty_regions: Vec<Rect>,
    first_frame: bool,
    clear_buffer: Vec<u8>,
}

fn solid(color: [u8; 4]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(Color::from_rgba8(color[0], color[1], color[2], color[3]));
    paint.anti_alias = true;
    paint
}

fn background_buffer(width: u32, height: u32) -> Vec<u8> {
    BACKGROUND
        .into_iter()
        .cycle()
        .take((width * height * 4) as usize)
        .collect()
}

fn blank_canvas(width: u32, height: u32) -> Result<Pixmap> {
    let mut canvas = Pixmap::new(width, height)
        .with_context(|| format!("cannot allocate {width}x{height} canvas"))?;
    canvas.fill(Color::from_rgba8(
        BACKGROUND[0],
        BACKGROUND[1],
        BACKGROUND[2],
        BACKGROUND[3],
    ));
    Ok(canvas)
}

fn render_disk(radius: f32, color: [u8; 4]) -> Result<Pixmap> {
    let size = (radius * 2.0).ceil() as u32;
    let mut pm = Pixmap::new(size, size).context("disk pixmap")?;
    let path = PathBuilder::from_circle(radius, radius, radius).context("disk path")?;
    pm.fill_path(
        &path,
        &solid(color),
        FillRule::Winding,
        Transform::identity(),
        None,
    );
    Ok(pm)
}

fn render_note(size: f32) -> Result<Pixmap> {
    let side = size.ceil() as u32;
    let mut pm = Pixmap::new(side, side).context("note pixmap")?;
    let paint = solid(TEXT);
    let head_r = size * 0.16;
    let head = (size * 0.34, size * 0.78);
    let stem_x = head.0 + head_r * 0.8;
    let stem_w = (size * 0.05).max(1.0);

    let mut pb = PathBuilder::new();
    pb.push_circle(head.0, head.1, head_r);
    if let Some(r) = Rect::from_xywh(stem_x - stem_w, size * 0.12, stem_w, head.1 - size * 0.12)
    {
        pb.push_rect(r);
    }
    // Flag.
    pb.move_to(stem_x, size * 0.12);
    pb.line_to(stem_x + size * 0.28, size * 0.28);
    pb.line_to(stem_x + size * 0.28, size * 0.40);
    pb.line_to(stem_x, size * 0.26);
    pb.close();
    let path = pb.finish().context("note path")?;
    pm.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    Ok(pm)
}

fn render_arrow(size: f32, pointing_left: bool) -> Result<Pixmap> {
    let side = (size * 2.0).ceil() as u32;
    let mut pm = Pixmap::new(side, side).context("arrow pixmap")?;
    let c = size;
    let mut pb = PathBuilder::new();
    if pointing_left {
        pb.move_to(c - size, c);
        pb.line_to(c + size * 0.4, c - size * 0.8);
        pb.line_to(c + size * 0.4, c + size * 0.8);
    } else {
        pb.move_to(c + size, c);
        pb.line_to(c - size * 0.4, c - size * 0.8);
        pb.line_to(c - size * 0.4, c + size * 0.8);
    }
    pb.close();
    let path = pb.finish().context("arrow path")?;
    pm.fill_path(
        &path,
        &solid(HINT),
        FillRule::Winding,
        Transform::identity(),
        None,
    );
    Ok(pm)
}

fn render_shapes(layout: &Layout) -> Result<Vec<Pixmap>> {
    let radius = layout.stimulus_radius();
    let arrow = layout.unit() * 0.07;
    let shapes = vec![
        render_disk(radius, StimulusColor::Green.rgba())?,
        render_disk(radius, StimulusColor::Red.rgba())?,
        render_disk(radius, StimulusColor::Blue.rgba())?,
        render_note(radius * 2.0)?,
        render_arrow(arrow, true)?,
        render_arrow(arrow, false)?,
    ];
    debug_assert_eq!(shapes.len(), Shape::COUNT);
    Ok(shapes)
}

/// Integer pixel span of `rect` clipped to a `width` × `height` surface.
fn clip(rect: &Rect, width: u32, height: u32) -> Option<(usize, usize, usize, usize)> {
    let x0 = rect.x().floor().max(0.0).min(width as f32) as usize;
    let y0 = rect.y().floor().max(0.0).min(height as f32) as usize;
    let x1 = (rect.x() + rect.width()).ceil().min(width as f32) as usize;
    let y1 = (rect.y() + rect.height()).ceil().min(height as f32) as usize;
    (x1 > x0 && y1 > y0).then_some((x0, y0, x1, y1))
}

/// Composites premultiplied `src` onto `canvas` with its top-left corner at
/// `(x0, y0)`. Returns the touched region, or `None` when fully clipped.
fn blit(canvas: &mut Pixmap, src: &Pixmap, x0: i32, y0: i32) -> Option<Rect> {
    let (cw, ch) = (canvas.width() as i32, canvas.height() as i32);
    let (sw, sh) = (src.width() as i32, src.height() as i32);
    if x0 + sw <= 0 || y0 + sh <= 0 || x0 >= cw || y0 >= ch {
        return None;
    }

    let dst_x = x0.max(0) as usize;
    let dst_y = y0.max(0) as usize;
    let src_x = (-x0).max(0) as usize;
    let src_y = (-y0).max(0) as usize;
    let copy_w = ((sw as usize) - src_x).min(cw as usize - dst_x);
    let copy_h = ((sh as usize) - src_y).min(ch as usize - dst_y);
    if copy_w == 0 || copy_h == 0 {
        return None;
    }

    let src_stride = sw as usize;
    let dst_stride = cw as usize;
    let src_u32: &[u32] = cast_slice(src.data());

    let fully_opaque = (0..copy_h).all(|row| {
        let start = (src_y + row) * src_stride + src_x;
        src_u32[start..start + copy_w]
            .iter()
            .all(|&p| p >> 24 == 0xFF)
    });

    let dst_u32: &mut [u32] = cast_slice_mut(canvas.data_mut());
    for row in 0..copy_h {
        let s0 = (src_y + row) * src_stride + src_x;
        let d0 = (dst_y + row) * dst_stride + dst_x;
        let src_row = &src_u32[s0..s0 + copy_w];
        let dst_row = &mut dst_u32[d0..d0 + copy_w];
        if fully_opaque {
            dst_row.copy_from_slice(src_row);
            continue;
        }
        for (d, &s) in dst_row.iter_mut().zip(src_row) {
            let sa = s >> 24;
            if sa == 0 {
                continue;
            }
            let inv = 255 - sa;
            // Source-over in premultiplied space, one channel per byte.
            let mut out = 0u32;
            for shift in [0, 8, 16, 24] {
                let sc = (s >> shift) & 0xFF;
                let dc = (*d >> shift) & 0xFF;
                out |= ((sc + (dc * inv + 127) / 255).min(255)) << shift;
            }
            *d = out;
        }
    }

    Rect::from_xywh(dst_x as f32, dst_y as f32, copy_w as f32, copy_h as f32)
}

impl SkiaRenderer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        ensure!(width > 0 && height > 0, "empty surface {width}x{height}");
        let layout = Layout::new(width, height);
        Ok(Self {
            width,
            height,
            layout,
            static_cache: render_shapes(&layout)?,
            glyphs: GlyphCache::new(GlyphFont::bundled()?),
            canvas: blank_canvas(width, height)?,
            dirty_regions: Vec::with_capacity(32),
            first_frame: true,
            clear_buffer: background_buffer(width, height),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        ensure!(width > 0 && height > 0, "empty surface {width}x{height}");
        self.width = width;
        self.height = height;
        self.layout = Layout::new(width, height);
        self.static_cache = render_shapes(&self.layout)?;
        self.canvas = blank_canvas(width, height)?;
        self.clear_buffer = background_buffer(width, height);
        self.dirty_regions.clear();
        self.first_frame = true;
        debug!(width, height, "renderer resized");
        Ok(())
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The offscreen canvas as last drawn.
    pub fn canvas(&self) -> &Pixmap {
        &self.canvas
    }

    fn mark_dirty(&mut self, rect: Option<Rect>) {
        if let Some(r) = rect {
            self.dirty_regions.push(r);
        }
    }

    fn fill(&mut self, bounds: Bounds, color: [u8; 4]) {
        let Some(rect) = bounds.to_rect() else {
            return;
        };
        self.canvas
            .fill_rect(rect, &solid(color), Transform::identity(), None);
        self.mark_dirty(Some(rect));
    }

    /// Draws `text` with its left edge at `left`, vertically centered on `cy`.
    fn draw_text_left(&mut self, text: &str, left: f32, cy: f32, height: f32, color: [u8; 4]) {
        let px = text_px(height);
        let line = self.glyphs.font.layout_line(text, px as f32);
        let top = (cy - px as f32 * 0.5).round() as i32;
        for (ch, pen_x) in line.glyphs {
            let Some(glyph) = self.glyphs.get_or_render(ch, px, color) else {
                continue;
            };
            let x0 = (left + pen_x).round() as i32 + glyph.left;
            let touched = blit(&mut self.canvas, &glyph.pixmap, x0, top + glyph.top);
            self.mark_dirty(touched);
        }
    }

    fn draw_text_right(&mut self, text: &str, right: f32, cy: f32, height: f32, color: [u8; 4]) {
        let width = self.glyphs.font.text_width(text, text_px(height) as f32);
        self.draw_text_left(text, right - width, cy, height, color);
    }

    fn clear_frame(&mut self, frame_buffer: &mut [u8]) {
        self.canvas.data_mut().copy_from_slice(&self.clear_buffer);
        frame_buffer.copy_from_slice(&self.clear_buffer);
        self.dirty_regions.clear();
    }

    fn copy_dirty_region(&self, dirty: &Rect, frame_buffer: &mut [u8]) {
        let Some((x0, y0, x1, y1)) = clip(dirty, self.width, self.height) else {
            return;
        };
        let stride = self.width as usize * 4;
        let canvas = self.canvas.data();
        for row in y0..y1 {
            let a = row * stride + x0 * 4;
            let b = row * stride + x1 * 4;
            frame_buffer[a..b].copy_from_slice(&canvas[a..b]);
        }
    }

    /// Merges same-row, touching rectangles so a line of glyphs copies as
    /// one span.
    fn coalesce_dirty(rects: &mut Vec<Rect>) {
        rects.sort_by(|a, b| a.y().total_cmp(&b.y()).then(a.x().total_cmp(&b.x())));
        let mut out: Vec<Rect> = Vec::with_capacity(rects.len());
        for r in rects.drain(..) {
            if let Some(last) = out.last_mut() {
                let same_row =
                    (r.y() - last.y()).abs() < 1.0 && (r.height() - last.height()).abs() < 1.0;
                let touching = r.x() <= last.x() + last.width() + 1.0;
                if same_row && touching {
                    let nx = last.x().min(r.x());
                    let nx2 = (last.x() + last.width()).max(r.x() + r.width());
                    if let Some(merged) = Rect::from_xywh(nx, last.y(), nx2 - nx, last.height()) {
                        *last = merged;
                        continue;
                    }
                }
            }
            out.push(r);
        }
        *rects = out;
    }

    /// Draws `scene` and presents the changed regions into `frame_buffer`,
    /// an RGBA surface of the renderer's size.
    pub fn render_frame(
        &mut self,
        scene: &SceneState,
        frame_buffer: &mut [u8],
    ) -> Result<FrameStats> {
        ensure!(
            frame_buffer.len() == self.clear_buffer.len(),
            "frame buffer holds {} bytes, expected {}",
            frame_buffer.len(),
            self.clear_buffer.len()
        );
        let start = Instant::now();

        if self.first_frame {
            self.first_frame = false;
            self.clear_frame(frame_buffer);
        }

        let old_dirty = std::mem::take(&mut self.dirty_regions);
        let t = Instant::now();
        self.clear_dirty(&old_dirty);
        let clear = t.elapsed();

        let t = Instant::now();
        self.render_scene(scene)?;
        let scene_time = t.elapsed();

        let mut present = old_dirty;
        present.extend_from_slice(&self.dirty_regions);
        Self::coalesce_dirty(&mut present);

        let t = Instant::now();
        for rect in &present {
            self.copy_dirty_region(rect, frame_buffer);
        }
        let copy = t.elapsed();

        let stats = FrameStats {
            clear,
            scene: scene_time,
            copy,
            total: start.elapsed(),
            dirty_count: self.dirty_regions.len(),
        };
        trace!(
            screen = ?scene.screen,
            dirty = stats.dirty_count,
            total_us = stats.total.as_micros() as u64,
            "frame"
        );
        Ok(stats)
    }

    fn render_setup(&mut self, scene: &SceneState) {
        let layout = self.layout;
        let (cx, _) = layout.center();
        let unit = layout.unit();
        self.draw_text("REACTION", (cx, layout.height * 0.14), unit * 0.09, TEXT);
        if !scene.nickname.trim().is_empty() {
            let nickname = scene.nickname.trim().to_string();
            self.draw_text(&nickname, (cx, layout.height * 0.25), unit * 0.045, MUTED);
        }
        for (i, tile) in layout.level_tiles().into_iter().enumerate() {
            self.fill(tile, TILE);
            let label = (i + 1).to_string();
            self.draw_text(&label, tile.center(), tile.h * 0.45, TEXT);
        }
    }

    fn render_game(&mut self, scene: &SceneState) {
        let layout = self.layout;
        let (cx, cy) = layout.center();
        let unit = layout.unit();
        let margin = unit * 0.05;

        if scene.false_start {
            self.fill(Bounds::new(0.0, 0.0, layout.width, layout.height), FLASH);
            self.draw_text("EARLY", (cx, cy), unit * 0.14, TEXT);
        }

        if let Some(level) = scene.level {
            let label = level.to_string();
            self.draw_text_left(&label, margin, margin, unit * 0.05, MUTED);
        }
        if let Some((done, total)) = scene.progress {
            let label = format!("{done}/{total}");
            self.draw_text_right(&label, layout.width - margin, margin, unit * 0.05, MUTED);
        }

        if scene.swipe_hints && !scene.false_start {
            self.blit_cached(Shape::ArrowLeft, (layout.width * 0.1, cy));
            self.blit_cached(Shape::ArrowRight, (layout.width * 0.9, cy));
        }

        if let Some(n) = scene.countdown {
            self.draw_text(&n.to_string(), (cx, cy), unit * 0.3, TEXT);
        }

        if let Some(stimulus) = scene.stimulus {
            match stimulus.color {
                Some(color) => self.blit_cached(Shape::disk(color), (cx, cy)),
                None if stimulus.is_audio_only() => self.blit_cached(Shape::Note, (cx, cy)),
                None => {}
            }
        }

        if let Some(problem) = &scene.math {
            let modal = layout.math_modal();
            self.fill(modal, MODAL);
            let question = format!("{}{}{}", problem.lhs, problem.op.symbol(), problem.rhs);
            self.draw_text(
                &question,
                (modal.x + modal.w * 0.5, modal.y + modal.h * 0.2),
                modal.h * 0.16,
                TEXT,
            );
            for (option, bounds) in problem.options.iter().zip(layout.math_options()) {
                self.fill(bounds, OPTION);
                self.draw_text(&option.to_string(), bounds.center(), bounds.h * 0.5, TEXT);
            }
        }
    }

    fn render_result(&mut self, scene: &SceneState) {
        let layout = self.layout;
        let (cx, _) = layout.center();
        let unit = layout.unit();
        let Some((level, result)) = scene.result else {
            return;
        };

        self.draw_text(&level.to_string(), (cx, layout.height * 0.1), unit * 0.06, MUTED);
        self.draw_text(&result.score.to_string(), (cx, layout.height * 0.27), unit * 0.16, GOLD);

        let rows = [
            ("AVG", format!("{:.0}", result.avg_reaction_ms)),
            ("ACC", format!("{}%", result.accuracy_percent())),
            ("MISS", result.miss_count.to_string()),
        ];
        let h = unit * 0.06;
        let left = layout.width * 0.3;
        let right = layout.width * 0.7;
        for (i, (label, value)) in rows.iter().enumerate() {
            let y = layout.height * 0.48 + i as f32 * h * 1.8;
            self.draw_text_left(label, left, y, h, MUTED);
            self.draw_text_right(value, right, y, h, TEXT);
        }

        let (status, color) = match scene.save_status {
            SaveStatus::Idle => return,
            SaveStatus::Saving => ("SAVING", MUTED),
            SaveStatus::Saved => ("SAVED", TEXT),
            SaveStatus::Skipped => ("NO ID", MUTED),
            SaveStatus::Failed => ("FAILED", WARN),
        };
        self.draw_text(status, (cx, layout.height * 0.88), unit * 0.05, color);
    }

    fn render_ranking(&mut self, scene: &SceneState) {
        let layout = self.layout;
        let (cx, cy) = layout.center();
        let unit = layout.unit();

        match &scene.ranking {
            RankingView::Loading => {
                self.draw_text("LOADING", (cx, cy), unit * 0.07, MUTED);
            }
            RankingView::Failed { level, .. } => {
                let title = format!("TOP {level}");
                self.draw_text(&title, (cx, layout.height * 0.1), unit * 0.07, TEXT);
                self.draw_text("FAILED", (cx, cy), unit * 0.08, WARN);
            }
            RankingView::Loaded { level, rows } => {
                let title = format!("TOP {level}");
                self.draw_text(&title, (cx, layout.height * 0.1), unit * 0.07, TEXT);
                if rows.is_empty() {
                    self.draw_text("NONE", (cx, cy), unit * 0.07, MUTED);
                }
                for (i, row) in rows.iter().take(20).enumerate() {
                    self.render_ranking_row(i, row);
                }
            }
        }
    }

    fn render_ranking_row(&mut self, index: usize, row: &RankingRow) {
        let bounds = self.layout.ranking_row(index);
        if row.is_me {
            self.fill(bounds, HIGHLIGHT);
        }
        let color = match row.podium() {
            Some(1) => GOLD,
            Some(2) => SILVER,
            Some(3) => BRONZE,
            _ => TEXT,
        };
        let (_, cy) = bounds.center();
        let h = bounds.h * 0.7;
        let pad = bounds.h * 0.3;
        self.draw_text_right(&row.rank.to_string(), bounds.x + bounds.w * 0.08, cy, h, color);
        self.draw_text_left(&row.nickname, bounds.x + bounds.w * 0.12, cy, h, color);
        self.draw_text_right(&row.score.to_string(), bounds.x + bounds.w * 0.78, cy, h, color);
        self.draw_text_right(
            &row.avg_reaction_ms.to_string(),
            bounds.x + bounds.w - pad,
            cy,
            h,
            MUTED,
        );
    }
}

impl Renderer for SkiaRenderer {
    fn clear_dirty(&mut self, dirty: &[Rect]) {
        let stride = self.width as usize * 4;
        let canvas = self.canvas.data_mut();
        for rect in dirty {
            let Some((x0, y0, x1, y1)) = clip(rect, self.width, self.height) else {
                continue;
            };
            for row in y0..y1 {
                let a = row * stride + x0 * 4;
                let b = row * stride + x1 * 4;
                canvas[a..b].copy_from_slice(&self.clear_buffer[a..b]);
            }
        }
    }

    fn blit_cached(&mut self, shape: Shape, center: (f32, f32)) {
        let Some(pm) = self.static_cache.get(shape as usize) else {
            return;
        };
        let x0 = (center.0 - pm.width() as f32 * 0.5).floor() as i32;
        let y0 = (center.1 - pm.height() as f32 * 0.5).floor() as i32;
        let touched = blit(&mut self.canvas, pm, x0, y0);
        self.mark_dirty(touched);
    }

    fn draw_text(&mut self, text: &str, center: (f32, f32), height: f32, color: [u8; 4]) {
        let width = self.glyphs.font.text_width(text, text_px(height) as f32);
        let left = center.0 - width * 0.5;
        self.draw_text_left(text, left, center.1, height, color);
    }
}

impl SceneRenderer for SkiaRenderer {
    fn render_scene(&mut self, scene: &SceneState) -> Result<()> {
        match scene.screen {
            Screen::Setup => self.render_setup(scene),
            Screen::Game => self.render_game(scene),
            Screen::Result => self.render_result(scene),
            Screen::Ranking => self.render_ranking(scene),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflex_core::{
        EngineCommand, Level, MathOp, MathProblem, ScoreResult, Stimulus, StimulusKind,
    };

    const W: u32 = 320;
    const H: u32 = 240;

    fn pixel(fb: &[u8], x: u32, y: u32) -> [u8; 4] {
        let i = ((y * W + x) * 4) as usize;
        [fb[i], fb[i + 1], fb[i + 2], fb[i + 3]]
    }

    fn frame() -> Vec<u8> {
        vec![0u8; (W * H * 4) as usize]
    }

    fn game_scene() -> SceneState {
        let mut scene = SceneState::default();
        scene.apply(&EngineCommand::ShowScreen(Screen::Game));
        scene
    }

    #[test]
    fn first_frame_paints_background() {
        let mut r = SkiaRenderer::new(W, H).unwrap();
        let mut fb = frame();
        r.render_frame(&game_scene(), &mut fb).unwrap();
        assert_eq!(pixel(&fb, 0, H - 1), BACKGROUND);
    }

    #[test]
    fn stimulus_disk_uses_its_color_and_clears() {
        let mut r = SkiaRenderer::new(W, H).unwrap();
        let mut fb = frame();
        let mut scene = game_scene();
        scene.apply(&EngineCommand::PresentStimulus(Stimulus::new(
            StimulusKind::NoGo,
            Some(StimulusColor::Red),
            false,
        )));
        r.render_frame(&scene, &mut fb).unwrap();
        assert_eq!(pixel(&fb, W / 2, H / 2), StimulusColor::Red.rgba());

        scene.apply(&EngineCommand::ClearStimulus);
        r.render_frame(&scene, &mut fb).unwrap();
        assert_eq!(pixel(&fb, W / 2, H / 2), BACKGROUND);
    }

    #[test]
    fn false_start_flashes_whole_screen() {
        let mut r = SkiaRenderer::new(W, H).unwrap();
        let mut fb = frame();
        let mut scene = game_scene();
        scene.apply(&EngineCommand::FalseStartFlash);
        r.render_frame(&scene, &mut fb).unwrap();
        assert_eq!(pixel(&fb, 1, 1), FLASH);
        assert_eq!(pixel(&fb, W - 1, H - 1), FLASH);

        scene.apply(&EngineCommand::ClearStimulus);
        r.render_frame(&scene, &mut fb).unwrap();
        assert_eq!(pixel(&fb, W - 1, H - 1), BACKGROUND);
    }

    #[test]
    fn math_modal_draws_option_boxes() {
        let mut r = SkiaRenderer::new(W, H).unwrap();
        let mut fb = frame();
        let mut scene = game_scene();
        scene.apply(&EngineCommand::ShowMath(MathProblem {
            lhs: 4,
            rhs: 5,
            op: MathOp::Multiply,
            options: [20, 21, 19, 22],
        }));
        r.render_frame(&scene, &mut fb).unwrap();
        let option = r.layout().math_options()[0];
        assert_eq!(pixel(&fb, option.x as u32 + 1, option.y as u32 + 1), OPTION);
    }

    #[test]
    fn setup_tiles_match_layout() {
        let mut r = SkiaRenderer::new(W, H).unwrap();
        let mut fb = frame();
        r.render_frame(&SceneState::default(), &mut fb).unwrap();
        for tile in r.layout().level_tiles() {
            assert_eq!(pixel(&fb, tile.x as u32 + 1, tile.y as u32 + 1), TILE);
        }
    }

    #[test]
    fn result_and_ranking_screens_render() {
        let mut r = SkiaRenderer::new(W, H).unwrap();
        let mut fb = frame();
        let level = Level::new(3).unwrap();
        let mut scene = SceneState::default();
        scene.apply(&EngineCommand::ShowScreen(Screen::Result));
        scene.apply(&EngineCommand::Finished {
            level,
            result: ScoreResult {
                score: 55_500,
                avg_reaction_ms: 250.0,
                accuracy: 0.875,
                ..ScoreResult::default()
            },
        });
        let stats = r.render_frame(&scene, &mut fb).unwrap();
        assert!(stats.dirty_count > 0);

        scene.show(Screen::Ranking);
        scene.ranking = RankingView::Loaded {
            level,
            rows: vec![RankingRow {
                rank: 1,
                nickname: "kai".into(),
                score: 55_500,
                avg_reaction_ms: 250,
                is_me: true,
            }],
        };
        r.render_frame(&scene, &mut fb).unwrap();
        let row = r.layout().ranking_row(0);
        assert_eq!(pixel(&fb, row.x as u32 + 1, row.y as u32 + 1), HIGHLIGHT);
    }

    #[test]
    fn ranking_row_prints_nickname() {
        let mut r = SkiaRenderer::new(W, H).unwrap();
        let mut fb = frame();
        let mut scene = SceneState::default();
        scene.show(Screen::Ranking);
        scene.ranking = RankingView::Loaded {
            level: Level::new(1).unwrap(),
            rows: vec![RankingRow {
                rank: 4,
                nickname: "wax".into(),
                score: 40_000,
                avg_reaction_ms: 250,
                is_me: false,
            }],
        };
        r.render_frame(&scene, &mut fb).unwrap();

        let row = r.layout().ranking_row(0);
        let x0 = (row.x + row.w * 0.12) as u32;
        let x1 = (row.x + row.w * 0.3) as u32;
        let inked = (row.y as u32..(row.y + row.h) as u32)
            .flat_map(|y| (x0..x1).map(move |x| (x, y)))
            .filter(|&(x, y)| pixel(&fb, x, y) != BACKGROUND)
            .count();
        assert!(inked > 10, "nickname left {inked} pixels");
    }

    #[test]
    fn rejects_wrong_sized_buffer() {
        let mut r = SkiaRenderer::new(W, H).unwrap();
        let mut fb = vec![0u8; 16];
        assert!(r.render_frame(&SceneState::default(), &mut fb).is_err());
    }

    #[test]
    fn coalesce_merges_touching_spans() {
        let mut rects = vec![
            Rect::from_xywh(10.0, 0.0, 5.0, 8.0).unwrap(),
            Rect::from_xywh(0.0, 0.0, 10.0, 8.0).unwrap(),
            Rect::from_xywh(0.0, 20.0, 4.0, 4.0).unwrap(),
        ];
        SkiaRenderer::coalesce_dirty(&mut rects);
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0].width(), 15.0);
    }

    #[test]
    fn resize_rebuilds_surfaces() {
        let mut r = SkiaRenderer::new(W, H).unwrap();
        r.resize(640, 480).unwrap();
        let mut fb = vec![0u8; 640 * 480 * 4];
        r.render_frame(&SceneState::default(), &mut fb).unwrap();
        assert!(r.resize(0, 10).is_err());
    }
}
