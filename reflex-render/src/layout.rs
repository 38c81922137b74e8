use reflex_core::Level;

/// Axis-aligned box in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    pub fn to_rect(self) -> Option<tiny_skia::Rect> {
        tiny_skia::Rect::from_xywh(self.x, self.y, self.w, self.h)
    }
}

/// Screen geometry shared by drawing and pointer hit testing, so a click
/// lands on exactly what was drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
}

impl Layout {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width * 0.5, self.height * 0.5)
    }

    /// Reference size for glyphs and shapes.
    pub fn unit(&self) -> f32 {
        self.width.min(self.height)
    }

    pub fn stimulus_radius(&self) -> f32 {
        (self.unit() * 0.15).max(8.0)
    }

    /// Six level tiles in a 3 × 2 grid, ordered by level.
    pub fn level_tiles(&self) -> [Bounds; 6] {
        let side = (self.width / 5.0).min(self.height / 4.0);
        let gap = side * 0.25;
        let grid_w = side * 3.0 + gap * 2.0;
        let grid_h = side * 2.0 + gap;
        let x0 = (self.width - grid_w) * 0.5;
        let y0 = self.height * 0.58 - grid_h * 0.5;
        std::array::from_fn(|i| {
            let (col, row) = ((i % 3) as f32, (i / 3) as f32);
            Bounds::new(x0 + col * (side + gap), y0 + row * (side + gap), side, side)
        })
    }

    pub fn math_modal(&self) -> Bounds {
        let w = self.width * 0.6;
        let h = self.height * 0.6;
        Bounds::new((self.width - w) * 0.5, (self.height - h) * 0.5, w, h)
    }

    /// Four answer boxes in a 2 × 2 grid in the lower part of the modal.
    pub fn math_options(&self) -> [Bounds; 4] {
        let modal = self.math_modal();
        let pad = modal.w * 0.06;
        let w = (modal.w - pad * 3.0) * 0.5;
        let h = modal.h * 0.22;
        let y0 = modal.y + modal.h * 0.42;
        std::array::from_fn(|i| {
            let (col, row) = ((i % 2) as f32, (i / 2) as f32);
            Bounds::new(
                modal.x + pad + col * (w + pad),
                y0 + row * (h + pad * 0.5),
                w,
                h,
            )
        })
    }

    /// Ranking row `index` (0-based) of the visible list.
    pub fn ranking_row(&self, index: usize) -> Bounds {
        let top = self.height * 0.2;
        let h = ((self.height - top) / 21.0).max(12.0);
        let w = self.width * 0.8;
        Bounds::new((self.width - w) * 0.5, top + index as f32 * h, w, h * 0.9)
    }

    pub fn hit_level(&self, x: f32, y: f32) -> Option<Level> {
        self.level_tiles()
            .iter()
            .position(|b| b.contains(x, y))
            .and_then(|i| Level::new(i as u8 + 1).ok())
    }

    pub fn hit_math_option(&self, x: f32, y: f32) -> Option<usize> {
        self.math_options().iter().position(|b| b.contains(x, y))
    }
}
