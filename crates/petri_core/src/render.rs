//! # Renderer
//!
//! Maps a [`Grid`] to an RGBA [`Frame`]. Each cell becomes a
//! `scale x scale` pixel block; the frame is exactly
//! `width * scale` by `height * scale` pixels.
//!
//! ## Bordered block (scale 3)
//!
//! ```text
//!  B C B      B = background (always)
//!  C A C      C = cell color (alive or dead)
//!  B C B      A = accent (always)
//! ```
//!
//! Larger scales keep the same shape: corners are background, the rest of
//! the rim is the cell color, the inside is accent. Below scale 3 there is
//! no rim to draw and the block is filled with the cell color.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::grid::Grid;

/// One RGBA8 pixel.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgba {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba {
    /// Opaque black.
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    /// Opaque blue, the live-cell color.
    pub const BLUE: Self = Self::opaque(0, 0, 255);
    /// Dark red block accent.
    pub const ACCENT: Self = Self::opaque(64, 0, 0);

    /// Creates an opaque color.
    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Block layout used by the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteStyle {
    /// Whole block in the cell color.
    Plain,
    /// Background corners, cell-colored rim, accent center.
    #[default]
    Bordered,
}

/// Fixed colors for one palette style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Block layout.
    pub style: PaletteStyle,
    /// Color of a live cell.
    pub alive: Rgba,
    /// Color of a dead cell.
    pub dead: Rgba,
    /// Corner color of bordered blocks.
    pub background: Rgba,
    /// Inner color of bordered blocks.
    pub accent: Rgba,
}

impl Palette {
    /// Standard colors for `style`.
    #[must_use]
    pub const fn from_style(style: PaletteStyle) -> Self {
        Self {
            style,
            alive: Rgba::BLUE,
            dead: Rgba::BLACK,
            background: Rgba::BLACK,
            accent: Rgba::ACCENT,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_style(PaletteStyle::default())
    }
}

/// A rendered generation, row-major RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl Frame {
    /// A frame filled with one color.
    #[must_use]
    pub fn blank(width: usize, height: usize, color: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    /// Width in pixels.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Pixel at `(x, y)`, or `None` outside the frame.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// All pixels, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Raw RGBA bytes, ready for upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// Grid to frame mapping with a fixed scale and palette.
#[derive(Clone, Copy, Debug)]
pub struct Renderer {
    scale: usize,
    palette: Palette,
}

impl Renderer {
    /// Creates a renderer.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidScale`] for a zero scale.
    pub fn new(scale: u32, palette: Palette) -> Result<Self, RenderError> {
        if scale == 0 {
            return Err(RenderError::InvalidScale(scale));
        }
        Ok(Self {
            scale: scale as usize,
            palette,
        })
    }

    /// Pixels per cell along each axis.
    #[must_use]
    pub const fn scale(&self) -> usize {
        self.scale
    }

    /// Colors in use.
    #[must_use]
    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Renders one generation.
    #[must_use]
    pub fn render(&self, grid: &Grid) -> Frame {
        let s = self.scale;
        let mut frame = Frame::blank(grid.width() * s, grid.height() * s, self.palette.background);

        for cy in 0..grid.height() {
            for cx in 0..grid.width() {
                let alive = grid.get(cx, cy);
                for py in 0..s {
                    let row = (cy * s + py) * frame.width;
                    for px in 0..s {
                        frame.pixels[row + cx * s + px] = self.block_pixel(alive, px, py);
                    }
                }
            }
        }
        frame
    }

    /// Color of pixel `(px, py)` inside one cell block.
    fn block_pixel(&self, alive: bool, px: usize, py: usize) -> Rgba {
        let cell = if alive { self.palette.alive } else { self.palette.dead };
        let s = self.scale;
        if self.palette.style == PaletteStyle::Plain || s < 3 {
            return cell;
        }

        let rim_x = px == 0 || px == s - 1;
        let rim_y = py == 0 || py == s - 1;
        match (rim_x, rim_y) {
            (true, true) => self.palette.background,
            (true, false) | (false, true) => cell,
            (false, false) => self.palette.accent,
        }
    }
}
