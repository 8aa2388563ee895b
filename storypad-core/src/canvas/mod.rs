//! # Canvas
//!
//! A CPU raster surface that strokes are painted into, and the [`Snapshot`]s taken of it for the
//! undo history. Pixels are straight-alpha RGBA8 so that a snapshot can be handed to PNG encoding as-is.

pub mod brush;
pub mod snapshot;

pub use brush::{Brush, BrushMode};
pub use snapshot::Snapshot;

use crate::color::Color;

/// Largest accepted width or height. A full canvas snapshot at this size is 256MiB!
pub const MAX_DIMENSION: u32 = 8192;

#[derive(thiserror::Error, Debug)]
pub enum CanvasError {
    #[error("canvas size {width}x{height} is out of range")]
    InvalidSize { width: u32, height: u32 },
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferLength { expected: usize, actual: usize },
    #[error("snapshot is {found:?}, canvas is {expected:?}")]
    SnapshotSize { expected: [u32; 2], found: [u32; 2] },
    #[error("unsupported image layout")]
    UnsupportedImage,
    #[error("failed to decode image: {0}")]
    Decode(#[from] png::DecodingError),
}

/// Bytes needed for an RGBA8 buffer of the given size, checking the size is in range.
pub(crate) fn buffer_len(width: u32, height: u32) -> Result<usize, CanvasError> {
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(CanvasError::InvalidSize { width, height });
    }
    Ok(width as usize * height as usize * 4)
}

pub struct Canvas {
    width: u32,
    height: u32,
    background: Color,
    /// Row-major, `width * height` long.
    pixels: Vec<Color>,
}
impl Canvas {
    /// Create a canvas filled with `background`.
    pub fn new(width: u32, height: u32, background: Color) -> Result<Self, CanvasError> {
        let len = buffer_len(width, height)? / 4;
        Ok(Self {
            width,
            height,
            background,
            pixels: vec![background; len],
        })
    }
    /// Create a canvas with the contents of a snapshot, e.g. an uploaded image.
    /// `background` is used for erasing and clearing.
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot, background: Color) -> Self {
        Self {
            width: snapshot.width(),
            height: snapshot.height(),
            background,
            pixels: bytemuck::cast_slice(snapshot.pixels()).to_vec(),
        }
    }
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }
    #[must_use]
    pub fn dimensions(&self) -> [u32; 2] {
        [self.width, self.height]
    }
    #[must_use]
    pub fn background(&self) -> Color {
        self.background
    }
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }
    /// Fill with the background color.
    pub fn clear(&mut self) {
        self.fill(self.background);
    }
    /// Paint a single round dab, as left by a tap.
    pub fn paint_dot(&mut self, at: [f32; 2], brush: &Brush) {
        self.paint_segment(at, at, brush);
    }
    /// Paint a line with round caps. Consecutive segments of a stroke share endpoints,
    /// giving round joins too.
    pub fn paint_segment(&mut self, from: [f32; 2], to: [f32; 2], brush: &Brush) {
        // Always cover at least the pixel the point falls in, even for hairline brushes.
        let radius = brush.radius().max(std::f32::consts::FRAC_1_SQRT_2);
        let radius_sq = radius * radius;
        let color = match brush.mode() {
            BrushMode::Paint => brush.color(),
            BrushMode::Erase => self.background,
        };

        // Bounding box of the capsule, clamped to the canvas. Float->int casts saturate.
        let min_x = (from[0].min(to[0]) - radius).floor().max(0.0) as u32;
        let min_y = (from[1].min(to[1]) - radius).floor().max(0.0) as u32;
        let max_x = ((from[0].max(to[0]) + radius).ceil() as u32).min(self.width);
        let max_y = ((from[1].max(to[1]) + radius).ceil() as u32).min(self.height);

        let width = self.width as usize;
        for y in min_y..max_y {
            let row = &mut self.pixels[y as usize * width..(y as usize + 1) * width];
            for x in min_x..max_x {
                let center = [x as f32 + 0.5, y as f32 + 0.5];
                if brush::distance_sq_to_segment(center, from, to) <= radius_sq {
                    let dst = &mut row[x as usize];
                    *dst = match brush.mode() {
                        BrushMode::Paint => color.over(*dst),
                        BrushMode::Erase => color,
                    };
                }
            }
        }
    }
    /// Copy the current pixels.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        // Unwrap OK - our dimensions were checked at construction and the buffer always matches them.
        Snapshot::from_rgba8(
            self.width,
            self.height,
            bytemuck::cast_slice(&self.pixels).to_vec(),
        )
        .unwrap()
    }
    /// Replace the pixels with those of a snapshot of the same size.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), CanvasError> {
        if snapshot.dimensions() != self.dimensions() {
            return Err(CanvasError::SnapshotSize {
                expected: self.dimensions(),
                found: snapshot.dimensions(),
            });
        }
        self.pixels
            .copy_from_slice(bytemuck::cast_slice(snapshot.pixels()));
        Ok(())
    }
}
impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("background", &self.background)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::{Brush, BrushMode, Canvas, CanvasError, Snapshot};
    use crate::color::Color;

    fn painted_count(canvas: &Canvas) -> usize {
        canvas
            .pixels()
            .iter()
            .filter(|&&px| px != canvas.background())
            .count()
    }

    #[test]
    fn size_limits() {
        assert!(matches!(
            Canvas::new(0, 10, Color::WHITE),
            Err(CanvasError::InvalidSize {
                width: 0,
                height: 10
            })
        ));
        assert!(Canvas::new(super::MAX_DIMENSION + 1, 1, Color::WHITE).is_err());
        let canvas = Canvas::new(3, 2, Color::WHITE).unwrap();
        assert_eq!(canvas.pixels().len(), 6);
        assert_eq!(canvas.pixel(2, 1), Some(Color::WHITE));
        assert_eq!(canvas.pixel(3, 0), None);
    }
    #[test]
    fn horizontal_line() {
        let mut canvas = Canvas::new(20, 9, Color::WHITE).unwrap();
        let brush = Brush::new(Color::BLACK, 3.0).unwrap();
        canvas.paint_segment([4.0, 4.5], [15.0, 4.5], &brush);

        // On the line.
        for x in 4..15 {
            assert_eq!(canvas.pixel(x, 4), Some(Color::BLACK), "x = {x}");
        }
        // Within radius 1.5 above and below.
        assert_eq!(canvas.pixel(10, 3), Some(Color::BLACK));
        assert_eq!(canvas.pixel(10, 5), Some(Color::BLACK));
        // Outside.
        assert_eq!(canvas.pixel(10, 2), Some(Color::WHITE));
        assert_eq!(canvas.pixel(10, 6), Some(Color::WHITE));
        assert_eq!(canvas.pixel(0, 4), Some(Color::WHITE));
        assert_eq!(canvas.pixel(19, 4), Some(Color::WHITE));
    }
    #[test]
    fn dot_and_clipping() {
        let mut canvas = Canvas::new(4, 4, Color::WHITE).unwrap();
        let brush = Brush::new(Color::BLACK, 1.0).unwrap();
        canvas.paint_dot([1.5, 1.5], &brush);
        assert_eq!(painted_count(&canvas), 1);
        assert_eq!(canvas.pixel(1, 1), Some(Color::BLACK));

        // Huge brush partially off-canvas must not panic, and covers everything.
        let big = Brush::new(Color::BLACK, 100.0).unwrap();
        canvas.paint_dot([-10.0, -10.0], &big);
        assert_eq!(painted_count(&canvas), 16);

        // Entirely off-canvas does nothing.
        let mut canvas = Canvas::new(4, 4, Color::WHITE).unwrap();
        canvas.paint_segment([50.0, 50.0], [60.0, 60.0], &brush);
        canvas.paint_segment([-50.0, -50.0], [-60.0, -60.0], &brush);
        assert_eq!(painted_count(&canvas), 0);
    }
    #[test]
    fn erase() {
        let mut canvas = Canvas::new(8, 8, Color::WHITE).unwrap();
        canvas.fill(Color::BLACK);
        let mut eraser = Brush::new(Color::rgb(255, 0, 0), 2.0).unwrap();
        eraser.set_mode(BrushMode::Erase);
        canvas.paint_dot([4.0, 4.0], &eraser);
        // Erasing paints the background, not the brush color.
        assert_eq!(canvas.pixel(3, 3), Some(Color::WHITE));
        assert!(!canvas.pixels().contains(&Color::rgb(255, 0, 0)));

        canvas.clear();
        assert_eq!(painted_count(&canvas), 0);
    }
    #[test]
    fn snapshot_restore() {
        let mut canvas = Canvas::new(10, 10, Color::WHITE).unwrap();
        let blank = canvas.snapshot();
        canvas.paint_segment([0.0, 0.0], [10.0, 10.0], &Brush::default());
        let painted = canvas.snapshot();
        assert_ne!(blank, painted);

        canvas.restore(&blank).unwrap();
        assert_eq!(canvas.snapshot(), blank);
        canvas.restore(&painted).unwrap();
        assert_eq!(canvas.snapshot(), painted);

        let other = Snapshot::from_rgba8(2, 2, vec![0; 16]).unwrap();
        assert!(matches!(
            canvas.restore(&other),
            Err(CanvasError::SnapshotSize {
                expected: [10, 10],
                found: [2, 2]
            })
        ));
        // Failed restore leaves the pixels alone.
        assert_eq!(canvas.snapshot(), painted);
    }
    #[test]
    fn from_snapshot() {
        let snapshot =
            Snapshot::from_rgba8(1, 2, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let canvas = Canvas::from_snapshot(&snapshot, Color::WHITE);
        assert_eq!(canvas.dimensions(), [1, 2]);
        assert_eq!(canvas.pixel(0, 1), Some(Color::rgba(5, 6, 7, 8)));
        assert_eq!(canvas.background(), Color::WHITE);
    }
}
