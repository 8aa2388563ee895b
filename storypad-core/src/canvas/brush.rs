use crate::color::Color;

#[derive(
    Copy, Clone, PartialEq, Eq, Debug, Default, serde::Serialize, serde::Deserialize, strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
pub enum BrushMode {
    #[default]
    Paint,
    /// Paints the canvas background color instead of the brush color.
    Erase,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum BrushError {
    #[error("brush size {0} is not a positive finite number")]
    BadSize(f32),
}

/// Settings used to paint a stroke.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Brush {
    color: Color,
    /// Diameter, in pixels. Always finite and positive.
    size: f32,
    mode: BrushMode,
}
impl Brush {
    pub const DEFAULT_SIZE: f32 = 5.0;
    pub fn new(color: Color, size: f32) -> Result<Self, BrushError> {
        let mut this = Self {
            color,
            ..Self::default()
        };
        this.set_size(size)?;
        Ok(this)
    }
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }
    #[must_use]
    pub fn size(&self) -> f32 {
        self.size
    }
    pub fn set_size(&mut self, size: f32) -> Result<(), BrushError> {
        if size.is_finite() && size > 0.0 {
            self.size = size;
            Ok(())
        } else {
            Err(BrushError::BadSize(size))
        }
    }
    #[must_use]
    pub fn mode(&self) -> BrushMode {
        self.mode
    }
    pub fn set_mode(&mut self, mode: BrushMode) {
        self.mode = mode;
    }
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }
}
impl Default for Brush {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            size: Self::DEFAULT_SIZE,
            mode: BrushMode::Paint,
        }
    }
}

/// Squared distance from `p` to the segment `a..b`.
#[must_use]
pub(super) fn distance_sq_to_segment(p: [f32; 2], a: [f32; 2], b: [f32; 2]) -> f32 {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let ap = [p[0] - a[0], p[1] - a[1]];
    let len_sq = ab[0] * ab[0] + ab[1] * ab[1];
    // Degenerate segment (a dot) - distance to the point.
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        ((ap[0] * ab[0] + ap[1] * ab[1]) / len_sq).clamp(0.0, 1.0)
    };
    let closest = [a[0] + ab[0] * t, a[1] + ab[1] * t];
    let d = [p[0] - closest[0], p[1] - closest[1]];
    d[0] * d[0] + d[1] * d[1]
}

#[cfg(test)]
mod test {
    use super::{distance_sq_to_segment, Brush, BrushError};
    use crate::color::Color;
    #[test]
    fn size_validation() {
        assert!(Brush::new(Color::BLACK, 3.0).is_ok());
        assert_eq!(
            Brush::new(Color::BLACK, 0.0).unwrap_err(),
            BrushError::BadSize(0.0)
        );
        assert!(Brush::new(Color::BLACK, f32::NAN).is_err());
        assert!(Brush::new(Color::BLACK, f32::INFINITY).is_err());

        let mut brush = Brush::default();
        assert!(brush.set_size(-1.0).is_err());
        // Failed sets leave the brush alone.
        assert_eq!(brush.size(), Brush::DEFAULT_SIZE);
    }
    #[test]
    fn segment_distance() {
        let (a, b) = ([0.0, 0.0], [10.0, 0.0]);
        assert_eq!(distance_sq_to_segment([5.0, 3.0], a, b), 9.0);
        // Past the ends, distance is to the endpoint (round caps).
        assert_eq!(distance_sq_to_segment([13.0, 4.0], a, b), 25.0);
        assert_eq!(distance_sq_to_segment([-3.0, 0.0], a, b), 9.0);
        // Dot.
        assert_eq!(distance_sq_to_segment([1.0, 1.0], a, a), 2.0);
    }
}
