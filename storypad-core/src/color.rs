/// A straight-alpha sRGB color with 8 bits per channel, laid out as `[r, g, b, a]`.
///
/// This matches the byte layout of a [`crate::canvas::Canvas`] pixel, so slices of pixels can be
/// cast to and from `&[Color]`.
#[repr(transparent)]
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable, Debug, Default,
)]
pub struct Color(pub [u8; 4]);
impl Color {
    pub const TRANSPARENT: Self = Self([0; 4]);
    pub const WHITE: Self = Self([255; 4]);
    pub const BLACK: Self = Self([0, 0, 0, 255]);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }
    #[must_use]
    pub const fn alpha(self) -> u8 {
        self.0[3]
    }
    /// Composite `self` over `dst` (Porter-Duff source-over, straight alpha).
    #[must_use]
    pub fn over(self, dst: Self) -> Self {
        match self.alpha() {
            255 => return self,
            0 => return dst,
            _ => (),
        }
        let src_a = u32::from(self.alpha());
        let dst_a = u32::from(dst.alpha());
        // Everything in units of 255*255 to stay in integers.
        let dst_weight = dst_a * (255 - src_a);
        let out_a = src_a * 255 + dst_weight;
        if out_a == 0 {
            return Self::TRANSPARENT;
        }
        let mut out = [0u8; 4];
        for (channel, out) in out.iter_mut().take(3).enumerate() {
            let src = u32::from(self.0[channel]) * src_a * 255;
            let dst = u32::from(dst.0[channel]) * dst_weight;
            // Rounded division, result is always <= 255.
            *out = ((src + dst + out_a / 2) / out_a) as u8;
        }
        out[3] = ((out_a + 127) / 255) as u8;
        Self(out)
    }
}
impl std::fmt::Display for Color {
    /// Formats as `#RRGGBB`, or `#RRGGBBAA` if not opaque. This is parseable by [`std::str::FromStr`].
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b, a] = self.0;
        if a == 255 {
            write!(f, "#{r:02X}{g:02X}{b:02X}")
        } else {
            write!(f, "#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("color must start with '#'")]
    MissingHash,
    #[error("expected 6 or 8 hex digits")]
    BadLength,
    #[error("invalid hex digit")]
    BadDigit,
}
/// Parse from syntax `#RRGGBB` or `#RRGGBBAA`, case-insensitive.
impl std::str::FromStr for Color {
    type Err = ColorParseError;
    fn from_str(str: &str) -> Result<Self, Self::Err> {
        let digits = str
            .trim()
            .strip_prefix('#')
            .ok_or(ColorParseError::MissingHash)?;
        if !digits.is_ascii() || !(digits.len() == 6 || digits.len() == 8) {
            return Err(ColorParseError::BadLength);
        }
        let mut out = Color::BLACK;
        for (idx, channel) in out.0.iter_mut().enumerate().take(digits.len() / 2) {
            let pair = &digits[idx * 2..idx * 2 + 2];
            *channel = u8::from_str_radix(pair, 16).map_err(|_| ColorParseError::BadDigit)?;
        }
        Ok(out)
    }
}
// Human-readable hex strings in config files and payloads.
impl serde::Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let str =
            <std::borrow::Cow<'de, str> as serde::Deserialize<'de>>::deserialize(deserializer)?;
        str.parse().map_err(serde::de::Error::custom)
    }
}
