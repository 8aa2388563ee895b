use base64::Engine;

use super::CanvasError;

/// Prefix of a PNG data URI, as sent to the story backend.
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// An immutable copy of a canvas' pixels at one point in time.
///
/// Straight-alpha RGBA8, rows top to bottom, no padding.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot {
    width: u32,
    height: u32,
    pixels: Box<[u8]>,
}
impl Snapshot {
    /// Wrap a pixel buffer. Fails if the buffer is not exactly `width * height * 4` bytes or the
    /// dimensions are unusable.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, CanvasError> {
        let len = super::buffer_len(width, height)?;
        if pixels.len() != len {
            return Err(CanvasError::BufferLength {
                expected: len,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels: pixels.into_boxed_slice(),
        })
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
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
    /// Size of the pixel buffer in bytes.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
    pub fn encode_png(&self) -> Result<Vec<u8>, png::EncodingError> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.pixels)?;
            writer.finish()?;
        }
        Ok(out)
    }
    /// Encode as a `data:image/png;base64,...` URI.
    pub fn to_data_uri(&self) -> Result<String, png::EncodingError> {
        let png = self.encode_png()?;
        let mut uri = String::with_capacity(PNG_DATA_URI_PREFIX.len() + png.len() * 4 / 3 + 4);
        uri.push_str(PNG_DATA_URI_PREFIX);
        base64::engine::general_purpose::STANDARD.encode_string(&png, &mut uri);
        Ok(uri)
    }
    /// Decode an uploaded PNG image, converting it to RGBA8.
    pub fn decode_png(bytes: &[u8]) -> Result<Self, CanvasError> {
        let mut decoder = png::Decoder::new(bytes);
        // Expand palettes and low bit depths, strip 16 bit down to 8.
        decoder.set_transformations(png::Transformations::normalize_to_color8());
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        buf.truncate(info.buffer_size());

        let pixel_count = info.width as usize * info.height as usize;
        let rgba = match info.color_type {
            png::ColorType::Rgba => buf,
            png::ColorType::Rgb => buf
                .chunks_exact(3)
                .flat_map(|px| [px[0], px[1], px[2], 255])
                .collect(),
            png::ColorType::Grayscale => buf.iter().flat_map(|&l| [l, l, l, 255]).collect(),
            png::ColorType::GrayscaleAlpha => buf
                .chunks_exact(2)
                .flat_map(|px| [px[0], px[0], px[0], px[1]])
                .collect(),
            // Removed by the EXPAND transformation.
            png::ColorType::Indexed => return Err(CanvasError::UnsupportedImage),
        };
        if rgba.len() != pixel_count * 4 {
            return Err(CanvasError::UnsupportedImage);
        }
        Self::from_rgba8(info.width, info.height, rgba)
    }
}
impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Don't dump megabytes of pixels.
        f.debug_struct("Snapshot")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}
