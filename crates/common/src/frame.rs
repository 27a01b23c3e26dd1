/// Byte order of a four-channel captured pixel. The fourth byte is alpha or
/// padding and is dropped before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Rgba,
    Bgra,
}

impl PixelLayout {
    pub const BYTES_PER_PIXEL: usize = 4;
}

/// A raster grabbed from the screen, as the capture backend produced it.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Bytes per row, at least `width * 4`.
    pub stride: usize,
    pub layout: PixelLayout,
    pub data: Vec<u8>,
}

impl Frame {
    /// A frame with rows packed back to back.
    pub fn packed(width: u32, height: u32, layout: PixelLayout, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            stride: width as usize * PixelLayout::BYTES_PER_PIXEL,
            layout,
            data,
        }
    }
}

/// Tightly packed BGR24, the layout handed to the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgrFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl BgrFrame {
    pub const BYTES_PER_PIXEL: usize = 3;

    pub fn row_len(&self) -> usize {
        self.width as usize * Self::BYTES_PER_PIXEL
    }
}
