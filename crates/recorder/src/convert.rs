//! Capture-to-encoder pixel conversion.
//!
//! Screen grabs arrive as four bytes per pixel in RGBA or BGRA order; the
//! encoder input is packed BGR24. Getting the channel order wrong swaps red
//! and blue in the output video, so both source orders are handled explicitly.

use common::{BgrFrame, Frame, PixelLayout};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("Row stride {stride} is smaller than {width} pixels")]
    StrideTooSmall { stride: usize, width: u32 },

    #[error("Frame buffer holds {actual} bytes, need at least {needed}")]
    Truncated { needed: usize, actual: usize },
}

pub fn to_bgr24(frame: &Frame) -> Result<BgrFrame, ConvertError> {
    let row_bytes = frame.width as usize * PixelLayout::BYTES_PER_PIXEL;
    if frame.stride < row_bytes {
        return Err(ConvertError::StrideTooSmall {
            stride: frame.stride,
            width: frame.width,
        });
    }
    let needed = match frame.height as usize {
        0 => 0,
        h => frame.stride * (h - 1) + row_bytes,
    };
    if frame.data.len() < needed {
        return Err(ConvertError::Truncated {
            needed,
            actual: frame.data.len(),
        });
    }

    let mut out =
        Vec::with_capacity(frame.width as usize * frame.height as usize * BgrFrame::BYTES_PER_PIXEL);
    for row in 0..frame.height as usize {
        let start = row * frame.stride;
        let pixels = frame.data[start..start + row_bytes].chunks_exact(PixelLayout::BYTES_PER_PIXEL);
        match frame.layout {
            PixelLayout::Rgba => {
                for px in pixels {
                    out.extend_from_slice(&[px[2], px[1], px[0]]);
                }
            }
            PixelLayout::Bgra => {
                for px in pixels {
                    out.extend_from_slice(&px[..3]);
                }
            }
        }
    }

    Ok(BgrFrame {
        width: frame.width,
        height: frame.height,
        data: out,
    })
}
