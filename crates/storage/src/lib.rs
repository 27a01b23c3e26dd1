//! Output side of a recording: where the file goes and the encoder/muxer that
//! writes it.

mod stream;
mod target;

pub use stream::{OutputStream, StreamSettings};
pub use target::{OutputTarget, timestamped_file_name};

use common::ffmpeg_next as ffmpeg;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("ffmpeg error: {0}")]
    Ffmpeg(#[from] ffmpeg::Error),

    #[error("No encoder named {0:?} is available in this ffmpeg build")]
    EncoderNotFound(String),

    #[error("Invalid stream settings: {0}")]
    InvalidSettings(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "Frame is {}x{} but the stream was opened at {}x{}",
        actual.0, actual.1, expected.0, expected.1
    )]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Frame buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Output stream is already closed")]
    Closed,
}
