pub mod frame;
pub mod region;

pub use frame::{BgrFrame, Frame, PixelLayout};
pub use region::{Point, Region, RegionError};

pub use anyhow;
pub use async_trait;
pub use ffmpeg_next;
pub use log;
pub use tokio;
