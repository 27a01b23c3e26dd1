//! Snapshot images written during interactive selection so the operator can
//! check what will be recorded.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use common::{Frame, Region};
use image::RgbImage;
use recorder::backend::{self, CaptureBackend, XcapBackend};
use recorder::convert;

pub trait Previewer {
    fn save_screen(&self, path: &Path) -> Result<()>;
    fn save_region(&self, region: &Region, path: &Path) -> Result<()>;
}

pub struct XcapPreviewer;

impl Previewer for XcapPreviewer {
    fn save_screen(&self, path: &Path) -> Result<()> {
        let frame = backend::capture_primary_monitor()?;
        save_png(&frame, path)
    }

    fn save_region(&self, region: &Region, path: &Path) -> Result<()> {
        let frame = XcapBackend::new().capture(region)?;
        save_png(&frame, path)
    }
}

pub fn save_png(frame: &Frame, path: &Path) -> Result<()> {
    let bgr = convert::to_bgr24(frame)?;
    let rgb: Vec<u8> = bgr
        .data
        .chunks_exact(3)
        .flat_map(|px| [px[2], px[1], px[0]])
        .collect();
    let image = RgbImage::from_raw(bgr.width, bgr.height, rgb)
        .ok_or_else(|| anyhow!("frame buffer does not match {}x{}", bgr.width, bgr.height))?;
    image
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))
}
