//! Screen grabbing via the `xcap` crate.
//!
//! Regions are given in virtual-desktop coordinates. Each grab is assembled
//! from every monitor the region overlaps, translated into that monitor's
//! local space. Nothing is clamped; areas no monitor covers come out black.

use common::log::{info, trace};
use common::{Frame, PixelLayout, Point, Region};
use xcap::Monitor;

/// Rasterizes a screen region. Called once per tick, on the loop's thread.
pub trait CaptureBackend {
    fn capture(&mut self, region: &Region) -> Result<Frame, CaptureError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Failed to enumerate monitors: {0}")]
    MonitorEnumeration(String),

    #[error("No monitor found at {point}: {reason}")]
    NoMonitorAt { point: Point, reason: String },

    #[error("No primary monitor found")]
    NoPrimaryMonitor,

    #[error("Screen capture failed: {0}")]
    CaptureFailed(String),
}

/// Display description used when recording a whole monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorInfo {
    pub name: String,
    pub bounds: Region,
    pub is_primary: bool,
}

pub fn list_monitors() -> Result<Vec<MonitorInfo>, CaptureError> {
    let monitors = Monitor::all().map_err(|e| CaptureError::MonitorEnumeration(e.to_string()))?;
    monitors
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let bounds = monitor_bounds(m)?;
            Ok(MonitorInfo {
                name: m.name().unwrap_or_else(|_| format!("monitor-{i}")),
                bounds,
                is_primary: m.is_primary().unwrap_or(false),
            })
        })
        .collect()
}

fn monitor_bounds(monitor: &Monitor) -> Result<Region, CaptureError> {
    let err = |e: xcap::XCapError| CaptureError::MonitorEnumeration(e.to_string());
    Ok(Region::new(
        monitor.x().map_err(err)?,
        monitor.y().map_err(err)?,
        monitor.width().map_err(err)?,
        monitor.height().map_err(err)?,
    ))
}

/// Captures the whole primary monitor, falling back to the first one listed.
pub fn capture_primary_monitor() -> Result<Frame, CaptureError> {
    let monitors = Monitor::all().map_err(|e| CaptureError::MonitorEnumeration(e.to_string()))?;
    let primary = match monitors.iter().position(|m| m.is_primary().unwrap_or(false)) {
        Some(i) => &monitors[i],
        None => monitors.first().ok_or(CaptureError::NoPrimaryMonitor)?,
    };
    let image = primary
        .capture_image()
        .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;
    let (width, height) = image.dimensions();
    Ok(Frame::packed(width, height, PixelLayout::Rgba, image.into_raw()))
}

/// The part of a region that one monitor can supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tile {
    monitor: usize,
    /// Monitor-local rectangle to grab.
    source: Region,
    /// Where the grab lands inside the region-sized canvas.
    dest: (u32, u32),
}

/// Splits `region` into per-monitor grabs. Parts covered by no monitor get
/// no tile and stay black.
fn plan_tiles(region: &Region, monitors: &[Region]) -> Vec<Tile> {
    monitors
        .iter()
        .enumerate()
        .filter_map(|(monitor, bounds)| {
            let shared = region.intersection(bounds)?;
            Some(Tile {
                monitor,
                source: Region::new(
                    shared.left - bounds.left,
                    shared.top - bounds.top,
                    shared.width,
                    shared.height,
                ),
                dest: (
                    (shared.left as i64 - region.left as i64) as u32,
                    (shared.top as i64 - region.top as i64) as u32,
                ),
            })
        })
        .collect()
}

/// Copies a packed RGBA grab into the canvas at `dest`, cropping anything
/// that would fall outside it.
fn blit(
    canvas: &mut [u8],
    canvas_size: (u32, u32),
    dest: (u32, u32),
    src: &[u8],
    src_size: (u32, u32),
) {
    let bpp = PixelLayout::BYTES_PER_PIXEL;
    let cols = src_size.0.min(canvas_size.0.saturating_sub(dest.0)) as usize;
    let rows = src_size.1.min(canvas_size.1.saturating_sub(dest.1)) as usize;
    let canvas_stride = canvas_size.0 as usize * bpp;
    let src_stride = src_size.0 as usize * bpp;
    for row in 0..rows {
        let from = row * src_stride;
        let to = (dest.1 as usize + row) * canvas_stride + dest.0 as usize * bpp;
        canvas[to..to + cols * bpp].copy_from_slice(&src[from..from + cols * bpp]);
    }
}

#[derive(Default)]
pub struct XcapBackend {
    // Enumerated on the first grab; the layout is assumed fixed for a session.
    monitors: Vec<(Monitor, Region)>,
}

impl XcapBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn load_monitors(&mut self, region: &Region) -> Result<(), CaptureError> {
        let monitors = Monitor::all().map_err(|e| CaptureError::MonitorEnumeration(e.to_string()))?;
        for monitor in monitors {
            let bounds = monitor_bounds(&monitor)?;
            if region.intersection(&bounds).is_some() {
                info!("[recorder] capturing {} from monitor {}", region, bounds);
            }
            self.monitors.push((monitor, bounds));
        }
        Ok(())
    }
}

impl CaptureBackend for XcapBackend {
    fn capture(&mut self, region: &Region) -> Result<Frame, CaptureError> {
        if self.monitors.is_empty() {
            self.load_monitors(region)?;
        }
        let bounds: Vec<Region> = self.monitors.iter().map(|(_, b)| *b).collect();
        let tiles = plan_tiles(region, &bounds);
        if tiles.is_empty() {
            return Err(CaptureError::NoMonitorAt {
                point: region.origin(),
                reason: format!("{region} overlaps no monitor"),
            });
        }

        let size = region.dimensions();
        let mut canvas = vec![0u8; region.pixel_count() * PixelLayout::BYTES_PER_PIXEL];
        for tile in &tiles {
            let (monitor, _) = &self.monitors[tile.monitor];
            let src = tile.source;
            let image = monitor
                .capture_region(src.left as u32, src.top as u32, src.width, src.height)
                .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;
            blit(&mut canvas, size, tile.dest, image.as_raw(), image.dimensions());
        }

        trace!(
            "[recorder] grabbed {}x{} from {} monitor(s)",
            size.0,
            size.1,
            tiles.len()
        );
        Ok(Frame::packed(size.0, size.1, PixelLayout::Rgba, canvas))
    }
}
