use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use common::async_trait::async_trait;
use common::log::{error, info, warn};
use common::tokio;
use common::tokio::time::Instant;
use common::{Region, RegionError};
use storage::{OutputError, OutputStream, OutputTarget, StreamSettings};

use crate::backend::CaptureBackend;
use crate::cancel::CancelToken;
use crate::convert::{self, ConvertError};
use crate::recorder::Recorder;

pub const DEFAULT_CODEC: &str = "mpeg4";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub fps: u32,
    /// Stop once this much wall time has passed.
    pub duration: Option<Duration>,
    /// Stop once this many frames have been written.
    pub max_frames: Option<u64>,
    /// Print a progress line every N frames; 0 disables it.
    pub progress_every: u64,
    pub codec: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            fps: 15,
            duration: None,
            max_frames: None,
            progress_every: 30,
            codec: DEFAULT_CODEC.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    DurationElapsed,
    FrameLimit,
    Cancelled,
    BackendFailed(String),
}

#[derive(Debug, Clone)]
pub struct RecordingSummary {
    pub path: PathBuf,
    pub frames: u64,
    pub elapsed: Duration,
    pub bytes: u64,
    pub stop_reason: StopReason,
}

impl RecordingSummary {
    pub fn size_mb(&self) -> f64 {
        self.bytes as f64 / (1024.0 * 1024.0)
    }

    pub fn effective_fps(&self) -> f64 {
        match self.elapsed.as_secs_f64() {
            s if s > 0.0 => self.frames as f64 / s,
            _ => 0.0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Invalid capture region: {0}")]
    InvalidRegion(#[from] RegionError),

    #[error("Frame rate must be positive")]
    InvalidFps,

    #[error("Output stream failed: {0}")]
    Output(#[from] OutputError),

    #[error("Captured frame could not be converted: {0}")]
    Convert(#[from] ConvertError),
}

/// One recording of one region into one file.
pub struct RegionRecorder<B> {
    region: Region,
    settings: SessionSettings,
    target: OutputTarget,
    backend: B,
    progress_out: Box<dyn Write>,
}

impl<B: CaptureBackend> RegionRecorder<B> {
    /// Validates everything that can be checked without touching the screen
    /// or the filesystem.
    pub fn new(
        region: Region,
        settings: SessionSettings,
        target: OutputTarget,
        backend: B,
    ) -> Result<Self, RecordError> {
        region.validate()?;
        if settings.fps == 0 {
            return Err(RecordError::InvalidFps);
        }
        Ok(Self {
            region,
            settings,
            target,
            backend,
            progress_out: Box::new(io::stdout()),
        })
    }

    /// Sends the `\r` progress line somewhere other than stdout.
    pub fn with_progress_output(mut self, out: impl Write + 'static) -> Self {
        self.progress_out = Box::new(out);
        self
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.settings.fps))
    }

    fn stream_settings(&self) -> StreamSettings {
        StreamSettings {
            width: self.region.width,
            height: self.region.height,
            fps: self.settings.fps,
            codec: self.settings.codec.clone(),
        }
    }

    async fn run_loop(
        &mut self,
        stream: &mut OutputStream,
        cancel: &CancelToken,
    ) -> Result<(u64, StopReason, Duration), RecordError> {
        let interval = self.frame_interval();
        let start = Instant::now();
        let mut frames = 0u64;
        let mut progress_shown = false;

        let reason = loop {
            if cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            if let Some(limit) = self.settings.duration {
                if start.elapsed() >= limit {
                    break StopReason::DurationElapsed;
                }
            }

            let tick = Instant::now();
            let raw = match self.backend.capture(&self.region) {
                Ok(frame) => frame,
                Err(e) => {
                    error!("[recorder] capture failed after {} frames: {}", frames, e);
                    break StopReason::BackendFailed(e.to_string());
                }
            };
            let frame = convert::to_bgr24(&raw)?;
            stream.append(&frame)?;
            frames += 1;

            if self.settings.progress_every > 0 && frames % self.settings.progress_every == 0 {
                self.report_progress(frames, start.elapsed());
                progress_shown = true;
            }

            if let Some(max) = self.settings.max_frames {
                if frames >= max {
                    break StopReason::FrameLimit;
                }
            }

            // Compensate for time already spent this tick; no catch-up when behind.
            let remaining = interval.saturating_sub(tick.elapsed());
            if remaining.is_zero() {
                // Behind schedule; still let the interrupt handler run.
                tokio::task::yield_now().await;
            } else {
                tokio::select! {
                    _ = tokio::time::sleep(remaining) => {}
                    _ = cancel.cancelled() => {}
                }
            }
        };

        if progress_shown {
            let _ = writeln!(self.progress_out);
        }
        Ok((frames, reason, start.elapsed()))
    }

    fn report_progress(&mut self, frames: u64, elapsed: Duration) {
        let line = match self.settings.duration {
            Some(limit) => format!(
                "\rRecording: {}s elapsed, {}s remaining | Frames: {}",
                elapsed.as_secs(),
                limit.saturating_sub(elapsed).as_secs(),
                frames
            ),
            None => format!("\rRecording: {}s | Frames: {}", elapsed.as_secs(), frames),
        };
        let _ = self.progress_out.write_all(line.as_bytes());
        let _ = self.progress_out.flush();
    }
}

#[async_trait(?Send)]
impl<B: CaptureBackend> Recorder for RegionRecorder<B> {
    async fn record(&mut self, cancel: CancelToken) -> Result<RecordingSummary, RecordError> {
        let path = self.target.prepare()?;
        let mut stream = OutputStream::create(&path, &self.stream_settings())?;
        info!(
            "[recorder] recording {} @ {}fps -> {}",
            self.region,
            self.settings.fps,
            path.display()
        );

        // An Err here drops `stream`, which finalizes the file.
        let (frames, stop_reason, elapsed) = self.run_loop(&mut stream, &cancel).await?;
        let written = stream.finish()?;
        if written != frames {
            warn!(
                "[recorder] loop counted {} frames but stream wrote {}",
                frames, written
            );
        }

        let bytes = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        info!(
            "[recorder] stopped ({:?}) after {} frames in {:.2}s",
            stop_reason,
            frames,
            elapsed.as_secs_f32()
        );
        Ok(RecordingSummary {
            path,
            frames,
            elapsed,
            bytes,
            stop_reason,
        })
    }

    fn region(&self) -> Region {
        self.region
    }
}
