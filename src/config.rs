use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use common::Region;
use recorder::SessionSettings;
use recorder::session::DEFAULT_CODEC;
use storage::OutputTarget;

use crate::prompt::Prompter;
use crate::selection::{DEFAULT_TITLE_KEYWORDS, SelectionOptions, SourceKind};

pub const DEFAULT_FPS: u32 = 15;

#[derive(Parser, Debug)]
#[command(name = "regionrec", version, about = "Record a screen region to an mp4 file")]
pub struct Cli {
    /// How to choose the region; shows a menu when omitted
    #[arg(long, value_enum)]
    pub source: Option<SourceKind>,

    /// Region for --source fixed
    #[arg(
        long,
        value_name = "LEFT,TOP,WIDTH,HEIGHT",
        default_value = "500,200,900,700",
        allow_hyphen_values = true
    )]
    pub region: Region,

    /// Frames per second; asked for when omitted
    #[arg(long)]
    pub fps: Option<u32>,

    /// Stop after this many minutes (0 = until Ctrl+C); asked for when omitted
    #[arg(long)]
    pub duration_mins: Option<u64>,

    /// Stop after this many frames
    #[arg(long)]
    pub max_frames: Option<u64>,

    /// Write to exactly this file instead of a timestamped one
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value = "recordings")]
    pub output_dir: PathBuf,

    /// File name prefix for timestamped output
    #[arg(long, default_value = "chat_region")]
    pub prefix: String,

    /// ffmpeg encoder name
    #[arg(long, default_value = DEFAULT_CODEC)]
    pub codec: String,

    /// Print progress every N frames (0 = never)
    #[arg(long, default_value_t = 30)]
    pub progress_every: u64,

    /// Where interactive selection writes its snapshot images
    #[arg(long, default_value = ".")]
    pub snapshot_dir: PathBuf,

    /// Extra window-title keywords for --source auto
    #[arg(long = "title-keyword", value_name = "TEXT")]
    pub title_keywords: Vec<String>,

    /// Print the live pointer position until Ctrl+C, then exit
    #[arg(long)]
    pub find_coordinates: bool,

    /// Don't ask: use defaults for anything not given on the command line
    #[arg(long, short)]
    pub yes: bool,
}

/// Everything the recording session needs, resolved up front.
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    pub session: SessionSettings,
    pub target: OutputTarget,
}

impl Cli {
    pub fn selection_options(&self) -> SelectionOptions {
        let mut title_keywords: Vec<String> =
            DEFAULT_TITLE_KEYWORDS.iter().map(|k| k.to_string()).collect();
        title_keywords.extend(self.title_keywords.iter().cloned());
        SelectionOptions {
            fixed: self.region,
            wait_for_enter: !self.yes,
            snapshot_dir: self.snapshot_dir.clone(),
            title_keywords,
        }
    }

    pub fn output_target(&self) -> OutputTarget {
        match &self.output {
            Some(path) => OutputTarget::Fixed(path.clone()),
            None => OutputTarget::timestamped(&self.output_dir, &self.prefix),
        }
    }

    /// Fills in frame rate and duration, asking the operator for whatever the
    /// command line left out.
    pub fn recording_config(&self, prompter: &mut Prompter<'_>) -> io::Result<RecordingConfig> {
        let fps = match self.fps {
            Some(fps) => fps,
            None if self.yes => DEFAULT_FPS,
            None => prompter
                .ask_parsed(&format!("Frame rate (default {DEFAULT_FPS}): "), DEFAULT_FPS)?
                .unwrap_or(DEFAULT_FPS),
        };

        let minutes = match self.duration_mins {
            Some(m) => m,
            None if self.yes || self.max_frames.is_some() => 0,
            None => prompter
                .ask_parsed("Recording duration in minutes (0 = until Ctrl+C, default 0): ", 0u64)?
                .unwrap_or(0),
        };
        // Absurdly long limits saturate rather than wrap.
        let duration = (minutes > 0).then(|| Duration::from_secs(minutes.saturating_mul(60)));

        Ok(RecordingConfig {
            session: SessionSettings {
                fps,
                duration,
                max_frames: self.max_frames,
                progress_every: self.progress_every,
                codec: self.codec.clone(),
            },
            target: self.output_target(),
        })
    }
}
