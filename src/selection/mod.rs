//! Ways of deciding which screen rectangle to record.
//!
//! Every strategy ends in the same place: a [`Region`] handed to the capture
//! loop, or `None` when the operator backs out.

mod auto_detect;
mod fixed;
mod manual;
mod monitor;
mod two_point;

pub use auto_detect::{AutoDetect, WmctrlLister};
pub use fixed::FixedRegion;
pub use manual::ManualEntry;
pub use monitor::WholeMonitor;
pub use two_point::TwoPointPick;

use std::path::PathBuf;

use anyhow::Result;
use clap::ValueEnum;
use common::Region;
use log::info;

use crate::pointer::RdevPointer;
use crate::preview::XcapPreviewer;
use crate::prompt::Prompter;

pub trait RegionSource {
    fn name(&self) -> &'static str;

    /// `Ok(None)` means the operator cancelled.
    fn acquire(&mut self, prompter: &mut Prompter<'_>) -> Result<Option<Region>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// A constant region given with --region.
    Fixed,
    /// Hover two corners and press Enter at each.
    Interactive,
    /// Type the coordinates.
    Manual,
    /// Match a window title in `wmctrl -lG`, falling back to manual entry.
    Auto,
    /// A whole monitor.
    Monitor,
}

/// Settings shared by the strategies.
#[derive(Debug, Clone)]
pub struct SelectionOptions {
    pub fixed: Region,
    pub wait_for_enter: bool,
    pub snapshot_dir: PathBuf,
    pub title_keywords: Vec<String>,
}

pub const DEFAULT_TITLE_KEYWORDS: [&str; 3] = ["google chat", "meet", "chrome"];

/// Prints the numbered menu. `Ok(None)` means the operator chose to exit.
pub fn menu(prompter: &mut Prompter<'_>) -> Result<Option<SourceKind>> {
    prompter.say("Choose selection method:")?;
    prompter.say("1. Interactive region selection (hover corners)")?;
    prompter.say("2. Manual coordinate input")?;
    prompter.say("3. Auto-detect window (experimental)")?;
    prompter.say("4. Whole monitor")?;
    prompter.say("5. Exit")?;

    let kind = match prompter.ask("Enter choice (1-5): ")?.as_str() {
        "1" => SourceKind::Interactive,
        "2" => SourceKind::Manual,
        "3" => SourceKind::Auto,
        "4" => SourceKind::Monitor,
        "5" => return Ok(None),
        _ => {
            prompter.say("Invalid choice. Using interactive selection.")?;
            SourceKind::Interactive
        }
    };
    Ok(Some(kind))
}

pub fn build(kind: SourceKind, options: &SelectionOptions) -> Box<dyn RegionSource> {
    match kind {
        SourceKind::Fixed => Box::new(FixedRegion::new(options.fixed, options.wait_for_enter)),
        SourceKind::Interactive => Box::new(TwoPointPick::new(
            RdevPointer::spawn(),
            Some(Box::new(XcapPreviewer)),
            &options.snapshot_dir,
        )),
        SourceKind::Manual => Box::new(ManualEntry::default()),
        SourceKind::Auto => Box::new(AutoDetect::new(
            Box::new(WmctrlLister),
            options.title_keywords.clone(),
            auto_detect::rdev_display_size,
        )),
        SourceKind::Monitor => Box::new(WholeMonitor::new(recorder::list_monitors)),
    }
}

/// Runs the menu (unless a source was preselected) and the chosen strategy.
pub fn choose_region(
    preselected: Option<SourceKind>,
    options: &SelectionOptions,
    prompter: &mut Prompter<'_>,
) -> Result<Option<Region>> {
    let kind = match preselected {
        Some(kind) => kind,
        None => match menu(prompter)? {
            Some(kind) => kind,
            None => return Ok(None),
        },
    };
    let mut source = build(kind, options);
    info!("[select] using {} selection", source.name());
    source.acquire(prompter)
}
