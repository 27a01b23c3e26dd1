use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use common::Region;
use log::warn;

use super::{ManualEntry, RegionSource};
use crate::pointer::PointerSource;
use crate::preview::Previewer;
use crate::prompt::Prompter;

pub const SCREEN_SNAPSHOT: &str = "temp_screen.png";
pub const REGION_PREVIEW: &str = "region_preview.png";

/// Operator hovers two opposite corners and presses Enter at each. Any
/// failure other than a closed input drops back to manual entry.
pub struct TwoPointPick<P> {
    pointer: P,
    previewer: Option<Box<dyn Previewer>>,
    screen_snapshot: PathBuf,
    region_preview: PathBuf,
    fallback: ManualEntry,
}

impl<P: PointerSource> TwoPointPick<P> {
    pub fn new(pointer: P, previewer: Option<Box<dyn Previewer>>, snapshot_dir: &Path) -> Self {
        Self {
            pointer,
            previewer,
            screen_snapshot: snapshot_dir.join(SCREEN_SNAPSHOT),
            region_preview: snapshot_dir.join(REGION_PREVIEW),
            fallback: ManualEntry::default(),
        }
    }

    fn pick(&mut self, prompter: &mut Prompter<'_>) -> Result<Option<Region>> {
        prompter.say("Region selection")?;
        prompter.say("1. Make sure the call window is visible on screen")?;
        prompter.say("2. Hover each corner of the area to record and press Enter")?;
        prompter.pause("Press Enter to start region selection...")?;

        if let Some(previewer) = &self.previewer {
            previewer.save_screen(&self.screen_snapshot)?;
            prompter.say(format!(
                "Full-screen snapshot saved as {}",
                self.screen_snapshot.display()
            ))?;
        }

        prompter.say("Move your mouse to the TOP-LEFT corner and press Enter")?;
        prompter.pause("Ready for top-left...")?;
        let top_left = self
            .pointer
            .position()
            .ok_or_else(|| anyhow!("pointer position unavailable"))?;
        prompter.say(format!("Top-left: {top_left}"))?;

        prompter.say("Move your mouse to the BOTTOM-RIGHT corner and press Enter")?;
        prompter.pause("Ready for bottom-right...")?;
        let bottom_right = self
            .pointer
            .position()
            .ok_or_else(|| anyhow!("pointer position unavailable"))?;
        prompter.say(format!("Bottom-right: {bottom_right}"))?;

        let region = Region::from_corners(top_left, bottom_right);
        prompter.say(format!("Selected region: {region}"))?;

        if let Some(previewer) = &self.previewer {
            previewer.save_region(&region, &self.region_preview)?;
            prompter.say(format!(
                "Preview saved as {} - check that it looks right",
                self.region_preview.display()
            ))?;
        }

        if prompter.confirm("Record this area? (y/n): ")? {
            Ok(Some(region))
        } else {
            prompter.say("Selection cancelled.")?;
            Ok(None)
        }
    }
}

impl<P: PointerSource> RegionSource for TwoPointPick<P> {
    fn name(&self) -> &'static str {
        "interactive"
    }

    fn acquire(&mut self, prompter: &mut Prompter<'_>) -> Result<Option<Region>> {
        match self.pick(prompter) {
            Ok(picked) => Ok(picked),
            Err(e) if is_closed_input(&e) => Err(e),
            Err(e) => {
                warn!("[select] interactive selection failed: {e:#}");
                prompter.say(format!("Error during region selection: {e}"))?;
                self.fallback.acquire(prompter)
            }
        }
    }
}

fn is_closed_input(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::UnexpectedEof)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Point;
    use std::cell::{Cell, RefCell};
    use std::io::Cursor;
    use std::rc::Rc;

    /// Yields the scripted positions in order, one per call.
    struct ScriptedPointer {
        positions: Vec<Option<Point>>,
        next: Cell<usize>,
    }

    impl ScriptedPointer {
        fn new(positions: Vec<Option<Point>>) -> Self {
            Self {
                positions,
                next: Cell::new(0),
            }
        }
    }

    impl PointerSource for ScriptedPointer {
        fn position(&self) -> Option<Point> {
            let i = self.next.get();
            self.next.set(i + 1);
            self.positions.get(i).copied().flatten()
        }
    }

    #[derive(Default)]
    struct RecordingPreviewer {
        saved: Rc<RefCell<Vec<(Option<Region>, PathBuf)>>>,
    }

    impl Previewer for RecordingPreviewer {
        fn save_screen(&self, path: &Path) -> Result<()> {
            self.saved.borrow_mut().push((None, path.to_path_buf()));
            Ok(())
        }

        fn save_region(&self, region: &Region, path: &Path) -> Result<()> {
            self.saved.borrow_mut().push((Some(*region), path.to_path_buf()));
            Ok(())
        }
    }

    fn run(pick: &mut TwoPointPick<ScriptedPointer>, input: &str) -> Option<Region> {
        let mut out = Vec::new();
        let mut p = Prompter::new(Cursor::new(input.to_string()), &mut out);
        pick.acquire(&mut p).unwrap()
    }

    #[test]
    fn corners_are_normalized_and_previewed() {
        let previewer = RecordingPreviewer::default();
        let saved = Rc::clone(&previewer.saved);
        let pointer = ScriptedPointer::new(vec![
            Some(Point::new(100, 500)),
            Some(Point::new(400, 300)),
        ]);
        let mut pick = TwoPointPick::new(pointer, Some(Box::new(previewer)), Path::new("snaps"));

        let region = run(&mut pick, "\n\n\ny\n");

        assert_eq!(region, Some(Region::new(100, 300, 300, 200)));
        let saved = saved.borrow();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0], (None, PathBuf::from("snaps/temp_screen.png")));
        assert_eq!(
            saved[1],
            (
                Some(Region::new(100, 300, 300, 200)),
                PathBuf::from("snaps/region_preview.png")
            )
        );
    }

    #[test]
    fn declining_the_preview_cancels() {
        let pointer = ScriptedPointer::new(vec![Some(Point::new(0, 0)), Some(Point::new(50, 50))]);
        let mut pick = TwoPointPick::new(pointer, None, Path::new("."));
        assert_eq!(run(&mut pick, "\n\n\nn\n"), None);
    }

    #[test]
    fn missing_pointer_falls_back_to_manual_entry() {
        let pointer = ScriptedPointer::new(vec![None]);
        let mut pick = TwoPointPick::new(pointer, None, Path::new("."));
        // Enter, top-left Enter, then four manual answers.
        let region = run(&mut pick, "\n\n10\n20\n300\n200\n");
        assert_eq!(region, Some(Region::new(10, 20, 300, 200)));
    }

    #[test]
    fn closed_input_is_not_swallowed() {
        let pointer = ScriptedPointer::new(vec![]);
        let mut pick = TwoPointPick::new(pointer, None, Path::new("."));
        let mut out = Vec::new();
        let mut p = Prompter::new(Cursor::new(String::new()), &mut out);
        assert!(pick.acquire(&mut p).is_err());
    }
}
