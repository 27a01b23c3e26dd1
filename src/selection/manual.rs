use anyhow::Result;
use common::Region;

use super::RegionSource;
use crate::prompt::Prompter;

pub const DEFAULT_MANUAL_REGION: Region = Region {
    left: 100,
    top: 100,
    width: 1280,
    height: 720,
};

/// Typed coordinates. An empty answer keeps that field's default; any
/// unparsable answer abandons the entry and uses the whole default region.
pub struct ManualEntry {
    defaults: Region,
}

impl ManualEntry {
    pub fn new(defaults: Region) -> Self {
        Self { defaults }
    }

    fn read_fields(&self, prompter: &mut Prompter<'_>) -> Result<Option<Region>> {
        let d = self.defaults;
        let Some(left) = prompter.ask_parsed("Left coordinate: ", d.left)? else {
            return Ok(None);
        };
        let Some(top) = prompter.ask_parsed("Top coordinate: ", d.top)? else {
            return Ok(None);
        };
        let Some(width) = prompter.ask_parsed("Width: ", d.width)? else {
            return Ok(None);
        };
        let Some(height) = prompter.ask_parsed("Height: ", d.height)? else {
            return Ok(None);
        };
        Ok(Some(Region::new(left, top, width, height)))
    }
}

impl Default for ManualEntry {
    fn default() -> Self {
        Self::new(DEFAULT_MANUAL_REGION)
    }
}

impl RegionSource for ManualEntry {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn acquire(&mut self, prompter: &mut Prompter<'_>) -> Result<Option<Region>> {
        let d = self.defaults;
        prompter.say("Manual region input")?;
        prompter.say(format!(
            "Defaults: Left: {}, Top: {}, Width: {}, Height: {}",
            d.left, d.top, d.width, d.height
        ))?;

        match self.read_fields(prompter)? {
            Some(region) => Ok(Some(region)),
            None => {
                prompter.say("Invalid input. Using default region.")?;
                Ok(Some(d))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn enter(input: &str) -> Option<Region> {
        let mut out = Vec::new();
        let mut p = Prompter::new(Cursor::new(input.to_string()), &mut out);
        ManualEntry::default().acquire(&mut p).unwrap()
    }

    #[test]
    fn typed_values_are_used() {
        assert_eq!(enter("-1920\n40\n800\n600\n"), Some(Region::new(-1920, 40, 800, 600)));
    }

    #[test]
    fn blank_answers_keep_field_defaults() {
        assert_eq!(enter("\n\n640\n\n"), Some(Region::new(100, 100, 640, 720)));
    }

    #[test]
    fn garbage_falls_back_to_whole_default_region() {
        // Entry stops at the bad width; height is never asked for.
        assert_eq!(enter("5\n6\nwide\n"), Some(DEFAULT_MANUAL_REGION));
        assert_eq!(enter("5\n6\n-3\n"), Some(DEFAULT_MANUAL_REGION));
    }
}
