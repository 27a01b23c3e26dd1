use anyhow::Result;
use common::Region;

use super::RegionSource;
use crate::prompt::Prompter;

pub struct FixedRegion {
    region: Region,
    wait_for_enter: bool,
}

impl FixedRegion {
    pub fn new(region: Region, wait_for_enter: bool) -> Self {
        Self {
            region,
            wait_for_enter,
        }
    }
}

impl RegionSource for FixedRegion {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn acquire(&mut self, prompter: &mut Prompter<'_>) -> Result<Option<Region>> {
        prompter.say(format!("Recording area: {}", self.region))?;
        if self.wait_for_enter {
            prompter.say("Position the call window inside this area before recording.")?;
            prompter.pause("Press Enter when the window is positioned correctly...")?;
        }
        Ok(Some(self.region))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn waits_for_enter_then_returns_constant() {
        let mut out = Vec::new();
        let mut p = Prompter::new(Cursor::new("\n"), &mut out);
        let mut source = FixedRegion::new(Region::new(500, 200, 900, 700), true);
        assert_eq!(source.acquire(&mut p).unwrap(), Some(Region::new(500, 200, 900, 700)));
        drop(p);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("900x700 at (500, 200)"));
    }
}
