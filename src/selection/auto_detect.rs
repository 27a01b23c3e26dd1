//! Best-effort call window detection from a `wmctrl -lG` listing.
//!
//! Only window titles are matched; nothing looks at window contents.

use std::io;
use std::process::Command;

use anyhow::Result;
use common::Region;
use log::{debug, warn};

use super::{ManualEntry, RegionSource};
use crate::prompt::Prompter;

const MAX_LISTED: usize = 3;

pub trait WindowLister {
    /// Raw window-list dump, one window per line.
    fn list(&self) -> io::Result<String>;
}

pub struct WmctrlLister;

impl WindowLister for WmctrlLister {
    fn list(&self) -> io::Result<String> {
        let output = Command::new("wmctrl").arg("-lG").output()?;
        if !output.status.success() {
            debug!("[select] wmctrl exited with {}", output.status);
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

pub fn rdev_display_size() -> Option<(u32, u32)> {
    match rdev::display_size() {
        Ok((w, h)) => Some((w as u32, h as u32)),
        Err(e) => {
            warn!("[select] could not read display size: {:?}", e);
            None
        }
    }
}

/// One line of `wmctrl -lG`: `id desktop x y w h host title...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowEntry {
    pub line: String,
    pub geometry: Option<Region>,
}

impl WindowEntry {
    pub fn parse(line: &str) -> Self {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let geometry = (fields.len() >= 6)
            .then(|| {
                Some(Region::new(
                    fields[2].parse().ok()?,
                    fields[3].parse().ok()?,
                    fields[4].parse().ok()?,
                    fields[5].parse().ok()?,
                ))
            })
            .flatten()
            .filter(|r| r.validate().is_ok());
        Self {
            line: line.trim().to_string(),
            geometry,
        }
    }
}

pub fn matching_windows(listing: &str, keywords: &[String]) -> Vec<WindowEntry> {
    listing
        .lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            keywords.iter().any(|k| lower.contains(&k.to_lowercase()))
        })
        .map(WindowEntry::parse)
        .collect()
}

/// 80% x 70% of the display, offset 10% from the top-left.
pub fn centered_region(display: (u32, u32)) -> Region {
    let (w, h) = (f64::from(display.0), f64::from(display.1));
    Region::new(
        (w * 0.1) as i32,
        (h * 0.1) as i32,
        (w * 0.8) as u32,
        (h * 0.7) as u32,
    )
}

pub struct AutoDetect {
    lister: Box<dyn WindowLister>,
    keywords: Vec<String>,
    display_size: fn() -> Option<(u32, u32)>,
    fallback: ManualEntry,
}

impl AutoDetect {
    pub fn new(
        lister: Box<dyn WindowLister>,
        keywords: Vec<String>,
        display_size: fn() -> Option<(u32, u32)>,
    ) -> Self {
        Self {
            lister,
            keywords,
            display_size,
            fallback: ManualEntry::default(),
        }
    }

    fn detect(&self, prompter: &mut Prompter<'_>) -> Result<Option<Region>> {
        prompter.say("Attempting to auto-detect the call window...")?;
        let listing = match self.lister.list() {
            Ok(listing) => listing,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                prompter.say("wmctrl not available for auto-detection")?;
                return Ok(None);
            }
            Err(e) => {
                prompter.say(format!("Window listing failed: {e}"))?;
                return Ok(None);
            }
        };

        let found = matching_windows(&listing, &self.keywords);
        let Some(first) = found.first() else {
            prompter.say("Could not auto-detect the call window")?;
            return Ok(None);
        };

        prompter.say("Possible call windows found:")?;
        for (i, window) in found.iter().take(MAX_LISTED).enumerate() {
            prompter.say(format!("  {i}: {}", window.line))?;
        }

        if let Some(region) = first.geometry {
            prompter.say(format!("Using window geometry: {region}"))?;
            return Ok(Some(region));
        }
        match (self.display_size)() {
            Some(display) => {
                let region = centered_region(display);
                prompter.say(format!("Using centered region: {region}"))?;
                Ok(Some(region))
            }
            None => Ok(None),
        }
    }
}

impl RegionSource for AutoDetect {
    fn name(&self) -> &'static str {
        "auto-detect"
    }

    fn acquire(&mut self, prompter: &mut Prompter<'_>) -> Result<Option<Region>> {
        match self.detect(prompter)? {
            Some(region) => Ok(Some(region)),
            None => {
                prompter.say("Falling back to manual selection...")?;
                self.fallback.acquire(prompter)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const LISTING: &str = "\
0x01a00003  0 0    0    1920 27   box xfce4-panel
0x03e00007  0 1930 120  1280 720  box Meeting with team - Google Chat - Chromium
0x04200004  0 10   40   900  600  box Terminal
";

    struct FakeLister(io::Result<String>);

    impl WindowLister for FakeLister {
        fn list(&self) -> io::Result<String> {
            match &self.0 {
                Ok(s) => Ok(s.clone()),
                Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
            }
        }
    }

    fn keywords() -> Vec<String> {
        super::super::DEFAULT_TITLE_KEYWORDS
            .iter()
            .map(|k| k.to_string())
            .collect()
    }

    fn full_hd() -> Option<(u32, u32)> {
        Some((1920, 1080))
    }

    fn no_display() -> Option<(u32, u32)> {
        None
    }

    fn acquire(lister: FakeLister, display: fn() -> Option<(u32, u32)>, input: &str) -> Option<Region> {
        let mut out = Vec::new();
        let mut p = Prompter::new(Cursor::new(input.to_string()), &mut out);
        AutoDetect::new(Box::new(lister), keywords(), display)
            .acquire(&mut p)
            .unwrap()
    }

    #[test]
    fn matching_is_case_insensitive_on_the_whole_line() {
        let found = matching_windows(LISTING, &keywords());
        assert_eq!(found.len(), 1);
        assert!(found[0].line.contains("Google Chat"));
        assert_eq!(found[0].geometry, Some(Region::new(1930, 120, 1280, 720)));
    }

    #[test]
    fn plain_wmctrl_lines_have_no_geometry() {
        let entry = WindowEntry::parse("0x03e00007  0 box Google Meet");
        assert_eq!(entry.geometry, None);
    }

    #[test]
    fn centered_region_is_eighty_by_seventy_percent() {
        assert_eq!(centered_region((1920, 1080)), Region::new(192, 108, 1536, 756));
    }

    #[test]
    fn uses_geometry_of_first_match() {
        let region = acquire(FakeLister(Ok(LISTING.to_string())), full_hd, "");
        assert_eq!(region, Some(Region::new(1930, 120, 1280, 720)));
    }

    #[test]
    fn match_without_geometry_uses_centered_region() {
        let listing = "0x0 0 box Chrome".to_string();
        let region = acquire(FakeLister(Ok(listing)), full_hd, "");
        assert_eq!(region, Some(Region::new(192, 108, 1536, 756)));
    }

    #[test]
    fn no_match_falls_back_to_manual() {
        let listing = "0x0 0 0 0 800 600 box Terminal".to_string();
        let region = acquire(FakeLister(Ok(listing)), full_hd, "1\n2\n3\n4\n");
        assert_eq!(region, Some(Region::new(1, 2, 3, 4)));
    }

    #[test]
    fn missing_tool_falls_back_to_manual() {
        let missing = FakeLister(Err(io::Error::new(io::ErrorKind::NotFound, "wmctrl")));
        let region = acquire(missing, no_display, "\n\n\n\n");
        assert_eq!(region, Some(super::super::manual::DEFAULT_MANUAL_REGION));
    }
}
