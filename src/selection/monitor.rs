use anyhow::{Result, bail};
use common::Region;
use recorder::{CaptureError, MonitorInfo};

use super::RegionSource;
use crate::prompt::Prompter;

type MonitorLister = fn() -> Result<Vec<MonitorInfo>, CaptureError>;

/// Records an entire display. With several monitors the operator picks one;
/// `0`, an empty answer or anything invalid selects the primary.
pub struct WholeMonitor {
    lister: MonitorLister,
}

impl WholeMonitor {
    pub fn new(lister: MonitorLister) -> Self {
        Self { lister }
    }
}

fn primary(monitors: &[MonitorInfo]) -> &MonitorInfo {
    monitors
        .iter()
        .find(|m| m.is_primary)
        .unwrap_or(&monitors[0])
}

impl RegionSource for WholeMonitor {
    fn name(&self) -> &'static str {
        "monitor"
    }

    fn acquire(&mut self, prompter: &mut Prompter<'_>) -> Result<Option<Region>> {
        let monitors = (self.lister)()?;
        if monitors.is_empty() {
            bail!("no monitors found");
        }

        let chosen = if monitors.len() > 1 {
            prompter.say("Multiple monitors detected:")?;
            for (i, m) in monitors.iter().enumerate() {
                let mark = if m.is_primary { " (primary)" } else { "" };
                prompter.say(format!("  {}: {} {}{}", i + 1, m.name, m.bounds, mark))?;
            }
            let reply = prompter.ask("Select monitor (0 for primary, 1+ for a specific one): ")?;
            match reply.parse::<usize>() {
                Ok(n) if (1..=monitors.len()).contains(&n) => &monitors[n - 1],
                _ => primary(&monitors),
            }
        } else {
            &monitors[0]
        };

        prompter.say(format!("Recording area: {}", chosen.bounds))?;
        Ok(Some(chosen.bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn two_monitors() -> Result<Vec<MonitorInfo>, CaptureError> {
        Ok(vec![
            MonitorInfo {
                name: "left".into(),
                bounds: Region::new(-1280, 0, 1280, 1024),
                is_primary: false,
            },
            MonitorInfo {
                name: "main".into(),
                bounds: Region::new(0, 0, 1920, 1080),
                is_primary: true,
            },
        ])
    }

    fn one_monitor() -> Result<Vec<MonitorInfo>, CaptureError> {
        Ok(vec![MonitorInfo {
            name: "only".into(),
            bounds: Region::new(0, 0, 2560, 1440),
            is_primary: true,
        }])
    }

    fn none() -> Result<Vec<MonitorInfo>, CaptureError> {
        Ok(Vec::new())
    }

    fn pick(lister: MonitorLister, input: &str) -> Result<Option<Region>> {
        let mut out = Vec::new();
        let mut p = Prompter::new(Cursor::new(input.to_string()), &mut out);
        WholeMonitor::new(lister).acquire(&mut p)
    }

    #[test]
    fn explicit_choice_is_one_based() {
        assert_eq!(pick(two_monitors, "1\n").unwrap(), Some(Region::new(-1280, 0, 1280, 1024)));
        assert_eq!(pick(two_monitors, "2\n").unwrap(), Some(Region::new(0, 0, 1920, 1080)));
    }

    #[test]
    fn zero_or_invalid_choice_means_primary() {
        for input in ["0\n", "7\n", "left\n", "\n"] {
            assert_eq!(pick(two_monitors, input).unwrap(), Some(Region::new(0, 0, 1920, 1080)));
        }
    }

    #[test]
    fn single_monitor_needs_no_prompt() {
        assert_eq!(pick(one_monitor, "").unwrap(), Some(Region::new(0, 0, 2560, 1440)));
    }

    #[test]
    fn no_monitors_is_an_error() {
        assert!(pick(none, "").is_err());
    }
}
