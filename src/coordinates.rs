//! Live pointer read-out for finding region corners by hand.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use common::Point;

use crate::pointer::PointerSource;

const REFRESH: Duration = Duration::from_millis(100);

pub fn format_position(point: Option<Point>) -> String {
    match point {
        Some(p) => format!("X: {}, Y: {}", p.x, p.y),
        None => "move the mouse...".to_string(),
    }
}

pub async fn run(pointer: &impl PointerSource) -> Result<()> {
    println!("Mouse position tracker");
    println!("Move the mouse to the corners of the call window and note the coordinates");
    println!("Press Ctrl+C to exit");

    let mut ticker = tokio::time::interval(REFRESH);
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let mut stdout = io::stdout();
                write!(stdout, "\r{:<32}", format_position(pointer.position()))?;
                stdout.flush()?;
            }
            result = &mut interrupted => {
                result?;
                println!("\nDone!");
                return Ok(());
            }
        }
    }
}
