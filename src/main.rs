mod config;
mod coordinates;
mod pointer;
mod preview;
mod prompt;
mod selection;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use recorder::{
    CancelToken, RecordError, Recorder, RecordingSummary, RegionRecorder, StopReason, XcapBackend,
};

use crate::config::Cli;
use crate::pointer::RdevPointer;
use crate::prompt::Prompter;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    // Capture, convert and encode all run on this one thread.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    if cli.find_coordinates {
        let pointer = RdevPointer::spawn();
        return runtime.block_on(coordinates::run(&pointer));
    }

    let mut prompter = Prompter::stdio();
    prompter.say("REGION RECORDER")?;
    prompter.say("=".repeat(50))?;

    let options = cli.selection_options();
    let Some(region) = selection::choose_region(cli.source, &options, &mut prompter)? else {
        prompter.say("No region selected. Exiting.")?;
        return Ok(());
    };

    let config = cli.recording_config(&mut prompter)?;
    info!("[recorder] config: {:?}", config);
    let mut recorder = RegionRecorder::new(region, config.session, config.target, XcapBackend::new())
        .context("cannot start recording")?;

    prompter.say(format!(
        "Recording region {} at {}fps. Press Ctrl+C to stop",
        recorder.region(),
        recorder.settings().fps
    ))?;
    let summary = runtime.block_on(record_until_interrupted(&mut recorder))?;
    print_summary(&summary);
    Ok(())
}

async fn record_until_interrupted(
    recorder: &mut impl Recorder,
) -> Result<RecordingSummary, RecordError> {
    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("[recorder] interrupt received, stopping");
                on_interrupt.cancel();
            }
            Err(e) => warn!("[recorder] cannot listen for Ctrl+C: {}", e),
        }
    });
    // ctrl_c() hooks SIGINT on its first poll; let the task get that far
    // before the first frame, or an early Ctrl+C kills the process.
    tokio::task::yield_now().await;
    recorder.record(cancel).await
}

fn print_summary(summary: &RecordingSummary) {
    match &summary.stop_reason {
        StopReason::Cancelled => println!("Recording stopped by user"),
        StopReason::DurationElapsed => println!("Recording completed"),
        StopReason::FrameLimit => println!("Frame limit reached"),
        StopReason::BackendFailed(reason) => println!("Capture failed, recording stopped: {reason}"),
    }
    println!(
        "Stats: {} frames in {:.1}s ({:.1} fps), {:.1} MB",
        summary.frames,
        summary.elapsed.as_secs_f64(),
        summary.effective_fps(),
        summary.size_mb()
    );
    println!("Saved as: {}", summary.path.display());
}
