use std::io::Write;
use std::time::{Duration, Instant};

use clap::Args;
use log::warn;
use shotclock_core::{mmss, Config, Phase, PhaseScheduler, TimerConfig, TonePlayer};

/// Poll cadence for the countdown loop. Cues are second-granular, so
/// anything at 200 ms or better is indistinguishable to the user.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Args)]
pub struct RunArgs {
    /// Work phase length in seconds
    #[arg(long)]
    work: Option<u32>,
    /// Rest phase length in seconds (0 skips rest entirely)
    #[arg(long)]
    rest: Option<u32>,
    /// Number of repetitions
    #[arg(long)]
    reps: Option<u32>,
    /// Countdown before the first work phase, in seconds
    #[arg(long)]
    start_delay: Option<u32>,
    /// Disable audio cues
    #[arg(long)]
    mute: bool,
    /// Emit JSON events instead of the status line
    #[arg(long)]
    json: bool,
}

pub async fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let stored = Config::load()?;
    let config = TimerConfig {
        work_secs: args.work.unwrap_or(stored.timer.work_secs),
        rest_secs: args.rest.unwrap_or(stored.timer.rest_secs),
        total_reps: args.reps.unwrap_or(stored.timer.total_reps),
        start_delay_secs: args.start_delay.unwrap_or(stored.timer.start_delay_secs),
    };

    let muted = args.mute || !stored.audio.enabled;
    let player = TonePlayer::new();
    if !muted {
        if let Err(e) = player.start_engine() {
            warn!("audio unavailable, continuing silently: {e}");
        }
        let _ = player.set_volume(stored.audio.volume.min(100) as f32 / 100.0);
    }

    let mut scheduler = PhaseScheduler::new(config, Instant::now());

    if args.json {
        println!(
            "{}",
            serde_json::to_string(&scheduler.snapshot(Instant::now()))?
        );
    }

    let mut interval = tokio::time::interval(TICK_INTERVAL);
    let finished = loop {
        tokio::select! {
            _ = interval.tick() => {
                let outcome = scheduler.tick(Instant::now());

                if let Some(cue) = outcome.cue {
                    if !muted {
                        if let Err(e) = player.play(cue) {
                            warn!("dropped audio cue: {e}");
                        }
                    }
                }

                if args.json {
                    if let Some(event) = &outcome.event {
                        println!("{}", serde_json::to_string(event)?);
                    }
                } else {
                    draw_status(&scheduler, Instant::now());
                }

                if outcome.phase == Phase::Finished {
                    break true;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break false;
            }
        }
    };

    if !args.json {
        println!();
    }

    if !muted {
        if finished {
            // Let the completion beeps drain before tearing the sink down.
            tokio::time::sleep(Duration::from_millis(600)).await;
        }
        let _ = player.stop_engine();
    }

    Ok(())
}

fn draw_status(scheduler: &PhaseScheduler, now: Instant) {
    let snap = scheduler.snapshot(now);
    let bar = progress_bar(snap.progress, 20);
    print!(
        "\r{}Rep {}/{}  {:<9} {:>5}  [{bar}]\x1b[0m\x1b[K",
        ansi_color(snap.phase),
        snap.rep.min(snap.total_reps),
        snap.total_reps,
        snap.label,
        mmss(snap.remaining_secs),
    );
    let _ = std::io::stdout().flush();
}

fn progress_bar(progress: f64, width: usize) -> String {
    let filled = (progress * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
}

fn ansi_color(phase: Phase) -> &'static str {
    match phase.accent() {
        "orange" => "\x1b[33m",
        "green" => "\x1b[32m",
        "red" => "\x1b[31m",
        _ => "\x1b[90m",
    }
}
