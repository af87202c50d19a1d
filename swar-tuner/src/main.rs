//! # Swar Tuner - command-line driver
//!
//! Captures audio (raw PCM on stdin, or the default input device with the
//! `live` feature), pushes fixed-size frames through the swar pipeline and
//! prints one result per frame.
//!
//! ## Architecture
//! - **Source thread**: stdin reader or CPAL callback, slicing samples into frames
//! - **Main thread**: owns the pipeline and runs one tick per received frame
//! - **Communication**: crossbeam channel carrying `Vec<f32>` frames

mod audio;
mod cli;
mod config;
mod render;

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossbeam_channel::Receiver;
use std::io::{self, Write};
use swar_core::TunerPipeline;

use cli::{Cli, SourceArg};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    if cli.frame_size == 0 {
        bail!("--frame-size must be at least 1");
    }

    let config = config::resolve_config(&cli)?;
    let mut pipeline = TunerPipeline::new(&config).context("Failed to build pipeline")?;

    let (frame_tx, frame_rx) = crossbeam_channel::bounded::<Vec<f32>>(8);

    match cli.source {
        SourceArg::Stdin => {
            log::info!(
                "[MAIN] Reading f32le PCM from stdin at {} Hz, {} samples per frame",
                cli.sample_rate,
                cli.frame_size
            );
            // Not joined: the reader may be blocked on stdin when output closes.
            let _reader = audio::spawn_reader(io::stdin(), cli.frame_size, frame_tx);
            run(&mut pipeline, &frame_rx, cli.sample_rate, cli.json)?;
        }
        SourceArg::Live => run_live(&mut pipeline, &cli, frame_tx, &frame_rx)?,
    }

    Ok(())
}

#[cfg(feature = "live")]
fn run_live(
    pipeline: &mut TunerPipeline,
    cli: &Cli,
    frame_tx: crossbeam_channel::Sender<Vec<f32>>,
    frame_rx: &Receiver<Vec<f32>>,
) -> Result<()> {
    use cpal::traits::StreamTrait;

    let (stream, sample_rate) = audio::live::start_audio_capture(cli.frame_size, frame_tx)
        .context("Failed to start audio capture")?;
    log::info!("[MAIN] Audio capture started, press Ctrl-C to quit");

    let result = run(pipeline, frame_rx, sample_rate, cli.json);

    if let Err(e) = stream.pause() {
        log::warn!("[MAIN] Error pausing stream: {}", e);
    }
    result
}

#[cfg(not(feature = "live"))]
fn run_live(
    _pipeline: &mut TunerPipeline,
    _cli: &Cli,
    _frame_tx: crossbeam_channel::Sender<Vec<f32>>,
    _frame_rx: &Receiver<Vec<f32>>,
) -> Result<()> {
    bail!("live capture is not compiled in; rebuild with `--features live`")
}

/// Runs one tick per frame until the source closes the channel.
fn run(
    pipeline: &mut TunerPipeline,
    frames: &Receiver<Vec<f32>>,
    sample_rate: u32,
    json: bool,
) -> Result<()> {
    pipeline.start();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut ticks = 0_u64;

    for frame in frames.iter() {
        let output = pipeline.push_frame(&frame, sample_rate);
        ticks += 1;

        let written = if json {
            serde_json::to_writer(&mut out, &output)
                .map_err(io::Error::from)
                .and_then(|_| writeln!(out))
        } else {
            writeln!(out, "{}", render::format_line(&output))
        };

        match written {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                log::debug!("[MAIN] Output closed");
                break;
            }
            Err(e) => return Err(e).context("Failed to write output"),
        }
    }

    pipeline.stop();
    log::info!("[MAIN] Processed {} frames", ticks);
    Ok(())
}
