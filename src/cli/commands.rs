//! Command implementations

use anyhow::{bail, Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::app::{AppContainer, CompressRequest, CompressionReport, DefaultAppContainer, InspectReport};
use crate::cli::args::{CompressArgs, InspectArgs, ProgressArg};
use crate::config::CompressorConfig;
use crate::engine::sink_for;
use crate::error::CompressError;
use crate::output::{default_output_path, CleanupStatus};
use crate::utils::time::format_clock;
use crate::utils::Utils;

/// Execute the compress command
pub async fn compress(args: CompressArgs, config: CompressorConfig, verbose: bool) -> Result<()> {
    let input = args.input_path();
    let target = config.targets.parse_target(&args.target)?;
    let output = args.output.clone().unwrap_or_else(|| default_output_path(&input));

    info!("Input: {}", input.display());
    info!("Output: {}", output.display());
    info!("Target: {}", target);

    if output.exists() && !args.overwrite {
        bail!(
            "Output file already exists: {} (use --overwrite to replace it)",
            output.display()
        );
    }

    let container = DefaultAppContainer::new(config);
    let request = CompressRequest::new(&input, &output, target).overwrite(args.overwrite);
    let sink = sink_for(args.progress.into(), verbose);

    let handle = container.compress_interactor().spawn(request, sink);
    let interrupt = cancel_on_ctrl_c(handle.cancellation_token());
    let result = handle.wait().await;
    interrupt.abort();

    match result {
        Ok(report) => {
            print_report(&report, args.progress);
            Ok(())
        }
        Err(e) => {
            if args.progress == ProgressArg::Json {
                print_json_error(&e);
            }
            Err(e).with_context(|| format!("Failed to compress {}", input.display()))
        }
    }
}

/// Execute the inspect command
pub async fn inspect(args: InspectArgs, config: CompressorConfig) -> Result<()> {
    let input = args.input_path();
    let target = args
        .target
        .as_deref()
        .map(|value| config.targets.parse_target(value))
        .transpose()?;

    let container = DefaultAppContainer::new(config);
    let cancel = CancellationToken::new();
    let interrupt = cancel_on_ctrl_c(cancel.clone());
    let result = container.inspect_interactor().inspect(&input, target, &cancel).await;
    interrupt.abort();

    let report = result.with_context(|| format!("Failed to inspect {}", input.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize inspect report")?;
        println!("{}", json);
    } else {
        print_inspect(&report);
    }

    Ok(())
}

fn cancel_on_ctrl_c(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            token.cancel();
        }
    })
}

fn print_report(report: &CompressionReport, progress: ProgressArg) {
    match progress {
        ProgressArg::Json => {
            let event = serde_json::json!({
                "event": "complete",
                "report": report,
                "timestamp": chrono::Utc::now().to_rfc3339()
            });
            println!("{}", event);
        }
        ProgressArg::Console | ProgressArg::None => {
            println!("Compressed: {}", report.output_path.display());
            println!("  Input size:  {}", Utils::format_file_size(report.input_bytes));
            if let Some(bytes) = report.output_bytes {
                println!("  Output size: {}", Utils::format_file_size(bytes));
            }
            println!("  Video:       {}", Utils::format_bitrate(report.plan.video_bitrate_bps));
            println!("  Audio:       {}", Utils::format_bitrate(report.plan.audio_bitrate_bps as f64));
            println!(
                "  Took:        {}",
                Utils::format_duration(std::time::Duration::from_secs_f64(report.elapsed_seconds))
            );
            if let CleanupStatus::Kept { directory } = &report.cleanup {
                println!("  Pass logs kept in {}", directory.display());
            }
        }
    }
}

fn print_json_error(error: &CompressError) {
    let event = serde_json::json!({
        "event": "error",
        "kind": error.kind(),
        "message": error.to_string(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    });
    println!("{}", event);
}

fn print_inspect(report: &InspectReport) {
    let probe = &report.probe;
    println!("File:     {}", report.input_path.display());
    println!("Size:     {}", Utils::format_file_size(report.input_bytes));
    if probe.has_duration() {
        println!("Duration: {} ({:.2}s)", format_clock(probe.duration_seconds), probe.duration_seconds);
    } else {
        println!("Duration: unknown");
    }
    println!(
        "Audio:    {}{}",
        Utils::format_bitrate(probe.audio_bitrate_bps as f64),
        if probe.audio_bitrate_detected { "" } else { " (assumed)" }
    );

    if let Some(preview) = &report.preview {
        println!();
        println!("Target:   {} -> {:.1} MB", preview.target, preview.effective_mb);
        match &preview.plan {
            Some(plan) => {
                println!("Video:    {}", Utils::format_bitrate(plan.video_bitrate_bps));
                println!("Audio:    {}", Utils::format_bitrate(plan.audio_bitrate_bps as f64));
            }
            None => println!("Plan:     not possible without a duration"),
        }
        if preview.already_under_target {
            println!("Status:   already under target");
        } else if preview.feasible {
            println!("Status:   ready");
        } else {
            println!("Status:   target too small for this duration");
        }
    }
}
