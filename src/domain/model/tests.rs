// Unit tests for domain models

use super::*;

const PRESETS: &[u32] = &[25, 50, 100];

#[test]
fn test_media_probe_fallback_audio() {
    let probe = MediaProbe::new(90.5, None, DEFAULT_AUDIO_BITRATE_BPS);
    assert_eq!(probe.audio_bitrate_bps, 128_000);
    assert!(!probe.audio_bitrate_detected);
    assert!(probe.has_duration());

    let probe = MediaProbe::new(0.0, Some(192_000), DEFAULT_AUDIO_BITRATE_BPS);
    assert_eq!(probe.audio_bitrate_bps, 192_000);
    assert!(probe.audio_bitrate_detected);
    assert!(!probe.has_duration());
}

#[test]
fn test_plan_feasibility() {
    let plan = CompressionPlan {
        target_size_bytes: 1_000_000.0,
        video_bitrate_bps: -5_000.0,
        audio_bitrate_bps: 128_000,
    };
    assert!(!plan.is_feasible(0.0));

    let plan = CompressionPlan {
        video_bitrate_bps: 50_000.0,
        ..plan
    };
    assert!(plan.is_feasible(1.0));
    assert!(!plan.is_feasible(100_000.0));
    assert_eq!(plan.total_bitrate_bps(), 178_000.0);
}

#[test]
fn test_video_bitrate_arg_is_integral() {
    let plan = CompressionPlan {
        target_size_bytes: 0.0,
        video_bitrate_bps: 1_612_794.88,
        audio_bitrate_bps: 128_000,
    };
    assert_eq!(plan.video_bitrate_arg(), "1612795");
}

#[test]
fn test_progress_sample_clamps() {
    assert_eq!(ProgressSample::new(45.0, 90.0).fraction_complete, 0.5);
    assert_eq!(ProgressSample::new(120.0, 90.0).fraction_complete, 1.0);
    assert_eq!(ProgressSample::new(10.0, 0.0).fraction_complete, 0.0);
    assert_eq!(ProgressSample::new(45.0, 90.0).message, "Processing... 50.00%");
}

#[test]
fn test_target_size_parsing() {
    assert_eq!(TargetSize::parse("25", PRESETS).unwrap(), TargetSize::Preset(25));
    assert_eq!(TargetSize::parse(" 100 ", PRESETS).unwrap(), TargetSize::Preset(100));
    assert_eq!(TargetSize::parse("8", PRESETS).unwrap(), TargetSize::Custom(8.0));
    assert_eq!(TargetSize::parse("24.5", PRESETS).unwrap(), TargetSize::Custom(24.5));

    assert!(TargetSize::parse("0", PRESETS).is_err());
    assert!(TargetSize::parse("-3", PRESETS).is_err());
    assert!(TargetSize::parse("big", PRESETS).is_err());
    assert!(TargetSize::parse("inf", PRESETS).is_err());
}

#[test]
fn test_pass_spec_command_line() {
    let spec = PassSpec::new(
        "ffmpeg",
        vec!["-i".to_string(), "my clip.mov".to_string(), "out.mp4".to_string()],
    );
    assert_eq!(spec.command_line(), "ffmpeg -i \"my clip.mov\" out.mp4");
    assert!(!spec.captures_progress);
    assert!(spec.clone().with_progress().captures_progress);
}

#[test]
fn test_pass_result_success() {
    assert!(PassResult::from_exit_code(0).succeeded);
    let failed = PassResult::from_exit_code(1);
    assert!(!failed.succeeded);
    assert_eq!(failed.exit_code, 1);
}

#[test]
fn test_job_state_terminal() {
    assert!(JobState::Succeeded.is_terminal());
    assert!(JobState::Cancelled.is_terminal());
    assert!(!JobState::Pass2Running.is_terminal());
    assert_eq!(JobState::Pass1Running.to_string(), "pass 1");
}
