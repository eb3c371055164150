//! Encoder argument sets for the two passes

use std::path::{Path, PathBuf};

use crate::config::{EncoderConfig, FirstPassAudio};
use crate::domain::model::{CompressionPlan, PassSpec};

/// Machine-readable progress goes to the diagnostic channel
pub const PROGRESS_CHANNEL: &str = "pipe:2";

/// Builds `PassSpec`s from the encoder configuration and a plan
pub struct PassBuilder<'a> {
    encoder: &'a EncoderConfig,
}

impl<'a> PassBuilder<'a> {
    pub fn new(encoder: &'a EncoderConfig) -> Self {
        Self { encoder }
    }

    /// Analysis pass: statistics only, media goes to the null sink
    pub fn first_pass(&self, input: &Path, plan: &CompressionPlan, working_dir: Option<PathBuf>) -> PassSpec {
        let mut args = vec!["-y".to_string(), "-i".to_string(), path_arg(input)];
        self.push_video(&mut args, plan);

        match self.encoder.first_pass_audio {
            FirstPassAudio::Disabled => args.push("-an".to_string()),
            FirstPassAudio::Bitrate => {
                args.push("-b:a".to_string());
                args.push(plan.audio_bitrate_bps.to_string());
            }
        }

        if self.encoder.constant_frame_rate {
            args.extend(["-vsync".to_string(), "cfr".to_string()]);
        }

        args.extend(["-pass".to_string(), "1".to_string()]);

        if self.encoder.first_pass_report {
            args.push("-report".to_string());
        }

        args.extend([
            "-f".to_string(),
            self.encoder.null_format.clone(),
            self.encoder.null_target.clone(),
        ]);

        PassSpec::new(self.encoder.executable.clone(), args).in_dir(working_dir)
    }

    /// Encode pass: writes the output and reports progress
    pub fn second_pass(
        &self,
        input: &Path,
        output: &Path,
        plan: &CompressionPlan,
        overwrite: bool,
        working_dir: Option<PathBuf>,
    ) -> PassSpec {
        let mut args = Vec::new();
        if overwrite {
            args.push("-y".to_string());
        }
        args.extend(["-i".to_string(), path_arg(input)]);
        self.push_video(&mut args, plan);

        if let Some(codec) = &self.encoder.audio_codec {
            args.extend(["-c:a".to_string(), codec.clone()]);
        }
        args.extend([
            "-b:a".to_string(),
            plan.audio_bitrate_bps.to_string(),
            "-pass".to_string(),
            "2".to_string(),
            "-progress".to_string(),
            PROGRESS_CHANNEL.to_string(),
            path_arg(output),
        ]);

        PassSpec::new(self.encoder.executable.clone(), args)
            .in_dir(working_dir)
            .with_progress()
    }

    fn push_video(&self, args: &mut Vec<String>, plan: &CompressionPlan) {
        if let Some(codec) = &self.encoder.video_codec {
            args.extend(["-c:v".to_string(), codec.clone()]);
        }
        args.extend(["-b:v".to_string(), plan.video_bitrate_arg()]);
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
