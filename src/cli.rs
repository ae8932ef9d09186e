//! Command-line arguments for the `gesture-assist` binary.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Camera index to use
    #[arg(long)]
    pub cam: Option<i32>,

    /// Video file to process instead of the webcam
    #[arg(short, long, conflicts_with = "replay")]
    pub video: Option<PathBuf>,

    /// Replay a recorded landmark stream (JSON lines) instead of the camera
    #[arg(short, long)]
    pub replay: Option<PathBuf>,

    /// Replay as fast as possible, ignoring recorded timestamps
    #[arg(long, requires = "replay")]
    pub fast: bool,

    /// Run without the preview window
    #[arg(long)]
    pub no_display: bool,

    /// Override the command cooldown, in seconds
    #[arg(long)]
    pub cooldown: Option<f64>,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,

    /// Print an example configuration file and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Args {
    /// Fold command-line overrides into a loaded configuration
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(cam) = self.cam {
            config.video.camera_index = cam;
        }
        if let Some(video) = &self.video {
            config.video.video_file = Some(video.clone());
        }
        if self.no_display {
            config.video.display = false;
        }
        if self.fast {
            config.video.realtime_replay = false;
        }
        if let Some(cooldown) = self.cooldown {
            config.dispatch.cooldown_secs = cooldown;
        }
    }
}
