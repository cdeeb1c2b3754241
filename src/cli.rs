use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "video_progress",
    version,
    about = "Video watch-progress API and headless progress-reporting player"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the progress API
    Serve,
    /// Play a simulated video and report progress to the API
    Play {
        /// Video length in seconds
        #[arg(long, default_value_t = 60.0)]
        duration: f64,
        /// Start position in seconds
        #[arg(long, default_value_t = 0.0)]
        start: f64,
        /// Playback rate
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
        /// Simulate a buffering stall once playback reaches this position (seconds)
        #[arg(long)]
        stall_at: Option<f64>,
        /// Length of the simulated stall in seconds
        #[arg(long, default_value_t = 3.0, requires = "stall_at")]
        stall_for: f64,
    },
}
