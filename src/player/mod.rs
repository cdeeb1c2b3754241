pub mod format;
pub mod playback;
pub mod session;
pub mod throttle;

pub use playback::{SimulatedPlayback, run_playback};
pub use session::PlayerSession;
