pub mod video_progress;
