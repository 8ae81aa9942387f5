// Core recorder logic: config, source expansion, probing, capture and scheduling

pub mod config;
pub mod ffmpeg_manager;
pub mod notifier;
pub mod pipeline;
pub mod prober;
pub mod scheduler;
pub mod sources;
pub mod transcode;

// Re-export commonly used items
pub use config::{Broadcaster, BroadcasterId, DefaultPolicy, Settings};
pub use ffmpeg_manager::FFmpegManager;
pub use notifier::{DesktopNotifier, NoopNotifier, Notifier};
pub use pipeline::{CaptureOutcome, CapturePipeline};
pub use prober::{HttpProber, Liveness, LivenessProbe};
pub use scheduler::{InFlightTable, Scheduler};
pub use sources::{expand, CandidateSource, SourceKey};
pub use transcode::{Artifact, MediaRef, Transcoder};
