//! Bedrud operator agents and deployment CLI
//!
//! Bot participants for the Bedrud meeting platform: each agent
//! authenticates against the REST API, joins a LiveKit room, and republishes
//! a media feed (local file, internet radio, or live video stream) by
//! decoding with ffmpeg and pumping raw frames into the room at frame
//! cadence. The `bedrud` binary packages and deploys the platform backend
//! to a remote host.
//!
//! # Binaries
//! - `music-agent <meeting-url> <file>`: play an audio file into a room
//! - `radio-agent <meeting-url> <stream-url>`: relay an internet radio stream
//! - `video-agent <meeting-url> <stream-url>`: relay a live video stream
//! - `bedrud deploy|uninstall|docs`: deployment and documentation tooling
//!
//! # Usage
//! ```rust,ignore
//! use bedrud_agents::{AgentSession, ApiClient, MeetingUrl};
//!
//! let meeting = MeetingUrl::parse("https://meet.example.com/m/abc123")?;
//! let client = ApiClient::new(&meeting.base, false)?;
//! let session = client.guest_login("Music Bot").await?;
//! let grant = client.join_room(&session.tokens.access_token, &meeting.room_name).await?;
//! let agent = AgentSession::connect(&grant.websocket_url(&meeting.scheme)?, &grant.token).await?;
//! ```
pub mod agent;
pub mod api;
pub mod config;
pub mod deploy;
pub mod errors;
pub mod media;

// Re-exports for convenience
pub use agent::{AgentSession, FramePacer, StatsSnapshot, StreamStats};
pub use api::{ApiClient, GuestSession, MeetingUrl, RoomGrant};
pub use config::BedrudConfig;
pub use errors::AgentError;
pub use media::{AudioSpec, Decoder, FrameReader, VideoSpec};

/// Initialize logging for the agents
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
