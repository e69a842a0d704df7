//! Plays a local audio file into a meeting room as a bot participant.

use anyhow::Result;
use bedrud_agents::agent::{self, AgentSession};
use bedrud_agents::media::decoder;
use bedrud_agents::{ApiClient, BedrudConfig, MeetingUrl, StreamStats};
use log::{error, info};
use std::env;

struct Args {
    meeting_url: String,
    file: String,
    name: String,
    insecure: bool,
}

fn parse_args(args: &[String]) -> Option<Args> {
    let mut positional = Vec::new();
    let mut name = "Music Bot".to_string();
    let mut insecure = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--name" => {
                i += 1;
                name = args.get(i)?.clone();
            }
            "--insecure" => insecure = true,
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    if positional.len() != 2 {
        return None;
    }
    Some(Args {
        meeting_url: positional.remove(0),
        file: positional.remove(0),
        name,
        insecure,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    bedrud_agents::init_logging();

    let raw: Vec<String> = env::args().collect();
    let args = match parse_args(&raw) {
        Some(a) => a,
        None => {
            eprintln!("Usage: music-agent <meeting-url> <file> [--name <display>] [--insecure]");
            std::process::exit(1);
        }
    };

    let config = BedrudConfig::load_or_default()?;
    let spec = config.media.audio_spec();

    let meeting = MeetingUrl::parse(&args.meeting_url)?;
    info!("Base URL: {}", meeting.base);
    info!("Room name: {}", meeting.room_name);
    info!("Bot name: {}", args.name);

    let client = ApiClient::new(&meeting.base, args.insecure)?;

    info!("Logging in as guest...");
    let session = client.guest_login(&args.name).await?;
    info!("Guest login successful");

    info!("Joining room {}...", meeting.room_name);
    let grant = client
        .join_room(&session.tokens.access_token, &meeting.room_name)
        .await?;
    let ws_url = grant.websocket_url(&meeting.scheme)?;
    info!("Joined room. LiveKit host: {}", ws_url);

    info!("Decoding audio file: {}", args.file);
    let pcm = decoder::decode_to_end(
        &config.media.ffmpeg_path,
        &decoder::audio_args(&args.file, &spec),
    )
    .await?;

    info!("Connecting to LiveKit...");
    let agent = AgentSession::connect(&ws_url, &grant.token).await?;

    let result = async {
        let source = agent.publish_audio(&spec, "music-track").await?;
        let stats = StreamStats::new();
        tokio::select! {
            res = agent::stream_pcm_buffer(&source, &spec, &pcm, &stats) => res,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, leaving room");
                Ok(())
            }
        }
    }
    .await;

    if let Err(e) = &result {
        error!("Playback error: {}", e);
    }
    agent.close().await;

    if result.is_err() {
        std::process::exit(1);
    }
    Ok(())
}
