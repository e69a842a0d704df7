//! Relays an internet radio stream into a meeting room as a bot participant.

use anyhow::Result;
use bedrud_agents::agent::{self, AgentSession};
use bedrud_agents::media::decoder::{self, Decoder};
use bedrud_agents::{ApiClient, BedrudConfig, MeetingUrl, StreamStats};
use log::{error, info};
use std::env;

struct Args {
    meeting_url: String,
    radio_url: String,
    name: String,
    insecure: bool,
}

fn parse_args(args: &[String]) -> Option<Args> {
    let mut positional = Vec::new();
    let mut name = "Radio Bot".to_string();
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
        radio_url: positional.remove(0),
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
            eprintln!("Usage: radio-agent <meeting-url> <stream-url> [--name <display>] [--insecure]");
            std::process::exit(1);
        }
    };

    let config = BedrudConfig::load_or_default()?;
    let spec = config.media.audio_spec();

    let meeting = MeetingUrl::parse(&args.meeting_url)?;
    info!("Base URL: {}", meeting.base);
    info!("Room name: {}", meeting.room_name);
    info!("Bot name: {}", args.name);
    info!("Radio URL: {}", args.radio_url);

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

    info!("Connecting to LiveKit...");
    let agent = AgentSession::connect(&ws_url, &grant.token).await?;

    let mut dec: Option<Decoder> = None;
    let result = async {
        let source = agent.publish_audio(&spec, "radio-track").await?;

        info!("Radio track published. Starting ffmpeg...");
        let mut decoder = Decoder::spawn(
            &config.media.ffmpeg_path,
            &decoder::audio_args(&args.radio_url, &spec),
        )?;
        let mut reader = decoder.frame_reader(spec.frame_bytes())?;
        dec = Some(decoder);

        info!("Streaming radio...");
        let stats = StreamStats::new();
        tokio::select! {
            res = agent::pump_audio(&mut reader, &source, &spec, &stats) => res,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, leaving room");
                Ok(())
            }
        }
    }
    .await;

    if let Some(decoder) = dec {
        decoder.terminate().await;
    }
    if let Err(e) = &result {
        error!("Stream error: {}", e);
    }
    agent.close().await;

    if result.is_err() {
        std::process::exit(1);
    }
    Ok(())
}
