//! Relays a live video stream (video + audio) into a meeting room as a bot
//! participant. Two independent ffmpeg decoders feed two pump loops.

use anyhow::Result;
use bedrud_agents::agent::{self, AgentSession};
use bedrud_agents::media::decoder::{self, Decoder};
use bedrud_agents::{ApiClient, BedrudConfig, MeetingUrl, StreamStats};
use log::{error, info};
use std::env;

struct Args {
    meeting_url: String,
    stream_url: String,
    name: String,
    insecure: bool,
}

fn parse_args(args: &[String]) -> Option<Args> {
    let mut positional = Vec::new();
    let mut name = "Video Bot".to_string();
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
        stream_url: positional.remove(0),
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
            eprintln!("Usage: video-agent <meeting-url> <stream-url> [--name <display>] [--insecure]");
            std::process::exit(1);
        }
    };

    let config = BedrudConfig::load_or_default()?;
    let audio_spec = config.media.audio_spec();
    let video_spec = config.media.video_spec();

    let meeting = MeetingUrl::parse(&args.meeting_url)?;
    info!("Base URL: {}", meeting.base);
    info!("Room name: {}", meeting.room_name);
    info!("Bot name: {}", args.name);
    info!("Stream URL: {}", args.stream_url);

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

    let mut decoders: Vec<Decoder> = Vec::new();
    let result = async {
        let video_source = agent.publish_video(&video_spec, "video-track").await?;
        let audio_source = agent.publish_audio(&audio_spec, "audio-track").await?;

        info!("Tracks published. Starting ffmpeg...");
        let mut video_dec = Decoder::spawn(
            &config.media.ffmpeg_path,
            &decoder::video_args(&args.stream_url, &video_spec),
        )?;
        let mut audio_dec = Decoder::spawn(
            &config.media.ffmpeg_path,
            &decoder::audio_args(&args.stream_url, &audio_spec),
        )?;
        let mut video_reader = video_dec.frame_reader(video_spec.frame_bytes())?;
        let mut audio_reader = audio_dec.frame_reader(audio_spec.frame_bytes())?;
        decoders.push(video_dec);
        decoders.push(audio_dec);

        info!("Streaming...");
        let video_stats = StreamStats::new();
        let audio_stats = StreamStats::new();
        let pumps = async {
            tokio::try_join!(
                agent::pump_video(&mut video_reader, &video_source, &video_spec, &video_stats),
                agent::pump_audio(&mut audio_reader, &audio_source, &audio_spec, &audio_stats),
            )
            .map(|_| ())
        };

        tokio::select! {
            res = pumps => res,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, leaving room");
                Ok(())
            }
        }
    }
    .await;

    for decoder in decoders {
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
