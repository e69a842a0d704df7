//! Room session and pump loops
//!
//! An agent's life is connect, stream, disconnect. The session owns the
//! LiveKit room and publishes track sources; the pump loops read raw frames
//! from a decoder pipe (or a pre-decoded buffer) and push them into the
//! sources at frame cadence.

pub mod pacing;

pub use pacing::{FramePacer, StatsSnapshot, StreamStats};

use crate::errors::AgentError;
use crate::media::{self, AudioSpec, FrameReader, VideoSpec};

use livekit::options::TrackPublishOptions;
use livekit::prelude::*;
use livekit::webrtc::audio_frame::AudioFrame;
use livekit::webrtc::audio_source::native::NativeAudioSource;
use livekit::webrtc::audio_source::{AudioSourceOptions, RtcAudioSource};
use livekit::webrtc::video_frame::{I420Buffer, VideoFrame, VideoRotation};
use livekit::webrtc::video_source::native::NativeVideoSource;
use livekit::webrtc::video_source::{RtcVideoSource, VideoResolution};

use tokio::io::AsyncRead;
use tokio::sync::mpsc::UnboundedReceiver;

/// Capture queue depth for the native audio source, in milliseconds.
const AUDIO_QUEUE_MS: u32 = 1000;

/// A connected bot participant in a meeting room.
pub struct AgentSession {
    room: Room,
    // Held so the room's event channel stays open for the session lifetime.
    _events: UnboundedReceiver<RoomEvent>,
}

impl AgentSession {
    /// Connect to the LiveKit room with a token from the room-join call.
    pub async fn connect(ws_url: &str, token: &str) -> Result<Self, AgentError> {
        let (room, events) = Room::connect(ws_url, token, RoomOptions::default())
            .await
            .map_err(|e| AgentError::Transport(format!("connect failed: {}", e)))?;

        log::info!("Connected to room: {}", room.name());
        Ok(Self {
            room,
            _events: events,
        })
    }

    pub fn room_name(&self) -> String {
        self.room.name()
    }

    /// Publish an audio track fed by a native source; published as a
    /// microphone so every participant hears it.
    pub async fn publish_audio(
        &self,
        spec: &AudioSpec,
        track_name: &str,
    ) -> Result<NativeAudioSource, AgentError> {
        let source = NativeAudioSource::new(
            AudioSourceOptions::default(),
            spec.sample_rate,
            spec.channels,
            AUDIO_QUEUE_MS,
        );
        let track = LocalAudioTrack::create_audio_track(
            track_name,
            RtcAudioSource::Native(source.clone()),
        );

        self.room
            .local_participant()
            .publish_track(
                LocalTrack::Audio(track),
                TrackPublishOptions {
                    source: TrackSource::Microphone,
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| AgentError::Transport(format!("publish audio failed: {}", e)))?;

        log::info!("Audio track \"{}\" published", track_name);
        Ok(source)
    }

    /// Publish a video track fed by a native source; published as a screen
    /// share so clients render it full-size.
    pub async fn publish_video(
        &self,
        spec: &VideoSpec,
        track_name: &str,
    ) -> Result<NativeVideoSource, AgentError> {
        let source = NativeVideoSource::new(VideoResolution {
            width: spec.width,
            height: spec.height,
        });
        let track = LocalVideoTrack::create_video_track(
            track_name,
            RtcVideoSource::Native(source.clone()),
        );

        self.room
            .local_participant()
            .publish_track(
                LocalTrack::Video(track),
                TrackPublishOptions {
                    source: TrackSource::Screenshare,
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| AgentError::Transport(format!("publish video failed: {}", e)))?;

        log::info!("Video track \"{}\" published", track_name);
        Ok(source)
    }

    /// Leave the room.
    pub async fn close(self) {
        if let Err(e) = self.room.close().await {
            log::warn!("Disconnect error: {}", e);
        }
        log::info!("Disconnected");
    }
}

/// Push one PCM frame into the audio source.
async fn capture_audio(
    source: &NativeAudioSource,
    spec: &AudioSpec,
    data: &[u8],
) -> Result<(), AgentError> {
    let samples = media::pcm_to_samples(data);
    let frame = AudioFrame {
        data: samples.into(),
        sample_rate: spec.sample_rate,
        num_channels: spec.channels,
        samples_per_channel: spec.samples_per_frame() as u32,
    };
    source
        .capture_frame(&frame)
        .await
        .map_err(|e| AgentError::Stream(format!("audio capture failed: {}", e)))
}

/// Push one packed I420 picture into the video source.
fn capture_video(source: &NativeVideoSource, spec: &VideoSpec, data: &[u8]) {
    let w = spec.width as usize;
    let h = spec.height as usize;
    let y_size = w * h;
    let uv_size = (w / 2) * (h / 2);

    let mut buffer = I420Buffer::new(spec.width, spec.height);
    let (stride_y, stride_u, stride_v) = buffer.strides();
    let (dst_y, dst_u, dst_v) = buffer.data_mut();

    media::copy_plane(dst_y, stride_y as usize, &data[..y_size], w, h);
    media::copy_plane(
        dst_u,
        stride_u as usize,
        &data[y_size..y_size + uv_size],
        w / 2,
        h / 2,
    );
    media::copy_plane(
        dst_v,
        stride_v as usize,
        &data[y_size + uv_size..],
        w / 2,
        h / 2,
    );

    let frame = VideoFrame {
        rotation: VideoRotation::VideoRotation0,
        timestamp_us: 0,
        buffer,
    };
    source.capture_frame(&frame);
}

/// Pace a fully decoded PCM buffer into the room at 20 ms per frame.
///
/// A trailing partial frame is dropped. Progress is logged every 100 frames
/// (two seconds of audio).
pub async fn stream_pcm_buffer(
    source: &NativeAudioSource,
    spec: &AudioSpec,
    pcm: &[u8],
    stats: &StreamStats,
) -> Result<(), AgentError> {
    let frame_bytes = spec.frame_bytes();
    let total_frames = pcm.len() / frame_bytes;
    let mut pacer = FramePacer::new(spec.frame_duration());

    log::info!(
        "Playing {:.1}s of audio ({} frames)",
        total_frames as f64 * 0.02,
        total_frames
    );

    for chunk in pcm.chunks_exact(frame_bytes) {
        capture_audio(source, spec, chunk).await?;
        let sent = stats.record_frame(chunk.len());

        if sent % 100 == 0 {
            log::info!(
                "Progress: {:.1}% ({:.1}s)",
                sent as f64 / total_frames as f64 * 100.0,
                sent as f64 * 0.02
            );
        }

        pacer.tick().await;
    }

    log::info!("Finished playing");
    Ok(())
}

/// Pump decoded PCM frames from a pipe into the audio source until the
/// stream ends.
pub async fn pump_audio<R: AsyncRead + Unpin>(
    reader: &mut FrameReader<R>,
    source: &NativeAudioSource,
    spec: &AudioSpec,
    stats: &StreamStats,
) -> Result<(), AgentError> {
    let mut pacer = FramePacer::new(spec.frame_duration());

    while let Some(frame) = reader.next_frame().await? {
        capture_audio(source, spec, &frame).await?;
        let sent = stats.record_frame(frame.len());
        if sent % 500 == 0 {
            log::debug!("Audio: {} frames sent", sent);
        }
        pacer.tick().await;
    }

    if reader.had_short_read() {
        stats.record_short_read();
    }
    log::info!("Audio stream ended ({} frames)", stats.snapshot().frames_sent);
    Ok(())
}

/// Pump decoded I420 frames from a pipe into the video source until the
/// stream ends.
pub async fn pump_video<R: AsyncRead + Unpin>(
    reader: &mut FrameReader<R>,
    source: &NativeVideoSource,
    spec: &VideoSpec,
    stats: &StreamStats,
) -> Result<(), AgentError> {
    let mut pacer = FramePacer::new(spec.frame_duration());

    while let Some(frame) = reader.next_frame().await? {
        capture_video(source, spec, &frame);
        let sent = stats.record_frame(frame.len());
        if sent % 300 == 0 {
            log::debug!("Video: {} frames sent", sent);
        }
        pacer.tick().await;
    }

    if reader.had_short_read() {
        stats.record_short_read();
    }
    log::info!("Video stream ended ({} frames)", stats.snapshot().frames_sent);
    Ok(())
}
