//! External decoder subprocess
//!
//! Everything compressed goes through ffmpeg: the agents never touch codec
//! or container handling themselves. ffmpeg decodes to raw s16le PCM or
//! I420 frames on stdout, and the agents read exact-size frames from the
//! pipe.

use crate::errors::AgentError;
use crate::media::{AudioSpec, VideoSpec};
use bytes::{Bytes, BytesMut};
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, ChildStdout, Command};

/// ffmpeg arguments for decoding any input to raw interleaved PCM on stdout.
pub fn audio_args(input: &str, spec: &AudioSpec) -> Vec<String> {
    vec![
        "-i".into(),
        input.into(),
        "-f".into(),
        "s16le".into(),
        "-ar".into(),
        spec.sample_rate.to_string(),
        "-ac".into(),
        spec.channels.to_string(),
        "-".into(),
    ]
}

/// ffmpeg arguments for decoding any input to raw I420 video on stdout.
pub fn video_args(input: &str, spec: &VideoSpec) -> Vec<String> {
    vec![
        "-i".into(),
        input.into(),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-s".into(),
        format!("{}x{}", spec.width, spec.height),
        "-r".into(),
        spec.fps.to_string(),
        "-".into(),
    ]
}

/// A running decoder subprocess with a raw-frame stdout pipe.
pub struct Decoder {
    child: Child,
}

impl Decoder {
    /// Spawn the decoder. stderr is discarded; stdout is the frame pipe.
    pub fn spawn(ffmpeg: &str, args: &[String]) -> Result<Self, AgentError> {
        let child = Command::new(ffmpeg)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AgentError::Decoder(format!("failed to spawn {}: {}", ffmpeg, e)))?;

        Ok(Self { child })
    }

    /// Take the stdout pipe as an exact-size frame reader.
    pub fn frame_reader(&mut self, frame_bytes: usize) -> Result<FrameReader<ChildStdout>, AgentError> {
        let stdout = self
            .child
            .stdout
            .take()
            .ok_or_else(|| AgentError::Decoder("decoder stdout already taken".to_string()))?;
        Ok(FrameReader::new(stdout, frame_bytes))
    }

    /// Kill the subprocess if still running and reap it.
    pub async fn terminate(mut self) {
        let _ = self.child.start_kill();
        let _ = self.child.wait().await;
    }
}

/// Run the decoder to completion and collect the whole raw output.
///
/// Used by the music agent, which decodes the file up front and paces the
/// buffer itself.
pub async fn decode_to_end(ffmpeg: &str, args: &[String]) -> Result<Vec<u8>, AgentError> {
    let output = Command::new(ffmpeg)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|e| AgentError::Decoder(format!("failed to run {}: {}", ffmpeg, e)))?;

    if !output.status.success() {
        return Err(AgentError::Decoder(format!(
            "{} exited with {}",
            ffmpeg, output.status
        )));
    }
    if output.stdout.is_empty() {
        return Err(AgentError::Decoder("decoder produced no output".to_string()));
    }

    Ok(output.stdout)
}

/// Reads fixed-size frames from a byte stream.
///
/// A clean EOF on a frame boundary ends the stream; EOF mid-frame counts as
/// a short read and also ends the stream, discarding the partial frame.
pub struct FrameReader<R> {
    inner: R,
    frame_bytes: usize,
    short_read: bool,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R, frame_bytes: usize) -> Self {
        Self {
            inner,
            frame_bytes,
            short_read: false,
        }
    }

    /// Whether the stream ended mid-frame.
    pub fn had_short_read(&self) -> bool {
        self.short_read
    }

    /// Read the next full frame, or `None` when the stream has ended.
    pub async fn next_frame(&mut self) -> Result<Option<Bytes>, AgentError> {
        let mut buf = BytesMut::zeroed(self.frame_bytes);
        let mut filled = 0;

        while filled < self.frame_bytes {
            let n = self.inner.read(&mut buf[filled..]).await?;
            if n == 0 {
                if filled > 0 {
                    self.short_read = true;
                    log::debug!(
                        "Stream ended mid-frame ({} of {} bytes)",
                        filled,
                        self.frame_bytes
                    );
                }
                return Ok(None);
            }
            filled += n;
        }

        Ok(Some(buf.freeze()))
    }
}
