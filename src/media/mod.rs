//! Raw media formats and frame size math
//!
//! Agents push fixed-size uncompressed frames: 20 ms of interleaved 16-bit
//! PCM for audio, one I420 planar picture for video. All sizes derive from
//! the specs below.

pub mod decoder;

pub use decoder::{Decoder, FrameReader};

use std::time::Duration;

/// Milliseconds of audio per capture frame (WebRTC standard).
pub const AUDIO_FRAME_MS: u32 = 20;

/// Bytes per PCM sample (s16le).
pub const BYTES_PER_SAMPLE: usize = 2;

/// Uncompressed audio format: interleaved s16le PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpec {
    pub sample_rate: u32,
    pub channels: u32,
}

impl Default for AudioSpec {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            channels: 2,
        }
    }
}

impl AudioSpec {
    /// Samples per channel in one 20 ms frame.
    pub fn samples_per_frame(&self) -> usize {
        (self.sample_rate * AUDIO_FRAME_MS / 1000) as usize
    }

    /// Size in bytes of one 20 ms frame.
    pub fn frame_bytes(&self) -> usize {
        self.samples_per_frame() * self.channels as usize * BYTES_PER_SAMPLE
    }

    /// Wall-clock duration of one frame.
    pub fn frame_duration(&self) -> Duration {
        Duration::from_millis(AUDIO_FRAME_MS as u64)
    }
}

/// Uncompressed video format: I420 planar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoSpec {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for VideoSpec {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 30,
        }
    }
}

impl VideoSpec {
    /// Size in bytes of one I420 picture (Y plane plus 2x2-subsampled U/V).
    pub fn frame_bytes(&self) -> usize {
        let y = (self.width * self.height) as usize;
        let uv = ((self.width / 2) * (self.height / 2)) as usize;
        y + 2 * uv
    }

    /// Wall-clock duration of one frame (~33 ms at 30 fps).
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.fps
    }
}

/// Reinterpret little-endian PCM bytes as i16 samples.
pub fn pcm_to_samples(data: &[u8]) -> Vec<i16> {
    data.chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

/// Copy a tightly packed plane into a destination with a row stride.
///
/// Decoder output is packed (stride == width); transport buffers may pad
/// rows.
pub fn copy_plane(dst: &mut [u8], dst_stride: usize, src: &[u8], width: usize, height: usize) {
    for row in 0..height {
        let d = row * dst_stride;
        let s = row * width;
        dst[d..d + width].copy_from_slice(&src[s..s + width]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_audio_frame_size() {
        let spec = AudioSpec::default();
        assert_eq!(spec.samples_per_frame(), 960);
        assert_eq!(spec.frame_bytes(), 3840);
        assert_eq!(spec.frame_duration(), Duration::from_millis(20));
    }

    #[test]
    fn test_mono_audio_frame_size() {
        let spec = AudioSpec {
            sample_rate: 16_000,
            channels: 1,
        };
        assert_eq!(spec.samples_per_frame(), 320);
        assert_eq!(spec.frame_bytes(), 640);
    }

    #[test]
    fn test_default_video_frame_size() {
        let spec = VideoSpec::default();
        assert_eq!(spec.frame_bytes(), 1_382_400);
        assert_eq!(spec.frame_duration(), Duration::from_nanos(33_333_333));
    }

    #[test]
    fn test_pcm_to_samples() {
        let data = [0x00, 0x00, 0xFF, 0x7F, 0x00, 0x80];
        let samples = pcm_to_samples(&data);
        assert_eq!(samples, vec![0, i16::MAX, i16::MIN]);
    }

    #[test]
    fn test_copy_plane_with_padding() {
        let src = [1u8, 2, 3, 4];
        let mut dst = [0u8; 6];
        copy_plane(&mut dst, 3, &src, 2, 2);
        assert_eq!(dst, [1, 2, 0, 3, 4, 0]);
    }
}
