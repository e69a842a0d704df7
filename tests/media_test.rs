#[cfg(test)]
mod decoder_args_tests {
    use bedrud_agents::media::decoder::{audio_args, video_args};
    use bedrud_agents::media::{AudioSpec, VideoSpec};

    #[test]
    fn test_audio_args_shape() {
        let args = audio_args("http://radio.example/stream", &AudioSpec::default());
        assert_eq!(
            args,
            vec![
                "-i",
                "http://radio.example/stream",
                "-f",
                "s16le",
                "-ar",
                "48000",
                "-ac",
                "2",
                "-",
            ]
        );
    }

    #[test]
    fn test_video_args_shape() {
        let args = video_args("https://example.com/live.m3u8", &VideoSpec::default());
        assert_eq!(
            args,
            vec![
                "-i",
                "https://example.com/live.m3u8",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "yuv420p",
                "-s",
                "1280x720",
                "-r",
                "30",
                "-",
            ]
        );
    }
}

#[cfg(test)]
mod frame_reader_tests {
    use bedrud_agents::media::FrameReader;
    use std::io::Cursor;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_reads_exact_frames() {
        let data: Vec<u8> = (0..12u8).collect();
        let mut reader = FrameReader::new(Cursor::new(data), 4);

        assert_eq!(reader.next_frame().await.unwrap().unwrap().as_ref(), &[0, 1, 2, 3]);
        assert_eq!(reader.next_frame().await.unwrap().unwrap().as_ref(), &[4, 5, 6, 7]);
        assert_eq!(reader.next_frame().await.unwrap().unwrap().as_ref(), &[8, 9, 10, 11]);
        assert!(reader.next_frame().await.unwrap().is_none());
        assert!(!reader.had_short_read());
    }

    #[tokio::test]
    async fn test_partial_tail_is_dropped() {
        let data: Vec<u8> = (0..10u8).collect();
        let mut reader = FrameReader::new(Cursor::new(data), 4);

        assert!(reader.next_frame().await.unwrap().is_some());
        assert!(reader.next_frame().await.unwrap().is_some());
        // 2 trailing bytes: short read, stream over
        assert!(reader.next_frame().await.unwrap().is_none());
        assert!(reader.had_short_read());
    }

    #[tokio::test]
    async fn test_empty_stream() {
        let mut reader = FrameReader::new(Cursor::new(Vec::new()), 4);
        assert!(reader.next_frame().await.unwrap().is_none());
        assert!(!reader.had_short_read());
    }

    #[tokio::test]
    async fn test_reassembles_chunked_writes() {
        let (mut tx, rx) = tokio::io::duplex(8);
        let writer = tokio::spawn(async move {
            // Frame bytes arrive in odd-sized pieces, like a pipe
            tx.write_all(&[1, 2]).await.unwrap();
            tx.write_all(&[3, 4, 5]).await.unwrap();
            tx.write_all(&[6, 7, 8]).await.unwrap();
        });

        let mut reader = FrameReader::new(rx, 4);
        assert_eq!(reader.next_frame().await.unwrap().unwrap().as_ref(), &[1, 2, 3, 4]);
        assert_eq!(reader.next_frame().await.unwrap().unwrap().as_ref(), &[5, 6, 7, 8]);
        assert!(reader.next_frame().await.unwrap().is_none());
        writer.await.unwrap();
    }
}

#[cfg(test)]
mod decoder_spawn_tests {
    use bedrud_agents::media::decoder::{audio_args, decode_to_end, Decoder};
    use bedrud_agents::media::AudioSpec;

    #[tokio::test]
    async fn test_spawn_missing_binary_fails() {
        let args = audio_args("input.mp3", &AudioSpec::default());
        assert!(Decoder::spawn("definitely-not-a-real-decoder", &args).is_err());
    }

    #[tokio::test]
    async fn test_decode_to_end_missing_binary_fails() {
        let args = audio_args("input.mp3", &AudioSpec::default());
        let result = decode_to_end("definitely-not-a-real-decoder", &args).await;
        assert!(result.is_err());
    }
}
