use std::fs;
use std::path::{Path, PathBuf};

use common::BgrFrame;
use common::ffmpeg_next as ffmpeg;
use common::log::{debug, error, info, warn};
use ffmpeg::format::Pixel;
use ffmpeg::software::scaling;
use ffmpeg::{Dictionary, Packet, Rational, codec, encoder, format, frame};

use crate::OutputError;

const MIN_BIT_RATE: usize = 400_000;

/// Parameters fixed at open time and constant for the life of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// ffmpeg encoder name, e.g. `mpeg4` or `libx264`.
    pub codec: String,
}

impl StreamSettings {
    fn validate(&self) -> Result<(), OutputError> {
        if self.width == 0 || self.height == 0 {
            return Err(OutputError::InvalidSettings(format!(
                "dimensions must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.fps == 0 || self.fps > i32::MAX as u32 {
            return Err(OutputError::InvalidSettings(format!(
                "frame rate out of range: {}",
                self.fps
            )));
        }
        Ok(())
    }

    fn bit_rate(&self) -> usize {
        // ~0.25 bits per pixel per frame keeps mpeg4 call recordings legible.
        let scaled = (self.width as usize * self.height as usize * self.fps as usize) / 4;
        scaled.max(MIN_BIT_RATE)
    }

    fn encoder_options(&self) -> Dictionary<'static> {
        let mut opts = Dictionary::new();
        match self.codec.as_str() {
            "libx264" => {
                opts.set("preset", "veryfast");
                opts.set("tune", "zerolatency");
                opts.set("crf", "22");
            }
            "h264_videotoolbox" => {
                opts.set("realtime", "1");
            }
            _ => {}
        }
        opts
    }
}

/// An open video file accepting BGR24 frames in order.
///
/// The file is finalized exactly once: by [`OutputStream::finish`], or by
/// `Drop` when the owner bails out early.
pub struct OutputStream {
    path: PathBuf,
    width: u32,
    height: u32,
    octx: format::context::Output,
    encoder: encoder::video::Encoder,
    scaler: scaling::Context,
    staging: frame::Video,
    scaled: frame::Video,
    stream_index: usize,
    encoder_time_base: Rational,
    stream_time_base: Rational,
    frames: u64,
    closed: bool,
}

impl OutputStream {
    pub fn create(path: &Path, settings: &StreamSettings) -> Result<Self, OutputError> {
        settings.validate()?;
        ffmpeg::init()?;

        // Look the codec up before touching the filesystem so a bad name
        // leaves nothing behind.
        let video_codec = encoder::find_by_name(&settings.codec)
            .ok_or_else(|| OutputError::EncoderNotFound(settings.codec.clone()))?;

        // From here on the file exists; any failure must take it away again.
        let octx = format::output(&path)?;
        Self::start(path, settings, video_codec, octx).inspect_err(|e| {
            warn!("[storage] could not start {}: {}", path.display(), e);
            if let Err(rm) = fs::remove_file(path) {
                error!("[storage] failed to remove {}: {}", path.display(), rm);
            }
        })
    }

    fn start(
        path: &Path,
        settings: &StreamSettings,
        video_codec: ffmpeg::Codec,
        mut octx: format::context::Output,
    ) -> Result<Self, OutputError> {
        let global_header = octx
            .format()
            .flags()
            .contains(format::Flags::GLOBAL_HEADER);

        let time_base = Rational::new(1, settings.fps as i32);
        let stream_index;
        let opened = {
            let mut ost = octx.add_stream(video_codec)?;
            stream_index = ost.index();

            let mut video = codec::context::Context::new_with_codec(video_codec)
                .encoder()
                .video()?;
            video.set_width(settings.width);
            video.set_height(settings.height);
            video.set_format(Pixel::YUV420P);
            video.set_time_base(time_base);
            video.set_frame_rate(Some(Rational::new(settings.fps as i32, 1)));
            video.set_gop(settings.fps);
            video.set_max_b_frames(0);
            video.set_bit_rate(settings.bit_rate());
            if global_header {
                video.set_flags(codec::Flags::GLOBAL_HEADER);
            }

            let opened = video.open_with(settings.encoder_options())?;
            ost.set_parameters(&opened);
            ost.set_time_base(time_base);
            opened
        };

        octx.write_header()?;
        let stream_time_base = octx
            .stream(stream_index)
            .map(|s| s.time_base())
            .unwrap_or(time_base);

        let scaler = scaling::Context::get(
            Pixel::BGR24,
            settings.width,
            settings.height,
            Pixel::YUV420P,
            settings.width,
            settings.height,
            scaling::Flags::BILINEAR,
        )?;

        info!(
            "[storage] opened {} ({}x{} @ {}fps, {})",
            path.display(),
            settings.width,
            settings.height,
            settings.fps,
            settings.codec
        );

        Ok(Self {
            path: path.to_path_buf(),
            width: settings.width,
            height: settings.height,
            octx,
            encoder: opened,
            scaler,
            staging: frame::Video::new(Pixel::BGR24, settings.width, settings.height),
            scaled: frame::Video::new(Pixel::YUV420P, settings.width, settings.height),
            stream_index,
            encoder_time_base: time_base,
            stream_time_base,
            frames: 0,
            closed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    /// Encodes one frame. Frames must match the declared dimensions.
    pub fn append(&mut self, frame: &BgrFrame) -> Result<(), OutputError> {
        if self.closed {
            return Err(OutputError::Closed);
        }
        if (frame.width, frame.height) != (self.width, self.height) {
            return Err(OutputError::DimensionMismatch {
                expected: (self.width, self.height),
                actual: (frame.width, frame.height),
            });
        }
        let row_len = frame.row_len();
        let expected = row_len * frame.height as usize;
        if frame.data.len() != expected {
            return Err(OutputError::BufferSize {
                expected,
                actual: frame.data.len(),
            });
        }

        let stride = self.staging.stride(0);
        let plane = self.staging.data_mut(0);
        for (row, src) in frame.data.chunks_exact(row_len).enumerate() {
            let start = row * stride;
            plane[start..start + row_len].copy_from_slice(src);
        }

        self.scaler.run(&self.staging, &mut self.scaled)?;
        self.scaled.set_pts(Some(self.frames as i64));
        self.encoder.send_frame(&self.scaled)?;
        self.frames += 1;
        self.write_pending_packets()
    }

    /// Drains the encoder, writes the trailer and closes the file.
    /// Returns the number of frames written.
    pub fn finish(mut self) -> Result<u64, OutputError> {
        self.close()?;
        Ok(self.frames)
    }

    fn write_pending_packets(&mut self) -> Result<(), OutputError> {
        let mut packet = Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.stream_index);
            packet.rescale_ts(self.encoder_time_base, self.stream_time_base);
            packet.write_interleaved(&mut self.octx)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), OutputError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        // The trailer goes out even if draining failed, so whatever reached
        // the muxer stays playable.
        let drained = self
            .encoder
            .send_eof()
            .map_err(OutputError::from)
            .and_then(|_| self.write_pending_packets());
        let trailer = self.octx.write_trailer();

        debug!(
            "[storage] closed {} after {} frames",
            self.path.display(),
            self.frames
        );
        drained?;
        trailer?;
        Ok(())
    }
}

impl Drop for OutputStream {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!("[storage] failed to finalize {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffmpeg::media::Type;

    fn settings(width: u32, height: u32) -> StreamSettings {
        StreamSettings {
            width,
            height,
            fps: 10,
            codec: "mpeg4".to_string(),
        }
    }

    fn gradient(width: u32, height: u32, shift: u8) -> BgrFrame {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[x as u8, y as u8, shift]);
            }
        }
        BgrFrame {
            width,
            height,
            data,
        }
    }

    /// Reads back (width, height, packet count) of the first video stream.
    fn probe(path: &Path) -> (u32, u32, usize) {
        let mut ictx = format::input(&path).unwrap();
        let stream = ictx.streams().best(Type::Video).unwrap();
        let index = stream.index();
        let decoder = codec::context::Context::from_parameters(stream.parameters())
            .unwrap()
            .decoder()
            .video()
            .unwrap();
        let (width, height) = (decoder.width(), decoder.height());
        let packets = ictx
            .packets()
            .filter(|(s, _)| s.index() == index)
            .count();
        (width, height, packets)
    }

    #[test]
    fn written_file_reports_declared_dimensions() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.mp4");

        let mut stream = OutputStream::create(&path, &settings(96, 64)).unwrap();
        assert_eq!(stream.dimensions(), (96, 64));
        assert_eq!(stream.path(), path.as_path());
        for i in 0..5 {
            stream.append(&gradient(96, 64, i * 40)).unwrap();
        }
        assert_eq!(stream.finish().unwrap(), 5);

        let (width, height, packets) = probe(&path);
        assert_eq!((width, height), (96, 64));
        assert_eq!(packets, 5);
    }

    #[test]
    fn mismatched_frame_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.mp4");

        let mut stream = OutputStream::create(&path, &settings(64, 48)).unwrap();
        let err = stream.append(&gradient(48, 64, 0)).unwrap_err();
        assert!(matches!(
            err,
            OutputError::DimensionMismatch {
                expected: (64, 48),
                actual: (48, 64)
            }
        ));

        let mut short = gradient(64, 48, 0);
        short.data.truncate(10);
        assert!(matches!(
            stream.append(&short),
            Err(OutputError::BufferSize { .. })
        ));
        assert_eq!(stream.frames_written(), 0);
    }

    #[test]
    fn dropping_without_finish_still_finalizes() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("dropped.mp4");

        {
            let mut stream = OutputStream::create(&path, &settings(64, 48)).unwrap();
            for i in 0..3 {
                stream.append(&gradient(64, 48, i)).unwrap();
            }
        }

        let (width, height, packets) = probe(&path);
        assert_eq!((width, height), (64, 48));
        assert_eq!(packets, 3);
    }

    #[test]
    fn unknown_codec_creates_no_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("never.mp4");
        let mut bad = settings(64, 48);
        bad.codec = "definitely-not-a-codec".to_string();

        let err = OutputStream::create(&path, &bad).err().unwrap();
        assert!(matches!(err, OutputError::EncoderNotFound(_)));
        assert!(!path.exists());
    }

    #[test]
    fn encoder_rejecting_settings_leaves_no_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("too_fast.mp4");
        // mpeg4 caps the time base denominator at 65535.
        let fast = StreamSettings {
            fps: 70_000,
            ..settings(64, 48)
        };

        assert!(OutputStream::create(&path, &fast).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn zero_sized_stream_is_invalid() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("zero.mp4");

        let err = OutputStream::create(&path, &settings(0, 48)).err().unwrap();
        assert!(matches!(err, OutputError::InvalidSettings(_)));
        assert!(!path.exists());
    }
}
