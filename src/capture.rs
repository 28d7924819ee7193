//! Frame sampling from video files.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use ffmpeg::util::frame::video::Video;
use ffmpeg_next::{self as ffmpeg, codec, format, media, rescale, software, Error, Rational};
use image::codecs::jpeg;
use image::imageops::FilterType;
use image::RgbImage;
use tracing::{debug, error, info, warn};

use crate::error::{NarraiError, Result};

/// Stride used when the container reports no usable frame rate.
pub const FALLBACK_STRIDE: u64 = 30;

const JPEG_QUALITY: u8 = 90;

static INIT: OnceLock<std::result::Result<(), String>> = OnceLock::new();

pub fn init() -> Result<()> {
    INIT.get_or_init(|| ffmpeg::init().map_err(|e| e.to_string()))
        .clone()
        .map_err(|e| NarraiError::config(format!("ffmpeg init failed: {e}")))
}

/// A decoded RGB bitmap sampled from a video.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Index of the frame in decode order
    pub index: u64,
    /// Position in source time, seconds
    pub timestamp: f64,
    pub image: RgbImage,
}

impl Frame {
    pub fn new(index: u64, timestamp: f64, image: RgbImage) -> Self {
        Self {
            index,
            timestamp,
            image,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Encodes the frame as a `data:image/jpeg;base64,...` URL.
    pub fn to_data_url(&self) -> Result<String> {
        let mut jpeg_data = Vec::new();
        let mut encoder = jpeg::JpegEncoder::new_with_quality(&mut jpeg_data, JPEG_QUALITY);
        encoder
            .encode(
                &self.image,
                self.image.width(),
                self.image.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| NarraiError::Io(std::io::Error::other(e)))?;

        Ok("data:image/jpeg;base64,".to_owned() + &BASE64_STANDARD.encode(jpeg_data))
    }
}

/// Sampling parameters.
#[derive(Debug, Clone, Copy)]
pub struct SamplerOptions {
    pub interval_seconds: f64,
    pub max_frames: usize,
    pub max_dimension: u32,
}

/// Container metadata of the best video stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoInfo {
    pub fps: f64,
    pub frame_count: u64,
    pub duration_seconds: f64,
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
}

impl VideoInfo {
    /// Duration the container vouches for, if any.
    pub fn metadata_duration(&self) -> Option<f64> {
        (self.duration_seconds.is_finite() && self.duration_seconds > 0.0)
            .then_some(self.duration_seconds)
    }

    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Number of decoded frames between two samples.
pub fn frame_stride(fps: f64, interval_seconds: f64) -> u64 {
    if fps.is_finite() && fps > 0.0 && interval_seconds > 0.0 {
        ((fps * interval_seconds).round() as u64).max(1)
    } else {
        FALLBACK_STRIDE
    }
}

/// Target size that fits `width`x`height` inside a `max` square, or `None` if it already fits.
pub fn fit_within(width: u32, height: u32, max: u32) -> Option<(u32, u32)> {
    if width <= max && height <= max {
        return None;
    }
    let ratio = f64::min(max as f64 / width as f64, max as f64 / height as f64);
    let new_width = ((width as f64 * ratio) as u32).max(1);
    let new_height = ((height as f64 * ratio) as u32).max(1);
    Some((new_width, new_height))
}

fn rational_to_f64(r: Rational) -> f64 {
    if r.denominator() == 0 {
        0.0
    } else {
        f64::from(r)
    }
}

fn stream_fps(stream: &format::stream::Stream) -> f64 {
    let avg = rational_to_f64(stream.avg_frame_rate());
    if avg > 0.0 {
        avg
    } else {
        rational_to_f64(stream.rate())
    }
}

/// Reads container metadata. Returns `None` if the file is not a readable video.
pub fn probe(path: &Path) -> Option<VideoInfo> {
    match try_probe(path) {
        Ok(info) => {
            info!(
                path = %path.display(),
                fps = info.fps,
                frames = info.frame_count,
                duration_secs = info.duration_seconds,
                width = info.width,
                height = info.height,
                "Video info"
            );
            Some(info)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read video info");
            None
        }
    }
}

fn try_probe(path: &Path) -> std::result::Result<VideoInfo, Error> {
    init().map_err(|_| Error::Bug)?;
    let input = format::input(&path)?;
    let stream = input
        .streams()
        .best(media::Type::Video)
        .ok_or(Error::StreamNotFound)?;

    let fps = stream_fps(&stream);
    let frame_count = stream.frames().max(0) as u64;
    let decoder = codec::context::Context::from_parameters(stream.parameters())?
        .decoder()
        .video()?;

    let stream_duration = stream.duration() as f64 * rational_to_f64(stream.time_base());
    let container_duration = input.duration() as f64 * rational_to_f64(rescale::TIME_BASE);
    let duration_seconds = if fps > 0.0 && frame_count > 0 {
        frame_count as f64 / fps
    } else if stream_duration > 0.0 {
        stream_duration
    } else {
        container_duration.max(0.0)
    };

    Ok(VideoInfo {
        fps,
        frame_count,
        duration_seconds,
        width: decoder.width(),
        height: decoder.height(),
        size_bytes: std::fs::metadata(path).map(|m| m.len()).unwrap_or(0),
    })
}

/// Decodes `path` and keeps one frame every `interval_seconds` of source time.
///
/// Frames come back earliest first, converted to RGB and downscaled to fit
/// `max_dimension`. At most `max_frames` are returned. An unreadable file or a
/// stream with no decodable frames yields an empty vector.
pub fn sample_frames(path: &Path, options: &SamplerOptions) -> Vec<Frame> {
    info!(path = %path.display(), "Extracting frames from video");
    match try_sample_frames(path, options) {
        Ok(frames) => {
            info!(count = frames.len(), "Extracted frames from video");
            frames
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Error extracting frames from video");
            Vec::new()
        }
    }
}

/// Runs [`sample_frames`] on the blocking pool.
pub async fn sample_frames_blocking(path: PathBuf, options: SamplerOptions) -> Vec<Frame> {
    match tokio::task::spawn_blocking(move || sample_frames(&path, &options)).await {
        Ok(frames) => frames,
        Err(e) => {
            error!(error = %e, "Frame sampling task failed");
            Vec::new()
        }
    }
}

fn try_sample_frames(
    path: &Path,
    options: &SamplerOptions,
) -> std::result::Result<Vec<Frame>, Error> {
    init().map_err(|_| Error::Bug)?;
    let mut input = format::input(&path)?;
    let video_stream = input
        .streams()
        .best(media::Type::Video)
        .ok_or(Error::StreamNotFound)?;
    let video_stream_index = video_stream.index();
    let fps = stream_fps(&video_stream);
    let time_base = rational_to_f64(video_stream.time_base());
    let stride = frame_stride(fps, options.interval_seconds);

    let mut decoder = codec::context::Context::from_parameters(video_stream.parameters())?
        .decoder()
        .video()?;

    let mut scaler = software::scaling::context::Context::get(
        decoder.format(),
        decoder.width(),
        decoder.height(),
        format::Pixel::RGB24,
        decoder.width(),
        decoder.height(),
        software::scaling::Flags::BILINEAR,
    )?;

    debug!(fps, stride, "Sampling stride computed");

    let mut decoded_count: u64 = 0;
    let mut frames = Vec::new();
    let mut receive_and_process_decoded_frames =
        |decoder: &mut ffmpeg::decoder::Video| -> std::result::Result<bool, Error> {
            let mut decoded = Video::empty();
            while decoder.receive_frame(&mut decoded).is_ok() {
                let index = decoded_count;
                decoded_count += 1;
                if index % stride != 0 {
                    continue;
                }
                if frames.len() >= options.max_frames {
                    info!(limit = options.max_frames, "Reached maximum frame limit");
                    return Ok(true);
                }

                let mut rgb_frame = Video::empty();
                scaler.run(&decoded, &mut rgb_frame)?;
                let image = to_rgb_image(&rgb_frame).ok_or(Error::InvalidData)?;
                let image = match fit_within(image.width(), image.height(), options.max_dimension)
                {
                    Some((w, h)) => image::imageops::resize(&image, w, h, FilterType::Lanczos3),
                    None => image,
                };

                let timestamp = match decoded.timestamp() {
                    Some(pts) if time_base > 0.0 => pts as f64 * time_base,
                    _ if fps > 0.0 => index as f64 / fps,
                    _ => 0.0,
                };
                debug!(n = frames.len() + 1, timestamp, "Extracted frame");
                frames.push(Frame::new(index, timestamp, image));
            }
            Ok(frames.len() >= options.max_frames)
        };

    let mut capped = false;
    for (stream, packet) in input.packets() {
        if stream.index() == video_stream_index {
            decoder.send_packet(&packet)?;
            if receive_and_process_decoded_frames(&mut decoder)? {
                capped = true;
                break;
            }
        }
    }
    if !capped {
        decoder.send_eof()?;
        receive_and_process_decoded_frames(&mut decoder)?;
    }

    Ok(frames)
}

/// Copies an RGB24 frame into a tightly packed image, dropping row padding.
fn to_rgb_image(frame: &Video) -> Option<RgbImage> {
    let width = frame.width();
    let height = frame.height();
    let stride = frame.stride(0);
    let data = frame.data(0);
    let row = width as usize * 3;

    let mut buf = Vec::with_capacity(row * height as usize);
    for y in 0..height as usize {
        let start = y * stride;
        buf.extend_from_slice(data.get(start..start + row)?);
    }
    RgbImage::from_raw(width, height, buf)
}

#[cfg(test)]
mod tests {
    use ffmpeg::{encoder, Packet};

    use super::*;

    const CLIP_FPS: i32 = 10;
    const CLIP_FRAMES: i64 = 30;
    const CLIP_SECONDS: f64 = 3.0;

    /// Encodes a 320x240 MPEG-4 clip of `CLIP_FRAMES` frames at `CLIP_FPS`.
    fn write_clip(path: &Path) -> std::result::Result<(), Error> {
        init().map_err(|_| Error::Bug)?;
        let (width, height) = (320, 240);
        let time_base = Rational(1, CLIP_FPS);

        let mut output = format::output(&path)?;
        let global_header = output
            .format()
            .flags()
            .contains(format::Flags::GLOBAL_HEADER);
        let codec = encoder::find(codec::Id::MPEG4).ok_or(Error::EncoderNotFound)?;
        let mut output_stream = output.add_stream(codec)?;
        let mut video_encoder = codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;
        video_encoder.set_width(width);
        video_encoder.set_height(height);
        video_encoder.set_format(format::Pixel::YUV420P);
        video_encoder.set_time_base(time_base);
        video_encoder.set_frame_rate(Some(Rational(CLIP_FPS, 1)));
        if global_header {
            video_encoder.set_flags(codec::Flags::GLOBAL_HEADER);
        }
        let mut video_encoder = video_encoder.open_as(codec)?;
        output_stream.set_parameters(&video_encoder);
        output_stream.set_time_base(time_base);
        let stream_index = output_stream.index();

        output.write_header()?;
        let stream_time_base = output
            .stream(stream_index)
            .ok_or(Error::StreamNotFound)?
            .time_base();

        let write_packets = |video_encoder: &mut encoder::Video,
                             output: &mut format::context::Output|
         -> std::result::Result<(), Error> {
            let mut packet = Packet::empty();
            while video_encoder.receive_packet(&mut packet).is_ok() {
                packet.set_stream(stream_index);
                packet.rescale_ts(time_base, stream_time_base);
                packet.write_interleaved(output)?;
            }
            Ok(())
        };

        let mut frame = Video::new(format::Pixel::YUV420P, width, height);
        for n in 0..CLIP_FRAMES {
            frame.data_mut(0).fill((n * 8 % 256) as u8);
            frame.data_mut(1).fill(128);
            frame.data_mut(2).fill(128);
            frame.set_pts(Some(n));
            video_encoder.send_frame(&frame)?;
            write_packets(&mut video_encoder, &mut output)?;
        }
        video_encoder.send_eof()?;
        write_packets(&mut video_encoder, &mut output)?;
        output.write_trailer()?;
        Ok(())
    }

    fn clip() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        write_clip(&path).unwrap();
        (dir, path)
    }

    fn options(interval_seconds: f64, max_frames: usize, max_dimension: u32) -> SamplerOptions {
        SamplerOptions {
            interval_seconds,
            max_frames,
            max_dimension,
        }
    }

    #[test]
    fn test_frame_stride() {
        assert_eq!(frame_stride(30.0, 5.0), 150);
        assert_eq!(frame_stride(29.97, 5.0), 150);
        assert_eq!(frame_stride(24.0, 0.5), 12);
        assert_eq!(frame_stride(0.0, 5.0), FALLBACK_STRIDE);
        assert_eq!(frame_stride(f64::NAN, 5.0), FALLBACK_STRIDE);
        assert_eq!(frame_stride(1.0, 0.1), 1);
    }

    #[test]
    fn test_fit_within_preserves_aspect() {
        assert_eq!(fit_within(1920, 1080, 1024), Some((1024, 576)));
        assert_eq!(fit_within(1080, 1920, 1024), Some((576, 1024)));
        assert_eq!(fit_within(800, 600, 1024), None);
        assert_eq!(fit_within(1024, 1024, 1024), None);
    }

    #[test]
    fn test_metadata_duration() {
        let info = VideoInfo {
            duration_seconds: 30.0,
            ..Default::default()
        };
        assert_eq!(info.metadata_duration(), Some(30.0));
        assert_eq!(VideoInfo::default().metadata_duration(), None);
    }

    #[test]
    fn test_frame_data_url() {
        let frame = Frame::new(0, 0.0, RgbImage::new(4, 4));
        let url = frame.to_data_url().unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_probe_encoded_clip() {
        let (_dir, path) = clip();

        let info = probe(&path).unwrap();
        assert_eq!((info.width, info.height), (320, 240));
        assert!((info.fps - CLIP_FPS as f64).abs() < 0.01);
        assert!((info.duration_seconds - CLIP_SECONDS).abs() < 0.5);
        assert!(info.size_bytes > 0);
    }

    #[test]
    fn test_sampling_respects_interval() {
        let (_dir, path) = clip();

        for interval in [0.5, 1.0, 2.5] {
            let frames = sample_frames(&path, &options(interval, 100, 1024));
            let bound = (CLIP_SECONDS / interval).ceil() as usize;
            assert!(!frames.is_empty());
            assert!(frames.len() <= bound, "{} frames for interval {interval}", frames.len());
            assert!(frames
                .windows(2)
                .all(|pair| pair[1].timestamp > pair[0].timestamp));
            assert!(frames.windows(2).all(|pair| pair[1].index > pair[0].index));
        }

        let frames = sample_frames(&path, &options(1.0, 100, 1024));
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].index, 0);
        assert_eq!(frames[1].index, 10);
        assert!((frames[1].timestamp - 1.0).abs() < 0.05);
        assert_eq!((frames[0].width(), frames[0].height()), (320, 240));
    }

    #[test]
    fn test_sampling_respects_frame_cap() {
        let (_dir, path) = clip();

        let frames = sample_frames(&path, &options(0.1, 4, 1024));
        assert_eq!(frames.len(), 4);
        assert_eq!(frames.last().map(|f| f.index), Some(3));
    }

    #[test]
    fn test_sampling_downscales_to_max_dimension() {
        let (_dir, path) = clip();

        let frames = sample_frames(&path, &options(1.0, 100, 160));
        assert!(!frames.is_empty());
        for frame in &frames {
            assert!(frame.width().max(frame.height()) <= 160);
            assert_eq!((frame.width(), frame.height()), (160, 120));
        }
    }

    #[tokio::test]
    async fn test_sampling_on_blocking_pool() {
        let (_dir, path) = clip();

        let frames = sample_frames_blocking(path, options(2.0, 100, 1024)).await;
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn test_empty_file_yields_no_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.mp4");
        std::fs::write(&path, b"").unwrap();

        let options = SamplerOptions {
            interval_seconds: 5.0,
            max_frames: 10,
            max_dimension: 1024,
        };
        assert!(sample_frames(&path, &options).is_empty());
        assert!(probe(&path).is_none());
    }

    #[test]
    fn test_non_video_file_yields_no_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.mp4");
        std::fs::write(&path, "definitely not a video container").unwrap();

        let options = SamplerOptions {
            interval_seconds: 5.0,
            max_frames: 10,
            max_dimension: 1024,
        };
        assert!(sample_frames(&path, &options).is_empty());
        assert!(sample_frames(&dir.path().join("missing.mp4"), &options).is_empty());
    }
}
