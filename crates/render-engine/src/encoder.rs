//! Animated-image encoders.
//!
//! The export pipeline talks to encoders only through [`EncoderFactory`]
//! and [`AnimationEncoder`], so tests and alternative formats can plug in
//! without touching the pipeline.

use std::sync::atomic::{AtomicUsize, Ordering};

use image::RgbaImage;
use rayon::prelude::*;
use tokio::sync::mpsc;

use flipbook_common::config::LoopCount;
use flipbook_common::error::{FlipbookError, FlipbookResult};

/// Share of encoder progress spent quantizing; the rest is writing.
const QUANTIZE_SHARE: f64 = 0.9;

/// Settings an encoder is created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSettings {
    /// Worker threads used for quantization.
    pub workers: usize,
    /// NeuQuant sample factor: 1 is best, 30 is fastest.
    pub quality: u8,
    pub width: u32,
    pub height: u32,
    pub repeat: LoopCount,
}

/// Per-frame options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOptions {
    pub delay_ms: u32,
}

/// Compresses rasterized frames into one animated image.
#[async_trait::async_trait]
pub trait AnimationEncoder: Send {
    /// Queue a frame. Frames are emitted in the order they are added.
    fn add_frame(&mut self, frame: RgbaImage, options: FrameOptions) -> FlipbookResult<()>;

    /// Encode everything queued so far and return the file bytes.
    ///
    /// `progress` receives the completed fraction in `[0.0, 1.0]`.
    async fn render(self: Box<Self>, progress: &mut (dyn FnMut(f64) + Send)) -> FlipbookResult<Vec<u8>>;

    /// Encoder name.
    fn name(&self) -> &str;
}

/// Builds encoders for export jobs.
pub trait EncoderFactory: Send + Sync {
    fn create(&self, settings: &EncoderSettings) -> FlipbookResult<Box<dyn AnimationEncoder>>;

    /// Media type of the produced artifact.
    fn media_type(&self) -> &str;
}

/// Factory for [`GifEncoderBackend`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GifEncoderFactory;

impl EncoderFactory for GifEncoderFactory {
    fn create(&self, settings: &EncoderSettings) -> FlipbookResult<Box<dyn AnimationEncoder>> {
        Ok(Box::new(GifEncoderBackend::new(settings.clone())?))
    }

    fn media_type(&self) -> &str {
        "image/gif"
    }
}

/// GIF encoder: parallel quantization, sequential writing.
pub struct GifEncoderBackend {
    settings: EncoderSettings,
    frames: Vec<(RgbaImage, FrameOptions)>,
}

impl GifEncoderBackend {
    pub fn new(settings: EncoderSettings) -> FlipbookResult<Self> {
        let max = u16::MAX as u32;
        if settings.width == 0 || settings.height == 0 || settings.width > max || settings.height > max {
            return Err(FlipbookError::unsupported(format!(
                "GIF canvas must be between 1x1 and {max}x{max}, got {}x{}",
                settings.width, settings.height
            )));
        }
        Ok(Self {
            settings,
            frames: Vec::new(),
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait::async_trait]
impl AnimationEncoder for GifEncoderBackend {
    fn add_frame(&mut self, frame: RgbaImage, options: FrameOptions) -> FlipbookResult<()> {
        if frame.width() != self.settings.width || frame.height() != self.settings.height {
            return Err(FlipbookError::encode(format!(
                "Frame is {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                self.settings.width,
                self.settings.height
            )));
        }
        self.frames.push((frame, options));
        Ok(())
    }

    async fn render(self: Box<Self>, progress: &mut (dyn FnMut(f64) + Send)) -> FlipbookResult<Vec<u8>> {
        let GifEncoderBackend { settings, frames } = *self;
        if frames.is_empty() {
            return Err(FlipbookError::encode("No frames were added to the encoder"));
        }

        tracing::debug!(
            frames = frames.len(),
            workers = settings.workers,
            quality = settings.quality,
            "Encoding GIF"
        );

        let (tx, mut rx) = mpsc::unbounded_channel();
        let task = tokio::task::spawn_blocking(move || encode_gif(&settings, frames, &tx));

        let mut reported = 0.0f64;
        while let Some(fraction) = rx.recv().await {
            // Workers finish out of order; keep the reported value monotonic.
            if fraction > reported {
                reported = fraction;
                progress(fraction);
            }
        }

        task.await
            .map_err(|e| FlipbookError::encode(format!("Encoder task failed: {e}")))?
    }

    fn name(&self) -> &str {
        "gif"
    }
}

/// GIF frame delay in hundredths of a second, at least 1.
pub fn delay_centiseconds(delay_ms: u32) -> u16 {
    let cs = (delay_ms as u64 + 5) / 10;
    cs.clamp(1, u16::MAX as u64) as u16
}

fn encode_gif(
    settings: &EncoderSettings,
    frames: Vec<(RgbaImage, FrameOptions)>,
    progress: &mpsc::UnboundedSender<f64>,
) -> FlipbookResult<Vec<u8>> {
    let total = frames.len();
    let width = settings.width as u16;
    let height = settings.height as u16;
    let speed = settings.quality.clamp(1, 30) as i32;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.workers.max(1))
        .thread_name(|i| format!("gif-quantize-{i}"))
        .build()
        .map_err(|e| FlipbookError::encode(format!("Failed to start encoder workers: {e}")))?;

    let quantized_count = AtomicUsize::new(0);
    let quantized: Vec<gif::Frame<'static>> = pool.install(|| {
        frames
            .into_par_iter()
            .map(|(mut rgba, options)| {
                let mut frame = gif::Frame::from_rgba_speed(width, height, &mut rgba, speed);
                frame.delay = delay_centiseconds(options.delay_ms);
                let done = quantized_count.fetch_add(1, Ordering::SeqCst) + 1;
                let _ = progress.send(QUANTIZE_SHARE * done as f64 / total as f64);
                frame
            })
            .collect()
    });

    let encode_err = |e: gif::EncodingError| FlipbookError::encode(e.to_string());
    let mut encoder = gif::Encoder::new(Vec::new(), width, height, &[]).map_err(encode_err)?;
    match settings.repeat {
        LoopCount::Forever => encoder.set_repeat(gif::Repeat::Infinite).map_err(encode_err)?,
        LoopCount::Times(n) => encoder.set_repeat(gif::Repeat::Finite(n)).map_err(encode_err)?,
        LoopCount::Once => {}
    }

    for (i, frame) in quantized.iter().enumerate() {
        encoder.write_frame(frame).map_err(encode_err)?;
        let written = (i + 1) as f64 / total as f64;
        let _ = progress.send(QUANTIZE_SHARE + (1.0 - QUANTIZE_SHARE) * written);
    }

    let bytes = encoder.into_inner()?;
    tracing::debug!(bytes = bytes.len(), frames = total, "GIF written");
    Ok(bytes)
}
