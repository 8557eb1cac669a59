//! Export configuration and job management.

use std::path::{Path, PathBuf};
use std::time::Instant;

use image::RgbaImage;

use flipbook_common::config::{AppConfig, LoopCount};
use flipbook_common::error::{FlipbookError, FlipbookResult};
use flipbook_frame_model::{FrameRecord, Size};

use crate::color::BackgroundColor;
use crate::compositor::{draw_fitted, verify_compositions, FrameComposition, VerificationSummary};
use crate::encoder::{EncoderFactory, EncoderSettings, FrameOptions};

/// Largest width or height an export may rasterize at.
pub const MAX_OUTPUT_SIDE: u32 = 8192;

/// An export job: everything but the frames themselves.
#[derive(Debug, Clone)]
pub struct ExportJob {
    /// Size of the preview surface the export mirrors.
    pub surface: Size,

    /// Output size as a multiple of `surface`.
    pub scale: f64,

    pub background: BackgroundColor,

    /// Encoder worker threads.
    pub workers: usize,

    /// Encoder quality (1 = best, 30 = fastest).
    pub quality: u8,

    pub repeat: LoopCount,

    /// Name given to the produced artifact.
    pub file_name: String,
}

impl ExportJob {
    /// Build a job from the preview and export sections of the config.
    pub fn from_config(config: &AppConfig) -> FlipbookResult<Self> {
        Ok(Self {
            surface: Size::new(config.preview.width, config.preview.height),
            scale: config.export.scale,
            background: BackgroundColor::parse(&config.preview.background)?,
            workers: config.export.workers,
            quality: config.export.quality,
            repeat: config.export.repeat,
            file_name: config.export.file_name.clone(),
        })
    }

    /// Pixel size of every exported frame.
    pub fn output_size(&self) -> Size {
        self.surface.scaled(self.scale)
    }

    fn encoder_settings(&self) -> EncoderSettings {
        let size = self.output_size();
        EncoderSettings {
            workers: self.workers.max(1),
            quality: self.quality,
            width: size.width,
            height: size.height,
            repeat: self.repeat,
        }
    }
}

impl Default for ExportJob {
    fn default() -> Self {
        // Default config always carries a valid background.
        Self::from_config(&AppConfig::default()).unwrap_or_else(|_| Self {
            surface: Size::new(600, 1100),
            scale: 1.0,
            background: BackgroundColor::WHITE,
            workers: 2,
            quality: 10,
            repeat: LoopCount::Forever,
            file_name: "export.gif".to_string(),
        })
    }
}

/// Progress callback for export rendering.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send + Sync>;

/// Export progress report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportProgress {
    /// Current stage.
    pub stage: ExportStage,

    /// Seconds since the export started.
    pub elapsed_secs: f64,
}

/// Stages of the export process. Every export ends with `Done` or
/// `Failed` followed by `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Idle,
    /// `index` frames of `total` have been handed to the encoder.
    Rasterizing { index: usize, total: usize },
    Encoding { percent: u8 },
    Done,
    Failed,
}

/// The finished animated image.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub frame_count: usize,
    /// Sum of frame delays in milliseconds.
    pub duration_ms: u64,
    pub report: VerificationSummary,
}

impl ExportArtifact {
    /// Write the artifact into `dir` under its file name.
    pub fn save(&self, dir: &Path) -> FlipbookResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        self.write_to(&path)?;
        Ok(path)
    }

    /// Write the artifact to an explicit path.
    pub fn write_to(&self, path: &Path) -> FlipbookResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &self.bytes)?;
        tracing::info!(path = %path.display(), bytes = self.bytes.len(), "Wrote export artifact");
        Ok(())
    }

    /// JSON description of the artifact and its placement check.
    pub fn report_json(&self) -> FlipbookResult<String> {
        let report = serde_json::json!({
            "file_name": self.file_name,
            "media_type": self.media_type,
            "bytes": self.bytes.len(),
            "width": self.width,
            "height": self.height,
            "frame_count": self.frame_count,
            "duration_ms": self.duration_ms,
            "verification": self.report,
            "status": if self.report.is_clean() { "ok" } else { "warn" },
        });
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

struct ProgressReporter {
    callback: Option<ProgressCallback>,
    started: Instant,
}

impl ProgressReporter {
    fn emit(&self, stage: ExportStage) {
        if let Some(cb) = &self.callback {
            cb(ExportProgress {
                stage,
                elapsed_secs: self.started.elapsed().as_secs_f64(),
            });
        }
    }
}

/// Export `frames` to an animated image.
///
/// `frames` is a snapshot taken by the caller; the live store is never
/// touched. Frames are rasterized one at a time with a cooperative yield
/// between them, then handed to the encoder in sequence order.
pub async fn export_frames(
    frames: Vec<FrameRecord>,
    job: &ExportJob,
    factory: &dyn EncoderFactory,
    progress: Option<ProgressCallback>,
) -> FlipbookResult<ExportArtifact> {
    if frames.is_empty() {
        return Err(FlipbookError::NothingToExport);
    }

    let reporter = ProgressReporter {
        callback: progress,
        started: Instant::now(),
    };
    let size = job.output_size();
    tracing::info!(
        frames = frames.len(),
        width = size.width,
        height = size.height,
        workers = job.workers,
        quality = job.quality,
        "Starting export"
    );

    let result = match run_export(&frames, job, factory, &reporter).await {
        Ok(artifact) => {
            reporter.emit(ExportStage::Done);
            tracing::info!(
                elapsed_secs = reporter.started.elapsed().as_secs_f64(),
                bytes = artifact.bytes.len(),
                "Export finished"
            );
            Ok(artifact)
        }
        Err(err) => {
            reporter.emit(ExportStage::Failed);
            tracing::error!(error = %err, "Export failed");
            Err(err)
        }
    };
    reporter.emit(ExportStage::Idle);
    result
}

async fn run_export(
    frames: &[FrameRecord],
    job: &ExportJob,
    factory: &dyn EncoderFactory,
    reporter: &ProgressReporter,
) -> FlipbookResult<ExportArtifact> {
    let settings = job.encoder_settings();
    if settings.width > MAX_OUTPUT_SIDE || settings.height > MAX_OUTPUT_SIDE {
        return Err(FlipbookError::unsupported(format!(
            "Output size {}x{} exceeds {MAX_OUTPUT_SIDE} pixels per side; lower the scale",
            settings.width, settings.height
        )));
    }
    let mut encoder = factory.create(&settings)?;
    tracing::debug!(encoder = encoder.name(), "Encoder ready");

    let total = frames.len();
    let mut compositions = Vec::with_capacity(total);
    for (frame_index, record) in frames.iter().enumerate() {
        let bitmap = record.decoded()?;
        let mut canvas = RgbaImage::new(settings.width, settings.height);
        let placement = draw_fitted(&mut canvas, &bitmap, job.background);
        compositions.push(FrameComposition {
            frame_index,
            frame: record.id(),
            placement,
            delay_ms: record.duration_ms(),
        });

        encoder.add_frame(
            canvas,
            FrameOptions {
                delay_ms: record.duration_ms(),
            },
        )?;
        tokio::task::yield_now().await;
        reporter.emit(ExportStage::Rasterizing {
            index: frame_index + 1,
            total,
        });
    }

    let summary = verify_compositions(&compositions, Size::new(settings.width, settings.height));
    if !summary.is_clean() {
        tracing::warn!(
            out_of_bounds = summary.out_of_bounds,
            off_center = summary.off_center,
            "Placement verification found misplaced frames"
        );
    }

    let mut last_percent = None;
    let bytes = encoder
        .render(&mut |fraction: f64| {
            let percent = (fraction.clamp(0.0, 1.0) * 100.0).round() as u8;
            if last_percent != Some(percent) {
                last_percent = Some(percent);
                reporter.emit(ExportStage::Encoding { percent });
            }
        })
        .await?;

    Ok(ExportArtifact {
        file_name: job.file_name.clone(),
        media_type: factory.media_type().to_string(),
        bytes,
        width: settings.width,
        height: settings.height,
        frame_count: total,
        duration_ms: compositions.iter().map(|c| c.delay_ms as u64).sum(),
        report: summary,
    })
}
