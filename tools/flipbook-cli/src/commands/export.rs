//! Export frames to an animated GIF.

use std::io::Write;
use std::path::PathBuf;

use flipbook_common::config::{AppConfig, LoopCount};
use flipbook_editor::Editor;
use flipbook_render_engine::{ExportProgress, ExportStage, ProgressCallback};

/// Command-line overrides for the configured export settings.
#[derive(Debug, Default)]
pub struct ExportOverrides {
    pub scale: Option<f64>,
    pub duration: Option<String>,
    pub background: Option<String>,
    pub quality: Option<u8>,
    pub workers: Option<usize>,
    pub repeat: Option<LoopCount>,
}

impl ExportOverrides {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(scale) = self.scale {
            config.export.scale = scale;
        }
        if let Some(background) = &self.background {
            config.preview.background = background.clone();
        }
        if let Some(quality) = self.quality {
            config.export.quality = quality;
        }
        if let Some(workers) = self.workers {
            config.export.workers = workers;
        }
        if let Some(repeat) = self.repeat {
            config.export.repeat = repeat;
        }
    }
}

pub async fn run(
    mut config: AppConfig,
    files: Vec<PathBuf>,
    output: Option<PathBuf>,
    overrides: ExportOverrides,
    report: bool,
) -> anyhow::Result<()> {
    overrides.apply(&mut config);

    let mut editor = Editor::new(&config)?;
    let ids = editor.add_paths(&files)?;
    if ids.len() < files.len() {
        println!("Skipped {} non-image file(s)", files.len() - ids.len());
    }
    if let Some(duration) = &overrides.duration {
        let applied = editor.apply_duration_to_all(duration.as_str());
        println!("Frame duration: {applied} ms");
    }

    let job = editor.export_job();
    let size = job.output_size();
    println!("Exporting {} frame(s)", ids.len());
    println!("  Resolution: {}x{}", size.width, size.height);
    println!("  Quality: {} ({} worker(s))", job.quality, job.workers);
    println!("  Loop: {:?}", job.repeat);

    let progress_cb: ProgressCallback = Box::new(|p: ExportProgress| {
        match p.stage {
            ExportStage::Rasterizing { index, total } => {
                print!("\r  Rasterizing frame {index} / {total}          ");
            }
            ExportStage::Encoding { percent } => {
                print!("\r  Encoding GIF - {percent}%                 ");
            }
            _ => {}
        }
        let _ = std::io::stdout().flush();
    });

    let artifact = match editor.export(Some(progress_cb)).await {
        Ok(artifact) => artifact,
        Err(e) if e.is_blocking_notice() => {
            println!("{e}");
            return Ok(());
        }
        Err(e) => {
            println!("\nExport failed: {e}");
            return Err(e.into());
        }
    };

    let path = match output {
        Some(path) => {
            artifact.write_to(&path)?;
            path
        }
        None => artifact.save(&std::env::current_dir()?)?,
    };
    println!("\nExport complete: {}", path.display());
    println!(
        "  {} frame(s), {} ms per loop, {} bytes",
        artifact.frame_count,
        artifact.duration_ms,
        artifact.bytes.len()
    );

    if !artifact.report.is_clean() {
        println!(
            "  Warning: {} frame(s) out of bounds, {} off center",
            artifact.report.out_of_bounds, artifact.report.off_center
        );
    }
    if report {
        let report_path = path.with_extension("report.json");
        std::fs::write(&report_path, artifact.report_json()?)?;
        println!("  Report: {}", report_path.display());
    }

    Ok(())
}
