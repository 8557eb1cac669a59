//! List frames, sizes and durations.

use std::path::PathBuf;

use flipbook_common::config::AppConfig;
use flipbook_frame_model::{FrameStore, ImageSource};

pub fn run(config: AppConfig, files: Vec<PathBuf>) -> anyhow::Result<()> {
    let sources = files
        .iter()
        .map(|path| ImageSource::from_path(path))
        .collect::<Result<Vec<_>, _>>()?;

    let mut store = FrameStore::new(&config.editor);
    let added = store.add_frames(sources);
    let skipped = files.len() - added.len();

    println!("Frames: {}", store.len());
    if skipped > 0 {
        println!("  Skipped {skipped} non-image file(s)");
    }
    println!();

    let mut unreadable = 0;
    for (i, frame) in store.iter().enumerate() {
        let dimensions = match frame.decoded() {
            Ok(bitmap) => format!("{}x{}", bitmap.width(), bitmap.height()),
            Err(e) => {
                unreadable += 1;
                format!("unreadable ({e})")
            }
        };
        println!(
            "  {:>3}. {} [{}] {} - {} ms",
            i + 1,
            frame.name(),
            frame.size_label(),
            dimensions,
            frame.duration_ms()
        );
    }

    println!();
    println!(
        "Preview surface: {}x{} ({})",
        config.preview.width, config.preview.height, config.preview.background
    );
    println!("Loop duration: {} ms", store.total_duration_ms());
    if unreadable > 0 {
        println!("Warning: {unreadable} frame(s) cannot be decoded and will fail export");
    }
    Ok(())
}
