//! Cycle through frames, printing the status line.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use flipbook_common::config::AppConfig;
use flipbook_editor::Editor;
use flipbook_render_engine::PreviewStatus;

pub async fn run(
    config: AppConfig,
    files: Vec<PathBuf>,
    duration: Option<String>,
    seconds: Option<f64>,
) -> anyhow::Result<()> {
    let mut editor = Editor::new(&config)?.with_status_observer(Arc::new(|status: &PreviewStatus| {
        print!("\r  {status}          ");
        let _ = std::io::stdout().flush();
    }));

    let ids = editor.add_paths(&files)?;
    if let Some(duration) = duration {
        editor.apply_duration_to_all(duration.as_str());
    }
    if !editor.play() {
        println!("No frames");
        return Ok(());
    }
    println!("Playing {} frame(s). Press Ctrl-C to stop.", ids.len());

    let limit = async {
        match seconds {
            Some(secs) => {
                tokio::time::sleep(Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)).await
            }
            None => std::future::pending::<()>().await,
        }
    };
    let finished = async {
        while editor.is_playing() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = limit => {}
        _ = finished => {}
    }

    editor.stop();
    println!();
    tracing::info!("Playback finished");
    Ok(())
}
