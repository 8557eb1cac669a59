//! Editor session.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use flipbook_common::config::AppConfig;
use flipbook_common::error::{FlipbookError, FlipbookResult};
use flipbook_frame_model::{Confirmation, DurationInput, FrameId, FrameStore, ImageSource};
use flipbook_interaction::{
    GestureMachine, GestureOutcome, Key, KeyAction, KeyBindings, KeyResponse, ListEntry,
    PointerEvent, ReorderMode,
};
use flipbook_render_engine::{
    export_frames, BackgroundColor, EncoderFactory, ExportArtifact, ExportJob, GifEncoderFactory,
    PlaybackScheduler, PreviewRenderer, PreviewStatus, ProgressCallback, StatusObserver,
};

use crate::workspace::{SharedWorkspace, Workspace};

/// Clears the exporting flag when an export ends, however it ends.
struct ExportGuard<'a>(&'a AtomicBool);

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// One editing session.
///
/// Playback and export never run at the same time: exporting while
/// playing is refused with [`FlipbookError::Busy`], and play requests
/// during an export are ignored.
pub struct Editor {
    workspace: Arc<SharedWorkspace>,
    gestures: GestureMachine,
    keys: KeyBindings,
    playback: PlaybackScheduler,
    /// Held while checking and entering playback or export.
    transitions: Mutex<()>,
    exporting: AtomicBool,
    export_job: ExportJob,
    factory: Arc<dyn EncoderFactory>,
}

impl Editor {
    /// Session that exports GIFs.
    pub fn new(config: &AppConfig) -> FlipbookResult<Self> {
        Self::with_factory(config, Arc::new(GifEncoderFactory))
    }

    pub fn with_factory(config: &AppConfig, factory: Arc<dyn EncoderFactory>) -> FlipbookResult<Self> {
        let workspace = Workspace {
            store: FrameStore::new(&config.editor),
            preview: PreviewRenderer::from_config(&config.preview)?,
        };
        Ok(Self {
            workspace: Arc::new(SharedWorkspace::new(workspace)),
            gestures: GestureMachine::default(),
            keys: KeyBindings::default(),
            playback: PlaybackScheduler::new(),
            transitions: Mutex::new(()),
            exporting: AtomicBool::new(false),
            export_job: ExportJob::from_config(config)?,
            factory,
        })
    }

    /// Switch between selection-aware and legacy reordering.
    pub fn with_reorder_mode(mut self, mode: ReorderMode) -> Self {
        self.gestures = GestureMachine::new(mode);
        self
    }

    /// Receive every status shown during playback.
    pub fn with_status_observer(mut self, observer: StatusObserver) -> Self {
        self.playback.stop();
        self.playback = PlaybackScheduler::new().with_observer(observer);
        self
    }

    pub fn workspace(&self) -> Arc<SharedWorkspace> {
        Arc::clone(&self.workspace)
    }

    pub fn status(&self) -> PreviewStatus {
        self.workspace.lock().preview.status().clone()
    }

    pub fn frame_ids(&self) -> Vec<FrameId> {
        self.workspace.lock().store.ids()
    }

    pub fn selected_ids(&self) -> Vec<FrameId> {
        self.workspace.lock().store.selected_ids()
    }

    pub fn export_job(&self) -> &ExportJob {
        &self.export_job
    }

    pub fn export_job_mut(&mut self) -> &mut ExportJob {
        &mut self.export_job
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::SeqCst)
    }

    /// Append image sources and show the first frame of the sequence.
    pub fn add_frames<I>(&mut self, sources: I) -> Vec<FrameId>
    where
        I: IntoIterator<Item = ImageSource>,
    {
        let mut guard = self.workspace.lock();
        let Workspace { store, preview } = &mut *guard;
        let added = store.add_frames(sources);
        if !added.is_empty() {
            if let Err(err) = preview.show_at(store, 0) {
                tracing::warn!(error = %err, "Could not preview first frame");
            }
        }
        added
    }

    /// Read files from disk and append the images among them.
    pub fn add_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> FlipbookResult<Vec<FrameId>> {
        let sources = paths
            .iter()
            .map(|p| ImageSource::from_path(p.as_ref()))
            .collect::<FlipbookResult<Vec<_>>>()?;
        Ok(self.add_frames(sources))
    }

    /// Remove one frame; the preview is cleared once the sequence is empty.
    pub fn remove_frame(&mut self, id: FrameId) -> bool {
        let mut guard = self.workspace.lock();
        let removed = guard.store.remove_frame(id).is_some();
        if removed && guard.store.is_empty() {
            guard.preview.clear();
        }
        removed
    }

    /// Remove every frame after asking `confirm` (with the frame count).
    ///
    /// Nothing is asked when the sequence is already empty. The workspace
    /// is not locked while `confirm` runs; if the sequence changed size in
    /// the meantime nothing is removed.
    pub fn remove_all<F>(&mut self, confirm: F) -> usize
    where
        F: FnOnce(usize) -> Confirmation,
    {
        let asked = self.workspace.lock().store.len();
        if asked == 0 {
            return 0;
        }
        let answer = confirm(asked);

        let mut guard = self.workspace.lock();
        if guard.store.len() != asked {
            tracing::debug!(
                asked,
                now = guard.store.len(),
                "Sequence changed during prompt; clear skipped"
            );
            return 0;
        }
        let removed = guard.store.remove_all(answer);
        if removed > 0 {
            guard.preview.clear();
        }
        removed
    }

    pub fn set_duration(&mut self, id: FrameId, input: impl Into<DurationInput>) -> Option<u32> {
        self.workspace.lock().store.set_duration(id, input)
    }

    pub fn apply_duration_to_all(&mut self, input: impl Into<DurationInput>) -> u32 {
        self.workspace.lock().store.apply_duration_to_all(input)
    }

    /// Feed a pointer event to the gesture engine.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> GestureOutcome {
        let mut guard = self.workspace.lock();
        let Workspace { store, preview } = &mut *guard;
        let outcome = self.gestures.handle(store, event);
        if let GestureOutcome::Preview(id) = outcome {
            if let Err(err) = preview.render(store, id) {
                tracing::warn!(frame = %id, error = %err, "Could not preview frame");
            }
        }
        outcome
    }

    /// What a list view should show right now (placeholder included).
    pub fn visual_list(&self) -> Vec<ListEntry> {
        self.gestures.visual_list(&self.workspace.lock().store)
    }

    /// Resolve a key press and run its action.
    pub fn handle_key(&mut self, key: Key) -> Option<KeyResponse> {
        let response = self.keys.resolve(key)?;
        match response.action {
            KeyAction::TogglePlayback => {
                if self.is_playing() {
                    self.stop();
                } else {
                    self.play();
                }
            }
            KeyAction::ExitFocus => {}
        }
        Some(response)
    }

    /// Commit a new background color. The surface is cleared right away
    /// unless playback is running; the next drawn frame uses it either way.
    pub fn set_background(&mut self, color: &str) -> FlipbookResult<()> {
        let background = BackgroundColor::parse(color)?;
        self.export_job.background = background;
        let mut guard = self.workspace.lock();
        guard.preview.set_background(background);
        if !self.playback.is_playing() {
            guard.preview.clear();
        }
        Ok(())
    }

    /// Start playback from the first frame. Ignored while exporting.
    pub fn play(&self) -> bool {
        let _transition = self.transitions.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_exporting() {
            tracing::debug!("Play ignored: export in progress");
            return false;
        }
        self.playback.play(Arc::clone(&self.workspace))
    }

    pub fn stop(&self) -> bool {
        self.playback.stop()
    }

    /// Export the current sequence.
    ///
    /// The sequence is snapshotted up front, so edits made while the export
    /// runs do not affect the result.
    pub async fn export(&self, progress: Option<ProgressCallback>) -> FlipbookResult<ExportArtifact> {
        let _guard = {
            let _transition = self.transitions.lock().unwrap_or_else(PoisonError::into_inner);
            if self.is_playing() {
                return Err(FlipbookError::busy("Stop playback before exporting"));
            }
            if self
                .exporting
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return Err(FlipbookError::busy("An export is already running"));
            }
            ExportGuard(&self.exporting)
        };

        let snapshot = self.workspace.lock().store.snapshot();
        export_frames(snapshot, &self.export_job, self.factory.as_ref(), progress).await
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("frames", &self.workspace.lock().store.len())
            .field("playing", &self.is_playing())
            .field("exporting", &self.is_exporting())
            .field("mode", &self.gestures.mode())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::Duration;

    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    use flipbook_interaction::Modifiers;
    use flipbook_render_engine::ExportProgress;

    use super::*;

    fn png(name: &str) -> ImageSource {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255])))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        ImageSource::new(name, "image/png", bytes)
    }

    fn editor_with(n: usize) -> (Editor, Vec<FrameId>) {
        let mut config = AppConfig::default();
        config.preview.width = 20;
        config.preview.height = 20;
        let mut editor = Editor::new(&config).unwrap();
        let ids = editor.add_frames((0..n).map(|i| png(&format!("{i}.png"))));
        (editor, ids)
    }

    #[test]
    fn test_add_shows_first_frame() {
        let (editor, _) = editor_with(3);
        assert_eq!(editor.status().to_string(), "1 / 3: 0.png - 300 ms");
    }

    #[test]
    fn test_remove_last_frame_clears_preview() {
        let (mut editor, ids) = editor_with(1);
        assert!(editor.remove_frame(ids[0]));
        assert_eq!(editor.status(), PreviewStatus::Empty);
        assert!(!editor.remove_frame(ids[0]));
    }

    #[test]
    fn test_remove_all_skips_prompt_when_empty() {
        let (mut editor, _) = editor_with(0);
        let removed = editor.remove_all(|_| panic!("prompt shown for empty sequence"));
        assert_eq!(removed, 0);

        let (mut editor, _) = editor_with(2);
        assert_eq!(editor.remove_all(|_| Confirmation::Declined), 0);
        assert_eq!(editor.frame_ids().len(), 2);
        assert_eq!(editor.remove_all(|n| Confirmation::from(n == 2)), 2);
        assert_eq!(editor.status().to_string(), "No frames");
    }

    #[test]
    fn test_remove_all_prompt_runs_unlocked() {
        let (mut editor, _) = editor_with(2);
        let workspace = editor.workspace();
        let removed = editor.remove_all(|n| {
            let (tx, rx) = std::sync::mpsc::channel();
            let workspace = Arc::clone(&workspace);
            std::thread::spawn(move || {
                let _ = tx.send(workspace.lock().store.len());
            });
            let seen = rx.recv_timeout(Duration::from_secs(2));
            Confirmation::from(seen == Ok(n))
        });
        assert_eq!(removed, 2);
        assert!(editor.frame_ids().is_empty());
    }

    #[test]
    fn test_remove_all_skips_when_sequence_changes_during_prompt() {
        let (mut editor, ids) = editor_with(3);
        let workspace = editor.workspace();
        let removed = editor.remove_all(|_| {
            workspace.lock().store.remove_frame(ids[0]);
            Confirmation::Confirmed
        });
        assert_eq!(removed, 0);
        assert_eq!(editor.frame_ids(), vec![ids[1], ids[2]]);
    }

    #[test]
    fn test_click_previews_frame() {
        let (mut editor, ids) = editor_with(3);
        editor.handle_pointer(PointerEvent::PointerDown {
            id: ids[2],
            modifiers: Modifiers::NONE,
        });
        let outcome = editor.handle_pointer(PointerEvent::PointerUp);
        assert_eq!(outcome, GestureOutcome::Preview(ids[2]));
        assert_eq!(editor.status().to_string(), "3 / 3: 2.png - 300 ms");
        assert_eq!(editor.selected_ids(), vec![ids[2]]);
    }

    #[test]
    fn test_durations_go_through_policy() {
        let (mut editor, ids) = editor_with(2);
        assert_eq!(editor.set_duration(ids[0], "3"), Some(10));
        assert_eq!(editor.set_duration(ids[0], "x"), Some(100));
        assert_eq!(editor.apply_duration_to_all(250i64), 250);
    }

    #[test]
    fn test_bad_background_is_rejected() {
        let (mut editor, _) = editor_with(1);
        assert!(editor.set_background("#zzz").is_err());
        editor.set_background("#000").unwrap();
        assert_eq!(editor.status(), PreviewStatus::Empty);
        assert_eq!(editor.export_job().background, BackgroundColor::BLACK);
    }

    #[tokio::test(start_paused = true)]
    async fn test_space_toggles_playback() {
        let (mut editor, _) = editor_with(2);
        let response = editor.handle_key(Key::Space).unwrap();
        assert!(response.prevent_default);
        assert!(editor.is_playing());

        tokio::time::sleep(Duration::from_millis(310)).await;
        assert_eq!(editor.status().to_string(), "2 / 2: 1.png - 300 ms");

        editor.handle_key(Key::Space);
        assert!(!editor.is_playing());
        assert!(editor.handle_key(Key::Char('x')).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_refused_while_playing() {
        let (editor, _) = editor_with(2);
        assert!(editor.play());
        let err = editor.export(None).await.unwrap_err();
        assert!(matches!(err, FlipbookError::Busy { .. }));
        assert!(err.is_blocking_notice());
        editor.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_change_while_playing_keeps_surface() {
        let (mut editor, _) = editor_with(2);
        editor.play();
        tokio::time::sleep(Duration::from_millis(1)).await;
        editor.set_background("#000").unwrap();
        assert_eq!(editor.status().to_string(), "1 / 2: 0.png - 300 ms");
        editor.stop();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_play_and_export_never_overlap() {
        let (editor, _) = editor_with(2);
        let editor = Arc::new(editor);

        for _ in 0..20 {
            let overlaps = Arc::new(AtomicBool::new(false));
            let (flag, watched) = (Arc::clone(&overlaps), Arc::clone(&editor));
            let exporter = Arc::clone(&editor);
            let export = tokio::spawn(async move {
                exporter
                    .export(Some(Box::new(move |_: ExportProgress| {
                        if watched.is_playing() {
                            flag.store(true, Ordering::SeqCst);
                        }
                    })))
                    .await
            });
            let player = Arc::clone(&editor);
            let play = tokio::spawn(async move { player.play() });

            let played = play.await.unwrap();
            let exported = export.await.unwrap();
            assert!(!overlaps.load(Ordering::SeqCst));
            if played && exported.is_err() {
                assert!(matches!(exported, Err(FlipbookError::Busy { .. })));
            }
            editor.stop();
        }
    }

    #[tokio::test]
    async fn test_export_empty_sequence() {
        let (editor, _) = editor_with(0);
        let err = editor.export(None).await.unwrap_err();
        assert!(matches!(err, FlipbookError::NothingToExport));
        assert!(!editor.is_exporting());
    }
}
