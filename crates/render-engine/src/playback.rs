//! Playback scheduler.
//!
//! Cycles the preview through the sequence, holding each frame for its own
//! duration. The loop runs as a tokio task and suspends with a timer between
//! frames; [`PlaybackScheduler::stop`] wakes a pending suspension at once.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use flipbook_common::error::FlipbookResult;

use crate::preview::{PreviewStatus, ShownFrame};

/// Whatever the playback loop draws on.
///
/// Implementations lock their own state for the duration of a call; the
/// loop never holds a lock across a suspension.
pub trait PlaybackSurface: Send + Sync + 'static {
    /// Number of frames currently in the sequence.
    fn frame_count(&self) -> usize;

    /// Draw the frame at `index` (wrapped to the current length).
    /// Returns `None` if the sequence is empty.
    fn show_frame(&self, index: usize) -> FlipbookResult<Option<ShownFrame>>;

    /// Clear the surface to its background.
    fn clear(&self);
}

/// Called with every status the loop shows.
pub type StatusObserver = Arc<dyn Fn(&PreviewStatus) + Send + Sync>;

struct PlaybackShared {
    playing: AtomicBool,
    generation: AtomicU64,
    wake: Notify,
}

/// Starts and stops the playback loop.
pub struct PlaybackScheduler {
    shared: Arc<PlaybackShared>,
    observer: Option<StatusObserver>,
}

impl PlaybackScheduler {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(PlaybackShared {
                playing: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                wake: Notify::new(),
            }),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: StatusObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::SeqCst)
    }

    /// Start looping from the first frame.
    ///
    /// Returns `false` without doing anything if the sequence is empty or
    /// playback is already running. Must be called inside a tokio runtime.
    pub fn play<S: PlaybackSurface>(&self, surface: Arc<S>) -> bool {
        if surface.frame_count() == 0 {
            tracing::debug!("Play ignored: no frames");
            return false;
        }
        if self
            .shared
            .playing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(frames = surface.frame_count(), generation, "Playback started");
        tokio::spawn(run_loop(
            Arc::clone(&self.shared),
            surface,
            generation,
            self.observer.clone(),
        ));
        true
    }

    /// Stop playback. Safe to call when already stopped.
    ///
    /// Returns whether playback was running.
    pub fn stop(&self) -> bool {
        let was_playing = self.shared.playing.swap(false, Ordering::SeqCst);
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.shared.wake.notify_waiters();
        if was_playing {
            tracing::info!("Playback stopped");
        }
        was_playing
    }

    /// Stop if playing, otherwise play. Returns the new playing state.
    pub fn toggle<S: PlaybackSurface>(&self, surface: Arc<S>) -> bool {
        if self.stop() {
            false
        } else {
            self.play(surface)
        }
    }
}

impl Default for PlaybackScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PlaybackScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for PlaybackScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackScheduler")
            .field("playing", &self.is_playing())
            .field("generation", &self.shared.generation.load(Ordering::SeqCst))
            .finish()
    }
}

async fn run_loop<S: PlaybackSurface>(
    shared: Arc<PlaybackShared>,
    surface: Arc<S>,
    generation: u64,
    observer: Option<StatusObserver>,
) {
    let mut index = 0usize;
    loop {
        // Registered before the generation check so a stop in between
        // still wakes the sleep below.
        let stopped = shared.wake.notified();
        if shared.generation.load(Ordering::SeqCst) != generation {
            return;
        }

        let shown = match surface.show_frame(index) {
            Ok(Some(shown)) => shown,
            Ok(None) => {
                surface.clear();
                finish(&shared, generation);
                tracing::info!("Playback stopped: sequence is empty");
                return;
            }
            Err(err) => {
                finish(&shared, generation);
                tracing::error!(error = %err, index, "Playback stopped: frame could not be drawn");
                return;
            }
        };

        if let Some(observer) = &observer {
            observer(&shown.status);
        }

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(shown.duration_ms as u64)) => {}
            _ = stopped => {}
        }
        index = shown.index + 1;
    }
}

/// Mark playback stopped, unless a newer run has taken over.
fn finish(shared: &PlaybackShared, generation: u64) {
    if shared
        .generation
        .compare_exchange(generation, generation + 1, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
    {
        shared.playing.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use flipbook_frame_model::FrameId;

    use super::*;

    /// Surface that records which frames it was asked to show.
    struct FakeSurface {
        durations: Mutex<Vec<u32>>,
        shown: Mutex<Vec<usize>>,
        cleared: AtomicBool,
    }

    impl FakeSurface {
        fn new(durations: Vec<u32>) -> Arc<Self> {
            Arc::new(Self {
                durations: Mutex::new(durations),
                shown: Mutex::new(Vec::new()),
                cleared: AtomicBool::new(false),
            })
        }

        fn shown(&self) -> Vec<usize> {
            self.shown.lock().unwrap().clone()
        }
    }

    impl PlaybackSurface for FakeSurface {
        fn frame_count(&self) -> usize {
            self.durations.lock().unwrap().len()
        }

        fn show_frame(&self, index: usize) -> FlipbookResult<Option<ShownFrame>> {
            let durations = self.durations.lock().unwrap();
            if durations.is_empty() {
                return Ok(None);
            }
            let index = index % durations.len();
            self.shown.lock().unwrap().push(index);
            Ok(Some(ShownFrame {
                index,
                frame: FrameId::from_raw(index as u64 + 1),
                duration_ms: durations[index],
                status: PreviewStatus::Showing {
                    index: index + 1,
                    total: durations.len(),
                    name: format!("{index}.png"),
                    duration_ms: durations[index],
                },
            }))
        }

        fn clear(&self) {
            self.cleared.store(true, Ordering::SeqCst);
        }
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_frames_follow_their_durations() {
        let surface = FakeSurface::new(vec![100, 200, 50]);
        let playback = PlaybackScheduler::new();

        assert!(playback.play(Arc::clone(&surface)));
        advance(1).await;
        assert_eq!(surface.shown(), vec![0]);

        advance(100).await;
        assert_eq!(surface.shown(), vec![0, 1]);

        advance(200).await;
        assert_eq!(surface.shown(), vec![0, 1, 2]);

        advance(50).await;
        assert_eq!(surface.shown(), vec![0, 1, 2, 0]);
        assert!(playback.is_playing());
        playback.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_wakes_pending_sleep() {
        let surface = FakeSurface::new(vec![10_000]);
        let playback = PlaybackScheduler::new();
        playback.play(Arc::clone(&surface));
        advance(1).await;

        assert!(playback.stop());
        assert!(!playback.stop());
        advance(20_000).await;
        assert_eq!(surface.shown(), vec![0]);
        assert!(!playback.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_is_noop_when_empty_or_running() {
        let playback = PlaybackScheduler::new();
        assert!(!playback.play(FakeSurface::new(vec![])));

        let surface = FakeSurface::new(vec![100]);
        assert!(playback.play(Arc::clone(&surface)));
        assert!(!playback.play(Arc::clone(&surface)));
        playback.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_never_runs_two_loops() {
        let surface = FakeSurface::new(vec![100, 100]);
        let playback = PlaybackScheduler::new();

        playback.play(Arc::clone(&surface));
        playback.stop();
        playback.play(Arc::clone(&surface));
        advance(1).await;
        assert_eq!(surface.shown(), vec![0]);

        advance(100).await;
        assert_eq!(surface.shown(), vec![0, 1]);
        playback.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_emptied_sequence_stops_and_clears() {
        let surface = FakeSurface::new(vec![100, 100]);
        let playback = PlaybackScheduler::new();
        playback.play(Arc::clone(&surface));
        advance(1).await;

        surface.durations.lock().unwrap().clear();
        advance(150).await;
        assert!(!playback.is_playing());
        assert!(surface.cleared.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_sees_each_status() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let playback = PlaybackScheduler::new().with_observer(Arc::new(move |status: &PreviewStatus| {
            sink.lock().unwrap().push(status.to_string());
        }));

        playback.play(FakeSurface::new(vec![30, 40]));
        advance(35).await;
        playback.stop();

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["1 / 2: 0.png - 30 ms".to_string(), "2 / 2: 1.png - 40 ms".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle() {
        let surface = FakeSurface::new(vec![100]);
        let playback = PlaybackScheduler::new();
        assert!(playback.toggle(Arc::clone(&surface)));
        assert!(!playback.toggle(Arc::clone(&surface)));
        assert!(!playback.is_playing());
    }
}
