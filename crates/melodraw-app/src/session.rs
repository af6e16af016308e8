//! Session state: the board plus the collaborators the shell owns.

use crate::config::AppConfig;
use crate::share::{ShareBuffer, ShareSink, SharedImage};
use crate::ui::{Controls, UiAction};
use melodraw_core::{
    AssetCuePlayer, Board, CuePlayer, GestureEvent, LogCueSink, NullCuePlayer, RandomColors,
    StrokeStarted, play_cue_or_log,
};
use melodraw_render::{
    CpuRasterizer, DisplayList, DrawCommand, Rasterizer, RenderContext, RenderStyle, Renderer,
    SnapshotOptions, snapshot,
};

/// One drawing session.
///
/// All board access goes through `&mut self`, so gesture handling, undo/redo
/// and snapshot rendering never overlap.
pub struct Session {
    board: Board,
    player: Box<dyn CuePlayer>,
    rasterizer: Option<Box<dyn Rasterizer>>,
    share_sink: Box<dyn ShareSink>,
    config: AppConfig,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl Session {
    /// Create a session from configuration.
    ///
    /// Audio plays from `sound_dir` when set. Snapshots use the CPU
    /// rasterizer and land in a [`ShareBuffer`].
    pub fn new(config: AppConfig) -> Self {
        let colors = match config.seed {
            Some(seed) => RandomColors::seeded(seed),
            None => RandomColors::from_entropy(),
        };
        let board = Board::with_colors(colors).with_redo_policy(config.redo_policy);

        let player: Box<dyn CuePlayer> = match &config.sound_dir {
            Some(dir) => Box::new(AssetCuePlayer::new(dir.clone(), LogCueSink)),
            None => Box::new(NullCuePlayer),
        };

        Self {
            board,
            player,
            rasterizer: Some(Box::new(CpuRasterizer::new())),
            share_sink: Box::new(ShareBuffer::new()),
            config,
        }
    }

    /// Replace the audio player.
    pub fn with_player(mut self, player: Box<dyn CuePlayer>) -> Self {
        self.player = player;
        self
    }

    /// Replace the snapshot backend. `None` disables sharing.
    pub fn with_rasterizer(mut self, rasterizer: Option<Box<dyn Rasterizer>>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    /// Replace the share collaborator.
    pub fn with_share_sink(mut self, sink: Box<dyn ShareSink>) -> Self {
        self.share_sink = sink;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Feed a gesture event; a new stroke plays its cue.
    pub fn handle_gesture(&mut self, event: GestureEvent) -> Option<StrokeStarted> {
        let started = self.board.handle_gesture(event);
        if let Some(started) = started {
            play_cue_or_log(self.player.as_mut(), started.cue);
        }
        started
    }

    /// Apply a control action. Returns false when the action had no effect.
    pub fn apply(&mut self, action: UiAction) -> bool {
        match action {
            UiAction::Undo => self.board.undo(),
            UiAction::Redo => self.board.redo(),
            UiAction::Clear => {
                self.board.clear();
                true
            }
            UiAction::Share => self.share().is_some(),
        }
    }

    /// Current state of the host controls.
    pub fn controls(&self) -> Controls {
        Controls {
            undo_enabled: self.board.can_undo(),
            redo_enabled: self.board.can_redo(),
            clear_visible: self.board.has_drawn(),
            share_enabled: self.rasterizer.is_some(),
        }
    }

    /// Render context for the live canvas.
    pub fn render_context(&self) -> RenderContext<'_> {
        RenderContext::new(self.board.active(), self.config.canvas_size())
            .with_background(self.config.background_color())
            .with_style(RenderStyle::Live)
    }

    /// Build the live canvas into `renderer`.
    pub fn render_into(&self, renderer: &mut dyn Renderer) {
        renderer.build_scene(&self.render_context());
    }

    /// Live draw commands for the current frame.
    pub fn frame(&self) -> Vec<DrawCommand> {
        let mut list = DisplayList::new();
        self.render_into(&mut list);
        list.into_commands()
    }

    /// Snapshot the canvas and hand it to the share collaborator.
    ///
    /// Returns `None` (no share sheet) when any step fails; the failure is logged.
    pub fn share(&mut self) -> Option<SharedImage> {
        let Some(rasterizer) = self.rasterizer.as_deref_mut() else {
            log::warn!("Share requested but no rasterizer is available");
            return None;
        };

        let options = SnapshotOptions::new(self.config.canvas_size())
            .with_scale(self.config.snapshot_scale)
            .with_background(self.config.background_color());
        let image = match snapshot(self.board.active(), rasterizer, &options) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("Snapshot failed: {}", e);
                return None;
            }
        };

        let png = match image.encode_png() {
            Ok(png) => png,
            Err(e) => {
                log::error!("Failed to encode snapshot: {}", e);
                return None;
            }
        };
        let shared = SharedImage {
            png,
            width: image.width,
            height: image.height,
        };

        if let Err(e) = self.share_sink.share(&shared) {
            log::error!("Share failed: {}", e);
            return None;
        }
        log::info!("Shared snapshot ({} bytes)", shared.png.len());
        Some(shared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use melodraw_core::{AudioError, SoundCue};
    use melodraw_render::{RenderResult, RasterImage, RendererError};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingPlayer {
        played: Arc<Mutex<Vec<SoundCue>>>,
        fail: bool,
    }

    impl CuePlayer for RecordingPlayer {
        fn play(&mut self, cue: SoundCue) -> Result<(), AudioError> {
            self.played.lock().unwrap().push(cue);
            if self.fail {
                return Err(AudioError::Playback("muted".to_string()));
            }
            Ok(())
        }
    }

    struct BrokenRasterizer;

    impl Rasterizer for BrokenRasterizer {
        fn rasterize(&mut self, _ctx: &RenderContext) -> RenderResult<RasterImage> {
            Err(RendererError::RenderingUnavailable("no GPU".to_string()))
        }
    }

    #[derive(Clone, Default)]
    struct CollectingSink {
        images: Arc<Mutex<Vec<SharedImage>>>,
    }

    impl ShareSink for CollectingSink {
        fn share(&mut self, image: &SharedImage) -> Result<(), crate::share::ShareError> {
            self.images.lock().unwrap().push(image.clone());
            Ok(())
        }
    }

    fn config() -> AppConfig {
        AppConfig {
            width: 64,
            height: 48,
            seed: Some(21),
            snapshot_scale: 1.0,
            ..AppConfig::default()
        }
    }

    fn draw(session: &mut Session, points: &[(f64, f64)]) {
        let (x, y) = points[0];
        session.handle_gesture(GestureEvent::begin(x, y));
        for &(x, y) in &points[1..] {
            session.handle_gesture(GestureEvent::move_to(x, y));
        }
        session.handle_gesture(GestureEvent::End);
    }

    #[test]
    fn test_new_stroke_plays_cue_once() {
        let player = RecordingPlayer::default();
        let mut session = Session::new(config()).with_player(Box::new(player.clone()));

        let started = session.handle_gesture(GestureEvent::begin(10.0, 10.0)).unwrap();
        session.handle_gesture(GestureEvent::move_to(20.0, 10.0));
        session.handle_gesture(GestureEvent::move_to(30.0, 15.0));
        session.handle_gesture(GestureEvent::End);

        assert_eq!(*player.played.lock().unwrap(), vec![started.cue]);
        assert_eq!(started.cue, started.color.cue());
    }

    #[test]
    fn test_audio_failure_does_not_affect_drawing() {
        let player = RecordingPlayer {
            fail: true,
            ..RecordingPlayer::default()
        };
        let mut session = Session::new(config()).with_player(Box::new(player.clone()));
        draw(&mut session, &[(1.0, 1.0), (5.0, 5.0)]);

        assert_eq!(session.board().active().len(), 1);
        assert_eq!(session.board().active()[0].point_count(), 2);
        assert_eq!(player.played.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_controls_follow_board_state() {
        let mut session = Session::new(config());
        assert_eq!(
            session.controls(),
            Controls {
                share_enabled: true,
                ..Controls::default()
            }
        );

        draw(&mut session, &[(1.0, 1.0), (5.0, 5.0)]);
        let controls = session.controls();
        assert!(controls.undo_enabled);
        assert!(!controls.redo_enabled);
        assert!(controls.clear_visible);

        assert!(session.apply(UiAction::Undo));
        let controls = session.controls();
        assert!(!controls.undo_enabled);
        assert!(controls.redo_enabled);
        // Clear stays visible while undone strokes remain
        assert!(controls.clear_visible);

        assert!(!session.apply(UiAction::Undo));
        assert!(session.apply(UiAction::Redo));
        assert!(!session.apply(UiAction::Redo));

        assert!(session.apply(UiAction::Clear));
        assert_eq!(session.controls().clear_visible, false);
        assert!(!session.controls().undo_enabled);
        assert!(!session.controls().redo_enabled);
    }

    #[test]
    fn test_frame_is_live_styled() {
        let mut session = Session::new(config());
        draw(&mut session, &[(1.0, 1.0), (5.0, 5.0)]);
        draw(&mut session, &[(9.0, 1.0)]);

        let frame = session.frame();
        assert_eq!(frame.len(), 2);
        assert!(frame.iter().all(|c| c.effects.is_some()));
        assert_eq!(frame[1].stroke_id, session.board().active()[1].id());
    }

    #[test]
    fn test_share_produces_png() {
        let sink = CollectingSink::default();
        let mut session = Session::new(config()).with_share_sink(Box::new(sink.clone()));
        draw(&mut session, &[(10.0, 10.0), (50.0, 30.0)]);

        let shared = session.share().unwrap();
        assert_eq!((shared.width, shared.height), (64, 48));
        assert_eq!(&shared.png[..4], b"\x89PNG");
        assert_eq!(sink.images.lock().unwrap().len(), 1);
        // Sharing does not touch board state
        assert_eq!(session.board().active().len(), 1);
    }

    #[test]
    fn test_share_unavailable_without_backend() {
        let sink = CollectingSink::default();
        let mut session = Session::new(config())
            .with_rasterizer(Some(Box::new(BrokenRasterizer)))
            .with_share_sink(Box::new(sink.clone()));
        draw(&mut session, &[(10.0, 10.0)]);

        assert!(session.share().is_none());
        assert!(!session.apply(UiAction::Share));
        assert!(sink.images.lock().unwrap().is_empty());

        let mut session = session.with_rasterizer(None);
        assert!(!session.controls().share_enabled);
        assert!(session.share().is_none());
    }

    #[test]
    fn test_seeded_sessions_pick_same_colors() {
        let mut a = Session::new(config());
        let mut b = Session::new(config());
        for i in 0..5 {
            let x = i as f64;
            let ca = a.handle_gesture(GestureEvent::begin(x, 0.0)).unwrap().color;
            let cb = b.handle_gesture(GestureEvent::begin(x, 0.0)).unwrap().color;
            assert_eq!(ca, cb);
        }
    }
}
