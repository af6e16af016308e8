//! Renderer trait abstraction and draw-command generation.

use kurbo::{BezPath, Cap, Join, Size, Stroke as StrokeStyle, Vec2};
use melodraw_core::stroke::{Stroke, StrokeId};
use peniko::Color;
use std::slice;
use thiserror::Error;

/// Width of every stroke, in canvas units.
pub const LINE_WIDTH: f64 = 12.0;
/// Opacity applied to stroke colors.
pub const STROKE_OPACITY: f32 = 0.9;
/// Blur radius of the live styling.
pub const BLUR_RADIUS: f64 = 1.0;
/// Opacity of the drop shadow color.
pub const SHADOW_OPACITY: f32 = 0.6;
/// Drop shadow radius.
pub const SHADOW_RADIUS: f64 = 4.0;
/// Drop shadow offset.
pub const SHADOW_OFFSET: Vec2 = Vec2::new(2.0, 2.0);

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Rendering unavailable: {0}")]
    RenderingUnavailable(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Which styling a render pass applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderStyle {
    /// On-screen canvas with blur and drop shadow.
    #[default]
    Live,
    /// Flat output for sharing; no blur or shadow.
    Snapshot,
}

/// Drop shadow under a stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Color,
    pub radius: f64,
    pub offset: Vec2,
}

/// Soft styling applied to live strokes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Effects {
    pub blur_radius: f64,
    pub shadow: Shadow,
}

/// One stroke, ready to paint.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub stroke_id: StrokeId,
    pub path: BezPath,
    /// Stroke color with [`STROKE_OPACITY`] applied.
    pub color: Color,
    pub style: StrokeStyle,
    /// Present only for [`RenderStyle::Live`].
    pub effects: Option<Effects>,
}

/// Stroke geometry shared by every command: fixed width, round caps and joins.
pub fn stroke_style() -> StrokeStyle {
    StrokeStyle::new(LINE_WIDTH)
        .with_caps(Cap::Round)
        .with_join(Join::Round)
}

impl DrawCommand {
    /// Build the command for a stroke.
    pub fn for_stroke(stroke: &Stroke, style: RenderStyle) -> Self {
        let base = stroke.color().color();
        let effects = match style {
            RenderStyle::Live => Some(Effects {
                blur_radius: BLUR_RADIUS,
                shadow: Shadow {
                    color: base.with_alpha(SHADOW_OPACITY),
                    radius: SHADOW_RADIUS,
                    offset: SHADOW_OFFSET,
                },
            }),
            RenderStyle::Snapshot => None,
        };
        Self {
            stroke_id: stroke.id(),
            path: stroke.to_path(),
            color: base.with_alpha(STROKE_OPACITY),
            style: stroke_style(),
            effects,
        }
    }
}

/// Lazy draw commands for a slice of strokes, back to front.
///
/// Cloning restarts the sequence from the current position; calling
/// [`render`] again restarts it from the beginning.
#[derive(Debug, Clone)]
pub struct DrawCommands<'a> {
    strokes: slice::Iter<'a, Stroke>,
    style: RenderStyle,
}

impl Iterator for DrawCommands<'_> {
    type Item = DrawCommand;

    fn next(&mut self) -> Option<Self::Item> {
        self.strokes
            .next()
            .map(|stroke| DrawCommand::for_stroke(stroke, self.style))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.strokes.size_hint()
    }
}

impl ExactSizeIterator for DrawCommands<'_> {}

/// Draw commands for `strokes` in z-order.
pub fn render(strokes: &[Stroke], style: RenderStyle) -> DrawCommands<'_> {
    DrawCommands {
        strokes: strokes.iter(),
        style,
    }
}

/// Context for a single render pass.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    /// Strokes to paint, back to front.
    pub strokes: &'a [Stroke],
    /// Canvas size in logical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI and export scale).
    pub scale_factor: f64,
    /// Background color.
    pub background_color: Color,
    /// Styling to apply.
    pub style: RenderStyle,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(strokes: &'a [Stroke], viewport_size: Size) -> Self {
        Self {
            strokes,
            viewport_size,
            scale_factor: 1.0,
            background_color: Color::WHITE,
            style: RenderStyle::Live,
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the render style.
    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    /// Output size in physical pixels, rounded up.
    pub fn pixel_size(&self) -> (u32, u32) {
        let width = (self.viewport_size.width * self.scale_factor).ceil();
        let height = (self.viewport_size.height * self.scale_factor).ceil();
        (width.max(0.0) as u32, height.max(0.0) as u32)
    }

    /// Draw commands for this pass.
    pub fn commands(&self) -> DrawCommands<'a> {
        render(self.strokes, self.style)
    }
}

/// Trait for rendering backends.
///
/// Implementations can use Vello, wgpu directly, or other rendering engines.
pub trait Renderer: Send {
    /// Build the scene/command buffer for a frame.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

/// Renderer that records draw commands for a host surface to paint.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    background: Option<Color>,
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded by the last `build_scene`.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Background recorded by the last `build_scene`.
    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }
}

impl Renderer for DisplayList {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.background = Some(self.background_color(ctx));
        self.commands.clear();
        self.commands.extend(ctx.commands());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{PathEl, Point};
    use melodraw_core::{Board, GestureEvent};

    fn board_with_strokes(count: usize) -> Board {
        let mut board = Board::seeded(11);
        for i in 0..count {
            let x = i as f64 * 10.0;
            board.handle_gesture(GestureEvent::begin(x, 0.0));
            board.handle_gesture(GestureEvent::move_to(x + 5.0, 5.0));
            board.handle_gesture(GestureEvent::End);
        }
        board
    }

    #[test]
    fn test_commands_follow_z_order() {
        let board = board_with_strokes(3);
        let ids: Vec<_> = render(board.active(), RenderStyle::Live)
            .map(|c| c.stroke_id)
            .collect();
        let expected: Vec<_> = board.active().iter().map(|s| s.id()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_render_is_restartable() {
        let board = board_with_strokes(2);
        let first: Vec<_> = render(board.active(), RenderStyle::Live).collect();
        let second: Vec<_> = render(board.active(), RenderStyle::Live).collect();
        assert_eq!(first, second);

        let commands = render(board.active(), RenderStyle::Live);
        assert_eq!(commands.len(), 2);
        assert_eq!(commands.clone().count(), commands.count());
    }

    #[test]
    fn test_command_geometry_and_style() {
        let board = board_with_strokes(1);
        let command = render(board.active(), RenderStyle::Live).next().unwrap();

        assert_eq!(
            command.path.elements(),
            &[
                PathEl::MoveTo(Point::new(0.0, 0.0)),
                PathEl::LineTo(Point::new(5.0, 5.0)),
            ]
        );
        assert_eq!(command.style.width, LINE_WIDTH);
        assert_eq!(command.style.start_cap, Cap::Round);
        assert_eq!(command.style.end_cap, Cap::Round);
        assert_eq!(command.style.join, Join::Round);

        let expected = board.active()[0].color().color().with_alpha(STROKE_OPACITY);
        assert_eq!(command.color, expected);
    }

    #[test]
    fn test_live_has_effects_snapshot_does_not() {
        let board = board_with_strokes(1);
        let live = render(board.active(), RenderStyle::Live).next().unwrap();
        let flat = render(board.active(), RenderStyle::Snapshot).next().unwrap();

        let effects = live.effects.unwrap();
        assert_eq!(effects.blur_radius, BLUR_RADIUS);
        assert_eq!(effects.shadow.radius, SHADOW_RADIUS);
        assert_eq!(effects.shadow.offset, SHADOW_OFFSET);
        assert!(flat.effects.is_none());
        assert_eq!(live.path, flat.path);
    }

    #[test]
    fn test_empty_board_renders_nothing() {
        let board = Board::seeded(1);
        assert_eq!(render(board.active(), RenderStyle::Live).count(), 0);
    }

    #[test]
    fn test_display_list_records_frame() {
        let board = board_with_strokes(2);
        let ctx = RenderContext::new(board.active(), Size::new(320.0, 240.0))
            .with_background(Color::BLACK);

        let mut list = DisplayList::new();
        list.build_scene(&ctx);
        assert_eq!(list.commands().len(), 2);
        assert_eq!(list.background(), Some(Color::BLACK));

        let empty = Board::seeded(2);
        list.build_scene(&RenderContext::new(empty.active(), Size::new(320.0, 240.0)));
        assert!(list.commands().is_empty());
    }

    #[test]
    fn test_pixel_size_applies_scale() {
        let ctx = RenderContext::new(&[], Size::new(100.5, 50.0)).with_scale_factor(2.0);
        assert_eq!(ctx.pixel_size(), (201, 100));
    }
}
