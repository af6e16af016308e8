//! Software rasterizer for snapshots without a GPU.
//!
//! Stroke coverage is computed from the distance of each pixel center to the
//! flattened path, which yields round caps and joins for free.

use crate::renderer::{DrawCommand, RenderContext, RenderResult, RendererError};
use crate::snapshot::{RasterImage, Rasterizer};
use kurbo::{PathEl, Point, Rect, Vec2};
use peniko::Color;

/// Flattening tolerance for curved path segments, in canvas units.
const FLATTEN_TOLERANCE: f64 = 0.1;

/// CPU rasterizer. Deterministic, cost grows with stroke length.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuRasterizer;

impl CpuRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl Rasterizer for CpuRasterizer {
    fn rasterize(&mut self, ctx: &RenderContext) -> RenderResult<RasterImage> {
        let (width, height) = ctx.pixel_size();
        if width == 0 || height == 0 {
            return Err(RendererError::RenderingUnavailable(
                "zero-sized target".to_string(),
            ));
        }

        let mut canvas = PixelBuffer::new(width, height, ctx.background_color);
        let scale = ctx.scale_factor;
        for command in ctx.commands() {
            let polylines = flatten(&command);
            if let Some(effects) = command.effects {
                let shadow = effects.shadow;
                canvas.paint(
                    &polylines,
                    shadow.offset,
                    command.style.width / 2.0,
                    shadow.radius,
                    shadow.color,
                    scale,
                );
                canvas.paint(
                    &polylines,
                    Vec2::ZERO,
                    command.style.width / 2.0,
                    effects.blur_radius,
                    command.color,
                    scale,
                );
            } else {
                canvas.paint(
                    &polylines,
                    Vec2::ZERO,
                    command.style.width / 2.0,
                    0.0,
                    command.color,
                    scale,
                );
            }
        }

        Ok(canvas.into_image())
    }
}

/// Flatten a command's path into polylines, one per subpath.
fn flatten(command: &DrawCommand) -> Vec<Vec<Point>> {
    let mut polylines: Vec<Vec<Point>> = Vec::new();
    kurbo::flatten(
        command.path.elements().iter().copied(),
        FLATTEN_TOLERANCE,
        |el| match el {
            PathEl::MoveTo(p) => polylines.push(vec![p]),
            PathEl::LineTo(p) => match polylines.last_mut() {
                Some(line) => line.push(p),
                None => polylines.push(vec![p]),
            },
            PathEl::ClosePath => {
                if let Some(line) = polylines.last_mut() {
                    if let Some(&first) = line.first() {
                        line.push(first);
                    }
                }
            }
            _ => {}
        },
    );
    polylines
}

/// Distance from `point` to the segment `start..end`.
fn segment_distance(point: Point, start: Point, end: Point) -> f64 {
    let line_vec = end - start;
    let point_vec = point - start;
    let line_len_sq = line_vec.hypot2();
    if line_len_sq < f64::EPSILON {
        return point_vec.hypot();
    }
    let t = (point_vec.dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    (point - (start + line_vec * t)).hypot()
}

/// Segments of every polyline. A lone point is a zero-length segment.
fn segments(polylines: &[Vec<Point>]) -> impl Iterator<Item = (Point, Point)> + '_ {
    polylines.iter().flat_map(|line| {
        let dot = match line.as_slice() {
            [only] => Some((*only, *only)),
            _ => None,
        };
        dot.into_iter().chain(line.windows(2).map(|pair| (pair[0], pair[1])))
    })
}

/// Device-pixel span `[x0, x1) x [y0, y1)` clipped to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelSpan {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl PixelSpan {
    fn covering(rect: Rect, width: u32, height: u32) -> Option<Self> {
        let span = Self {
            x0: rect.x0.floor().max(0.0) as u32,
            y0: rect.y0.floor().max(0.0) as u32,
            x1: (rect.x1.ceil().max(0.0) as u32).min(width),
            y1: (rect.y1.ceil().max(0.0) as u32).min(height),
        };
        (span.x0 < span.x1 && span.y0 < span.y1).then_some(span)
    }

    fn width(&self) -> usize {
        (self.x1 - self.x0) as usize
    }

    fn height(&self) -> usize {
        (self.y1 - self.y0) as usize
    }
}

/// Straight-alpha float RGBA buffer.
struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 4]>,
}

impl PixelBuffer {
    fn new(width: u32, height: u32, background: Color) -> Self {
        let rgba = background.to_rgba8();
        let fill = [
            rgba.r as f32 / 255.0,
            rgba.g as f32 / 255.0,
            rgba.b as f32 / 255.0,
            rgba.a as f32 / 255.0,
        ];
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    /// Paint a stroke of `half_width` around `polylines`, shifted by `offset`.
    ///
    /// `softness` widens the edge into a linear falloff; zero gives a
    /// one-pixel antialiased edge. Each segment only visits the pixels near
    /// it; the stroke keeps the highest coverage per pixel.
    fn paint(
        &mut self,
        polylines: &[Vec<Point>],
        offset: Vec2,
        half_width: f64,
        softness: f64,
        color: Color,
        scale: f64,
    ) {
        let Some(bounds) = polylines
            .iter()
            .flatten()
            .map(|p| Rect::from_points(*p, *p))
            .reduce(|acc, r| acc.union(r))
        else {
            return;
        };

        let aa = 0.5 / scale;
        let (reach, ramp) = if softness > 0.0 {
            (half_width + softness, 2.0 * softness)
        } else {
            (half_width + aa, 2.0 * aa)
        };
        let device = |rect: Rect| (rect + offset).inflate(reach, reach).scale_from_origin(scale);
        let Some(span) = PixelSpan::covering(device(bounds), self.width, self.height) else {
            return;
        };

        let mut mask = vec![0.0f32; span.width() * span.height()];
        for (start, end) in segments(polylines) {
            let Some(local) =
                PixelSpan::covering(device(Rect::from_points(start, end)), span.x1, span.y1)
            else {
                continue;
            };
            for y in local.y0.max(span.y0)..local.y1 {
                let row = (y - span.y0) as usize * span.width();
                for x in local.x0.max(span.x0)..local.x1 {
                    let center =
                        Point::new((x as f64 + 0.5) / scale, (y as f64 + 0.5) / scale) - offset;
                    let distance = segment_distance(center, start, end);
                    let coverage = ((reach - distance) / ramp).clamp(0.0, 1.0) as f32;
                    let cell = &mut mask[row + (x - span.x0) as usize];
                    *cell = cell.max(coverage);
                }
            }
        }

        let src = color.to_rgba8();
        let src_rgb = [
            src.r as f32 / 255.0,
            src.g as f32 / 255.0,
            src.b as f32 / 255.0,
        ];
        let src_alpha = src.a as f32 / 255.0;

        for y in span.y0..span.y1 {
            let row = (y - span.y0) as usize * span.width();
            for x in span.x0..span.x1 {
                let coverage = mask[row + (x - span.x0) as usize];
                if coverage > 0.0 {
                    let index = y as usize * self.width as usize + x as usize;
                    blend(&mut self.pixels[index], src_rgb, src_alpha * coverage);
                }
            }
        }
    }

    fn into_image(self) -> RasterImage {
        let rgba_data = self
            .pixels
            .iter()
            .flat_map(|px| px.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
            .collect();
        RasterImage {
            rgba_data,
            width: self.width,
            height: self.height,
        }
    }
}

/// Source-over compositing in straight alpha.
fn blend(dst: &mut [f32; 4], src_rgb: [f32; 3], src_alpha: f32) {
    let dst_alpha = dst[3];
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    if out_alpha <= 0.0 {
        *dst = [0.0; 4];
        return;
    }
    for i in 0..3 {
        dst[i] = (src_rgb[i] * src_alpha + dst[i] * dst_alpha * (1.0 - src_alpha)) / out_alpha;
    }
    dst[3] = out_alpha;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RenderStyle;
    use crate::snapshot::{SnapshotOptions, snapshot};
    use kurbo::Size;
    use melodraw_core::{Board, GestureEvent};

    fn horizontal_stroke() -> Board {
        let mut board = Board::seeded(4);
        board.handle_gesture(GestureEvent::begin(20.0, 30.0));
        board.handle_gesture(GestureEvent::move_to(80.0, 30.0));
        board.handle_gesture(GestureEvent::End);
        board
    }

    #[test]
    fn test_blank_canvas_is_background() {
        let board = Board::seeded(1);
        let options = SnapshotOptions::new(Size::new(10.0, 10.0));
        let image = snapshot(board.active(), &mut CpuRasterizer::new(), &options).unwrap();
        assert_eq!(image.rgba_data.len(), 10 * 10 * 4);
        assert!(image.rgba_data.chunks(4).all(|px| px == [255, 255, 255, 255]));
    }

    #[test]
    fn test_stroke_covers_its_path() {
        let board = horizontal_stroke();
        let options = SnapshotOptions::new(Size::new(100.0, 60.0));
        let image = snapshot(board.active(), &mut CpuRasterizer::new(), &options).unwrap();

        let expected = board.active()[0].color().color().to_rgba8();
        let [r, g, b, a] = image.pixel(50, 30).unwrap();
        // 90% opacity over white
        let mix = |c: u8| (c as f32 * 0.9 + 255.0 * 0.1).round() as i32;
        assert!((r as i32 - mix(expected.r)).abs() <= 2);
        assert!((g as i32 - mix(expected.g)).abs() <= 2);
        assert!((b as i32 - mix(expected.b)).abs() <= 2);
        assert_eq!(a, 255);

        // Well outside the 12px line width
        assert_eq!(image.pixel(50, 5).unwrap(), [255, 255, 255, 255]);
    }

    #[test]
    fn test_round_cap_extends_past_endpoint() {
        let board = horizontal_stroke();
        let options = SnapshotOptions::new(Size::new(100.0, 60.0));
        let image = snapshot(board.active(), &mut CpuRasterizer::new(), &options).unwrap();

        // 4px past the end lies inside the 6px cap radius, 10px past does not
        assert_ne!(image.pixel(84, 30).unwrap(), [255, 255, 255, 255]);
        assert_eq!(image.pixel(90, 30).unwrap(), [255, 255, 255, 255]);
    }

    #[test]
    fn test_single_point_stroke_paints_a_dot() {
        let mut board = Board::seeded(2);
        board.handle_gesture(GestureEvent::begin(10.0, 10.0));
        board.handle_gesture(GestureEvent::End);

        let options = SnapshotOptions::new(Size::new(20.0, 20.0));
        let image = snapshot(board.active(), &mut CpuRasterizer::new(), &options).unwrap();
        assert_ne!(image.pixel(10, 10).unwrap(), [255, 255, 255, 255]);
        assert_eq!(image.pixel(0, 0).unwrap(), [255, 255, 255, 255]);
    }

    #[test]
    fn test_later_strokes_paint_on_top() {
        let mut board = Board::seeded(8);
        for _ in 0..2 {
            board.handle_gesture(GestureEvent::begin(0.0, 10.0));
            board.handle_gesture(GestureEvent::move_to(20.0, 10.0));
            board.handle_gesture(GestureEvent::End);
        }
        let options = SnapshotOptions::new(Size::new(20.0, 20.0));
        let image = snapshot(board.active(), &mut CpuRasterizer::new(), &options).unwrap();

        let top = board.active()[1].color().color().to_rgba8();
        let [r, _, _, _] = image.pixel(10, 10).unwrap();
        // The top stroke contributes 90% of the final color
        assert!((r as f32 - top.r as f32).abs() <= 0.1 * 255.0 + 2.0);
    }

    #[test]
    fn test_live_style_draws_shadow() {
        let board = horizontal_stroke();
        let ctx = RenderContext::new(board.active(), Size::new(100.0, 60.0))
            .with_style(RenderStyle::Live);
        let live = CpuRasterizer::new().rasterize(&ctx).unwrap();
        let flat = CpuRasterizer::new()
            .rasterize(&ctx.clone().with_style(RenderStyle::Snapshot))
            .unwrap();

        // Below the line edge only the shadow reaches
        assert_eq!(flat.pixel(50, 38).unwrap(), [255, 255, 255, 255]);
        assert_ne!(live.pixel(50, 38).unwrap(), [255, 255, 255, 255]);
    }

    #[test]
    fn test_long_stroke_snapshot_is_fast() {
        let mut board = Board::seeded(6);
        board.handle_gesture(GestureEvent::begin(20.0, 20.0));
        for i in 1..=1200 {
            let t = i as f64;
            let x = 195.0 + 170.0 * (t * 0.05).sin();
            let y = 20.0 + t * 0.65;
            board.handle_gesture(GestureEvent::move_to(x, y));
        }
        board.handle_gesture(GestureEvent::End);

        let options = SnapshotOptions::new(Size::new(390.0, 844.0)).with_scale(2.0);
        let started = std::time::Instant::now();
        let image = snapshot(board.active(), &mut CpuRasterizer::new(), &options).unwrap();
        let elapsed = started.elapsed();

        assert_eq!((image.width, image.height), (780, 1688));
        assert!(elapsed.as_secs_f64() < 5.0, "snapshot took {elapsed:?}");
        // The stroke passes through its own first point
        assert_ne!(image.pixel(40, 40).unwrap(), [255, 255, 255, 255]);
    }

    #[test]
    fn test_overlapping_segments_do_not_darken() {
        let mut board = Board::seeded(4);
        board.handle_gesture(GestureEvent::begin(20.0, 30.0));
        board.handle_gesture(GestureEvent::move_to(80.0, 30.0));
        board.handle_gesture(GestureEvent::move_to(20.0, 30.0));
        board.handle_gesture(GestureEvent::move_to(80.0, 30.0));
        board.handle_gesture(GestureEvent::End);
        let options = SnapshotOptions::new(Size::new(100.0, 60.0));
        let doubled = snapshot(board.active(), &mut CpuRasterizer::new(), &options).unwrap();

        // Same seed, same color as the single pass
        let single = horizontal_stroke();
        assert_eq!(board.active()[0].color(), single.active()[0].color());
        let reference = snapshot(single.active(), &mut CpuRasterizer::new(), &options).unwrap();
        assert_eq!(doubled.pixel(50, 30), reference.pixel(50, 30));
    }

    #[test]
    fn test_segment_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((segment_distance(Point::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-9);
        assert!((segment_distance(Point::new(13.0, 4.0), a, b) - 5.0).abs() < 1e-9);
        assert!((segment_distance(Point::new(3.0, 4.0), a, a) - 5.0).abs() < 1e-9);
    }
}
