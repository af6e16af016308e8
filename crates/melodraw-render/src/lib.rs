//! Melodraw Render Library
//!
//! Draw-command generation, snapshot rasterization and PNG encoding for the
//! Melodraw stroke board. A software rasterizer is always available; the
//! `vello-renderer` feature adds GPU rendering through Vello.

mod cpu;
mod renderer;
mod snapshot;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use cpu::CpuRasterizer;
pub use renderer::{
    BLUR_RADIUS, DisplayList, DrawCommand, DrawCommands, Effects, LINE_WIDTH, RenderContext,
    RenderResult, RenderStyle, Renderer, RendererError, SHADOW_OFFSET, SHADOW_OPACITY,
    SHADOW_RADIUS, STROKE_OPACITY, Shadow, render, stroke_style,
};
pub use snapshot::{MAX_SNAPSHOT_DIMENSION, RasterImage, Rasterizer, SnapshotOptions, snapshot};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::{VelloRasterizer, VelloRenderer};
