//! Stroke palette and the sound cue attached to each palette entry.
//!
//! Colors are picked by bucketing a uniform draw in `[0, 1)` into eight
//! equal-width buckets. Each color maps to exactly one instrument cue.

use peniko::Color;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Width of one palette bucket on the unit interval.
pub const BUCKET_WIDTH: f64 = 0.125;

/// A stroke color from the fixed palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteColor {
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    Purple,
    Pink,
    Brown,
}

/// Palette entries in bucket order.
pub const PALETTE: [PaletteColor; 8] = [
    PaletteColor::Red,
    PaletteColor::Blue,
    PaletteColor::Green,
    PaletteColor::Yellow,
    PaletteColor::Orange,
    PaletteColor::Purple,
    PaletteColor::Pink,
    PaletteColor::Brown,
];

impl PaletteColor {
    /// Map a uniform draw to its palette bucket.
    ///
    /// `1.0` lands in the last bucket. Draws outside `[0, 1]` (and NaN)
    /// have no palette entry.
    pub fn from_draw(draw: f64) -> Option<Self> {
        if !(0.0..=1.0).contains(&draw) {
            return None;
        }
        let index = ((draw / BUCKET_WIDTH).floor() as usize).min(PALETTE.len() - 1);
        Some(PALETTE[index])
    }

    /// Position of this color in the palette.
    pub fn index(self) -> usize {
        match self {
            PaletteColor::Red => 0,
            PaletteColor::Blue => 1,
            PaletteColor::Green => 2,
            PaletteColor::Yellow => 3,
            PaletteColor::Orange => 4,
            PaletteColor::Purple => 5,
            PaletteColor::Pink => 6,
            PaletteColor::Brown => 7,
        }
    }

    /// Display color.
    pub fn color(self) -> Color {
        match self {
            PaletteColor::Red => Color::from_rgba8(255, 59, 48, 255),
            PaletteColor::Blue => Color::from_rgba8(0, 122, 255, 255),
            PaletteColor::Green => Color::from_rgba8(52, 199, 89, 255),
            PaletteColor::Yellow => Color::from_rgba8(255, 204, 0, 255),
            PaletteColor::Orange => Color::from_rgba8(255, 149, 0, 255),
            PaletteColor::Purple => Color::from_rgba8(175, 82, 222, 255),
            PaletteColor::Pink => Color::from_rgba8(255, 45, 85, 255),
            PaletteColor::Brown => Color::from_rgba8(162, 132, 94, 255),
        }
    }

    /// Lowercase name, used in logs.
    pub fn name(self) -> &'static str {
        match self {
            PaletteColor::Red => "red",
            PaletteColor::Blue => "blue",
            PaletteColor::Green => "green",
            PaletteColor::Yellow => "yellow",
            PaletteColor::Orange => "orange",
            PaletteColor::Purple => "purple",
            PaletteColor::Pink => "pink",
            PaletteColor::Brown => "brown",
        }
    }

    /// Instrument cue played when a stroke of this color starts.
    pub fn cue(self) -> SoundCue {
        SoundCue::for_color(self)
    }
}

/// Instrument clip played when a stroke begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Drum,
    Piano,
    Harp,
    Guitar,
    Violin,
    ElectricGuitar,
    Flute,
    Clarinet,
    /// Fallback for draws that have no palette entry.
    #[default]
    Accordion,
}

impl SoundCue {
    pub fn for_color(color: PaletteColor) -> Self {
        match color {
            PaletteColor::Red => SoundCue::Drum,
            PaletteColor::Blue => SoundCue::Piano,
            PaletteColor::Green => SoundCue::Harp,
            PaletteColor::Yellow => SoundCue::Guitar,
            PaletteColor::Orange => SoundCue::Violin,
            PaletteColor::Purple => SoundCue::ElectricGuitar,
            PaletteColor::Pink => SoundCue::Flute,
            PaletteColor::Brown => SoundCue::Clarinet,
        }
    }

    /// Cue for a raw draw, falling back to the default cue off-palette.
    pub fn for_draw(draw: f64) -> Self {
        PaletteColor::from_draw(draw)
            .map(Self::for_color)
            .unwrap_or_default()
    }

    /// Asset name of the clip, without extension.
    pub fn asset_name(self) -> &'static str {
        match self {
            SoundCue::Drum => "drumNote",
            // Matches the shipped asset bundle's spelling
            SoundCue::Piano => "painoNote",
            SoundCue::Harp => "harpNote",
            SoundCue::Guitar => "guitarNote",
            SoundCue::Violin => "violinNote",
            SoundCue::ElectricGuitar => "electric-guitarNote",
            SoundCue::Flute => "fluteNote",
            SoundCue::Clarinet => "clarinetNote",
            SoundCue::Accordion => "accordionNote",
        }
    }

    /// File name of the clip asset.
    pub fn file_name(self) -> String {
        format!("{}.mp3", self.asset_name())
    }
}

/// Source of colors for new strokes.
pub trait ColorSource {
    fn next_color(&mut self) -> PaletteColor;
}

/// Picks colors from uniform random draws.
#[derive(Debug, Clone)]
pub struct RandomColors<R = StdRng> {
    rng: R,
}

impl RandomColors<StdRng> {
    /// Reproducible source for a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Source seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl Default for RandomColors<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: Rng> RandomColors<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> ColorSource for RandomColors<R> {
    fn next_color(&mut self) -> PaletteColor {
        let draw: f64 = self.rng.random();
        // StandardUniform yields [0, 1), so this never falls back
        PaletteColor::from_draw(draw).unwrap_or(PaletteColor::Brown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        for (i, color) in PALETTE.iter().enumerate() {
            let lower = i as f64 * BUCKET_WIDTH;
            assert_eq!(PaletteColor::from_draw(lower), Some(*color));
            assert_eq!(PaletteColor::from_draw(lower + BUCKET_WIDTH / 2.0), Some(*color));
        }
    }

    #[test]
    fn test_example_draws() {
        assert_eq!(PaletteColor::from_draw(0.0), Some(PaletteColor::Red));
        assert_eq!(PaletteColor::from_draw(0.20), Some(PaletteColor::Blue));
        assert_eq!(PaletteColor::from_draw(0.99), Some(PaletteColor::Brown));
        assert_eq!(PaletteColor::from_draw(0.124_999), Some(PaletteColor::Red));
    }

    #[test]
    fn test_closing_bucket_inclusive() {
        assert_eq!(PaletteColor::from_draw(1.0), Some(PaletteColor::Brown));
    }

    #[test]
    fn test_off_palette_draws() {
        assert_eq!(PaletteColor::from_draw(-0.01), None);
        assert_eq!(PaletteColor::from_draw(1.01), None);
        assert_eq!(PaletteColor::from_draw(f64::NAN), None);
        assert_eq!(SoundCue::for_draw(2.0), SoundCue::Accordion);
        assert_eq!(SoundCue::for_draw(0.0), SoundCue::Drum);
    }

    #[test]
    fn test_cue_table_is_injective() {
        let cues: std::collections::HashSet<_> = PALETTE.iter().map(|c| c.cue()).collect();
        assert_eq!(cues.len(), PALETTE.len());
        assert!(!cues.contains(&SoundCue::default()));
    }

    #[test]
    fn test_index_matches_palette_order() {
        for (i, color) in PALETTE.iter().enumerate() {
            assert_eq!(color.index(), i);
        }
    }

    #[test]
    fn test_cue_file_name() {
        assert_eq!(SoundCue::Piano.file_name(), "painoNote.mp3");
        assert_eq!(SoundCue::for_color(PaletteColor::Blue).file_name(), "painoNote.mp3");
        assert_eq!(SoundCue::ElectricGuitar.file_name(), "electric-guitarNote.mp3");
    }

    #[test]
    fn test_seeded_source_is_reproducible() {
        let mut a = RandomColors::seeded(42);
        let mut b = RandomColors::seeded(42);
        let first: Vec<_> = (0..32).map(|_| a.next_color()).collect();
        let second: Vec<_> = (0..32).map(|_| b.next_color()).collect();
        assert_eq!(first, second);
    }
}
