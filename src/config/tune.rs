use super::traits::{invalid, ConfigSection};
use crate::engines::melody::decoder::MAX_BITS_PER_NOTE;
use crate::engines::melody::scale::{Key, Scale, ScaleKind};
use crate::error::MusigenError;
use serde::{Deserialize, Serialize};

/// Slowest tempo whose quarter note fits a 24-bit MIDI tempo in microseconds.
pub const MIN_BPM: u32 = 4;

/// Musical parameters shared by genome generation and melody decoding.
///
/// The genome length of a run is fully determined by this section, so all
/// genomes evaluated against one tune must have been generated from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuneMetadata {
    pub num_bars: usize,
    pub notes_per_bar: usize,
    /// Number of stacked harmonic layers, each two degrees above the last.
    pub num_steps: usize,
    pub pauses: bool,
    pub key: Key,
    pub scale: ScaleKind,
    pub root_octave: u8,
    pub bpm: u32,
    pub bits_per_note: usize,
    pub octaves: usize,
}

impl Default for TuneMetadata {
    fn default() -> Self {
        Self {
            num_bars: 8,
            notes_per_bar: 4,
            num_steps: 1,
            pauses: true,
            key: Key::C,
            scale: ScaleKind::Major,
            root_octave: 4,
            bpm: 128,
            bits_per_note: 4,
            octaves: 2,
        }
    }
}

impl TuneMetadata {
    pub fn num_slots(&self) -> usize {
        self.num_bars * self.notes_per_bar
    }

    pub fn genome_length(&self) -> usize {
        self.num_slots() * self.bits_per_note
    }

    /// Duration of one slot in quarter notes; a bar is four beats.
    pub fn note_length(&self) -> f64 {
        4.0 / self.notes_per_bar as f64
    }

    pub fn scale(&self) -> Scale {
        Scale::new(self.key, self.scale, self.root_octave, self.octaves)
    }
}

impl ConfigSection for TuneMetadata {
    fn section_name() -> &'static str {
        "tune"
    }

    fn validate(&self) -> Result<(), MusigenError> {
        if self.num_bars == 0 {
            return Err(invalid::<Self>("num_bars must be positive"));
        }
        if self.notes_per_bar == 0 {
            return Err(invalid::<Self>("notes_per_bar must be positive"));
        }
        if self.num_steps == 0 {
            return Err(invalid::<Self>("num_steps must be positive"));
        }
        if !(1..=MAX_BITS_PER_NOTE).contains(&self.bits_per_note) {
            return Err(invalid::<Self>("bits_per_note must be between 1 and 16"));
        }
        if self.octaves == 0 {
            return Err(invalid::<Self>("octaves must be positive"));
        }
        if self.bpm < MIN_BPM {
            return Err(invalid::<Self>("bpm must be at least 4"));
        }
        self.scale().highest_midi()?;
        Ok(())
    }
}
