use crate::error::{MusigenError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tonic of the scale. Enharmonic spellings are distinct variants so the name
/// written in a config file survives a save/load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C#")]
    CSharp,
    #[serde(rename = "Db")]
    DFlat,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D#")]
    DSharp,
    #[serde(rename = "Eb")]
    EFlat,
    #[serde(rename = "E")]
    E,
    #[serde(rename = "F")]
    F,
    #[serde(rename = "F#")]
    FSharp,
    #[serde(rename = "Gb")]
    GFlat,
    #[serde(rename = "G")]
    G,
    #[serde(rename = "G#")]
    GSharp,
    #[serde(rename = "Ab")]
    AFlat,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A#")]
    ASharp,
    #[serde(rename = "Bb")]
    BFlat,
    #[serde(rename = "B")]
    B,
}

impl Key {
    pub const ALL: [Key; 17] = [
        Key::C,
        Key::CSharp,
        Key::DFlat,
        Key::D,
        Key::DSharp,
        Key::EFlat,
        Key::E,
        Key::F,
        Key::FSharp,
        Key::GFlat,
        Key::G,
        Key::GSharp,
        Key::AFlat,
        Key::A,
        Key::ASharp,
        Key::BFlat,
        Key::B,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Key::C => "C",
            Key::CSharp => "C#",
            Key::DFlat => "Db",
            Key::D => "D",
            Key::DSharp => "D#",
            Key::EFlat => "Eb",
            Key::E => "E",
            Key::F => "F",
            Key::FSharp => "F#",
            Key::GFlat => "Gb",
            Key::G => "G",
            Key::GSharp => "G#",
            Key::AFlat => "Ab",
            Key::A => "A",
            Key::ASharp => "A#",
            Key::BFlat => "Bb",
            Key::B => "B",
        }
    }

    /// Semitones above C.
    pub fn semitone(self) -> u8 {
        match self {
            Key::C => 0,
            Key::CSharp | Key::DFlat => 1,
            Key::D => 2,
            Key::DSharp | Key::EFlat => 3,
            Key::E => 4,
            Key::F => 5,
            Key::FSharp | Key::GFlat => 6,
            Key::G => 7,
            Key::GSharp | Key::AFlat => 8,
            Key::A => 9,
            Key::ASharp | Key::BFlat => 10,
            Key::B => 11,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Key {
    type Err = MusigenError;

    fn from_str(s: &str) -> Result<Self> {
        Key::ALL
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| MusigenError::UnknownKey(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScaleKind {
    Major,
    MinorM,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    MajorBlues,
    MinorBlues,
}

impl ScaleKind {
    pub const ALL: [ScaleKind; 8] = [
        ScaleKind::Major,
        ScaleKind::MinorM,
        ScaleKind::Dorian,
        ScaleKind::Phrygian,
        ScaleKind::Lydian,
        ScaleKind::Mixolydian,
        ScaleKind::MajorBlues,
        ScaleKind::MinorBlues,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScaleKind::Major => "major",
            ScaleKind::MinorM => "minorM",
            ScaleKind::Dorian => "dorian",
            ScaleKind::Phrygian => "phrygian",
            ScaleKind::Lydian => "lydian",
            ScaleKind::Mixolydian => "mixolydian",
            ScaleKind::MajorBlues => "majorBlues",
            ScaleKind::MinorBlues => "minorBlues",
        }
    }

    /// Semitone offsets of one octave of the scale, tonic first.
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ScaleKind::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleKind::MinorM => &[0, 2, 3, 5, 7, 9, 11],
            ScaleKind::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleKind::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            ScaleKind::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            ScaleKind::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            ScaleKind::MajorBlues => &[0, 2, 3, 4, 7, 9],
            ScaleKind::MinorBlues => &[0, 3, 5, 6, 7, 10],
        }
    }
}

impl fmt::Display for ScaleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScaleKind {
    type Err = MusigenError;

    fn from_str(s: &str) -> Result<Self> {
        ScaleKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| MusigenError::UnknownScale(s.to_string()))
    }
}

/// A concrete scale spanning `octaves` octaves upwards from `root_octave`.
///
/// Degrees are zero-based indices into the flattened scale, so degree 0 is
/// the tonic in the root octave and degree `intervals().len()` is the tonic
/// one octave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
    pub key: Key,
    pub kind: ScaleKind,
    pub root_octave: u8,
    pub octaves: usize,
}

impl Scale {
    pub fn new(key: Key, kind: ScaleKind, root_octave: u8, octaves: usize) -> Self {
        Self {
            key,
            kind,
            root_octave,
            octaves,
        }
    }

    /// Number of degrees across all octaves.
    pub fn len(&self) -> usize {
        self.kind.intervals().len() * self.octaves
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// MIDI key of the tonic in the root octave (C4 = 60).
    pub fn root_midi(&self) -> u32 {
        12 * (u32::from(self.root_octave) + 1) + u32::from(self.key.semitone())
    }

    pub fn midi_note(&self, degree: usize) -> Result<u8> {
        if degree >= self.len() {
            return Err(MusigenError::IndexOutOfRange {
                index: degree,
                len: self.len(),
            });
        }

        let intervals = self.kind.intervals();
        let octave = (degree / intervals.len()) as u32;
        let note = self.root_midi() + 12 * octave + u32::from(intervals[degree % intervals.len()]);

        u8::try_from(note)
            .ok()
            .filter(|note| *note <= 127)
            .ok_or_else(|| {
                MusigenError::InvalidConfiguration(format!(
                    "degree {} of {} {} from octave {} is MIDI note {}, above 127",
                    degree, self.key, self.kind, self.root_octave, note
                ))
            })
    }

    /// MIDI key of the highest degree.
    pub fn highest_midi(&self) -> Result<u8> {
        self.midi_note(self.len().saturating_sub(1))
    }
}

/// Sharp-spelled note name of a MIDI key, e.g. 61 -> "C#4".
pub fn note_name(midi: u8) -> String {
    const NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
    let octave = i32::from(midi / 12) - 1;
    format!("{}{}", NAMES[usize::from(midi % 12)], octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_names() {
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(61), "C#4");
        assert_eq!(note_name(0), "C-1");
        assert_eq!(note_name(127), "G9");
    }

    #[test]
    fn test_middle_c_major() {
        let scale = Scale::new(Key::C, ScaleKind::Major, 4, 2);

        assert_eq!(scale.len(), 14);
        assert_eq!(scale.midi_note(0).unwrap(), 60);
        assert_eq!(scale.midi_note(2).unwrap(), 64);
        assert_eq!(scale.midi_note(7).unwrap(), 72);
        assert_eq!(scale.midi_note(13).unwrap(), 83);
    }

    #[test]
    fn test_enharmonic_keys_share_semitone() {
        assert_eq!(Key::CSharp.semitone(), Key::DFlat.semitone());
        assert_eq!(Key::ASharp.semitone(), Key::BFlat.semitone());
    }

    #[test]
    fn test_names_parse_back() {
        for key in Key::ALL {
            assert_eq!(key.name().parse::<Key>().unwrap(), key);
        }
        for kind in ScaleKind::ALL {
            assert_eq!(kind.name().parse::<ScaleKind>().unwrap(), kind);
        }
        assert!(matches!("H".parse::<Key>(), Err(MusigenError::UnknownKey(_))));
        assert!(matches!(
            "minorH".parse::<ScaleKind>(),
            Err(MusigenError::UnknownScale(_))
        ));
    }

    #[test]
    fn test_degree_out_of_range() {
        let scale = Scale::new(Key::A, ScaleKind::MinorBlues, 3, 1);
        assert!(matches!(
            scale.midi_note(6),
            Err(MusigenError::IndexOutOfRange { index: 6, len: 6 })
        ));
    }

    #[test]
    fn test_note_above_midi_range_rejected() {
        let scale = Scale::new(Key::B, ScaleKind::Major, 9, 2);
        assert!(scale.highest_midi().is_err());
    }
}
