use crate::config::TuneMetadata;
use crate::error::{MusigenError, Result};
use serde::{Deserialize, Serialize};

pub const VELOCITY_SOUNDING: u8 = 127;
pub const VELOCITY_REST: u8 = 0;

/// Widest slot `decode` accepts.
pub const MAX_BITS_PER_NOTE: usize = 16;

/// Decoded melody.
///
/// `notes` holds one sequence of scale degrees per harmonic step. Every step
/// shares the `velocity` and `beat` sequences, so all of them have the same
/// length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Melody {
    pub notes: Vec<Vec<usize>>,
    pub velocity: Vec<u8>,
    /// Durations in quarter notes.
    pub beat: Vec<f64>,
}

/// One event of a melody with its absolute start time.
#[derive(Debug, Clone, PartialEq)]
pub struct MelodyEvent {
    pub start: f64,
    pub duration: f64,
    pub velocity: u8,
    /// Degree of every harmonic step at this event.
    pub degrees: Vec<usize>,
}

impl MelodyEvent {
    pub fn is_rest(&self) -> bool {
        self.velocity == VELOCITY_REST
    }
}

impl Melody {
    pub fn len(&self) -> usize {
        self.velocity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.velocity.is_empty()
    }

    pub fn total_beats(&self) -> f64 {
        self.beat.iter().sum()
    }

    /// Events in playing order. A misaligned melody yields only the slots
    /// every sequence covers; see `check_aligned`.
    pub fn events(&self) -> impl Iterator<Item = MelodyEvent> + '_ {
        let mut start = 0.0;
        self.velocity
            .iter()
            .zip(&self.beat)
            .enumerate()
            .map_while(move |(i, (velocity, duration))| {
                let degrees = self
                    .notes
                    .iter()
                    .map(|step| step.get(i).copied())
                    .collect::<Option<Vec<usize>>>()?;
                let event = MelodyEvent {
                    start,
                    duration: *duration,
                    velocity: *velocity,
                    degrees,
                };
                start += duration;
                Some(event)
            })
    }

    /// Fails with `InvariantViolation` unless every step, `velocity` and
    /// `beat` have the same length.
    pub fn check_aligned(&self) -> Result<()> {
        let len = self.velocity.len();
        if self.beat.len() != len {
            return Err(MusigenError::InvariantViolation(format!(
                "{} beats for {} velocities",
                self.beat.len(),
                len
            )));
        }
        if let Some((step, notes)) = self.notes.iter().enumerate().find(|(_, n)| n.len() != len) {
            return Err(MusigenError::InvariantViolation(format!(
                "step {} has {} notes for {} velocities",
                step,
                notes.len(),
                len
            )));
        }
        Ok(())
    }
}

/// Little-endian value of a chunk: bit `i` is worth `2^i`. Bits past the
/// 32nd are ignored.
pub fn int_from_bits(bits: &[u8]) -> u32 {
    bits.iter()
        .take(u32::BITS as usize)
        .enumerate()
        .fold(0, |value, (i, bit)| value | (u32::from(*bit & 1) << i))
}

/// Decode a genome into a melody.
///
/// Each `bits_per_note` chunk is one slot. Values at or above
/// `2^(bits_per_note - 1)` are rests when pauses are allowed and wrap around
/// otherwise. A sounding value equal to the sounding event right before it
/// lengthens that event instead of starting a new one; rests never merge.
pub fn decode(genome: &[u8], tune: &TuneMetadata) -> Result<Melody> {
    if genome.len() != tune.genome_length() {
        return Err(MusigenError::LengthMismatch {
            expected: tune.genome_length(),
            actual: genome.len(),
        });
    }
    if !(1..=MAX_BITS_PER_NOTE).contains(&tune.bits_per_note) {
        return Err(MusigenError::InvalidConfiguration(format!(
            "bits_per_note must be between 1 and {}, got {}",
            MAX_BITS_PER_NOTE, tune.bits_per_note
        )));
    }
    if tune.notes_per_bar == 0 {
        return Err(MusigenError::InvalidConfiguration(
            "notes_per_bar must be positive".to_string(),
        ));
    }

    let scale_len = tune.scale().len();
    if scale_len == 0 {
        return Err(MusigenError::InvalidConfiguration("scale has no degrees".to_string()));
    }

    let note_length = tune.note_length();
    let pause_threshold = 1u32 << (tune.bits_per_note - 1);

    let mut values: Vec<u32> = Vec::with_capacity(tune.num_slots());
    let mut velocity: Vec<u8> = Vec::with_capacity(tune.num_slots());
    let mut beat: Vec<f64> = Vec::with_capacity(tune.num_slots());

    for chunk in genome.chunks(tune.bits_per_note) {
        let mut value = int_from_bits(chunk);
        if !tune.pauses {
            value %= pause_threshold;
        }

        if value >= pause_threshold {
            values.push(0);
            velocity.push(VELOCITY_REST);
            beat.push(note_length);
            continue;
        }

        let extends_previous = velocity.last() == Some(&VELOCITY_SOUNDING) && values.last() == Some(&value);
        if extends_previous {
            if let Some(last) = beat.last_mut() {
                *last += note_length;
            }
        } else {
            values.push(value);
            velocity.push(VELOCITY_SOUNDING);
            beat.push(note_length);
        }
    }

    let notes = (0..tune.num_steps)
        .map(|step| {
            values
                .iter()
                .map(|value| (*value as usize + step * 2) % scale_len)
                .collect()
        })
        .collect();

    let melody = Melody { notes, velocity, beat };
    melody.check_aligned()?;

    log::debug!(
        "Decoded {} slots into {} events over {} beats",
        tune.num_slots(),
        melody.len(),
        melody.total_beats()
    );
    Ok(melody)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_bar() -> TuneMetadata {
        TuneMetadata {
            num_bars: 1,
            notes_per_bar: 4,
            num_steps: 1,
            pauses: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_int_from_bits_little_endian() {
        assert_eq!(int_from_bits(&[0, 0, 0, 0]), 0);
        assert_eq!(int_from_bits(&[1, 0, 0, 0]), 1);
        assert_eq!(int_from_bits(&[0, 0, 0, 1]), 8);
        assert_eq!(int_from_bits(&[1, 1, 0, 1]), 11);
    }

    #[test]
    fn test_alternating_values_stay_separate() {
        // Values 0, 1, 0, 1.
        let genome = [0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0];
        let melody = decode(&genome, &one_bar()).unwrap();

        assert_eq!(melody.notes, vec![vec![0, 1, 0, 1]]);
        assert_eq!(melody.velocity, vec![127; 4]);
        assert_eq!(melody.beat, vec![1.0; 4]);
    }

    #[test]
    fn test_wide_slots_rejected() {
        let tune = TuneMetadata {
            num_bars: 1,
            notes_per_bar: 1,
            bits_per_note: 40,
            ..Default::default()
        };
        let result = decode(&vec![0; 40], &tune);
        assert!(matches!(result, Err(MusigenError::InvalidConfiguration(_))));

        let tune = TuneMetadata {
            bits_per_note: 17,
            ..tune
        };
        let result = decode(&vec![0; 17], &tune);
        assert!(matches!(result, Err(MusigenError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_int_from_bits_ignores_high_bits() {
        assert_eq!(int_from_bits(&[1; 40]), u32::MAX);
    }

    #[test]
    fn test_equal_neighbours_merge() {
        // Values 0, 0, 1, 1.
        let genome = [0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0];
        let melody = decode(&genome, &one_bar()).unwrap();

        assert_eq!(melody.notes, vec![vec![0, 1]]);
        assert_eq!(melody.velocity, vec![127, 127]);
        assert_eq!(melody.beat, vec![2.0, 2.0]);
    }

    #[test]
    fn test_rests_never_merge() {
        // Values 0, 0, 8, 8: one long note then two rests.
        let genome = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1];
        let melody = decode(&genome, &one_bar()).unwrap();

        assert_eq!(melody.velocity, vec![127, 0, 0]);
        assert_eq!(melody.beat, vec![2.0, 1.0, 1.0]);
        assert_eq!(melody.notes[0].len(), 3);
        assert!((melody.total_beats() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pitch_zero_after_rest_starts_new_note() {
        // Values 8, 0.
        let tune = TuneMetadata {
            notes_per_bar: 2,
            ..one_bar()
        };
        let genome = [0, 0, 0, 1, 0, 0, 0, 0];
        let melody = decode(&genome, &tune).unwrap();

        assert_eq!(melody.velocity, vec![0, 127]);
        assert_eq!(melody.beat, vec![2.0, 2.0]);
    }

    #[test]
    fn test_pauses_disabled_wraps_values() {
        let tune = TuneMetadata {
            pauses: false,
            ..one_bar()
        };
        // Values 9, 1, 15, 7 reduce to 1, 1, 7, 7.
        let genome = [1, 0, 0, 1, 1, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 0];
        let melody = decode(&genome, &tune).unwrap();

        assert_eq!(melody.velocity, vec![127, 127]);
        assert_eq!(melody.notes, vec![vec![1, 7]]);
        assert_eq!(melody.beat, vec![2.0, 2.0]);
    }

    #[test]
    fn test_steps_stack_thirds() {
        let tune = TuneMetadata {
            num_steps: 3,
            octaves: 1,
            ..one_bar()
        };
        // Values 5, 6, 3, 8.
        let genome = [1, 0, 1, 0, 0, 1, 1, 0, 1, 1, 0, 0, 0, 0, 0, 1];
        let melody = decode(&genome, &tune).unwrap();

        assert_eq!(melody.notes[0], vec![5, 6, 3, 0]);
        assert_eq!(melody.notes[1], vec![0, 1, 5, 2]);
        assert_eq!(melody.notes[2], vec![2, 3, 0, 4]);
        assert!(melody.check_aligned().is_ok());
    }

    #[test]
    fn test_wrong_length_rejected() {
        let result = decode(&[0, 1, 0], &one_bar());
        assert!(matches!(
            result,
            Err(MusigenError::LengthMismatch { expected: 16, actual: 3 })
        ));
    }

    #[test]
    fn test_misaligned_melody_is_invariant_violation() {
        let melody = Melody {
            notes: vec![vec![0, 1]],
            velocity: vec![127],
            beat: vec![1.0],
        };
        assert!(matches!(
            melody.check_aligned(),
            Err(MusigenError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_events_stop_at_misaligned_slot() {
        let melody = Melody {
            notes: vec![vec![0]],
            velocity: vec![127, 127, 0],
            beat: vec![1.0, 1.0],
        };
        let events: Vec<MelodyEvent> = melody.events().collect();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].degrees, vec![0]);
    }

    #[test]
    fn test_events_accumulate_start() {
        let genome = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 0, 0, 0];
        let melody = decode(&genome, &one_bar()).unwrap();
        let events: Vec<MelodyEvent> = melody.events().collect();

        assert_eq!(events.len(), 3);
        assert!((events[1].start - 2.0).abs() < f64::EPSILON);
        assert!(events[1].is_rest());
        assert!((events[2].start - 3.0).abs() < f64::EPSILON);
        assert_eq!(events[2].degrees, vec![1]);
    }
}
