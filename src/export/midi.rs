// MIDI output for decoded melodies.
//
// Writes a single-track Standard MIDI File: a tempo and track name header,
// then for every sounding event one note per distinct step pitch, all on
// channel 0, lasting the event's beat duration. Rests only advance time.
//
// Uses the `midly` crate for MIDI writing.

use crate::config::TuneMetadata;
use crate::engines::melody::{decode, Melody};
use crate::error::{MusigenError, Result};
use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};
use std::path::Path;

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

const TRACK_NAME: &[u8] = b"musigen";

const MICROS_PER_MINUTE: u32 = 60_000_000;
// Tempo meta events carry 24 bits.
const MAX_TEMPO: u32 = 0xFF_FFFF;

fn beats_to_ticks(beats: f64) -> u32 {
    (beats * f64::from(TICKS_PER_QUARTER)).round() as u32
}

fn note_event(delta: u32, message: MidiMessage) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(0),
            message,
        },
    }
}

/// Microseconds per quarter note at `bpm`.
fn tempo(bpm: u32) -> Result<u24> {
    let micros = MICROS_PER_MINUTE.checked_div(bpm).unwrap_or(u32::MAX);
    if micros > MAX_TEMPO {
        return Err(MusigenError::InvalidConfiguration(format!(
            "{} bpm is too slow for a MIDI tempo",
            bpm
        )));
    }
    Ok(u24::new(micros))
}

/// Convert a melody to an in-memory SMF.
pub fn melody_to_smf(melody: &Melody, tune: &TuneMetadata) -> Result<Smf<'static>> {
    melody.check_aligned()?;

    let scale = tune.scale();
    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    let mut track: Track<'static> = Vec::new();
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(TRACK_NAME)),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(tempo(tune.bpm)?)),
    });

    // Ticks are derived from absolute beat positions so uneven note lengths
    // do not accumulate rounding drift.
    let mut last_tick: u32 = 0;
    for event in melody.events() {
        if event.is_rest() {
            continue;
        }

        let start = beats_to_ticks(event.start);
        let end = beats_to_ticks(event.start + event.duration);

        let mut keys = event
            .degrees
            .iter()
            .map(|degree| scale.midi_note(*degree))
            .collect::<Result<Vec<u8>>>()?;
        keys.sort_unstable();
        keys.dedup();

        for (i, key) in keys.iter().enumerate() {
            let delta = if i == 0 { start - last_tick } else { 0 };
            track.push(note_event(
                delta,
                MidiMessage::NoteOn {
                    key: u7::new(*key),
                    vel: u7::new(event.velocity),
                },
            ));
        }
        for (i, key) in keys.iter().enumerate() {
            let delta = if i == 0 { end - start } else { 0 };
            track.push(note_event(
                delta,
                MidiMessage::NoteOff {
                    key: u7::new(*key),
                    vel: u7::new(0),
                },
            ));
        }
        last_tick = end;
    }

    let total = beats_to_ticks(melody.total_beats());
    track.push(TrackEvent {
        delta: u28::new(total.saturating_sub(last_tick)),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    smf.tracks.push(track);
    Ok(smf)
}

pub fn melody_to_midi_bytes(melody: &Melody, tune: &TuneMetadata) -> Result<Vec<u8>> {
    let smf = melody_to_smf(melody, tune)?;
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    Ok(buf)
}

/// Decode `genome` and write it as a MIDI file, creating parent directories.
pub fn save_genome_to_midi<P: AsRef<Path>>(path: P, genome: &[u8], tune: &TuneMetadata) -> Result<()> {
    let path = path.as_ref();
    let melody = decode(genome, tune)?;
    let bytes = melody_to_midi_bytes(&melody, tune)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;

    log::info!("Saved {} events to {}", melody.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MusigenError;

    fn one_bar(num_steps: usize) -> TuneMetadata {
        TuneMetadata {
            num_bars: 1,
            notes_per_bar: 4,
            num_steps,
            ..Default::default()
        }
    }

    fn note_ons(smf: &Smf) -> Vec<(u32, u8)> {
        let mut tick = 0;
        let mut ons = Vec::new();
        for event in &smf.tracks[0] {
            tick += event.delta.as_int();
            if let TrackEventKind::Midi {
                message: MidiMessage::NoteOn { key, vel },
                ..
            } = event.kind
            {
                if vel.as_int() > 0 {
                    ons.push((tick, key.as_int()));
                }
            }
        }
        ons
    }

    #[test]
    fn test_rest_shifts_following_note() {
        // Values 0, 0, 8, 2: C4 for two beats, a rest, E4.
        let genome = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1, 0, 0];
        let tune = one_bar(1);
        let melody = decode(&genome, &tune).unwrap();

        let bytes = melody_to_midi_bytes(&melody, &tune).unwrap();
        let smf = Smf::parse(&bytes).unwrap();

        assert_eq!(note_ons(&smf), vec![(0, 60), (1440, 64)]);
    }

    #[test]
    fn test_steps_sound_together() {
        let genome = [0; 16];
        let tune = one_bar(2);
        let melody = decode(&genome, &tune).unwrap();
        let smf = melody_to_smf(&melody, &tune).unwrap();

        assert_eq!(note_ons(&smf), vec![(0, 60), (0, 64)]);
    }

    #[test]
    fn test_end_of_track_after_trailing_rest() {
        // Values 1, 8, 8, 8.
        let genome = [1, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1];
        let tune = one_bar(1);
        let melody = decode(&genome, &tune).unwrap();
        let smf = melody_to_smf(&melody, &tune).unwrap();

        let total: u32 = smf.tracks[0].iter().map(|e| e.delta.as_int()).sum();
        assert_eq!(total, 4 * u32::from(TICKS_PER_QUARTER));
    }

    #[test]
    fn test_misaligned_melody_rejected() {
        let melody = Melody {
            notes: vec![vec![0]],
            velocity: vec![127, 0],
            beat: vec![1.0, 1.0],
        };
        assert!(matches!(
            melody_to_smf(&melody, &one_bar(1)),
            Err(MusigenError::InvariantViolation(_))
        ));
    }

    fn tempo_of(smf: &Smf) -> Option<u32> {
        smf.tracks[0].iter().find_map(|event| match event.kind {
            TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => Some(tempo.as_int()),
            _ => None,
        })
    }

    #[test]
    fn test_tempo_written_exactly() {
        let genome = [0; 16];
        let tune = TuneMetadata { bpm: 4, ..one_bar(1) };
        let melody = decode(&genome, &tune).unwrap();
        let smf = melody_to_smf(&melody, &tune).unwrap();
        assert_eq!(tempo_of(&smf), Some(15_000_000));

        let tune = TuneMetadata { bpm: 128, ..one_bar(1) };
        let smf = melody_to_smf(&melody, &tune).unwrap();
        assert_eq!(tempo_of(&smf), Some(468_750));
    }

    #[test]
    fn test_tempo_too_slow_rejected() {
        let genome = [0; 16];
        let melody = decode(&genome, &one_bar(1)).unwrap();

        for bpm in [0, 2] {
            let tune = TuneMetadata { bpm, ..one_bar(1) };
            assert!(matches!(
                melody_to_smf(&melody, &tune),
                Err(MusigenError::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn test_save_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run").join("0").join("major-C-0.mid");

        save_genome_to_midi(&path, &[0; 16], &one_bar(1)).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"MThd"));
    }
}
