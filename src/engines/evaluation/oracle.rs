use crate::config::TuneMetadata;
use crate::engines::generation::genome::{genome_to_string, Genome};
use crate::engines::melody::{decode, scale::note_name, Melody};
use crate::error::Result;
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::path::Path;

/// Source of fitness scores.
///
/// Called once per genome per generation, synchronously; the engine does not
/// advance until every genome has a score. Any integer is accepted.
pub trait FitnessOracle {
    fn score(&mut self, genome: &Genome, tune: &TuneMetadata) -> i64;
}

impl<F> FitnessOracle for F
where
    F: FnMut(&Genome, &TuneMetadata) -> i64,
{
    fn score(&mut self, genome: &Genome, tune: &TuneMetadata) -> i64 {
        self(genome, tune)
    }
}

/// Render a melody as note names and durations, e.g. `C4:2 -:1 E4:1`.
pub fn describe_melody(melody: &Melody, tune: &TuneMetadata) -> String {
    let scale = tune.scale();
    melody
        .events()
        .map(|event| {
            let pitch = if event.is_rest() {
                "-".to_string()
            } else {
                event
                    .degrees
                    .iter()
                    .map(|degree| scale.midi_note(*degree).map_or_else(|_| "?".to_string(), note_name))
                    .collect::<Vec<_>>()
                    .join("+")
            };
            format!("{}:{}", pitch, event.duration)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Asks a listener for a rating on a line-based console.
///
/// Lines that do not parse as an integer score 0, like an empty answer.
pub struct ConsoleRatingOracle<R, W> {
    input: R,
    output: W,
    prompt: String,
}

impl<R: BufRead, W: Write> ConsoleRatingOracle<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            prompt: "Rating (0-5)".to_string(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    fn ask(&mut self, genome: &Genome, tune: &TuneMetadata) -> Result<String> {
        match decode(genome, tune) {
            Ok(melody) => writeln!(self.output, "{}", describe_melody(&melody, tune))?,
            Err(e) => {
                log::warn!("Cannot decode genome {}: {}", genome_to_string(genome), e);
                writeln!(self.output, "{}", genome_to_string(genome))?;
            }
        }
        write!(self.output, "{}: ", self.prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line)
    }
}

impl ConsoleRatingOracle<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> FitnessOracle for ConsoleRatingOracle<R, W> {
    fn score(&mut self, genome: &Genome, tune: &TuneMetadata) -> i64 {
        match self.ask(genome, tune) {
            Ok(line) => line.trim().parse().unwrap_or_else(|_| {
                log::warn!("Unreadable rating '{}', scoring 0", line.trim());
                0
            }),
            Err(e) => {
                log::warn!("Rating prompt failed: {}, scoring 0", e);
                0
            }
        }
    }
}

/// Replays recorded scores in order, then scores 0.
#[derive(Debug, Clone, Default)]
pub struct ReplayOracle {
    scores: VecDeque<i64>,
}

impl ReplayOracle {
    pub fn new(scores: impl IntoIterator<Item = i64>) -> Self {
        Self {
            scores: scores.into_iter().collect(),
        }
    }

    /// Reads whitespace-separated integers; anything else is skipped with a
    /// warning.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::new(contents.split_whitespace().filter_map(|token| {
            token
                .parse()
                .map_err(|_| log::warn!("Skipping non-integer score '{}'", token))
                .ok()
        })))
    }

    pub fn remaining(&self) -> usize {
        self.scores.len()
    }
}

impl FitnessOracle for ReplayOracle {
    fn score(&mut self, _genome: &Genome, _tune: &TuneMetadata) -> i64 {
        self.scores.pop_front().unwrap_or_else(|| {
            log::warn!("Replay exhausted, scoring 0");
            0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tiny_tune() -> TuneMetadata {
        TuneMetadata {
            num_bars: 1,
            notes_per_bar: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_closure_oracle() {
        let mut ones = |genome: &Genome, _: &TuneMetadata| -> i64 { genome.iter().map(|b| i64::from(*b)).sum() };
        assert_eq!(ones.score(&vec![1, 0, 1], &tiny_tune()), 2);
    }

    #[test]
    fn test_console_oracle_reads_rating() {
        let mut output = Vec::new();
        let mut oracle = ConsoleRatingOracle::new(Cursor::new("4\n"), &mut output);

        // Values 0 then 8: C4 for two beats, then a rest.
        let score = oracle.score(&vec![0, 0, 0, 0, 0, 0, 0, 1], &tiny_tune());
        assert_eq!(score, 4);

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("C4:2 -:2"));
        assert!(printed.contains("Rating (0-5): "));
    }

    #[test]
    fn test_console_oracle_defaults_to_zero() {
        let mut oracle = ConsoleRatingOracle::new(Cursor::new("great\n"), Vec::new());
        assert_eq!(oracle.score(&vec![0; 8], &tiny_tune()), 0);

        let mut oracle = ConsoleRatingOracle::new(Cursor::new(""), Vec::new());
        assert_eq!(oracle.score(&vec![0; 8], &tiny_tune()), 0);
    }

    #[test]
    fn test_describe_misaligned_melody() {
        let melody = Melody {
            notes: vec![vec![0, 2]],
            velocity: vec![127, 127, 127],
            beat: vec![1.0, 1.0, 2.0],
        };
        assert_eq!(describe_melody(&melody, &tiny_tune()), "C4:1 E4:1");
    }

    #[test]
    fn test_replay_oracle() {
        let mut oracle = ReplayOracle::new([3, -1]);
        let tune = tiny_tune();

        assert_eq!(oracle.score(&vec![0; 8], &tune), 3);
        assert_eq!(oracle.score(&vec![0; 8], &tune), -1);
        assert_eq!(oracle.remaining(), 0);
        assert_eq!(oracle.score(&vec![0; 8], &tune), 0);
    }

    #[test]
    fn test_replay_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.txt");
        std::fs::write(&path, "1 2\nx 5\n").unwrap();

        let oracle = ReplayOracle::from_file(&path).unwrap();
        assert_eq!(oracle.remaining(), 3);
    }
}
