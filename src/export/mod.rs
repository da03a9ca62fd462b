pub mod midi;

pub use midi::{melody_to_midi_bytes, melody_to_smf, save_genome_to_midi};
