pub mod decoder;
pub mod scale;

pub use decoder::{decode, int_from_bits, Melody, MelodyEvent};
pub use scale::{Key, Scale, ScaleKind};
