pub mod hash;
pub mod share;

pub use hash::{decode_genome, decode_genomes, encode_genome, encode_genomes};
pub use share::ShareCode;
