mod chunk;
mod client;

pub use chunk::{MAX_CHUNK_CHARS, split_text};
pub use client::{GoogleTts, SpeechSynthesizer};
