pub mod cpu;
pub mod machine;

pub use machine::{AudioHooks, DmaEvent, GameBoyAdvance, RomError, SaveType, VideoHooks};

/// CPU clock in cycles per second (2^24 Hz).
pub const CLOCK_SPEED: u32 = 16_777_216;
