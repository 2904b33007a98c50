pub mod cpu;
pub mod machine;

pub use machine::{AudioHooks, Cartridge, FlatCartridge, GameBoy, RomError, VideoHooks};

/// CPU clock in T-cycles per second (single speed).
pub const CLOCK_SPEED: u32 = 4_194_304;
