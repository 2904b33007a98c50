mod bus;
mod cartridge;
mod gameboy;
mod timer;

pub(crate) use bus::DmgBus;
pub use bus::{AudioHooks, VideoHooks};
pub use cartridge::{Cartridge, FlatCartridge, RomError};
pub use gameboy::GameBoy;
