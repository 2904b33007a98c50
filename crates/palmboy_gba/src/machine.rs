mod bus;
mod dma;
mod gba;
mod timers;

pub(crate) use bus::AgbBus;
pub use bus::{AudioHooks, RomError, SaveType, VideoHooks};
pub use gba::GameBoyAdvance;

/// Interrupt source bits (IE/IF).
pub mod irq {
    pub const VBLANK: u16 = 1 << 0;
    pub const HBLANK: u16 = 1 << 1;
    pub const VCOUNT: u16 = 1 << 2;
    pub const TIMER0: u16 = 1 << 3;
    pub const TIMER1: u16 = 1 << 4;
    pub const TIMER2: u16 = 1 << 5;
    pub const TIMER3: u16 = 1 << 6;
    pub const SERIAL: u16 = 1 << 7;
    pub const DMA0: u16 = 1 << 8;
    pub const DMA1: u16 = 1 << 9;
    pub const DMA2: u16 = 1 << 10;
    pub const DMA3: u16 = 1 << 11;
    pub const KEYPAD: u16 = 1 << 12;
    pub const GAMEPAK: u16 = 1 << 13;
}

/// DMA trigger events announced by the host/display driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DmaEvent {
    VBlank,
    HBlank,
}
