use super::cartridge::{Cartridge, FlatCartridge};
use super::timer::Timer;
use crate::cpu::Bus;

mod dma;
mod joypad;
mod mmio;
mod traits;

pub use traits::{AudioHooks, NullAudio, NullVideo, VideoHooks};

/// Address-decoded DMG/CGB bus.
///
/// Each region is a contiguous byte buffer owned by the bus; the cartridge
/// and the video/audio collaborators are trait objects reached only through
/// the register entry points.
pub(crate) struct DmgBus {
    /// Two 8 KiB VRAM banks; bank 1 only reachable in color mode via VBK.
    vram: [[u8; 0x2000]; 2],
    /// Eight 4 KiB WRAM banks; 0xC000 is always bank 0, 0xD000 is the
    /// SVBK-selected bank (fixed to 1 outside color mode).
    wram: [[u8; 0x1000]; 8],
    oam: [u8; 0xA0],
    hram: [u8; 0x7F],
    /// Backing store for IO registers without dedicated state.
    io: [u8; 0x80],
    pub(crate) if_reg: u8,
    pub(crate) ie_reg: u8,
    pub(crate) timer: Timer,
    pub(crate) cart: Box<dyn Cartridge>,
    video: Box<dyn VideoHooks>,
    audio: Box<dyn AudioHooks>,

    // Joypad matrix. Selection bits correspond to P1 bits 5 (buttons) and
    // 4 (d-pad); the masks use bit=1 for "pressed":
    // - joyp_buttons: bit0=A, bit1=B, bit2=Select, bit3=Start
    // - joyp_dpad:    bit0=Right, bit1=Left, bit2=Up, bit3=Down
    joyp_select: u8,
    joyp_buttons: u8,
    joyp_dpad: u8,

    pub(crate) color_mode: bool,
    vbk: u8,
    svbk: u8,
    /// KEY1 state: an armed switch request plus the current speed.
    speed_switch_armed: bool,
    pub(crate) double_speed: bool,
}

impl Default for DmgBus {
    fn default() -> Self {
        Self {
            vram: [[0; 0x2000]; 2],
            wram: [[0; 0x1000]; 8],
            oam: [0; 0xA0],
            hram: [0; 0x7F],
            io: [0; 0x80],
            if_reg: 0,
            ie_reg: 0,
            timer: Timer::new(),
            cart: Box::new(FlatCartridge::empty()),
            video: Box::new(NullVideo),
            audio: Box::new(NullAudio),
            joyp_select: 0x30,
            joyp_buttons: 0,
            joyp_dpad: 0,
            color_mode: false,
            vbk: 0,
            svbk: 1,
            speed_switch_armed: false,
            double_speed: false,
        }
    }
}

impl DmgBus {
    /// Restore power-on bus state. The cartridge and collaborator hooks
    /// survive a reset.
    pub(crate) fn reset(&mut self) {
        self.vram = [[0; 0x2000]; 2];
        self.wram = [[0; 0x1000]; 8];
        self.oam = [0; 0xA0];
        self.hram = [0; 0x7F];
        self.io = [0; 0x80];
        // No transfer active.
        self.io[0x55] = 0xFF;
        self.if_reg = 0;
        self.ie_reg = 0;
        self.timer.reset();
        self.joyp_select = 0x30;
        self.vbk = 0;
        self.svbk = 1;
        self.speed_switch_armed = false;
        self.double_speed = false;

        // Color mode is a property of the inserted cartridge. Only the two
        // defined CGB flag values count; an empty slot floats 0xFF.
        let flag = self.cart.rom_read(0x0143);
        self.color_mode = flag == 0x80 || flag == 0xC0;
    }

    pub(crate) fn set_video_hooks(&mut self, hooks: Box<dyn VideoHooks>) {
        self.video = hooks;
    }

    pub(crate) fn set_audio_hooks(&mut self, hooks: Box<dyn AudioHooks>) {
        self.audio = hooks;
    }

    /// Advance the video/audio collaborators by retired T-cycles.
    pub(crate) fn tick_collaborators(&mut self, cycles: u32) {
        self.video.update(cycles);
        self.audio.update(cycles);
    }

    #[inline]
    fn wram_bank(&self) -> usize {
        if self.color_mode {
            // SVBK bank 0 maps to bank 1.
            (self.svbk & 0x07).max(1) as usize
        } else {
            1
        }
    }

    #[inline]
    fn vram_bank(&self) -> usize {
        if self.color_mode {
            (self.vbk & 1) as usize
        } else {
            0
        }
    }
}

impl Bus for DmgBus {
    fn read8(&mut self, addr: u16) -> u8 {
        self.read8_mmio(addr)
    }

    fn write8(&mut self, addr: u16, value: u8) {
        self.write8_mmio(addr, value);
    }

    fn take_speed_switch(&mut self) -> bool {
        if self.speed_switch_armed {
            self.speed_switch_armed = false;
            self.double_speed = !self.double_speed;
            true
        } else {
            false
        }
    }
}
