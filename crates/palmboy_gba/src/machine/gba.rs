use palmboy_common::{Console, Key};

use crate::cpu::Cpu;
use crate::CLOCK_SPEED;

use super::bus::{AgbBus, AudioHooks, RomError, SaveType, VideoHooks};
use super::{irq, DmaEvent};

const LCD_IRQS: u16 = irq::VBLANK | irq::HBLANK | irq::VCOUNT;

/// High-level Game Boy Advance machine.
///
/// Owns the ARM7TDMI core and the bus; the host drives it with `run` and
/// the input/interrupt/DMA entry points. Video and audio are collaborator
/// hooks installed on the bus.
pub struct GameBoyAdvance {
    pub cpu: Cpu,
    pub(crate) bus: AgbBus,
}

impl Default for GameBoyAdvance {
    fn default() -> Self {
        Self::new()
    }
}

impl GameBoyAdvance {
    pub fn new() -> Self {
        let mut gba = Self {
            cpu: Cpu::new(),
            bus: AgbBus::default(),
        };
        gba.reset();
        gba
    }

    /// Restore the documented reset state: supervisor mode with interrupts
    /// masked, ARM state, PC at the reset vector, wait states at their
    /// power-on defaults.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset(&self.bus);
    }

    /// Install a 16 KiB BIOS image.
    pub fn load_bios(&mut self, bios: &[u8]) -> Result<(), RomError> {
        self.bus.set_bios(bios)
    }

    /// Install a cartridge ROM (up to 32 MiB) and reset.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), RomError> {
        self.bus.set_cart_rom(rom)?;
        self.reset();
        Ok(())
    }

    /// Load a cartridge save blob; its size selects the save type
    /// (512/4096/8192 = EEPROM, 32 KiB = SRAM, 64/128 KiB = flash).
    pub fn load_save(&mut self, blob: &[u8]) -> Result<(), RomError> {
        self.bus.save.load(blob)
    }

    /// The live save bytes, sized for the detected save type (empty until
    /// a save device has been touched).
    pub fn save_data(&self) -> &[u8] {
        self.bus.save.data()
    }

    pub fn save_type(&self) -> SaveType {
        self.bus.save.save_type()
    }

    pub fn set_video_hooks(&mut self, hooks: Box<dyn VideoHooks>) {
        self.bus.set_video_hooks(hooks);
    }

    pub fn set_audio_hooks(&mut self, hooks: Box<dyn AudioHooks>) {
        self.bus.set_audio_hooks(hooks);
    }

    /// OR bits into IF (the display/serial collaborators raise their
    /// interrupts through this).
    pub fn flag_interrupt(&mut self, bits: u16) {
        self.bus.flag_interrupt(bits);
    }

    /// Announce a display boundary to the DMA unit.
    pub fn trigger_dma(&mut self, event: DmaEvent) {
        self.bus.trigger_dma(event);
    }

    /// Update the raw key state (1 = pressed; KEYINPUT reads active-low).
    pub fn set_inputs(&mut self, mask: u16) {
        self.bus.set_inputs(mask);
    }

    /// Run for roughly `ms` milliseconds of emulated time.
    pub fn run_ms(&mut self, ms: u32) {
        let mut cycles = (CLOCK_SPEED / 1000 * ms) as i64;

        while cycles > 0 {
            let mut exec: u32 = 1;

            if self.bus.dma_triggered != 0 {
                // Drain pending DMA channels in index order; the CPU does
                // not advance while a channel is active.
                exec = 0;
                for channel in 0..4 {
                    if self.bus.dma_triggered & (1 << channel) != 0 {
                        self.bus.dma_triggered &= !(1 << channel);
                        exec += self.bus.dma_transfer(channel);
                    }
                }
            } else if !self.cpu.halted {
                exec = self.cpu.step(&mut self.bus);
                if exec == 0 {
                    // Locked on an undecodable instruction.
                    return;
                }
            }

            loop {
                cycles -= exec as i64;
                self.bus.advance(exec);

                if self.bus.timers.any_irq_enabled() {
                    self.bus.update_timers();
                }

                if self.bus.enabled_interrupts() & LCD_IRQS != 0 {
                    self.bus.video_update();
                }

                if self.bus.current_interrupts() != 0 {
                    self.cpu.service_interrupts(&self.bus);
                }

                if self.bus.take_halt_request() {
                    self.cpu.halted = true;
                }

                if self.cpu.halted {
                    // Fast-forward to the next event. Timer-driven wakeups
                    // poll on a fixed 4-cycle granularity.
                    exec = if self.bus.timers.any_irq_enabled() {
                        4
                    } else {
                        let to_update = self.bus.video_cycles_to_next_update();
                        to_update.min(cycles.max(0) as u32).max(1)
                    };
                }

                if !(self.cpu.halted && cycles > 0) {
                    break;
                }
            }
        }
    }

    /// Execute a single instruction (for tests and debuggers). DMA and
    /// timers are advanced just as in `run_ms`.
    pub fn step(&mut self) -> u32 {
        let exec = if self.bus.dma_triggered != 0 {
            let mut total = 0;
            for channel in 0..4 {
                if self.bus.dma_triggered & (1 << channel) != 0 {
                    self.bus.dma_triggered &= !(1 << channel);
                    total += self.bus.dma_transfer(channel);
                }
            }
            total
        } else if self.cpu.halted {
            4
        } else {
            let cycles = self.cpu.step(&mut self.bus);
            if cycles == 0 {
                return 0;
            }
            cycles
        };

        self.bus.advance(exec);
        if self.bus.timers.any_irq_enabled() {
            self.bus.update_timers();
        }
        if self.bus.current_interrupts() != 0 {
            self.cpu.service_interrupts(&self.bus);
        }
        if self.bus.take_halt_request() {
            self.cpu.halted = true;
        }

        exec
    }
}

impl Console for GameBoyAdvance {
    fn reset(&mut self) {
        GameBoyAdvance::reset(self);
    }

    fn run(&mut self, ms: u32) {
        self.run_ms(ms);
    }

    /// Map host keys onto the key matrix (A/B, Select/Start, d-pad, L/R).
    fn handle_key(&mut self, key: Key, pressed: bool) {
        let bit = match key {
            Key::Z => 0,      // A
            Key::X => 1,      // B
            Key::A => 2,      // Select
            Key::S => 3,      // Start
            Key::Right => 4,
            Key::Left => 5,
            Key::Up => 6,
            Key::Down => 7,
            Key::R => 8,
            Key::L => 9,
            _ => return,
        };

        let mut mask = self.bus.inputs();
        if pressed {
            mask |= 1 << bit;
        } else {
            mask &= !(1 << bit);
        }
        self.set_inputs(mask);
    }
}
