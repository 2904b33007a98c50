use palmboy_common::{Console, Key};

use crate::cpu::Cpu;
use crate::CLOCK_SPEED;

use super::bus::{AudioHooks, VideoHooks};
use super::cartridge::{Cartridge, FlatCartridge, RomError};
use super::DmgBus;

/// High-level Game Boy machine.
///
/// Holds the CPU core and the bus; hosts drive it through `run` and the
/// input/interrupt entry points, and observe retired cycles via the cycle
/// callback (the hook the PPU/APU drivers pace themselves with).
pub struct GameBoy {
    pub cpu: Cpu,
    pub(crate) bus: DmgBus,
    cycle_callback: Option<Box<dyn FnMut(u32)>>,
}

impl Default for GameBoy {
    fn default() -> Self {
        Self::new()
    }
}

impl GameBoy {
    pub fn new() -> Self {
        let mut gb = Self {
            cpu: Cpu::new(),
            bus: DmgBus::default(),
            cycle_callback: None,
        };
        gb.reset();
        gb
    }

    /// Restore the documented post-boot state. The inserted cartridge and
    /// collaborator hooks are kept.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset(self.bus.color_mode);
    }

    /// Load a bankless ROM image and reset the machine.
    ///
    /// Oversized images are rejected at this boundary; banked cartridges
    /// are inserted via [`insert_cartridge`](Self::insert_cartridge).
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), RomError> {
        self.bus.cart = Box::new(FlatCartridge::new(rom)?);
        self.reset();
        Ok(())
    }

    /// Insert a host-supplied mapper implementation and reset the machine.
    pub fn insert_cartridge(&mut self, cart: Box<dyn Cartridge>) {
        self.bus.cart = cart;
        self.reset();
    }

    /// Battery-backed cartridge RAM, if the cartridge carries any.
    pub fn save_data(&self) -> Option<&[u8]> {
        self.bus.cart.save_data()
    }

    pub fn set_video_hooks(&mut self, hooks: Box<dyn VideoHooks>) {
        self.bus.set_video_hooks(hooks);
    }

    pub fn set_audio_hooks(&mut self, hooks: Box<dyn AudioHooks>) {
        self.bus.set_audio_hooks(hooks);
    }

    /// Observer invoked with the retired T-cycles after each step.
    pub fn set_cycle_callback(&mut self, callback: Box<dyn FnMut(u32)>) {
        self.cycle_callback = Some(callback);
    }

    /// OR a bit into the interrupt-pending register.
    pub fn flag_interrupt(&mut self, bit: u8) {
        self.bus.if_reg |= bit & 0x1F;
    }

    /// Execute one instruction (or one halted idle step) and advance the
    /// timers and collaborators. Returns the retired T-cycles; 0 means the
    /// CPU is stopped or locked.
    pub fn step(&mut self) -> u32 {
        if self.cpu.stopped {
            return 0;
        }

        let mut exec = if self.cpu.halted {
            4
        } else {
            let cycles = self.cpu.step(&mut self.bus);
            if cycles == 0 {
                // Locked on an undefined opcode.
                return 0;
            }
            cycles
        };

        exec += self.cpu.service_interrupts(&mut self.bus);

        self.bus.timer.step(exec);
        if self.bus.timer.pending_irq {
            self.bus.timer.pending_irq = false;
            self.bus.if_reg |= 0x04;
        }
        self.bus.tick_collaborators(exec);

        if let Some(callback) = self.cycle_callback.as_mut() {
            callback(exec);
        }

        exec
    }

    /// Run for roughly `ms` milliseconds of emulated time.
    ///
    /// The budget is doubled in double-speed mode. Returns early when the
    /// CPU enters STOP or locks up.
    pub fn run_ms(&mut self, ms: u32) {
        let mut budget = (CLOCK_SPEED / 1000 * ms) as i64;
        if self.bus.double_speed {
            budget *= 2;
        }

        while !self.cpu.stopped && budget > 0 {
            let exec = self.step();
            if exec == 0 {
                break;
            }
            budget -= exec as i64;
        }
    }

    /// Update joypad state from a host key event.
    ///
    /// - Z => A, X => B
    /// - A => Select, S => Start
    /// - Arrow keys => D-pad
    ///
    /// Any key press also wakes the CPU from STOP.
    pub fn handle_key_event(&mut self, key: Key, pressed: bool) {
        match key {
            Key::Right => self.bus.set_dpad_bit(0, pressed),
            Key::Left => self.bus.set_dpad_bit(1, pressed),
            Key::Up => self.bus.set_dpad_bit(2, pressed),
            Key::Down => self.bus.set_dpad_bit(3, pressed),
            Key::Z => self.bus.set_button_bit(0, pressed),
            Key::X => self.bus.set_button_bit(1, pressed),
            Key::A => self.bus.set_button_bit(2, pressed),
            Key::S => self.bus.set_button_bit(3, pressed),
            _ => return,
        }

        if pressed {
            self.cpu.stopped = false;
        }
    }
}

impl Console for GameBoy {
    fn reset(&mut self) {
        GameBoy::reset(self);
    }

    fn run(&mut self, ms: u32) {
        self.run_ms(ms);
    }

    fn handle_key(&mut self, key: Key, pressed: bool) {
        self.handle_key_event(key, pressed);
    }
}
