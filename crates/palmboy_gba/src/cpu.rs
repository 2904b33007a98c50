use crate::machine::AgbBus;

mod alu;
mod arm;
mod thumb;

// CPSR flag bits.
pub(crate) const FLAG_N: u32 = 1 << 31;
pub(crate) const FLAG_Z: u32 = 1 << 30;
pub(crate) const FLAG_C: u32 = 1 << 29;
pub(crate) const FLAG_V: u32 = 1 << 28;
pub(crate) const FLAG_I: u32 = 1 << 7;
pub(crate) const FLAG_F: u32 = 1 << 6;
pub(crate) const FLAG_T: u32 = 1 << 5;

pub(crate) const SIGN_BIT: u32 = 1 << 31;

pub(crate) const SP: usize = 13;
pub(crate) const LR: usize = 14;
pub(crate) const PC: usize = 15;

/// Processor modes (CPSR bits 4..0).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    User = 0x10,
    Fiq = 0x11,
    Irq = 0x12,
    Supervisor = 0x13,
    Abort = 0x17,
    Undefined = 0x1B,
    System = 0x1F,
}

impl Mode {
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0x1F {
            0x10 => Mode::User,
            0x11 => Mode::Fiq,
            0x12 => Mode::Irq,
            0x13 => Mode::Supervisor,
            0x17 => Mode::Abort,
            0x1B => Mode::Undefined,
            _ => Mode::System,
        }
    }

    /// Index into the SPSR bank, for modes that have one.
    fn spsr_index(self) -> Option<usize> {
        match self {
            Mode::Fiq => Some(0),
            Mode::Supervisor => Some(1),
            Mode::Abort => Some(2),
            Mode::Irq => Some(3),
            Mode::Undefined => Some(4),
            Mode::User | Mode::System => None,
        }
    }
}

// Physical register-file layout. The first 16 slots are the user/system
// bank; banked SP/LR pairs and the FIQ high registers follow. The visible
// registers are selected through `map`.
const PHYS_FIQ_R8: usize = 16; // R8..R12
const PHYS_FIQ_SP: usize = 21; // SP, LR
const PHYS_SVC_SP: usize = 23;
const PHYS_ABT_SP: usize = 25;
const PHYS_IRQ_SP: usize = 27;
const PHYS_UND_SP: usize = 29;
const PHYS_SLOTS: usize = 31;

/// Diagnostic record for a fatal decode failure: the undecodable opcode
/// and the address it was fetched from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fault {
    pub opcode: u32,
    pub pc: u32,
}

/// ARM7TDMI interpreter.
///
/// The register file is a flat array of physical slots plus a per-mode
/// index map; a mode change only rewrites the map. `step` executes one ARM
/// or THUMB instruction depending on CPSR.T and returns consumed cycles
/// (S + N + I).
pub struct Cpu {
    regs: [u32; PHYS_SLOTS],
    /// Logical register index -> physical slot for the current mode.
    map: [usize; 16],
    pub cpsr: u32,
    /// Saved CPSR per privileged mode: FIQ, SVC, ABT, IRQ, UND.
    spsr: [u32; 5],
    pub halted: bool,
    /// Fetch timings for the current PC region, refreshed on every branch.
    pub(crate) pc_s_cycles: u32,
    pub(crate) pc_n_cycles: u32,
    fault: Option<Fault>,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            regs: [0; PHYS_SLOTS],
            map: [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
            cpsr: Mode::Supervisor as u32 | FLAG_I | FLAG_F,
            spsr: [0; 5],
            halted: false,
            pc_s_cycles: 1,
            pc_n_cycles: 1,
            fault: None,
        }
    }

    /// Restore the documented reset state: supervisor mode with IRQ/FIQ
    /// masked, ARM state, PC at the reset vector.
    pub fn reset(&mut self, bus: &AgbBus) {
        self.regs = [0; PHYS_SLOTS];
        self.spsr = [0; 5];
        self.cpsr = Mode::Supervisor as u32 | FLAG_I | FLAG_F;
        self.halted = false;
        self.fault = None;
        self.mode_changed();
        self.update_arm_pc(bus);
    }

    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    pub fn mode(&self) -> Mode {
        Mode::from_bits(self.cpsr)
    }

    #[inline]
    pub(crate) fn thumb(&self) -> bool {
        self.cpsr & FLAG_T != 0
    }

    /// Read a register through the current mode's bank map.
    #[inline]
    pub(crate) fn reg(&self, r: usize) -> u32 {
        self.regs[self.map[r]]
    }

    #[inline]
    pub(crate) fn set_reg(&mut self, r: usize, value: u32) {
        self.regs[self.map[r]] = value;
    }

    /// Read a register from the user bank regardless of mode (LDM/STM with
    /// the S bit).
    #[inline]
    pub(crate) fn user_reg(&self, r: usize) -> u32 {
        self.regs[r]
    }

    #[inline]
    pub(crate) fn set_user_reg(&mut self, r: usize, value: u32) {
        self.regs[r] = value;
    }

    #[inline]
    pub(crate) fn pc(&self) -> u32 {
        self.regs[PC]
    }

    #[inline]
    pub(crate) fn set_pc(&mut self, value: u32) {
        self.regs[PC] = value;
    }

    /// Rebuild the logical->physical map after a CPSR mode-bits change.
    pub(crate) fn mode_changed(&mut self) {
        let mut map = [0usize, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];

        match self.mode() {
            Mode::User | Mode::System => {}
            Mode::Fiq => {
                for i in 0..5 {
                    map[8 + i] = PHYS_FIQ_R8 + i;
                }
                map[SP] = PHYS_FIQ_SP;
                map[LR] = PHYS_FIQ_SP + 1;
            }
            Mode::Supervisor => {
                map[SP] = PHYS_SVC_SP;
                map[LR] = PHYS_SVC_SP + 1;
            }
            Mode::Abort => {
                map[SP] = PHYS_ABT_SP;
                map[LR] = PHYS_ABT_SP + 1;
            }
            Mode::Irq => {
                map[SP] = PHYS_IRQ_SP;
                map[LR] = PHYS_IRQ_SP + 1;
            }
            Mode::Undefined => {
                map[SP] = PHYS_UND_SP;
                map[LR] = PHYS_UND_SP + 1;
            }
        }

        self.map = map;
    }

    /// SPSR of the current mode. User/system have none; reads fall back to
    /// CPSR, writes go nowhere.
    pub(crate) fn spsr(&self) -> u32 {
        match self.mode().spsr_index() {
            Some(i) => self.spsr[i],
            None => self.cpsr,
        }
    }

    pub(crate) fn set_spsr(&mut self, value: u32) {
        if let Some(i) = self.mode().spsr_index() {
            self.spsr[i] = value;
        }
    }

    pub(crate) fn set_spsr_masked(&mut self, value: u32, mask: u32) {
        if let Some(i) = self.mode().spsr_index() {
            self.spsr[i] = (self.spsr[i] & !mask) | (value & mask);
        }
    }

    /// Refresh the cached fetch timings after a PC change in ARM state.
    pub(crate) fn update_arm_pc(&mut self, bus: &AgbBus) {
        let pc = self.regs[PC];
        self.pc_s_cycles = bus.access_cycles(pc, 4, true);
        self.pc_n_cycles = bus.access_cycles(pc, 4, false);
    }

    /// Refresh the cached fetch timings after a PC change in THUMB state.
    pub(crate) fn update_thumb_pc(&mut self, bus: &AgbBus) {
        let pc = self.regs[PC];
        self.pc_s_cycles = bus.access_cycles(pc, 2, true);
        self.pc_n_cycles = bus.access_cycles(pc, 2, false);
    }

    /// Execute one instruction and return consumed cycles; 0 means the CPU
    /// has locked on an undecodable instruction.
    pub fn step(&mut self, bus: &mut AgbBus) -> u32 {
        if self.fault.is_some() {
            return 0;
        }

        if self.thumb() {
            self.execute_thumb(bus)
        } else {
            self.execute_arm(bus)
        }
    }

    pub(crate) fn lock(&mut self, opcode: u32, pc: u32) {
        log::error!("undecodable instruction {opcode:#010X} at {pc:#010X}; locking CPU");
        self.fault = Some(Fault { opcode, pc });
    }

    /// Take the IRQ exception if IRQs are unmasked.
    ///
    /// Pending interrupt bits in IF are left for the handler to acknowledge.
    pub fn service_interrupts(&mut self, bus: &AgbBus) -> bool {
        if self.cpsr & FLAG_I != 0 {
            return false;
        }

        self.halted = false;

        let ret = self.regs[PC].wrapping_add(4);
        self.spsr[Mode::Irq.spsr_index().unwrap()] = self.cpsr;

        self.regs[PC] = 0x18;
        self.cpsr = (self.cpsr & !(0x1F | FLAG_T)) | FLAG_I | Mode::Irq as u32;
        self.mode_changed();
        self.update_arm_pc(bus);
        self.set_reg(LR, ret);
        true
    }

    /// Software-interrupt exception entry. `ret` is the return address to
    /// bank into LR_svc.
    pub(crate) fn exception_swi(&mut self, bus: &AgbBus, ret: u32) {
        self.spsr[Mode::Supervisor.spsr_index().unwrap()] = self.cpsr;

        self.regs[PC] = 0x08;
        self.cpsr = (self.cpsr & !(0x1F | FLAG_T)) | FLAG_I | Mode::Supervisor as u32;
        self.mode_changed();
        self.update_arm_pc(bus);
        self.set_reg(LR, ret);
    }
}

#[cfg(test)]
mod tests;
