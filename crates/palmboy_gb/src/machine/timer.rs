/// Divider / timer unit.
///
/// A free-running 16-bit counter advances with the CPU clock; DIV exposes
/// its upper byte. TAC selects one counter bit (9, 3, 5 or 7), which is
/// ANDed with the enable flag; TIMA increments on each falling edge of the
/// resulting signal. On overflow TIMA reloads from TMA and the timer
/// interrupt is flagged.
pub(crate) struct Timer {
    div_counter: u16,
    tima: u8,
    tma: u8,
    tac: u8,
    enabled: bool,
    bit: u16,
    old_signal: bool,
    /// Timer interrupt raised during the last `step`, collected by the bus.
    pub(crate) pending_irq: bool,
}

/// Counter bit selected by TAC[1:0]: 4096/262144/65536/16384 Hz.
const TIMER_BITS: [u16; 4] = [1 << 9, 1 << 3, 1 << 5, 1 << 7];

impl Timer {
    pub(crate) fn new() -> Self {
        Self {
            div_counter: 0xABCC,
            tima: 0,
            tma: 0,
            tac: 0,
            enabled: false,
            bit: 1 << 9,
            old_signal: false,
            pending_irq: false,
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }

    /// Advance by the given number of retired T-cycles.
    ///
    /// The counter moves in 4-cycle (one machine cycle) steps; the falling
    /// edge of the selected bit is checked after each step.
    pub(crate) fn step(&mut self, cycles: u32) {
        if !self.enabled && !self.old_signal {
            self.div_counter = self.div_counter.wrapping_add(cycles as u16);
            return;
        }

        let mut remaining = cycles;
        while remaining > 0 {
            self.div_counter = self.div_counter.wrapping_add(4);

            let signal = self.enabled && (self.div_counter & self.bit) != 0;

            if self.old_signal && !signal {
                let (next, overflow) = self.tima.overflowing_add(1);
                if overflow {
                    self.tima = self.tma;
                    self.pending_irq = true;
                } else {
                    self.tima = next;
                }
            }

            self.old_signal = signal;
            remaining = remaining.saturating_sub(4);
        }
    }

    pub(crate) fn read_div(&self) -> u8 {
        (self.div_counter >> 8) as u8
    }

    /// Any DIV write clears the whole internal counter.
    pub(crate) fn write_div(&mut self) {
        self.div_counter = 0;
    }

    pub(crate) fn read_tima(&self) -> u8 {
        self.tima
    }

    pub(crate) fn write_tima(&mut self, value: u8) {
        self.tima = value;
    }

    pub(crate) fn read_tma(&self) -> u8 {
        self.tma
    }

    pub(crate) fn write_tma(&mut self, value: u8) {
        self.tma = value;
    }

    pub(crate) fn read_tac(&self) -> u8 {
        self.tac | 0xF8
    }

    pub(crate) fn write_tac(&mut self, value: u8) {
        self.tac = value & 0x07;
        self.enabled = value & 0x04 != 0;
        self.bit = TIMER_BITS[(value & 0x03) as usize];
    }

    #[cfg(test)]
    pub(crate) fn set_div_counter(&mut self, value: u16) {
        self.div_counter = value;
    }

    #[cfg(test)]
    pub(crate) fn tima(&self) -> u8 {
        self.tima
    }
}
