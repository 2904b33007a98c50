use super::irq;

/// Timer clock source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Prescaler {
    /// Divide the system clock by 1, 64, 256 or 1024.
    Div(u32),
    /// Tick when the previous timer overflows.
    CountUp,
}

impl Prescaler {
    pub(crate) fn divider(select: u16) -> Self {
        const DIVIDERS: [u32; 4] = [1, 64, 256, 1024];
        Prescaler::Div(DIVIDERS[(select & 3) as usize])
    }
}

/// Four 16-bit up-counters, advanced lazily from the retired-cycle count.
///
/// `update` catches the counters up to `cycle_count`; an overflow reloads
/// the counter from the given latch, raises the timer's interrupt when
/// armed, and feeds the next timer in count-up mode.
pub(crate) struct Timers {
    counters: [u16; 4],
    prescalers: [Prescaler; 4],
    enabled: u8,
    irq_enabled: u8,
    last_update: u64,
}

impl Timers {
    pub(crate) fn new() -> Self {
        Self {
            counters: [0; 4],
            prescalers: [Prescaler::Div(1); 4],
            enabled: 0,
            irq_enabled: 0,
            last_update: 0,
        }
    }

    pub(crate) fn counter(&self, index: usize) -> u16 {
        self.counters[index]
    }

    pub(crate) fn set_counter(&mut self, index: usize, value: u16) {
        self.counters[index] = value;
    }

    pub(crate) fn enable(&mut self, index: usize, prescaler: Prescaler, irq: bool) {
        self.prescalers[index] = prescaler;
        self.enabled |= 1 << index;
        if irq {
            self.irq_enabled |= 1 << index;
        } else {
            self.irq_enabled &= !(1 << index);
        }
    }

    pub(crate) fn disable(&mut self, index: usize) {
        self.enabled &= !(1 << index);
        self.irq_enabled &= !(1 << index);
    }

    /// Any timer interrupt armed? The scheduler only pays for per-loop
    /// catch-up while this holds.
    pub(crate) fn any_irq_enabled(&self) -> bool {
        self.irq_enabled != 0
    }

    /// Catch up to `cycle_count`. `reloads` are the TMxCNT_L latches.
    /// Returns the IF bits to raise.
    pub(crate) fn update(&mut self, cycle_count: u64, reloads: &[u16; 4]) -> u16 {
        let base = self.last_update;
        let passed = cycle_count - self.last_update;
        self.last_update = cycle_count;

        let mut raised = 0u16;
        let mut overflowed = 0u8;

        for i in 0..4 {
            if self.enabled & (1 << i) == 0 {
                continue;
            }

            let old = self.counters[i];

            match self.prescalers[i] {
                Prescaler::CountUp => {
                    if i > 0 && overflowed & (1 << (i - 1)) != 0 {
                        self.counters[i] = self.counters[i].wrapping_add(1);
                    }
                }
                Prescaler::Div(1) => {
                    self.counters[i] = self.counters[i].wrapping_add(passed as u16);
                }
                Prescaler::Div(div) => {
                    let ticks = (base & (div as u64 - 1)) + passed;
                    if ticks >= div as u64 {
                        self.counters[i] =
                            self.counters[i].wrapping_add((ticks / div as u64) as u16);
                    }
                }
            }

            if self.counters[i] < old {
                overflowed |= 1 << i;
                self.counters[i] = reloads[i];
                if self.irq_enabled & (1 << i) != 0 {
                    raised |= irq::TIMER0 << i;
                }
            }
        }

        raised
    }
}
