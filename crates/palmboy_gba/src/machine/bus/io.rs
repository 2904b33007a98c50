use super::AgbBus;
use crate::machine::timers::Prescaler;

// IO register offsets the core owns. The display block (below 0x60) and
// the sound block (0x60..=0xA8) belong to the collaborators.
const IO_SOUND_BASE: usize = 0x60;
const IO_SOUND_END: usize = 0xA8;
const IO_DMA0_SAD: usize = 0xB0;
const IO_DMA0_CNT_H: usize = 0xBA;
const IO_TM0_CNT_L: usize = 0x100;
const IO_TM0_CNT_H: usize = 0x102;
const IO_KEYINPUT: usize = 0x130;
const IO_IE: usize = 0x200;
const IO_IF: usize = 0x202;
const IO_WAITCNT: usize = 0x204;
const IO_IME: usize = 0x208;

impl AgbBus {
    /// 16-bit IO read. The window does not mirror past 0x400.
    pub(super) fn io_read16(&mut self, addr: u32) -> u16 {
        if addr >= 0x0400_0400 {
            return self.open_bus_io(addr);
        }

        let offset = (addr as usize) & 0x3FE;
        let backing = self.io_reg16(offset);

        if offset < IO_SOUND_BASE {
            return self.video.read_reg(offset as u32, backing);
        }
        if offset <= IO_SOUND_END {
            return self.audio.read_reg(offset as u32, backing);
        }

        match offset {
            // Timer counters read live values: catch the timers up first.
            IO_TM0_CNT_L | 0x104 | 0x108 | 0x10C => {
                self.update_timers();
                self.timers.counter((offset - IO_TM0_CNT_L) / 4)
            }

            IO_KEYINPUT => !self.inputs,

            _ => backing,
        }
    }

    /// 16-bit IO write, applying the core-owned register semantics and
    /// falling back to the backing store.
    pub(super) fn io_write16(&mut self, addr: u32, data: u16) {
        if addr >= 0x0400_0400 {
            return;
        }

        let offset = (addr as usize) & 0x3FE;

        if offset < IO_SOUND_BASE {
            if self.video.write_reg(offset as u32, data) {
                return;
            }
        } else if offset <= IO_SOUND_END {
            if self.audio.write_reg(offset as u32, data) {
                return;
            }
        }

        match offset {
            // DMA control: enabling a channel with immediate start timing
            // triggers it; disabling clears any pending trigger.
            IO_DMA0_CNT_H | 0xC6 | 0xD2 | 0xDE => {
                let channel = (offset - IO_DMA0_CNT_H) / 12;
                if data & (1 << 15) != 0 {
                    if data & 0x3000 == 0 {
                        self.dma_triggered |= 1 << channel;
                    }
                } else {
                    self.dma_triggered &= !(1 << channel);
                }
            }

            // Timer reload latches: sync before the latch changes.
            IO_TM0_CNT_L | 0x104 | 0x108 | 0x10C => {
                self.update_timers();
            }

            IO_TM0_CNT_H | 0x106 | 0x10A | 0x10E => {
                let index = (offset - IO_TM0_CNT_H) / 4;

                self.update_timers();

                if data & (1 << 7) != 0 {
                    let was_enabled = self.io_reg16(IO_TM0_CNT_H + index * 4) & (1 << 7) != 0;
                    if !was_enabled {
                        // 0 -> 1 enable reloads the counter from the latch.
                        let reload = self.io_reg16(IO_TM0_CNT_L + index * 4);
                        self.timers.set_counter(index, reload);
                    }

                    let prescaler = if data & (1 << 2) != 0 {
                        Prescaler::CountUp
                    } else {
                        Prescaler::divider(data & 3)
                    };
                    self.timers.enable(index, prescaler, data & (1 << 6) != 0);
                } else {
                    self.timers.disable(index);
                }
            }

            IO_IE => {
                let ime = self.io_reg16(IO_IME) & 1 != 0;
                self.enabled_interrupts = if ime { data } else { 0 };
                self.current_interrupts = self.enabled_interrupts & self.io_reg16(IO_IF);
            }

            IO_IF => {
                // Write-1-to-clear acknowledge.
                let flags = self.io_reg16(IO_IF) & !data;
                self.set_io_reg16(IO_IF, flags);
                self.current_interrupts = self.enabled_interrupts & flags;
                return;
            }

            IO_WAITCNT => {
                self.update_wait_control(data);
            }

            IO_IME => {
                self.enabled_interrupts = if data & 1 != 0 {
                    self.io_reg16(IO_IE)
                } else {
                    0
                };
                self.current_interrupts = self.enabled_interrupts & self.io_reg16(IO_IF);
            }

            _ => {}
        }

        self.set_io_reg16(offset, data);
    }

    fn open_bus_io(&self, addr: u32) -> u16 {
        ((addr >> 1) & 0xFFFF) as u16
    }

    /// DMA register block accessors for the transfer engine.
    pub(crate) fn dma_source(&self, channel: usize) -> u32 {
        let base = IO_DMA0_SAD + channel * 12;
        self.io_reg16(base) as u32 | (self.io_reg16(base + 2) as u32) << 16
    }

    pub(crate) fn dma_dest(&self, channel: usize) -> u32 {
        let base = IO_DMA0_SAD + 4 + channel * 12;
        self.io_reg16(base) as u32 | (self.io_reg16(base + 2) as u32) << 16
    }

    pub(crate) fn dma_count(&self, channel: usize) -> u32 {
        self.io_reg16(IO_DMA0_SAD + 8 + channel * 12) as u32
    }

    pub(crate) fn dma_control(&self, channel: usize) -> u16 {
        self.io_reg16(IO_DMA0_CNT_H + channel * 12)
    }

    pub(crate) fn set_dma_control(&mut self, channel: usize, value: u16) {
        self.set_io_reg16(IO_DMA0_CNT_H + channel * 12, value);
    }
}
