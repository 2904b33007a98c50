use super::bus::AgbBus;
use super::{irq, DmaEvent};

// DMAxCNT_H bits.
const DMA_32BIT: u16 = 1 << 10;
const DMA_REPEAT: u16 = 1 << 9;
const DMA_IRQ: u16 = 1 << 14;
const DMA_ENABLE: u16 = 1 << 15;
const DMA_START_MASK: u16 = 0x3000;
const DMA_START_VBLANK: u16 = 1 << 12;
const DMA_START_HBLANK: u16 = 2 << 12;

impl AgbBus {
    /// Record display-boundary triggers for enabled channels. The pending
    /// set drains in channel-index order between instructions.
    pub(crate) fn trigger_dma(&mut self, event: DmaEvent) {
        for channel in 0..4 {
            let control = self.dma_control(channel);
            if control & DMA_ENABLE == 0 {
                continue;
            }

            let start = control & DMA_START_MASK;
            let matched = match event {
                DmaEvent::VBlank => start == DMA_START_VBLANK,
                DmaEvent::HBlank => start == DMA_START_HBLANK,
            };

            if matched {
                self.dma_triggered |= 1 << channel;
            }
        }
    }

    /// Run one channel's transfer and return the consumed cycles.
    ///
    /// Source, destination and count are re-read from the IO registers on
    /// every trigger, so repeating channels restart from the programmed
    /// values. Addresses are masked to the channel's reachable space
    /// (27 bits for DMA0 sources, 28 elsewhere; only DMA3 may write the
    /// cartridge window).
    pub(crate) fn dma_transfer(&mut self, channel: usize) -> u32 {
        let control = self.dma_control(channel);

        let mut src = self.dma_source(channel)
            & if channel == 0 { 0x07FF_FFFF } else { 0x0FFF_FFFF };
        let mut dst = self.dma_dest(channel)
            & if channel == 3 { 0x0FFF_FFFF } else { 0x07FF_FFFF };

        let mut count = self.dma_count(channel);
        if count == 0 {
            // A zero length register means the channel's full span.
            count = if channel == 3 { 0x10000 } else { 0x4000 };
        }

        let wide = control & DMA_32BIT != 0;
        let width: u32 = if wide { 4 } else { 2 };
        let dst_mode = (control >> 5) & 3;
        let src_mode = (control >> 7) & 3;

        // 1N + (n-1)S on each side, plus two internal cycles.
        let cycles = self.access_cycles(src, width, false)
            + self.access_cycles(src, width, true) * (count - 1)
            + self.access_cycles(dst, width, false)
            + self.access_cycles(dst, width, true) * (count - 1)
            + 2;

        src &= !(width - 1);

        for _ in 0..count {
            if wide {
                let value = self.read32_aligned(src);
                self.write32(dst, value);
            } else {
                let value = self.read16_aligned(src);
                self.write16(dst, value);
            }

            match dst_mode {
                0 | 3 => dst = dst.wrapping_add(width),
                1 => dst = dst.wrapping_sub(width),
                _ => {}
            }
            match src_mode {
                0 => src = src.wrapping_add(width),
                1 => src = src.wrapping_sub(width),
                _ => {}
            }
        }

        if control & DMA_REPEAT == 0 {
            self.set_dma_control(channel, control & !DMA_ENABLE);
        }

        if control & DMA_IRQ != 0 {
            self.flag_interrupt(irq::DMA0 << channel);
        }

        cycles
    }
}
