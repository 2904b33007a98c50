use super::RomError;

/// Cartridge save hardware, detected on first access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveType {
    Unknown,
    Eeprom,
    Sram,
    Flash,
}

/// Flash command-machine state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FlashState {
    Read,
    Erase,
    Write,
    Bank,
    Id,
}

/// 128 KiB Sanyo flash ID, reported while in ID mode.
const FLASH_ID: [u8; 2] = [0x62, 0x13];

const SAVE_CAPACITY: usize = 0x20000;

/// Cartridge save memory and its state machines.
///
/// The backing buffer is sized for the largest variant (two 64 KiB flash
/// banks); the active type determines addressing. Auto-detection is
/// one-shot per session: the first write decides between flash and SRAM,
/// and a 16-bit write into the upper ROM window selects EEPROM.
pub(crate) struct SaveMemory {
    save_type: SaveType,
    data: Vec<u8>,

    flash_state: FlashState,
    flash_cmd_state: u8,
    flash_bank: u32,

    /// EEPROM serial transaction buffers, indexed by the low byte of the
    /// port address (one bit per 16-bit write/read).
    eeprom_in: [u16; 0x80],
    eeprom_out: [u16; 0x84],
    /// Address bits per transaction: 6 (512 B parts) or 14 (8 KiB parts).
    eeprom_addr_bits: u32,
}

impl SaveMemory {
    pub(crate) fn new() -> Self {
        Self {
            save_type: SaveType::Unknown,
            data: vec![0xFF; SAVE_CAPACITY],
            flash_state: FlashState::Read,
            flash_cmd_state: 0,
            flash_bank: 0,
            eeprom_in: [0; 0x80],
            eeprom_out: [0; 0x84],
            eeprom_addr_bits: 6,
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }

    pub(crate) fn save_type(&self) -> SaveType {
        self.save_type
    }

    /// Load a save blob; its size selects the save type.
    pub(crate) fn load(&mut self, blob: &[u8]) -> Result<(), RomError> {
        self.save_type = match blob.len() {
            512 => {
                self.eeprom_addr_bits = 6;
                SaveType::Eeprom
            }
            0x1000 | 0x2000 => {
                self.eeprom_addr_bits = 14;
                SaveType::Eeprom
            }
            0x8000 => SaveType::Sram,
            0x10000 | 0x20000 => SaveType::Flash,
            len => return Err(RomError::BadSaveSize(len)),
        };

        self.data.fill(0xFF);
        self.data[..blob.len()].copy_from_slice(blob);
        Ok(())
    }

    /// The live save bytes, sized for the detected type.
    pub(crate) fn data(&self) -> &[u8] {
        let len = match self.save_type {
            SaveType::Unknown => 0,
            SaveType::Eeprom => {
                if self.eeprom_addr_bits == 6 {
                    512
                } else {
                    0x2000
                }
            }
            SaveType::Sram => 0x8000,
            SaveType::Flash => SAVE_CAPACITY,
        };
        &self.data[..len]
    }

    /// Byte read from the save region (0x0E/0x0F windows).
    pub(crate) fn read8(&self, addr: u32) -> u8 {
        match self.save_type {
            SaveType::Unknown | SaveType::Eeprom => 0xFF,
            SaveType::Sram => self.data[(addr as usize) & 0x7FFF],
            SaveType::Flash => {
                if self.flash_state == FlashState::Id {
                    return FLASH_ID[(addr & 1) as usize];
                }
                self.data[((addr as usize) & 0xFFFF) + (self.flash_bank as usize) * 0x10000]
            }
        }
    }

    /// Byte write into the save region. The first write auto-detects the
    /// device: the flash unlock sequence starts with 0xAA at 0x5555,
    /// anything else means battery SRAM.
    pub(crate) fn write8(&mut self, addr: u32, data: u8) {
        if self.save_type == SaveType::Unknown {
            self.save_type = if addr & 0xFFFF == 0x5555 && data == 0xAA {
                SaveType::Flash
            } else {
                SaveType::Sram
            };
        }

        match self.save_type {
            SaveType::Flash => self.write_flash(addr, data),
            SaveType::Sram => self.data[(addr as usize) & 0x7FFF] = data,
            SaveType::Unknown | SaveType::Eeprom => {}
        }
    }

    fn write_flash(&mut self, addr: u32, data: u8) {
        let offset = addr & 0xFFFF;

        // Bank select and byte program act on the next write, outside the
        // command parser.
        if self.flash_state == FlashState::Bank && offset == 0 {
            self.flash_bank = (data & 1) as u32;
            self.flash_state = FlashState::Read;
            return;
        }
        if self.flash_state == FlashState::Write {
            self.data[(offset as usize) + (self.flash_bank as usize) * 0x10000] = data;
            self.flash_state = FlashState::Read;
            return;
        }

        // Unlock sequence AA@5555, 55@2AAA, then a command byte at 5555.
        if self.flash_cmd_state == 0 && offset == 0x5555 && data == 0xAA {
            self.flash_cmd_state = 1;
        } else if self.flash_cmd_state == 1 && offset == 0x2AAA && data == 0x55 {
            self.flash_cmd_state = 2;
        } else if self.flash_cmd_state == 2 {
            match data {
                0x10 if offset == 0x5555 && self.flash_state == FlashState::Erase => {
                    self.data.fill(0xFF);
                    self.flash_state = FlashState::Read;
                }
                0x30 if self.flash_state == FlashState::Erase => {
                    // 4 KiB sector erase.
                    let base = ((offset as usize) & 0xF000) + (self.flash_bank as usize) * 0x10000;
                    self.data[base..base + 0x1000].fill(0xFF);
                    self.flash_state = FlashState::Read;
                }
                0x80 if offset == 0x5555 => self.flash_state = FlashState::Erase,
                0x90 if offset == 0x5555 => self.flash_state = FlashState::Id,
                0xA0 if offset == 0x5555 => self.flash_state = FlashState::Write,
                0xB0 if offset == 0x5555 => self.flash_state = FlashState::Bank,
                0xF0 if offset == 0x5555 => self.flash_state = FlashState::Read,
                _ => log::warn!("unknown flash command {data:#04X} at {addr:#010X}"),
            }
            self.flash_cmd_state = 0;
        } else {
            self.flash_cmd_state = 0;
        }
    }

    /// EEPROM data-out read (16-bit reads of the upper ROM window).
    pub(crate) fn eeprom_read16(&self, addr: u32) -> u16 {
        self.eeprom_out[((addr as usize) & 0xFF) >> 1]
    }

    /// EEPROM data-in write. The first 16-bit write into the upper ROM
    /// window of an undetected cartridge selects EEPROM.
    ///
    /// Transactions are bitstreams indexed by the low byte of the port
    /// address: 2 command bits, then the address (6 or 14 bits), then for
    /// writes 64 data bits. A read request latches 64 data bits (plus 4
    /// junk bits) into the out buffer; a write request stores them and
    /// reports ready.
    pub(crate) fn eeprom_write16(&mut self, addr: u32, data: u16) {
        if self.save_type == SaveType::Unknown {
            self.save_type = SaveType::Eeprom;
        }
        if self.save_type != SaveType::Eeprom {
            return;
        }

        let index = ((addr as usize) & 0xFF) >> 1;
        self.eeprom_in[index] = data & 1;

        let addr_bits = self.eeprom_addr_bits as usize;
        // Offset of the terminating write for read and write requests.
        let read_end = 2 + addr_bits;
        let write_end = 2 + addr_bits + 64;

        if index == read_end && self.eeprom_in[0] == 1 && self.eeprom_in[1] == 1 {
            let block = self.eeprom_block(addr_bits);
            let base = block * 8;

            let value = u64::from_le_bytes(self.data[base..base + 8].try_into().unwrap());

            for bit in 0..64 {
                self.eeprom_out[bit + 4] = ((value >> (63 - bit)) & 1) as u16;
            }
        } else if index == write_end && self.eeprom_in[0] == 1 && self.eeprom_in[1] == 0 {
            let block = self.eeprom_block(addr_bits);
            let base = block * 8;

            let mut value = 0u64;
            for bit in 0..64 {
                value |= ((self.eeprom_in[2 + addr_bits + bit] & 1) as u64) << (63 - bit);
            }

            self.data[base..base + 8].copy_from_slice(&value.to_le_bytes());

            self.eeprom_out[0] = 1;
        }
    }

    /// Decode the block address bits of the current transaction, masked to
    /// the device's capacity.
    fn eeprom_block(&self, addr_bits: usize) -> usize {
        let mut block = 0usize;
        for i in 0..addr_bits {
            block = (block << 1) | (self.eeprom_in[2 + i] & 1) as usize;
        }

        let blocks = if self.eeprom_addr_bits == 6 { 64 } else { 1024 };
        block & (blocks - 1)
    }
}
