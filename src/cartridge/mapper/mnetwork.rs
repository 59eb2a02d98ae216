//! M-Network (E7): 16K ROM in eight 2K banks plus 2K of RAM.
//!
//! - $1000–$17FF: switchable 2K ROM bank ($1FE0–$1FE7). Selecting bank 7 maps
//!   the upper 1K of RAM here instead (write $1000–$13FF, read $1400–$17FF).
//! - $1800–$19FF: 256-byte RAM page ($1FF8–$1FFB), write low / read high.
//! - $1A00–$1FFF: fixed to the last ROM bank.

use crate::cartridge::mapper::mapper::{Mapper, rom_byte};

/// ROM bank offset that exposes RAM instead of ROM.
const RAM_TRAP_BANK: usize = 0x3800;

pub struct MNetwork {
    rom: Vec<u8>,
    ram: [u8; 0x800],
    rom_bank: usize,
    ram_bank: usize,
}

impl MNetwork {
    pub fn new(rom: Vec<u8>) -> Self {
        Self {
            rom,
            ram: [0; 0x800],
            rom_bank: 0,
            ram_bank: 0,
        }
    }
}

impl Mapper for MNetwork {
    fn access(&mut self, addr: u16, data: u8) -> u8 {
        match addr {
            0x0000..=0x0FFF => return data,
            0x1FF8..=0x1FFB => self.ram_bank = ((addr & 3) as usize) << 8,
            0x1FE0..=0x1FE7 => self.rom_bank = ((addr & 7) as usize) << 11,
            0x1000..=0x17FF => {
                if self.rom_bank != RAM_TRAP_BANK {
                    return rom_byte(&self.rom, self.rom_bank | (addr & 0x7FF) as usize);
                }
                let index = (addr & 0x3FF) as usize | 0x400;
                if addr < 0x1400 {
                    self.ram[index] = data;
                }
                return self.ram[index];
            }
            0x1800..=0x18FF => {
                let index = self.ram_bank | (addr & 0xFF) as usize;
                self.ram[index] = data;
                return data;
            }
            0x1900..=0x19FF => return self.ram[self.ram_bank | (addr & 0xFF) as usize],
            _ => {}
        }
        rom_byte(&self.rom, (addr & 0x7FF) as usize | RAM_TRAP_BANK)
    }

    fn read(&self, addr: u16) -> u8 {
        let bank = if addr & 0xFFF < 0x800 {
            self.rom_bank
        } else {
            RAM_TRAP_BANK
        };
        rom_byte(&self.rom, (addr & 0x7FF) as usize | bank)
    }

    fn block_count(&self) -> usize {
        2
    }

    fn block_name(&self, block: usize) -> Option<&'static str> {
        match block {
            0 => Some("Program ROM"),
            1 => Some("M-Network 2k RAM"),
            _ => None,
        }
    }

    fn block_len(&self, block: usize) -> Option<usize> {
        match block {
            0 => Some(0x1000),
            1 => Some(0x800),
            _ => None,
        }
    }

    fn block_data(&self, block: usize, addr: u16) -> u8 {
        match block {
            0 => self.read(addr),
            1 => self.ram[(addr & 0x7FF) as usize],
            _ => 0,
        }
    }
}
