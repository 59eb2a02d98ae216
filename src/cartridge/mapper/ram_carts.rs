//! Small boards that pair ROM with on-cartridge RAM: CBS RAM Plus (FA) and
//! Commavid (CV).

use crate::cartridge::mapper::mapper::{Mapper, rom_byte};

/// CBS RAM Plus: 12K ROM in three 4K banks ($1FF8–$1FFA) and 256 bytes of RAM,
/// written through $1000–$10FF and read back through $1100–$11FF.
pub struct Cbs {
    rom: Vec<u8>,
    ram: [u8; 0x100],
    bank: usize,
}

impl Cbs {
    pub fn new(rom: Vec<u8>) -> Self {
        Self {
            rom,
            ram: [0; 0x100],
            bank: 0,
        }
    }
}

impl Mapper for Cbs {
    fn access(&mut self, addr: u16, data: u8) -> u8 {
        match addr {
            0x0000..=0x0FFF => return data,
            0x1000..=0x10FF => {
                self.ram[(addr & 0xFF) as usize] = data;
                return data;
            }
            0x1100..=0x11FF => return self.ram[(addr & 0xFF) as usize],
            0x1FF8..=0x1FFA => self.bank = ((addr - 0x1FF8) as usize) << 12,
            _ => {}
        }
        self.read(addr)
    }

    fn read(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, (addr & 0xFFF) as usize | self.bank)
    }

    fn block_count(&self) -> usize {
        2
    }

    fn block_name(&self, block: usize) -> Option<&'static str> {
        match block {
            0 => Some("Program ROM"),
            1 => Some("CBS 256 byte RAM"),
            _ => None,
        }
    }

    fn block_len(&self, block: usize) -> Option<usize> {
        match block {
            0 => Some(0x1000),
            1 => Some(0x100),
            _ => None,
        }
    }

    fn block_data(&self, block: usize, addr: u16) -> u8 {
        match block {
            0 => self.read(addr),
            1 => self.ram[(addr & 0xFF) as usize],
            _ => 0,
        }
    }
}

/// Commavid: 2K ROM in the upper half, 1K RAM below it (read $1000–$13FF,
/// write $1400–$17FF).
pub struct Commavid {
    rom: Vec<u8>,
    ram: [u8; 0x400],
}

impl Commavid {
    pub fn new(rom: Vec<u8>) -> Self {
        Self { rom, ram: [0; 0x400] }
    }
}

impl Mapper for Commavid {
    fn access(&mut self, addr: u16, data: u8) -> u8 {
        match addr {
            0x0000..=0x0FFF => data,
            0x1000..=0x13FF => self.ram[(addr & 0x3FF) as usize],
            0x1400..=0x17FF => {
                self.ram[(addr & 0x3FF) as usize] = data;
                data
            }
            _ => self.read(addr),
        }
    }

    fn read(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, (addr & 0x7FF) as usize)
    }

    fn block_count(&self) -> usize {
        2
    }

    fn block_name(&self, block: usize) -> Option<&'static str> {
        match block {
            0 => Some("Program ROM"),
            1 => Some("Commavid 1k RAM"),
            _ => None,
        }
    }

    fn block_len(&self, block: usize) -> Option<usize> {
        match block {
            0 => Some(0x800),
            1 => Some(0x400),
            _ => None,
        }
    }

    fn block_data(&self, block: usize, addr: u16) -> u8 {
        match block {
            0 => self.read(addr),
            1 => self.ram[(addr & 0x3FF) as usize],
            _ => 0,
        }
    }
}
