//! Single-purpose schemes: Megaboy (F0 with a readable page counter) and
//! UA Limited (two fixed trigger addresses).

use crate::cartridge::mapper::mapper::{Mapper, rom_byte};

/// Megaboy: every access to $1FF0 advances to the next of sixteen 4K pages;
/// $1FEC reads back the current page number.
pub struct Megaboy {
    rom: Vec<u8>,
    page: u8,
}

impl Megaboy {
    pub fn new(rom: Vec<u8>) -> Self {
        Self { rom, page: 0 }
    }
}

impl Mapper for Megaboy {
    fn access(&mut self, addr: u16, data: u8) -> u8 {
        match addr {
            0x0000..=0x0FFF => return data,
            0x1FF0 => self.page = (self.page + 1) & 0x0F,
            0x1FEC => return self.page,
            _ => {}
        }
        self.read(addr)
    }

    fn read(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, ((self.page as usize) << 12) | (addr & 0xFFF) as usize)
    }
}

/// UA Limited: $0220 selects the lower 4K, $0240 the upper.
///
/// The triggers live in TIA space, so they are checked before the pass-through.
pub struct UaLimited {
    rom: Vec<u8>,
    bank: usize,
}

impl UaLimited {
    pub fn new(rom: Vec<u8>) -> Self {
        Self { rom, bank: 0 }
    }
}

impl Mapper for UaLimited {
    fn access(&mut self, addr: u16, data: u8) -> u8 {
        match addr {
            0x0220 => self.bank = 0,
            0x0240 => self.bank = 0x1000,
            _ => {}
        }
        if addr < 0x1000 {
            return data;
        }
        self.read(addr)
    }

    fn read(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, (addr & 0xFFF) as usize | self.bank)
    }
}
