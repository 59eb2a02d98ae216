//! Atari "standard" bank switching (F8/F6/F4/F0), its reversed 8K variant,
//! and the Super Chip RAM overlay.
//!
//! Touching one of the hotspot addresses at the top of the window selects the
//! matching 4K bank; the hotspot count equals the bank count.

use crate::cartridge::mapper::mapper::{Mapper, rom_byte};

/// First hotspot for a given bank count.
fn hotspot_base(banks: usize) -> u16 {
    match banks {
        0..=2 => 0x1FF8,
        3..=4 => 0x1FF6,
        5..=8 => 0x1FF4,
        _ => 0x1FF0,
    }
}

/// F8 (8K), F6 (16K), F4 (32K), F0 (64K).
pub struct Standard {
    rom: Vec<u8>,
    base: u16,
    banks: u16,
    bank: usize,
}

impl Standard {
    pub fn new(rom: Vec<u8>) -> Self {
        let banks = (rom.len() / 0x1000).max(1);
        Self {
            base: hotspot_base(banks),
            banks: banks as u16,
            bank: 0,
            rom,
        }
    }

    /// Bank-select side effect shared with the Super Chip variant.
    fn select(&mut self, addr: u16) {
        if addr >= self.base && addr < self.base + self.banks {
            self.bank = ((addr - self.base) as usize) << 12;
        }
    }

    pub fn bank(&self) -> usize {
        self.bank
    }
}

impl Mapper for Standard {
    fn access(&mut self, addr: u16, data: u8) -> u8 {
        if addr < 0x1000 {
            return data;
        }
        self.select(addr);
        self.read(addr)
    }

    fn read(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, (addr & 0xFFF) as usize | self.bank)
    }
}

/// 8K image with the two banks in swapped order: $1FF8 maps the upper half.
pub struct ReversedStandard {
    rom: Vec<u8>,
    bank: usize,
}

impl ReversedStandard {
    pub fn new(rom: Vec<u8>) -> Self {
        Self { rom, bank: 0 }
    }
}

impl Mapper for ReversedStandard {
    fn access(&mut self, addr: u16, data: u8) -> u8 {
        match addr {
            0x0000..=0x0FFF => return data,
            0x1FF8 => self.bank = 0x1000,
            0x1FF9 => self.bank = 0,
            _ => {}
        }
        self.read(addr)
    }

    fn read(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, (addr & 0xFFF) as usize | self.bank)
    }
}

/// Standard banking plus 128 bytes of cartridge RAM.
///
/// $1000–$107F is the write port, $1080–$10FF the read port; a write goes to
/// RAM and the bus keeps the written value.
pub struct SuperChip {
    inner: Standard,
    ram: [u8; 0x80],
}

impl SuperChip {
    pub fn new(rom: Vec<u8>) -> Self {
        Self {
            inner: Standard::new(rom),
            ram: [0; 0x80],
        }
    }
}

impl Mapper for SuperChip {
    fn access(&mut self, addr: u16, data: u8) -> u8 {
        match addr {
            0x0000..=0x0FFF => data,
            0x1000..=0x107F => {
                self.ram[(addr & 0x7F) as usize] = data;
                data
            }
            0x1080..=0x10FF => self.ram[(addr & 0x7F) as usize],
            _ => self.inner.access(addr, data),
        }
    }

    fn read(&self, addr: u16) -> u8 {
        match addr & 0xFFF {
            0x080..=0x0FF => self.ram[(addr & 0x7F) as usize],
            _ => self.inner.read(addr),
        }
    }

    fn block_count(&self) -> usize {
        2
    }

    fn block_name(&self, block: usize) -> Option<&'static str> {
        match block {
            0 => Some("Program ROM"),
            1 => Some("Super-chip RAM"),
            _ => None,
        }
    }

    fn block_len(&self, block: usize) -> Option<usize> {
        match block {
            0 => Some(0x1000),
            1 => Some(0x80),
            _ => None,
        }
    }

    fn block_data(&self, block: usize, addr: u16) -> u8 {
        match block {
            0 => self.inner.read(addr),
            1 => self.ram[(addr & 0x7F) as usize],
            _ => 0,
        }
    }
}
