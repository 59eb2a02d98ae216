//! Unbanked cartridges: 2K mirrored and 4K standard.

use crate::cartridge::mapper::mapper::{Mapper, rom_byte};

/// 2K image mirrored twice across the 4K window.
pub struct TwoK {
    rom: Vec<u8>,
}

impl TwoK {
    pub fn new(rom: Vec<u8>) -> Self {
        Self { rom }
    }
}

impl Mapper for TwoK {
    fn access(&mut self, addr: u16, data: u8) -> u8 {
        if addr < 0x1000 {
            return data;
        }
        self.read(addr)
    }

    fn read(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, (addr & 0x7FF) as usize)
    }

    fn block_len(&self, block: usize) -> Option<usize> {
        match block {
            0 => Some(0x800),
            _ => None,
        }
    }
}

/// Plain 4K cartridge.
pub struct FourK {
    rom: Vec<u8>,
}

impl FourK {
    pub fn new(rom: Vec<u8>) -> Self {
        Self { rom }
    }
}

impl Mapper for FourK {
    fn access(&mut self, addr: u16, data: u8) -> u8 {
        if addr < 0x1000 {
            return data;
        }
        self.read(addr)
    }

    fn read(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, (addr & 0xFFF) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_k_mirrors_upper_half() {
        let rom: Vec<u8> = (0..0x800).map(|i| (i & 0xFF) as u8 ^ (i >> 8) as u8).collect();
        let mut cart = TwoK::new(rom.clone());
        assert_eq!(cart.access(0x1123, 0), rom[0x123]);
        assert_eq!(cart.access(0x1923, 0), rom[0x123]);
    }

    #[test]
    fn low_addresses_pass_bus_value_through() {
        let mut cart = FourK::new(vec![0xAA; 0x1000]);
        assert_eq!(cart.access(0x0080, 0x5C), 0x5C);
        assert_eq!(cart.access(0x1FFF, 0x5C), 0xAA);
    }
}
