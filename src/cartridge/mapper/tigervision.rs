//! Tigervision (3F) schemes. The bank is chosen by the *value* written to any
//! address below $40 (normally `STA $3F`), not by the address alone. The upper
//! 2K of the window is fixed to the last 2K of the image.

use crate::cartridge::mapper::mapper::{Mapper, rom_byte};

/// Original 8K Tigervision board: four 2K banks.
pub struct TigerVision {
    rom: Vec<u8>,
    bank: usize,
}

impl TigerVision {
    pub fn new(rom: Vec<u8>) -> Self {
        Self { rom, bank: 0 }
    }
}

impl Mapper for TigerVision {
    fn access(&mut self, addr: u16, data: u8) -> u8 {
        if addr < 0x40 {
            self.bank = ((data & 3) as usize) << 11;
        }
        if addr < 0x1000 {
            return data;
        }
        self.read(addr)
    }

    fn read(&self, addr: u16) -> u8 {
        let bank = if addr & 0xFFF < 0x800 { self.bank } else { 0x1800 };
        rom_byte(&self.rom, (addr & 0x7FF) as usize | bank)
    }
}

/// Extended 3F boards (up to 512K): the full written byte selects the bank.
pub struct TigerVisionExtended {
    rom: Vec<u8>,
    bank: usize,
    last_bank: usize,
}

impl TigerVisionExtended {
    pub fn new(rom: Vec<u8>) -> Self {
        let last_bank = (rom.len() / 0x800).saturating_sub(1) << 11;
        Self {
            rom,
            bank: 0,
            last_bank,
        }
    }
}

impl Mapper for TigerVisionExtended {
    fn access(&mut self, addr: u16, data: u8) -> u8 {
        if addr < 0x40 {
            self.bank = (data as usize) << 11;
        }
        if addr < 0x1000 {
            return data;
        }
        self.read(addr)
    }

    fn read(&self, addr: u16) -> u8 {
        let bank = if addr & 0xFFF < 0x800 {
            self.bank
        } else {
            self.last_bank
        };
        rom_byte(&self.rom, (addr & 0x7FF) as usize | bank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_2k_banks(banks: usize) -> Vec<u8> {
        (0..banks * 0x800).map(|i| (i >> 11) as u8).collect()
    }

    #[test]
    fn bank_follows_written_data() {
        let mut cart = TigerVision::new(numbered_2k_banks(4));
        assert_eq!(cart.access(0x003F, 0x02), 0x02);
        assert_eq!(cart.access(0x1000, 0), 2);
        assert_eq!(cart.access(0x1800, 0), 3);

        // only the low two bits count on the 8K board
        cart.access(0x0010, 0xFD);
        assert_eq!(cart.access(0x17FF, 0), 1);
    }

    #[test]
    fn addresses_from_40_up_leave_bank_alone() {
        let mut cart = TigerVision::new(numbered_2k_banks(4));
        cart.access(0x0041, 0x03);
        assert_eq!(cart.access(0x1000, 0), 0);
    }

    #[test]
    fn extended_fixes_last_bank_high() {
        let mut cart = TigerVisionExtended::new(numbered_2k_banks(16));
        cart.access(0x003F, 9);
        assert_eq!(cart.access(0x1001, 0), 9);
        assert_eq!(cart.access(0x1FFF, 0), 15);
    }
}
