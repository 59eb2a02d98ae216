//! Activision (FE) banking, as used by Decathlon and Robot Tank.
//!
//! There is no hotspot. The board watches the stack page: after two accesses in
//! $0100–$01FF (a JSR or RTS pushing/pulling the return address), bit 5 of the
//! next byte on the bus picks the bank. Bit 5 clear selects the upper 4K.

use crate::cartridge::mapper::mapper::{Mapper, rom_byte};

pub struct Activision {
    rom: Vec<u8>,
    bank: usize,
    stack_hits: u8,
}

impl Activision {
    pub fn new(rom: Vec<u8>) -> Self {
        Self {
            rom,
            bank: 0,
            stack_hits: 0,
        }
    }

    fn bank_for(value: u8) -> usize {
        if value & 0x20 == 0 { 0x1000 } else { 0 }
    }
}

impl Mapper for Activision {
    fn access(&mut self, addr: u16, data: u8) -> u8 {
        let out = self.read(addr);

        if (0x100..=0x1FF).contains(&addr) {
            self.stack_hits = self.stack_hits.saturating_add(1);
            if addr & 1 == 1 && self.stack_hits == 2 {
                self.bank = Self::bank_for(data);
                self.stack_hits = 0;
            }
        } else if self.stack_hits == 2 {
            self.bank = Self::bank_for(out);
            self.stack_hits = 0;
        } else {
            self.stack_hits = 0;
        }

        if addr < 0x1000 { data } else { out }
    }

    fn read(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, (addr & 0xFFF) as usize | self.bank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_stack_accesses_then_data_bit_five() {
        let rom: Vec<u8> = (0..0x2000).map(|i| (i >> 12) as u8).collect();
        let mut cart = Activision::new(rom);

        cart.access(0x01FE, 0x00);
        cart.access(0x01FF, 0x10); // bit 5 clear -> upper bank
        assert_eq!(cart.access(0x1000, 0), 1);

        cart.access(0x01FE, 0x00);
        cart.access(0x01FF, 0xF0); // bit 5 set -> lower bank
        assert_eq!(cart.access(0x1000, 0), 0);
    }

    #[test]
    fn interrupted_sequence_does_not_switch() {
        let rom: Vec<u8> = (0..0x2000).map(|i| (i >> 12) as u8).collect();
        let mut cart = Activision::new(rom);

        cart.access(0x01FF, 0x00);
        cart.access(0x0080, 0x00);
        cart.access(0x01FF, 0x00);
        assert_eq!(cart.access(0x1000, 0), 0);
    }
}
