//! Parker Brothers (E0): the 4K window is four 1K slots. Slots 0–2 are
//! selected by hotspots at $1FE0–$1FF7; slot 3 is fixed to the last 1K.

use crate::cartridge::mapper::mapper::{Mapper, rom_byte};

pub struct ParkerBrothers {
    rom: Vec<u8>,
    slots: [usize; 4],
}

impl ParkerBrothers {
    pub fn new(rom: Vec<u8>) -> Self {
        Self {
            rom,
            slots: [0, 0, 0, 0x1C00],
        }
    }
}

impl Mapper for ParkerBrothers {
    fn access(&mut self, addr: u16, data: u8) -> u8 {
        if addr < 0x1000 {
            return data;
        }
        if (0x1FE0..=0x1FF7).contains(&addr) {
            // $1FE0-7 -> slot 0, $1FE8-F -> slot 1, $1FF0-7 -> slot 2
            self.slots[((addr >> 3) & 3) as usize] = ((addr & 7) as usize) << 10;
        }
        self.read(addr)
    }

    fn read(&self, addr: u16) -> u8 {
        let slot = self.slots[((addr >> 10) & 3) as usize];
        rom_byte(&self.rom, (addr & 0x3FF) as usize | slot)
    }
}
