//! Pitfall II display processor (DPC).
//!
//! 8K of program ROM in two 4K banks ($1FF8/$1FF9) followed by 2K of graphics
//! data read through eight data fetchers. Each fetcher has an 11-bit down
//! counter plus top and bottom registers; when the fetched byte matches the
//! top register its flag turns on, and on the bottom register it turns off.
//! Masked reads AND the data with that flag, which is how the game draws
//! vertically clipped objects cheaply.
//!
//! Register map ($1000–$107F):
//!
//! | range       | read                 | write              |
//! |-------------|----------------------|--------------------|
//! | $1000–$1003 | random number (LFSR) |                    |
//! | $1004–$1007 | music amplitude      |                    |
//! | $1008–$100F | fetcher data         |                    |
//! | $1010–$1017 | fetcher data & flag  |                    |
//! | $1038–$103F | fetcher flag         |                    |
//! | $1040–$1047 |                      | top                |
//! | $1048–$104F |                      | bottom             |
//! | $1050–$1057 |                      | counter low        |
//! | $1058–$105F |                      | counter high (3b)  |
//! | $1070–$1077 |                      | reset LFSR         |

use crate::cartridge::mapper::mapper::{Mapper, rom_byte};

/// Last byte of the graphics area; fetchers index downwards from here.
const DISPLAY_TOP: usize = 0x27FE;

pub struct PitfallII {
    rom: Vec<u8>,
    bank: usize,
    counters: [u16; 8],
    flags: [u8; 8],
    tops: [u8; 8],
    bottoms: [u8; 8],
    random: u8,
}

impl PitfallII {
    pub fn new(rom: Vec<u8>) -> Self {
        Self {
            rom,
            bank: 0,
            counters: [0; 8],
            flags: [0; 8],
            tops: [0; 8],
            bottoms: [0; 8],
            random: 1,
        }
    }

    /// 8-bit LFSR, taps at bits 0, 2, 3, 4.
    fn next_random(&mut self) -> u8 {
        let r = self.random;
        let bit = (r ^ (r >> 2) ^ (r >> 3) ^ (r >> 4)) & 1;
        self.random = (r >> 1) | (bit << 7);
        self.random
    }

    fn fetch(&mut self, n: usize) -> u8 {
        let probe = rom_byte(&self.rom, self.counters[n] as usize);
        let count = self.counters[n].wrapping_sub(1) & 0x7FF;
        self.counters[n] = count;

        if probe == self.tops[n] {
            self.flags[n] = 0xFF;
        } else if probe == self.bottoms[n] {
            self.flags[n] = 0;
        }

        rom_byte(&self.rom, DISPLAY_TOP - count as usize)
    }

    /// Handles $1000–$107F. Unmapped registers read as zero.
    fn register(&mut self, addr: u16, data: u8) -> u8 {
        let n = (addr & 7) as usize;
        match addr {
            0x1000..=0x1003 => self.next_random(),
            // TODO: music fetchers (counters 5-7 in music mode) are not emulated
            0x1004..=0x1007 => 0,
            0x1008..=0x100F => self.fetch(n),
            0x1010..=0x1017 => self.fetch(n) & self.flags[n],
            0x1038..=0x103F => self.flags[n],
            0x1040..=0x1047 => {
                self.tops[n] = data;
                data
            }
            0x1048..=0x104F => {
                self.bottoms[n] = data;
                data
            }
            0x1050..=0x1057 => {
                self.counters[n] = (self.counters[n] & 0x700) | data as u16;
                data
            }
            0x1058..=0x105F => {
                self.counters[n] = (self.counters[n] & 0xFF) | (((data & 7) as u16) << 8);
                self.flags[n] = 0;
                data
            }
            0x1070..=0x1077 => {
                self.random = 1;
                0
            }
            _ => 0,
        }
    }

    pub fn counter(&self, n: usize) -> u16 {
        self.counters[n & 7]
    }
}

impl Mapper for PitfallII {
    fn access(&mut self, addr: u16, data: u8) -> u8 {
        match addr {
            0x0000..=0x0FFF => data,
            0x1000..=0x107F => self.register(addr, data),
            _ => {
                if addr == 0x1FF8 || addr == 0x1FF9 {
                    self.bank = ((addr - 0x1FF8) as usize) << 12;
                }
                self.read(addr)
            }
        }
    }

    fn read(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, (addr & 0xFFF) as usize | self.bank)
    }
}
