//! Mapper trait: bus responses for the cartridge slot and debug block views.

/// Trait for 2600 cartridge bank-switching schemes.
///
/// Addresses are already reduced to the 13 lines the 6507 drives. The cartridge
/// sees every bus cycle, including TIA/RIOT/RAM accesses, because several
/// schemes switch banks on address patterns outside the $1000–$1FFF window.
pub trait Mapper {
    /// Combined read/write. `data` is the value on the bus (the written byte, or the
    /// bus trash on reads); the return value is what the bus carries afterwards.
    /// Addresses below $1000 must return `data` unchanged.
    fn access(&mut self, addr: u16, data: u8) -> u8;

    /// Side-effect-free read of the cartridge window ($000–$FFF), for introspection.
    fn read(&self, addr: u16) -> u8;

    /// Colour clocks elapsed since the last call (3 per CPU cycle).
    fn clock(&mut self, _cycles: usize) {}

    /// Number of memory blocks exposed to debug views.
    fn block_count(&self) -> usize {
        1
    }

    fn block_name(&self, block: usize) -> Option<&'static str> {
        match block {
            0 => Some("Program ROM"),
            _ => None,
        }
    }

    fn block_len(&self, block: usize) -> Option<usize> {
        match block {
            0 => Some(0x1000),
            _ => None,
        }
    }

    fn block_data(&self, block: usize, addr: u16) -> u8 {
        match block {
            0 => self.read(addr),
            _ => 0,
        }
    }
}

/// Index into a ROM image without ever going out of bounds.
#[inline]
pub(crate) fn rom_byte(rom: &[u8], index: usize) -> u8 {
    if rom.is_empty() {
        0
    } else {
        rom[index % rom.len()]
    }
}
