//! Memory bus and address decoding for the Atari 2600.
//!
//! The 6507 drives 13 address lines. Decoding:
//!
//! - A12 set: cartridge
//! - A12 clear, A7 clear: TIA
//! - A12 clear, A7 set, A9 clear: 128 bytes of RAM (in the RIOT)
//! - A12 clear, A7 set, A9 set: RIOT I/O and timer
//!
//! The cartridge sees every cycle regardless, since some schemes switch on
//! accesses outside their window. The last value on the data bus is kept as
//! "bus trash": chips that drive only some bits leave the rest at that value.

use crate::{
    audio::mixer::Mixer,
    cartridge::cartridge::Cartridge,
    config::Signal,
    controller::{Controller, Ports, unplugged},
    riot::Riot,
    tia::tia::Tia,
};

/// Bus as seen by the CPU: memory access plus the passage of time.
pub trait Bus {
    fn peek(&mut self, addr: u16) -> u8;
    fn poke(&mut self, addr: u16, data: u8);

    /// Zero-page forms. The 8-bit address never leaves page zero, which lets a
    /// decoder skip the upper address lines.
    fn peek_zero_page(&mut self, addr: u8) -> u8 {
        self.peek(addr as u16)
    }

    fn poke_zero_page(&mut self, addr: u8, data: u8) {
        self.poke(addr as u16, data)
    }

    /// `cycles` CPU cycles have elapsed.
    fn clock(&mut self, cycles: usize);
}

/// Console bus: cartridge, RAM, TIA, RIOT and the two controller jacks.
pub struct AtariBus {
    pub cart: Cartridge,
    pub ram: [u8; 128],
    pub tia: Tia,
    pub riot: Riot,
    pub ports: Ports,
    /// Last value driven onto the data bus.
    pub trash: u8,
    /// Colour clocks since the host last took a frame's worth.
    pub clocks: usize,
}

impl AtariBus {
    /// Create a bus around `cart`; the TIA's audio channels are opened on `mixer`.
    pub fn new(cart: Cartridge, signal: Signal, mixer: &mut Mixer) -> Self {
        Self {
            cart,
            ram: [0; 128],
            tia: Tia::new(signal, mixer),
            riot: Riot::new(),
            ports: unplugged(),
            trash: 0,
            clocks: 0,
        }
    }

    /// Connect controllers to the left and right jacks.
    pub fn plug(&mut self, left: Box<dyn Controller>, right: Box<dyn Controller>) {
        self.ports = [left, right];
    }

    /// Side-effect-free view of ROM and RAM for debuggers; registers read as 0.
    pub fn read(&self, addr: u16) -> u8 {
        if addr & 0x1000 != 0 {
            self.cart.read(addr & 0x0FFF)
        } else if addr & 0x0200 == 0 && addr & 0x0080 != 0 {
            self.ram[(addr & 0x7F) as usize]
        } else {
            0
        }
    }
}

impl Bus for AtariBus {
    fn peek(&mut self, addr: u16) -> u8 {
        let addr = addr & 0x1FFF;

        if addr & 0x1000 == 0 {
            let index = addr & 0x7F;
            self.trash = if addr & 0x80 == 0 {
                self.tia.peek(index, self.trash, &self.ports)
            } else if addr & 0x200 != 0 {
                self.riot.peek(index, &self.ports)
            } else {
                self.ram[index as usize]
            };
        }

        self.trash = self.cart.access(addr, self.trash);
        self.trash
    }

    fn poke(&mut self, addr: u16, data: u8) {
        let addr = addr & 0x1FFF;
        self.cart.access(addr, data);

        if addr & 0x1000 == 0 {
            let index = addr & 0x7F;
            if addr & 0x80 == 0 {
                self.tia.poke(index, data, &mut self.ports);
            } else if addr & 0x200 != 0 {
                self.riot.poke(index, data, &mut self.ports);
            } else {
                self.ram[index as usize] = data;
            }
        }
        self.trash = data;
    }

    fn peek_zero_page(&mut self, addr: u8) -> u8 {
        // the cartridge still sees the cycle, but cannot drive page zero
        self.cart.access(addr as u16, self.trash);

        let index = (addr & 0x7F) as u16;
        self.trash = if addr & 0x80 != 0 {
            self.ram[index as usize]
        } else {
            self.tia.peek(index, self.trash, &self.ports)
        };
        self.trash
    }

    fn poke_zero_page(&mut self, addr: u8, data: u8) {
        self.cart.access(addr as u16, data);

        let index = (addr & 0x7F) as u16;
        if addr & 0x80 != 0 {
            self.ram[index as usize] = data;
        } else {
            self.tia.poke(index, data, &mut self.ports);
        }
        self.trash = data;
    }

    fn clock(&mut self, cycles: usize) {
        // The CPU runs at a third of the colour clock; WSYNC stretches the cycle.
        let clocks = cycles * 3 + self.tia.sync_cycles();

        self.clocks += clocks;
        self.tia.clock(clocks);
        self.riot.clock(clocks);
        self.cart.clock(clocks);

        for port in self.ports.iter_mut() {
            port.clock(clocks);
        }
        if let Some(level) = self.ports[0].transitions() {
            self.riot.transition(level);
        }
    }
}
