//! Controller ports.
//!
//! Each of the two ports feeds four bits of RIOT port A (player 0 in the high
//! nibble), two paddle/pot lines and one trigger line on the TIA. The port
//! also sees the TIA's VBLANK dump/latch bits and can raise the PA7 edge
//! that the RIOT latches as an interrupt flag.

use std::cell::Cell;
use std::rc::Rc;

/// Device plugged into a controller port.
pub trait Controller {
    /// Pending PA7 level change, consumed by the RIOT edge detector.
    /// Devices that never drive PA7 keep the default.
    fn transitions(&mut self) -> Option<bool> {
        None
    }

    /// VBLANK bit 7: dump the paddle capacitors to ground.
    fn ground(&mut self, _state: bool) {}

    /// VBLANK bit 6: latch the trigger inputs.
    fn latch(&mut self, _state: bool) {}

    /// Colour clocks elapsed.
    fn clock(&mut self, _cycles: usize) {}

    /// Nibble driven by the RIOT through the data-direction mask.
    fn poke(&mut self, _data: u8) {}

    /// Four-bit direction nibble, active low.
    fn peek(&self) -> u8;

    /// Pot lines, reported in bit 7.
    fn pot1(&self) -> u8 {
        0x80
    }

    fn pot2(&self) -> u8 {
        0x80
    }

    /// Trigger in bit 7; 0 when pressed.
    fn fire(&self) -> u8;
}

/// Both controller jacks: left (player 0) first.
pub type Ports = [Box<dyn Controller>; 2];

/// Two empty jacks.
pub fn unplugged() -> Ports {
    [Box::new(Unplugged), Box::new(Unplugged)]
}

/// Empty port: every line floats high.
#[derive(Default)]
pub struct Unplugged;

impl Controller for Unplugged {
    fn peek(&self) -> u8 {
        0x0F
    }

    fn fire(&self) -> u8 {
        0x80
    }
}

pub const JOY_UP: u8 = 1 << 0;
pub const JOY_DOWN: u8 = 1 << 1;
pub const JOY_LEFT: u8 = 1 << 2;
pub const JOY_RIGHT: u8 = 1 << 3;

/// Standard digital joystick.
///
/// Clones share state, so the host keeps one handle to feed key events while
/// the bus owns the other.
#[derive(Clone)]
pub struct Joystick {
    direction: Rc<Cell<u8>>,
    firing: Rc<Cell<bool>>,
}

impl Joystick {
    pub fn new() -> Self {
        Self {
            direction: Rc::new(Cell::new(0x0F)),
            firing: Rc::new(Cell::new(false)),
        }
    }

    /// Press or release one of the `JOY_*` directions.
    pub fn set_direction(&self, mask: u8, pressed: bool) {
        let d = self.direction.get();
        self.direction
            .set(if pressed { d & !mask } else { d | mask } & 0x0F);
    }

    pub fn set_fire(&self, pressed: bool) {
        self.firing.set(pressed);
    }
}

impl Default for Joystick {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for Joystick {
    fn peek(&self) -> u8 {
        self.direction.get()
    }

    fn fire(&self) -> u8 {
        if self.firing.get() { 0x00 } else { 0x80 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unplugged_reads_idle() {
        let port = Unplugged;
        assert_eq!(port.peek(), 0x0F);
        assert_eq!(port.fire(), 0x80);
        assert_eq!(port.pot1(), 0x80);
    }

    #[test]
    fn joystick_is_active_low_and_shared() {
        let host = Joystick::new();
        let plugged = host.clone();

        host.set_direction(JOY_LEFT, true);
        host.set_direction(JOY_UP, true);
        assert_eq!(plugged.peek(), 0x0F & !(JOY_LEFT | JOY_UP));

        host.set_direction(JOY_UP, false);
        assert_eq!(plugged.peek(), 0x0F & !JOY_LEFT);

        host.set_fire(true);
        assert_eq!(plugged.fire(), 0x00);
    }
}
