//! TIA video and audio for the Atari 2600.
//!
//! Scanline synthesis with lazy catch-up rendering, object positioning and
//! HMOVE, collision latches, colour resolution through the signal's palette,
//! and the two audio channels. Registers: $00–$2C write, $00–$0D read.

pub mod palette;
pub mod tia;

#[cfg(test)]
mod tests;
