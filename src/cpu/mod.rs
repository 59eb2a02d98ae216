//! 6507 CPU emulation.
//!
//! The documented 6502 instruction set with NMOS decimal-mode behaviour.
//! Memory and the passage of time both go through the `Bus` trait, so every
//! other chip is clocked by the CPU as it executes.

pub mod cpu;
pub mod disasm;
pub mod flags;
pub mod opcodes;

#[cfg(test)]
mod tests;
