//! Tiara: an Atari 2600 (VCS) emulator written in Rust.
//!
//! The console is four chips on a 13-bit address bus, all driven from the CPU's
//! clock: every instruction advances the video chip and timer by three colour
//! clocks per CPU cycle.
//!
//! ## Modules
//!
//! - **atari** – the console: CPU + bus, run/stop/run-to modes, trace log, frame budget
//! - **audio** – polynomial tone generators and the host-side mixer
//! - **bus** – address decoding, 128 bytes of RAM, open-bus "trash"
//! - **cartridge** – image registry and the bank-switching schemes
//! - **config** – NTSC/PAL/SECAM and host audio rate
//! - **controller** – controller port devices (joystick, empty port)
//! - **cpu** – 6507 (6502 core), opcode table, disassembler
//! - **riot** – 6532 I/O ports, interval timer, console switches
//! - **tia** – video and audio generator, 160×264 picture, collision latches

pub mod atari;
pub mod audio;
pub mod bus;
pub mod cartridge;
pub mod config;
pub mod controller;
pub mod cpu;
pub mod riot;
pub mod tia;
