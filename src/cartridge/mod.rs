//! Atari 2600 cartridges.
//!
//! - **cartridge**: raw image loading and the size -> scheme registry.
//! - **mapper**: the bank-switching schemes, one trait object per cartridge.

pub mod cartridge;
pub mod mapper;
