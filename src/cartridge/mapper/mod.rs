//! 2600 bank-switching schemes.
//!
//! - **fixed**: 2K mirrored, 4K
//! - **standard**: F8/F6/F4/F0, reversed F8, Super Chip RAM
//! - **parker**: Parker Brothers E0
//! - **tigervision**: 3F and extended 3F
//! - **activision**: FE stack-sniffing
//! - **mnetwork**: M-Network E7
//! - **ram_carts**: CBS RAM Plus, Commavid
//! - **misc**: Megaboy, UA Limited
//! - **pitfall2**: Pitfall II DPC

pub mod mapper;

pub mod activision;
pub mod fixed;
pub mod misc;
pub mod mnetwork;
pub mod parker;
pub mod pitfall2;
pub mod ram_carts;
pub mod standard;
pub mod tigervision;
