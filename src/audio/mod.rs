//! TIA sound.
//!
//! - **poly** – waveform tables selected by AUDC
//! - **channel** – `AudioChannel`: divider, waveform stepper, rate conversion to the host
//! - **mixer** – `Mixer`: the host-side end of every channel's sample queue

pub mod channel;
pub mod mixer;
pub mod poly;
