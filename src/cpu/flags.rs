//! Processor status register (P) bits.

pub const FLAG_CARRY: u8 = 1 << 0;
pub const FLAG_ZERO: u8 = 1 << 1;
pub const FLAG_INTERRUPT_DISABLE: u8 = 1 << 2;
pub const FLAG_DECIMAL: u8 = 1 << 3; // BCD arithmetic for ADC/SBC
pub const FLAG_BREAK: u8 = 1 << 4; // Only exists in pushed copies
pub const FLAG_UNUSED: u8 = 1 << 5; // Reads back as 1
pub const FLAG_OVERFLOW: u8 = 1 << 6;
pub const FLAG_NEGATIVE: u8 = 1 << 7;

/// Status as eight characters, bit 0 first (`CZIDB1VN`), `-` for clear bits.
pub fn flag_string(status: u8) -> String {
    b"CZIDB1VN"
        .iter()
        .enumerate()
        .map(|(bit, &name)| {
            if status & (1 << bit) != 0 {
                name as char
            } else {
                '-'
            }
        })
        .collect()
}
