//! One-line disassembler for debug views and the trace log.

use crate::cpu::opcodes::{AddressMode, OPCODES};

/// A decoded instruction: its text and the bytes it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disassembly {
    pub text: String,
    pub bytes: Vec<u8>,
}

/// Decode the instruction at `addr`, reading memory through `read`.
///
/// `read` must be free of side effects (see `AtariBus::read`); bank-switching
/// cartridges would otherwise change under the debugger. Undocumented opcodes
/// decode as `---`, one byte long.
pub fn disassemble(addr: u16, read: impl Fn(u16) -> u8) -> Disassembly {
    let opcode = read(addr);
    let Some(op) = OPCODES[opcode as usize] else {
        return Disassembly {
            text: "---".to_string(),
            bytes: vec![opcode],
        };
    };

    let bytes: Vec<u8> = (0..op.size()).map(|i| read(addr.wrapping_add(i))).collect();
    let lo = bytes.get(1).copied().unwrap_or(0);
    let hi = bytes.get(2).copied().unwrap_or(0);
    let word = u16::from_le_bytes([lo, hi]);

    let operand = match op.mode {
        AddressMode::Implied => String::new(),
        AddressMode::Accumulator => " A".to_string(),
        AddressMode::Relative => {
            let target = addr.wrapping_add(2).wrapping_add(lo as i8 as u16);
            format!(" ${target:04X}")
        }
        AddressMode::Immediate => format!(" #${lo:02X}"),
        AddressMode::ZeroPage => format!(" ${lo:02X}"),
        AddressMode::ZeroPageX => format!(" ${lo:02X}, X"),
        AddressMode::ZeroPageY => format!(" ${lo:02X}, Y"),
        AddressMode::Absolute => format!(" ${word:04X}"),
        AddressMode::AbsoluteX => format!(" ${word:04X}, X"),
        AddressMode::AbsoluteY => format!(" ${word:04X}, Y"),
        AddressMode::Indirect => format!(" (${word:04X})"),
        AddressMode::IndexedIndirect => format!(" (${lo:02X}, X)"),
        AddressMode::IndirectIndexed => format!(" (${lo:02X}), Y"),
    };

    Disassembly {
        text: format!("{:?}{operand}", op.mnemonic),
        bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dis(program: &[u8]) -> Disassembly {
        disassemble(0x1000, |addr| {
            program
                .get(addr.wrapping_sub(0x1000) as usize)
                .copied()
                .unwrap_or(0)
        })
    }

    #[test]
    fn formats_each_address_mode() {
        assert_eq!(dis(&[0xEA]).text, "NOP");
        assert_eq!(dis(&[0x0A]).text, "ASL A");
        assert_eq!(dis(&[0xA9, 0x05]).text, "LDA #$05");
        assert_eq!(dis(&[0x85, 0x02]).text, "STA $02");
        assert_eq!(dis(&[0xB6, 0x80]).text, "LDX $80, Y");
        assert_eq!(dis(&[0x9D, 0x34, 0x12]).text, "STA $1234, X");
        assert_eq!(dis(&[0x6C, 0xFC, 0xFF]).text, "JMP ($FFFC)");
        assert_eq!(dis(&[0xA1, 0x80]).text, "LDA ($80, X)");
        assert_eq!(dis(&[0xB1, 0x80]).text, "LDA ($80), Y");
    }

    #[test]
    fn branch_targets_are_resolved() {
        assert_eq!(dis(&[0xD0, 0xFE]).text, "BNE $1000");
        assert_eq!(dis(&[0x10, 0x10]).text, "BPL $1012");
    }

    #[test]
    fn bytes_match_instruction_length() {
        assert_eq!(dis(&[0x4C, 0x00, 0xF0]).bytes, vec![0x4C, 0x00, 0xF0]);
        assert_eq!(dis(&[0xA9, 0x05, 0xFF]).bytes, vec![0xA9, 0x05]);
        assert_eq!(dis(&[0x60, 0x01]).bytes, vec![0x60]);
    }

    #[test]
    fn undocumented_opcodes_are_one_byte() {
        let d = dis(&[0x02, 0x10, 0x20]);
        assert_eq!(d.text, "---");
        assert_eq!(d.bytes, vec![0x02]);
    }
}
