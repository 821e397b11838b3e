//! Opcode table.
//!
//! One entry per opcode byte, built at compile time. `None` marks the
//! unstable undocumented opcodes (XAA, LXA, SHA, TAS, SHY, SHX, LAS); the
//! CPU refuses to decode those. Every other byte is either a documented
//! instruction, a stable undocumented one, or JAM.

use super::addressing::AddressingMode;
use super::addressing::AddressingMode::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    // Stable undocumented opcodes.
    Alr,
    Anc,
    Arr,
    Dcp,
    Isc,
    Jam,
    Lax,
    Rla,
    Rra,
    Sax,
    Sbx,
    Slo,
    Sre,
}

impl Operation {
    pub const fn mnemonic(self) -> &'static str {
        use Operation::*;
        match self {
            Adc => "ADC",
            And => "AND",
            Asl => "ASL",
            Bcc => "BCC",
            Bcs => "BCS",
            Beq => "BEQ",
            Bit => "BIT",
            Bmi => "BMI",
            Bne => "BNE",
            Bpl => "BPL",
            Brk => "BRK",
            Bvc => "BVC",
            Bvs => "BVS",
            Clc => "CLC",
            Cld => "CLD",
            Cli => "CLI",
            Clv => "CLV",
            Cmp => "CMP",
            Cpx => "CPX",
            Cpy => "CPY",
            Dec => "DEC",
            Dex => "DEX",
            Dey => "DEY",
            Eor => "EOR",
            Inc => "INC",
            Inx => "INX",
            Iny => "INY",
            Jmp => "JMP",
            Jsr => "JSR",
            Lda => "LDA",
            Ldx => "LDX",
            Ldy => "LDY",
            Lsr => "LSR",
            Nop => "NOP",
            Ora => "ORA",
            Pha => "PHA",
            Php => "PHP",
            Pla => "PLA",
            Plp => "PLP",
            Rol => "ROL",
            Ror => "ROR",
            Rti => "RTI",
            Rts => "RTS",
            Sbc => "SBC",
            Sec => "SEC",
            Sed => "SED",
            Sei => "SEI",
            Sta => "STA",
            Stx => "STX",
            Sty => "STY",
            Tax => "TAX",
            Tay => "TAY",
            Tsx => "TSX",
            Txa => "TXA",
            Txs => "TXS",
            Tya => "TYA",
            Alr => "ALR",
            Anc => "ANC",
            Arr => "ARR",
            Dcp => "DCP",
            Isc => "ISB",
            Jam => "JAM",
            Lax => "LAX",
            Rla => "RLA",
            Rra => "RRA",
            Sax => "SAX",
            Sbx => "AXS",
            Slo => "SLO",
            Sre => "SRE",
        }
    }

    pub const fn is_branch(self) -> bool {
        matches!(
            self,
            Operation::Bcc
                | Operation::Bcs
                | Operation::Beq
                | Operation::Bmi
                | Operation::Bne
                | Operation::Bpl
                | Operation::Bvc
                | Operation::Bvs
        )
    }
}

/// Extra cycles an instruction may incur on top of its base cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Penalty {
    None,
    /// +1 when indexing crosses a page.
    PageCross,
    /// +1 when taken, +1 more when the target is on another page.
    Branch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub op: Operation,
    pub mode: AddressingMode,
    pub cycles: u8,
    pub penalty: Penalty,
    pub undocumented: bool,
}

impl Instruction {
    /// Encoded length including the opcode byte.
    pub const fn len(&self) -> u8 {
        1 + self.mode.operand_bytes()
    }

    pub fn mnemonic(&self) -> &'static str {
        self.op.mnemonic()
    }
}

pub fn lookup(opcode: u8) -> Option<Instruction> {
    OPCODE_TABLE[opcode as usize]
}

const fn op(op: Operation, mode: AddressingMode, cycles: u8) -> Option<Instruction> {
    Some(Instruction {
        op,
        mode,
        cycles,
        penalty: Penalty::None,
        undocumented: false,
    })
}

// Page-cross sensitive.
const fn opx(op: Operation, mode: AddressingMode, cycles: u8) -> Option<Instruction> {
    Some(Instruction {
        op,
        mode,
        cycles,
        penalty: Penalty::PageCross,
        undocumented: false,
    })
}

const fn branch(op: Operation) -> Option<Instruction> {
    Some(Instruction {
        op,
        mode: Relative,
        cycles: 2,
        penalty: Penalty::Branch,
        undocumented: false,
    })
}

const fn ill(op: Operation, mode: AddressingMode, cycles: u8) -> Option<Instruction> {
    Some(Instruction {
        op,
        mode,
        cycles,
        penalty: Penalty::None,
        undocumented: true,
    })
}

const fn illx(op: Operation, mode: AddressingMode, cycles: u8) -> Option<Instruction> {
    Some(Instruction {
        op,
        mode,
        cycles,
        penalty: Penalty::PageCross,
        undocumented: true,
    })
}

pub static OPCODE_TABLE: [Option<Instruction>; 256] = build();

const fn build() -> [Option<Instruction>; 256] {
    use Operation::*;
    let mut t: [Option<Instruction>; 256] = [None; 256];

    t[0x69] = op(Adc, Immediate, 2);
    t[0x65] = op(Adc, ZeroPage, 3);
    t[0x75] = op(Adc, ZeroPageX, 4);
    t[0x6D] = op(Adc, Absolute, 4);
    t[0x7D] = opx(Adc, AbsoluteX, 4);
    t[0x79] = opx(Adc, AbsoluteY, 4);
    t[0x61] = op(Adc, IndirectX, 6);
    t[0x71] = opx(Adc, IndirectY, 5);

    t[0x29] = op(And, Immediate, 2);
    t[0x25] = op(And, ZeroPage, 3);
    t[0x35] = op(And, ZeroPageX, 4);
    t[0x2D] = op(And, Absolute, 4);
    t[0x3D] = opx(And, AbsoluteX, 4);
    t[0x39] = opx(And, AbsoluteY, 4);
    t[0x21] = op(And, IndirectX, 6);
    t[0x31] = opx(And, IndirectY, 5);

    t[0x0A] = op(Asl, Accumulator, 2);
    t[0x06] = op(Asl, ZeroPage, 5);
    t[0x16] = op(Asl, ZeroPageX, 6);
    t[0x0E] = op(Asl, Absolute, 6);
    t[0x1E] = op(Asl, AbsoluteX, 7);

    t[0x90] = branch(Bcc);
    t[0xB0] = branch(Bcs);
    t[0xF0] = branch(Beq);
    t[0x30] = branch(Bmi);
    t[0xD0] = branch(Bne);
    t[0x10] = branch(Bpl);
    t[0x50] = branch(Bvc);
    t[0x70] = branch(Bvs);

    t[0x24] = op(Bit, ZeroPage, 3);
    t[0x2C] = op(Bit, Absolute, 4);

    t[0x00] = op(Brk, Implied, 7);

    t[0x18] = op(Clc, Implied, 2);
    t[0xD8] = op(Cld, Implied, 2);
    t[0x58] = op(Cli, Implied, 2);
    t[0xB8] = op(Clv, Implied, 2);

    t[0xC9] = op(Cmp, Immediate, 2);
    t[0xC5] = op(Cmp, ZeroPage, 3);
    t[0xD5] = op(Cmp, ZeroPageX, 4);
    t[0xCD] = op(Cmp, Absolute, 4);
    t[0xDD] = opx(Cmp, AbsoluteX, 4);
    t[0xD9] = opx(Cmp, AbsoluteY, 4);
    t[0xC1] = op(Cmp, IndirectX, 6);
    t[0xD1] = opx(Cmp, IndirectY, 5);

    t[0xE0] = op(Cpx, Immediate, 2);
    t[0xE4] = op(Cpx, ZeroPage, 3);
    t[0xEC] = op(Cpx, Absolute, 4);

    t[0xC0] = op(Cpy, Immediate, 2);
    t[0xC4] = op(Cpy, ZeroPage, 3);
    t[0xCC] = op(Cpy, Absolute, 4);

    t[0xC6] = op(Dec, ZeroPage, 5);
    t[0xD6] = op(Dec, ZeroPageX, 6);
    t[0xCE] = op(Dec, Absolute, 6);
    t[0xDE] = op(Dec, AbsoluteX, 7);

    t[0xCA] = op(Dex, Implied, 2);
    t[0x88] = op(Dey, Implied, 2);

    t[0x49] = op(Eor, Immediate, 2);
    t[0x45] = op(Eor, ZeroPage, 3);
    t[0x55] = op(Eor, ZeroPageX, 4);
    t[0x4D] = op(Eor, Absolute, 4);
    t[0x5D] = opx(Eor, AbsoluteX, 4);
    t[0x59] = opx(Eor, AbsoluteY, 4);
    t[0x41] = op(Eor, IndirectX, 6);
    t[0x51] = opx(Eor, IndirectY, 5);

    t[0xE6] = op(Inc, ZeroPage, 5);
    t[0xF6] = op(Inc, ZeroPageX, 6);
    t[0xEE] = op(Inc, Absolute, 6);
    t[0xFE] = op(Inc, AbsoluteX, 7);

    t[0xE8] = op(Inx, Implied, 2);
    t[0xC8] = op(Iny, Implied, 2);

    t[0x4C] = op(Jmp, Absolute, 3);
    t[0x6C] = op(Jmp, Indirect, 5);
    t[0x20] = op(Jsr, Absolute, 6);

    t[0xA9] = op(Lda, Immediate, 2);
    t[0xA5] = op(Lda, ZeroPage, 3);
    t[0xB5] = op(Lda, ZeroPageX, 4);
    t[0xAD] = op(Lda, Absolute, 4);
    t[0xBD] = opx(Lda, AbsoluteX, 4);
    t[0xB9] = opx(Lda, AbsoluteY, 4);
    t[0xA1] = op(Lda, IndirectX, 6);
    t[0xB1] = opx(Lda, IndirectY, 5);

    t[0xA2] = op(Ldx, Immediate, 2);
    t[0xA6] = op(Ldx, ZeroPage, 3);
    t[0xB6] = op(Ldx, ZeroPageY, 4);
    t[0xAE] = op(Ldx, Absolute, 4);
    t[0xBE] = opx(Ldx, AbsoluteY, 4);

    t[0xA0] = op(Ldy, Immediate, 2);
    t[0xA4] = op(Ldy, ZeroPage, 3);
    t[0xB4] = op(Ldy, ZeroPageX, 4);
    t[0xAC] = op(Ldy, Absolute, 4);
    t[0xBC] = opx(Ldy, AbsoluteX, 4);

    t[0x4A] = op(Lsr, Accumulator, 2);
    t[0x46] = op(Lsr, ZeroPage, 5);
    t[0x56] = op(Lsr, ZeroPageX, 6);
    t[0x4E] = op(Lsr, Absolute, 6);
    t[0x5E] = op(Lsr, AbsoluteX, 7);

    t[0xEA] = op(Nop, Implied, 2);

    t[0x09] = op(Ora, Immediate, 2);
    t[0x05] = op(Ora, ZeroPage, 3);
    t[0x15] = op(Ora, ZeroPageX, 4);
    t[0x0D] = op(Ora, Absolute, 4);
    t[0x1D] = opx(Ora, AbsoluteX, 4);
    t[0x19] = opx(Ora, AbsoluteY, 4);
    t[0x01] = op(Ora, IndirectX, 6);
    t[0x11] = opx(Ora, IndirectY, 5);

    t[0x48] = op(Pha, Implied, 3);
    t[0x08] = op(Php, Implied, 3);
    t[0x68] = op(Pla, Implied, 4);
    t[0x28] = op(Plp, Implied, 4);

    t[0x2A] = op(Rol, Accumulator, 2);
    t[0x26] = op(Rol, ZeroPage, 5);
    t[0x36] = op(Rol, ZeroPageX, 6);
    t[0x2E] = op(Rol, Absolute, 6);
    t[0x3E] = op(Rol, AbsoluteX, 7);

    t[0x6A] = op(Ror, Accumulator, 2);
    t[0x66] = op(Ror, ZeroPage, 5);
    t[0x76] = op(Ror, ZeroPageX, 6);
    t[0x6E] = op(Ror, Absolute, 6);
    t[0x7E] = op(Ror, AbsoluteX, 7);

    t[0x40] = op(Rti, Implied, 6);
    t[0x60] = op(Rts, Implied, 6);

    t[0xE9] = op(Sbc, Immediate, 2);
    t[0xE5] = op(Sbc, ZeroPage, 3);
    t[0xF5] = op(Sbc, ZeroPageX, 4);
    t[0xED] = op(Sbc, Absolute, 4);
    t[0xFD] = opx(Sbc, AbsoluteX, 4);
    t[0xF9] = opx(Sbc, AbsoluteY, 4);
    t[0xE1] = op(Sbc, IndirectX, 6);
    t[0xF1] = opx(Sbc, IndirectY, 5);

    t[0x38] = op(Sec, Implied, 2);
    t[0xF8] = op(Sed, Implied, 2);
    t[0x78] = op(Sei, Implied, 2);

    t[0x85] = op(Sta, ZeroPage, 3);
    t[0x95] = op(Sta, ZeroPageX, 4);
    t[0x8D] = op(Sta, Absolute, 4);
    t[0x9D] = op(Sta, AbsoluteX, 5);
    t[0x99] = op(Sta, AbsoluteY, 5);
    t[0x81] = op(Sta, IndirectX, 6);
    t[0x91] = op(Sta, IndirectY, 6);

    t[0x86] = op(Stx, ZeroPage, 3);
    t[0x96] = op(Stx, ZeroPageY, 4);
    t[0x8E] = op(Stx, Absolute, 4);

    t[0x84] = op(Sty, ZeroPage, 3);
    t[0x94] = op(Sty, ZeroPageX, 4);
    t[0x8C] = op(Sty, Absolute, 4);

    t[0xAA] = op(Tax, Implied, 2);
    t[0xA8] = op(Tay, Implied, 2);
    t[0xBA] = op(Tsx, Implied, 2);
    t[0x8A] = op(Txa, Implied, 2);
    t[0x9A] = op(Txs, Implied, 2);
    t[0x98] = op(Tya, Implied, 2);

    // Undocumented NOPs.
    t[0x1A] = ill(Nop, Implied, 2);
    t[0x3A] = ill(Nop, Implied, 2);
    t[0x5A] = ill(Nop, Implied, 2);
    t[0x7A] = ill(Nop, Implied, 2);
    t[0xDA] = ill(Nop, Implied, 2);
    t[0xFA] = ill(Nop, Implied, 2);
    t[0x80] = ill(Nop, Immediate, 2);
    t[0x82] = ill(Nop, Immediate, 2);
    t[0x89] = ill(Nop, Immediate, 2);
    t[0xC2] = ill(Nop, Immediate, 2);
    t[0xE2] = ill(Nop, Immediate, 2);
    t[0x04] = ill(Nop, ZeroPage, 3);
    t[0x44] = ill(Nop, ZeroPage, 3);
    t[0x64] = ill(Nop, ZeroPage, 3);
    t[0x14] = ill(Nop, ZeroPageX, 4);
    t[0x34] = ill(Nop, ZeroPageX, 4);
    t[0x54] = ill(Nop, ZeroPageX, 4);
    t[0x74] = ill(Nop, ZeroPageX, 4);
    t[0xD4] = ill(Nop, ZeroPageX, 4);
    t[0xF4] = ill(Nop, ZeroPageX, 4);
    t[0x0C] = ill(Nop, Absolute, 4);
    t[0x1C] = illx(Nop, AbsoluteX, 4);
    t[0x3C] = illx(Nop, AbsoluteX, 4);
    t[0x5C] = illx(Nop, AbsoluteX, 4);
    t[0x7C] = illx(Nop, AbsoluteX, 4);
    t[0xDC] = illx(Nop, AbsoluteX, 4);
    t[0xFC] = illx(Nop, AbsoluteX, 4);

    t[0xA7] = ill(Lax, ZeroPage, 3);
    t[0xB7] = ill(Lax, ZeroPageY, 4);
    t[0xAF] = ill(Lax, Absolute, 4);
    t[0xBF] = illx(Lax, AbsoluteY, 4);
    t[0xA3] = ill(Lax, IndirectX, 6);
    t[0xB3] = illx(Lax, IndirectY, 5);

    t[0x87] = ill(Sax, ZeroPage, 3);
    t[0x97] = ill(Sax, ZeroPageY, 4);
    t[0x8F] = ill(Sax, Absolute, 4);
    t[0x83] = ill(Sax, IndirectX, 6);

    // Read-modify-write combos share one cycle profile.
    let rmw = [
        (Slo, 0x00u8),
        (Rla, 0x20),
        (Sre, 0x40),
        (Rra, 0x60),
        (Dcp, 0xC0),
        (Isc, 0xE0),
    ];
    let mut i = 0;
    while i < rmw.len() {
        let (operation, base) = rmw[i];
        let base = base as usize;
        t[base | 0x07] = ill(operation, ZeroPage, 5);
        t[base | 0x17] = ill(operation, ZeroPageX, 6);
        t[base | 0x0F] = ill(operation, Absolute, 6);
        t[base | 0x1F] = ill(operation, AbsoluteX, 7);
        t[base | 0x1B] = ill(operation, AbsoluteY, 7);
        t[base | 0x03] = ill(operation, IndirectX, 8);
        t[base | 0x13] = ill(operation, IndirectY, 8);
        i += 1;
    }

    t[0x0B] = ill(Anc, Immediate, 2);
    t[0x2B] = ill(Anc, Immediate, 2);
    t[0x4B] = ill(Alr, Immediate, 2);
    t[0x6B] = ill(Arr, Immediate, 2);
    t[0xCB] = ill(Sbx, Immediate, 2);
    t[0xEB] = ill(Sbc, Immediate, 2);

    let jams = [
        0x02, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2,
    ];
    let mut j = 0;
    while j < jams.len() {
        t[jams[j]] = ill(Jam, Implied, 2);
        j += 1;
    }

    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_set_is_exactly_the_unstable_opcodes() {
        let gaps: Vec<u8> = (0..=255u8).filter(|&o| lookup(o).is_none()).collect();
        assert_eq!(gaps, vec![0x8B, 0x93, 0x9B, 0x9C, 0x9E, 0x9F, 0xAB, 0xBB]);
    }

    #[test]
    fn documented_opcode_count() {
        let documented = OPCODE_TABLE
            .iter()
            .flatten()
            .filter(|i| !i.undocumented)
            .count();
        assert_eq!(documented, 151);
    }

    #[test]
    fn jam_opcodes() {
        let jams: Vec<u8> = (0..=255u8)
            .filter(|&o| lookup(o).is_some_and(|i| i.op == Operation::Jam))
            .collect();
        assert_eq!(jams.len(), 12);
        assert!(jams.iter().all(|o| o & 0x0F == 0x02));
    }

    #[test]
    fn branches_use_relative_mode_and_branch_penalty() {
        for instr in OPCODE_TABLE.iter().flatten() {
            assert_eq!(
                instr.op.is_branch(),
                instr.penalty == Penalty::Branch,
                "{}",
                instr.mnemonic()
            );
            if instr.op.is_branch() {
                assert_eq!(instr.mode, AddressingMode::Relative);
                assert_eq!(instr.cycles, 2);
            }
        }
    }

    #[test]
    fn stores_never_take_page_cross_penalty() {
        for instr in OPCODE_TABLE.iter().flatten() {
            if matches!(instr.op, Operation::Sta | Operation::Stx | Operation::Sty) {
                assert_eq!(instr.penalty, Penalty::None);
            }
        }
    }

    #[test]
    fn lengths() {
        assert_eq!(lookup(0xEA).map(|i| i.len()), Some(1));
        assert_eq!(lookup(0xA9).map(|i| i.len()), Some(2));
        assert_eq!(lookup(0x6C).map(|i| i.len()), Some(3));
        assert_eq!(lookup(0x1C).map(|i| i.len()), Some(3));
    }
}
