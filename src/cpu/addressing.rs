//! Operand resolution for the thirteen 6502 addressing modes.
//!
//! [`Cpu::resolve`] is the only place that consumes operand bytes from the
//! instruction stream. It leaves PC on the next opcode and reports whether
//! indexing (or a branch target) landed on a different page.

use super::Cpu;
use crate::cpu_bus::CpuBus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
}

impl AddressingMode {
    /// Bytes following the opcode.
    pub const fn operand_bytes(self) -> u8 {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 0,
            AddressingMode::Immediate
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::ZeroPageY
            | AddressingMode::IndirectX
            | AddressingMode::IndirectY
            | AddressingMode::Relative => 1,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    None,
    Accumulator,
    /// Effective address. For immediate mode this is the address of the
    /// literal byte; for relative mode it is the branch target.
    Address(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub operand: Operand,
    pub page_crossed: bool,
}

impl Resolved {
    fn plain(operand: Operand) -> Self {
        Resolved {
            operand,
            page_crossed: false,
        }
    }

    fn indexed(base: u16, index: u8) -> Self {
        let addr = base.wrapping_add(index as u16);
        Resolved {
            operand: Operand::Address(addr),
            page_crossed: crosses_page(base, addr),
        }
    }
}

#[inline]
pub fn crosses_page(a: u16, b: u16) -> bool {
    a & 0xFF00 != b & 0xFF00
}

impl Cpu {
    pub(super) fn fetch_byte<B: CpuBus>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read_u8(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    pub(super) fn fetch_word<B: CpuBus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch_byte(bus) as u16;
        let hi = self.fetch_byte(bus) as u16;
        (hi << 8) | lo
    }

    pub(super) fn resolve<B: CpuBus>(&mut self, bus: &mut B, mode: AddressingMode) -> Resolved {
        match mode {
            AddressingMode::Implied => Resolved::plain(Operand::None),
            AddressingMode::Accumulator => Resolved::plain(Operand::Accumulator),
            AddressingMode::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                Resolved::plain(Operand::Address(addr))
            }
            AddressingMode::ZeroPage => {
                let zp = self.fetch_byte(bus);
                Resolved::plain(Operand::Address(zp as u16))
            }
            AddressingMode::ZeroPageX => {
                let zp = self.fetch_byte(bus).wrapping_add(self.x);
                Resolved::plain(Operand::Address(zp as u16))
            }
            AddressingMode::ZeroPageY => {
                let zp = self.fetch_byte(bus).wrapping_add(self.y);
                Resolved::plain(Operand::Address(zp as u16))
            }
            AddressingMode::Absolute => {
                let addr = self.fetch_word(bus);
                Resolved::plain(Operand::Address(addr))
            }
            AddressingMode::AbsoluteX => {
                let base = self.fetch_word(bus);
                Resolved::indexed(base, self.x)
            }
            AddressingMode::AbsoluteY => {
                let base = self.fetch_word(bus);
                Resolved::indexed(base, self.y)
            }
            AddressingMode::Indirect => {
                // NMOS quirk: JMP ($10FF) takes its high byte from $1000.
                let ptr = self.fetch_word(bus);
                Resolved::plain(Operand::Address(bus.read_u16_wrapped(ptr)))
            }
            AddressingMode::IndirectX => {
                let zp = self.fetch_byte(bus).wrapping_add(self.x);
                Resolved::plain(Operand::Address(bus.read_u16_wrapped(zp as u16)))
            }
            AddressingMode::IndirectY => {
                let zp = self.fetch_byte(bus);
                let base = bus.read_u16_wrapped(zp as u16);
                Resolved::indexed(base, self.y)
            }
            AddressingMode::Relative => {
                let offset = self.fetch_byte(bus) as i8;
                let target = self.pc.wrapping_add(offset as i16 as u16);
                Resolved {
                    operand: Operand::Address(target),
                    page_crossed: crosses_page(self.pc, target),
                }
            }
        }
    }
}
