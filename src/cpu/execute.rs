use super::addressing::{Operand, Resolved};
use super::table::{Instruction, Operation};
use super::{Cpu, ExecState, IRQ_VECTOR};
use crate::cpu_bus::CpuBus;

impl Cpu {
    /// Carry out `instr` against its resolved operand. Returns the cycles
    /// added by a taken branch; every other penalty is settled by the caller.
    pub(super) fn execute<B: CpuBus>(
        &mut self,
        bus: &mut B,
        instr: &Instruction,
        resolved: Resolved,
    ) -> u32 {
        let operand = resolved.operand;
        match instr.op {
            // Load / store
            Operation::Lda => {
                self.a = self.load(bus, operand);
                self.status.set_zn(self.a);
            }
            Operation::Ldx => {
                self.x = self.load(bus, operand);
                self.status.set_zn(self.x);
            }
            Operation::Ldy => {
                self.y = self.load(bus, operand);
                self.status.set_zn(self.y);
            }
            Operation::Sta => self.store(bus, operand, self.a),
            Operation::Stx => self.store(bus, operand, self.x),
            Operation::Sty => self.store(bus, operand, self.y),

            // Transfers
            Operation::Tax => {
                self.x = self.a;
                self.status.set_zn(self.x);
            }
            Operation::Tay => {
                self.y = self.a;
                self.status.set_zn(self.y);
            }
            Operation::Tsx => {
                self.x = self.sp;
                self.status.set_zn(self.x);
            }
            Operation::Txa => {
                self.a = self.x;
                self.status.set_zn(self.a);
            }
            Operation::Txs => self.sp = self.x,
            Operation::Tya => {
                self.a = self.y;
                self.status.set_zn(self.a);
            }

            // Arithmetic / logic
            Operation::Adc => {
                let value = self.load(bus, operand);
                self.adc(value);
            }
            Operation::Sbc => {
                let value = self.load(bus, operand);
                self.sbc(value);
            }
            Operation::And => {
                self.a &= self.load(bus, operand);
                self.status.set_zn(self.a);
            }
            Operation::Ora => {
                self.a |= self.load(bus, operand);
                self.status.set_zn(self.a);
            }
            Operation::Eor => {
                self.a ^= self.load(bus, operand);
                self.status.set_zn(self.a);
            }
            Operation::Bit => {
                let value = self.load(bus, operand);
                self.status.set_zero(self.a & value == 0);
                self.status.set_negative(value & 0x80 != 0);
                self.status.set_overflow(value & 0x40 != 0);
            }
            Operation::Cmp => {
                let value = self.load(bus, operand);
                self.compare(self.a, value);
            }
            Operation::Cpx => {
                let value = self.load(bus, operand);
                self.compare(self.x, value);
            }
            Operation::Cpy => {
                let value = self.load(bus, operand);
                self.compare(self.y, value);
            }

            // Increments
            Operation::Inc => {
                self.modify(bus, operand, |_, v| v.wrapping_add(1));
            }
            Operation::Dec => {
                self.modify(bus, operand, |_, v| v.wrapping_sub(1));
            }
            Operation::Inx => {
                self.x = self.x.wrapping_add(1);
                self.status.set_zn(self.x);
            }
            Operation::Iny => {
                self.y = self.y.wrapping_add(1);
                self.status.set_zn(self.y);
            }
            Operation::Dex => {
                self.x = self.x.wrapping_sub(1);
                self.status.set_zn(self.x);
            }
            Operation::Dey => {
                self.y = self.y.wrapping_sub(1);
                self.status.set_zn(self.y);
            }

            // Shifts
            Operation::Asl => {
                self.modify(bus, operand, Cpu::asl);
            }
            Operation::Lsr => {
                self.modify(bus, operand, Cpu::lsr);
            }
            Operation::Rol => {
                self.modify(bus, operand, Cpu::rol);
            }
            Operation::Ror => {
                self.modify(bus, operand, Cpu::ror);
            }

            // Branches
            Operation::Bcc => return self.branch(resolved, !self.status.carry()),
            Operation::Bcs => return self.branch(resolved, self.status.carry()),
            Operation::Beq => return self.branch(resolved, self.status.zero()),
            Operation::Bne => return self.branch(resolved, !self.status.zero()),
            Operation::Bmi => return self.branch(resolved, self.status.negative()),
            Operation::Bpl => return self.branch(resolved, !self.status.negative()),
            Operation::Bvs => return self.branch(resolved, self.status.overflow()),
            Operation::Bvc => return self.branch(resolved, !self.status.overflow()),

            // Jumps and subroutines
            Operation::Jmp => {
                if let Operand::Address(addr) = operand {
                    self.pc = addr;
                }
            }
            Operation::Jsr => {
                if let Operand::Address(addr) = operand {
                    let ret = self.pc.wrapping_sub(1);
                    self.push_u16(bus, ret);
                    self.pc = addr;
                }
            }
            Operation::Rts => {
                self.pc = self.pull_u16(bus).wrapping_add(1);
            }
            Operation::Rti => {
                let flags = self.pull(bus);
                self.status = super::StatusFlags::from_byte(flags);
                self.pc = self.pull_u16(bus);
            }
            Operation::Brk => {
                // The byte after BRK is padding and is skipped on return.
                let ret = self.pc.wrapping_add(1);
                self.push_u16(bus, ret);
                self.push(bus, self.status.pushed(true));
                self.status.set_interrupt_disable(true);
                self.pc = bus.read_u16(IRQ_VECTOR);
            }

            // Stack
            Operation::Pha => self.push(bus, self.a),
            Operation::Php => self.push(bus, self.status.pushed(true)),
            Operation::Pla => {
                self.a = self.pull(bus);
                self.status.set_zn(self.a);
            }
            Operation::Plp => {
                let flags = self.pull(bus);
                self.status = super::StatusFlags::from_byte(flags);
            }

            // Flags
            Operation::Clc => self.status.set_carry(false),
            Operation::Sec => self.status.set_carry(true),
            Operation::Cli => self.status.set_interrupt_disable(false),
            Operation::Sei => self.status.set_interrupt_disable(true),
            Operation::Cld => self.status.set_decimal(false),
            Operation::Sed => self.status.set_decimal(true),
            Operation::Clv => self.status.set_overflow(false),

            // Operand is still fetched so bus side effects match hardware.
            Operation::Nop => {
                if let Operand::Address(addr) = operand {
                    bus.read_u8(addr);
                }
            }

            // Undocumented
            Operation::Lax => {
                let value = self.load(bus, operand);
                self.a = value;
                self.x = value;
                self.status.set_zn(value);
            }
            Operation::Sax => self.store(bus, operand, self.a & self.x),
            Operation::Slo => {
                let value = self.modify(bus, operand, Cpu::asl);
                self.a |= value;
                self.status.set_zn(self.a);
            }
            Operation::Rla => {
                let value = self.modify(bus, operand, Cpu::rol);
                self.a &= value;
                self.status.set_zn(self.a);
            }
            Operation::Sre => {
                let value = self.modify(bus, operand, Cpu::lsr);
                self.a ^= value;
                self.status.set_zn(self.a);
            }
            Operation::Rra => {
                let value = self.modify(bus, operand, Cpu::ror);
                self.adc(value);
            }
            Operation::Dcp => {
                let value = self.modify(bus, operand, |_, v| v.wrapping_sub(1));
                self.compare(self.a, value);
            }
            Operation::Isc => {
                let value = self.modify(bus, operand, |_, v| v.wrapping_add(1));
                self.sbc(value);
            }
            Operation::Anc => {
                self.a &= self.load(bus, operand);
                self.status.set_zn(self.a);
                self.status.set_carry(self.a & 0x80 != 0);
            }
            Operation::Alr => {
                let value = self.a & self.load(bus, operand);
                self.a = Cpu::lsr(self, value);
                self.status.set_zn(self.a);
            }
            Operation::Arr => {
                let value = self.a & self.load(bus, operand);
                if self.config.decimal_mode && self.status.decimal() {
                    self.arr_decimal(value);
                } else {
                    let carry_in = (self.status.carry() as u8) << 7;
                    self.a = (value >> 1) | carry_in;
                    self.status.set_zn(self.a);
                    self.status.set_carry(self.a & 0x40 != 0);
                    self.status
                        .set_overflow(((self.a >> 6) ^ (self.a >> 5)) & 0x01 != 0);
                }
            }
            Operation::Sbx => {
                let value = self.load(bus, operand);
                let ax = self.a & self.x;
                self.status.set_carry(ax >= value);
                self.x = ax.wrapping_sub(value);
                self.status.set_zn(self.x);
            }
            Operation::Jam => {
                self.pc = self.pc.wrapping_sub(1);
                self.state = ExecState::Halted;
                log::warn!("cpu: JAM at ${:04X}, halting", self.pc);
            }
        }
        0
    }

    fn load<B: CpuBus>(&mut self, bus: &mut B, operand: Operand) -> u8 {
        match operand {
            Operand::Accumulator => self.a,
            Operand::Address(addr) => bus.read_u8(addr),
            Operand::None => 0,
        }
    }

    fn store<B: CpuBus>(&mut self, bus: &mut B, operand: Operand, value: u8) {
        match operand {
            Operand::Accumulator => self.a = value,
            Operand::Address(addr) => bus.write_u8(addr, value),
            Operand::None => {}
        }
    }

    /// Read-modify-write; `f` also updates flags. Returns the new value.
    fn modify<B, F>(&mut self, bus: &mut B, operand: Operand, f: F) -> u8
    where
        B: CpuBus,
        F: FnOnce(&mut Cpu, u8) -> u8,
    {
        let old = self.load(bus, operand);
        let new = f(self, old);
        self.store(bus, operand, new);
        self.status.set_zn(new);
        new
    }

    fn asl(&mut self, value: u8) -> u8 {
        self.status.set_carry(value & 0x80 != 0);
        value << 1
    }

    fn lsr(&mut self, value: u8) -> u8 {
        self.status.set_carry(value & 0x01 != 0);
        value >> 1
    }

    fn rol(&mut self, value: u8) -> u8 {
        let carry_in = self.status.carry() as u8;
        self.status.set_carry(value & 0x80 != 0);
        (value << 1) | carry_in
    }

    fn ror(&mut self, value: u8) -> u8 {
        let carry_in = (self.status.carry() as u8) << 7;
        self.status.set_carry(value & 0x01 != 0);
        (value >> 1) | carry_in
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.status.set_carry(register >= value);
        self.status.set_zn(register.wrapping_sub(value));
    }

    fn branch(&mut self, resolved: Resolved, condition: bool) -> u32 {
        if !condition {
            return 0;
        }
        if let Operand::Address(target) = resolved.operand {
            self.pc = target;
        }
        1 + resolved.page_crossed as u32
    }

    pub(super) fn adc(&mut self, value: u8) {
        if self.config.decimal_mode && self.status.decimal() {
            self.adc_decimal(value);
            return;
        }
        self.add_binary(value);
    }

    pub(super) fn sbc(&mut self, value: u8) {
        if self.config.decimal_mode && self.status.decimal() {
            self.sbc_decimal(value);
            return;
        }
        self.add_binary(!value);
    }

    // A + M + C. Overflow when both inputs share a sign the result lacks.
    fn add_binary(&mut self, value: u8) {
        let a = self.a;
        let sum = a as u16 + value as u16 + self.status.carry() as u16;
        let result = sum as u8;
        self.status.set_carry(sum > 0xFF);
        self.status
            .set_overflow((a ^ result) & (value ^ result) & 0x80 != 0);
        self.a = result;
        self.status.set_zn(result);
    }

    // NMOS BCD: Z comes from the binary sum, N and V from the half-adjusted
    // intermediate, C from the final decimal adjust.
    fn adc_decimal(&mut self, value: u8) {
        let a = self.a as u16;
        let v = value as u16;
        let carry = self.status.carry() as u16;

        let binary = (a + v + carry) as u8;

        let mut lo = (a & 0x0F) + (v & 0x0F) + carry;
        if lo > 0x09 {
            lo += 0x06;
        }
        let mut hi = (a >> 4) + (v >> 4) + (lo > 0x0F) as u16;
        let intermediate = ((hi << 4) | (lo & 0x0F)) as u8;

        self.status.set_zero(binary == 0);
        self.status.set_negative(intermediate & 0x80 != 0);
        self.status.set_overflow(
            (self.a ^ intermediate) & (value ^ intermediate) & 0x80 != 0,
        );

        if hi > 0x09 {
            hi += 0x06;
        }
        self.status.set_carry(hi > 0x0F);
        self.a = ((hi << 4) | (lo & 0x0F)) as u8;
    }

    // NMOS ARR with D set: N is the old carry, Z and V come from the
    // rotated value, then each nibble is BCD-adjusted and C follows the
    // high nibble fix-up.
    fn arr_decimal(&mut self, value: u8) {
        let carry_in = self.status.carry();
        let rotated = (value >> 1) | ((carry_in as u8) << 7);

        self.status.set_negative(carry_in);
        self.status.set_zero(rotated == 0);
        self.status.set_overflow((value ^ rotated) & 0x40 != 0);

        let mut result = rotated;
        let lo = value & 0x0F;
        if lo + (lo & 0x01) > 0x05 {
            result = (result & 0xF0) | (result.wrapping_add(0x06) & 0x0F);
        }
        let hi = value & 0xF0;
        if hi as u16 + (hi & 0x10) as u16 > 0x50 {
            self.status.set_carry(true);
            result = result.wrapping_add(0x60);
        } else {
            self.status.set_carry(false);
        }
        self.a = result;
    }

    // NMOS BCD subtract: all flags follow the binary subtraction.
    fn sbc_decimal(&mut self, value: u8) {
        let a = self.a as i16;
        let v = value as i16;
        let borrow = 1 - self.status.carry() as i16;

        let mut lo = (a & 0x0F) - (v & 0x0F) - borrow;
        let mut hi = (a >> 4) - (v >> 4);
        if lo < 0 {
            lo -= 0x06;
            hi -= 1;
        }
        if hi < 0 {
            hi -= 0x06;
        }

        self.add_binary(!value);
        self.a = (((hi << 4) as u16 & 0xF0) | (lo as u16 & 0x0F)) as u8;
    }
}
