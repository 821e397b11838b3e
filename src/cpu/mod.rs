//! NMOS 6502 core.
//!
//! The host owns the bus and lends it for each [`Cpu::step`]. A step runs
//! one instruction (or one interrupt entry sequence) to completion and
//! returns the cycles it took; the host spreads those cycles over its
//! peripherals. Nothing in here sleeps, blocks or keeps a bus handle.

pub mod addressing;
mod execute;
pub mod status;
pub mod table;


use serde::{Deserialize, Serialize};

use crate::clock::{Clock, CycleBudget};
use crate::cpu_bus::CpuBus;
use crate::error::CpuError;
use crate::trace;

pub use addressing::AddressingMode;
pub use status::StatusFlags;
pub use table::{Instruction, Operation, Penalty, OPCODE_TABLE};

pub const STACK_PAGE: u16 = 0x0100;
pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;
pub const INTERRUPT_CYCLES: u32 = 7;
pub const POWER_ON_SP: u8 = 0xFD;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Nmi,
    Reset,
    Irq,
}

impl Interrupt {
    pub const fn vector(self) -> u16 {
        match self {
            Interrupt::Nmi => NMI_VECTOR,
            Interrupt::Reset => RESET_VECTOR,
            Interrupt::Irq => IRQ_VECTOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecState {
    Fetching,
    Executing,
    ServicingInterrupt,
    Halted,
}

#[derive(Debug, Clone, Default)]
pub struct CpuConfig {
    /// Honour the D flag in ADC/SBC. The 2A03 has BCD disconnected, so
    /// this is off unless the host asks for a stock 6502.
    pub decimal_mode: bool,
}

/// Register snapshot returned by [`Cpu::inspect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
}

pub struct Cpu {
    pub a: u8,   // Accumulator
    pub x: u8,   // X register
    pub y: u8,   // Y register
    pub sp: u8,  // Stack pointer, offset into page 1
    pub pc: u16, // Program counter
    pub status: StatusFlags,
    config: CpuConfig,
    state: ExecState,
    irq_pending: bool,
    nmi_pending: bool,
    reset_pending: bool,
    // Cycles still owed by the instruction started in `tick`.
    pending_cycles: u32,
    clock: Clock,
}

impl Cpu {
    pub fn new(config: CpuConfig) -> Self {
        Cpu {
            a: 0,
            x: 0,
            y: 0,
            sp: POWER_ON_SP,
            pc: 0,
            status: StatusFlags::POWER_ON,
            config,
            state: ExecState::Fetching,
            irq_pending: false,
            nmi_pending: false,
            reset_pending: false,
            pending_cycles: 0,
            clock: Clock::default(),
        }
    }

    /// Construct and power on in one go.
    pub fn boot<B: CpuBus>(config: CpuConfig, bus: &mut B) -> Self {
        let mut cpu = Cpu::new(config);
        cpu.reset(bus);
        cpu
    }

    /// Power-on reset: A=X=Y=0, SP=$FD, P=$24, PC from $FFFC/$FFFD.
    /// Clears latched interrupts and leaves the halted state.
    pub fn reset<B: CpuBus>(&mut self, bus: &mut B) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = POWER_ON_SP;
        self.status = StatusFlags::POWER_ON;
        self.pc = bus.read_u16(RESET_VECTOR);
        self.irq_pending = false;
        self.nmi_pending = false;
        self.reset_pending = false;
        self.pending_cycles = 0;
        self.state = ExecState::Fetching;
        self.clock.record(INTERRUPT_CYCLES, false);
        log::debug!("cpu: reset, pc=${:04X}", self.pc);
    }

    pub fn config(&self) -> &CpuConfig {
        &self.config
    }

    pub fn state(&self) -> ExecState {
        self.state
    }

    pub fn is_halted(&self) -> bool {
        self.state == ExecState::Halted
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Total cycles consumed since construction.
    pub fn cycles(&self) -> u64 {
        self.clock.total()
    }

    pub fn inspect(&self) -> Registers {
        Registers {
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            pc: self.pc,
            status: self.status.to_byte(),
        }
    }

    /// Latch a maskable interrupt. Repeated requests coalesce.
    pub fn request_irq(&mut self) {
        self.irq_pending = true;
    }

    /// Withdraw a latched IRQ the device no longer asserts.
    pub fn clear_irq(&mut self) {
        self.irq_pending = false;
    }

    pub fn request_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Latch a warm reset. Unlike [`Cpu::reset`], A/X/Y survive and the
    /// stack pointer drops by three.
    pub fn request_reset(&mut self) {
        self.reset_pending = true;
    }

    pub fn irq_pending(&self) -> bool {
        self.irq_pending
    }

    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    pub fn reset_pending(&self) -> bool {
        self.reset_pending
    }

    /// Host-issued stop. Only a reset leaves it, or [`Cpu::resume`].
    pub fn halt(&mut self) {
        log::debug!("cpu: halted by host at ${:04X}", self.pc);
        self.state = ExecState::Halted;
        self.pending_cycles = 0;
    }

    pub fn resume(&mut self) {
        if self.state == ExecState::Halted {
            self.state = ExecState::Fetching;
        }
    }

    /// Execute one instruction or interrupt entry and return its cycles.
    ///
    /// If a previous [`Cpu::tick`] left an instruction mid-flight, this
    /// finishes it instead and returns the cycles it still owed.
    pub fn step<B: CpuBus>(&mut self, bus: &mut B) -> Result<u32, CpuError> {
        if self.pending_cycles > 0 {
            let owed = std::mem::take(&mut self.pending_cycles);
            if self.state != ExecState::Halted {
                self.state = ExecState::Fetching;
            }
            return Ok(owed);
        }

        let cycles = self.run_one(bus)?;
        if self.state != ExecState::Halted {
            self.state = ExecState::Fetching;
        }
        Ok(cycles)
    }

    /// Advance one clock cycle.
    ///
    /// The whole instruction executes on its first cycle; the remaining
    /// cycles are idled through with the state left at `Executing` or
    /// `ServicingInterrupt` so the host can interleave peripherals.
    pub fn tick<B: CpuBus>(&mut self, bus: &mut B) -> Result<ExecState, CpuError> {
        if self.pending_cycles > 0 {
            self.pending_cycles -= 1;
            if self.pending_cycles == 0 && self.state != ExecState::Halted {
                self.state = ExecState::Fetching;
            }
            return Ok(self.state);
        }

        let cycles = self.run_one(bus)?;
        self.pending_cycles = cycles.saturating_sub(1);
        if self.pending_cycles == 0 && self.state != ExecState::Halted {
            self.state = ExecState::Fetching;
        }
        Ok(self.state)
    }

    /// Step until at least `cycles` have elapsed; returns the cycles used.
    pub fn run_cycles<B: CpuBus>(&mut self, bus: &mut B, cycles: u64) -> Result<u64, CpuError> {
        let mut used = 0u64;
        while used < cycles {
            used += self.step(bus)? as u64;
        }
        Ok(used)
    }

    /// Spend `budget` credit; overshoot is carried as negative credit.
    pub fn run<B: CpuBus>(&mut self, bus: &mut B, budget: &mut CycleBudget) -> Result<u64, CpuError> {
        let mut used = 0u64;
        while budget.has_credit() {
            let cycles = self.step(bus)?;
            budget.spend(cycles);
            used += cycles as u64;
        }
        Ok(used)
    }

    fn run_one<B: CpuBus>(&mut self, bus: &mut B) -> Result<u32, CpuError> {
        if self.reset_pending {
            self.reset_pending = false;
            return Ok(self.service_reset(bus));
        }
        if self.state == ExecState::Halted {
            return Err(CpuError::Halted { pc: self.pc });
        }
        if self.nmi_pending {
            self.nmi_pending = false;
            return Ok(self.service_interrupt(bus, Interrupt::Nmi));
        }
        if self.irq_pending && !self.status.interrupt_disable() {
            self.irq_pending = false;
            return Ok(self.service_interrupt(bus, Interrupt::Irq));
        }

        if log::log_enabled!(log::Level::Trace) {
            log::trace!("{}", trace::trace_line(self, &*bus));
        }

        let pc = self.pc;
        let opcode = bus.read_u8(pc);
        let Some(instr) = table::lookup(opcode) else {
            log::warn!("cpu: undecodable opcode 0x{:02X} at ${:04X}", opcode, pc);
            return Err(CpuError::Decode { opcode, pc });
        };
        self.pc = pc.wrapping_add(1);
        self.state = ExecState::Executing;

        let resolved = self.resolve(bus, instr.mode);
        let mut cycles = instr.cycles as u32;
        if instr.penalty == Penalty::PageCross && resolved.page_crossed {
            cycles += 1;
        }
        cycles += self.execute(bus, &instr, resolved);

        self.clock.record(cycles, true);
        Ok(cycles)
    }

    fn service_interrupt<B: CpuBus>(&mut self, bus: &mut B, interrupt: Interrupt) -> u32 {
        self.state = ExecState::ServicingInterrupt;
        self.push_u16(bus, self.pc);
        self.push(bus, self.status.pushed(false));
        self.status.set_interrupt_disable(true);
        self.pc = bus.read_u16(interrupt.vector());
        log::trace!("cpu: {:?} -> ${:04X}", interrupt, self.pc);
        self.clock.record(INTERRUPT_CYCLES, false);
        INTERRUPT_CYCLES
    }

    // Warm reset runs the interrupt sequence with writes suppressed.
    fn service_reset<B: CpuBus>(&mut self, bus: &mut B) -> u32 {
        self.state = ExecState::ServicingInterrupt;
        self.sp = self.sp.wrapping_sub(3);
        self.status.set_interrupt_disable(true);
        self.pc = bus.read_u16(RESET_VECTOR);
        self.irq_pending = false;
        self.nmi_pending = false;
        log::debug!("cpu: warm reset -> ${:04X}", self.pc);
        self.clock.record(INTERRUPT_CYCLES, false);
        INTERRUPT_CYCLES
    }

    pub(crate) fn push<B: CpuBus>(&mut self, bus: &mut B, value: u8) {
        bus.write_u8(STACK_PAGE | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    pub(crate) fn pull<B: CpuBus>(&mut self, bus: &mut B) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read_u8(STACK_PAGE | self.sp as u16)
    }

    /// High byte first, so the low byte ends up at the lower address.
    pub(crate) fn push_u16<B: CpuBus>(&mut self, bus: &mut B, value: u16) {
        self.push(bus, (value >> 8) as u8);
        self.push(bus, value as u8);
    }

    pub(crate) fn pull_u16<B: CpuBus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.pull(bus) as u16;
        let hi = self.pull(bus) as u16;
        (hi << 8) | lo
    }

    // Used by save_state.
    pub(crate) fn latches(&self) -> (bool, bool, bool) {
        (self.irq_pending, self.nmi_pending, self.reset_pending)
    }

    pub(crate) fn pending_cycles(&self) -> u32 {
        self.pending_cycles
    }

    pub(crate) fn restore_internal(
        &mut self,
        state: ExecState,
        latches: (bool, bool, bool),
        pending_cycles: u32,
        clock: Clock,
    ) {
        self.state = state;
        (self.irq_pending, self.nmi_pending, self.reset_pending) = latches;
        self.pending_cycles = pending_cycles;
        self.clock = clock;
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Cpu::new(CpuConfig::default())
    }
}
