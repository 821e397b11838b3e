use std::collections::{HashMap, VecDeque};

use crate::cpu::{Cpu, Registers};
use crate::cpu_bus::CpuBus;
use crate::error::CpuError;
use crate::trace::disassemble;

#[derive(Debug, Clone)]
pub struct Breakpoint {
    pub address: u16,
    pub enabled: bool,
    pub hit_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    Continue,
    StepInstruction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub pc: u16,
    pub bytes: Vec<Option<u8>>,
    pub mnemonic: String,
    pub registers: Registers,
    pub cycle_count: u64,
}

/// Why [`Debugger::step`] did not run an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugStop {
    Breakpoint { pc: u16, hit_count: u32 },
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugStep {
    Ran(u32),
    Stopped(DebugStop),
}

/// Execution breakpoints plus a bounded instruction history.
///
/// Memory watchpoints live on [`crate::bus::Bus`] because only the bus
/// sees every access.
pub struct Debugger {
    breakpoints: HashMap<u16, Breakpoint>,
    trace_buffer: VecDeque<TraceEntry>,
    history_size: usize,
    step_mode: StepMode,
    paused: bool,
    // Lets the instruction under a breakpoint run once after a stop.
    resume_from: Option<u16>,
    instruction_count: u64,
}

impl Debugger {
    pub fn new(history_size: usize) -> Self {
        Self {
            breakpoints: HashMap::new(),
            trace_buffer: VecDeque::with_capacity(history_size),
            history_size,
            step_mode: StepMode::Continue,
            paused: false,
            resume_from: None,
            instruction_count: 0,
        }
    }

    pub fn add_breakpoint(&mut self, address: u16) {
        self.breakpoints.insert(
            address,
            Breakpoint {
                address,
                enabled: true,
                hit_count: 0,
            },
        );
        log::debug!("breakpoint added at ${:04X}", address);
    }

    pub fn remove_breakpoint(&mut self, address: u16) -> Option<Breakpoint> {
        let removed = self.breakpoints.remove(&address);
        if removed.is_some() {
            log::debug!("breakpoint removed from ${:04X}", address);
        }
        removed
    }

    pub fn toggle_breakpoint(&mut self, address: u16) {
        if let Some(bp) = self.breakpoints.get_mut(&address) {
            bp.enabled = !bp.enabled;
        }
    }

    pub fn breakpoints(&self) -> impl Iterator<Item = &Breakpoint> {
        self.breakpoints.values()
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
        self.step_mode = StepMode::Continue;
    }

    /// Run exactly one more instruction, then pause.
    pub fn step_instruction(&mut self) {
        self.paused = false;
        self.step_mode = StepMode::StepInstruction;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn trace(&self) -> impl Iterator<Item = &TraceEntry> {
        self.trace_buffer.iter()
    }

    pub fn instruction_count(&self) -> u64 {
        self.instruction_count
    }

    /// Step `cpu` unless paused or sitting on an enabled breakpoint.
    pub fn step<B: CpuBus>(&mut self, cpu: &mut Cpu, bus: &mut B) -> Result<DebugStep, CpuError> {
        if self.paused {
            return Ok(DebugStep::Stopped(DebugStop::Paused));
        }

        let pc = cpu.pc;
        if self.resume_from.take() != Some(pc) {
            if let Some(bp) = self.breakpoints.get_mut(&pc).filter(|bp| bp.enabled) {
                bp.hit_count += 1;
                log::info!("breakpoint hit at ${:04X} (hit count: {})", pc, bp.hit_count);
                let stop = DebugStop::Breakpoint {
                    pc,
                    hit_count: bp.hit_count,
                };
                self.paused = true;
                self.resume_from = Some(pc);
                return Ok(DebugStep::Stopped(stop));
            }
        }

        self.record_trace(cpu, bus);
        let cycles = cpu.step(bus)?;
        self.instruction_count += 1;

        if self.step_mode == StepMode::StepInstruction {
            self.paused = true;
        }
        Ok(DebugStep::Ran(cycles))
    }

    fn record_trace<B: CpuBus>(&mut self, cpu: &Cpu, bus: &B) {
        if self.history_size == 0 {
            return;
        }
        let dis = disassemble(bus, cpu.pc);
        let entry = TraceEntry {
            pc: cpu.pc,
            bytes: dis.bytes,
            mnemonic: dis.text,
            registers: cpu.inspect(),
            cycle_count: cpu.cycles(),
        };

        if self.trace_buffer.len() == self.history_size {
            self.trace_buffer.pop_front();
        }
        self.trace_buffer.push_back(entry);
    }
}

impl Default for Debugger {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Bus;
    use crate::memory::Ram;

    fn setup() -> (Cpu, Bus) {
        let mut bus = Bus::default();
        bus.map(0x0000..=0xFFFF, Ram::new(0x10000)).unwrap();
        // LDX #$00; INX; JMP $8002
        bus.load(0x8000, &[0xA2, 0x00, 0xE8, 0x4C, 0x02, 0x80]);
        bus.load(0xFFFC, &[0x00, 0x80]);
        let cpu = Cpu::boot(Default::default(), &mut bus);
        (cpu, bus)
    }

    #[test]
    fn stops_before_breakpoint_then_runs_it_after_resume() {
        let (mut cpu, mut bus) = setup();
        let mut dbg = Debugger::default();
        dbg.add_breakpoint(0x8002);

        assert_eq!(dbg.step(&mut cpu, &mut bus).unwrap(), DebugStep::Ran(2));
        assert_eq!(
            dbg.step(&mut cpu, &mut bus).unwrap(),
            DebugStep::Stopped(DebugStop::Breakpoint {
                pc: 0x8002,
                hit_count: 1
            })
        );
        assert_eq!(cpu.x, 0);
        assert_eq!(
            dbg.step(&mut cpu, &mut bus).unwrap(),
            DebugStep::Stopped(DebugStop::Paused)
        );

        dbg.resume();
        assert_eq!(dbg.step(&mut cpu, &mut bus).unwrap(), DebugStep::Ran(2));
        assert_eq!(cpu.x, 1);
    }

    #[test]
    fn single_step_pauses_after_one_instruction() {
        let (mut cpu, mut bus) = setup();
        let mut dbg = Debugger::default();
        dbg.step_instruction();
        assert!(matches!(dbg.step(&mut cpu, &mut bus).unwrap(), DebugStep::Ran(_)));
        assert!(dbg.is_paused());
        assert_eq!(dbg.instruction_count(), 1);
    }

    #[test]
    fn trace_buffer_is_bounded() {
        let (mut cpu, mut bus) = setup();
        let mut dbg = Debugger::new(4);
        for _ in 0..10 {
            dbg.step(&mut cpu, &mut bus).unwrap();
        }
        let entries: Vec<_> = dbg.trace().collect();
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|e| e.pc == 0x8002 || e.pc == 0x8003));
        assert!(entries.iter().any(|e| e.mnemonic == "JMP $8002"));
    }
}
