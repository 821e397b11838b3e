use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::cpu::{Cpu, ExecState, StatusFlags};
use crate::error::SnapshotError;

/// Everything needed to resume the CPU bit-for-bit at an instruction
/// boundary. Memory and device state belong to their owners and are
/// saved separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuSnapshot {
    pub version: u32,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
    pub irq_pending: bool,
    pub nmi_pending: bool,
    pub reset_pending: bool,
    pub state: ExecState,
    pub pending_cycles: u32,
    pub clock: Clock,
}

impl CpuSnapshot {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn capture(cpu: &Cpu) -> Self {
        let (irq_pending, nmi_pending, reset_pending) = cpu.latches();
        CpuSnapshot {
            version: Self::CURRENT_VERSION,
            a: cpu.a,
            x: cpu.x,
            y: cpu.y,
            sp: cpu.sp,
            pc: cpu.pc,
            status: cpu.status.to_byte(),
            irq_pending,
            nmi_pending,
            reset_pending,
            state: cpu.state(),
            pending_cycles: cpu.pending_cycles(),
            clock: *cpu.clock(),
        }
    }

    /// Overwrite `cpu` with this snapshot. Configuration is left alone.
    pub fn restore(&self, cpu: &mut Cpu) {
        cpu.a = self.a;
        cpu.x = self.x;
        cpu.y = self.y;
        cpu.sp = self.sp;
        cpu.pc = self.pc;
        cpu.status = StatusFlags::from_byte(self.status);
        cpu.restore_internal(
            self.state,
            (self.irq_pending, self.nmi_pending, self.reset_pending),
            self.pending_cycles,
            self.clock,
        );
    }

    /// Fixed-width little-endian encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: CpuSnapshot = bincode::deserialize(data)?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: CpuSnapshot = serde_json::from_str(json)?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    pub fn save_to_file(&self, filename: &str) -> Result<(), SnapshotError> {
        let data = self.to_bytes()?;
        std::fs::write(filename, data)?;
        log::info!("save state written to: {}", filename);
        Ok(())
    }

    pub fn load_from_file(filename: &str) -> Result<Self, SnapshotError> {
        let data = std::fs::read(filename)?;
        let snapshot = Self::from_bytes(&data)?;
        log::info!("save state loaded from: {}", filename);
        Ok(snapshot)
    }

    fn check_version(&self) -> Result<(), SnapshotError> {
        if self.version > Self::CURRENT_VERSION {
            return Err(SnapshotError::Version {
                found: self.version,
                current: Self::CURRENT_VERSION,
            });
        }
        Ok(())
    }
}

impl Cpu {
    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot::capture(self)
    }

    pub fn restore(&mut self, snapshot: &CpuSnapshot) {
        snapshot.restore(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Bus;
    use crate::cpu::CpuConfig;
    use crate::cpu_bus::CpuBus;
    use crate::memory::Ram;

    fn bus_with_program(program: &[u8]) -> Bus {
        let mut bus = Bus::default();
        bus.map(0x0000..=0xFFFF, Ram::new(0x10000)).unwrap();
        bus.load(0x8000, program);
        bus.write_u8(0xFFFC, 0x00);
        bus.write_u8(0xFFFD, 0x80);
        bus
    }

    // Counts up in $10 and rotates A; enough state churn to diverge quickly.
    const PROGRAM: &[u8] = &[
        0xA9, 0x01, // LDA #$01
        0xE6, 0x10, // INC $10
        0x2A, // ROL A
        0x69, 0x37, // ADC #$37
        0xAA, // TAX
        0x4C, 0x02, 0x80, // JMP $8002
    ];

    fn trace(cpu: &mut Cpu, bus: &mut Bus, steps: usize) -> Vec<(crate::cpu::Registers, u32)> {
        (0..steps)
            .map(|_| {
                let cycles = cpu.step(bus).unwrap();
                (cpu.inspect(), cycles)
            })
            .collect()
    }

    #[test]
    fn bincode_layout_is_fixed_width() {
        let mut bus = bus_with_program(PROGRAM);
        let cpu = Cpu::boot(CpuConfig::default(), &mut bus);
        let bytes = cpu.snapshot().to_bytes().unwrap();
        // version(4) a/x/y/sp(4) pc(2) status(1) latches(3) state(4) pending(4) clock(8+4+8)
        assert_eq!(bytes.len(), 42);
        assert_eq!(&bytes[0..4], &[1, 0, 0, 0]);
        assert_eq!(&bytes[8..10], &[0x00, 0x80]);
    }

    #[test]
    fn restored_snapshot_reproduces_trace() {
        let mut bus = bus_with_program(PROGRAM);
        let mut cpu = Cpu::boot(CpuConfig::default(), &mut bus);
        trace(&mut cpu, &mut bus, 5);
        cpu.request_irq();

        let bytes = cpu.snapshot().to_bytes().unwrap();
        let ram_before: Vec<u8> = (0..0x200u16).map(|a| bus.read_u8(a)).collect();

        let expected = trace(&mut cpu, &mut bus, 40);

        let mut bus2 = bus_with_program(PROGRAM);
        bus2.load(0x0000, &ram_before);
        let mut restored = Cpu::new(CpuConfig::default());
        restored.restore(&CpuSnapshot::from_bytes(&bytes).unwrap());
        let actual = trace(&mut restored, &mut bus2, 40);

        assert_eq!(expected, actual);
        assert_eq!(cpu.cycles(), restored.cycles());
    }

    #[test]
    fn json_round_trip_keeps_latches() {
        let mut cpu = Cpu::default();
        cpu.request_nmi();
        cpu.a = 0x5A;
        let json = cpu.snapshot().to_json().unwrap();
        let snapshot = CpuSnapshot::from_json(&json).unwrap();
        assert!(snapshot.nmi_pending);
        assert!(!snapshot.irq_pending);
        assert_eq!(snapshot.a, 0x5A);
    }

    #[test]
    fn newer_version_is_rejected() {
        let mut snapshot = Cpu::default().snapshot();
        snapshot.version = CpuSnapshot::CURRENT_VERSION + 1;
        let bytes = snapshot.to_bytes().unwrap();
        assert!(matches!(
            CpuSnapshot::from_bytes(&bytes),
            Err(SnapshotError::Version { .. })
        ));
    }
}
