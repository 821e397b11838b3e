use std::ops::RangeInclusive;

use thiserror::Error;

/// Errors surfaced by [`crate::cpu::Cpu::step`] and friends.
///
/// Every documented opcode executes to completion; only the gaps in the
/// opcode table and stepping a stopped CPU produce an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("undecodable opcode 0x{opcode:02X} at ${pc:04X}")]
    Decode { opcode: u8, pc: u16 },
    #[error("cpu is halted at ${pc:04X}")]
    Halted { pc: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("range ${:04X}-${:04X} overlaps existing mapping '{existing}'", .range.start(), .range.end())]
    Overlap {
        range: RangeInclusive<u16>,
        existing: String,
    },
    #[error("empty range ${start:04X}-${end:04X}")]
    EmptyRange { start: u16, end: u16 },
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] bincode::Error),
    #[error("snapshot json failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot version {found} is not supported (current: {current})")]
    Version { found: u32, current: u32 },
}
