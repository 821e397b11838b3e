//! NMOS 6502 CPU core and address-decoded bus for the JazzNess emulator.
//!
//! The host owns a [`Bus`], maps its devices onto it, and drives a [`Cpu`]
//! one [`Cpu::step`] (or [`Cpu::tick`]) at a time, feeding the returned
//! cycle counts to its own peripherals.

pub mod bus;
pub mod clock;
pub mod config;
pub mod cpu;
pub mod cpu_bus;
pub mod debugger;
pub mod error;
pub mod memory;
pub mod save_state;
pub mod trace;

pub use bus::{Bus, BusConfig, BusEvent, Device, OpenBus, WatchType};
pub use clock::{Clock, CycleBudget};
pub use config::RunnerConfig;
pub use cpu::{Cpu, CpuConfig, ExecState, Interrupt, Registers, StatusFlags};
pub use cpu_bus::CpuBus;
pub use debugger::{DebugStep, DebugStop, Debugger};
pub use error::{BusError, CpuError, SnapshotError};
pub use memory::{Ram, Rom};
pub use save_state::CpuSnapshot;
