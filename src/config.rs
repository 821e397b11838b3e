//! Runtime switches read from the environment.
//!
//! The library itself never reads the environment; only the runner calls
//! [`RunnerConfig::from_env`] and hands the pieces to `Bus` and `Cpu`.

use crate::bus::{BusConfig, OpenBus};
use crate::cpu::CpuConfig;

fn parse_flag(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "on" | "ON")
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| parse_flag(&v))
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| parse_u64(&v))
        .unwrap_or(default)
}

/// Accepts decimal, `0x`-prefixed hex and `$`-prefixed hex.
pub fn parse_u64(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix('$')) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        s.parse::<u64>().ok()
    }
}

pub fn parse_u16(s: &str) -> Option<u16> {
    parse_u64(s).and_then(|v| u16::try_from(v).ok())
}

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Emit a trace line per instruction (TRACE).
    pub trace: bool,
    pub report_unmapped: bool,
    pub open_bus_last: bool,
    pub decimal_mode: bool,
    pub max_steps: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            trace: false,
            report_unmapped: false,
            open_bus_last: false,
            decimal_mode: false,
            max_steps: 1_000_000,
        }
    }
}

impl RunnerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            trace: env_flag("TRACE", defaults.trace),
            report_unmapped: env_flag("REPORT_UNMAPPED", defaults.report_unmapped),
            open_bus_last: env_flag("OPEN_BUS_LAST", defaults.open_bus_last),
            decimal_mode: env_flag("DECIMAL_MODE", defaults.decimal_mode),
            max_steps: env_u64("MAX_STEPS", defaults.max_steps),
        }
    }

    pub fn bus_config(&self) -> BusConfig {
        BusConfig {
            open_bus: if self.open_bus_last {
                OpenBus::LastValue
            } else {
                OpenBus::Zero
            },
            report_unmapped: self.report_unmapped,
            ..BusConfig::default()
        }
    }

    pub fn cpu_config(&self) -> CpuConfig {
        CpuConfig {
            decimal_mode: self.decimal_mode,
        }
    }
}
