//! Address-decoded system bus.
//!
//! The bus routes each 16-bit address to at most one mapped [`Device`].
//! Mappings never overlap: [`Bus::map`] refuses a range that intersects an
//! existing one, so a lookup has exactly one possible answer.
//!
//! Unmapped writes are dropped. Unmapped reads return the floating value
//! selected by [`OpenBus`]. Neither is an error; with
//! [`BusConfig::report_unmapped`] set they are recorded as [`BusEvent`]s.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::ops::RangeInclusive;
use std::rc::Rc;

use crate::cpu_bus::CpuBus;
use crate::error::BusError;


/// A peripheral or memory block that answers for a mapped address range.
///
/// `offset` is relative to the first address of the mapped range.
pub trait Device {
    fn read(&mut self, offset: u16) -> u8;
    fn write(&mut self, offset: u16, value: u8);

    /// Read without side effects. Devices whose reads have effects
    /// (clear-on-read status registers and similar) should still answer
    /// with the value a read would return, or `None` if that is unknowable.
    fn peek(&self, _offset: u16) -> Option<u8> {
        None
    }

    fn name(&self) -> &'static str {
        "device"
    }
}

// Lets the host keep a handle on a peripheral it has mapped.
impl<D: Device + ?Sized> Device for Rc<RefCell<D>> {
    fn read(&mut self, offset: u16) -> u8 {
        self.borrow_mut().read(offset)
    }

    fn write(&mut self, offset: u16, value: u8) {
        self.borrow_mut().write(offset, value)
    }

    fn peek(&self, offset: u16) -> Option<u8> {
        self.try_borrow().ok()?.peek(offset)
    }

    fn name(&self) -> &'static str {
        self.try_borrow().map(|d| d.name()).unwrap_or("device")
    }
}

/// Value returned by a read that hits no mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenBus {
    #[default]
    Zero,
    /// Whatever was last driven on the data bus (read or written).
    LastValue,
}

#[derive(Debug, Clone)]
pub struct BusConfig {
    pub open_bus: OpenBus,
    pub report_unmapped: bool,
    /// Oldest events are discarded beyond this many.
    pub max_events: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            open_bus: OpenBus::Zero,
            report_unmapped: false,
            max_events: 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchType {
    Read,
    Write,
    ReadWrite,
}

impl WatchType {
    fn on_read(self) -> bool {
        matches!(self, WatchType::Read | WatchType::ReadWrite)
    }

    fn on_write(self) -> bool {
        matches!(self, WatchType::Write | WatchType::ReadWrite)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    UnmappedRead { addr: u16, value: u8 },
    UnmappedWrite { addr: u16, value: u8 },
    WatchRead { addr: u16, value: u8 },
    WatchWrite { addr: u16, value: u8 },
}

struct Mapping {
    range: RangeInclusive<u16>,
    device: Box<dyn Device>,
}

/// Listing entry returned by [`Bus::mappings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingInfo {
    pub range: RangeInclusive<u16>,
    pub name: &'static str,
}

pub struct Bus {
    // Sorted by range start.
    mappings: Vec<Mapping>,
    config: BusConfig,
    data_latch: u8,
    events: VecDeque<BusEvent>,
    watchpoints: HashMap<u16, WatchType>,
}

impl Bus {
    pub fn new(config: BusConfig) -> Self {
        Bus {
            mappings: Vec::new(),
            config,
            data_latch: 0,
            events: VecDeque::new(),
            watchpoints: HashMap::new(),
        }
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Attach `device` to `range`. Fails if the range overlaps a mapping.
    pub fn map<D>(&mut self, range: RangeInclusive<u16>, device: D) -> Result<(), BusError>
    where
        D: Device + 'static,
    {
        if range.is_empty() {
            return Err(BusError::EmptyRange {
                start: *range.start(),
                end: *range.end(),
            });
        }
        if let Some(existing) = self
            .mappings
            .iter()
            .find(|m| m.range.start() <= range.end() && range.start() <= m.range.end())
        {
            return Err(BusError::Overlap {
                range,
                existing: existing.device.name().to_string(),
            });
        }

        log::debug!(
            "bus: mapped '{}' at ${:04X}-${:04X}",
            device.name(),
            range.start(),
            range.end()
        );
        let idx = self
            .mappings
            .partition_point(|m| m.range.start() < range.start());
        self.mappings.insert(
            idx,
            Mapping {
                range,
                device: Box::new(device),
            },
        );
        Ok(())
    }

    /// Detach the mapping starting at `start`, returning its device.
    pub fn unmap(&mut self, start: u16) -> Option<Box<dyn Device>> {
        let idx = self.mappings.iter().position(|m| *m.range.start() == start)?;
        let mapping = self.mappings.remove(idx);
        log::debug!(
            "bus: unmapped '{}' from ${:04X}-${:04X}",
            mapping.device.name(),
            mapping.range.start(),
            mapping.range.end()
        );
        Some(mapping.device)
    }

    pub fn mappings(&self) -> Vec<MappingInfo> {
        self.mappings
            .iter()
            .map(|m| MappingInfo {
                range: m.range.clone(),
                name: m.device.name(),
            })
            .collect()
    }

    pub fn is_mapped(&self, addr: u16) -> bool {
        self.find(addr).is_some()
    }

    /// Write `bytes` starting at `addr` through the normal write path.
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        for (i, &byte) in bytes.iter().enumerate() {
            self.write_u8(addr.wrapping_add(i as u16), byte);
        }
    }

    pub fn add_watchpoint(&mut self, addr: u16, watch_type: WatchType) {
        self.watchpoints.insert(addr, watch_type);
    }

    pub fn remove_watchpoint(&mut self, addr: u16) -> Option<WatchType> {
        self.watchpoints.remove(&addr)
    }

    pub fn take_events(&mut self) -> Vec<BusEvent> {
        self.events.drain(..).collect()
    }

    fn find(&self, addr: u16) -> Option<usize> {
        let idx = self.mappings.partition_point(|m| *m.range.start() <= addr);
        let candidate = idx.checked_sub(1)?;
        self.mappings[candidate]
            .range
            .contains(&addr)
            .then_some(candidate)
    }

    fn floating_value(&self) -> u8 {
        match self.config.open_bus {
            OpenBus::Zero => 0,
            OpenBus::LastValue => self.data_latch,
        }
    }

    fn record(&mut self, event: BusEvent) {
        if self.config.max_events == 0 {
            return;
        }
        if self.events.len() == self.config.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

impl CpuBus for Bus {
    fn read_u8(&mut self, addr: u16) -> u8 {
        let value = match self.find(addr) {
            Some(idx) => {
                let mapping = &mut self.mappings[idx];
                let offset = addr - mapping.range.start();
                mapping.device.read(offset)
            }
            None => {
                let value = self.floating_value();
                if self.config.report_unmapped {
                    log::debug!("bus: unmapped read ${:04X} -> {:02X}", addr, value);
                    self.record(BusEvent::UnmappedRead { addr, value });
                } else {
                    log::trace!("bus: unmapped read ${:04X}", addr);
                }
                value
            }
        };
        self.data_latch = value;

        if self.watchpoints.get(&addr).is_some_and(|w| w.on_read()) {
            log::debug!("bus: watch read ${:04X} -> {:02X}", addr, value);
            self.record(BusEvent::WatchRead { addr, value });
        }
        value
    }

    fn write_u8(&mut self, addr: u16, value: u8) {
        self.data_latch = value;

        if self.watchpoints.get(&addr).is_some_and(|w| w.on_write()) {
            log::debug!("bus: watch write ${:04X} <- {:02X}", addr, value);
            self.record(BusEvent::WatchWrite { addr, value });
        }

        match self.find(addr) {
            Some(idx) => {
                let mapping = &mut self.mappings[idx];
                let offset = addr - mapping.range.start();
                mapping.device.write(offset, value);
            }
            None => {
                if self.config.report_unmapped {
                    log::debug!("bus: unmapped write ${:04X} <- {:02X}", addr, value);
                    self.record(BusEvent::UnmappedWrite { addr, value });
                } else {
                    log::trace!("bus: unmapped write ${:04X}", addr);
                }
            }
        }
    }

    fn peek_u8(&self, addr: u16) -> Option<u8> {
        match self.find(addr) {
            Some(idx) => {
                let mapping = &self.mappings[idx];
                mapping.device.peek(addr - mapping.range.start())
            }
            None => Some(self.floating_value()),
        }
    }
}
