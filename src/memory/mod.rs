use crate::bus::Device;

/// Plain RAM. Offsets beyond the backing size mirror, so a 2 KiB block
/// mapped over $0000-$1FFF repeats four times.
pub struct Ram {
    data: Vec<u8>,
    mask: usize,
}

impl Ram {
    /// `size` is rounded up to a power of two.
    pub fn new(size: usize) -> Self {
        let size = size.max(1).next_power_of_two();
        Ram {
            data: vec![0; size],
            mask: size - 1,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }
}

impl Device for Ram {
    fn read(&mut self, offset: u16) -> u8 {
        self.data[offset as usize & self.mask]
    }

    fn write(&mut self, offset: u16, value: u8) {
        self.data[offset as usize & self.mask] = value;
    }

    fn peek(&self, offset: u16) -> Option<u8> {
        Some(self.data[offset as usize & self.mask])
    }

    fn name(&self) -> &'static str {
        "ram"
    }
}

/// Read-only image. An image shorter than its mapped range mirrors, the
/// way a 16 KiB program repeats across $8000-$FFFF.
pub struct Rom {
    data: Vec<u8>,
}

impl Rom {
    pub fn new(data: Vec<u8>) -> Self {
        Rom { data }
    }

    fn index(&self, offset: u16) -> Option<usize> {
        if self.data.is_empty() {
            None
        } else {
            Some(offset as usize % self.data.len())
        }
    }
}

impl Device for Rom {
    fn read(&mut self, offset: u16) -> u8 {
        self.index(offset).map_or(0, |i| self.data[i])
    }

    fn write(&mut self, offset: u16, value: u8) {
        log::debug!("rom: ignored write +{:04X} <- {:02X}", offset, value);
    }

    fn peek(&self, offset: u16) -> Option<u8> {
        Some(self.index(offset).map_or(0, |i| self.data[i]))
    }

    fn name(&self) -> &'static str {
        "rom"
    }
}
