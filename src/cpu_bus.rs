//! Trait representing the minimal bus interface required by the 6502 core.

pub trait CpuBus {
    fn read_u8(&mut self, addr: u16) -> u8;
    fn write_u8(&mut self, addr: u16, value: u8);

    /// Little-endian word: low byte first, then the byte at `addr + 1`.
    fn read_u16(&mut self, addr: u16) -> u16 {
        let lo = self.read_u8(addr) as u16;
        let hi = self.read_u8(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Word read whose high byte never leaves the page of `addr`.
    /// Zero-page pointers and `JMP ($xxFF)` go through this.
    fn read_u16_wrapped(&mut self, addr: u16) -> u16 {
        let hi_addr = (addr & 0xFF00) | (addr.wrapping_add(1) & 0x00FF);
        let lo = self.read_u8(addr) as u16;
        let hi = self.read_u8(hi_addr) as u16;
        (hi << 8) | lo
    }

    /// Side-effect free read for tracing and disassembly.
    /// Buses that cannot guarantee this return `None`.
    fn peek_u8(&self, _addr: u16) -> Option<u8> {
        None
    }
}
