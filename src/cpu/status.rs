use bitflags::bitflags;

bitflags! {
    /// Processor status register.
    ///
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// N V 1 B D I Z C
    /// ```
    ///
    /// BREAK does not exist as a latch inside the CPU; it only appears in
    /// the byte pushed by PHP/BRK. UNUSED always reads back as 1.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusFlags: u8 {
        const CARRY = 0b00000001;
        const ZERO = 0b00000010;
        const INTERRUPT_DISABLE = 0b00000100;
        const DECIMAL = 0b00001000;
        const BREAK = 0b00010000;
        const UNUSED = 0b00100000;
        const OVERFLOW = 0b01000000;
        const NEGATIVE = 0b10000000;
    }
}

impl StatusFlags {
    /// Power-on value: interrupts disabled, unused bit set (0x24).
    pub const POWER_ON: StatusFlags =
        StatusFlags::INTERRUPT_DISABLE.union(StatusFlags::UNUSED);

    /// Unpack a byte pulled from the stack or loaded from a snapshot.
    pub fn from_byte(value: u8) -> Self {
        (StatusFlags::from_bits_retain(value) - StatusFlags::BREAK) | StatusFlags::UNUSED
    }

    pub fn to_byte(self) -> u8 {
        ((self - StatusFlags::BREAK) | StatusFlags::UNUSED).bits()
    }

    /// Byte pushed to the stack. `brk` is set for PHP/BRK and clear for
    /// hardware interrupts.
    pub fn pushed(self, brk: bool) -> u8 {
        let mut value = self.to_byte();
        if brk {
            value |= StatusFlags::BREAK.bits();
        }
        value
    }

    pub fn carry(self) -> bool {
        self.contains(StatusFlags::CARRY)
    }

    pub fn zero(self) -> bool {
        self.contains(StatusFlags::ZERO)
    }

    pub fn interrupt_disable(self) -> bool {
        self.contains(StatusFlags::INTERRUPT_DISABLE)
    }

    pub fn decimal(self) -> bool {
        self.contains(StatusFlags::DECIMAL)
    }

    pub fn overflow(self) -> bool {
        self.contains(StatusFlags::OVERFLOW)
    }

    pub fn negative(self) -> bool {
        self.contains(StatusFlags::NEGATIVE)
    }

    pub fn set_carry(&mut self, on: bool) {
        self.set(StatusFlags::CARRY, on);
    }

    pub fn set_zero(&mut self, on: bool) {
        self.set(StatusFlags::ZERO, on);
    }

    pub fn set_interrupt_disable(&mut self, on: bool) {
        self.set(StatusFlags::INTERRUPT_DISABLE, on);
    }

    pub fn set_decimal(&mut self, on: bool) {
        self.set(StatusFlags::DECIMAL, on);
    }

    pub fn set_overflow(&mut self, on: bool) {
        self.set(StatusFlags::OVERFLOW, on);
    }

    pub fn set_negative(&mut self, on: bool) {
        self.set(StatusFlags::NEGATIVE, on);
    }

    /// Z from `result == 0`, N from bit 7.
    pub fn set_zn(&mut self, result: u8) {
        self.set(StatusFlags::ZERO, result == 0);
        self.set(StatusFlags::NEGATIVE, result & 0x80 != 0);
    }
}

impl Default for StatusFlags {
    fn default() -> Self {
        StatusFlags::POWER_ON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_on_byte() {
        assert_eq!(StatusFlags::POWER_ON.to_byte(), 0x24);
    }

    #[test]
    fn from_byte_drops_break_and_forces_unused() {
        let flags = StatusFlags::from_byte(0xDF & !0x20);
        assert!(!flags.contains(StatusFlags::BREAK));
        assert!(flags.contains(StatusFlags::UNUSED));
        assert!(flags.negative() && flags.overflow() && flags.decimal());
        assert!(flags.interrupt_disable() && flags.zero() && flags.carry());
        assert_eq!(flags.to_byte(), 0xEF);
    }

    #[test]
    fn pushed_byte_always_has_unused_bit() {
        let flags = StatusFlags::from_bits_retain(0);
        assert_eq!(flags.pushed(false), 0x20);
        assert_eq!(flags.pushed(true), 0x30);
    }

    #[test]
    fn bit_positions_are_fixed() {
        let mut flags = StatusFlags::from_byte(0);
        flags.set_carry(true);
        assert_eq!(flags.to_byte(), 0x21);
        flags.set_zero(true);
        flags.set_interrupt_disable(true);
        flags.set_decimal(true);
        flags.set_overflow(true);
        flags.set_negative(true);
        assert_eq!(flags.to_byte(), 0xEF);
    }

    #[test]
    fn set_zn_follows_result() {
        let mut flags = StatusFlags::default();
        flags.set_zn(0);
        assert!(flags.zero() && !flags.negative());
        flags.set_zn(0x80);
        assert!(!flags.zero() && flags.negative());
        flags.set_zn(0x7F);
        assert!(!flags.zero() && !flags.negative());
    }
}
