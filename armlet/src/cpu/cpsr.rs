use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::alu_instruction::ArithmeticOpResult;
use crate::cpu::condition::Condition;

/// Current Program Status Register.
///
/// Only the four condition flags in the top nibble are interpreted by the
/// engine; the remaining bits are carried around untouched so a host can
/// store whatever it likes in them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cpsr(u32);

impl Cpsr {
    pub(crate) fn can_execute(self, cond: Condition) -> bool {
        use Condition::*;
        match cond {
            EQ => self.zero_flag(),
            NE => !self.zero_flag(),
            CS => self.carry_flag(),
            CC => !self.carry_flag(),
            MI => self.sign_flag(),
            PL => !self.sign_flag(),
            VS => self.overflow_flag(),
            VC => !self.overflow_flag(),
            HI => self.carry_flag() && !self.zero_flag(),
            LS => !self.carry_flag() || self.zero_flag(),
            GE => self.sign_flag() == self.overflow_flag(),
            LT => self.sign_flag() != self.overflow_flag(),
            GT => !self.zero_flag() && (self.sign_flag() == self.overflow_flag()),
            LE => self.zero_flag() || (self.sign_flag() != self.overflow_flag()),
            // The reserved encoding executes unconditionally, like AL.
            AL | NV => true,
        }
    }

    /// N => Bit 31, set when the result is negative.
    pub fn sign_flag(self) -> bool {
        self.0.get_bit(31)
    }

    /// Z => Bit 30, set when the result is zero.
    pub fn zero_flag(self) -> bool {
        self.0.get_bit(30)
    }

    /// C => Bit 29, carry out of the last arithmetic operation.
    pub fn carry_flag(self) -> bool {
        self.0.get_bit(29)
    }

    /// V => Bit 28, signed overflow. Never written by the executors.
    pub fn overflow_flag(self) -> bool {
        self.0.get_bit(28)
    }

    pub fn set_sign_flag(&mut self, value: bool) {
        self.0.set_bit(31, value);
    }

    pub fn set_zero_flag(&mut self, value: bool) {
        self.0.set_bit(30, value);
    }

    pub fn set_carry_flag(&mut self, value: bool) {
        self.0.set_bit(29, value);
    }

    pub fn set_overflow_flag(&mut self, value: bool) {
        self.0.set_bit(28, value);
    }

    /// Commits the N, Z and C results of an arithmetic operation. V is left
    /// alone: this core does not compute signed overflow.
    pub(crate) fn set_arithmetic_flags(&mut self, op_result: ArithmeticOpResult) {
        self.set_sign_flag(op_result.sign);
        self.set_zero_flag(op_result.zero);
        self.set_carry_flag(op_result.carry);
    }

    /// Commits N and Z for a logical operation. C and V are left alone.
    pub(crate) fn set_logical_flags(&mut self, result: u32) {
        self.set_sign_flag(result.get_bit(31));
        self.set_zero_flag(result == 0);
    }
}

impl From<u32> for Cpsr {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Cpsr> for u32 {
    fn from(cpsr: Cpsr) -> Self {
        cpsr.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_sign_flag() {
        let mut cpsr = Cpsr::default();
        cpsr.set_sign_flag(true);
        assert!(cpsr.sign_flag());
        assert_eq!(u32::from(cpsr), 1 << 31);
    }

    #[test]
    fn check_zero_flag() {
        let mut cpsr = Cpsr::default();
        cpsr.set_zero_flag(true);
        assert!(cpsr.zero_flag());
        assert_eq!(u32::from(cpsr), 1 << 30);
    }

    #[test]
    fn check_carry_flag() {
        let mut cpsr = Cpsr::default();
        cpsr.set_carry_flag(true);
        assert!(cpsr.carry_flag());
        assert_eq!(u32::from(cpsr), 1 << 29);
    }

    #[test]
    fn check_overflow_flag() {
        let cpsr = Cpsr::from(0b0001_0000_0000_0000_0000_0000_0000_0000_u32);
        assert!(cpsr.overflow_flag());
    }

    #[test]
    fn low_bits_survive_flag_updates() {
        let mut cpsr = Cpsr::from(0x0FFF_FFFF_u32);
        cpsr.set_arithmetic_flags(ArithmeticOpResult::new(0, false));
        cpsr.set_logical_flags(1);

        assert_eq!(u32::from(cpsr) & 0x0FFF_FFFF, 0x0FFF_FFFF);
    }

    #[test]
    fn condition_table() {
        use Condition::*;

        let mut cpsr = Cpsr::default();
        assert!(cpsr.can_execute(NE));
        assert!(!cpsr.can_execute(EQ));
        assert!(cpsr.can_execute(CC));
        assert!(cpsr.can_execute(PL));
        assert!(cpsr.can_execute(VC));
        assert!(!cpsr.can_execute(HI));
        assert!(cpsr.can_execute(LS));
        assert!(cpsr.can_execute(GE));
        assert!(cpsr.can_execute(GT));
        assert!(!cpsr.can_execute(LT));
        assert!(cpsr.can_execute(AL));
        assert!(cpsr.can_execute(NV));

        cpsr.set_zero_flag(true);
        assert!(cpsr.can_execute(EQ));
        assert!(cpsr.can_execute(LE));
        assert!(!cpsr.can_execute(GT));

        cpsr.set_carry_flag(true);
        assert!(cpsr.can_execute(CS));
        assert!(!cpsr.can_execute(HI));

        cpsr.set_zero_flag(false);
        assert!(cpsr.can_execute(HI));

        cpsr.set_sign_flag(true);
        assert!(cpsr.can_execute(MI));
        assert!(cpsr.can_execute(LT));
        assert!(!cpsr.can_execute(GE));

        cpsr.set_overflow_flag(true);
        assert!(cpsr.can_execute(VS));
        assert!(cpsr.can_execute(GE));
    }
}
