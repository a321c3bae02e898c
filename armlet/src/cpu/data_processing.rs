use crate::cpu::alu_instruction::{shift, AluInstruction, ArithmeticOpResult, ShiftKind};
use crate::cpu::engine::ArmEngine;

/// Shift amount of a register-form second operand: either a 5-bit immediate
/// or the low byte of Rs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShiftOperator {
    Immediate(u32),
    Register(u32),
}

impl std::fmt::Display for ShiftOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Immediate(value) => write!(f, "#{value}"),
            Self::Register(register) => write!(f, "R{register}"),
        }
    }
}

/// Second operand of a data-processing instruction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AluSecondOperandInfo {
    Register {
        register: u32,
        shift_kind: ShiftKind,
        shift_op: ShiftOperator,
    },
    Immediate {
        base: u32,
        rotate: u32,
    },
}

impl std::fmt::Display for AluSecondOperandInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Register {
                register,
                shift_kind,
                shift_op,
            } => {
                if shift_op == ShiftOperator::Immediate(0) {
                    return write!(f, "R{register}");
                }

                write!(f, "R{register}, {shift_kind} {shift_op}")
            }
            Self::Immediate { base, rotate } => {
                write!(f, "#{}", base.rotate_right(rotate * 2))
            }
        }
    }
}

impl ArmEngine {
    pub(crate) fn data_processing(
        &mut self,
        alu_instruction: AluInstruction,
        set_conditions: bool,
        rn: u32,
        destination: u32,
        op2: AluSecondOperandInfo,
    ) {
        let op1 = self.registers.register_at(rn as usize);
        let op2 = self.operand_value(op2);

        use AluInstruction::*;
        match alu_instruction {
            And => self.and(destination, op1, op2, set_conditions),
            Eor => self.eor(destination, op1, op2, set_conditions),
            Sub => self.sub(destination, op1, op2, set_conditions),
            Rsb => self.rsb(destination, op1, op2, set_conditions),
            Add => self.add(destination, op1, op2, set_conditions),
            Adc => self.adc(destination, op1, op2, set_conditions),
            Sbc => self.sbc(destination, op1, op2, set_conditions),
            Rsc => self.rsc(destination, op1, op2, set_conditions),
            Tst => self.tst(op1, op2),
            Teq => self.teq(op1, op2),
            Cmp => self.cmp(op1, op2),
            Cmn => self.cmn(op1, op2),
            Orr => self.orr(destination, op1, op2, set_conditions),
            Mov => self.mov(destination, op2, set_conditions),
            Bic => self.bic(destination, op1, op2, set_conditions),
            Mvn => self.mvn(destination, op2, set_conditions),
        }
    }

    /// Materializes the second operand: a rotated 8-bit immediate, or a
    /// register run through the barrel shifter. A register-held shift amount
    /// is taken from the low byte of Rs.
    fn operand_value(&self, op2: AluSecondOperandInfo) -> u32 {
        match op2 {
            AluSecondOperandInfo::Immediate { base, rotate } => base.rotate_right(rotate * 2),
            AluSecondOperandInfo::Register {
                register,
                shift_kind,
                shift_op,
            } => {
                let rm = self.registers.register_at(register as usize);
                let amount = match shift_op {
                    ShiftOperator::Immediate(amount) => amount,
                    ShiftOperator::Register(rs) => self.registers.register_at(rs as usize) & 0xFF,
                };

                shift(shift_kind, amount, rm)
            }
        }
    }

    fn write_alu_result(&mut self, rd: u32, result: u32) {
        // Index 15 is the PC itself, so writing it is the PC redirect.
        self.registers.set_register_at(rd as usize, result);
    }

    fn and(&mut self, rd: u32, op1: u32, op2: u32, s: bool) {
        let result = op1 & op2;
        self.write_alu_result(rd, result);
        if s {
            self.cpsr.set_logical_flags(result);
        }
    }

    fn eor(&mut self, rd: u32, op1: u32, op2: u32, s: bool) {
        let result = op1 ^ op2;
        self.write_alu_result(rd, result);
        if s {
            self.cpsr.set_logical_flags(result);
        }
    }

    fn sub(&mut self, rd: u32, op1: u32, op2: u32, s: bool) {
        let op_result = ArithmeticOpResult::sub(op1, op2);
        self.write_alu_result(rd, op_result.result);
        if s {
            self.cpsr.set_arithmetic_flags(op_result);
        }
    }

    fn rsb(&mut self, rd: u32, op1: u32, op2: u32, s: bool) {
        self.sub(rd, op2, op1, s);
    }

    fn add(&mut self, rd: u32, op1: u32, op2: u32, s: bool) {
        let op_result = ArithmeticOpResult::add(op1, op2);
        self.write_alu_result(rd, op_result.result);
        if s {
            self.cpsr.set_arithmetic_flags(op_result);
        }
    }

    fn adc(&mut self, rd: u32, op1: u32, op2: u32, s: bool) {
        let carry_in = u32::from(self.cpsr.carry_flag());
        let op_result = ArithmeticOpResult::adc(op1, op2, carry_in);
        self.write_alu_result(rd, op_result.result);
        if s {
            self.cpsr.set_arithmetic_flags(op_result);
        }
    }

    fn sbc(&mut self, rd: u32, op1: u32, op2: u32, s: bool) {
        let carry_in = u32::from(self.cpsr.carry_flag());
        let op_result = ArithmeticOpResult::sbc(op1, op2, carry_in);
        self.write_alu_result(rd, op_result.result);
        if s {
            self.cpsr.set_arithmetic_flags(op_result);
        }
    }

    fn rsc(&mut self, rd: u32, op1: u32, op2: u32, s: bool) {
        self.sbc(rd, op2, op1, s);
    }

    fn tst(&mut self, op1: u32, op2: u32) {
        self.cpsr.set_logical_flags(op1 & op2);
    }

    fn teq(&mut self, op1: u32, op2: u32) {
        self.cpsr.set_logical_flags(op1 ^ op2);
    }

    fn cmp(&mut self, op1: u32, op2: u32) {
        self.cpsr
            .set_arithmetic_flags(ArithmeticOpResult::sub(op1, op2));
    }

    fn cmn(&mut self, op1: u32, op2: u32) {
        self.cpsr
            .set_arithmetic_flags(ArithmeticOpResult::add(op1, op2));
    }

    fn orr(&mut self, rd: u32, op1: u32, op2: u32, s: bool) {
        let result = op1 | op2;
        self.write_alu_result(rd, result);
        if s {
            self.cpsr.set_logical_flags(result);
        }
    }

    fn mov(&mut self, rd: u32, op2: u32, s: bool) {
        self.write_alu_result(rd, op2);
        if s {
            self.cpsr.set_logical_flags(op2);
        }
    }

    fn bic(&mut self, rd: u32, op1: u32, op2: u32, s: bool) {
        let result = op1 & !op2;
        self.write_alu_result(rd, result);
        if s {
            self.cpsr.set_logical_flags(result);
        }
    }

    fn mvn(&mut self, rd: u32, op2: u32, s: bool) {
        let result = !op2;
        self.write_alu_result(rd, result);
        if s {
            self.cpsr.set_logical_flags(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::cpu::engine::ArmEngine;
    use pretty_assertions::assert_eq;

    fn engine() -> ArmEngine {
        let mut engine = ArmEngine::new();
        engine.init(0x1000).unwrap();
        engine
    }

    #[test]
    fn mov_immediate() {
        let mut engine = engine();
        engine.execute_instruction(0xE3A0100F).unwrap();

        assert_eq!(engine.register(1), 15);
        assert_eq!(engine.instruction_count(), 1);
    }

    #[test]
    fn mov_rotated_immediate() {
        // MOV R0, #0xFF000000 (0xFF rotated right by 8).
        let mut engine = engine();
        engine.execute_instruction(0xE3A004FF).unwrap();

        assert_eq!(engine.register(0), 0xFF00_0000);
    }

    #[test]
    fn add_register() {
        let mut engine = engine();
        engine.set_register(2, 10);
        engine.set_register(3, 32);
        engine.execute_instruction(0xE0824003).unwrap();

        assert_eq!(engine.register(4), 42);
    }

    #[test]
    fn add_with_shifted_operand() {
        // ADD R4, R2, R3, LSL #4
        let mut engine = engine();
        engine.set_register(2, 1);
        engine.set_register(3, 2);
        engine.execute_instruction(0xE0824203).unwrap();

        assert_eq!(engine.register(4), 1 + (2 << 4));
    }

    #[test]
    fn add_with_register_held_shift_amount() {
        // ADD R4, R2, R3, LSR R5; only the low byte of R5 counts.
        let mut engine = engine();
        engine.set_register(2, 0);
        engine.set_register(3, 0xF0);
        engine.set_register(5, 0x0000_0104);
        engine.execute_instruction(0xE0824533).unwrap();

        assert_eq!(engine.register(4), 0x0F);
    }

    #[test]
    fn adds_sets_flags_on_wraparound() {
        // ADDS R0, R1, R2
        let mut engine = engine();
        engine.set_register(1, u32::MAX);
        engine.set_register(2, 1);
        engine.execute_instruction(0xE0910002).unwrap();

        assert_eq!(engine.register(0), 0);
        assert!(engine.cpsr.zero_flag());
        assert!(engine.cpsr.carry_flag());
        assert!(!engine.cpsr.sign_flag());
    }

    #[test]
    fn add_without_s_leaves_flags_alone() {
        let mut engine = engine();
        engine.set_register(1, u32::MAX);
        engine.set_register(2, 1);
        engine.execute_instruction(0xE0810002).unwrap();

        assert_eq!(engine.register(0), 0);
        assert!(!engine.cpsr.zero_flag());
        assert!(!engine.cpsr.carry_flag());
    }

    #[test]
    fn subs_carry_reports_no_borrow() {
        // SUBS R0, R1, R2
        let mut engine = engine();
        engine.set_register(1, 5);
        engine.set_register(2, 3);
        engine.execute_instruction(0xE0510002).unwrap();

        assert_eq!(engine.register(0), 2);
        assert!(engine.cpsr.carry_flag());

        engine.set_register(1, 3);
        engine.set_register(2, 5);
        engine.execute_instruction(0xE0510002).unwrap();

        assert_eq!(engine.register(0), u32::MAX - 1);
        assert!(!engine.cpsr.carry_flag());
        assert!(engine.cpsr.sign_flag());
    }

    #[test]
    fn adc_folds_carry_in() {
        // ADC R0, R1, R2 with C set.
        let mut engine = engine();
        engine.cpsr.set_carry_flag(true);
        engine.set_register(1, 1);
        engine.set_register(2, 2);
        engine.execute_instruction(0xE0A10002).unwrap();

        assert_eq!(engine.register(0), 4);
    }

    #[test]
    fn sbc_subtracts_the_borrow() {
        // SBC R0, R1, R2 with C clear: 10 - 3 - 1.
        let mut engine = engine();
        engine.set_register(1, 10);
        engine.set_register(2, 3);
        engine.execute_instruction(0xE0C10002).unwrap();

        assert_eq!(engine.register(0), 6);

        // With C set the borrow disappears.
        engine.cpsr.set_carry_flag(true);
        engine.execute_instruction(0xE0C10002).unwrap();
        assert_eq!(engine.register(0), 7);
    }

    #[test]
    fn cmp_only_touches_flags() {
        // CMP R1, R2
        let mut engine = engine();
        engine.set_register(1, 7);
        engine.set_register(2, 7);
        engine.execute_instruction(0xE1510002).unwrap();

        assert!(engine.cpsr.zero_flag());
        assert!(engine.cpsr.carry_flag());
        // Rd field is 0; R0 must stay untouched.
        assert_eq!(engine.register(0), 0);
    }

    #[test]
    fn tst_never_writes_back() {
        // TST R1, R2 with Rd bits pointing at R3.
        let mut engine = engine();
        engine.set_register(1, 0b1100);
        engine.set_register(2, 0b0100);
        engine.set_register(3, 0xAAAA_AAAA);
        engine.execute_instruction(0xE1113002).unwrap();

        assert_eq!(engine.register(3), 0xAAAA_AAAA);
        assert!(!engine.cpsr.zero_flag());
    }

    #[test]
    fn logical_ops_preserve_the_carry() {
        let mut engine = engine();
        engine.cpsr.set_carry_flag(true);
        engine.set_register(1, 0);
        engine.set_register(2, 0);
        // ANDS R0, R1, R2: result zero, but C stays set.
        engine.execute_instruction(0xE0110002).unwrap();

        assert!(engine.cpsr.zero_flag());
        assert!(engine.cpsr.carry_flag());
    }

    #[test]
    fn flag_updates_leave_the_overflow_bit_alone() {
        let mut engine = engine();
        engine.cpsr.set_overflow_flag(true);
        engine.set_register(1, 3);
        engine.set_register(2, 5);
        // SUBS R0, R1, R2 wraps; V must survive untouched.
        engine.execute_instruction(0xE0510002).unwrap();

        assert!(engine.cpsr.overflow_flag());
    }

    #[test]
    fn bic_and_mvn() {
        let mut engine = engine();
        engine.set_register(1, 0b1111);
        engine.set_register(2, 0b0101);
        // BIC R0, R1, R2
        engine.execute_instruction(0xE1C10002).unwrap();
        assert_eq!(engine.register(0), 0b1010);

        // MVN R0, R2
        engine.execute_instruction(0xE1E00002).unwrap();
        assert_eq!(engine.register(0), !0b0101);
    }

    #[test]
    fn mov_to_r15_updates_the_pc() {
        // MOV R15, #0xC1
        let mut engine = engine();
        engine.execute_instruction(0xE3A0F0C1).unwrap();

        assert_eq!(engine.pc(), engine.register(15));
        assert_eq!(engine.pc(), 0xC1);
    }
}
