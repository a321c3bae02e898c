use crate::cpu::engine::{ArmEngine, SIZE_OF_ARM_INSTRUCTION};
use crate::cpu::registers::REG_LR;

impl ArmEngine {
    /// Branches relative to the current PC. The target is computed against
    /// `PC + 8` because PC reads two instructions ahead of the executing
    /// instruction in ARM state; the link register receives the address of
    /// the following instruction.
    pub(crate) fn branch(&mut self, link: bool, offset: i32) {
        let pc = self.registers.program_counter();

        if link {
            self.registers
                .set_register_at(REG_LR, pc.wrapping_add(SIZE_OF_ARM_INSTRUCTION));
        }

        let target = pc
            .wrapping_add(2 * SIZE_OF_ARM_INSTRUCTION)
            .wrapping_add(offset as u32);
        self.registers.set_program_counter(target);
    }
}
