use crate::cpu::engine::ArmEngine;
use crate::cpu::flags::{Indexing, Offsetting, ReadWriteKind};
use crate::error::ExecutionError;

/// Direction of a single data transfer.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SingleDataTransferKind {
    /// Load from memory into a register.
    Ldr,

    /// Store from a register into memory.
    Str,
}

impl From<bool> for SingleDataTransferKind {
    fn from(load: bool) -> Self {
        match load {
            false => Self::Str,
            true => Self::Ldr,
        }
    }
}

impl std::fmt::Display for SingleDataTransferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ldr => f.write_str("LDR"),
            Self::Str => f.write_str("STR"),
        }
    }
}

/// Offset applied to the base register: a 12-bit immediate or the plain
/// value of Rm. Shifted register offsets are not modeled by this core.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SingleDataTransferOffsetInfo {
    Immediate { offset: u32 },
    Register { register: u32 },
}

impl std::fmt::Display for SingleDataTransferOffsetInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Immediate { offset } => write!(f, "#{offset}"),
            Self::Register { register } => write!(f, "R{register}"),
        }
    }
}

impl ArmEngine {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn single_data_transfer(
        &mut self,
        kind: SingleDataTransferKind,
        quantity: ReadWriteKind,
        indexing: Indexing,
        offsetting: Offsetting,
        rd: u32,
        base_register: u32,
        offset_info: SingleDataTransferOffsetInfo,
    ) -> Result<(), ExecutionError> {
        let base = self.registers.register_at(base_register as usize);

        let amount = match offset_info {
            SingleDataTransferOffsetInfo::Immediate { offset } => offset,
            SingleDataTransferOffsetInfo::Register { register } => {
                self.registers.register_at(register as usize)
            }
        };

        let offset_base = match offsetting {
            Offsetting::Down => base.wrapping_sub(amount),
            Offsetting::Up => base.wrapping_add(amount),
        };

        let address = match indexing {
            Indexing::Pre => offset_base,
            Indexing::Post => base,
        };

        let memory = self.memory.as_mut().ok_or(ExecutionError::Uninitialized)?;

        // The access is bounds-checked before anything is committed, so a
        // fault leaves registers and memory untouched.
        match kind {
            SingleDataTransferKind::Ldr => {
                let value = match quantity {
                    ReadWriteKind::Byte => memory.read_byte(address)?.into(),
                    ReadWriteKind::Word => memory.read_word(address)?,
                };
                self.registers.set_register_at(rd as usize, value);
            }
            SingleDataTransferKind::Str => {
                let value = self.registers.register_at(rd as usize);
                match quantity {
                    ReadWriteKind::Byte => memory.write_byte(address, value as u8)?,
                    ReadWriteKind::Word => memory.write_word(address, value)?,
                }
            }
        }

        // Post-indexing folds the offset into the base register once the
        // access has succeeded.
        if indexing == Indexing::Post {
            self.registers
                .set_register_at(base_register as usize, offset_base);
        }

        Ok(())
    }
}
