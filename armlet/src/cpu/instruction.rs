use crate::bitwise::Bits;
use crate::cpu::alu_instruction::{AluInstruction, ShiftKind};
use crate::cpu::condition::Condition;
use crate::cpu::data_processing::{AluSecondOperandInfo, ShiftOperator};
use crate::cpu::flags::{Indexing, Offsetting, OperandKind, ReadWriteKind};
use crate::cpu::single_data_transfer::{SingleDataTransferKind, SingleDataTransferOffsetInfo};
use crate::error::ExecutionError;

/// A classified instruction word with every field decoded.
///
/// Classification looks at bits 27:26: `00` is data processing, `01` is a
/// single data transfer, `10` is a branch and `11` has no meaning in this
/// core, so decoding it is the one way [`TryFrom`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmInstruction {
    DataProcessing {
        condition: Condition,
        alu_instruction: AluInstruction,
        set_conditions: bool,
        rn: u32,
        destination: u32,
        op2: AluSecondOperandInfo,
    },
    Branch {
        condition: Condition,
        link: bool,
        offset: i32,
    },
    SingleDataTransfer {
        condition: Condition,
        kind: SingleDataTransferKind,
        quantity: ReadWriteKind,
        indexing: Indexing,
        offsetting: Offsetting,
        rd: u32,
        base_register: u32,
        offset_info: SingleDataTransferOffsetInfo,
    },
}

impl TryFrom<u32> for ArmInstruction {
    type Error = ExecutionError;

    fn try_from(op_code: u32) -> Result<Self, Self::Error> {
        let condition = Condition::from(op_code.get_bits(28..=31) as u8);

        match op_code.get_bits(26..=27) {
            0b00 => {
                let alu_instruction = AluInstruction::from(op_code.get_bits(21..=24));
                let set_conditions = op_code.get_bit(20);
                let rn = op_code.get_bits(16..=19);
                let destination = op_code.get_bits(12..=15);

                let op2 = match OperandKind::from(op_code.get_bit(25)) {
                    OperandKind::Immediate => AluSecondOperandInfo::Immediate {
                        base: op_code.get_bits(0..=7),
                        rotate: op_code.get_bits(8..=11),
                    },
                    OperandKind::Register => {
                        let register = op_code.get_bits(0..=3);
                        let shift_kind = ShiftKind::from(op_code.get_bits(5..=6));
                        // Bit 4 chooses between an immediate shift amount and
                        // the low byte of Rs.
                        let shift_op = if op_code.get_bit(4) {
                            ShiftOperator::Register(op_code.get_bits(8..=11))
                        } else {
                            ShiftOperator::Immediate(op_code.get_bits(7..=11))
                        };

                        AluSecondOperandInfo::Register {
                            register,
                            shift_kind,
                            shift_op,
                        }
                    }
                };

                Ok(Self::DataProcessing {
                    condition,
                    alu_instruction,
                    set_conditions,
                    rn,
                    destination,
                    op2,
                })
            }
            0b01 => {
                let offset_info = if op_code.get_bit(25) {
                    SingleDataTransferOffsetInfo::Register {
                        register: op_code.get_bits(0..=3),
                    }
                } else {
                    SingleDataTransferOffsetInfo::Immediate {
                        offset: op_code.get_bits(0..=11),
                    }
                };

                Ok(Self::SingleDataTransfer {
                    condition,
                    kind: SingleDataTransferKind::from(op_code.get_bit(20)),
                    quantity: ReadWriteKind::from(op_code.get_bit(22)),
                    indexing: Indexing::from(op_code.get_bit(24)),
                    offsetting: Offsetting::from(op_code.get_bit(23)),
                    rd: op_code.get_bits(12..=15),
                    base_register: op_code.get_bits(16..=19),
                    offset_info,
                })
            }
            0b10 => Ok(Self::Branch {
                condition,
                link: op_code.get_bit(24),
                offset: (op_code.get_bits(0..=23) << 2).sign_extended(26) as i32,
            }),
            _ => Err(ExecutionError::IllegalInstruction(op_code)),
        }
    }
}

impl ArmInstruction {
    pub fn disassembler(&self) -> String {
        match self {
            Self::DataProcessing {
                condition,
                alu_instruction,
                set_conditions,
                rn,
                destination,
                op2,
            } => {
                let set_string = if *set_conditions { "S" } else { "" };
                use AluInstruction::*;
                match alu_instruction {
                    Tst | Teq | Cmp | Cmn => {
                        format!("{alu_instruction}{condition} R{rn}, {op2}")
                    }
                    Mov | Mvn => {
                        format!("{alu_instruction}{condition}{set_string} R{destination}, {op2}")
                    }
                    _ => format!(
                        "{alu_instruction}{condition}{set_string} R{destination}, R{rn}, {op2}"
                    ),
                }
            }
            Self::Branch {
                condition,
                link,
                offset,
            } => {
                let link = if *link { "L" } else { "" };
                format!("B{link}{condition} #{offset}")
            }
            Self::SingleDataTransfer {
                condition,
                kind,
                quantity,
                indexing,
                offsetting,
                rd,
                base_register,
                offset_info,
            } => {
                let byte = match quantity {
                    ReadWriteKind::Word => "",
                    ReadWriteKind::Byte => "B",
                };
                let sign = match offsetting {
                    Offsetting::Down => "-",
                    Offsetting::Up => "",
                };
                let address = match indexing {
                    Indexing::Pre => format!("[R{base_register}, {sign}{offset_info}]"),
                    Indexing::Post => format!("[R{base_register}], {sign}{offset_info}"),
                };

                format!("{kind}{condition}{byte} R{rd}, {address}")
            }
        }
    }
}
