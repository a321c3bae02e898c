use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::condition::Condition;
use crate::cpu::cpsr::Cpsr;
use crate::cpu::instruction::ArmInstruction;
use crate::cpu::registers::Registers;
use crate::error::ExecutionError;
use crate::memory::LinearMemory;
use crate::trace::{ExecutionTrace, TraceEntry};

/// Memory allocated by [`ArmEngine::init`] when the caller passes 0.
pub const DEFAULT_MEMORY_CAPACITY: u32 = 64 * 1024 * 1024;

/// Trace entries kept by default; see [`EngineConfig::trace_depth`].
pub const DEFAULT_TRACE_DEPTH: usize = 256;

pub const SIZE_OF_ARM_INSTRUCTION: u32 = 4;

/// Register index the CPSR is exposed under at the engine boundary.
const REG_CPSR: u8 = 16;

/// Host-tunable engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Memory image capacity used when `init` is called with 0.
    pub memory_capacity: u32,

    /// How many recently executed instructions to keep in the trace.
    /// 0 disables tracing.
    pub trace_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            trace_depth: DEFAULT_TRACE_DEPTH,
        }
    }
}

/// The ARM execution engine.
///
/// An engine starts out uninitialized: it owns no memory and refuses to
/// execute. [`ArmEngine::init`] allocates the memory image and resets all
/// architectural state; it can be called again at any time to start over.
/// The host then drives execution synchronously, one instruction word (or
/// one batch) at a time.
#[derive(Debug, Serialize, Deserialize)]
pub struct ArmEngine {
    pub registers: Registers,
    pub cpsr: Cpsr,
    pub(crate) memory: Option<LinearMemory>,
    instruction_count: u64,
    trace: ExecutionTrace,
    config: EngineConfig,
}

impl Default for ArmEngine {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl ArmEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            registers: Registers::default(),
            cpsr: Cpsr::default(),
            memory: None,
            instruction_count: 0,
            trace: ExecutionTrace::new(config.trace_depth),
            config,
        }
    }

    /// (Re)allocates the memory image and resets all architectural state.
    ///
    /// `capacity` 0 falls back to [`EngineConfig::memory_capacity`]. The
    /// whole image is zeroed and readable; SP starts at the top of memory
    /// (stacks grow downward), PC at 0.
    pub fn init(&mut self, capacity: u32) -> Result<(), ExecutionError> {
        let capacity = if capacity == 0 {
            self.config.memory_capacity
        } else {
            capacity
        };

        let memory = LinearMemory::new(capacity as usize)?;

        self.registers = Registers::default();
        self.cpsr = Cpsr::default();
        self.registers
            .set_stack_pointer(capacity.wrapping_sub(SIZE_OF_ARM_INSTRUCTION));
        self.instruction_count = 0;
        self.trace = ExecutionTrace::new(self.config.trace_depth);
        self.memory = Some(memory);

        logger::info(format!("engine initialized with {capacity} bytes of memory"));

        Ok(())
    }

    /// Copies host bytes into the memory image, growing it when the write
    /// lands past the current capacity.
    pub fn write_memory(&mut self, address: u32, data: &[u8]) -> Result<(), ExecutionError> {
        let memory = self.memory.as_mut().ok_or(ExecutionError::Uninitialized)?;
        memory.write(address, data)
    }

    /// Copies bytes out of the memory image. Reads never grow it.
    pub fn read_memory(&self, address: u32, output: &mut [u8]) -> Result<(), ExecutionError> {
        let memory = self.memory.as_ref().ok_or(ExecutionError::Uninitialized)?;
        memory.read(address, output)
    }

    /// Reads a register by boundary index: 0..=15 are R0..R15, 16 is the
    /// CPSR, anything else reads as 0.
    pub fn register(&self, reg: u8) -> u32 {
        match reg {
            0..=15 => self.registers.register_at(reg as usize),
            REG_CPSR => self.cpsr.into(),
            _ => 0,
        }
    }

    /// Writes a register by boundary index; indices past the CPSR are
    /// ignored.
    pub fn set_register(&mut self, reg: u8, value: u32) {
        match reg {
            0..=15 => self.registers.set_register_at(reg as usize, value),
            REG_CPSR => self.cpsr = value.into(),
            _ => (),
        }
    }

    pub fn pc(&self) -> u32 {
        self.registers.program_counter()
    }

    pub fn set_pc(&mut self, value: u32) {
        self.registers.set_program_counter(value);
    }

    /// Total `execute_instruction` calls since `init`, counting skipped and
    /// illegal words too.
    pub fn instruction_count(&self) -> u64 {
        self.instruction_count
    }

    /// Current logical memory size, or 0 while uninitialized.
    pub fn memory_size(&self) -> u32 {
        self.memory.as_ref().map_or(0, |memory| memory.size() as u32)
    }

    /// Recently executed instructions, oldest first.
    pub fn trace(&self) -> impl Iterator<Item = &TraceEntry> {
        self.trace.iter()
    }

    /// Decodes and executes one instruction word.
    ///
    /// The engine never fetches on its own: the host submits each word and
    /// is responsible for keeping its program stream consistent with PC.
    pub fn execute_instruction(&mut self, word: u32) -> Result<(), ExecutionError> {
        if self.memory.is_none() {
            return Err(ExecutionError::Uninitialized);
        }

        // Every submitted word counts, whether it executes, skips or faults.
        self.instruction_count += 1;

        // The condition gates classification: a skipped word succeeds even
        // when its family would be illegal.
        let condition = Condition::from(word.get_bits(28..=31) as u8);
        if !self.cpsr.can_execute(condition) {
            return Ok(());
        }

        let instruction = match ArmInstruction::try_from(word) {
            Ok(instruction) => instruction,
            Err(error) => {
                logger::warn(format!("illegal instruction {word:#010X}"));
                return Err(error);
            }
        };

        self.trace.record(TraceEntry {
            pc: self.registers.program_counter(),
            word,
        });

        match instruction {
            ArmInstruction::DataProcessing {
                alu_instruction,
                set_conditions,
                rn,
                destination,
                op2,
                ..
            } => {
                self.data_processing(alu_instruction, set_conditions, rn, destination, op2);
                Ok(())
            }
            ArmInstruction::Branch { link, offset, .. } => {
                self.branch(link, offset);
                Ok(())
            }
            ArmInstruction::SingleDataTransfer {
                kind,
                quantity,
                indexing,
                offsetting,
                rd,
                base_register,
                offset_info,
                ..
            } => {
                let result = self.single_data_transfer(
                    kind,
                    quantity,
                    indexing,
                    offsetting,
                    rd,
                    base_register,
                    offset_info,
                );
                if let Err(error) = result {
                    logger::warn(format!("data transfer failed: {error}"));
                }
                result
            }
        }
    }

    /// Executes a batch in order, stopping at the first failure. Returns how
    /// many instructions succeeded; the failing one is not counted.
    pub fn execute_instructions(&mut self, instructions: &[u32]) -> usize {
        let mut executed = 0;
        for &word in instructions {
            if self.execute_instruction(word).is_err() {
                break;
            }
            executed += 1;
        }

        executed
    }
}
