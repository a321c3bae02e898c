//! # Armlet
//!
//! An embeddable, user-mode interpreter for a subset of the 32-bit ARM
//! instruction set. A host supplies memory contents and instruction words;
//! the engine decodes and executes them against the architectural state and
//! reports per-instruction success or failure.
//!
//! ## Module overview
//!
//! | Module     | Description                                      |
//! |------------|--------------------------------------------------|
//! | [`cpu`]    | Decoder, condition evaluator and executors       |
//! | [`memory`] | Linear grow-on-write memory image                |
//! | [`trace`]  | Bounded history of executed instructions         |
//!
//! ## Quick start
//!
//! ```
//! use armlet::ArmEngine;
//!
//! let mut engine = ArmEngine::new();
//! engine.init(0x1000)?;
//!
//! engine.set_register(2, 10);
//! engine.set_register(3, 32);
//! engine.execute_instruction(0xE0824003)?; // ADD R4, R2, R3
//!
//! assert_eq!(engine.register(4), 42);
//! # Ok::<(), armlet::ExecutionError>(())
//! ```
//!
//! The engine never fetches instructions on its own: each word is submitted
//! by the host, which keeps its program stream consistent with PC. Batches
//! run through [`ArmEngine::execute_instructions`] and stop at the first
//! failure.

mod bitwise;
pub mod cpu;
mod error;
pub mod memory;
pub mod trace;

pub use cpu::engine::{ArmEngine, EngineConfig, DEFAULT_MEMORY_CAPACITY};
pub use error::ExecutionError;
