//! Primitive blocks for the PMU logic engine
//!
//! Every block works on `i32` channel values using integer arithmetic only,
//! so the firmware (Cortex-M without FPU) and the desktop emulator produce
//! bit-identical results.
//!
//! - Pure functions: [`logic`], [`math`], [`table`], [`switch`]
//! - Stateful blocks: [`timer`], [`counter`], [`filter`], [`flipflop`],
//!   [`hysteresis`], [`pid`]
//!
//! Stateful blocks keep all of their memory in a state struct owned by the
//! caller. None of the functions here can panic on any input: division by
//! zero, empty slices and out-of-range selectors all collapse to a neutral
//! value (usually 0).

#![no_std]
#![deny(unsafe_code)]

pub mod counter;
pub mod edge;
pub mod filter;
pub mod flipflop;
pub mod hysteresis;
pub mod logic;
pub mod math;
pub mod pid;
pub mod switch;
pub mod table;
pub mod timer;

pub use edge::EdgeMode;
