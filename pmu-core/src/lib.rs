//! Channel execution layer of the PMU logic engine
//!
//! This crate turns user-wired "channels" into a deterministic control
//! network that runs identically in the firmware and in the desktop
//! emulator:
//!
//! - Channel data model (`Channel`, `ChannelRuntime`, flags, bindings)
//! - Packed little-endian configuration layout, one struct per channel type
//! - Validation of untrusted configuration against a limits table
//! - Executor dispatching each runtime to the blocks in `pmu-blocks`
//!
//! The channel manager that owns the channel graph, orders execution and
//! stores values is external; it talks to the executor through
//! [`executor::ChannelBus`].

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod log;

pub mod channel;
pub mod config;
pub mod executor;
pub mod validation;

pub use channel::{Channel, ChannelFlags, ChannelRuntime, ChannelState, ChannelType};
pub use config::{ChannelConfig, LayoutError};
pub use executor::{ChannelBus, ExecContext};
pub use validation::{ValidationError, ValidationErrorKind, ValidationLimits, ValidationResult};
