//! Channel data model
//!
//! [`Channel`] is the configured unit; [`ChannelRuntime`] is its
//! execution-time counterpart owned by the channel manager.

mod model;
mod runtime;
mod types;

pub use model::{Channel, ChannelName, LoadError, MAX_NAME_LEN, MAX_RECORD_SIZE};
pub use runtime::{ChannelRuntime, ChannelState, WriteError};
pub use types::{
    is_connected, ChannelDisplay, ChannelFlags, ChannelId, ChannelRef, ChannelType, HwBinding,
    HwDevice, CH_ID_NONE, CH_REF_NONE, MAX_UNIT_LEN,
};
