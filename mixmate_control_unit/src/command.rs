//! Command processing root.
//!
//! Frame decoding, the latched inbox, the status board and the channel that
//! ties them to the bus context.

pub mod channel;
pub mod frame;
pub mod inbox;
pub mod status;

pub use channel::{BusResponse, ChannelCounters, CommandChannel};
pub use frame::CommandFrame;
pub use inbox::{Command, CommandInbox, LatchedCommand};
pub use status::StatusBoard;
