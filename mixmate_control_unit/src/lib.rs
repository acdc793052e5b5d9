//! # MIXmate Control Unit Library
//!
//! Command dispatch for the MIXmate drink rig: one carriage, one conveyor
//! band and ten dosing pumps, driven from a host over a byte-frame bus.
//!
//! ## Contexts
//!
//! 1. **Bus-event**: [`bus::BusBridge`] latches write frames and answers
//!    read requests through [`command::CommandChannel`].
//! 2. **Dispatch loop**: [`dispatch::Dispatcher`] owns every axis and task
//!    and ticks them in a fixed order.
//!
//! Only the latched command inbox and the status board are shared. There
//! is no queue: the latest command wins.

pub mod axis;
pub mod bus;
pub mod command;
pub mod config;
pub mod cycle;
pub mod detector;
pub mod dispatch;
pub mod error;
pub mod task;
