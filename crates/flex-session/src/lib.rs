//! Control/data-plane session for FlexRadio SmartSDR radios.
//!
//! This crate wires together `flex-protocol` (line grammar),
//! `flex-state` (entity store), and `flex-vita` (binary packets) into a
//! single connection: the control-channel transport, the command
//! sequencing/reply table, the connect/sync/ready state machine, the
//! UDP data-plane dispatcher, panadapter/waterfall reassembly, and the
//! typed per-entity controllers an application drives.

pub mod command;
pub mod control;
pub mod controllers;
pub mod error;
pub mod handle;
pub mod reassembly;
pub mod udp;

pub use error::{SessionError, SessionResult};
pub use handle::{connect, connect_with_timeout, ConnectionState, SessionEvent, SessionHandle};
pub use reassembly::{CompleteFftFrame, CompleteWaterfallRow, FftReassembler, WaterfallReassembler};
pub use udp::{Subscriber, SubscriptionHandle, UdpReceiver};
