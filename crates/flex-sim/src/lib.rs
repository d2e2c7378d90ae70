//! An in-process fake radio, for driving `flex-session` and `flex-client`
//! through their paces without a physical box on the bench.
//!
//! Grounded on `cat_sim::radio::VirtualRadio`: mutable protocol state
//! plus a pull-based output queue, generalized from CAT command framing
//! to SmartSDR's line-oriented control channel and VITA data plane.

pub mod radio;

pub use radio::{SliceState, VirtualRadio, VirtualRadioConfig};
