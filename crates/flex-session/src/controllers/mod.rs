//! Typed controllers: one per entity kind, translating application
//! calls into the exact command-channel line (`flex_protocol::
//! command_grammar`) and returning the radio's reply.
//!
//! A controller is a thin view over a [`crate::handle::SessionHandle`]
//! — it owns no state of its own beyond the id it targets. Setters with
//! a known status-line counterpart (see `slice::SliceController`) also
//! apply an optimistic update to [`flex_state::StateStore`] before the
//! radio's reply arrives, returning that diff alongside the reply. The
//! authoritative diff still only exists once the radio's own status
//! broadcast round-trips through the store — the two are kept as
//! distinct values so a caller (or a test) can tell them apart.

pub mod apd;
pub mod equalizer;
pub mod interlock;
pub mod panadapter;
pub mod radio;
pub mod slice;
pub mod transmit;
pub mod waterfall;
