//! Discovery adapter: turns a stream of VITA-49 discovery beacons into a
//! deduplicated, time-bounded table of [`beacon::RadioDescriptor`]s,
//! emitting online/change/offline events.

pub mod beacon;
pub mod error;
pub mod source;
pub mod table;

pub use beacon::{Endpoint, GuiClient, RadioAvailability, RadioDescriptor, TransportProtocol};
pub use error::{DiscoveryError, DiscoveryResult};
pub use source::{BeaconSource, FixtureSource};
pub use table::{DiscoveryEvent, DiscoveryTable, DEFAULT_OFFLINE_TIMEOUT};
