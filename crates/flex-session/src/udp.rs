//! UDP data-plane dispatch.
//!
//! One [`UdpReceiver`] multiplexes every VITA-49 datagram the session
//! receives out to whichever subscribers registered for that packet's
//! class. Dispatch is synchronous and happens inline on the receive
//! path — there is no per-subscriber queue, so a subscriber that does
//! expensive work in its callback delays every other subscriber's next
//! packet. That tradeoff is deliberate: a slow subscriber is the
//! subscriber's problem, not this module's, the same posture
//! `cat_mux::engine`/`events` takes toward its unified event channel,
//! generalized here from one flat event enum to subscriptions keyed by
//! VITA packet class.

use std::collections::HashMap;

use flex_vita::class_id::PacketClass;
use flex_vita::{Packet, VitaError};

/// A callback invoked with each decoded packet matching its subscription's
/// class.
pub type Subscriber = Box<dyn FnMut(&Packet) + Send>;

/// Handle returned from [`UdpReceiver::subscribe`]. Passing it to
/// [`UdpReceiver::unsubscribe`] is a no-op if the subscription is already
/// gone (the receiver was torn down, or the same handle was used twice).
#[derive(Debug)]
pub struct SubscriptionHandle {
    class: PacketClass,
    id: u64,
}

/// Dispatches decoded VITA-49 packets to per-class subscribers.
#[derive(Default)]
pub struct UdpReceiver {
    subscriptions: HashMap<PacketClass, Vec<(u64, Subscriber)>>,
    next_id: u64,
    malformed_count: u64,
}

impl UdpReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for every packet of `class`.
    pub fn subscribe(&mut self, class: PacketClass, callback: Subscriber) -> SubscriptionHandle {
        self.next_id += 1;
        let id = self.next_id;
        self.subscriptions.entry(class).or_default().push((id, callback));
        SubscriptionHandle { class, id }
    }

    /// Remove a subscription. Idempotent — removing an already-removed
    /// handle does nothing.
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) {
        if let Some(subs) = self.subscriptions.get_mut(&handle.class) {
            subs.retain(|(id, _)| *id != handle.id);
        }
    }

    /// Number of datagrams that failed VITA-49 decode, permissively
    /// dropped rather than tearing down the session.
    pub fn malformed_count(&self) -> u64 {
        self.malformed_count
    }

    /// Decode one raw datagram and dispatch it to every subscriber
    /// registered for its class. A decode failure is logged and dropped —
    /// one bad datagram never takes down the UDP session.
    pub fn dispatch_raw(&mut self, datagram: &[u8]) {
        match Packet::decode(datagram) {
            Ok(packet) => self.dispatch(&packet),
            Err(err) => self.report_malformed(err),
        }
    }

    /// Dispatch an already-decoded packet. Useful for feeding packets
    /// built in-process (e.g. from `flex-sim`) without a round trip
    /// through bytes.
    pub fn dispatch(&mut self, packet: &Packet) {
        let class = packet
            .class_id
            .as_ref()
            .map(|c| c.packet_class())
            .unwrap_or(PacketClass::Unknown(0));
        if let Some(subs) = self.subscriptions.get_mut(&class) {
            for (_, callback) in subs.iter_mut() {
                callback(packet);
            }
        }
    }

    fn report_malformed(&mut self, err: VitaError) {
        self.malformed_count += 1;
        tracing::debug!(error = %err, "dropping malformed VITA-49 datagram");
    }

    /// Number of subscribers currently registered for `class`.
    pub fn subscriber_count(&self, class: PacketClass) -> usize {
        self.subscriptions.get(&class).map(Vec::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flex_vita::class_id::{ClassId, CLASS_ID_LEN};
    use flex_vita::header::{Header, PacketType, TsfType, TsiType};
    use flex_vita::payload::meter::MeterSample;
    use flex_vita::payload::Payload;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn meter_packet(value: i16) -> Packet {
        Packet {
            header: Header {
                packet_type: PacketType::ExtDataWithStream,
                has_class_id: true,
                has_trailer: false,
                tsi: TsiType::None,
                tsf: TsfType::None,
                packet_count: 0,
                packet_size: 0,
            },
            stream_id: Some(1),
            class_id: Some(ClassId {
                oui: 0x00_1C2D,
                information_class_code: 0,
                packet_class_code: PacketClass::Meter.code(),
            }),
            integer_timestamp: None,
            fractional_timestamp: None,
            payload: Payload::Meter(vec![MeterSample { id: 1, value }]),
            trailer: None,
        }
    }

    #[test]
    fn dispatches_to_subscribers_of_matching_class() {
        let mut receiver = UdpReceiver::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        receiver.subscribe(
            PacketClass::Meter,
            Box::new(move |_packet| {
                count_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );
        receiver.dispatch(&meter_packet(-100));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn does_not_dispatch_to_other_classes() {
        let mut receiver = UdpReceiver::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        receiver.subscribe(PacketClass::Waterfall, Box::new(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }));
        receiver.dispatch(&meter_packet(-100));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let mut receiver = UdpReceiver::new();
        let handle = receiver.subscribe(PacketClass::Meter, Box::new(|_| {}));
        assert_eq!(receiver.subscriber_count(PacketClass::Meter), 1);
        receiver.unsubscribe(handle);
        assert_eq!(receiver.subscriber_count(PacketClass::Meter), 0);
        // second removal of an already-gone handle is a no-op, not a panic
        let handle2 = receiver.subscribe(PacketClass::Meter, Box::new(|_| {}));
        receiver.unsubscribe(SubscriptionHandle { class: PacketClass::Meter, id: handle2.id });
        receiver.unsubscribe(SubscriptionHandle { class: PacketClass::Meter, id: handle2.id });
    }

    #[test]
    fn malformed_datagram_is_dropped_not_fatal() {
        let mut receiver = UdpReceiver::new();
        receiver.dispatch_raw(&[0xFF]);
        assert_eq!(receiver.malformed_count(), 1);
    }

    #[test]
    fn class_id_len_constant_matches_decoder() {
        assert_eq!(CLASS_ID_LEN, 8);
    }
}
