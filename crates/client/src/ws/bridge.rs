//! Maps transport deliveries onto event-log entries.
//!
//! Every declared event is bound twice, once as a typed listener (Echo name
//! formatting applies) and once as a raw bind on the exact name. A single
//! catch-all per channel picks up whatever neither of those covers and logs
//! it as an unregistered event.

use std::collections::{HashMap, HashSet};

use reverb_tester_shared::{
    format_event_name, is_reserved_event, matches_declared_event, ChannelSubscription,
    ChannelType, LogKind, NewLogEntry,
};
use serde_json::Value;

use super::connection::{Binding, Delivery, TransportHandle};

pub const UNREGISTERED_EVENT: &str = "(unregistered event)";

#[derive(Debug, Clone, Default)]
pub struct EventBridge {
    namespace: Option<String>,
    wired: HashMap<String, HashSet<Binding>>,
}

impl EventBridge {
    pub fn new(namespace: Option<String>) -> Self {
        Self {
            namespace,
            wired: HashMap::new(),
        }
    }

    /// Bind every delivery path `subscription` needs on `handle`.
    /// Paths already bound for the channel are skipped.
    pub fn wire<H: TransportHandle>(&mut self, handle: &mut H, subscription: &ChannelSubscription) {
        let channel = subscription.full_name.as_str();

        for event in declared_events(subscription) {
            self.bind(handle, channel, Binding::Typed(event.to_string()));
            self.bind(handle, channel, Binding::Raw(event.to_string()));
        }
        self.bind(handle, channel, Binding::Any);

        if subscription.r#type == ChannelType::Presence {
            self.bind(handle, channel, Binding::Here);
            self.bind(handle, channel, Binding::Joining);
            self.bind(handle, channel, Binding::Leaving);
        }

        self.bind(handle, channel, Binding::SubscriptionSucceeded);
        self.bind(handle, channel, Binding::SubscriptionError);
    }

    fn bind<H: TransportHandle>(&mut self, handle: &mut H, channel: &str, binding: Binding) {
        let bound = self.wired.entry(channel.to_string()).or_default();
        if bound.insert(binding.clone()) {
            handle.bind(channel, binding);
        }
    }

    pub fn is_wired(&self, channel: &str, binding: &Binding) -> bool {
        self.wired
            .get(channel)
            .is_some_and(|bound| bound.contains(binding))
    }

    /// Forget the channel's bindings; a later subscription wires afresh.
    pub fn release(&mut self, channel: &str) {
        self.wired.remove(channel);
    }

    pub fn clear(&mut self) {
        self.wired.clear();
    }

    /// The log entry `delivery` produces on `subscription`, if any.
    ///
    /// Subscription acknowledgments are not handled here; they drive the
    /// registry instead.
    pub fn normalize(
        &self,
        subscription: &ChannelSubscription,
        delivery: &Delivery,
    ) -> Option<NewLogEntry> {
        let channel = subscription.full_name.as_str();

        match delivery {
            Delivery::Typed { listener, data } => Some(event_entry(channel, listener.trim(), data)),
            Delivery::Raw { event, data } => Some(event_entry(channel, event.trim(), data)),
            Delivery::Any { event, data } => {
                if is_reserved_event(event) || self.is_declared(subscription, event) {
                    return None;
                }
                Some(event_entry(channel, event, data).message(UNREGISTERED_EVENT))
            }
            Delivery::Here(members) => Some(
                NewLogEntry::system(format!("Presence: {} member(s) here", members.len()))
                    .channel(channel)
                    .payload(Value::Array(members.clone())),
            ),
            Delivery::Joining(member) => Some(
                NewLogEntry::system("Member joined")
                    .channel(channel)
                    .payload(member.clone()),
            ),
            Delivery::Leaving(member) => Some(
                NewLogEntry::system("Member left")
                    .channel(channel)
                    .payload(member.clone()),
            ),
            Delivery::SubscriptionSucceeded(_) | Delivery::SubscriptionError(_) => None,
        }
    }

    /// Whether the typed or raw path already covers `event`.
    fn is_declared(&self, subscription: &ChannelSubscription, event: &str) -> bool {
        declared_events(subscription).any(|declared| {
            matches_declared_event(event, declared)
                || format_event_name(declared, self.namespace.as_deref()) == event
        })
    }
}

fn declared_events(subscription: &ChannelSubscription) -> impl Iterator<Item = &str> {
    subscription
        .events
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
}

fn event_entry(channel: &str, event: &str, data: &Value) -> NewLogEntry {
    NewLogEntry::new(LogKind::Event)
        .channel(channel)
        .event(event)
        .payload(data.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reverb_tester_shared::{ChannelType, TransportError, DEFAULT_EVENT_NAMESPACE};
    use serde_json::json;

    use crate::ws::connection::HandleId;

    #[derive(Default)]
    struct RecordingHandle {
        bound: Vec<(String, Binding)>,
    }

    impl TransportHandle for RecordingHandle {
        fn id(&self) -> HandleId {
            1
        }
        fn socket_id(&self) -> Option<String> {
            None
        }
        fn join(&mut self, _kind: ChannelType, _channel: &str) -> Result<(), TransportError> {
            Ok(())
        }
        fn leave(&mut self, _channel: &str) {}
        fn bind(&mut self, channel: &str, binding: Binding) {
            self.bound.push((channel.to_string(), binding));
        }
        fn send_event(&mut self, _: &str, _: &str, _: Value) -> Result<(), TransportError> {
            Ok(())
        }
        fn disconnect(&mut self) {}
    }

    fn bridge() -> EventBridge {
        EventBridge::new(Some(DEFAULT_EVENT_NAMESPACE.to_string()))
    }

    fn chat() -> ChannelSubscription {
        ChannelSubscription::new(
            ChannelType::Public,
            "chat.1",
            vec![" .MessageSent ".to_string(), "".to_string(), "OrderShipped".to_string()],
        )
    }

    #[test]
    fn wires_typed_raw_and_catch_all() {
        let mut bridge = bridge();
        let mut handle = RecordingHandle::default();
        bridge.wire(&mut handle, &chat());

        let bindings: Vec<Binding> = handle.bound.iter().map(|(_, b)| b.clone()).collect();
        assert_eq!(
            bindings,
            vec![
                Binding::Typed(".MessageSent".to_string()),
                Binding::Raw(".MessageSent".to_string()),
                Binding::Typed("OrderShipped".to_string()),
                Binding::Raw("OrderShipped".to_string()),
                Binding::Any,
                Binding::SubscriptionSucceeded,
                Binding::SubscriptionError,
            ]
        );
        assert!(handle.bound.iter().all(|(channel, _)| channel == "chat.1"));
    }

    #[test]
    fn wiring_is_idempotent_until_released() {
        let mut bridge = bridge();
        let mut handle = RecordingHandle::default();
        let channel = chat();

        bridge.wire(&mut handle, &channel);
        let first = handle.bound.len();
        bridge.wire(&mut handle, &channel);
        assert_eq!(handle.bound.len(), first);

        bridge.release("chat.1");
        assert!(!bridge.is_wired("chat.1", &Binding::Any));
        bridge.wire(&mut handle, &channel);
        assert_eq!(handle.bound.len(), first * 2);
    }

    #[test]
    fn presence_channels_get_roster_paths() {
        let mut bridge = bridge();
        let mut handle = RecordingHandle::default();
        let room = ChannelSubscription::new(ChannelType::Presence, "room", vec![]);
        bridge.wire(&mut handle, &room);

        for binding in [Binding::Here, Binding::Joining, Binding::Leaving] {
            assert!(bridge.is_wired("presence-room", &binding));
        }
    }

    #[test]
    fn typed_and_raw_log_declared_name() {
        let bridge = bridge();
        let channel = chat();

        let entry = bridge
            .normalize(
                &channel,
                &Delivery::Typed {
                    listener: ".MessageSent".to_string(),
                    data: json!({ "body": "hi" }),
                },
            )
            .unwrap();
        assert_eq!(entry.kind, LogKind::Event);
        assert_eq!(entry.channel.as_deref(), Some("chat.1"));
        assert_eq!(entry.event.as_deref(), Some(".MessageSent"));
        assert_eq!(entry.payload, Some(json!({ "body": "hi" })));
        assert_eq!(entry.message, None);
    }

    #[test]
    fn catch_all_skips_reserved_and_declared() {
        let bridge = bridge();
        let channel = chat();
        let any = |event: &str| Delivery::Any {
            event: event.to_string(),
            data: json!({}),
        };

        assert!(bridge.normalize(&channel, &any("pusher:subscription_succeeded")).is_none());
        assert!(bridge.normalize(&channel, &any("pusher_internal:member_added")).is_none());
        assert!(bridge.normalize(&channel, &any("MessageSent")).is_none());
        assert!(bridge.normalize(&channel, &any(".OrderShipped")).is_none());
        assert!(bridge.normalize(&channel, &any("App\\Events\\OrderShipped")).is_none());

        let entry = bridge.normalize(&channel, &any("SomethingElse")).unwrap();
        assert_eq!(entry.event.as_deref(), Some("SomethingElse"));
        assert_eq!(entry.message.as_deref(), Some(UNREGISTERED_EVENT));
    }

    #[test]
    fn presence_entries() {
        let bridge = bridge();
        let room = ChannelSubscription::new(ChannelType::Presence, "room", vec![]);

        let here = bridge
            .normalize(&room, &Delivery::Here(vec![json!({ "id": 1 }), json!({ "id": 2 })]))
            .unwrap();
        assert_eq!(here.kind, LogKind::System);
        assert_eq!(here.message.as_deref(), Some("Presence: 2 member(s) here"));
        assert_eq!(here.payload, Some(json!([{ "id": 1 }, { "id": 2 }])));

        let left = bridge.normalize(&room, &Delivery::Leaving(json!({ "id": 2 }))).unwrap();
        assert_eq!(left.message.as_deref(), Some("Member left"));
        assert_eq!(left.channel.as_deref(), Some("presence-room"));
    }

    #[test]
    fn acknowledgments_produce_no_entry() {
        let bridge = bridge();
        assert!(bridge
            .normalize(&chat(), &Delivery::SubscriptionSucceeded(json!({})))
            .is_none());
    }
}
