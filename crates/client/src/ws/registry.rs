//! Channel subscriptions keyed by fully-qualified channel name.

use reverb_tester_shared::{ChannelSubscription, SubscriptionStatus};

/// Ordered set of channel subscriptions.
///
/// Full channel names are unique; a second insert for the same name is
/// refused rather than merged.
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    channels: Vec<ChannelSubscription>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new record. Returns the record back if its full name is taken.
    pub fn insert(&mut self, subscription: ChannelSubscription) -> Result<(), ChannelSubscription> {
        if self.find_by_full_name(&subscription.full_name).is_some() {
            return Err(subscription);
        }
        self.channels.push(subscription);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&ChannelSubscription> {
        self.channels.iter().find(|c| c.id == id)
    }

    pub fn find_by_full_name(&self, full_name: &str) -> Option<&ChannelSubscription> {
        self.channels.iter().find(|c| c.full_name == full_name)
    }

    pub fn remove(&mut self, id: &str) -> Option<ChannelSubscription> {
        let index = self.channels.iter().position(|c| c.id == id)?;
        Some(self.channels.remove(index))
    }

    /// `subscribing -> subscribed`. Returns whether the record moved.
    pub fn mark_subscribed(&mut self, full_name: &str) -> bool {
        match self.subscribing_mut(full_name) {
            Some(channel) => {
                channel.status = SubscriptionStatus::Subscribed;
                channel.error_message = None;
                true
            }
            None => false,
        }
    }

    /// `subscribing -> error`. Returns whether the record moved.
    pub fn mark_error(&mut self, full_name: &str, message: impl Into<String>) -> bool {
        match self.subscribing_mut(full_name) {
            Some(channel) => {
                channel.status = SubscriptionStatus::Error;
                channel.error_message = Some(message.into());
                true
            }
            None => false,
        }
    }

    fn subscribing_mut(&mut self, full_name: &str) -> Option<&mut ChannelSubscription> {
        self.channels
            .iter_mut()
            .find(|c| c.full_name == full_name && c.status == SubscriptionStatus::Subscribing)
    }

    pub fn clear(&mut self) {
        self.channels.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelSubscription> {
        self.channels.iter()
    }

    pub fn as_slice(&self) -> &[ChannelSubscription] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
