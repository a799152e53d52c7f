//! Statistics and metrics for pipe registries

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters owned by a registry
#[derive(Debug, Default)]
pub struct RegistryMetrics {
    publishes: AtomicU64,
    withdrawals: AtomicU64,
    notifications: AtomicU64,
    subscribes: AtomicU64,
    unsubscribes: AtomicU64,
    channels_created: AtomicU64,
    channels_removed: AtomicU64,
}

impl RegistryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_publish(&self, notified: usize) {
        self.publishes.fetch_add(1, Ordering::Relaxed);
        self.notifications
            .fetch_add(notified as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_withdraw(&self, notified: usize) {
        self.withdrawals.fetch_add(1, Ordering::Relaxed);
        self.notifications
            .fetch_add(notified as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_subscribe(&self) {
        self.subscribes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unsubscribe(&self) {
        self.unsubscribes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_channel_created(&self) {
        self.channels_created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_channel_removed(&self) {
        self.channels_removed.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of the counters
    pub fn snapshot(&self, active_channels: usize) -> RegistryStats {
        RegistryStats {
            publishes: self.publishes.load(Ordering::Relaxed),
            withdrawals: self.withdrawals.load(Ordering::Relaxed),
            notifications: self.notifications.load(Ordering::Relaxed),
            subscribes: self.subscribes.load(Ordering::Relaxed),
            unsubscribes: self.unsubscribes.load(Ordering::Relaxed),
            channels_created: self.channels_created.load(Ordering::Relaxed),
            channels_removed: self.channels_removed.load(Ordering::Relaxed),
            active_channels,
        }
    }
}

/// Registry-wide statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Content publications (not counting withdrawals)
    pub publishes: u64,
    /// Content withdrawals
    pub withdrawals: u64,
    /// Observer notifications delivered
    pub notifications: u64,
    /// Observers added
    pub subscribes: u64,
    /// Observers removed
    pub unsubscribes: u64,
    /// Channel entries ever created
    pub channels_created: u64,
    /// Channel entries ever removed
    pub channels_removed: u64,
    /// Channel entries currently held
    pub active_channels: usize,
}

impl RegistryStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Average number of observers reached per publication or withdrawal
    pub fn fan_out(&self) -> f64 {
        let sends = self.publishes + self.withdrawals;
        if sends > 0 {
            self.notifications as f64 / sends as f64
        } else {
            0.0
        }
    }
}
