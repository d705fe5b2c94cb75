//! # Live Instance Tracking
//!
//! Each backend owns one [`InstanceTracker`]. It holds a handle to every
//! instance between `play()` and its terminal transition, which is what bulk
//! pause/resume/stop and host event routing iterate over. It also does the
//! per-source channel accounting behind the interrupt policy.
//!
//! Lock order is tracker before instance: instance code releases its own
//! state lock before calling in here. No callback runs under the tracker lock.

use crate::instance::{InterruptMode, SoundInstance};
use parking_lot::Mutex;

/// Outcome of asking for a channel.
#[derive(Debug)]
pub enum ChannelGrant {
    /// A free channel was taken.
    Granted,
    /// The channel was taken from this instance, which the caller must interrupt.
    Replaced(SoundInstance),
    /// Every channel is busy and the interrupt mode forbids a takeover.
    Exhausted { limit: u32 },
    /// The instance is no longer tracked, so it gets no channel.
    Untracked,
}

#[derive(Debug)]
struct ChannelSlot {
    src: String,
    instance: SoundInstance,
    /// Start order within the tracker.
    seq: u64,
}

#[derive(Debug, Default)]
struct TrackerState {
    live: Vec<SoundInstance>,
    channels: Vec<ChannelSlot>,
    next_seq: u64,
}

/// Live instances of one backend.
#[derive(Debug, Default)]
pub struct InstanceTracker {
    state: Mutex<TrackerState>,
}

impl InstanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking `instance`. Tracking twice is a no-op.
    pub fn track(&self, instance: &SoundInstance) {
        let mut state = self.state.lock();
        if !state.live.iter().any(|i| i.id() == instance.id()) {
            state.live.push(instance.clone());
        }
    }

    /// Stops tracking the instance and frees its channel. Returns whether it
    /// was tracked.
    pub fn untrack(&self, id: u64) -> bool {
        let mut state = self.state.lock();
        state.channels.retain(|slot| slot.instance.id() != id);
        let before = state.live.len();
        state.live.retain(|i| i.id() != id);
        state.live.len() != before
    }

    /// Snapshot of every live instance, oldest first.
    pub fn snapshot(&self) -> Vec<SoundInstance> {
        self.state.lock().live.clone()
    }

    /// Snapshot of live instances playing `src`.
    pub fn for_source(&self, src: &str) -> Vec<SoundInstance> {
        self.state
            .lock()
            .live
            .iter()
            .filter(|i| i.src() == src)
            .cloned()
            .collect()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.state.lock().live.iter().any(|i| i.id() == id)
    }

    pub fn len(&self) -> usize {
        self.state.lock().live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().live.is_empty()
    }

    /// Channels currently held for `src`.
    pub fn channels_in_use(&self, src: &str) -> usize {
        self.state
            .lock()
            .channels
            .iter()
            .filter(|slot| slot.src == src)
            .count()
    }

    /// Claims a channel for `instance` on its source.
    ///
    /// With `limit` of `None` a channel is always granted. Otherwise, when
    /// `limit` channels are already held, `mode` decides who loses one:
    /// `None` refuses, `Early` takes the oldest holder, `Late` the newest, and
    /// `Any` prefers a paused holder before falling back to the oldest.
    ///
    /// An instance that was untracked (stopped) never gets a slot.
    pub fn acquire_channel(
        &self,
        instance: &SoundInstance,
        limit: Option<u32>,
        mode: InterruptMode,
    ) -> ChannelGrant {
        let mut state = self.state.lock();
        if !state.live.iter().any(|i| i.id() == instance.id()) {
            return ChannelGrant::Untracked;
        }

        let seq = state.next_seq;
        state.next_seq += 1;

        let src = instance.src().to_string();

        if let Some(limit) = limit {
            let holders: Vec<usize> = state
                .channels
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.src == src && slot.instance.id() != instance.id())
                .map(|(index, _)| index)
                .collect();

            if holders.len() >= limit as usize {
                let victim = match mode {
                    InterruptMode::None => None,
                    InterruptMode::Early => holders
                        .iter()
                        .copied()
                        .min_by_key(|&index| state.channels[index].seq),
                    InterruptMode::Late => holders
                        .iter()
                        .copied()
                        .max_by_key(|&index| state.channels[index].seq),
                    InterruptMode::Any => holders
                        .iter()
                        .copied()
                        .find(|&index| state.channels[index].instance.is_paused())
                        .or_else(|| {
                            holders
                                .iter()
                                .copied()
                                .min_by_key(|&index| state.channels[index].seq)
                        }),
                };

                let Some(index) = victim else {
                    return ChannelGrant::Exhausted { limit };
                };

                let replaced = state.channels.remove(index).instance;
                state.channels.push(ChannelSlot {
                    src,
                    instance: instance.clone(),
                    seq,
                });
                return ChannelGrant::Replaced(replaced);
            }
        }

        state.channels.retain(|slot| slot.instance.id() != instance.id());
        state.channels.push(ChannelSlot {
            src,
            instance: instance.clone(),
            seq,
        });
        ChannelGrant::Granted
    }
}
