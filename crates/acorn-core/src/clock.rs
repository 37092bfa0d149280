use std::collections::HashSet;

use crate::error::{CoreError, CoreResult};
use crate::event::Event;
use crate::meter::Meter;

/// What a timer asks its owner to do when it fires.
///
/// Hooks are plain data; the entity graph dispatches them after the
/// clock tick returns, so firing a hook never mutates the clock that
/// is being ticked.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TimerHook {
    /// Nothing to do.
    #[default]
    None,
    /// Handle the event on the owning entity now.
    Handle(Event),
    /// Schedule the event on the owning entity's clock.
    Queue(Event),
    /// Handle the first event, then schedule the second.
    HandleThenQueue(Event, Event),
}

/// A countdown over a whole number of frames.
///
/// The timer wraps a [`Meter`] running from `duration` down to zero.
/// Its ratio reads as progress toward completion, so a lerped event
/// can be interpolated directly against it.
#[derive(Debug, Clone, PartialEq)]
pub struct Timer {
    meter: Meter,
    temp: bool,
    /// Fired on every frame the timer runs, including the last.
    pub on_tick: TimerHook,
    /// Fired once, on the frame the timer reaches zero.
    pub on_switch_off: TimerHook,
}

impl Timer {
    /// Create a timer that runs for `duration` frames.
    pub fn new(name: impl Into<String>, duration: f64) -> CoreResult<Self> {
        let name = name.into();
        if duration <= 0.0 {
            return Err(CoreError::BadDuration { name, duration });
        }
        Ok(Self {
            meter: Meter::with_range(name, 0.0, duration, duration)?,
            temp: true,
            on_tick: TimerHook::None,
            on_switch_off: TimerHook::None,
        })
    }

    /// The timer's name.
    pub fn name(&self) -> &str {
        self.meter.name()
    }

    /// Frames remaining.
    pub fn remaining(&self) -> f64 {
        self.meter.value()
    }

    /// Whether the timer is discarded once it switches off.
    pub fn temp(&self) -> bool {
        self.temp
    }

    /// Choose whether the timer is discarded or reset on completion.
    pub fn with_temp(mut self, temp: bool) -> Self {
        self.temp = temp;
        self
    }

    /// Attach a per-frame hook.
    pub fn with_on_tick(mut self, hook: TimerHook) -> Self {
        self.on_tick = hook;
        self
    }

    /// Attach a completion hook.
    pub fn with_on_switch_off(mut self, hook: TimerHook) -> Self {
        self.on_switch_off = hook;
        self
    }

    /// Progress toward completion, from 0.0 at the start to 1.0 when
    /// the timer switches off.
    pub fn ratio(&self) -> f64 {
        // duration > 0 so the span is never zero
        1.0 - self.meter.ratio().unwrap_or(0.0)
    }

    /// Whether the countdown has reached zero.
    pub fn is_off(&self) -> bool {
        self.meter.is_empty()
    }

    /// Wind the timer back to its full duration.
    pub fn reset(&mut self) {
        self.meter.refill();
    }

    /// Count down one frame. Returns `true` on the frame the timer
    /// switches off.
    fn tick(&mut self) -> bool {
        let was_off = self.is_off();
        self.meter.set_value(self.meter.value() - 1.0);
        !was_off && self.is_off()
    }
}

/// Handle for removing a timer from its [`Clock`].
pub type TimerId = u64;

#[derive(Debug, Clone)]
struct TimerSlot {
    id: TimerId,
    timer: Timer,
}

/// A per-entity frame clock driving a set of timers.
///
/// Timers added mid-frame wait in a queue and start counting on the
/// next tick; removals are buffered the same way. This keeps one tick
/// a snapshot: nothing requested during a tick changes that tick.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    next_id: TimerId,
    timers: Vec<TimerSlot>,
    queue: Vec<TimerSlot>,
    to_remove: HashSet<TimerId>,
}

impl Clock {
    /// Create an empty clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a timer; it starts counting on the next tick.
    pub fn add_timer(&mut self, timer: Timer) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.push(TimerSlot { id, timer });
        id
    }

    /// Flag every timer with the given name for removal, queued ones
    /// included. Returns how many were flagged.
    pub fn remove_timer(&mut self, name: &str) -> usize {
        let matching: Vec<TimerId> = self
            .timers
            .iter()
            .chain(self.queue.iter())
            .filter(|slot| slot.timer.name() == name)
            .map(|slot| slot.id)
            .collect();
        let count = matching.len();
        self.to_remove.extend(matching);
        count
    }

    /// Flag one timer by id for removal.
    pub fn remove_timer_by_id(&mut self, id: TimerId) {
        self.to_remove.insert(id);
    }

    /// Whether a timer with the given name is active or queued and not
    /// flagged for removal.
    pub fn is_running(&self, name: &str) -> bool {
        self.timers
            .iter()
            .chain(self.queue.iter())
            .any(|slot| slot.timer.name() == name && !self.to_remove.contains(&slot.id))
    }

    /// Number of active and queued timers.
    pub fn len(&self) -> usize {
        self.timers.len() + self.queue.len()
    }

    /// Whether the clock has no timers at all.
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty() && self.queue.is_empty()
    }

    /// Advance one frame.
    ///
    /// Promotes queued timers, drops flagged ones, counts every active
    /// timer down, and collects the hooks that fired. Expired temp
    /// timers are discarded; persistent ones wind back and keep going.
    pub fn tick(&mut self) -> Vec<TimerHook> {
        let flagged = std::mem::take(&mut self.to_remove);
        let queued = std::mem::take(&mut self.queue);
        self.timers
            .extend(queued.into_iter().filter(|s| !flagged.contains(&s.id)));
        self.timers.retain(|s| !flagged.contains(&s.id));

        let mut fired = Vec::new();
        let mut survivors = Vec::with_capacity(self.timers.len());
        for mut slot in self.timers.drain(..) {
            let switched_off = slot.timer.tick();
            if slot.timer.on_tick != TimerHook::None {
                fired.push(slot.timer.on_tick.clone());
            }
            if switched_off {
                if slot.timer.on_switch_off != TimerHook::None {
                    fired.push(slot.timer.on_switch_off.clone());
                }
                if slot.timer.temp() {
                    continue;
                }
                slot.timer.reset();
            }
            survivors.push(slot);
        }
        self.timers = survivors;
        fired
    }
}
