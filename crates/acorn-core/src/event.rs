use std::collections::HashSet;

use acorn_cfg::Value;

use crate::entity::EntityId;

/// A named occurrence an entity can schedule, handle, or listen for.
///
/// Events are plain data. Scheduling one spawns a timer on the owning
/// entity's clock; handling one runs the class handler and notifies
/// listeners. A lerped event is handled on every frame its timer runs,
/// a non-lerped event once when the timer switches off.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Name the handlers and listeners key on.
    pub name: String,
    /// Timer duration in frames.
    pub duration: f64,
    /// Handle on every frame of the timer rather than once at the end.
    pub lerp: bool,
    /// Discard the timer when it switches off instead of resetting it.
    pub temp: bool,
    /// Follow-up event scheduled when this one's timer switches off.
    pub link: Option<Box<Event>>,
    /// The event that caused this one, stamped on listener responses.
    pub trigger: Option<Box<Event>>,
}

impl Event {
    /// A one-frame event with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration: 1.0,
            lerp: true,
            temp: true,
            link: None,
            trigger: None,
        }
    }

    /// Set the timer duration in frames.
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Choose per-frame or on-completion handling.
    pub fn with_lerp(mut self, lerp: bool) -> Self {
        self.lerp = lerp;
        self
    }

    /// Choose whether the timer is discarded or reset on completion.
    pub fn with_temp(mut self, temp: bool) -> Self {
        self.temp = temp;
        self
    }

    /// Append a follow-up to the end of this event's chain.
    pub fn with_link(mut self, next: Event) -> Self {
        self.push_link(next);
        self
    }

    fn push_link(&mut self, next: Event) {
        let mut tail = self;
        while let Some(ref mut link) = tail.link {
            tail = link;
        }
        tail.link = Some(Box::new(next));
    }

    /// Link a sequence of events into one chain, first event outermost.
    pub fn chain(events: Vec<Event>) -> Option<Event> {
        let mut iter = events.into_iter();
        let mut head = iter.next()?;
        for event in iter {
            head.push_link(event);
        }
        Some(head)
    }

    /// Split off the follow-up, leaving a single-step event.
    pub(crate) fn take_link(&mut self) -> Option<Event> {
        self.link.take().map(|link| *link)
    }

    /// Interpret a configuration value as an event.
    ///
    /// A string is a one-frame event of that name. A map carries the
    /// name plus optional `duration`, `lerp`, `temp`, and `link` keys;
    /// the link recurses.
    pub fn from_value(value: &Value) -> Option<Event> {
        match value {
            Value::Str(name) => Some(Event::named(name.clone())),
            Value::Map(fields) => {
                let mut event = Event::named(fields.get("name")?.as_str()?);
                if let Some(duration) = fields.get("duration").and_then(Value::as_f64) {
                    event.duration = duration;
                }
                if let Some(lerp) = fields.get("lerp").and_then(Value::as_bool) {
                    event.lerp = lerp;
                }
                if let Some(temp) = fields.get("temp").and_then(Value::as_bool) {
                    event.temp = temp;
                }
                if let Some(link) = fields.get("link") {
                    event.link = Some(Box::new(Event::from_value(link)?));
                }
                Some(event)
            }
            _ => None,
        }
    }
}

/// A standing subscription: when the owner handles a matching event,
/// the response event is delivered to the target entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Listener {
    /// Event name the listener reacts to.
    pub name: String,
    /// Recipient of the response; the owner itself when `None`.
    pub target: Option<EntityId>,
    /// Event delivered on a match; a copy of the heard event when `None`.
    pub response: Option<Event>,
    /// Remove the listener after its first delivery.
    pub temp: bool,
}

impl Listener {
    /// A permanent listener for the given event name.
    pub fn hears(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: None,
            response: None,
            temp: false,
        }
    }

    /// Deliver responses to another entity.
    pub fn with_target(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }

    /// Respond with a specific event instead of echoing the heard one.
    pub fn with_response(mut self, response: Event) -> Self {
        self.response = Some(response);
        self
    }

    /// Remove the listener after its first delivery.
    pub fn with_temp(mut self, temp: bool) -> Self {
        self.temp = temp;
        self
    }

    /// Interpret `"name"` or `"name response"` as a listener.
    pub fn parse(text: &str) -> Option<Listener> {
        let mut words = text.split_whitespace();
        let name = words.next()?;
        let mut listener = Listener::hears(name);
        if let Some(response) = words.next() {
            listener.response = Some(Event::named(response));
        }
        Some(listener)
    }

    /// Whether a removal specification selects this listener.
    ///
    /// The name always has to match; the spec's target and response
    /// act as wildcards when unset.
    fn selected_by(&self, spec: &Listener) -> bool {
        if self.name != spec.name {
            return false;
        }
        if spec.target.is_some() && self.target != spec.target {
            return false;
        }
        if let Some(ref response) = spec.response {
            let matches = self
                .response
                .as_ref()
                .is_some_and(|r| r.name == response.name);
            if !matches {
                return false;
            }
        }
        true
    }
}

/// Per-entity event state: paused names and standing listeners.
#[derive(Debug, Clone, Default)]
pub struct EventHandler {
    paused: HashSet<String>,
    listeners: Vec<Listener>,
}

impl EventHandler {
    /// Create an empty handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress handling of the named event.
    pub fn pause(&mut self, name: impl Into<String>) {
        self.paused.insert(name.into());
    }

    /// Resume handling of the named event.
    pub fn unpause(&mut self, name: &str) {
        self.paused.remove(name);
    }

    /// Whether the named event is currently suppressed.
    pub fn is_paused(&self, name: &str) -> bool {
        self.paused.contains(name)
    }

    /// Register a listener.
    pub fn add_listener(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    /// Remove every listener the specification selects. Returns how
    /// many were removed.
    pub fn remove_listener(&mut self, spec: &Listener) -> usize {
        let before = self.listeners.len();
        self.listeners.retain(|l| !l.selected_by(spec));
        before - self.listeners.len()
    }

    /// Remove the first listener equal to the given one.
    pub(crate) fn remove_exact(&mut self, listener: &Listener) {
        if let Some(idx) = self.listeners.iter().position(|l| l == listener) {
            self.listeners.remove(idx);
        }
    }

    /// Whether any listener reacts to the named event.
    pub fn listening_for(&self, name: &str) -> bool {
        self.listeners.iter().any(|l| l.name == name)
    }

    /// Snapshot the listeners reacting to the named event.
    pub(crate) fn matching(&self, name: &str) -> Vec<Listener> {
        self.listeners
            .iter()
            .filter(|l| l.name == name)
            .cloned()
            .collect()
    }

    /// Iterate over all registered listeners.
    pub fn listeners(&self) -> impl Iterator<Item = &Listener> {
        self.listeners.iter()
    }
}
