use std::rc::Rc;

use acorn_cfg::{Document, Fields, Section, Value};

use crate::class::ClassRegistry;
use crate::clock::{Timer, TimerHook};
use crate::entity::{Entity, EntityId, GroupId, NodeKind, UpdateMethod};
use crate::error::{CoreError, CoreResult};
use crate::event::{Event, Listener};
use crate::graphics::Canvas;
use crate::group::Group;

/// What a registered model name refers to.
#[derive(Debug, Clone)]
pub enum ModelEntry {
    /// A live entity.
    Entity(EntityId),
    /// A live group.
    Group(GroupId),
    /// A resolved data value.
    Data(crate::class::Resolved),
}

/// What happens when a model name is registered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Silently replace the earlier entry.
    Overwrite,
    /// Replace the earlier entry and log a warning.
    #[default]
    Warn,
    /// Fail the registration.
    Reject,
}

/// The entity graph: an arena of entities and groups under one root
/// layer, plus the model mapping names to everything registered.
///
/// All tracked mutation goes through the environment so that every
/// change lands in the owning entity's change log; serialization is
/// nothing but those logs written back out as a document.
#[derive(Debug)]
pub struct Environment {
    name: String,
    entities: Vec<Entity>,
    groups: Vec<Group>,
    model: Vec<(String, ModelEntry)>,
    root: EntityId,
    classes: Rc<ClassRegistry>,
    duplicates: DuplicatePolicy,
}

impl Environment {
    /// An environment with the built-in classes and the default
    /// duplicate policy.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_classes(
            name,
            Rc::new(ClassRegistry::with_defaults()),
            DuplicatePolicy::default(),
        )
    }

    /// An environment with an explicit class registry and duplicate
    /// policy. The root layer is constructed by the `Environment`
    /// class and registered under the name `environment`.
    pub fn with_classes(
        name: impl Into<String>,
        classes: Rc<ClassRegistry>,
        duplicates: DuplicatePolicy,
    ) -> Self {
        let name = name.into();
        let root_entity = match classes.get("Environment") {
            Some(class) => class.construct(&name),
            None => Entity::new_layer(&name, "Environment"),
        };
        let mut env = Self {
            name,
            entities: vec![root_entity],
            groups: Vec::new(),
            model: Vec::new(),
            root: EntityId(0),
            classes,
            duplicates,
        };
        env.model
            .push(("environment".to_string(), ModelEntry::Entity(env.root)));
        env
    }

    /// The environment's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The root layer.
    pub fn root(&self) -> EntityId {
        self.root
    }

    /// The classes this environment instantiates from.
    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    /// Look up an entity by id.
    pub fn entity(&self, id: EntityId) -> CoreResult<&Entity> {
        self.entities.get(id.0).ok_or(CoreError::EntityNotFound(id))
    }

    /// Look up an entity by id, mutably.
    pub fn entity_mut(&mut self, id: EntityId) -> CoreResult<&mut Entity> {
        self.entities
            .get_mut(id.0)
            .ok_or(CoreError::EntityNotFound(id))
    }

    /// Look up a group by id.
    pub fn group(&self, id: GroupId) -> CoreResult<&Group> {
        self.groups.get(id.0).ok_or(CoreError::GroupNotFound(id))
    }

    fn group_mut(&mut self, id: GroupId) -> CoreResult<&mut Group> {
        self.groups.get_mut(id.0).ok_or(CoreError::GroupNotFound(id))
    }

    /// Register a name in the model, applying the duplicate policy.
    fn register(&mut self, name: &str, entry: ModelEntry) -> CoreResult<()> {
        match self.model.iter_mut().find(|(n, _)| n == name) {
            Some(existing) => match self.duplicates {
                DuplicatePolicy::Reject => {
                    return Err(CoreError::DuplicateName(name.to_string()));
                }
                DuplicatePolicy::Warn => {
                    log::warn!("model name \"{name}\" registered twice, replacing");
                    existing.1 = entry;
                }
                DuplicatePolicy::Overwrite => existing.1 = entry,
            },
            None => self.model.push((name.to_string(), entry)),
        }
        Ok(())
    }

    /// Add an entity to the arena and register it under its name.
    pub fn add_entity(&mut self, entity: Entity) -> CoreResult<EntityId> {
        let name = entity.name().to_string();
        if self.duplicates == DuplicatePolicy::Reject
            && self.model.iter().any(|(n, _)| *n == name)
        {
            return Err(CoreError::DuplicateName(name));
        }
        let id = self.adopt_entity(entity);
        self.register(&name, ModelEntry::Entity(id))?;
        Ok(id)
    }

    /// Add an entity to the arena without registering its name.
    pub fn adopt_entity(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.entities.len());
        self.entities.push(entity);
        id
    }

    /// Create a group and register it under its name.
    pub fn add_group(&mut self, name: impl Into<String>) -> CoreResult<GroupId> {
        let name = name.into();
        if self.duplicates == DuplicatePolicy::Reject
            && self.model.iter().any(|(n, _)| *n == name)
        {
            return Err(CoreError::DuplicateName(name));
        }
        let id = GroupId(self.groups.len());
        self.groups.push(Group::new(name.clone()));
        self.register(&name, ModelEntry::Group(id))?;
        Ok(id)
    }

    /// Register a resolved data value under a name.
    pub fn insert_data(&mut self, name: &str, value: crate::class::Resolved) -> CoreResult<()> {
        self.register(name, ModelEntry::Data(value))
    }

    /// Look up a model entry by name.
    pub fn find(&self, name: &str) -> Option<&ModelEntry> {
        self.model.iter().find(|(n, _)| n == name).map(|(_, e)| e)
    }

    /// Look up an entity id by model name.
    pub fn find_entity(&self, name: &str) -> Option<EntityId> {
        match self.find(name) {
            Some(ModelEntry::Entity(id)) => Some(*id),
            _ => None,
        }
    }

    /// Look up a group id by model name.
    pub fn find_group(&self, name: &str) -> Option<GroupId> {
        match self.find(name) {
            Some(ModelEntry::Group(id)) => Some(*id),
            _ => None,
        }
    }

    /// Iterate over the model in registration order.
    pub fn model(&self) -> impl Iterator<Item = (&str, &ModelEntry)> {
        self.model.iter().map(|(n, e)| (n.as_str(), e))
    }

    /// Record a tracked field directly on an entity's change log.
    pub fn log_change(&mut self, id: EntityId, key: &str, value: Value) -> CoreResult<()> {
        self.entity_mut(id)?.log_change(key, value);
        Ok(())
    }

    /// Move an entity to an absolute position.
    pub fn set_position(&mut self, id: EntityId, x: f64, y: f64) -> CoreResult<()> {
        let entity = self.entity_mut(id)?;
        entity.set_position((x, y));
        entity.log_change(
            "position",
            Value::List(vec![Value::from_f64(x), Value::from_f64(y)]),
        );
        Ok(())
    }

    /// Move an entity by a delta.
    pub fn move_by(&mut self, id: EntityId, dx: f64, dy: f64) -> CoreResult<()> {
        let (x, y) = self.entity(id)?.position();
        self.set_position(id, x + dx, y + dy)
    }

    /// Resize an entity.
    pub fn set_size(&mut self, id: EntityId, width: f64, height: f64) -> CoreResult<()> {
        let entity = self.entity_mut(id)?;
        entity.set_size((width, height));
        entity.log_change(
            "size",
            Value::List(vec![Value::from_f64(width), Value::from_f64(height)]),
        );
        Ok(())
    }

    /// Show or hide an entity and its subtree.
    pub fn set_visible(&mut self, id: EntityId, visible: bool) -> CoreResult<()> {
        let entity = self.entity_mut(id)?;
        entity.set_visible(visible);
        entity.log_change("visible", Value::Bool(visible));
        Ok(())
    }

    /// Put a sprite into a group, leaving its previous group if any.
    pub fn set_group(&mut self, id: EntityId, gid: GroupId) -> CoreResult<()> {
        self.group(gid)?;
        let previous = match self.entity_mut(id)?.kind_mut() {
            NodeKind::Sprite { group } => std::mem::replace(group, Some(gid)),
            NodeKind::Layer { .. } => {
                return Err(CoreError::arguments("group", "entity is not a sprite"));
            }
        };
        if let Some(prev) = previous {
            if prev != gid {
                self.group_mut(prev)?.remove_member(id);
            }
        }
        self.group_mut(gid)?.add_member(id);
        let group_name = self.group(gid)?.name().to_string();
        self.entity_mut(id)?.log_change("group", Value::Str(group_name));
        Ok(())
    }

    /// Assign the sprite groups a layer updates and draws.
    pub fn set_groups(&mut self, id: EntityId, group_ids: Vec<GroupId>) -> CoreResult<()> {
        let mut names = Vec::with_capacity(group_ids.len());
        for gid in &group_ids {
            names.push(Value::Str(self.group(*gid)?.name().to_string()));
        }
        match self.entity_mut(id)?.kind_mut() {
            NodeKind::Layer { groups, .. } => *groups = group_ids,
            NodeKind::Sprite { .. } => {
                return Err(CoreError::arguments("groups", "entity is not a layer"));
            }
        }
        self.entity_mut(id)?.log_change("groups", Value::List(names));
        Ok(())
    }

    /// Parent one layer under another, leaving any former parent.
    ///
    /// Parenting done by the builder as a structural default is not
    /// recorded; pass `record` to log the relation for serialization.
    pub fn set_parent_layer(
        &mut self,
        child: EntityId,
        parent: EntityId,
        record: bool,
    ) -> CoreResult<()> {
        if child == parent {
            return Err(CoreError::arguments(
                "parent_layer",
                "a layer cannot be its own parent",
            ));
        }
        if !matches!(self.entity(parent)?.kind(), NodeKind::Layer { .. }) {
            return Err(CoreError::arguments("parent_layer", "parent is not a layer"));
        }
        let former = match self.entity_mut(child)?.kind_mut() {
            NodeKind::Layer { parent: p, .. } => std::mem::replace(p, Some(parent)),
            NodeKind::Sprite { .. } => {
                return Err(CoreError::arguments("parent_layer", "entity is not a layer"));
            }
        };
        if let Some(former) = former {
            if let NodeKind::Layer { sub_layers, .. } = self.entity_mut(former)?.kind_mut() {
                sub_layers.retain(|c| *c != child);
            }
        }
        if let NodeKind::Layer { sub_layers, .. } = self.entity_mut(parent)?.kind_mut() {
            if !sub_layers.contains(&child) {
                sub_layers.push(child);
            }
        }
        if record {
            let parent_name = self.entity(parent)?.name().to_string();
            self.entity_mut(child)?
                .log_change("parent_layer", Value::Str(parent_name));
        }
        Ok(())
    }

    /// Append a step to an entity's update routine.
    pub fn add_update_method(&mut self, id: EntityId, method: UpdateMethod) -> CoreResult<()> {
        self.entity_mut(id)?.add_update_method(method);
        Ok(())
    }

    /// Schedule an event on an entity's clock.
    ///
    /// The event starts counting on the entity's next update. A lerped
    /// event is handled every frame of its duration; otherwise it is
    /// handled once when its timer switches off. A linked follow-up is
    /// scheduled at switch-off either way.
    pub fn queue_event(&mut self, id: EntityId, mut event: Event) -> CoreResult<()> {
        let link = event.take_link();
        let mut timer = Timer::new(&event.name, event.duration)?.with_temp(event.temp);
        let payload = event;
        if payload.lerp {
            timer.on_tick = TimerHook::Handle(payload);
            if let Some(link) = link {
                timer.on_switch_off = TimerHook::Queue(link);
            }
        } else {
            timer.on_switch_off = match link {
                Some(link) => TimerHook::HandleThenQueue(payload, link),
                None => TimerHook::Handle(payload),
            };
        }
        self.entity_mut(id)?.clock_mut().add_timer(timer);
        Ok(())
    }

    /// Handle an event on an entity right now.
    ///
    /// Runs the class handler, then notifies listeners: each one's
    /// response, stamped with the heard event as its trigger, is
    /// handled on the listener's target. Pausing a name suppresses
    /// only the class handler; listeners still hear the event. A
    /// missing target entity is a silent no-op.
    pub fn handle_event(&mut self, id: EntityId, event: &Event) -> CoreResult<()> {
        let Some(entity) = self.entities.get(id.0) else {
            return Ok(());
        };
        let handler = if entity.events().is_paused(&event.name) {
            None
        } else {
            self.classes
                .get(entity.class_name())
                .and_then(|class| class.handler(&event.name))
        };
        if let Some(handler) = handler {
            handler(self, id, event)?;
        }

        let listeners = match self.entities.get(id.0) {
            Some(entity) => entity.events().matching(&event.name),
            None => return Ok(()),
        };
        for listener in listeners {
            let mut response = listener.response.clone().unwrap_or_else(|| event.clone());
            let mut cause = event.clone();
            cause.trigger = None;
            response.trigger = Some(Box::new(cause));
            let target = listener.target.unwrap_or(id);
            self.handle_event(target, &response)?;
            if listener.temp {
                if let Some(entity) = self.entities.get_mut(id.0) {
                    entity.events_mut().remove_exact(&listener);
                }
            }
        }
        Ok(())
    }

    /// Register a listener on an entity.
    pub fn add_listener(&mut self, id: EntityId, listener: Listener) -> CoreResult<()> {
        self.entity_mut(id)?.events_mut().add_listener(listener);
        Ok(())
    }

    /// Remove listeners the specification selects. Returns the count.
    pub fn remove_listener(&mut self, id: EntityId, spec: &Listener) -> CoreResult<usize> {
        Ok(self.entity_mut(id)?.events_mut().remove_listener(spec))
    }

    /// Whether an entity has a listener for the named event.
    pub fn listening_for(&self, id: EntityId, name: &str) -> bool {
        self.entities
            .get(id.0)
            .is_some_and(|e| e.events().listening_for(name))
    }

    /// Suppress an event name on an entity.
    pub fn pause_event(&mut self, id: EntityId, name: &str) -> CoreResult<()> {
        self.entity_mut(id)?.events_mut().pause(name);
        Ok(())
    }

    /// Resume a suppressed event name on an entity.
    pub fn unpause_event(&mut self, id: EntityId, name: &str) -> CoreResult<()> {
        self.entity_mut(id)?.events_mut().unpause(name);
        Ok(())
    }

    fn dispatch(&mut self, id: EntityId, hook: TimerHook) -> CoreResult<()> {
        match hook {
            TimerHook::None => Ok(()),
            TimerHook::Handle(event) => self.handle_event(id, &event),
            TimerHook::Queue(event) => self.queue_event(id, event),
            TimerHook::HandleThenQueue(now, later) => {
                self.handle_event(id, &now)?;
                self.queue_event(id, later)
            }
        }
    }

    /// Advance the whole graph one frame, starting at the root.
    pub fn update(&mut self) -> CoreResult<()> {
        self.update_entity(self.root)
    }

    /// Run one entity's update routine.
    pub fn update_entity(&mut self, id: EntityId) -> CoreResult<()> {
        let methods = match self.entities.get(id.0) {
            Some(entity) => entity.update_methods().to_vec(),
            None => return Ok(()),
        };
        for method in methods {
            match method {
                UpdateMethod::ClockTick => {
                    let hooks = self.entity_mut(id)?.clock_mut().tick();
                    for hook in hooks {
                        self.dispatch(id, hook)?;
                    }
                }
                UpdateMethod::RefreshGraphics => {
                    if let Some(graphics) = self.entity_mut(id)?.graphics_mut() {
                        graphics.refresh();
                    }
                }
                UpdateMethod::UpdateSprites => {
                    let group_ids = match self.entities.get(id.0).map(|e| e.kind()) {
                        Some(NodeKind::Layer { groups, .. }) => groups.clone(),
                        _ => Vec::new(),
                    };
                    for gid in group_ids {
                        let members = self.group(gid)?.members().to_vec();
                        for member in members {
                            self.update_entity(member)?;
                        }
                    }
                }
                UpdateMethod::UpdateSubLayers => {
                    let children = match self.entities.get(id.0).map(|e| e.kind()) {
                        Some(NodeKind::Layer { sub_layers, .. }) => sub_layers.clone(),
                        _ => Vec::new(),
                    };
                    for child in children {
                        self.update_entity(child)?;
                    }
                }
                UpdateMethod::Custom { run, .. } => run(self, id)?,
            }
        }
        Ok(())
    }

    /// Draw the visible graph onto a canvas, child positions offset by
    /// their ancestors.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        self.draw_entity(self.root, (0.0, 0.0), canvas);
    }

    fn draw_entity(&self, id: EntityId, offset: (f64, f64), canvas: &mut dyn Canvas) {
        let Some(entity) = self.entities.get(id.0) else {
            return;
        };
        if !entity.visible() {
            return;
        }
        let position = (
            offset.0 + entity.position().0,
            offset.1 + entity.position().1,
        );
        if let Some(graphics) = entity.graphics() {
            graphics.draw(canvas, position);
        }
        if let NodeKind::Layer {
            sub_layers, groups, ..
        } = entity.kind()
        {
            for gid in groups {
                if let Ok(group) = self.group(*gid) {
                    for member in group.members() {
                        self.draw_entity(*member, position, canvas);
                    }
                }
            }
            for child in sub_layers {
                self.draw_entity(*child, position, canvas);
            }
        }
    }

    /// Serialize the environment's change logs back to a document.
    ///
    /// Groups become bare items, layers and sprites carry their change
    /// logs, all in model registration order. The root layer itself is
    /// not written; it is reconstructed by the next build.
    pub fn to_document(&self) -> Document {
        let mut groups = Section::new();
        let mut layers = Section::new();
        let mut populate = Section::new();

        for (name, entry) in &self.model {
            match entry {
                ModelEntry::Group(gid) => {
                    if self.group(*gid).is_ok() {
                        groups.insert(name.clone(), Fields::new());
                    }
                }
                ModelEntry::Entity(id) if *id != self.root => {
                    if let Ok(entity) = self.entity(*id) {
                        match entity.kind() {
                            NodeKind::Layer { .. } => {
                                layers.insert(name.clone(), entity.changes().clone());
                            }
                            NodeKind::Sprite { .. } => {
                                populate.insert(name.clone(), entity.changes().clone());
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        let mut doc = Document::new();
        if !groups.is_empty() {
            doc.insert("groups", groups);
        }
        if !layers.is_empty() {
            doc.insert("layers", layers);
        }
        if !populate.is_empty() {
            doc.insert("populate", populate);
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::EntityClass;
    use std::cell::RefCell;

    fn recording_class(
        name: &str,
        events: &[&str],
        log: &Rc<RefCell<Vec<(String, Option<String>)>>>,
    ) -> EntityClass {
        let mut class = EntityClass::sprite(name);
        for event in events {
            let log = Rc::clone(log);
            class = class.with_handler(
                *event,
                Rc::new(move |_env, _id, event: &Event| {
                    log.borrow_mut().push((
                        event.name.clone(),
                        event.trigger.as_deref().map(|t| t.name.clone()),
                    ));
                    Ok(())
                }),
            );
        }
        class
    }

    fn actor_environment(
        log: &Rc<RefCell<Vec<(String, Option<String>)>>>,
    ) -> (Environment, EntityId) {
        let mut registry = ClassRegistry::with_defaults();
        registry.register(recording_class(
            "Actor",
            &["spawn", "live", "die", "hit", "flinch"],
            log,
        ));
        let mut env =
            Environment::with_classes("test", Rc::new(registry), DuplicatePolicy::Warn);
        let actor = env
            .classes()
            .get("Actor")
            .unwrap()
            .construct("grunt");
        let id = env.add_entity(actor).unwrap();
        let cast = env.add_group("cast").unwrap();
        env.set_group(id, cast).unwrap();
        env.set_groups(env.root(), vec![cast]).unwrap();
        (env, id)
    }

    #[test]
    fn chained_events_run_back_to_back() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (mut env, id) = actor_environment(&log);

        let chain = Event::chain(vec![
            Event::named("spawn"),
            Event::named("live").with_duration(10.0),
            Event::named("die"),
        ])
        .unwrap();
        env.queue_event(id, chain).unwrap();

        for _ in 0..12 {
            env.update().unwrap();
        }

        let handled: Vec<String> = log.borrow().iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(handled.len(), 12);
        assert_eq!(handled[0], "spawn");
        assert!(handled[1..11].iter().all(|n| n == "live"));
        assert_eq!(handled[11], "die");
    }

    #[test]
    fn queued_event_waits_for_the_next_update() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (mut env, id) = actor_environment(&log);

        env.queue_event(id, Event::named("spawn")).unwrap();
        assert!(log.borrow().is_empty());
        env.update().unwrap();
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn non_lerp_event_handled_once_at_switch_off() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (mut env, id) = actor_environment(&log);

        env.queue_event(id, Event::named("die").with_duration(3.0).with_lerp(false))
            .unwrap();
        env.update().unwrap();
        env.update().unwrap();
        assert!(log.borrow().is_empty());
        env.update().unwrap();
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn listener_response_carries_the_trigger() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (mut env, id) = actor_environment(&log);

        env.add_listener(
            id,
            Listener::hears("hit").with_response(Event::named("flinch")),
        )
        .unwrap();
        env.handle_event(id, &Event::named("hit")).unwrap();

        let entries = log.borrow();
        assert_eq!(entries[0], ("hit".to_string(), None));
        assert_eq!(entries[1], ("flinch".to_string(), Some("hit".to_string())));
    }

    #[test]
    fn temp_listener_fires_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (mut env, id) = actor_environment(&log);

        env.add_listener(
            id,
            Listener::hears("hit")
                .with_response(Event::named("flinch"))
                .with_temp(true),
        )
        .unwrap();
        env.handle_event(id, &Event::named("hit")).unwrap();
        env.handle_event(id, &Event::named("hit")).unwrap();

        let flinches = log
            .borrow()
            .iter()
            .filter(|(n, _)| n == "flinch")
            .count();
        assert_eq!(flinches, 1);
        assert!(!env.listening_for(id, "hit"));
    }

    #[test]
    fn paused_events_are_not_handled() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (mut env, id) = actor_environment(&log);

        env.pause_event(id, "hit").unwrap();
        env.handle_event(id, &Event::named("hit")).unwrap();
        assert!(log.borrow().is_empty());

        env.unpause_event(id, "hit").unwrap();
        env.handle_event(id, &Event::named("hit")).unwrap();
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn paused_events_still_notify_listeners() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (mut env, id) = actor_environment(&log);

        env.add_listener(
            id,
            Listener::hears("hit").with_response(Event::named("flinch")),
        )
        .unwrap();
        env.pause_event(id, "hit").unwrap();
        env.handle_event(id, &Event::named("hit")).unwrap();

        // the class handler for "hit" is suppressed, the listener is not
        let entries = log.borrow();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], ("flinch".to_string(), Some("hit".to_string())));
    }

    #[test]
    fn handling_on_a_missing_entity_is_a_no_op() {
        let mut env = Environment::new("test");
        assert!(env.handle_event(EntityId(99), &Event::named("hit")).is_ok());
    }

    #[test]
    fn duplicate_names_rejected_under_strict_policy() {
        let mut env = Environment::with_classes(
            "test",
            Rc::new(ClassRegistry::with_defaults()),
            DuplicatePolicy::Reject,
        );
        env.add_group("soldiers").unwrap();
        let err = env.add_group("soldiers").unwrap_err();
        assert!(matches!(err, CoreError::DuplicateName(_)));
    }

    #[test]
    fn move_by_accumulates_and_logs_the_latest_position() {
        let mut env = Environment::new("test");
        let id = env.add_entity(Entity::new_sprite("grunt", "Sprite")).unwrap();
        env.set_position(id, 10.0, 20.0).unwrap();
        env.move_by(id, 5.0, -5.0).unwrap();

        assert_eq!(env.entity(id).unwrap().position(), (15.0, 15.0));
        assert_eq!(
            env.entity(id).unwrap().changes().get("position"),
            Some(&Value::List(vec![Value::Int(15), Value::Int(15)]))
        );
    }

    #[test]
    fn serialization_reflects_tracked_changes_only() {
        let mut env = Environment::new("test");
        let squad = env.add_group("squad").unwrap();
        let hud = env.add_entity(Entity::new_layer("hud", "Layer")).unwrap();
        env.set_parent_layer(hud, env.root(), false).unwrap();
        let grunt = env.add_entity(Entity::new_sprite("grunt", "Sprite")).unwrap();
        env.set_group(grunt, squad).unwrap();
        env.set_position(grunt, 4.0, 8.0).unwrap();

        let doc = env.to_document();
        assert!(doc.get("groups").unwrap().get("squad").is_some());

        // unrecorded structural parenting does not serialize
        let hud_fields = doc.get("layers").unwrap().get("hud").unwrap();
        assert!(hud_fields.get("parent_layer").is_none());
        assert_eq!(
            hud_fields.get("class"),
            Some(&Value::Str("Layer".to_string()))
        );

        let grunt_fields = doc.get("populate").unwrap().get("grunt").unwrap();
        assert_eq!(
            grunt_fields.get("group"),
            Some(&Value::Str("squad".to_string()))
        );
        assert_eq!(
            grunt_fields.get("position"),
            Some(&Value::List(vec![Value::Int(4), Value::Int(8)]))
        );
    }

    #[test]
    fn draw_offsets_children_by_their_ancestors() {
        use crate::graphics::{Canvas, ImageGraphics};

        #[derive(Default)]
        struct Recorder {
            blits: Vec<(String, (f64, f64))>,
        }
        impl Canvas for Recorder {
            fn blit(&mut self, image: &str, position: (f64, f64)) {
                self.blits.push((image.to_string(), position));
            }
        }

        let mut env = Environment::new("test");
        let hud = env.add_entity(Entity::new_layer("hud", "Layer")).unwrap();
        env.set_parent_layer(hud, env.root(), false).unwrap();
        env.set_position(hud, 100.0, 50.0).unwrap();

        let squad = env.add_group("squad").unwrap();
        env.set_groups(hud, vec![squad]).unwrap();
        let grunt = env.add_entity(Entity::new_sprite("grunt", "Sprite")).unwrap();
        env.set_group(grunt, squad).unwrap();
        env.set_position(grunt, 4.0, 8.0).unwrap();
        env.entity_mut(grunt)
            .unwrap()
            .set_graphics(Box::new(ImageGraphics::new("grunt")));

        let mut canvas = Recorder::default();
        env.draw(&mut canvas);
        assert_eq!(canvas.blits, vec![("grunt".to_string(), (104.0, 58.0))]);

        env.set_visible(hud, false).unwrap();
        let mut canvas = Recorder::default();
        env.draw(&mut canvas);
        assert!(canvas.blits.is_empty());
    }
}
