use std::fmt;
use std::rc::Rc;

use acorn_cfg::{Fields, Value};

use crate::clock::Clock;
use crate::error::CoreResult;
use crate::event::EventHandler;
use crate::graphics::Graphics;

/// Index of an entity in its environment's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) usize);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Index of a group in its environment's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub(crate) usize);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

/// An entity's place in the scene graph.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A container node: owns sub-layers and sprite groups.
    Layer {
        /// Parent layer, unset until the entity is parented.
        parent: Option<EntityId>,
        /// Child layers in parenting order.
        sub_layers: Vec<EntityId>,
        /// Sprite groups this layer updates and draws.
        groups: Vec<GroupId>,
    },
    /// A leaf node: belongs to at most one group.
    Sprite {
        /// The group that owns this sprite.
        group: Option<GroupId>,
    },
}

/// A user-supplied per-frame behavior.
pub type UpdateFn = Rc<dyn Fn(&mut crate::environment::Environment, EntityId) -> CoreResult<()>>;

/// One step of an entity's per-frame update routine.
#[derive(Clone)]
pub enum UpdateMethod {
    /// Advance the entity's clock and dispatch fired timer hooks.
    ClockTick,
    /// Refresh the entity's graphics.
    RefreshGraphics,
    /// Update the sprites of this layer's groups.
    UpdateSprites,
    /// Update this layer's sub-layers.
    UpdateSubLayers,
    /// Run an attached behavior.
    Custom {
        /// Name for logs and debugging.
        name: String,
        /// The behavior itself.
        run: UpdateFn,
    },
}

impl fmt::Debug for UpdateMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateMethod::ClockTick => write!(f, "ClockTick"),
            UpdateMethod::RefreshGraphics => write!(f, "RefreshGraphics"),
            UpdateMethod::UpdateSprites => write!(f, "UpdateSprites"),
            UpdateMethod::UpdateSubLayers => write!(f, "UpdateSubLayers"),
            UpdateMethod::Custom { name, .. } => write!(f, "Custom({name})"),
        }
    }
}

/// One node of the entity graph.
///
/// Entities are owned by their [`Environment`](crate::environment::Environment)
/// and referred to by [`EntityId`]. Every tracked mutation is recorded
/// in the change log, which is what serialization writes back out.
pub struct Entity {
    name: String,
    class: String,
    position: (f64, f64),
    size: (f64, f64),
    visible: bool,
    graphics: Option<Box<dyn Graphics>>,
    kind: NodeKind,
    update_methods: Vec<UpdateMethod>,
    clock: Clock,
    events: EventHandler,
    changes: Fields,
}

impl Entity {
    fn new(name: impl Into<String>, class: impl Into<String>, kind: NodeKind) -> Self {
        let class = class.into();
        let mut changes = Fields::new();
        changes.insert("class", class.as_str());
        Self {
            name: name.into(),
            class,
            position: (0.0, 0.0),
            size: (1.0, 1.0),
            visible: true,
            graphics: None,
            kind,
            update_methods: Vec::new(),
            clock: Clock::new(),
            events: EventHandler::new(),
            changes,
        }
    }

    /// Create a layer entity with the standard update routine.
    pub fn new_layer(name: impl Into<String>, class: impl Into<String>) -> Self {
        let mut entity = Self::new(
            name,
            class,
            NodeKind::Layer {
                parent: None,
                sub_layers: Vec::new(),
                groups: Vec::new(),
            },
        );
        entity.update_methods = vec![
            UpdateMethod::ClockTick,
            UpdateMethod::RefreshGraphics,
            UpdateMethod::UpdateSprites,
            UpdateMethod::UpdateSubLayers,
        ];
        entity
    }

    /// Create a sprite entity with the standard update routine.
    pub fn new_sprite(name: impl Into<String>, class: impl Into<String>) -> Self {
        let mut entity = Self::new(name, class, NodeKind::Sprite { group: None });
        entity.update_methods = vec![UpdateMethod::ClockTick, UpdateMethod::RefreshGraphics];
        entity
    }

    /// The entity's unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the class that constructed this entity.
    pub fn class_name(&self) -> &str {
        &self.class
    }

    /// Current position.
    pub fn position(&self) -> (f64, f64) {
        self.position
    }

    /// Current size.
    pub fn size(&self) -> (f64, f64) {
        self.size
    }

    /// Whether the entity and its subtree are drawn.
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// The entity's place in the scene graph.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub(crate) fn set_position(&mut self, position: (f64, f64)) {
        self.position = position;
    }

    pub(crate) fn set_size(&mut self, size: (f64, f64)) {
        self.size = size;
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Attach renderable state.
    pub fn set_graphics(&mut self, graphics: Box<dyn Graphics>) {
        self.graphics = Some(graphics);
    }

    /// The attached graphics, if any.
    pub fn graphics(&self) -> Option<&dyn Graphics> {
        self.graphics.as_deref()
    }

    pub(crate) fn graphics_mut(&mut self) -> Option<&mut (dyn Graphics + 'static)> {
        self.graphics.as_deref_mut()
    }

    /// The entity's frame clock.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Mutable access to the frame clock.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// The entity's event state.
    pub fn events(&self) -> &EventHandler {
        &self.events
    }

    /// Mutable access to the event state.
    pub fn events_mut(&mut self) -> &mut EventHandler {
        &mut self.events
    }

    /// The update routine, in execution order.
    pub fn update_methods(&self) -> &[UpdateMethod] {
        &self.update_methods
    }

    /// Append a step to the update routine.
    pub fn add_update_method(&mut self, method: UpdateMethod) {
        self.update_methods.push(method);
    }

    /// Record a tracked mutation. Re-recording a key overwrites its
    /// previous value in place, so the log stays one entry per field.
    pub fn log_change(&mut self, key: impl Into<String>, value: Value) {
        self.changes.insert(key, value);
    }

    /// The change log: every tracked field and its latest value.
    pub fn changes(&self) -> &Fields {
        &self.changes
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name)
            .field("class", &self.class)
            .field("position", &self.position)
            .field("size", &self.size)
            .field("visible", &self.visible)
            .field("kind", &self.kind)
            .field("update_methods", &self.update_methods)
            .finish_non_exhaustive()
    }
}
