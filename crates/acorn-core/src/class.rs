use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use acorn_cfg::{Fields, Value};

use crate::entity::{Entity, EntityId, GroupId};
use crate::environment::Environment;
use crate::error::{CoreError, CoreResult};
use crate::event::Event;

/// A configuration value after name resolution.
///
/// Resolution turns strings that name model entries into references
/// to the things they name; everything else stays a literal value.
#[derive(Debug, Clone)]
pub enum Resolved {
    /// A literal value.
    Value(Value),
    /// A reference to a registered entity.
    Entity(EntityId),
    /// A reference to a registered group.
    Group(GroupId),
    /// A reference to a registered class, by name.
    Class(String),
    /// The `model` keyword: the environment's whole model.
    Model,
    /// A list with each element resolved.
    List(Vec<Resolved>),
    /// A mapping with each value resolved.
    Map(Vec<(String, Resolved)>),
}

impl Resolved {
    /// Literal-value view.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Resolved::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Numeric view of a literal value.
    pub fn as_f64(&self) -> Option<f64> {
        self.as_value().and_then(Value::as_f64)
    }

    /// Boolean view of a literal value.
    pub fn as_bool(&self) -> Option<bool> {
        self.as_value().and_then(Value::as_bool)
    }

    /// String view of a literal value.
    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    /// Entity-reference view.
    pub fn as_entity(&self) -> Option<EntityId> {
        match self {
            Resolved::Entity(id) => Some(*id),
            _ => None,
        }
    }

    /// Group-reference view.
    pub fn as_group(&self) -> Option<GroupId> {
        match self {
            Resolved::Group(id) => Some(*id),
            _ => None,
        }
    }

    /// Render back to a configuration value, references by name.
    pub fn to_value(&self, env: &Environment) -> Value {
        match self {
            Resolved::Value(v) => v.clone(),
            Resolved::Entity(id) => match env.entity(*id) {
                Ok(entity) => Value::Str(entity.name().to_string()),
                Err(_) => Value::Str(id.to_string()),
            },
            Resolved::Group(id) => match env.group(*id) {
                Ok(group) => Value::Str(group.name().to_string()),
                Err(_) => Value::Str(id.to_string()),
            },
            Resolved::Class(name) => Value::Str(name.clone()),
            Resolved::Model => Value::Str("model".to_string()),
            Resolved::List(items) => {
                Value::List(items.iter().map(|r| r.to_value(env)).collect())
            }
            Resolved::Map(entries) => {
                let mut fields = Fields::new();
                for (key, value) in entries {
                    fields.insert(key.clone(), value.to_value(env));
                }
                Value::Map(fields)
            }
        }
    }
}

/// A named attribute setter: applies resolved arguments to an entity.
pub type SetterFn = Rc<dyn Fn(&mut Environment, EntityId, &[Resolved]) -> CoreResult<()>>;

/// A named event handler: the class's reaction to a handled event.
pub type HandlerFn = Rc<dyn Fn(&mut Environment, EntityId, &Event) -> CoreResult<()>>;

/// Whether a class constructs layers or sprites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    /// Container entities.
    Layer,
    /// Leaf entities.
    Sprite,
}

/// A constructor plus its setter and handler tables.
///
/// Setters are the only way configuration fields reach an entity:
/// a field with no setter entry is reported and skipped, never
/// dispatched by string onto some method that happens to share its
/// name. `init_order` lets a class front-load fields that others
/// depend on.
#[derive(Clone)]
pub struct EntityClass {
    name: String,
    kind: ClassKind,
    init_order: Vec<String>,
    setters: HashMap<String, SetterFn>,
    handlers: HashMap<String, HandlerFn>,
}

fn two_numbers(method: &str, args: &[Resolved]) -> CoreResult<(f64, f64)> {
    match args {
        [x, y] => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(CoreError::arguments(method, "expected two numbers")),
        },
        _ => Err(CoreError::arguments(method, "expected two numbers")),
    }
}

impl EntityClass {
    fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        let mut class = Self {
            name: name.into(),
            kind,
            init_order: Vec::new(),
            setters: HashMap::new(),
            handlers: HashMap::new(),
        };
        class.setters.insert(
            "size".to_string(),
            Rc::new(|env, id, args| {
                let (w, h) = two_numbers("size", args)?;
                env.set_size(id, w, h)
            }),
        );
        class.setters.insert(
            "position".to_string(),
            Rc::new(|env, id, args| {
                let (x, y) = two_numbers("position", args)?;
                env.set_position(id, x, y)
            }),
        );
        class.setters.insert(
            "visible".to_string(),
            Rc::new(|env, id, args| match args {
                [arg] => match arg.as_bool() {
                    Some(visible) => env.set_visible(id, visible),
                    None => Err(CoreError::arguments("visible", "expected a boolean")),
                },
                _ => Err(CoreError::arguments("visible", "expected a boolean")),
            }),
        );
        class
    }

    /// A layer-constructing class with the base setters plus `groups`.
    pub fn layer(name: impl Into<String>) -> Self {
        let mut class = Self::new(name, ClassKind::Layer);
        class.setters.insert(
            "groups".to_string(),
            Rc::new(|env, id, args| {
                let mut groups = Vec::with_capacity(args.len());
                for arg in args {
                    match arg.as_group() {
                        Some(group) => groups.push(group),
                        None => {
                            return Err(CoreError::arguments("groups", "expected group names"))
                        }
                    }
                }
                env.set_groups(id, groups)
            }),
        );
        class
    }

    /// A sprite-constructing class with the base setters plus `group`.
    pub fn sprite(name: impl Into<String>) -> Self {
        let mut class = Self::new(name, ClassKind::Sprite);
        class.setters.insert(
            "group".to_string(),
            Rc::new(|env, id, args| match args {
                [arg] => match arg.as_group() {
                    Some(group) => env.set_group(id, group),
                    None => Err(CoreError::arguments("group", "expected a group name")),
                },
                _ => Err(CoreError::arguments("group", "expected a group name")),
            }),
        );
        class
    }

    /// The class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the class constructs layers or sprites.
    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    /// Fields to apply first, in order, before all remaining fields.
    pub fn init_order(&self) -> &[String] {
        &self.init_order
    }

    /// Set the fields to apply first.
    pub fn with_init_order(mut self, fields: Vec<String>) -> Self {
        self.init_order = fields;
        self
    }

    /// Register a setter, replacing any base setter of the same name.
    pub fn with_setter(mut self, field: impl Into<String>, setter: SetterFn) -> Self {
        self.setters.insert(field.into(), setter);
        self
    }

    /// Register an event handler.
    pub fn with_handler(mut self, event: impl Into<String>, handler: HandlerFn) -> Self {
        self.handlers.insert(event.into(), handler);
        self
    }

    /// Look up a setter by field name.
    pub fn setter(&self, field: &str) -> Option<SetterFn> {
        self.setters.get(field).cloned()
    }

    /// Whether the class has a setter for the field.
    pub fn has_setter(&self, field: &str) -> bool {
        self.setters.contains_key(field)
    }

    /// Look up an event handler by event name.
    pub fn handler(&self, event: &str) -> Option<HandlerFn> {
        self.handlers.get(event).cloned()
    }

    /// Construct a bare entity of this class.
    pub fn construct(&self, name: &str) -> Entity {
        match self.kind {
            ClassKind::Layer => Entity::new_layer(name, &self.name),
            ClassKind::Sprite => Entity::new_sprite(name, &self.name),
        }
    }
}

impl fmt::Debug for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut setters: Vec<&str> = self.setters.keys().map(String::as_str).collect();
        setters.sort_unstable();
        let mut handlers: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        handlers.sort_unstable();
        f.debug_struct("EntityClass")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("init_order", &self.init_order)
            .field("setters", &setters)
            .field("handlers", &handlers)
            .finish()
    }
}

/// The set of classes a build may instantiate.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, EntityClass>,
}

impl ClassRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in `Layer`, `Environment`, and
    /// `Sprite` classes.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(EntityClass::layer("Layer"));
        registry.register(EntityClass::layer("Environment"));
        registry.register(EntityClass::sprite("Sprite"));
        registry
    }

    /// Register a class, replacing any previous class of the same name.
    pub fn register(&mut self, class: EntityClass) {
        self.classes.insert(class.name().to_string(), class);
    }

    /// Look up a class by name.
    pub fn get(&self, name: &str) -> Option<&EntityClass> {
        self.classes.get(name)
    }

    /// Whether a class with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_built_in_classes() {
        let registry = ClassRegistry::with_defaults();
        assert!(registry.contains("Layer"));
        assert!(registry.contains("Environment"));
        assert!(registry.contains("Sprite"));
        assert!(!registry.contains("Soldier"));
    }

    #[test]
    fn base_setters_present() {
        let class = EntityClass::sprite("Soldier");
        assert!(class.has_setter("position"));
        assert!(class.has_setter("size"));
        assert!(class.has_setter("visible"));
        assert!(class.has_setter("group"));
        assert!(!class.has_setter("groups"));

        let layer = EntityClass::layer("Hud");
        assert!(layer.has_setter("groups"));
        assert!(!layer.has_setter("group"));
    }

    #[test]
    fn construct_matches_the_class_kind() {
        let soldier = EntityClass::sprite("Soldier").construct("grunt");
        assert_eq!(soldier.class_name(), "Soldier");
        assert!(matches!(soldier.kind(), crate::entity::NodeKind::Sprite { .. }));

        let hud = EntityClass::layer("Hud").construct("overlay");
        assert!(matches!(hud.kind(), crate::entity::NodeKind::Layer { .. }));
    }
}
