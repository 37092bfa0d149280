use std::rc::Rc;

use acorn_cfg::{Document, Fields, Value};
use acorn_core::{
    ClassRegistry, DuplicatePolicy, Entity, EntityClass, EntityId, Environment, NodeKind,
};

use crate::error::{BuildError, BuildResult};
use crate::interface::Interface;
use crate::resolve::{resolve, spread};

/// Field naming the class that constructs an item.
pub const CLASS_KEY: &str = "class";
/// Field naming the layer an item is parented under.
pub const PARENT_LAYER_KEY: &str = "parent_layer";
/// Field opting an item out of model registration.
pub const ADD_TO_MODEL_KEY: &str = "add_to_model";

/// Section of bare group names.
pub const GROUPS_SECTION: &str = "groups";
/// Section of layer items.
pub const LAYERS_SECTION: &str = "layers";
/// Section of sprite items.
pub const POPULATE_SECTION: &str = "populate";

/// Build-time knobs.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// What happens when two items claim the same model name.
    pub duplicates: DuplicatePolicy,
}

impl BuildOptions {
    /// The default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the duplicate-name policy.
    pub fn with_duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }
}

/// Everything a build needs besides the document: the registered
/// classes, the registered interfaces, and the build options.
///
/// Building walks the document in a fixed order: groups, then entity
/// construction (layers before sprites), then data sections, then
/// layer parenting, then per-item field application and interface
/// bindings. Names are resolvable from the moment their item is
/// constructed, so fields can refer to anything the document declares.
#[derive(Debug, Clone)]
pub struct Context {
    classes: ClassRegistry,
    interfaces: Vec<Interface>,
    options: BuildOptions,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// A context with the built-in classes and no interfaces.
    pub fn new() -> Self {
        Self {
            classes: ClassRegistry::with_defaults(),
            interfaces: Vec::new(),
            options: BuildOptions::new(),
        }
    }

    /// Register a class for documents to instantiate.
    pub fn register_class(&mut self, class: EntityClass) {
        self.classes.register(class);
    }

    /// Register an interface for items to bind.
    pub fn register_interface(&mut self, interface: Interface) {
        self.interfaces.push(interface);
    }

    /// Replace the build options.
    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// The registered classes.
    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|i| i.name() == name)
    }

    /// Build a live environment from a document.
    pub fn build(&self, name: &str, doc: &Document) -> BuildResult<Environment> {
        let mut env = Environment::with_classes(
            name,
            Rc::new(self.classes.clone()),
            self.options.duplicates,
        );

        if let Some(section) = doc.get(GROUPS_SECTION) {
            for (item, _) in section.iter() {
                env.add_group(item)?;
            }
        }

        // layers first so sprites and data can refer to them
        let mut constructed: Vec<(EntityId, String, Fields)> = Vec::new();
        for section_name in [LAYERS_SECTION, POPULATE_SECTION] {
            let Some(section) = doc.get(section_name) else {
                continue;
            };
            for (item, fields) in section.iter() {
                let id = self.construct(&mut env, item, fields)?;
                constructed.push((id, item.to_string(), fields.clone()));
            }
        }

        for (section_name, section) in doc.iter() {
            if matches!(
                section_name,
                GROUPS_SECTION | LAYERS_SECTION | POPULATE_SECTION
            ) {
                continue;
            }
            for (item, fields) in section.iter() {
                let mut entries = Vec::with_capacity(fields.len());
                for (key, value) in fields.iter() {
                    if key == ADD_TO_MODEL_KEY {
                        continue;
                    }
                    entries.push((key.to_string(), resolve(&env, value)));
                }
                if registers(fields) {
                    env.insert_data(item, acorn_core::Resolved::Map(entries))?;
                }
            }
        }

        for (id, item, fields) in &constructed {
            self.parent(&mut env, *id, item, fields)?;
        }

        for (id, _, fields) in &constructed {
            self.apply_fields(&mut env, *id, fields)?;
        }
        for (id, _, fields) in &constructed {
            self.apply_interfaces(&mut env, *id, fields)?;
        }

        Ok(env)
    }

    /// Construct and register one entity item after the initial build.
    ///
    /// The entity goes through the same motions a built item does:
    /// construction, root parenting for layers, field application,
    /// interface bindings.
    pub fn spawn(
        &self,
        env: &mut Environment,
        item: &str,
        fields: &Fields,
    ) -> BuildResult<EntityId> {
        let id = self.construct(env, item, fields)?;
        self.parent(env, id, item, fields)?;
        self.apply_fields(env, id, fields)?;
        self.apply_interfaces(env, id, fields)?;
        Ok(id)
    }

    fn construct(
        &self,
        env: &mut Environment,
        item: &str,
        fields: &Fields,
    ) -> BuildResult<EntityId> {
        let class_name = fields
            .get(CLASS_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| BuildError::MissingClass(item.to_string()))?;
        let class = self
            .classes
            .get(class_name)
            .ok_or_else(|| BuildError::UnknownClass {
                item: item.to_string(),
                class: class_name.to_string(),
            })?;
        let entity = class.construct(item);
        let id = if registers(fields) {
            env.add_entity(entity)?
        } else {
            env.adopt_entity(entity)
        };
        Ok(id)
    }

    fn parent(
        &self,
        env: &mut Environment,
        id: EntityId,
        item: &str,
        fields: &Fields,
    ) -> BuildResult<()> {
        if !matches!(env.entity(id)?.kind(), NodeKind::Layer { .. }) {
            return Ok(());
        }
        match fields.get(PARENT_LAYER_KEY) {
            // the structural default is not a tracked change
            None => env.set_parent_layer(id, env.root(), false)?,
            Some(value) => {
                let parent_name = value.as_str().ok_or_else(|| BuildError::BadParent {
                    item: item.to_string(),
                    parent: value.to_string(),
                })?;
                let parent = env
                    .find_entity(parent_name)
                    .filter(|p| {
                        env.entity(*p)
                            .is_ok_and(|e| matches!(e.kind(), NodeKind::Layer { .. }))
                    })
                    .ok_or_else(|| BuildError::BadParent {
                        item: item.to_string(),
                        parent: parent_name.to_string(),
                    })?;
                env.set_parent_layer(id, parent, true)?;
            }
        }
        Ok(())
    }

    /// Apply an item's fields through its class's setter table.
    ///
    /// The class's `init_order` fields go first; the rest follow in
    /// document order. A field with no setter is reported and skipped.
    fn apply_fields(
        &self,
        env: &mut Environment,
        id: EntityId,
        fields: &Fields,
    ) -> BuildResult<()> {
        let class_name = env.entity(id)?.class_name().to_string();
        let Some(class) = self.classes.get(&class_name) else {
            return Err(BuildError::UnknownClass {
                item: env.entity(id)?.name().to_string(),
                class: class_name,
            });
        };

        let mut ordered: Vec<&str> = Vec::new();
        for field in class.init_order() {
            if fields.contains(field) && !ordered.contains(&field.as_str()) {
                ordered.push(field);
            }
        }
        for key in fields.keys() {
            if !ordered.contains(&key) {
                ordered.push(key);
            }
        }

        for field in ordered {
            if matches!(field, CLASS_KEY | PARENT_LAYER_KEY | ADD_TO_MODEL_KEY)
                || self.interface(field).is_some()
            {
                continue;
            }
            let Some(value) = fields.get(field) else {
                continue;
            };
            match class.setter(field) {
                Some(setter) => {
                    let resolved = resolve(env, value);
                    let rendered = resolved.to_value(env);
                    setter(env, id, &spread(resolved))?;
                    env.log_change(id, field, rendered)?;
                }
                None => {
                    log::warn!(
                        "class \"{class_name}\" has no setter for field \"{field}\", skipping"
                    );
                }
            }
        }
        Ok(())
    }

    fn apply_interfaces(
        &self,
        env: &mut Environment,
        id: EntityId,
        fields: &Fields,
    ) -> BuildResult<()> {
        for interface in &self.interfaces {
            if let Some(binding) = fields.get(interface.name()) {
                interface.apply(env, id, binding)?;
            }
        }
        Ok(())
    }
}

fn registers(fields: &Fields) -> bool {
    fields
        .get(ADD_TO_MODEL_KEY)
        .and_then(Value::as_bool)
        .unwrap_or(true)
}
