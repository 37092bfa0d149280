use std::collections::HashMap;
use std::rc::Rc;

use acorn_cfg::Value;
use acorn_core::{CoreResult, EntityId, Environment, ModelEntry, Resolved, UpdateMethod};

use crate::error::{BuildError, BuildResult};
use crate::resolve::{resolve, spread};

/// A command an interface exposes to configuration.
pub type InterfaceFn = Rc<dyn Fn(&mut Environment, EntityId, &[Resolved]) -> CoreResult<()>>;

#[derive(Clone)]
enum Command {
    /// Run once while the entity is being built.
    Immediate(InterfaceFn),
    /// Run on every frame of the entity's update routine.
    PerFrame(InterfaceFn),
}

/// A named command table applied to entities through configuration.
///
/// An item binds an interface by using the interface's name as a
/// field; the binding is either an inline mapping or the name of a
/// data item holding one. Every field of the binding must name a
/// registered command, or fall through to a setter of the entity's
/// class; anything else fails the build.
#[derive(Clone)]
pub struct Interface {
    name: String,
    init_order: Vec<String>,
    commands: HashMap<String, Command>,
}

impl Interface {
    /// An interface with an empty command table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            init_order: Vec::new(),
            commands: HashMap::new(),
        }
    }

    /// The interface's name, which is also its binding field.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Commands to apply first, in order, before all remaining fields.
    pub fn with_init_order(mut self, fields: Vec<String>) -> Self {
        self.init_order = fields;
        self
    }

    /// Register a command that runs once during the build.
    pub fn on_call(mut self, field: impl Into<String>, command: InterfaceFn) -> Self {
        self.commands.insert(field.into(), Command::Immediate(command));
        self
    }

    /// Register a command that attaches itself to the entity's update
    /// routine and runs every frame.
    pub fn on_update(mut self, field: impl Into<String>, command: InterfaceFn) -> Self {
        self.commands.insert(field.into(), Command::PerFrame(command));
        self
    }

    /// Apply a binding to an entity.
    pub(crate) fn apply(
        &self,
        env: &mut Environment,
        id: EntityId,
        binding: &Value,
    ) -> BuildResult<()> {
        let entries: Vec<(String, Resolved)> = match binding {
            Value::Map(fields) => fields
                .iter()
                .map(|(key, value)| (key.to_string(), resolve(env, value)))
                .collect(),
            Value::Str(name) => match env.find(name) {
                Some(ModelEntry::Data(Resolved::Map(entries))) => entries.clone(),
                _ => return Err(BuildError::UnresolvedName(name.clone())),
            },
            _ => {
                return Err(BuildError::UnresolvedName(binding.to_string()));
            }
        };

        let mut ordered: Vec<&(String, Resolved)> = Vec::new();
        for field in &self.init_order {
            if let Some(entry) = entries.iter().find(|(key, _)| key == field) {
                ordered.push(entry);
            }
        }
        for entry in &entries {
            if !self.init_order.contains(&entry.0) {
                ordered.push(entry);
            }
        }

        for (field, resolved) in ordered {
            // a bare flag binds the command with no arguments
            let args = match resolved {
                Resolved::Value(Value::Bool(true)) => Vec::new(),
                other => spread(other.clone()),
            };
            match self.commands.get(field) {
                Some(Command::Immediate(command)) => command(env, id, &args)?,
                Some(Command::PerFrame(command)) => {
                    let command = Rc::clone(command);
                    env.add_update_method(
                        id,
                        UpdateMethod::Custom {
                            name: format!("{}.{}", self.name, field),
                            run: Rc::new(move |env, id| command(env, id, &args)),
                        },
                    )?;
                }
                None => {
                    let setter = env
                        .entity(id)
                        .ok()
                        .and_then(|entity| env.classes().get(entity.class_name()))
                        .and_then(|class| class.setter(field));
                    match setter {
                        Some(setter) => setter(env, id, &args)?,
                        None => {
                            return Err(BuildError::UnknownInterfaceMethod {
                                interface: self.name.clone(),
                                method: field.clone(),
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Interface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut commands: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        commands.sort_unstable();
        f.debug_struct("Interface")
            .field("name", &self.name)
            .field("init_order", &self.init_order)
            .field("commands", &commands)
            .finish()
    }
}
