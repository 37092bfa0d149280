//! End-to-end builds: text in, live environment out, text back.

use std::cell::RefCell;
use std::rc::Rc;

use acorn_cfg::{decode, encode, Value};
use acorn_core::{
    CoreError, DuplicatePolicy, EntityClass, EntityId, Environment, ModelEntry, NodeKind,
    Resolved, SetterFn,
};
use acorn_runtime::{BuildError, BuildOptions, Context, Interface};

const SCENE: &str = "\
# groups

squad

# layers

hud
\tclass: Layer
\tsize: 100, 40
\tgroups: squad,

overlay
\tclass: Layer
\tparent_layer: hud
\tposition: 10, 5

# populate

grunt
\tclass: Sprite
\tgroup: squad
\tposition: 4, 8
";

#[test]
fn build_constructs_the_scene() {
    let env = Context::new()
        .build("scene", &decode(SCENE).unwrap())
        .unwrap();

    let hud = env.find_entity("hud").unwrap();
    let overlay = env.find_entity("overlay").unwrap();
    let grunt = env.find_entity("grunt").unwrap();

    assert_eq!(env.entity(hud).unwrap().size(), (100.0, 40.0));
    let NodeKind::Layer { parent, .. } = env.entity(hud).unwrap().kind() else {
        panic!("hud should be a layer");
    };
    assert_eq!(*parent, Some(env.root()));

    let NodeKind::Layer { parent, .. } = env.entity(overlay).unwrap().kind() else {
        panic!("overlay should be a layer");
    };
    assert_eq!(*parent, Some(hud));
    assert_eq!(env.entity(overlay).unwrap().position(), (10.0, 5.0));

    assert_eq!(env.entity(grunt).unwrap().position(), (4.0, 8.0));
    let squad = env.find_group("squad").unwrap();
    assert!(env.group(squad).unwrap().contains(grunt));
}

#[test]
fn data_sections_resolve_against_the_model() {
    let text = format!(
        "{SCENE}\n# data\n\nconfig\n\ttarget: grunt\n\tbackup: phantom\n\tkind: Sprite\n"
    );
    let env = Context::new().build("scene", &decode(&text).unwrap()).unwrap();

    let Some(ModelEntry::Data(Resolved::Map(entries))) = env.find("config") else {
        panic!("config should be a data entry");
    };
    assert!(entries[0].1.as_entity().is_some());
    assert_eq!(entries[1].1.as_str(), Some("phantom"));
    assert!(matches!(entries[2].1, Resolved::Class(_)));
}

#[test]
fn missing_class_fails_the_build() {
    let text = "# populate\n\ngrunt\n\tposition: 1, 2\n";
    let err = Context::new().build("scene", &decode(text).unwrap()).unwrap_err();
    assert!(matches!(err, BuildError::MissingClass(item) if item == "grunt"));
}

#[test]
fn unknown_class_fails_the_build() {
    let text = "# populate\n\ngrunt\n\tclass: Dragon\n";
    let err = Context::new().build("scene", &decode(text).unwrap()).unwrap_err();
    assert!(matches!(err, BuildError::UnknownClass { class, .. } if class == "Dragon"));
}

#[test]
fn unregistered_parent_fails_the_build() {
    let text = "# layers\n\nhud\n\tclass: Layer\n\tparent_layer: phantom\n";
    let err = Context::new().build("scene", &decode(text).unwrap()).unwrap_err();
    assert!(matches!(err, BuildError::BadParent { parent, .. } if parent == "phantom"));
}

#[test]
fn duplicate_names_follow_the_policy() {
    let text = "# groups\n\nhud\n\n# layers\n\nhud\n\tclass: Layer\n";
    let doc = decode(text).unwrap();

    // default policy replaces and carries on
    assert!(Context::new().build("scene", &doc).is_ok());

    let strict = Context::new()
        .with_options(BuildOptions::new().with_duplicates(DuplicatePolicy::Reject));
    let err = strict.build("scene", &doc).unwrap_err();
    assert!(matches!(
        err,
        BuildError::Core(CoreError::DuplicateName(name)) if name == "hud"
    ));
}

#[test]
fn unlisted_items_stay_out_of_the_model() {
    let text = "# populate\n\nghost\n\tclass: Sprite\n\tadd_to_model: false\n";
    let env = Context::new().build("scene", &decode(text).unwrap()).unwrap();
    assert!(env.find("ghost").is_none());
}

#[test]
fn fields_without_setters_are_skipped_not_fatal() {
    let text = "# populate\n\ngrunt\n\tclass: Sprite\n\tcharisma: 11\n";
    let env = Context::new().build("scene", &decode(text).unwrap()).unwrap();
    assert!(env.find_entity("grunt").is_some());
}

#[test]
fn init_order_front_loads_fields() {
    fn recorder(name: &'static str, log: &Rc<RefCell<Vec<&'static str>>>) -> SetterFn {
        let log = Rc::clone(log);
        Rc::new(
            move |_env: &mut Environment, _id: EntityId, _args: &[Resolved]| {
                log.borrow_mut().push(name);
                Ok(())
            },
        )
    }

    let applied = Rc::new(RefCell::new(Vec::new()));
    let mut context = Context::new();
    context.register_class(
        EntityClass::sprite("Soldier")
            .with_setter("alpha", recorder("alpha", &applied))
            .with_setter("beta", recorder("beta", &applied))
            .with_init_order(vec!["beta".to_string()]),
    );

    let text = "# populate\n\ngrunt\n\tclass: Soldier\n\talpha: 1\n\tbeta: 2\n";
    context.build("scene", &decode(text).unwrap()).unwrap();
    assert_eq!(*applied.borrow(), vec!["beta", "alpha"]);
}

#[test]
fn custom_setter_values_serialize_back() {
    let mut context = Context::new();
    let accept: SetterFn =
        Rc::new(|_env: &mut Environment, _id: EntityId, _args: &[Resolved]| Ok(()));
    context.register_class(EntityClass::sprite("Soldier").with_setter("health", accept));

    let text = "# populate\n\ngrunt\n\tclass: Soldier\n\thealth: 40\n";
    let env = context.build("scene", &decode(text).unwrap()).unwrap();
    let grunt = env.find_entity("grunt").unwrap();
    assert_eq!(
        env.entity(grunt).unwrap().changes().get("health"),
        Some(&Value::Int(40))
    );
}

#[test]
fn edits_survive_a_save_and_rebuild() {
    let context = Context::new();
    let mut env = context.build("scene", &decode(SCENE).unwrap()).unwrap();

    let grunt = env.find_entity("grunt").unwrap();
    env.move_by(grunt, 1.0, 2.0).unwrap();
    env.set_visible(grunt, false).unwrap();

    let saved = encode(&env.to_document());
    let rebuilt = context.build("scene", &decode(&saved).unwrap()).unwrap();

    let grunt = rebuilt.find_entity("grunt").unwrap();
    assert_eq!(rebuilt.entity(grunt).unwrap().position(), (5.0, 10.0));
    assert!(!rebuilt.entity(grunt).unwrap().visible());

    // recorded parenting survives, structural default parenting stays implicit
    let overlay = rebuilt.find_entity("overlay").unwrap();
    let hud = rebuilt.find_entity("hud").unwrap();
    let NodeKind::Layer { parent, .. } = rebuilt.entity(overlay).unwrap().kind() else {
        panic!("overlay should be a layer");
    };
    assert_eq!(*parent, Some(hud));
    let squad = rebuilt.find_group("squad").unwrap();
    assert!(rebuilt.group(squad).unwrap().contains(grunt));
}

fn combat_interface(
    calls: &Rc<RefCell<Vec<(String, usize)>>>,
    counter: &Rc<RefCell<f64>>,
) -> Interface {
    let war_cry: acorn_runtime::InterfaceFn = {
        let calls = Rc::clone(calls);
        Rc::new(
            move |_env: &mut Environment, _id: EntityId, args: &[Resolved]| {
                calls.borrow_mut().push(("war_cry".to_string(), args.len()));
                Ok(())
            },
        )
    };
    let regen: acorn_runtime::InterfaceFn = {
        let counter = Rc::clone(counter);
        Rc::new(
            move |_env: &mut Environment, _id: EntityId, args: &[Resolved]| {
                *counter.borrow_mut() += args.first().and_then(Resolved::as_f64).unwrap_or(1.0);
                Ok(())
            },
        )
    };
    Interface::new("combat")
        .on_call("war_cry", war_cry)
        .on_update("regen", regen)
}

#[test]
fn interface_commands_run_immediately_or_per_frame() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let counter = Rc::new(RefCell::new(0.0));
    let mut context = Context::new();
    context.register_interface(combat_interface(&calls, &counter));

    let text = "\
# groups

squad

# layers

hud
\tclass: Layer
\tgroups: squad,

# populate

grunt
\tclass: Sprite
\tgroup: squad

\tcombat
\t\twar_cry: loud
\t\tregen: 2
\t\tposition: 1, 2
";
    let mut env = context.build("scene", &decode(text).unwrap()).unwrap();

    // immediate command ran during the build, with one argument
    assert_eq!(*calls.borrow(), vec![("war_cry".to_string(), 1)]);
    // unrecognized binding fields fall through to class setters
    let grunt = env.find_entity("grunt").unwrap();
    assert_eq!(env.entity(grunt).unwrap().position(), (1.0, 2.0));

    assert_eq!(*counter.borrow(), 0.0);
    for _ in 0..3 {
        env.update().unwrap();
    }
    assert_eq!(*counter.borrow(), 6.0);
}

#[test]
fn interface_bindings_resolve_through_data_items() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let counter = Rc::new(RefCell::new(0.0));
    let mut context = Context::new();
    context.register_interface(combat_interface(&calls, &counter));

    let text = "\
# populate

grunt
\tclass: Sprite
\tcombat: regimen

# data

regimen
\twar_cry: loud
";
    context.build("scene", &decode(text).unwrap()).unwrap();
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn unknown_interface_command_fails_the_build() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let counter = Rc::new(RefCell::new(0.0));
    let mut context = Context::new();
    context.register_interface(combat_interface(&calls, &counter));

    let text = "# populate\n\ngrunt\n\tclass: Sprite\n\n\tcombat\n\t\texplode: true\n";
    let err = context.build("scene", &decode(text).unwrap()).unwrap_err();
    assert!(matches!(
        err,
        BuildError::UnknownInterfaceMethod { method, .. } if method == "explode"
    ));
}
