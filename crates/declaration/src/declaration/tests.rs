use serde_json::json;

use super::*;
use crate::plugin::{DeclareConfigOptions, Plugin, PluginSet};
use crate::validation::StandardEngine;

struct Datapusher;

impl DeclareConfigOptions for Datapusher {
    fn declare_config_options(
        &self,
        declaration: &mut Declaration,
        root: &Key,
    ) -> Result<(), DeclarationError> {
        let section = root.join("ckan.datapusher")?;
        declaration.annotate("Datapusher settings")?;
        declaration.declare(section.child("url")?, "http://127.0.0.1:8800/")?;
        declaration
            .declare_int(section.child("assume_task_stale_after")?, 3600)?
            .experimental();
        Ok(())
    }
}

impl Plugin for Datapusher {
    fn name(&self) -> &str {
        "datapusher"
    }

    fn config_declarer(&self) -> Option<&dyn DeclareConfigOptions> {
        Some(self)
    }
}

struct Audit;

impl DeclareConfigOptions for Audit {
    fn declare_config_options(
        &self,
        declaration: &mut Declaration,
        root: &Key,
    ) -> Result<(), DeclarationError> {
        declaration.annotate("Audit settings")?;
        declaration.declare(root.join("ckan.audit.enabled")?, true)?;
        Ok(())
    }
}

impl Plugin for Audit {
    fn name(&self) -> &str {
        "audit"
    }

    fn config_declarer(&self) -> Option<&dyn DeclareConfigOptions> {
        Some(self)
    }
}

fn key(text: &str) -> Key {
    Key::parse(text).unwrap()
}

fn sample() -> Declaration {
    let mut declaration = Declaration::new();
    declaration.annotate("Section").unwrap();
    declaration.declare(key("a.b.c"), 1).unwrap();
    declaration.declare(key("a.b.d"), 2).unwrap();
    declaration.declare(key("a.e"), 3).unwrap();
    declaration
}

#[test]
fn test_declare_returns_option_for_chaining() {
    let mut declaration = Declaration::new();
    declaration
        .declare(key("ckan.site_id"), "default")
        .unwrap()
        .set_description("Site id")
        .required();

    let option = declaration.get(&key("ckan.site_id")).unwrap();
    assert_eq!(option.description(), Some("Site id"));
    assert!(option.has_flag(Flags::REQUIRED));
    assert_eq!(declaration.items(), &[Item::Key(key("ckan.site_id"))]);
}

#[test]
fn test_duplicate_declaration_keeps_first_option() {
    let mut declaration = Declaration::new();
    declaration.declare(key("a"), 1).unwrap().set_description("first");

    let err = declaration.declare(key("a"), 2).unwrap_err();
    assert!(matches!(err, DeclarationError::AlreadyDeclared(ref k) if *k == key("a")));
    assert_eq!(err.to_string(), "a already declared");

    let option = declaration.get(&key("a")).unwrap();
    assert_eq!(option.default_value(), &DefaultValue::Value(json!(1)));
    assert_eq!(option.description(), Some("first"));
    assert_eq!(declaration.items().len(), 1);
}

#[test]
fn test_sealed_declaration_rejects_changes() {
    let mut declaration = sample();
    declaration.seal();
    let before = declaration.clone();

    assert!(matches!(
        declaration.declare(key("x"), 1),
        Err(DeclarationError::Sealed { action: "declare", .. })
    ));
    assert!(declaration.declare_bool(key("y"), true).is_err());
    assert!(declaration.declare_int(key("z"), 1).is_err());
    assert!(matches!(
        declaration.annotate("Late"),
        Err(DeclarationError::Sealed { action: "annotate", .. })
    ));
    assert!(declaration.load_dict(&json!({"version": 1, "groups": []})).is_err());

    assert_eq!(declaration.items(), before.items());
    assert_eq!(declaration.len(), before.len());
}

#[test]
fn test_sealed_duplicate_reports_seal_first() {
    let mut declaration = sample();
    declaration.seal();
    assert!(matches!(
        declaration.declare(key("a.e"), 1),
        Err(DeclarationError::Sealed { .. })
    ));
}

#[test]
fn test_reset_unseals_and_clears() {
    let mut declaration = sample();
    declaration.load_core_declaration().unwrap();
    declaration.seal();
    declaration.reset();

    assert!(declaration.is_empty());
    assert!(declaration.items().is_empty());
    assert!(!declaration.is_sealed());
    assert!(!declaration.is_core_loaded());
    declaration.declare(key("a"), 1).unwrap();
}

#[test]
fn test_declare_bool_coerces_default() {
    let mut declaration = Declaration::new();
    declaration.declare_bool(key("a"), "yes").unwrap();
    declaration.declare_bool(key("b"), DefaultValue::Unset).unwrap();
    declaration.declare_bool(key("c"), json!(0)).unwrap();

    let a = declaration.get(&key("a")).unwrap();
    assert_eq!(a.default_value(), &DefaultValue::Value(json!(true)));
    assert_eq!(a.validators(), &[Validator::new("boolean_validator")]);
    assert_eq!(
        declaration.get(&key("b")).unwrap().default_value(),
        &DefaultValue::Value(json!(false))
    );
    assert_eq!(
        declaration.get(&key("c")).unwrap().default_value(),
        &DefaultValue::Value(json!(false))
    );
}

#[test]
fn test_declare_int_attaches_converter() {
    let mut declaration = Declaration::new();
    declaration.declare_int(key("port"), 5000).unwrap();
    let option = declaration.get(&key("port")).unwrap();
    assert_eq!(option.validators(), &[Validator::new("convert_int")]);
    assert_eq!(option.default_value(), &DefaultValue::Value(json!(5000)));
}

#[test]
fn test_iter_options_matches_patterns() {
    let declaration = sample();

    let keys: Vec<String> = declaration
        .iter_options("a.b.*", Flags::empty())
        .unwrap()
        .map(Key::to_string)
        .collect();
    assert_eq!(keys, ["a.b.c", "a.b.d"]);

    let keys: Vec<String> = declaration
        .iter_options("a.b.c", Flags::empty())
        .unwrap()
        .map(Key::to_string)
        .collect();
    assert_eq!(keys, ["a.b.c"]);

    let keys: Vec<String> = declaration
        .iter_options("a.?", Flags::empty())
        .unwrap()
        .map(Key::to_string)
        .collect();
    assert_eq!(keys, ["a.e"]);
}

#[test]
fn test_iter_options_is_restartable() {
    let declaration = sample();
    let iter = declaration.iter_options("*", Flags::empty()).unwrap();
    assert_eq!(iter.clone().count(), 3);
    assert_eq!(iter.count(), 3);
}

#[test]
fn test_experimental_options_hidden_by_default() {
    let mut declaration = Declaration::new();
    declaration.declare(key("stable"), 1).unwrap();
    declaration.declare(key("beta"), 2).unwrap().experimental();
    declaration.declare(key("gone"), 3).unwrap().ignore();

    let defaults: Vec<&Key> = declaration.iter_default_options().collect();
    assert_eq!(defaults, [&key("stable")]);

    let all: Vec<&Key> = declaration.iter_options("*", Flags::empty()).unwrap().collect();
    assert_eq!(all.len(), 3);

    let described = declaration.describe("json").unwrap();
    assert!(!described.contains("beta"));
    let everything = declaration.describe_with("json", Flags::empty()).unwrap();
    assert!(everything.contains("beta"));
}

#[test]
fn test_core_and_plugin_loads_are_idempotent() {
    let plugins = PluginSet::new().with(Datapusher);
    let mut declaration = Declaration::new();

    declaration.load_core_declaration().unwrap();
    declaration.load_plugin("datapusher", &plugins).unwrap();
    let len = declaration.len();
    let items = declaration.items().len();

    declaration.load_core_declaration().unwrap();
    declaration.load_plugin("datapusher", &plugins).unwrap();
    assert_eq!(declaration.len(), len);
    assert_eq!(declaration.items().len(), items);
    assert_eq!(declaration.plugins().collect::<Vec<_>>(), ["datapusher"]);
}

#[test]
fn test_setup_declares_plugins_in_reverse_order() {
    let plugins = PluginSet::new().with(Datapusher).with(Audit);
    let mut declaration = Declaration::new();
    let mut live = ConfigMap::new();

    declaration
        .setup(&mut live, &plugins, &StandardEngine::new())
        .unwrap();

    assert!(declaration.is_sealed());
    assert!(declaration.is_core_loaded());
    let annotations: Vec<&str> = declaration
        .items()
        .iter()
        .filter_map(|item| match item {
            Item::Annotation(text) => Some(text.as_str()),
            Item::Key(_) => None,
        })
        .collect();
    let audit = annotations.iter().position(|a| *a == "Audit settings").unwrap();
    let datapusher = annotations
        .iter()
        .position(|a| *a == "Datapusher settings")
        .unwrap();
    assert!(audit < datapusher);
    assert!(live.is_empty());
}

#[test]
fn test_setup_safe_mode_backfills_defaults() {
    let plugins = PluginSet::new().with(Datapusher);
    let mut declaration = Declaration::new();
    let mut live = ConfigMap::new();
    live.insert("config.safe".to_string(), json!("true"));
    live.insert("ckan.site_id".to_string(), json!("mine"));

    declaration
        .setup(&mut live, &plugins, &StandardEngine::new())
        .unwrap();

    assert_eq!(live["ckan.datapusher.url"], json!("http://127.0.0.1:8800/"));
    assert_eq!(live["ckan.site_id"], json!("mine"));
    assert_eq!(live["ckan.devserver.port"], json!(5000));
    assert!(!live.contains_key("beaker.session.secret"));
    assert!(!live.contains_key("ckan.site_url"));
}

#[test]
fn test_setup_strict_mode_reports_invalid_values() {
    let mut declaration = Declaration::new();
    let mut live = ConfigMap::new();
    live.insert("config.strict".to_string(), json!(true));
    live.insert("ckan.devserver.port".to_string(), json!("8-thousand"));
    live.insert("ckan.redis.url".to_string(), json!(""));

    let err = declaration
        .setup(&mut live, &PluginSet::new(), &StandardEngine::new())
        .unwrap_err();

    let DeclarationError::InvalidConfiguration { report } = err else {
        panic!("expected InvalidConfiguration");
    };
    assert_eq!(
        report,
        "ckan.redis.url: Missing value\nckan.devserver.port: Please enter an integer value"
    );
    assert!(declaration.is_sealed());
}

#[test]
fn test_validate_leaves_live_map_untouched() {
    let mut declaration = Declaration::new();
    declaration.declare_int(key("port"), 80).unwrap();
    declaration.declare(key("name"), DefaultValue::Unset).unwrap();
    let mut live = ConfigMap::new();
    live.insert("port".to_string(), json!("eighty"));
    let snapshot = live.clone();

    let errors = declaration.validate(&live, &StandardEngine::new());
    assert_eq!(errors["port"], ["Please enter an integer value"]);
    assert_eq!(live, snapshot);

    live.insert("port".to_string(), json!("81"));
    assert!(declaration.validate(&live, &StandardEngine::new()).is_empty());
}

#[test]
fn test_schema_prepends_default_and_covers_plain_options() {
    let mut declaration = Declaration::new();
    declaration.declare_int(key("port"), 5000).unwrap();
    declaration.declare(key("plain"), "x").unwrap();
    declaration
        .declare(key("url"), DefaultValue::Unset)
        .unwrap()
        .set_validators("not_empty");

    let schema = declaration.into_schema();
    let keys: Vec<&str> = schema.keys().map(String::as_str).collect();
    assert_eq!(keys, ["port", "plain", "url"]);
    assert_eq!(Validator::join(&schema["port"]), "default(5000) convert_int");
    assert!(schema["plain"].is_empty());
    assert_eq!(Validator::join(&schema["url"]), "not_empty");
}

#[test]
fn test_plain_options_validate_cleanly() {
    let mut declaration = Declaration::new();
    declaration.declare(key("plain"), "x").unwrap();
    let mut live = ConfigMap::new();
    live.insert("plain".to_string(), json!(""));
    assert!(declaration.validate(&live, &StandardEngine::new()).is_empty());
}

#[test]
fn test_required_flag_is_descriptive_only() {
    let mut declaration = Declaration::new();
    declaration
        .declare(key("sqlalchemy.url"), DefaultValue::Unset)
        .unwrap()
        .required();
    declaration
        .declare(key("ckan.site_url"), DefaultValue::Unset)
        .unwrap()
        .required()
        .set_validators("not_missing");

    let schema = declaration.into_schema();
    assert!(schema["sqlalchemy.url"].is_empty());

    let errors = declaration.validate(&ConfigMap::new(), &StandardEngine::new());
    let invalid: Vec<&str> = errors.keys().map(String::as_str).collect();
    assert_eq!(invalid, ["ckan.site_url"]);

    let payload = declaration.describe_payload(Flags::empty());
    assert!(payload.groups[0].options.iter().all(|option| option.required));
}

#[test]
fn test_missing_key_validates_against_default() {
    let mut declaration = Declaration::new();
    declaration.declare_int(key("port"), 5000).unwrap();
    assert!(declaration.validate(&ConfigMap::new(), &StandardEngine::new()).is_empty());
}

#[test]
fn test_into_ini_starts_with_core_entries() {
    let mut declaration = Declaration::new();
    declaration.load_core_declaration().unwrap();
    let ini = declaration.into_ini().unwrap();

    assert!(ini.starts_with("use = egg:ckan\ndebug = false\n"));
    assert!(ini.contains("\n## Database settings\n"));
    assert!(ini.contains("# ckan.root_path =\n"));
    assert!(!ini.contains("sqlalchemy.echo"));
    assert!(!ini.contains("ckan.devserver.watch_patterns"));
}

#[test]
fn test_payload_round_trip_preserves_options() {
    let mut declaration = Declaration::new();
    declaration.load_core_declaration().unwrap();
    let payload = declaration.describe_payload(Flags::empty());

    let mut copy = Declaration::new();
    copy.load_dict(&serde_json::to_value(&payload).unwrap()).unwrap();

    assert_eq!(copy.len(), declaration.len());
    assert_eq!(copy.items(), declaration.items());
    for (key, option) in declaration.iter() {
        let restored = copy.get(key).unwrap();
        assert_eq!(restored.default_value(), option.default_value(), "{key}");
        assert_eq!(restored.flags(), option.flags(), "{key}");
        assert_eq!(restored.validators(), option.validators(), "{key}");
        assert_eq!(restored.description(), option.description(), "{key}");
    }
}

#[test]
fn test_sealed_declaration_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Declaration>();
}
