#[cfg(test)]
mod tests {
    use crate::config::*;
    use crate::error::{CliError, ConfigError};
    use serial_test::serial;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use tsdserver_core::{AliasOutcome, EcmaVersion, JsSourceType, ModuleStrategy};

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults_serialize_camel_case() {
        let value = serde_json::to_value(TsdConfig::default()).unwrap();
        assert_eq!(value["wrapJsResources"], true);
        assert_eq!(value["ecmaVersion"], 2023);
        assert_eq!(value["moduleResolver"]["strategy"], "alias");
        assert!(value.get("fallback").is_none());
        assert!(value.get("wrap_js_resources").is_none());
    }

    #[test]
    fn test_effective_default_config() {
        let json = serde_json::to_string_pretty(&TsdConfig::default()).unwrap();
        insta::assert_snapshot!(json, @r#"
        {
          "root": ".",
          "welcome": "index.html",
          "directories": [],
          "wrapJsResources": true,
          "updateJsImport": true,
          "sourceType": "module",
          "ecmaVersion": 2023,
          "moduleResolver": {
            "strategy": "alias"
          }
        }
        "#);
    }

    #[test]
    fn test_alias_spec_forms() {
        let config: TsdConfig = serde_json::from_str(
            r#"{
                "moduleResolver": {
                    "strategy": "alias",
                    "alias": [
                        { "pattern": "^@app/(.*)$", "replace": "/src/$1" },
                        { "find": "fs", "replace": null }
                    ]
                },
                "mapFileName": { "/": "index.html", "/app": ["app.html", "index.html"] },
                "fallback": { "old.js": "new.js" }
            }"#,
        )
        .unwrap();

        let ModuleResolverConfig::Alias { alias: Some(AliasSpec::Rules(rules)) } =
            &config.module_resolver
        else {
            panic!("expected alias rules");
        };
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].replace, None);

        let Some(AliasSpec::Map(map)) = &config.map_file_name else {
            panic!("expected map");
        };
        assert_eq!(
            map["/app"],
            Some(FileNames::Many(vec!["app.html".into(), "index.html".into()]))
        );
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result: Result<TsdConfig, _> = serde_json::from_str(r#"{ "welcom": "x.html" }"#);
        assert!(result.is_err());

        let result: Result<TsdConfig, _> =
            serde_json::from_str(r#"{ "moduleResolver": { "strategy": "webpack" } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_defaults() {
        let base = Path::new("/srv/app");
        let (options, issues) = TsdConfig::default().validate(base);
        assert!(issues.is_empty());
        assert_eq!(options.root, PathBuf::from("/srv/app"));
        assert_eq!(options.welcome, "index.html");
        assert_eq!(options.parser.ecma_version, EcmaVersion::Es2023);
        assert_eq!(options.parser.source_type, JsSourceType::Module);
        assert!(options.wrap_js_resources && options.update_js_import);
    }

    #[test]
    fn test_validate_degrades_bad_entries() {
        let config: TsdConfig = serde_json::from_str(
            r#"{
                "root": "./public/../site",
                "welcome": " ",
                "ecmaVersion": 1999,
                "sourceType": "script",
                "moduleResolver": {
                    "strategy": "alias",
                    "alias": [
                        { "pattern": "([unclosed", "replace": "x" },
                        { "find": "a", "pattern": "b", "replace": "c" },
                        { "replace": "orphan" },
                        { "pattern": "^@app/(.*)$", "replace": "/src/$1" }
                    ]
                }
            }"#,
        )
        .unwrap();

        let (options, issues) = config.validate(Path::new("/srv/app"));
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(
            fields,
            [
                "welcome",
                "ecmaVersion",
                "moduleResolver.alias[0].pattern",
                "moduleResolver.alias[1]",
                "moduleResolver.alias[2]",
            ]
        );
        assert_eq!(options.root, PathBuf::from("/srv/app/site"));
        assert_eq!(options.welcome, "index.html");
        assert_eq!(options.parser.ecma_version, EcmaVersion::DEFAULT);
        assert_eq!(options.parser.source_type, JsSourceType::Script);

        let ModuleStrategy::AliasPackage(aliases) = options.module_strategy else {
            panic!("expected alias strategy");
        };
        assert_eq!(aliases.len(), 1);
        assert_eq!(
            aliases.resolve("@app/widgets/button.js"),
            AliasOutcome::Replaced("/src/widgets/button.js".to_string())
        );
    }

    #[test]
    fn test_validate_edition_number_and_compiler_strategy() {
        let config: TsdConfig = serde_json::from_str(
            r#"{ "ecmaVersion": 11, "moduleResolver": { "strategy": "compiler" } }"#,
        )
        .unwrap();
        let (options, issues) = config.validate(Path::new("/srv/app"));
        assert!(issues.is_empty());
        assert_eq!(options.parser.ecma_version, EcmaVersion::Es2020);
        assert!(matches!(
            options.module_strategy,
            ModuleStrategy::CompilerPaths { ref tsconfig } if tsconfig == Path::new("tsconfig.json")
        ));
    }

    #[test]
    fn test_validate_file_name_mapping() {
        let config: TsdConfig = serde_json::from_str(
            r#"{ "mapFileName": [{ "pattern": "^docs/(.*)$", "replace": ["docs/$1.html", "docs/$1/index.html"] }, { "find": "secret.txt" }] }"#,
        )
        .unwrap();
        let (options, issues) = config.validate(Path::new("/srv"));
        assert!(issues.is_empty());

        let mapping = options.map_file_name.unwrap();
        assert_eq!(
            mapping.resolve("docs/intro"),
            AliasOutcome::Replaced(vec![
                "docs/intro.html".to_string(),
                "docs/intro/index.html".to_string()
            ])
        );
        assert_eq!(mapping.resolve("secret.txt"), AliasOutcome::Suppressed);
    }

    #[test]
    fn test_env_key_to_field() {
        assert_eq!(env_key_to_field("WELCOME"), "welcome");
        assert_eq!(env_key_to_field("WRAP_JS_RESOURCES"), "wrapJsResources");
        assert_eq!(env_key_to_field("MODULE_RESOLVER__TSCONFIG"), "moduleResolver.tsconfig");
        assert_eq!(env_key_to_field("ecma_version"), "ecmaVersion");
    }

    #[test]
    #[serial]
    fn test_load_without_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let loaded = TsdConfig::load(None, temp.path()).unwrap();
        assert_eq!(loaded.config, TsdConfig::default());
        assert_eq!(loaded.path, None);
        assert_eq!(loaded.base_dir, temp.path());
    }

    #[test]
    #[serial]
    fn test_discovery_order() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "tsdserver.yaml", "welcome: from-yaml.html\n");
        write(temp.path(), "tsdserver.toml", "welcome = \"from-toml.html\"\n");

        let loaded = TsdConfig::load(None, temp.path()).unwrap();
        assert_eq!(loaded.config.welcome, "from-toml.html");
        assert_eq!(discover(temp.path()), Some(temp.path().join("tsdserver.toml")));
    }

    #[test]
    #[serial]
    fn test_explicit_file_sets_base_dir() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("site")).unwrap();
        write(
            &temp.path().join("site"),
            "dev.json",
            r#"{ "root": "public", "updateJsImport": false }"#,
        );

        let loaded = TsdConfig::load(Some(Path::new("site/dev.json")), temp.path()).unwrap();
        assert_eq!(loaded.base_dir, temp.path().join("site"));
        assert!(!loaded.config.update_js_import);

        let (options, _) = loaded.config.validate(&loaded.base_dir);
        assert_eq!(options.root, temp.path().join("site/public"));
    }

    #[test]
    #[serial]
    fn test_missing_and_unsupported_files() {
        let temp = TempDir::new().unwrap();
        let err = TsdConfig::load(Some(Path::new("nope.json")), temp.path()).unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::NotFound(_))));

        write(temp.path(), "tsdserver.ini", "welcome=x");
        let err = TsdConfig::load(Some(Path::new("tsdserver.ini")), temp.path()).unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    #[serial]
    fn test_invalid_file_is_fatal() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "tsdserver.json", r#"{ "wrapJsResources": "yes please" }"#);
        let err = TsdConfig::load(None, temp.path()).unwrap_err();
        let CliError::Config(ConfigError::Invalid { source_name, .. }) = err else {
            panic!("expected invalid config, got {err:?}");
        };
        assert!(source_name.unwrap().ends_with("tsdserver.json"));
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "tsdserver.json", r#"{ "welcome": "file.html", "ecmaVersion": 2017 }"#);

        unsafe {
            std::env::set_var("TSDSERVER_WELCOME", "env.html");
            std::env::set_var("TSDSERVER_WRAP_JS_RESOURCES", "false");
        }
        let loaded = TsdConfig::load(None, temp.path());
        unsafe {
            std::env::remove_var("TSDSERVER_WELCOME");
            std::env::remove_var("TSDSERVER_WRAP_JS_RESOURCES");
        }

        let config = loaded.unwrap().config;
        assert_eq!(config.welcome, "env.html");
        assert!(!config.wrap_js_resources);
        assert_eq!(config.ecma_version, 2017);
    }

    #[test]
    fn test_json_schema_lists_fields() {
        let schema = TsdConfig::json_schema().unwrap();
        let properties = schema["properties"].as_object().unwrap();
        assert!(properties.contains_key("moduleResolver"));
        assert!(properties.contains_key("mapFileName"));
    }
}
