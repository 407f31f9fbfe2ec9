use path_clean::PathClean;
use regex::Regex;
use std::path::Path;
use tsdserver_core::alias::Template;
use tsdserver_core::{
    AliasResolver, AliasRule, ConfigIssue, EcmaVersion, ModuleStrategy, ParserOptions,
    ServerOptions,
};

use crate::config::{AliasSpec, FileNames, ModuleResolverConfig, TsdConfig, default_welcome};

impl TsdConfig {
    /// Turn the configuration into server options.
    ///
    /// Nothing here fails: an entry that cannot be used is dropped or
    /// replaced by its default, and reported as an issue.
    pub fn validate(&self, base_dir: &Path) -> (ServerOptions, Vec<ConfigIssue>) {
        let mut issues = Vec::new();

        let welcome = if self.welcome.trim().is_empty() {
            issues.push(ConfigIssue::new(
                "welcome",
                format!("must not be empty; using {}", default_welcome()),
            ));
            default_welcome()
        } else {
            self.welcome.clone()
        };

        let ecma_version = EcmaVersion::from_year_or_edition(self.ecma_version).unwrap_or_else(|| {
            issues.push(ConfigIssue::new(
                "ecmaVersion",
                format!(
                    "unsupported version {}; using {}",
                    self.ecma_version,
                    EcmaVersion::DEFAULT
                ),
            ));
            EcmaVersion::DEFAULT
        });

        let module_strategy = match &self.module_resolver {
            ModuleResolverConfig::Alias { alias } => ModuleStrategy::AliasPackage(
                alias
                    .as_ref()
                    .map(|spec| compile_aliases(spec, "moduleResolver.alias", Clone::clone, &mut issues))
                    .unwrap_or_default(),
            ),
            ModuleResolverConfig::Compiler { tsconfig } => ModuleStrategy::CompilerPaths {
                tsconfig: tsconfig.clone(),
            },
        };

        let map_file_name = self
            .map_file_name
            .as_ref()
            .map(|spec| compile_aliases(spec, "mapFileName", FileNames::to_vec, &mut issues));

        let fallback = self
            .fallback
            .as_ref()
            .map(|spec| compile_aliases(spec, "fallback", Clone::clone, &mut issues))
            .unwrap_or_default();

        let options = ServerOptions {
            root: base_dir.join(&self.root).clean(),
            welcome,
            directories: self.directories.clone(),
            wrap_js_resources: self.wrap_js_resources,
            update_js_import: self.update_js_import,
            parser: ParserOptions {
                source_type: self.source_type.into(),
                ecma_version,
            },
            module_strategy,
            map_file_name,
            fallback,
        };

        (options, issues)
    }
}

/// Compile configured rules, dropping the ones that cannot be used.
fn compile_aliases<T, U, F>(
    spec: &AliasSpec<T>,
    field: &str,
    convert: F,
    issues: &mut Vec<ConfigIssue>,
) -> AliasResolver<U>
where
    U: Template,
    F: Fn(&T) -> U,
{
    match spec {
        AliasSpec::Map(map) => AliasResolver::from_pairs(
            map.iter()
                .map(|(key, value)| (key.clone(), value.as_ref().map(&convert))),
        ),
        AliasSpec::Rules(rules) => {
            let mut compiled = Vec::with_capacity(rules.len());
            for (index, rule) in rules.iter().enumerate() {
                let replace = rule.replace.as_ref().map(&convert);
                match (&rule.find, &rule.pattern) {
                    (Some(find), None) => compiled.push(AliasRule::literal(find.clone(), replace)),
                    (None, Some(pattern)) => match Regex::new(pattern) {
                        Ok(regex) => compiled.push(AliasRule::regex(regex, replace)),
                        Err(err) => issues.push(ConfigIssue::new(
                            format!("{field}[{index}].pattern"),
                            format!("invalid regular expression, rule ignored: {err}"),
                        )),
                    },
                    (Some(_), Some(_)) => issues.push(ConfigIssue::new(
                        format!("{field}[{index}]"),
                        "set either `find` or `pattern`, not both; rule ignored",
                    )),
                    (None, None) => issues.push(ConfigIssue::new(
                        format!("{field}[{index}]"),
                        "needs `find` or `pattern`; rule ignored",
                    )),
                }
            }
            AliasResolver::new(compiled)
        }
    }
}
