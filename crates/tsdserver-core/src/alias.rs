//! Ordered find/replace rules.
//!
//! An [`AliasResolver`] is the matching engine behind three features: module
//! aliases (`T = String`), request file-name mapping (`T = Vec<String>`) and
//! the custom fallback chain. Rules are tried in declaration order and the
//! first one that matches decides the outcome.
//!
//! Matching a rule yields a list of captures:
//!
//! | find        | captures                                   |
//! |-------------|--------------------------------------------|
//! | literal     | `[name]`                                   |
//! | regex       | `[$0, $1, ...]`, unmatched groups empty    |
//! | predicate   | `[name]` or the list the predicate returns |
//!
//! The replacement then turns those captures into the result. A template
//! substitutes `$n` references, a function is handed the captures, and a
//! suppressing rule reports [`AliasOutcome::Suppressed`], which is not the
//! same thing as no rule matching at all.

use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// What a predicate `find` reports for a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateMatch {
    /// Not matched
    No,
    /// Matched; the name itself is the single capture
    Name,
    /// Matched with explicit capture values
    Captures(Vec<String>),
}

impl From<bool> for PredicateMatch {
    fn from(matched: bool) -> Self {
        if matched {
            PredicateMatch::Name
        } else {
            PredicateMatch::No
        }
    }
}

impl From<Option<Vec<String>>> for PredicateMatch {
    fn from(captures: Option<Vec<String>>) -> Self {
        captures.map_or(PredicateMatch::No, PredicateMatch::Captures)
    }
}

pub type Predicate = Arc<dyn Fn(&str) -> PredicateMatch + Send + Sync>;

/// Replacement callback. Returning `None` suppresses the name.
pub type ReplaceFn<T> = Arc<dyn Fn(&[String]) -> Option<T> + Send + Sync>;

/// How a rule recognises a name.
#[derive(Clone)]
pub enum Find {
    Literal(String),
    Regex(Regex),
    Predicate(Predicate),
}

impl fmt::Debug for Find {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Find::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
            Find::Regex(r) => f.debug_tuple("Regex").field(&r.as_str()).finish(),
            Find::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl Find {
    fn captures(&self, name: &str) -> Option<Vec<String>> {
        match self {
            Find::Literal(literal) => (literal == name).then(|| vec![name.to_string()]),
            Find::Regex(regex) => regex.captures(name).map(|caps| {
                caps.iter()
                    .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                    .collect()
            }),
            Find::Predicate(predicate) => match predicate(name) {
                PredicateMatch::No => None,
                PredicateMatch::Name => Some(vec![name.to_string()]),
                PredicateMatch::Captures(captures) => Some(captures),
            },
        }
    }
}

/// What a rule produces once it matched.
#[derive(Clone)]
pub enum Replace<T> {
    Template(T),
    Function(ReplaceFn<T>),
    Suppress,
}

impl<T: fmt::Debug> fmt::Debug for Replace<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replace::Template(t) => f.debug_tuple("Template").field(t).finish(),
            Replace::Function(_) => f.write_str("Function(..)"),
            Replace::Suppress => f.write_str("Suppress"),
        }
    }
}

impl<T> From<Option<T>> for Replace<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Replace::Suppress, Replace::Template)
    }
}

/// A value that can be expanded with `$n` capture references.
pub trait Template: Clone {
    fn expand(&self, captures: &[String]) -> Self;
}

impl Template for String {
    fn expand(&self, captures: &[String]) -> Self {
        substitute_captures(self, captures)
    }
}

impl Template for Vec<String> {
    fn expand(&self, captures: &[String]) -> Self {
        self.iter()
            .map(|item| substitute_captures(item, captures))
            .collect()
    }
}

/// Replace every `$n` in `template` with `captures[n]`.
///
/// The index is the whole run of digits after `$`. References past the end
/// of `captures`, and `$` not followed by a digit, are copied literally.
pub fn substitute_captures(template: &str, captures: &[String]) -> String {
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }
        let digits_start = i + 1;
        let mut digits_end = digits_start;
        while digits_end < bytes.len() && bytes[digits_end].is_ascii_digit() {
            digits_end += 1;
        }
        if digits_end == digits_start {
            i += 1;
            continue;
        }
        let capture = template[digits_start..digits_end]
            .parse::<usize>()
            .ok()
            .and_then(|index| captures.get(index));
        if let Some(capture) = capture {
            out.push_str(&template[copied..i]);
            out.push_str(capture);
            copied = digits_end;
        }
        i = digits_end;
    }

    out.push_str(&template[copied..]);
    out
}

#[derive(Debug, Clone)]
pub struct AliasRule<T> {
    pub find: Find,
    pub replace: Replace<T>,
}

impl<T> AliasRule<T> {
    pub fn new(find: Find, replace: Replace<T>) -> Self {
        Self { find, replace }
    }

    pub fn literal(find: impl Into<String>, replace: Option<T>) -> Self {
        Self::new(Find::Literal(find.into()), replace.into())
    }

    pub fn regex(find: Regex, replace: Option<T>) -> Self {
        Self::new(Find::Regex(find), replace.into())
    }

    pub fn predicate<F>(find: F, replace: Replace<T>) -> Self
    where
        F: Fn(&str) -> PredicateMatch + Send + Sync + 'static,
    {
        Self::new(Find::Predicate(Arc::new(find)), replace)
    }
}

/// Result of running a name through the rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasOutcome<T> {
    Replaced(T),
    Suppressed,
    NotMatched,
}

#[derive(Debug, Clone)]
pub struct AliasResolver<T> {
    rules: Vec<AliasRule<T>>,
}

impl<T> Default for AliasResolver<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<T: Template> AliasResolver<T> {
    pub fn new(rules: Vec<AliasRule<T>>) -> Self {
        Self { rules }
    }

    /// Build literal rules from `key -> value` pairs, keeping their order.
    /// A `None` value suppresses the key.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<T>)>,
        K: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(key, value)| AliasRule::literal(key, value))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn resolve(&self, name: &str) -> AliasOutcome<T> {
        for rule in &self.rules {
            let Some(captures) = rule.find.captures(name) else {
                continue;
            };
            return match &rule.replace {
                Replace::Suppress => AliasOutcome::Suppressed,
                Replace::Template(template) => AliasOutcome::Replaced(template.expand(&captures)),
                Replace::Function(function) => match function(&captures) {
                    Some(value) => AliasOutcome::Replaced(value),
                    None => AliasOutcome::Suppressed,
                },
            };
        }
        AliasOutcome::NotMatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn s(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    #[test]
    fn test_literal_match_returns_replacement() {
        let resolver = AliasResolver::from_pairs([("react", s("preact/compat"))]);
        assert_eq!(
            resolver.resolve("react"),
            AliasOutcome::Replaced("preact/compat".to_string())
        );
        assert_eq!(resolver.resolve("react-dom"), AliasOutcome::NotMatched);
    }

    #[test]
    fn test_literal_null_suppresses() {
        let resolver = AliasResolver::<String>::from_pairs([("server-only-module", None)]);
        assert_eq!(
            resolver.resolve("server-only-module"),
            AliasOutcome::Suppressed
        );
    }

    #[test]
    fn test_regex_capture_substitution() {
        let rule = AliasRule::regex(
            Regex::new(r"^@app/(.*)$").unwrap(),
            s("/src/$1"),
        );
        let resolver = AliasResolver::new(vec![rule]);
        assert_eq!(
            resolver.resolve("@app/widgets/button"),
            AliasOutcome::Replaced("/src/widgets/button".to_string())
        );
    }

    #[test]
    fn test_regex_whole_match_reference() {
        let rule = AliasRule::regex(Regex::new(r"lit-\w+").unwrap(), s("/vendor/$0"));
        let resolver = AliasResolver::new(vec![rule]);
        assert_eq!(
            resolver.resolve("lit-html"),
            AliasOutcome::Replaced("/vendor/lit-html".to_string())
        );
    }

    #[test]
    fn test_non_matching_regex_does_not_stop_iteration() {
        let resolver = AliasResolver::new(vec![
            AliasRule::regex(Regex::new(r"^never$").unwrap(), s("x")),
            AliasRule::literal("lodash", s("lodash-es")),
        ]);
        assert_eq!(
            resolver.resolve("lodash"),
            AliasOutcome::Replaced("lodash-es".to_string())
        );
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let resolver = AliasResolver::new(vec![
            AliasRule::regex(Regex::new(r"^lo").unwrap(), s("first")),
            AliasRule::literal("lodash", s("second")),
        ]);
        assert_eq!(
            resolver.resolve("lodash"),
            AliasOutcome::Replaced("first".to_string())
        );
    }

    #[test]
    fn test_predicate_true_captures_name() {
        let rule = AliasRule::predicate(
            |name| (name.starts_with("@internal/")).into(),
            Replace::Template("/internal/$0".to_string()),
        );
        let resolver = AliasResolver::new(vec![rule]);
        assert_eq!(
            resolver.resolve("@internal/log"),
            AliasOutcome::Replaced("/internal/@internal/log".to_string())
        );
        assert_eq!(resolver.resolve("other"), AliasOutcome::NotMatched);
    }

    #[test]
    fn test_predicate_captures_feed_function() {
        let rule = AliasRule::predicate(
            |name| {
                name.split_once(':')
                    .map(|(scheme, rest)| vec![scheme.to_string(), rest.to_string()])
                    .into()
            },
            Replace::Function(Arc::new(|caps: &[String]| {
                Some(format!("/{}/{}", caps[0], caps[1]))
            })),
        );
        let resolver = AliasResolver::new(vec![rule]);
        assert_eq!(
            resolver.resolve("node:path"),
            AliasOutcome::Replaced("/node/path".to_string())
        );
    }

    #[test]
    fn test_function_returning_none_suppresses() {
        let rule = AliasRule::new(
            Find::Literal("fs".to_string()),
            Replace::<String>::Function(Arc::new(|_: &[String]| None)),
        );
        let resolver = AliasResolver::new(vec![rule]);
        assert_eq!(resolver.resolve("fs"), AliasOutcome::Suppressed);
    }

    #[test]
    fn test_list_template_expands_every_element() {
        let rule = AliasRule::regex(
            Regex::new(r"^(.*)\.js$").unwrap(),
            Some(vec!["$1.js".to_string(), "$1.mjs".to_string()]),
        );
        let resolver = AliasResolver::new(vec![rule]);
        assert_eq!(
            resolver.resolve("lib/a.js"),
            AliasOutcome::Replaced(vec!["lib/a.js".to_string(), "lib/a.mjs".to_string()])
        );
    }

    #[test]
    fn test_substitute_captures_edge_cases() {
        let caps = vec!["whole".to_string(), "one".to_string()];
        assert_eq!(substitute_captures("$1-$1", &caps), "one-one");
        assert_eq!(substitute_captures("$2", &caps), "$2");
        assert_eq!(substitute_captures("$10", &caps), "$10");
        assert_eq!(substitute_captures("cost: $", &caps), "cost: $");
        assert_eq!(substitute_captures("$x$0", &caps), "$xwhole");
    }

    #[test]
    fn test_unmatched_optional_group_is_empty() {
        let rule = AliasRule::regex(Regex::new(r"^a(b)?c$").unwrap(), s("[$1]"));
        let resolver = AliasResolver::new(vec![rule]);
        assert_eq!(
            resolver.resolve("ac"),
            AliasOutcome::Replaced("[]".to_string())
        );
    }

    proptest! {
        #[test]
        fn prop_unmatched_names_are_not_matched(name in "[a-z]{1,12}") {
            let resolver = AliasResolver::new(vec![
                AliasRule::literal("@scope/pkg", s("x")),
                AliasRule::regex(Regex::new(r"^[0-9]+$").unwrap(), s("y")),
            ]);
            prop_assert_eq!(resolver.resolve(&name), AliasOutcome::NotMatched);
        }

        #[test]
        fn prop_dollar_one_is_first_group(group in "[a-z/]{0,16}") {
            let rule = AliasRule::regex(Regex::new(r"^pkg:(.*)$").unwrap(), s("/m/$1"));
            let resolver = AliasResolver::new(vec![rule]);
            prop_assert_eq!(
                resolver.resolve(&format!("pkg:{group}")),
                AliasOutcome::Replaced(format!("/m/{group}"))
            );
        }
    }
}
