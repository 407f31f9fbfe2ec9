//! Import specifier rewriting for served `.js` files.
//!
//! The source is parsed with oxc and walked for the four places a module
//! specifier can appear: `import` declarations, `import()` with a string
//! literal, `export ... from` and `export * from`. Relative specifiers only
//! gain a `.js` suffix; bare ones go through the configured
//! [`ModuleResolver`]. The output is the original text with just the string
//! literals (or suppressed statements) replaced.
//!
//! The oxc arena is not `Send`, so parsing happens in a synchronous scope
//! that returns owned [`SpecifierSite`]s. The AST is gone before the first
//! resolver call is awaited.

use async_trait::async_trait;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ArrowFunctionExpression, ClassBody, ExportAllDeclaration, ExportNamedDeclaration, Expression,
    FormalParameters, ImportDeclaration as ImportDeclarationNode, ImportExpression, Statement,
    StringLiteral,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use super::Transformer;
use crate::edit::{Edit, EditList};
use crate::error::{CoreError, Result};
use crate::module_resolver::{ImportDeclaration, ModuleResolution, ModuleResolver};
use crate::options::{EcmaVersion, JsSourceType, ParserOptions};
use crate::paths::{ensure_js_suffix, is_relative_specifier};
use crate::resolved_file::ResolvedFile;

/// Replacement for a suppressed `import()` that has no statement of its own,
/// as in `() => import("x")` or a class field initializer.
const SUPPRESSED_EXPRESSION: &str = "void 0";

/// Replacement for a suppressed statement that is the body of a control
/// statement, which cannot be left empty.
const EMPTY_STATEMENT: &str = ";";

#[derive(Debug, Clone)]
pub struct ImportRewriter {
    resolver: Arc<dyn ModuleResolver>,
    parser: ParserOptions,
}

/// A module specifier string literal and what to remove if it is suppressed.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SpecifierSite {
    specifier: String,
    /// Literal range, quotes included
    literal: Range<u32>,
    removal: Edit,
}

impl ImportRewriter {
    pub fn new(resolver: Arc<dyn ModuleResolver>, parser: ParserOptions) -> Self {
        Self { resolver, parser }
    }

    /// Rewrite `source`, returning `None` when nothing changes or the source
    /// cannot be parsed with the configured dialect.
    pub async fn rewrite(&self, source: &str, declaring_file: &Path) -> Result<Option<String>> {
        let sites = match collect_sites(source, self.parser) {
            Ok(sites) => sites,
            Err(reason) => {
                tracing::warn!(file = %declaring_file.display(), "Error parsing, serving unchanged: {}", reason);
                return Ok(None);
            }
        };

        let mut edits = EditList::new();
        for site in sites {
            if site.specifier.is_empty() {
                continue;
            }

            let mut path = site.specifier.clone();
            if !is_relative_specifier(&path) {
                let declaration =
                    ImportDeclaration::new(&site.specifier, site.literal.clone(), declaring_file.to_path_buf());
                match self.resolver.resolve(&declaration).await {
                    Ok(ModuleResolution::Resolved(resolved)) => path = resolved,
                    Ok(ModuleResolution::Unresolved) => {}
                    Ok(ModuleResolution::Suppressed) => {
                        tracing::debug!(specifier = %site.specifier, file = %declaring_file.display(), "Eliding suppressed import");
                        edits.push(site.removal);
                        continue;
                    }
                    Err(err) => {
                        tracing::warn!(
                            specifier = %site.specifier,
                            file = %declaring_file.display(),
                            "Module resolution failed, serving unchanged: {}",
                            err
                        );
                        return Ok(None);
                    }
                }
                if !is_relative_specifier(&path) {
                    path.insert(0, '/');
                }
            }

            let path = ensure_js_suffix(&path);
            if path != site.specifier {
                tracing::debug!(from = %site.specifier, to = %path, "Rewriting import");
                edits.push(Edit::replace(site.literal, quote(&path)));
            }
        }

        if edits.is_empty() {
            return Ok(None);
        }
        edits.apply(source).map(Some)
    }
}

#[async_trait]
impl Transformer for ImportRewriter {
    async fn transform(&self, file: &ResolvedFile) -> Result<Option<String>> {
        if !file.resolved_is_js() {
            return Ok(None);
        }
        let source = match file.text().await {
            Ok(source) => source,
            Err(CoreError::NotUtf8(path)) => {
                tracing::warn!(file = %path.display(), "Not valid UTF-8, serving unchanged");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        self.rewrite(source, &file.file).await
    }
}

fn quote(path: &str) -> String {
    serde_json::to_string(path).unwrap_or_else(|_| format!("\"{path}\""))
}

fn source_type(source_type: JsSourceType) -> SourceType {
    match source_type {
        JsSourceType::Module => SourceType::mjs(),
        JsSourceType::Script => SourceType::mjs().with_module(false),
    }
}

/// Parse `source` and collect every rewritable specifier in source order.
fn collect_sites(source: &str, options: ParserOptions) -> std::result::Result<Vec<SpecifierSite>, String> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, source_type(options.source_type)).parse();

    if parsed.panicked || !parsed.errors.is_empty() {
        let reason = parsed
            .errors
            .first()
            .map(ToString::to_string)
            .unwrap_or_else(|| "parser aborted".to_string());
        return Err(reason);
    }

    let version = options.ecma_version;
    if !version.supports_module_syntax()
        && parsed.program.body.iter().any(Statement::is_module_declaration)
    {
        return Err(format!("module syntax requires ES2015, configured {version}"));
    }

    let mut collector = SiteCollector::default();
    collector.visit_program(&parsed.program);

    if collector.dynamic_imports > 0 && !version.supports_dynamic_import() {
        return Err(format!("dynamic import() requires ES2020, configured {version}"));
    }
    Ok(collector.sites)
}

fn range(span: Span) -> Range<u32> {
    span.start..span.end
}

#[derive(Default)]
struct SiteCollector {
    sites: Vec<SpecifierSite>,
    /// Removal for each enclosing statement, innermost last. `None` marks a
    /// position where no statement can go: an arrow's expression body, a
    /// class body or a parameter list.
    statements: Vec<Option<Edit>>,
    /// The next statement visited is the body of `if`, a loop, a label or `with`
    control_body: bool,
    dynamic_imports: usize,
}

impl SiteCollector {
    fn push(&mut self, source: &StringLiteral<'_>, removal: Edit) {
        self.sites.push(SpecifierSite {
            specifier: source.value.to_string(),
            literal: range(source.span),
            removal,
        });
    }

    fn without_statement(&mut self, visit: impl FnOnce(&mut Self)) {
        self.statements.push(None);
        visit(self);
        self.statements.pop();
    }
}

fn has_statement_body(statement: &Statement<'_>) -> bool {
    matches!(
        statement,
        Statement::IfStatement(_)
            | Statement::ForStatement(_)
            | Statement::ForInStatement(_)
            | Statement::ForOfStatement(_)
            | Statement::WhileStatement(_)
            | Statement::DoWhileStatement(_)
            | Statement::LabeledStatement(_)
            | Statement::WithStatement(_)
    )
}

impl<'a> Visit<'a> for SiteCollector {
    fn visit_statement(&mut self, it: &Statement<'a>) {
        let is_body = std::mem::replace(&mut self.control_body, has_statement_body(it));
        let removal = if is_body {
            Edit::replace(range(it.span()), EMPTY_STATEMENT)
        } else {
            Edit::delete(range(it.span()))
        };
        self.statements.push(Some(removal));
        walk::walk_statement(self, it);
        self.statements.pop();
        self.control_body = is_body;
    }

    fn visit_expression(&mut self, it: &Expression<'a>) {
        // Conditions and loop heads are not bodies, nor is anything nested in them
        let control_body = std::mem::take(&mut self.control_body);
        walk::walk_expression(self, it);
        self.control_body = control_body;
    }

    fn visit_arrow_function_expression(&mut self, it: &ArrowFunctionExpression<'a>) {
        let Some(body) = it.get_expression() else {
            walk::walk_arrow_function_expression(self, it);
            return;
        };
        self.visit_formal_parameters(&it.params);
        self.without_statement(|this| this.visit_expression(body));
    }

    fn visit_class_body(&mut self, it: &ClassBody<'a>) {
        self.without_statement(|this| walk::walk_class_body(this, it));
    }

    fn visit_formal_parameters(&mut self, it: &FormalParameters<'a>) {
        self.without_statement(|this| walk::walk_formal_parameters(this, it));
    }

    fn visit_import_declaration(&mut self, it: &ImportDeclarationNode<'a>) {
        self.push(&it.source, Edit::delete(range(it.span)));
    }

    fn visit_export_named_declaration(&mut self, it: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &it.source {
            self.push(source, Edit::delete(range(it.span)));
        }
        walk::walk_export_named_declaration(self, it);
    }

    fn visit_export_all_declaration(&mut self, it: &ExportAllDeclaration<'a>) {
        self.push(&it.source, Edit::delete(range(it.span)));
    }

    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        self.dynamic_imports += 1;
        if let Expression::StringLiteral(source) = &it.source {
            let removal = match self.statements.last().cloned().flatten() {
                Some(statement) => statement,
                None => Edit::replace(range(it.span), SUPPRESSED_EXPRESSION),
            };
            self.push(source, removal);
        }
        walk::walk_import_expression(self, it);
    }
}
