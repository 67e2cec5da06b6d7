//! Import discovery for ES module source.
//!
//! Parses the module with oxc and walks the whole AST, so imports nested in
//! template substitutions, arrow bodies or conditionals are found too. Records:
//!
//! - `import ... from "s"` and `import "s"`
//! - `export * from "s"`, `export { a } from "s"`
//! - `import("s")` (string or substitution-free template argument)
//! - `require("s")`
//!
//! Type-only imports and exports are skipped. Dynamic imports with computed
//! arguments are ignored.

use std::collections::HashSet;

use oxc::ast::ast::{
    Argument, CallExpression, ExportAllDeclaration, ExportNamedDeclaration, Expression,
    ImportDeclaration, ImportExpression,
};
use oxc::ast_visit::{walk, Visit};
use oxc::parser::Parser;
use oxc::span::SourceType;

/// How a specifier entered the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// Configured entry point.
    Entry,
    /// `import ... from` or side-effect `import`.
    Static,
    /// `export ... from`.
    ReExport,
    /// `import("...")` with a literal argument.
    Dynamic,
    /// `require("...")`.
    Require,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub specifier: String,
    pub kind: ImportKind,
}

/// Module source that does not parse as JavaScript.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error: {}", .messages.join("; "))]
pub struct ScanError {
    pub messages: Vec<String>,
}

/// Returns every specifier in `source`, first occurrence wins, in source order.
pub fn scan_imports(source: &str) -> Result<Vec<ImportRecord>, ScanError> {
    let allocator = oxc_allocator::Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if ret.panicked || !ret.errors.is_empty() {
        return Err(ScanError {
            messages: ret.errors.iter().map(|e| format!("{e}")).collect(),
        });
    }

    let mut collector = ImportCollector {
        seen: HashSet::new(),
        records: Vec::new(),
    };
    collector.visit_program(&ret.program);
    Ok(collector.records)
}

struct ImportCollector {
    seen: HashSet<String>,
    records: Vec<ImportRecord>,
}

impl ImportCollector {
    fn push(&mut self, specifier: &str, kind: ImportKind) {
        if !specifier.is_empty() && self.seen.insert(specifier.to_string()) {
            self.records.push(ImportRecord {
                specifier: specifier.to_string(),
                kind,
            });
        }
    }
}

impl<'a> Visit<'a> for ImportCollector {
    fn visit_import_declaration(&mut self, it: &ImportDeclaration<'a>) {
        if !it.import_kind.is_type() {
            self.push(it.source.value.as_str(), ImportKind::Static);
        }
    }

    fn visit_export_all_declaration(&mut self, it: &ExportAllDeclaration<'a>) {
        if !it.export_kind.is_type() {
            self.push(it.source.value.as_str(), ImportKind::ReExport);
        }
    }

    fn visit_export_named_declaration(&mut self, it: &ExportNamedDeclaration<'a>) {
        match &it.source {
            Some(source) if !it.export_kind.is_type() => {
                self.push(source.value.as_str(), ImportKind::ReExport);
            }
            Some(_) => {}
            // `export const x = import("./y.js")` still needs a walk.
            None => walk::walk_export_named_declaration(self, it),
        }
    }

    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        if let Some(specifier) = literal_expression(&it.source) {
            self.push(specifier, ImportKind::Dynamic);
        }
        walk::walk_import_expression(self, it);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if let Expression::Identifier(callee) = &it.callee {
            if callee.name.as_str() == "require" && it.arguments.len() == 1 {
                if let Argument::StringLiteral(s) = &it.arguments[0] {
                    self.push(s.value.as_str(), ImportKind::Require);
                }
            }
        }
        walk::walk_call_expression(self, it);
    }
}

/// Value of a string literal or a template literal without substitutions.
fn literal_expression<'b>(expr: &'b Expression<'_>) -> Option<&'b str> {
    match expr {
        Expression::StringLiteral(s) => Some(s.value.as_str()),
        Expression::TemplateLiteral(t) if t.expressions.is_empty() => t
            .quasis
            .first()
            .and_then(|q| q.value.cooked.as_ref())
            .map(|c| c.as_str()),
        _ => None,
    }
}
