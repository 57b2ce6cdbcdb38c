//! Semantic analysis: scoping and type rules.
//!
//! The analyzer walks the AST once, top-down, keeping a stack of scopes.
//! It never aborts; every problem becomes a [`Diagnostic`] and analysis
//! continues. Unused-variable warnings are produced by a post-pass and
//! always follow the traversal diagnostics.

use alloc::format;
use alloc::vec::Vec;

use serde::Serialize;
use tracing::debug;

use crate::ast::{BinaryOp, Ident, Node, NodeKind};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::scope::{Scope, ScopeKind, SymbolTable, SymbolTableEntry};
use crate::types::{Type, compatible, literal_type};

/// Output of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub symbols: Vec<SymbolTableEntry>,
    pub diagnostics: Vec<Diagnostic>,
    pub scopes: Vec<Scope>,
}

impl Analysis {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_warning())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

/// Analyze a tree with a fresh analyzer.
pub fn analyze(root: &Node) -> Analysis {
    SemanticAnalyzer::new().analyze(root)
}

#[derive(Debug, Default)]
pub struct SemanticAnalyzer {
    table: SymbolTable,
    diagnostics: Vec<Diagnostic>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        SemanticAnalyzer {
            table: SymbolTable::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Run the analysis. All state from earlier runs is discarded first.
    pub fn analyze(&mut self, root: &Node) -> Analysis {
        self.table.reset();
        self.diagnostics.clear();

        self.visit(root);
        self.report_unused();

        let table = core::mem::take(&mut self.table);
        let (symbols, scopes) = table.into_parts();
        self.table.reset();
        let diagnostics = core::mem::take(&mut self.diagnostics);

        debug!(
            symbols = symbols.len(),
            scopes = scopes.len(),
            diagnostics = diagnostics.len(),
            "semantic analysis finished"
        );
        Analysis {
            symbols,
            diagnostics,
            scopes,
        }
    }

    fn report(&mut self, kind: DiagnosticKind, line: u32, message: alloc::string::String) {
        self.diagnostics.push(Diagnostic::new(kind, line, message));
    }

    fn visit(&mut self, node: &Node) {
        match &node.kind {
            NodeKind::Declaration { ty, name, init } => {
                self.visit_declaration(node, *ty, name, init.as_deref());
            }
            NodeKind::Assignment { target, value } => {
                self.visit_assignment(node, target, value.as_deref());
            }
            NodeKind::Identifier(name) => self.visit_identifier(node, name),
            NodeKind::Binary { op, lhs, rhs } => self.visit_binary(node, *op, lhs, rhs),
            NodeKind::If { .. } => self.visit_scoped(node, ScopeKind::If),
            NodeKind::While { .. } => self.visit_scoped(node, ScopeKind::While),
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: &Node) {
        for child in node.children() {
            self.visit(child);
        }
    }

    fn visit_scoped(&mut self, node: &Node, kind: ScopeKind) {
        self.table.push_scope(kind);
        self.visit_children(node);
        self.table.pop_scope();
    }

    fn visit_declaration(&mut self, node: &Node, ty: Type, name: &Ident, init: Option<&Node>) {
        let line = node.line();
        if let Some(existing) = self.table.lookup_local(&name.name) {
            let first = self.table.entry(existing).line;
            self.report(
                DiagnosticKind::Redeclaration,
                line,
                format!(
                    "Variable '{}' already declared in this scope (first declared at line {})",
                    name.name, first
                ),
            );
        } else {
            let literal_initializer = match init.map(|n| &n.kind) {
                Some(NodeKind::Literal(text)) => Some(text.clone()),
                _ => None,
            };
            let entry = SymbolTableEntry {
                name: name.name.clone(),
                ty,
                scope: self.table.current(),
                line,
                literal_initializer,
            };
            self.table.declare(entry, init.is_some());
        }

        if let Some(init) = init {
            self.visit(init);
        }
    }

    fn visit_assignment(&mut self, node: &Node, target: &Ident, value: Option<&Node>) {
        let line = node.line();
        let resolved = self.table.resolve(&target.name);
        match resolved {
            None => self.report(
                DiagnosticKind::UndeclaredUse,
                line,
                format!("Variable '{}' used before declaration", target.name),
            ),
            Some(id) => {
                self.table.mark_used(id);
                self.table.mark_initialized(id);
            }
        }

        let Some(value) = value else {
            return;
        };
        self.visit(value);

        if let (Some(id), NodeKind::Literal(text)) = (resolved, &value.kind) {
            let declared = self.table.entry(id).ty;
            let assigned = literal_type(text);
            if !compatible(declared, assigned) {
                self.report(
                    DiagnosticKind::TypeMismatch,
                    line,
                    format!(
                        "Type mismatch: cannot assign {} to variable '{}' of type {}",
                        assigned, target.name, declared
                    ),
                );
            }
        }
    }

    fn visit_identifier(&mut self, node: &Node, name: &str) {
        let line = node.line();
        match self.table.resolve(name) {
            None => self.report(
                DiagnosticKind::UndeclaredUse,
                line,
                format!("Undeclared variable '{name}'"),
            ),
            Some(id) if !self.table.usage(id).initialized => self.report(
                DiagnosticKind::UseBeforeInit,
                line,
                format!("Variable '{name}' used before initialization"),
            ),
            Some(id) => self.table.mark_used(id),
        }
    }

    fn visit_binary(&mut self, node: &Node, op: BinaryOp, lhs: &Node, rhs: &Node) {
        self.visit(lhs);
        self.visit(rhs);

        let left = self.operand_type(lhs);
        let right = self.operand_type(rhs);

        // 型が不明なオペランドは自分の側だけ制約しない
        let accepted = if op.is_arithmetic() {
            arithmetic_operand(left) && arithmetic_operand(right)
        } else if op.is_comparison() {
            left.is_unknown() || right.is_unknown() || compatible(left, right)
        } else {
            // && and || follow C truthiness
            true
        };

        if !accepted {
            self.report(
                DiagnosticKind::TypeMismatch,
                node.line(),
                format!("Type mismatch: operator '{op}' cannot be applied to {left} and {right}"),
            );
        }
    }

    /// Declared type for identifiers, literal type for literals, and
    /// `Unknown` for anything else.
    fn operand_type(&self, node: &Node) -> Type {
        match &node.kind {
            NodeKind::Identifier(name) => self
                .table
                .resolve(name)
                .map(|id| self.table.entry(id).ty)
                .unwrap_or(Type::Unknown),
            NodeKind::Literal(text) => literal_type(text),
            _ => Type::Unknown,
        }
    }

    fn report_unused(&mut self) {
        let unused: Vec<Diagnostic> = self
            .table
            .iter()
            .filter(|(_, usage)| !usage.used)
            .map(|(entry, _)| {
                Diagnostic::new(
                    DiagnosticKind::UnusedVariable,
                    entry.line,
                    format!(
                        "Variable '{}' declared at line {} is never used",
                        entry.name, entry.line
                    ),
                )
            })
            .collect();
        self.diagnostics.extend(unused);
    }
}

/// An arithmetic operand passes when its type is arithmetic or not known.
fn arithmetic_operand(ty: Type) -> bool {
    ty.is_unknown() || ty.is_arithmetic()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use crate::scope::ScopeId;

    fn analyze_source(source: &str) -> Analysis {
        analyze(&parse(&tokenize(source)))
    }

    fn kinds(analysis: &Analysis) -> Vec<DiagnosticKind> {
        analysis.diagnostics.iter().map(|d| d.kind).collect()
    }

    fn messages(analysis: &Analysis) -> Vec<String> {
        analysis.diagnostics.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn clean_program_has_no_diagnostics() {
        let analysis = analyze_source("int x = 1;\nint y = x + 2;\nreturn y;");
        assert!(analysis.diagnostics.is_empty(), "{:?}", messages(&analysis));
        assert_eq!(analysis.symbols.len(), 2);
    }

    #[test]
    fn redeclaration_cites_first_line() {
        let analysis = analyze_source("int x = 1; int x = 2;");
        let redeclarations: Vec<_> = analysis
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::Redeclaration)
            .collect();
        assert_eq!(redeclarations.len(), 1);
        assert!(redeclarations[0].to_string().starts_with("Line 1:"));
        assert!(redeclarations[0].message.contains("first declared at line 1"));
        assert_eq!(analysis.symbols.len(), 1);
        assert_eq!(analysis.symbols[0].literal_initializer.as_deref(), Some("1"));
    }

    #[test]
    fn redeclaration_across_lines_names_first_declaration() {
        let analysis = analyze_source("int x = 1;\nx = x;\nfloat x;");
        let diag = &analysis.diagnostics[0];
        assert_eq!(diag.kind, DiagnosticKind::Redeclaration);
        assert_eq!(diag.line, 3);
        assert!(diag.message.contains("first declared at line 1"));
    }

    #[test]
    fn block_scope_does_not_leak() {
        let analysis = analyze_source("if (1) { int y = 2; } y = 3;");
        let undeclared: Vec<_> = analysis
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::UndeclaredUse)
            .collect();
        assert_eq!(undeclared.len(), 1);
        assert!(undeclared[0].message.contains("'y'"));
    }

    #[test]
    fn while_body_opens_its_own_scope() {
        let analysis = analyze_source("int i = 0;\nwhile (i < 3) { int t = i; i = t; }\nt = 1;");
        assert_eq!(
            kinds(&analysis),
            vec![DiagnosticKind::UndeclaredUse],
            "{:?}",
            messages(&analysis)
        );
        let t = analysis
            .symbols
            .iter()
            .find(|s| s.name == "t")
            .expect("t declared");
        assert_ne!(t.scope, ScopeId::GLOBAL);
    }

    #[test]
    fn shadowed_names_resolve_to_innermost() {
        let analysis = analyze_source("int x = 1;\nif (x) { char x = 'a'; x = \"s\"; }");
        let mismatch = analysis
            .diagnostics
            .iter()
            .find(|d| d.kind == DiagnosticKind::TypeMismatch)
            .expect("mismatch against inner char x");
        assert!(mismatch.message.contains("of type char"), "{}", mismatch);
    }

    #[test]
    fn unused_variable_is_reported_last() {
        let analysis = analyze_source("int z = 5;\ny = 1;");
        assert_eq!(
            kinds(&analysis),
            vec![DiagnosticKind::UndeclaredUse, DiagnosticKind::UnusedVariable]
        );
        let last = analysis.diagnostics.last().expect("diagnostic");
        assert_eq!(last.to_string(), "Warning: Variable 'z' declared at line 1 is never used");
    }

    #[test]
    fn single_unused_declaration_yields_one_warning() {
        let analysis = analyze_source("int z = 5;");
        assert_eq!(kinds(&analysis), vec![DiagnosticKind::UnusedVariable]);
    }

    #[test]
    fn unused_warnings_follow_declaration_order() {
        let analysis = analyze_source("int b;\nint a;\nint c = 1;\nint d = c;");
        let unused: Vec<_> = analysis
            .warnings()
            .map(|d| d.message.clone())
            .collect();
        assert_eq!(unused.len(), 3);
        assert!(unused[0].contains("'b'"));
        assert!(unused[1].contains("'a'"));
        assert!(unused[2].contains("'d'"));
    }

    #[test]
    fn use_before_initialization() {
        let analysis = analyze_source("int x;\nint y = x;");
        assert_eq!(analysis.diagnostics[0].kind, DiagnosticKind::UseBeforeInit);
        assert_eq!(analysis.diagnostics[0].line, 2);
    }

    #[test]
    fn assignment_initializes_and_marks_used() {
        let analysis = analyze_source("int x;\nx = 4;\nint y = x;\nreturn y;");
        assert!(analysis.diagnostics.is_empty(), "{:?}", messages(&analysis));
    }

    #[test]
    fn undeclared_identifier_in_expression() {
        let analysis = analyze_source("int x = y + 1;\nreturn x;");
        assert_eq!(kinds(&analysis), vec![DiagnosticKind::UndeclaredUse]);
        assert_eq!(messages(&analysis)[0], "Line 1: Undeclared variable 'y'");
    }

    #[test]
    fn assigning_incompatible_literal_is_a_mismatch() {
        let analysis = analyze_source("int x;\nx = \"text\";");
        assert_eq!(kinds(&analysis), vec![DiagnosticKind::TypeMismatch]);
        assert_eq!(
            messages(&analysis)[0],
            "Line 2: Type mismatch: cannot assign string to variable 'x' of type int"
        );
    }

    #[test]
    fn compatible_literal_assignments_pass() {
        let analysis = analyze_source("float f;\nchar c;\nf = 1;\nc = 65;\nf = 2.5;\nc = 'z';");
        assert!(analysis.diagnostics.is_empty(), "{:?}", messages(&analysis));
    }

    #[test]
    fn arithmetic_rejects_strings() {
        let analysis = analyze_source("int x = 1;\nint y = x + \"a\";\nreturn y;");
        assert_eq!(kinds(&analysis), vec![DiagnosticKind::TypeMismatch]);
        assert!(messages(&analysis)[0].contains("operator '+' cannot be applied to int and string"));
    }

    #[test]
    fn arithmetic_accepts_char_operands() {
        let analysis = analyze_source("char c = 'a';\nint n = c + 1;\nreturn n;");
        assert!(analysis.diagnostics.is_empty(), "{:?}", messages(&analysis));
    }

    #[test]
    fn comparison_requires_compatible_operands() {
        let analysis = analyze_source("int x = 1;\nif (x == true) { x = 2; }");
        assert_eq!(kinds(&analysis), vec![DiagnosticKind::TypeMismatch]);
    }

    #[test]
    fn logical_operators_accept_anything() {
        let analysis = analyze_source("int x = 1;\nif (x && \"s\") { x = 2; }");
        assert!(analysis.diagnostics.is_empty(), "{:?}", messages(&analysis));
    }

    #[test]
    fn nested_expressions_are_not_flagged() {
        let analysis = analyze_source("int a = 1;\nint b = 2;\nint c = a + b + 3;\nreturn c;");
        assert!(analysis.diagnostics.is_empty(), "{:?}", messages(&analysis));
    }

    #[test]
    fn known_operand_of_nested_expression_is_checked() {
        let analysis = analyze_source("int a = 1;\nint b = a + a + \"s\";\nreturn b;");
        assert_eq!(kinds(&analysis), vec![DiagnosticKind::TypeMismatch]);
        assert_eq!(
            messages(&analysis)[0],
            "Line 2: Type mismatch: operator '+' cannot be applied to unknown and string"
        );
    }

    #[test]
    fn comparison_with_nested_operand_is_not_flagged() {
        let analysis = analyze_source("int a = 1;\nif (a + 1 == \"s\") { a = 2; }");
        assert!(analysis.diagnostics.is_empty(), "{:?}", messages(&analysis));
    }

    #[test]
    fn malformed_number_assignment_is_a_mismatch() {
        let analysis = analyze_source("int x;\nx = 1.2.3;\nchar c;\nc = \"str\";");
        let mismatches: Vec<_> = analysis
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::TypeMismatch)
            .map(|d| d.to_string())
            .collect();
        assert_eq!(
            mismatches,
            vec![
                "Line 2: Type mismatch: cannot assign unknown to variable 'x' of type int",
                "Line 4: Type mismatch: cannot assign string to variable 'c' of type char",
            ]
        );
    }

    #[test]
    fn analyzer_is_idempotent() {
        let root = parse(&tokenize("int x = 1; int x = 2; y = 3;"));
        let mut analyzer = SemanticAnalyzer::new();
        let first = analyzer.analyze(&root);
        let second = analyzer.analyze(&root);
        assert_eq!(first, second);
    }

    #[test]
    fn records_scope_tree() {
        let analysis = analyze_source("if (1) { int a = 1; a = a; } while (1) { int b = 2; b = b; }");
        assert_eq!(analysis.scopes.len(), 3);
        assert_eq!(analysis.scopes[1].kind, ScopeKind::If);
        assert_eq!(analysis.scopes[2].kind, ScopeKind::While);
        assert_eq!(analysis.symbols[0].scope, analysis.scopes[1].id);
        assert_eq!(analysis.symbols[1].scope, analysis.scopes[2].id);
    }
}
