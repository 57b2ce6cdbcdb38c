//! Pipeline orchestration: lex, parse, analyze, generate.
//!
//! Code generation runs whether or not analysis found problems; callers
//! decide what to do with the diagnostics.

use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, info_span};

use crate::ast::Node;
use crate::codegen::CodeGenerator;
use crate::error::CoreError;
use crate::ir::Instruction;
use crate::lexer::{Lexer, Token};
use crate::parser::Parser;
use crate::semantic::{Analysis, SemanticAnalyzer};

/// Every stage output for one source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Compilation {
    pub tokens: Vec<Token>,
    pub ast: Node,
    #[serde(flatten)]
    pub analysis: Analysis,
    pub instructions: Vec<Instruction>,
}

impl Compilation {
    pub fn has_errors(&self) -> bool {
        self.analysis.has_errors()
    }

    pub fn has_warnings(&self) -> bool {
        self.analysis.warnings().next().is_some()
    }
}

/// Owns one instance of every stage.
///
/// Reusing a `Pipeline` across sources is equivalent to building a new
/// one each time; each stage resets itself per call.
#[derive(Debug, Default)]
pub struct Pipeline {
    lexer: Lexer,
    analyzer: SemanticAnalyzer,
    generator: CodeGenerator,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline {
            lexer: Lexer::new(),
            analyzer: SemanticAnalyzer::new(),
            generator: CodeGenerator::new(),
        }
    }

    pub fn compile(&mut self, source: &str) -> Compilation {
        let tokens = {
            let _span = info_span!("pipeline.lex").entered();
            let tokens = self.lexer.tokenize(source);
            debug!(tokens = tokens.len(), "lexed source");
            tokens
        };

        let ast = {
            let _span = info_span!("pipeline.parse").entered();
            let ast = Parser::new(&tokens).parse_program();
            debug!(statements = ast.statements().len(), "parsed program");
            ast
        };

        let analysis = {
            let _span = info_span!("pipeline.analyze").entered();
            self.analyzer.analyze(&ast)
        };

        let instructions = {
            let _span = info_span!("pipeline.codegen").entered();
            self.generator.generate(&ast)
        };

        Compilation {
            tokens,
            ast,
            analysis,
            instructions,
        }
    }
}

/// Compile one source text with a fresh pipeline.
pub fn compile(source: &str) -> Compilation {
    Pipeline::new().compile(source)
}

/// Which stage output a caller wants rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitFormat {
    Ir,
    Tokens,
    Ast,
    Symbols,
    Diagnostics,
    Json,
}

impl FromStr for EmitFormat {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ir" => Ok(EmitFormat::Ir),
            "tokens" => Ok(EmitFormat::Tokens),
            "ast" => Ok(EmitFormat::Ast),
            "symbols" => Ok(EmitFormat::Symbols),
            "diagnostics" => Ok(EmitFormat::Diagnostics),
            "json" => Ok(EmitFormat::Json),
            other => Err(CoreError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Render the human-readable listing for `format`.
///
/// `Json` and `Ast` are structured; use `serde_json` on the
/// [`Compilation`] (or its `ast`) for those.
pub fn render_listing(compilation: &Compilation, format: EmitFormat) -> String {
    let mut out = String::new();
    match format {
        EmitFormat::Ir => {
            for instruction in &compilation.instructions {
                out.push_str(&instruction.to_string());
                out.push('\n');
            }
        }
        EmitFormat::Tokens => {
            for token in &compilation.tokens {
                out.push_str(&format!(
                    "{}:{}\t{:?}\t{}\n",
                    token.line, token.column, token.kind, token.text
                ));
            }
        }
        EmitFormat::Symbols => {
            for entry in &compilation.analysis.symbols {
                out.push_str(&format!(
                    "{}\t{}\tscope {}\tline {}",
                    entry.name, entry.ty, entry.scope, entry.line
                ));
                if let Some(value) = &entry.literal_initializer {
                    out.push_str(&format!("\t= {value}"));
                }
                out.push('\n');
            }
        }
        EmitFormat::Diagnostics => {
            for diagnostic in &compilation.analysis.diagnostics {
                out.push_str(&diagnostic.to_string());
                out.push('\n');
            }
        }
        EmitFormat::Ast | EmitFormat::Json => {}
    }
    out
}
