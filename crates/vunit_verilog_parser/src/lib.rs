//! Verilog and SystemVerilog dependency scanner.
//!
//! Runs a preprocessor over the token stream (macros, conditionals and
//! `` `include ``) and then scans the result for module and package
//! declarations, package imports and module instantiations. The main entry
//! point is [`parse_file`], which returns a [`VerilogDesignFile`].
//!
//! # Architecture
//!
//! - **Lexer** ([`lexer`]): Converts source text to tokens, keeping newlines
//!   so directives can be line-terminated.
//! - **Preprocessor** ([`preprocess`]): Expands macros, evaluates conditionals
//!   and splices included files, recording each included file's hash.
//! - **Scanner** ([`parser`]): Finds declarations and references in the
//!   preprocessed tokens.

#![warn(missing_docs)]

pub mod ast;
pub mod errors;
pub mod lexer;
pub mod parser;
pub mod preprocess;
pub mod token;

pub use ast::{Ident, IncludedFile, ModuleDecl, VerilogDesignFile};
pub use preprocess::{Macro, Preprocessor};
pub use token::{Token, VerilogToken};

use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;
use vunit_diagnostics::DiagnosticSink;
use vunit_source::{FileId, SourceDb, Span};

/// A file could not be scanned; no design units are extracted from it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ScanError {
    /// What went wrong.
    pub message: String,
    /// Where scanning stopped.
    pub span: Span,
}

/// Preprocesses and scans a file previously loaded into `source_db`.
///
/// `defines` are installed as object-like macros before the file is read.
/// Included files are loaded into `source_db` as they are encountered;
/// problems with directives are reported to `sink` and do not fail the scan.
pub fn parse_file(
    file_id: FileId,
    source_db: &mut SourceDb,
    defines: &BTreeMap<String, String>,
    include_dirs: &[PathBuf],
    sink: &DiagnosticSink,
) -> Result<VerilogDesignFile, ScanError> {
    let (path, content) = match source_db.get(file_id) {
        Some(file) => (file.path.clone(), file.content.clone()),
        None => {
            return Err(ScanError {
                message: "source text is not loaded".to_string(),
                span: Span::DUMMY,
            })
        }
    };
    let tokens = lexer::lex(&content, file_id)?;

    let mut preprocessor = Preprocessor::new(source_db, sink, include_dirs.to_vec());
    for (name, value) in defines {
        preprocessor.define(name, value);
    }
    let tokens: Vec<Token> = preprocessor
        .run(tokens, &path)
        .into_iter()
        .filter(|t| t.kind != VerilogToken::Newline)
        .collect();

    let mut design_file = parser::scan_tokens(&tokens);
    design_file.included_files = preprocessor.included_files().to_vec();
    tracing::debug!(
        path = %path.display(),
        modules = design_file.modules.len(),
        packages = design_file.packages.len(),
        includes = design_file.included_files.len(),
        "scanned verilog file"
    );
    Ok(design_file)
}
