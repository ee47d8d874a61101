//! Design-unit scanner for VHDL.
//!
//! This crate extracts the information the compile-order engine needs from a
//! VHDL file without parsing the full grammar: declared design units, `use`
//! and `context` clauses, entity/configuration/component instantiations and
//! generic package instantiations. The main entry point is [`parse_file`],
//! which returns a [`VhdlDesignFile`].
//!
//! # Architecture
//!
//! - **Lexer** ([`lexer`]): Converts source text to tokens, handling case-insensitive
//!   keywords, based literals, and block comments.
//! - **Scanner**: Recognises unit headers and reference clauses in the token stream.
//! - **Summary** ([`ast`]): The per-file result with source spans and serde support.

#![warn(missing_docs)]

pub mod ast;
pub mod lexer;
mod scanner;
pub mod token;

pub use ast::{
    ArchitectureDecl, ConfigurationDecl, ContextDecl, EntityDecl, Ident, NameWithin,
    PackageBodyDecl, PackageDecl, PackageInstanceDecl, ReferenceKind, VhdlDesignFile,
    VhdlReference,
};
pub use token::{Token, VhdlToken};

use thiserror::Error;
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

/// Scans a file previously loaded into `source_db`.
pub fn parse_file(file_id: FileId, source_db: &SourceDb) -> Result<VhdlDesignFile, ScanError> {
    let file = source_db.get(file_id).ok_or_else(|| ScanError {
        message: "source text is not loaded".to_string(),
        span: Span::DUMMY,
    })?;
    parse_str(&file.content, file_id)
}

/// Scans VHDL source text.
pub fn parse_str(source: &str, file_id: FileId) -> Result<VhdlDesignFile, ScanError> {
    let tokens = lexer::lex(source, file_id)?;
    Ok(scanner::Scanner::new(&tokens, source).scan())
}
