//! Dependency-relevant summary of a Verilog or SystemVerilog file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vunit_common::{ContentHash, UnitName};
use vunit_source::Span;

/// A name together with the place it was written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    /// The name.
    pub name: UnitName,
    /// Where it appears, possibly inside an included file.
    pub span: Span,
}

/// A top-level `module` declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDecl {
    /// Module name.
    pub name: Ident,
    /// Names of the module's `parameter`s, in declaration order.
    pub parameters: Vec<String>,
}

/// A file pulled in through `` `include ``.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludedFile {
    /// Normalized path of the included file.
    pub path: PathBuf,
    /// Hash of its raw bytes at scan time.
    pub hash: ContentHash,
}

/// Everything the dependency engine needs from one Verilog file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerilogDesignFile {
    /// Top-level modules; nested modules are not recorded.
    pub modules: Vec<ModuleDecl>,
    /// Package declarations.
    pub packages: Vec<Ident>,
    /// Packages named in `import pkg::...` statements.
    pub imports: Vec<Ident>,
    /// Packages named in scoped references such as `pkg::CONST`.
    pub package_references: Vec<Ident>,
    /// Names that appear in instantiation position, such as `fifo #(...) u0 (...)`.
    pub instances: Vec<Ident>,
    /// Every file included while preprocessing, in first-inclusion order.
    pub included_files: Vec<IncludedFile>,
}
