//! Token kinds produced by the VHDL lexer.
//!
//! Only the reserved words that delimit design units, context clauses and
//! instantiations get their own variant. Every other reserved word lexes to
//! [`VhdlToken::Reserved`] so that it is never mistaken for a name.

use serde::{Deserialize, Serialize};
use vunit_source::Span;

/// The kind of a lexed VHDL token.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum VhdlToken {
    /// A basic identifier such as `clk` or `std_logic_1164`.
    Identifier,
    /// An extended identifier such as `\my name\`.
    ExtendedIdentifier,
    /// A numeric literal, decimal or based.
    Number,
    /// A string literal `"..."`.
    StringLiteral,
    /// A bit string literal such as `x"ff"`.
    BitStringLiteral,
    /// A character literal such as `'1'`.
    CharLiteral,

    /// `all`
    All,
    /// `architecture`
    Architecture,
    /// `body`
    Body,
    /// `component`
    Component,
    /// `configuration`
    Configuration,
    /// `context`
    Context,
    /// `end`
    End,
    /// `entity`
    Entity,
    /// `for`
    For,
    /// `generic`
    Generic,
    /// `is`
    Is,
    /// `library`
    Library,
    /// `map`
    Map,
    /// `new`
    New,
    /// `of`
    Of,
    /// `package`
    Package,
    /// `port`
    Port,
    /// `use`
    Use,
    /// Any other VHDL-2019 reserved word.
    Reserved,

    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `;`
    Semicolon,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `'` used for attributes and qualified expressions.
    Tick,
    /// Any other operator or delimiter.
    Delimiter,
    /// End of input.
    Eof,
}

impl VhdlToken {
    /// Returns `true` for tokens that can name a design unit or library.
    pub fn is_name(self) -> bool {
        matches!(self, VhdlToken::Identifier | VhdlToken::ExtendedIdentifier)
    }
}

/// A lexed token with its kind and source location.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Token {
    /// The kind of this token.
    pub kind: VhdlToken,
    /// The source span covering this token's text.
    pub span: Span,
}

/// Reserved words without a dedicated variant, sorted for binary search.
const OTHER_RESERVED: &[&str] = &[
    "abs", "access", "after", "alias", "and", "array", "assert", "assume", "attribute",
    "begin", "block", "buffer", "bus", "case", "constant", "cover", "default", "disconnect",
    "downto", "else", "elsif", "exit", "fairness", "file", "force", "function", "generate",
    "group", "guarded", "if", "impure", "in", "inertial", "inout", "label", "linkage",
    "literal", "loop", "mod", "nand", "next", "nor", "not", "null", "on", "open", "or",
    "others", "out", "parameter", "postponed", "private", "procedure", "process", "property",
    "protected", "pure", "range", "record", "register", "reject", "release", "rem", "report",
    "restrict", "return", "rol", "ror", "select", "sequence", "severity", "shared", "signal",
    "sla", "sll", "sra", "srl", "strong", "subtype", "then", "to", "transport", "type",
    "unaffected", "units", "until", "variable", "view", "vmode", "vprop", "vunit", "wait",
    "when", "while", "with", "xnor", "xor",
];

/// Looks up a keyword from a lowercase identifier string.
///
/// Returns `None` if `s` is an ordinary identifier.
pub fn lookup_keyword(s: &str) -> Option<VhdlToken> {
    let kind = match s {
        "all" => VhdlToken::All,
        "architecture" => VhdlToken::Architecture,
        "body" => VhdlToken::Body,
        "component" => VhdlToken::Component,
        "configuration" => VhdlToken::Configuration,
        "context" => VhdlToken::Context,
        "end" => VhdlToken::End,
        "entity" => VhdlToken::Entity,
        "for" => VhdlToken::For,
        "generic" => VhdlToken::Generic,
        "is" => VhdlToken::Is,
        "library" => VhdlToken::Library,
        "map" => VhdlToken::Map,
        "new" => VhdlToken::New,
        "of" => VhdlToken::Of,
        "package" => VhdlToken::Package,
        "port" => VhdlToken::Port,
        "use" => VhdlToken::Use,
        _ if OTHER_RESERVED.binary_search(&s).is_ok() => VhdlToken::Reserved,
        _ => return None,
    };
    Some(kind)
}
