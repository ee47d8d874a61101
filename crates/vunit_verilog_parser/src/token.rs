//! Token types for the Verilog/SystemVerilog lexer.
//!
//! Keywords are case-sensitive and must appear in lowercase. Only the
//! keywords that delimit modules and packages get their own variant; every
//! other reserved word lexes to [`VerilogToken::Reserved`].

use serde::{Deserialize, Serialize};
use vunit_source::Span;

/// A Verilog token kind.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum VerilogToken {
    /// A simple or escaped identifier.
    Identifier,
    /// A system task or function name such as `$display`.
    SystemIdentifier,
    /// A compiler directive or macro usage such as `` `define ``; the text
    /// excludes the backtick.
    Directive,
    /// A numeric literal.
    Number,
    /// A string literal; the text excludes the quotes.
    StringLiteral,
    /// End of a source line. Only the preprocessor looks at these.
    Newline,

    /// `module` or `macromodule`
    Module,
    /// `endmodule`
    Endmodule,
    /// `package`
    Package,
    /// `endpackage`
    Endpackage,
    /// `import`
    Import,
    /// `parameter`
    Parameter,
    /// `begin`
    Begin,
    /// `end`
    End,
    /// Any other SystemVerilog keyword.
    Reserved,

    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `:`
    Colon,
    /// `::`
    DoubleColon,
    /// `#`
    Hash,
    /// `=`
    Equals,
    /// Any other operator.
    Operator,
    /// End of input.
    Eof,
}

/// A lexed token.
///
/// Tokens carry their text because macro expansion moves them between files.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Token {
    /// The kind of this token.
    pub kind: VerilogToken,
    /// Identifier name, directive name, string contents or raw operator text.
    pub text: String,
    /// Where the token was written.
    pub span: Span,
}

impl Token {
    /// Returns `true` if this token is an identifier spelled `text`.
    pub fn is_identifier(&self, text: &str) -> bool {
        self.kind == VerilogToken::Identifier && self.text == text
    }
}

/// Reserved words without a dedicated variant, sorted for binary search.
const OTHER_KEYWORDS: &[&str] = &[
    "accept_on", "alias", "always", "always_comb", "always_ff", "always_latch", "and",
    "assert", "assign", "assume", "automatic", "before", "bind", "bins", "binsof", "bit",
    "break", "buf", "bufif0", "bufif1", "byte", "case", "casex", "casez", "cell", "chandle",
    "checker", "class", "clocking", "cmos", "config", "const", "constraint", "context",
    "continue", "cover", "covergroup", "coverpoint", "cross", "deassign", "default",
    "defparam", "design", "disable", "dist", "do", "edge", "else", "endcase", "endchecker",
    "endclass", "endclocking", "endconfig", "endfunction", "endgenerate", "endgroup",
    "endinterface", "endprimitive", "endprogram", "endproperty", "endsequence",
    "endspecify", "endtable", "endtask", "enum", "event", "eventually", "expect", "export",
    "extends", "extern", "final", "first_match", "for", "force", "foreach", "forever",
    "fork", "forkjoin", "function", "generate", "genvar", "global", "highz0", "highz1",
    "if", "iff", "ifnone", "ignore_bins", "illegal_bins", "implements", "implies", "incdir",
    "include", "initial", "inout", "input", "inside", "instance", "int", "integer",
    "interconnect", "interface", "intersect", "join", "join_any", "join_none", "large",
    "let", "liblist", "library", "local", "localparam", "logic", "longint", "matches",
    "medium", "modport", "nand", "negedge", "nettype", "new", "nexttime", "nmos", "nor",
    "noshowcancelled", "not", "notif0", "notif1", "null", "or", "output", "packed", "pmos",
    "posedge", "primitive", "priority", "program", "property", "protected", "pull0",
    "pull1", "pulldown", "pullup", "pulsestyle_ondetect", "pulsestyle_onevent", "pure",
    "rand", "randc", "randcase", "randsequence", "rcmos", "real", "realtime", "ref", "reg",
    "reject_on", "release", "repeat", "restrict", "return", "rnmos", "rpmos", "rtran",
    "rtranif0", "rtranif1", "s_always", "s_eventually", "s_nexttime", "s_until",
    "s_until_with", "scalared", "sequence", "shortint", "shortreal", "showcancelled",
    "signed", "small", "soft", "solve", "specify", "specparam", "static", "string",
    "strong", "strong0", "strong1", "struct", "super", "supply0", "supply1",
    "sync_accept_on", "sync_reject_on", "table", "tagged", "task", "this", "throughout",
    "time", "timeprecision", "timeunit", "tran", "tranif0", "tranif1", "tri", "tri0",
    "tri1", "triand", "trior", "trireg", "type", "typedef", "union", "unique", "unique0",
    "unsigned", "until", "until_with", "untyped", "use", "uwire", "var", "vectored",
    "virtual", "void", "wait", "wait_order", "wand", "weak", "weak0", "weak1", "while",
    "wildcard", "wire", "with", "within", "wor", "xnor", "xor",
];

/// Looks up a keyword.
///
/// Returns `None` if `s` is an ordinary identifier.
pub fn lookup_keyword(s: &str) -> Option<VerilogToken> {
    let kind = match s {
        "module" | "macromodule" => VerilogToken::Module,
        "endmodule" => VerilogToken::Endmodule,
        "package" => VerilogToken::Package,
        "endpackage" => VerilogToken::Endpackage,
        "import" => VerilogToken::Import,
        "parameter" => VerilogToken::Parameter,
        "begin" => VerilogToken::Begin,
        "end" => VerilogToken::End,
        _ if OTHER_KEYWORDS.binary_search(&s).is_ok() => VerilogToken::Reserved,
        _ => return None,
    };
    Some(kind)
}
