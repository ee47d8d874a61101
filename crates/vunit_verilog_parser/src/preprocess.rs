//! Verilog preprocessor.
//!
//! Evaluates `` `define ``, `` `undef ``, `` `undefineall ``/`` `resetall ``,
//! `` `include `` and the `` `ifdef `` family against a set of macros, and
//! expands macro calls. The output is the token stream the compiler would
//! see, with line ends removed. Problems are reported to the
//! [`DiagnosticSink`] and preprocessing continues past them.

use crate::ast::IncludedFile;
use crate::errors;
use crate::lexer::lex;
use crate::token::{Token, VerilogToken};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use vunit_common::ContentHash;
use vunit_diagnostics::{Diagnostic, DiagnosticSink};
use vunit_source::{normalize_path, FileId, SourceDb};

/// Nesting limit for macro expansion; deeper nesting is treated as recursion.
const MAX_EXPANSION_DEPTH: usize = 64;

/// A `` `define `` macro.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Macro {
    /// Macro name.
    pub name: String,
    /// Formal argument names; empty for object-like macros.
    pub args: Vec<String>,
    /// Default values of formal arguments.
    pub defaults: HashMap<String, Vec<Token>>,
    /// Replacement tokens.
    pub body: Vec<Token>,
    /// `true` if the macro was defined with a parenthesised argument list.
    pub function_like: bool,
}

impl Macro {
    /// Creates an object-like macro whose body is the lexed `value`.
    pub fn object_like(name: impl Into<String>, value: &str) -> Self {
        let body = lex(value, FileId::DUMMY)
            .map(|tokens| {
                tokens
                    .into_iter()
                    .filter(|t| !matches!(t.kind, VerilogToken::Newline | VerilogToken::Eof))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            name: name.into(),
            args: Vec::new(),
            defaults: HashMap::new(),
            body,
            function_like: false,
        }
    }

    /// Substitutes actual argument values into the body.
    fn expand(&self, values: &[Vec<Token>]) -> Vec<Token> {
        let mut out = Vec::with_capacity(self.body.len());
        for token in &self.body {
            let formal = (token.kind == VerilogToken::Identifier)
                .then(|| self.args.iter().position(|a| *a == token.text))
                .flatten();
            match formal.and_then(|i| values.get(i)) {
                Some(value) => out.extend(value.iter().cloned()),
                None => out.push(token.clone()),
            }
        }
        out
    }
}

/// A cursor over a token vector.
struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Returns the next token unless the line or input ends first.
    fn next_on_line(&mut self) -> Option<Token> {
        match self.peek() {
            Some(t) if !matches!(t.kind, VerilogToken::Newline | VerilogToken::Eof) => self.next(),
            _ => None,
        }
    }

    /// Consumes everything up to and including the next line end.
    fn skip_line(&mut self) -> Vec<Token> {
        let mut skipped = Vec::new();
        while let Some(token) = self.next() {
            match token.kind {
                VerilogToken::Newline => break,
                VerilogToken::Eof => {
                    self.pos -= 1;
                    break;
                }
                _ => skipped.push(token),
            }
        }
        skipped
    }
}

/// State of one open `` `ifdef `` block.
struct Conditional {
    directive: Token,
    parent_active: bool,
    taken: bool,
    any_taken: bool,
}

fn is_active(stack: &[Conditional]) -> bool {
    stack.last().map_or(true, |c| c.parent_active && c.taken)
}

/// Preprocesses token streams of one file and everything it includes.
pub struct Preprocessor<'a> {
    source_db: &'a mut SourceDb,
    sink: &'a DiagnosticSink,
    include_dirs: Vec<PathBuf>,
    defines: HashMap<String, Macro>,
    include_stack: Vec<PathBuf>,
    included_files: Vec<IncludedFile>,
    depth: usize,
}

impl<'a> Preprocessor<'a> {
    /// Creates a preprocessor that searches `include_dirs` after the
    /// including file's own directory.
    pub fn new(
        source_db: &'a mut SourceDb,
        sink: &'a DiagnosticSink,
        include_dirs: Vec<PathBuf>,
    ) -> Self {
        Self {
            source_db,
            sink,
            include_dirs,
            defines: HashMap::new(),
            include_stack: Vec::new(),
            included_files: Vec::new(),
            depth: 0,
        }
    }

    /// Defines an object-like macro before preprocessing starts.
    pub fn define(&mut self, name: &str, value: &str) {
        self.defines
            .insert(name.to_string(), Macro::object_like(name, value));
    }

    /// Preprocesses the tokens of the file at `path`.
    pub fn run(&mut self, tokens: Vec<Token>, path: &Path) -> Vec<Token> {
        let mut out = Vec::new();
        self.include_stack.push(normalize_path(path));
        let dir = path.parent().map(Path::to_path_buf);
        self.process(tokens, dir.as_deref(), &mut out);
        self.include_stack.pop();
        out
    }

    /// Files included by every call to [`run`](Self::run) so far.
    pub fn included_files(&self) -> &[IncludedFile] {
        &self.included_files
    }

    fn process(&mut self, tokens: Vec<Token>, dir: Option<&Path>, out: &mut Vec<Token>) {
        let mut stream = TokenStream::new(tokens);
        let mut conditionals: Vec<Conditional> = Vec::new();
        while let Some(token) = stream.next() {
            match token.kind {
                VerilogToken::Eof => break,
                VerilogToken::Newline => {}
                VerilogToken::Directive => {
                    self.directive(token, &mut stream, &mut conditionals, dir, out)
                }
                _ if is_active(&conditionals) => out.push(token),
                _ => {}
            }
        }
        if let Some(open) = conditionals.last() {
            self.sink.emit(errors::unterminated_conditional(
                &open.directive.text,
                open.directive.span,
            ));
        }
    }

    fn directive(
        &mut self,
        token: Token,
        stream: &mut TokenStream,
        conditionals: &mut Vec<Conditional>,
        dir: Option<&Path>,
        out: &mut Vec<Token>,
    ) {
        let name = token.text.clone();
        match name.as_str() {
            "ifdef" | "ifndef" => {
                let defined = self.condition_argument(&token, stream);
                let taken = defined == (token.text == "ifdef");
                conditionals.push(Conditional {
                    parent_active: is_active(conditionals),
                    directive: token,
                    taken,
                    any_taken: taken,
                });
                return;
            }
            "elsif" => {
                let defined = self.condition_argument(&token, stream);
                match conditionals.last_mut() {
                    Some(open) => {
                        open.taken = !open.any_taken && defined;
                        open.any_taken |= open.taken;
                    }
                    None => self
                        .sink
                        .emit(errors::unmatched_conditional(&token.text, token.span)),
                }
                return;
            }
            "else" => {
                match conditionals.last_mut() {
                    Some(open) => {
                        open.taken = !open.any_taken;
                        open.any_taken = true;
                    }
                    None => self
                        .sink
                        .emit(errors::unmatched_conditional(&token.text, token.span)),
                }
                return;
            }
            "endif" => {
                if conditionals.pop().is_none() {
                    self.sink
                        .emit(errors::unmatched_conditional(&token.text, token.span));
                }
                return;
            }
            _ => {}
        }

        if !is_active(conditionals) {
            return;
        }

        match name.as_str() {
            "define" => self.define_directive(&token, stream),
            "undef" => match stream.next_on_line() {
                Some(name) if name.kind != VerilogToken::Directive => {
                    if self.defines.remove(&name.text).is_none() {
                        self.sink.emit(Diagnostic::warning(
                            errors::W102,
                            format!("`undef argument '{}' was not previously defined", name.text),
                            name.span,
                        ));
                    }
                }
                _ => self.sink.emit(errors::bad_argument("undef", token.span)),
            },
            "undefineall" | "resetall" => self.defines.clear(),
            "include" => self.include(&token, stream, dir, out),
            "timescale" | "default_nettype" | "unconnected_drive" | "line"
            | "begin_keywords" => {
                stream.skip_line();
            }
            "celldefine" | "endcelldefine" | "nounconnected_drive" | "end_keywords" => {}
            "pragma" => self.pragma(stream),
            macro_name if self.defines.contains_key(macro_name) => {
                let expanded = self.expand_macro(&token, stream);
                self.depth += 1;
                self.process(expanded, dir, out);
                self.depth -= 1;
            }
            other => tracing::debug!("ignoring undefined macro or unknown directive `{other}"),
        }
    }

    /// Reads the macro name after `` `ifdef ``/`` `ifndef ``/`` `elsif `` and
    /// reports whether it is defined.
    fn condition_argument(&mut self, directive: &Token, stream: &mut TokenStream) -> bool {
        match stream.next_on_line() {
            Some(arg) if arg.kind == VerilogToken::Identifier => self.defines.contains_key(&arg.text),
            Some(arg) => {
                self.sink.emit(errors::bad_argument(&directive.text, arg.span));
                false
            }
            None => {
                self.sink
                    .emit(errors::bad_argument(&directive.text, directive.span));
                false
            }
        }
    }

    fn define_directive(&mut self, directive: &Token, stream: &mut TokenStream) {
        let name = match stream.next_on_line() {
            Some(name) if name.text.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') => {
                name
            }
            _ => {
                self.sink.emit(errors::bad_argument("define", directive.span));
                stream.skip_line();
                return;
            }
        };

        let mut args = Vec::new();
        let mut defaults = HashMap::new();
        let function_like = matches!(
            stream.peek(),
            Some(t) if t.kind == VerilogToken::LeftParen && t.span.start == name.span.end
        );
        if function_like {
            stream.next();
            loop {
                let Some(token) = stream.next_on_line() else {
                    self.sink.emit(errors::bad_argument("define", name.span));
                    stream.skip_line();
                    return;
                };
                match token.kind {
                    VerilogToken::RightParen => break,
                    VerilogToken::Identifier => {
                        args.push(token.text.clone());
                        if stream.peek().map(|t| t.kind) == Some(VerilogToken::Equals) {
                            stream.next();
                            let default = collect_default(stream);
                            defaults.insert(token.text, default);
                        }
                    }
                    _ => {}
                }
            }
        }

        let body = stream.skip_line();
        tracing::debug!(name = %name.text, args = args.len(), "defined macro");
        self.defines.insert(
            name.text.clone(),
            Macro {
                name: name.text,
                args,
                defaults,
                body,
                function_like,
            },
        );
    }

    /// Returns the expansion of the macro call `token`, consuming its actual
    /// arguments from `stream`.
    fn expand_macro(&mut self, token: &Token, stream: &mut TokenStream) -> Vec<Token> {
        if self.depth >= MAX_EXPANSION_DEPTH {
            self.sink.emit(Diagnostic::error(
                errors::E106,
                format!("circular macro expansion of `{} detected", token.text),
                token.span,
            ));
            return Vec::new();
        }
        let Some(definition) = self.defines.get(&token.text).cloned() else {
            return Vec::new();
        };
        if !definition.function_like {
            return definition.body;
        }

        let Some(mut values) = parse_actuals(stream) else {
            self.sink.emit(Diagnostic::warning(
                errors::W104,
                format!("bad argument list in call of `{}", token.text),
                token.span,
            ));
            return Vec::new();
        };
        if values.len() > definition.args.len() && !(definition.args.is_empty() && values == [vec![]]) {
            self.sink.emit(Diagnostic::warning(
                errors::W104,
                format!(
                    "too many arguments to `{}: got {} expected {}",
                    token.text,
                    values.len(),
                    definition.args.len()
                ),
                token.span,
            ));
            return Vec::new();
        }
        values.resize(definition.args.len(), Vec::new());
        for (value, arg) in values.iter_mut().zip(&definition.args) {
            if !value.is_empty() {
                continue;
            }
            if let Some(default) = definition.defaults.get(arg) {
                *value = default.clone();
            }
        }
        definition.expand(&values)
    }

    fn include(
        &mut self,
        directive: &Token,
        stream: &mut TokenStream,
        dir: Option<&Path>,
        out: &mut Vec<Token>,
    ) {
        let argument = match stream.next_on_line() {
            Some(t) if t.kind == VerilogToken::StringLiteral => Some(t),
            Some(t) if t.kind == VerilogToken::Directive && self.defines.contains_key(&t.text) => {
                self.expand_macro(&t, stream)
                    .into_iter()
                    .find(|t| t.kind == VerilogToken::StringLiteral)
            }
            _ => None,
        };
        let Some(file_name) = argument else {
            self.sink.emit(errors::bad_argument("include", directive.span));
            return;
        };

        let Some(path) = self.find_included_file(dir, &file_name.text) else {
            // Simulators ship many headers of their own, so this is not a warning.
            tracing::debug!("could not find `include file {}", file_name.text);
            return;
        };
        if self.include_stack.contains(&path) {
            self.sink.emit(Diagnostic::error(
                errors::E105,
                format!("circular `include of {} detected", file_name.text),
                file_name.span,
            ));
            return;
        }

        let (file_id, bytes) = match self.source_db.load_file(&path) {
            Ok(loaded) => loaded,
            Err(err) => {
                self.sink.emit(Diagnostic::error(
                    errors::E107,
                    format!("failed to read `include file {}: {err}", path.display()),
                    file_name.span,
                ));
                return;
            }
        };
        if !self.included_files.iter().any(|f| f.path == path) {
            self.included_files.push(IncludedFile {
                path: path.clone(),
                hash: ContentHash::from_bytes(&bytes),
            });
        }
        let text = self
            .source_db
            .get(file_id)
            .map(|f| f.content.clone())
            .unwrap_or_default();
        let tokens = match lex(&text, file_id) {
            Ok(tokens) => tokens,
            Err(err) => {
                self.sink
                    .emit(Diagnostic::error(errors::E107, err.message, err.span));
                return;
            }
        };

        self.include_stack.push(path.clone());
        self.process(tokens, path.parent(), out);
        self.include_stack.pop();
    }

    fn find_included_file(&self, dir: Option<&Path>, name: &str) -> Option<PathBuf> {
        dir.into_iter()
            .chain(self.include_dirs.iter().map(PathBuf::as_path))
            .map(|d| d.join(name))
            .find(|candidate| candidate.is_file())
            .map(|found| normalize_path(&found))
    }

    /// Skips `` `pragma protect begin_protected `` regions.
    fn pragma(&mut self, stream: &mut TokenStream) {
        let args = stream.skip_line();
        let begins_region = args.len() >= 2
            && args[0].is_identifier("protect")
            && args[1].is_identifier("begin_protected");
        if !begins_region {
            return;
        }
        while let Some(token) = stream.next() {
            match token.kind {
                VerilogToken::Eof => return,
                VerilogToken::Directive if token.text == "pragma" => {
                    let args = stream.skip_line();
                    if args.len() >= 2
                        && args[0].is_identifier("protect")
                        && args[1].is_identifier("end_protected")
                    {
                        return;
                    }
                }
                _ => {}
            }
        }
    }
}

/// Collects a default argument value up to the next top-level `,` or `)`.
fn collect_default(stream: &mut TokenStream) -> Vec<Token> {
    let mut value = Vec::new();
    let mut depth = 0usize;
    while let Some(token) = stream.peek() {
        match token.kind {
            VerilogToken::Newline | VerilogToken::Eof => break,
            VerilogToken::Comma | VerilogToken::RightParen if depth == 0 => break,
            VerilogToken::LeftParen | VerilogToken::LeftBracket | VerilogToken::LeftBrace => {
                depth += 1
            }
            VerilogToken::RightParen | VerilogToken::RightBracket | VerilogToken::RightBrace => {
                depth = depth.saturating_sub(1)
            }
            _ => {}
        }
        if let Some(token) = stream.next() {
            value.push(token);
        }
    }
    value
}

/// Parses `(a, b[1:0], {c, d})` into one token list per actual argument.
fn parse_actuals(stream: &mut TokenStream) -> Option<Vec<Vec<Token>>> {
    while stream.peek().map(|t| t.kind) == Some(VerilogToken::Newline) {
        stream.next();
    }
    if stream.next()?.kind != VerilogToken::LeftParen {
        return None;
    }
    let mut values = Vec::new();
    let mut value = Vec::new();
    let mut depth = 0usize;
    loop {
        let token = stream.next()?;
        match token.kind {
            VerilogToken::Eof => return None,
            VerilogToken::Newline => continue,
            VerilogToken::RightParen if depth == 0 => {
                values.push(value);
                return Some(values);
            }
            VerilogToken::Comma if depth == 0 => {
                values.push(std::mem::take(&mut value));
                continue;
            }
            VerilogToken::LeftParen | VerilogToken::LeftBracket | VerilogToken::LeftBrace => {
                depth += 1
            }
            VerilogToken::RightParen | VerilogToken::RightBracket | VerilogToken::RightBrace => {
                depth = depth.saturating_sub(1)
            }
            _ => {}
        }
        value.push(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vunit_diagnostics::Severity;

    fn preprocess(source: &str, defines: &[(&str, &str)]) -> (Vec<String>, Vec<Diagnostic>) {
        let mut db = SourceDb::new();
        let sink = DiagnosticSink::new();
        let id = db.add_source("top.sv", source.to_string());
        let tokens = lex(source, id).unwrap();
        let mut pp = Preprocessor::new(&mut db, &sink, Vec::new());
        for (name, value) in defines {
            pp.define(name, value);
        }
        let out = pp.run(tokens, Path::new("top.sv"));
        (out.into_iter().map(|t| t.text).collect(), sink.take_all())
    }

    fn texts(source: &str) -> Vec<String> {
        let (out, diags) = preprocess(source, &[]);
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        out
    }

    #[test]
    fn object_like_macro() {
        assert_eq!(
            texts("`define WIDTH 8\nlogic [`WIDTH-1:0] x;"),
            vec!["logic", "[", "8", "-", "1", ":", "0", "]", "x", ";"]
        );
    }

    #[test]
    fn function_like_macro_with_default() {
        assert_eq!(
            texts("`define INST(m, n=u0) m n();\n`INST(fifo)"),
            vec!["fifo", "u0", "(", ")", ";"]
        );
    }

    #[test]
    fn space_before_paren_makes_object_like() {
        assert_eq!(texts("`define P (1)\n`P"), vec!["(", "1", ")"]);
    }

    #[test]
    fn ifdef_else_chains() {
        let source = "`ifdef A\na\n`elsif B\nb\n`else\nc\n`endif\n";
        assert_eq!(preprocess(source, &[]).0, vec!["c"]);
        assert_eq!(preprocess(source, &[("B", "")]).0, vec!["b"]);
        assert_eq!(preprocess(source, &[("A", ""), ("B", "")]).0, vec!["a"]);
    }

    #[test]
    fn nested_conditionals_in_inactive_branch() {
        let source = "`ifndef SIM\n`ifdef X\nx\n`else\ny\n`endif\n`endif\nz";
        assert_eq!(preprocess(source, &[("SIM", "1")]).0, vec!["z"]);
        assert_eq!(preprocess(source, &[]).0, vec!["y", "z"]);
    }

    #[test]
    fn define_inside_inactive_branch_is_ignored() {
        let source = "`ifdef NEVER\n`define M bad\n`endif\n`ifdef M\nm\n`endif";
        assert!(texts(source).is_empty());
    }

    #[test]
    fn undef_and_resetall() {
        assert!(texts("`define A\n`undef A\n`ifdef A\na\n`endif").is_empty());
        assert!(texts("`define A\n`resetall\n`ifdef A\na\n`endif").is_empty());

        let (_, diags) = preprocess("`undef NOPE", &[]);
        assert_eq!(diags[0].code, errors::W102);
    }

    #[test]
    fn ignored_directives() {
        assert_eq!(
            texts("`timescale 1ns/1ps\n`celldefine\nmodule m; endmodule"),
            vec!["module", "m", ";", "endmodule"]
        );
    }

    #[test]
    fn protected_region_is_skipped() {
        let source =
            "`pragma protect begin_protected\nsecret stuff\n`pragma protect end_protected\nvisible";
        assert_eq!(texts(source), vec!["visible"]);
    }

    #[test]
    fn unterminated_ifdef_warns() {
        let (_, diags) = preprocess("`ifdef A\nmodule m;", &[]);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert_eq!(diags[0].code, errors::W103);
    }

    #[test]
    fn recursive_macro_is_cut_off() {
        let (_, diags) = preprocess("`define LOOP `LOOP\n`LOOP", &[]);
        assert!(diags.iter().any(|d| d.code == errors::E106));
    }

    #[test]
    fn include_from_own_directory_and_include_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let inc = dir.path().join("inc");
        std::fs::create_dir(&inc).unwrap();
        std::fs::write(dir.path().join("local.svh"), "`define LOCAL 1\n").unwrap();
        std::fs::write(inc.join("shared.svh"), "package shared_pkg; endpackage\n").unwrap();
        let top = dir.path().join("top.sv");
        let source = "`include \"local.svh\"\n`include \"shared.svh\"\n`ifdef LOCAL\nok\n`endif";
        std::fs::write(&top, source).unwrap();

        let mut db = SourceDb::new();
        let sink = DiagnosticSink::new();
        let (id, _) = db.load_file(&top).unwrap();
        let tokens = lex(source, id).unwrap();
        let mut pp = Preprocessor::new(&mut db, &sink, vec![inc.clone()]);
        let out: Vec<String> = pp.run(tokens, &top).into_iter().map(|t| t.text).collect();

        assert_eq!(out, vec!["package", "shared_pkg", ";", "endpackage", "ok"]);
        let included: Vec<_> = pp.included_files().iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            included,
            vec![
                normalize_path(&dir.path().join("local.svh")),
                normalize_path(&inc.join("shared.svh"))
            ]
        );
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn circular_include_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.svh"), "`include \"b.svh\"\n").unwrap();
        std::fs::write(dir.path().join("b.svh"), "`include \"a.svh\"\n").unwrap();
        let top = dir.path().join("top.sv");
        let source = "`include \"a.svh\"\n";
        std::fs::write(&top, source).unwrap();

        let mut db = SourceDb::new();
        let sink = DiagnosticSink::new();
        let (id, _) = db.load_file(&top).unwrap();
        let tokens = lex(source, id).unwrap();
        let mut pp = Preprocessor::new(&mut db, &sink, Vec::new());
        pp.run(tokens, &top);

        let diags = sink.take_all();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, errors::E105);
        assert_eq!(diags[0].message, "circular `include of a.svh detected");
    }

    #[test]
    fn missing_include_is_silent() {
        let (out, diags) = preprocess("`include \"uvm_macros.svh\"\nmodule m; endmodule", &[]);
        assert!(diags.is_empty());
        assert_eq!(out.len(), 4);
    }
}
