//! Scans preprocessed tokens for modules, packages and references.

use crate::ast::{Ident, ModuleDecl, VerilogDesignFile};
use crate::token::{Token, VerilogToken};
use vunit_common::UnitName;

/// Builds the design-file summary from a preprocessed token stream.
///
/// `tokens` must not contain [`VerilogToken::Newline`] tokens.
pub fn scan_tokens(tokens: &[Token]) -> VerilogDesignFile {
    VerilogDesignFile {
        modules: find_modules(tokens),
        packages: find_packages(tokens),
        imports: find_imports(tokens),
        package_references: find_package_references(tokens),
        instances: find_instances(tokens),
        included_files: Vec::new(),
    }
}

fn kind_at(tokens: &[Token], idx: usize) -> VerilogToken {
    tokens.get(idx).map_or(VerilogToken::Eof, |t| t.kind)
}

fn ident(token: &Token) -> Ident {
    Ident {
        name: UnitName::new(token.text.as_str()),
        span: token.span,
    }
}

/// Top-level modules; nested module declarations are skipped.
fn find_modules(tokens: &[Token]) -> Vec<ModuleDecl> {
    let mut modules = Vec::new();
    let mut current: Option<ModuleDecl> = None;
    let mut balance = 0usize;
    let mut idx = 0;
    while idx < tokens.len() {
        match tokens[idx].kind {
            VerilogToken::Module => {
                if balance == 0 {
                    // Optional lifetime: `module automatic m`
                    let mut name_idx = idx + 1;
                    if kind_at(tokens, name_idx) == VerilogToken::Reserved {
                        name_idx += 1;
                    }
                    current = tokens
                        .get(name_idx)
                        .filter(|t| t.kind == VerilogToken::Identifier)
                        .map(|t| ModuleDecl {
                            name: ident(t),
                            parameters: Vec::new(),
                        });
                }
                balance += 1;
            }
            VerilogToken::Endmodule => {
                balance = balance.saturating_sub(1);
                if balance == 0 {
                    modules.extend(current.take());
                }
            }
            VerilogToken::Parameter if balance == 1 => {
                if let Some(module) = current.as_mut() {
                    idx = parameter_names(tokens, idx + 1, &mut module.parameters);
                    continue;
                }
            }
            _ => {}
        }
        idx += 1;
    }
    modules
}

/// Collects the names declared by one `parameter` declaration starting at
/// `idx`, e.g. `parameter int unsigned W = 8, D = 4`. Returns the index of
/// the token that ends it.
fn parameter_names(tokens: &[Token], mut idx: usize, names: &mut Vec<String>) -> usize {
    let mut last_identifier: Option<&Token> = None;
    let mut depth = 0usize;
    let mut in_default = false;
    while idx < tokens.len() {
        let token = &tokens[idx];
        match token.kind {
            VerilogToken::LeftParen | VerilogToken::LeftBracket | VerilogToken::LeftBrace => {
                depth += 1
            }
            VerilogToken::RightParen | VerilogToken::RightBracket | VerilogToken::RightBrace
                if depth > 0 =>
            {
                depth -= 1
            }
            VerilogToken::RightParen | VerilogToken::Semicolon | VerilogToken::Parameter => {
                break
            }
            VerilogToken::Equals if depth == 0 && !in_default => {
                names.extend(last_identifier.take().map(|t| t.text.clone()));
                in_default = true;
            }
            VerilogToken::Comma if depth == 0 => {
                if !in_default {
                    names.extend(last_identifier.take().map(|t| t.text.clone()));
                }
                // Another name follows only if it is directly assigned.
                if kind_at(tokens, idx + 1) != VerilogToken::Identifier
                    || kind_at(tokens, idx + 2) != VerilogToken::Equals
                {
                    break;
                }
                in_default = false;
            }
            VerilogToken::Identifier if depth == 0 && !in_default => last_identifier = Some(token),
            _ => {}
        }
        idx += 1;
    }
    if !in_default {
        names.extend(last_identifier.map(|t| t.text.clone()));
    }
    idx
}

fn find_packages(tokens: &[Token]) -> Vec<Ident> {
    tokens
        .windows(2)
        .filter(|w| w[0].kind == VerilogToken::Package && w[1].kind == VerilogToken::Identifier)
        .map(|w| ident(&w[1]))
        .collect()
}

/// `import pkg::*;` and `import a::x, b::y;`
fn find_imports(tokens: &[Token]) -> Vec<Ident> {
    let mut imports = Vec::new();
    let mut idx = 0;
    while idx < tokens.len() {
        if tokens[idx].kind != VerilogToken::Import {
            idx += 1;
            continue;
        }
        idx += 1;
        while idx < tokens.len() && tokens[idx].kind != VerilogToken::Semicolon {
            if tokens[idx].kind == VerilogToken::Identifier
                && kind_at(tokens, idx + 1) == VerilogToken::DoubleColon
                && (idx == 0 || tokens[idx - 1].kind != VerilogToken::DoubleColon)
            {
                imports.push(ident(&tokens[idx]));
            }
            idx += 1;
        }
    }
    imports
}

/// `pkg::name` outside import statements.
fn find_package_references(tokens: &[Token]) -> Vec<Ident> {
    let mut references = Vec::new();
    let mut idx = 0;
    while idx < tokens.len() {
        match tokens[idx].kind {
            VerilogToken::Import => {
                while idx < tokens.len() && tokens[idx].kind != VerilogToken::Semicolon {
                    idx += 1;
                }
            }
            VerilogToken::Identifier if kind_at(tokens, idx + 1) == VerilogToken::DoubleColon => {
                references.push(ident(&tokens[idx]));
                // Skip the rest of a chained name such as `a::b::c`.
                while matches!(
                    kind_at(tokens, idx + 1),
                    VerilogToken::DoubleColon | VerilogToken::Identifier
                ) {
                    idx += 1;
                }
            }
            _ => {}
        }
        idx += 1;
    }
    references
}

/// Names in instantiation position: `name #(...)` or `name instance`.
fn find_instances(tokens: &[Token]) -> Vec<Ident> {
    let mut instances = Vec::new();
    let mut idx = 0;
    while idx < tokens.len() {
        let token = &tokens[idx];
        match token.kind {
            // Block labels: `begin : name`, `end : name`
            VerilogToken::Begin | VerilogToken::End
                if kind_at(tokens, idx + 1) == VerilogToken::Colon =>
            {
                idx += 3;
                continue;
            }
            VerilogToken::Identifier if !is_scoped_or_declared(tokens, idx) => {
                if matches!(
                    kind_at(tokens, idx + 1),
                    VerilogToken::Hash | VerilogToken::Identifier
                ) {
                    instances.push(ident(token));
                }
            }
            _ => {}
        }
        idx += 1;
    }
    instances
}

/// `true` for `pkg::name` and for the name in `module [lifetime] name #(...)`.
fn is_scoped_or_declared(tokens: &[Token], idx: usize) -> bool {
    let before = |n: usize| {
        idx.checked_sub(n)
            .map_or(VerilogToken::Eof, |i| tokens[i].kind)
    };
    match before(1) {
        VerilogToken::DoubleColon | VerilogToken::Module => true,
        VerilogToken::Reserved => before(2) == VerilogToken::Module,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use vunit_source::FileId;

    fn scan(source: &str) -> VerilogDesignFile {
        let tokens: Vec<Token> = lex(source, FileId::from_raw(0))
            .unwrap()
            .into_iter()
            .filter(|t| t.kind != VerilogToken::Newline)
            .collect();
        scan_tokens(&tokens)
    }

    fn names(idents: &[Ident]) -> Vec<&str> {
        idents.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn modules_with_parameters() {
        let file = scan(
            "module top #(parameter int WIDTH = 8, DEPTH = 4, parameter logic [3:0] INIT = 4'h0)
               (input clk);
               parameter STEP = 2;
               localparam HIDDEN = 1;
             endmodule

             module automatic other;
             endmodule",
        );
        let modules: Vec<_> = file.modules.iter().map(|m| m.name.name.as_str()).collect();
        assert_eq!(modules, vec!["top", "other"]);
        assert_eq!(file.modules[0].parameters, vec!["WIDTH", "DEPTH", "INIT", "STEP"]);
        assert!(file.modules[1].parameters.is_empty());
    }

    #[test]
    fn packages_and_imports() {
        let file = scan(
            "package bus_pkg;
               import base_pkg::*;
               typedef logic [7:0] byte_t;
             endpackage

             module m;
               import a_pkg::x, b_pkg::y;
               initial $display(cfg_pkg::NAME, bus_pkg::byte_t'(1));
             endmodule",
        );
        assert_eq!(names(&file.packages), vec!["bus_pkg"]);
        assert_eq!(names(&file.imports), vec!["base_pkg", "a_pkg", "b_pkg"]);
        assert_eq!(names(&file.package_references), vec!["cfg_pkg", "bus_pkg"]);
    }

    #[test]
    fn instances() {
        let file = scan(
            "module top #(parameter P = 1) ();
               fifo #(.DEPTH(4)) u_fifo (.clk(clk));
               ram u_ram (.clk(clk));
               wire w;
               always @(posedge clk) begin : seq
                 count <= count + 1;
               end : seq
               bus_pkg::cfg_t cfg;
             endmodule",
        );
        assert_eq!(names(&file.instances), vec!["fifo", "ram"]);
    }
}
