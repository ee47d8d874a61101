//! Token-level scanner extracting design units and references.
//!
//! The scanner walks the token stream once, recognising unit headers such as
//! `entity e is` or `architecture a of e is` and the clauses that create
//! dependencies. It never fails: tokens it does not understand are skipped.

use crate::ast::*;
use crate::token::{Token, VhdlToken};
use vunit_common::UnitName;
use vunit_source::Span;

/// The design unit whose `end` has not been seen yet.
struct OpenUnit {
    keyword: VhdlToken,
    name: UnitName,
}

/// One part of a selected name such as `ieee.std_logic_1164.all`.
struct NamePart {
    name: UnitName,
    span: Span,
}

pub(crate) struct Scanner<'a> {
    tokens: &'a [Token],
    source: &'a str,
    pos: usize,
    open_unit: Option<OpenUnit>,
    result: VhdlDesignFile,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(tokens: &'a [Token], source: &'a str) -> Self {
        Self {
            tokens,
            source,
            pos: 0,
            open_unit: None,
            result: VhdlDesignFile::default(),
        }
    }

    pub(crate) fn scan(mut self) -> VhdlDesignFile {
        while self.kind(self.pos) != VhdlToken::Eof {
            match self.kind(self.pos) {
                VhdlToken::Library => self.library_clause(),
                VhdlToken::Use => self.use_clause(),
                VhdlToken::Context => self.context(),
                VhdlToken::Entity => self.entity(),
                VhdlToken::Architecture => self.architecture(),
                VhdlToken::Package => self.package(),
                VhdlToken::Configuration => self.configuration(),
                VhdlToken::Colon => self.component_instantiation(),
                VhdlToken::End => self.end(),
                _ => {}
            }
            self.pos += 1;
        }
        self.result
    }

    fn kind(&self, at: usize) -> VhdlToken {
        self.tokens.get(at).map_or(VhdlToken::Eof, |t| t.kind)
    }

    fn span(&self, at: usize) -> Span {
        self.tokens
            .get(at)
            .or_else(|| self.tokens.last())
            .map_or(Span::DUMMY, |t| t.span)
    }

    fn text(&self, at: usize) -> &'a str {
        let span = self.span(at);
        self.source
            .get(span.start as usize..span.end as usize)
            .unwrap_or("")
    }

    fn name(&self, at: usize) -> UnitName {
        UnitName::new(self.text(at))
    }

    fn ident(&self, at: usize) -> Ident {
        Ident {
            name: self.name(at),
            span: self.span(at),
        }
    }

    fn previous(&self) -> VhdlToken {
        match self.pos {
            0 => VhdlToken::Eof,
            p => self.kind(p - 1),
        }
    }

    /// Matches `<keyword> <name> is` at the current position.
    fn is_declaration_header(&self) -> bool {
        self.kind(self.pos + 1).is_name() && self.kind(self.pos + 2) == VhdlToken::Is
    }

    /// Parses a selected name starting at `at`; returns its parts and the
    /// index of the first token after it.
    fn selected_name(&self, mut at: usize) -> (Vec<NamePart>, usize) {
        let mut parts = Vec::new();
        if !self.kind(at).is_name() {
            return (parts, at);
        }
        parts.push(NamePart {
            name: self.name(at),
            span: self.span(at),
        });
        at += 1;
        while self.kind(at) == VhdlToken::Dot
            && (self.kind(at + 1).is_name() || self.kind(at + 1) == VhdlToken::All)
        {
            parts.push(NamePart {
                name: self.name(at + 1),
                span: self.span(at + 1),
            });
            at += 2;
        }
        (parts, at)
    }

    fn push_reference(
        &mut self,
        kind: ReferenceKind,
        parts: &[NamePart],
        name_within: NameWithin,
    ) {
        let (library, unit) = match parts {
            [unit] => (UnitName::new("work"), unit),
            [library, unit, ..] => (library.name.clone(), unit),
            [] => return,
        };
        if unit.name.matches("all") {
            return;
        }
        self.result.references.push(VhdlReference {
            kind,
            library,
            unit: unit.name.clone(),
            name_within,
            span: parts[0].span.to(unit.span),
        });
    }

    fn open(&mut self, keyword: VhdlToken, name: UnitName) {
        self.open_unit = Some(OpenUnit { keyword, name });
    }

    /// `library a, b;`
    fn library_clause(&mut self) {
        let mut at = self.pos + 1;
        while self.kind(at).is_name() {
            self.result.libraries.push(self.name(at));
            if self.kind(at + 1) != VhdlToken::Comma {
                break;
            }
            at += 2;
        }
    }

    /// `use lib.pkg.all, lib.other;` or a binding indication
    /// `use entity lib.ent(arch)` / `use configuration lib.cfg`.
    fn use_clause(&mut self) {
        match self.kind(self.pos + 1) {
            // Handled when the scanner reaches the keyword itself.
            VhdlToken::Entity | VhdlToken::Configuration => return,
            _ => {}
        }
        let mut at = self.pos + 1;
        loop {
            let (parts, next) = self.selected_name(at);
            if parts.len() >= 2 {
                self.push_reference(ReferenceKind::Package, &parts, NameWithin::None);
            }
            if parts.is_empty() || self.kind(next) != VhdlToken::Comma {
                break;
            }
            at = next + 1;
        }
    }

    /// `context c is` declares; `context lib.c;` references.
    fn context(&mut self) {
        if self.previous() == VhdlToken::End {
            return;
        }
        if self.is_declaration_header() {
            let name = self.ident(self.pos + 1);
            self.open(VhdlToken::Context, name.name.clone());
            self.result.contexts.push(ContextDecl { name });
            return;
        }
        let mut at = self.pos + 1;
        loop {
            let (parts, next) = self.selected_name(at);
            self.push_reference(ReferenceKind::Context, &parts, NameWithin::None);
            if parts.is_empty() || self.kind(next) != VhdlToken::Comma {
                break;
            }
            at = next + 1;
        }
    }

    /// `entity e is` declares; `: entity lib.e(arch)` and
    /// `use entity lib.e(arch)` reference.
    fn entity(&mut self) {
        if self.previous() == VhdlToken::End {
            return;
        }
        if self.is_declaration_header() {
            let name = self.ident(self.pos + 1);
            let generics = self.generic_names(self.pos + 3);
            self.open(VhdlToken::Entity, name.name.clone());
            self.result.entities.push(EntityDecl { name, generics });
            return;
        }
        let (parts, next) = self.selected_name(self.pos + 1);
        let name_within = if self.kind(next) == VhdlToken::LeftParen
            && self.kind(next + 1).is_name()
            && self.kind(next + 2) == VhdlToken::RightParen
        {
            NameWithin::Named(self.name(next + 1))
        } else {
            NameWithin::None
        };
        self.push_reference(ReferenceKind::Entity, &parts, name_within);
    }

    /// Collects formal names from a `generic (...)` clause starting at `at`.
    fn generic_names(&self, at: usize) -> Vec<UnitName> {
        let mut names = Vec::new();
        if self.kind(at) != VhdlToken::Generic || self.kind(at + 1) != VhdlToken::LeftParen {
            return names;
        }
        let mut depth = 1;
        let mut at = at + 2;
        let mut element_start = true;
        while depth > 0 {
            match self.kind(at) {
                VhdlToken::Eof => break,
                VhdlToken::LeftParen => depth += 1,
                VhdlToken::RightParen => depth -= 1,
                VhdlToken::Semicolon if depth == 1 => element_start = true,
                // Interface class keywords such as `constant` or `type`.
                VhdlToken::Reserved | VhdlToken::Package if depth == 1 && element_start => {}
                kind if depth == 1 && element_start && kind.is_name() => {
                    names.push(self.name(at));
                    element_start = self.kind(at + 1) == VhdlToken::Comma;
                    if element_start {
                        at += 1;
                    }
                }
                _ if depth == 1 => element_start = false,
                _ => {}
            }
            at += 1;
        }
        names
    }

    /// `architecture a of e is`
    fn architecture(&mut self) {
        if self.previous() == VhdlToken::End {
            return;
        }
        if self.kind(self.pos + 1).is_name()
            && self.kind(self.pos + 2) == VhdlToken::Of
            && self.kind(self.pos + 3).is_name()
            && self.kind(self.pos + 4) == VhdlToken::Is
        {
            let name = self.ident(self.pos + 1);
            let entity = self.name(self.pos + 3);
            self.open(VhdlToken::Architecture, name.name.clone());
            self.result
                .architectures
                .push(ArchitectureDecl { name, entity });
        }
    }

    /// `package p is`, `package body p is` and `package p is new lib.g`.
    fn package(&mut self) {
        if self.previous() == VhdlToken::End {
            return;
        }
        if self.kind(self.pos + 1) == VhdlToken::Body {
            if self.kind(self.pos + 2).is_name() && self.kind(self.pos + 3) == VhdlToken::Is {
                let name = self.ident(self.pos + 2);
                self.open(VhdlToken::Package, name.name.clone());
                self.result.package_bodies.push(PackageBodyDecl { name });
            }
            return;
        }
        if !self.is_declaration_header() {
            return;
        }
        let name = self.ident(self.pos + 1);
        if self.kind(self.pos + 3) != VhdlToken::New {
            self.open(VhdlToken::Package, name.name.clone());
            self.result.packages.push(PackageDecl { name });
            return;
        }

        let (parts, _) = self.selected_name(self.pos + 4);
        if parts.is_empty() {
            return;
        }
        self.push_reference(ReferenceKind::Package, &parts, NameWithin::None);
        if self.open_unit.is_none() {
            let (library, generic_package) = match parts.as_slice() {
                [unit] => (UnitName::new("work"), unit.name.clone()),
                [library, unit, ..] => (library.name.clone(), unit.name.clone()),
                [] => return,
            };
            self.result.package_instances.push(PackageInstanceDecl {
                name,
                library,
                generic_package,
            });
        }
    }

    /// `configuration c of e is for arch` declares; `: configuration lib.c`
    /// and `use configuration lib.c` reference.
    fn configuration(&mut self) {
        if self.previous() == VhdlToken::End {
            return;
        }
        if self.kind(self.pos + 1).is_name()
            && self.kind(self.pos + 2) == VhdlToken::Of
            && self.kind(self.pos + 3).is_name()
            && self.kind(self.pos + 4) == VhdlToken::Is
        {
            let name = self.ident(self.pos + 1);
            let entity = self.name(self.pos + 3);
            let architecture = self.block_configuration(self.pos + 5);
            self.open(VhdlToken::Configuration, name.name.clone());
            self.result.configurations.push(ConfigurationDecl {
                name,
                entity,
                architecture,
            });
            return;
        }
        let (parts, _) = self.selected_name(self.pos + 1);
        self.push_reference(ReferenceKind::Configuration, &parts, NameWithin::None);
    }

    /// Finds the architecture of the first `for <arch>` after `at`.
    fn block_configuration(&self, mut at: usize) -> Option<UnitName> {
        loop {
            match self.kind(at) {
                VhdlToken::For if self.kind(at + 1).is_name() => return Some(self.name(at + 1)),
                VhdlToken::End | VhdlToken::Eof => return None,
                _ => at += 1,
            }
        }
    }

    /// `label : [component] [lib.]comp (generic|port) map` or
    /// `label : component comp`.
    fn component_instantiation(&mut self) {
        if self.pos == 0 || !self.kind(self.pos - 1).is_name() {
            return;
        }
        let mut at = self.pos + 1;
        let explicit = self.kind(at) == VhdlToken::Component;
        if explicit {
            at += 1;
        }
        let (parts, next) = self.selected_name(at);
        let Some(component) = parts.last() else {
            return;
        };
        if parts.len() > 2 {
            return;
        }
        let has_map = matches!(self.kind(next), VhdlToken::Generic | VhdlToken::Port)
            && self.kind(next + 1) == VhdlToken::Map;
        if has_map || (explicit && self.kind(next) == VhdlToken::Semicolon) {
            self.result.component_instantiations.push(Ident {
                name: component.name.clone(),
                span: component.span,
            });
        }
    }

    /// `end [keyword [body]] [name] ;` closes the open design unit when the
    /// keyword or name matches it.
    fn end(&mut self) {
        let Some(open) = &self.open_unit else {
            return;
        };
        let mut at = self.pos + 1;
        let closes = if self.kind(at) == open.keyword {
            true
        } else {
            if self.kind(at) == VhdlToken::Body {
                at += 1;
            }
            self.kind(at).is_name()
                && self.name(at) == open.name
                && self.kind(at + 1) == VhdlToken::Semicolon
        };
        if closes {
            self.open_unit = None;
        }
    }
}
