//! Design units declared by source files.

use serde::{Deserialize, Serialize};
use std::fmt;
use vunit_common::UnitName;
use vunit_source::Span;

use crate::source_file::SourceFileId;

/// The kind of a design unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// VHDL `entity`.
    Entity,
    /// VHDL `architecture`; secondary to an entity.
    Architecture,
    /// VHDL or SystemVerilog `package`.
    Package,
    /// VHDL `package body`; secondary to a package.
    PackageBody,
    /// VHDL `package p is new g`.
    PackageInstance,
    /// VHDL `context`.
    Context,
    /// VHDL `configuration`.
    Configuration,
    /// Verilog `module`.
    Module,
}

impl UnitKind {
    /// Returns `true` for units that live in the library's primary namespace.
    pub fn is_primary(self) -> bool {
        !matches!(self, UnitKind::Architecture | UnitKind::PackageBody)
    }

    /// Returns `true` for kinds a `use` clause resolves to as a package.
    pub fn is_package_like(self) -> bool {
        matches!(self, UnitKind::Package | UnitKind::PackageInstance)
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnitKind::Entity => "entity",
            UnitKind::Architecture => "architecture",
            UnitKind::Package => "package",
            UnitKind::PackageBody => "package body",
            UnitKind::PackageInstance => "package instance",
            UnitKind::Context => "context",
            UnitKind::Configuration => "configuration",
            UnitKind::Module => "module",
        })
    }
}

/// One declared design unit.
///
/// Secondary units carry the name of their primary unit in `primary`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignUnit {
    /// Unit name as written in the declaration.
    pub name: UnitName,
    /// The kind of declaration.
    pub kind: UnitKind,
    /// Owning library.
    pub library: UnitName,
    /// Declaring file.
    pub source_file: SourceFileId,
    /// Primary unit of an architecture, package body or configuration.
    pub primary: Option<UnitName>,
    /// Entity generics or module parameters.
    pub generic_names: Vec<String>,
    /// Architecture selected by a configuration's top block.
    pub configured_architecture: Option<UnitName>,
    /// `(library, package)` instantiated by a package instance.
    pub generic_package: Option<(UnitName, UnitName)>,
    /// Where the unit is declared.
    pub span: Span,
}

impl DesignUnit {
    /// Creates a unit with no secondary relations.
    pub fn new(
        name: UnitName,
        kind: UnitKind,
        library: UnitName,
        source_file: SourceFileId,
        span: Span,
    ) -> Self {
        Self {
            name,
            kind,
            library,
            source_file,
            primary: None,
            generic_names: Vec::new(),
            configured_architecture: None,
            generic_package: None,
            span,
        }
    }

    /// Returns `true` for entities, packages, contexts, configurations,
    /// modules and package instances.
    pub fn is_primary(&self) -> bool {
        self.kind.is_primary()
    }

    /// A human-readable label such as `architecture 'rtl' of 'top'`.
    pub fn description(&self) -> String {
        match &self.primary {
            Some(primary) if !self.is_primary() => {
                format!("{} '{}' of '{}'", self.kind, self.name, primary)
            }
            _ => format!("{} '{}'", self.kind, self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(kind: UnitKind) -> DesignUnit {
        DesignUnit::new(
            UnitName::new("rtl"),
            kind,
            UnitName::new("lib"),
            SourceFileId::from_raw(0),
            Span::DUMMY,
        )
    }

    #[test]
    fn primary_kinds() {
        assert!(UnitKind::Entity.is_primary());
        assert!(UnitKind::Module.is_primary());
        assert!(UnitKind::Configuration.is_primary());
        assert!(UnitKind::PackageInstance.is_primary());
        assert!(!UnitKind::Architecture.is_primary());
        assert!(!UnitKind::PackageBody.is_primary());
    }

    #[test]
    fn description_names_primary() {
        let mut arch = unit(UnitKind::Architecture);
        arch.primary = Some(UnitName::new("top"));
        assert_eq!(arch.description(), "architecture 'rtl' of 'top'");
        assert_eq!(unit(UnitKind::Entity).description(), "entity 'rtl'");
    }
}
