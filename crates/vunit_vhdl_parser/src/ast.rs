//! Dependency-relevant summary of a VHDL design file.
//!
//! The scanner does not build a full syntax tree. It records every design
//! unit declared in the file together with the references that tie the file
//! to units elsewhere: `use` and `context` clauses, direct entity and
//! configuration instantiations, component instantiations and generic package
//! instantiations.

use serde::{Deserialize, Serialize};
use vunit_common::UnitName;
use vunit_source::Span;

/// A name together with the place it was written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    /// The name, compared case-insensitively.
    pub name: UnitName,
    /// Where it appears.
    pub span: Span,
}

/// `entity <name> is [generic (...)]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDecl {
    /// Entity name.
    pub name: Ident,
    /// Names of the formal generics, in declaration order.
    pub generics: Vec<UnitName>,
}

/// `architecture <name> of <entity> is`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchitectureDecl {
    /// Architecture name.
    pub name: Ident,
    /// The entity it implements.
    pub entity: UnitName,
}

/// `package <name> is` (without `new`)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDecl {
    /// Package name.
    pub name: Ident,
}

/// `package body <name> is`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageBodyDecl {
    /// Name of the package the body belongs to.
    pub name: Ident,
}

/// A design-unit level `package <name> is new <lib>.<generic package>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInstanceDecl {
    /// Name of the instantiated package.
    pub name: Ident,
    /// Library of the generic package, `work` if not given.
    pub library: UnitName,
    /// The generic package being instantiated.
    pub generic_package: UnitName,
}

/// `context <name> is`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextDecl {
    /// Context name.
    pub name: Ident,
}

/// `configuration <name> of <entity> is for <architecture>`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationDecl {
    /// Configuration name.
    pub name: Ident,
    /// The configured entity.
    pub entity: UnitName,
    /// Architecture named by the top-level block configuration.
    pub architecture: Option<UnitName>,
}

/// What kind of unit a reference points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    /// `use lib.pkg[.item]`
    Package,
    /// `context lib.ctx`
    Context,
    /// `entity lib.ent[(arch)]`
    Entity,
    /// `configuration lib.cfg`
    Configuration,
}

/// Which secondary units inside the referenced unit are needed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameWithin {
    /// Only the primary unit.
    None,
    /// One named architecture.
    Named(UnitName),
    /// Every architecture of the entity.
    All,
}

/// A reference from this file to a primary unit in some library.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VhdlReference {
    /// What is referenced.
    pub kind: ReferenceKind,
    /// Library as written; `work` means the referencing file's own library.
    pub library: UnitName,
    /// The primary unit.
    pub unit: UnitName,
    /// Secondary units needed as well.
    pub name_within: NameWithin,
    /// Where the reference appears.
    pub span: Span,
}

impl VhdlReference {
    /// Returns `true` if this is an entity reference.
    pub fn is_entity_reference(&self) -> bool {
        self.kind == ReferenceKind::Entity
    }

    /// Returns a copy with `work` replaced by `library`.
    pub fn resolve_work(&self, library: &UnitName) -> VhdlReference {
        let mut resolved = self.clone();
        if resolved.library.matches("work") {
            resolved.library = library.clone();
        }
        resolved
    }
}

/// Everything the dependency engine needs from one VHDL file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VhdlDesignFile {
    /// Entity declarations.
    pub entities: Vec<EntityDecl>,
    /// Architecture bodies.
    pub architectures: Vec<ArchitectureDecl>,
    /// Package declarations.
    pub packages: Vec<PackageDecl>,
    /// Package bodies.
    pub package_bodies: Vec<PackageBodyDecl>,
    /// Design-unit level generic package instantiations.
    pub package_instances: Vec<PackageInstanceDecl>,
    /// Context declarations.
    pub contexts: Vec<ContextDecl>,
    /// Configuration declarations.
    pub configurations: Vec<ConfigurationDecl>,
    /// Libraries named in `library` clauses.
    pub libraries: Vec<UnitName>,
    /// References to units in other (or the same) libraries.
    pub references: Vec<VhdlReference>,
    /// Names of instantiated components, in order of appearance.
    pub component_instantiations: Vec<Ident>,
}

impl VhdlDesignFile {
    /// Total number of declared design units.
    pub fn unit_count(&self) -> usize {
        self.entities.len()
            + self.architectures.len()
            + self.packages.len()
            + self.package_bodies.len()
            + self.package_instances.len()
            + self.contexts.len()
            + self.configurations.len()
    }
}
