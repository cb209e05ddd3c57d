//! Reflection metadata model for the Weft matcher.
//!
//! The matcher never reads class files. It consumes a pre-built, read-only
//! graph of classes, members, and annotations registered by the host into a
//! [`MetadataRepository`]. All types here are plain data with small query
//! methods; hierarchy traversal lives on the repository so that partially
//! loaded graphs degrade to "unknown" answers instead of panics.

use serde::{Deserialize, Serialize};

pub mod repository;

pub use repository::{Assignability, MetadataRepository};

/// The well-defined root of the type graph. Superclass walks terminate here.
pub const OBJECT: &str = "java.lang.Object";

// ============================================================================
// MODIFIERS
// ============================================================================

/// Member and class modifier bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Modifiers(pub u32);

impl Modifiers {
    pub const PUBLIC: Modifiers = Modifiers(0x0001);
    pub const PRIVATE: Modifiers = Modifiers(0x0002);
    pub const PROTECTED: Modifiers = Modifiers(0x0004);
    pub const STATIC: Modifiers = Modifiers(0x0008);
    pub const FINAL: Modifiers = Modifiers(0x0010);
    pub const SYNCHRONIZED: Modifiers = Modifiers(0x0020);
    pub const ABSTRACT: Modifiers = Modifiers(0x0400);

    pub const fn empty() -> Self {
        Modifiers(0)
    }

    pub const fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Modifiers) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    pub const fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    pub const fn is_public(self) -> bool {
        self.contains(Self::PUBLIC)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        self.union(rhs)
    }
}

// ============================================================================
// ANNOTATIONS
// ============================================================================

/// Structured representation of an annotation applied to a class or member.
/// Identified by the fully-qualified name of its annotation interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationInfo {
    pub name: String,
    #[serde(default)]
    pub elements: Vec<(String, String)>,
}

impl AnnotationInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: vec![],
        }
    }

    /// The unqualified interface name, for display.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

// ============================================================================
// MEMBERS
// ============================================================================

/// A declared method: name, signature type names, modifiers, annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    pub declaring: String,
    pub modifiers: Modifiers,
    pub return_type: String,
    pub parameters: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationInfo>,
}

impl MethodInfo {
    pub fn new(declaring: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declaring: declaring.into(),
            modifiers: Modifiers::PUBLIC,
            return_type: "void".into(),
            parameters: vec![],
            annotations: vec![],
        }
    }

    pub fn returning(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = return_type.into();
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<String>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_annotation(mut self, annotation: AnnotationInfo) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// A declared constructor. Constructors have no name of their own; patterns
/// address them through the `Type.new(...)` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorInfo {
    pub declaring: String,
    pub modifiers: Modifiers,
    pub parameters: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationInfo>,
}

impl ConstructorInfo {
    pub fn new(declaring: impl Into<String>) -> Self {
        Self {
            declaring: declaring.into(),
            modifiers: Modifiers::PUBLIC,
            parameters: vec![],
            annotations: vec![],
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<String>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A declared field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    pub declaring: String,
    pub modifiers: Modifiers,
    pub field_type: String,
    #[serde(default)]
    pub annotations: Vec<AnnotationInfo>,
}

impl FieldInfo {
    pub fn new(
        declaring: impl Into<String>,
        name: impl Into<String>,
        field_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            declaring: declaring.into(),
            modifiers: Modifiers::PRIVATE,
            field_type: field_type.into(),
            annotations: vec![],
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_annotation(mut self, annotation: AnnotationInfo) -> Self {
        self.annotations.push(annotation);
        self
    }
}

// ============================================================================
// CLASSES
// ============================================================================

/// Structural classification of a metadata entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Interface,
    Primitive,
    Array,
}

/// A class (or interface) with its declared members and hierarchy links.
/// Superclass and interface links are names, resolved lazily through the
/// repository; a link to a class the repository has not loaded is tolerated
/// and surfaces as [`Assignability::Unknown`] during traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub kind: ClassKind,
    pub modifiers: Modifiers,
    pub superclass: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationInfo>,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
    #[serde(default)]
    pub constructors: Vec<ConstructorInfo>,
    #[serde(default)]
    pub has_static_initializer: bool,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let superclass = if name == OBJECT {
            None
        } else {
            Some(OBJECT.to_string())
        };
        Self {
            name,
            kind: ClassKind::Class,
            modifiers: Modifiers::PUBLIC,
            superclass,
            interfaces: vec![],
            annotations: vec![],
            methods: vec![],
            fields: vec![],
            constructors: vec![],
            has_static_initializer: false,
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        let mut info = Self::new(name);
        info.kind = ClassKind::Interface;
        info.superclass = None;
        info.modifiers = Modifiers::PUBLIC | Modifiers::ABSTRACT;
        info
    }

    pub fn extending(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn implementing(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_method(mut self, method: MethodInfo) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_field(mut self, field: FieldInfo) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_constructor(mut self, constructor: ConstructorInfo) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn with_annotation(mut self, annotation: AnnotationInfo) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_static_initializer(mut self) -> Self {
        self.has_static_initializer = true;
        self
    }

    /// The unqualified class name (final dot-segment, `$` text intact).
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Looks up a declared method by name and parameter types.
    pub fn method(&self, name: &str, parameters: &[&str]) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.parameters.iter().map(String::as_str).eq(parameters.iter().copied()))
    }

    /// Looks up a declared field by name.
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }
}
