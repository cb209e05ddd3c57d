//! Match context: the immutable input of one evaluation.
//!
//! A context names the kind of join point being tested, the reflection info
//! under test, the lexically enclosing ("within") info, and the metadata
//! repository. It is created per resolution attempt and never mutated;
//! binding bookkeeping goes into the separately returned
//! [`BindingResult`](crate::eval::BindingResult).

use crate::meta::{
    AnnotationInfo, ClassInfo, ConstructorInfo, FieldInfo, MetadataRepository, MethodInfo,
    Modifiers,
};

/// The kind of join point a context describes. `within`/`withincode` are not
/// kinds: they constrain the enclosing scope of any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointcutKind {
    Execution,
    Call,
    Set,
    Get,
    Handler,
    StaticInitialization,
}

/// Borrowed reflection info for the join point (or its enclosing member).
///
/// The `Class` variant is the early/coarse form: during call-site
/// pre-filtering only the declaring class may be known, and a positive match
/// against it narrows to `Undetermined` rather than deciding.
#[derive(Debug, Clone, Copy)]
pub enum JoinPointRef<'a> {
    Class(&'a ClassInfo),
    Method(&'a MethodInfo),
    Constructor(&'a ConstructorInfo),
    Field(&'a FieldInfo),
    StaticInit(&'a ClassInfo),
}

impl<'a> JoinPointRef<'a> {
    /// The declaring class name: the class itself for class-level refs.
    pub fn declaring_name(&self) -> &'a str {
        match self {
            JoinPointRef::Class(c) | JoinPointRef::StaticInit(c) => &c.name,
            JoinPointRef::Method(m) => &m.declaring,
            JoinPointRef::Constructor(c) => &c.declaring,
            JoinPointRef::Field(f) => &f.declaring,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            JoinPointRef::Class(c) | JoinPointRef::StaticInit(c) => c.modifiers,
            JoinPointRef::Method(m) => m.modifiers,
            JoinPointRef::Constructor(c) => c.modifiers,
            JoinPointRef::Field(f) => f.modifiers,
        }
    }

    pub fn annotations(&self) -> &'a [AnnotationInfo] {
        match self {
            JoinPointRef::Class(c) | JoinPointRef::StaticInit(c) => &c.annotations,
            JoinPointRef::Method(m) => &m.annotations,
            JoinPointRef::Constructor(c) => &c.annotations,
            JoinPointRef::Field(f) => &f.annotations,
        }
    }

    /// Number of advised-member parameters `args(...)` can bind against.
    /// A field set carries the new value as its single argument.
    pub fn parameter_count(&self) -> Option<usize> {
        match self {
            JoinPointRef::Method(m) => Some(m.parameters.len()),
            JoinPointRef::Constructor(c) => Some(c.parameters.len()),
            JoinPointRef::Field(_) => Some(1),
            JoinPointRef::Class(_) | JoinPointRef::StaticInit(_) => None,
        }
    }

    pub fn is_static(&self) -> bool {
        match self {
            // A static initializer is static by definition; a bare class ref
            // carries no member to be static.
            JoinPointRef::StaticInit(_) => true,
            JoinPointRef::Class(_) => false,
            _ => self.modifiers().is_static(),
        }
    }

    /// True when this ref identifies a concrete member rather than the
    /// coarse class-only form.
    pub fn is_member(&self) -> bool {
        !matches!(self, JoinPointRef::Class(_))
    }
}

/// Immutable input of one matching attempt.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub kind: PointcutKind,
    pub join_point: JoinPointRef<'a>,
    pub within: JoinPointRef<'a>,
    pub repo: &'a MetadataRepository,
}

impl<'a> MatchContext<'a> {
    pub fn new(
        kind: PointcutKind,
        join_point: JoinPointRef<'a>,
        within: JoinPointRef<'a>,
        repo: &'a MetadataRepository,
    ) -> Self {
        Self {
            kind,
            join_point,
            within,
            repo,
        }
    }

    /// Execution-style context: the enclosing info is the join point itself.
    pub fn execution(join_point: JoinPointRef<'a>, repo: &'a MetadataRepository) -> Self {
        Self::new(PointcutKind::Execution, join_point, join_point, repo)
    }

    /// Call-site context: callee under test, caller as the enclosing info.
    pub fn call(
        callee: JoinPointRef<'a>,
        caller: JoinPointRef<'a>,
        repo: &'a MetadataRepository,
    ) -> Self {
        Self::new(PointcutKind::Call, callee, caller, repo)
    }

    pub fn field_set(
        field: JoinPointRef<'a>,
        within: JoinPointRef<'a>,
        repo: &'a MetadataRepository,
    ) -> Self {
        Self::new(PointcutKind::Set, field, within, repo)
    }

    pub fn field_get(
        field: JoinPointRef<'a>,
        within: JoinPointRef<'a>,
        repo: &'a MetadataRepository,
    ) -> Self {
        Self::new(PointcutKind::Get, field, within, repo)
    }

    pub fn handler(
        exception: &'a ClassInfo,
        within: JoinPointRef<'a>,
        repo: &'a MetadataRepository,
    ) -> Self {
        Self::new(
            PointcutKind::Handler,
            JoinPointRef::Class(exception),
            within,
            repo,
        )
    }

    pub fn static_initialization(class: &'a ClassInfo, repo: &'a MetadataRepository) -> Self {
        let jp = JoinPointRef::StaticInit(class);
        Self::new(PointcutKind::StaticInitialization, jp, jp, repo)
    }

    /// The class lexically enclosing the join point.
    pub fn within_class_name(&self) -> &'a str {
        self.within.declaring_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::ClassInfo;

    #[test]
    fn execution_context_defaults_within_to_the_join_point() {
        let repo = MetadataRepository::new();
        let m = MethodInfo::new("foo.Bar", "run");
        let ctx = MatchContext::execution(JoinPointRef::Method(&m), &repo);
        assert_eq!(ctx.within_class_name(), "foo.Bar");
        assert_eq!(ctx.join_point.parameter_count(), Some(0));
    }

    #[test]
    fn static_queries() {
        let m = MethodInfo::new("foo.Bar", "run").with_modifiers(Modifiers::PUBLIC | Modifiers::STATIC);
        assert!(JoinPointRef::Method(&m).is_static());
        let c = ClassInfo::new("foo.Bar");
        assert!(JoinPointRef::StaticInit(&c).is_static());
        assert!(!JoinPointRef::Class(&c).is_static());
        assert!(!JoinPointRef::Class(&c).is_member());
    }
}
