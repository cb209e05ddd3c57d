#![allow(dead_code)]

//! Shared metadata fixtures for integration tests.
//!
//! One canonical repository graph used across the suites: a small service
//! layer with a hierarchy, annotations, static members, and exception types.

use weft::meta::{
    AnnotationInfo, ClassInfo, ConstructorInfo, FieldInfo, MetadataRepository, MethodInfo,
    Modifiers,
};

/// Builds the canonical test repository:
///
/// - `java.lang.Object`, `java.lang.Exception`, `java.io.IOException`
/// - interface `demo.service.Service` declaring `place(int)`
/// - `demo.service.OrderService` implementing it, `@demo.Audited`, with
///   `@demo.Tx place(int)`, `cancel(String)`, static `stats()`, an `int
///   count` field, an `(int)` constructor, and a static initializer
/// - `demo.service.PremiumOrderService` extending `OrderService`
/// - `demo.web.Controller` with `handle()`, the canonical caller
pub fn demo_repository() -> MetadataRepository {
    let mut repo = MetadataRepository::new();

    repo.register(ClassInfo::new("java.lang.Object"));
    repo.register(ClassInfo::new("java.lang.Exception"));
    repo.register(ClassInfo::new("java.io.IOException").extending("java.lang.Exception"));

    repo.register(
        ClassInfo::interface("demo.service.Service").with_method(
            MethodInfo::new("demo.service.Service", "place")
                .with_parameters(vec!["int".into()])
                .with_modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT),
        ),
    );

    repo.register(
        ClassInfo::new("demo.service.OrderService")
            .implementing("demo.service.Service")
            .with_annotation(AnnotationInfo::new("demo.Audited"))
            .with_method(
                MethodInfo::new("demo.service.OrderService", "place")
                    .with_parameters(vec!["int".into()])
                    .with_annotation(AnnotationInfo::new("demo.Tx")),
            )
            .with_method(
                MethodInfo::new("demo.service.OrderService", "cancel")
                    .with_parameters(vec!["java.lang.String".into()]),
            )
            .with_method(
                MethodInfo::new("demo.service.OrderService", "stats")
                    .with_modifiers(Modifiers::PUBLIC | Modifiers::STATIC),
            )
            .with_field(FieldInfo::new("demo.service.OrderService", "count", "int"))
            .with_constructor(
                ConstructorInfo::new("demo.service.OrderService")
                    .with_parameters(vec!["int".into()]),
            )
            .with_static_initializer(),
    );

    repo.register(ClassInfo::new("demo.service.PremiumOrderService").extending("demo.service.OrderService"));

    repo.register(
        ClassInfo::new("demo.web.Controller")
            .with_method(MethodInfo::new("demo.web.Controller", "handle")),
    );

    repo
}

/// The `place(int)` method of `demo.service.OrderService`.
pub fn place_method(repo: &MetadataRepository) -> MethodInfo {
    repo.lookup("demo.service.OrderService")
        .unwrap()
        .method("place", &["int"])
        .unwrap()
        .clone()
}

/// The `cancel(String)` method of `demo.service.OrderService`.
pub fn cancel_method(repo: &MetadataRepository) -> MethodInfo {
    repo.lookup("demo.service.OrderService")
        .unwrap()
        .method("cancel", &["java.lang.String"])
        .unwrap()
        .clone()
}

/// The static `stats()` method of `demo.service.OrderService`.
pub fn stats_method(repo: &MetadataRepository) -> MethodInfo {
    repo.lookup("demo.service.OrderService")
        .unwrap()
        .method("stats", &[])
        .unwrap()
        .clone()
}

/// The `handle()` method of `demo.web.Controller`.
pub fn handle_method(repo: &MetadataRepository) -> MethodInfo {
    repo.lookup("demo.web.Controller")
        .unwrap()
        .method("handle", &[])
        .unwrap()
        .clone()
}
