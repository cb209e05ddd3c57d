//! Arena-style metadata repository.
//!
//! One repository instance owns the metadata for one class-loading scope. The
//! host registers [`ClassInfo`] entries once; the matcher reads them for the
//! lifetime of the scope and the whole arena is dropped when the scope
//! unloads. The repository is the single source of truth for hierarchy
//! questions and must be passed by reference to all matching code.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::meta::{ClassInfo, ClassKind, OBJECT};

/// Three-valued answer to a subtype question. `Unknown` means the hierarchy
/// walk ran into a class that has not been loaded into this repository, so the
/// question cannot be decided from the metadata at hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignability {
    Yes,
    No,
    Unknown,
}

/// Read-mostly registry of classes for one class-loading scope.
#[derive(Debug, Default)]
pub struct MetadataRepository {
    classes: HashMap<String, Arc<ClassInfo>>,
}

impl MetadataRepository {
    pub fn new() -> Self {
        Self {
            classes: HashMap::new(),
        }
    }

    /// Registers a class. Re-registration replaces the previous entry, which
    /// supports on-demand metadata construction for lazily loaded classes.
    pub fn register(&mut self, class: ClassInfo) -> Arc<ClassInfo> {
        let entry = Arc::new(class);
        self.classes.insert(entry.name.clone(), entry.clone());
        entry
    }

    pub fn lookup(&self, name: &str) -> Option<&Arc<ClassInfo>> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Is `sub` the same type as, or a transitive subtype of, `superty`?
    ///
    /// Walks superclass links and interface graphs with a visited set, so a
    /// malformed graph cannot loop. Any unloaded link on an otherwise negative
    /// walk degrades the answer to `Unknown` rather than guessing `No`.
    pub fn assignable(&self, sub: &str, superty: &str) -> Assignability {
        if sub == superty {
            return Assignability::Yes;
        }
        // Everything is assignable to the root.
        if superty == OBJECT {
            return Assignability::Yes;
        }

        let mut visited = HashSet::new();
        self.assignable_walk(sub, superty, &mut visited)
    }

    fn assignable_walk(
        &self,
        current: &str,
        superty: &str,
        visited: &mut HashSet<String>,
    ) -> Assignability {
        if current == superty {
            return Assignability::Yes;
        }
        if !visited.insert(current.to_string()) {
            return Assignability::No;
        }

        let Some(class) = self.lookup(current) else {
            // The walk reached a class this scope has not loaded.
            return Assignability::Unknown;
        };

        let mut unknown = false;
        if let Some(superclass) = &class.superclass {
            match self.assignable_walk(superclass, superty, visited) {
                Assignability::Yes => return Assignability::Yes,
                Assignability::Unknown => unknown = true,
                Assignability::No => {}
            }
        }
        for interface in &class.interfaces {
            match self.assignable_walk(interface, superty, visited) {
                Assignability::Yes => return Assignability::Yes,
                Assignability::Unknown => unknown = true,
                Assignability::No => {}
            }
        }

        if unknown {
            Assignability::Unknown
        } else {
            Assignability::No
        }
    }

    /// Yields `class` followed by every loaded supertype (superclasses and
    /// interfaces, breadth-first, deduplicated). Used for inherited-member
    /// pattern matching. Returns whether the full hierarchy was available.
    pub fn hierarchy_of<'a>(&'a self, class: &'a ClassInfo) -> (Vec<&'a ClassInfo>, bool) {
        let mut complete = true;
        let mut seen = HashSet::new();
        let mut order: Vec<&ClassInfo> = vec![];
        let mut queue: Vec<&ClassInfo> = vec![class];

        while let Some(current) = queue.pop() {
            if !seen.insert(current.name.clone()) {
                continue;
            }
            order.push(current);

            let mut links: Vec<&String> = current.interfaces.iter().collect();
            if let Some(superclass) = &current.superclass {
                links.push(superclass);
            }
            for link in links {
                match self.lookup(link) {
                    Some(next) => queue.push(next.as_ref()),
                    None if link == OBJECT => {
                        // The root is implicit; an arena need not register it.
                    }
                    None => complete = false,
                }
            }
        }

        (order, complete)
    }

    /// True if the class is a concrete weavable type (not primitive/array).
    pub fn is_weavable(&self, name: &str) -> bool {
        self.lookup(name)
            .map(|c| matches!(c.kind, ClassKind::Class | ClassKind::Interface))
            .unwrap_or(false)
    }
}
