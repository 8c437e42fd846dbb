//! Intermediate model of extracted classes, methods, and arguments.
//!
//! Entities are created by the model builder, mutated once by the name
//! resolver (renaming only), then read by the output renderers. The
//! [`ClassRegistry`] is the explicit per-pass context that replaces ambient
//! global state: it owns every class extracted during one rule pass and
//! resolves base references by name.

use std::collections::{HashMap, HashSet};

/// Identifier of a class inside a [`ClassRegistry`].
pub type ClassId = usize;

/// One parameter of an extracted method.
#[derive(Debug, Clone)]
pub struct Argument {
    /// Declared parameter name.
    pub name: String,
    /// Normalized type name, used for exclusion matching and display.
    pub type_name: String,
    /// Raw type spelling as written in the source.
    pub full_type: String,
    /// True only for the final argument of its method; controls separator
    /// rendering.
    pub last: bool,
}

/// One public, non-static member function of an extracted class.
#[derive(Debug, Clone)]
pub struct Method {
    /// Original declared name.
    pub name: String,
    /// Externally visible name; equal to `name` until the resolver suffixes
    /// it to break a collision.
    pub visible_name: String,
    /// Normalized return type name.
    pub return_type: String,
    /// Raw return type spelling.
    pub return_full_type: String,
    /// Whether the method is const-qualified.
    pub is_const: bool,
    /// Arguments in declaration order.
    pub arguments: Vec<Argument>,
}

impl Method {
    /// Marks the final argument so separator rendering can elide the
    /// trailing delimiter. Call once after all arguments are appended.
    pub fn finish_arguments(&mut self) {
        if let Some(last) = self.arguments.last_mut() {
            last.last = true;
        }
    }

    /// Whether the method survives the rule's excluded-type filter: false if
    /// its return type or any argument type is excluded.
    #[must_use]
    pub fn is_valid(&self, excluded_types: &HashSet<String>) -> bool {
        if excluded_types.is_empty() {
            return true;
        }
        if excluded_types.contains(&self.return_type) {
            return false;
        }
        !self
            .arguments
            .iter()
            .any(|a| excluded_types.contains(&a.type_name))
    }
}

/// One matched class declaration.
#[derive(Debug, Clone)]
pub struct Class {
    /// Declared class name.
    pub name: String,
    /// Name of the single modeled base class, if any. Bases beyond the
    /// first are ignored.
    pub base_name: Option<String>,
    /// Registry reference to the base, present only when the base was
    /// itself extracted in the same pass. Lookup-only, never ownership.
    pub base: Option<ClassId>,
    /// Methods in declaration order (also render order).
    pub methods: Vec<Method>,
}

impl Class {
    /// Creates an empty class with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_name: None,
            base: None,
            methods: Vec::new(),
        }
    }
}

/// Per-pass registry of extracted classes, keyed by declared name.
///
/// Created fresh for each rule pass; later classes can resolve their base by
/// reference through it. A redeclared name shadows the earlier entry for
/// subsequent lookups, while the earlier class stays owned by the registry.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: Vec<Class>,
    by_name: HashMap<String, ClassId>,
}

impl ClassRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class and returns its identifier.
    pub fn insert(&mut self, class: Class) -> ClassId {
        let id = self.classes.len();
        self.by_name.insert(class.name.clone(), id);
        self.classes.push(class);
        id
    }

    /// Looks up a class identifier by declared name.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    /// Returns the class with the given identifier.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this registry.
    #[must_use]
    pub fn get(&self, id: ClassId) -> &Class {
        &self.classes[id]
    }

    /// Returns the class with the given identifier, mutably.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this registry.
    pub fn get_mut(&mut self, id: ClassId) -> &mut Class {
        &mut self.classes[id]
    }

    /// Number of registered classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Ordered accumulator of classes destined for one batched output.
///
/// Created fresh at the start of a rule pass, consumed by exactly one
/// batched render once the pass completes.
#[derive(Debug, Default)]
pub struct Extraction {
    ids: Vec<ClassId>,
}

impl Extraction {
    /// Creates an empty extraction.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a class, preserving first-encountered order.
    pub fn add(&mut self, id: ClassId) {
        self.ids.push(id);
    }

    /// Accumulated class identifiers in insertion order.
    #[must_use]
    pub fn ids(&self) -> &[ClassId] {
        &self.ids
    }
}
