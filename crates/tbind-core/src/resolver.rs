//! Name resolver: guarantees unique externally visible method names within
//! a class hierarchy.
//!
//! Runs once per class, after all its methods are built and before any
//! output is generated. Renaming is the only mutation it performs; suffixes
//! are always derived from the original declared name, never from an
//! intermediate attempt, so suffixes cannot compound.

use std::collections::HashSet;

use crate::model::{ClassId, ClassRegistry};

/// Upper bound on renaming attempts per method. Exceeding it means the
/// model is malformed, not that more attempts would help.
pub const MAX_SUFFIX_ATTEMPTS: usize = 1000;

/// Internal-consistency failures during name resolution. Both indicate a
/// malformed base chain or model and abort the run.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The base chain loops back on itself.
    #[error("base chain of `{class}` contains a cycle at `{at}`")]
    BaseCycle {
        /// Class whose chain was being walked.
        class: String,
        /// Class at which the cycle was detected.
        at: String,
    },

    /// No unique name was found within [`MAX_SUFFIX_ATTEMPTS`].
    #[error("no unique name for `{class}::{method}` after {attempts} attempts")]
    SuffixExhausted {
        /// Owning class.
        class: String,
        /// Original declared method name.
        method: String,
        /// Number of attempts made.
        attempts: usize,
    },
}

/// Disambiguates the externally visible names of a class's methods in place.
///
/// For each method in declaration order, the current visible name is checked
/// against every method name reachable through the live base chain and
/// against earlier-declared siblings; on a collision the name becomes the
/// original declared name concatenated with an incrementing counter and the
/// check repeats. The first declared overload therefore keeps its name and
/// later overloads receive distinct numeric suffixes, deterministically for
/// a fixed declaration order.
///
/// Only ancestors extracted and registered in the same pass participate;
/// an unextracted ancestor cannot contribute a collision.
///
/// # Errors
///
/// Returns a fatal [`ResolveError`] on a cyclic base chain or when the
/// attempt cap is exhausted.
pub fn resolve_names(registry: &mut ClassRegistry, id: ClassId) -> Result<(), ResolveError> {
    let ancestor_names = ancestor_method_names(registry, id)?;

    let class = registry.get_mut(id);
    for i in 0..class.methods.len() {
        let original = class.methods[i].name.clone();
        let mut attempt = 0;
        loop {
            attempt += 1;
            if attempt > MAX_SUFFIX_ATTEMPTS {
                return Err(ResolveError::SuffixExhausted {
                    class: class.name.clone(),
                    method: original,
                    attempts: MAX_SUFFIX_ATTEMPTS,
                });
            }

            let current = class.methods[i].visible_name.clone();
            let collides = ancestor_names.contains(&current)
                || class.methods[..i].iter().any(|m| m.visible_name == current);
            if !collides {
                break;
            }
            class.methods[i].visible_name = format!("{original}{attempt}");
        }
    }

    Ok(())
}

/// Collects every visible method name reachable through the live base
/// chain, failing on cycles.
fn ancestor_method_names(
    registry: &ClassRegistry,
    id: ClassId,
) -> Result<HashSet<String>, ResolveError> {
    let mut names = HashSet::new();
    let mut visited = HashSet::from([id]);

    let mut current = registry.get(id).base;
    while let Some(base_id) = current {
        if !visited.insert(base_id) {
            return Err(ResolveError::BaseCycle {
                class: registry.get(id).name.clone(),
                at: registry.get(base_id).name.clone(),
            });
        }
        let base = registry.get(base_id);
        names.extend(base.methods.iter().map(|m| m.visible_name.clone()));
        current = base.base;
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Class, Method};

    fn method(name: &str) -> Method {
        Method {
            name: name.to_string(),
            visible_name: name.to_string(),
            return_type: "void".to_string(),
            return_full_type: "void".to_string(),
            is_const: false,
            arguments: Vec::new(),
        }
    }

    fn class_with(name: &str, methods: &[&str]) -> Class {
        let mut class = Class::new(name);
        class.methods = methods.iter().map(|m| method(m)).collect();
        class
    }

    fn visible(registry: &ClassRegistry, id: ClassId) -> Vec<String> {
        registry
            .get(id)
            .methods
            .iter()
            .map(|m| m.visible_name.clone())
            .collect()
    }

    #[test]
    fn sibling_overloads_keep_first_and_suffix_later() {
        let mut registry = ClassRegistry::new();
        let id = registry.insert(class_with("W", &["foo", "foo"]));
        resolve_names(&mut registry, id).unwrap();
        assert_eq!(visible(&registry, id), vec!["foo", "foo1"]);
    }

    #[test]
    fn triple_overload_gets_distinct_suffixes() {
        let mut registry = ClassRegistry::new();
        let id = registry.insert(class_with("W", &["foo", "foo", "foo"]));
        resolve_names(&mut registry, id).unwrap();
        assert_eq!(visible(&registry, id), vec!["foo", "foo1", "foo2"]);
    }

    #[test]
    fn suffix_skips_names_already_taken_by_siblings() {
        // `foo1` is declared outright, so the second `foo` must continue
        // incrementing past it.
        let mut registry = ClassRegistry::new();
        let id = registry.insert(class_with("W", &["foo", "foo1", "foo"]));
        resolve_names(&mut registry, id).unwrap();
        assert_eq!(visible(&registry, id), vec!["foo", "foo1", "foo2"]);
    }

    #[test]
    fn ancestor_collision_renames_derived_method() {
        let mut registry = ClassRegistry::new();
        let base_id = registry.insert(class_with("A", &["bar"]));
        let mut derived = class_with("B", &["bar"]);
        derived.base_name = Some("A".to_string());
        derived.base = Some(base_id);
        let id = registry.insert(derived);

        resolve_names(&mut registry, id).unwrap();
        assert_eq!(visible(&registry, id), vec!["bar1"]);
        // The ancestor keeps its own name.
        assert_eq!(visible(&registry, base_id), vec!["bar"]);
    }

    #[test]
    fn collisions_are_checked_across_the_whole_chain() {
        // A <- B <- C: C collides with A, not with B.
        let mut registry = ClassRegistry::new();
        let a = registry.insert(class_with("A", &["bar"]));
        let mut b = class_with("B", &["other"]);
        b.base = Some(a);
        let b = registry.insert(b);
        let mut c = class_with("C", &["bar"]);
        c.base = Some(b);
        let c = registry.insert(c);

        resolve_names(&mut registry, c).unwrap();
        assert_eq!(visible(&registry, c), vec!["bar1"]);
    }

    #[test]
    fn unlinked_base_contributes_no_collisions() {
        let mut registry = ClassRegistry::new();
        let mut class = class_with("B", &["bar"]);
        class.base_name = Some("A".to_string()); // name known, never extracted
        let id = registry.insert(class);

        resolve_names(&mut registry, id).unwrap();
        assert_eq!(visible(&registry, id), vec!["bar"]);
    }

    #[test]
    fn cyclic_base_chain_is_a_fatal_error() {
        let mut registry = ClassRegistry::new();
        let a = registry.insert(class_with("A", &[]));
        let mut b = class_with("B", &["bar"]);
        b.base = Some(a);
        let b = registry.insert(b);
        registry.get_mut(a).base = Some(b);

        let err = resolve_names(&mut registry, b).unwrap_err();
        assert!(matches!(err, ResolveError::BaseCycle { .. }));
    }

    #[test]
    fn resolution_is_deterministic_for_a_fixed_order() {
        let build = || {
            let mut registry = ClassRegistry::new();
            let id = registry.insert(class_with("W", &["foo", "foo", "foo1", "bar"]));
            resolve_names(&mut registry, id).unwrap();
            visible(&registry, id)
        };
        assert_eq!(build(), build());
    }
}
