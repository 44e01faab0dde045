//! Named definitions and reference substitution.
//!
//! A [`DefinitionStore`] maps names to values. Any string field of a target
//! tree that exactly equals a defined name is a reference and is replaced by
//! the definition's value, which is itself resolved first. References may
//! chain (`accent -> blue -> "#0000ff"`), but they may never loop back.
//!
//! Layering works like style aliases: semantic names point at palette names,
//! and palette names point at concrete values.
//!
//! ```rust
//! use brandkit::{DefinitionStore, Node, ReferenceResolver};
//!
//! let store = DefinitionStore::new()
//!     .add("blue", "#0000ff")
//!     .add("accent", "blue");
//!
//! let target = Node::from_yaml_str("link: accent\ntext: plain\n").unwrap();
//! let resolved = ReferenceResolver::new(&store).resolve(&target).unwrap();
//!
//! let record = resolved.as_record().unwrap();
//! assert_eq!(record["link"].as_str(), Some("#0000ff"));
//! assert_eq!(record["text"].as_str(), Some("plain"));
//! ```

use tracing::{debug, error, trace};

use crate::error::CircularReferenceError;
use crate::node::{Node, Record};

/// Nesting and chain depth at which substitution gives up.
pub const MAX_DEPTH: usize = 50;

/// A bank of named definitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefinitionStore {
    defs: Record,
}

impl DefinitionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named definition. Returns self for chaining.
    ///
    /// If a definition with the same name exists, it is replaced.
    pub fn add<V: Into<Node>>(mut self, name: &str, value: V) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert<V: Into<Node>>(&mut self, name: &str, value: V) {
        self.defs.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.defs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn as_record(&self) -> &Record {
        &self.defs
    }

    pub fn into_record(self) -> Record {
        self.defs
    }

    /// Checks that no definition reaches itself through references.
    pub fn validate(&self) -> Result<(), CircularReferenceError> {
        ReferenceResolver::new(self).validate()
    }
}

impl From<Record> for DefinitionStore {
    fn from(defs: Record) -> Self {
        Self { defs }
    }
}

impl FromIterator<(String, Node)> for DefinitionStore {
    fn from_iter<I: IntoIterator<Item = (String, Node)>>(iter: I) -> Self {
        Self {
            defs: iter.into_iter().collect(),
        }
    }
}

/// Substitutes references to a [`DefinitionStore`] inside a node tree.
///
/// Fields named with [`skip_field`](Self::skip_field) are copied through
/// untouched at any depth, as are their subtrees. The `context` only labels
/// cycle errors and log lines.
#[derive(Debug, Clone)]
pub struct ReferenceResolver<'a> {
    store: &'a DefinitionStore,
    context: Option<String>,
    skip_fields: Vec<String>,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(store: &'a DefinitionStore) -> Self {
        Self {
            store,
            context: None,
            skip_fields: Vec::new(),
        }
    }

    /// Names the definition bank in errors (`palette`, `color`, `logo`).
    pub fn context(mut self, context: &str) -> Self {
        self.context = Some(context.to_string());
        self
    }

    /// Never substitutes inside fields with this name.
    pub fn skip_field(mut self, field: &str) -> Self {
        self.skip_fields.push(field.to_string());
        self
    }

    /// Walks every definition and fails on the first reference cycle.
    ///
    /// The reported chain lists definition names in the order they were
    /// followed and ends with the repeated name.
    pub fn validate(&self) -> Result<(), CircularReferenceError> {
        for (name, value) in self.store.as_record() {
            if self.is_skipped(name) {
                continue;
            }
            self.check_entry(name, value, &[], &[name.clone()])?;
        }
        Ok(())
    }

    /// Returns a copy of `target` with all references substituted.
    ///
    /// The store is checked for cycles before anything is substituted, so a
    /// cyclic store fails even when `target` never touches the cycle.
    pub fn resolve(&self, target: &Node) -> Result<Node, CircularReferenceError> {
        self.validate()?;
        debug!(
            context = self.context.as_deref().unwrap_or("-"),
            definitions = self.store.len(),
            "resolving references"
        );
        Ok(self.substitute(target, 0))
    }

    pub fn resolve_record(&self, target: &Record) -> Result<Record, CircularReferenceError> {
        self.validate()?;
        Ok(self.substitute_record(target, 0))
    }

    /// Resolves the store against itself.
    pub fn resolve_store(&self) -> Result<DefinitionStore, CircularReferenceError> {
        self.resolve_record(self.store.as_record())
            .map(DefinitionStore::from)
    }

    fn is_skipped(&self, field: &str) -> bool {
        self.skip_fields.iter().any(|f| f == field)
    }

    fn check_entry(
        &self,
        key: &str,
        value: &Node,
        path: &[String],
        seen: &[String],
    ) -> Result<(), CircularReferenceError> {
        let mut path_key = path.to_vec();
        path_key.push(key.to_string());

        match value {
            Node::Record(record) => {
                for (field, child) in record {
                    if !self.is_skipped(field) {
                        self.check_entry(field, child, &path_key, seen)?;
                    }
                }
                Ok(())
            }
            Node::List(items) => {
                for (index, child) in items.iter().enumerate() {
                    self.check_entry(&index.to_string(), child, &path_key, seen)?;
                }
                Ok(())
            }
            _ => {
                let Some(name) = value.as_str() else {
                    return Ok(());
                };
                let Some(definition) = self.store.get(name) else {
                    return Ok(());
                };

                let mut chain = seen.to_vec();
                let repeated = chain.iter().any(|s| s == name);
                chain.push(name.to_string());
                if repeated {
                    return Err(CircularReferenceError {
                        chain,
                        path: path_key,
                        context: self.context.clone(),
                    });
                }
                self.check_entry(name, definition, &path_key, &chain)
            }
        }
    }

    fn substitute(&self, node: &Node, depth: usize) -> Node {
        match node {
            Node::Record(record) => Node::Record(self.substitute_record(record, depth)),
            Node::List(items) => Node::List(
                items
                    .iter()
                    .map(|child| self.substitute_value(child, depth + 1))
                    .collect(),
            ),
            scalar => scalar.clone(),
        }
    }

    fn substitute_record(&self, record: &Record, depth: usize) -> Record {
        record
            .iter()
            .map(|(field, child)| {
                let value = if self.is_skipped(field) {
                    child.clone()
                } else {
                    self.substitute_value(child, depth + 1)
                };
                (field.clone(), value)
            })
            .collect()
    }

    fn substitute_value(&self, value: &Node, depth: usize) -> Node {
        if depth > MAX_DEPTH {
            error!(
                context = self.context.as_deref().unwrap_or("-"),
                max_depth = MAX_DEPTH,
                "maximum reference depth reached; leaving subtree unresolved"
            );
            return value.clone();
        }

        let definition = value.as_str().and_then(|name| {
            self.store.get(name).map(|definition| (name, definition))
        });
        match definition {
            Some((name, definition)) => {
                trace!(reference = name, "substituting definition");
                self.substitute_value(definition, depth + 1)
            }
            None => self.substitute(value, depth),
        }
    }
}

/// Resolves `target` against `store` with no skipped fields.
pub fn resolve(store: &DefinitionStore, target: &Node) -> Result<Node, CircularReferenceError> {
    ReferenceResolver::new(store).resolve(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Node {
        Node::from_yaml_str(text).unwrap()
    }

    fn store(text: &str) -> DefinitionStore {
        match yaml(text) {
            Node::Record(record) => DefinitionStore::from(record),
            other => panic!("expected mapping, got {}", other.kind()),
        }
    }

    // =========================================================================
    // Store tests
    // =========================================================================

    #[test]
    fn test_store_new_is_empty() {
        let store = DefinitionStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_store_add_replaces() {
        let store = DefinitionStore::new().add("red", "#f00").add("red", "#ff0000");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("red").and_then(Node::as_str), Some("#ff0000"));
    }

    #[test]
    fn test_store_keeps_order() {
        let store = DefinitionStore::new().add("b", "1").add("a", "2");
        assert_eq!(store.names().collect::<Vec<_>>(), ["b", "a"]);
    }

    // =========================================================================
    // Substitution tests
    // =========================================================================

    #[test]
    fn test_resolve_single_reference() {
        let defs = store("a: b\nb: x\n");
        let resolved = ReferenceResolver::new(&defs).resolve_store().unwrap();
        assert_eq!(resolved.get("a").and_then(Node::as_str), Some("x"));
        assert_eq!(resolved.get("b").and_then(Node::as_str), Some("x"));
    }

    #[test]
    fn test_resolve_chain_is_followed_to_the_end() {
        let defs = store("a: b\nb: c\nc: d\nd: '#123456'\n");
        let target = yaml("color: a\n");
        let resolved = resolve(&defs, &target).unwrap();
        assert_eq!(resolved.as_record().unwrap()["color"].as_str(), Some("#123456"));
    }

    #[test]
    fn test_resolve_only_exact_matches() {
        let defs = store("blue: '#00f'\n");
        let target = yaml("a: light-blue\nb: Blue\nc: blue\n");
        let resolved = resolve(&defs, &target).unwrap();
        let record = resolved.as_record().unwrap();
        assert_eq!(record["a"].as_str(), Some("light-blue"));
        assert_eq!(record["b"].as_str(), Some("Blue"));
        assert_eq!(record["c"].as_str(), Some("#00f"));
    }

    #[test]
    fn test_resolve_nested_records_and_lists() {
        let defs = store("logo: {path: logo.png, alt: Logo}\nred: '#f00'\n");
        let target = yaml("outer:\n  inner: red\n  items: [red, green, logo]\n");
        let resolved = resolve(&defs, &target).unwrap();

        let expected = yaml(
            "outer:\n  inner: '#f00'\n  items: ['#f00', green, {path: logo.png, alt: Logo}]\n",
        );
        assert_eq!(resolved, expected);
    }

    #[test]
    fn test_resolve_substituted_record_is_resolved() {
        let defs = store("wide: {light: light-img}\nlight-img: {path: light.png}\n");
        let target = yaml("large: wide\n");
        let resolved = resolve(&defs, &target).unwrap();
        assert_eq!(resolved, yaml("large: {light: {path: light.png}}\n"));
    }

    #[test]
    fn test_resolve_non_string_scalars_untouched() {
        let defs = store("'1': one\n'true': yes\n");
        let target = yaml("n: 1\nb: true\ns: '1'\n");
        let resolved = resolve(&defs, &target).unwrap();
        let record = resolved.as_record().unwrap();
        assert_eq!(record["n"], Node::from(1i64));
        assert_eq!(record["b"], Node::from(true));
        assert_eq!(record["s"].as_str(), Some("one"));
    }

    #[test]
    fn test_resolve_skip_field() {
        let defs = store("icon: {path: icon.png}\n");
        let target = yaml("small: icon\nmeta:\n  path: icon\n");
        let resolved = ReferenceResolver::new(&defs)
            .skip_field("path")
            .resolve(&target)
            .unwrap();
        let record = resolved.as_record().unwrap();
        assert_eq!(record["small"], yaml("path: icon.png\n"));
        assert_eq!(record["meta"], yaml("path: icon\n"));
    }

    #[test]
    fn test_resolve_root_scalar_untouched() {
        let defs = store("a: b\n");
        assert_eq!(resolve(&defs, &Node::from("a")).unwrap(), Node::from("a"));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let defs = store("a: b\nb: '#fff'\nc: {x: a}\n");
        let target = yaml("one: a\ntwo: [c, b]\n");
        let once = resolve(&defs, &target).unwrap();
        let twice = resolve(&defs, &once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_resolve_depth_cap_leaves_subtree() {
        let mut node = Node::from("red");
        for _ in 0..(MAX_DEPTH + 5) {
            let mut record = Record::new();
            record.insert("n".into(), node);
            node = Node::Record(record);
        }
        let defs = store("red: '#f00'\n");
        let resolved = resolve(&defs, &node).unwrap();

        let mut cursor = &resolved;
        while let Some(record) = cursor.as_record() {
            cursor = &record["n"];
        }
        assert_eq!(cursor.as_str(), Some("red"));
    }

    // =========================================================================
    // Cycle detection tests
    // =========================================================================

    #[test]
    fn test_validate_acyclic_store() {
        assert!(store("a: b\nb: c\nc: '#fff'\n").validate().is_ok());
    }

    #[test]
    fn test_validate_two_way_cycle() {
        let err = store("a: b\nb: a\n").validate().unwrap_err();
        assert_eq!(err.chain, ["a", "b", "a"]);
        assert_eq!(err.path, ["a", "b"]);
    }

    #[test]
    fn test_validate_three_way_cycle() {
        let err = store("a: b\nb: c\nc: a\n").validate().unwrap_err();
        assert_eq!(err.chain, ["a", "b", "c", "a"]);
    }

    #[test]
    fn test_validate_self_reference() {
        let err = store("a: a\n").validate().unwrap_err();
        assert_eq!(err.chain, ["a", "a"]);
        assert_eq!(err.path, ["a"]);
    }

    #[test]
    fn test_validate_cycle_through_nested_record() {
        let defs = store("a: d\nb: a\nd:\n  x: e\n  y: b\n");
        let err = defs.validate().unwrap_err();
        assert_eq!(err.chain, ["a", "d", "b", "a"]);
    }

    #[test]
    fn test_validate_cycle_through_list() {
        let err = store("a: [x, b]\nb: a\n").validate().unwrap_err();
        assert_eq!(err.chain, ["a", "b", "a"]);
    }

    #[test]
    fn test_validate_skip_field_ignored() {
        let defs = store("a: {path: a}\n");
        assert!(defs.validate().is_err());
        assert!(ReferenceResolver::new(&defs).skip_field("path").validate().is_ok());
    }

    #[test]
    fn test_resolve_reports_context() {
        let defs = store("a: b\nb: a\n");
        let err = ReferenceResolver::new(&defs)
            .context("palette")
            .resolve(&yaml("x: y\n"))
            .unwrap_err();
        assert_eq!(err.context.as_deref(), Some("palette"));
        assert!(err.to_string().contains("a -> b -> a"));
    }
}
