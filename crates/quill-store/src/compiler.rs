//! Quill Query Compiler
//!
//! Translates declarative (type, conditions, order) options into views and
//! evaluates them, memoizing one view per distinct canonical key. The
//! canonical key is a literal serialization: semantically equal option sets
//! that serialize differently are distinct cache entries by design.
//!
//! @version 0.1.0
//! @author Quill Development Team

use crate::query::QueryOptions;
use crate::store::Store;
use crate::types::{Document, Value};
use crate::view::{MapFn, ReduceFn, View};
use quill_common::Result;
use std::cmp::Ordering;
use std::sync::Arc;

// =============================================================================
// Query Compiler
// =============================================================================

/// Compiles declarative query options into cached views on a store.
///
/// A query spec has two observable states relative to the cache:
/// uncompiled (no view under its canonical key) and compiled. The
/// transition happens once per distinct key, on first use; compiled is
/// terminal for the lifetime of the store.
#[derive(Clone)]
pub struct QueryCompiler {
    store: Arc<Store>,
}

impl QueryCompiler {
    /// Create a compiler bound to a store handle.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    // -------------------------------------------------------------------------
    // Canonical Keys
    // -------------------------------------------------------------------------

    /// Deterministic registry name for a query spec, built from the type
    /// name and a literal serialization of the options in supplied order.
    pub fn canonical_key(&self, type_name: &str, options: &QueryOptions) -> String {
        if options.is_empty() {
            return type_name.to_string();
        }

        let mut parts = Vec::new();

        if !options.conditions().is_empty() {
            let conditions: Vec<String> = options
                .conditions()
                .iter()
                .map(|(attribute, matcher)| format!("{} => {}", attribute, matcher))
                .collect();
            parts.push(format!("conditions => {{{}}}", conditions.join(", ")));
        }

        if let Some(order) = options.order_spec() {
            parts.push(format!("order => {:?}", order));
        }

        format!("{}: {{{}}}", type_name, parts.join(", "))
    }

    // -------------------------------------------------------------------------
    // Compilation
    // -------------------------------------------------------------------------

    /// Look up or build the view implementing a query spec.
    ///
    /// A cache hit returns the registered view as is. A miss builds a map
    /// transform that rejects documents of the wrong kind, then evaluates
    /// the conditions in supplied order with first-failure short-circuit,
    /// and includes surviving documents verbatim; when `order` is present,
    /// a reduce transform stably sorts by the named attribute tuple,
    /// ascending.
    pub fn compile(&self, type_name: &str, options: &QueryOptions) -> Arc<View> {
        let key = self.canonical_key(type_name, options);

        if let Some(view) = self.store.lookup_view(&key) {
            return view;
        }

        tracing::info!(view = %key, "compiling query view");

        let kind_field = self.store.kind_field().to_string();
        let kind = type_name.to_string();
        let conditions = options.conditions().to_vec();

        let map: MapFn = Arc::new(move |doc, _arg| {
            if doc.kind(&kind_field) != Some(kind.as_str()) {
                return None;
            }
            for (attribute, matcher) in &conditions {
                if !matcher.matches(doc.get_or_null(attribute)) {
                    return None;
                }
            }
            Some(Value::Object(doc.clone()))
        });

        let reduce = (!options.order_fields().is_empty()).then(|| {
            let fields = options.order_fields();
            let reduce: ReduceFn = Arc::new(move |mut rows| {
                // sort_by is stable: ties keep original relative order.
                rows.sort_by(|a, b| compare_by_attributes(a, b, &fields));
                Value::Array(rows)
            });
            reduce
        });

        self.store.register_view(key, map, reduce)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Compile the spec, evaluate its view now, and return the matching
    /// documents in result order.
    pub fn find(&self, type_name: &str, options: &QueryOptions) -> Result<Vec<Document>> {
        let view = self.compile(type_name, options);
        let result = self.store.evaluate(view.name(), None)?;

        let rows = match result {
            Value::Array(rows) => rows,
            other => vec![other],
        };

        Ok(rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(doc) => Some(doc),
                _ => None,
            })
            .collect())
    }
}

/// Tuple comparison over named attributes, ascending. Incomparable pairs
/// compare equal so the stable sort degrades to input order.
fn compare_by_attributes(a: &Value, b: &Value, fields: &[String]) -> Ordering {
    for field in fields {
        let left = attribute(a, field);
        let right = attribute(b, field);
        match left.compare(right) {
            Some(Ordering::Equal) | None => continue,
            Some(order) => return order,
        }
    }
    Ordering::Equal
}

fn attribute<'a>(row: &'a Value, name: &str) -> &'a Value {
    match row {
        Value::Object(doc) => doc.get_or_null(name),
        _ => Value::null(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Matcher;

    fn seeded_store() -> Arc<Store> {
        let store = Arc::new(Store::new());
        for (first, last, age) in [
            ("liz", "van", 22i64),
            ("mark", "van", 23i64),
            ("joanne", "van", 47i64),
            ("john", "hwang", 28i64),
        ] {
            let mut doc = Document::from_attrs([
                ("doctype", Value::from("User")),
                ("first_name", Value::from(first)),
                ("last_name", Value::from(last)),
            ]);
            doc.set("age", age);
            store.append(doc);
        }
        store.append(Document::from_attrs([
            ("doctype", "Group"),
            ("last_name", "van"),
        ]));
        store
    }

    fn first_names(docs: &[Document]) -> Vec<&str> {
        docs.iter()
            .filter_map(|d| d.get("first_name").and_then(Value::as_str))
            .collect()
    }

    #[test]
    fn test_canonical_key_formats() {
        let compiler = QueryCompiler::new(Arc::new(Store::new()));

        assert_eq!(
            compiler.canonical_key("User", &QueryOptions::new()),
            "User"
        );

        let options = QueryOptions::new()
            .condition("age", Matcher::between(20i64, 30i64))
            .order("last_name");
        assert_eq!(
            compiler.canonical_key("User", &options),
            "User: {conditions => {age => 20..30}, order => \"last_name\"}"
        );

        let order_only = QueryOptions::new().order("last_name, first_name");
        assert_eq!(
            compiler.canonical_key("User", &order_only),
            "User: {order => \"last_name, first_name\"}"
        );
    }

    #[test]
    fn test_compile_is_idempotent() {
        let store = seeded_store();
        let compiler = QueryCompiler::new(Arc::clone(&store));
        let options = QueryOptions::new().condition("last_name", Matcher::equals("van"));

        let first = compiler.compile("User", &options);
        let second = compiler.compile("User", &options);

        assert_eq!(first.name(), second.name());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.view_names().len(), 1);
    }

    #[test]
    fn test_distinct_phrasings_are_distinct_entries() {
        // Equals(22) and OneOf([22]) are semantically close but serialize
        // differently; each phrasing gets its own cached view.
        let store = seeded_store();
        let compiler = QueryCompiler::new(Arc::clone(&store));

        compiler.compile(
            "User",
            &QueryOptions::new().condition("age", Matcher::equals(22i64)),
        );
        compiler.compile(
            "User",
            &QueryOptions::new().condition("age", Matcher::one_of([22i64])),
        );

        assert_eq!(store.view_names().len(), 2);
    }

    #[test]
    fn test_numeric_type_phrasings_do_not_alias() {
        // Int(22) and Float(22.0) match differently under exact equality,
        // so their specs must compile to separate cached views.
        let store = seeded_store();
        let compiler = QueryCompiler::new(Arc::clone(&store));

        let as_int = QueryOptions::new().condition("age", Matcher::equals(22i64));
        let as_float = QueryOptions::new().condition("age", Matcher::equals(22.0f64));
        assert_ne!(
            compiler.canonical_key("User", &as_int),
            compiler.canonical_key("User", &as_float)
        );

        // Stored ages are ints: the int spec matches liz, the float spec
        // matches nothing even when compiled second.
        assert_eq!(compiler.find("User", &as_int).unwrap().len(), 1);
        assert_eq!(compiler.find("User", &as_float).unwrap().len(), 0);
        assert_eq!(store.view_names().len(), 2);
    }

    #[test]
    fn test_equality_and_membership_do_not_alias() {
        let compiler = QueryCompiler::new(Arc::new(Store::new()));

        let eq_array = QueryOptions::new().condition(
            "tags",
            Matcher::equals(Value::Array(vec![Value::Int(1), Value::Int(2)])),
        );
        let membership =
            QueryOptions::new().condition("tags", Matcher::one_of([1i64, 2i64]));

        assert_ne!(
            compiler.canonical_key("User", &eq_array),
            compiler.canonical_key("User", &membership)
        );
    }

    #[test]
    fn test_kind_scoping() {
        let store = seeded_store();
        let compiler = QueryCompiler::new(Arc::clone(&store));

        let vans = compiler
            .find(
                "User",
                &QueryOptions::new().condition("last_name", Matcher::equals("van")),
            )
            .unwrap();
        assert_eq!(vans.len(), 3);

        // The Group document shares the attribute but not the kind.
        let groups = compiler.find("Group", &QueryOptions::new()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].kind("doctype"), Some("Group"));
    }

    #[test]
    fn test_condition_composition() {
        let store = seeded_store();
        let compiler = QueryCompiler::new(Arc::clone(&store));

        let in_range = compiler
            .find(
                "User",
                &QueryOptions::new().condition("age", Matcher::between(20i64, 30i64)),
            )
            .unwrap();
        assert_eq!(first_names(&in_range), vec!["liz", "mark", "john"]);

        let in_set = compiler
            .find(
                "User",
                &QueryOptions::new().condition("age", Matcher::one_of([22i64, 23i64])),
            )
            .unwrap();
        assert_eq!(first_names(&in_set), vec!["liz", "mark"]);

        let exact = compiler
            .find(
                "User",
                &QueryOptions::new().condition("age", Matcher::equals(47i64)),
            )
            .unwrap();
        assert_eq!(first_names(&exact), vec!["joanne"]);

        let combined = compiler
            .find(
                "User",
                &QueryOptions::new()
                    .condition("last_name", Matcher::pattern("^van").unwrap())
                    .condition("age", Matcher::between(20i64, 30i64)),
            )
            .unwrap();
        assert_eq!(first_names(&combined), vec!["liz", "mark"]);
    }

    #[test]
    fn test_order_is_a_stable_sort() {
        let store = Arc::new(Store::new());
        for (first, last) in [("a", "brown"), ("b", "adams"), ("c", "brown")] {
            store.append(Document::from_attrs([
                ("doctype", "User"),
                ("first_name", first),
                ("last_name", last),
            ]));
        }
        let compiler = QueryCompiler::new(Arc::clone(&store));

        let sorted = compiler
            .find("User", &QueryOptions::new().order("last_name"))
            .unwrap();
        // Ties keep original relative order: brown(a) before brown(c).
        assert_eq!(first_names(&sorted), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_multi_key_order() {
        let store = Arc::new(Store::new());
        for (first, last) in [("mark", "van"), ("liz", "van"), ("john", "hwang")] {
            store.append(Document::from_attrs([
                ("doctype", "User"),
                ("first_name", first),
                ("last_name", last),
            ]));
        }
        let compiler = QueryCompiler::new(Arc::clone(&store));

        let sorted = compiler
            .find(
                "User",
                &QueryOptions::new().order("last_name, first_name"),
            )
            .unwrap();
        assert_eq!(first_names(&sorted), vec!["john", "liz", "mark"]);
    }

    #[test]
    fn test_absent_attribute_is_safe() {
        let store = Arc::new(Store::new());
        store.append(Document::from_attrs([("doctype", "User")]));
        let mut with_age = Document::from_attrs([("doctype", "User")]);
        with_age.set("age", 22i64);
        store.append(with_age);
        let compiler = QueryCompiler::new(Arc::clone(&store));

        // Filtering and sorting on an attribute some documents lack must
        // not fail; the absent attribute reads as null.
        let found = compiler
            .find(
                "User",
                &QueryOptions::new()
                    .condition("age", Matcher::between(20i64, 30i64))
                    .order("age"),
            )
            .unwrap();
        assert_eq!(found.len(), 1);
    }
}
