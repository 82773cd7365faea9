//! Quill CLI - Command Line Interface
//!
//! Demo and query tool exercising the Quill document store's public
//! operations: named map/reduce views and declarative compiled queries
//! over a YAML seed file.
//!
//! @version 0.1.0
//! @author Quill Development Team

use clap::{Parser, Subcommand};
use quill_common::{QuillError, Result, StoreConfig};
use quill_store::{Document, MapFn, Matcher, QueryOptions, RecordType, ReduceFn, Store, Value};
use std::path::PathBuf;
use std::sync::Arc;

// =============================================================================
// CLI Arguments
// =============================================================================

#[derive(Parser)]
#[command(name = "quill")]
#[command(author = "Quill Development Team")]
#[command(version = "0.1.0")]
#[command(about = "Quill document store CLI", long_about = None)]
struct Cli {
    /// YAML file of seed documents (defaults to the bundled demo data)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// TOML store configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Attribute holding the kind discriminator (overrides the config file)
    #[arg(long, global = true)]
    kind_field: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the named-view demo over the seed documents
    Demo,
    /// Run a declarative query against the seed documents
    Find {
        /// Record kind to scope the query to
        #[arg(short, long)]
        kind: String,
        /// Equality condition, attribute=value (repeatable)
        #[arg(long = "where", value_name = "ATTR=VALUE")]
        where_eq: Vec<String>,
        /// Pattern condition, attribute=regex (repeatable)
        #[arg(long = "matches", value_name = "ATTR=REGEX")]
        matches: Vec<String>,
        /// Inclusive range condition, attribute=low,high (repeatable)
        #[arg(long = "between", value_name = "ATTR=LOW,HIGH")]
        between: Vec<String>,
        /// Set membership condition, attribute=v1,v2,... (repeatable)
        #[arg(long = "one-of", value_name = "ATTR=V1,V2")]
        one_of: Vec<String>,
        /// Sort order: attribute name or comma-separated list, ascending
        #[arg(short, long)]
        order: Option<String>,
    },
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let store = load_store(
        cli.data.as_deref(),
        cli.config.as_deref(),
        cli.kind_field.as_deref(),
    )?;

    match cli.command {
        Commands::Demo => demo(&store),
        Commands::Find {
            kind,
            where_eq,
            matches,
            between,
            one_of,
            order,
        } => {
            let mut options = QueryOptions::new();
            for spec in &where_eq {
                let (attr, value) = split_condition(spec)?;
                options = options.condition(attr, Matcher::Equals(parse_literal(value)));
            }
            for spec in &matches {
                let (attr, pattern) = split_condition(spec)?;
                options = options.condition(attr, Matcher::pattern(pattern)?);
            }
            for spec in &between {
                let (attr, bounds) = split_condition(spec)?;
                let (low, high) = bounds.split_once(',').ok_or_else(|| {
                    QuillError::Configuration(format!("expected LOW,HIGH in {:?}", spec))
                })?;
                options = options.condition(
                    attr,
                    Matcher::between(parse_literal(low.trim()), parse_literal(high.trim())),
                );
            }
            for spec in &one_of {
                let (attr, values) = split_condition(spec)?;
                let values: Vec<Value> =
                    values.split(',').map(|v| parse_literal(v.trim())).collect();
                options = options.condition(attr, Matcher::OneOf(values));
            }
            if let Some(order) = order {
                options = options.order(order);
            }

            let records = RecordType::bind(store, kind.as_str()).find(&options)?;
            for record in &records {
                print_value(&Value::Object(record.document().clone()))?;
            }
            tracing::info!(count = records.len(), "query finished");
            Ok(())
        }
    }
}

// =============================================================================
// Demo
// =============================================================================

/// Register the demo view set and evaluate each one.
fn demo(store: &Arc<Store>) -> Result<()> {
    let kind_field = store.kind_field().to_string();
    let user_map = {
        let kind_field = kind_field.clone();
        let map: MapFn = Arc::new(move |doc, _| {
            (doc.kind(&kind_field) == Some("user")).then(|| Value::Object(doc.clone()))
        });
        map
    };

    {
        let kind_field = kind_field.clone();
        let map: MapFn = Arc::new(move |doc, _| {
            if doc.kind(&kind_field) != Some("user") {
                return None;
            }
            let first = doc.get_or_null("first_name").as_str().unwrap_or("");
            let last = doc.get_or_null("last_name").as_str().unwrap_or("");
            let mut row = Document::new();
            row.set("name", format!("{} {}", first, last));
            row.set("email", doc.get_or_null("email").clone());
            Some(Value::Object(row))
        });
        store.register_view("all users", map, None);
    }

    {
        let kind_field = kind_field.clone();
        let map: MapFn = Arc::new(move |doc, arg| {
            let domain = arg.and_then(Value::as_str)?;
            if doc.kind(&kind_field) != Some("user") {
                return None;
            }
            let email = doc.get("email").and_then(Value::as_str)?;
            email.ends_with(domain).then(|| Value::from(email))
        });
        store.register_view("all users with email addresses from domain", map, None);
    }

    let count: ReduceFn = Arc::new(|rows| Value::Int(rows.len() as i64));
    store.register_view("user count", Arc::clone(&user_map), Some(count));

    let all_map: MapFn = Arc::new(|doc, _| Some(Value::Object(doc.clone())));
    let count: ReduceFn = Arc::new(|rows| Value::Int(rows.len() as i64));
    store.register_view("all documents count", all_map, Some(count));

    let names_sorted: ReduceFn = Arc::new(|rows| sort_names(rows, false));
    store.register_view(
        "names sorted by last name",
        Arc::clone(&user_map),
        Some(names_sorted),
    );

    let names_reversed: ReduceFn = Arc::new(|rows| sort_names(rows, true));
    store.register_view(
        "names sorted by last name descending",
        Arc::clone(&user_map),
        Some(names_reversed),
    );

    for name in [
        "all users",
        "names sorted by last name",
        "names sorted by last name descending",
        "user count",
        "all documents count",
    ] {
        println!("{}:", name);
        print_value(&store.evaluate(name, None)?)?;
        println!();
    }

    for domain in ["foobar.com", "gmail.com"] {
        println!("all users with {} email addresses:", domain);
        let arg = Value::from(domain);
        print_value(&store.evaluate("all users with email addresses from domain", Some(&arg))?)?;
        println!();
    }

    // The same store answers compiled queries through the record façade.
    let users = RecordType::bind(Arc::clone(store), "user");
    println!("users aged 20..30, by last name then first name:");
    let found = users.find(
        &QueryOptions::new()
            .condition("age", Matcher::between(20i64, 30i64))
            .order("last_name, first_name"),
    )?;
    for record in &found {
        print_value(&Value::Object(record.document().clone()))?;
    }

    Ok(())
}

/// Sort full documents by last name, then project to display names.
fn sort_names(mut rows: Vec<Value>, descending: bool) -> Value {
    rows.sort_by(|a, b| {
        let a = last_name(a);
        let b = last_name(b);
        a.cmp(&b)
    });
    if descending {
        rows.reverse();
    }
    let names = rows
        .iter()
        .filter_map(Value::as_document)
        .map(|doc| {
            let first = doc.get_or_null("first_name").as_str().unwrap_or("");
            let last = doc.get_or_null("last_name").as_str().unwrap_or("");
            Value::from(format!("{} {}", first, last))
        })
        .collect();
    Value::Array(names)
}

fn last_name(row: &Value) -> String {
    row.as_document()
        .and_then(|doc| doc.get("last_name"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

// =============================================================================
// Helpers
// =============================================================================

/// Build a store from a YAML seed file, or the bundled demo data. Store
/// configuration comes from the TOML file when given; the kind-field flag
/// overrides both the file and the default.
fn load_store(
    data: Option<&std::path::Path>,
    config: Option<&std::path::Path>,
    kind_field: Option<&str>,
) -> Result<Arc<Store>> {
    let content = match data {
        Some(path) => std::fs::read_to_string(path)?,
        None => include_str!("../data/demo.yml").to_string(),
    };

    let documents: Vec<Document> = serde_yaml::from_str(&content)
        .map_err(|e| QuillError::Serialization(e.to_string()))?;

    let mut store_config = match config {
        Some(path) => StoreConfig::from_file(path)?,
        None => StoreConfig::default(),
    };
    if let Some(kind_field) = kind_field {
        store_config.kind_field = kind_field.to_string();
    }

    let store = Arc::new(Store::with_config(store_config));
    for doc in documents {
        store.append(doc);
    }
    tracing::debug!(documents = store.len(), "seed data loaded");

    Ok(store)
}

fn split_condition(spec: &str) -> Result<(&str, &str)> {
    spec.split_once('=')
        .ok_or_else(|| QuillError::Configuration(format!("expected ATTR=VALUE in {:?}", spec)))
}

/// Parse a command-line literal: integer, float, boolean, null, or string.
fn parse_literal(text: &str) -> Value {
    if text == "null" {
        return Value::Null;
    }
    if let Ok(b) = text.parse::<bool>() {
        return Value::Bool(b);
    }
    if let Ok(n) = text.parse::<i64>() {
        return Value::Int(n);
    }
    if let Ok(f) = text.parse::<f64>() {
        return Value::Float(f);
    }
    Value::from(text)
}

fn print_value(value: &Value) -> Result<()> {
    let json = serde_json::to_string_pretty(&value.to_json())
        .map_err(|e| QuillError::Serialization(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_literal() {
        assert_eq!(parse_literal("22"), Value::Int(22));
        assert_eq!(parse_literal("2.5"), Value::Float(2.5));
        assert_eq!(parse_literal("true"), Value::Bool(true));
        assert_eq!(parse_literal("null"), Value::Null);
        assert_eq!(parse_literal("van"), Value::from("van"));
    }

    #[test]
    fn test_split_condition() {
        assert_eq!(split_condition("age=22").unwrap(), ("age", "22"));
        assert!(split_condition("age").is_err());
    }

    #[test]
    fn test_bundled_seed_loads() {
        let store = load_store(None, None, None).unwrap();
        assert_eq!(store.len(), 7);
        assert_eq!(store.kind_field(), "doctype");
    }

    #[test]
    fn test_config_file_sets_kind_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quill.toml");
        std::fs::write(&path, "kind_field = \"clazz\"\n").unwrap();

        let store = load_store(None, Some(&path), None).unwrap();
        assert_eq!(store.kind_field(), "clazz");

        // The flag overrides the file.
        let store = load_store(None, Some(&path), Some("doctype")).unwrap();
        assert_eq!(store.kind_field(), "doctype");
    }
}
