/*!
 * Path model: local identifiers <-> remote slash-delimited addresses
 */

use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Naming dialect of a remote sub-system.
///
/// The two trees disagree on how a trailing `?` in a remote menu name is
/// mapped to a local identifier; each dialect keeps its own rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Text-command menus: `[beta]` tag and trailing `?` are dropped
    Tui,
    /// Settings / named objects: trailing `?` becomes the flag suffix
    Settings,
}

/// Immutable naming tables shared by the path model and the RPC facade.
#[derive(Debug, Clone)]
pub struct NameTables {
    reserved: HashSet<&'static str>,
    /// Appended when a settings name ends with `?`
    pub flag_suffix: &'static str,
    /// Tag stripped from TUI menu names
    pub beta_tag: &'static str,
    /// Field under which positional command arguments are packed
    pub positional_field: &'static str,
    /// Paths under this prefix are executed as queries
    pub query_prefix: String,
}

/// Rust keywords plus the names the leaf-class generator reserves.
const RESERVED_WORDS: &[&str] = &[
    // Rust strict and reserved keywords
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
    // generator-reserved
    "and", "assert", "class", "def", "del", "elif", "except", "finally", "from", "global",
    "import", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "with",
];

impl Default for NameTables {
    fn default() -> Self {
        Self {
            reserved: RESERVED_WORDS.iter().copied().collect(),
            flag_suffix: "_flag",
            beta_tag: "[beta]",
            positional_field: "tui_args",
            query_prefix: "/query/".to_string(),
        }
    }
}

impl NameTables {
    /// Ordered child menu names
    pub const CHILD_NAMES: &'static str = "CHILD_NAMES";
    pub const HELP_STRING: &'static str = "HELP_STRING";
    pub const DATA_TYPE: &'static str = "DATA_TYPE";
    /// Instance names held by a keyed container
    pub const OBJECT_NAMES: &'static str = "OBJECT_NAMES";
    pub const IS_EXTENDED_TUI: &'static str = "is_extended_tui";
    /// `DATA_TYPE` of a keyed container node
    pub const NAMED_OBJECT_CONTAINER: &'static str = "NamedObjectContainer";

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    /// Same tables with a different query namespace
    pub fn with_query_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.query_prefix = prefix.into();
        self
    }
}

/// Process-wide default tables
pub static NAME_TABLES: Lazy<Arc<NameTables>> = Lazy::new(|| Arc::new(NameTables::default()));

pub fn default_tables() -> Arc<NameTables> {
    Arc::clone(&NAME_TABLES)
}

/// Undo keyword escaping: `import_` -> `import`.
pub fn func_name_to_wire_name(name: &str, tables: &NameTables) -> String {
    if let Some(stripped) = name.strip_suffix('_') {
        if tables.is_reserved(stripped) {
            return stripped.to_string();
        }
    }
    name.to_string()
}

/// Map a remote menu name to a local identifier under `dialect`.
pub fn wire_name_to_func_name(name: &str, dialect: Dialect, tables: &NameTables) -> String {
    match dialect {
        Dialect::Settings => {
            if tables.is_reserved(name) {
                format!("{name}_")
            } else if let Some(stripped) = name.strip_suffix('?') {
                format!("{stripped}{}", tables.flag_suffix)
            } else {
                name.to_string()
            }
        }
        Dialect::Tui => {
            let cleaned = name.replace(tables.beta_tag, "");
            let cleaned = cleaned.trim();
            let cleaned = cleaned.strip_suffix('?').unwrap_or(cleaned).trim_end();
            if tables.is_reserved(cleaned) {
                format!("{cleaned}_")
            } else {
                cleaned.to_string()
            }
        }
    }
}

/// Lossless counterpart of [`wire_name_to_func_name`]: only keyword clashes
/// are escaped.
fn escape_wire_name(name: &str, tables: &NameTables) -> String {
    if tables.is_reserved(name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// One step down the remote hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathComponent {
    /// Local identifier (settings dialect: may carry a folded `:key`)
    pub name: String,
    /// Instance key inside a named-object container (TUI dialect only)
    pub key: Option<String>,
}

/// Ordered location of a node in the remote tree.
///
/// Built incrementally while walking down from the root and never mutated
/// afterwards; renaming a remote object does not update existing paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    dialect: Dialect,
    components: Vec<PathComponent>,
}

impl Path {
    pub fn root(dialect: Dialect) -> Self {
        Self {
            dialect,
            components: Vec::new(),
        }
    }

    /// Parse a wire address (`/comp1/comp2:key/comp3`).
    ///
    /// Lossless: `parse(w).to_wire() == w` for every normalized address.
    /// `""` and `"/"` both parse to the root.
    pub fn parse(wire: &str, dialect: Dialect, tables: &NameTables) -> Self {
        let mut path = Self::root(dialect);
        for segment in wire.split('/').filter(|s| !s.is_empty()) {
            path = match segment.split_once(':') {
                Some((name, key)) => path.keyed_child(&escape_wire_name(name, tables), key, tables),
                None => path.child_wire(segment, tables),
            };
        }
        path
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn components(&self) -> &[PathComponent] {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn last(&self) -> Option<&PathComponent> {
        self.components.last()
    }

    /// This path extended by one plain component
    pub fn child(&self, name: &str) -> Self {
        let mut components = self.components.clone();
        components.push(PathComponent {
            name: name.to_string(),
            key: None,
        });
        Self {
            dialect: self.dialect,
            components,
        }
    }

    /// This path extended by a component named exactly as the remote side
    /// names it (only keyword clashes are escaped, so serialization restores
    /// the original).
    pub fn child_wire(&self, wire_name: &str, tables: &NameTables) -> Self {
        self.child(&escape_wire_name(wire_name, tables))
    }

    /// This path extended by one keyed component
    pub fn keyed_child(&self, name: &str, key: &str, tables: &NameTables) -> Self {
        let mut components = self.components.clone();
        components.push(Self::keyed_component(self.dialect, name, key, tables));
        Self {
            dialect: self.dialect,
            components,
        }
    }

    /// This path with its last component keyed by `key` (root stays root).
    pub fn with_key(&self, key: &str, tables: &NameTables) -> Self {
        let mut components = self.components.clone();
        if let Some(last) = components.pop() {
            components.push(Self::keyed_component(self.dialect, &last.name, key, tables));
        }
        Self {
            dialect: self.dialect,
            components,
        }
    }

    fn keyed_component(dialect: Dialect, name: &str, key: &str, tables: &NameTables) -> PathComponent {
        match dialect {
            Dialect::Tui => PathComponent {
                name: name.to_string(),
                key: Some(key.to_string()),
            },
            Dialect::Settings => PathComponent {
                name: format!("{}:{}", func_name_to_wire_name(name, tables), key),
                key: None,
            },
        }
    }

    /// Instance key of the last component, if it is a named object
    pub fn instance_name(&self) -> Option<&str> {
        let last = self.components.last()?;
        match self.dialect {
            Dialect::Tui => last.key.as_deref(),
            Dialect::Settings => last.name.split_once(':').map(|(_, key)| key),
        }
    }

    /// Serialize to the address the remote side matches on. The root is `""`.
    pub fn to_wire(&self, tables: &NameTables) -> String {
        let mut wire = String::new();
        for component in &self.components {
            wire.push('/');
            wire.push_str(&func_name_to_wire_name(&component.name, tables));
            if let Some(ref key) = component.key {
                wire.push(':');
                wire.push_str(key);
            }
        }
        wire
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire(&NAME_TABLES))
    }
}
