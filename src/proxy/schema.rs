//! NodeSchema: declarative description of a proxy tree

use std::sync::Arc;

use crate::discovery::StaticInfo;
use crate::path::{func_name_to_wire_name, wire_name_to_func_name, Dialect, NameTables, NAME_TABLES};

/// Kind of proxy a schema node produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Plain submenu; becomes a named object when reached through a container
    Menu,
    /// Keyed collection of objects described by the item schema
    Container,
}

/// Description of one node: its declared children and what it can do.
///
/// ```
/// use meshlink::proxy::NodeSchema;
///
/// let setup = NodeSchema::menu("setup")
///     .child(NodeSchema::menu("energy_flag").callable())
///     .child(NodeSchema::container(
///         "boundary",
///         NodeSchema::menu("boundary_child").child(NodeSchema::menu("type_").callable()),
///     ));
/// assert_eq!(setup.children().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSchema {
    name: String,
    wire_name: String,
    shape: Shape,
    callable: bool,
    extended_tui: bool,
    doc: String,
    children: Vec<Arc<NodeSchema>>,
    item: Option<Arc<NodeSchema>>,
}

impl NodeSchema {
    fn new(name: &str, shape: Shape) -> Self {
        Self {
            name: name.to_string(),
            wire_name: func_name_to_wire_name(name, &NAME_TABLES),
            shape,
            callable: false,
            extended_tui: false,
            doc: String::new(),
            children: Vec::new(),
            item: None,
        }
    }

    /// Submenu declared by its local identifier
    pub fn menu(name: &str) -> Self {
        Self::new(name, Shape::Menu)
    }

    /// Keyed container whose objects follow `item`
    pub fn container(name: &str, item: NodeSchema) -> Self {
        let mut schema = Self::new(name, Shape::Container);
        schema.item = Some(Arc::new(item));
        schema
    }

    /// Override the remote name when the mapping from the identifier is lossy
    pub fn wire_name(mut self, wire_name: &str) -> Self {
        self.wire_name = wire_name.to_string();
        self
    }

    /// Node holds a state of its own (`get_state` / `set_state`)
    pub fn callable(mut self) -> Self {
        self.callable = true;
        self
    }

    /// Remote side adds children at runtime; resolve them with
    /// [`MenuProxy::resolve`](super::MenuProxy::resolve)
    pub fn extended_tui(mut self, extended: bool) -> Self {
        self.extended_tui = extended;
        self
    }

    pub fn doc(mut self, doc: &str) -> Self {
        self.doc = doc.to_string();
        self
    }

    pub fn child(mut self, child: NodeSchema) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn remote_name(&self) -> &str {
        &self.wire_name
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn is_callable(&self) -> bool {
        self.callable
    }

    pub fn is_extended_tui(&self) -> bool {
        self.extended_tui
    }

    pub fn doc_string(&self) -> &str {
        &self.doc
    }

    pub fn children(&self) -> &[Arc<NodeSchema>] {
        &self.children
    }

    pub fn item(&self) -> Option<&Arc<NodeSchema>> {
        self.item.as_ref()
    }

    /// Schema for a discovered subtree.
    ///
    /// Menus become submenus, containers become keyed containers whose
    /// objects follow the discovered item layout, and commands become
    /// callable leaves. Keys of the discovery tree are remote names;
    /// identifiers follow `dialect`.
    pub fn from_static_info(
        wire_name: &str,
        info: &StaticInfo,
        dialect: Dialect,
        tables: &NameTables,
    ) -> Self {
        let name = wire_name_to_func_name(wire_name, dialect, tables);
        let schema = if info.container {
            let item = match &info.item {
                Some(item) => Self::from_static_info(wire_name, item, dialect, tables),
                None => Self::menu(&name),
            };
            Self::container(&name, item)
        } else {
            Self::menu(&name)
        };
        let mut schema = schema
            .wire_name(wire_name)
            .doc(&info.help)
            .extended_tui(info.extended_tui);
        for (name, menu) in &info.menus {
            schema = schema.child(Self::from_static_info(name, menu, dialect, tables));
        }
        for (name, command) in &info.commands {
            schema = schema.child(Self::from_static_info(name, command, dialect, tables).callable());
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keyword_identifier_maps_to_remote_name() {
        let schema = NodeSchema::menu("import_");
        assert_eq!(schema.name(), "import_");
        assert_eq!(schema.remote_name(), "import");
    }

    #[test]
    fn test_from_static_info() {
        let info = StaticInfo::from_value(&json!({
            "help": "root",
            "menus": {
                "mesh": {"help": "Mesh", "commands": {"auto_mesh [beta]": {"help": "Auto"}}}
            },
            "commands": {"exit": {}}
        }))
        .unwrap();

        let tables = NameTables::default();
        let schema = NodeSchema::from_static_info("", &info, Dialect::Tui, &tables);
        assert_eq!(schema.doc_string(), "root");
        assert_eq!(schema.children().len(), 2);

        let mesh = &schema.children()[0];
        assert_eq!(mesh.name(), "mesh");
        assert!(!mesh.is_callable());

        let auto_mesh = &mesh.children()[0];
        assert_eq!(auto_mesh.name(), "auto_mesh");
        assert_eq!(auto_mesh.remote_name(), "auto_mesh [beta]");
        assert!(auto_mesh.is_callable());

        assert!(schema.children()[1].is_callable());
    }

    #[test]
    fn test_container_from_static_info() {
        let info = StaticInfo::from_value(&json!({
            "menus": {
                "boundary": {
                    "container": true,
                    "item": {"commands": {"type": {}}}
                }
            }
        }))
        .unwrap();

        let schema = NodeSchema::from_static_info("", &info, Dialect::Settings, &NAME_TABLES);
        let boundary = &schema.children()[0];
        assert_eq!(boundary.shape(), Shape::Container);
        let item = boundary.item().unwrap();
        assert_eq!(item.shape(), Shape::Menu);
        assert_eq!(item.children()[0].name(), "type_");
        assert!(item.children()[0].is_callable());
    }
}
