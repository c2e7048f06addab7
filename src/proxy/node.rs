//! Proxy nodes built from a schema

use meshlink_connect::DatamodelService;
use serde_json::Value;
use std::sync::Arc;
use tracing::trace;

use super::schema::{NodeSchema, Shape};
use crate::error::{MeshlinkError, Result};
use crate::menu::{CallArgs, Menu};
use crate::path::{default_tables, NameTables, Path};
use crate::tui::{TuiMenu, TuiNode};

/// Build the proxy for `schema` at `path`, children included.
///
/// Every declared child is constructed eagerly; nothing is sent to the
/// remote side.
pub fn build_proxy(schema: &Arc<NodeSchema>, path: Path, service: Arc<DatamodelService>) -> ProxyNode {
    build_proxy_with_tables(schema, path, service, default_tables())
}

/// [`build_proxy`] with explicit name tables, e.g. from
/// [`ClientConfig::name_tables`](crate::config::ClientConfig::name_tables).
/// Every node of the tree shares them.
pub fn build_proxy_with_tables(
    schema: &Arc<NodeSchema>,
    path: Path,
    service: Arc<DatamodelService>,
    tables: Arc<NameTables>,
) -> ProxyNode {
    build_at(schema, Menu::with_tables(service, path, tables))
}

fn build_at(schema: &Arc<NodeSchema>, menu: Menu) -> ProxyNode {
    trace!(path = %menu.wire_path(), shape = ?schema.shape(), "building proxy");
    match (schema.shape(), schema.item()) {
        (Shape::Container, Some(item)) => ProxyNode::Container(ContainerProxy {
            menu,
            schema: Arc::clone(schema),
            item: Arc::clone(item),
        }),
        _ => ProxyNode::Menu(MenuProxy::build(schema, menu)),
    }
}

/// Proxy tree node
#[derive(Debug, Clone)]
pub enum ProxyNode {
    Menu(MenuProxy),
    Container(ContainerProxy),
}

impl ProxyNode {
    pub fn menu(&self) -> &Menu {
        match self {
            ProxyNode::Menu(proxy) => &proxy.menu,
            ProxyNode::Container(proxy) => &proxy.menu,
        }
    }

    pub fn schema(&self) -> &Arc<NodeSchema> {
        match self {
            ProxyNode::Menu(proxy) => &proxy.schema,
            ProxyNode::Container(proxy) => &proxy.schema,
        }
    }

    pub fn as_menu(&self) -> Option<&MenuProxy> {
        match self {
            ProxyNode::Menu(proxy) => Some(proxy),
            ProxyNode::Container(_) => None,
        }
    }

    pub fn as_container(&self) -> Option<&ContainerProxy> {
        match self {
            ProxyNode::Container(proxy) => Some(proxy),
            ProxyNode::Menu(_) => None,
        }
    }

    /// Container view of this node, or `NotAContainer`
    pub fn container(&self) -> Result<&ContainerProxy> {
        self.as_container()
            .ok_or_else(|| MeshlinkError::NotAContainer {
                path: self.menu().wire_path(),
            })
    }
}

/// Child found by [`MenuProxy::resolve`]
#[derive(Debug, Clone)]
pub enum ResolvedChild<'a> {
    /// Declared in the schema
    Declared(&'a ProxyNode),
    /// Only known to the remote side, resolved from its live child list
    Runtime(TuiNode),
}

impl ResolvedChild<'_> {
    pub fn menu(&self) -> &Menu {
        match self {
            ResolvedChild::Declared(node) => node.menu(),
            ResolvedChild::Runtime(node) => node.menu(),
        }
    }

    pub fn is_declared(&self) -> bool {
        matches!(self, ResolvedChild::Declared(_))
    }
}

/// Submenu or named object
#[derive(Debug, Clone)]
pub struct MenuProxy {
    menu: Menu,
    schema: Arc<NodeSchema>,
    /// In declaration order
    children: Vec<(String, ProxyNode)>,
}

impl MenuProxy {
    fn build(schema: &Arc<NodeSchema>, menu: Menu) -> Self {
        let children = schema
            .children()
            .iter()
            .map(|child| {
                let node = build_at(child, menu.child_wire(child.remote_name()));
                (child.name().to_string(), node)
            })
            .collect();
        Self {
            menu,
            schema: Arc::clone(schema),
            children,
        }
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn path(&self) -> &Path {
        self.menu.path()
    }

    /// Declared child names, in declaration order
    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(|(name, _)| name.as_str()).collect()
    }

    fn find(&self, name: &str) -> Option<&ProxyNode> {
        self.children
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(_, node)| node)
    }

    /// Declared child by local identifier
    pub fn get(&self, name: &str) -> Result<&ProxyNode> {
        self.find(name).ok_or_else(|| MeshlinkError::UnknownAttribute {
            path: self.menu.wire_path(),
            name: name.to_string(),
        })
    }

    /// Declared child, or else a child the remote side lists right now.
    ///
    /// Covers trees generated before the remote side grew new submenus.
    pub async fn resolve(&self, name: &str) -> Result<ResolvedChild<'_>> {
        if let Some(node) = self.find(name) {
            return Ok(ResolvedChild::Declared(node));
        }
        let live = TuiMenu::from_menu(self.menu.clone()).child(name).await?;
        Ok(ResolvedChild::Runtime(live))
    }

    /// Declared children followed by live children not declared
    pub async fn dir(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .children
            .iter()
            .map(|(name, _)| name.clone())
            .collect();
        for live in TuiMenu::from_menu(self.menu.clone()).dir().await? {
            if !names.contains(&live) {
                names.push(live);
            }
        }
        Ok(names)
    }

    /// Key of this object inside its container
    pub fn instance_name(&self) -> Option<&str> {
        self.menu.path().instance_name()
    }

    /// Callable leaves and named objects hold a state of their own
    pub fn has_state(&self) -> bool {
        self.schema.is_callable() || self.instance_name().is_some()
    }

    fn require_state(&self) -> Result<()> {
        if self.has_state() {
            Ok(())
        } else {
            Err(MeshlinkError::NotCallable {
                path: self.menu.wire_path(),
            })
        }
    }

    pub async fn get_state(&self) -> Result<Value> {
        self.require_state()?;
        self.menu.get_state().await
    }

    pub async fn set_state(&self, value: &Value) -> Result<()> {
        self.require_state()?;
        self.menu.set_state(value).await
    }

    /// State of this node
    pub async fn call(&self) -> Result<Value> {
        self.get_state().await
    }

    /// Run the command or query this node stands for
    pub async fn execute(&self, args: &CallArgs) -> Result<Value> {
        self.menu.execute(args).await
    }

    /// Rename the remote object; this proxy keeps addressing the old name.
    pub async fn rename(&self, new_name: &str) -> Result<()> {
        self.menu.rename(new_name).await
    }

    pub async fn get_doc_string(&self) -> Result<String> {
        if !self.schema.doc_string().is_empty() {
            return Ok(self.schema.doc_string().to_string());
        }
        self.menu.get_doc_string(false).await
    }
}

/// Keyed collection of named objects
#[derive(Debug, Clone)]
pub struct ContainerProxy {
    menu: Menu,
    schema: Arc<NodeSchema>,
    item: Arc<NodeSchema>,
}

impl ContainerProxy {
    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    /// Fresh proxy for object `name`. Lookups are not cached.
    pub fn get_item(&self, name: &str) -> MenuProxy {
        MenuProxy::build(&self.item, self.menu.item(name))
    }

    /// Create or overwrite object `name`
    pub async fn set_item(&self, name: &str, value: &Value) -> Result<()> {
        self.menu.set_item(name, value).await
    }

    /// Delete object `name` on the remote side
    pub async fn delete_item(&self, name: &str) -> Result<()> {
        self.menu.item(name).del_item().await
    }

    pub async fn object_names(&self) -> Result<Vec<String>> {
        self.menu.get_child_object_names().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Dialect;
    use crate::system::MockDatamodel;
    use meshlink_connect::ErrorPolicy;
    use meshlink_interface::Subsystem;
    use serde_json::json;

    fn settings_schema() -> Arc<NodeSchema> {
        Arc::new(
            NodeSchema::menu("root")
                .child(
                    NodeSchema::menu("setup")
                        .child(NodeSchema::menu("energy_flag").wire_name("energy?").callable())
                        .child(NodeSchema::menu("viscous")),
                )
                .child(NodeSchema::container(
                    "boundary",
                    NodeSchema::menu("boundary_child").child(NodeSchema::menu("type_").callable()),
                )),
        )
    }

    fn settings_root(mock: &MockDatamodel) -> MenuProxy {
        let service = Arc::new(DatamodelService::new(
            Arc::new(mock.clone()),
            ErrorPolicy::Suppress,
        ));
        let node = build_proxy(&settings_schema(), Path::root(Dialect::Settings), service);
        node.as_menu().unwrap().clone()
    }

    #[test]
    fn test_children_are_built_eagerly() {
        let mock = MockDatamodel::new(Subsystem::Settings);
        let root = settings_root(&mock);
        assert_eq!(root.child_names(), vec!["setup", "boundary"]);

        let setup = root.get("setup").unwrap().as_menu().unwrap();
        let energy = setup.get("energy_flag").unwrap();
        assert_eq!(energy.menu().wire_path(), "/setup/energy?");
        assert!(root.get("boundary").unwrap().as_container().is_some());
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_callable_leaf_reads_and_writes() {
        let mock = MockDatamodel::demo(Subsystem::Settings);
        let root = settings_root(&mock);
        let energy = root.get("setup").unwrap().as_menu().unwrap().get("energy_flag").unwrap();
        let energy = energy.as_menu().unwrap();

        assert_eq!(energy.call().await.unwrap(), json!(true));
        energy.set_state(&json!(false)).await.unwrap();
        assert_eq!(mock.state_of("/setup/energy?"), Some(json!(false)));
    }

    #[tokio::test]
    async fn test_plain_menu_has_no_state() {
        let mock = MockDatamodel::demo(Subsystem::Settings);
        let root = settings_root(&mock);
        let setup = root.get("setup").unwrap().as_menu().unwrap();
        let err = setup.get_state().await.unwrap_err();
        assert!(matches!(err, MeshlinkError::NotCallable { ref path } if path == "/setup"));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_unknown_child_and_non_container() {
        let mock = MockDatamodel::new(Subsystem::Settings);
        let root = settings_root(&mock);
        assert!(matches!(
            root.get("solve"),
            Err(MeshlinkError::UnknownAttribute { .. })
        ));
        assert!(matches!(
            root.get("setup").unwrap().container(),
            Err(MeshlinkError::NotAContainer { .. })
        ));
    }

    #[tokio::test]
    async fn test_container_items() {
        let mock = MockDatamodel::demo(Subsystem::Settings);
        let root = settings_root(&mock);
        let boundary = root.get("boundary").unwrap().container().unwrap();

        assert_eq!(boundary.object_names().await.unwrap(), vec!["inlet", "wall"]);

        let wall = boundary.get_item("wall");
        assert_eq!(wall.instance_name(), Some("wall"));
        assert_eq!(wall.call().await.unwrap(), json!({"name": "wall"}));
        let wall_type = wall.get("type_").unwrap();
        assert_eq!(wall_type.menu().wire_path(), "/boundary:wall/type");

        boundary.delete_item("wall").await.unwrap();
        assert_eq!(boundary.object_names().await.unwrap(), vec!["inlet"]);
    }

    fn partial_tui_root(mock: &MockDatamodel, tables: Arc<NameTables>) -> MenuProxy {
        // generated before /mesh and /query existed
        let schema = Arc::new(NodeSchema::menu("root").child(NodeSchema::menu("file")));
        let service = Arc::new(DatamodelService::new(
            Arc::new(mock.clone()),
            ErrorPolicy::Propagate,
        ));
        build_proxy_with_tables(&schema, Path::root(Dialect::Tui), service, tables)
            .as_menu()
            .unwrap()
            .clone()
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_live_children() {
        let mock = MockDatamodel::demo(Subsystem::Tui);
        let root = partial_tui_root(&mock, default_tables());

        assert!(root.resolve("file").await.unwrap().is_declared());
        assert!(mock.calls().is_empty());

        let mesh = root.resolve("mesh").await.unwrap();
        assert!(!mesh.is_declared());
        assert_eq!(mesh.menu().wire_path(), "/mesh");
        let ResolvedChild::Runtime(TuiNode::Menu(mesh)) = mesh else {
            panic!("/mesh has children of its own");
        };
        assert!(mesh.child("check").await.unwrap().is_command());

        // declared menus without declared children resolve their leaves live
        let file = root.get("file").unwrap().as_menu().unwrap();
        let read_case = file.resolve("read_case").await.unwrap();
        assert!(matches!(read_case, ResolvedChild::Runtime(TuiNode::Command(_))));

        assert!(matches!(
            root.resolve("solve").await,
            Err(MeshlinkError::UnknownAttribute { ref name, .. }) if name == "solve"
        ));
    }

    #[tokio::test]
    async fn test_dir_merges_declared_and_live_names() {
        let mock = MockDatamodel::demo(Subsystem::Tui);
        let root = partial_tui_root(&mock, default_tables());
        assert_eq!(root.dir().await.unwrap(), vec!["file", "mesh", "query"]);

        mock.add_menu("", "Meshing text command interface", &["file", "mesh", "query", "solve"]);
        assert_eq!(
            root.dir().await.unwrap(),
            vec!["file", "mesh", "query", "solve"]
        );
    }

    #[tokio::test]
    async fn test_configured_query_prefix_reaches_every_node() {
        let mock = MockDatamodel::new(Subsystem::Tui);
        mock.add_menu("", "", &["file", "ask"]);
        mock.add_menu("/ask", "", &["version"]);
        mock.add_command("/ask/version", "", json!("1.0"));
        let tables = Arc::new(NameTables::default().with_query_prefix("/ask/"));
        let root = partial_tui_root(&mock, tables);

        let version = match root.resolve("ask").await.unwrap() {
            ResolvedChild::Runtime(TuiNode::Menu(ask)) => ask.child("version").await.unwrap(),
            other => panic!("unexpected {other:?}"),
        };
        version.menu().execute(&CallArgs::default()).await.unwrap();
        assert_eq!(mock.calls_to("ExecuteQuery").len(), 1);
        assert!(mock.calls_to("ExecuteCommand").is_empty());
    }
}
