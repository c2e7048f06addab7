/*!
 * Text-command menus resolved at runtime
 *
 * A [`TuiMenu`] knows nothing about its children ahead of time. Looking up a
 * child asks the remote side for the live child list: a child that has
 * children of its own becomes another menu, anything else a [`TuiCommand`].
 *
 * Commands run in the background and hand back a [`PendingCommand`]; queries
 * complete before `execute` returns.
 */

use meshlink_connect::DatamodelService;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{MeshlinkError, Result};
use crate::menu::{CallArgs, Menu};
use crate::path::{wire_name_to_func_name, NameTables, Path};

/// Submenu of the text-command tree
#[derive(Debug, Clone)]
pub struct TuiMenu {
    menu: Menu,
}

/// Leaf of the text-command tree
#[derive(Debug, Clone)]
pub struct TuiCommand {
    menu: Menu,
}

/// Result of resolving a child name
#[derive(Debug, Clone)]
pub enum TuiNode {
    Menu(TuiMenu),
    Command(TuiCommand),
}

impl TuiNode {
    pub fn menu(&self) -> &Menu {
        match self {
            TuiNode::Menu(menu) => &menu.menu,
            TuiNode::Command(command) => &command.menu,
        }
    }

    pub fn as_menu(&self) -> Option<&TuiMenu> {
        match self {
            TuiNode::Menu(menu) => Some(menu),
            TuiNode::Command(_) => None,
        }
    }

    pub fn as_command(&self) -> Option<&TuiCommand> {
        match self {
            TuiNode::Command(command) => Some(command),
            TuiNode::Menu(_) => None,
        }
    }

    pub fn is_command(&self) -> bool {
        matches!(self, TuiNode::Command(_))
    }
}

impl TuiMenu {
    pub fn new(service: Arc<DatamodelService>, path: Path) -> Self {
        Self {
            menu: Menu::new(service, path),
        }
    }

    /// Menu whose whole subtree uses `tables` (query prefix included)
    pub fn with_tables(service: Arc<DatamodelService>, path: Path, tables: Arc<NameTables>) -> Self {
        Self {
            menu: Menu::with_tables(service, path, tables),
        }
    }

    /// Root of the service's text-command tree
    pub fn root(service: Arc<DatamodelService>) -> Self {
        Self {
            menu: Menu::root(service),
        }
    }

    pub fn from_menu(menu: Menu) -> Self {
        Self { menu }
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn path(&self) -> &Path {
        self.menu.path()
    }

    /// Local identifiers of the children the remote side lists right now
    pub async fn dir(&self) -> Result<Vec<String>> {
        let names = self.menu.get_child_names(false).await?;
        Ok(names
            .iter()
            .map(|name| wire_name_to_func_name(name, self.menu.dialect(), self.menu.tables()))
            .collect())
    }

    /// Resolve a child by local identifier (or by its exact remote name).
    pub async fn child(&self, name: &str) -> Result<TuiNode> {
        let live = self.menu.get_child_names(false).await?;
        let dialect = self.menu.dialect();
        let wire_name = live
            .iter()
            .find(|wire| {
                wire.as_str() == name
                    || wire_name_to_func_name(wire, dialect, self.menu.tables()) == name
            })
            .ok_or_else(|| MeshlinkError::UnknownAttribute {
                path: self.menu.wire_path(),
                name: name.to_string(),
            })?;

        let child = self.menu.child_wire(wire_name);
        let grandchildren = child.get_child_names(false).await?;
        debug!(
            path = %child.wire_path(),
            children = grandchildren.len(),
            "resolved text-command child"
        );
        if grandchildren.is_empty() {
            Ok(TuiNode::Command(TuiCommand { menu: child }))
        } else {
            Ok(TuiNode::Menu(TuiMenu { menu: child }))
        }
    }

    /// Resolve a dotted chain of identifiers, e.g. `file.read_case`.
    pub async fn resolve(&self, dotted: &str) -> Result<TuiNode> {
        let mut node = TuiNode::Menu(self.clone());
        for name in dotted.split('.').filter(|s| !s.is_empty()) {
            node = match node {
                TuiNode::Menu(menu) => menu.child(name).await?,
                TuiNode::Command(command) => {
                    return Err(MeshlinkError::UnknownAttribute {
                        path: command.menu.wire_path(),
                        name: name.to_string(),
                    })
                }
            };
        }
        Ok(node)
    }

    pub async fn get_doc_string(&self) -> Result<String> {
        self.menu.get_doc_string(false).await
    }
}

impl TuiCommand {
    pub fn new(service: Arc<DatamodelService>, path: Path) -> Self {
        Self {
            menu: Menu::new(service, path),
        }
    }

    pub fn with_tables(service: Arc<DatamodelService>, path: Path, tables: Arc<NameTables>) -> Self {
        Self {
            menu: Menu::with_tables(service, path, tables),
        }
    }

    pub fn from_menu(menu: Menu) -> Self {
        Self { menu }
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub async fn get_doc_string(&self) -> Result<String> {
        self.menu.get_doc_string(false).await
    }

    /// Run the command.
    ///
    /// Queries complete inline. Commands are spawned on the runtime and the
    /// returned handle decides when to block.
    pub async fn execute(&self, args: CallArgs) -> Result<Execution> {
        if self.menu.is_query() {
            return Ok(Execution::Ready(self.menu.execute(&args).await?));
        }

        let menu = self.menu.clone();
        let path = menu.wire_path();
        debug!(path = %path, "spawning text command");
        let handle = tokio::spawn(async move { menu.execute(&args).await });
        Ok(Execution::Pending(PendingCommand { path, handle }))
    }

    /// `execute` with loose arguments
    pub async fn call(&self, positional: Vec<Value>, keywords: Map<String, Value>) -> Result<Execution> {
        let args = CallArgs::from_parts(self.menu.path(), positional, keywords)?;
        self.execute(args).await
    }
}

/// Outcome of [`TuiCommand::execute`]
#[derive(Debug)]
pub enum Execution {
    /// Query result, already available
    Ready(Value),
    /// Command still running
    Pending(PendingCommand),
}

impl Execution {
    /// Block until the result is available
    pub async fn wait(self) -> Result<Value> {
        match self {
            Execution::Ready(value) => Ok(value),
            Execution::Pending(pending) => pending.wait().await,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Execution::Pending(_))
    }
}

/// Deferred text command
#[derive(Debug)]
pub struct PendingCommand {
    path: String,
    handle: JoinHandle<Result<Value>>,
}

impl PendingCommand {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop waiting for the command.
    ///
    /// The in-flight RPC is dropped; whether the remote application stops
    /// the command is up to it.
    pub fn cancel(&self) {
        debug!(path = %self.path, "cancelling text command");
        self.handle.abort();
    }

    pub async fn wait(self) -> Result<Value> {
        self.handle.await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::MockDatamodel;
    use meshlink_connect::ErrorPolicy;
    use crate::path::Dialect;
    use meshlink_interface::Subsystem;
    use serde_json::json;

    fn root(mock: &MockDatamodel) -> TuiMenu {
        TuiMenu::root(Arc::new(DatamodelService::new(
            Arc::new(mock.clone()),
            ErrorPolicy::Propagate,
        )))
    }

    #[tokio::test]
    async fn test_dir_reflects_live_children() {
        let mock = MockDatamodel::demo(Subsystem::Tui);
        let tui = root(&mock);
        let mesh = tui.child("mesh").await.unwrap();
        let mesh = mesh.as_menu().unwrap();
        assert_eq!(mesh.dir().await.unwrap(), vec!["check", "auto_mesh"]);

        mock.add_menu("/mesh", "Mesh operations", &["check", "auto_mesh [beta]", "smooth"]);
        assert_eq!(
            mesh.dir().await.unwrap(),
            vec!["check", "auto_mesh", "smooth"]
        );
    }

    #[tokio::test]
    async fn test_child_resolution_by_shape() {
        let mock = MockDatamodel::demo(Subsystem::Tui);
        let tui = root(&mock);

        assert!(tui.child("file").await.unwrap().as_menu().is_some());
        let command = tui.resolve("mesh.auto_mesh").await.unwrap();
        assert!(command.is_command());
        assert_eq!(command.menu().wire_path(), "/mesh/auto_mesh [beta]");

        let err = tui.child("solve").await.unwrap_err();
        assert!(matches!(err, MeshlinkError::UnknownAttribute { ref name, .. } if name == "solve"));
    }

    #[tokio::test]
    async fn test_command_is_deferred_query_is_not() {
        let mock = MockDatamodel::demo(Subsystem::Tui);
        let tui = root(&mock);

        let read_case = tui.resolve("file.read_case").await.unwrap();
        let execution = read_case
            .as_command()
            .unwrap()
            .execute(CallArgs::positional([json!("mycase.cas")]))
            .await
            .unwrap();
        assert!(execution.is_pending());
        assert_eq!(execution.wait().await.unwrap(), json!("case read"));

        let zones = tui.resolve("query.zone_names").await.unwrap();
        let execution = zones
            .as_command()
            .unwrap()
            .execute(CallArgs::default())
            .await
            .unwrap();
        assert!(!execution.is_pending());
        assert_eq!(execution.wait().await.unwrap(), json!(["fluid", "solid"]));
        assert_eq!(mock.calls_to("ExecuteQuery").len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_command_reports_cancellation() {
        let mock = MockDatamodel::demo(Subsystem::Tui);
        let command = TuiCommand::new(
            root(&mock).menu().service().clone(),
            root(&mock).path().child("file").child("write_case"),
        );
        let execution = command.execute(CallArgs::default()).await.unwrap();
        let Execution::Pending(pending) = execution else {
            panic!("commands are deferred");
        };
        pending.cancel();
        match pending.wait().await {
            // the task may have finished before the abort landed
            Ok(value) => assert_eq!(value, json!("case written")),
            Err(err) => assert_eq!(err.to_string(), "Command did not complete: cancelled"),
        }
    }

    #[tokio::test]
    async fn test_configured_query_prefix_runs_inline() {
        let mock = MockDatamodel::new(Subsystem::Tui);
        mock.add_menu("", "", &["ask"]);
        mock.add_menu("/ask", "", &["version"]);
        mock.add_command("/ask/version", "", json!("1.0"));
        let service = Arc::new(DatamodelService::new(
            Arc::new(mock.clone()),
            ErrorPolicy::Propagate,
        ));
        let tables = Arc::new(NameTables::default().with_query_prefix("/ask/"));
        let tui = TuiMenu::with_tables(service, Path::root(Dialect::Tui), tables);

        let version = tui.resolve("ask.version").await.unwrap();
        let execution = version
            .as_command()
            .unwrap()
            .execute(CallArgs::default())
            .await
            .unwrap();
        assert!(!execution.is_pending());
        assert_eq!(execution.wait().await.unwrap(), json!("1.0"));
        assert_eq!(mock.calls_to("ExecuteQuery").len(), 1);
        assert!(mock.calls_to("ExecuteCommand").is_empty());
    }
}
