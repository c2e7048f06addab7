//! In-memory datamodel for tests and offline use
//!
//! Holds a tree of nodes keyed by wire path and answers every datamodel call
//! from it. Each call is recorded so tests can assert on the traffic a proxy
//! produced.

use async_trait::async_trait;
use meshlink_interface::{DatamodelStub, Result, Subsystem};
use meshlink_proto::{
    DeleteObjectRequest, DeleteObjectResponse, ExecuteCommandRequest, ExecuteCommandResponse,
    ExecuteQueryRequest, ExecuteQueryResponse, GetAttributeValueRequest,
    GetAttributeValueResponse, GetStateRequest, GetStateResponse, GetStaticInfoRequest,
    GetStaticInfoResponse, SetStateRequest, SetStateResponse,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tonic::Status;

use crate::codec::{from_wire_opt, map_from_wire, to_wire};
use crate::local::lock;
use crate::path::NameTables;

/// One node of the mock tree
#[derive(Debug, Clone, Default)]
pub struct MockNode {
    pub help: String,
    /// Children visible in the current state
    pub children: Vec<String>,
    /// Children only listed when unavailable ones are requested
    pub hidden_children: Vec<String>,
    pub state: Value,
    pub container: bool,
    pub extended_tui: bool,
    /// Returned by `ExecuteCommand` / `ExecuteQuery`
    pub result: Value,
}

/// A call as the mock received it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    /// Decoded state, arguments or attribute request; `Null` otherwise
    pub payload: Value,
}

#[derive(Debug, Default)]
struct MockTree {
    nodes: HashMap<String, MockNode>,
    calls: Vec<RecordedCall>,
    fail_all: bool,
}

/// Mock datamodel implementation for testing
///
/// # Example
///
/// ```rust
/// use meshlink::system::MockDatamodel;
/// use meshlink_interface::{DatamodelStub, Subsystem};
/// use meshlink_proto::GetStateRequest;
///
/// # tokio_test_block(async {
/// let mock = MockDatamodel::new(Subsystem::Tui);
/// mock.add_menu("/file", "File operations", &["read_case", "write_case"]);
/// mock.get_state(GetStateRequest { path: "/file".to_string() }).await.unwrap();
/// assert_eq!(mock.calls().len(), 1);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockDatamodel {
    subsystem: Subsystem,
    tree: Arc<Mutex<MockTree>>,
}

fn join(parent: &str, child: &str) -> String {
    format!("{parent}/{child}")
}

impl MockDatamodel {
    /// Create a mock holding only an empty root
    pub fn new(subsystem: Subsystem) -> Self {
        let mut tree = MockTree::default();
        tree.nodes.insert(String::new(), MockNode::default());
        Self {
            subsystem,
            tree: Arc::new(Mutex::new(tree)),
        }
    }

    /// Insert or replace a node
    pub fn add_node(&self, path: &str, node: MockNode) {
        let mut tree = lock(&self.tree);
        for child in node.children.iter().chain(&node.hidden_children) {
            tree.nodes.entry(join(path, child)).or_default();
        }
        tree.nodes.insert(path.to_string(), node);
    }

    /// Menu with the given children; children not yet present become leaves
    pub fn add_menu(&self, path: &str, help: &str, children: &[&str]) {
        let mut node = self.node(path).unwrap_or_default();
        node.help = help.to_string();
        node.children = children.iter().map(|c| c.to_string()).collect();
        self.add_node(path, node);
    }

    /// Leaf command answering with `result`
    pub fn add_command(&self, path: &str, help: &str, result: Value) {
        let mut node = self.node(path).unwrap_or_default();
        node.help = help.to_string();
        node.result = result;
        self.add_node(path, node);
    }

    /// Keyed container holding `objects`, each with state `{"name": key}`
    pub fn add_container(&self, path: &str, help: &str, objects: &[&str]) {
        let mut node = self.node(path).unwrap_or_default();
        node.help = help.to_string();
        node.container = true;
        self.add_node(path, node);
        for key in objects {
            self.add_node(
                &format!("{path}:{key}"),
                MockNode {
                    state: json!({ "name": key }),
                    ..MockNode::default()
                },
            );
        }
    }

    /// Replace the state held at `path`, creating a leaf if needed
    pub fn set_node_state(&self, path: &str, state: Value) {
        let mut tree = lock(&self.tree);
        tree.nodes.entry(path.to_string()).or_default().state = state;
    }

    pub fn set_hidden_children(&self, path: &str, hidden: &[&str]) {
        let mut node = self.node(path).unwrap_or_default();
        node.hidden_children = hidden.iter().map(|c| c.to_string()).collect();
        self.add_node(path, node);
    }

    pub fn set_extended_tui(&self, path: &str, extended: bool) {
        let mut tree = lock(&self.tree);
        tree.nodes.entry(path.to_string()).or_default().extended_tui = extended;
    }

    /// Make every subsequent call fail with `UNAVAILABLE`
    pub fn fail_all(&self, fail: bool) {
        lock(&self.tree).fail_all = fail;
    }

    pub fn node(&self, path: &str) -> Option<MockNode> {
        lock(&self.tree).nodes.get(path).cloned()
    }

    pub fn state_of(&self, path: &str) -> Option<Value> {
        self.node(path).map(|node| node.state)
    }

    pub fn contains(&self, path: &str) -> bool {
        lock(&self.tree).nodes.contains_key(path)
    }

    /// Every call received so far, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.tree).calls.clone()
    }

    /// Calls received for one RPC method
    pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
        lock(&self.tree)
            .calls
            .iter()
            .filter(|call| call.method == method)
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        lock(&self.tree).calls.clear();
    }

    /// Record a call and apply the failure switch
    fn record(&self, method: &'static str, path: &str, payload: Value) -> Result<()> {
        let mut tree = lock(&self.tree);
        tree.calls.push(RecordedCall {
            method,
            path: path.to_string(),
            payload,
        });
        if tree.fail_all {
            return Err(Status::unavailable("mock datamodel is offline"));
        }
        Ok(())
    }

    fn lookup(&self, path: &str) -> Result<MockNode> {
        self.node(path)
            .ok_or_else(|| Status::not_found(format!("no datamodel object at '{path}'")))
    }

    fn object_names(&self, path: &str) -> Vec<String> {
        let prefix = format!("{path}:");
        let tree = lock(&self.tree);
        let mut names: Vec<String> = tree
            .nodes
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .filter(|rest| !rest.contains('/'))
            .map(str::to_string)
            .collect();
        names.sort();
        names
    }

    /// Container owning a keyed path (`/boundary:wall` -> `/boundary`)
    fn owning_container(&self, path: &str) -> Option<String> {
        let (container, key) = path.rsplit_once(':')?;
        if key.contains('/') {
            return None;
        }
        self.node(container)
            .filter(|node| node.container)
            .map(|_| container.to_string())
    }

    /// Small tree used by the CLI's offline mode
    pub fn demo(subsystem: Subsystem) -> Self {
        let mock = Self::new(subsystem);
        match subsystem {
            Subsystem::Tui => {
                mock.add_menu("", "Meshing text command interface", &["file", "mesh", "query"]);
                mock.add_menu("/file", "File operations", &["read_case", "write_case"]);
                mock.add_command("/file/read_case", "Read a case file", json!("case read"));
                mock.add_command("/file/write_case", "Write a case file", json!("case written"));
                mock.add_menu("/mesh", "Mesh operations", &["check", "auto_mesh [beta]"]);
                mock.add_command("/mesh/check", "Check mesh quality", json!("mesh ok"));
                mock.add_command("/mesh/auto_mesh [beta]", "Generate a volume mesh", Value::Null);
                mock.set_hidden_children("/mesh", &["repair?"]);
                mock.add_menu("/query", "Read-only queries", &["zone_names"]);
                mock.add_command(
                    "/query/zone_names",
                    "List zone names",
                    json!(["fluid", "solid"]),
                );
            }
            Subsystem::Settings => {
                mock.add_menu("", "Settings", &["setup", "boundary"]);
                mock.add_menu("/setup", "Physical setup", &["energy?", "viscous"]);
                mock.set_node_state("/setup/energy?", json!(true));
                mock.set_node_state("/setup/viscous", json!({"model": "k-omega"}));
                mock.add_container("/boundary", "Boundary conditions", &["inlet", "wall"]);
            }
        }
        mock
    }
}

#[async_trait]
impl DatamodelStub for MockDatamodel {
    fn subsystem(&self) -> Subsystem {
        self.subsystem
    }

    async fn get_attribute_value(
        &self,
        request: GetAttributeValueRequest,
    ) -> Result<GetAttributeValueResponse> {
        self.record(
            "GetAttributeValue",
            &request.path,
            json!({
                "attribute": request.attribute,
                "include_unavailable": request.include_unavailable
            }),
        )?;
        let node = self.lookup(&request.path)?;

        let value = match request.attribute.as_str() {
            NameTables::CHILD_NAMES => {
                let mut names = node.children.clone();
                if request.include_unavailable {
                    names.extend(node.hidden_children.iter().cloned());
                }
                json!(names)
            }
            NameTables::HELP_STRING => json!(node.help),
            NameTables::DATA_TYPE if node.container => json!(NameTables::NAMED_OBJECT_CONTAINER),
            NameTables::DATA_TYPE => json!("Menu"),
            NameTables::OBJECT_NAMES => json!(self.object_names(&request.path)),
            NameTables::IS_EXTENDED_TUI => json!(node.extended_tui),
            other => {
                return Err(Status::invalid_argument(format!(
                    "unknown attribute '{other}'"
                )))
            }
        };
        Ok(GetAttributeValueResponse {
            result: Some(to_wire(&value)),
        })
    }

    async fn get_state(&self, request: GetStateRequest) -> Result<GetStateResponse> {
        self.record("GetState", &request.path, Value::Null)?;
        let node = self.lookup(&request.path)?;
        Ok(GetStateResponse {
            state: Some(to_wire(&node.state)),
        })
    }

    async fn set_state(&self, request: SetStateRequest) -> Result<SetStateResponse> {
        let state = from_wire_opt(request.state.as_ref());
        self.record("SetState", &request.path, state.clone())?;

        if !self.contains(&request.path) && self.owning_container(&request.path).is_none() {
            return Err(Status::not_found(format!(
                "no datamodel object at '{}'",
                request.path
            )));
        }

        let mut tree = lock(&self.tree);
        let node = tree.nodes.entry(request.path).or_default();
        match (&mut node.state, state) {
            (Value::Object(current), Value::Object(update)) => current.extend(update),
            (slot, state) => *slot = state,
        }
        Ok(SetStateResponse {})
    }

    async fn delete_object(&self, request: DeleteObjectRequest) -> Result<DeleteObjectResponse> {
        self.record("DeleteObject", &request.path, Value::Null)?;
        let mut tree = lock(&self.tree);
        if tree.nodes.remove(&request.path).is_none() {
            return Err(Status::not_found(format!(
                "no datamodel object at '{}'",
                request.path
            )));
        }
        let nested = format!("{}/", request.path);
        tree.nodes.retain(|path, _| !path.starts_with(&nested));
        Ok(DeleteObjectResponse {})
    }

    async fn execute_command(
        &self,
        request: ExecuteCommandRequest,
    ) -> Result<ExecuteCommandResponse> {
        let args = request
            .args
            .as_ref()
            .map(|args| Value::Object(map_from_wire(args)))
            .unwrap_or(Value::Null);
        self.record("ExecuteCommand", &request.path, args)?;
        let node = self.lookup(&request.path)?;
        Ok(ExecuteCommandResponse {
            result: Some(to_wire(&node.result)),
        })
    }

    async fn execute_query(&self, request: ExecuteQueryRequest) -> Result<ExecuteQueryResponse> {
        let args = request
            .args
            .as_ref()
            .map(|args| Value::Object(map_from_wire(args)))
            .unwrap_or(Value::Null);
        self.record("ExecuteQuery", &request.path, args)?;
        let node = self.lookup(&request.path)?;
        Ok(ExecuteQueryResponse {
            result: Some(to_wire(&node.result)),
        })
    }

    async fn get_static_info(&self, request: GetStaticInfoRequest) -> Result<GetStaticInfoResponse> {
        self.record("GetStaticInfo", &request.path, Value::Null)?;
        Err(Status::unimplemented("static info is not served by the mock"))
    }
}
