/*!
 * Menu: RPC facade bound to one remote path
 *
 * Every operation is one guarded datamodel call plus value conversion. Under
 * the `suppress` error policy a failed call returns the documented default
 * (`Null`, empty list, empty string, `false`).
 */

use meshlink_connect::DatamodelService;
use meshlink_interface::Subsystem;
use meshlink_proto::{
    DeleteObjectRequest, ExecuteCommandRequest, ExecuteQueryRequest, GetAttributeValueRequest,
    GetStateRequest, GetStaticInfoRequest, SetStateRequest, VariantMap,
};
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::codec::{from_wire_opt, map_to_wire, string_list, to_wire};
use crate::discovery::{self, StaticInfo};
use crate::error::{MeshlinkError, Result};
use crate::path::{default_tables, Dialect, NameTables, Path};

/// Arguments of a command or query call.
///
/// Positional and keyword arguments never mix in one call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallArgs {
    /// Packed as one list under the positional field
    Positional(Vec<Value>),
    /// One request field per keyword
    Keyword(Map<String, Value>),
}

impl Default for CallArgs {
    fn default() -> Self {
        CallArgs::Positional(Vec::new())
    }
}

impl CallArgs {
    pub fn positional(args: impl IntoIterator<Item = Value>) -> Self {
        CallArgs::Positional(args.into_iter().collect())
    }

    pub fn keyword(args: Map<String, Value>) -> Self {
        CallArgs::Keyword(args)
    }

    /// Combine loose arguments, rejecting calls that pass both kinds.
    pub fn from_parts(path: &Path, positional: Vec<Value>, keywords: Map<String, Value>) -> Result<Self> {
        match (positional.is_empty(), keywords.is_empty()) {
            (false, false) => Err(MeshlinkError::MixedArguments {
                path: path.to_string(),
            }),
            (true, false) => Ok(CallArgs::Keyword(keywords)),
            _ => Ok(CallArgs::Positional(positional)),
        }
    }

    pub fn to_wire(&self, tables: &NameTables) -> VariantMap {
        match self {
            CallArgs::Positional(args) => {
                let mut packed = Map::new();
                packed.insert(
                    tables.positional_field.to_string(),
                    Value::Array(args.clone()),
                );
                map_to_wire(&packed)
            }
            CallArgs::Keyword(args) => map_to_wire(args),
        }
    }
}

/// Path-bound facade over one remote sub-system.
///
/// Cheap to clone; clones share the service handle.
#[derive(Clone)]
pub struct Menu {
    service: Arc<DatamodelService>,
    path: Path,
    tables: Arc<NameTables>,
}

impl fmt::Debug for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Menu")
            .field("path", &self.wire_path())
            .field("subsystem", &self.service.subsystem())
            .finish()
    }
}

/// Naming dialect spoken by a sub-system
pub fn dialect_of(subsystem: Subsystem) -> Dialect {
    match subsystem {
        Subsystem::Tui => Dialect::Tui,
        Subsystem::Settings => Dialect::Settings,
    }
}

impl Menu {
    pub fn new(service: Arc<DatamodelService>, path: Path) -> Self {
        Self::with_tables(service, path, default_tables())
    }

    pub fn with_tables(service: Arc<DatamodelService>, path: Path, tables: Arc<NameTables>) -> Self {
        Self {
            service,
            path,
            tables,
        }
    }

    /// Facade for the root of the service's tree
    pub fn root(service: Arc<DatamodelService>) -> Self {
        let path = Path::root(dialect_of(service.subsystem()));
        Self::new(service, path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn wire_path(&self) -> String {
        self.path.to_wire(&self.tables)
    }

    pub fn service(&self) -> &Arc<DatamodelService> {
        &self.service
    }

    pub fn tables(&self) -> &Arc<NameTables> {
        &self.tables
    }

    pub fn dialect(&self) -> Dialect {
        self.path.dialect()
    }

    /// Same service, another path
    pub fn at(&self, path: Path) -> Self {
        Self {
            service: Arc::clone(&self.service),
            path,
            tables: Arc::clone(&self.tables),
        }
    }

    /// Child addressed by its local identifier
    pub fn child(&self, name: &str) -> Self {
        self.at(self.path.child(name))
    }

    /// Child addressed by the name the remote side reports
    pub fn child_wire(&self, wire_name: &str) -> Self {
        self.at(self.path.child_wire(wire_name, &self.tables))
    }

    /// Instance `key` of this container
    pub fn item(&self, key: &str) -> Self {
        self.at(self.path.with_key(key, &self.tables))
    }

    /// Paths under the query namespace go to `ExecuteQuery`
    pub fn is_query(&self) -> bool {
        self.wire_path().starts_with(&self.tables.query_prefix)
    }

    pub async fn get_state(&self) -> Result<Value> {
        let response = self
            .service
            .get_state(GetStateRequest {
                path: self.wire_path(),
            })
            .await?;
        Ok(from_wire_opt(response.state.as_ref()))
    }

    pub async fn set_state(&self, value: &Value) -> Result<()> {
        self.service
            .set_state(SetStateRequest {
                path: self.wire_path(),
                state: Some(to_wire(value)),
            })
            .await?;
        Ok(())
    }

    /// Run the command or query at this path and decode its result.
    pub async fn execute(&self, args: &CallArgs) -> Result<Value> {
        let path = self.wire_path();
        let args = Some(args.to_wire(&self.tables));
        let result = if self.is_query() {
            debug!(path = %path, "dispatching query");
            self.service
                .execute_query(ExecuteQueryRequest { path, args })
                .await?
                .result
        } else {
            debug!(path = %path, "dispatching command");
            self.service
                .execute_command(ExecuteCommandRequest { path, args })
                .await?
                .result
        };
        Ok(from_wire_opt(result.as_ref()))
    }

    /// `execute` with loose arguments
    pub async fn call(&self, positional: Vec<Value>, keywords: Map<String, Value>) -> Result<Value> {
        let args = CallArgs::from_parts(&self.path, positional, keywords)?;
        self.execute(&args).await
    }

    async fn attribute(&self, attribute: &str, include_unavailable: bool) -> Result<Value> {
        let response = self
            .service
            .get_attribute_value(GetAttributeValueRequest {
                path: self.wire_path(),
                attribute: attribute.to_string(),
                include_unavailable,
            })
            .await?;
        Ok(from_wire_opt(response.result.as_ref()))
    }

    /// Child menu names in remote order.
    ///
    /// `include_unavailable` also lists children that are hidden in the
    /// current live state.
    pub async fn get_child_names(&self, include_unavailable: bool) -> Result<Vec<String>> {
        let names = self
            .attribute(NameTables::CHILD_NAMES, include_unavailable)
            .await?;
        Ok(string_list(&names))
    }

    pub async fn get_doc_string(&self, include_unavailable: bool) -> Result<String> {
        let help = self
            .attribute(NameTables::HELP_STRING, include_unavailable)
            .await?;
        Ok(help.as_str().unwrap_or_default().to_string())
    }

    pub async fn is_container(&self) -> Result<bool> {
        let data_type = self.attribute(NameTables::DATA_TYPE, false).await?;
        Ok(data_type.as_str() == Some(NameTables::NAMED_OBJECT_CONTAINER))
    }

    pub async fn is_extended_tui(&self) -> Result<bool> {
        let flag = self.attribute(NameTables::IS_EXTENDED_TUI, false).await?;
        Ok(flag.as_bool().unwrap_or(false))
    }

    /// Rename the remote object. Existing paths keep the old name.
    pub async fn rename(&self, new_name: &str) -> Result<()> {
        self.set_state(&json!({ "name": new_name })).await
    }

    /// Instance names held by this container
    pub async fn get_child_object_names(&self) -> Result<Vec<String>> {
        let names = self.attribute(NameTables::OBJECT_NAMES, false).await?;
        Ok(string_list(&names))
    }

    /// Create or overwrite instance `name` of this container.
    ///
    /// An empty map is sent as `{"name": name}` so creation has a value.
    pub async fn set_item(&self, name: &str, value: &Value) -> Result<()> {
        let item = self.item(name);
        match value {
            Value::Object(map) if map.is_empty() => item.set_state(&json!({ "name": name })).await,
            other => item.set_state(other).await,
        }
    }

    /// Delete the remote object at this path
    pub async fn del_item(&self) -> Result<()> {
        self.service
            .delete_object(DeleteObjectRequest {
                path: self.wire_path(),
            })
            .await?;
        Ok(())
    }

    /// Structural description of the subtree.
    ///
    /// Asks the remote side once; when it cannot answer (or answers with
    /// nothing usable) the tree is rebuilt by walking child names.
    pub async fn get_static_info(&self) -> Result<StaticInfo> {
        let request = GetStaticInfoRequest {
            path: self.wire_path(),
        };
        match self.service.try_get_static_info(request).await {
            Ok(response) => {
                let info = from_wire_opt(response.info.as_ref());
                if !info.is_null() {
                    match StaticInfo::from_value(&info) {
                        Ok(info) => return Ok(info),
                        Err(e) => warn!(
                            path = %self.wire_path(),
                            "unusable static info, walking the tree instead: {}", e
                        ),
                    }
                }
            }
            Err(e) => debug!(
                path = %self.wire_path(),
                "static info unavailable, walking the tree: {}", e
            ),
        }
        discovery::walk(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::MockDatamodel;
    use meshlink_connect::ErrorPolicy;

    fn tui_menu(mock: &MockDatamodel, wire: &str) -> Menu {
        let service = Arc::new(DatamodelService::new(
            Arc::new(mock.clone()),
            ErrorPolicy::Suppress,
        ));
        Menu::new(service, Path::parse(wire, Dialect::Tui, &NameTables::default()))
    }

    #[test]
    fn test_positional_args_pack_under_field() {
        let tables = NameTables::default();
        let wire = CallArgs::positional([json!("mycase.cas")]).to_wire(&tables);
        let packed = crate::codec::map_from_wire(&wire);
        assert_eq!(Value::Object(packed), json!({"tui_args": ["mycase.cas"]}));
    }

    #[test]
    fn test_mixed_args_rejected() {
        let path = Path::parse("/file/read_case", Dialect::Tui, &NameTables::default());
        let mut keywords = Map::new();
        keywords.insert("file_name".to_string(), json!("a.cas"));

        let err = CallArgs::from_parts(&path, vec![json!(1)], keywords.clone()).unwrap_err();
        assert!(matches!(err, MeshlinkError::MixedArguments { ref path } if path == "/file/read_case"));

        assert_eq!(
            CallArgs::from_parts(&path, vec![], keywords.clone()).unwrap(),
            CallArgs::Keyword(keywords)
        );
        assert_eq!(
            CallArgs::from_parts(&path, vec![], Map::new()).unwrap(),
            CallArgs::Positional(vec![])
        );
    }

    #[test]
    fn test_query_prefix() {
        let mock = MockDatamodel::new(Subsystem::Tui);
        assert!(tui_menu(&mock, "/query/list_zones").is_query());
        assert!(!tui_menu(&mock, "/file/read_case").is_query());
        assert!(!tui_menu(&mock, "/queryx").is_query());
    }

    #[tokio::test]
    async fn test_child_names_and_doc() {
        let mock = MockDatamodel::new(Subsystem::Tui);
        mock.add_menu("/file", "File operations", &["read_case", "write_case"]);
        let menu = tui_menu(&mock, "/file");
        assert_eq!(
            menu.get_child_names(false).await.unwrap(),
            vec!["read_case", "write_case"]
        );
        assert_eq!(menu.get_doc_string(false).await.unwrap(), "File operations");
        assert!(!menu.is_container().await.unwrap());
    }

    #[tokio::test]
    async fn test_rename_sends_name_payload() {
        let mock = MockDatamodel::new(Subsystem::Settings);
        let service = Arc::new(DatamodelService::new(
            Arc::new(mock.clone()),
            ErrorPolicy::Suppress,
        ));
        let menu = Menu::root(service).child("boundary").item("wall");
        menu.rename("wall-2").await.unwrap();

        assert_eq!(menu.wire_path(), "/boundary:wall");
        let call = mock.calls().pop().unwrap();
        assert_eq!(call.method, "SetState");
        assert_eq!(call.path, "/boundary:wall");
        assert_eq!(call.payload, json!({"name": "wall-2"}));
    }
}
