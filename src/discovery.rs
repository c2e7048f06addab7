/*!
 * Discovery: structural description of a remote subtree
 *
 * The description has the shape `{help, menus: {name: subtree}, commands:
 * {name: subtree}}` and is what leaf-class generation consumes. When the
 * remote side cannot produce it directly, [`walk`] rebuilds it from child
 * names and help strings.
 */

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::Result;
use crate::menu::Menu;

/// One node of the discovery tree. Keys are remote (wire) names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticInfo {
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub menus: BTreeMap<String, StaticInfo>,
    #[serde(default)]
    pub commands: BTreeMap<String, StaticInfo>,
    /// Named-object container
    #[serde(default, skip_serializing_if = "is_false")]
    pub container: bool,
    /// Layout shared by a container's objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Box<StaticInfo>>,
    /// Children are generated by the remote side at runtime
    #[serde(default, skip_serializing_if = "is_false")]
    pub extended_tui: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl StaticInfo {
    pub fn from_value(value: &Value) -> serde_json::Result<Self> {
        StaticInfo::deserialize(value)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// No submenus and no commands
    pub fn is_leaf(&self) -> bool {
        self.menus.is_empty() && self.commands.is_empty()
    }

    /// Leaf that is neither a container nor a runtime-populated menu
    pub fn is_command(&self) -> bool {
        self.is_leaf() && !self.container && !self.extended_tui
    }

    /// Number of nodes in the tree, this one included
    pub fn node_count(&self) -> usize {
        1 + self
            .menus
            .values()
            .chain(self.commands.values())
            .map(StaticInfo::node_count)
            .sum::<usize>()
    }
}

/// Rebuild the description of `menu`'s subtree by walking it.
///
/// Every child known to the static metadata is visited, available or not. A
/// child with no children of its own is recorded as a command unless the
/// remote side reports it as a container or an extended text menu. A
/// container's item layout is taken from its first existing object.
pub async fn walk(menu: &Menu) -> Result<StaticInfo> {
    walk_node(menu.clone()).await
}

fn walk_node(menu: Menu) -> BoxFuture<'static, Result<StaticInfo>> {
    Box::pin(async move {
        let mut info = StaticInfo {
            help: menu.get_doc_string(true).await?,
            container: menu.is_container().await?,
            extended_tui: menu.is_extended_tui().await?,
            ..StaticInfo::default()
        };

        if info.container {
            let objects = menu.get_child_object_names().await?;
            let item = match objects.first() {
                Some(key) => walk_node(menu.item(key)).await?,
                None => StaticInfo::default(),
            };
            info.item = Some(Box::new(item));
        }

        for name in menu.get_child_names(true).await? {
            let child = walk_node(menu.child_wire(&name)).await?;
            if child.is_command() {
                info.commands.insert(name, child);
            } else {
                info.menus.insert(name, child);
            }
        }

        debug!(
            path = %menu.wire_path(),
            menus = info.menus.len(),
            commands = info.commands.len(),
            "walked"
        );
        Ok(info)
    })
}
