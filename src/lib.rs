/*!
 * Meshlink - client binding for a remote meshing application's datamodel
 *
 * Exposes the application's command and settings trees as navigable local
 * objects over gRPC:
 * - Value conversion between JSON values and the wire `Variant`
 * - Path model with per-dialect name mapping
 * - `Menu` facade: one guarded RPC per operation
 * - Text-command menus resolved at runtime, with deferred commands
 * - Proxy trees synthesized from declarative schemas
 * - Client-held cached properties with validation and invalidation
 * - Discovery walk producing a structural description of a subtree
 */

pub mod codec;
pub mod config;
pub mod discovery;
pub mod error;
pub mod local;
pub mod logging;
pub mod menu;
pub mod path;
pub mod proxy;
pub mod system;
pub mod tui;

// Re-export commonly used types
pub use config::{ClientConfig, LogLevel};
pub use discovery::StaticInfo;
pub use error::{MeshlinkError, Result};
pub use menu::{CallArgs, Menu};
pub use meshlink_connect::{DatamodelService, ErrorPolicy, Session, SessionOptions};
pub use meshlink_interface::Subsystem;
pub use path::{Dialect, NameTables, Path};
pub use proxy::{build_proxy, build_proxy_with_tables, NodeSchema, ProxyNode, ResolvedChild};
pub use tui::{Execution, PendingCommand, TuiCommand, TuiMenu, TuiNode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Open a session to the application described by `config`.
pub async fn connect(config: &ClientConfig) -> Result<Session> {
    Ok(Session::connect(&config.session_options()).await?)
}
