//! Meshlink Interface: transport abstraction for the remote datamodel
//!
//! This crate defines the `DatamodelStub` trait, the seam between the proxy
//! layer and whatever actually carries datamodel calls to the meshing
//! application.
//!
//! # Architecture
//!
//! Every method maps 1:1 onto one RPC of the datamodel service:
//!
//! 1. **Attributes**: `GetAttributeValue` (child names, help strings, data types)
//! 2. **State**: `GetState`, `SetState`, `DeleteObject`
//! 3. **Execution**: `ExecuteCommand`, `ExecuteQuery`
//! 4. **Metadata**: `GetStaticInfo`
//!
//! Implementations:
//! - **GrpcStub** (`meshlink-connect`): the real client over a tonic channel
//! - **MockDatamodel** (`meshlink`): an in-memory tree for tests and demos
//!
//! # Example
//!
//! ```rust,no_run
//! use meshlink_interface::DatamodelStub;
//! use meshlink_proto::GetAttributeValueRequest;
//!
//! async fn has_children<S: DatamodelStub>(stub: &S) -> Result<bool, tonic::Status> {
//!     let response = stub
//!         .get_attribute_value(GetAttributeValueRequest {
//!             path: "/file".to_string(),
//!             attribute: "CHILD_NAMES".to_string(),
//!             include_unavailable: false,
//!         })
//!         .await?;
//!     Ok(response.result.is_some())
//! }
//! ```

use async_trait::async_trait;
use meshlink_proto::{
    DeleteObjectRequest, DeleteObjectResponse, ExecuteCommandRequest, ExecuteCommandResponse,
    ExecuteQueryRequest, ExecuteQueryResponse, GetAttributeValueRequest,
    GetAttributeValueResponse, GetStateRequest, GetStateResponse, GetStaticInfoRequest,
    GetStaticInfoResponse, SetStateRequest, SetStateResponse,
};

pub use meshlink_proto::data_model_client::Subsystem;

/// Transport-level failure reported by a stub.
///
/// This is `tonic::Status` for every implementation, so a test double can
/// fail exactly the way a dropped connection does.
pub type TransportError = tonic::Status;

pub type Result<T> = std::result::Result<T, TransportError>;

/// Raw, unguarded access to one datamodel sub-system.
///
/// Errors returned here are transport errors; deciding whether to log and
/// swallow them or surface them is the job of `DatamodelService` in
/// `meshlink-connect`, never of the stub.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync + 'static`: one stub is shared by
/// every proxy descending from the same session.
#[async_trait]
pub trait DatamodelStub: Send + Sync + 'static {
    /// Which sub-system this stub talks to
    fn subsystem(&self) -> Subsystem;

    // ═══════════════════════════════════════════════════════════════════════
    // 1. Attributes
    // ═══════════════════════════════════════════════════════════════════════

    /// Read one attribute (`CHILD_NAMES`, `HELP_STRING`, `DATA_TYPE`, ...)
    /// of the node at `request.path`.
    async fn get_attribute_value(
        &self,
        request: GetAttributeValueRequest,
    ) -> Result<GetAttributeValueResponse>;

    // ═══════════════════════════════════════════════════════════════════════
    // 2. State
    // ═══════════════════════════════════════════════════════════════════════

    async fn get_state(&self, request: GetStateRequest) -> Result<GetStateResponse>;

    async fn set_state(&self, request: SetStateRequest) -> Result<SetStateResponse>;

    /// Delete the named object at `request.path` on the remote side.
    async fn delete_object(&self, request: DeleteObjectRequest) -> Result<DeleteObjectResponse>;

    // ═══════════════════════════════════════════════════════════════════════
    // 3. Execution
    // ═══════════════════════════════════════════════════════════════════════

    async fn execute_command(
        &self,
        request: ExecuteCommandRequest,
    ) -> Result<ExecuteCommandResponse>;

    async fn execute_query(&self, request: ExecuteQueryRequest) -> Result<ExecuteQueryResponse>;

    // ═══════════════════════════════════════════════════════════════════════
    // 4. Metadata
    // ═══════════════════════════════════════════════════════════════════════

    /// Fetch the server's static description of the tree below `request.path`.
    ///
    /// Servers that predate this RPC answer `Unimplemented`; callers fall back
    /// to a discovery walk.
    async fn get_static_info(
        &self,
        request: GetStaticInfoRequest,
    ) -> Result<GetStaticInfoResponse> {
        Err(tonic::Status::unimplemented(format!(
            "GetStaticInfo not available for {}",
            request.path
        )))
    }
}
