//! DatamodelService: transport-error guard around a datamodel stub
//!
//! Every call goes through [`DatamodelService::guard`]. A transport failure is
//! always logged; what happens next depends on the [`ErrorPolicy`]:
//!
//! - `Suppress`: the caller receives the default (empty) response, so a failed
//!   call looks exactly like a legitimately empty answer.
//! - `Propagate`: the caller receives `ConnectError::Status`.

use meshlink_interface::{DatamodelStub, Subsystem};
use meshlink_proto::{
    DeleteObjectRequest, DeleteObjectResponse, ExecuteCommandRequest, ExecuteCommandResponse,
    ExecuteQueryRequest, ExecuteQueryResponse, GetAttributeValueRequest,
    GetAttributeValueResponse, GetStateRequest, GetStateResponse, GetStaticInfoRequest,
    GetStaticInfoResponse, SetStateRequest, SetStateResponse,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error};

use crate::error::ConnectError;

/// What to do with a transport error once it has been logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Log and hand back an empty response
    #[default]
    Suppress,

    /// Log and return the error to the caller
    Propagate,
}

/// Guarded access to one remote sub-system, shared by every proxy in a tree.
#[derive(Clone)]
pub struct DatamodelService {
    stub: Arc<dyn DatamodelStub>,
    policy: ErrorPolicy,
}

impl std::fmt::Debug for DatamodelService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatamodelService")
            .field("subsystem", &self.stub.subsystem())
            .field("policy", &self.policy)
            .finish()
    }
}

impl DatamodelService {
    pub fn new(stub: Arc<dyn DatamodelStub>, policy: ErrorPolicy) -> Self {
        Self { stub, policy }
    }

    pub fn subsystem(&self) -> Subsystem {
        self.stub.subsystem()
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Same stub, different policy
    pub fn with_policy(&self, policy: ErrorPolicy) -> Self {
        Self {
            stub: Arc::clone(&self.stub),
            policy,
        }
    }

    async fn guard<T, F>(&self, method: &'static str, path: &str, call: F) -> Result<T, ConnectError>
    where
        T: Default,
        F: Future<Output = Result<T, tonic::Status>>,
    {
        match call.await {
            Ok(response) => Ok(response),
            Err(status) => {
                error!(
                    method,
                    path,
                    code = ?status.code(),
                    service = self.stub.subsystem().service_name(),
                    "datamodel call failed: {}",
                    status.message()
                );
                match self.policy {
                    ErrorPolicy::Suppress => Ok(T::default()),
                    ErrorPolicy::Propagate => Err(ConnectError::Status(status)),
                }
            }
        }
    }

    pub async fn get_attribute_value(
        &self,
        request: GetAttributeValueRequest,
    ) -> Result<GetAttributeValueResponse, ConnectError> {
        let path = request.path.clone();
        self.guard(
            "GetAttributeValue",
            &path,
            self.stub.get_attribute_value(request),
        )
        .await
    }

    pub async fn get_state(&self, request: GetStateRequest) -> Result<GetStateResponse, ConnectError> {
        let path = request.path.clone();
        self.guard("GetState", &path, self.stub.get_state(request))
            .await
    }

    pub async fn set_state(&self, request: SetStateRequest) -> Result<SetStateResponse, ConnectError> {
        let path = request.path.clone();
        self.guard("SetState", &path, self.stub.set_state(request))
            .await
    }

    pub async fn delete_object(
        &self,
        request: DeleteObjectRequest,
    ) -> Result<DeleteObjectResponse, ConnectError> {
        let path = request.path.clone();
        self.guard("DeleteObject", &path, self.stub.delete_object(request))
            .await
    }

    pub async fn execute_command(
        &self,
        request: ExecuteCommandRequest,
    ) -> Result<ExecuteCommandResponse, ConnectError> {
        let path = request.path.clone();
        self.guard("ExecuteCommand", &path, self.stub.execute_command(request))
            .await
    }

    pub async fn execute_query(
        &self,
        request: ExecuteQueryRequest,
    ) -> Result<ExecuteQueryResponse, ConnectError> {
        let path = request.path.clone();
        self.guard("ExecuteQuery", &path, self.stub.execute_query(request))
            .await
    }

    /// Single attempt at `GetStaticInfo`.
    ///
    /// Not guarded: callers need to see the failure to fall back to a
    /// discovery walk, whatever the policy says.
    pub async fn try_get_static_info(
        &self,
        request: GetStaticInfoRequest,
    ) -> Result<GetStaticInfoResponse, ConnectError> {
        let path = request.path.clone();
        self.stub.get_static_info(request).await.map_err(|status| {
            debug!(
                path = %path,
                code = ?status.code(),
                "GetStaticInfo unavailable: {}",
                status.message()
            );
            ConnectError::Status(status)
        })
    }
}
