//! Integration tests for meshlink-connect
//!
//! These tests exercise the transport guard and session wiring with
//! in-process stubs. Tests against a live meshing application are ignored
//! by default.

use async_trait::async_trait;
use meshlink_connect::{ErrorPolicy, Session, SessionOptions};
use meshlink_interface::{DatamodelStub, Subsystem};
use meshlink_proto::*;
use std::sync::Arc;

/// Fails every call the way a dropped connection does
struct Unreachable(Subsystem);

#[async_trait]
impl DatamodelStub for Unreachable {
    fn subsystem(&self) -> Subsystem {
        self.0
    }

    async fn get_attribute_value(
        &self,
        _request: GetAttributeValueRequest,
    ) -> meshlink_interface::Result<GetAttributeValueResponse> {
        Err(tonic::Status::unavailable("transport is closing"))
    }

    async fn get_state(
        &self,
        _request: GetStateRequest,
    ) -> meshlink_interface::Result<GetStateResponse> {
        Err(tonic::Status::unavailable("transport is closing"))
    }

    async fn set_state(
        &self,
        _request: SetStateRequest,
    ) -> meshlink_interface::Result<SetStateResponse> {
        Err(tonic::Status::unavailable("transport is closing"))
    }

    async fn delete_object(
        &self,
        _request: DeleteObjectRequest,
    ) -> meshlink_interface::Result<DeleteObjectResponse> {
        Err(tonic::Status::unavailable("transport is closing"))
    }

    async fn execute_command(
        &self,
        _request: ExecuteCommandRequest,
    ) -> meshlink_interface::Result<ExecuteCommandResponse> {
        Err(tonic::Status::unavailable("transport is closing"))
    }

    async fn execute_query(
        &self,
        _request: ExecuteQueryRequest,
    ) -> meshlink_interface::Result<ExecuteQueryResponse> {
        Err(tonic::Status::unavailable("transport is closing"))
    }
}

fn unreachable_session(policy: ErrorPolicy) -> Session {
    Session::from_stubs(
        Arc::new(Unreachable(Subsystem::Tui)),
        Arc::new(Unreachable(Subsystem::Settings)),
        policy,
    )
}

#[tokio::test]
async fn test_session_routes_by_subsystem() {
    let session = unreachable_session(ErrorPolicy::Suppress);
    assert_eq!(session.tui().subsystem(), Subsystem::Tui);
    assert_eq!(session.settings().subsystem(), Subsystem::Settings);
    assert_eq!(
        session.service(Subsystem::Settings).subsystem(),
        Subsystem::Settings
    );
}

#[tokio::test]
async fn test_suppressed_failures_look_empty() {
    let session = unreachable_session(ErrorPolicy::Suppress);
    let svc = session.settings();

    let state = svc
        .get_state(GetStateRequest {
            path: "/setup".to_string(),
        })
        .await
        .unwrap();
    assert!(state.state.is_none());

    svc.set_state(SetStateRequest {
        path: "/setup".to_string(),
        state: None,
    })
    .await
    .unwrap();

    let command = svc
        .execute_command(ExecuteCommandRequest {
            path: "/file/read_case".to_string(),
            args: None,
        })
        .await
        .unwrap();
    assert!(command.result.is_none());

    svc.delete_object(DeleteObjectRequest {
        path: "/boundary:wall".to_string(),
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_propagated_failures_carry_status() {
    let session = unreachable_session(ErrorPolicy::Propagate);
    let err = session
        .tui()
        .execute_query(ExecuteQueryRequest {
            path: "/query/list".to_string(),
            args: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.status().unwrap().code(), tonic::Code::Unavailable);
}

// NOTE: requires a meshing application listening on localhost:50055

#[tokio::test]
#[ignore]
async fn test_live_session_child_names() -> anyhow::Result<()> {
    let session = Session::connect(&SessionOptions::new("http://localhost:50055")).await?;

    let response = session
        .tui()
        .get_attribute_value(GetAttributeValueRequest {
            path: String::new(),
            attribute: "CHILD_NAMES".to_string(),
            include_unavailable: false,
        })
        .await?;
    println!("Root children: {:?}", response.result);
    Ok(())
}
