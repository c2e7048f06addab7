//! GrpcStub: DatamodelStub implementation over a tonic channel

use async_trait::async_trait;
use meshlink_interface::{DatamodelStub, Result, Subsystem};
use meshlink_proto::data_model_client::DataModelClient;
use meshlink_proto::{
    DeleteObjectRequest, DeleteObjectResponse, ExecuteCommandRequest, ExecuteCommandResponse,
    ExecuteQueryRequest, ExecuteQueryResponse, GetAttributeValueRequest,
    GetAttributeValueResponse, GetStateRequest, GetStateResponse, GetStaticInfoRequest,
    GetStaticInfoResponse, SetStateRequest, SetStateResponse,
};
use tonic::service::interceptor::InterceptedService;
use tonic::transport::Channel;
use tracing::debug;

use crate::interceptor::TraceInterceptor;

type Client = DataModelClient<InterceptedService<Channel, TraceInterceptor>>;

/// The real datamodel stub: forwards each call to one remote sub-system.
///
/// This struct is cheaply cloneable (internally uses Arc via tonic's Channel).
///
/// # Example
///
/// ```rust,no_run
/// use meshlink_connect::{GrpcStub, TraceInterceptor};
/// use meshlink_interface::{DatamodelStub, Subsystem};
/// use meshlink_proto::GetStateRequest;
/// use tonic::transport::Channel;
///
/// # async fn example() -> anyhow::Result<()> {
/// let channel = Channel::from_static("http://127.0.0.1:50055").connect().await?;
/// let interceptor = TraceInterceptor::new(Subsystem::Settings, None)?;
/// let stub = GrpcStub::new(channel, Subsystem::Settings, interceptor);
///
/// let response = stub
///     .get_state(GetStateRequest { path: "/setup/models".to_string() })
///     .await?;
/// println!("{:?}", response.state);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GrpcStub {
    /// The gRPC client (cheap to clone due to Arc internally)
    client: Client,
}

impl GrpcStub {
    /// Create a stub on an established channel.
    pub fn new(channel: Channel, subsystem: Subsystem, interceptor: TraceInterceptor) -> Self {
        let client = DataModelClient::new(
            InterceptedService::new(channel, interceptor),
            subsystem,
        );
        Self { client }
    }
}

#[async_trait]
impl DatamodelStub for GrpcStub {
    fn subsystem(&self) -> Subsystem {
        self.client.subsystem()
    }

    async fn get_attribute_value(
        &self,
        request: GetAttributeValueRequest,
    ) -> Result<GetAttributeValueResponse> {
        debug!(
            "GetAttributeValue {} [{}]",
            request.path, request.attribute
        );
        let response = self.client.clone().get_attribute_value(request).await?;
        Ok(response.into_inner())
    }

    async fn get_state(&self, request: GetStateRequest) -> Result<GetStateResponse> {
        debug!("GetState {}", request.path);
        let response = self.client.clone().get_state(request).await?;
        Ok(response.into_inner())
    }

    async fn set_state(&self, request: SetStateRequest) -> Result<SetStateResponse> {
        debug!("SetState {}", request.path);
        let response = self.client.clone().set_state(request).await?;
        Ok(response.into_inner())
    }

    async fn delete_object(&self, request: DeleteObjectRequest) -> Result<DeleteObjectResponse> {
        debug!("DeleteObject {}", request.path);
        let response = self.client.clone().delete_object(request).await?;
        Ok(response.into_inner())
    }

    async fn execute_command(
        &self,
        request: ExecuteCommandRequest,
    ) -> Result<ExecuteCommandResponse> {
        debug!("ExecuteCommand {}", request.path);
        let response = self.client.clone().execute_command(request).await?;
        Ok(response.into_inner())
    }

    async fn execute_query(&self, request: ExecuteQueryRequest) -> Result<ExecuteQueryResponse> {
        debug!("ExecuteQuery {}", request.path);
        let response = self.client.clone().execute_query(request).await?;
        Ok(response.into_inner())
    }

    async fn get_static_info(
        &self,
        request: GetStaticInfoRequest,
    ) -> Result<GetStaticInfoResponse> {
        debug!("GetStaticInfo {}", request.path);
        let response = self.client.clone().get_static_info(request).await?;
        Ok(response.into_inner())
    }
}
