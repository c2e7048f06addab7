// Layout matches prost-build / tonic-prost-build output for proto/meshlink/datamodel/v1/datamodel.proto.
/// Generic tagged-union value carried by every state, argument and result.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Variant {
    #[prost(oneof = "variant::Kind", tags = "1, 2, 3, 4, 5, 6")]
    pub kind: ::core::option::Option<variant::Kind>,
}
/// Nested message and enum types in `Variant`.
pub mod variant {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Kind {
        #[prost(bool, tag = "1")]
        BoolState(bool),
        #[prost(int64, tag = "2")]
        Int64State(i64),
        #[prost(double, tag = "3")]
        DoubleState(f64),
        #[prost(string, tag = "4")]
        StringState(::prost::alloc::string::String),
        #[prost(message, tag = "5")]
        VariantVectorState(super::VariantVector),
        #[prost(message, tag = "6")]
        VariantMapState(super::VariantMap),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VariantVector {
    #[prost(message, repeated, tag = "1")]
    pub item: ::prost::alloc::vec::Vec<Variant>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VariantMap {
    #[prost(map = "string, message", tag = "1")]
    pub item: ::std::collections::HashMap<::prost::alloc::string::String, Variant>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetAttributeValueRequest {
    #[prost(string, tag = "1")]
    pub path: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub attribute: ::prost::alloc::string::String,
    #[prost(bool, tag = "3")]
    pub include_unavailable: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetAttributeValueResponse {
    #[prost(message, optional, tag = "1")]
    pub result: ::core::option::Option<Variant>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetStateRequest {
    #[prost(string, tag = "1")]
    pub path: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetStateResponse {
    #[prost(message, optional, tag = "1")]
    pub state: ::core::option::Option<Variant>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetStateRequest {
    #[prost(string, tag = "1")]
    pub path: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub state: ::core::option::Option<Variant>,
}
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct SetStateResponse {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteCommandRequest {
    #[prost(string, tag = "1")]
    pub path: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub args: ::core::option::Option<VariantMap>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteCommandResponse {
    #[prost(message, optional, tag = "1")]
    pub result: ::core::option::Option<Variant>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteQueryRequest {
    #[prost(string, tag = "1")]
    pub path: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub args: ::core::option::Option<VariantMap>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteQueryResponse {
    #[prost(message, optional, tag = "1")]
    pub result: ::core::option::Option<Variant>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetStaticInfoRequest {
    #[prost(string, tag = "1")]
    pub path: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetStaticInfoResponse {
    #[prost(message, optional, tag = "1")]
    pub info: ::core::option::Option<Variant>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteObjectRequest {
    #[prost(string, tag = "1")]
    pub path: ::prost::alloc::string::String,
}
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct DeleteObjectResponse {}
/// Generated client implementations.
pub mod data_model_client {
    #![allow(
        unused_variables,
        dead_code,
        missing_docs,
        clippy::wildcard_imports,
        clippy::let_unit_value,
    )]
    use tonic::codegen::*;
    use tonic::codegen::http::Uri;

    /// Remote sub-system a client addresses. Both expose the same methods.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Subsystem {
        /// Text-command menu tree (`meshlink.datamodel.v1.TuiDataModel`)
        Tui,
        /// Settings / named-object tree (`meshlink.datamodel.v1.SettingsDataModel`)
        Settings,
    }

    impl Subsystem {
        /// Fully qualified gRPC service name.
        pub fn service_name(&self) -> &'static str {
            match self {
                Subsystem::Tui => "meshlink.datamodel.v1.TuiDataModel",
                Subsystem::Settings => "meshlink.datamodel.v1.SettingsDataModel",
            }
        }
    }

    /// Client for either datamodel service.
    #[derive(Debug, Clone)]
    pub struct DataModelClient<T> {
        inner: tonic::client::Grpc<T>,
        subsystem: Subsystem,
    }
    impl DataModelClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(
            dst: D,
            subsystem: Subsystem,
        ) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn, subsystem))
        }
    }
    impl<T> DataModelClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::Body>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
    {
        pub fn new(inner: T, subsystem: Subsystem) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner, subsystem }
        }
        pub fn with_origin(inner: T, origin: Uri, subsystem: Subsystem) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner, subsystem }
        }
        pub fn subsystem(&self) -> Subsystem {
            self.subsystem
        }
        /// Limits the maximum size of a decoded message.
        #[must_use]
        pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_decoding_message_size(limit);
            self
        }
        /// Limits the maximum size of an encoded message.
        #[must_use]
        pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_encoding_message_size(limit);
            self
        }
        async fn unary<M1, M2>(
            &mut self,
            method: &'static str,
            request: impl tonic::IntoRequest<M1>,
        ) -> std::result::Result<tonic::Response<M2>, tonic::Status>
        where
            M1: prost::Message + 'static,
            M2: prost::Message + Default + 'static,
        {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::unknown(
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic_prost::ProstCodec::default();
            let service = self.subsystem.service_name();
            let path = http::uri::PathAndQuery::try_from(format!("/{service}/{method}"))
                .map_err(|e| tonic::Status::internal(format!("Invalid method path: {e}")))?;
            let mut req = request.into_request();
            req.extensions_mut().insert(tonic::GrpcMethod::new(service, method));
            self.inner.unary(req, path, codec).await
        }
        pub async fn get_attribute_value(
            &mut self,
            request: impl tonic::IntoRequest<super::GetAttributeValueRequest>,
        ) -> std::result::Result<
            tonic::Response<super::GetAttributeValueResponse>,
            tonic::Status,
        > {
            self.unary("GetAttributeValue", request).await
        }
        pub async fn get_state(
            &mut self,
            request: impl tonic::IntoRequest<super::GetStateRequest>,
        ) -> std::result::Result<tonic::Response<super::GetStateResponse>, tonic::Status> {
            self.unary("GetState", request).await
        }
        pub async fn set_state(
            &mut self,
            request: impl tonic::IntoRequest<super::SetStateRequest>,
        ) -> std::result::Result<tonic::Response<super::SetStateResponse>, tonic::Status> {
            self.unary("SetState", request).await
        }
        pub async fn execute_command(
            &mut self,
            request: impl tonic::IntoRequest<super::ExecuteCommandRequest>,
        ) -> std::result::Result<
            tonic::Response<super::ExecuteCommandResponse>,
            tonic::Status,
        > {
            self.unary("ExecuteCommand", request).await
        }
        pub async fn execute_query(
            &mut self,
            request: impl tonic::IntoRequest<super::ExecuteQueryRequest>,
        ) -> std::result::Result<
            tonic::Response<super::ExecuteQueryResponse>,
            tonic::Status,
        > {
            self.unary("ExecuteQuery", request).await
        }
        pub async fn get_static_info(
            &mut self,
            request: impl tonic::IntoRequest<super::GetStaticInfoRequest>,
        ) -> std::result::Result<
            tonic::Response<super::GetStaticInfoResponse>,
            tonic::Status,
        > {
            self.unary("GetStaticInfo", request).await
        }
        pub async fn delete_object(
            &mut self,
            request: impl tonic::IntoRequest<super::DeleteObjectRequest>,
        ) -> std::result::Result<
            tonic::Response<super::DeleteObjectResponse>,
            tonic::Status,
        > {
            self.unary("DeleteObject", request).await
        }
    }
}
