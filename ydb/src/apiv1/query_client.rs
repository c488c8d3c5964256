use crate::apiv1::create_request;
use crate::driver::Driver;
use crate::errors::{check_status, Error};
use ydb_apis::query::query_service_client::QueryServiceClient;
use ydb_apis::query::{
    AttachSessionRequest, BeginTransactionRequest, CommitTransactionRequest,
    CreateSessionRequest, CreateSessionResponse, DeleteSessionRequest, ExecuteQueryRequest,
    ExecuteQueryResponsePart, RollbackTransactionRequest, SessionState, TransactionMeta,
    TransactionSettings,
};
use ydb_gax::conn::Channel;
use ydb_gax::grpc::codec::Streaming;

/// Query service wrapper. A channel is resolved from the pool per RPC,
/// pinned to the session's node where one is known.
#[derive(Clone)]
pub struct Client {
    driver: Driver,
}

impl Client {
    pub(crate) fn new(driver: Driver) -> Client {
        Client { driver }
    }

    fn grpc(
        &self,
        prefer_node_id: Option<u32>,
    ) -> Result<(QueryServiceClient<Channel>, u32), Error> {
        let (channel, node_id) = self.driver.channel(prefer_node_id)?;
        let max = self.driver.max_message_size();
        let client = QueryServiceClient::new(channel)
            .max_decoding_message_size(max)
            .max_encoding_message_size(max);
        Ok((client, node_id))
    }

    fn transport_error(&self, node_id: u32, status: ydb_gax::grpc::Status) -> Error {
        self.driver.report_transport_error(node_id, &status);
        Error::Grpc(status)
    }

    pub async fn create_session(&self) -> Result<CreateSessionResponse, Error> {
        let (mut client, node_id) = self.grpc(None)?;
        let request = create_request(&self.driver.call_metadata(), CreateSessionRequest {});
        let response = client
            .create_session(request)
            .await
            .map_err(|status| self.transport_error(node_id, status))?
            .into_inner();
        check_status(response.status, &response.issues)?;
        Ok(response)
    }

    pub async fn delete_session(
        &self,
        session_id: &str,
        prefer_node_id: Option<u32>,
    ) -> Result<(), Error> {
        let (mut client, node_id) = self.grpc(prefer_node_id)?;
        let request = create_request(
            &self.driver.call_metadata(),
            DeleteSessionRequest {
                session_id: session_id.to_string(),
            },
        );
        let response = client
            .delete_session(request)
            .await
            .map_err(|status| self.transport_error(node_id, status))?
            .into_inner();
        check_status(response.status, &response.issues)
    }

    /// Opens the keepalive stream identified with the session. Pinned to the
    /// session's node; the first frame is the attach acknowledgement.
    pub async fn attach_session(
        &self,
        session_id: &str,
        prefer_node_id: Option<u32>,
    ) -> Result<Streaming<SessionState>, Error> {
        let (mut client, node_id) = self.grpc(prefer_node_id)?;
        let request = create_request(
            &self.driver.call_metadata(),
            AttachSessionRequest {
                session_id: session_id.to_string(),
            },
        );
        let response = client
            .attach_session(request)
            .await
            .map_err(|status| self.transport_error(node_id, status))?;
        Ok(response.into_inner())
    }

    pub async fn begin_transaction(
        &self,
        session_id: &str,
        prefer_node_id: Option<u32>,
        settings: TransactionSettings,
    ) -> Result<TransactionMeta, Error> {
        let (mut client, node_id) = self.grpc(prefer_node_id)?;
        let request = create_request(
            &self.driver.call_metadata(),
            BeginTransactionRequest {
                session_id: session_id.to_string(),
                tx_settings: Some(settings),
            },
        );
        let response = client
            .begin_transaction(request)
            .await
            .map_err(|status| self.transport_error(node_id, status))?
            .into_inner();
        check_status(response.status, &response.issues)?;
        response
            .tx_meta
            .ok_or_else(|| crate::errors::ClientError::MalformedResult("missing tx meta".to_string()).into())
    }

    pub async fn commit_transaction(
        &self,
        session_id: &str,
        prefer_node_id: Option<u32>,
        tx_id: &str,
    ) -> Result<(), Error> {
        let (mut client, node_id) = self.grpc(prefer_node_id)?;
        let request = create_request(
            &self.driver.call_metadata(),
            CommitTransactionRequest {
                session_id: session_id.to_string(),
                tx_id: tx_id.to_string(),
            },
        );
        let response = client
            .commit_transaction(request)
            .await
            .map_err(|status| self.transport_error(node_id, status))?
            .into_inner();
        check_status(response.status, &response.issues)
    }

    pub async fn rollback_transaction(
        &self,
        session_id: &str,
        prefer_node_id: Option<u32>,
        tx_id: &str,
    ) -> Result<(), Error> {
        let (mut client, node_id) = self.grpc(prefer_node_id)?;
        let request = create_request(
            &self.driver.call_metadata(),
            RollbackTransactionRequest {
                session_id: session_id.to_string(),
                tx_id: tx_id.to_string(),
            },
        );
        let response = client
            .rollback_transaction(request)
            .await
            .map_err(|status| self.transport_error(node_id, status))?
            .into_inner();
        check_status(response.status, &response.issues)
    }

    pub async fn execute_query(
        &self,
        request: ExecuteQueryRequest,
        prefer_node_id: Option<u32>,
    ) -> Result<Streaming<ExecuteQueryResponsePart>, Error> {
        let (mut client, node_id) = self.grpc(prefer_node_id)?;
        let request = create_request(&self.driver.call_metadata(), request);
        let response = client
            .execute_query(request)
            .await
            .map_err(|status| self.transport_error(node_id, status))?;
        Ok(response.into_inner())
    }
}
