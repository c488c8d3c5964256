use crate::driver::Driver;
use crate::errors::Error;
use ydb_apis::coordination::coordination_service_client::CoordinationServiceClient;
use ydb_apis::coordination::{SessionRequest, SessionResponse};
use ydb_gax::conn::Channel;
use ydb_gax::grpc::codec::Streaming;
use ydb_gax::grpc::Request;

/// Coordination service wrapper.
#[derive(Clone)]
pub struct Client {
    driver: Driver,
}

impl Client {
    pub(crate) fn new(driver: Driver) -> Client {
        Client { driver }
    }

    fn grpc(&self) -> Result<(CoordinationServiceClient<Channel>, u32), Error> {
        let (channel, node_id) = self.driver.channel(None)?;
        let max = self.driver.max_message_size();
        let client = CoordinationServiceClient::new(channel)
            .max_decoding_message_size(max)
            .max_encoding_message_size(max);
        Ok((client, node_id))
    }

    /// Opens one bidirectional session stream fed from `outgoing`.
    pub async fn session(
        &self,
        outgoing: async_channel::Receiver<SessionRequest>,
    ) -> Result<Streaming<SessionResponse>, Error> {
        let (mut client, node_id) = self.grpc()?;
        let mut request = Request::new(outgoing);
        *request.metadata_mut() = self.driver.call_metadata();
        let response = client.session(request).await.map_err(|status| {
            self.driver.report_transport_error(node_id, &status);
            Error::Grpc(status)
        })?;
        Ok(response.into_inner())
    }
}
