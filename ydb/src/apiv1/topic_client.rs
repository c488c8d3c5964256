use crate::driver::Driver;
use crate::errors::Error;
use ydb_apis::topic::topic_service_client::TopicServiceClient;
use ydb_apis::topic::{stream_read_message, stream_write_message};
use ydb_gax::conn::Channel;
use ydb_gax::grpc::codec::Streaming;
use ydb_gax::grpc::Request;

/// Topic service wrapper.
#[derive(Clone)]
pub struct Client {
    driver: Driver,
}

impl Client {
    pub(crate) fn new(driver: Driver) -> Client {
        Client { driver }
    }

    fn grpc(&self) -> Result<(TopicServiceClient<Channel>, u32), Error> {
        let (channel, node_id) = self.driver.channel(None)?;
        let max = self.driver.max_message_size();
        let client = TopicServiceClient::new(channel)
            .max_decoding_message_size(max)
            .max_encoding_message_size(max);
        Ok((client, node_id))
    }

    /// Opens one bidirectional read stream fed from `outgoing`.
    pub async fn stream_read(
        &self,
        outgoing: async_channel::Receiver<stream_read_message::FromClient>,
    ) -> Result<Streaming<stream_read_message::FromServer>, Error> {
        let (mut client, node_id) = self.grpc()?;
        let mut request = Request::new(outgoing);
        *request.metadata_mut() = self.driver.call_metadata();
        let response = client.stream_read(request).await.map_err(|status| {
            self.driver.report_transport_error(node_id, &status);
            Error::Grpc(status)
        })?;
        Ok(response.into_inner())
    }

    /// Opens one bidirectional write stream fed from `outgoing`.
    pub async fn stream_write(
        &self,
        outgoing: async_channel::Receiver<stream_write_message::FromClient>,
    ) -> Result<Streaming<stream_write_message::FromServer>, Error> {
        let (mut client, node_id) = self.grpc()?;
        let mut request = Request::new(outgoing);
        *request.metadata_mut() = self.driver.call_metadata();
        let response = client.stream_write(request).await.map_err(|status| {
            self.driver.report_transport_error(node_id, &status);
            Error::Grpc(status)
        })?;
        Ok(response.into_inner())
    }
}
