use tokio_util::sync::CancellationToken;

use crate::apiv1::create_request;
use crate::driver::Driver;
use crate::errors::{default_retry_setting, unpack_operation, Error};
use ydb_apis::discovery::discovery_service_client::DiscoveryServiceClient;
use ydb_apis::discovery::{
    ListEndpointsRequest, ListEndpointsResult, WhoAmIRequest, WhoAmIResult,
};
use ydb_gax::conn::Channel;
use ydb_gax::retry::{invoke, RetrySetting};

/// Discovery service wrapper. A channel is resolved from the pool per RPC.
#[derive(Clone)]
pub struct Client {
    driver: Driver,
}

impl Client {
    pub(crate) fn new(driver: Driver) -> Client {
        Client { driver }
    }

    fn grpc(&self) -> Result<(DiscoveryServiceClient<Channel>, u32), Error> {
        let (channel, node_id) = self.driver.channel(None)?;
        let max = self.driver.max_message_size();
        let client = DiscoveryServiceClient::new(channel)
            .max_decoding_message_size(max)
            .max_encoding_message_size(max);
        Ok((client, node_id))
    }

    pub async fn list_endpoints(
        &self,
        cancel: Option<CancellationToken>,
        retry: Option<RetrySetting<Error>>,
    ) -> Result<ListEndpointsResult, Error> {
        let mut setting = retry.unwrap_or_else(default_retry_setting);
        setting.idempotent = true;
        let this = self.clone();
        invoke(cancel, setting, move |_| {
            let this = this.clone();
            async move {
                let (mut client, node_id) = this.grpc()?;
                let request = create_request(
                    &this.driver.call_metadata(),
                    ListEndpointsRequest {
                        database: this.driver.database().to_string(),
                        service: Vec::new(),
                    },
                );
                let response = client.list_endpoints(request).await.map_err(|status| {
                    this.driver.report_transport_error(node_id, &status);
                    Error::Grpc(status)
                })?;
                unpack_operation::<ListEndpointsResult>(response.into_inner().operation)
            }
        })
        .await
    }

    pub async fn who_am_i(
        &self,
        cancel: Option<CancellationToken>,
        retry: Option<RetrySetting<Error>>,
    ) -> Result<WhoAmIResult, Error> {
        let mut setting = retry.unwrap_or_else(default_retry_setting);
        setting.idempotent = true;
        let this = self.clone();
        invoke(cancel, setting, move |_| {
            let this = this.clone();
            async move {
                let (mut client, node_id) = this.grpc()?;
                let request = create_request(
                    &this.driver.call_metadata(),
                    WhoAmIRequest {
                        include_groups: false,
                    },
                );
                let response = client.who_am_i(request).await.map_err(|status| {
                    this.driver.report_transport_error(node_id, &status);
                    Error::Grpc(status)
                })?;
                unpack_operation::<WhoAmIResult>(response.into_inner().operation)
            }
        })
        .await
    }
}
