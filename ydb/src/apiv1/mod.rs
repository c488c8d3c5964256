pub mod coordination_client;
pub mod discovery_client;
pub mod query_client;
pub mod topic_client;

use ydb_gax::grpc::metadata::MetadataMap;
use ydb_gax::grpc::Request;

pub(crate) fn client_metadata(database: &str, application: Option<&str>) -> MetadataMap {
    let mut metadata = MetadataMap::new();
    metadata.insert("x-ydb-database", database.parse().unwrap());
    if let Some(application) = application {
        metadata.insert("x-ydb-application-name", application.parse().unwrap());
    }
    metadata
}

pub(crate) fn create_request<T>(metadata: &MetadataMap, message: T) -> Request<T> {
    let mut request = Request::new(message);
    *request.metadata_mut() = metadata.clone();
    request
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_metadata() {
        let metadata = client_metadata("/local", Some("app1"));
        assert_eq!(metadata.get("x-ydb-database").unwrap(), "/local");
        assert_eq!(metadata.get("x-ydb-application-name").unwrap(), "app1");

        let metadata = client_metadata("/local", None);
        assert!(metadata.get("x-ydb-application-name").is_none());
    }
}
