//! RPC Method Handlers
//!
//! Thin adapters from JSON-RPC params to `QueueService` calls.

use crate::error::to_rpc_error;
use crate::types::{
    AddConsumerRequest, AddConsumerResponse, ConsumerRequest, CreateStoreRequest,
    GetStoreRequest, ListConsumersResponse, ListStoresResponse,
    PositionResponse, RemoveConsumerResponse, RemoveStoreResponse, StoreIdRequest,
    ValidateConsumerRequest,
};
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;
use waitline_core::application::QueueService;
use waitline_core::domain::Store;

/// RPC Handler with injected service
pub struct RpcHandler {
    service: Arc<QueueService>,
}

impl RpcHandler {
    pub fn new(service: Arc<QueueService>) -> Self {
        Self { service }
    }

    /// store.create.v1
    pub async fn create_store(&self, params: CreateStoreRequest) -> Result<Store, ErrorObjectOwned> {
        self.service
            .create(&params.name)
            .await
            .map_err(to_rpc_error)
    }

    /// store.remove.v1
    pub async fn remove_store(
        &self,
        params: StoreIdRequest,
    ) -> Result<RemoveStoreResponse, ErrorObjectOwned> {
        self.service
            .remove_store(&params.store_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(RemoveStoreResponse {
            store_id: params.store_id,
            removed: true,
        })
    }

    /// store.list.v1
    pub async fn list_stores(&self) -> Result<ListStoresResponse, ErrorObjectOwned> {
        let names = self.service.get_all_stores().await.map_err(to_rpc_error)?;
        Ok(ListStoresResponse { names })
    }

    /// store.get.v1
    pub async fn get_store(&self, params: GetStoreRequest) -> Result<Store, ErrorObjectOwned> {
        self.service
            .get_store(&params.name)
            .await
            .map_err(to_rpc_error)
    }

    /// store.get_by_id.v1
    pub async fn get_store_by_id(&self, params: StoreIdRequest) -> Result<Store, ErrorObjectOwned> {
        self.service
            .get_store_by_id(&params.store_id)
            .await
            .map_err(to_rpc_error)
    }

    /// consumer.add.v1
    pub async fn add_consumer(
        &self,
        params: AddConsumerRequest,
    ) -> Result<AddConsumerResponse, ErrorObjectOwned> {
        let access_url = self
            .service
            .add_consumer(&params.store_id, &params.name, &params.phone, &params.status)
            .await
            .map_err(to_rpc_error)?;

        Ok(AddConsumerResponse { access_url })
    }

    /// consumer.remove.v1
    pub async fn remove_consumer(
        &self,
        params: ConsumerRequest,
    ) -> Result<RemoveConsumerResponse, ErrorObjectOwned> {
        self.service
            .remove_consumer(&params.store_id, &params.phone)
            .await
            .map_err(to_rpc_error)?;

        Ok(RemoveConsumerResponse {
            phone: params.phone,
            removed: true,
        })
    }

    /// consumer.get.v1
    pub async fn get_consumer(
        &self,
        params: ConsumerRequest,
    ) -> Result<PositionResponse, ErrorObjectOwned> {
        self.service
            .get_consumer(&params.store_id, &params.phone)
            .await
            .map(PositionResponse::from)
            .map_err(to_rpc_error)
    }

    /// consumer.list.v1
    pub async fn list_consumers(
        &self,
        params: StoreIdRequest,
    ) -> Result<ListConsumersResponse, ErrorObjectOwned> {
        let consumers = self
            .service
            .get_all_consumers(&params.store_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(ListConsumersResponse { consumers })
    }

    /// consumer.validate.v1
    pub async fn validate_consumer(
        &self,
        params: ValidateConsumerRequest,
    ) -> Result<PositionResponse, ErrorObjectOwned> {
        self.service
            .validate_consumer(&params.store_name, &params.access_key)
            .await
            .map(PositionResponse::from)
            .map_err(to_rpc_error)
    }
}
