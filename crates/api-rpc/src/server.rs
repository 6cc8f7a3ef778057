//! JSON-RPC Server
//!
//! Serves the queue API over HTTP (jsonrpsee).

use crate::handler::RpcHandler;
use crate::types::{
    AddConsumerRequest, ConsumerRequest, CreateStoreRequest, GetStoreRequest, StoreIdRequest,
    ValidateConsumerRequest,
};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use waitline_core::application::QueueService;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 8080;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// Register `$method` so that its params parse into `$req` and are handed
/// to `RpcHandler::$call`.
macro_rules! register {
    ($module:expr, $handler:expr, $method:literal, $req:ty, $call:ident) => {{
        let handler = $handler.clone();
        $module
            .register_async_method($method, move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: $req = params.parse()?;
                    handler.$call(req).await
                }
            })
            .map_err(|e| e.to_string())?;
    }};
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, service: Arc<QueueService>) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(service)),
        }
    }

    /// Build the method table
    pub fn module(&self) -> Result<RpcModule<()>, String> {
        let mut module = RpcModule::new(());
        let handler = &self.handler;

        // Stores
        register!(module, handler, "store.create.v1", CreateStoreRequest, create_store);
        register!(module, handler, "store.remove.v1", StoreIdRequest, remove_store);
        {
            // no params; anything sent is ignored
            let handler = handler.clone();
            module
                .register_async_method("store.list.v1", move |_, _, _| {
                    let handler = handler.clone();
                    async move { handler.list_stores().await }
                })
                .map_err(|e| e.to_string())?;
        }
        register!(module, handler, "store.get.v1", GetStoreRequest, get_store);
        register!(module, handler, "store.get_by_id.v1", StoreIdRequest, get_store_by_id);

        // Consumers
        register!(module, handler, "consumer.add.v1", AddConsumerRequest, add_consumer);
        register!(module, handler, "consumer.remove.v1", ConsumerRequest, remove_consumer);
        register!(module, handler, "consumer.get.v1", ConsumerRequest, get_consumer);
        register!(module, handler, "consumer.list.v1", StoreIdRequest, list_consumers);
        register!(
            module,
            handler,
            "consumer.validate.v1",
            ValidateConsumerRequest,
            validate_consumer
        );

        Ok(module)
    }

    /// Start the JSON-RPC server, returning its bound address and handle
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let module = self.module()?;

        info!(addr = %local_addr, "JSON-RPC server started successfully");

        let handle = server.start(module);
        Ok((local_addr, handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonrpsee::core::params::ObjectParams;
    use waitline_core::application::ServiceConfig;
    use waitline_core::port::{RandomAccessKeyProvider, SystemTimeProvider, UuidProvider};
    use waitline_infra_memory::InMemoryQueueRepository;

    fn service() -> Arc<QueueService> {
        Arc::new(QueueService::new(
            Arc::new(InMemoryQueueRepository::new(Arc::new(UuidProvider))),
            Arc::new(RandomAccessKeyProvider::new()),
            Arc::new(SystemTimeProvider),
            ServiceConfig::default(),
        ))
    }

    #[test]
    fn test_module_registers_every_method() {
        let server = RpcServer::new(RpcServerConfig::default(), service());
        let module = server.module().unwrap();

        let mut names: Vec<&str> = module.method_names().collect();
        names.sort_unstable();
        assert_eq!(
            names,
            vec![
                "consumer.add.v1",
                "consumer.get.v1",
                "consumer.list.v1",
                "consumer.remove.v1",
                "consumer.validate.v1",
                "store.create.v1",
                "store.get.v1",
                "store.get_by_id.v1",
                "store.list.v1",
                "store.remove.v1",
            ]
        );
    }

    #[tokio::test]
    async fn test_module_call_round_trip() {
        let server = RpcServer::new(RpcServerConfig::default(), service());
        let module = server.module().unwrap();

        let mut params = ObjectParams::new();
        params.insert("name", "Outback").unwrap();
        let store: serde_json::Value = module.call("store.create.v1", params).await.unwrap();
        assert!(store["accessURL"].as_str().unwrap().ends_with("/outback"));

        let listed: serde_json::Value = module
            .call("store.list.v1", ObjectParams::new())
            .await
            .unwrap();
        assert_eq!(listed["names"], serde_json::json!(["Outback"]));
    }
}
