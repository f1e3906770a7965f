//! JSON-RPC Server
//!
//! JSON-RPC 2.0 over HTTP/WebSocket (jsonrpsee), bound to localhost by default.

use crate::error::RpcServerError;
use crate::handler::RpcHandler;
use crate::types::{
    CareerIdRequest, CareerTrendRequest, MarketTrendsRequest, NoParams, SkillsDataRequest,
    UpdateCareerRequest,
};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::{ErrorObjectOwned, Params};
use jsonrpsee::RpcModule;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use trendline_core::application::{
    CareerRoadmapRequest, CareerSearchRequest, JobMarketQuery, SkillsAssessmentRequest,
};
use trendline_core::domain::ChatRequest;

pub const DEFAULT_RPC_HOST: &str = "127.0.0.1";
pub const DEFAULT_RPC_PORT: u16 = 9527;

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

/// A started server: where it listens and how to stop it
pub struct RunningServer {
    pub local_addr: SocketAddr,
    pub handle: ServerHandle,
}

/// Register `call` under `method`, parsing params into `P`.
/// Absent params parse as `{}` so all-optional requests can omit them.
fn register<P, T, F, Fut>(
    module: &mut RpcModule<()>,
    method: &'static str,
    handler: &Arc<RpcHandler>,
    call: F,
) -> Result<(), RpcServerError>
where
    P: DeserializeOwned + Send + 'static,
    T: Serialize + Clone + Send + 'static,
    F: Fn(Arc<RpcHandler>, P) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ErrorObjectOwned>> + Send + 'static,
{
    let handler = handler.clone();
    module
        .register_async_method(method, move |params, _, _| {
            let handler = handler.clone();
            let call = call.clone();
            async move {
                let req: P = match params.as_str() {
                    Some(_) => params.parse()?,
                    None => Params::new(Some("{}")).parse()?,
                };
                call(handler, req).await
            }
        })
        .map_err(|e| RpcServerError::Register(e.to_string()))?;
    Ok(())
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, handler: Arc<RpcHandler>) -> Self {
        Self { config, handler }
    }

    fn module(&self) -> Result<RpcModule<()>, RpcServerError> {
        let mut module = RpcModule::new(());
        let h = &self.handler;

        register(&mut module, "jobs.market.v1", h, |h, req: JobMarketQuery| async move {
            h.job_market(req).await
        })?;
        register(&mut module, "trends.market.v1", h, |h, req: MarketTrendsRequest| async move {
            h.market_trends(req).await
        })?;
        register(&mut module, "skills.data.v1", h, |h, req: SkillsDataRequest| async move {
            h.skills_data(req).await
        })?;
        register(
            &mut module,
            "skills.assessment.v1",
            h,
            |h, req: SkillsAssessmentRequest| async move { h.skills_assessment(req).await },
        )?;
        register(&mut module, "careers.list.v1", h, |h, req: NoParams| async move {
            h.all_careers(req).await
        })?;
        register(&mut module, "careers.get.v1", h, |h, req: CareerIdRequest| async move {
            h.career(req).await
        })?;
        register(&mut module, "careers.update.v1", h, |h, req: UpdateCareerRequest| async move {
            h.update_career(req).await
        })?;
        register(&mut module, "careers.refresh.v1", h, |h, req: CareerIdRequest| async move {
            h.refresh_career(req).await
        })?;
        register(&mut module, "careers.roadmap.v1", h, |h, req: CareerRoadmapRequest| async move {
            h.career_roadmap(req).await
        })?;
        register(&mut module, "careers.market.v1", h, |h, req: CareerIdRequest| async move {
            h.career_market(req).await
        })?;
        register(&mut module, "careers.search.v1", h, |h, req: CareerSearchRequest| async move {
            h.search_careers(req).await
        })?;
        register(&mut module, "chat.completions.v1", h, |h, req: ChatRequest| async move {
            h.chat_completions(req).await
        })?;
        register(&mut module, "trends.career.v1", h, |h, req: CareerTrendRequest| async move {
            h.career_trend(req).await
        })?;

        // Admin
        register(&mut module, "admin.force_run.v1", h, |h, req: NoParams| async move {
            h.force_run(req).await
        })?;
        register(&mut module, "admin.stats.v1", h, |h, req: NoParams| async move {
            h.stats(req).await
        })?;

        Ok(module)
    }

    /// Start the JSON-RPC server
    pub async fn start(self) -> Result<RunningServer, RpcServerError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|source| RpcServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = server.local_addr().map_err(|source| RpcServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

        let module = self.module()?;
        let methods = module.method_names().count();
        let handle = server.start(module);

        info!(addr = %local_addr, methods, "JSON-RPC server started");
        Ok(RunningServer { local_addr, handle })
    }
}
