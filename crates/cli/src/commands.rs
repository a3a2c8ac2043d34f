//! Command implementations.
//!
//! Every command runs exactly one invocation cycle through a [`Trigger`] and
//! returns the published [`ResultState`].

use std::sync::Arc;

use clap::ValueEnum;
use fetch::{
    BinaryCall, BinaryParams, FetchClient, HttpMethod, JsonCall, JsonParams, MethodName,
    RemoteCall, ResultState, StubCall, Trigger,
};
use http_exchange::{ExchangeConfig, ReqwestExchange};
use rpc_handle::HttpProcedure;
use tracing::info;

use crate::config::AppConfig;
use crate::messages::{LoginRequest, LoginResponse};

/// Which strategy carries a login request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// JSON text over HTTP.
    Json,
    /// Binary buffers over HTTP `POST`.
    Binary,
    /// Remote-procedure handle.
    Stub,
}

/// Shared infrastructure for the commands.
pub struct Context {
    config: AppConfig,
    exchange_config: ExchangeConfig,
    client: FetchClient,
}

impl Context {
    /// Builds the HTTP exchange from `config`.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let exchange_config = ExchangeConfig {
            timeout: config.timeout(),
            user_agent: format!("{}/{}", config.app_name, config.app_version),
        };
        let exchange = ReqwestExchange::new(&exchange_config)?;
        Ok(Self {
            config,
            exchange_config,
            client: FetchClient::new(Arc::new(exchange)),
        })
    }
}

/// Runs one cycle of `call` through a fresh trigger and returns what it published.
pub async fn run_cycle<C>(call: C, params: C::Params) -> ResultState<C::Output>
where
    C: RemoteCall,
    C::Output: Clone + Sync,
{
    let mut trigger = Trigger::new(call);
    if let Some(handle) = trigger.update(params) {
        if let Err(err) = handle.await {
            return ResultState::failure(format!("Invocation task failed: {err}"));
        }
    }
    trigger.current()
}

/// `login`
pub async fn login(
    ctx: &Context,
    request: LoginRequest,
    transport: Transport,
) -> anyhow::Result<ResultState<LoginResponse>> {
    let endpoint = ctx.config.login_endpoint();
    info!(?transport, %endpoint, "logging in");

    let state = match transport {
        Transport::Json => {
            let call = JsonCall::<LoginRequest, LoginResponse>::new(ctx.client.clone());
            let params = JsonParams {
                endpoint,
                method: HttpMethod::Post,
                payload: request,
            };
            run_cycle(call, params).await
        }
        Transport::Binary => {
            let call = BinaryCall::<LoginRequest, LoginResponse>::new(ctx.client.clone());
            let params = BinaryParams {
                endpoint,
                payload: request,
            };
            run_cycle(call, params).await
        }
        Transport::Stub => {
            let rpc = &ctx.config.rpc;
            let handle = HttpProcedure::<LoginRequest, LoginResponse>::connect(
                &rpc.address,
                &rpc.service,
                &ctx.exchange_config,
            )?;
            let method = MethodName::new(rpc.method.clone())
                .ok_or_else(|| anyhow::anyhow!("rpc.method must not be empty"))?;
            run_cycle(StubCall::with_method(handle, method), request).await
        }
    };
    Ok(state)
}

/// `register`
pub async fn register(ctx: &Context, request: LoginRequest) -> ResultState<serde_json::Value> {
    let call = JsonCall::<LoginRequest, serde_json::Value>::new(ctx.client.clone());
    let params = JsonParams {
        endpoint: ctx.config.register_endpoint(),
        method: HttpMethod::Post,
        payload: request,
    };
    run_cycle(call, params).await
}

/// `profile`
pub async fn profile(ctx: &Context) -> ResultState<serde_json::Value> {
    let call = JsonCall::<serde_json::Value, serde_json::Value>::new(ctx.client.clone());
    let params = JsonParams {
        endpoint: ctx.config.user_profile_endpoint(),
        method: HttpMethod::Get,
        payload: serde_json::Value::Null,
    };
    run_cycle(call, params).await
}
