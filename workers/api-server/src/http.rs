//! Groups handlers for the HTTP API

mod pool;
mod signature;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use alloy_primitives::Address;
use async_trait::async_trait;
use common::types::pool::PoolKey;
use external_api::{
    EmptyRequestResponse,
    http::{
        PING_ROUTE, PingResponse,
        pool::{
            ADD_LIQUIDITY_PERMIT_ROUTE, ADD_LIQUIDITY_ROUTE, APPROVE_TOKENS_ROUTE,
            INITIALIZE_POOL_ROUTE, SWAP_ROUTE, SWAP_WITH_PERMIT_ROUTE,
        },
        signature::VERIFY_SIGNATURE_ROUTE,
    },
    types::ApiCurrencies,
};
use http_body_util::BodyExt;
use hyper::{
    Error as HyperError, HeaderMap, Method, Request, Response, body::Incoming as IncomingBody,
    server::conn::http1::Builder as Http1Builder, service::service_fn,
};
use hyper_util::rt::{TokioIo, TokioTimer};
use pool::{
    AddLiquidityHandler, AddLiquidityWithPermitHandler, ApproveTokensHandler,
    InitializePoolHandler, SwapHandler, SwapWithPermitHandler,
};
use signature::VerifySignatureHandler;
use task_driver::TaskDriver;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info};
use util::{get_current_time_millis, get_current_time_seconds};

use super::{
    error::{ApiServerError, bad_request},
    router::{ResponseBody, Router, TypedHandler, UrlParams, build_400_response},
};

// ----------
// | Config |
// ----------

/// The pool parameters applied to every request
#[derive(Copy, Clone, Debug)]
pub struct PoolConfig {
    /// The currency0 used when a request omits it
    pub token0: Option<Address>,
    /// The currency1 used when a request omits it
    pub token1: Option<Address>,
    /// The fee tier of the pool
    pub fee: u32,
    /// The tick spacing of the pool
    pub tick_spacing: i32,
    /// The hooks contract of the pool
    pub hooks: Address,
    /// How long a signed permit remains valid
    pub permit_deadline: Duration,
}

impl PoolConfig {
    /// The currencies of a request, falling back to the configured defaults
    pub(crate) fn currencies(
        &self,
        currencies: &ApiCurrencies,
    ) -> Result<(Address, Address), ApiServerError> {
        Ok(currencies.resolve(self.token0, self.token1)?)
    }

    /// The key of the pool a request targets
    pub(crate) fn pool_key(&self, currencies: &ApiCurrencies) -> Result<PoolKey, ApiServerError> {
        let (currency0, currency1) = self.currencies(currencies)?;
        PoolKey::new(currency0, currency1, self.fee, self.tick_spacing, self.hooks)
            .map_err(bad_request)
    }

    /// The deadline of a permit signed now, in unix seconds
    pub(crate) fn permit_deadline(&self) -> u64 {
        get_current_time_seconds() + self.permit_deadline.as_secs()
    }
}

/// The configuration of the API server
#[derive(Clone)]
pub struct ApiServerConfig {
    /// The address to listen on
    pub http_addr: SocketAddr,
    /// The driver that runs each request's task
    pub driver: TaskDriver,
    /// The pool parameters applied to every request
    pub pool: PoolConfig,
}

// ---------------
// | HTTP Server |
// ---------------

/// A wrapper around the router and the server config
#[derive(Clone)]
pub struct HttpServer {
    /// The http router, used to dispatch requests to handlers
    router: Arc<Router>,
    /// The api server config
    config: ApiServerConfig,
}

impl HttpServer {
    /// Create a new http server
    pub fn new(config: ApiServerConfig) -> Result<Self, ApiServerError> {
        let router = Self::build_router(&config)?;
        Ok(Self { router: Arc::new(router), config })
    }

    /// Setup the HTTP routes and handlers
    fn build_router(config: &ApiServerConfig) -> Result<Router, ApiServerError> {
        let mut router = Router::new();
        let driver = &config.driver;
        let pool = config.pool;

        // --- Health Check --- //

        // GET /ping
        router.add_route(&Method::GET, PING_ROUTE.to_string(), PingHandler::new())?;

        // --- Pool Routes --- //

        // POST /approve
        router.add_route(
            &Method::POST,
            APPROVE_TOKENS_ROUTE.to_string(),
            ApproveTokensHandler::new(driver.clone(), pool),
        )?;

        // POST /initialize
        router.add_route(
            &Method::POST,
            INITIALIZE_POOL_ROUTE.to_string(),
            InitializePoolHandler::new(driver.clone(), pool),
        )?;

        // POST /addLiquidity
        router.add_route(
            &Method::POST,
            ADD_LIQUIDITY_ROUTE.to_string(),
            AddLiquidityHandler::new(driver.clone(), pool),
        )?;

        // POST /addLiquidityPermit
        router.add_route(
            &Method::POST,
            ADD_LIQUIDITY_PERMIT_ROUTE.to_string(),
            AddLiquidityWithPermitHandler::new(driver.clone(), pool),
        )?;

        // POST /performSwap
        router.add_route(
            &Method::POST,
            SWAP_ROUTE.to_string(),
            SwapHandler::new(driver.clone(), pool),
        )?;

        // POST /performSwapWithPermit
        router.add_route(
            &Method::POST,
            SWAP_WITH_PERMIT_ROUTE.to_string(),
            SwapWithPermitHandler::new(driver.clone(), pool),
        )?;

        // --- Signature Routes --- //

        // POST /verifySignature
        router.add_route(
            &Method::POST,
            VERIFY_SIGNATURE_ROUTE.to_string(),
            VerifySignatureHandler::new(),
        )?;

        Ok(router)
    }

    /// The execution loop for the http server, accepts incoming connections,
    /// serves them, and awaits the next connection
    pub async fn execution_loop(self) -> Result<(), ApiServerError> {
        let addr = self.config.http_addr;
        let listener = TcpListener::bind(addr).await.map_err(ApiServerError::server_failure)?;
        info!("HTTP server listening on {addr}");

        // Main execution loop
        loop {
            let (stream, _) = listener.accept().await.map_err(ApiServerError::server_failure)?;
            let self_clone = self.clone();
            tokio::spawn(async move {
                if let Err(e) = self_clone.handle_stream(stream).await {
                    error!("error serving connection: {e}");
                }
            });
        }
    }

    /// Handle an incoming TCP stream from a client
    async fn handle_stream(&self, stream: TcpStream) -> Result<(), ApiServerError> {
        let service_fn = service_fn(move |req: Request<IncomingBody>| {
            let self_clone = self.clone();
            async move { Ok::<_, HyperError>(self_clone.serve_request(req).await) }
        });

        // Build an HTTP/1 stream handler and service the connection
        let stream_io = TokioIo::new(stream);
        let timer = TokioTimer::new();
        Http1Builder::new().timer(timer).serve_connection(stream_io, service_fn).await?;

        Ok(())
    }

    /// Read a request's body and dispatch it to the router
    async fn serve_request(&self, req: Request<IncomingBody>) -> Response<ResponseBody> {
        let (parts, body) = req.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => return build_400_response(e.to_string()),
        };

        self.router.handle_req(parts.method, parts.uri, parts.headers, body).await
    }
}

// ----------------------
// | Generic Handlers |
// ----------------------

/// Handler for the ping route, returns a pong
#[derive(Clone, Debug, Default)]
pub struct PingHandler;
impl PingHandler {
    /// Create a new handler for "/ping"
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TypedHandler for PingHandler {
    type Request = EmptyRequestResponse;
    type Response = PingResponse;

    async fn handle_typed(
        &self,
        _headers: HeaderMap,
        _req: Self::Request,
        _params: UrlParams,
    ) -> Result<Self::Response, ApiServerError> {
        let timestamp = get_current_time_millis();
        Ok(PingResponse { timestamp })
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use alloy_primitives::U256;
    use chain_client::{
        context::ChainContext,
        mocks::{BalanceEffect, DEV_KEY, MockChainClient},
    };
    use gateway_crypto::{ecdsa::sign_message, keys::SigningKey};
    use http_body_util::BodyExt;
    use hyper::{StatusCode, body::Bytes};
    use serde_json::{Value, json};
    use task_driver::TaskContext;
    use test_helpers::mock_chain::{
        LP_ROUTER, SWAP_ROUTER, TOKEN0, TOKEN1, contract_addresses, fund, mock_chain,
    };
    use util::hex::bytes_to_hex_string;

    use super::*;

    /// The amount swapped in the tests
    const SWAP_AMOUNT: u64 = 10_000_000;

    /// Build a server over a mock chain, with the test tokens as defaults
    async fn setup() -> (Arc<MockChainClient>, HttpServer) {
        let mock = mock_chain();
        let chain = ChainContext::new(mock.clone()).await.unwrap();
        let ctx = TaskContext {
            chain,
            gateway_key: SigningKey::from_hex(DEV_KEY).unwrap(),
            permit_signer: SigningKey::from_seed("alice").unwrap(),
            contracts: contract_addresses(),
            receipt_timeout: Duration::from_millis(200),
            receipt_poll_interval: Duration::from_millis(10),
        };

        let pool = PoolConfig {
            token0: Some(TOKEN0),
            token1: Some(TOKEN1),
            fee: 3000,
            tick_spacing: 60,
            hooks: Address::ZERO,
            permit_deadline: Duration::from_secs(3600),
        };
        let config = ApiServerConfig {
            http_addr: "127.0.0.1:0".parse().unwrap(),
            driver: TaskDriver::new(ctx),
            pool,
        };

        (mock, HttpServer::new(config).unwrap())
    }

    /// Send a request through the router, returning the status and body
    async fn send(
        server: &HttpServer,
        method: Method,
        route: &str,
        body: &str,
    ) -> (StatusCode, String) {
        let uri = route.parse().unwrap();
        let body = Bytes::from(body.to_string());
        let resp = server.router.handle_req(method, uri, HeaderMap::new(), body).await;

        let status = resp.status();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    /// Send a request and parse a JSON response
    async fn send_json(server: &HttpServer, route: &str, body: Value) -> (StatusCode, Value) {
        let (status, body) = send(server, Method::POST, route, &body.to_string()).await;
        let value = serde_json::from_str(&body).unwrap_or(Value::String(body));
        (status, value)
    }

    /// Tests the ping route
    #[tokio::test]
    async fn test_ping() {
        let (_mock, server) = setup().await;
        let (status, body) = send(&server, Method::GET, PING_ROUTE, "").await;
        assert_eq!(status, StatusCode::OK);

        let resp: PingResponse = serde_json::from_str(&body).unwrap();
        assert!(resp.timestamp > 0);
    }

    /// Tests that unknown routes and methods are not found
    #[tokio::test]
    async fn test_not_found() {
        let (_mock, server) = setup().await;
        let (status, _) = send(&server, Method::POST, "/unknown", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&server, Method::GET, SWAP_ROUTE, "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    /// Tests a swap through the HTTP surface
    #[tokio::test]
    async fn test_swap() {
        let (mock, server) = setup().await;
        let gateway = SigningKey::from_hex(DEV_KEY).unwrap().address();
        fund(&mock, gateway, U256::from(1_000_000_000u64));
        mock.queue_effects(vec![
            BalanceEffect::debit(TOKEN0, gateway, U256::from(SWAP_AMOUNT)),
            BalanceEffect::credit(TOKEN1, gateway, U256::from(9_969_999u64)),
        ]);

        let body = json!({ "amount": SWAP_AMOUNT.to_string(), "zeroForOne": true });
        let (status, resp) = send_json(&server, SWAP_ROUTE, body).await;
        assert_eq!(status, StatusCode::OK, "{resp}");
        assert_eq!(resp["status"], "Swap executed successfully");
        assert_eq!(resp["balancesBefore"]["currency0"], "1000000000");
        assert_eq!(resp["deltaBalances"]["currency0"], "-10000000");
        assert_eq!(resp["deltaBalances"]["currency1"], "9969999");
        assert!(resp["txHash"].as_str().unwrap().starts_with("0x"));
    }

    /// Tests a swap with a permit, which reports a message rather than a
    /// status
    #[tokio::test]
    async fn test_swap_with_permit() {
        let (mock, server) = setup().await;
        let owner = SigningKey::from_seed("alice").unwrap().address();
        fund(&mock, owner, U256::from(1_000_000_000u64));

        let body = json!({ "amount": "1000" });
        let (status, resp) = send_json(&server, SWAP_WITH_PERMIT_ROUTE, body).await;
        assert_eq!(status, StatusCode::OK, "{resp}");
        assert_eq!(resp["message"], "Swap with permit initiated successfully");
        assert!(resp.get("status").is_none());
        assert_eq!(mock.permit_nonce_of(TOKEN0, owner), U256::from(1u64));

        let sent = mock.sent_transactions();
        assert_eq!(sent[0].to, Some(SWAP_ROUTER));
    }

    /// Tests adding liquidity reports the pool parameters
    #[tokio::test]
    async fn test_add_liquidity() {
        let (mock, server) = setup().await;
        let body = json!({ "liquidity": "5000" });
        let (status, resp) = send_json(&server, ADD_LIQUIDITY_ROUTE, body).await;

        assert_eq!(status, StatusCode::OK, "{resp}");
        assert_eq!(resp["status"], "Liquidity added successfully");
        assert_eq!(resp["params"]["fee"], "3000");
        assert_eq!(resp["params"]["tickSpacing"], "60");
        assert_eq!(resp["params"]["liquidityAmount"], "5000");
        assert_eq!(mock.sent_transactions()[0].to, Some(LP_ROUTER));
    }

    /// Tests the approval route with an empty body
    #[tokio::test]
    async fn test_approve() {
        let (mock, server) = setup().await;
        let (status, body) = send(&server, Method::POST, APPROVE_TOKENS_ROUTE, "").await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let resp: Value = serde_json::from_str(&body).unwrap();
        let entry = &resp[TOKEN0.to_string()];
        assert_eq!(entry["message"], "Token approved successfully");
        assert_eq!(entry["balance"], "0");
        assert_eq!(mock.sent_transactions().len(), 4);
    }

    /// Tests pool initialization
    #[tokio::test]
    async fn test_initialize() {
        let (_mock, server) = setup().await;
        let (status, resp) = send_json(&server, INITIALIZE_POOL_ROUTE, json!({})).await;
        assert_eq!(status, StatusCode::OK, "{resp}");
        assert_eq!(resp["status"], "Pool initialized successfully");
        assert!(resp["initializeTxHash"].is_string());
    }

    /// Tests the status codes of failed requests
    #[tokio::test]
    async fn test_error_statuses() {
        let (mock, server) = setup().await;

        // Inverted currencies
        let body = json!({ "currency0": TOKEN1, "currency1": TOKEN0 });
        let (status, _) = send_json(&server, SWAP_ROUTE, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Malformed amount
        let (status, _) = send_json(&server, SWAP_ROUTE, json!({ "amount": "-5" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Malformed JSON
        let (status, _) = send(&server, Method::POST, SWAP_ROUTE, "{").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Reverted
        mock.revert_next();
        let (status, _) = send_json(&server, SWAP_ROUTE, json!({})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        // Never mined
        mock.withhold_receipts(true);
        let (status, body) = send_json(&server, SWAP_ROUTE, json!({})).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert!(body.as_str().unwrap().contains("timed out"));
        mock.withhold_receipts(false);

        // Unreachable
        mock.set_unavailable(true);
        let (status, _) = send_json(&server, SWAP_ROUTE, json!({})).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    /// Tests signature verification over a raw message
    #[tokio::test]
    async fn test_verify_signature() {
        let (_mock, server) = setup().await;
        let key = SigningKey::from_seed("alice").unwrap();
        let message = b"hello gateway";
        let sig = sign_message(message, &key).unwrap();

        let body = json!({
            "message": bytes_to_hex_string(message),
            "signature": bytes_to_hex_string(&sig.to_bytes()),
            "address": key.address(),
        });
        let (status, resp) = send_json(&server, VERIFY_SIGNATURE_ROUTE, body.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp["valid"], true);

        let mut wrong = body;
        wrong["address"] = json!(TOKEN0);
        let (_, resp) = send_json(&server, VERIFY_SIGNATURE_ROUTE, wrong).await;
        assert_eq!(resp["valid"], false);
    }
}
