//! Route handlers for pool operations

use async_trait::async_trait;
use common::types::{
    pool::{ModifyLiquidityParams, PoolKey, SwapParams, TestSettings},
    tasks::{ApproveTokensTaskDescriptor, PoolOperation, TransactTaskDescriptor},
};
use external_api::{
    http::pool::{
        AddLiquidityRequest, AddLiquidityResponse, ApiApprovalResult, ApiLiquidityParams,
        ApproveTokensRequest, ApproveTokensResponse, InitializePoolRequest,
        InitializePoolResponse, LIQUIDITY_ADDED_STATUS, LIQUIDITY_PERMIT_MESSAGE,
        POOL_INITIALIZED_STATUS, SWAP_PERMIT_MESSAGE, SWAP_STATUS, SwapRequest, SwapResponse,
        TOKEN_APPROVED_MESSAGE,
    },
    types::{ApiBalanceReport, ApiBalances},
};
use hyper::HeaderMap;
use task_driver::{
    TaskDriver,
    tasks::{
        approve_tokens::ApproveTokensTask,
        transact::{TransactOutput, TransactTask},
    },
};
use tracing::info;

use crate::{
    error::{ApiServerError, bad_request, internal_error, task_error},
    router::{TypedHandler, UrlParams},
};

use super::PoolConfig;

// -----------
// | Helpers |
// -----------

/// Run a transact task over the given pool operation
async fn run_transact(
    driver: &TaskDriver,
    descriptor: TransactTaskDescriptor,
) -> Result<TransactOutput, ApiServerError> {
    driver.run::<TransactTask>(descriptor).await.map_err(task_error)
}

/// Build a descriptor for an operation, permit based if `permit` is set
fn transact_descriptor(
    config: &PoolConfig,
    pool_key: PoolKey,
    operation: PoolOperation,
    permit: bool,
) -> Result<TransactTaskDescriptor, ApiServerError> {
    if !permit {
        return Ok(TransactTaskDescriptor::new(pool_key, operation));
    }

    TransactTaskDescriptor::new_with_permit(pool_key, operation, config.permit_deadline())
        .map_err(bad_request)
}

/// Convert a task's balance report into its API form
fn balance_report(output: &TransactOutput) -> Result<ApiBalanceReport, ApiServerError> {
    let report = output
        .balances
        .as_ref()
        .ok_or_else(|| internal_error("operation did not report balances"))?;

    Ok(ApiBalanceReport {
        balances_before: ApiBalances::from_amounts(&report.before.amounts())?,
        balances_after: ApiBalances::from_amounts(&report.after.amounts())?,
        delta_balances: ApiBalances::from_amounts(&report.delta.amounts())?,
    })
}

// ---------------------
// | Approval Handlers |
// ---------------------

/// Handler for the POST /approve route
pub struct ApproveTokensHandler {
    /// The driver that runs the approval task
    driver: TaskDriver,
    /// The configured pool parameters
    config: PoolConfig,
}

impl ApproveTokensHandler {
    /// Constructor
    pub fn new(driver: TaskDriver, config: PoolConfig) -> Self {
        Self { driver, config }
    }
}

#[async_trait]
impl TypedHandler for ApproveTokensHandler {
    type Request = ApproveTokensRequest;
    type Response = ApproveTokensResponse;

    async fn handle_typed(
        &self,
        _headers: HeaderMap,
        req: Self::Request,
        _params: UrlParams,
    ) -> Result<Self::Response, ApiServerError> {
        let (currency0, currency1) = self.config.currencies(&req.currencies)?;
        let descriptor =
            ApproveTokensTaskDescriptor::new(vec![currency0, currency1]).map_err(bad_request)?;
        let output =
            self.driver.run::<ApproveTokensTask>(descriptor).await.map_err(task_error)?;

        let mut resp = ApproveTokensResponse::new();
        for (token, balance) in output.balances.balances.iter() {
            let result = ApiApprovalResult {
                message: TOKEN_APPROVED_MESSAGE.to_string(),
                balance: balance.to_string(),
            };
            resp.insert(token.to_string(), result);
        }

        Ok(resp)
    }
}

// --------------------------
// | Initialization Handler |
// --------------------------

/// Handler for the POST /initialize route
pub struct InitializePoolHandler {
    /// The driver that runs the transact task
    driver: TaskDriver,
    /// The configured pool parameters
    config: PoolConfig,
}

impl InitializePoolHandler {
    /// Constructor
    pub fn new(driver: TaskDriver, config: PoolConfig) -> Self {
        Self { driver, config }
    }
}

#[async_trait]
impl TypedHandler for InitializePoolHandler {
    type Request = InitializePoolRequest;
    type Response = InitializePoolResponse;

    async fn handle_typed(
        &self,
        _headers: HeaderMap,
        req: Self::Request,
        _params: UrlParams,
    ) -> Result<Self::Response, ApiServerError> {
        let pool_key = self.config.pool_key(&req.currencies)?;
        let operation = PoolOperation::Initialize { sqrt_price_x96: req.sqrt_price()? };

        let descriptor = transact_descriptor(&self.config, pool_key, operation, false)?;
        let output = run_transact(&self.driver, descriptor).await?;
        info!("pool initialized in tx {:#x}", output.tx_hash());

        Ok(InitializePoolResponse {
            initialize_tx_hash: output.tx_hash(),
            status: POOL_INITIALIZED_STATUS.to_string(),
        })
    }
}

// ----------------------
// | Liquidity Handlers |
// ----------------------

/// Add full range liquidity, optionally authorized by permits
async fn add_liquidity(
    driver: &TaskDriver,
    config: &PoolConfig,
    req: AddLiquidityRequest,
    permit: bool,
) -> Result<AddLiquidityResponse, ApiServerError> {
    let pool_key = config.pool_key(&req.currencies)?;
    let liquidity = req.liquidity()?;
    let params = ModifyLiquidityParams::add_full_range(liquidity).map_err(bad_request)?;

    let operation = PoolOperation::AddLiquidity { params };
    let descriptor = transact_descriptor(config, pool_key, operation, permit)?;
    let output = run_transact(driver, descriptor).await?;

    let [currency0, currency1] = pool_key.currencies();
    let (status, message) = if permit {
        (None, Some(LIQUIDITY_PERMIT_MESSAGE.to_string()))
    } else {
        (Some(LIQUIDITY_ADDED_STATUS.to_string()), None)
    };

    Ok(AddLiquidityResponse {
        tx_hash: output.tx_hash(),
        status,
        message,
        balances: balance_report(&output)?,
        params: ApiLiquidityParams {
            currency0,
            currency1,
            fee: pool_key.fee.to_string(),
            tick_spacing: pool_key.tick_spacing.to_string(),
            liquidity_amount: liquidity.to_string(),
        },
    })
}

/// Handler for the POST /addLiquidity route
pub struct AddLiquidityHandler {
    /// The driver that runs the transact task
    driver: TaskDriver,
    /// The configured pool parameters
    config: PoolConfig,
}

impl AddLiquidityHandler {
    /// Constructor
    pub fn new(driver: TaskDriver, config: PoolConfig) -> Self {
        Self { driver, config }
    }
}

#[async_trait]
impl TypedHandler for AddLiquidityHandler {
    type Request = AddLiquidityRequest;
    type Response = AddLiquidityResponse;

    async fn handle_typed(
        &self,
        _headers: HeaderMap,
        req: Self::Request,
        _params: UrlParams,
    ) -> Result<Self::Response, ApiServerError> {
        add_liquidity(&self.driver, &self.config, req, false /* permit */).await
    }
}

/// Handler for the POST /addLiquidityPermit route
pub struct AddLiquidityWithPermitHandler {
    /// The driver that runs the transact task
    driver: TaskDriver,
    /// The configured pool parameters
    config: PoolConfig,
}

impl AddLiquidityWithPermitHandler {
    /// Constructor
    pub fn new(driver: TaskDriver, config: PoolConfig) -> Self {
        Self { driver, config }
    }
}

#[async_trait]
impl TypedHandler for AddLiquidityWithPermitHandler {
    type Request = AddLiquidityRequest;
    type Response = AddLiquidityResponse;

    async fn handle_typed(
        &self,
        _headers: HeaderMap,
        req: Self::Request,
        _params: UrlParams,
    ) -> Result<Self::Response, ApiServerError> {
        add_liquidity(&self.driver, &self.config, req, true /* permit */).await
    }
}

// -----------------
// | Swap Handlers |
// -----------------

/// Execute an exact input swap, optionally authorized by a permit
async fn swap(
    driver: &TaskDriver,
    config: &PoolConfig,
    req: SwapRequest,
    permit: bool,
) -> Result<SwapResponse, ApiServerError> {
    let pool_key = config.pool_key(&req.currencies)?;
    let params = SwapParams::exact_input(req.zero_for_one(), req.amount()?).map_err(bad_request)?;

    let operation = PoolOperation::Swap { params, settings: TestSettings::default() };
    let descriptor = transact_descriptor(config, pool_key, operation, permit)?;
    let output = run_transact(driver, descriptor).await?;

    let (status, message) = if permit {
        (None, Some(SWAP_PERMIT_MESSAGE.to_string()))
    } else {
        (Some(SWAP_STATUS.to_string()), None)
    };

    Ok(SwapResponse { tx_hash: output.tx_hash(), status, message, balances: balance_report(&output)? })
}

/// Handler for the POST /performSwap route
pub struct SwapHandler {
    /// The driver that runs the transact task
    driver: TaskDriver,
    /// The configured pool parameters
    config: PoolConfig,
}

impl SwapHandler {
    /// Constructor
    pub fn new(driver: TaskDriver, config: PoolConfig) -> Self {
        Self { driver, config }
    }
}

#[async_trait]
impl TypedHandler for SwapHandler {
    type Request = SwapRequest;
    type Response = SwapResponse;

    async fn handle_typed(
        &self,
        _headers: HeaderMap,
        req: Self::Request,
        _params: UrlParams,
    ) -> Result<Self::Response, ApiServerError> {
        swap(&self.driver, &self.config, req, false /* permit */).await
    }
}

/// Handler for the POST /performSwapWithPermit route
pub struct SwapWithPermitHandler {
    /// The driver that runs the transact task
    driver: TaskDriver,
    /// The configured pool parameters
    config: PoolConfig,
}

impl SwapWithPermitHandler {
    /// Constructor
    pub fn new(driver: TaskDriver, config: PoolConfig) -> Self {
        Self { driver, config }
    }
}

#[async_trait]
impl TypedHandler for SwapWithPermitHandler {
    type Request = SwapRequest;
    type Response = SwapResponse;

    async fn handle_typed(
        &self,
        _headers: HeaderMap,
        req: Self::Request,
        _params: UrlParams,
    ) -> Result<Self::Response, ApiServerError> {
        swap(&self.driver, &self.config, req, true /* permit */).await
    }
}
