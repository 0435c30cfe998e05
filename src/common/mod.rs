pub mod address;
pub mod error;
pub mod router_cache;
pub mod ston_api;
pub mod ton_api;
pub mod types;

pub use address::TonAddress;
pub use error::{SwapError, SwapResult};
pub use router_cache::RouterInfoCache;
pub use ston_api::{RouterInfo, SimulateSwapRequest, StonApiClient, StonApiConfig, SwapSimulation};
pub use ton_api::{EventAction, JettonMaster, JettonSwapAction, LedgerEvent, TonApiClient, TonApiConfig};
pub use types::{AnyResult, SwapConfig};
