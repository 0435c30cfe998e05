pub mod confirmation;
pub mod outcome;
pub mod router;
pub mod transaction_builder;
pub mod wallet;

pub use confirmation::{CancelFlag, ConfirmationPoller, PollClock, TokioClock};
pub use outcome::{EventSource, OutcomeClassifier, PollOutcome};
pub use router::{
    JettonWalletSource, ProxyTon, ProxyTonVersion, RouterContract, RouterMetadataSource, RouterResolver,
    RouterVersion, select_versions,
};
pub use transaction_builder::{
    BuildSwapRequest, PreparedSwap, SwapBody, SwapForwardPayload, TransactionBuilder, TransactionParams,
};
pub use wallet::TransactionSender;
