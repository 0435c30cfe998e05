pub mod quote;
pub mod units;

pub use quote::{QuoteEngine, QuoteRequest, SwapDirection, SwapQuote, SwapSimulator};
pub use units::{Amount, NanoAmount, to_amount, to_nano};
