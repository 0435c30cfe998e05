pub mod tokens;
pub mod trade;

pub use tokens::*;
pub use trade::*;
