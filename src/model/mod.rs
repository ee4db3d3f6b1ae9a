pub mod pool;
pub mod whale;

pub use pool::{LiquidityPool, PoolItem};
pub use whale::Whales;
