mod broker;
mod client;
pub mod codec;
mod consumer;
mod traits;

pub use broker::*;
pub use client::*;
pub use consumer::*;
pub use traits::*;
