mod message;
mod record;
mod result;
mod weather;

pub use message::*;
pub use record::*;
pub use result::*;
pub use weather::*;
