mod enrichment_service;
mod refresh_service;
mod update_notifier;

pub use enrichment_service::*;
pub use refresh_service::*;
pub use update_notifier::*;
