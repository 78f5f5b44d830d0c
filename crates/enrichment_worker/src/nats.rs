mod demo_producer;
mod notification_consumer;
mod notification_producer;
mod work_item_processor;
mod work_item_producer;

pub use demo_producer::*;
pub use notification_consumer::*;
pub use notification_producer::*;
pub use work_item_processor::*;
pub use work_item_producer::*;
