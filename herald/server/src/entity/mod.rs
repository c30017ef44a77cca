mod notify;

pub use self::notify::{trim_deliveries, NotifyRequest, NotifyResponse};
