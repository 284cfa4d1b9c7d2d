//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（EC2, DynamoDB, Slack など）への
//! インターフェースを提供し、実装の詳細を隠蔽します。

pub mod clock;
pub mod inventory;
pub mod tracking_store;
pub mod deleter;
pub mod notifier;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::inventory::Inventory;
pub use self::tracking_store::TrackingStore;
pub use self::deleter::ResourceDeleter;
pub use self::notifier::Notifier;
