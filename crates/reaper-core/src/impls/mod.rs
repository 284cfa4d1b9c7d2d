//! Impls - 実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryTrackingStore**: expires_at を Clock で判定する KV ストア
//! - **InMemoryVolumes**: Inventory と ResourceDeleter を兼ねるボリューム一覧
//! - **RecordingNotifier**: 通知の記録
//!
//! # 本番用実装
//! AWS (EC2 / DynamoDB) と Slack の実装は `reaper-cli` にあります。

pub mod inmem_store;
pub mod inmem_volumes;
pub mod notifier;

pub use self::inmem_store::{InMemoryTrackingStore, StoreStats};
pub use self::inmem_volumes::InMemoryVolumes;
pub use self::notifier::RecordingNotifier;
