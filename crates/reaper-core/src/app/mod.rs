//! App - アプリケーション層
//!
//! ports を組み合わせて 1 tick 分の処理を実装します。
//!
//! # 主要コンポーネント
//! - **discovery**: 候補の取得・除外・正規化
//! - **AgingTracker**: 初回観測時刻の記録と経過日数の判定
//! - **Reaper**: 削除・追跡レコードの後始末・DeletionEvent の生成
//! - **TickRunner**: 上記をつなぐ per-tick driver
//! - **TickSummary**: スケジューラのログに残す結果

pub mod discovery;
pub mod tracker;
pub mod reaper;
pub mod tick;
pub mod status;

pub use self::discovery::discover;
pub use self::tracker::AgingTracker;
pub use self::reaper::Reaper;
pub use self::tick::TickRunner;
pub use self::status::TickSummary;
