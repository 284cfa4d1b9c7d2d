//! reaper-core
//!
//! Core building blocks for the idle volume reaper.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（resource, tracking, decision, events, errors）
//! - **ports**: 抽象化レイヤー（Inventory, TrackingStore, ResourceDeleter, Notifier, Clock）
//! - **app**: アプリケーションロジック（discovery, tracker, reaper, tick, status）
//! - **impls**: InMemory 実装（テスト・ローカル実行用）
//! - **config**: 環境変数からの設定読み込み

pub mod domain;
pub mod ports;
pub mod app;
pub mod impls;
pub mod config;
