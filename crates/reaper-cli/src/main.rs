//! ebs-reaper - アイドルボリューム reaper の 1 tick
//!
//! 環境変数から設定を読み込み、discovery -> tracking -> reaping を 1 回実行する。
//! tick の要約を JSON で出力し、失敗した場合は非ゼロで終了する。

mod aws;
mod slack;
mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use reaper_core::app::{TickRunner, TickSummary};
use reaper_core::config::Settings;
use reaper_core::ports::SystemClock;

use crate::aws::{DynamoTrackingStore, Ec2Inventory, Ec2VolumeDeleter};
use crate::slack::SlackNotifier;

async fn run(settings: &Settings) -> TickSummary {
    let aws_config = aws_config::load_from_env().await;
    let ec2 = aws_sdk_ec2::Client::new(&aws_config);
    let dynamodb = aws_sdk_dynamodb::Client::new(&aws_config);

    let runner = TickRunner::new(
        settings.retention(),
        Arc::new(Ec2Inventory::new(ec2.clone())),
        Arc::new(DynamoTrackingStore::new(dynamodb, &settings.dynamodb_table_name)),
        Arc::new(Ec2VolumeDeleter::new(ec2)),
        Arc::new(SlackNotifier::new(&settings.slack_webhook_url, &settings.slack_channel)),
        Arc::new(SystemClock),
    );

    runner.trigger().await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let settings = Settings::load().context("failed to load configuration")?;
    info!(
        retention_days = settings.retention_days,
        excluded_namespaces = ?settings.excluded_namespaces,
        excluded_clusters = ?settings.excluded_clusters,
        table = %settings.dynamodb_table_name,
        notifications = !settings.slack_webhook_url.is_empty(),
        dry_run = settings.dry_run,
        "ebs-reaper starting"
    );

    let summary = run(&settings).await;
    println!("{}", serde_json::to_string(&summary)?);

    if !summary.success {
        anyhow::bail!("tick failed: {}", summary.error.unwrap_or_default());
    }
    Ok(())
}
