//! SlackNotifier - Slack incoming webhook への通知

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use reaper_core::domain::{DeletionEvent, NotifyError};
use reaper_core::ports::Notifier;

const USERNAME: &str = "ebs-cleaner";
const ICON_EMOJI: &str = ":minidisc:";
const TEXT: &str = "Deleting an unused EBS volume.";

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SlackMessage {
    pub channel: String,
    pub icon_emoji: &'static str,
    pub username: &'static str,
    pub text: &'static str,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Attachment {
    pub color: &'static str,
    pub fields: Vec<Field>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Field {
    pub title: String,
    pub value: String,
}

impl SlackMessage {
    pub fn for_deletion(channel: &str, event: &DeletionEvent) -> Self {
        let placement = event.placement();
        let fields = vec![
            Field {
                title: placement.title().to_string(),
                value: format!(":flag-{}: {}", event.locality, placement.value()),
            },
            Field {
                title: "Id".to_string(),
                value: event.resource_id.clone(),
            },
            Field {
                title: "Name".to_string(),
                value: event.display_name.clone().unwrap_or_else(|| "-".to_string()),
            },
        ];

        Self {
            channel: channel.to_string(),
            icon_emoji: ICON_EMOJI,
            username: USERNAME,
            text: TEXT,
            attachments: vec![Attachment {
                color: "warning",
                fields,
            }],
        }
    }
}

pub struct SlackNotifier {
    client: reqwest::Client,
    webhook_url: String,
    channel: String,
}

impl SlackNotifier {
    /// An empty `webhook_url` makes every `notify` a no-op.
    pub fn new(webhook_url: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: webhook_url.into(),
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, event: &DeletionEvent) -> Result<(), NotifyError> {
        if self.webhook_url.is_empty() {
            return Ok(());
        }

        let message = SlackMessage::for_deletion(&self.channel, event);
        debug!(resource_id = %event.resource_id, channel = %self.channel, "sending slack notification");

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&message)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn event(cluster: Option<&str>) -> DeletionEvent {
        DeletionEvent {
            resource_id: "vol-1".to_string(),
            display_name: Some("pvc-data".to_string()),
            locality: "kr".to_string(),
            region: "ap-northeast-2".to_string(),
            cluster_owner: cluster.map(str::to_string),
            deleted_at: Utc::now(),
        }
    }

    #[test]
    fn message_titles_cluster_when_known() {
        let message = SlackMessage::for_deletion("ops", &event(Some("prod-kr")));
        let fields = &message.attachments[0].fields;

        assert_eq!(fields[0].title, "Cluster");
        assert_eq!(fields[0].value, ":flag-kr: prod-kr");
        assert_eq!(fields[1].value, "vol-1");
        assert_eq!(fields[2].value, "pvc-data");
    }

    #[test]
    fn message_falls_back_to_region() {
        let mut e = event(None);
        e.display_name = None;
        let message = SlackMessage::for_deletion("ops", &e);
        let fields = &message.attachments[0].fields;

        assert_eq!(fields[0].title, "Region");
        assert_eq!(fields[0].value, ":flag-kr: ap-northeast-2");
        assert_eq!(fields[2].value, "-");
    }

    #[tokio::test]
    async fn posts_to_webhook() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_partial_json(serde_json::json!({
                "channel": "ops",
                "username": "ebs-cleaner",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = SlackNotifier::new(format!("{}/hook", server.uri()), "ops");
        notifier.notify(&event(Some("prod-kr"))).await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no_service"))
            .mount(&server)
            .await;

        let notifier = SlackNotifier::new(server.uri(), "ops");
        let err = notifier.notify(&event(None)).await.unwrap_err();
        assert!(matches!(err, NotifyError::Status { status: 404, ref body } if body == "no_service"));
    }

    #[tokio::test]
    async fn empty_webhook_is_a_noop() {
        let notifier = SlackNotifier::new("", "ops");
        assert!(notifier.notify(&event(None)).await.is_ok());
    }
}
