use httpmock::prelude::*;
use ticket_sniper::config::NotifyConfig;
use ticket_sniper::domain::ports::Notifier;
use ticket_sniper::{BotError, TelegramNotifier};

fn notify_config(base_url: String, token: Option<&str>, chat_id: Option<&str>) -> NotifyConfig {
    NotifyConfig {
        telegram_token: token.map(str::to_string),
        telegram_chat_id: chat_id.map(str::to_string),
        api_base: base_url,
        timeout_secs: 10,
    }
}

#[tokio::test]
async fn test_sends_plain_text_message() {
    let server = MockServer::start();
    let message = "Ticket found!\nTrain: Fadak\nPrice: 8500000 Rials\nPurchase link: https://www.raja.ir/checkout/1";

    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/bot123:ABC/sendMessage")
            .header("content-type", "application/json")
            .json_body(serde_json::json!({
                "chat_id": "987654",
                "text": message
            }));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"ok": true, "result": {"message_id": 7}}));
    });

    let notifier = TelegramNotifier::new(notify_config(
        server.base_url(),
        Some("123:ABC"),
        Some("987654"),
    ));

    assert!(notifier.is_configured());
    notifier.notify(message).await.unwrap();

    api_mock.assert();
}

#[tokio::test]
async fn test_missing_credentials_skip_notification() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST);
        then.status(200);
    });

    for (token, chat_id) in [(None, Some("1")), (Some("t"), None), (Some(""), Some("1"))] {
        let notifier = TelegramNotifier::new(notify_config(server.base_url(), token, chat_id));
        assert!(!notifier.is_configured());
        assert!(notifier.notify("hello").await.is_ok());
    }

    api_mock.assert_hits(0);
}

#[tokio::test]
async fn test_api_error_is_reported() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/botbad/sendMessage");
        then.status(401)
            .json_body(serde_json::json!({"ok": false, "description": "Unauthorized"}));
    });

    let notifier = TelegramNotifier::new(notify_config(server.base_url(), Some("bad"), Some("1")));
    let err = notifier.notify("hello").await.unwrap_err();

    api_mock.assert();
    match err {
        BotError::NotificationError { message } => {
            assert!(message.contains("401"));
            assert!(message.contains("Unauthorized"));
        }
        other => panic!("expected notification error, got {:?}", other),
    }
}
