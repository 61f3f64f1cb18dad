use std::{sync::Arc, time::Duration};

use bot::{
    BotConfig, BotErr, Handler,
    telegram::{Runner, TelegramClient},
};
use machine_learning::{Predictor, Table, Trainer, TrainingConfig};
use mockito::{Matcher, Server};
use serde_json::json;

const TOKEN: &str = "123:abc";

fn handler() -> Arc<Handler> {
    let table = Table::from_csv_str(
        "weight_kg,sex,bmr\n\
         60,F,1300\n\
         70,F,1400\n\
         80,M,1700\n\
         90,M,1800\n",
    )
    .unwrap();
    let config = TrainingConfig::default()
        .with_features(["weight_kg", "sex"])
        .with_targets(["bmr"])
        .with_n_estimators(5);

    let artifact = Trainer::new(config).train(table).unwrap().artifact;
    Arc::new(Handler::new(Predictor::new(artifact)))
}

fn client(server: &Server) -> Arc<TelegramClient> {
    let config = BotConfig {
        token: TOKEN.to_string(),
        api_url: server.url(),
        poll_timeout: Duration::ZERO,
    };
    Arc::new(TelegramClient::new(&config).unwrap())
}

fn message(update_id: i64, chat_id: i64, text: &str) -> serde_json::Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "date": 0,
            "chat": {"id": chat_id, "type": "private"},
            "text": text
        }
    })
}

#[tokio::test]
async fn poll_answers_text_messages_and_advances_the_offset() {
    let mut server = Server::new_async().await;
    let handler = handler();

    let updates = server
        .mock("POST", format!("/bot{TOKEN}/getUpdates").as_str())
        .match_body(Matcher::PartialJson(
            json!({"timeout": 0, "allowed_updates": ["message"]}),
        ))
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "ok": true,
                "result": [
                    message(10, 1, "/schema"),
                    {"update_id": 11},
                    message(12, 2, "/help"),
                ]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let schema_reply = server
        .mock("POST", format!("/bot{TOKEN}/sendMessage").as_str())
        .match_body(Matcher::PartialJson(
            json!({"chat_id": 1, "text": handler.schema()}),
        ))
        .with_header("content-type", "application/json")
        .with_body(json!({"ok": true, "result": {"message_id": 99, "chat": {"id": 1}}}).to_string())
        .expect(1)
        .create_async()
        .await;

    let ignored_reply = server
        .mock("POST", format!("/bot{TOKEN}/sendMessage").as_str())
        .match_body(Matcher::PartialJson(json!({"chat_id": 2})))
        .expect(0)
        .create_async()
        .await;

    let mut runner = Runner::new(client(&server), handler);
    let mut tasks = runner.poll().await.unwrap();
    while let Some(task) = tasks.join_next().await {
        task.unwrap();
    }

    assert_eq!(runner.offset(), Some(13));
    updates.assert_async().await;
    schema_reply.assert_async().await;
    ignored_reply.assert_async().await;
}

#[tokio::test]
async fn predictions_are_sent_back_to_the_chat() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", format!("/bot{TOKEN}/getUpdates").as_str())
        .with_header("content-type", "application/json")
        .with_body(json!({"ok": true, "result": [message(1, 5, "weight_kg=65 sex=f")]}).to_string())
        .create_async()
        .await;

    let reply = server
        .mock("POST", format!("/bot{TOKEN}/sendMessage").as_str())
        .match_body(Matcher::Regex(r#""text":"Prediction:\\nbmr = \d+\.\d{2}""#.to_string()))
        .with_header("content-type", "application/json")
        .with_body(json!({"ok": true, "result": {"message_id": 2, "chat": {"id": 5}}}).to_string())
        .expect(1)
        .create_async()
        .await;

    let mut runner = Runner::new(client(&server), handler());
    let mut tasks = runner.poll().await.unwrap();
    while let Some(task) = tasks.join_next().await {
        task.unwrap();
    }

    reply.assert_async().await;
}

#[tokio::test]
async fn failed_poll_keeps_the_offset() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", format!("/bot{TOKEN}/getUpdates").as_str())
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#)
        .create_async()
        .await;

    let mut runner = Runner::new(client(&server), handler());
    let err = runner.poll().await.unwrap_err();

    assert!(matches!(err, BotErr::Api { code: Some(401), .. }));
    assert_eq!(runner.offset(), None);
}

#[tokio::test]
async fn send_message_returns_the_sent_message() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", format!("/bot{TOKEN}/sendMessage").as_str())
        .match_body(Matcher::Json(json!({"chat_id": 3, "text": "hi"})))
        .with_header("content-type", "application/json")
        .with_body(
            json!({"ok": true, "result": {"message_id": 4, "chat": {"id": 3}, "text": "hi"}})
                .to_string(),
        )
        .create_async()
        .await;

    let sent = client(&server).send_message(3, "hi").await.unwrap();

    assert_eq!(sent.message_id, 4);
    assert_eq!(sent.chat.id, 3);
    assert_eq!(sent.text.as_deref(), Some("hi"));
    mock.assert_async().await;
}
