use crate::e2e::helpers;

use helpers::fakes::{short_url_for, Call, Failures, TEST_BUCKET_URL};
use helpers::{audio_event, text_event, webhook_body, TestContext, TestOptions};
use line_speech_backend::domain::{
    reply::{ReplyMessage, SPEECH_FAILED_MESSAGE, TEXT_TOO_LONG_MESSAGE},
    speech::AudioFormat,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reply_with_audio_for_text_message(ctx: &TestContext) {
    let body = webhook_body(vec![text_event("tok1", "m1", "こんにちは")]);

    let response = ctx.post_signed(&body).await.unwrap();

    response.assert_webhook_ack();

    let long_url = format!("{}/m1.m4a", TEST_BUCKET_URL);
    assert_eq!(
        ctx.calls.all(),
        vec![
            Call::Synthesize {
                text: "こんにちは".to_string()
            },
            Call::Transcode {
                from: AudioFormat::Mp3,
                to: AudioFormat::M4a
            },
            Call::PutObject {
                key: "m1.m4a".to_string(),
                content_type: "audio/mp4".to_string(),
                size: "m4a:mp3:こんにちは".len(),
            },
            Call::Shorten {
                long_url: long_url.clone()
            },
            Call::Reply {
                reply_token: "tok1".to_string(),
                messages: vec![ReplyMessage::Audio {
                    original_content_url: short_url_for(&long_url),
                    duration: 830,
                }],
            },
        ]
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_text_over_200_characters(ctx: &TestContext) {
    let text = "あ".repeat(201);
    let body = webhook_body(vec![text_event("tok1", "m1", &text)]);

    ctx.post_signed(&body).await.unwrap().assert_webhook_ack();

    assert_eq!(
        ctx.calls.all(),
        vec![Call::Reply {
            reply_token: "tok1".to_string(),
            messages: vec![ReplyMessage::text(TEXT_TOO_LONG_MESSAGE)],
        }]
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_accept_text_of_exactly_200_characters(ctx: &TestContext) {
    let text = "a".repeat(200);
    let body = webhook_body(vec![text_event("tok1", "m1", &text)]);

    ctx.post_signed(&body).await.unwrap().assert_webhook_ack();

    let replies = ctx.calls.replies();
    assert_eq!(replies.len(), 1);
    match &replies[0].1[0] {
        ReplyMessage::Audio { duration, .. } => assert_eq!(*duration, 200 * 166),
        other => panic!("expected audio reply, got {:?}", other),
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_ignore_requests_with_invalid_signature(ctx: &TestContext) {
    let body = serde_json::to_vec(&webhook_body(vec![text_event("tok1", "m1", "hello")])).unwrap();

    let response = ctx
        .client
        .post_raw(
            "/webhook",
            body,
            &[("X-Line-Signature", "dGhpcyBpcyBub3QgdGhlIHNpZ25hdHVyZQ==")],
        )
        .await
        .unwrap();

    response.assert_webhook_ack();
    assert!(ctx.calls.all().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_ignore_requests_without_signature(ctx: &TestContext) {
    let body = serde_json::to_vec(&webhook_body(vec![text_event("tok1", "m1", "hello")])).unwrap();

    let response = ctx.client.post_raw("/webhook", body, &[]).await.unwrap();

    response.assert_webhook_ack();
    assert!(ctx.calls.all().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_ignore_body_modified_after_signing(ctx: &TestContext) {
    let original = serde_json::to_vec(&webhook_body(vec![text_event("tok1", "m1", "hello")])).unwrap();
    let signature = ctx.verifier.sign(&original).unwrap();
    let tampered =
        serde_json::to_vec(&webhook_body(vec![text_event("tok1", "m1", "goodbye")])).unwrap();

    let response = ctx
        .client
        .post_raw("/webhook", tampered, &[("X-Line-Signature", signature.as_str())])
        .await
        .unwrap();

    response.assert_webhook_ack();
    assert!(ctx.calls.all().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_drop_audio_messages_without_any_call(ctx: &TestContext) {
    let body = webhook_body(vec![audio_event("tok1", "m1")]);

    ctx.post_signed(&body).await.unwrap().assert_webhook_ack();

    assert!(ctx.calls.all().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_drop_unknown_message_types_and_non_message_events(ctx: &TestContext) {
    let body = webhook_body(vec![
        json!({
            "type": "message",
            "replyToken": "tok1",
            "message": {"id": "m1", "type": "sticker", "packageId": "1", "stickerId": "1"}
        }),
        json!({"type": "follow", "replyToken": "tok2"}),
        json!({"type": "unfollow"}),
    ]);

    ctx.post_signed(&body).await.unwrap().assert_webhook_ack();

    assert!(ctx.calls.all().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_treat_missing_events_as_zero_events(ctx: &TestContext) {
    ctx.post_signed(&json!({"destination": "U1"}))
        .await
        .unwrap()
        .assert_webhook_ack();

    assert!(ctx.calls.all().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_acknowledge_signed_non_json_body(ctx: &TestContext) {
    let body = b"definitely not json".to_vec();
    let signature = ctx.verifier.sign(&body).unwrap();

    let response = ctx
        .client
        .post_raw("/webhook", body, &[("X-Line-Signature", signature.as_str())])
        .await
        .unwrap();

    response.assert_webhook_ack();
    assert!(ctx.calls.all().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reply_once_per_text_event_in_order(ctx: &TestContext) {
    let body = webhook_body(vec![
        text_event("tok1", "m1", "おはよう"),
        audio_event("tok2", "m2"),
        text_event("tok3", "m3", &"x".repeat(250)),
        text_event("tok4", "m4", "こんばんは"),
    ]);

    ctx.post_signed(&body).await.unwrap().assert_webhook_ack();

    let replies = ctx.calls.replies();
    let tokens: Vec<&str> = replies.iter().map(|(token, _)| token.as_str()).collect();
    assert_eq!(tokens, vec!["tok1", "tok3", "tok4"]);

    assert_eq!(replies[0].1[0].kind(), "audio");
    assert_eq!(replies[1].1, vec![ReplyMessage::text(TEXT_TOO_LONG_MESSAGE)]);
    assert_eq!(replies[2].1[0].kind(), "audio");

    // Object keys are unique per message
    let keys: Vec<String> = ctx
        .calls
        .all()
        .into_iter()
        .filter_map(|call| match call {
            Call::PutObject { key, .. } => Some(key),
            _ => None,
        })
        .collect();
    assert_eq!(keys, vec!["m1.m4a".to_string(), "m4.m4a".to_string()]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reply_to_valid_events_next_to_a_malformed_one(ctx: &TestContext) {
    let body = webhook_body(vec![
        text_event("tok1", "m1", "こんにちは"),
        json!({
            "type": "message",
            "replyToken": "tok2",
            "message": {"type": "text", "text": "no id"}
        }),
        text_event("tok3", "m3", "さようなら"),
    ]);

    ctx.post_signed(&body).await.unwrap().assert_webhook_ack();

    let replies = ctx.calls.replies();
    let tokens: Vec<&str> = replies.iter().map(|(token, _)| token.as_str()).collect();
    assert_eq!(tokens, vec!["tok1", "tok3"]);
    assert!(replies.iter().all(|(_, messages)| messages[0].kind() == "audio"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_produce_same_reply_shape_on_redelivery(ctx: &TestContext) {
    let body = webhook_body(vec![text_event("tok1", "m1", "もう一度")]);

    ctx.post_signed(&body).await.unwrap().assert_webhook_ack();
    ctx.post_signed(&body).await.unwrap().assert_webhook_ack();

    let replies = ctx.calls.replies();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0], replies[1]);
}

async fn assert_generic_failure_reply(failures: Failures, expected_upstream_calls: usize) {
    let ctx = TestContext::with_failures(failures).await.unwrap();
    let body = webhook_body(vec![text_event("tok1", "m1", "テスト")]);

    ctx.post_signed(&body).await.unwrap().assert_webhook_ack();

    assert_eq!(
        ctx.calls.replies(),
        vec![(
            "tok1".to_string(),
            vec![ReplyMessage::text(SPEECH_FAILED_MESSAGE)]
        )]
    );
    assert_eq!(ctx.calls.count_upstream(), expected_upstream_calls);
}

#[tokio::test]
async fn it_should_send_failure_reply_when_synthesis_fails() {
    assert_generic_failure_reply(
        Failures {
            synthesize: true,
            ..Failures::default()
        },
        1,
    )
    .await;
}

#[tokio::test]
async fn it_should_send_failure_reply_when_transcoding_fails() {
    assert_generic_failure_reply(
        Failures {
            transcode: true,
            ..Failures::default()
        },
        2,
    )
    .await;
}

#[tokio::test]
async fn it_should_not_upload_when_transcoder_returns_nothing() {
    assert_generic_failure_reply(
        Failures {
            transcode_empty: true,
            ..Failures::default()
        },
        2,
    )
    .await;
}

#[tokio::test]
async fn it_should_send_failure_reply_when_upload_fails() {
    assert_generic_failure_reply(
        Failures {
            put_object: true,
            ..Failures::default()
        },
        3,
    )
    .await;
}

#[tokio::test]
async fn it_should_send_failure_reply_when_shortening_fails() {
    assert_generic_failure_reply(
        Failures {
            shorten: true,
            ..Failures::default()
        },
        4,
    )
    .await;
}

#[tokio::test]
async fn it_should_send_failure_reply_when_pipeline_times_out() {
    let ctx = TestContext::with_options(TestOptions {
        failures: Failures {
            synthesize_delay: Some(Duration::from_millis(500)),
            ..Failures::default()
        },
        pipeline_timeout: Duration::from_millis(50),
        ..TestOptions::default()
    })
    .await
    .unwrap();
    let body = webhook_body(vec![text_event("tok1", "m1", "遅い")]);

    ctx.post_signed(&body).await.unwrap().assert_webhook_ack();

    assert_eq!(
        ctx.calls.replies(),
        vec![(
            "tok1".to_string(),
            vec![ReplyMessage::text(SPEECH_FAILED_MESSAGE)]
        )]
    );
    // Nothing past synthesis ran
    assert_eq!(ctx.calls.count_upstream(), 1);
}

#[tokio::test]
async fn it_should_keep_processing_events_after_reply_delivery_fails() {
    let ctx = TestContext::with_failures(Failures {
        reply: true,
        ..Failures::default()
    })
    .await
    .unwrap();
    let body = webhook_body(vec![
        text_event("tok1", "m1", "一つ目"),
        text_event("tok2", "m2", "二つ目"),
    ]);

    ctx.post_signed(&body).await.unwrap().assert_webhook_ack();

    // One attempt per event, no retries
    let tokens: Vec<String> = ctx.calls.replies().into_iter().map(|(t, _)| t).collect();
    assert_eq!(tokens, vec!["tok1".to_string(), "tok2".to_string()]);
}

#[tokio::test]
async fn it_should_process_events_in_background_when_async_enabled() {
    let ctx = TestContext::with_options(TestOptions {
        async_processing: true,
        ..TestOptions::default()
    })
    .await
    .unwrap();
    let body = webhook_body(vec![
        text_event("tok1", "m1", "非同期"),
        text_event("tok2", "m2", "処理"),
    ]);

    ctx.post_signed(&body).await.unwrap().assert_webhook_ack();
    ctx.wait_for_replies(2).await;

    let replies = ctx.calls.replies();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0].0, "tok1");
    assert_eq!(replies[1].0, "tok2");
}
