//! Gmail client tests against a local mock of the REST API.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use chrono::{TimeZone, Utc};
use mail_finder::matcher::LabeledValueMatcher;
use mail_finder::{
    Error, FinderConfig, GmailClient, GmailConfig, MailClient, MessageFinder, SearchCriteria,
};
use mockito::{Matcher, Server};
use serde_json::json;

fn client_for(server: &Server) -> GmailClient {
    let config = GmailConfig::builder()
        .access_token("test-token")
        .api_base_url(server.url())
        .build()
        .expect("valid config");
    GmailClient::new(config).expect("client builds")
}

#[tokio::test]
async fn test_list_recent_sends_window_and_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/gmail/v1/users/me/messages")
        .match_query(Matcher::UrlEncoded("maxResults".into(), "10".into()))
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "messages": [
                    {"id": "m2", "threadId": "t2"},
                    {"id": "m1", "threadId": "t1"}
                ],
                "resultSizeEstimate": 2
            })
            .to_string(),
        )
        .create_async()
        .await;

    let summaries = client_for(&server).list_recent(10).await.unwrap();

    let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["m2", "m1"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_recent_empty_mailbox() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/gmail/v1/users/me/messages")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"resultSizeEstimate": 0}"#)
        .create_async()
        .await;

    let summaries = client_for(&server).list_recent(5).await.unwrap();
    assert!(summaries.is_empty());
}

#[tokio::test]
async fn test_list_recent_follows_page_token() {
    let mut server = Server::new_async().await;
    let first_page: Vec<_> = (0..500).map(|n| json!({"id": format!("m{n}")})).collect();
    let first = server
        .mock("GET", "/gmail/v1/users/me/messages")
        .match_query(Matcher::UrlEncoded("maxResults".into(), "500".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"messages": first_page, "nextPageToken": "page-2"}).to_string())
        .create_async()
        .await;
    let second = server
        .mock("GET", "/gmail/v1/users/me/messages")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("maxResults".into(), "3".into()),
            Matcher::UrlEncoded("pageToken".into(), "page-2".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "messages": [{"id": "m500"}, {"id": "m501"}, {"id": "m502"}],
                "nextPageToken": "page-3"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let summaries = client_for(&server).list_recent(503).await.unwrap();

    assert_eq!(summaries.len(), 503);
    assert_eq!(summaries[0].id, "m0");
    assert_eq!(summaries[502].id, "m502");
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_list_recent_stops_without_page_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/gmail/v1/users/me/messages")
        .match_query(Matcher::UrlEncoded("maxResults".into(), "600".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"messages": [{"id": "m1"}]}).to_string())
        .expect(0)
        .create_async()
        .await;
    let page = server
        .mock("GET", "/gmail/v1/users/me/messages")
        .match_query(Matcher::UrlEncoded("maxResults".into(), "500".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"messages": [{"id": "m1"}, {"id": "m2"}]}).to_string())
        .create_async()
        .await;

    let summaries = client_for(&server).list_recent(600).await.unwrap();

    assert_eq!(summaries.len(), 2);
    page.assert_async().await;
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_metadata_maps_headers() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/gmail/v1/users/me/messages/m1")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("format".into(), "metadata".into()),
            Matcher::UrlEncoded("metadataHeaders".into(), "From".into()),
            Matcher::UrlEncoded("metadataHeaders".into(), "Date".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "m1",
                "threadId": "t1",
                "payload": {
                    "headers": [
                        {"name": "From", "value": "Example <noreply@example.com>"},
                        {"name": "Date", "value": "Tue, 15 Oct 2024 10:00:00 +0000"}
                    ]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let metadata = client_for(&server).get_metadata("m1").await.unwrap();

    assert_eq!(metadata.id, "m1");
    assert_eq!(metadata.header("From"), Some("Example <noreply@example.com>"));
    assert_eq!(metadata.header("Date"), Some("Tue, 15 Oct 2024 10:00:00 +0000"));
}

#[tokio::test]
async fn test_api_error_is_surfaced() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/gmail/v1/users/me/messages")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"code": 401, "message": "Invalid Credentials"}}"#)
        .create_async()
        .await;

    let err = client_for(&server).list_recent(5).await.unwrap_err();

    match &err {
        Error::Api {
            operation,
            status,
            body,
        } => {
            assert_eq!(*operation, "list_recent");
            assert_eq!(*status, 401);
            assert!(body.contains("Invalid Credentials"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_find_and_extract_through_gmail() {
    let mut server = Server::new_async().await;

    let _list = server
        .mock("GET", "/gmail/v1/users/me/messages")
        .match_query(Matcher::UrlEncoded("maxResults".into(), "5".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"messages": [{"id": "m2"}, {"id": "m1"}]}).to_string())
        .create_async()
        .await;

    let _meta_m2 = server
        .mock("GET", "/gmail/v1/users/me/messages/m2")
        .match_query(Matcher::UrlEncoded("format".into(), "metadata".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "m2",
                "payload": {"headers": [
                    {"name": "From", "value": "Newsletter <news@example.com>"},
                    {"name": "Date", "value": "Tue, 15 Oct 2024 10:05:00 +0000"}
                ]}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let _meta_m1 = server
        .mock("GET", "/gmail/v1/users/me/messages/m1")
        .match_query(Matcher::UrlEncoded("format".into(), "metadata".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "m1",
                "payload": {"headers": [
                    {"name": "From", "value": "Example <noreply@example.com>"},
                    {"name": "Date", "value": "Tue, 15 Oct 2024 10:00:00 +0000 (UTC)"}
                ]}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let plain = "Hello\r\nSign In ( https://app.example.com/l?t=1 )\r\n";
    let html = "\r\n<p>Hi</p>";
    let full = server
        .mock("GET", "/gmail/v1/users/me/messages/m1")
        .match_query(Matcher::UrlEncoded("format".into(), "full".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "m1",
                "payload": {
                    "mimeType": "multipart/alternative",
                    "body": {"size": 0},
                    "parts": [
                        {"mimeType": "text/plain", "body": {"size": plain.len(), "data": URL_SAFE.encode(plain)}},
                        {"mimeType": "text/html", "body": {"size": html.len(), "data": URL_SAFE.encode(html)}}
                    ]
                }
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let finder = MessageFinder::new(client_for(&server), FinderConfig::default());
    let criteria = SearchCriteria::new(
        "Example <noreply@example.com>",
        Utc.with_ymd_and_hms(2024, 10, 15, 9, 0, 0).unwrap(),
    );

    let link = finder
        .find_and_extract(&criteria, &LabeledValueMatcher::new("Sign In"))
        .await
        .unwrap();

    assert_eq!(link, "https://app.example.com/l?t=1");
    full.assert_async().await;
}

#[tokio::test]
async fn test_fetch_text_multipart_alternative_with_padded_parts() {
    let mut server = Server::new_async().await;
    let _full = server
        .mock("GET", "/gmail/v1/users/me/messages/m7")
        .match_query(Matcher::UrlEncoded("format".into(), "full".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "m7",
                "threadId": "t7",
                "payload": {
                    "partId": "",
                    "mimeType": "multipart/alternative",
                    "headers": [
                        {"name": "Content-Type", "value": "multipart/alternative; boundary=\"000000000000abcdef\""}
                    ],
                    "body": {"size": 0},
                    "parts": [
                        {
                            "partId": "0",
                            "mimeType": "text/plain",
                            "headers": [{"name": "Content-Type", "value": "text/plain; charset=\"UTF-8\""}],
                            "body": {"size": 49, "data": "SGksDQpTaWduIEluICggaHR0cHM6Ly9hcHAuZXhhbXBsZS5jb20vbD90PTQyICkNCg=="}
                        },
                        {
                            "partId": "1",
                            "mimeType": "text/html",
                            "headers": [{"name": "Content-Type", "value": "text/html; charset=\"UTF-8\""}],
                            "body": {"size": 37, "data": "PGRpdiBkaXI9Imx0ciI-SGksPGJyPlNpZ24gSW48L2Rpdj4NCg=="}
                        }
                    ]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let finder = MessageFinder::new(client_for(&server), FinderConfig::default());

    let text = finder.fetch_text("m7").await.unwrap();

    assert_eq!(
        text,
        "Hi,\r\nSign In ( https://app.example.com/l?t=42 )\r\n\
         <div dir=\"ltr\">Hi,<br>Sign In</div>\r\n"
    );
}
