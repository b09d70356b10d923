use std::time::Duration;

use serde_json::json;
use wiremock::{
    matchers::{any, header_exists, method, path},
    Mock, ResponseTemplate,
};

use crate::helpers::{spawn_app, spawn_app_with, TEST_RECIPIENT, TEST_SENDER};

fn valid_inquiry() -> serde_json::Value {
    json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "message": "Interested in boarding"
    })
}

#[tokio::test]
async fn contact_relays_a_valid_inquiry_and_returns_200() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(path("/emails"))
        .and(method("POST"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "re_123" })))
        .expect(1)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app.post_contact(&valid_inquiry()).await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn the_relayed_email_carries_the_inquiry() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    // Act
    app.post_contact(&valid_inquiry()).await;

    // Assert
    let emails = app.sent_emails().await;
    assert_eq!(emails.len(), 1);
    let email = &emails[0];

    assert_eq!(email["from"], TEST_SENDER);
    assert_eq!(email["to"], json!([TEST_RECIPIENT]));
    assert_eq!(email["reply_to"], "jane@example.com");

    let subject = email["subject"].as_str().unwrap();
    assert!(subject.contains("Jane Doe"));

    for body in [email["text"].as_str().unwrap(), email["html"].as_str().unwrap()] {
        assert!(body.contains("jane@example.com"));
        assert!(body.contains("Interested in boarding"));
    }
}

#[tokio::test]
async fn contact_returns_400_when_fields_are_missing_or_empty() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let test_cases = vec![
        (json!({"email": "jane@example.com", "message": "Hi"}), "missing the name"),
        (json!({"name": "Jane", "message": "Hi"}), "missing the email"),
        (json!({"name": "Jane", "email": "jane@example.com"}), "missing the message"),
        (json!({"name": "", "email": "jane@example.com", "message": "Hi"}), "empty name"),
        (json!({"name": "Jane", "email": "", "message": "Hi"}), "empty email"),
        (json!({"name": "Jane", "email": "jane@example.com", "message": ""}), "empty message"),
        (json!({}), "an empty object"),
    ];

    for (body, description) in test_cases {
        // Act
        let response = app.post_contact(&body).await;

        // Assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}",
            description
        );
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Missing fields" }));
    }
}

#[tokio::test]
async fn unparsable_bodies_are_treated_as_empty() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    for body in ["", "{not json", "[\"Jane\", \"jane@example.com\", \"Hi\"]"] {
        // Act
        let response = app.post_contact_raw(body).await;

        // Assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the body was {:?}",
            body
        );
    }
}

#[tokio::test]
async fn contact_accepts_a_body_without_a_json_content_type() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    // Act
    let response = reqwest::Client::new()
        .post(&format!("{}/api/contact", &app.address))
        .header("Content-Type", "text/plain")
        .body(valid_inquiry().to_string())
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn non_post_methods_return_405() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let url = format!("{}/api/contact", &app.address);
    let requests = vec![
        client.get(&url),
        client.put(&url).json(&valid_inquiry()),
        client.delete(&url),
        client.patch(&url).json(&valid_inquiry()),
    ];

    for request in requests {
        // Act
        let response = request.send().await.expect("Failed to execute request.");

        // Assert
        assert_eq!(405, response.status().as_u16());
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Method not allowed" }));
    }
}

#[tokio::test]
async fn contact_returns_500_without_leaking_a_provider_error() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "statusCode": 403,
            "name": "validation_error",
            "message": "You can only send testing emails to your own address"
        })))
        .expect(1)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app.post_contact(&valid_inquiry()).await;

    // Assert
    assert_eq!(500, response.status().as_u16());
    let body = response.text().await.unwrap();
    assert!(!body.contains("testing emails"));
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, json!({ "error": "Email failed to send" }));
}

#[tokio::test]
async fn contact_returns_500_when_a_success_body_reports_an_error() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "error": { "name": "application_error", "message": "Something went wrong" }
        })))
        .expect(1)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app.post_contact(&valid_inquiry()).await;

    // Assert
    assert_eq!(500, response.status().as_u16());
}

#[tokio::test]
async fn contact_returns_502_when_the_provider_times_out() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .expect(1)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app.post_contact(&valid_inquiry()).await;

    // Assert
    assert_eq!(502, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Email provider timed out" }));
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.post_contact(&json!({})).await;

    // Assert
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn contact_returns_500_when_the_provider_is_unreachable() {
    // Arrange
    // Bind then release a port so nothing is listening on it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let unreachable = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());
    drop(listener);
    let app = spawn_app_with(|c| c.email_client.base_url = unreachable).await;

    // Act
    let response = app.post_contact(&valid_inquiry()).await;

    // Assert
    assert_eq!(500, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Server error" }));
}

#[tokio::test]
async fn contact_returns_413_when_the_body_is_too_large() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let inquiry = json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "message": "a".repeat(3 * 1024 * 1024)
    });

    // Act
    let response = app.post_contact(&inquiry).await;

    // Assert
    assert_eq!(413, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Payload too large" }));
}
