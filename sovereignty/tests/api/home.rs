use crate::helpers::spawn_app;

#[tokio::test]
async fn home_serves_the_contact_form() {
    let app = spawn_app().await;

    let response = reqwest::get(format!("{}/", app.address))
        .await
        .expect("failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let content_type = response
        .headers()
        .get("Content-Type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    assert_eq!(content_type.as_deref(), Some("text/html; charset=utf-8"));

    let html = response.text().await.unwrap();
    assert!(html.contains(r#"<form id="contact-form">"#));
    assert!(html.contains("/api/contact"));
}
