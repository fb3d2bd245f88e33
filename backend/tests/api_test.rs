use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use common::model::signature::SignatureRecord;
use common::notifications::{Notification, NotificationLevel};
use common::requests::{PreviewResponse, RenderResponse};
use image::{Rgba, RgbaImage};
use serde_json::{json, Value};
use signature_backend::config::Config;
use signature_backend::lifecycle::InMemoryRepository;
use signature_backend::notifications::{start_notification_updater, NotificationsState};
use signature_backend::render::embedded::encode_png;
use signature_backend::render::FontLibrary;
use signature_backend::services::AppState;
use std::sync::Arc;
use std::time::Duration;

const BOUNDARY: &str = "signature-test-boundary";

fn state(max_upload_bytes: usize) -> (web::Data<AppState>, NotificationsState) {
    let config = Config {
        max_upload_bytes,
        ..Config::default()
    };
    let fonts = FontLibrary::load_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/fonts")).unwrap();
    let (notifications, rx) = NotificationsState::new();
    actix_web::rt::spawn(start_notification_updater(notifications.clone(), rx));

    let state = web::Data::new(signature_backend::build_state(
        &config,
        Arc::new(InMemoryRepository::new()),
        Arc::new(fonts),
        notifications.notifier(),
    ));
    (state, notifications)
}

/// Builds the service with an upload limit and returns it with the
/// notification state it reports to.
macro_rules! app {
    ($max_upload_bytes:expr) => {{
        let (state, notifications) = state($max_upload_bytes);
        let service = test::init_service(
            App::new()
                .app_data(web::JsonConfig::default().limit($max_upload_bytes))
                .app_data(state)
                .app_data(web::Data::new(notifications.clone()))
                .configure(signature_backend::configure),
        )
        .await;
        (service, notifications)
    }};
}

fn typed_body(name: &str) -> Value {
    json!({
        "name": name,
        "text": "Ada Lovelace",
        "font": "DejaVu Sans",
        "color": "#1a1a1a",
        "size": 42.0,
        "style": { "bold": false, "italic": true },
    })
}

fn multipart(name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\n{name}\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: {content_type}\r\n\r\n",
            b = BOUNDARY,
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/signatures/upload")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(body)
}

fn small_png() -> Vec<u8> {
    let mut raster = RgbaImage::new(40, 20);
    for x in 5..35 {
        raster.put_pixel(x, 10, Rgba([0, 0, 0, 255]));
    }
    encode_png(&raster).unwrap()
}

#[actix_web::test]
async fn typed_signature_round_trip() {
    let (app, _) = app!(1024 * 1024);

    let req = test::TestRequest::post()
        .uri("/api/signatures/typed")
        .set_json(typed_body("Work"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: SignatureRecord = test::read_body_json(resp).await;
    assert!(created.image.starts_with("data:image/png;base64,"));

    let req = test::TestRequest::get().uri("/api/signatures").to_request();
    let listed: Vec<SignatureRecord> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed, vec![created.clone()]);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/signatures/{}", created.id))
        .set_json(json!({ "name": "Personal", "color": "#aa0000" }))
        .to_request();
    let updated: SignatureRecord = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated.name, "Personal");
    assert_ne!(updated.image, created.image);
    assert_eq!(updated.kind.typed().unwrap().color, "#aa0000");
}

#[actix_web::test]
async fn live_render_reports_blank_text() {
    let (app, _) = app!(1024 * 1024);

    let mut body = typed_body("unused");
    body["text"] = json!("   ");
    let req = test::TestRequest::post()
        .uri("/api/signatures/typed/render")
        .set_json(body)
        .to_request();
    let rendered: RenderResponse = test::call_and_read_body_json(&app, req).await;
    assert!(!rendered.complete);
    assert!(rendered.image.is_empty());

    let mut body = typed_body("unused");
    body["font"] = json!("Comic Sans");
    let req = test::TestRequest::post()
        .uri("/api/signatures/typed/render")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn quota_header_limits_creation() {
    let (app, _) = app!(1024 * 1024);

    for (name, expected) in [("A", StatusCode::CREATED), ("B", StatusCode::CONFLICT)] {
        let req = test::TestRequest::post()
            .uri("/api/signatures/typed")
            .insert_header(("X-User-Id", "quota-user"))
            .insert_header(("X-User-Quota", "1"))
            .set_json(typed_body(name))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected);
    }

    let req = test::TestRequest::get()
        .uri("/api/signatures")
        .insert_header(("X-User-Id", "quota-user"))
        .to_request();
    let listed: Vec<SignatureRecord> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/signatures")
        .insert_header(("X-User-Role", "emperor"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn drawn_signatures_get_three_previews() {
    let (app, _) = app!(1024 * 1024);

    let req = test::TestRequest::post()
        .uri("/api/signatures/drawn")
        .set_json(json!({
            "name": "Scribble",
            "strokes": [[{ "x": 20.0, "y": 100.0 }, { "x": 300.0, "y": 80.0 }]],
            "isDefault": true,
        }))
        .to_request();
    let created: SignatureRecord = test::call_and_read_body_json(&app, req).await;
    assert!(created.is_default);

    let req = test::TestRequest::get()
        .uri(&format!("/api/signatures/{}/previews", created.id))
        .to_request();
    let previews: Vec<PreviewResponse> = test::call_and_read_body_json(&app, req).await;
    let scales: Vec<f32> = previews.iter().map(|p| p.scale).collect();
    assert_eq!(scales, vec![0.5, 0.75, 1.0]);

    let req = test::TestRequest::get()
        .uri(&format!("/api/signatures/{}/preview?scale=5", created.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation");
}

#[actix_web::test]
async fn long_drawn_recordings_are_accepted() {
    let (app, _) = app!(1024 * 1024);

    let strokes: Vec<Value> = (0..3000)
        .map(|i| json!([{ "x": (i % 500) as f32, "y": (i / 500 * 30) as f32 }]))
        .collect();
    let req = test::TestRequest::post()
        .uri("/api/signatures/drawn")
        .set_json(json!({ "name": "Dots", "strokes": strokes }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: SignatureRecord = test::read_body_json(resp).await;
    assert!(created.image.starts_with("data:image/png;base64,"));
}

#[actix_web::test]
async fn upload_and_download() {
    let (app, _) = app!(64 * 1024);
    let png = small_png();

    let req = upload_request(multipart("Scan", "scan.png", "image/png", &png)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: SignatureRecord = test::read_body_json(resp).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/signatures/{}/download", created.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap();
    assert_eq!(disposition.to_str().unwrap(), "attachment; filename=\"Scan.png\"");
    let etag = resp.headers().get(header::ETAG).unwrap().clone();
    let bytes = test::read_body(resp).await;
    assert_eq!(bytes.as_ref(), png.as_slice());

    let req = test::TestRequest::get()
        .uri(&format!("/api/signatures/{}/download", created.id))
        .insert_header((header::IF_NONE_MATCH, etag))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
}

#[actix_web::test]
async fn uploads_are_validated() {
    let (app, _) = app!(1024);

    let req = upload_request(multipart("Doc", "doc.pdf", "application/pdf", b"%PDF-1.7")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let svg = b"<svg xmlns='http://www.w3.org/2000/svg'/>";
    let req = upload_request(multipart("Vector", "sig.svg", "image/svg+xml", svg)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains("unsupported file type"));

    let req = upload_request(multipart("Big", "big.png", "image/png", &vec![7u8; 4096])).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains("limit"));

    let req = test::TestRequest::get().uri("/api/signatures").to_request();
    let listed: Vec<SignatureRecord> = test::call_and_read_body_json(&app, req).await;
    assert!(listed.is_empty());
}

#[actix_web::test]
async fn unknown_ids_are_404() {
    let (app, _) = app!(1024);
    for req in [
        test::TestRequest::get().uri("/api/signatures/missing"),
        test::TestRequest::delete().uri("/api/signatures/missing"),
        test::TestRequest::post().uri("/api/signatures/missing/default"),
        test::TestRequest::post().uri("/api/signatures/missing/used"),
        test::TestRequest::get().uri("/api/signatures/missing/download"),
    ] {
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

#[actix_web::test]
async fn notifications_are_drained_per_user() {
    let (app, notifications) = app!(1024 * 1024);

    let req = test::TestRequest::post()
        .uri("/api/signatures/typed")
        .insert_header(("X-User-Id", "ada"))
        .set_json(typed_body(""))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Wait for the updater task to apply the queued failure.
    for _ in 0..50 {
        if !notifications.feeds.read().await.is_empty() {
            break;
        }
        actix_web::rt::time::sleep(Duration::from_millis(10)).await;
    }

    let req = test::TestRequest::get()
        .uri("/api/notifications")
        .insert_header(("X-User-Id", "ada"))
        .to_request();
    let feed: Vec<Notification> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].level, NotificationLevel::Error);

    let req = test::TestRequest::get()
        .uri("/api/notifications")
        .insert_header(("X-User-Id", "ada"))
        .to_request();
    let feed: Vec<Notification> = test::call_and_read_body_json(&app, req).await;
    assert!(feed.is_empty());
}
