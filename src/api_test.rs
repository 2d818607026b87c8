// ============================================================================
// HTTP Layer Tests
//
// The router is served on an ephemeral port and exercised with a real
// client. Conversion success paths live in the bridge tests; here only the
// routes and status mapping are covered.
// ============================================================================

use tokio::net::TcpListener;

use super::router;

async fn start_test_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router()).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_index_route() {
    let base = start_test_server().await;
    let resp = reqwest::get(&base).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.text().await.unwrap().contains("vid2gif"));
}

#[tokio::test]
async fn test_missing_video_parameter_is_bad_request() {
    let base = start_test_server().await;
    let resp = reqwest::get(format!("{}/gif", base)).await.unwrap();
    assert_eq!(resp.status(), 400);
    assert!(resp.text().await.unwrap().contains("video"));
}

#[tokio::test]
async fn test_empty_video_parameter_is_bad_request() {
    let base = start_test_server().await;
    let resp = reqwest::get(format!("{}/gif?video=", base)).await.unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_non_http_source_is_bad_request() {
    let base = start_test_server().await;
    let resp = reqwest::get(format!("{}/gif?video=ftp%3A%2F%2Fhost%2Fa.mp4", base))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let base = start_test_server().await;
    // port 1 is never listening
    let resp = reqwest::get(format!(
        "{}/gif?video=http%3A%2F%2F127.0.0.1%3A1%2Fclip.mp4",
        base
    ))
    .await
    .unwrap();
    assert_eq!(resp.status(), 502);
}

#[tokio::test]
async fn test_upstream_404_is_bad_gateway() {
    let base = start_test_server().await;
    // the test server itself 404s on unknown paths
    let source = format!("{}/no-such-clip.mp4", base);
    let encoded = source.replace(':', "%3A").replace('/', "%2F");
    let resp = reqwest::get(format!("{}/gif?video={}", base, encoded))
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
}
