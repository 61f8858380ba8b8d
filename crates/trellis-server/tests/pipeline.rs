//! End-to-end request handling over an in-process app.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::{stream, StreamExt};
use http::header::{CONTENT_TYPE, LOCATION};
use http::StatusCode;
use serde_json::json;
use trellis_core::{Mode, Request};
use trellis_data::{decode, LoadResult, LoaderResultSet, PageMeta};
use trellis_executor::{component_fn, loader_fn, ComponentProps, PageModule};
use trellis_server::{extract_embedded, App, Body, RouterContext, Renderer, DATA_GLOBAL};
use trellis_streaming::{byte_stream, ByteStream, EmptyBodyPolicy};

const TEMPLATE: &str = "<html><head><!--meta:outlet--></head><body><div id=\"app\"><!--ssr:outlet--></div></body></html>";

fn layout() -> PageModule {
    PageModule::new().with_component(component_fn(|props: ComponentProps<'_>| {
        Ok(format!("<main>{}</main>", props.children.unwrap_or_default()))
    }))
}

fn user_page() -> PageModule {
    PageModule::new()
        .with_component(component_fn(|props: ComponentProps<'_>| {
            Ok(format!("<h1>User {}</h1>", props.params["id"]))
        }))
        .with_loader(loader_fn(|_req, params| async move {
            Ok(LoadResult::props(json!({ "id": params["id"] }))
                .with_meta(PageMeta::new(format!("User {}", params["id"]))))
        }))
}

async fn users_app(mode: Mode) -> App {
    App::builder()
        .mode(mode)
        .template_html(TEMPLATE)
        .route("index.rs", layout())
        .route("users/[id].rs", user_page())
        .build()
        .await
        .unwrap()
}

async fn body_text(body: Body) -> String {
    body.into_string().await.unwrap()
}

#[tokio::test]
async fn test_users_scenario_html_and_data_agree() {
    let app = users_app(Mode::Development).await;

    let html = app.handle(Request::get("http://localhost/users/42").unwrap()).await;
    assert_eq!(html.status(), StatusCode::OK);
    assert_eq!(html.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
    let document = body_text(html.into_body()).await;

    assert!(document.contains("<title>User 42</title>"));
    assert!(document.contains("</script><main><h1>User 42</h1></main></div>"));

    let embedded = extract_embedded(&document, DATA_GLOBAL).unwrap();
    let set = decode::<LoaderResultSet>(embedded).unwrap().unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.get(0), Some(&LoadResult::empty()));

    let data = app.handle(Request::get("http://localhost/users/42?.get=").unwrap()).await;
    assert_eq!(data.status(), StatusCode::OK);
    assert_eq!(data.headers()[CONTENT_TYPE], "application/json");
    let from_endpoint = decode::<LoadResult>(&body_text(data.into_body()).await).unwrap().unwrap();

    assert_eq!(Some(&from_endpoint), set.last());
    assert_eq!(from_endpoint.props_value(), Some(&json!({ "id": "42" })));
}

#[tokio::test]
async fn test_data_endpoint_keeps_other_query_params() {
    let app = App::builder()
        .template_html(TEMPLATE)
        .route(
            "a/b.rs",
            PageModule::new().with_loader(loader_fn(|req, _params| async move {
                Ok(LoadResult::props(json!({ "x": req.query("x") })))
            })),
        )
        .build()
        .await
        .unwrap();

    let response = app.handle(Request::get("http://localhost/a/b?x=1&.get=").unwrap()).await;
    let result = decode::<LoadResult>(&body_text(response.into_body()).await).unwrap().unwrap();
    assert_eq!(result.props_value(), Some(&json!({ "x": "1" })));
}

#[tokio::test]
async fn test_outer_redirect_wins_over_inner_props() {
    let inner_ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&inner_ran);

    let app = App::builder()
        .template_html(TEMPLATE)
        .route(
            "account.rs",
            PageModule::new().with_loader(loader_fn(|_req, _params| async move {
                Ok(LoadResult::redirect("/login"))
            })),
        )
        .route(
            "account/settings.rs",
            PageModule::new().with_loader(loader_fn(move |_req, _params| {
                let flag = Arc::clone(&flag);
                async move {
                    flag.store(true, Ordering::SeqCst);
                    Ok(LoadResult::props(json!({ "secret": true })))
                }
            })),
        )
        .build()
        .await
        .unwrap();

    for url in ["http://localhost/account/settings", "http://localhost/account/settings?.get="] {
        let response = app.handle(Request::get(url).unwrap()).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/login");
        assert!(body_text(response.into_body()).await.is_empty());
    }
    assert!(inner_ran.load(Ordering::SeqCst));
}

struct Chunks(Vec<&'static str>);

impl Renderer for Chunks {
    fn render(&self, _context: Arc<RouterContext>, _modules: Vec<Arc<PageModule>>) -> ByteStream {
        let chunks: Vec<_> = self.0.iter().map(|c| Ok(c.as_bytes().to_vec())).collect();
        byte_stream(stream::iter(chunks))
    }
}

#[tokio::test]
async fn test_stream_emits_prefix_chunks_suffix_in_order() {
    let app = App::builder()
        .template_html("prefix<!--meta:outlet--><!--ssr:outlet--><!--ssr:data-->suffix")
        .renderer(Chunks(vec!["<div>", "A", "</div>"]))
        .route("index.rs", PageModule::new())
        .build()
        .await
        .unwrap();

    let response = app.handle(Request::get("http://localhost/").unwrap()).await;
    let Body::Stream(stream) = response.into_body() else {
        panic!("expected a streamed body");
    };
    let parts: Vec<String> = stream
        .map(|chunk| String::from_utf8(chunk.unwrap()).unwrap())
        .collect()
        .await;

    assert_eq!(parts.len(), 5);
    assert_eq!(parts[..4], ["prefix", "<div>", "A", "</div>"]);
    assert!(parts[4].starts_with("<script>window.__TRELLIS_DATA__="));
    assert!(parts[4].ends_with("</script>suffix"));
}

#[tokio::test]
async fn test_empty_body_policy() {
    for (policy, expect_empty) in [(EmptyBodyPolicy::Flush, false), (EmptyBodyPolicy::Withhold, true)] {
        let app = App::builder()
            .config(trellis_server::AppConfig::default().with_empty_body(policy))
            .template_html(TEMPLATE)
            .renderer(Chunks(vec![]))
            .route("index.rs", PageModule::new())
            .build()
            .await
            .unwrap();

        let response = app.handle(Request::get("http://localhost/").unwrap()).await;
        let text = body_text(response.into_body()).await;
        assert_eq!(text.is_empty(), expect_empty);
        if !expect_empty {
            assert!(text.ends_with("</div></body></html>"));
        }
    }
}

struct Failing;

impl Renderer for Failing {
    fn render(&self, _context: Arc<RouterContext>, _modules: Vec<Arc<PageModule>>) -> ByteStream {
        byte_stream(stream::iter(vec![Err(trellis_streaming::StreamError::render(
            trellis_data::WireError::new("RenderError", "exploded"),
        ))]))
    }
}

#[tokio::test]
async fn test_render_failure_before_first_write_is_500() {
    for (mode, expected) in [(Mode::Development, "exploded"), (Mode::Production, "INTERNAL SERVER ERROR")] {
        let app = App::builder()
            .mode(mode)
            .template_html(TEMPLATE)
            .renderer(Failing)
            .route("index.rs", PageModule::new())
            .build()
            .await
            .unwrap();

        let response = app.handle(Request::get("http://localhost/").unwrap()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response.into_body()).await.contains(expected));
    }
}

#[tokio::test]
async fn test_render_failure_after_first_write_ends_stream() {
    struct Late;

    impl Renderer for Late {
        fn render(&self, _context: Arc<RouterContext>, _modules: Vec<Arc<PageModule>>) -> ByteStream {
            byte_stream(stream::iter(vec![
                Ok(b"<p>".to_vec()),
                Err(trellis_streaming::StreamError::render(trellis_data::WireError::new(
                    "RenderError",
                    "late",
                ))),
            ]))
        }
    }

    let app = App::builder()
        .template_html(TEMPLATE)
        .renderer(Late)
        .route("index.rs", PageModule::new())
        .build()
        .await
        .unwrap();

    let response = app.handle(Request::get("http://localhost/").unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.into_body().into_bytes().await.is_err());
}

#[tokio::test]
async fn test_http_request_without_host_is_rejected() {
    let app = users_app(Mode::Production).await;
    let request = http::Request::builder()
        .uri("/users/42")
        .body(stream::empty::<Result<Vec<u8>, std::io::Error>>())
        .unwrap();

    let response = app.handle_http(request, false).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_http_request_is_adapted() {
    let app = users_app(Mode::Development).await;
    let request = http::Request::builder()
        .uri("/users/7?.get=")
        .header("host", "shop.test")
        .header("x-forwarded-proto", "https")
        .body(stream::empty::<Result<Vec<u8>, std::io::Error>>())
        .unwrap();

    let response = app.handle_http(request, false).await;
    assert_eq!(response.status(), StatusCode::OK);
    let result = decode::<LoadResult>(&body_text(response.into_body()).await).unwrap().unwrap();
    assert_eq!(result.props_value(), Some(&json!({ "id": "7" })));
}

#[tokio::test]
async fn test_unmatched_path_is_not_found() {
    let app = users_app(Mode::Development).await;
    let response = app.handle(Request::get("http://localhost/users/42/extra?.get=").unwrap()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
