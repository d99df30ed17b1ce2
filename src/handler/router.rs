//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: body limits, route matching, session
//! loading, bridge dispatch and access logging.

use std::convert::Infallible;
use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SERVER, SET_COOKIE};
use hyper::{Method, Request, Response};

use super::routes::{match_route, Route, RouteError};
use crate::bridge::Outcome;
use crate::config::AppState;
use crate::http::{self, FormData};
use crate::logger::{self, AccessLogEntry};
use crate::session::{new_session_id, SessionData, SessionStore};

/// Request details captured before the body is consumed
struct RequestInfo {
    method: Method,
    path: String,
    query: Option<String>,
    http_version: String,
    referer: Option<String>,
    user_agent: Option<String>,
    cookie: Option<String>,
}

impl RequestInfo {
    fn from_request<B>(req: &Request<B>) -> Self {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };
        Self {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(ToString::to_string),
            http_version: format!("{:?}", req.version())
                .trim_start_matches("HTTP/")
                .to_string(),
            referer: header("referer"),
            user_agent: header("user-agent"),
            cookie: header("cookie"),
        }
    }
}

/// Session resolved for one request
struct RequestSession {
    id: String,
    data: SessionData,
    is_new: bool,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let started = Instant::now();
    let info = RequestInfo::from_request(&req);

    let mut response = dispatch(req, &info, &state).await;

    if let Ok(value) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, value);
    }

    if state.config.logging.access_log {
        log_access(&info, &response, peer_addr, started, &state);
    }
    Ok(response)
}

async fn dispatch<B>(req: Request<B>, info: &RequestInfo, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let max_body_size = state.config.http.max_body_size;

    // 1. Check declared body size
    if let Some(resp) = check_body_size(&req, max_body_size) {
        return resp;
    }

    // 2. Match route
    let route = match match_route(&info.method, &info.path) {
        Ok(route) => route,
        Err(RouteError::NotFound) => return http::build_404_response(),
        Err(RouteError::MethodNotAllowed(allow)) => {
            logger::log_warning(&format!(
                "Method not allowed: {} {}",
                info.method, info.path
            ));
            return http::build_405_response(allow);
        }
    };

    // 3. Read form body where needed, capped whether or not a length was declared
    let form = if route.reads_form() {
        match read_form(req, max_body_size).await {
            Ok(form) => form,
            Err(resp) => return resp,
        }
    } else {
        FormData::default()
    };

    // 4. Run the operation against this browser's session
    let mut session = resolve_session(info, state);
    let mut response = run_route(route, &mut session.data, &form, state).await;

    if session.data.is_dirty() {
        if session.is_new {
            if let Ok(value) = HeaderValue::from_str(&state.cookie.set_cookie_header(&session.id)) {
                response.headers_mut().insert(SET_COOKIE, value);
            }
        }
        state.sessions.save(&session.id, session.data);
    }
    response
}

async fn read_form<B>(req: Request<B>, max_body_size: u64) -> Result<FormData, Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => Ok(FormData::parse(&collected.to_bytes())),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_error(&format!(
                "Request body too large: over {max_body_size} bytes"
            ));
            Err(http::build_413_response())
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Err(http::build_400_response())
        }
    }
}

async fn run_route(
    route: Route,
    session: &mut SessionData,
    form: &FormData,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let bridge = &state.bridge;
    let outcome = match route {
        Route::Health => return http::build_health_response("ok"),
        Route::Entry => bridge.show_entry(),
        Route::Generate => bridge.generate(session, form).await,
        Route::ViewQuiz => bridge.view_quiz(&*session),
        Route::Submit => bridge.submit(session, form).await,
        Route::Results => bridge.view_results(&*session),
        Route::QuizList => bridge.list().await,
        Route::TakeQuiz(id) => bridge.take_quiz(session, id).await,
        Route::Review(id) => bridge.review(id).await,
        Route::Delete(id) => bridge.delete(id).await,
    };
    into_response(outcome, state)
}

/// Existing session from the cookie, or a fresh unsaved one
fn resolve_session(info: &RequestInfo, state: &AppState) -> RequestSession {
    let existing = info
        .cookie
        .as_deref()
        .and_then(|header| http::find_cookie(header, state.cookie.name()))
        .and_then(|value| state.cookie.verify(&value))
        .and_then(|id| state.sessions.load(&id).map(|data| (id, data)));

    match existing {
        Some((id, data)) => RequestSession {
            id,
            data,
            is_new: false,
        },
        None => RequestSession {
            id: new_session_id(),
            data: SessionData::new(),
            is_new: true,
        },
    }
}

fn into_response(outcome: Outcome, state: &AppState) -> Response<Full<Bytes>> {
    match outcome {
        Outcome::Render(page) => match state.views.render(&page) {
            Ok(html) => http::build_html_response(html),
            Err(e) => {
                logger::log_error(&format!("Failed to render page: {e}"));
                http::build_500_response()
            }
        },
        Outcome::Redirect(target) => http::build_redirect_response(target),
        Outcome::Json { status, body } => http::build_json_response(status, &body),
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn log_access(
    info: &RequestInfo,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        info.method.to_string(),
        info.path.clone(),
    );
    entry.query.clone_from(&info.query);
    entry.http_version.clone_from(&info.http_version);
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer.clone_from(&info.referer);
    entry.user_agent.clone_from(&info.user_agent);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_support::spawn_backend;
    use crate::bridge::Page;
    use crate::config::Config;
    use crate::session::{Session, CURRENT_QUIZ};

    const QUIZ_JSON: &str = r#"{
        "id": 7,
        "topic": "History",
        "numberOfQuestions": 1,
        "questions": [
            {"id": 1, "questionText": "Who built the pyramids?",
             "answers": [{"id": 11, "answerText": "Egyptians"}]}
        ]
    }"#;

    fn state_with(edit: impl FnOnce(&mut Config)) -> Arc<AppState> {
        let mut config = Config::load_from("no-such-config-file").unwrap();
        config.logging.access_log = false;
        edit(&mut config);
        Arc::new(AppState::new(&config).unwrap())
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    fn request(method: Method, uri: &str, cookie: Option<&str>, body: &str) -> Request<Full<Bytes>> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header("Cookie", cookie);
        }
        builder.body(Full::new(Bytes::from(body.to_string()))).unwrap()
    }

    async fn send(state: &Arc<AppState>, req: Request<Full<Bytes>>) -> Response<Full<Bytes>> {
        handle_request(req, Arc::clone(state), peer()).await.unwrap()
    }

    async fn body_text(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn info(cookie: Option<String>) -> RequestInfo {
        RequestInfo {
            method: Method::GET,
            path: "/quiz".to_string(),
            query: None,
            http_version: "1.1".to_string(),
            referer: None,
            user_agent: None,
            cookie,
        }
    }

    #[tokio::test]
    async fn test_unknown_cookie_starts_new_session() {
        let state = state_with(|_| {});
        let session = resolve_session(&info(Some("quiz_session=forged.0000".to_string())), &state);
        assert!(session.is_new);
        assert_eq!(session.id.len(), 32);
    }

    #[tokio::test]
    async fn test_signed_cookie_resumes_saved_session() {
        let state = state_with(|_| {});
        let mut data = SessionData::new();
        data.set(CURRENT_QUIZ, serde_json::json!({"id": 4}));
        state.sessions.save("abc", data);

        let header = format!("theme=dark; quiz_session={}", state.cookie.sign("abc"));
        let session = resolve_session(&info(Some(header)), &state);
        assert!(!session.is_new);
        assert_eq!(session.id, "abc");
        assert_eq!(session.data.get(CURRENT_QUIZ).unwrap()["id"], 4);
    }

    #[tokio::test]
    async fn test_outcomes_become_responses() {
        let state = state_with(|_| {});

        let redirect = into_response(Outcome::Redirect("/quiz"), &state);
        assert_eq!(redirect.status(), 302);
        assert_eq!(redirect.headers()["Location"], "/quiz");

        let page = into_response(Outcome::Render(Page::Index { error: None }), &state);
        assert_eq!(page.status(), 200);
        assert_eq!(page.headers()["Content-Type"], "text/html; charset=utf-8");

        let json = into_response(
            Outcome::json_error(hyper::StatusCode::BAD_REQUEST, "No quiz found"),
            &state,
        );
        assert_eq!(json.status(), 400);
        assert_eq!(json.headers()["Content-Type"], "application/json");
    }

    #[tokio::test]
    async fn test_generate_then_follow_redirect_with_cookie() {
        let base = spawn_backend(200, QUIZ_JSON).await;
        let state = state_with(|c| c.backend.base_url = base);

        let generated = send(
            &state,
            request(Method::POST, "/", None, "topic=History&num_questions=1"),
        )
        .await;
        assert_eq!(generated.status(), 302);
        assert_eq!(generated.headers()["Location"], "/quiz");
        let set_cookie = generated.headers()[SET_COOKIE].to_str().unwrap();
        let cookie = set_cookie.split(';').next().unwrap().to_string();
        assert!(cookie.starts_with("quiz_session="));

        let quiz = send(&state, request(Method::GET, "/quiz", Some(&cookie), "")).await;
        assert_eq!(quiz.status(), 200);
        assert!(quiz.headers().get(SET_COOKIE).is_none());
        let html = body_text(quiz).await;
        assert!(html.contains("Who built the pyramids?"));
        assert!(html.contains(r#"name="question_1" value="11""#));
    }

    #[tokio::test]
    async fn test_quiz_without_cookie_redirects_home() {
        let state = state_with(|_| {});
        let response = send(&state, request(Method::GET, "/quiz", None, "")).await;
        assert_eq!(response.status(), 302);
        assert_eq!(response.headers()["Location"], "/");
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_clean_session_issues_no_cookie() {
        let state = state_with(|_| {});
        let response = send(&state, request(Method::GET, "/", None, "")).await;
        assert_eq!(response.status(), 200);
        assert!(response.headers().get(SET_COOKIE).is_none());
        assert_eq!(response.headers()[SERVER], "quiz-frontend");
    }

    #[tokio::test]
    async fn test_body_without_length_over_limit_is_rejected() {
        let state = state_with(|c| c.http.max_body_size = 16);
        let body = format!("topic={}&num_questions=5", "a".repeat(100));
        let req = request(Method::POST, "/", None, &body);
        assert!(req.headers().get("content-length").is_none());

        let response = send(&state, req).await;
        assert_eq!(response.status(), 413);
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_declared_length_over_limit_is_rejected() {
        let state = state_with(|c| c.http.max_body_size = 16);
        let mut req = request(Method::POST, "/", None, "topic=History&num_questions=5");
        req.headers_mut()
            .insert("content-length", HeaderValue::from_static("29"));
        let response = send(&state, req).await;
        assert_eq!(response.status(), 413);
    }

    #[tokio::test]
    async fn test_health_and_unknown_routes() {
        let state = state_with(|_| {});
        let health = send(&state, request(Method::GET, "/healthz", None, "")).await;
        assert_eq!(health.status(), 200);
        assert_eq!(body_text(health).await, "ok");

        let missing = send(&state, request(Method::GET, "/nope", None, "")).await;
        assert_eq!(missing.status(), 404);

        let wrong = send(&state, request(Method::PUT, "/results", None, "")).await;
        assert_eq!(wrong.status(), 405);
        assert_eq!(wrong.headers()["Allow"], "GET");
    }
}
