//! HTTP client behavior against a mock API.

#![allow(clippy::unwrap_used)] // Test code

use mealdesk_auth::SessionStore;
use mealdesk_auth::mocks::MemoryTokenStorage;
use mealdesk_client::{ApiClient, AuthApi, ClientConfig, ResourceApi};
use mealdesk_core::{
    ApiError, AppUsers, EntityId, LoginCredentials, MealDraft, MealPatch, MealType, Meals,
    Operation, Recipes, ResourceKind, Route,
};
use mealdesk_testing::RecordingNavigator;
use serde_json::json;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use wiremock::matchers::{body_json, header, method, path};
use tracing_subscriber::fmt::MakeWriter;
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Fixture {
    client: ApiClient,
    storage: MemoryTokenStorage,
    navigator: RecordingNavigator,
}

fn fixture(server: &MockServer, token: Option<&str>) -> Fixture {
    let storage = match token {
        Some(token) => MemoryTokenStorage::with_token(token),
        None => MemoryTokenStorage::new(),
    };
    let session = Arc::new(SessionStore::load(Arc::new(storage.clone())).unwrap());
    let navigator = RecordingNavigator::new();
    let config = ClientConfig::default().with_base_url(server.uri());

    Fixture {
        client: ApiClient::new(&config, session, Arc::new(navigator.clone())),
        storage,
        navigator,
    }
}

fn oatmeal() -> serde_json::Value {
    json!({ "id": 3, "name": "Oatmeal", "mealName": "Сніданок", "photo": null, "recipes": [] })
}

#[tokio::test]
async fn attaches_the_raw_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/meals"))
        .and(header("Authorization", "abc"))
        .and(header("Content-Type", "application/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "ok", "data": [oatmeal()] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fx = fixture(&server, Some("abc"));
    let meals = ResourceApi::<Meals>::new(fx.client).list().await.unwrap();

    assert_eq!(meals.len(), 1);
    assert_eq!(meals[0].meal_type, MealType::Breakfast);
}

#[tokio::test]
async fn sends_no_credentials_without_a_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recipes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok", "data": [] })))
        .mount(&server)
        .await;

    let fx = fixture(&server, None);
    ResourceApi::<Recipes>::new(fx.client).list().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn token_is_read_at_send_time() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/meals"))
        .and(header("Authorization", "fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok", "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let fx = fixture(&server, None);
    let meals = ResourceApi::<Meals>::new(fx.client.clone());
    fx.client.session().set_token("fresh").unwrap();

    meals.list().await.unwrap();
}

#[tokio::test]
async fn unauthorized_clears_session_and_redirects_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/app-users"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "jwt expired" })))
        .mount(&server)
        .await;

    let fx = fixture(&server, Some("stale"));
    let error = ResourceApi::<AppUsers>::new(fx.client.clone())
        .list()
        .await
        .unwrap_err();

    assert_eq!(error, ApiError::AuthExpired { message: "jwt expired".to_string() });
    assert_eq!(fx.client.session().token(), None);
    assert_eq!(fx.storage.stored(), None);
    assert_eq!(fx.navigator.routes(), vec![Route::Login]);
}

#[tokio::test]
async fn missing_header_payload_is_an_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/recipes/9"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({ "errorMessage": "Authorization header not provided" })),
        )
        .mount(&server)
        .await;

    let fx = fixture(&server, None);
    let error = ResourceApi::<Recipes>::new(fx.client)
        .delete(&EntityId::from(9))
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::AuthExpired { .. }));
    assert_eq!(fx.navigator.routes(), vec![Route::Login]);
}

#[tokio::test]
async fn conflict_and_not_found_are_distinct_kinds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/meals"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({ "message": "Duplicate" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/meals/77"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fx = fixture(&server, Some("abc"));
    let meals = ResourceApi::<Meals>::new(fx.client);

    let conflict = meals
        .create(&MealDraft::new("Oatmeal", MealType::Breakfast))
        .await
        .unwrap_err();
    assert!(matches!(conflict, ApiError::Conflict { .. }));
    assert_eq!(
        conflict.user_message(ResourceKind::Meals, Operation::Create),
        "A meal with this name already exists."
    );

    let missing = meals.get(&EntityId::from(77)).await.unwrap_err();
    assert!(matches!(missing, ApiError::NotFound { .. }));
    assert!(fx.navigator.routes().is_empty());
}

#[tokio::test]
async fn other_statuses_are_returned_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recipes"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let fx = fixture(&server, Some("abc"));
    let error = ResourceApi::<Recipes>::new(fx.client.clone())
        .list()
        .await
        .unwrap_err();

    assert_eq!(error, ApiError::Status { status: 500, message: "upstream down".to_string() });
    assert_eq!(fx.client.session().token(), Some("abc".to_string()));
}

#[tokio::test]
async fn transport_failure_is_a_network_error() {
    let session = Arc::new(SessionStore::load(Arc::new(MemoryTokenStorage::new())).unwrap());
    let config = ClientConfig::default().with_base_url("http://127.0.0.1:9");
    let client = ApiClient::new(&config, session, Arc::new(RecordingNavigator::new()));

    let error = ResourceApi::<Meals>::new(client).list().await.unwrap_err();
    assert!(matches!(error, ApiError::Network(_)));
}

#[tokio::test]
async fn success_is_decided_by_status_not_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/meals"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/meals/3"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Deleted"))
        .mount(&server)
        .await;

    let fx = fixture(&server, Some("abc"));
    let meals = ResourceApi::<Meals>::new(fx.client);

    let accepted = meals
        .create_accepted(&MealDraft::new("Oatmeal", MealType::Breakfast))
        .await
        .unwrap();
    assert!(matches!(accepted, Err(ApiError::Decode(_))));
    assert!(matches!(
        meals.create(&MealDraft::new("Oatmeal", MealType::Breakfast)).await,
        Err(ApiError::Decode(_))
    ));

    meals.delete(&EntityId::from(3)).await.unwrap();
}

#[tokio::test]
async fn update_sends_only_present_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/meals/3"))
        .and(body_json(json!({ "mealName": "Обід" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "updated",
            "data": { "id": 3, "name": "Oatmeal", "mealName": "Обід" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/meals/4"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "updated",
            "data": { "id": 4, "name": "Borscht", "mealName": "Обід" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fx = fixture(&server, Some("abc"));
    let meals = ResourceApi::<Meals>::new(fx.client);

    let updated = meals
        .update(&EntityId::from(3), &MealPatch::default().with_meal_type(MealType::Lunch))
        .await
        .unwrap();
    assert_eq!(updated.meal_type, MealType::Lunch);

    meals.update(&EntityId::from(4), &MealPatch::default()).await.unwrap();
}

#[tokio::test]
async fn invalid_drafts_never_reach_the_network() {
    let server = MockServer::start().await;
    let fx = fixture(&server, Some("abc"));

    let error = ResourceApi::<Meals>::new(fx.client)
        .create(&MealDraft::new("O", MealType::Snack))
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn login_stores_token_and_opens_recipes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "email": "admin@example.com", "password": "secret" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Logged in", "data": "tok-1" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fx = fixture(&server, Some("old"));
    let auth = AuthApi::new(fx.client.clone());

    auth.login(&LoginCredentials::new("admin@example.com", "secret"))
        .await
        .unwrap();

    assert_eq!(fx.client.session().token(), Some("tok-1".to_string()));
    assert_eq!(fx.storage.stored(), Some("tok-1".to_string()));
    assert_eq!(fx.navigator.routes(), vec![Route::Recipes]);

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

/// Log output collected in memory
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap_or_else(PoisonError::into_inner)).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn login_logs_carry_no_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Logged in", "data": "tok-1" })),
        )
        .mount(&server)
        .await;

    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let fx = fixture(&server, None);
    AuthApi::new(fx.client)
        .login(&LoginCredentials::new("admin@example.com", "secret"))
        .await
        .unwrap();

    let output = logs.text();
    assert!(output.contains("Signed in"));
    assert!(!output.contains("admin@example.com"));
    assert!(!output.contains("secret"));
    assert!(!output.contains("tok-1"));
}

#[tokio::test]
async fn rejected_login_stores_nothing_and_stays_put() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Wrong password" })))
        .mount(&server)
        .await;

    let fx = fixture(&server, None);
    let error = AuthApi::new(fx.client.clone())
        .login(&LoginCredentials::new("admin@example.com", "nope"))
        .await
        .unwrap_err();

    assert_eq!(error, ApiError::InvalidCredentials);
    assert_eq!(fx.client.session().token(), None);
    assert!(fx.navigator.routes().is_empty());
}

#[tokio::test]
async fn logout_clears_and_redirects() {
    let server = MockServer::start().await;
    let fx = fixture(&server, Some("abc"));

    AuthApi::new(fx.client.clone()).logout().unwrap();

    assert_eq!(fx.client.session().token(), None);
    assert_eq!(fx.navigator.last(), Some(Route::Login));
}
