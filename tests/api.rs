use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use photogram::{AppState, Config, app, db};
use serde_json::{Value, json};
use tower::ServiceExt;

struct Client {
    app: Router,
}

struct Reply {
    status: StatusCode,
    body: Value,
    cookie: Option<String>,
}

impl Client {
    async fn new() -> Self {
        let db_pool = db::connect_in_memory().await.unwrap();
        Self { app: app(AppState::new(db_pool, Config::default())) }
    }

    async fn send(&self, method: Method, uri: &str, auth: Option<&str>, body: Option<Value>) -> Reply {
        self.send_with(method, uri, auth.map(|token| (header::AUTHORIZATION, token)), body).await
    }

    async fn send_with(
        &self,
        method: Method,
        uri: &str,
        extra_header: Option<(header::HeaderName, &str)>,
        body: Option<Value>,
    ) -> Reply {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some((name, value)) = extra_header {
            request = request.header(name, value);
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_owned);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };

        Reply { status, body, cookie }
    }

    /// Registers `username` and returns its `Authorization` header value.
    async fn user(&self, username: &str) -> String {
        let reply = self
            .send(
                Method::POST,
                "/register/user/",
                None,
                Some(json!({ "username": username, "email": format!("{username}@example.com"), "password": "pw" })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);

        let reply = self
            .send(Method::POST, "/user/login/", None, Some(json!({ "username": username, "password": "pw" })))
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        reply.body["token"].as_str().unwrap().to_owned()
    }

    async fn profile_id(&self, username: &str) -> String {
        let reply = self.send(Method::GET, &format!("/profile/{username}/"), None, None).await;
        assert_eq!(reply.status, StatusCode::OK);
        reply.body["id"].as_str().unwrap().to_owned()
    }

    async fn post(&self, token: &str) -> String {
        let reply = self
            .send(Method::POST, "/posts/", Some(token), Some(json!({ "description": "sunset" })))
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        reply.body["id"].as_str().unwrap().to_owned()
    }
}

#[tokio::test]
async fn index_lists_endpoints() {
    let client = Client::new().await;
    let reply = client.send(Method::GET, "/", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["profile_followings"], "/profile/followings/");
}

#[tokio::test]
async fn follow_then_unfollow() {
    let client = Client::new().await;
    let alice = client.user("alice").await;
    client.user("bob").await;
    let bob_id = client.profile_id("bob").await;

    let reply = client
        .send(Method::POST, "/profile/followings/", Some(&alice), Some(json!({ "following": bob_id })))
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["status"], "following");

    let reply = client.send(Method::GET, "/profile/bob/", None, None).await;
    assert_eq!(reply.body["followers"], 1);
    assert_eq!(reply.body["following"], 0);

    let reply = client
        .send(Method::POST, "/profile/followings/", Some(&alice), Some(json!({ "following": bob_id })))
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["status"], "unfollowed");

    let reply = client.send(Method::GET, "/profile/followings/", Some(&alice), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!([]));
}

#[tokio::test]
async fn follow_lists_are_scoped_to_the_caller() {
    let client = Client::new().await;
    let alice = client.user("alice").await;
    let bob = client.user("bob").await;
    let bob_id = client.profile_id("bob").await;
    let alice_id = client.profile_id("alice").await;

    client
        .send(Method::POST, "/profile/followings/", Some(&alice), Some(json!({ "following": bob_id })))
        .await;

    let followings = client.send(Method::GET, "/profile/followings/", Some(&alice), None).await.body;
    assert_eq!(followings.as_array().unwrap().len(), 1);
    assert_eq!(followings[0]["follower"], alice_id);
    assert_eq!(followings[0]["username"], "bob");

    let followers = client.send(Method::GET, "/profile/followers/", Some(&alice), None).await.body;
    assert_eq!(followers, json!([]));

    let followers = client.send(Method::GET, "/profile/followers/", Some(&bob), None).await.body;
    assert_eq!(followers[0]["following"], bob_id);
    assert_eq!(followers[0]["username"], "alice");

    let reply = client.send(Method::GET, "/profile/followings/", None, None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn follow_targets_are_checked() {
    let client = Client::new().await;
    let alice = client.user("alice").await;
    let alice_id = client.profile_id("alice").await;

    let cases = [
        (json!({}), StatusCode::BAD_REQUEST),
        (json!({ "following": "not-a-uuid" }), StatusCode::BAD_REQUEST),
        (json!({ "following": alice_id }), StatusCode::BAD_REQUEST),
        (json!({ "following": "0191c3b2-7f00-7000-8000-000000000000" }), StatusCode::NOT_FOUND),
    ];
    for (body, expected) in cases {
        let reply = client.send(Method::POST, "/profile/followings/", Some(&alice), Some(body.clone())).await;
        assert_eq!(reply.status, expected, "{body}");
    }
}

#[tokio::test]
async fn edges_cannot_be_edited_directly() {
    let client = Client::new().await;
    let alice = client.user("alice").await;
    client.user("bob").await;
    let bob_id = client.profile_id("bob").await;

    client
        .send(Method::POST, "/profile/followings/", Some(&alice), Some(json!({ "following": bob_id })))
        .await;
    let edge_id = client.send(Method::GET, "/profile/followings/", Some(&alice), None).await.body[0]["id"]
        .as_str()
        .unwrap()
        .to_owned();

    let uri = format!("/profile/followings/{edge_id}/");
    assert_eq!(client.send(Method::GET, &uri, Some(&alice), None).await.status, StatusCode::OK);
    for method in [Method::PUT, Method::PATCH, Method::DELETE] {
        let reply = client.send(method, &uri, Some(&alice), Some(json!({ "following": bob_id }))).await;
        assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);
    }

    let reply = client.send(Method::POST, "/profile/followers/", Some(&alice), Some(json!({}))).await;
    assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);
    let reply = client.send(Method::POST, "/profile/", Some(&alice), Some(json!({}))).await;
    assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn comment_removal_by_post_owner() {
    let client = Client::new().await;
    let alice = client.user("alice").await;
    let bob = client.user("bob").await;
    let carol = client.user("carol").await;

    let post_id = client.post(&alice).await;
    let reply = client
        .send(Method::POST, "/comments/", Some(&bob), Some(json!({ "post": post_id, "comment": "wow" })))
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    let comment_uri = format!("/comments/{}/", reply.body["id"].as_str().unwrap());

    let reply = client.send(Method::DELETE, &comment_uri, Some(&carol), None).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = client.send(Method::DELETE, &comment_uri, Some(&alice), None).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);

    let reply = client.send(Method::GET, &comment_uri, None, None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comments_require_text() {
    let client = Client::new().await;
    let alice = client.user("alice").await;
    let post_id = client.post(&alice).await;

    let reply = client.send(Method::POST, "/comments/", Some(&alice), Some(json!({ "post": post_id }))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.body["detail"].as_str().unwrap().starts_with("comment:"));
}

#[tokio::test]
async fn non_owners_are_forbidden() {
    let client = Client::new().await;
    let alice = client.user("alice").await;
    let bob = client.user("bob").await;
    let post_uri = format!("/posts/{}/", client.post(&alice).await);

    for (method, uri) in [
        (Method::PATCH, post_uri.as_str()),
        (Method::DELETE, post_uri.as_str()),
        (Method::PATCH, "/profile/alice/"),
        (Method::DELETE, "/profile/alice/"),
    ] {
        let reply = client.send(method, uri, Some(&bob), Some(json!({ "description": "x", "bio": "x" }))).await;
        assert_eq!(reply.status, StatusCode::FORBIDDEN, "{uri}");
    }

    let reply = client.send(Method::PATCH, &post_uri, Some(&alice), Some(json!({ "description": "edited" }))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["description"], "edited");
}

#[tokio::test]
async fn anonymous_callers_can_read_but_not_write() {
    let client = Client::new().await;
    let alice = client.user("alice").await;
    let post_uri = format!("/posts/{}/", client.post(&alice).await);

    assert_eq!(client.send(Method::GET, "/posts/", None, None).await.status, StatusCode::OK);
    assert_eq!(client.send(Method::GET, &post_uri, None, None).await.status, StatusCode::OK);
    assert_eq!(client.send(Method::GET, "/profile/", None, None).await.status, StatusCode::OK);

    let reply = client.send(Method::POST, "/posts/", None, Some(json!({ "description": "x" }))).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    let reply = client.send(Method::DELETE, &post_uri, None, None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    let reply = client.send(Method::DELETE, &post_uri, Some("Token bogus"), None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn owner_comes_from_the_caller_not_the_body() {
    let client = Client::new().await;
    let alice = client.user("alice").await;
    client.user("bob").await;
    let bob_id = client.profile_id("bob").await;
    let alice_id = client.profile_id("alice").await;

    let reply = client
        .send(Method::POST, "/posts/", Some(&alice), Some(json!({ "description": "x", "profile": bob_id })))
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["profile"], alice_id);
}

#[tokio::test]
async fn likes_toggle() {
    let client = Client::new().await;
    let alice = client.user("alice").await;
    let bob = client.user("bob").await;
    let post_id = client.post(&alice).await;

    let reply = client.send(Method::POST, "/likes/", Some(&bob), Some(json!({ "post": post_id }))).await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["status"], "liked");

    let likes = client.send(Method::GET, "/likes/", Some(&bob), None).await.body;
    assert_eq!(likes.as_array().unwrap().len(), 1);
    let like_uri = format!("/likes/{}/", likes[0]["id"].as_str().unwrap());
    assert_eq!(
        client.send(Method::PATCH, &like_uri, Some(&bob), Some(json!({}))).await.status,
        StatusCode::METHOD_NOT_ALLOWED
    );

    let reply = client.send(Method::POST, "/likes/", Some(&bob), Some(json!({ "post": post_id }))).await;
    assert_eq!(reply.body["status"], "unliked");
    assert_eq!(client.send(Method::GET, "/likes/", Some(&bob), None).await.body, json!([]));
}

#[tokio::test]
async fn registration_is_validated() {
    let client = Client::new().await;
    client.user("alice").await;

    let reply = client
        .send(Method::POST, "/register/user/", None, Some(json!({ "username": "Alice", "password": "pw" })))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = client
        .send(Method::POST, "/register/user/", None, Some(json!({ "username": "dave" })))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = client
        .send_with(
            Method::POST,
            "/register/user/",
            Some((header::CONTENT_TYPE, "application/json")),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let client = Client::new().await;
    client.user("alice").await;

    let reply = client
        .send(Method::POST, "/user/login/", None, Some(json!({ "username": "alice", "password": "nope" })))
        .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let client = Client::new().await;
    let alice = client.user("alice").await;

    let reply = client.send(Method::POST, "/user/logout/", Some(&alice), None).await;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = client.send(Method::POST, "/posts/", Some(&alice), Some(json!({}))).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_session_cookie_authenticates() {
    let client = Client::new().await;
    client.user("alice").await;

    let reply = client
        .send(Method::POST, "/user/login/", None, Some(json!({ "username": "alice", "password": "pw" })))
        .await;
    let cookie = reply.cookie.expect("login sets a session cookie");

    let reply = client
        .send_with(Method::GET, "/profile/followings/", Some((header::COOKIE, &cookie)), None)
        .await;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = client
        .send_with(Method::POST, "/user/logout/", Some((header::COOKIE, &cookie)), None)
        .await;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = client
        .send_with(Method::GET, "/profile/followings/", Some((header::COOKIE, &cookie)), None)
        .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deleting_a_profile_removes_its_content() {
    let client = Client::new().await;
    let alice = client.user("alice").await;
    let bob = client.user("bob").await;
    let alice_id = client.profile_id("alice").await;
    let post_id = client.post(&alice).await;

    client
        .send(Method::POST, "/profile/followings/", Some(&bob), Some(json!({ "following": alice_id })))
        .await;
    client
        .send(Method::POST, "/comments/", Some(&bob), Some(json!({ "post": post_id, "comment": "hi" })))
        .await;

    let reply = client.send(Method::DELETE, "/profile/alice/", Some(&alice), None).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);

    assert_eq!(client.send(Method::GET, "/profile/alice/", None, None).await.status, StatusCode::NOT_FOUND);
    assert_eq!(client.send(Method::GET, "/posts/", None, None).await.body, json!([]));
    assert_eq!(client.send(Method::GET, "/comments/", None, None).await.body, json!([]));
    assert_eq!(client.send(Method::GET, "/profile/followings/", Some(&bob), None).await.body, json!([]));
    assert_eq!(
        client.send(Method::GET, "/profile/followings/", Some(&alice), None).await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn profile_rename_keeps_login_working() {
    let client = Client::new().await;
    let alice = client.user("alice").await;
    client.user("bob").await;

    let reply = client.send(Method::PATCH, "/profile/alice/", Some(&alice), Some(json!({ "username": "bob" }))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = client
        .send(Method::PATCH, "/profile/alice/", Some(&alice), Some(json!({ "username": "alicia", "name": "Alicia" })))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["username"], "alicia");
    assert_eq!(reply.body["name"], "Alicia");

    let reply = client
        .send(Method::POST, "/user/login/", None, Some(json!({ "username": "alicia", "password": "pw" })))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn profile_paths_accept_any_spelling_of_the_username() {
    let client = Client::new().await;
    let alice = client.user("alice").await;

    let reply = client.send(Method::GET, "/profile/Alice/", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["username"], "alice");

    let reply = client.send(Method::PATCH, "/profile/ALICE/", Some(&alice), Some(json!({ "bio": "hi" }))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["bio"], "hi");
}

#[tokio::test]
async fn other_peoples_likes_are_forbidden() {
    let client = Client::new().await;
    let alice = client.user("alice").await;
    let bob = client.user("bob").await;
    let post_id = client.post(&alice).await;

    client.send(Method::POST, "/likes/", Some(&bob), Some(json!({ "post": post_id }))).await;
    let like_id = client.send(Method::GET, "/likes/", Some(&bob), None).await.body[0]["id"]
        .as_str()
        .unwrap()
        .to_owned();
    let like_uri = format!("/likes/{like_id}/");

    assert_eq!(client.send(Method::GET, &like_uri, Some(&alice), None).await.status, StatusCode::FORBIDDEN);
    assert_eq!(client.send(Method::DELETE, &like_uri, Some(&alice), None).await.status, StatusCode::FORBIDDEN);
    assert_eq!(client.send(Method::GET, &like_uri, Some(&bob), None).await.status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_contact_fields_are_rejected() {
    let client = Client::new().await;
    let alice = client.user("alice").await;

    let reply = client
        .send(
            Method::POST,
            "/register/user/",
            None,
            Some(json!({ "username": "dave", "email": "@", "password": "pw" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = client
        .send(Method::PATCH, "/profile/alice/", Some(&alice), Some(json!({ "website": "https://[notahost" })))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.body["detail"].as_str().unwrap().starts_with("website:"));
}
