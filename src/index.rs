use axum::{Json, debug_handler};
use serde_json::{Value, json};

/// Map of the API's entry points.
#[debug_handler]
pub async fn index() -> Json<Value> {
    Json(json!({
        "register_user": "/register/user/",
        "user_login": "/user/login/",
        "user_logout": "/user/logout/",
        "profile": "/profile/",
        "profile_followings": "/profile/followings/",
        "profile_followers": "/profile/followers/",
        "posts": "/posts/",
        "likes": "/likes/",
        "comments": "/comments/",
    }))
}
