// Arbor - A headless content backend built with Rust
// Copyright (C) 2025 Arbor Project Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::{
    auth::admin_access_middleware,
    cors::{cors_middleware, CorsPolicy},
    handlers,
    request_logging::request_logging_middleware,
    AppState,
};
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let cors = Arc::new(CorsPolicy::from_config(&state.config));

    // Everything under /admin sits behind the access predicate
    let admin = Router::new()
        .route("/admin/meta", get(handlers::admin_meta))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_access_middleware,
        ));

    Router::new()
        // Health check
        .route("/.health", get(health))
        // Session
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/session", get(handlers::current_session))
        .route(
            "/api/auth/init",
            get(handlers::init_status).post(handlers::init),
        )
        // Schema registry
        .route("/api/lists", get(handlers::list_registry))
        // Products
        .route(
            "/api/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/api/products/{id}",
            get(handlers::get_product).delete(handlers::delete_product),
        )
        .route(
            "/api/products/{id}/images",
            post(handlers::add_product_image),
        )
        // Users (admin only)
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/api/users/{id}/role", put(handlers::update_user_role))
        .merge(admin)
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(middleware::from_fn_with_state(cors, cors_middleware))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

// Health check handler
async fn health() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_test_state, create_test_user, session_cookie_for};
    use arbor_core::models::role::Role;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    async fn server() -> (TestServer, AppState) {
        let state = create_test_state()
            .await
            .expect("Failed to create test state");
        let server = TestServer::new(create_router(state.clone())).expect("Failed to create test server");
        (server, state)
    }

    #[tokio::test]
    async fn test_health_endpoint_uses_dot_prefix() {
        let (server, _) = server().await;

        let response = server.get("/.health").await;
        response.assert_status(StatusCode::OK);
        response.assert_text("OK");

        let response = server.get("/health").await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_session_is_anonymous_without_cookie() {
        let (server, _) = server().await;

        let response = server.get("/api/auth/session").await;
        response.assert_status(StatusCode::OK);
        response.assert_json(&json!({
            "authenticated": false,
            "user_id": null,
            "user": null
        }));
    }

    #[tokio::test]
    async fn test_login_then_session_reports_user() {
        let (server, state) = server().await;
        let id = create_test_user(&state.db, "ada@example.com", "pw-ada", Role::Viewer)
            .await
            .unwrap();

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "ada@example.com", "password": "pw-ada" }))
            .await;
        response.assert_status(StatusCode::OK);
        response.assert_json(&json!({ "authenticated": true, "user_id": id }));
        let cookie = response.cookie("arbor-session");

        let body: Value = server
            .get("/api/auth/session")
            .add_cookie(cookie)
            .await
            .json();
        assert_eq!(body["authenticated"], json!(true));
        assert_eq!(body["user"]["email"], json!("ada@example.com"));
        assert!(body["user"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_login_failures_look_the_same() {
        let (server, state) = server().await;
        create_test_user(&state.db, "ada@example.com", "pw-ada", Role::Viewer)
            .await
            .unwrap();

        let wrong_password = server
            .post("/api/auth/login")
            .json(&json!({ "email": "ada@example.com", "password": "nope" }))
            .await;
        let unknown_email = server
            .post("/api/auth/login")
            .json(&json!({ "email": "bob@example.com", "password": "pw-ada" }))
            .await;

        wrong_password.assert_status(StatusCode::UNAUTHORIZED);
        unknown_email.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.text(), unknown_email.text());
    }

    #[tokio::test]
    async fn test_init_flow() {
        let (server, _) = server().await;

        server
            .get("/api/auth/init")
            .await
            .assert_json(&json!({ "needs_init": true, "fields": ["name", "email", "password"] }));

        let response = server
            .post("/api/auth/init")
            .json(&json!({ "name": "Wes", "email": "wes@example.com", "password": "wespw" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["user"]["role"], json!("admin"));
        assert_eq!(body["authenticated"], json!(true));

        server
            .get("/api/auth/init")
            .await
            .assert_json(&json!({ "needs_init": false, "fields": ["name", "email", "password"] }));

        server
            .post("/api/auth/init")
            .json(&json!({ "name": "Eve", "email": "eve@example.com", "password": "evepw" }))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_product_writes_require_editor() {
        let (server, state) = server().await;
        let viewer = create_test_user(&state.db, "v@example.com", "pw", Role::Viewer)
            .await
            .unwrap();
        let editor = create_test_user(&state.db, "e@example.com", "pw", Role::Editor)
            .await
            .unwrap();
        let payload = json!({ "name": "Fig Tree", "price": 4200, "status": "available" });

        server
            .post("/api/products")
            .json(&payload)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        server
            .post("/api/products")
            .add_cookie(session_cookie_for(&state, viewer))
            .json(&payload)
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let response = server
            .post("/api/products")
            .add_cookie(session_cookie_for(&state, editor))
            .json(&payload)
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: Value = response.json();
        assert_eq!(created["name"], json!("Fig Tree"));
        assert_eq!(created["photos"], json!([]));
    }

    #[tokio::test]
    async fn test_product_crud_with_images() {
        let (server, state) = server().await;
        let editor = create_test_user(&state.db, "e@example.com", "pw", Role::Editor)
            .await
            .unwrap();
        let cookie = session_cookie_for(&state, editor);

        let created: Value = server
            .post("/api/products")
            .add_cookie(cookie.clone())
            .json(&json!({ "name": "Bay Laurel", "price": 1900 }))
            .await
            .json();
        let id = created["id"].as_i64().unwrap();
        assert_eq!(created["status"], json!("draft"));

        server
            .post(&format!("/api/products/{}/images", id))
            .add_cookie(cookie.clone())
            .json(&json!({ "image_url": "/img/bay.jpg", "alt_text": "Bay leaves" }))
            .await
            .assert_status(StatusCode::CREATED);

        let product: Value = server.get(&format!("/api/products/{}", id)).await.json();
        assert_eq!(product["photos"][0]["image_url"], json!("/img/bay.jpg"));

        let drafts: Value = server.get("/api/products?status=draft").await.json();
        assert_eq!(drafts.as_array().unwrap().len(), 1);
        let available: Value = server.get("/api/products?status=available").await.json();
        assert_eq!(available.as_array().unwrap().len(), 0);
        server
            .get("/api/products?status=sold")
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .delete(&format!("/api/products/{}", id))
            .add_cookie(cookie.clone())
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get(&format!("/api/products/{}", id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .delete(&format!("/api/products/{}", id))
            .add_cookie(cookie)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_product_is_rejected() {
        let (server, state) = server().await;
        let editor = create_test_user(&state.db, "e@example.com", "pw", Role::Editor)
            .await
            .unwrap();

        server
            .post("/api/products")
            .add_cookie(session_cookie_for(&state, editor))
            .json(&json!({ "name": "Negative", "price": -5 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_lists_registry() {
        let (server, _) = server().await;

        let lists: Value = server.get("/api/lists").await.json();
        let keys: Vec<&str> = lists
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["key"].as_str().unwrap())
            .collect();
        assert_eq!(keys, vec!["Product", "ProductImage", "User"]);
    }

    #[tokio::test]
    async fn test_admin_gate() {
        let (server, state) = server().await;

        server
            .get("/admin/meta")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let viewer = create_test_user(&state.db, "v@example.com", "pw", Role::Viewer)
            .await
            .unwrap();
        let response = server
            .get("/admin/meta")
            .add_cookie(session_cookie_for(&state, viewer))
            .await;
        response.assert_status(StatusCode::OK);
        let meta: Value = response.json();
        assert_eq!(meta["auth_list"], json!("User"));
    }

    #[tokio::test]
    async fn test_admin_gate_rejects_deleted_user() {
        let (server, state) = server().await;
        let id = create_test_user(&state.db, "gone@example.com", "pw", Role::Admin)
            .await
            .unwrap();
        let cookie = session_cookie_for(&state, id);
        arbor_db::repositories::UserRepository::new(state.db.clone())
            .delete(id)
            .await
            .unwrap();

        server
            .get("/admin/meta")
            .add_cookie(cookie)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_user_management_requires_admin() {
        let (server, state) = server().await;
        let admin = create_test_user(&state.db, "admin@example.com", "pw", Role::Admin)
            .await
            .unwrap();
        let editor = create_test_user(&state.db, "e@example.com", "pw", Role::Editor)
            .await
            .unwrap();
        let payload = json!({ "name": "New", "email": "new@example.com", "password": "pw" });

        server
            .post("/api/users")
            .add_cookie(session_cookie_for(&state, editor))
            .json(&payload)
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let response = server
            .post("/api/users")
            .add_cookie(session_cookie_for(&state, admin))
            .json(&payload)
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: Value = response.json();
        assert_eq!(created["role"], json!("viewer"));

        server
            .post("/api/users")
            .add_cookie(session_cookie_for(&state, admin))
            .json(&payload)
            .await
            .assert_status(StatusCode::CONFLICT);

        let id = created["id"].as_i64().unwrap();
        let updated: Value = server
            .put(&format!("/api/users/{}/role", id))
            .add_cookie(session_cookie_for(&state, admin))
            .json(&json!({ "role": "editor" }))
            .await
            .json();
        assert_eq!(updated["role"], json!("editor"));

        server
            .put(&format!("/api/users/{}/role", admin))
            .add_cookie(session_cookie_for(&state, admin))
            .json(&json!({ "role": "viewer" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let (server, state) = server().await;
        let id = create_test_user(&state.db, "ada@example.com", "pw", Role::Viewer)
            .await
            .unwrap();

        let response = server
            .post("/api/auth/logout")
            .add_cookie(session_cookie_for(&state, id))
            .await;
        response.assert_status(StatusCode::OK);
        response.assert_json(&json!({ "authenticated": false, "user_id": null }));
        let cookie = response.cookie("arbor-session");
        assert_eq!(cookie.value(), "");
    }
}
