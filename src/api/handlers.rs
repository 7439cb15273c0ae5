// JSON user handlers module

use hyper::StatusCode;
use serde::Serialize;

use super::response::{json_error, json_response};
use crate::config::AppState;
use crate::handler::store_error_status;
use crate::http::HttpResponse;
use crate::logger;
use crate::validation::{parse_user_id, UserInput};

#[derive(Serialize)]
struct Created {
    id: i64,
    message: &'static str,
}

#[derive(Serialize)]
struct Message {
    message: String,
}

/// `GET /api/users`
pub fn list_users(state: &AppState) -> HttpResponse {
    match state.store.get_all() {
        Ok(users) => json_response(StatusCode::OK, &users),
        Err(e) => {
            logger::log_error(&format!("Failed to load users: {e}"));
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load users")
        }
    }
}

/// `POST /api/users` with a `{"name", "email"}` body
pub fn create_user(state: &AppState, body: &[u8]) -> HttpResponse {
    let submitted: UserInput = match serde_json::from_slice(body) {
        Ok(input) => input,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, &format!("Invalid JSON: {e}")),
    };

    let input = match submitted.validate() {
        Ok(input) => input,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    match state.store.insert(&input.name, &input.email) {
        Ok(id) => json_response(
            StatusCode::CREATED,
            &Created {
                id,
                message: "User created successfully",
            },
        ),
        Err(e) => {
            logger::log_error(&format!("Failed to create user: {e}"));
            json_error(store_error_status(&e), &format!("Failed to create user: {e}"))
        }
    }
}

/// `DELETE /api/users/:id`
///
/// Unlike the HTML route, deleting an unknown id answers 404.
pub fn delete_user(state: &AppState, raw_id: &str) -> HttpResponse {
    let id = match parse_user_id(raw_id) {
        Ok(id) => id,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    match state.store.delete(id) {
        Ok(true) => json_response(
            StatusCode::OK,
            &Message {
                message: format!("User {id} deleted"),
            },
        ),
        Ok(false) => json_error(StatusCode::NOT_FOUND, &format!("User {id} not found")),
        Err(e) => {
            logger::log_error(&format!("Failed to delete user {id}: {e}"));
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete user")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::temp_state;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn body_json(resp: HttpResponse) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_user_returns_id() {
        let (_dir, state) = temp_state();
        let resp = create_user(&state, br#"{"name":"Bob","email":"bob@x.com"}"#);

        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        assert_eq!(body["message"], "User created successfully");
        let id = body["id"].as_i64().unwrap();
        assert_eq!(state.store.get_by_id(id).unwrap().name, "Bob");
    }

    #[tokio::test]
    async fn test_create_user_rejections() {
        let (_dir, state) = temp_state();
        state.store.insert("A", "a@x.com").unwrap();

        let bad_json = create_user(&state, b"{not json");
        assert_eq!(bad_json.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(bad_json).await["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid JSON"));

        let missing = create_user(&state, br#"{"name":"  "}"#);
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(missing).await["error"], "Name and email are required");

        let duplicate = create_user(&state, br#"{"name":"B","email":"a@x.com"}"#);
        assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);

        assert_eq!(state.store.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_users_json() {
        let (_dir, state) = temp_state();
        state.store.insert("A", "a@x.com").unwrap();
        state.store.insert("B", "b@x.com").unwrap();

        let resp = list_users(&state);
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        let users = body.as_array().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1]["email"], "b@x.com");
    }

    #[tokio::test]
    async fn test_delete_user_reports_missing() {
        let (_dir, state) = temp_state();
        let id = state.store.insert("A", "a@x.com").unwrap();

        assert_eq!(delete_user(&state, "0").status(), StatusCode::BAD_REQUEST);
        assert_eq!(delete_user(&state, "999").status(), StatusCode::NOT_FOUND);

        let resp = delete_user(&state, &id.to_string());
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["message"], format!("User {id} deleted"));
        assert_eq!(state.store.count().unwrap(), 0);
    }
}
