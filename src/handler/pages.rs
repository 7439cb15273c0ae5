//! HTML page handlers
//!
//! Each handler issues at most one store call and renders either a view, a
//! 303 redirect back to the list, or an error.

use hyper::StatusCode;

use super::store_error_status;
use super::views::{self, FormView};
use crate::config::AppState;
use crate::http::{build_html_response, build_redirect_response, parse_user_form, HttpResponse};
use crate::logger;
use crate::store::{StoreError, SAMPLE_USERS};
use crate::validation::{parse_user_id, ValidationError};

fn error_page(status: StatusCode, message: &str) -> HttpResponse {
    build_html_response(status, views::render_error(message))
}

fn form_page(status: StatusCode, view: &FormView<'_>) -> HttpResponse {
    build_html_response(status, views::render_user_form(view))
}

fn invalid_id_page(err: &ValidationError) -> HttpResponse {
    logger::log_warning(&err.to_string());
    error_page(StatusCode::BAD_REQUEST, "Invalid user ID")
}

/// `GET /`
pub fn list_users(state: &AppState) -> HttpResponse {
    match state.store.get_all() {
        Ok(users) => build_html_response(
            StatusCode::OK,
            views::render_user_list(&users, state.config.store.allow_reset),
        ),
        Err(e) => {
            logger::log_error(&format!("Failed to load users: {e}"));
            error_page(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load users")
        }
    }
}

/// `GET /add`
pub fn add_form() -> HttpResponse {
    form_page(StatusCode::OK, &FormView::add("", "", None))
}

/// `POST /add`
pub fn add_user(state: &AppState, body: &[u8]) -> HttpResponse {
    let submitted = parse_user_form(body);

    let input = match submitted.clone().validate() {
        Ok(input) => input,
        Err(e) => {
            let message = e.to_string();
            let view = FormView::add(&submitted.name, &submitted.email, Some(&message));
            return form_page(StatusCode::BAD_REQUEST, &view);
        }
    };

    match state.store.insert(&input.name, &input.email) {
        Ok(_) => build_redirect_response("/"),
        Err(e) => {
            let message = format!("Failed to add user: {e}");
            logger::log_error(&message);
            let view = FormView::add(&input.name, &input.email, Some(&message));
            form_page(store_error_status(&e), &view)
        }
    }
}

/// `GET /edit/:id`
pub fn edit_form(state: &AppState, raw_id: &str) -> HttpResponse {
    let id = match parse_user_id(raw_id) {
        Ok(id) => id,
        Err(e) => return invalid_id_page(&e),
    };

    match state.store.get_by_id(id) {
        Ok(user) => form_page(
            StatusCode::OK,
            &FormView::edit(user.id, &user.name, &user.email, None),
        ),
        Err(StoreError::NotFound(_)) => error_page(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => {
            logger::log_error(&format!("Failed to load user {id}: {e}"));
            error_page(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load user")
        }
    }
}

/// `POST /edit/:id`
///
/// Every failure, including a malformed or unknown id, re-renders the form
/// with the submitted values.
pub fn edit_user(state: &AppState, raw_id: &str, body: &[u8]) -> HttpResponse {
    let submitted = parse_user_form(body);
    let id = match parse_user_id(raw_id) {
        Ok(id) => id,
        Err(e) => {
            logger::log_warning(&e.to_string());
            let view = FormView::edit(
                raw_id,
                &submitted.name,
                &submitted.email,
                Some("Invalid user ID"),
            );
            return form_page(StatusCode::BAD_REQUEST, &view);
        }
    };

    let input = match submitted.clone().validate() {
        Ok(input) => input,
        Err(e) => {
            let message = e.to_string();
            let view = FormView::edit(id, &submitted.name, &submitted.email, Some(&message));
            return form_page(StatusCode::BAD_REQUEST, &view);
        }
    };

    match state.store.update(id, &input.name, &input.email) {
        Ok(()) => build_redirect_response("/"),
        Err(StoreError::NotFound(_)) => {
            let view = FormView::edit(id, &input.name, &input.email, Some("User not found"));
            form_page(StatusCode::NOT_FOUND, &view)
        }
        Err(e) => {
            let message = format!("Failed to update user: {e}");
            logger::log_error(&message);
            let view = FormView::edit(id, &input.name, &input.email, Some(&message));
            form_page(store_error_status(&e), &view)
        }
    }
}

/// `POST /delete/:id`
///
/// Deleting an id that does not exist still redirects; the miss is logged.
pub fn delete_user(state: &AppState, raw_id: &str) -> HttpResponse {
    let id = match parse_user_id(raw_id) {
        Ok(id) => id,
        Err(e) => return invalid_id_page(&e),
    };

    match state.store.delete(id) {
        Ok(removed) => {
            if !removed {
                logger::log_warning(&format!("Delete requested for unknown user {id}"));
            }
            build_redirect_response("/")
        }
        Err(e) => {
            logger::log_error(&format!("Failed to delete user {id}: {e}"));
            error_page(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete user")
        }
    }
}

/// `POST /reset`, routed only when `store.allow_reset` is set
pub fn reset_store(state: &AppState) -> HttpResponse {
    match state.store.reset(SAMPLE_USERS) {
        Ok(()) => build_redirect_response("/"),
        Err(e) => {
            logger::log_error(&format!("Failed to reset store: {e}"));
            error_page(StatusCode::INTERNAL_SERVER_ERROR, "Failed to reset database")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::temp_state;
    use http_body_util::BodyExt;
    use hyper::header::LOCATION;

    async fn body_text(resp: HttpResponse) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_list_renders_users() {
        let (_dir, state) = temp_state();
        state.store.insert("Alice", "alice@x.com").unwrap();

        let resp = list_users(&state);
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("alice@x.com"));
    }

    #[tokio::test]
    async fn test_list_fails_with_500_when_store_closed() {
        let (_dir, state) = temp_state();
        state.store.close().unwrap();

        let resp = list_users(&state);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(resp).await.contains("Failed to load users"));
    }

    #[test]
    fn test_add_user_redirects() {
        let (_dir, state) = temp_state();
        let resp = add_user(&state, b"name=Alice&email=alice%40x.com");

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[LOCATION], "/");
        assert_eq!(state.store.get_all().unwrap()[0].email, "alice@x.com");
    }

    #[tokio::test]
    async fn test_add_user_empty_name_is_400_and_creates_nothing() {
        let (_dir, state) = temp_state();
        let resp = add_user(&state, b"name=&email=a%40x.com");

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.store.count().unwrap(), 0);
        let html = body_text(resp).await;
        assert!(html.contains("Name and email are required"));
        assert!(html.contains("value=\"a@x.com\""));
    }

    #[test]
    fn test_add_user_duplicate_email_is_400() {
        let (_dir, state) = temp_state();
        state.store.insert("A", "a@x.com").unwrap();

        let resp = add_user(&state, b"name=B&email=a%40x.com");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.store.count().unwrap(), 1);
    }

    #[test]
    fn test_edit_form_statuses() {
        let (_dir, state) = temp_state();
        let id = state.store.insert("A", "a@x.com").unwrap();

        assert_eq!(edit_form(&state, &id.to_string()).status(), StatusCode::OK);
        assert_eq!(edit_form(&state, "abc").status(), StatusCode::BAD_REQUEST);
        assert_eq!(edit_form(&state, "999").status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_edit_user_updates_and_redirects() {
        let (_dir, state) = temp_state();
        let id = state.store.insert("A", "a@x.com").unwrap();

        let resp = edit_user(&state, &id.to_string(), b"name=Anna&email=anna%40x.com");
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let user = state.store.get_by_id(id).unwrap();
        assert_eq!((user.name.as_str(), user.email.as_str()), ("Anna", "anna@x.com"));
    }

    #[test]
    fn test_edit_user_failures() {
        let (_dir, state) = temp_state();
        let id = state.store.insert("A", "a@x.com").unwrap();
        state.store.insert("B", "b@x.com").unwrap();
        let raw = id.to_string();

        assert_eq!(
            edit_user(&state, "x1", b"name=A&email=a%40x.com").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            edit_user(&state, &raw, b"name=&email=").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            edit_user(&state, &raw, b"name=A&email=b%40x.com").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            edit_user(&state, "404", b"name=Z&email=z%40x.com").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(state.store.count().unwrap(), 2);
        assert_eq!(state.store.get_by_id(id).unwrap().email, "a@x.com");
    }

    #[tokio::test]
    async fn test_edit_user_rerenders_form_for_bad_and_unknown_id() {
        let (_dir, state) = temp_state();

        let resp = edit_user(&state, "x1", b"name=Zed&email=z%40x.com");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let html = body_text(resp).await;
        assert!(html.contains("<form method=\"post\" action=\"/edit/x1\""));
        assert!(html.contains("value=\"Zed\""));
        assert!(html.contains("Invalid user ID"));

        let resp = edit_user(&state, "404", b"name=Zed&email=z%40x.com");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let html = body_text(resp).await;
        assert!(html.contains("action=\"/edit/404\""));
        assert!(html.contains("value=\"z@x.com\""));
        assert!(html.contains("User not found"));
        assert_eq!(state.store.count().unwrap(), 0);
    }

    #[test]
    fn test_delete_user() {
        let (_dir, state) = temp_state();
        let id = state.store.insert("A", "a@x.com").unwrap();

        assert_eq!(delete_user(&state, "nope").status(), StatusCode::BAD_REQUEST);
        // unknown id is a silent no-op
        assert_eq!(delete_user(&state, "999").status(), StatusCode::SEE_OTHER);
        assert_eq!(state.store.count().unwrap(), 1);

        assert_eq!(delete_user(&state, &id.to_string()).status(), StatusCode::SEE_OTHER);
        assert_eq!(state.store.count().unwrap(), 0);
    }

    #[test]
    fn test_reset_store_reseeds() {
        let (_dir, state) = temp_state();
        state.store.insert("A", "a@x.com").unwrap();

        assert_eq!(reset_store(&state).status(), StatusCode::SEE_OTHER);
        let users = state.store.get_all().unwrap();
        assert_eq!(users.len(), SAMPLE_USERS.len());
        assert!(users.iter().all(|u| u.email != "a@x.com"));
    }
}
