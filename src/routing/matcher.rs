// Route matching module
// Maps (method, path) to a route, extracting `:id` path parameters

use hyper::Method;

use crate::config::Config;

/// Every endpoint the service answers. Path parameters are kept raw so the
/// handler can answer 400 for a malformed id; they are owned so a route can
/// move onto the blocking pool with its handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    ListUsers,
    AddForm,
    AddUser,
    EditForm(String),
    EditUser(String),
    DeleteUser(String),
    Reset,
    ApiListUsers,
    ApiCreateUser,
    ApiDeleteUser(String),
    Health,
    Liveness,
    Readiness,
    Info,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RouteMatch {
    Matched(Route),
    /// Path exists but not for this method; carries the `Allow` header value
    MethodNotAllowed(String),
    NotFound,
}

/// Resolve a request to a route
pub fn match_route(method: &Method, path: &str, config: &Config) -> RouteMatch {
    let Some(candidates) = candidates_for(path, config) else {
        return RouteMatch::NotFound;
    };

    if let Some((_, route)) = candidates.iter().find(|(m, _)| m == method) {
        return RouteMatch::Matched(route.clone());
    }

    let allow = candidates
        .iter()
        .map(|(m, _)| m.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    RouteMatch::MethodNotAllowed(allow)
}

/// Methods served at `path`, or `None` if nothing lives there
fn candidates_for(path: &str, config: &Config) -> Option<Vec<(Method, Route)>> {
    let health = &config.health;
    if health.enabled {
        if path == health.health_path {
            return Some(vec![(Method::GET, Route::Health)]);
        }
        if path == health.liveness_path {
            return Some(vec![(Method::GET, Route::Liveness)]);
        }
        if path == health.readiness_path {
            return Some(vec![(Method::GET, Route::Readiness)]);
        }
        if path == health.info_path {
            return Some(vec![(Method::GET, Route::Info)]);
        }
    }

    let segments: Vec<&str> = path.strip_prefix('/')?.split('/').collect();

    let candidates = match segments.as_slice() {
        [""] => vec![(Method::GET, Route::ListUsers)],
        ["add"] => vec![(Method::GET, Route::AddForm), (Method::POST, Route::AddUser)],
        ["edit", id] => vec![
            (Method::GET, Route::EditForm((*id).to_string())),
            (Method::POST, Route::EditUser((*id).to_string())),
        ],
        ["delete", id] => vec![(Method::POST, Route::DeleteUser((*id).to_string()))],
        ["reset"] if config.store.allow_reset => vec![(Method::POST, Route::Reset)],
        ["api", "users"] => vec![
            (Method::GET, Route::ApiListUsers),
            (Method::POST, Route::ApiCreateUser),
        ],
        ["api", "users", id] => {
            vec![(Method::DELETE, Route::ApiDeleteUser((*id).to_string()))]
        }
        _ => return None,
    };
    Some(candidates)
}
