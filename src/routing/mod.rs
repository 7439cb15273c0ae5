// Routing module
// Resolves method + path to one of the service's endpoints

pub mod matcher;

pub use matcher::{match_route, Route, RouteMatch};
