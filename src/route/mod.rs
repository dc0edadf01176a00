//! Route table: activity names to URL patterns
//!
//! Patterns are tried in registration order, first activity first, and
//! within an activity in the order they were listed.

pub mod template;

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stack::Params;

pub use template::{RouteTemplate, WILDCARD_PARAM};

/// Error resolving a route
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("No route registered for activity: {0}")]
    UnknownActivity(String),
    #[error("Route for activity {0} has no patterns")]
    EmptyRoute(String),
    #[error("Route {pattern} requires param: {param}")]
    MissingParam { pattern: String, param: String },
}

/// One pattern or an ordered list of patterns for an activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteSpec {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for RouteSpec {
    fn from(pattern: &str) -> Self {
        RouteSpec::One(pattern.to_string())
    }
}

impl From<Vec<&str>> for RouteSpec {
    fn from(patterns: Vec<&str>) -> Self {
        RouteSpec::Many(patterns.into_iter().map(str::to_string).collect())
    }
}

/// Flatten a route spec into its ordered list of patterns.
pub fn normalize_route(spec: &RouteSpec) -> Vec<String> {
    match spec {
        RouteSpec::One(pattern) => vec![pattern.clone()],
        RouteSpec::Many(patterns) => patterns.clone(),
    }
}

/// Registered routes, in registration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTable {
    routes: IndexMap<String, RouteSpec>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or re-register) the route for an activity.
    pub fn insert(&mut self, activity_name: impl Into<String>, spec: impl Into<RouteSpec>) {
        self.routes.insert(activity_name.into(), spec.into());
    }

    pub fn with(mut self, activity_name: impl Into<String>, spec: impl Into<RouteSpec>) -> Self {
        self.insert(activity_name, spec);
        self
    }

    pub fn contains(&self, activity_name: &str) -> bool {
        self.routes.contains_key(activity_name)
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn activity_names(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn patterns(&self, activity_name: &str) -> Result<Vec<String>, RouteError> {
        let spec = self
            .routes
            .get(activity_name)
            .ok_or_else(|| RouteError::UnknownActivity(activity_name.to_string()))?;
        let patterns = normalize_route(spec);
        if patterns.is_empty() {
            return Err(RouteError::EmptyRoute(activity_name.to_string()));
        }
        Ok(patterns)
    }

    /// The first pattern of an activity, used to build its paths
    pub fn template_for(&self, activity_name: &str) -> Result<RouteTemplate, RouteError> {
        let patterns = self.patterns(activity_name)?;
        Ok(RouteTemplate::new(&patterns[0]))
    }

    pub fn path_for(&self, activity_name: &str, params: &Params) -> Result<String, RouteError> {
        self.template_for(activity_name)?.fill(params)
    }

    /// Raw first pattern of an activity, used as the initial path of a
    /// fallback activity entered without params
    pub fn fallback_path(&self, activity_name: &str) -> Result<String, RouteError> {
        Ok(self.patterns(activity_name)?.swap_remove(0))
    }

    /// Find the first activity with a pattern matching `path`.
    pub fn match_path(&self, path: &str) -> Option<(String, Params)> {
        self.routes.iter().find_map(|(name, spec)| {
            normalize_route(spec).iter().find_map(|pattern| {
                RouteTemplate::new(pattern)
                    .parse(path)
                    .map(|params| (name.clone(), params))
            })
        })
    }
}

/// Route table handed to the rendering layer so it can resolve activity
/// names to paths.
#[derive(Debug, Clone)]
pub struct RoutesContext {
    routes: Arc<RouteTable>,
}

impl RoutesContext {
    pub fn new(routes: Arc<RouteTable>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn path_for(&self, activity_name: &str, params: &Params) -> Result<String, RouteError> {
        self.routes.path_for(activity_name, params)
    }
}
