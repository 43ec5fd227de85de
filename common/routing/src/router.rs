use std::fmt::Display;

use axum::{
    Router,
    handler::Handler,
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::debug;
use utoipa::openapi::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::metrics;

struct Route {
    method: &'static str,
    root_path: &'static str,
    relative_path: &'static str,
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}{}",
            self.method, self.root_path, self.relative_path
        )
    }
}

/// Collects the routes of one service under a shared root path, then
/// nests them, attaches the metrics endpoint and serves the OpenAPI docs
/// next to them.
pub struct RouterBuilder<S> {
    inner: OpenApiRouter<S>,
    root_path: &'static str,
    routes: Vec<Route>,
}

impl<S> RouterBuilder<S>
where
    S: Send + Sync + Clone + 'static,
{
    pub fn new(root_path: &'static str) -> Self {
        Self {
            inner: OpenApiRouter::new(),
            root_path,
            routes: Vec::new(),
        }
    }

    pub fn get<T, F>(mut self, path: &'static str, handler: F) -> Self
    where
        F: Handler<T, S>,
        T: 'static,
    {
        self.inner = self.inner.route(path, get(handler));
        self.record("GET", path)
    }

    pub fn post<T, F>(mut self, path: &'static str, handler: F) -> Self
    where
        F: Handler<T, S>,
        T: 'static,
    {
        self.inner = self.inner.route(path, post(handler));
        self.record("POST", path)
    }

    pub fn put<T, F>(mut self, path: &'static str, handler: F) -> Self
    where
        F: Handler<T, S>,
        T: 'static,
    {
        self.inner = self.inner.route(path, put(handler));
        self.record("PUT", path)
    }

    pub fn delete<T, F>(mut self, path: &'static str, handler: F) -> Self
    where
        F: Handler<T, S>,
        T: 'static,
    {
        self.inner = self.inner.route(path, delete(handler));
        self.record("DELETE", path)
    }

    fn record(mut self, method: &'static str, relative_path: &'static str) -> Self {
        self.routes.push(Route {
            method,
            root_path: self.root_path,
            relative_path,
        });
        self
    }

    pub fn build_no_metrics(self, app_state: S, api_doc: OpenApi) -> Router {
        self.log_routes();
        let main_router = self.inner.route(
            "/metrics",
            get(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Metrics endpoint is disabled. Metrics must be enabled and the service restarted",
                )
            }),
        );
        build(self.root_path, main_router, app_state, api_doc)
    }

    pub fn build_with_metrics(
        self,
        app_state: S,
        api_doc: OpenApi,
        metrics_handle: PrometheusHandle,
    ) -> Router {
        self.log_routes();

        let main_router = self
            .inner
            .route("/metrics", get(|| async move { metrics_handle.render() }))
            .route_layer(middleware::from_fn(metrics::track_http));

        build(self.root_path, main_router, app_state, api_doc)
    }

    fn log_routes(&self) {
        for route in &self.routes {
            debug!("Building route - {route}")
        }
    }
}

fn build<S>(
    root_path: &'static str,
    main_router: OpenApiRouter<S>,
    app_state: S,
    api_doc: OpenApi,
) -> Router
where
    S: Send + Sync + Clone + 'static,
{
    let main_routes = OpenApiRouter::new()
        .nest(root_path, main_router)
        .with_state(app_state);
    let (router, api) = OpenApiRouter::with_openapi(api_doc)
        .merge(main_routes)
        .split_for_parts();

    router.merge(
        SwaggerUi::new(format!("{root_path}/swagger-ui"))
            .url(format!("{root_path}/api-docs/openapi.json"), api),
    )
}
