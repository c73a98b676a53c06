use actix_web::web;

pub mod health;
pub mod proxy;

/// Register every route. Middleware that applies to the whole app
/// (`RequestTrace`, `TraceSpan`, `AccessLog`) is wired by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check routes: /health
    cfg.configure(health::configure_routes);

    // Proxy route: /vnfproxy
    cfg.configure(proxy::configure_routes);
}
