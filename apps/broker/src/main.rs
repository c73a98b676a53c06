use actix_web::{web, App, HttpServer};
use tracing::{error, info, warn};
use vnf_broker::config::tls::load_server_config;
use vnf_broker::config::BrokerConfig;
use vnf_broker::infra::state::StateBuilder;
use vnf_broker::middleware::{AccessLog, RequestTrace, TraceSpan};
use vnf_broker::routes;

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Configuration comes from the environment only; see BrokerConfig for
    // the variable names.
    let config = match BrokerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    if config.allowed_targets.is_empty() {
        warn!("no target allow-list configured: any target is permitted unless a token is scoped");
    } else {
        info!(targets = config.allowed_targets.len(), "target allow-list loaded");
    }
    if !config.allowed_management_ips.is_empty() {
        info!(
            callers = config.allowed_management_ips.len(),
            "management caller allow-list loaded"
        );
    }
    if config.debug {
        warn!("debug mode enabled: internal error detail is returned to callers");
    }

    let app_state = match StateBuilder::from_config(&config).build() {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };

    // Wrap AppState with web::Data before passing to HttpServer
    let data = web::Data::new(app_state);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(AccessLog)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    });

    let bind_addr = (config.host.as_str(), config.port);
    let server = match &config.tls {
        Some(tls) => {
            let tls_config = match load_server_config(tls) {
                Ok(tls_config) => tls_config,
                Err(e) => {
                    error!(error = %e, "failed to load listener TLS identity");
                    std::process::exit(1);
                }
            };
            info!(host = %config.host, port = config.port, "starting VNF broker (https)");
            server.bind_rustls_0_23(bind_addr, tls_config)?
        }
        None => {
            warn!("no listener TLS identity configured: serving plain HTTP");
            info!(host = %config.host, port = config.port, "starting VNF broker (http)");
            server.bind(bind_addr)?
        }
    };

    server.run().await
}
