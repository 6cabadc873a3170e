//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod settings;
mod state_builders;

pub use config::ServerConfig;
pub use settings::{ServerSettings, SettingsError};

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;
use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use spending_api::Trace;
#[cfg(debug_assertions)]
use spending_api::doc::ApiDoc;
use spending_api::inbound::http::configure_api;
use spending_api::inbound::http::error::{path_config, query_config};
use spending_api::inbound::http::health::{HealthState, live, ready};
use spending_api::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let api = web::scope("/api/v2").configure(configure_api);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(query_config())
        .app_data(path_config())
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: pre-built [`ServerConfig`] containing the binding, adapters and optional metrics.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(config.prometheus);

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use rstest::rstest;
    use url::Url;

    fn deps() -> AppDependencies {
        let health_state = web::Data::new(HealthState::new());
        health_state.mark_ready();
        let config = ServerConfig::new(
            "127.0.0.1:0".parse().expect("valid addr"),
            Url::parse("https://files.example.gov/").expect("valid url"),
        );
        AppDependencies {
            health_state,
            http_state: build_http_state(&config),
        }
    }

    #[rstest]
    #[case("/health/ready", StatusCode::OK)]
    #[case("/health/live", StatusCode::OK)]
    #[case("/api/v2/recipient/children/001006360", StatusCode::NOT_FOUND)]
    #[actix_web::test]
    async fn app_serves_probes_and_requires_trailing_slash(
        #[case] uri: &str,
        #[case] expected: StatusCode,
    ) {
        let app = test::init_service(build_app(deps())).await;
        let res = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn api_errors_carry_trace_header() {
        let app = test::init_service(build_app(deps())).await;
        let res = test::call_service(
            &app,
            TestRequest::get()
                .uri("/api/v2/recipient/not-an-id/")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(res.headers().contains_key("trace-id"));
    }
}
