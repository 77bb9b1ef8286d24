use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{http::header, web, App, HttpServer};
use std::sync::Arc;
use user_gateway::auth::middleware::TOKEN_HEADER;
use user_gateway::auth::JwtService;
use user_gateway::backend::client::HttpUserBackend;
use user_gateway::{configure_user_routes, load_config, AppState, StartupError, SERVICE_NAME, VERSION};

#[actix_web::main]
async fn main() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();

    let config = load_config()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str()))
        .init();

    log::info!("Starting {} v{}", SERVICE_NAME, VERSION);
    log::info!("User service at {}", config.user_srv.base_url());
    log::debug!("{:?}", config);

    let backend = Arc::new(HttpUserBackend::new(&config.user_srv)?);
    let jwt = Arc::new(JwtService::from_config(&config.jwt));
    let state = web::Data::new(AppState::new(backend, jwt.clone(), config.locale));

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    log::info!("Listening on {} with {} workers", bind_address, config.server.workers);

    let cors_origins = config.cors_origins.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(build_cors(&cors_origins))
            .app_data(state.clone())
            .configure(configure_user_routes(jwt.clone()))
    })
    .workers(config.server.workers)
    .bind(&bind_address)
    .map_err(|e| StartupError::ServerBind(format!("{}: {}", bind_address, e)))?
    .run()
    .await
    .map_err(|e| StartupError::ServerBind(e.to_string()))
}

fn build_cors(origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static(TOKEN_HEADER),
        ])
        .max_age(3600);

    if origins.iter().any(|origin| origin == "*") {
        return cors.allow_any_origin();
    }
    origins.iter().fold(cors, |cors, origin| cors.allowed_origin(origin))
}
