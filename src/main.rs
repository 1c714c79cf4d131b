use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};

use eduhub_server::{
    app_state::AppState, config::Config, errors::AppError, graphql::create_schema, handlers,
    middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    if config.is_production() {
        config.validate_for_production();
    }

    let host = config.web_server_host.clone();
    let port = config.web_server_port;
    let allowed_origin = config.cors_allowed_origin.clone();
    let max_upload_bytes = config.max_upload_bytes;

    let app_state = AppState::new(config)
        .await
        .map_err(|e: AppError| std::io::Error::other(e.to_string()))?;

    let schema = create_schema(app_state.clone());
    let jwt_service = app_state.jwt_service.clone();
    let app_state = Arc::new(app_state);

    log::info!("Starting HTTP server on {}:{}", host, port);
    log::info!("GraphiQL playground: http://{}:{}/graphiql", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .expose_headers(vec![header::HeaderName::from_static("x-request-id")])
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::Data::new(schema.clone()))
            .app_data(web::Data::new(jwt_service.clone()))
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .app_data(web::JsonConfig::default().limit(1024 * 1024))
            .wrap(RequestIdMiddleware)
            // outside the request-id middleware so the header is already set
            .wrap(Logger::new(r#"%a "%r" %s %b %Dms request_id=%{x-request-id}o"#))
            .wrap(cors)
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
