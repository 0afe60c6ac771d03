use actix_web::{middleware::Logger, web, App, HttpServer};

use lessongenie_server::{
    app_state::AppState,
    config::Config,
    handlers::{extract_questions, generate_specific_lesson, health_check, json_config},
    middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    if let Err(message) = config.validate_for_production() {
        log::error!("Invalid configuration: {}", message);
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, message));
    }

    let host = config.web_server_host.clone();
    let port = config.web_server_port;
    let max_upload_bytes = config.max_upload_bytes;

    let state = AppState::new(config).map_err(|e| {
        log::error!("Failed to initialise application state: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .app_data(json_config())
            .wrap(RequestIdMiddleware)
            .wrap(Logger::new(
                r#"%a "%r" %s %b %Dms request_id=%{x-request-id}o"#,
            ))
            .service(health_check)
            .service(extract_questions)
            .service(generate_specific_lesson)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
