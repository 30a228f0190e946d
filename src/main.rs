use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use study_pack_server::{
    app_state::AppState,
    config::Config,
    errors::AppError,
    handlers::{self, not_found},
    middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    std::panic::set_hook(Box::new(|info| {
        log::error!("Unrecoverable panic: {}", info);
    }));

    let config = Config::from_env();
    config.warn_missing_services();

    let bind_addr = (config.web_server_host.clone(), config.web_server_port);
    log::info!(
        "Starting study pack server on {}:{} ({})",
        bind_addr.0,
        bind_addr.1,
        config.environment
    );

    let state = AppState::new(config);
    let json_limit = state.json_body_limit();
    let upload_limit = state.config.max_upload_bytes;
    let state = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(RequestIdMiddleware)
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(upload_limit.max(json_limit)))
            .app_data(
                web::JsonConfig::default()
                    .limit(json_limit)
                    .error_handler(|err, _req| {
                        AppError::input(format!("Invalid JSON body: {}", err)).into()
                    }),
            )
            .configure(handlers::configure)
            .default_service(web::route().to(not_found))
    })
    .bind(bind_addr)?
    .run()
    .await
}
