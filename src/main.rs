use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write;
use std::sync::Arc;

use groovefund_backend::{
    config::Config,
    database::{SeaOrmVerificationStore, create_pool, run_migrations},
    external::{BulkSmsService, StripeService, SupabaseClient},
    handlers,
    middlewares::{SessionMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::SessionVerifier,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let session_verifier = SessionVerifier::new(
        &config.session.jwt_secret,
        config.session.admin_emails.clone(),
    );

    // External clients
    let sms = BulkSmsService::new(config.sms.clone()).expect("Failed to build SMS client");
    if !sms.is_configured() {
        log::warn!("SMS credentials are not set, send-otp will fail until they are");
    }
    let backend =
        SupabaseClient::new(config.backend.clone()).expect("Failed to build backend client");
    if !backend.is_configured() {
        log::warn!("Backend URL or service key is not set, storage and payment calls will fail");
    }
    let backend = Arc::new(backend);
    let checkout = Arc::new(StripeService::new(config.stripe.clone()));
    let store = Arc::new(SeaOrmVerificationStore::new(pool.clone()));

    // Services
    let otp_service = OtpService::new(store, Arc::new(sms));
    let ticket_service =
        TicketService::new(backend.clone(), config.backend.tickets_bucket.clone());
    let blog_service = BlogService::new(backend.clone(), config.backend.blog_bucket.clone());
    let payment_service = PaymentService::new(backend, checkout);

    let json_limit = config.server.json_limit;

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(SessionMiddleware::new(session_verifier.clone()))
            .wrap(create_cors())
            .wrap(Logger::default())
            .app_data(handlers::json_config(json_limit))
            .app_data(web::Data::new(otp_service.clone()))
            .app_data(web::Data::new(ticket_service.clone()))
            .app_data(web::Data::new(blog_service.clone()))
            .app_data(web::Data::new(payment_service.clone()))
            .configure(swagger_config)
            .route("/health", web::get().to(handlers::health))
            .service(web::scope("/api").configure(handlers::api_config))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
