use actix_files::Files;
use actix_web::{web, App, HttpServer};
use notes_backend::assets::build_asset_store;
use notes_backend::assets::local::PUBLIC_PREFIX as UPLOADS_PREFIX;
use notes_backend::config::{AppConfig, AssetBackendConfig};
use notes_backend::infra::state::build_state;
use notes_backend::middleware::{CheckUser, RequestTrace, StructuredLogger, TraceSpan};
use notes_backend::routes;
use notes_backend::state::security_config::SecurityConfig;
use tracing::info;

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // A missing .env is fine; the runtime environment may already carry everything.
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    println!(
        "🚀 Starting notes backend on http://{}:{}",
        config.host, config.port
    );

    let assets = match build_asset_store(&config.assets) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("❌ Failed to set up asset store: {e}");
            std::process::exit(1);
        }
    };
    let uploads_dir = match &config.assets {
        AssetBackendConfig::Local { dir } => Some(dir.clone()),
        AssetBackendConfig::Cloudinary(_) => None,
    };
    if let Some(dir) = &uploads_dir {
        std::fs::create_dir_all(dir)?;
    }

    let security_config = SecurityConfig::new(config.jwt_secret.as_bytes());

    let app_state = match build_state()
        .with_db(config.db.clone())
        .with_security(security_config)
        .with_sessions(config.session_backend)
        .with_assets(assets)
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to build application state: {e}");
            std::process::exit(1);
        }
    };

    info!(
        db = config.db.label(),
        sessions = app_state.sessions.name(),
        assets = app_state.assets.name(),
        "application state ready"
    );
    println!("✅ Database connected");

    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        let app = App::new()
            .wrap(CheckUser)
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure);

        match &uploads_dir {
            Some(dir) => app.service(Files::new(UPLOADS_PREFIX, dir)),
            None => app,
        }
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
