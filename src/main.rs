use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::info;

use duckchain::api::{self, AppState};
use duckchain::config::AppConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    let (host, port) = (config.host.clone(), config.port);

    info!(
        "Duckchain is live! algorithm={} difficulty={} admins={} flip_probability={}",
        config.algorithm,
        config.difficulty,
        config.admins.len(),
        config.flip_probability
    );
    println!("🦆 Starting duckchain API at http://{host}:{port}");

    let state = web::Data::new(AppState::from_config(config).map_err(std::io::Error::other)?);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
