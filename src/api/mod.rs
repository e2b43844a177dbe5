mod chain;
mod health;
pub mod models;
mod network;
mod stats;

use actix_web::HttpResponse;
use actix_web::web::{self, ServiceConfig};

use crate::error::ChainError;
pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    let scope = web::scope("/api/v1")
        .service(health::health_check)
        .service(chain::get_chain)
        .service(chain::get_chain_pretty)
        .service(chain::reset_chain)
        .service(chain::validate_chain)
        .service(chain::mine_block)
        .service(chain::get_difficulty)
        .service(chain::set_difficulty)
        .service(network::get_network)
        .service(network::get_admin)
        .service(network::post_round)
        .service(network::post_simulate)
        .service(stats::get_stats)
        .service(stats::get_hash_rate)
        .service(stats::get_avalanche);

    #[cfg(feature = "tamper")]
    let scope = scope.service(chain::tamper_block);

    cfg.service(scope);
}

/// Map a ledger error onto an HTTP status.
fn chain_error_response(e: &ChainError) -> HttpResponse {
    match e {
        ChainError::MiningCancelled { .. } => HttpResponse::ServiceUnavailable().body(e.to_string()),
        ChainError::DifficultyOutOfRange { .. }
        | ChainError::IndexOutOfRange { .. }
        | ChainError::InvalidProbability(_) => HttpResponse::BadRequest().body(e.to_string()),
        ChainError::EmptyChain | ChainError::MiningWorkerLost => {
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use actix_web::{App, test};
    use serde_json::{Value, json};

    fn state() -> web::Data<AppState> {
        let config = AppConfig {
            flip_probability: 0.0,
            rng_seed: Some(7),
            ..AppConfig::default()
        };
        web::Data::new(AppState::from_config(config).unwrap())
    }

    #[actix_web::test]
    async fn health_and_fresh_chain() {
        let app = test::init_service(App::new().app_data(state()).configure(init_routes)).await;

        let req = test::TestRequest::get().uri("/api/v1/health/").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get().uri("/api/v1/chain/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["length"], 1);
        assert_eq!(body["algorithm"], "sha256");
        assert_eq!(body["chain"][0]["previous_hash"], "0");
    }

    #[actix_web::test]
    async fn mine_then_validate() {
        let app = test::init_service(App::new().app_data(state()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/mine/")
            .set_json(json!({ "payload": "Donald Duck" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["mined_index"], 1);
        assert!(body["hash"].as_str().unwrap().starts_with('0'));

        let req = test::TestRequest::post()
            .uri("/api/v1/mine/")
            .set_json(json!({ "payload": { "transaction": "Daffy Duck sent 3 quackers" } }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["mined_index"], 2);

        let req = test::TestRequest::get().uri("/api/v1/validate/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["valid"], true);
        assert_eq!(body["length"], 3);
        assert!(body["failure"].is_null());

        let req = test::TestRequest::get().uri("/api/v1/stats/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["height"], 3);
        assert_eq!(body["last_mining"]["index"], 2);
    }

    #[actix_web::test]
    async fn difficulty_is_bounded() {
        let app = test::init_service(App::new().app_data(state()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/difficulty/")
            .set_json(json!({ "difficulty": 99 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/v1/difficulty/")
            .set_json(json!({ "difficulty": 2 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["difficulty"], 2);

        let req = test::TestRequest::get().uri("/api/v1/difficulty/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["difficulty"], 2);
    }

    #[actix_web::test]
    async fn voting_rounds() {
        let app = test::init_service(App::new().app_data(state()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/network/round/")
            .set_json(json!({ "payload": "a new block 0" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["accepted"], true);
        assert_eq!(body["agree"], 9);

        let req = test::TestRequest::post()
            .uri("/api/v1/network/simulate/")
            .set_json(json!({ "rounds": 0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/v1/network/simulate/")
            .set_json(json!({ "rounds": 3 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 3);

        let req = test::TestRequest::get().uri("/api/v1/network/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["rounds_played"], 4);
        assert_eq!(body["golden_length"], 5);
        assert_eq!(body["admins"].as_array().unwrap().len(), 9);
        assert_eq!(body["admins"][0]["valid"], true);

        let req = test::TestRequest::get()
            .uri("/api/v1/network/admins/Huey/")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["name"], "Huey");
        assert_eq!(body["ledger"]["chain"].as_array().unwrap().len(), 5);

        let req = test::TestRequest::get()
            .uri("/api/v1/network/admins/Scrooge/")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn pretty_dump_and_reset() {
        let app = test::init_service(App::new().app_data(state()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/mine/")
            .set_json(json!({ "payload": "Daffy Duck" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get().uri("/api/v1/chain/pretty/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let text = std::str::from_utf8(&body).unwrap();
        assert!(text.contains("\"chain\": ["));
        assert!(text.contains("Daffy Duck"));

        let req = test::TestRequest::post().uri("/api/v1/reset/").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get().uri("/api/v1/chain/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["length"], 1);
    }

    #[actix_web::test]
    async fn digest_measurements() {
        let app = test::init_service(App::new().app_data(state()).configure(init_routes)).await;

        let req = test::TestRequest::get()
            .uri("/api/v1/avalanche/?a=hello&b=hellO")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_bits"], 256);
        assert!(body["bits_changed"].as_u64().unwrap() > 0);
        assert_ne!(body["digest_a"], body["digest_b"]);

        let req = test::TestRequest::get()
            .uri("/api/v1/hashrate/?iterations=100")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["iterations"], 100);
        assert_eq!(body["algorithm"], "sha256");

        let req = test::TestRequest::get()
            .uri("/api/v1/hashrate/?iterations=5000000")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }
}
