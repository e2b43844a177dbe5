use actix_web::{HttpResponse, Responder, get, post, web};
use log::debug;

use super::chain_error_response;
use super::models::{AdminStatus, AppState, NetworkResponse, RoundRequest, SimulateRequest};

/// Upper bound on rounds per simulate call.
const MAX_SIMULATE_ROUNDS: u64 = 100;

/// Golden ledger and every admin's replica at a glance.
#[get("/network/")]
pub async fn get_network(state: web::Data<AppState>) -> impl Responder {
    let net = state.network.lock().expect("mutex poisoned");
    let admins = net
        .participants()
        .iter()
        .map(|p| AdminStatus {
            name: p.name.clone(),
            length: p.ledger().len(),
            valid: p.ledger().is_valid(),
            tip: p
                .ledger()
                .latest_block()
                .map(|b| b.hash().to_string())
                .unwrap_or_default(),
        })
        .collect();

    HttpResponse::Ok().json(NetworkResponse {
        rounds_played: net.rounds_played(),
        flip_probability: net.flip_probability(),
        golden_length: net.golden().len(),
        golden_valid: net.golden().is_valid(),
        admins,
    })
}

/// One admin's private replica.
#[get("/network/admins/{name}/")]
pub async fn get_admin(state: web::Data<AppState>, path: web::Path<(String,)>) -> impl Responder {
    let name = path.into_inner().0;
    let net = state.network.lock().expect("mutex poisoned");
    match net.participant(&name) {
        Some(admin) => HttpResponse::Ok().json(admin),
        None => HttpResponse::NotFound().body(format!("unknown admin {name}")),
    }
}

/// Run one voting round on a caller-supplied payload.
#[post("/network/round/")]
pub async fn post_round(
    state: web::Data<AppState>,
    body: web::Json<RoundRequest>,
) -> impl Responder {
    let mut net = state.network.lock().expect("mutex poisoned");
    match net.propose(body.into_inner().payload) {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => chain_error_response(&e),
    }
}

/// Run several rounds with generated payloads ("a new block N").
#[post("/network/simulate/")]
pub async fn post_simulate(
    state: web::Data<AppState>,
    body: web::Json<SimulateRequest>,
) -> impl Responder {
    if body.rounds == 0 || body.rounds > MAX_SIMULATE_ROUNDS {
        return HttpResponse::BadRequest()
            .body(format!("rounds must be within 1..={MAX_SIMULATE_ROUNDS}"));
    }
    let mut net = state.network.lock().expect("mutex poisoned");
    match net.simulate(body.rounds) {
        Ok(outcomes) => {
            debug!(
                "SIMULATE - {} rounds, {} accepted",
                outcomes.len(),
                outcomes.iter().filter(|o| o.accepted).count()
            );
            HttpResponse::Ok().json(outcomes)
        }
        Err(e) => chain_error_response(&e),
    }
}
