use actix_web::{HttpResponse, Responder, get, web};

use super::models::{
    AppState, AvalancheQuery, AvalancheResponse, HashRateQuery, StatsResponse,
};
use crate::digest::{digest, hamming_distance, measure_hash_rate};

/// Default and maximum iteration counts for the hash-rate measurement.
const DEFAULT_HASH_ITERATIONS: u64 = 10_000;
const MAX_HASH_ITERATIONS: u64 = 1_000_000;

#[get("/stats/")]
pub async fn get_stats(state: web::Data<AppState>) -> impl Responder {
    // Snapshot each part under its own short lock
    let (height, difficulty, algorithm, valid) = {
        let bc = state.blockchain.lock().expect("mutex poisoned");
        (bc.len(), bc.difficulty(), bc.algorithm(), bc.is_valid())
    };
    let last_mining = state.last_mining.lock().expect("mutex poisoned").clone();
    let (rounds_played, admins) = {
        let net = state.network.lock().expect("mutex poisoned");
        (net.rounds_played(), net.participants().len())
    };

    HttpResponse::Ok().json(StatsResponse {
        height,
        difficulty,
        algorithm,
        valid,
        last_mining,
        rounds_played,
        admins,
    })
}

/// Time repeated digests with the configured algorithm.
#[get("/hashrate/")]
pub async fn get_hash_rate(
    state: web::Data<AppState>,
    query: web::Query<HashRateQuery>,
) -> impl Responder {
    let query = query.into_inner();
    let iterations = query.iterations.unwrap_or(DEFAULT_HASH_ITERATIONS);
    if iterations > MAX_HASH_ITERATIONS {
        return HttpResponse::BadRequest()
            .body(format!("iterations must be <= {MAX_HASH_ITERATIONS}"));
    }
    let input = query.input.unwrap_or_else(|| "hello".to_string());
    let algorithm = state.config.algorithm;

    match web::block(move || measure_hash_rate(algorithm, &input, iterations)).await {
        Ok(rate) => HttpResponse::Ok().json(rate),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

/// Digest two inputs and report how many bits differ.
#[get("/avalanche/")]
pub async fn get_avalanche(
    state: web::Data<AppState>,
    query: web::Query<AvalancheQuery>,
) -> impl Responder {
    let algorithm = state.config.algorithm;
    let digest_a = digest(algorithm, query.a.as_bytes());
    let digest_b = digest(algorithm, query.b.as_bytes());
    let bits_changed = hamming_distance(&digest_a, &digest_b).unwrap_or_default();

    HttpResponse::Ok().json(AvalancheResponse {
        algorithm,
        digest_a,
        digest_b,
        bits_changed,
        total_bits: algorithm.hex_len() * 4,
    })
}
