use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::chain_error_response;
use super::models::{
    AppState, ChainResponse, DifficultyResponse, MineRequest, MineResponse, SetDifficultyRequest,
    ValidateResponse,
};
use crate::blockchain::MiningReport;
use crate::consensus::ProofOfWork;
use crate::error::ChainError;

/// Get the full blockchain.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let bc = state.blockchain.lock().expect("mutex poisoned");
    let resp = ChainResponse {
        length: bc.len(),
        difficulty: bc.difficulty(),
        algorithm: bc.algorithm(),
        chain: bc.blocks(),
    };
    HttpResponse::Ok().json(resp)
}

/// Indented JSON dump of the ledger, as printed by the console demos.
#[get("/chain/pretty/")]
pub async fn get_chain_pretty(state: web::Data<AppState>) -> impl Responder {
    let bc = state.blockchain.lock().expect("mutex poisoned");
    match bc.to_pretty_json() {
        Ok(dump) => HttpResponse::Ok()
            .content_type("application/json")
            .body(dump),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

/// Drop every block but genesis.
#[post("/reset/")]
pub async fn reset_chain(state: web::Data<AppState>) -> impl Responder {
    let mut bc = state.blockchain.lock().expect("mutex poisoned");
    bc.reset();
    *state.last_mining.lock().expect("mutex poisoned") = None;
    HttpResponse::Ok().json(DifficultyResponse {
        difficulty: bc.difficulty(),
    })
}

/// Validate the whole chain.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let bc = state.blockchain.lock().expect("mutex poisoned");
    let failure = bc.validate().err();
    HttpResponse::Ok().json(ValidateResponse {
        valid: failure.is_none(),
        length: bc.len(),
        difficulty: bc.difficulty(),
        failure,
    })
}

/// Mine a block carrying `payload` at the current difficulty and append it.
/// The nonce search runs on the blocking pool so workers stay responsive.
#[post("/mine/")]
pub async fn mine_block(state: web::Data<AppState>, req: web::Json<MineRequest>) -> impl Responder {
    let payload = req.into_inner().payload;
    let worker_state = state.clone();

    let result = web::block(move || -> Result<MiningReport, ChainError> {
        let mut bc = worker_state.blockchain.lock().expect("mutex poisoned");
        let candidate = bc.next_block(payload)?;
        let mut pow = ProofOfWork::new(worker_state.config.mining_timeout);
        bc.append(candidate, &mut pow)?;
        pow.last_report.ok_or(ChainError::MiningWorkerLost)
    })
    .await;

    let report = match result {
        Ok(Ok(report)) => report,
        Ok(Err(e)) => return chain_error_response(&e),
        Err(e) => {
            warn!("mining task failed: {e}");
            return HttpResponse::InternalServerError().body(e.to_string());
        }
    };

    info!(
        "MINER - sealed block #{} (hash={}, nonce={})",
        report.index, report.hash, report.nonce
    );
    let resp = MineResponse {
        mined_index: report.index,
        hash: report.hash.clone(),
        nonce: report.nonce,
        difficulty: report.difficulty,
        attempts: report.attempts,
        elapsed_ms: report.elapsed_ms,
    };
    *state.last_mining.lock().expect("mutex poisoned") = Some(report);
    HttpResponse::Ok().json(resp)
}

/// Get current PoW difficulty.
#[get("/difficulty/")]
pub async fn get_difficulty(state: web::Data<AppState>) -> impl Responder {
    let bc = state.blockchain.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(DifficultyResponse {
        difficulty: bc.difficulty(),
    })
}

/// Update PoW difficulty (affects future blocks only).
#[post("/difficulty/")]
pub async fn set_difficulty(
    state: web::Data<AppState>,
    body: web::Json<SetDifficultyRequest>,
) -> impl Responder {
    let max = state.config.max_difficulty;
    if body.difficulty > max {
        return HttpResponse::BadRequest().body(format!("difficulty too high (max {max})"));
    }
    let mut bc = state.blockchain.lock().expect("mutex poisoned");
    bc.set_difficulty(body.difficulty);
    info!("Difficulty set to {}", body.difficulty);
    HttpResponse::Ok().json(DifficultyResponse {
        difficulty: bc.difficulty(),
    })
}

/// Overwrite a block's payload in place to demonstrate tamper detection.
#[cfg(feature = "tamper")]
#[post("/tamper/")]
pub async fn tamper_block(
    state: web::Data<AppState>,
    body: web::Json<super::models::TamperRequest>,
) -> impl Responder {
    let body = body.into_inner();
    let mut bc = state.blockchain.lock().expect("mutex poisoned");
    let result = if body.reseal {
        bc.corrupt_and_reseal(body.index, body.payload)
    } else {
        bc.corrupt(body.index, body.payload)
    };
    if let Err(e) = result {
        return chain_error_response(&e);
    }
    let failure = bc.validate().err();
    HttpResponse::Ok().json(ValidateResponse {
        valid: failure.is_none(),
        length: bc.len(),
        difficulty: bc.difficulty(),
        failure,
    })
}
