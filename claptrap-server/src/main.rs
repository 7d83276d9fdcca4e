use std::env;
use std::path::PathBuf;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};
use log::{info, warn};
use serde::Deserialize;

use claptrap_core::io::{list_models, normalize_folder, MODEL_EXTENSION};
use claptrap_core::{ClaptrapError, MarkovModel, PhraseGenerator, PhraseLength};

/// Upper bound on phrases returned by one request.
const MAX_COUNT: usize = 100;

/// Query parameters for the `/v1/phrase` endpoint
#[derive(Deserialize)]
struct PhraseParams {
	length: Option<String>, // "L" or "MIN-MAX"
	count: Option<usize>
}

/// Query parameters for `/v1/load_model`; `seed` makes the generator reproducible
#[derive(Deserialize)]
struct ModelQuery {
	name: Option<String>,
	seed: Option<u64>
}

struct Config {
	data_dir: PathBuf
}

struct SharedData {
	name: Option<String>,
	generator: Option<PhraseGenerator<MarkovModel>>
}

impl PhraseParams {
	/// Parses the requested length, defaulting to 60-100 characters.
	fn phrase_length(&self) -> Result<PhraseLength, String> {
		let parse = |part: &str| part.trim().parse::<usize>().map_err(|_| format!("Invalid length {part:?}"));
		match self.length.as_deref() {
			None => Ok(PhraseLength::range(60, 100)),
			Some(s) => match s.split_once('-') {
				Some((min, max)) => Ok(PhraseLength::range(parse(min)?, parse(max)?)),
				None => Ok(PhraseLength::Exact(parse(s)?)),
			}
		}
	}
}

/// Maps library errors to HTTP statuses: caller mistakes are 400, the rest 500.
fn error_response(error: &ClaptrapError) -> HttpResponse {
	match error {
		ClaptrapError::Validation(_) => HttpResponse::BadRequest().body(error.to_string()),
		_ => HttpResponse::InternalServerError().body(error.to_string()),
	}
}

/// HTTP GET endpoint `/v1/phrase`
///
/// Returns `count` phrases from the loaded model, one per line.
#[get("/v1/phrase")]
async fn get_phrase(data: web::Data<Mutex<SharedData>>, query: web::Query<PhraseParams>) -> impl Responder {
	let length = match query.phrase_length() {
		Ok(l) => l,
		Err(e) => return HttpResponse::BadRequest().body(e)
	};
	let count = query.count.unwrap_or(1);
	if count > MAX_COUNT {
		return HttpResponse::BadRequest().body(format!("At most {MAX_COUNT} phrases per request"));
	}

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let generator = match shared_data.generator.as_mut() {
		Some(g) => g,
		None => return HttpResponse::Conflict().body("No model loaded"),
	};

	match generator.phrases(length, count) {
		Ok(phrases) => HttpResponse::Ok().body(phrases.join("\n")),
		Err(e) => error_response(&e),
	}
}

#[get("/v1/models")]
async fn get_models(config: web::Data<Config>) -> impl Responder {
	match list_models(&config.data_dir) {
		Ok(names) => HttpResponse::Ok().body(names.join("\n")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list models")
	}
}

#[get("/v1/loaded_model")]
async fn get_loaded_model(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().body(shared_data.name.clone().unwrap_or_default())
}

#[put("/v1/load_model")]
async fn put_model(
	data: web::Data<Mutex<SharedData>>,
	config: web::Data<Config>,
	query: web::Query<ModelQuery>,
) -> impl Responder {
	let name = match &query.name {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty model name"),
	};
	if !list_models(&config.data_dir).is_ok_and(|names| names.iter().any(|n| n == name)) {
		return HttpResponse::NotFound().body(format!("Unknown model {name:?}"));
	}

	let model_path = config.data_dir.join(format!("{name}.{MODEL_EXTENSION}"));
	let model = match MarkovModel::from_file(&model_path) {
		Ok(m) => m,
		Err(e) => {
			warn!("failed to load {}: {e}", model_path.display());
			return error_response(&e);
		}
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	shared_data.generator = Some(match query.seed {
		Some(seed) => PhraseGenerator::seeded(model, seed),
		None => PhraseGenerator::from_entropy(model),
	});
	shared_data.name = Some(name.to_owned());
	info!("loaded model {name}");

	HttpResponse::Ok().body("Model loaded successfully")
}

/// Main entry point for the server.
///
/// Wraps the phrase generator in a `Mutex` and serves it over HTTP.
///
/// # Notes
/// - `CLAPTRAP_DATA` names the model folder (default `./data`).
/// - `CLAPTRAP_BIND` sets the listen address (default `127.0.0.1:5000`).
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let data_dir = normalize_folder(&env::var("CLAPTRAP_DATA").unwrap_or_else(|_| "./data".to_owned()));
	let bind = env::var("CLAPTRAP_BIND").unwrap_or_else(|_| "127.0.0.1:5000".to_owned());
	info!("serving models from {} on {bind}", data_dir.display());

	let shared_data = SharedData {
		name: None,
		generator: None,
	};
	let shared_model = web::Data::new(Mutex::new(shared_data));
	let config = web::Data::new(Config { data_dir });

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.app_data(config.clone())
			.service(get_phrase)
			.service(get_models)
			.service(put_model)
			.service(get_loaded_model)
	})
		.bind(bind)?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;

	fn params(length: Option<&str>) -> PhraseParams {
		PhraseParams { length: length.map(str::to_owned), count: None }
	}

	#[test]
	fn parses_length_parameter() {
		assert_eq!(params(None).phrase_length(), Ok(PhraseLength::range(60, 100)));
		assert_eq!(params(Some("42")).phrase_length(), Ok(PhraseLength::Exact(42)));
		assert_eq!(params(Some("10-20")).phrase_length(), Ok(PhraseLength::range(10, 20)));
		assert!(params(Some("abc")).phrase_length().is_err());
	}

	#[test]
	fn load_model_query_carries_the_seed() {
		let query = web::Query::<ModelQuery>::from_query("name=hockey&seed=7").unwrap();
		assert_eq!(query.name.as_deref(), Some("hockey"));
		assert_eq!(query.seed, Some(7));

		let query = web::Query::<ModelQuery>::from_query("name=hockey").unwrap();
		assert_eq!(query.seed, None);
	}
}
