/// sketchpad
///
/// A browser drawing pad backed by a synchronous tiny_http server. Draw a
/// digit, letter, clothing item or object, pick a model, and the server
/// rasterizes the strokes, preprocesses them and classifies the drawing.
///
/// Run with:
///   RUST_LOG=info cargo run --release
/// Then open http://127.0.0.1:7878
///
/// Settings come from `PAD_*` environment variables; see `PadConfig`.

mod state;
mod render;
mod routes;
mod handlers;
mod util;

use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use log::{error, info, warn};
use tiny_http::Server;

use sketchpad::{Backend, ModelRegistry, PadConfig};
use state::PadState;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match PadConfig::from_env() {
        Ok(c)  => c,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let registry = ModelRegistry::builtin(&config.models_dir);
    if let Err(e) = registry.validate() {
        error!("{}", e);
        return ExitCode::FAILURE;
    }
    if config.backend == Backend::Local {
        for id in registry.missing_files() {
            warn!("model file for '{}' not found in {}", id, config.models_dir.display());
        }
    }

    let server = match Server::http(&config.addr) {
        Ok(s)  => s,
        Err(e) => {
            error!("failed to bind {}: {}", config.addr, e);
            return ExitCode::FAILURE;
        }
    };

    match config.backend {
        Backend::Local  => info!("local backend, models from {}", config.models_dir.display()),
        Backend::Remote => info!("remote backend, posting to {}", config.remote_url),
    }
    info!("sketchpad listening on http://{}", config.addr);

    let shared_state = Arc::new(Mutex::new(PadState::new(&config, registry)));

    // Each request is dispatched on its own thread; handlers serialize on
    // the state mutex.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }

    ExitCode::SUCCESS
}
