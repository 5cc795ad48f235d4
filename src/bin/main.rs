//! Binary entry point: load configuration, open the account store, wire the
//! oracle client, and launch the HTTP server.

use clap::Parser;
use cryptonote_lws::config::ServerConfig;
use cryptonote_lws::handlers::AppState;
use cryptonote_lws::kv::Environment;
use cryptonote_lws::oracle::OracleClient;

#[rocket::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = ServerConfig::parse();

    let env = Environment::open(&config.db_path, config.db_map_size)
        .unwrap_or_else(|e| panic!("failed to open account store at {}: {}", config.db_path.display(), e));

    let oracle = OracleClient::new(
        &config.daemon_url,
        config.daemon_send_timeout(),
        config.daemon_recv_timeout(),
    );

    let state = AppState::new(env, oracle, config.max_pending_requests);

    let (host, port) = config
        .parse_bind_address()
        .unwrap_or_else(|e| panic!("invalid bind URI {}: {}", config.bind_uri, e));

    let figment = rocket::Config::figment()
        .merge(("address", host))
        .merge(("port", port))
        .merge(("workers", config.worker_threads_or_default()));

    let rocket = cryptonote_lws::http::build(state, figment);

    if let Err(e) = rocket.launch().await {
        log::error!("server terminated: {}", e);
        std::process::exit(1);
    }
}
