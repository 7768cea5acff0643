#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web server for the subsidence risk dashboard.
//!
//! Configured through `DATA_DIR`, `STATIC_DIR`, `BIND_ADDR` and `PORT`.

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    subsidence_map_server::run_server().await
}
