//! Interactive mode for the server.
//!
//! Asks where the model outputs live and where to listen, reports any
//! missing input file up front, then starts the server.

use std::path::Path;

use dialoguer::{Confirm, Input};
use subsidence_map_dataset::{DEFAULT_DATA_DIR, DatasetPaths};

/// Input files under `dir` that do not exist.
fn missing_files(dir: &Path) -> Vec<String> {
    let paths = DatasetPaths::in_dir(dir);
    [
        &paths.probabilities,
        &paths.geometry,
        &paths.factor_groups,
        &paths.factor_items,
    ]
    .into_iter()
    .filter(|path| !path.is_file())
    .map(|path| path.display().to_string())
    .collect()
}

/// Runs the server after prompting for `DATA_DIR`, `BIND_ADDR` and
/// `PORT`.
///
/// # Errors
///
/// Returns an `std::io::Result` error if a prompt fails or the server
/// fails to start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Subsidence Risk Map Server");
    println!();

    let data_dir: String = Input::new()
        .with_prompt("Directory with the model outputs")
        .default(DEFAULT_DATA_DIR.to_string())
        .interact_text()
        .map_err(std::io::Error::other)?;

    let missing = missing_files(Path::new(&data_dir));
    if !missing.is_empty() {
        for path in &missing {
            log::warn!("Missing input file: {path}");
        }
        let proceed = Confirm::new()
            .with_prompt(format!(
                "{} of 4 input files are missing and loading will fail. Continue anyway?",
                missing.len()
            ))
            .default(false)
            .interact()
            .map_err(std::io::Error::other)?;
        if !proceed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default("127.0.0.1".to_string())
        .interact_text()
        .map_err(std::io::Error::other)?;

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(8080)
        .interact_text()
        .map_err(std::io::Error::other)?;

    // SAFETY: no other thread reads or writes the environment; the
    // server reads these once while starting.
    unsafe {
        std::env::set_var("DATA_DIR", &data_dir);
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", port.to_string());
    }

    super::run_server().await
}
