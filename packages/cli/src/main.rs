#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive CLI for the subsidence map toolchain.
//!
//! Provides a unified entry point that lets users either start the
//! dashboard server or explore the model outputs directly in the
//! terminal with the same selection rules as the web dashboard.
//!
//! Uses `indicatif-log-bridge` (via [`subsidence_map_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and spinners never fight for the terminal.

mod explore;
mod render;

use dialoguer::Select;

/// Top-level tool selection for the subsidence map toolchain.
enum Tool {
    Server,
    Explore,
}

impl Tool {
    const ALL: &[Self] = &[Self::Server, Self::Explore];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Server => "Start dashboard server",
            Self::Explore => "Explore regions in the terminal",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = subsidence_map_cli_utils::init_logger();

    println!("Subsidence Risk Map Toolchain");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Server => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(subsidence_map_server::interactive::run())
            })
            .await??;
        }
        Tool::Explore => {
            let result = tokio::task::spawn_blocking(move || {
                explore::run(&multi).map_err(|e| e.to_string())
            })
            .await?;
            if let Err(e) = result {
                log::error!("Explorer failed: {e}");
                return Err(e.into());
            }
        }
    }

    Ok(())
}
