// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use clap::Parser;
use tokio::signal;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use xtop::cli::Cli;
use xtop::common::config::{AppConfig, SessionConfig};
use xtop::device::ensure_supported_os;
use xtop::view::{run_dashboard, run_snapshot};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = ensure_supported_os() {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let config = match cli.session_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config, cli.snapshot);

    let result = if cli.snapshot {
        run_snapshot(&config).await.map(|json| println!("{json}"))
    } else {
        setup_panic_handler();
        let shutdown = Arc::new(AtomicBool::new(false));
        spawn_signal_listeners(Arc::clone(&shutdown));
        run_dashboard(&config, shutdown).await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to `--trace-file` when given. Otherwise the dashboard
/// discards them since it owns the terminal, and snapshot mode uses stderr.
fn init_tracing(config: &SessionConfig, snapshot: bool) {
    let writer = match &config.trace_file {
        Some(path) => match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
            Err(e) => {
                eprintln!("Warning: cannot open trace file {}: {e}", path.display());
                BoxMakeWriter::new(std::io::sink)
            }
        },
        None if snapshot => BoxMakeWriter::new(std::io::stderr),
        None => BoxMakeWriter::new(std::io::sink),
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| AppConfig::DEFAULT_TRACE_DIRECTIVE.into()),
        )
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();
}

// Raise the shutdown flag; the session loop notices it on its next input
// slice and releases backends on the way out.
fn spawn_signal_listeners(shutdown: Arc<AtomicBool>) {
    let flag = Arc::clone(&shutdown);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            flag.store(true, Ordering::Relaxed);
        }
    });

    #[cfg(unix)]
    tokio::spawn(async move {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                shutdown.store(true, Ordering::Relaxed);
            }
            Err(e) => tracing::warn!("Failed to listen for SIGTERM: {e}"),
        }
    });
}

// Restore the terminal before the panic message is printed
fn setup_panic_handler() {
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::cursor::Show,
            crossterm::terminal::LeaveAlternateScreen
        );
        default_panic(panic_info);
    }));
}
