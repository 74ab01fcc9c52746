use anyhow::{Context, anyhow};
use clap::Parser;
use std::time::Duration;
use thermo_cli::{Cli, Console};
use thermo_control::ControlLoop;
use thermo_core::SharedState;
use thermo_network::HttpServer;
use thermo_storage::SettingsStore;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building the async runtime")?;

    let result = runtime.block_on(run(cli));

    // A blocked stdin read cannot be cancelled; don't wait for it.
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    info!(version = thermo_core::VERSION, "thermo starting");

    let config = cli.control_config();
    config.validate()?;

    let store = SettingsStore::new(&cli.config);
    let settings = store.load_or_init().await;
    info!(
        path = %store.path().display(),
        hvac_mode = %settings.hvac_mode,
        fan_mode = %settings.fan_mode,
        heat_setpoint = settings.heat_setpoint,
        cool_setpoint = settings.cool_setpoint,
        offset = settings.calibration_offset,
        "settings loaded"
    );

    let state = SharedState::new(settings);
    let shutdown = CancellationToken::new();

    // Bind before the relays are touched so a busy port fails cleanly.
    let http = if cli.no_http {
        None
    } else {
        let server = HttpServer::bind(cli.http_config(), state.clone())
            .await
            .context("starting the HTTP form")?;
        info!(addr = %server.local_addr()?, "HTTP form listening");
        Some(tokio::spawn(server.serve(shutdown.clone())))
    };

    let sensor = cli.sensor();
    let actuator = cli.actuator().await.context("opening the relay board")?;
    let control = ControlLoop::new(config, state.clone(), sensor, actuator);
    let mut control_task = tokio::spawn(control.run(shutdown.clone()));

    let console = Console::new(state, store);
    tokio::spawn(console.run(tokio::io::stdin(), tokio::io::stdout(), shutdown.clone()));
    println!("thermo {}: type h for help", thermo_core::VERSION);

    let finished = tokio::select! {
        result = &mut control_task => Some(result),
        () = shutdown_signal() => {
            info!("termination signal received");
            None
        }
        () = shutdown.cancelled() => None,
    };
    shutdown.cancel();

    let outcome = match finished {
        Some(result) => result,
        None => control_task.await,
    };

    if let Some(http) = http {
        match http.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = %e, "HTTP server failed"),
            Err(e) => error!(error = %e, "HTTP server task failed"),
        }
    }

    match outcome {
        Ok(Ok(())) => {
            info!("thermo stopped, actuators off");
            Ok(())
        }
        Ok(Err(e)) => Err(anyhow::Error::new(e).context("control loop failed")),
        Err(e) => Err(anyhow!("control loop task failed: {e}")),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
