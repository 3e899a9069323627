use anyhow::{Context, Result};
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;

use wurzel::{
    bot::BotRunner,
    cli::args_from_env,
    config::Config,
    logging::init_tracing,
    world::{AccountPort, GardenPort, InMemoryFarm},
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = args_from_env()?;
    let mut config = Config::load(&args.config_path)
        .with_context(|| format!("failed to load config from {}", args.config_path.display()))?;
    if args.max_rounds.is_some() {
        config.r#loop.max_rounds = args.max_rounds;
    }

    let logging_guard = init_tracing(&config.logging).context("failed to initialize logging")?;
    tracing::info!(
        target: "bot",
        run_id = logging_guard.run_id(),
        config = %args.config_path.display(),
        max_rounds = ?config.r#loop.max_rounds,
        "wurzel_starting"
    );

    let shutdown = CancellationToken::new();
    let mut sigint =
        signal(SignalKind::interrupt()).context("unable to listen for SIGINT (Ctrl+C)")?;
    let mut sigterm = signal(SignalKind::terminate()).context("unable to listen for SIGTERM")?;
    let signal_shutdown = shutdown.clone();
    let signal_task = tokio::spawn(async move {
        let signal_name = tokio::select! {
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
            _ = signal_shutdown.cancelled() => return,
        };
        tracing::warn!(target: "bot", signal = signal_name, "shutdown_requested");
        signal_shutdown.cancel();
    });

    let farm = InMemoryFarm::from_snapshot(config.farm.clone());
    let mut runner = BotRunner::new(farm, config.scheduler.clone(), config.r#loop.clone());
    let summary = runner
        .run_loop(shutdown.clone(), |farm, sleep_for| {
            farm.advance(sleep_for.as_secs())
        })
        .await;

    shutdown.cancel();
    signal_task.await.context("signal task join failed")?;

    let farm = runner.world();
    eprintln!(
        "wurzel stopped after {} rounds ({} failed, {:?}): money={} weeds={} quest_open={}",
        summary.rounds,
        summary.failed_rounds,
        summary.stop_reason,
        farm.money(),
        farm.weeds().len(),
        farm.quest().is_some_and(|quest| !quest.done),
    );
    Ok(())
}
