use clap::Parser;
use poliglotta_core::UtcOffset;
use tokio::task::LocalSet;
use tracing::warn;
use tracing_subscriber::EnvFilter;

// tutto il client vive in lib.rs, qui solo avvio e logging
use poliglotta_client::{app, Args};

fn main() -> anyhow::Result<()> {
    // su Unix il fuso locale si legge solo finché il processo ha un solo thread:
    // prima di creare il runtime
    let local_offset = UtcOffset::current_local_offset();

    // log su stderr, così non si mescolano con la chat su stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let local_offset = local_offset.unwrap_or_else(|err| {
        warn!(error = %err, "local UTC offset unavailable, showing times in UTC");
        UtcOffset::UTC
    });
    let args = Args::parse();

    // il SyncLoop non è Send: tutto gira su un solo thread dentro un LocalSet
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(LocalSet::new().run_until(app::run(args, local_offset)))
}
