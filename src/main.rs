use anyhow::Context;
use lendtable_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load lendtable settings")?;
    lendtable_telemetry::init(&settings.telemetry);

    tracing::info!(
        env = ?settings.environment,
        source = %settings.data.source,
        "lendtable-app bootstrap starting"
    );

    lendtable_app::serve(&settings).await?;

    tracing::info!("lendtable-app shut down");
    Ok(())
}
