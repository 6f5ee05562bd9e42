use rift::app::RiftApp;
use rift::config::RiftConfig;
use rift::logging::init_logging;

fn main() -> anyhow::Result<()> {
    let config = RiftConfig::from_env();
    init_logging(config.logging.clone());
    log::info!("assets from {}", config.asset_dir.display());

    RiftApp::new(config)?.run()
}
