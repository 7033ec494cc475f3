// Kiwi3D: a software-rasterized 3D scene viewer

mod renderer;

use kiwi_3d::config::ViewerConfig;
use winit::event_loop::EventLoop;

/// `config_filter` wins over `RUST_LOG`. wgpu stays at warn unless asked for.
fn init_logging(config_filter: Option<&str>) {
    let env = env_logger::Env::default().default_filter_or("info,wgpu_core=warn,wgpu_hal=warn");
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(filter) = config_filter {
        builder.parse_filters(filter);
    }
    builder.init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, rejected) = ViewerConfig::from_env();
    init_logging(config.log_filter.as_deref());
    if let Some(err) = rejected {
        log::warn!("{}, using {}x{}", err, config.width, config.height);
    }
    log::info!("starting {}", config.title);

    let event_loop =
        EventLoop::new().map_err(|err| anyhow::anyhow!("failed to create event loop: {err}"))?;

    let viewer = renderer::Viewer::new(&event_loop, config).await?;

    viewer.run(event_loop)
}
