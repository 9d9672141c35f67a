use anyhow::Context;
use svault_domain::config::ApiConfig;
use svault_kernel::config::load_config;
use svault_logger::{Logger, parse_level, parse_rotation};
use svault_server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1);
    let cfg: ApiConfig =
        load_config(path.as_deref()).context("Critical: Configuration is malformed")?;

    let logging = &cfg.logging;
    let builder = Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .level(parse_level(&logging.level)?)
        .json(logging.json);
    let builder = match logging.filter.as_deref() {
        Some(filter) => builder.env_filter(filter),
        None => builder,
    };
    let _log = match &logging.directory {
        Some(directory) => {
            builder.path(directory).rotation(parse_rotation(&logging.rotation)?).init()?
        },
        None => builder.init()?,
    };

    Server::builder().config(cfg).build().await?.run().await
}
