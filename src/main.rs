use log::{error, info};

#[tokio::main]
async fn main()
{   env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    ).init();

    let config = match motivo::config::AgentConfig::from_env()
    {   Ok(config) => config
      , Err(e) => {
          error!("{}", e);
          std::process::exit(1);
        }
    };
    info!("Starting motivo on {}", config.bind_addr());

    if let Err(e) = motivo::server::serve(config).await
    {   error!("{}", e);
        std::process::exit(1);
    }
}
