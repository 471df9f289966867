use tracing::{error, info};

use mortgage_sim_server::{
    configuration::{get_configuration, set_configuration, AppState, State},
    error::Error,
    server,
};

#[actix_web::main]
async fn main() -> Result<(), Error> {
    let result = app_main().await;

    if let Err(err) = &result {
        error!("{}", err);
    }

    result
}

async fn app_main() -> Result<(), Error> {
    set_configuration()?;
    let config = get_configuration()?;

    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level(config.log_level)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!(
        host = %config.server_host,
        port = config.port,
        "starting mortgage simulation server"
    );

    let app_state = AppState::new(State::new(config));
    server::server_task(&app_state).await?;

    Ok(())
}
