use actix_cors::Cors;
use actix_web::{
    dev::Server, error::InternalError, http::header, middleware, web, App,
    HttpResponse, HttpServer,
};

use crate::{
    configuration::{AppState, State},
    controller::{calculer, capacite_emprunt, version},
    error::{Error, ErrorBody},
};

pub async fn server_task(app_state: &AppState<State>) -> Result<(), Error> {
    let server = init_server(app_state.clone())?;
    server.await?;
    Ok(())
}

/// Routes shared by the binary and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(calculer::index)
        .service(capacite_emprunt::index)
        .service(version::index);
}

/// JSON extractor settings; malformed bodies answer 400 with a `detail`.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            let response = HttpResponse::BadRequest().json(ErrorBody {
                detail: err.to_string(),
            });
            InternalError::from_response(err, response).into()
        })
}

fn init_server(app_state: AppState<State>) -> Result<Server, Error> {
    let host = app_state.config.server_host.to_owned();
    let port = app_state.config.port;
    let workers = app_state.config.workers;

    let mut server = HttpServer::new(move || {
        let app = app_state.clone();
        let allowed_cors = String::from("*");
        let cors_access_all =
            app.config.allowed_origins.contains(&allowed_cors);
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                if cors_access_all {
                    return true;
                }
                let allowed = &app.config.allowed_origins;
                if let Ok(origin) = origin.to_str() {
                    return allowed.contains(&origin.to_owned());
                }
                false
            })
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![header::ACCEPT])
            .allowed_header(header::CONTENT_TYPE);

        App::new()
            .wrap(cors)
            .wrap(middleware::Compress::default())
            .app_data(web::Data::new(app_state.clone()))
            .app_data(json_config(app_state.config.json_limit))
            .configure(configure)
    });

    if let Some(workers) = workers {
        server = server.workers(workers);
    }

    let server = server.bind((host, port))?.run();
    Ok(server)
}
