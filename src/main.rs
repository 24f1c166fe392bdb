extern crate actix_web;
extern crate chrono;
extern crate dotenv;
extern crate env_logger;
extern crate hex;
extern crate jsonwebtoken;
extern crate log;
extern crate rand;
extern crate serde;
extern crate serde_json;
extern crate sha2;
extern crate sqlx;
extern crate thiserror;
extern crate tokio;

mod context;
mod error;
mod handlers;
mod middlewares;
pub mod models;
pub mod request;
pub mod response;
mod tokener;

use actix_web::web::{delete, get, patch, post, put, resource, scope, Data};
use actix_web::HttpServer;
use middlewares::jwt::{Jwt, JWT_SECRET};
use sqlx::postgres::PgPoolOptions;

#[actix_web::main]
async fn main() -> Result<(), std::io::Error> {
    dotenv::dotenv().ok();
    env_logger::init();
    let database_url = dotenv::var("DATABASE_URL").expect("environment variable DATABASE_URL not been set");
    let jwt_secret = dotenv::var(JWT_SECRET).expect("environment variable JWT_SECRET not been set");
    let listen_addr = dotenv::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("failed to connect to database");
    log::info!("listening on {}", listen_addr);
    HttpServer::new(move || {
        actix_web::App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(Data::new(pool.clone()))
            .service(
                scope("api/v1")
                    .service(resource("login").route(post().to(handlers::login)))
                    .service(resource("signup").route(post().to(handlers::signup)))
                    .service(
                        scope("")
                            .wrap(Jwt::new(jwt_secret.as_bytes().to_vec()))
                            .service(
                                scope("requests")
                                    .route("", post().to(handlers::request::create))
                                    .route("", get().to(handlers::request::list))
                                    .service(
                                        scope("{request_id}")
                                            .route("", get().to(handlers::request::detail))
                                            .route("", delete().to(handlers::request::delete_request))
                                            .route("sender", get().to(handlers::request::sender))
                                            .route("receiver", get().to(handlers::request::receiver))
                                            .route("project", get().to(handlers::request::project))
                                            .route("accept", patch().to(handlers::request::accept))
                                            .route("decline", patch().to(handlers::request::decline)),
                                    ),
                            )
                            .service(
                                scope("volunteers")
                                    .route("", get().to(handlers::volunteer::list))
                                    .service(
                                        scope("{volunteer_id}")
                                            .route("", get().to(handlers::volunteer::detail))
                                            .route("", put().to(handlers::volunteer::update))
                                            .route("skills", get().to(handlers::volunteer::skills))
                                            .route("interests", get().to(handlers::volunteer::interests))
                                            .route("projects", get().to(handlers::volunteer::projects)),
                                    ),
                            )
                            .service(
                                scope("projects")
                                    .route("", post().to(handlers::project::create))
                                    .route("", get().to(handlers::project::list))
                                    .service(
                                        scope("{project_id}")
                                            .route("", get().to(handlers::project::detail))
                                            .route("", put().to(handlers::project::update))
                                            .route("", delete().to(handlers::project::delete_project))
                                            .route("volunteers", get().to(handlers::project::volunteers))
                                            .route("categories", get().to(handlers::project::categories))
                                            .route("categories", put().to(handlers::project::set_categories)),
                                    ),
                            )
                            .service(
                                scope("categories")
                                    .route("", post().to(handlers::category::create))
                                    .route("", get().to(handlers::category::list))
                                    .service(
                                        scope("{category_id}")
                                            .route("", get().to(handlers::category::detail))
                                            .route("", delete().to(handlers::category::delete_category)),
                                    ),
                            ),
                    ),
            )
    })
    .bind(listen_addr)?
    .run()
    .await
}
