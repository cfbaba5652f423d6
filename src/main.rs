use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;

use devconnect_backend::{
    config,
    handlers::{
        auth::{login, register, update_current_account},
        profiles::{
            add_education, add_experience, create_current_user_profile, delete_education,
            delete_experience, delete_profile_by_id, get_all_profiles, get_github_repos,
            get_profile_by_id, update_current_user_profile, update_profile_by_id,
        },
        users::{follow_user, get_user, get_users, unfollow_user},
    },
    middleware::Authentication,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let database = config::init_database()
        .await
        .expect("Failed to connect to database");

    let port = config::get_port();
    let frontend_url = config::get_frontend_url();

    // Rate limiting: 60 requests burst, refilled once per second
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(1)
        .burst_size(60)
        .finish()
        .unwrap();

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_url)
            .allowed_origin("http://localhost:5173")
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(Governor::new(&governor_conf))
            .wrap(Authentication)
            .app_data(web::Data::new(database.clone()))
            .service(
                web::scope("/api/v1")
                    .service(register)
                    .service(login)
                    .service(update_current_account)
                    .service(follow_user)
                    .service(unfollow_user)
                    .service(get_users)
                    .service(get_user)
                    .service(create_current_user_profile)
                    .service(update_current_user_profile)
                    .service(add_experience)
                    .service(delete_experience)
                    .service(add_education)
                    .service(delete_education)
                    .service(get_github_repos)
                    .service(get_all_profiles)
                    .service(get_profile_by_id)
                    .service(update_profile_by_id)
                    .service(delete_profile_by_id),
            )
    })
    .bind(("127.0.0.1", port))?
    .run()
    .await
}
