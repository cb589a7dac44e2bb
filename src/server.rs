use rocket::{catchers, routes, Build, Rocket};

use crate::{
    classroom::Classroom,
    webhooks::{github::GitHubSecret, github_webhook},
};

pub fn build(classroom: Classroom, secret: GitHubSecret) -> Rocket<Build> {
    rocket::build()
        .mount("/", routes![github_webhook, health])
        .register("/", catchers![not_found, internal_error])
        .manage(classroom)
        .manage(secret)
}

#[rocket::get("/health")]
fn health() -> &'static str {
    "OK"
}

// every rejection gets this exact body, whatever the reason
#[rocket::catch(404)]
fn not_found() -> &'static str {
    "Not Found"
}

#[rocket::catch(500)]
fn internal_error() -> &'static str {
    "Internal Server Error"
}
