mod ai;
mod datasets;
mod runs;
mod sessions;
mod system;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(sessions::configure)
            .configure(runs::configure)
            .configure(ai::configure)
            .configure(datasets::configure)
            .configure(system::configure),
    );
}
