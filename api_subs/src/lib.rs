use actix_web::web::{self};

pub mod routes {
    pub mod pay;
    pub mod sub;
}

mod services {
    pub(crate) mod pay;
    pub(crate) mod webhook;
}

mod dtos {
    pub(crate) mod sub;
}

mod misc {
    pub(crate) mod pay;
}

/// Public plan catalogue.
pub fn mount_subs() -> actix_web::Scope {
    web::scope("/sub").service(routes::sub::get_plans)
}

/// Billing actions of the signed-in user. Mount behind the auth middleware.
pub fn mount_billing() -> actix_web::Scope {
    web::scope("/billing")
        .service(routes::pay::post_checkout)
        .service(routes::pay::post_portal)
}

pub fn mount_subscription(cfg: &mut web::ServiceConfig) {
    cfg.service(routes::sub::get_subscription);
}

pub fn mount_webhook() -> actix_web::Scope {
    web::scope("/pay").service(routes::pay::post_webhook)
}
