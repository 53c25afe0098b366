use actix_web::web::{self};

pub use services::client::ProviderClient;

pub mod routes {
    pub mod indexing;
    pub mod usage;
}

mod services {
    pub(crate) mod client;
    pub(crate) mod gsc;
    pub(crate) mod indexnow;
    pub(crate) mod submit;
}

mod dtos {
    pub(crate) mod indexing;
}

/// Google Search Console endpoints. Mount behind the auth middleware.
pub fn mount_gsc() -> actix_web::Scope {
    web::scope("/gsc")
        .service(routes::indexing::post_gsc_publish)
        .service(routes::indexing::get_gsc_sites)
        .service(routes::indexing::post_gsc_inspect)
}

/// IndexNow submission, usage counters and the audit log.
pub fn mount_indexing(cfg: &mut web::ServiceConfig) {
    cfg.service(routes::indexing::post_indexnow)
        .service(routes::usage::get_usage)
        .service(routes::usage::get_logs);
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test};

    use super::*;

    #[actix_web::test]
    async fn indexing_routes_are_registered() {
        let app = test::init_service(
            App::new().service(web::scope("/dashboard").configure(mount_indexing)),
        )
        .await;

        for req in [
            test::TestRequest::post().uri("/dashboard/indexnow"),
            test::TestRequest::get().uri("/dashboard/usage"),
            test::TestRequest::get().uri("/dashboard/logs"),
        ] {
            let res = test::call_service(&app, req.to_request()).await;
            assert_ne!(res.status(), StatusCode::NOT_FOUND);
        }
    }
}
