use rocket::{Build, Rocket};
use crate::app_constants::API_PREFIX;

pub mod api;

pub use api::authentication_guard::ScopeResolver;

pub trait ApiRocketBuildExt {
    fn install_simplenotes_api(self) -> Self;
}

impl ApiRocketBuildExt for Rocket<Build> {
    fn install_simplenotes_api(self) -> Self {
        self
            .mount(API_PREFIX, api::api_routes())
            .register("/", api::errors::api_catchers())
    }
}
