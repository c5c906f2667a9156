use async_trait::async_trait;
use log::{error, info};
use rocket::fairing::{Fairing, Info};
use rocket::{Build, Rocket};
use simplenotes::config::app_config::{AppConfig, Scoping};
use simplenotes::identity::{AccessTokenIdentityProvider, AccessTokenKey, IdentityError};
use simplenotes::repository::NoteRepository;
use simplenotes::storage::make_backend;
use crate::routes::{ApiRocketBuildExt, ScopeResolver};

pub struct AppSetupFairing {
    app_config: AppConfig,
}

impl AppSetupFairing {
    pub fn new(app_config: AppConfig) -> Self {
        AppSetupFairing { app_config }
    }

    fn make_scope_resolver(&self) -> Result<ScopeResolver, IdentityError> {
        Ok(match self.app_config.scoping {
            Scoping::Global => {
                info!("notes are shared by all callers");
                ScopeResolver::Global
            },
            Scoping::PerUser => {
                let key = AccessTokenKey::from_file(&self.app_config.access_token_key)?;
                ScopeResolver::PerUser(Box::new(AccessTokenIdentityProvider::new(&key)))
            },
        })
    }
}

macro_rules! ok_or_bail {
    ($rocket:ident, $expr:expr, |$e:ident| $error_logger:expr) => ({
        match $expr {
            std::result::Result::Ok(ok) => ok,
            std::result::Result::Err(e) => {
                let $e = e;
                $error_logger;
                return std::result::Result::Err($rocket);
            },
        }
    });
}

#[async_trait]
impl Fairing for AppSetupFairing {
    fn info(&self) -> Info {
        use rocket::fairing::Kind;
        Info {
            name: "app setup",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(
        &self,
        rocket: Rocket<Build>,
    ) -> rocket::fairing::Result {
        let backend = ok_or_bail!(
            rocket,
            make_backend(&self.app_config.backend),
            |e| error!("note storage initialization failed: {e}")
        );

        let scope_resolver = ok_or_bail!(
            rocket,
            self.make_scope_resolver(),
            |e| error!(
                "failed reading the access token key at \"{}\": {e}",
                self.app_config.access_token_key.display(),
            )
        );

        Ok(
            rocket
                .manage(NoteRepository::new(backend))
                .manage(scope_resolver)
                .install_simplenotes_api()
        )
    }
}
