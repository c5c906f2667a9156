use async_trait::async_trait;
use log::{error, trace};
use rocket::{Request, State};
use rocket::http::hyper::header;
use rocket::http::Status;
use rocket::outcome::try_outcome;
use rocket::request::{FromRequest, Outcome};
use simplenotes::data::Scope;
use simplenotes::identity::IdentityProvider;

/// How requests are mapped to the scope their notes live in.
pub enum ScopeResolver {
    Global,
    PerUser(Box<dyn IdentityProvider>),
}

/// The scope of the calling principal. Failing this guard answers 401
/// before any handler code runs.
#[derive(Debug)]
pub struct CallerScope(pub Scope);

#[async_trait]
impl<'r> FromRequest<'r> for CallerScope {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let resolver = try_outcome!(request.guard::<&State<ScopeResolver>>().await);
        let identity_provider = match resolver.inner() {
            ScopeResolver::Global => return Outcome::Success(CallerScope(Scope::Global)),
            ScopeResolver::PerUser(identity_provider) => identity_provider,
        };
        let auth_header = request.headers().get_one(header::AUTHORIZATION.as_str());
        match identity_provider.identify(auth_header).await {
            Ok(Some(user_id)) => {
                trace!("request from user \"{user_id}\"");
                Outcome::Success(CallerScope(Scope::User(user_id)))
            },
            Ok(None) => Outcome::Error((Status::Unauthorized, ())),
            Err(e) => {
                error!("identity provider failed: {e}");
                Outcome::Error((Status::InternalServerError, ()))
            },
        }
    }
}
