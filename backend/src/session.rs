use rocket::http::{Cookie, Status};
use rocket::request::{FromRequest, Outcome};
use rocket::Request;
use tracing::{debug, warn};

use crate::facebook::FacebookError;
use crate::routes::AppState;

// Private cookie holding the Facebook user access token.
pub const SESSION_COOKIE: &str = "fb_token";

// Resolved from the session cookie via the Graph API. The rest of the
// service only consumes `id`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let cookies = req.cookies();
        let Some(cookie) = cookies.get_private(SESSION_COOKIE) else {
            debug!("No session cookie, request is unauthenticated");
            return Outcome::Error((Status::Unauthorized, ()));
        };

        let Some(state) = req.rocket().state::<AppState>() else {
            return Outcome::Error((Status::InternalServerError, ()));
        };

        match state.facebook.fetch_me(cookie.value()).await {
            Ok(user) => Outcome::Success(CurrentUser {
                id: user.id,
                name: user.name,
            }),
            Err(FacebookError::SessionExpired) => {
                // Stale token: drop the session so the next attempt
                // restarts the login flow cleanly.
                warn!("Facebook session expired, clearing cookie");
                cookies.remove_private(Cookie::from(SESSION_COOKIE));
                Outcome::Error((Status::Unauthorized, ()))
            }
            Err(e) => {
                warn!("Identity lookup failed: {}", e);
                Outcome::Error((Status::BadGateway, ()))
            }
        }
    }
}
