//! The route handler for logging out.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{auth::invalidate_auth_cookie, endpoints};

/// Invalidate the auth cookie and redirect the client to the log-in page.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::{Router, middleware, routing::get};
    use axum_extra::extract::cookie::Key;
    use axum_test::TestServer;
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{
        auth::{AuthState, COOKIE_TOKEN, log_out::get_log_out},
        endpoints, logging_middleware,
    };

    fn get_test_server() -> TestServer {
        let hash = Sha512::digest("averysecretsecret");
        let state = AuthState {
            cookie_key: Key::from(&hash),
            cookie_duration: Duration::minutes(5),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let app = Router::new()
            .route(endpoints::LOG_OUT, get(get_log_out))
            .layer(middleware::from_fn(logging_middleware))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn log_out_invalidates_cookie_and_redirects_to_log_in() {
        let server = get_test_server();

        let response = server.get(endpoints::LOG_OUT).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::LOG_IN_VIEW);

        let cookie = response.cookie(COOKIE_TOKEN);
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
    }
}
