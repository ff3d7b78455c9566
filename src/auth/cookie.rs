//! Defines functions for storing the session token in a private cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::auth::session::{Session, SessionToken};

pub(crate) const COOKIE_SESSION: &str = "session";

/// Add the session cookie to the jar. The cookie expires with the session.
///
/// Returns the cookie jar with the cookie added.
pub(crate) fn set_session_cookie(jar: PrivateCookieJar, session: &Session) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, session.token.as_ref().to_owned()))
            .expires(session.expires_at)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Get the session token from the cookie jar, if there is one.
///
/// Cookies that were tampered with fail to decrypt and are treated as missing.
pub(crate) fn get_session_token(jar: &PrivateCookieJar) -> Option<SessionToken> {
    jar.get(COOKIE_SESSION)
        .map(|cookie| SessionToken::new_unchecked(cookie.value_trimmed()))
        .filter(|token| !token.as_ref().is_empty())
}

/// Set the session cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
pub(crate) fn invalidate_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime, macros::datetime};

    use crate::{
        auth::session::{Session, SessionToken},
        user::UserID,
    };

    use super::{COOKIE_SESSION, get_session_token, invalidate_session_cookie, set_session_cookie};

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    fn session() -> Session {
        Session {
            token: SessionToken::new_unchecked("0123456789abcdef"),
            user_id: UserID::new(1),
            expires_at: datetime!(2030-01-01 00:00:00 UTC),
        }
    }

    #[test]
    fn can_set_session_cookie() {
        let session = session();

        let jar = set_session_cookie(get_jar(), &session);

        let cookie = jar.get(COOKIE_SESSION).unwrap();
        assert_eq!(cookie.value(), "0123456789abcdef");
        assert_eq!(cookie.expires_datetime(), Some(session.expires_at));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn can_get_session_token() {
        let jar = set_session_cookie(get_jar(), &session());

        assert_eq!(get_session_token(&jar), Some(session().token));
    }

    #[test]
    fn missing_cookie_has_no_token() {
        assert_eq!(get_session_token(&get_jar()), None);
    }

    #[test]
    fn invalidate_session_cookie_succeeds() {
        let jar = set_session_cookie(get_jar(), &session());

        let jar = invalidate_session_cookie(jar);

        let cookie = jar.get(COOKIE_SESSION).unwrap();
        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
    }
}
