//! Caller identity.
//!
//! Tokens are verified by the gateway in front of this service, which forwards the verified
//! identity in `x-user-*` headers. This layer only parses them into a [`User`] extension so
//! handlers can take `Extension<User>`.

use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    app_error::AppError,
    domain::user::{Country, Role, User},
};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const USER_COUNTRY_HEADER: &str = "x-user-country";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, AppError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Unauthorized(format!("Missing {name} header")))
}

pub fn user_from_headers(headers: &HeaderMap) -> Result<User, AppError> {
    let id = Uuid::parse_str(header(headers, USER_ID_HEADER)?)
        .map_err(|_| AppError::Unauthorized(format!("Malformed {USER_ID_HEADER} header")))?;
    let email = header(headers, USER_EMAIL_HEADER)?.to_string();
    let role: Role = header(headers, USER_ROLE_HEADER)?
        .parse()
        .map_err(|_| AppError::Unauthorized(format!("Malformed {USER_ROLE_HEADER} header")))?;
    let country: Country = header(headers, USER_COUNTRY_HEADER)?
        .parse()
        .map_err(|_| AppError::Unauthorized(format!("Malformed {USER_COUNTRY_HEADER} header")))?;

    Ok(User::new(id, email, role, country))
}

/// Rejects requests without a verified identity and attaches the [`User`] otherwise.
pub async fn authenticated(mut req: Request, next: Next) -> Result<Response, AppError> {
    let user = user_from_headers(req.headers())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn parses_a_complete_identity() {
        let id = Uuid::new_v4();
        let user = user_from_headers(&headers(&[
            (USER_ID_HEADER, &id.to_string()),
            (USER_EMAIL_HEADER, "manager.in@test.com"),
            (USER_ROLE_HEADER, "MANAGER"),
            (USER_COUNTRY_HEADER, "INDIA"),
        ]))
        .unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.role, Role::Manager);
        assert_eq!(user.country, Country::India);
    }

    #[test]
    fn missing_or_malformed_identity_is_unauthorized() {
        let missing = user_from_headers(&HeaderMap::new()).unwrap_err();
        assert!(matches!(missing, AppError::Unauthorized(_)));

        let bad_role = user_from_headers(&headers(&[
            (USER_ID_HEADER, &Uuid::new_v4().to_string()),
            (USER_EMAIL_HEADER, "x@test.com"),
            (USER_ROLE_HEADER, "ROOT"),
            (USER_COUNTRY_HEADER, "INDIA"),
        ]))
        .unwrap_err();
        assert!(matches!(bad_role, AppError::Unauthorized(_)));
    }
}
