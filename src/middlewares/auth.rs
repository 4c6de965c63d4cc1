use crate::error::{AppError, AppResult};
use crate::utils::{Session, SessionVerifier};
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage, HttpRequest,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

/// Outcome of reading the bearer token, stored in request extensions.
#[derive(Debug, Clone)]
pub enum SessionState {
    Valid(Session),
    Invalid,
}

/// Resolves `Authorization: Bearer` tokens into a [`SessionState`].
///
/// Never rejects on its own, handlers call [`require_session`] or
/// [`require_admin`] after their method check.
pub struct SessionMiddleware {
    verifier: SessionVerifier,
}

impl SessionMiddleware {
    pub fn new(verifier: SessionVerifier) -> Self {
        Self { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service,
            verifier: self.verifier.clone(),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: S,
    verifier: SessionVerifier,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS preflight
        if req.method() == Method::OPTIONS {
            return Box::pin(self.service.call(req));
        }

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty());

        if let Some(token) = token {
            let state = match self.verifier.resolve(token) {
                Ok(session) => SessionState::Valid(session),
                Err(e) => {
                    log::debug!("Rejected session token: {e}");
                    SessionState::Invalid
                }
            };
            req.extensions_mut().insert(state);
        }

        Box::pin(self.service.call(req))
    }
}

/// Caller's session, or 401 when the token is missing or invalid.
pub fn require_session(req: &HttpRequest) -> AppResult<Session> {
    match req.extensions().get::<SessionState>() {
        Some(SessionState::Valid(session)) => Ok(session.clone()),
        Some(SessionState::Invalid) => Err(AppError::AuthError(
            "Invalid or expired session".to_string(),
        )),
        None => Err(AppError::AuthError("Missing access token".to_string())),
    }
}

/// Like [`require_session`] but also 403 unless the caller is an admin.
pub fn require_admin(req: &HttpRequest) -> AppResult<Session> {
    let session = require_session(req)?;
    if !session.is_admin {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{admin_token, sign_token, test_verifier, user_token};
    use actix_web::{App, HttpResponse, test, web};

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match require_admin(&req) {
            Ok(s) => HttpResponse::Ok().body(s.user_id),
            Err(e) => HttpResponse::build(actix_web::ResponseError::status_code(&e))
                .body(e.error_code()),
        }
    }

    #[actix_web::test]
    async fn test_session_states() {
        let app = test::init_service(
            App::new()
                .wrap(SessionMiddleware::new(test_verifier()))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let cases = [
            (None, 401),
            (Some("garbage".to_string()), 401),
            (Some(sign_token("user-1", None, None, -3600)), 401),
            (Some(user_token()), 403),
            (Some(admin_token()), 200),
        ];
        for (token, expected) in cases {
            let mut req = test::TestRequest::get().uri("/whoami");
            if let Some(token) = token {
                req = req.insert_header(("Authorization", format!("Bearer {token}")));
            }
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status().as_u16(), expected);
        }
    }
}
