//! Authentication endpoints

use axum::{extract::State, response::Redirect, Json};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::models::AuthStatus;

/// Who is this browser signed in as
#[utoipa::path(
    get,
    path = "/auth/status",
    tag = "auth",
    responses(
        (status = 200, description = "Authentication status", body = AuthStatus)
    )
)]
pub async fn status(
    State(state): State<crate::AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Json<AuthStatus> {
    let token = bearer.as_ref().map(|TypedHeader(Authorization(b))| b.token());
    Json(state.services.auth.status(token).await)
}

/// Start the identity provider sign-in flow
#[utoipa::path(
    get,
    path = "/auth/login",
    tag = "auth",
    responses((status = 307, description = "Redirect to the identity provider"))
)]
pub async fn login(State(state): State<crate::AppState>) -> Redirect {
    Redirect::temporary(state.services.auth.login_url())
}

/// Sign out through the identity provider
#[utoipa::path(
    get,
    path = "/auth/logout",
    tag = "auth",
    responses((status = 307, description = "Redirect to the sign-out page"))
)]
pub async fn logout(State(state): State<crate::AppState>) -> Redirect {
    Redirect::temporary(state.services.auth.logout_url())
}
