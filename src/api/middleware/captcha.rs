//! Captcha verification middleware for create endpoints.

use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::error::ErrorEnvelope;
use crate::state::AppState;

/// Header carrying the Turnstile token.
pub const CAPTCHA_HEADER: &str = "cf-turnstile-response";

/// Verifies the captcha token before the request reaches the handler.
///
/// A no-op when [`AppState::captcha`] is `None`. Rejections are rendered as
/// the usual `{code, message}` envelope with the status the verifier chose
/// (400, 406 or 500).
///
/// # Example
///
/// ```rust,ignore
/// let create = Router::new()
///     .route("/link", post(create_link_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), captcha::layer));
/// ```
pub async fn layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let Some(verifier) = st.captcha.as_ref() else {
        return next.run(req).await;
    };

    let token = req
        .headers()
        .get(CAPTCHA_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    match verifier.verify(token.as_deref()).await {
        Ok(()) => next.run(req).await,
        Err(err) => {
            debug!(error = %err, "Captcha rejected");
            let status = err.status_code();
            (
                status,
                Json(ErrorEnvelope {
                    code: status.as_u16(),
                    message: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}
