use axum::{
    extract::{Request, State},
    http::{HeaderMap, Uri, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    identity::{IdentityStore, SESSION_TOKEN_KEY, user_record_key},
    models::UserRecord,
    routes::{RouteDescriptor, RouteName},
    status::{CompletionCheck, StatusError},
};

/// PageTitle
///
/// Request extension carrying the display title the guard resolved for the
/// target page. Handlers pick it up when rendering the page shell; requests
/// that bypass the guard simply render the default.
#[derive(Debug, Clone)]
pub struct PageTitle(pub String);

// --- Status Resolution ---

/// StatusResolution
///
/// The typed outcome of reading the cached identity and asking the remote
/// endpoint about completion. Every failure mode is a distinct variant so the
/// guard can log precisely what happened before applying its default-to-false
/// policy.
#[derive(Debug)]
pub enum StatusResolution {
    /// No raw user record was cached under the token-derived key.
    NoRecord,
    /// The record parsed and the remote check answered.
    Resolved(bool),
    /// A raw record exists but did not parse as a user record. The remote
    /// check is skipped because there is no phone/token pair to send.
    CorruptRecord(serde_json::Error),
    /// The record parsed but the remote check failed.
    CheckFailed(StatusError),
}

impl StatusResolution {
    /// Completion status under the guard's policy: failures and corrupt
    /// records count as not completed.
    pub fn completed(&self) -> bool {
        matches!(self, StatusResolution::Resolved(true))
    }

    /// Whether a raw record was present at all. Presence is judged on the raw
    /// cached value, so a corrupt record still counts.
    pub fn record_present(&self) -> bool {
        !matches!(self, StatusResolution::NoRecord)
    }
}

/// resolve_status
///
/// Reads the session token and raw user record from the identity store, then
/// asks the completion check about the parsed record. Exactly one remote call
/// is made per invocation, and only when a record parsed.
///
/// This function performs the reads and reports what it saw; deciding what a
/// failure means for the navigation is the guard's job, not this layer's.
pub async fn resolve_status(
    identity: &dyn IdentityStore,
    status: &dyn CompletionCheck,
) -> StatusResolution {
    // A missing token degrades to the empty string, so the record key is
    // composed from whatever was found. This mirrors the registration flow,
    // which writes the record under the same composition.
    let token = identity.get(SESSION_TOKEN_KEY).await.unwrap_or_default();

    let Some(raw_record) = identity.get(&user_record_key(&token)).await else {
        return StatusResolution::NoRecord;
    };

    let user: UserRecord = match serde_json::from_str(&raw_record) {
        Ok(user) => user,
        Err(err) => return StatusResolution::CorruptRecord(err),
    };

    match status.quiz_completed(&user).await {
        Ok(completed) => StatusResolution::Resolved(completed),
        Err(err) => StatusResolution::CheckFailed(err),
    }
}

// --- Redirect Rules ---

/// NavigationDecision
///
/// What the guard decided to do with a navigation: let it through, or divert
/// it to another named page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    Proceed,
    Redirect(RouteName),
}

/// decide_navigation
///
/// Applies the redirect rules to a navigation. The rules are ordered and the
/// first match wins:
///
/// 1. A visitor who completed the quiz has no business on the entry pages:
///    Register or Quiz targets divert to Result.
/// 2. A registered but unfinished visitor stepping back to Home from inside
///    the app is pushed into the quiz. The initial landing (no named origin)
///    stays on Home.
/// 3. An unregistered visitor cannot take the quiz: Quiz diverts to Register.
///
/// Anything else proceeds unmodified, including targets outside the route
/// table.
pub fn decide_navigation(
    target: RouteDescriptor,
    origin: RouteDescriptor,
    resolution: &StatusResolution,
) -> NavigationDecision {
    let completed = resolution.completed();
    let registered = resolution.record_present();

    if completed
        && matches!(
            target.name,
            Some(RouteName::Register) | Some(RouteName::Quiz)
        )
    {
        return NavigationDecision::Redirect(RouteName::Result);
    }

    if registered && !completed && target.name == Some(RouteName::Home) && origin.is_named() {
        return NavigationDecision::Redirect(RouteName::Quiz);
    }

    if !registered && target.name == Some(RouteName::Quiz) {
        return NavigationDecision::Redirect(RouteName::Register);
    }

    NavigationDecision::Proceed
}

// --- Origin Recovery ---

/// origin_descriptor
///
/// Recovers where the visitor navigated from. A same-host Referer pointing at
/// one of our paths is a named origin; everything else (no Referer at all, a
/// cross-site Referer, an unparseable value, an unknown path) is the initial
/// origin.
fn origin_descriptor(headers: &HeaderMap) -> RouteDescriptor {
    let Some(referer) = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
    else {
        return RouteDescriptor::initial();
    };

    let Ok(uri) = referer.parse::<Uri>() else {
        return RouteDescriptor::initial();
    };

    // Same-host check only; the scheme is irrelevant here. A referer from
    // another site never counts as one of our pages.
    let same_host = match (uri.authority(), headers.get(header::HOST)) {
        (Some(authority), Some(host)) => host
            .to_str()
            .map(|host| host.eq_ignore_ascii_case(authority.as_str()))
            .unwrap_or(false),
        _ => false,
    };

    if !same_host {
        return RouteDescriptor::initial();
    }

    RouteDescriptor::for_path(uri.path())
}

// --- The Guard Middleware ---

/// navigation_guard
///
/// The middleware applied to every named page route. It runs once per
/// navigation and either forwards the request to the matched page handler or
/// short-circuits with a redirect.
///
/// The entire process involves:
/// 1. Title Resolution: attach the target's display title for the renderer.
/// 2. Status Resolution: read the cached identity and ask the remote check.
/// 3. Policy: log the typed outcome; failures default completion to false.
/// 4. Redirect Rules: first match wins, otherwise the navigation proceeds.
pub async fn navigation_guard(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let target = RouteDescriptor::for_path(request.uri().path());
    let origin = origin_descriptor(request.headers());

    // 1. Title Resolution
    request
        .extensions_mut()
        .insert(PageTitle(target.display_title().to_string()));

    // 2. Status Resolution
    let resolution = resolve_status(state.identity.as_ref(), state.status.as_ref()).await;

    tracing::debug!(
        "evaluating navigation: target={:?} origin={:?}",
        target.name,
        origin.name
    );

    // 3. Policy
    match &resolution {
        StatusResolution::NoRecord => {
            tracing::debug!("no cached user record, visitor treated as unregistered");
        }
        StatusResolution::Resolved(completed) => {
            tracing::debug!("completion check answered: completed={}", completed);
        }
        StatusResolution::CorruptRecord(e) => {
            // The raw value still counts as a registered visitor; only the
            // remote check is forfeited.
            tracing::error!("cached user record failed to parse: {:?}", e);
        }
        StatusResolution::CheckFailed(e) => {
            tracing::error!("completion check error: {:?}", e);
        }
    }

    // 4. Redirect Rules
    match decide_navigation(target, origin, &resolution) {
        NavigationDecision::Proceed => next.run(request).await,
        NavigationDecision::Redirect(to) => {
            tracing::info!(
                "redirecting {} -> {}",
                request.uri().path(),
                to.path()
            );
            Redirect::to(to.path()).into_response()
        }
    }
}
