use crate::{guard::PageTitle, routes::RouteName};
use axum::{
    Extension,
    response::{Html, Redirect},
};

// --- Page Shell Rendering ---

/// render_page
///
/// Produces the minimal HTML shell for a page: the resolved `<title>` plus a
/// mount point marked with the page's slug. The client bundle does the rest;
/// the server's only rendering duty is the title the guard resolved.
fn render_page(page: RouteName, title: Option<Extension<PageTitle>>) -> Html<String> {
    // The guard attaches a title to every routed navigation. A handler called
    // without one (direct invocation in tests) falls back to its own entry in
    // the route table.
    let title = title
        .map(|Extension(PageTitle(title))| title)
        .unwrap_or_else(|| page.title().to_string());

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{}</title>
</head>
<body>
  <main id="app" data-page="{}"></main>
</body>
</html>
"#,
        title,
        page.slug()
    ))
}

// --- Page Handlers ---

/// home_page
///
/// [Page Route] The campaign landing page. Unregistered visitors start here;
/// registered-but-unfinished visitors arriving from inside the app are
/// diverted to the quiz before this handler ever runs.
pub async fn home_page(title: Option<Extension<PageTitle>>) -> Html<String> {
    render_page(RouteName::Home, title)
}

/// register_page
///
/// [Page Route] The registration form shell.
pub async fn register_page(title: Option<Extension<PageTitle>>) -> Html<String> {
    render_page(RouteName::Register, title)
}

/// quiz_page
///
/// [Page Route] The quiz itself. The guard guarantees only registered,
/// not-yet-finished visitors reach this handler.
pub async fn quiz_page(title: Option<Extension<PageTitle>>) -> Html<String> {
    render_page(RouteName::Quiz, title)
}

/// result_page
///
/// [Page Route] The post-quiz result view.
pub async fn result_page(title: Option<Extension<PageTitle>>) -> Html<String> {
    render_page(RouteName::Result, title)
}

/// leaderboard_page
///
/// [Page Route] The campaign leaderboard. No redirect rule names it; any
/// visitor may view it.
pub async fn leaderboard_page(title: Option<Extension<PageTitle>>) -> Html<String> {
    render_page(RouteName::Leaderboard, title)
}

// --- Catch-All ---

/// fallback_to_home
///
/// [Catch-All] Any path outside the route table lands here, after the guard
/// has had its say on the navigation, and is sent back to Home.
pub async fn fallback_to_home() -> Redirect {
    Redirect::to(RouteName::Home.path())
}
