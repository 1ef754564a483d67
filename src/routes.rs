// --- Route Table ---

/// Fallback display title for targets that carry no title metadata of their own.
pub const DEFAULT_TITLE: &str = "Limited-Time Quiz";

/// RouteName
///
/// Canonical names of the navigable pages. The guard reasons about navigations
/// in terms of these names, never raw paths, so the redirect rules stay readable
/// and the path strings live in exactly one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteName {
    Home,
    Register,
    Quiz,
    Result,
    Leaderboard,
}

/// Every navigable page, in declaration order. Any path not listed here falls
/// through to the router's catch-all, which sends the visitor back to Home.
pub const ROUTES: [RouteName; 5] = [
    RouteName::Home,
    RouteName::Register,
    RouteName::Quiz,
    RouteName::Result,
    RouteName::Leaderboard,
];

impl RouteName {
    /// The request path the page is served under.
    pub fn path(self) -> &'static str {
        match self {
            RouteName::Home => "/",
            RouteName::Register => "/register",
            RouteName::Quiz => "/quiz",
            RouteName::Result => "/result",
            RouteName::Leaderboard => "/leaderboard",
        }
    }

    /// The display title rendered into the page shell's `<title>`.
    pub fn title(self) -> &'static str {
        match self {
            RouteName::Home => "Quiz Home",
            RouteName::Register => "Registration",
            RouteName::Quiz => "Quiz",
            RouteName::Result => "Quiz Result",
            RouteName::Leaderboard => "Leaderboard",
        }
    }

    /// Stable lowercase identifier, used as the page marker in the HTML shell.
    pub fn slug(self) -> &'static str {
        match self {
            RouteName::Home => "home",
            RouteName::Register => "register",
            RouteName::Quiz => "quiz",
            RouteName::Result => "result",
            RouteName::Leaderboard => "leaderboard",
        }
    }
}

/// Resolves a request path to its named route, if any. Matching is exact;
/// trailing-slash variants and unknown paths resolve to `None`.
pub fn route_for_path(path: &str) -> Option<RouteName> {
    ROUTES.iter().copied().find(|route| route.path() == path)
}

// --- Navigation Descriptors ---

/// RouteDescriptor
///
/// What the guard knows about one side of a navigation: the matched route name,
/// if any. Unmatched targets and the initial origin (no prior page) are both
/// modeled as the absence of a name, which is exactly how the redirect rules
/// distinguish them from real pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub name: Option<RouteName>,
}

impl RouteDescriptor {
    /// Descriptor for a concrete request path.
    pub fn for_path(path: &str) -> Self {
        Self {
            name: route_for_path(path),
        }
    }

    /// The initial origin: a navigation that did not come from one of our pages.
    pub fn initial() -> Self {
        Self { name: None }
    }

    /// Display title for the page shell, falling back to the campaign default.
    pub fn display_title(self) -> &'static str {
        self.name.map(RouteName::title).unwrap_or(DEFAULT_TITLE)
    }

    /// Whether this side of the navigation matched a named route.
    pub fn is_named(self) -> bool {
        self.name.is_some()
    }
}
