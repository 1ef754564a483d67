use async_trait::async_trait;
use quiz_portal::{
    InMemoryIdentityStore,
    guard::{NavigationDecision, StatusResolution, decide_navigation, resolve_status},
    identity::user_record_key,
    models::UserRecord,
    routes::{RouteDescriptor, RouteName},
    status::{CompletionCheck, MockCompletionCheck, StatusError},
};
use std::sync::atomic::{AtomicUsize, Ordering};

// --- Test Doubles ---

// Records how often the remote check was consulted. Used to pin down the
// "at most one remote call per navigation, none for corrupt records" behavior.
#[derive(Default)]
struct CountingCheck {
    calls: AtomicUsize,
    completed: bool,
}

#[async_trait]
impl CompletionCheck for CountingCheck {
    async fn quiz_completed(&self, _user: &UserRecord) -> Result<bool, StatusError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.completed)
    }
}

fn corrupt_record_error() -> serde_json::Error {
    serde_json::from_str::<UserRecord>("definitely not json").unwrap_err()
}

fn target(path: &str) -> RouteDescriptor {
    RouteDescriptor::for_path(path)
}

// --- decide_navigation: rule order and coverage ---

#[test]
fn completed_visitor_is_kept_off_register_and_quiz() {
    let resolution = StatusResolution::Resolved(true);

    assert_eq!(
        decide_navigation(target("/register"), RouteDescriptor::initial(), &resolution),
        NavigationDecision::Redirect(RouteName::Result)
    );
    assert_eq!(
        decide_navigation(target("/quiz"), RouteDescriptor::initial(), &resolution),
        NavigationDecision::Redirect(RouteName::Result)
    );
}

#[test]
fn completed_visitor_proceeds_elsewhere() {
    let resolution = StatusResolution::Resolved(true);

    // Neither Home nor Result nor Leaderboard is named by the completion rule,
    // and the home-to-quiz rule requires an unfinished quiz.
    for path in ["/", "/result", "/leaderboard"] {
        assert_eq!(
            decide_navigation(target(path), target("/register"), &resolution),
            NavigationDecision::Proceed,
            "completed visitor should proceed to {}",
            path
        );
    }
}

#[test]
fn unfinished_visitor_returning_home_is_pushed_into_quiz() {
    let resolution = StatusResolution::Resolved(false);

    assert_eq!(
        decide_navigation(target("/"), target("/register"), &resolution),
        NavigationDecision::Redirect(RouteName::Quiz)
    );
    assert_eq!(
        decide_navigation(target("/"), target("/quiz"), &resolution),
        NavigationDecision::Redirect(RouteName::Quiz)
    );
}

#[test]
fn unfinished_visitor_landing_on_home_stays() {
    let resolution = StatusResolution::Resolved(false);

    // Initial origin: first page load, external link, unknown referer.
    assert_eq!(
        decide_navigation(target("/"), RouteDescriptor::initial(), &resolution),
        NavigationDecision::Proceed
    );
    // An origin path outside the route table is the initial origin too.
    assert_eq!(
        decide_navigation(target("/"), target("/somewhere-else"), &resolution),
        NavigationDecision::Proceed
    );
}

#[test]
fn unregistered_visitor_cannot_take_the_quiz() {
    let resolution = StatusResolution::NoRecord;

    assert_eq!(
        decide_navigation(target("/quiz"), RouteDescriptor::initial(), &resolution),
        NavigationDecision::Redirect(RouteName::Register)
    );
    // Every other page is open to unregistered visitors.
    for path in ["/", "/register", "/result", "/leaderboard"] {
        assert_eq!(
            decide_navigation(target(path), RouteDescriptor::initial(), &resolution),
            NavigationDecision::Proceed,
            "unregistered visitor should proceed to {}",
            path
        );
    }
}

#[test]
fn registered_unfinished_visitor_may_take_the_quiz() {
    let resolution = StatusResolution::Resolved(false);

    assert_eq!(
        decide_navigation(target("/quiz"), target("/register"), &resolution),
        NavigationDecision::Proceed
    );
}

#[test]
fn targets_outside_the_table_always_proceed() {
    for resolution in [
        StatusResolution::NoRecord,
        StatusResolution::Resolved(false),
        StatusResolution::Resolved(true),
        StatusResolution::CorruptRecord(corrupt_record_error()),
    ] {
        assert_eq!(
            decide_navigation(target("/nope"), target("/register"), &resolution),
            NavigationDecision::Proceed
        );
    }
}

#[test]
fn corrupt_record_still_counts_as_registered() {
    let resolution = StatusResolution::CorruptRecord(corrupt_record_error());

    // Registered: the quiz gate does not fire.
    assert_eq!(
        decide_navigation(target("/quiz"), RouteDescriptor::initial(), &resolution),
        NavigationDecision::Proceed
    );
    // Not completed: home-from-inside still diverts to the quiz.
    assert_eq!(
        decide_navigation(target("/"), target("/quiz"), &resolution),
        NavigationDecision::Redirect(RouteName::Quiz)
    );
}

#[tokio::test]
async fn failed_check_is_treated_as_not_completed() {
    // Produce a concrete StatusError through the mock's failure path.
    let user = UserRecord {
        phone: "13800000000".to_string(),
        tks: "abc".to_string(),
    };
    let failure = MockCompletionCheck::new_failing()
        .quiz_completed(&user)
        .await
        .unwrap_err();

    let resolution = StatusResolution::CheckFailed(failure);

    // Registered but "not completed": the completion rule does not fire...
    assert_eq!(
        decide_navigation(target("/register"), RouteDescriptor::initial(), &resolution),
        NavigationDecision::Proceed
    );
    // ...while the home-from-inside rule does.
    assert_eq!(
        decide_navigation(target("/"), target("/register"), &resolution),
        NavigationDecision::Redirect(RouteName::Quiz)
    );
}

// --- StatusResolution policy helpers ---

#[test]
fn completion_policy_truth_table() {
    assert!(!StatusResolution::NoRecord.completed());
    assert!(!StatusResolution::Resolved(false).completed());
    assert!(StatusResolution::Resolved(true).completed());
    assert!(!StatusResolution::CorruptRecord(corrupt_record_error()).completed());

    assert!(!StatusResolution::NoRecord.record_present());
    assert!(StatusResolution::Resolved(false).record_present());
    assert!(StatusResolution::Resolved(true).record_present());
    assert!(StatusResolution::CorruptRecord(corrupt_record_error()).record_present());
}

// --- resolve_status: cache reading and the single remote call ---

#[tokio::test]
async fn empty_cache_resolves_to_no_record() {
    let store = InMemoryIdentityStore::new();
    let check = MockCompletionCheck::new(true);

    let resolution = resolve_status(&store, &check).await;
    assert!(matches!(resolution, StatusResolution::NoRecord));
}

#[tokio::test]
async fn token_without_record_resolves_to_no_record() {
    let store = InMemoryIdentityStore::from_entries(&[("tks", "abc")]);
    let check = MockCompletionCheck::new(true);

    let resolution = resolve_status(&store, &check).await;
    assert!(matches!(resolution, StatusResolution::NoRecord));
}

#[tokio::test]
async fn record_under_wrong_token_is_not_found() {
    // The record was written for another session; the key composition must
    // use the current token, not scan the store.
    let store = InMemoryIdentityStore::from_entries(&[
        ("tks", "abc"),
        ("userInfo_zzz", r#"{"phone":"13800000000","tks":"zzz"}"#),
    ]);
    let check = MockCompletionCheck::new(true);

    let resolution = resolve_status(&store, &check).await;
    assert!(matches!(resolution, StatusResolution::NoRecord));
}

#[tokio::test]
async fn parsed_record_resolves_through_the_check() {
    let store = InMemoryIdentityStore::from_entries(&[
        ("tks", "abc"),
        ("userInfo_abc", r#"{"phone":"13800000000","tks":"abc"}"#),
    ]);

    let resolution = resolve_status(&store, &MockCompletionCheck::new(true)).await;
    assert!(matches!(resolution, StatusResolution::Resolved(true)));

    let resolution = resolve_status(&store, &MockCompletionCheck::new(false)).await;
    assert!(matches!(resolution, StatusResolution::Resolved(false)));
}

#[tokio::test]
async fn unknown_record_fields_are_tolerated() {
    // The registration flow may cache more than the guard needs.
    let store = InMemoryIdentityStore::from_entries(&[
        ("tks", "abc"),
        (
            "userInfo_abc",
            r#"{"phone":"13800000000","tks":"abc","nickname":"quizzer","score":17}"#,
        ),
    ]);

    let resolution = resolve_status(&store, &MockCompletionCheck::new(false)).await;
    assert!(matches!(resolution, StatusResolution::Resolved(false)));
}

#[tokio::test]
async fn missing_token_composes_the_bare_prefix_key() {
    // No "tks" entry at all: the token degrades to "" and the record is
    // looked up under the literal "userInfo_" key.
    let store = InMemoryIdentityStore::from_entries(&[(
        "userInfo_",
        r#"{"phone":"13800000000","tks":""}"#,
    )]);

    let resolution = resolve_status(&store, &MockCompletionCheck::new(false)).await;
    assert!(matches!(resolution, StatusResolution::Resolved(false)));
}

#[tokio::test]
async fn corrupt_record_skips_the_remote_check() {
    let store = InMemoryIdentityStore::from_entries(&[
        ("tks", "abc"),
        ("userInfo_abc", "{ this is not json"),
    ]);
    let check = CountingCheck::default();

    let resolution = resolve_status(&store, &check).await;

    assert!(matches!(resolution, StatusResolution::CorruptRecord(_)));
    assert_eq!(check.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn record_missing_required_fields_is_corrupt() {
    // Valid JSON, wrong shape: phone present but no token field.
    let store = InMemoryIdentityStore::from_entries(&[
        ("tks", "abc"),
        ("userInfo_abc", r#"{"phone":"13800000000"}"#),
    ]);

    let resolution = resolve_status(&store, &MockCompletionCheck::new(true)).await;
    assert!(matches!(resolution, StatusResolution::CorruptRecord(_)));
}

#[tokio::test]
async fn record_of_wrong_json_type_is_corrupt() {
    let store = InMemoryIdentityStore::from_entries(&[("tks", "abc"), ("userInfo_abc", "42")]);

    let resolution = resolve_status(&store, &MockCompletionCheck::new(true)).await;
    assert!(matches!(resolution, StatusResolution::CorruptRecord(_)));
}

#[tokio::test]
async fn one_remote_call_per_resolution() {
    let store = InMemoryIdentityStore::from_entries(&[
        ("tks", "abc"),
        ("userInfo_abc", r#"{"phone":"13800000000","tks":"abc"}"#),
    ]);
    let check = CountingCheck::default();

    let _ = resolve_status(&store, &check).await;
    assert_eq!(check.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_check_resolves_to_check_failed() {
    let store = InMemoryIdentityStore::from_entries(&[
        ("tks", "abc"),
        ("userInfo_abc", r#"{"phone":"13800000000","tks":"abc"}"#),
    ]);

    let resolution = resolve_status(&store, &MockCompletionCheck::new_failing()).await;

    assert!(matches!(resolution, StatusResolution::CheckFailed(_)));
    assert!(!resolution.completed());
    assert!(resolution.record_present());
}

// --- Key composition ---

#[test]
fn record_key_is_prefix_plus_token() {
    assert_eq!(user_record_key("abc"), "userInfo_abc");
    assert_eq!(user_record_key(""), "userInfo_");
}
