use jobboard_portal::{
    models::{Profile, Role, UserIdentity},
    nav::{Dropdown, DropdownState, MenuVariant, NavBar, UserMenu, UserMenuAction},
    session::Session,
};
use rstest::rstest;
use std::time::Duration;
use tokio::time::sleep;
use uuid::Uuid;

const DELAY: Duration = Duration::from_millis(300);

fn session_with_role(role: Option<Role>) -> Session {
    let identity = UserIdentity {
        id: Uuid::new_v4(),
        email: "nav@example.com".to_string(),
    };
    let profile = Profile {
        id: identity.id,
        full_name: Some("Nav User".to_string()),
        email: Some(identity.email.clone()),
        role,
    };
    Session::authenticated(identity, Some(profile))
}

// --- Hover dropdowns ---

#[tokio::test(start_paused = true)]
async fn test_leave_closes_once_after_delay() {
    let mut dropdown = Dropdown::new("jobs", DELAY);
    dropdown.hover_enter();
    dropdown.hover_leave();

    assert_eq!(dropdown.state(), DropdownState::ClosingPending);
    assert!(dropdown.is_open(), "closing-pending still counts as open");

    sleep(Duration::from_millis(299)).await;
    assert_eq!(dropdown.state(), DropdownState::ClosingPending);

    sleep(Duration::from_millis(2)).await;
    assert_eq!(dropdown.state(), DropdownState::Closed);
    assert_eq!(dropdown.close_count(), 1);
    assert!(!dropdown.has_pending_close());
}

#[tokio::test(start_paused = true)]
async fn test_reenter_within_delay_cancels_close() {
    let mut dropdown = Dropdown::new("jobs", DELAY);
    dropdown.hover_enter();
    dropdown.hover_leave();

    sleep(Duration::from_millis(150)).await;
    dropdown.hover_enter();
    assert!(!dropdown.has_pending_close());

    sleep(Duration::from_millis(500)).await;
    assert_eq!(dropdown.state(), DropdownState::Open);
    assert_eq!(dropdown.close_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_leave_keeps_a_single_timer() {
    let mut dropdown = Dropdown::new("jobs", DELAY);
    dropdown.hover_enter();
    dropdown.hover_leave();
    sleep(Duration::from_millis(100)).await;
    dropdown.hover_leave();

    // The second leave is ignored, so the close still lands at the first deadline.
    sleep(Duration::from_millis(201)).await;
    assert_eq!(dropdown.state(), DropdownState::Closed);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(dropdown.close_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_leave_while_closed_is_ignored() {
    let mut dropdown = Dropdown::new("jobs", DELAY);
    dropdown.hover_leave();

    assert_eq!(dropdown.state(), DropdownState::Closed);
    assert!(!dropdown.has_pending_close());
}

#[tokio::test(start_paused = true)]
async fn test_dropdowns_have_independent_timers() {
    let mut bar = NavBar::new(&session_with_role(Some(Role::Employer)), DELAY);

    assert!(bar.hover_enter("employer-jobs"));
    assert!(bar.hover_leave("employer-jobs"));
    // Moving straight onto the neighbouring trigger must not rescue the first menu.
    assert!(bar.hover_enter("employer-candidates"));

    sleep(Duration::from_millis(301)).await;
    assert_eq!(
        bar.dropdown("employer-jobs").map(Dropdown::state),
        Some(DropdownState::Closed)
    );
    assert_eq!(
        bar.dropdown("employer-candidates").map(Dropdown::state),
        Some(DropdownState::Open)
    );
}

#[tokio::test(start_paused = true)]
async fn test_teardown_cancels_pending_close() {
    let mut bar = NavBar::new(&session_with_role(Some(Role::Admin)), DELAY);
    bar.hover_enter("admin-manage");
    bar.hover_leave("admin-manage");

    bar.teardown();
    sleep(Duration::from_secs(1)).await;

    let dropdown = bar.dropdown("admin-manage").unwrap();
    assert_eq!(dropdown.close_count(), 0);
    assert!(!dropdown.has_pending_close());
}

#[tokio::test(start_paused = true)]
async fn test_selecting_an_item_closes_immediately() {
    let mut bar = NavBar::new(&session_with_role(Some(Role::School)), DELAY);
    bar.hover_enter("school-main");

    assert!(bar.select_item("school-main"));
    assert_eq!(
        bar.dropdown("school-main").map(Dropdown::state),
        Some(DropdownState::Closed)
    );
}

#[tokio::test]
async fn test_unknown_trigger_is_reported() {
    let mut bar = NavBar::new(&session_with_role(Some(Role::Candidate)), DELAY);

    assert!(!bar.hover_enter("admin-manage"));
    assert!(!bar.hover_leave("admin-manage"));
}

// --- Variant selection ---

#[rstest]
#[case(Some(Role::Admin), MenuVariant::Admin)]
#[case(Some(Role::Employer), MenuVariant::Employer)]
#[case(Some(Role::School), MenuVariant::School)]
#[case(Some(Role::Candidate), MenuVariant::Candidate)]
#[case(Some(Role::Unrecognized), MenuVariant::Candidate)]
#[case(None, MenuVariant::Candidate)]
fn test_variant_follows_role(#[case] role: Option<Role>, #[case] expected: MenuVariant) {
    let bar = NavBar::new(&session_with_role(role), DELAY);
    assert_eq!(bar.variant(), expected);
}

#[test]
fn test_resolving_session_renders_default_variant_without_label() {
    let mut session = session_with_role(Some(Role::Admin));
    session.resolving = true;

    let view = NavBar::new(&session, DELAY).view();
    assert_eq!(view.variant, MenuVariant::Candidate);
    assert!(view.user_menu.label.is_none());
}

#[test]
fn test_view_lists_the_variant_dropdowns_closed() {
    let view = NavBar::new(&session_with_role(Some(Role::Admin)), DELAY).view();

    let ids: Vec<_> = view.dropdowns.iter().map(|dropdown| dropdown.id).collect();
    assert_eq!(ids, vec!["admin-manage", "admin-browse"]);
    assert!(view.dropdowns.iter().all(|dropdown| !dropdown.open));
    assert_eq!(view.user_menu.label.as_deref(), Some("Nav User"));
}

#[test]
fn test_menu_links_point_into_the_route_table() {
    for variant in [
        MenuVariant::Admin,
        MenuVariant::Employer,
        MenuVariant::School,
        MenuVariant::Candidate,
    ] {
        for spec in variant.dropdowns() {
            for item in spec.items {
                assert!(
                    jobboard_portal::routes::table::match_path(item.path).is_some(),
                    "{} links to unrouted {}",
                    spec.id,
                    item.path
                );
            }
        }
    }
}

// --- User menu ---

#[test]
fn test_user_menu_toggle_and_outside_click() {
    let mut menu = UserMenu::default();
    assert!(!menu.capture_layer_active());

    menu.toggle();
    assert!(menu.is_open());
    assert!(menu.capture_layer_active());

    menu.click_outside();
    assert!(!menu.is_open());
    assert!(!menu.capture_layer_active());

    menu.toggle();
    menu.toggle();
    assert!(!menu.is_open());
}

#[test]
fn test_user_menu_selection_closes_it() {
    let mut menu = UserMenu::default();
    assert_eq!(menu.select(UserMenuAction::SignOut), None);

    menu.toggle();
    assert_eq!(menu.select(UserMenuAction::SignOut), Some(UserMenuAction::SignOut));
    assert!(!menu.is_open());
}
