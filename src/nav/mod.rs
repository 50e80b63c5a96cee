//! Navigation bar: role-selected menu variant, hover dropdowns and the user menu.

use std::time::Duration;

use serde::Serialize;

use crate::{guard::ResolvedSession, session::Session};

pub mod dropdown;
pub mod menu;
pub mod timer;
pub mod user_menu;

pub use dropdown::{Dropdown, DropdownState};
pub use menu::{DropdownSpec, MenuItem, MenuVariant};
pub use timer::CloseTimer;
pub use user_menu::{UserMenu, UserMenuAction};

/// NavBar
///
/// One instance per rendered navigation bar. Owns a `Dropdown` (and so its close timer)
/// per trigger of the selected variant; dropping or tearing down the bar cancels them all.
#[derive(Debug)]
pub struct NavBar {
    variant: MenuVariant,
    dropdowns: Vec<(DropdownSpec, Dropdown)>,
    user_menu: UserMenu,
    user_label: Option<String>,
}

impl NavBar {
    /// Builds the bar for a session. A session that is still resolving renders the
    /// default variant without a user menu label.
    pub fn new(session: &Session, close_delay: Duration) -> Self {
        let user_label = match (&session.identity, session.resolving) {
            (Some(identity), false) => Some(
                session
                    .profile
                    .as_ref()
                    .map(|profile| profile.display_name().to_string())
                    .unwrap_or_else(|| identity.email.clone()),
            ),
            _ => None,
        };
        Self::build(MenuVariant::for_role(session.role()), user_label, close_delay)
    }

    pub fn for_resolved(resolved: Option<&ResolvedSession>, close_delay: Duration) -> Self {
        Self::build(
            MenuVariant::for_role(resolved.and_then(ResolvedSession::role)),
            resolved.map(|session| session.display_name().to_string()),
            close_delay,
        )
    }

    fn build(variant: MenuVariant, user_label: Option<String>, close_delay: Duration) -> Self {
        let dropdowns = variant
            .dropdowns()
            .iter()
            .map(|spec| (*spec, Dropdown::new(spec.id, close_delay)))
            .collect();
        Self {
            variant,
            dropdowns,
            user_menu: UserMenu::default(),
            user_label,
        }
    }

    pub fn variant(&self) -> MenuVariant {
        self.variant
    }

    pub fn dropdown(&self, id: &str) -> Option<&Dropdown> {
        self.dropdowns
            .iter()
            .find(|(spec, _)| spec.id == id)
            .map(|(_, dropdown)| dropdown)
    }

    fn dropdown_mut(&mut self, id: &str) -> Option<&mut Dropdown> {
        self.dropdowns
            .iter_mut()
            .find(|(spec, _)| spec.id == id)
            .map(|(_, dropdown)| dropdown)
    }

    /// Returns false when the current variant has no trigger with this id.
    pub fn hover_enter(&mut self, id: &str) -> bool {
        self.dropdown_mut(id).map(Dropdown::hover_enter).is_some()
    }

    pub fn hover_leave(&mut self, id: &str) -> bool {
        self.dropdown_mut(id).map(Dropdown::hover_leave).is_some()
    }

    /// Following a link in a panel closes that panel at once.
    pub fn select_item(&mut self, id: &str) -> bool {
        self.dropdown_mut(id).map(Dropdown::close_now).is_some()
    }

    pub fn user_menu(&self) -> &UserMenu {
        &self.user_menu
    }

    pub fn user_menu_mut(&mut self) -> &mut UserMenu {
        &mut self.user_menu
    }

    /// Cancels every pending close timer.
    pub fn teardown(&mut self) {
        for (_, dropdown) in &mut self.dropdowns {
            dropdown.teardown();
        }
    }

    pub fn view(&self) -> NavBarView {
        NavBarView {
            variant: self.variant,
            dropdowns: self
                .dropdowns
                .iter()
                .map(|(spec, dropdown)| DropdownView {
                    id: spec.id,
                    label: spec.label,
                    open: dropdown.is_open(),
                    items: spec.items,
                })
                .collect(),
            user_menu: UserMenuView {
                label: self.user_label.clone(),
                open: self.user_menu.is_open(),
                actions: UserMenuAction::ALL,
            },
        }
    }
}

/// NavBarView
///
/// Render model of the navigation bar, served as JSON by `GET /nav` and turned into markup
/// by the page shell.
#[derive(Debug, Clone, Serialize)]
pub struct NavBarView {
    pub variant: MenuVariant,
    pub dropdowns: Vec<DropdownView>,
    pub user_menu: UserMenuView,
}

#[derive(Debug, Clone, Serialize)]
pub struct DropdownView {
    pub id: &'static str,
    pub label: &'static str,
    pub open: bool,
    pub items: &'static [MenuItem],
}

#[derive(Debug, Clone, Serialize)]
pub struct UserMenuView {
    /// Absent for anonymous visitors.
    pub label: Option<String>,
    pub open: bool,
    pub actions: &'static [UserMenuAction],
}
