use serde::Serialize;

/// UserMenuAction
///
/// Entries of the identity menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserMenuAction {
    Profile,
    SignOut,
}

impl UserMenuAction {
    pub const ALL: &'static [UserMenuAction] = &[UserMenuAction::Profile, UserMenuAction::SignOut];
}

/// UserMenu
///
/// The always-present identity trigger. Unlike the hover dropdowns it toggles on click.
/// While open, a transparent full-viewport layer sits beneath it; a click on that layer is
/// a click outside the menu and closes it.
#[derive(Debug, Default)]
pub struct UserMenu {
    open: bool,
}

impl UserMenu {
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn click_outside(&mut self) {
        self.open = false;
    }

    /// Choosing an entry closes the menu and hands the action to the caller. Ignored while
    /// the menu is closed, since its entries are not on screen.
    pub fn select(&mut self, action: UserMenuAction) -> Option<UserMenuAction> {
        if !self.open {
            return None;
        }
        self.open = false;
        Some(action)
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The outside-click capture layer exists exactly while the menu is open.
    pub fn capture_layer_active(&self) -> bool {
        self.open
    }
}
