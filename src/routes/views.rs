//! Deferred page views.
//!
//! Page bodies are shells: the job, CV and dashboard content lives with external
//! collaborators. What matters here is when a view is loaded: on the first navigation that
//! resolves to it, and never again afterwards.

use std::{
    collections::HashMap,
    fmt::Write as _,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use tokio::sync::OnceCell;

use super::table::{RouteMatch, ViewId};
use crate::{error::ViewLoadError, guard::ResolvedSession, nav::NavBarView};

/// Everything a view may read while rendering.
pub struct ViewContext<'a> {
    pub route: &'a RouteMatch,
    pub session: Option<&'a ResolvedSession>,
    pub nav: &'a NavBarView,
}

/// View
///
/// A loaded page. Rendering is synchronous; any slow work belongs in `ViewLoader::load`.
pub trait View: Send + Sync {
    fn id(&self) -> ViewId;
    fn render(&self, ctx: &ViewContext<'_>) -> String;
}

/// ViewLoader
///
/// Produces a view on demand. A failure is returned as-is and is not cached.
#[async_trait]
pub trait ViewLoader: Send + Sync {
    async fn load(&self, id: ViewId) -> Result<Arc<dyn View>, ViewLoadError>;
}

/// PageView
///
/// The built-in page shell: navigation bar, title, and the captured route parameters
/// handed to the client-side widgets through `data-` attributes.
pub struct PageView {
    id: ViewId,
}

impl View for PageView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn render(&self, ctx: &ViewContext<'_>) -> String {
        let mut main = format!(
            "<main data-view=\"{:?}\"><h1>{}</h1>",
            self.id,
            escape_html(self.id.title())
        );
        for (name, value) in &ctx.route.params {
            let _ = write!(main, "<data data-param=\"{}\" value=\"{}\"></data>", name, escape_html(value));
        }
        if let Some(session) = ctx.session {
            let _ = write!(
                main,
                "<p class=\"signed-in-as\">{}</p>",
                escape_html(session.display_name())
            );
        }
        main.push_str("</main>");

        page_shell(self.id.title(), ctx.nav, &main)
    }
}

/// BuiltinViews
///
/// Loader for the in-crate page shells.
pub struct BuiltinViews;

#[async_trait]
impl ViewLoader for BuiltinViews {
    async fn load(&self, id: ViewId) -> Result<Arc<dyn View>, ViewLoadError> {
        Ok(Arc::new(PageView { id }))
    }
}

/// ViewRegistry
///
/// One lazily initialized slot per view. Concurrent first navigations to the same view
/// share a single load.
pub struct ViewRegistry {
    loader: Arc<dyn ViewLoader>,
    slots: HashMap<ViewId, OnceCell<Arc<dyn View>>>,
    loads: AtomicUsize,
}

/// ViewState
///
/// The shared handle placed in the application state.
pub type ViewState = Arc<ViewRegistry>;

impl ViewRegistry {
    pub fn new(loader: Arc<dyn ViewLoader>) -> Self {
        Self {
            loader,
            slots: ViewId::ALL.iter().map(|id| (*id, OnceCell::new())).collect(),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn builtin() -> Self {
        Self::new(Arc::new(BuiltinViews))
    }

    pub async fn resolve(&self, id: ViewId) -> Result<Arc<dyn View>, ViewLoadError> {
        let slot = self
            .slots
            .get(&id)
            .ok_or_else(|| ViewLoadError::Failed(id, "view is not registered".to_string()))?;

        slot.get_or_try_init(|| async {
            self.loads.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(view = ?id, "loading deferred view");
            self.loader.load(id).await
        })
        .await
        .cloned()
    }

    pub fn is_loaded(&self, id: ViewId) -> bool {
        self.slots.get(&id).is_some_and(OnceCell::initialized)
    }

    /// Number of loader invocations so far, failed ones included.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

fn page_shell(title: &str, nav: &NavBarView, main: &str) -> String {
    format!(
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{} · Job Board</title></head><body>{}{}</body></html>",
        escape_html(title),
        render_nav(nav),
        main
    )
}

fn render_nav(nav: &NavBarView) -> String {
    let mut html = format!("<nav data-variant=\"{:?}\"><ul>", nav.variant);
    for dropdown in &nav.dropdowns {
        let _ = write!(
            html,
            "<li data-dropdown=\"{}\" data-open=\"{}\"><span>{}</span><ul>",
            dropdown.id,
            dropdown.open,
            escape_html(dropdown.label)
        );
        for item in dropdown.items {
            let _ = write!(html, "<li><a href=\"{}\">{}</a></li>", item.path, escape_html(item.label));
        }
        html.push_str("</ul></li>");
    }
    html.push_str("</ul>");
    if let Some(label) = &nav.user_menu.label {
        let _ = write!(
            html,
            "<div data-user-menu data-open=\"{}\"><button>{}</button></div>",
            nav.user_menu.open,
            escape_html(label)
        );
    }
    html.push_str("</nav>");
    html
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
