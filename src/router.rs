//! Hash routing between the static content panels.
//!
//! The router never touches the DOM directly; it drives a [`PanelHost`], which
//! the web entry point implements over `document` and `location`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Home,
    About,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown panel: {0:?}")]
pub struct UnknownPanel(pub String);

impl Panel {
    pub const DEFAULT: Panel = Panel::Home;

    /// Exact, case-sensitive match on the fragment text.
    pub fn from_fragment(fragment: &str) -> Option<Panel> {
        match fragment {
            "Home" => Some(Panel::Home),
            "About" => Some(Panel::About),
            _ => None,
        }
    }

    pub fn fragment(self) -> &'static str {
        match self {
            Panel::Home => "Home",
            Panel::About => "About",
        }
    }

    pub fn title(self) -> &'static str {
        self.fragment()
    }

    /// Whether the 3D room should be running behind this panel.
    pub fn shows_viewer(self) -> bool {
        matches!(self, Panel::Home)
    }
}

impl FromStr for Panel {
    type Err = UnknownPanel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Panel::from_fragment(s).ok_or_else(|| UnknownPanel(s.to_string()))
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.fragment())
    }
}

/// Markup injected verbatim for each panel.
#[derive(Debug, Clone)]
pub struct PanelTemplates {
    pub home: String,
    pub about: String,
}

impl Default for PanelTemplates {
    fn default() -> Self {
        Self {
            home: include_str!("pages/home.html").to_string(),
            about: include_str!("pages/about.html").to_string(),
        }
    }
}

impl PanelTemplates {
    pub fn get(&self, panel: Panel) -> &str {
        match panel {
            Panel::Home => &self.home,
            Panel::About => &self.about,
        }
    }
}

/// Where the page is served from. Redirects are built relative to
/// `base_path` so a site hosted under a sub-path keeps its prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostEnvironment {
    pub base_path: String,
}

impl HostEnvironment {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn with_base_path(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Project pages on `*.github.io` live under `/<repository>/`.
    pub fn from_location(hostname: &str, pathname: &str) -> Self {
        if !hostname.ends_with(".github.io") {
            return Self::root();
        }
        match pathname.split('/').find(|segment| !segment.is_empty()) {
            Some(repo) if !repo.contains('.') => Self::with_base_path(format!("/{}/", repo)),
            _ => Self::root(),
        }
    }

    pub fn home_redirect(&self) -> String {
        format!("{}#{}", self.base_path, Panel::DEFAULT.fragment())
    }
}

/// Outcome of looking up a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub panel: Panel,
    pub template: &'a str,
    pub title: &'static str,
    /// Set when the fragment was not recognized; the target is relative to
    /// the page origin.
    pub redirect: Option<String>,
}

pub trait PanelHost {
    /// Replaces the content container's markup. Returns `false` when the
    /// container is missing.
    fn replace_content(&self, markup: &str) -> bool;

    fn set_title(&self, title: &str);

    fn redirect(&self, target: &str);
}

pub struct Router {
    templates: PanelTemplates,
    env: HostEnvironment,
}

impl Router {
    pub fn new(templates: PanelTemplates, env: HostEnvironment) -> Self {
        Self { templates, env }
    }

    pub fn lookup(&self, fragment: &str) -> Resolution<'_> {
        let (panel, redirect) = match Panel::from_fragment(fragment) {
            Some(panel) => (panel, None),
            None => (Panel::DEFAULT, Some(self.env.home_redirect())),
        };
        Resolution {
            panel,
            template: self.templates.get(panel),
            title: panel.title(),
            redirect,
        }
    }

    pub fn render<H: PanelHost + ?Sized>(&self, host: &H, resolution: &Resolution<'_>) {
        if !host.replace_content(resolution.template) {
            log::debug!("content container missing, {} not rendered", resolution.panel);
        }
        host.set_title(resolution.title);
    }

    /// Shows the panel for `fragment`, redirecting unknown fragments to Home.
    pub fn navigate<H: PanelHost + ?Sized>(&self, host: &H, fragment: &str) -> Panel {
        let resolution = self.lookup(fragment);
        log::debug!("navigate {:?} -> {}", fragment, resolution.panel);
        self.render(host, &resolution);
        if let Some(target) = &resolution.redirect {
            host.redirect(target);
        }
        resolution.panel
    }
}

/// Strips the leading `#` from `location.hash`.
pub fn fragment_from_hash(hash: &str) -> &str {
    hash.strip_prefix('#').unwrap_or(hash)
}

/// Fragment to use after a history navigation: the `hash` stored in the
/// history entry's state when present, otherwise the current location hash.
pub fn history_fragment<'a>(state_hash: Option<&'a str>, location_hash: &'a str) -> &'a str {
    match state_hash {
        Some(hash) if !hash.is_empty() => hash,
        _ => fragment_from_hash(location_hash),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_are_case_sensitive() {
        assert_eq!(Panel::from_fragment("About"), Some(Panel::About));
        assert_eq!(Panel::from_fragment("about"), None);
        assert_eq!("Home".parse::<Panel>(), Ok(Panel::Home));
        assert_eq!("home".parse::<Panel>(), Err(UnknownPanel("home".into())));
    }

    #[test]
    fn only_home_runs_the_viewer() {
        assert!(Panel::Home.shows_viewer());
        assert!(!Panel::About.shows_viewer());
    }

    #[test]
    fn github_pages_keep_repository_prefix() {
        assert_eq!(
            HostEnvironment::from_location("someone.github.io", "/room/index.html"),
            HostEnvironment::with_base_path("/room/")
        );
        assert_eq!(
            HostEnvironment::from_location("someone.github.io", "/index.html"),
            HostEnvironment::root()
        );
        assert_eq!(
            HostEnvironment::from_location("localhost", "/room/"),
            HostEnvironment::root()
        );
        assert_eq!(
            HostEnvironment::with_base_path("/room/").home_redirect(),
            "/room/#Home"
        );
    }

    #[test]
    fn hash_prefix_is_stripped() {
        assert_eq!(fragment_from_hash("#About"), "About");
        assert_eq!(fragment_from_hash(""), "");
        assert_eq!(fragment_from_hash("Home"), "Home");
    }

    #[test]
    fn history_state_wins_over_location() {
        assert_eq!(history_fragment(Some("About"), "#Home"), "About");
        assert_eq!(history_fragment(Some(""), "#About"), "About");
        assert_eq!(history_fragment(None, ""), "");
    }
}
