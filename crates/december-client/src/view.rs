/// The three client views. History paths map 1:1 onto variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Snowfall,
    About,
}

impl View {
    pub const ALL: [View; 3] = [View::Home, View::Snowfall, View::About];

    pub fn path(self) -> &'static str {
        match self {
            View::Home => "/",
            View::Snowfall => "/snowfall",
            View::About => "/about",
        }
    }

    /// Unknown paths land on the home view.
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/snowfall" => View::Snowfall,
            "/about" => View::About,
            _ => View::Home,
        }
    }

    /// Class applied to the app root, e.g. `page-snowfall`.
    pub fn page_class(self) -> &'static str {
        match self {
            View::Home => "page-home",
            View::Snowfall => "page-snowfall",
            View::About => "page-about",
        }
    }
}
