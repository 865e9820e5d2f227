//! Host-side navigation for the CLI.
//!
//! Site routes resolve against the profile's website and are reported back
//! to the REPL as route changes. External links open in the system browser.

use siteterm_core::Navigator;
use tokio::sync::mpsc;
use tracing::{info, warn};
use url::Url;

/// Navigator that opens links in the system browser.
pub struct BrowserNavigator {
    site: Option<Url>,
    launch: bool,
    routes: mpsc::UnboundedSender<String>,
}

impl BrowserNavigator {
    /// `launch` controls whether the browser is actually started; with it off
    /// every link is only logged.
    pub fn new(website: &str, launch: bool, routes: mpsc::UnboundedSender<String>) -> Self {
        let site = match Url::parse(website) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(website, error = %e, "Invalid website URL; site routes stay local");
                None
            }
        };
        Self {
            site,
            launch,
            routes,
        }
    }

    /// Absolute URL of a site route, if the website is known.
    pub fn resolve(&self, path: &str) -> Option<Url> {
        self.site.as_ref().and_then(|site| site.join(path).ok())
    }

    fn launch(&self, url: &str) {
        if !self.launch {
            info!(url, "Browser launch disabled");
            return;
        }
        if let Err(e) = open::that(url) {
            warn!(url, error = %e, "Failed to open browser");
        }
    }
}

impl Navigator for BrowserNavigator {
    fn navigate(&self, path: &str) {
        if let Some(url) = self.resolve(path) {
            info!(path, url = %url, "Navigating");
            self.launch(url.as_str());
        }
        // The REPL may already be gone
        let _ = self.routes.send(path.to_string());
    }

    fn open_external(&self, url: &str) {
        info!(url, "Opening external link");
        self.launch(url);
    }
}
