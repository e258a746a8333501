//! Selects deployable artifacts from a build output directory.

use std::path::Path;

use tracing::{debug, error};

use crate::error::PublishError;

/// Reserved service-worker file. It is never published as a versioned script.
pub const SERVICE_WORKER: &str = "service-worker.js";

/// Content type recorded for script artifacts (including their source maps).
pub const SCRIPT_CONTENT_TYPE: &str = "application/javascript";

/// Content type recorded for stylesheet artifacts (including their source maps).
pub const STYLESHEET_CONTENT_TYPE: &str = "text/css";

/// Class of a deployable artifact. Determines the uploaded content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Script,
    Stylesheet,
}

impl ArtifactKind {
    pub fn content_type(self) -> &'static str {
        match self {
            ArtifactKind::Script => SCRIPT_CONTENT_TYPE,
            ArtifactKind::Stylesheet => STYLESHEET_CONTENT_TYPE,
        }
    }
}

/// Scripts and stylesheets picked from one directory snapshot, in listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    pub scripts: Vec<String>,
    pub stylesheets: Vec<String>,
}

impl ArtifactSet {
    pub fn len(&self) -> usize {
        self.scripts.len() + self.stylesheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every artifact paired with its kind; scripts first, then stylesheets.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ArtifactKind)> + '_ {
        self.scripts
            .iter()
            .map(|s| (s.as_str(), ArtifactKind::Script))
            .chain(
                self.stylesheets
                    .iter()
                    .map(|s| (s.as_str(), ArtifactKind::Stylesheet)),
            )
    }

    /// The script that serves as the bundle's entry point.
    ///
    /// Prefers a non-map script named `main*`, then the first non-map script, then the
    /// first script of any kind. `None` only when there are no scripts.
    pub fn main_script(&self) -> Option<&str> {
        let mut scripts = self
            .scripts
            .iter()
            .map(String::as_str)
            .filter(|s| !s.ends_with(".map"));
        let first = scripts.clone().next();
        scripts
            .find(|s| s.starts_with("main"))
            .or(first)
            .or_else(|| self.scripts.first().map(String::as_str))
    }
}

/// Partition `filenames` into scripts and stylesheets.
///
/// Files matching neither class are ignored. `service-worker.js` is never a script.
pub fn classify<I, S>(filenames: I, include_source_maps: bool) -> ArtifactSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut set = ArtifactSet::default();
    for name in filenames {
        let name = name.as_ref();
        if is_script(name, include_source_maps) {
            set.scripts.push(name.to_string());
        } else if is_stylesheet(name, include_source_maps) {
            set.stylesheets.push(name.to_string());
        } else {
            debug!(file = name, "Skipping non-deployable file");
        }
    }
    set
}

fn is_script(name: &str, include_source_maps: bool) -> bool {
    name != SERVICE_WORKER
        && (name.ends_with(".js") || (include_source_maps && name.ends_with(".js.map")))
}

fn is_stylesheet(name: &str, include_source_maps: bool) -> bool {
    name.ends_with(".css") || (include_source_maps && name.ends_with(".css.map"))
}

/// Names of the regular files directly inside `dir`, sorted by name.
pub async fn read_artifact_dir(dir: &Path) -> Result<Vec<String>, PublishError> {
    let read_failure = |source: std::io::Error| {
        error!(error = ?source, dir = %dir.display(), "Failed to read artifact directory");
        PublishError::LocalReadFailure {
            path: dir.to_path_buf(),
            source,
        }
    };

    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_failure)?;
    while let Some(entry) = entries.next_entry().await.map_err(read_failure)? {
        if !entry.file_type().await.map_err(read_failure)?.is_file() {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    debug!(dir = %dir.display(), files = names.len(), "Listed artifact directory");
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: [&str; 5] = [
        "app.js",
        "app.js.map",
        "style.css",
        "service-worker.js",
        "readme.txt",
    ];

    #[test]
    fn classifies_without_source_maps() {
        let set = classify(LISTING, false);
        assert_eq!(set.scripts, vec!["app.js"]);
        assert_eq!(set.stylesheets, vec!["style.css"]);
    }

    #[test]
    fn includes_source_maps_when_asked() {
        let set = classify(LISTING, true);
        assert_eq!(set.scripts, vec!["app.js", "app.js.map"]);
        assert_eq!(set.stylesheets, vec!["style.css"]);

        let set = classify(["main.css", "main.css.map"], true);
        assert_eq!(set.stylesheets, vec!["main.css", "main.css.map"]);
    }

    #[test]
    fn never_publishes_the_service_worker() {
        for maps in [false, true] {
            let set = classify(["service-worker.js", "runtime.js"], maps);
            assert!(!set.scripts.iter().any(|s| s == SERVICE_WORKER));
            assert_eq!(set.scripts, vec!["runtime.js"]);
        }
    }

    #[test]
    fn preserves_listing_order() {
        let set = classify(["b.js", "a.css", "a.js", "c.css"], false);
        assert_eq!(set.scripts, vec!["b.js", "a.js"]);
        assert_eq!(set.stylesheets, vec!["a.css", "c.css"]);
    }

    #[test]
    fn main_script_prefers_main_and_skips_maps() {
        let set = classify(["2.chunk.js", "main.abc123.js", "main.abc123.js.map"], true);
        assert_eq!(set.main_script(), Some("main.abc123.js"));

        let set = classify(["a.js.map", "vendor.js", "runtime.js"], true);
        assert_eq!(set.main_script(), Some("vendor.js"));

        let set = classify(["only.js.map"], true);
        assert_eq!(set.main_script(), Some("only.js.map"));

        assert_eq!(classify(["style.css"], true).main_script(), None);
    }

    #[test]
    fn content_type_follows_the_kind() {
        assert_eq!(ArtifactKind::Script.content_type(), "application/javascript");
        assert_eq!(ArtifactKind::Stylesheet.content_type(), "text/css");
    }
}
