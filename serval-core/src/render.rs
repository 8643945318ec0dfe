// Collaborators that produce response bodies: view rendering and object
// serialization. Their implementations live outside the engine.

use crate::context::Params;
use crate::Error;

/// Extensions probed, in order, for a page named without one.
pub const VIEW_EXTENSIONS: [&str; 2] = ["html", "htm"];

/// Renders named views (templates, static pages) to bytes.
pub trait ViewRenderer: Send + Sync {
    /// Whether a view with this exact name exists.
    fn exists(&self, view: &str) -> bool;

    /// Render `view` with the request parameters available to it.
    fn render(&self, view: &str, params: &Params) -> Result<Vec<u8>, Error>;

    /// Content type of rendered views.
    fn content_type(&self) -> &str {
        "text/html; charset=utf-8"
    }
}

/// Turns a value into a response body.
pub trait ObjectSerializer: Send + Sync {
    fn content_type(&self) -> &str;

    fn serialize(&self, value: &serde_json::Value) -> Result<Vec<u8>, Error>;
}

/// Renderer with no views at all; every render is [`Error::RenderMissing`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NoViews;

impl ViewRenderer for NoViews {
    fn exists(&self, _view: &str) -> bool {
        false
    }

    fn render(&self, view: &str, _params: &Params) -> Result<Vec<u8>, Error> {
        Err(Error::RenderMissing(view.to_string()))
    }
}

/// View names to probe for `page`, optionally inside `resource`'s directory.
///
/// A page with an extension is probed as-is; one without is probed with each
/// of [`VIEW_EXTENSIONS`].
pub fn view_candidates(resource: Option<&str>, page: &str) -> Vec<String> {
    let base = match resource.filter(|r| !r.is_empty()) {
        Some(resource) => format!("{}/{}", resource, page),
        None => page.to_string(),
    };
    if page.contains('.') {
        vec![base]
    } else {
        VIEW_EXTENSIONS
            .iter()
            .map(|ext| format!("{}.{}", base, ext))
            .collect()
    }
}

/// Render the first existing candidate for `page`.
///
/// # Errors
///
/// [`Error::RenderMissing`] when no candidate exists.
pub fn render_view(
    renderer: &dyn ViewRenderer,
    resource: Option<&str>,
    page: &str,
    params: &Params,
) -> Result<Vec<u8>, Error> {
    let candidates = view_candidates(resource, page);
    let view = candidates
        .iter()
        .find(|candidate| renderer.exists(candidate))
        .ok_or_else(|| Error::RenderMissing(candidates.join(", ")))?;
    tracing::debug!(view = %view, "Rendering page");
    renderer.render(view, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_candidates() {
        assert_eq!(
            view_candidates(Some("sessions"), "show"),
            vec!["sessions/show.html", "sessions/show.htm"]
        );
        assert_eq!(view_candidates(Some("sessions"), "list.xhtml"), vec!["sessions/list.xhtml"]);
        assert_eq!(view_candidates(None, "index"), vec!["index.html", "index.htm"]);
    }

    #[test]
    fn test_no_views_render_missing() {
        let err = render_view(&NoViews, Some("sessions"), "show", &Params::new()).unwrap_err();
        match err {
            Error::RenderMissing(msg) => assert!(msg.contains("sessions/show.html")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
