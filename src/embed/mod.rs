//! Embedded static resources.
//!
//! # Usage
//!
//! ```ignore
//! use embed::serve::{LIVERELOAD_JS, LivereloadVars};
//!
//! let js = LIVERELOAD_JS.render(&LivereloadVars { path: "/__pagekiln/livereload" });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// Variables for livereload.js.
    pub struct LivereloadVars<'a> {
        pub path: &'a str,
    }

    impl TemplateVars for LivereloadVars<'_> {
        fn apply(&self, content: &str) -> String {
            content.replace("__LIVERELOAD_PATH__", self.path)
        }
    }

    /// Client that reloads the page on any push message.
    pub const LIVERELOAD_JS: Template<LivereloadVars<'static>> =
        Template::new(include_str!("serve/livereload.js"));

    /// `<script>` tag injected into served HTML.
    pub fn livereload_tag() -> String {
        let js = LIVERELOAD_JS.render(&LivereloadVars {
            path: crate::reload::LIVERELOAD_PATH,
        });
        format!("<script>{js}</script>")
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_livereload_tag() {
            let tag = livereload_tag();
            assert!(tag.starts_with("<script>"));
            assert!(tag.ends_with("</script>"));
            assert!(tag.contains("location.host + \"/__pagekiln/livereload\""));
            assert!(!tag.contains("__LIVERELOAD_PATH__"));
        }
    }
}
