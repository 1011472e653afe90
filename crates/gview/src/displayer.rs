//! The render/match capability supplied by collaborators.

use std::fmt;
use std::rc::Rc;

use crate::detail::Detail;

pub type DetailFn<M> = Rc<dyn Fn(&M) -> Result<Detail, String>>;

/// One named way of rendering a message's detail content.
pub struct DetailView<M> {
    name: String,
    render: Option<DetailFn<M>>,
}

impl<M> Clone for DetailView<M> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            render: self.render.clone(),
        }
    }
}

impl<M> fmt::Debug for DetailView<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetailView")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<M> DetailView<M> {
    pub fn new<F>(name: impl Into<String>, render: F) -> Self
    where
        F: Fn(&M) -> Result<Detail, String> + 'static,
    {
        Self {
            name: name.into(),
            render: Some(Rc::new(render)),
        }
    }

    /// A view that renders no content.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            render: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn render(&self, message: &M) -> Result<Detail, String> {
        match &self.render {
            Some(render) => render(message),
            None => Ok(Detail::default()),
        }
    }
}

/// Converts messages to summaries, decides keyword matches and supplies the
/// detail views.
///
/// Errors are reported as plain strings; the engine wraps them (and any
/// panic) into [`crate::fault::DisplayFault`]s.
pub trait Displayer<M> {
    fn summary(&self, message: &M) -> Result<String, String>;

    /// Default: the summary contains the keyword.
    fn matches(&self, keyword: &str, message: &M, summary: &str) -> Result<bool, String> {
        let _ = message;
        Ok(summary.contains(keyword))
    }

    fn detail_views(&self) -> Vec<DetailView<M>> {
        vec![DetailView::empty("Undefined")]
    }
}

type SummaryFn<M> = Box<dyn Fn(&M) -> Result<String, String>>;
type MatchFn<M> = Box<dyn Fn(&str, &M, &str) -> Result<bool, String>>;

/// Closure-backed [`Displayer`].
pub struct FnDisplayer<M> {
    summary: SummaryFn<M>,
    matcher: Option<MatchFn<M>>,
    views: Vec<DetailView<M>>,
}

impl<M> FnDisplayer<M> {
    pub fn new<F>(summary: F) -> Self
    where
        F: Fn(&M) -> Result<String, String> + 'static,
    {
        Self {
            summary: Box::new(summary),
            matcher: None,
            views: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_matcher<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&str, &M, &str) -> Result<bool, String> + 'static,
    {
        self.matcher = Some(Box::new(matcher));
        self
    }

    #[must_use]
    pub fn with_view<F>(mut self, name: &str, render: F) -> Self
    where
        F: Fn(&M) -> Result<Detail, String> + 'static,
    {
        self.views.push(DetailView::new(name, render));
        self
    }
}

impl<M> Displayer<M> for FnDisplayer<M> {
    fn summary(&self, message: &M) -> Result<String, String> {
        (self.summary)(message)
    }

    fn matches(&self, keyword: &str, message: &M, summary: &str) -> Result<bool, String> {
        match &self.matcher {
            Some(matcher) => matcher(keyword, message, summary),
            None => Ok(summary.contains(keyword)),
        }
    }

    fn detail_views(&self) -> Vec<DetailView<M>> {
        if self.views.is_empty() {
            return vec![DetailView::empty("Undefined")];
        }
        self.views.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detail::{Element, Group};

    #[test]
    fn default_match_is_substring_of_summary() {
        let displayer = FnDisplayer::new(|m: &String| Ok(m.to_uppercase()));
        assert_eq!(displayer.matches("AB", &"xab".to_owned(), "XAB"), Ok(true));
        assert_eq!(displayer.matches("ab", &"xab".to_owned(), "XAB"), Ok(false));
    }

    #[test]
    fn custom_matcher_sees_message() {
        let displayer = FnDisplayer::new(|m: &String| Ok(m.to_uppercase()))
            .with_matcher(|kw, m: &String, _| Ok(m.contains(kw)));
        assert_eq!(displayer.matches("ab", &"xab".to_owned(), "XAB"), Ok(true));
    }

    #[test]
    fn views_default_to_single_empty_view() {
        let displayer = FnDisplayer::new(|m: &String| Ok(m.clone()));
        let views = displayer.detail_views();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].name(), "Undefined");
        assert_eq!(views[0].render(&"m".to_owned()), Ok(Detail::default()));
    }

    #[test]
    fn named_views_render_in_order() {
        let displayer = FnDisplayer::new(|m: &String| Ok(m.clone()))
            .with_view("Text", |m: &String| {
                Ok(Detail::new(vec![Group::new(
                    "Body",
                    vec![Element::line(m.as_str())],
                )]))
            })
            .with_view("Broken", |_| Err("unsupported".to_owned()));
        let views = displayer.detail_views();
        let names: Vec<&str> = views.iter().map(DetailView::name).collect();
        assert_eq!(names, vec!["Text", "Broken"]);
        let Ok(detail) = views[0].render(&"hello".to_owned()) else {
            panic!("text view failed");
        };
        assert_eq!(detail.groups().len(), 1);
        assert_eq!(
            views[1].render(&"hello".to_owned()),
            Err("unsupported".to_owned())
        );
    }
}
