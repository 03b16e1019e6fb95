//! Like/unlike reconciliation.
//!
//! The like endpoint toggles server side and only answers with the new
//! count, so whether the click was a like or an unlike is inferred by
//! comparing that count with the one currently displayed.

use crate::data::ItemId;
use crate::dom::{like_icon_id, likes_count_id, Dom};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconState {
    Neutral,
    Liked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeState {
    pub icon: IconState,
    pub display_text: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LikeError {
    #[error("like count {0:?} is not a number")]
    InvalidCount(String),
}

/// Decides the icon and text for a post once a like request succeeded.
///
/// A drop in the count means the post was unliked; anything else, including
/// an unchanged count, is shown as liked.
pub fn apply(previous_displayed: u64, new_count: &str) -> Result<LikeState, LikeError> {
    let new = new_count
        .trim()
        .parse::<u64>()
        .map_err(|_| LikeError::InvalidCount(new_count.to_string()))?;

    // TODO: confirm with product whether an unchanged count should keep the
    // current icon instead of switching to liked.
    let icon = if new < previous_displayed {
        IconState::Neutral
    } else {
        IconState::Liked
    };

    Ok(LikeState {
        icon,
        display_text: new_count.to_string(),
    })
}

/// Parses the count shown in `<id>_likes`. Missing or garbled text counts
/// as zero.
pub fn displayed_count<D: Dom + ?Sized>(dom: &D, post_id: &ItemId) -> u64 {
    dom.text(&likes_count_id(post_id))
        .and_then(|text| text.trim().parse().ok())
        .unwrap_or(0)
}

#[derive(Debug, Clone)]
pub struct LikeToggleController {
    liked_class: String,
}

impl LikeToggleController {
    pub fn new<S: Into<String>>(liked_class: S) -> Self {
        Self {
            liked_class: liked_class.into(),
        }
    }

    pub fn class_for(&self, icon: IconState) -> &str {
        match icon {
            IconState::Neutral => "",
            IconState::Liked => &self.liked_class,
        }
    }

    /// Reads the displayed count, decides the new state and writes it back.
    pub fn reconcile<D: Dom + ?Sized>(
        &self,
        dom: &mut D,
        post_id: &ItemId,
        new_count: &str,
    ) -> Result<LikeState, LikeError> {
        let previous = displayed_count(dom, post_id);
        let state = apply(previous, new_count)?;
        self.render(dom, post_id, &state);
        Ok(state)
    }

    pub fn render<D: Dom + ?Sized>(&self, dom: &mut D, post_id: &ItemId, state: &LikeState) {
        let icon_id = like_icon_id(post_id);
        dom.set_class(&icon_id, "");
        let class = self.class_for(state.icon);
        if !class.is_empty() {
            dom.set_class(&icon_id, class);
        }
        dom.set_text(&likes_count_id(post_id), &state.display_text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, DomEvent};

    #[test]
    fn lower_count_is_an_unlike() {
        let state = apply(5, "4").unwrap();
        assert_eq!(state.icon, IconState::Neutral);
        assert_eq!(state.display_text, "4");
    }

    #[test]
    fn higher_count_is_a_like() {
        let state = apply(5, "6").unwrap();
        assert_eq!(state.icon, IconState::Liked);
        assert_eq!(state.display_text, "6");
    }

    #[test]
    fn equal_count_is_shown_as_liked() {
        let state = apply(5, "5").unwrap();
        assert_eq!(state.icon, IconState::Liked);
        assert_eq!(state.display_text, "5");
    }

    #[test]
    fn comparison_is_numeric_not_lexical() {
        assert_eq!(apply(9, "10").unwrap().icon, IconState::Liked);
        assert_eq!(apply(10, "9").unwrap().icon, IconState::Neutral);
    }

    #[test]
    fn display_text_is_verbatim() {
        assert_eq!(apply(1, "2\n").unwrap().display_text, "2\n");
    }

    #[test]
    fn non_numeric_count_is_rejected() {
        assert_eq!(
            apply(1, "oops"),
            Err(LikeError::InvalidCount("oops".into()))
        );
        assert!(apply(1, "-1").is_err());
    }

    #[test]
    fn render_replaces_class_wholesale() {
        let mut doc = Document::new();
        let id = ItemId::from(4u64);
        doc.add_post(&id, 5, Some("material-icons red-text"));
        let controller = LikeToggleController::new("red-text");

        let state = controller.reconcile(&mut doc, &id, "6").unwrap();
        assert_eq!(state.icon, IconState::Liked);
        assert_eq!(doc.class("like_4"), Some("red-text"));
        assert_eq!(doc.text("4_likes").as_deref(), Some("6"));
        assert_eq!(
            doc.journal()[0],
            DomEvent::ClassSet {
                id: "like_4".into(),
                class: String::new()
            }
        );

        controller.reconcile(&mut doc, &id, "5").unwrap();
        assert_eq!(doc.class("like_4"), Some(""));
        assert_eq!(doc.text("4_likes").as_deref(), Some("5"));
    }

    #[test]
    fn garbled_display_counts_as_zero() {
        let mut doc = Document::new();
        let id = ItemId::from("x");
        doc.add_post(&id, 0, None);
        doc.set_text("x_likes", "n/a");
        assert_eq!(displayed_count(&doc, &id), 0);
    }
}
