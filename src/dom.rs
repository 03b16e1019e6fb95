use std::collections::BTreeMap;

use crate::data::{ItemId, ItemKind};

pub fn container_id(kind: ItemKind, id: &ItemId) -> String {
    format!("{}{}", kind.prefix(), id)
}

pub fn likes_count_id(id: &ItemId) -> String {
    format!("{id}_likes")
}

pub fn like_icon_id(id: &ItemId) -> String {
    format!("like_{id}")
}

/// Element access the controllers need. Element ids are the addressing
/// convention shared with the server-rendered markup.
pub trait Dom {
    fn contains(&self, id: &str) -> bool;
    fn text(&self, id: &str) -> Option<String>;
    /// Replaces the whole class attribute.
    fn set_class(&mut self, id: &str, class: &str);
    fn set_text(&mut self, id: &str, text: &str);
    fn fade_out(&mut self, id: &str);
    /// Removes the node and its subtree. Returns false if it was not there.
    fn detach(&mut self, id: &str) -> bool;
}

pub trait Navigator {
    fn navigate(&mut self, url: &str);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub class: String,
    pub text: String,
    pub visible: bool,
    pub parent: Option<String>,
}

impl Element {
    pub fn new(class: &str, text: &str) -> Self {
        Self {
            class: class.to_string(),
            text: text.to_string(),
            visible: true,
            parent: None,
        }
    }

    pub fn child_of(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }
}

/// Everything done to a [`Document`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomEvent {
    ClassSet { id: String, class: String },
    TextSet { id: String, text: String },
    FadedOut { id: String },
    Detached { id: String },
    Navigated { url: String },
}

/// In-memory document used by the command line front end and the tests.
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: BTreeMap<String, Element>,
    location: Option<String>,
    journal: Vec<DomEvent>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str, element: Element) {
        self.elements.insert(id.to_string(), element);
    }

    pub fn class(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|el| el.class.as_str())
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn journal(&self) -> &[DomEvent] {
        &self.journal
    }

    /// Adds a post container with its like icon and count.
    pub fn add_post(&mut self, id: &ItemId, likes: u64, liked_class: Option<&str>) {
        let container = container_id(ItemKind::Post, id);
        self.insert(&container, Element::new("card", ""));
        self.insert(
            &like_icon_id(id),
            Element::new(liked_class.unwrap_or(""), "").child_of(&container),
        );
        self.insert(
            &likes_count_id(id),
            Element::new("", &likes.to_string()).child_of(&container),
        );
    }

    pub fn add_comment(&mut self, id: &ItemId) {
        self.insert(
            &container_id(ItemKind::Comment, id),
            Element::new("collection-item", ""),
        );
    }

    fn descendants(&self, root: &str) -> Vec<String> {
        let mut found = vec![root.to_string()];
        let mut index = 0;
        while index < found.len() {
            let current = found[index].clone();
            for (id, el) in &self.elements {
                if el.parent.as_deref() == Some(current.as_str()) {
                    found.push(id.clone());
                }
            }
            index += 1;
        }
        found
    }
}

impl Dom for Document {
    fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn text(&self, id: &str) -> Option<String> {
        self.elements.get(id).map(|el| el.text.clone())
    }

    fn set_class(&mut self, id: &str, class: &str) {
        if let Some(el) = self.elements.get_mut(id) {
            el.class = class.to_string();
            self.journal.push(DomEvent::ClassSet {
                id: id.to_string(),
                class: class.to_string(),
            });
        }
    }

    fn set_text(&mut self, id: &str, text: &str) {
        if let Some(el) = self.elements.get_mut(id) {
            el.text = text.to_string();
            self.journal.push(DomEvent::TextSet {
                id: id.to_string(),
                text: text.to_string(),
            });
        }
    }

    fn fade_out(&mut self, id: &str) {
        if let Some(el) = self.elements.get_mut(id) {
            el.visible = false;
            self.journal.push(DomEvent::FadedOut { id: id.to_string() });
        }
    }

    fn detach(&mut self, id: &str) -> bool {
        if !self.elements.contains_key(id) {
            return false;
        }
        for node in self.descendants(id) {
            self.elements.remove(&node);
        }
        self.journal.push(DomEvent::Detached { id: id.to_string() });
        true
    }
}

impl Navigator for Document {
    fn navigate(&mut self, url: &str) {
        self.location = Some(url.to_string());
        self.journal.push(DomEvent::Navigated {
            url: url.to_string(),
        });
    }
}
