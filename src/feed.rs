use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::client::MutationClient;
use crate::config::{Config, EndpointsConfig, MessagesConfig};
use crate::data::{Action, ActionKind, FormPayload, ItemId, ItemKind};
use crate::dom::Dom;
use crate::like::LikeToggleController;
use crate::notify::Notifier;
use crate::remove;

pub type ActionHandler = Box<dyn FnMut(&Action, &mut MutationClient)>;

/// What happened to the triggering event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// A handler ran; the default navigation must not happen.
    DefaultPrevented,
    Unhandled,
}

/// Explicit wiring between interactive elements and action handlers,
/// filled once while the page is set up.
#[derive(Default)]
pub struct ActionRegistry {
    bindings: HashMap<String, (Action, ActionHandler)>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_action<F>(&mut self, element_id: &str, action: Action, handler: F)
    where
        F: FnMut(&Action, &mut MutationClient) + 'static,
    {
        self.bindings
            .insert(element_id.to_string(), (action, Box::new(handler)));
    }

    /// Delivers a click on `element_id` to its handler.
    pub fn trigger(&mut self, element_id: &str, client: &mut MutationClient) -> Propagation {
        match self.bindings.get_mut(element_id) {
            Some((action, handler)) => {
                debug!(element_id, kind = action.kind.as_str(), id = %action.id, "action triggered");
                handler(&*action, client);
                Propagation::DefaultPrevented
            }
            None => Propagation::Unhandled,
        }
    }
}

/// Like and delete interactions on feed items.
///
/// The document is only touched from completion continuations, i.e. after
/// the server answered. Nothing tracks requests in flight, so when several
/// overlap the last answer to arrive decides what is displayed.
pub struct FeedController<D, N> {
    dom: Rc<RefCell<D>>,
    notifier: Rc<RefCell<N>>,
    likes: LikeToggleController,
    endpoints: EndpointsConfig,
    messages: MessagesConfig,
}

impl<D, N> FeedController<D, N>
where
    D: Dom + 'static,
    N: Notifier + 'static,
{
    pub fn new(dom: Rc<RefCell<D>>, notifier: Rc<RefCell<N>>, cfg: &Config) -> Self {
        Self {
            dom,
            notifier,
            likes: LikeToggleController::new(cfg.ui.liked_class.clone()),
            endpoints: cfg.endpoints.clone(),
            messages: cfg.messages.clone(),
        }
    }

    /// Binds `element_id` to `action` on `registry`.
    pub fn register(self: &Rc<Self>, registry: &mut ActionRegistry, element_id: &str, action: Action) {
        let controller = Rc::clone(self);
        registry.on_action(element_id, action, move |action, client| {
            controller.handle(client, action)
        });
    }

    pub fn handle(&self, client: &mut MutationClient, action: &Action) {
        match action.kind {
            ActionKind::Like => self.like(client, &action.id),
            ActionKind::DeletePost => self.delete(client, ItemKind::Post, &action.id),
            ActionKind::DeleteComment => self.delete(client, ItemKind::Comment, &action.id),
        }
    }

    pub fn like(&self, client: &mut MutationClient, post_id: &ItemId) {
        let payload = FormPayload::new().field("post_id", post_id.as_str());
        let dom = Rc::clone(&self.dom);
        let success_notifier = Rc::clone(&self.notifier);
        let failure_notifier = Rc::clone(&self.notifier);
        let likes = self.likes.clone();
        let id = post_id.clone();
        let failed = self.messages.like_failed.clone();
        let failed_again = failed.clone();

        client.send(
            &self.endpoints.like,
            payload,
            move |body| {
                let result = likes.reconcile(&mut *dom.borrow_mut(), &id, &body);
                if let Err(err) = result {
                    warn!(post = %id, error = %err, "like response not understood");
                    success_notifier.borrow_mut().notify(&failed);
                }
            },
            move || failure_notifier.borrow_mut().notify(&failed_again),
        );
    }

    pub fn delete(&self, client: &mut MutationClient, kind: ItemKind, id: &ItemId) {
        let (endpoint, message) = match kind {
            ItemKind::Post => (
                &self.endpoints.delete_post,
                self.messages.remove_post_failed.clone(),
            ),
            ItemKind::Comment => (
                &self.endpoints.delete_comment,
                self.messages.remove_comment_failed.clone(),
            ),
        };
        let payload = FormPayload::new().field(kind.id_field(), id.as_str());
        let dom = Rc::clone(&self.dom);
        let notifier = Rc::clone(&self.notifier);
        let id = id.clone();

        client.send(
            endpoint,
            payload,
            move |_body| {
                remove::remove(&mut *dom.borrow_mut(), kind, &id);
            },
            move || notifier.borrow_mut().notify(&message),
        );
    }
}
