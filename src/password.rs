use std::cell::RefCell;
use std::rc::Rc;

use tracing::info;
use url::Url;

use crate::client::MutationClient;
use crate::config::{Config, MessagesConfig, UIConfig};
use crate::data::FormPayload;
use crate::dom::{Dom, Navigator};
use crate::notify::StatusBanner;

/// The password-change form as the user filled it in. Validation is left to
/// the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordForm {
    pub old_password: String,
    pub new_password: String,
    pub verification_password: String,
}

impl PasswordForm {
    pub fn serialize(&self) -> FormPayload {
        FormPayload::new()
            .field("old_password", self.old_password.clone())
            .field("new_password", self.new_password.clone())
            .field("verification_password", self.verification_password.clone())
    }
}

/// Submits the password form and reports the result in the status banner.
pub struct PasswordChangeController<D> {
    dom: Rc<RefCell<D>>,
    banner: StatusBanner,
    endpoint: String,
    ui: UIConfig,
    messages: MessagesConfig,
}

impl<D> PasswordChangeController<D>
where
    D: Dom + Navigator + 'static,
{
    pub fn new(dom: Rc<RefCell<D>>, cfg: &Config) -> Self {
        Self {
            dom,
            banner: StatusBanner::default(),
            endpoint: cfg.endpoints.change_password.clone(),
            ui: cfg.ui.clone(),
            messages: cfg.messages.clone(),
        }
    }

    /// Handles a submit event. The caller's default form navigation is
    /// considered suppressed once this returns.
    pub fn submit(&self, client: &mut MutationClient, form: &PasswordForm) {
        let success_dom = Rc::clone(&self.dom);
        let failure_dom = Rc::clone(&self.dom);
        let success_banner = self.banner.clone();
        let failure_banner = self.banner.clone();
        let positive = self.ui.positive_status_class.clone();
        let negative = self.ui.negative_status_class.clone();
        let changed = self.messages.password_changed.clone();
        let rejected = self.messages.password_rejected.clone();

        client.send(
            &self.endpoint,
            form.serialize(),
            move |body| {
                let mut dom = success_dom.borrow_mut();
                success_banner.show(&mut *dom, &positive, &changed);
                if let Some(target) = redirect_target(&body) {
                    info!(redirect = target, "password changed, redirecting");
                    dom.navigate(target);
                }
            },
            move || {
                let mut dom = failure_dom.borrow_mut();
                failure_banner.show(&mut *dom, &negative, &rejected);
            },
        );
    }
}

// Newer servers answer with where to go next. Anything that is not a path
// or an absolute http(s) url is a plain success marker.
fn redirect_target(body: &str) -> Option<&str> {
    let trimmed = body.trim();
    if trimmed.starts_with('/') && !trimmed.starts_with("//") && !trimmed.contains(char::is_whitespace)
    {
        return Some(trimmed);
    }
    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(trimmed),
        _ => None,
    }
}
