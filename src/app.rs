use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use reqwest::cookie::Jar;
use url::Url;

use crate::client::MutationClient;
use crate::config::{self, Config};
use crate::csrf::{CredentialProvider, JarCookies};
use crate::data::{Action, ActionKind, ItemId, ItemKind};
use crate::dom::{container_id, like_icon_id, likes_count_id, Document, Dom, Element};
use crate::feed::{ActionRegistry, FeedController};
use crate::notify::{ToastQueue, STATUS_CONTAINER_ID, STATUS_TEXT_ID};
use crate::password::{PasswordChangeController, PasswordForm};
use crate::request::RequestConfigurator;
use crate::transport::HttpTransport;

pub const USAGE: &str = "\
feed-actions - send feed mutations the way the feed page does.

USAGE:
  feed-actions [--config <path>] <command>

COMMANDS:
  like <post-id> [--count <n>]      Toggle a like; --count is the displayed count
  delete-post <post-id>             Delete a post
  delete-comment <comment-id>       Delete a comment
  change-password <old> <new> <verify>

FLAGS:
  --config <path>      Use this config file instead of the default
  --version, -V        Show version and exit
  --help,    -h        Show this help message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Like { post_id: ItemId, displayed: u64 },
    DeletePost(ItemId),
    DeleteComment(ItemId),
    ChangePassword(PasswordForm),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub config_file: Option<PathBuf>,
    pub command: Command,
}

pub fn parse_args<I, S>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut config_file = None;
    let mut count = None;
    let mut iter = args.into_iter().map(Into::into);

    // Global flags only come before the command word.
    let name = loop {
        let Some(arg) = iter.next() else {
            bail!("no command given");
        };
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config needs a path")?;
                config_file = Some(PathBuf::from(path));
            }
            "--" => match iter.next() {
                Some(name) => break name,
                None => bail!("no command given"),
            },
            _ => break arg,
        }
    };

    // After it, only `like` takes an option; everything else is an operand,
    // so a password such as `-h` or `--config` is passed through untouched.
    let mut rest = Vec::new();
    let mut options_done = name != "like";
    while let Some(arg) = iter.next() {
        if options_done {
            rest.push(arg);
            continue;
        }
        match arg.as_str() {
            "--count" => {
                let raw = iter.next().context("--count needs a number")?;
                let parsed = raw
                    .parse::<u64>()
                    .with_context(|| format!("--count {raw:?} is not a non-negative number"))?;
                count = Some(parsed);
            }
            "--" => options_done = true,
            _ => rest.push(arg),
        }
    }

    let command = match (name.as_str(), rest.as_slice()) {
        ("like", [id]) => Command::Like {
            post_id: ItemId::new(id.as_str()),
            displayed: count.unwrap_or(0),
        },
        ("delete-post", [id]) => Command::DeletePost(ItemId::new(id.as_str())),
        ("delete-comment", [id]) => Command::DeleteComment(ItemId::new(id.as_str())),
        ("change-password", [old, new, verify]) => Command::ChangePassword(PasswordForm {
            old_password: old.clone(),
            new_password: new.clone(),
            verification_password: verify.clone(),
        }),
        ("like" | "delete-post" | "delete-comment" | "change-password", _) => {
            bail!("wrong number of arguments for {name}")
        }
        _ => bail!("unknown command {name:?}"),
    };

    Ok(Invocation {
        config_file,
        command,
    })
}

/// Builds a mutation client whose cookie jar is shared between the
/// transport and the CSRF lookup.
pub fn connect(cfg: &Config) -> Result<MutationClient> {
    let base_url = Url::parse(&cfg.server.base_url)
        .with_context(|| format!("invalid server.base_url {:?}", cfg.server.base_url))?;

    let jar = Arc::new(Jar::default());
    for segment in cfg.server.cookie.split(';') {
        let segment = segment.trim();
        if !segment.is_empty() {
            jar.add_cookie_str(&format!("{segment}; Path=/"), &base_url);
        }
    }

    let credentials = CredentialProvider::new(Arc::new(JarCookies::new(
        Arc::clone(&jar),
        base_url.clone(),
    )));
    let configurator =
        RequestConfigurator::new(&base_url, credentials, cfg.server.user_agent.clone());
    let transport = HttpTransport::new(jar).context("build transport")?;

    Ok(MutationClient::new(
        Arc::new(transport),
        configurator,
        base_url,
    ))
}

pub fn run(invocation: Invocation) -> Result<Report> {
    let cfg = config::load(config::LoadOptions {
        config_file: invocation.config_file.clone(),
        env_prefix: None,
    })
    .context("load config")?;
    let mut client = connect(&cfg)?;
    execute(&cfg, &mut client, &invocation.command)
}

/// Renders the nodes the command touches, dispatches it like a click or
/// submit on the page would, and waits for the answer.
pub fn execute(cfg: &Config, client: &mut MutationClient, command: &Command) -> Result<Report> {
    let doc = Rc::new(RefCell::new(Document::new()));
    let toasts = Rc::new(RefCell::new(ToastQueue::new()));

    match command {
        Command::ChangePassword(form) => {
            {
                let mut doc = doc.borrow_mut();
                doc.insert(STATUS_CONTAINER_ID, Element::new("hide", ""));
                doc.insert(STATUS_TEXT_ID, Element::new("", ""));
            }
            PasswordChangeController::new(Rc::clone(&doc), cfg).submit(client, form);
        }
        Command::Like { post_id, displayed } => {
            doc.borrow_mut().add_post(post_id, *displayed, None);
            let action = Action::new(ActionKind::Like, post_id.clone());
            dispatch(cfg, client, &doc, &toasts, &like_icon_id(post_id), action)?;
        }
        Command::DeletePost(id) => {
            doc.borrow_mut().add_post(id, 0, None);
            let element_id = format!("delete_{}", container_id(ItemKind::Post, id));
            let action = Action::new(ActionKind::DeletePost, id.clone());
            dispatch(cfg, client, &doc, &toasts, &element_id, action)?;
        }
        Command::DeleteComment(id) => {
            doc.borrow_mut().add_comment(id);
            let element_id = format!("delete_{}", container_id(ItemKind::Comment, id));
            let action = Action::new(ActionKind::DeleteComment, id.clone());
            dispatch(cfg, client, &doc, &toasts, &element_id, action)?;
        }
    }

    client.wait_idle();

    let doc = doc.borrow();
    let mut toasts = toasts.borrow_mut();
    Ok(Report::capture(cfg, command, &doc, &mut toasts))
}

fn dispatch(
    cfg: &Config,
    client: &mut MutationClient,
    doc: &Rc<RefCell<Document>>,
    toasts: &Rc<RefCell<ToastQueue>>,
    element_id: &str,
    action: Action,
) -> Result<()> {
    let feed = Rc::new(FeedController::new(Rc::clone(doc), Rc::clone(toasts), cfg));
    let mut registry = ActionRegistry::new();
    feed.register(&mut registry, element_id, action);
    if registry.trigger(element_id, client) != crate::feed::Propagation::DefaultPrevented {
        bail!("no handler bound to {element_id}");
    }
    Ok(())
}

/// What the page looks like once the command's continuation has run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub lines: Vec<String>,
    pub toasts: Vec<String>,
    pub failed: bool,
}

impl Report {
    fn capture(cfg: &Config, command: &Command, doc: &Document, toasts: &mut ToastQueue) -> Self {
        let mut lines = Vec::new();
        let failed = match command {
            Command::Like { post_id, .. } => {
                let icon = like_icon_id(post_id);
                let count = likes_count_id(post_id);
                lines.push(format!("{icon} class: {:?}", doc.class(&icon).unwrap_or("")));
                lines.push(format!("{count}: {:?}", doc.text(&count).unwrap_or_default()));
                !toasts.is_empty()
            }
            Command::DeletePost(id) | Command::DeleteComment(id) => {
                let kind = if matches!(command, Command::DeletePost(_)) {
                    ItemKind::Post
                } else {
                    ItemKind::Comment
                };
                let node = container_id(kind, id);
                let state = if doc.contains(&node) { "present" } else { "removed" };
                lines.push(format!("{node}: {state}"));
                !toasts.is_empty()
            }
            Command::ChangePassword(_) => {
                let class = doc.class(STATUS_CONTAINER_ID).unwrap_or("");
                lines.push(format!("status: {:?} {:?}", class, doc.text(STATUS_TEXT_ID).unwrap_or_default()));
                if let Some(location) = doc.location() {
                    lines.push(format!("navigate: {location}"));
                }
                class == cfg.ui.negative_status_class
            }
        };

        Self {
            lines,
            toasts: toasts.drain().into_iter().map(|t| t.message).collect(),
            failed,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        for toast in &self.toasts {
            writeln!(f, "toast: {toast}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{client_with, ScriptedTransport};

    #[test]
    fn parses_like_with_count_and_config() {
        let inv = parse_args(["--config", "/tmp/c.yaml", "like", "7", "--count", "3"]).unwrap();
        assert_eq!(inv.config_file, Some(PathBuf::from("/tmp/c.yaml")));
        assert_eq!(
            inv.command,
            Command::Like {
                post_id: ItemId::from(7u64),
                displayed: 3
            }
        );
    }

    #[test]
    fn parses_password_change() {
        let inv = parse_args(["change-password", "a", "b", "b"]).unwrap();
        match inv.command {
            Command::ChangePassword(form) => {
                assert_eq!(form.old_password, "a");
                assert_eq!(form.verification_password, "b");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn password_operands_are_never_flags() {
        let inv = parse_args(["change-password", "--config", "-h", "--count"]).unwrap();
        assert_eq!(inv.config_file, None);
        assert_eq!(
            inv.command,
            Command::ChangePassword(PasswordForm {
                old_password: "--config".into(),
                new_password: "-h".into(),
                verification_password: "--count".into(),
            })
        );
    }

    #[test]
    fn double_dash_ends_like_options() {
        let inv = parse_args(["like", "--", "--count"]).unwrap();
        assert_eq!(
            inv.command,
            Command::Like {
                post_id: ItemId::new("--count"),
                displayed: 0
            }
        );
    }

    #[test]
    fn rejects_bad_invocations() {
        assert!(parse_args(Vec::<String>::new()).is_err());
        assert!(parse_args(["frobnicate"]).is_err());
        assert!(parse_args(["delete-post"]).is_err());
        assert!(parse_args(["delete-post", "1", "--count", "2"]).is_err());
        assert!(parse_args(["like", "1", "--count", "-2"]).is_err());
    }

    #[test]
    fn connect_rejects_bad_base_url() {
        let mut cfg = Config::default();
        cfg.server.base_url = "not a url".into();
        assert!(connect(&cfg).is_err());
    }

    #[test]
    fn execute_like_reports_new_state() {
        let transport = ScriptedTransport::answering(vec![Ok("4".into())]);
        let mut client = client_with(transport, "csrftoken=t");
        let command = Command::Like {
            post_id: ItemId::from(1u64),
            displayed: 3,
        };
        let report = execute(&Config::default(), &mut client, &command).unwrap();
        assert!(!report.failed);
        assert_eq!(report.lines, vec!["like_1 class: \"red-text\"", "1_likes: \"4\""]);
    }

    #[test]
    fn execute_delete_failure_reports_toast() {
        let transport = ScriptedTransport::answering(vec![Err(404)]);
        let mut client = client_with(transport, "");
        let report = execute(
            &Config::default(),
            &mut client,
            &Command::DeletePost(ItemId::from(9u64)),
        )
        .unwrap();
        assert!(report.failed);
        assert_eq!(report.lines, vec!["post_9: present"]);
        assert_eq!(report.toasts, vec!["Não foi possível remover a publicação!"]);
        assert!(report.to_string().contains("toast: "));
    }
}
