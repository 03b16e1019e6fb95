use tracing::debug;

use crate::data::{ItemId, ItemKind};
use crate::dom::{container_id, Dom};

/// Fades out and detaches the node of a post or comment the server has
/// already deleted. Returns false when the node was already gone.
pub fn remove<D: Dom + ?Sized>(dom: &mut D, kind: ItemKind, id: &ItemId) -> bool {
    let node = container_id(kind, id);
    if !dom.contains(&node) {
        debug!(node = %node, "feed item already gone");
        return false;
    }
    dom.fade_out(&node);
    dom.detach(&node)
}
