//! Node builder helpers
//!
//! Find-or-create operations keyed by display text and parent. Lookups rely
//! on the host's exact text match; there is no other uniqueness guarantee.

use tracing::debug;

use crate::error::HostResult;
use crate::host::{CardType, Host, PracticeDirection};
use crate::rich_text::{NodeId, RichText};

/// Find a node by text under `parent`, or create it
///
/// A newly created node gets its text, parent and document flag set. An
/// existing node is returned untouched.
pub async fn make_rem<H: Host + ?Sized>(
    host: &mut H,
    text: RichText,
    parent: Option<&NodeId>,
    is_document: bool,
) -> HostResult<NodeId> {
    if let Some(id) = host.find_node(&text, parent).await? {
        return Ok(id);
    }

    let id = host.create_node().await?;
    debug!("Creating node '{}' under {:?}", text, parent);
    host.set_text(&id, text).await?;
    host.set_parent(&id, parent).await?;
    host.set_is_document(&id, is_document).await?;
    Ok(id)
}

/// Find or create a card by front text, then overwrite its back side
///
/// Back text, card type and practice direction are written on every call,
/// even when nothing changed.
pub async fn make_card<H: Host + ?Sized>(
    host: &mut H,
    front: RichText,
    back: RichText,
    parent: Option<&NodeId>,
    card_type: CardType,
    direction: PracticeDirection,
) -> HostResult<NodeId> {
    let id = match host.find_node(&front, parent).await? {
        Some(id) => id,
        None => {
            let id = host.create_node().await?;
            host.set_text(&id, front).await?;
            host.set_parent(&id, parent).await?;
            id
        }
    };

    host.set_back_text(&id, back).await?;
    host.set_card_type(&id, card_type).await?;
    host.set_practice_direction(&id, direction).await?;
    Ok(id)
}
