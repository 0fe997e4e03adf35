pub mod composer;
pub mod item;
pub mod viewport;

use crate::feed::item::FeedItem;

/// Insert the personalization slot into `base`, clamping the position to the
/// end of the feed when it is shorter than `slot_index`.
pub fn splice_slot(base: &[FeedItem], slot_index: usize, slot: FeedItem) -> Vec<FeedItem> {
    let at = slot_index.min(base.len());
    let mut feed = Vec::with_capacity(base.len() + 1);
    feed.extend_from_slice(&base[..at]);
    feed.push(slot);
    feed.extend_from_slice(&base[at..]);
    feed
}
