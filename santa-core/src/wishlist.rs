pub const MAX_WISHLIST_ITEMS: usize = 5;

/// Normalizes a submitted wishlist: trims every entry, drops blank ones and keeps
/// at most [`MAX_WISHLIST_ITEMS`] in their original order.
pub fn cap_wishlist<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| item.as_ref().trim().to_string())
        .filter(|item| !item.is_empty())
        .take(MAX_WISHLIST_ITEMS)
        .collect()
}
