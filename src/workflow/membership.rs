use crate::error::Result;
use crate::types::GroupSet;

/// Source of account group lists.
pub trait GroupDirectory {
    /// Returns the stored groups for `username`, or None if no such account.
    fn account_groups(&self, username: &str) -> Result<Option<GroupSet>>;
}

/// Returns true if `username` belongs to `group`. Unknown accounts are
/// members of nothing.
pub fn is_member<D: GroupDirectory + ?Sized>(dir: &D, username: &str, group: &str) -> Result<bool> {
    Ok(dir
        .account_groups(username)?
        .is_some_and(|groups| groups.contains(group)))
}

/// Returns true if `username` belongs to at least one of `groups`.
/// An empty list admits nobody, whatever groups the account holds.
pub fn is_member_of_any<D: GroupDirectory + ?Sized>(
    dir: &D,
    username: &str,
    groups: &GroupSet,
) -> Result<bool> {
    if groups.is_empty() {
        return Ok(false);
    }

    Ok(dir
        .account_groups(username)?
        .is_some_and(|held| held.intersects(groups)))
}
