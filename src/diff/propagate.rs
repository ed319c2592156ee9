use crate::types::{DiffNode, Status};

/// Highest-priority status among `statuses`, starting from unchanged
///
/// Starting from unchanged means a set of only ignored statuses reads as
/// unchanged. An added and a deleted status together resolve to modified.
pub fn combined_status<I>(statuses: I) -> Status
where
    I: IntoIterator<Item = Status>,
{
    statuses
        .into_iter()
        .fold(Status::Unchanged, |acc, status| {
            if status.priority() > acc.priority() {
                status
            } else if status.priority() == acc.priority() && status != acc && acc.is_change() {
                Status::Modified
            } else {
                acc
            }
        })
}

/// Recompute container statuses bottom-up
///
/// Leaves, and containers with no children, keep the status their
/// comparator gave them. A container was compared on both sides, so an
/// added or deleted member makes the container itself modified.
pub fn propagate_status(node: &mut DiffNode) {
    let Some(children) = node.children.as_mut() else {
        return;
    };
    if children.is_empty() {
        return;
    }

    for child in children.iter_mut() {
        propagate_status(child);
    }

    node.status = match combined_status(children.iter().map(|child| child.status)) {
        Status::Added | Status::Deleted => Status::Modified,
        status => status,
    };
}
