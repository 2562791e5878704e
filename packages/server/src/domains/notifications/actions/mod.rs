use crate::common::{DomainError, NotificationId, UserId};
use crate::domains::notifications::models::Notification;
use crate::kernel::ServerDeps;

/// The caller's most recent notifications, newest first
pub async fn list_notifications(
    user_id: UserId,
    deps: &ServerDeps,
) -> Result<Vec<Notification>, DomainError> {
    Ok(deps.notifications.find_notifications(user_id).await?)
}

/// Mark one of the caller's notifications read. Someone else's id is a 404.
pub async fn mark_read(
    notification_id: NotificationId,
    user_id: UserId,
    deps: &ServerDeps,
) -> Result<Notification, DomainError> {
    deps.notifications
        .mark_read(notification_id, user_id)
        .await?
        .ok_or(DomainError::NotFound("notification"))
}

pub async fn mark_all_read(user_id: UserId, deps: &ServerDeps) -> Result<u64, DomainError> {
    Ok(deps.notifications.mark_all_read(user_id).await?)
}
