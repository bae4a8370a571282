//! GetUnreadCountHandler - total unread badge for one user.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::messaging::MessagingError;
use crate::ports::MessageRepository;

pub struct GetUnreadCountHandler {
    messages: Arc<dyn MessageRepository>,
}

impl GetUnreadCountHandler {
    pub fn new(messages: Arc<dyn MessageRepository>) -> Self {
        Self { messages }
    }

    pub async fn handle(&self, user_id: &UserId) -> Result<u64, MessagingError> {
        Ok(self.messages.count_unread(user_id).await?)
    }
}
