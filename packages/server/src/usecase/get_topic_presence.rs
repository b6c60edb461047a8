//! UseCase: トピックの presence 取得（デバッグ用）

use std::sync::Arc;

use typefast_shared::protocol::PresenceState;

use crate::domain::{Topic, TopicRepository};

pub struct GetTopicPresenceUseCase {
    repository: Arc<dyn TopicRepository>,
}

impl GetTopicPresenceUseCase {
    pub fn new(repository: Arc<dyn TopicRepository>) -> Self {
        Self { repository }
    }

    /// 購読者のいないトピックは空の presence
    pub async fn execute(&self, topic: &Topic) -> PresenceState {
        self.repository.presence_state(topic).await
    }
}
