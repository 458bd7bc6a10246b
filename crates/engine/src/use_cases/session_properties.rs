//! Property and context records attached to a stored session.

use std::sync::Arc;

use xsession_domain::{Property, PropertyError, Session, SessionContext, SessionId, TitleId};

use crate::infrastructure::ports::{RepoError, SessionRepo};

#[derive(Debug, thiserror::Error)]
pub enum SessionPropertyError {
    #[error("Session not found: {title_id}/{session_id}")]
    SessionNotFound {
        title_id: TitleId,
        session_id: SessionId,
    },
    #[error("Malformed property at index {index}: {source}")]
    MalformedProperty {
        index: usize,
        #[source]
        source: PropertyError,
    },
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// Property and context operations on stored sessions.
pub struct SessionPropertyOps {
    sessions: Arc<dyn SessionRepo>,
}

impl SessionPropertyOps {
    pub fn new(sessions: Arc<dyn SessionRepo>) -> Self {
        Self { sessions }
    }

    /// Decode and upsert properties by attribute key.
    ///
    /// Every entry is decoded before anything is stored; one malformed entry
    /// rejects the whole request.
    pub async fn add_properties(
        &self,
        title_id: TitleId,
        session_id: SessionId,
        encoded: &[String],
    ) -> Result<Session, SessionPropertyError> {
        let properties = encoded
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                Property::decode(raw)
                    .map_err(|source| SessionPropertyError::MalformedProperty { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut session = self.load(title_id, session_id).await?;
        session.add_properties(properties);
        self.sessions.save(&session).await?;

        tracing::debug!(
            %title_id,
            %session_id,
            count = encoded.len(),
            "Session properties updated"
        );
        Ok(session)
    }

    pub async fn list_properties(
        &self,
        title_id: TitleId,
        session_id: SessionId,
    ) -> Result<Vec<Property>, SessionPropertyError> {
        Ok(self.load(title_id, session_id).await?.properties)
    }

    /// Upsert contexts by context id.
    pub async fn set_contexts(
        &self,
        title_id: TitleId,
        session_id: SessionId,
        contexts: Vec<SessionContext>,
    ) -> Result<Session, SessionPropertyError> {
        let mut session = self.load(title_id, session_id).await?;
        session.set_contexts(contexts);
        self.sessions.save(&session).await?;
        Ok(session)
    }

    /// The session's contexts as canonical base64 context records.
    pub async fn encoded_contexts(
        &self,
        title_id: TitleId,
        session_id: SessionId,
    ) -> Result<Vec<String>, SessionPropertyError> {
        let session = self.load(title_id, session_id).await?;
        Ok(session
            .context_properties()
            .into_iter()
            .map(String::from)
            .collect())
    }

    async fn load(
        &self,
        title_id: TitleId,
        session_id: SessionId,
    ) -> Result<Session, SessionPropertyError> {
        self.sessions
            .find(title_id, session_id)
            .await?
            .ok_or(SessionPropertyError::SessionNotFound {
                title_id,
                session_id,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockSessionRepo;
    use mockall::predicate::{always, eq};
    use xsession_domain::{keys, PropertyValue};

    const TITLE: TitleId = TitleId::new(0x4D5307E6);
    const SESSION: SessionId = SessionId::new(0xAABBCCDD00112233);

    fn repo_with(session: Option<Session>) -> MockSessionRepo {
        let mut repo = MockSessionRepo::new();
        repo.expect_find()
            .with(eq(TITLE), eq(SESSION))
            .returning(move |_, _| Ok(session.clone()));
        repo
    }

    #[tokio::test]
    async fn adds_and_replaces_properties_by_key() {
        let mut stored = Session::new(SESSION, TITLE);
        stored.add_properties([Property::context(keys::CONTEXT_GAME_MODE, 1)]);

        let mut repo = repo_with(Some(stored));
        repo.expect_save()
            .with(always())
            .times(1)
            .returning(|_| Ok(()));
        let ops = SessionPropertyOps::new(Arc::new(repo));

        let updated = ops
            .add_properties(
                TITLE,
                SESSION,
                &[
                    Property::encode_context(keys::CONTEXT_GAME_MODE, 3),
                    Property::encode_context(keys::CONTEXT_GAME_TYPE, 1),
                ],
            )
            .await
            .unwrap();

        assert_eq!(updated.properties.len(), 2);
        assert_eq!(
            updated.property(keys::CONTEXT_GAME_MODE).map(Property::value),
            Some(&PropertyValue::Context(3))
        );
    }

    #[tokio::test]
    async fn one_malformed_entry_rejects_the_request() {
        let mut repo = MockSessionRepo::new();
        repo.expect_find().never();
        repo.expect_save().never();
        let ops = SessionPropertyOps::new(Arc::new(repo));

        let result = ops
            .add_properties(
                TITLE,
                SESSION,
                &[
                    Property::encode_context(keys::CONTEXT_GAME_MODE, 3),
                    "not base64!".to_string(),
                ],
            )
            .await;

        assert!(matches!(
            result,
            Err(SessionPropertyError::MalformedProperty { index: 1, .. })
        ));
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let ops = SessionPropertyOps::new(Arc::new(repo_with(None)));

        let result = ops.list_properties(TITLE, SESSION).await;
        assert!(matches!(
            result,
            Err(SessionPropertyError::SessionNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn contexts_are_upserted_and_encoded() {
        let mut stored = Session::new(SESSION, TITLE);
        stored.set_contexts([SessionContext {
            context_id: keys::CONTEXT_GAME_MODE,
            value: 1,
        }]);

        let mut repo = repo_with(Some(stored));
        repo.expect_save().times(1).returning(|_| Ok(()));
        let ops = SessionPropertyOps::new(Arc::new(repo));

        let updated = ops
            .set_contexts(
                TITLE,
                SESSION,
                vec![
                    SessionContext {
                        context_id: keys::CONTEXT_GAME_MODE,
                        value: 2,
                    },
                    SessionContext {
                        context_id: keys::CONTEXT_GAME_TYPE,
                        value: 0,
                    },
                ],
            )
            .await
            .unwrap();
        assert_eq!(updated.contexts.len(), 2);
        assert_eq!(updated.contexts[0].value, 2);
    }

    #[tokio::test]
    async fn encoded_contexts_decode_back_to_the_same_values() {
        let mut stored = Session::new(SESSION, TITLE);
        stored.set_contexts([SessionContext {
            context_id: keys::CONTEXT_GAME_MODE,
            value: 0x0102_0304,
        }]);
        let ops = SessionPropertyOps::new(Arc::new(repo_with(Some(stored))));

        let encoded = ops.encoded_contexts(TITLE, SESSION).await.unwrap();
        assert_eq!(encoded.len(), 1);

        let decoded = Property::decode(&encoded[0]).unwrap();
        assert_eq!(decoded.attribute_key(), keys::CONTEXT_GAME_MODE);
        assert_eq!(decoded.value(), &PropertyValue::Context(0x0102_0304));
    }
}
