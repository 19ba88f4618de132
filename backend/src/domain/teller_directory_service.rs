//! Read-only teller directory backed by the teller repository.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::ports::{TellerDirectory, TellerRepository, TellerRepositoryError};
use super::{Error, Teller, TellerId};

/// Teller directory service.
pub struct TellerDirectoryService<R> {
    tellers: Arc<R>,
}

impl<R> TellerDirectoryService<R> {
    /// Build the service over a teller repository.
    pub const fn new(tellers: Arc<R>) -> Self {
        Self { tellers }
    }
}

fn map_repository_error(error: TellerRepositoryError) -> Error {
    debug!(%error, "teller repository failure");
    match error {
        TellerRepositoryError::Connection { .. } => {
            Error::service_unavailable("teller store is unavailable")
        }
        TellerRepositoryError::Query { message } => {
            Error::internal(format!("teller store error: {message}"))
        }
    }
}

#[async_trait]
impl<R> TellerDirectory for TellerDirectoryService<R>
where
    R: TellerRepository,
{
    async fn list(&self, active_only: bool) -> Result<Vec<Teller>, Error> {
        self.tellers
            .list(active_only)
            .await
            .map_err(map_repository_error)
    }

    async fn get(&self, id: &TellerId) -> Result<Teller, Error> {
        self.tellers
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found("Teller not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockTellerRepository;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn list_forwards_active_filter() {
        let mut repo = MockTellerRepository::new();
        repo.expect_list()
            .withf(|active_only| *active_only)
            .times(1)
            .return_once(|_| Ok(vec![Teller::idle(TellerId::random(), "Teller A")]));
        let service = TellerDirectoryService::new(Arc::new(repo));

        let tellers = service.list(true).await.expect("listing succeeds");

        assert_eq!(tellers.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn get_missing_teller_is_not_found() {
        let mut repo = MockTellerRepository::new();
        repo.expect_find_by_id().return_once(|_| Ok(None));
        let service = TellerDirectoryService::new(Arc::new(repo));

        let error = service
            .get(&TellerId::random())
            .await
            .expect_err("teller is missing");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn connection_failures_are_unavailable() {
        let mut repo = MockTellerRepository::new();
        repo.expect_list()
            .return_once(|_| Err(TellerRepositoryError::connection("refused")));
        let service = TellerDirectoryService::new(Arc::new(repo));

        let error = service.list(false).await.expect_err("store is down");

        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
