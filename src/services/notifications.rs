//! Bodies of the notification jobs

use std::sync::Arc;

use super::email::{loan_confirmation, overdue_reminder, Mailer};
use crate::{error::AppResult, models::member::non_empty, repository::Repository};

#[derive(Clone)]
pub struct NotificationService {
    repository: Repository,
    mailer: Arc<dyn Mailer>,
}

impl NotificationService {
    pub fn new(repository: Repository, mailer: Arc<dyn Mailer>) -> Self {
        Self { repository, mailer }
    }

    /// Confirm a checkout by email.
    ///
    /// A loan that no longer exists is skipped without error. Mail failures propagate.
    pub async fn send_loan_notification(&self, loan_id: i32) -> AppResult<()> {
        let Some(notice) = self.repository.loans.notice(loan_id).await? else {
            tracing::debug!("Loan {} no longer exists, skipping confirmation", loan_id);
            return Ok(());
        };

        let Some(email) = non_empty(notice.email.as_deref()) else {
            tracing::warn!(
                "Member {} has no email on file, skipping confirmation for loan {}",
                notice.username,
                loan_id
            );
            return Ok(());
        };

        let mail = loan_confirmation(&notice.username, &notice.book_title);
        self.mailer.send(email, &mail.subject, &mail.body).await
    }

    /// Send an overdue reminder from already-resolved values
    pub async fn send_overdue_notification(
        &self,
        username: &str,
        member_email: &str,
        book_title: &str,
    ) -> AppResult<()> {
        let mail = overdue_reminder(username, book_title);
        self.mailer.send(member_email, &mail.subject, &mail.body).await
    }
}
