//! Overdue sweep: finds unreturned loans past their due date and fans out reminders

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    error::AppResult,
    jobs::{Job, JobQueue},
    models::member::non_empty,
    repository::Repository,
};

#[derive(Clone)]
pub struct OverdueService {
    repository: Repository,
    queue: Arc<dyn JobQueue>,
}

impl OverdueService {
    pub fn new(repository: Repository, queue: Arc<dyn JobQueue>) -> Self {
        Self { repository, queue }
    }

    /// Run the sweep as a job body. Failures are logged, never returned.
    pub async fn check_overdue_loans(&self, today: NaiveDate) {
        match self.sweep(today).await {
            Ok(enqueued) => tracing::info!("Overdue sweep enqueued {} reminder(s)", enqueued),
            Err(e) => tracing::error!("Overdue sweep failed: {}", e),
        }
    }

    /// Enqueue one reminder per overdue loan whose member has an email.
    /// Returns the number of reminders enqueued.
    pub async fn sweep(&self, today: NaiveDate) -> AppResult<usize> {
        let overdue = self.repository.loans.find_overdue(today).await?;
        let mut enqueued = 0;

        for loan in overdue {
            let Some(email) = non_empty(loan.email.as_deref()) else {
                tracing::debug!("Loan {} is overdue but {} has no email", loan.loan_id, loan.username);
                continue;
            };

            self.queue
                .enqueue(Job::SendOverdueNotification {
                    username: loan.username.clone(),
                    member_email: email.to_string(),
                    book_title: loan.book_title.clone(),
                })
                .await?;
            enqueued += 1;
        }

        Ok(enqueued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    use crate::{
        error::AppError,
        jobs::MockJobQueue,
        models::OverdueLoan,
        repository::{MockAuthorStore, MockBookStore, MockLoanStore, MockMemberStore},
        testing,
    };

    fn service(loans: MockLoanStore, queue: MockJobQueue) -> OverdueService {
        OverdueService::new(
            testing::repository(
                MockAuthorStore::new(),
                MockBookStore::new(),
                MockMemberStore::new(),
                loans,
            ),
            Arc::new(queue),
        )
    }

    fn overdue(loan_id: i32, username: &str, email: Option<&str>) -> OverdueLoan {
        OverdueLoan {
            loan_id,
            username: username.to_string(),
            email: email.map(String::from),
            book_title: "Inferno".to_string(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[tokio::test]
    async fn test_one_reminder_per_overdue_loan() {
        let mut loans = MockLoanStore::new();
        loans
            .expect_find_overdue()
            .with(eq(today()))
            .returning(|_| Ok(vec![overdue(1, "test", Some("test@mail.com"))]));

        let mut queue = MockJobQueue::new();
        queue
            .expect_enqueue()
            .with(eq(Job::SendOverdueNotification {
                username: "test".to_string(),
                member_email: "test@mail.com".to_string(),
                book_title: "Inferno".to_string(),
            }))
            .times(1)
            .returning(|_| Ok(()));

        let enqueued = service(loans, queue).sweep(today()).await.unwrap();
        assert_eq!(enqueued, 1);
    }

    #[tokio::test]
    async fn test_members_without_email_are_skipped() {
        let mut loans = MockLoanStore::new();
        loans.expect_find_overdue().returning(|_| {
            Ok(vec![
                overdue(1, "alice", Some("alice@mail.com")),
                overdue(2, "bob", None),
                overdue(3, "carol", Some("")),
                overdue(4, "dave", Some("dave@mail.com")),
            ])
        });

        let mut queue = MockJobQueue::new();
        queue
            .expect_enqueue()
            .withf(|job| {
                matches!(job, Job::SendOverdueNotification { username, .. }
                    if username == "alice" || username == "dave")
            })
            .times(2)
            .returning(|_| Ok(()));

        let enqueued = service(loans, queue).sweep(today()).await.unwrap();
        assert_eq!(enqueued, 2);
    }

    #[tokio::test]
    async fn test_sweep_failure_is_swallowed() {
        let mut loans = MockLoanStore::new();
        loans
            .expect_find_overdue()
            .returning(|_| Err(AppError::Internal("connection reset".to_string())));
        let mut queue = MockJobQueue::new();
        queue.expect_enqueue().never();

        service(loans, queue).check_overdue_loans(today()).await;
    }

    #[tokio::test]
    async fn test_enqueue_failure_stops_the_sweep() {
        let mut loans = MockLoanStore::new();
        loans.expect_find_overdue().returning(|_| {
            Ok(vec![
                overdue(1, "alice", Some("alice@mail.com")),
                overdue(2, "bob", Some("bob@mail.com")),
            ])
        });
        let mut queue = MockJobQueue::new();
        queue
            .expect_enqueue()
            .times(1)
            .returning(|_| Err(AppError::Queue("broker gone".to_string())));

        let result = service(loans, queue).sweep(today()).await;
        assert!(matches!(result, Err(AppError::Queue(_))));
    }

    #[tokio::test]
    async fn test_nothing_overdue() {
        let mut loans = MockLoanStore::new();
        loans.expect_find_overdue().returning(|_| Ok(Vec::new()));
        let mut queue = MockJobQueue::new();
        queue.expect_enqueue().never();

        let enqueued = service(loans, queue).sweep(testing::days_from_today(0)).await.unwrap();
        assert_eq!(enqueued, 0);
    }
}
