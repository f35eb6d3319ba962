//! Business logic services

pub mod catalog;
pub mod email;
pub mod loans;
pub mod members;
pub mod notifications;
pub mod overdue;

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::{jobs::JobQueue, repository::Repository};

/// Calendar date used for due dates and overdue checks
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub members: members::MembersService,
    pub loans: loans::LoansService,
    pub notifications: notifications::NotificationService,
    pub overdue: overdue::OverdueService,
}

impl Services {
    /// Create all services over the given repository, job queue and mailer
    pub fn new(
        repository: Repository,
        queue: Arc<dyn JobQueue>,
        mailer: Arc<dyn email::Mailer>,
    ) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            members: members::MembersService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), queue.clone()),
            notifications: notifications::NotificationService::new(repository.clone(), mailer),
            overdue: overdue::OverdueService::new(repository, queue),
        }
    }
}
