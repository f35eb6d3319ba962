//! Member registry service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        member::{CreateMember, UpdateMember},
        Member, PageRequest, TopActiveMember,
    },
    repository::Repository,
};

/// Size of the top active members ranking
pub const TOP_ACTIVE_LIMIT: i64 = 5;

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
}

impl MembersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, page: &PageRequest) -> AppResult<(Vec<Member>, i64)> {
        self.repository.members.list(page.limit(), page.offset()).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Member> {
        self.repository.members.get_by_id(id).await
    }

    /// Register a member and its user account
    pub async fn create(&self, data: CreateMember) -> AppResult<Member> {
        data.validate()?;
        let member = self.repository.members.create(&data).await?;
        tracing::info!("Registered member {} ({})", member.id, member.username);
        Ok(member)
    }

    pub async fn update(&self, id: i32, data: UpdateMember) -> AppResult<Member> {
        data.validate()?;
        self.repository.members.update(id, &data).await
    }

    /// Delete a member; refused while they still hold books
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.members.get_by_id(id).await?;
        let active = self.repository.loans.count_active_for_member(id).await?;
        if active > 0 {
            return Err(AppError::Conflict(format!("Member has {} active loan(s)", active)));
        }
        self.repository.members.delete(id).await
    }

    /// Members with the most active loans
    pub async fn top_active(&self) -> AppResult<Vec<TopActiveMember>> {
        self.repository.members.top_active(TOP_ACTIVE_LIMIT).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        repository::{MockAuthorStore, MockBookStore, MockLoanStore, MockMemberStore},
        testing,
    };

    fn service(members: MockMemberStore, loans: MockLoanStore) -> MembersService {
        MembersService::new(testing::repository(
            MockAuthorStore::new(),
            MockBookStore::new(),
            members,
            loans,
        ))
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_email() {
        let mut members = MockMemberStore::new();
        members.expect_create().never();

        let result = service(members, MockLoanStore::new())
            .create(CreateMember {
                username: "reader".to_string(),
                email: Some("not-an-email".to_string()),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_member_with_active_loans() {
        let mut members = MockMemberStore::new();
        members
            .expect_get_by_id()
            .returning(|id| Ok(testing::member(id, Some("reader@mail.com"))));
        members.expect_delete().never();
        let mut loans = MockLoanStore::new();
        loans.expect_count_active_for_member().returning(|_| Ok(2));

        let result = service(members, loans).delete(1).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_top_active_is_limited_to_five() {
        let mut members = MockMemberStore::new();
        members
            .expect_top_active()
            .withf(|limit| *limit == 5)
            .times(1)
            .returning(|_| {
                Ok(vec![TopActiveMember {
                    id: 2,
                    username: "alice".to_string(),
                    email: None,
                    active_loans: 3,
                }])
            });

        let top = service(members, MockLoanStore::new()).top_active().await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].active_loans, 3);
    }
}
