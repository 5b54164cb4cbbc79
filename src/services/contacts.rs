//! Merchant contact list

use crate::{error::AppResult, models::contact::Contact, repository::Repository};

const MAX_PER_PAGE: i64 = 200;

#[derive(Clone)]
pub struct ContactsService {
    repository: Repository,
}

impl ContactsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Paginated contacts, most recent visitors first
    pub async fn list(
        &self,
        business_id: i64,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> AppResult<(Vec<Contact>, i64, i64, i64)> {
        let page = page.unwrap_or(1).max(1);
        let per_page = per_page.unwrap_or(50).clamp(1, MAX_PER_PAGE);

        self.repository.businesses.get_by_id(business_id).await?;
        let (contacts, total) = self
            .repository
            .contacts
            .list(business_id, page, per_page)
            .await?;
        Ok((contacts, total, page, per_page))
    }
}
