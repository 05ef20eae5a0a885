//! `SeaORM` implementation of the `DashboardService` trait.

use std::collections::HashMap;

use crate::constants::{UPLOADS_ROUTE, limits};
use crate::db::Store;
use crate::entities::claims::ClaimStatus;
use crate::entities::{claims, items};
use crate::services::dashboard_service::{
    AdminStats, ClaimSummary, DashboardError, DashboardService, ItemSummary, MemberStats,
    MemberTotals, RecentActivity,
};
use async_trait::async_trait;

pub struct SeaOrmDashboardService {
    store: Store,
}

impl SeaOrmDashboardService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn summarize_items(
        &self,
        models: Vec<items::Model>,
    ) -> Result<Vec<ItemSummary>, DashboardError> {
        let mut poster_ids: Vec<i32> = models.iter().map(|m| m.posted_by).collect();
        poster_ids.sort_unstable();
        poster_ids.dedup();

        let names: HashMap<i32, String> = self
            .store
            .get_users_by_ids(&poster_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();

        Ok(models
            .into_iter()
            .map(|m| ItemSummary {
                id: m.id,
                image_url: format!("{UPLOADS_ROUTE}/{}", m.image),
                posted_by_name: names.get(&m.posted_by).cloned(),
                title: m.title,
                status: m.status,
                found_location: m.found_location,
                found_date: m.found_date,
                created_at: m.created_at,
            })
            .collect())
    }

    async fn summarize_claims(
        &self,
        models: Vec<claims::Model>,
    ) -> Result<Vec<ClaimSummary>, DashboardError> {
        let item_ids: Vec<i32> = models.iter().map(|c| c.item_id).collect();
        let user_ids: Vec<i32> = models.iter().map(|c| c.user_id).collect();

        let items: HashMap<i32, items::Model> = self
            .store
            .get_items_by_ids(&item_ids)
            .await?
            .into_iter()
            .map(|i| (i.id, i))
            .collect();

        let users: HashMap<i32, (String, String)> = self
            .store
            .get_users_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, (u.name, u.email)))
            .collect();

        Ok(models
            .into_iter()
            .map(|c| {
                let item = items.get(&c.item_id);
                let user = users.get(&c.user_id);
                ClaimSummary {
                    id: c.id,
                    status: c.status,
                    created_at: c.created_at,
                    item_title: item.map(|i| i.title.clone()),
                    item_image_url: item.map(|i| format!("{UPLOADS_ROUTE}/{}", i.image)),
                    user_name: user.map(|(name, _)| name.clone()),
                    user_email: user.map(|(_, email)| email.clone()),
                }
            })
            .collect())
    }
}

#[async_trait]
impl DashboardService for SeaOrmDashboardService {
    async fn admin_stats(&self) -> Result<AdminStats, DashboardError> {
        let item_counts = self.store.item_counts().await?;
        let claim_counts = self.store.claim_counts().await?;

        let recent_items = self
            .store
            .recent_items(limits::ADMIN_RECENT_ACTIVITY)
            .await?;
        let recent_claims = self
            .store
            .recent_claims(limits::ADMIN_RECENT_ACTIVITY)
            .await?;

        Ok(AdminStats {
            items: item_counts.into(),
            claims: claim_counts.into(),
            recent_activity: RecentActivity {
                items: self.summarize_items(recent_items).await?,
                claims: self.summarize_claims(recent_claims).await?,
            },
        })
    }

    async fn member_stats(&self, user_id: i32) -> Result<MemberStats, DashboardError> {
        let stats = MemberTotals {
            items_reported: self.store.count_items_by_poster(user_id).await?,
            claims_made: self.store.count_claims_for_user(user_id, None).await?,
            claims_approved: self
                .store
                .count_claims_for_user(user_id, Some(ClaimStatus::Approved))
                .await?,
        };

        let mine = self
            .store
            .recent_items_by_poster(user_id, limits::USER_RECENT_ITEMS)
            .await?;
        let others = self
            .store
            .recent_available_items_from_others(user_id, limits::USER_RECENT_ITEMS)
            .await?;

        Ok(MemberStats {
            stats,
            my_recent_reports: self.summarize_items(mine).await?,
            recently_found: self.summarize_items(others).await?,
        })
    }
}
