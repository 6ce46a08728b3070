// 活动报名台账。register 里的存在性检查只是提前返回，
// 真正防止并发重复报名的是存储层 (user_id, activity_id) 唯一约束
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthContext;
use crate::ids::RecordId;
use crate::models::{Participant, Participation};
use crate::repository::{ActivityRepository, ParticipationRepository, StoreError};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("activity not found or inactive")]
    NotEligible,
    #[error("already registered for this activity")]
    AlreadyRegistered,
    #[error("participation not found")]
    NotRegistered,
    #[error(transparent)]
    Store(StoreError),
}

/// 会员活动列表里每个活动的报名概况
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationOverview {
    pub participants: Vec<Participant>,
    pub participant_count: usize,
    pub is_participating: bool,
}

#[derive(Clone)]
pub struct ParticipationLedger {
    activities: Arc<dyn ActivityRepository>,
    participations: Arc<dyn ParticipationRepository>,
}

impl ParticipationLedger {
    pub fn new(
        activities: Arc<dyn ActivityRepository>,
        participations: Arc<dyn ParticipationRepository>,
    ) -> Self {
        Self {
            activities,
            participations,
        }
    }

    pub async fn register(
        &self,
        caller: &AuthContext,
        activity_id: RecordId,
    ) -> Result<Participation, LedgerError> {
        let activity = self
            .activities
            .find_by_id(activity_id)
            .await
            .map_err(LedgerError::Store)?;
        if !activity.is_some_and(|a| a.active) {
            return Err(LedgerError::NotEligible);
        }

        if self.is_registered(caller.user_id, activity_id).await? {
            return Err(LedgerError::AlreadyRegistered);
        }

        match self.participations.insert(caller.user_id, activity_id).await {
            Ok(participation) => {
                tracing::info!(
                    user_id = %caller.user_id,
                    activity_id = %activity_id,
                    "participation registered"
                );
                Ok(participation)
            }
            // 并发重复报名被唯一约束拦下
            Err(StoreError::UniqueViolation(_)) => Err(LedgerError::AlreadyRegistered),
            // 检查之后活动被删除
            Err(StoreError::ForeignKeyViolation(_)) => Err(LedgerError::NotEligible),
            Err(e) => Err(LedgerError::Store(e)),
        }
    }

    pub async fn cancel(
        &self,
        caller: &AuthContext,
        activity_id: RecordId,
    ) -> Result<(), LedgerError> {
        let removed = self
            .participations
            .delete(caller.user_id, activity_id)
            .await
            .map_err(LedgerError::Store)?;
        if !removed {
            return Err(LedgerError::NotRegistered);
        }

        tracing::info!(
            user_id = %caller.user_id,
            activity_id = %activity_id,
            "participation cancelled"
        );
        Ok(())
    }

    pub async fn is_registered(
        &self,
        user_id: RecordId,
        activity_id: RecordId,
    ) -> Result<bool, LedgerError> {
        self.participations
            .exists(user_id, activity_id)
            .await
            .map_err(LedgerError::Store)
    }

    pub async fn list_for_activity(
        &self,
        activity_id: RecordId,
    ) -> Result<Vec<Participant>, LedgerError> {
        self.participations
            .list_for_activity(activity_id)
            .await
            .map_err(LedgerError::Store)
    }

    pub async fn participant_count(&self, activity_id: RecordId) -> Result<usize, LedgerError> {
        Ok(self.list_for_activity(activity_id).await?.len())
    }

    pub async fn overview(
        &self,
        caller: &AuthContext,
        activity_id: RecordId,
    ) -> Result<ParticipationOverview, LedgerError> {
        let participants = self.list_for_activity(activity_id).await?;
        Ok(ParticipationOverview {
            participant_count: participants.len(),
            is_participating: participants.iter().any(|p| p.user_id == caller.user_id),
            participants,
        })
    }
}
