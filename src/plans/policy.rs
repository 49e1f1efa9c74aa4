// ABOUTME: Single-active-plan policy: deactivate every plan of a kind, then insert the new one
// ABOUTME: Storage-independent via the PlanStore and PlanUnitOfWork traits, retried as one unit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

//! # Single-Active-Plan Policy
//!
//! A user has at most one active plan of each [`PlanKind`]. Creating a plan runs two
//! steps inside one unit of work:
//!
//! 1. deactivate every plan of the same kind owned by the user
//! 2. insert the new plan as active
//!
//! The unit of work commits both or neither. A unit of work dropped without
//! [`PlanUnitOfWork::commit`] must discard its changes, so any failure between the two
//! steps leaves the previous active plan in place.

use async_trait::async_trait;
use athletix_core::constants::defaults;
use athletix_core::errors::AppResult;
use athletix_core::models::{Plan, PlanDraft, PlanKind};
use tracing::info;
use uuid::Uuid;

use crate::database::retry_transaction;

/// Source of plan units of work
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Begin a unit of work
    async fn begin(&self) -> AppResult<Box<dyn PlanUnitOfWork>>;
}

/// One atomic plan change; discarded unless committed
#[async_trait]
pub trait PlanUnitOfWork: Send {
    /// Mark every active plan of `kind` owned by `user_id` inactive; returns how many changed
    async fn deactivate_all_of_kind(&mut self, user_id: Uuid, kind: PlanKind) -> AppResult<u64>;

    /// Insert a new plan as the user's active plan of its kind
    async fn insert_active(&mut self, user_id: Uuid, draft: &PlanDraft) -> AppResult<Plan>;

    /// Make both steps visible at once
    async fn commit(self: Box<Self>) -> AppResult<()>;
}

/// Policy object enforcing one active plan per user and kind
pub struct SingleActivePlanPolicy<S> {
    store: S,
    max_attempts: u32,
}

impl<S: PlanStore> SingleActivePlanPolicy<S> {
    /// Create a policy over a store
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
            max_attempts: defaults::TRANSACTION_MAX_RETRIES,
        }
    }

    /// Override the retry budget used when the store reports contention
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Underlying store
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Create `draft` as the user's only active plan of its kind
    ///
    /// # Errors
    ///
    /// Returns the store's error if either step or the commit fails; retryable
    /// failures are retried before being returned
    pub async fn create_plan(&self, user_id: Uuid, draft: &PlanDraft) -> AppResult<Plan> {
        retry_transaction(|| self.create_once(user_id, draft), self.max_attempts).await
    }

    async fn create_once(&self, user_id: Uuid, draft: &PlanDraft) -> AppResult<Plan> {
        let kind = draft.kind();
        let mut unit = self.store.begin().await?;
        let deactivated = unit.deactivate_all_of_kind(user_id, kind).await?;
        let plan = unit.insert_active(user_id, draft).await?;
        unit.commit().await?;

        info!(
            user_id = %user_id,
            plan_kind = %kind,
            plan_id = %plan.id(),
            deactivated,
            "Plan created as the active plan"
        );
        Ok(plan)
    }
}
