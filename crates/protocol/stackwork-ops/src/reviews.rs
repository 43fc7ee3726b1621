//! Reviews of completed work.

use stackwork_crypto::{current_timestamp, random_id};
use stackwork_store::{ReviewStore, StoreError};
use stackwork_types::{Review, TaskStatus, MAX_MESSAGE_LENGTH, MAX_RATING, MIN_RATING, REVIEW_ID_PREFIX};
use tracing::info;

use crate::engine::{require_poster, required_text, TaskEngine};
use crate::error::{OpsError, OpsResult};
use crate::events::MarketEvent;
use crate::requests::NewReview;

impl TaskEngine {
    /// Rate the agent that completed a task.
    ///
    /// The insert and the agent's rating recompute commit together; the
    /// average is recomputed from every stored review.
    pub fn submit_review(&self, task_id: &str, request: NewReview) -> OpsResult<Review> {
        let task = self.load_task(task_id)?;
        if !task.status.is_reviewable() {
            return Err(OpsError::wrong_status(
                &task.id,
                task.status,
                &[TaskStatus::Completed, TaskStatus::Closed],
            ));
        }
        if !task.is_assigned_to(&request.agent_id) {
            return Err(OpsError::validation(format!(
                "Agent {} was not assigned to task {}",
                request.agent_id, task_id
            )));
        }
        require_poster(&task, &request.reviewer_address, "review this task")?;

        let rating = u8::try_from(request.rating)
            .ok()
            .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
            .ok_or(OpsError::RatingOutOfRange(request.rating))?;
        let comment = required_text(&request.comment, "Comment", MAX_MESSAGE_LENGTH)?;

        let review = Review {
            id: random_id(REVIEW_ID_PREFIX),
            task_id: task.id.clone(),
            agent_id: request.agent_id,
            reviewer_address: request.reviewer_address,
            rating,
            comment,
            created_at: current_timestamp(),
        };

        let agent = self.state.reviews.insert_review(&review).map_err(|e| match e {
            StoreError::Duplicate(_) => OpsError::DuplicateReview {
                task_id: review.task_id.clone(),
                agent_id: review.agent_id.clone(),
            },
            other => other.into(),
        })?;

        info!(
            task_id,
            agent_id = %agent.id,
            rating,
            avg_rating = agent.avg_rating,
            total_reviews = agent.total_reviews,
            "Review submitted"
        );
        self.emit(MarketEvent::ReviewSubmitted {
            review: review.clone(),
        });
        Ok(review)
    }

    /// Reviews an agent received, oldest first.
    pub fn list_agent_reviews(&self, agent_id: &str) -> OpsResult<Vec<Review>> {
        self.load_agent(agent_id)?;
        Ok(self.state.reviews.list_reviews_for_agent(agent_id)?)
    }

    pub fn list_task_reviews(&self, task_id: &str) -> OpsResult<Vec<Review>> {
        self.load_task(task_id)?;
        Ok(self.state.reviews.list_reviews_for_task(task_id)?)
    }
}
