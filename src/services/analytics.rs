//! Read-side analytics over the ingested history and producer links.

use crate::error::{option_to_result, AppResult};
use crate::repositories::{
    CollaborationEdge, FollowedProducer, GenreCount, ListeningHistoryRepository,
    ProducerPlayCount, ProducerRepository,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Node of the collaboration graph
#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    pub id: Uuid,
    pub name: String,
}

/// Edge of the collaboration graph, weighted by shared tracks
#[derive(Debug, Clone, Serialize)]
pub struct GraphEdge {
    pub from: Uuid,
    pub to: Uuid,
    pub shared_tracks: i64,
}

/// Collaboration graph around one root producer
#[derive(Debug, Clone, Serialize)]
pub struct CollaborationGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Aggregation queries backing the analytics endpoints
pub struct AnalyticsService {
    history_repo: Arc<ListeningHistoryRepository>,
    producer_repo: Arc<ProducerRepository>,
}

impl AnalyticsService {
    /// Create a new analytics service
    pub fn new(
        history_repo: Arc<ListeningHistoryRepository>,
        producer_repo: Arc<ProducerRepository>,
    ) -> Self {
        Self {
            history_repo,
            producer_repo,
        }
    }

    /// Play counts per genre for one user
    pub async fn genre_breakdown(&self, user_id: Uuid) -> AppResult<Vec<GenreCount>> {
        Ok(self.history_repo.genre_breakdown_for_user(user_id).await?)
    }

    /// Producers ranked by the user's play counts
    pub async fn top_producers(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<ProducerPlayCount>> {
        Ok(self.producer_repo.top_for_user(user_id, limit).await?)
    }

    /// Producers the user follows, favourites first
    pub async fn followed_producers(&self, user_id: Uuid) -> AppResult<Vec<FollowedProducer>> {
        Ok(self.producer_repo.followed_by_user(user_id).await?)
    }

    /// One-hop collaboration graph around a producer: the root, every
    /// producer sharing a track with it, and shared-track-weighted edges
    pub async fn collaboration_graph(&self, producer_id: Uuid) -> AppResult<CollaborationGraph> {
        let root = option_to_result(
            self.producer_repo.find_by_id(producer_id).await?,
            "producer",
        )?;

        let collaborators: Vec<CollaborationEdge> =
            self.producer_repo.collaborators_of(producer_id).await?;

        let mut nodes = vec![GraphNode {
            id: root.id,
            name: root.name,
        }];
        let mut edges = Vec::with_capacity(collaborators.len());

        for edge in collaborators {
            nodes.push(GraphNode {
                id: edge.producer_id,
                name: edge.name,
            });
            edges.push(GraphEdge {
                from: root.id,
                to: edge.producer_id,
                shared_tracks: edge.shared_tracks,
            });
        }

        Ok(CollaborationGraph { nodes, edges })
    }
}
