//! Retriever specifications and the similarity-search seam.
//!
//! Each course-content category gets one retriever: a named handle over an
//! independent document collection, configured with shared search parameters.
//! The actual nearest-neighbor search sits behind the [`SearchBackend`] trait.

mod collection;
mod registry;

pub use collection::{CollectionBackend, CollectionRecord};
pub use registry::RetrieverRegistry;

use crate::error::{Result, VeilederError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Search strategy for a retriever. Only plain similarity search is
/// supported; the variant exists so configs stay forward-compatible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Similarity,
}

/// Immutable configuration for one retriever.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieverSpec {
    /// Unique tool name the model selects by.
    pub name: String,
    /// Description shown to the model; the only other contract surface.
    pub description: String,
    /// Search strategy.
    pub search_type: SearchType,
    /// Number of results returned after filtering.
    pub k: usize,
    /// Minimum similarity score a result must clear.
    pub score_threshold: f32,
    /// Candidate pool size fetched from the backend before filtering.
    pub fetch_k: usize,
}

impl RetrieverSpec {
    /// Create a validated retriever spec.
    pub fn new(
        name: &str,
        description: &str,
        k: usize,
        score_threshold: f32,
        fetch_k: usize,
    ) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(VeilederError::Config(
                "Retriever name must not be empty".to_string(),
            ));
        }
        if k == 0 {
            return Err(VeilederError::Config(format!(
                "Retriever '{}': k must be at least 1",
                name
            )));
        }
        if fetch_k < k {
            return Err(VeilederError::Config(format!(
                "Retriever '{}': fetch_k ({}) must be >= k ({})",
                name, fetch_k, k
            )));
        }
        if !(0.0..=1.0).contains(&score_threshold) {
            return Err(VeilederError::Config(format!(
                "Retriever '{}': score_threshold must be in [0, 1], got {}",
                name, score_threshold
            )));
        }

        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
            search_type: SearchType::Similarity,
            k,
            score_threshold,
            fetch_k,
        })
    }
}

/// A document returned by a retriever call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// Text content of the document chunk.
    pub content: String,
    /// Metadata carried alongside the chunk. Collections are expected to
    /// provide at least a `source` key.
    pub metadata: HashMap<String, String>,
    /// Similarity score (higher is better).
    pub score: f32,
}

impl RetrievedDocument {
    /// The document's source identifier, if present.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").map(|s| s.as_str())
    }

    /// A locator within the source (page or section), if present.
    pub fn locator(&self) -> Option<&str> {
        self.metadata
            .get("page")
            .or_else(|| self.metadata.get("section"))
            .map(|s| s.as_str())
    }
}

/// Trait for similarity-search backends.
///
/// Implementations return up to `fetch_k` scored candidates in descending
/// score order; threshold filtering and truncation to `k` happen in the tool
/// wrapper, not here.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str, fetch_k: usize) -> Result<Vec<RetrievedDocument>>;
}

/// The fixed course-content categories, one retriever each.
///
/// Order matters: the system prompt tells the model to consult sources in
/// this order, and catalog order follows registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCategory {
    CourseNotes,
    CourseTextbook,
    KnowledgeComponents,
    CourseLogistics,
    CourseOverview,
    CourseName,
}

impl ContentCategory {
    /// All categories in registration (priority) order.
    pub fn all() -> [ContentCategory; 6] {
        [
            ContentCategory::CourseNotes,
            ContentCategory::CourseTextbook,
            ContentCategory::KnowledgeComponents,
            ContentCategory::CourseLogistics,
            ContentCategory::CourseOverview,
            ContentCategory::CourseName,
        ]
    }

    /// Tool name exposed to the model.
    pub fn tool_name(&self) -> &'static str {
        match self {
            ContentCategory::CourseNotes => "search_course_notes",
            ContentCategory::CourseTextbook => "search_course_textbook",
            ContentCategory::KnowledgeComponents => "search_knowledge_components",
            ContentCategory::CourseLogistics => "search_course_logistics",
            ContentCategory::CourseOverview => "search_course_overview",
            ContentCategory::CourseName => "search_course_name",
        }
    }

    /// Tool description shown to the model.
    pub fn description(&self) -> &'static str {
        match self {
            ContentCategory::CourseNotes => {
                "Primary tool for course-specific content and concepts. Search course notes first."
            }
            ContentCategory::CourseTextbook => {
                "Primary tool for C programming questions. Search textbook content."
            }
            ContentCategory::KnowledgeComponents => {
                "Search Knowledge Components (KCs) for C programming concepts and debugging."
            }
            ContentCategory::CourseLogistics => {
                "Search course logistics, schedules, and policies from Canvas."
            }
            ContentCategory::CourseOverview => "Search course overview and policies.",
            ContentCategory::CourseName => "Basic course name information.",
        }
    }

    /// File name of the collection backing this category, relative to the
    /// collections directory.
    pub fn collection_file(&self) -> &'static str {
        match self {
            ContentCategory::CourseNotes => "course_notes.json",
            ContentCategory::CourseTextbook => "course_textbook.json",
            ContentCategory::KnowledgeComponents => "knowledge_components.json",
            ContentCategory::CourseLogistics => "course_logistics.json",
            ContentCategory::CourseOverview => "course_overview.json",
            ContentCategory::CourseName => "course_name.json",
        }
    }
}
