use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Scenario graph construction and validation errors
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Graph has no start node")]
    MissingStartNode,

    #[error("Graph has more than one start node: {first} and {second}")]
    MultipleStartNodes { first: String, second: String },

    #[error("Edge {edge_id} references unknown node: {node_id}")]
    UnknownNode { edge_id: String, node_id: String },

    #[error("Node {node_id} lists unknown edge in edge_order: {edge_id}")]
    UnknownEdge { node_id: String, edge_id: String },

    #[error("Edge {edge_id} leaves {node_id} but is missing from its edge_order")]
    UnorderedEdge { node_id: String, edge_id: String },

    #[error("Node {node_id} orders a conditional edge after an unconditional one: {edge_id}")]
    UnreachableCondition { node_id: String, edge_id: String },

    #[error("Start node {node_id} has incoming edges")]
    StartNodeEntered { node_id: String },

    #[error("Start node {node_id} has no outgoing edges")]
    StartNodeDeadEnd { node_id: String },

    #[error("End node {node_id} has outgoing edges")]
    EndNodeWithExits { node_id: String },

    #[error("Node {node_id} is unreachable from the start node")]
    UnreachableNode { node_id: String },
}

/// Session lifecycle errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("No active session")]
    NoActiveSession,

    #[error("Voice agent is not configured: {message}")]
    NotConfigured { message: String },
}

/// Storage layer errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Query failed: {message}")]
    Query { message: String },

    #[error("Migration failed: {message}")]
    Migration { message: String },

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Voice provider API errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider unavailable: {message} (retries: {retries})")]
    Unavailable { message: String, retries: u32 },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for scenario graph operations
pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;
