/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// History ledger read and delete operations.
pub mod history_service;
/// Durable roster operations.
pub mod roster_service;
/// Core session lifecycle and scoring logic.
pub mod session_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Statistics aggregation over roster and history.
pub mod stats_service;
/// Storage persistence coordinator with reconnection.
pub mod storage_supervisor;
