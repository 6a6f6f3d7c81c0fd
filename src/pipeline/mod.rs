//! Deal-pipeline configuration and grouping.
//!
//! A pipeline is a named relationship category (prospect, client,
//! collaborator, institution) with an ordered list of stages. `catalog`
//! holds the stage configuration per pipeline type, server-provided with a
//! built-in fallback; `board` partitions a contact snapshot into stage
//! buckets and assembles the kanban view.

pub mod board;
pub mod catalog;

pub use board::{
    build_board, contacts_in_pipeline, contacts_in_stage, next_stages, transition_stage,
    unassigned, Board, StageColumn, UNASSIGNED_STAGE,
};
pub use catalog::PipelineCatalog;
