// Page resolution and render plans.
// Every page entry point runs the same pipeline: fetch -> group_slices -> PagePlan.

pub mod handlers;
pub mod metadata;
pub mod plan;
pub mod resolve;
