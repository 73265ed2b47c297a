//! Global allocator.
//!
//! Every chunk run allocates one frame-sized buffer and a handful of small
//! header strings; mimalloc keeps that churn cheap across concurrent runs.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;
