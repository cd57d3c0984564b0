//! Structured logging schema for tunebridge.
//!
//! Every crate logs with the same field names so a log aggregator can
//! query one sync run across subsystems. `tracing` macros take field names
//! as identifiers, so the schema lives here as documentation rather than
//! as constants.
//!
//! ## Fields
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `subsystem` | "inference", "catalog", "source", "jobs", "cli" |
//! | `component` | e.g. "ollama", "matcher", "provisioner", "orchestrator" |
//! | `job_id` | Sync job UUID |
//! | `playlist_id` | Source playlist id or song file path |
//! | `destination_id` | Destination playlist id |
//! | `track`, `artist` | Normalized query strings |
//! | `tier` | Matcher tier (1 or 2) |
//! | `duration_ms` | Wall-clock duration |
//! | `result_count` | Candidates returned by a catalog search |
//! | `item_count` | Items in a source playlist |
//! | `response_len` | Byte length of a model response |
//! | `model` | Extraction model name |
//! | `outcome` | "added", "not_found", "add_failed" |
//! | `error` | Error message when an operation fails |
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Job aborted (fetch or provisioning failure) |
//! | WARN  | Item skipped or fallback applied (no match, add failure, extraction fallback) |
//! | INFO  | Lifecycle events (startup, job start/finish), items added |
//! | DEBUG | Decision points (tier attempts, backend selection) |
//! | TRACE | Per-candidate and per-fragment data |
