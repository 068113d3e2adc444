//! Issue Scout API back-end.
//!
//! ## Overview
//!
//! The back-end simulates an agent that scans GitHub repositories for
//! approachable issues and then "implements" one of them. Nothing is
//! scanned or implemented: each job is recorded with a creation time and
//! resolves to canned fixture data once its delay has elapsed. Resolution
//! is lazy and happens on the read path, so there are no timers or
//! background tasks.
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────┐   HTTP   ┌──────────────────────────────────────────────────┐
//! │  Client  │ ───────> │  server.rs  (axum Router, CORS, TraceLayer)      │
//! │  (React) │ <─────── │    ├─ api.rs   (job routes, AppState, ApiError)  │
//! └──────────┘  cookie  │    └─ auth.rs  (OAuth, sessions, repo listing)   │
//!                       │         │                                        │
//!                       │         │ ScanStore::get(id, now)                │
//!                       │         v                                        │
//!                       │  store.rs   (ScanStore, ImplementationStore)     │
//!                       │         │                                        │
//!                       │         │ resolver::resolve(state, created, ..)  │
//!                       │         v                                        │
//!                       │  resolver.rs ── fixtures.rs ── repo_key.rs       │
//!                       └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Supporting Modules
//!
//! | Module     | Responsibility                                           |
//! |------------|----------------------------------------------------------|
//! | `models`   | Wire types: `Issue`, `PullRequest`, `ScanView`, `User`   |
//! | `users`    | In-memory session registry (`UserStore`)                 |
//! | `github`   | REST client: OAuth code exchange, repos, issues, comments|
//!
//! ## Job Lifecycle
//!
//! 1. `POST /api/repositories/scan` stores a pending `ScanJob` and derives
//!    its `owner/name` key with `repo_key::extract_key()`.
//! 2. `GET /api/repositories/scan/{id}` asks the resolver whether the scan
//!    delay has passed. If so the fixture issues for the key are attached
//!    and the job is completed in place.
//! 3. `POST /api/repositories/implement` requires a known scan and records
//!    a pending `ImplementationJob` for one issue id.
//! 4. Polling the implementation after its delay attaches the fixture pull
//!    request for that issue, or none if the id has no fixture.

pub mod api;
pub mod auth;
pub mod fixtures;
pub mod github;
pub mod models;
pub mod repo_key;
pub mod resolver;
pub mod server;
pub mod store;
pub mod users;
