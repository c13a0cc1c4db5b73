/// Authorization engine: actors, capabilities and the `can` predicate
pub mod access;
/// Club CRUD, status transitions and "my clubs"
pub mod club;
/// Event CRUD and visibility-filtered listing
pub mod event;
/// Club ledger entries
pub mod finance;
/// Status transition tables for clubs, memberships, events and payments
pub mod lifecycle;
/// Joining, deciding, promoting and leaving
pub mod membership;
/// Event registration and payment confirmation
pub mod participation;
/// Derived counts, totals and club overviews
pub mod stats;
/// Registration, authentication and account management
pub mod user;
