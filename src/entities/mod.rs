//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the relational schema: users, clubs, memberships,
//! events, event participations and finance records.

pub mod club;
pub mod event;
pub mod event_participation;
pub mod finance_record;
pub mod membership;
pub mod user;

// Re-export specific types to avoid conflicts
pub use club::{ClubStatus, Column as ClubColumn, Entity as Club, Model as ClubModel};
pub use event::{Column as EventColumn, Entity as Event, EventStatus, Model as EventModel};
pub use event_participation::{
    Column as ParticipationColumn, Entity as EventParticipation, Model as ParticipationModel,
    PaymentStatus,
};
pub use finance_record::{
    Column as FinanceRecordColumn, Entity as FinanceRecord, Model as FinanceRecordModel,
};
pub use membership::{
    Column as MembershipColumn, Entity as Membership, MembershipStatus, Model as MembershipModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
