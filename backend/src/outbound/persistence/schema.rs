//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations/` exactly. Regenerate
//! with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Staff accounts.
    users (id) {
        id -> Uuid,
        /// Lower-cased login email, unique.
        email -> Varchar,
        /// PHC-encoded password hash.
        password_hash -> Text,
        name -> Varchar,
        /// `TECHNICIAN`, `ADMIN` or `COORDINATOR`.
        role -> Varchar,
        /// Department code, required for coordinators.
        department -> Nullable<Varchar>,
        image -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Helpdesk tickets.
    tickets (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Text,
        department -> Varchar,
        location -> Varchar,
        device_id -> Varchar,
        /// `LOW`, `MEDIUM` or `HIGH`.
        priority -> Varchar,
        /// `OPEN`, `IN_PROGRESS` or `CLOSED`.
        status -> Varchar,
        coordinator_id -> Uuid,
        technician_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        assigned_at -> Nullable<Timestamptz>,
        resolved_at -> Nullable<Timestamptz>,
        remarks -> Nullable<Text>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(tickets, users);
