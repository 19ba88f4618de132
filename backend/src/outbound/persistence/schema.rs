//! Diesel table definitions for the queue schema.
//!
//! These definitions mirror `backend/migrations` and must be kept in step with
//! them. `diesel print-schema` against a migrated database regenerates them.

diesel::table! {
    /// Issued queue tickets.
    tickets (id) {
        id -> Uuid,
        /// Unique `YYYYMMDD-C-NNN` number shown to customers.
        ticket_number -> Varchar,
        /// Single-letter ticket type code.
        ticket_type -> Varchar,
        created_at -> Timestamptz,
        is_served -> Bool,
        served_at -> Nullable<Timestamptz>,
        teller_id -> Nullable<Uuid>,
        is_canceled -> Bool,
        completed -> Bool,
    }
}

diesel::table! {
    /// Branch tellers. `is_active` marks a teller currently serving.
    tellers (id) {
        id -> Uuid,
        name -> Varchar,
        is_active -> Bool,
        last_assigned_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Last issued sequence number per UTC day.
    daily_counters (counter_date) {
        counter_date -> Date,
        last_number -> Int4,
    }
}

diesel::table! {
    /// Staff accounts allowed to call the protected API.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(tickets -> tellers (teller_id));

diesel::allow_tables_to_appear_in_same_query!(tickets, tellers, daily_counters, users);
