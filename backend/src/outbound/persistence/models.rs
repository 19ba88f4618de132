//! Internal Diesel row structs for the queue tables.
//!
//! These types never leave the persistence layer. Conversions into domain
//! types validate stored values and report corrupt rows as strings that the
//! repositories wrap into their query errors.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    EmailAddress, PasswordDigest, Teller, TellerId, Ticket, TicketId, TicketNumber, TicketType,
    User, UserAccount, UserId, Username,
};

use super::schema::{daily_counters, tellers, tickets, users};

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

/// Row struct for reading from the tickets table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tickets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TicketRow {
    pub id: Uuid,
    pub ticket_number: String,
    pub ticket_type: String,
    pub created_at: DateTime<Utc>,
    pub is_served: bool,
    pub served_at: Option<DateTime<Utc>>,
    pub teller_id: Option<Uuid>,
    pub is_canceled: bool,
    pub completed: bool,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = String;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let ticket_type = TicketType::from_str(&row.ticket_type)
            .map_err(|err| format!("ticket {}: {err}", row.id))?;
        let ticket_number = TicketNumber::new(row.ticket_number)
            .map_err(|err| format!("ticket {}: {err}", row.id))?;
        Ok(Self {
            id: TicketId::from_uuid(row.id),
            ticket_number,
            ticket_type,
            created_at: row.created_at,
            is_served: row.is_served,
            served_at: row.served_at,
            teller_id: row.teller_id.map(TellerId::from_uuid),
            is_canceled: row.is_canceled,
            completed: row.completed,
        })
    }
}

/// Insertable struct for newly issued tickets.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tickets)]
pub(crate) struct NewTicketRow<'a> {
    pub id: Uuid,
    pub ticket_number: &'a str,
    pub ticket_type: &'a str,
    pub created_at: DateTime<Utc>,
    pub is_served: bool,
    pub served_at: Option<DateTime<Utc>>,
    pub teller_id: Option<Uuid>,
    pub is_canceled: bool,
    pub completed: bool,
}

impl<'a> From<&'a Ticket> for NewTicketRow<'a> {
    fn from(ticket: &'a Ticket) -> Self {
        Self {
            id: *ticket.id.as_uuid(),
            ticket_number: ticket.ticket_number.as_str(),
            ticket_type: ticket.ticket_type.code(),
            created_at: ticket.created_at,
            is_served: ticket.is_served,
            served_at: ticket.served_at,
            teller_id: ticket.teller_id.map(|id| *id.as_uuid()),
            is_canceled: ticket.is_canceled,
            completed: ticket.completed,
        }
    }
}

/// Changeset carrying every mutable lifecycle column of a ticket.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tickets)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct TicketStateUpdate {
    pub is_served: bool,
    pub served_at: Option<DateTime<Utc>>,
    pub teller_id: Option<Uuid>,
    pub is_canceled: bool,
    pub completed: bool,
}

impl From<&Ticket> for TicketStateUpdate {
    fn from(ticket: &Ticket) -> Self {
        Self {
            is_served: ticket.is_served,
            served_at: ticket.served_at,
            teller_id: ticket.teller_id.map(|id| *id.as_uuid()),
            is_canceled: ticket.is_canceled,
            completed: ticket.completed,
        }
    }
}

// ---------------------------------------------------------------------------
// Tellers
// ---------------------------------------------------------------------------

/// Row struct for reading from the tellers table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tellers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TellerRow {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub last_assigned_at: Option<DateTime<Utc>>,
}

impl From<TellerRow> for Teller {
    fn from(row: TellerRow) -> Self {
        Self {
            id: TellerId::from_uuid(row.id),
            name: row.name,
            is_active: row.is_active,
            last_assigned_at: row.last_assigned_at,
        }
    }
}

/// Insertable struct used when seeding tellers.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tellers)]
pub(crate) struct NewTellerRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub is_active: bool,
}

/// Changeset for a teller's busy flag and assignment timestamp.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tellers)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct TellerStateUpdate {
    pub is_active: bool,
    pub last_assigned_at: Option<DateTime<Utc>>,
}

impl From<&Teller> for TellerStateUpdate {
    fn from(teller: &Teller) -> Self {
        Self {
            is_active: teller.is_active,
            last_assigned_at: teller.last_assigned_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Daily counters
// ---------------------------------------------------------------------------

/// Insertable struct for the first ticket of a day.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = daily_counters)]
pub(crate) struct NewDailyCounterRow {
    pub counter_date: NaiveDate,
    pub last_number: i32,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username =
            Username::new(&row.username).map_err(|err| format!("user {}: {err}", row.id))?;
        let email = EmailAddress::new(&row.email).map_err(|err| format!("user {}: {err}", row.id))?;
        Ok(Self {
            user: User {
                id: UserId::from_uuid(row.id),
                username,
                email,
            },
            password_digest: PasswordDigest::new(row.password_hash),
            created_at: row.created_at,
        })
    }
}

/// Insertable struct for new accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a UserAccount> for NewUserRow<'a> {
    fn from(account: &'a UserAccount) -> Self {
        Self {
            id: *account.user.id.as_uuid(),
            username: account.user.username.as_str(),
            email: account.user.email.as_str(),
            password_hash: account.password_digest.as_str(),
            created_at: account.created_at,
        }
    }
}
