//! Response projections for tickets and tellers.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::TicketDetails;
use crate::domain::{Teller, Ticket};

const ISSUE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Ticket as seen by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketDto {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "20250411-W-001")]
    pub ticket_number: String,
    #[schema(example = "Withdrawal")]
    pub ticket_type: String,
    #[schema(example = "W")]
    pub ticket_type_code: String,
    #[schema(example = "pending")]
    pub status: String,
    pub canceled: bool,
    pub completed: bool,
    #[schema(example = "2025-04-11 09:30:00")]
    pub issue_date: String,
    pub served_at: Option<String>,
    pub teller_id: Option<String>,
    /// Display name of the assigned teller, when known.
    pub teller: Option<String>,
}

impl TicketDto {
    /// Project `ticket`, naming its teller when the caller knows it.
    #[must_use]
    pub fn new(ticket: &Ticket, teller_name: Option<&str>) -> Self {
        Self {
            id: ticket.id.to_string(),
            ticket_number: ticket.ticket_number.to_string(),
            ticket_type: ticket.ticket_type.label().to_owned(),
            ticket_type_code: ticket.ticket_type.code().to_owned(),
            status: ticket.status().as_str().to_owned(),
            canceled: ticket.is_canceled,
            completed: ticket.completed,
            issue_date: ticket.created_at.format(ISSUE_DATE_FORMAT).to_string(),
            served_at: ticket.served_at.map(|at| at.to_rfc3339()),
            teller_id: ticket.teller_id.map(|id| id.to_string()),
            teller: teller_name.map(str::to_owned),
        }
    }
}

impl From<&TicketDetails> for TicketDto {
    fn from(details: &TicketDetails) -> Self {
        Self::new(&details.ticket, details.teller_name.as_deref())
    }
}

/// Teller as seen by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TellerDto {
    pub id: String,
    #[schema(example = "Teller A")]
    pub name: String,
    /// `true` while the teller is serving a customer.
    pub is_active: bool,
}

impl From<&Teller> for TellerDto {
    fn from(teller: &Teller) -> Self {
        Self {
            id: teller.id.to_string(),
            name: teller.name.clone(),
            is_active: teller.is_active,
        }
    }
}
