//! Last-request-wins bookkeeping
//!
//! Every issued request gets a [`Ticket`]. Issuing a new ticket supersedes all
//! earlier ones, so a completion only applies if its ticket is still current.
//! In-flight requests are never cancelled; their results are dropped on arrival.

/// Identity of one issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Generation counter for one kind of request
#[derive(Debug, Default)]
pub struct RequestCounter {
    current: u64,
}

impl RequestCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket that supersedes every earlier one
    pub fn issue(&mut self) -> Ticket {
        self.current += 1;
        Ticket(self.current)
    }

    /// Supersede outstanding tickets without issuing a new request
    pub fn invalidate(&mut self) {
        self.current += 1;
    }

    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.current
    }
}
