use log::debug;

use super::types::GraphSnapshot;

/// Generation tag handed out when a query is issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestTicket(u64);

/// Tracks the latest issued query so late responses can be recognised.
///
/// Queries are never cancelled; a response is applied only if its ticket is
/// still the newest one.
#[derive(Debug, Default)]
pub struct GraphSession {
	generation: u64,
	current: Option<GraphSnapshot>,
}

impl GraphSession {
	/// Start a new query, superseding every ticket issued before.
	pub fn begin(&mut self) -> RequestTicket {
		self.generation += 1;
		RequestTicket(self.generation)
	}

	/// True when no query was issued after `ticket`.
	pub fn is_current(&self, ticket: RequestTicket) -> bool {
		ticket.0 == self.generation
	}

	/// Apply a response. Returns `false` and drops it when a newer query was
	/// issued after `ticket`.
	pub fn accept(&mut self, ticket: RequestTicket, snapshot: GraphSnapshot) -> bool {
		if !self.is_current(ticket) {
			debug!(
				"discarding stale graph response (generation {} < {})",
				ticket.0, self.generation
			);
			return false;
		}
		self.current = Some(snapshot);
		true
	}

	/// Latest accepted snapshot.
	pub fn snapshot(&self) -> Option<&GraphSnapshot> {
		self.current.as_ref()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn only_the_newest_ticket_is_current() {
		let mut session = GraphSession::default();
		let first = session.begin();
		assert!(session.is_current(first));
		let second = session.begin();
		assert!(!session.is_current(first));
		assert!(session.is_current(second));
	}

	#[test]
	fn in_order_responses_are_applied() {
		let mut session = GraphSession::default();
		let ticket = session.begin();
		assert!(session.accept(ticket, GraphSnapshot::empty()));
		assert_eq!(session.snapshot(), Some(&GraphSnapshot::empty()));
	}
}
