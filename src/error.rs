//! Errors raised by graph queries.
//!
//! None of these reach the user: the view layer degrades every failure to an
//! empty snapshot or list.

/// A failed graph query.
#[derive(Debug)]
pub enum QueryError {
	/// The request never produced a response.
	Transport(reqwest::Error),
	/// The collaborator answered with a non-success status.
	Status {
		/// HTTP status code.
		status: u16,
		/// Requested URL.
		url: String,
	},
	/// The configured API base could not be joined with a request path.
	InvalidUrl(String),
	/// The requested page does not exist.
	NotFound(String),
}

impl std::fmt::Display for QueryError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Transport(err) => write!(f, "graph request failed: {err}"),
			Self::Status { status, url } => write!(f, "graph request to {url} returned status {status}"),
			Self::InvalidUrl(url) => write!(f, "invalid graph api url: {url}"),
			Self::NotFound(page_id) => write!(f, "page {page_id} not found"),
		}
	}
}

impl std::error::Error for QueryError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Transport(err) => Some(err),
			_ => None,
		}
	}
}

impl From<reqwest::Error> for QueryError {
	fn from(err: reqwest::Error) -> Self {
		Self::Transport(err)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn messages_name_the_failure() {
		assert_eq!(QueryError::NotFound("p1".into()).to_string(), "page p1 not found");
		let status = QueryError::Status {
			status: 503,
			url: "http://localhost/api/graph".into(),
		};
		assert_eq!(
			status.to_string(),
			"graph request to http://localhost/api/graph returned status 503"
		);
	}
}
