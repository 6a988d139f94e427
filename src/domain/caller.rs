/// Verified identity of the party behind a request.
///
/// Resolved once at the transport boundary and passed explicitly into every
/// service entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedCaller {
    /// External identity provider subject id
    pub subject: String,
    pub email: Option<String>,
}

impl AuthenticatedCaller {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
