use serde::Serialize;

/// Best-effort notification email dispatch through an HTTP mail gateway.
///
/// Sending happens on a detached task: a decision that was committed to the
/// database stands whether or not the applicant could be told about it, so
/// delivery failures are logged and swallowed.
pub struct Mailer {
    client: reqwest::Client,
    gateway_url: String,
    sender: String,
}

/// The gateway's message format.
#[derive(Serialize)]
struct OutgoingMail {
    from: String,
    to: String,
    subject: String,
    body: String,
}

impl Mailer {
    pub fn new(gateway_url: String, sender: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            gateway_url,
            sender,
        }
    }

    /// Fire off a notification; returns immediately.
    pub fn send(&self, to: &str, subject: String, body: String) {
        let mail = OutgoingMail {
            from: self.sender.clone(),
            to: to.to_string(),
            subject,
            body,
        };
        let client = self.client.clone();
        let gateway_url = self.gateway_url.clone();
        rocket::tokio::spawn(async move {
            match client.post(&gateway_url).json(&mail).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("notification dispatched to {}", mail.to);
                }
                Ok(response) => {
                    warn!(
                        "mail gateway returned {} for notification to {}",
                        response.status(),
                        mail.to
                    );
                }
                Err(e) => {
                    warn!("failed to dispatch notification to {}: {e}", mail.to);
                }
            }
        });
    }
}
