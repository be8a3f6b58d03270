use crate::api::twilio::MessageSender;
use crate::db::Storage;
use crate::error::MerkbotError;
use crate::nlp::TimeExtractor;
use crate::service::intent::{self, Intent};
use crate::service::{list, reminder};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info};

const APOLOGY: &str =
    "😔 Entschuldige, da ist gerade etwas schiefgelaufen. Versuch es bitte gleich noch einmal.";

// Voice transcription is out of scope; media-only messages get this stub.
const VOICE_STUB: &str =
    "🎤 Sprachnachrichten verstehe ich noch nicht. Schreib mir bitte eine Textnachricht.";

const HELP_TEXT: &str = "🤖 Ich bin dein Erinnerungs-Bot! Das kann ich:\n\n⏰ \"Erinnere mich in 10 Minuten an die Pause\"\n📝 \"Erstelle eine Liste Einkauf\"\n➕ \"Füge Milch zur Einkaufsliste hinzu\"\n👀 \"Zeig mir die Einkaufsliste\"";

const MENU_TEXT: &str = "🤖 Das habe ich nicht verstanden. Probier mal:\n\n⏰ \"Erinnere mich in 10 Minuten an die Pause\"\n📝 \"Füge Milch zur Einkaufsliste hinzu\"\n❓ \"Hilfe\" für alle Befehle";

/// One acknowledged inbound message, queued for processing after the HTTP
/// response has gone out.
#[derive(Debug)]
pub struct InboundJob {
    pub from: String,
    pub body: String,
    pub num_media: u32,
}

/// Post-acknowledgment stage: classify, act, reply. Failures here can never
/// reach the webhook caller anymore; they end in logs plus a best-effort
/// apology to the user.
pub struct MessageProcessor {
    storage: Storage,
    sender: Arc<dyn MessageSender>,
    extractor: Arc<dyn TimeExtractor>,
}

impl MessageProcessor {
    pub fn new(
        storage: Storage,
        sender: Arc<dyn MessageSender>,
        extractor: Arc<dyn TimeExtractor>,
    ) -> Self {
        Self {
            storage,
            sender,
            extractor,
        }
    }

    pub async fn process(&self, job: InboundJob) {
        let to = job.from.clone();
        if let Err(e) = self.handle(job).await {
            error!(error = %e, to = %to, "inbound processing failed");
            if let Err(send_err) = self.sender.send(&to, APOLOGY).await {
                error!(error = %send_err, to = %to, "failed to deliver apology");
            }
        }
    }

    async fn handle(&self, job: InboundJob) -> Result<(), MerkbotError> {
        let now = Utc::now();
        let user = self.storage.get_or_create_user(&job.from, None).await?;
        debug!(user_id = user.id, media = job.num_media, "processing inbound message");

        let reply = if job.num_media > 0 && job.body.trim().is_empty() {
            VOICE_STUB.to_string()
        } else {
            match intent::classify(&job.body) {
                Intent::Reminder => {
                    reminder::handle(&self.storage, self.extractor.as_ref(), &user, &job.body, now)
                        .await?
                }
                Intent::List => list::handle(&self.storage, &user, &job.body, now).await?,
                Intent::Help => HELP_TEXT.to_string(),
                Intent::Fallback => MENU_TEXT.to_string(),
            }
        };

        self.sender.send(&job.from, &reply).await?;
        info!(user_id = user.id, "reply sent");
        Ok(())
    }
}
