//! Telegram update dispatch
//!
//! Long-polls the Bot API and routes each update to the right handler.
//! Every handler runs to completion with its errors contained; one bad
//! update never takes the loop down.

use herald_core::clients::telegram::{CallbackQuery, Message, Update};
use herald_core::{
    ApprovalWorkflow, Decision, DecisionOutcome, PostDrafter, QueryResponder, TelegramClient,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const WELCOME: &str = "Welcome to Superteam Vietnam Bot!";
const ADMIN_ONLY: &str = "⚠️ This command is only available in the admin chat.";
const DRAFT_SUBMITTED: &str = "📝 Draft sent for approval.";
const DRAFT_GENERATION_FAILED: &str = "⚠️ Draft generation failed; please try again.";
const SUBMISSION_FAILED: &str = "⚠️ Could not submit the draft for approval.";

/// Delay before re-polling after a transport error
const RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct Bot {
    telegram: Arc<TelegramClient>,
    workflow: Arc<ApprovalWorkflow>,
    responder: Arc<QueryResponder>,
    drafter: Arc<PostDrafter>,
}

impl Bot {
    pub fn new(
        telegram: Arc<TelegramClient>,
        workflow: Arc<ApprovalWorkflow>,
        responder: Arc<QueryResponder>,
        drafter: Arc<PostDrafter>,
    ) -> Self {
        Self {
            telegram,
            workflow,
            responder,
            drafter,
        }
    }

    /// Run the long-poll loop until shutdown is signalled.
    ///
    /// Only an idle poll is ever cancelled; updates already received
    /// are always handled to completion so in-flight decisions resolve
    /// during a drain.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut offset: Option<i64> = None;
        log::info!("Telegram update loop started");

        loop {
            let polled = tokio::select! {
                _ = shutdown.changed() => break,
                polled = self.telegram.get_updates(offset) => polled,
            };

            match polled {
                Ok(updates) => self.dispatch_all(updates, &mut offset).await,
                Err(e) => {
                    log::error!("Failed to fetch updates: {}", e);
                    tokio::time::sleep(RETRY_DELAY).await;
                }
            }
        }

        log::info!("Telegram update loop stopped");
    }

    /// Fetch and handle one batch of updates; returns the next offset
    pub async fn process_batch(&self, mut offset: Option<i64>) -> Option<i64> {
        match self.telegram.get_updates(offset).await {
            Ok(updates) => self.dispatch_all(updates, &mut offset).await,
            Err(e) => log::error!("Failed to fetch updates: {}", e),
        }
        offset
    }

    async fn dispatch_all(&self, updates: Vec<Update>, offset: &mut Option<i64>) {
        for update in updates {
            *offset = Some(update.update_id + 1);

            if let Some(callback) = update.callback_query {
                self.handle_callback(callback).await;
            } else if let Some(message) = update.message {
                self.handle_message(message).await;
            }
        }
    }

    fn is_admin_chat(&self, chat_id: &str) -> bool {
        chat_id == self.telegram.admin_chat_id()
    }

    async fn handle_message(&self, message: Message) {
        let Some(text) = message.text.as_deref() else {
            return;
        };
        let chat_id = message.chat.id.to_string();

        let reply = if text == "/start" {
            WELCOME.to_string()
        } else if let Some(topic) = text.strip_prefix("/draft ") {
            self.draft_command(&chat_id, topic, false).await
        } else if let Some(draft) = text.strip_prefix("/improve ") {
            self.draft_command(&chat_id, draft, true).await
        } else if text == "/status" {
            self.status_command(&chat_id)
        } else {
            self.responder.answer(text).await
        };

        if let Err(e) = self.telegram.send_message(&chat_id, &reply).await {
            log::error!("Failed to reply in chat {}: {}", chat_id, e);
        }
    }

    /// Draft (or enhance) a post and submit it for approval
    async fn draft_command(&self, chat_id: &str, input: &str, enhance: bool) -> String {
        if !self.is_admin_chat(chat_id) {
            return ADMIN_ONLY.to_string();
        }

        let drafted = if enhance {
            self.drafter.enhance(input).await
        } else {
            self.drafter.draft(input).await
        };

        let content = match drafted {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Draft generation failed: {}", e);
                return DRAFT_GENERATION_FAILED.to_string();
            }
        };

        match self.workflow.submit_for_approval(&content).await {
            Ok(id) => {
                log::info!("Draft submitted as approval {}", id);
                DRAFT_SUBMITTED.to_string()
            }
            Err(e) => {
                log::error!("Approval submission failed: {}", e);
                SUBMISSION_FAILED.to_string()
            }
        }
    }

    fn status_command(&self, chat_id: &str) -> String {
        if !self.is_admin_chat(chat_id) {
            return ADMIN_ONLY.to_string();
        }

        let counts = self.workflow.store().counts();
        format!(
            "Approvals: {} pending, {} approved, {} rejected, {} expired",
            counts.pending, counts.approved, counts.rejected, counts.expired
        )
    }

    /// Handle a button press: parse the decision once, resolve it, and
    /// acknowledge with exactly one outcome message.
    async fn handle_callback(&self, callback: CallbackQuery) {
        if let Err(e) = self.telegram.answer_callback_query(&callback.id).await {
            log::warn!("Failed to answer callback query {}: {}", callback.id, e);
        }

        let chat_id = callback.message.as_ref().map(|m| m.chat.id.to_string());
        let Some(data) = callback.data.as_deref() else {
            return;
        };

        let reply = match Decision::parse(data) {
            Some(decision) => {
                // Decisions are only honored from the chat the approval
                // request was sent to.
                match chat_id.as_deref() {
                    Some(chat) if self.is_admin_chat(chat) => {
                        self.workflow.handle_decision(&decision).await.acknowledgment()
                    }
                    _ => {
                        log::warn!(
                            "Ignoring decision for {} from unexpected chat",
                            decision.approval_id()
                        );
                        return;
                    }
                }
            }
            None => {
                log::warn!("Unparseable callback data: {}", data);
                DecisionOutcome::AlreadyProcessed.acknowledgment()
            }
        };

        if let Some(chat_id) = chat_id {
            if let Err(e) = self.telegram.send_message(&chat_id, reply).await {
                log::error!("Failed to send acknowledgment in chat {}: {}", chat_id, e);
            }
        }
    }
}
