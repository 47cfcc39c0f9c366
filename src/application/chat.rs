#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;

use anyhow::Result;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::sync::mpsc;

use super::render;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Anchor;
use crate::domain::models::Event;
use crate::domain::models::PendingDispatch;
use crate::domain::models::Selection;
use crate::domain::models::SelectionEvent;
use crate::domain::models::SlashCommand;
use crate::domain::services::AppState;
use crate::domain::services::MessageDispatcher;
use crate::domain::services::SelectionEvents;
use crate::domain::services::Subscription;
use crate::infrastructure::backends::SharedBackend;
use crate::infrastructure::storage::file::FileStore;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /select (/s) [TEXT] - Selects a passage of the book to ask about. Passages of 10 characters or less are ignored.
- /ask (/a) [QUESTION?] - Asks about the selected passage. Defaults to "explain this".
- /dismiss (/d) - Drops the selected passage without asking about it.
- /session - Prints the current session ID.
- /reset (/r) - Starts a new conversation. Replies still in flight are discarded.
- /quit /exit (/q) - Exit bookchat.
- /help (/h) - Provides this help menu.

Anything else is sent to the tutor as a question. A selected passage is attached to your questions until one of them is answered.
        "#;

    return text.trim().to_string();
}

fn spawn_input_reader(tx: mpsc::UnboundedSender<Event>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(Event::InputLine(line)).is_err() {
                        return;
                    }
                }
                Ok(None) => {
                    let _ = tx.send(Event::InputClosed());
                    return;
                }
                Err(err) => {
                    tracing::error!(error = ?err, "Failed to read from stdin");
                    let _ = tx.send(Event::InputClosed());
                    return;
                }
            }
        }
    });
}

/// Interactive chat surface. Owns all chat state on a single task; backend
/// calls run on spawned tasks and report back as events.
pub struct Chat {
    app_state: AppState,
    backend: SharedBackend,
    selections: SelectionEvents,
    subscription: Subscription,
    events: mpsc::UnboundedReceiver<Event>,
    tx: mpsc::UnboundedSender<Event>,
    input_closed: bool,
}

impl Chat {
    pub fn new(app_state: AppState, backend: SharedBackend) -> Chat {
        let (tx, events) = mpsc::unbounded_channel::<Event>();
        let selections = SelectionEvents::default();
        let subscription = selections.subscribe();
        tracing::debug!(
            subscribers = selections.subscriber_count(),
            "Subscribed to selection events"
        );

        return Chat {
            app_state,
            backend,
            selections,
            subscription,
            events,
            tx,
            input_closed: false,
        };
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        return self.tx.clone();
    }

    pub async fn next_event(&mut self) -> Option<Event> {
        let event = tokio::select! {
            event = self.events.recv() => event,
            event = self.subscription.recv() => event.map(Event::Selection),
        };

        return event;
    }

    /// Applies one event. Returns false once the chat should stop.
    pub async fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::InputLine(line) => {
                return self.handle_line(&line).await;
            }
            Event::InputClosed() => {
                self.input_closed = true;
                return self.app_state.is_loading();
            }
            Event::Selection(selection_event) => {
                self.handle_selection(&selection_event);
                return true;
            }
            Event::DispatchCompleted(outcome) => {
                if self.app_state.complete(outcome).await {
                    if let Some(message) = self.app_state.sessions.messages().last() {
                        render::print_message(message);
                    }
                }

                return !self.input_closed || self.app_state.is_loading();
            }
        }
    }

    fn handle_selection(&mut self, event: &SelectionEvent) {
        if self.app_state.observe_selection(event) {
            if let Some(selection) = self.app_state.selection.current() {
                render::print_info(&render::format_selection_hint(selection));
            }
            return;
        }

        if let SelectionEvent::Changed(_) = event {
            render::print_info("Selection is too short to ask about.");
        }
    }

    async fn handle_line(&mut self, line: &str) -> bool {
        if line.trim().is_empty() {
            return true;
        }

        if let Some(command) = SlashCommand::parse(line) {
            return self.handle_command(&command).await;
        }

        if self.app_state.is_loading() {
            render::print_info("Still waiting on the tutor, hang on.");
            return true;
        }

        if let Some(pending) = self.app_state.begin_send(line).await {
            self.dispatch(pending);
        }

        return true;
    }

    async fn handle_command(&mut self, command: &SlashCommand) -> bool {
        if command.is_quit() {
            return false;
        }

        if command.is_help() {
            println!("{}", help_text());
        } else if command.is_select() {
            let text = command.rest();
            if text.is_empty() {
                self.selections.publish(SelectionEvent::Cleared);
            } else {
                self.selections.publish(SelectionEvent::Changed(Selection {
                    text,
                    anchor: Anchor::default(),
                }));
            }
        } else if command.is_dismiss() {
            self.app_state.selection.dismiss();
            render::print_info("Selection dismissed.");
        } else if command.is_ask() {
            if self.app_state.is_loading() {
                render::print_info("Still waiting on the tutor, hang on.");
            } else if let Some(pending) = self
                .app_state
                .begin_ask_about_selection(&command.rest())
                .await
            {
                self.dispatch(pending);
            } else {
                render::print_info("Nothing is selected. Use /select TEXT first.");
            }
        } else if command.is_reset() {
            self.app_state.reset_session().await;
            render::print_info("Started a new conversation.");
        } else if command.is_session() {
            match self.app_state.sessions.session_id() {
                Some(session_id) => println!("{session_id}"),
                None => render::print_info("No session yet. One starts with your first question."),
            }
        }

        return true;
    }

    fn dispatch(&self, pending: PendingDispatch) {
        render::print_thinking();

        let backend = self.backend.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = MessageDispatcher::execute(backend.as_ref(), pending).await;
            if tx.send(Event::DispatchCompleted(outcome)).is_err() {
                tracing::warn!("Chat closed before a dispatch completed");
            }
        });
    }

    pub async fn run(&mut self) -> Result<()> {
        while let Some(event) = self.next_event().await {
            if !self.handle_event(event).await {
                break;
            }
        }

        return Ok(());
    }
}

pub async fn start(backend: SharedBackend) -> Result<()> {
    let selection_min_length = Config::get_usize(ConfigKey::SelectionMinLength)?;
    let mut app_state = AppState::new(Box::<FileStore>::default(), selection_min_length);

    if let Err(err) = backend.health_check().await {
        tracing::warn!(error = ?err, "Backend health check failed");
        render::print_warning(&format!(
            "The tutor backend at {} did not respond. Questions will fail until it is running.",
            Config::get(ConfigKey::ApiURL)
        ));
    }

    if app_state.restore(backend.as_ref()).await? {
        for message in app_state.sessions.messages() {
            render::print_message(message);
        }
    }

    render::print_info(&format!(
        "Hi {}! Ask anything about the book. Type /help for commands.",
        Config::get(ConfigKey::Username)
    ));

    tracing::info!(backend = %backend.name(), "Starting chat");
    let mut chat = Chat::new(app_state, backend);
    spawn_input_reader(chat.sender());

    return chat.run().await;
}
