#[cfg(test)]
#[path = "repl_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use yansi::Paint;

use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::Role;
use crate::domain::models::Session;
use crate::domain::models::SlashCommand;
use crate::domain::models::Size;
use crate::domain::models::Visibility;
use crate::domain::services::SessionController;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /new (/n) - Start a new conversation. The panel stays as it is.
- /load (/l) [CONVERSATION_ID] - Replace the chat with a conversation stored by the agent.
- /queue - List messages waiting for the current exchange to finish.
- /unqueue [QUEUED_ID] - Drop a waiting message before it is sent.
- /toggle (/t) - Open or close the assistant panel.
- /fullscreen (/f) - Switch the panel between bubble and fullscreen.
- /size [WIDTH] [HEIGHT] - Resize the panel.
- /status (/s) - Show the state of the session.
- /quit /exit (/q) - Exit Deckhand.
- /help (/h) - Provides this help menu.

Anything else is sent to the agent. Messages typed while a reply is pending are queued and sent in order.
        "#;

    return text.trim().to_string();
}

pub fn format_message(message: &Message) -> String {
    let mut res = match message.role {
        Role::User => format!("{} {}", Paint::green("you:").bold(), message.content),
        Role::Assistant => format!("{} {}", Paint::cyan("agent:").bold(), message.content),
        Role::Tool => format!("{} {}", Paint::new("tool:").dimmed(), message.content),
    };

    let tool_names = message
        .tool_calls()
        .iter()
        .map(|tool_call| return tool_call.name.to_string())
        .collect::<Vec<String>>();
    if !tool_names.is_empty() {
        res = format!(
            "{res}\n{}",
            Paint::new(format!("  tools: {}", tool_names.join(", "))).dimmed()
        );
    }

    return res;
}

pub fn format_status(session: &Session, visibility: &Visibility) -> String {
    let mut lines = vec![
        format!(
            "Conversation: {}",
            session.conversation_id.as_deref().unwrap_or("(new)")
        ),
        format!("Messages: {}", session.messages.len()),
        format!("Queued: {}", session.queued_messages.len()),
        format!("Loading: {}", session.is_loading),
        format!(
            "Panel: {}, {}, {}x{}",
            if visibility.is_open { "open" } else { "closed" },
            if visibility.is_fullscreen {
                "fullscreen"
            } else {
                "bubble"
            },
            visibility.size.width,
            visibility.size.height
        ),
    ];

    if let Some(error) = &session.error {
        lines.push(format!("Error: {error}"));
    }

    return lines.join("\n");
}

fn visibility(controller: &SessionController) -> Visibility {
    return Visibility {
        is_open: controller.is_open(),
        is_fullscreen: controller.is_fullscreen(),
        size: controller.size(),
    };
}

fn print_event(controller: &SessionController, event: Event) {
    match event {
        Event::MessageAppended(message) => {
            if message.role == Role::User {
                return;
            }

            println!("{}", format_message(&message));
            if let Some(error) = controller.error() {
                println!("{}", Paint::red(format!("  error: {error}")));
            }

            // The intent is only meaningful once, so it is consumed here.
            if let Some(navigation) = controller.pending_navigation() {
                let target = match &navigation.agent_id {
                    Some(agent_id) => format!("{} ({agent_id})", navigation.view),
                    None => navigation.view.to_string(),
                };
                println!("{}", Paint::yellow(format!("  -> navigate to {target}")));
                controller.clear_pending_navigation();
            }
        }
        Event::MessageQueued(queued) => {
            println!(
                "{}",
                Paint::new(format!("  queued ({}): {}", queued.id, queued.content)).dimmed()
            );
        }
        Event::SessionReplaced() => {
            let session = controller.session();
            println!(
                "{}",
                Paint::magenta(format!(
                    "-- {} --",
                    session.conversation_id.as_deref().unwrap_or("new conversation")
                ))
            );
            for message in session.messages.as_slice() {
                println!("{}", format_message(message));
            }
            if let Some(error) = session.error {
                println!("{}", Paint::red(format!("  error: {error}")));
            }
        }
        Event::ConversationsInvalidated() => {
            tracing::debug!("Conversation list changed");
        }
    }
}

/// Handles one line of input. Returns true when the loop should stop.
async fn handle_line(controller: &Arc<SessionController>, line: &str) -> Result<bool> {
    if line.trim().is_empty() {
        return Ok(false);
    }

    let cmd = match SlashCommand::parse(line) {
        Some(cmd) => cmd,
        None => {
            if line.trim_start().starts_with('/') {
                println!("{}", Paint::red("Unknown command, see /help"));
                return Ok(false);
            }

            if let Some((plan, user_message)) = controller.admit_message(line) {
                let controller = Arc::clone(controller);
                tokio::spawn(async move {
                    controller.run_exchange(plan, user_message).await;
                });
            }
            return Ok(false);
        }
    };

    if cmd.is_quit() {
        return Ok(true);
    }

    if cmd.is_help() {
        println!("{}", help_text());
    } else if cmd.is_new_chat() {
        controller.start_new_chat().await;
    } else if cmd.is_load() {
        let controller = Arc::clone(controller);
        let conversation_id = cmd.args[0].to_string();
        tokio::spawn(async move {
            controller.load_conversation_from_db(&conversation_id).await;
            if let Some(error) = controller.error() {
                println!("{}", Paint::red(format!("  error: {error}")));
            }
        });
    } else if cmd.is_queue_list() {
        let queued = controller.queued_messages();
        if queued.is_empty() {
            println!("Nothing is queued.");
        }
        for message in queued {
            println!("- ({}) {}", message.id, message.content);
        }
    } else if cmd.is_unqueue() {
        if controller.remove_queued_message(&cmd.args[0]) {
            println!("Removed {}", cmd.args[0]);
        } else {
            println!("No queued message with id {}", cmd.args[0]);
        }
    } else if cmd.is_toggle_open() {
        controller.toggle_open().await;
        println!("{}", format_status(&controller.session(), &visibility(controller)));
    } else if cmd.is_toggle_fullscreen() {
        controller.toggle_fullscreen();
        println!("{}", format_status(&controller.session(), &visibility(controller)));
    } else if let Some((width, height)) = cmd.size() {
        controller.set_size(Size { width, height }).await;
        println!("{}", format_status(&controller.session(), &visibility(controller)));
    } else if cmd.is_status() {
        println!("{}", format_status(&controller.session(), &visibility(controller)));
    }

    return Ok(false);
}

/// Reads stdin until EOF or /quit, printing session events as they arrive.
pub async fn start(
    controller: Arc<SessionController>,
    mut event_rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    println!(
        "{}",
        Paint::new("Deckhand is ready. Type /help for commands.").bold()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => break,
                };
                if handle_line(&controller, &line).await? {
                    break;
                }
            }
            Some(event) = event_rx.recv() => {
                print_event(&controller, event);
            }
        }
    }

    return Ok(());
}
