//! Turns chat text into intents and intents into replies.
//!
//! Slash commands (Portuguese, as the bot has always used):
//!
//! | Command                             | Intent            |
//! |-------------------------------------|-------------------|
//! | `/start`, `/ajuda`, `/help`         | `Help`            |
//! | `/nota <texto>`                     | `AddNote`         |
//! | `/notas`                            | `ListNotes`       |
//! | `/tarefa <texto>`                   | `AddTask`         |
//! | `/tarefas`                          | `ListTasks`       |
//! | `/lembrete DD/MM/AAAA HH:MM <texto>`| `AddReminder`     |
//! | `/lembretes`                        | `ListReminders`   |
//!
//! Free text: `nota: …` and `tarefa: …` prefixes, and any message mentioning
//! "lembr…" (lembrete, lembrar, me lembre) that contains a date token followed
//! by a time token. Mentions of "lembr…" without a date and time are plain
//! chatter and ignored. The extracted date/time is only shape-checked here; the
//! reminder store validates it for real.

use lembra_scheduler::{EntryKind, SchedulerError, ValidationError};
use tracing::error;

use crate::context::TelegramAppContext;

pub const HELP: &str = "Olá 👋 Eu sou seu assistente pessoal.\n\n\
Comandos disponíveis:\n\
/lembrete <DD/MM/AAAA HH:MM> <texto>\n\
/lembretes\n\
/nota <texto>\n\
/notas\n\
/tarefa <texto>\n\
/tarefas";

const NOTE_USAGE: &str = "Use: /nota <texto>";
const TASK_USAGE: &str = "Use: /tarefa <texto>";
const REMINDER_USAGE: &str = "Use: /lembrete DD/MM/AAAA HH:MM <texto>";
const BAD_DATE: &str = "Formato de data inválido.";
const NO_SUCH_DATE: &str = "Essa data não existe no calendário.";
const STORE_FAILED: &str = "⚠️ Não consegui salvar agora. Tente novamente em instantes.";

/// A structured request extracted from one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Help,
    /// Recognised command with missing arguments; carries the usage line.
    Usage(&'static str),
    AddNote(String),
    ListNotes,
    AddTask(String),
    ListTasks,
    AddReminder { due_raw: String, text: String },
    ListReminders,
}

/// `None` for unknown commands and ordinary chatter.
pub fn parse_intent(text: &str) -> Option<Intent> {
    let text = text.trim();
    match text.strip_prefix('/') {
        Some(command) => parse_command(command),
        None => parse_free_text(text),
    }
}

fn parse_command(command: &str) -> Option<Intent> {
    let mut words = command.split_whitespace();
    let head = words.next()?;
    // "/lembretes@meu_bot" in group chats
    let name = head.split('@').next().unwrap_or(head).to_lowercase();
    let args: Vec<&str> = words.collect();
    let joined = args.join(" ");

    let intent = match name.as_str() {
        "start" | "ajuda" | "help" => Intent::Help,
        "nota" if joined.is_empty() => Intent::Usage(NOTE_USAGE),
        "nota" => Intent::AddNote(joined),
        "notas" => Intent::ListNotes,
        "tarefa" if joined.is_empty() => Intent::Usage(TASK_USAGE),
        "tarefa" => Intent::AddTask(joined),
        "tarefas" => Intent::ListTasks,
        "lembrete" if args.len() < 3 => Intent::Usage(REMINDER_USAGE),
        "lembrete" => Intent::AddReminder {
            due_raw: format!("{} {}", args[0], args[1]),
            text: args[2..].join(" "),
        },
        "lembretes" => Intent::ListReminders,
        _ => return None,
    };
    Some(intent)
}

fn parse_free_text(text: &str) -> Option<Intent> {
    if let Some(rest) = strip_prefix_ignore_case(text, "nota:") {
        return Some(match rest.trim() {
            "" => Intent::Usage(NOTE_USAGE),
            t => Intent::AddNote(t.to_string()),
        });
    }
    if let Some(rest) = strip_prefix_ignore_case(text, "tarefa:") {
        return Some(match rest.trim() {
            "" => Intent::Usage(TASK_USAGE),
            t => Intent::AddTask(t.to_string()),
        });
    }

    if !text.to_lowercase().contains("lembr") {
        return None;
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    let Some(pos) = words
        .windows(2)
        .position(|w| looks_like_date(w[0]) && looks_like_time(w[1]))
    else {
        return None;
    };
    let body = words[pos + 2..].join(" ");
    if body.is_empty() {
        return Some(Intent::Usage(REMINDER_USAGE));
    }
    Some(Intent::AddReminder {
        due_raw: format!("{} {}", words[pos], words[pos + 1]),
        text: body,
    })
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

fn looks_like_date(word: &str) -> bool {
    word.contains('/') && word.chars().all(|c| c.is_ascii_digit() || c == '/')
}

fn looks_like_time(word: &str) -> bool {
    word.contains(':') && word.chars().all(|c| c.is_ascii_digit() || c == ':')
}

/// Carry out `intent` for `owner_id` and build the reply text.
///
/// Validation problems are answered directly; storage failures are logged
/// and answered with a generic apology.
pub fn execute<C: TelegramAppContext + ?Sized>(intent: Intent, owner_id: i64, ctx: &C) -> String {
    match intent {
        Intent::Help => HELP.to_string(),
        Intent::Usage(usage) => usage.to_string(),

        Intent::AddNote(text) => match ctx.entries().add(EntryKind::Note, owner_id, &text) {
            Ok(_) => "📝 Nota salva!".to_string(),
            Err(e) => failure_reply(e, NOTE_USAGE),
        },
        Intent::AddTask(text) => match ctx.entries().add(EntryKind::Task, owner_id, &text) {
            Ok(_) => "✅ Tarefa adicionada!".to_string(),
            Err(e) => failure_reply(e, TASK_USAGE),
        },
        Intent::ListNotes => match ctx.entries().list(EntryKind::Note, owner_id) {
            Ok(notes) if notes.is_empty() => "Nenhuma nota cadastrada.".to_string(),
            Ok(notes) => numbered("📝 Suas notas:", notes.iter().map(|n| n.text.as_str())),
            Err(e) => failure_reply(e, NOTE_USAGE),
        },
        Intent::ListTasks => match ctx.entries().list(EntryKind::Task, owner_id) {
            Ok(tasks) if tasks.is_empty() => "Nenhuma tarefa cadastrada.".to_string(),
            Ok(tasks) => numbered("📋 Suas tarefas:", tasks.iter().map(|t| t.text.as_str())),
            Err(e) => failure_reply(e, TASK_USAGE),
        },

        Intent::AddReminder { due_raw, text } => {
            match ctx.reminders().schedule(owner_id, &text, &due_raw) {
                Ok(_) => "⏰ Lembrete criado com sucesso!".to_string(),
                Err(e) => failure_reply(e, REMINDER_USAGE),
            }
        }
        Intent::ListReminders => match ctx.reminders().list_by_owner(owner_id) {
            Ok(reminders) if reminders.is_empty() => "Nenhum lembrete cadastrado.".to_string(),
            Ok(reminders) => {
                let mut out = String::from("⏰ Seus lembretes:\n");
                for r in &reminders {
                    out.push_str(&format!("- {} → {}\n", r.due_at, r.text));
                }
                out
            }
            Err(e) => failure_reply(e, REMINDER_USAGE),
        },
    }
}

fn numbered<'a>(title: &str, items: impl Iterator<Item = &'a str>) -> String {
    let mut out = format!("{title}\n");
    for (i, item) in items.enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, item));
    }
    out
}

fn failure_reply(err: SchedulerError, usage: &str) -> String {
    match err {
        SchedulerError::Validation(ValidationError::EmptyText) => usage.to_string(),
        SchedulerError::Validation(ValidationError::ImpossibleDueAt { .. }) => {
            NO_SUCH_DATE.to_string()
        }
        SchedulerError::Validation(ValidationError::MalformedDueAt { .. }) => BAD_DATE.to_string(),
        other => {
            error!("store operation failed: {other}");
            STORE_FAILED.to_string()
        }
    }
}
