use chrono::Utc;
use uuid::Uuid;

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A finished entry in the conversation. Never modified once pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub is_error: bool,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: message_id(),
            role,
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::new(Role::Assistant, text)
        }
    }
}

/// `msg-<unix millis>-<9 random chars>`
fn message_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("msg-{}-{}", Utc::now().timestamp_millis(), &suffix[..9])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Message(Message),
    /// Stand-in shown while a reply is outstanding.
    Placeholder { id: String },
}

impl Entry {
    pub fn id(&self) -> &str {
        match self {
            Entry::Message(msg) => &msg.id,
            Entry::Placeholder { id } => id,
        }
    }
}

/// Ordered conversation shown in the chat pane.
#[derive(Debug, Clone, Default)]
pub struct Thread {
    entries: Vec<Entry>,
}

impl Thread {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) -> String {
        let id = message.id.clone();
        self.entries.push(Entry::Message(message));
        id
    }

    pub fn push_placeholder(&mut self) -> String {
        let id = format!("loading-{}", Utc::now().timestamp_millis());
        self.entries.push(Entry::Placeholder { id: id.clone() });
        id
    }

    /// Removes the entry with `id`. Returns false if nothing matched.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id() != id);
        self.entries.len() != before
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Message(msg) => Some(msg),
            Entry::Placeholder { .. } => None,
        })
    }

    pub fn placeholder_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, Entry::Placeholder { .. }))
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
