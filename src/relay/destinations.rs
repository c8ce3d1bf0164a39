/// Chats every staged file is relayed to. Fixed at startup, order preserved,
/// duplicates dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationSet {
    chats: Vec<String>,
}

impl DestinationSet {
    pub fn new<I, S>(chats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for chat in chats {
            let chat = chat.as_ref().trim();
            if !chat.is_empty() && !unique.iter().any(|c| c == chat) {
                unique.push(chat.to_string());
            }
        }
        Self { chats: unique }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.chats.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.chats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }
}
