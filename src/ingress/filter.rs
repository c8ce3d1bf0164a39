use super::types::UNKNOWN_SENDER;
use std::collections::HashSet;

/// Sender ids whose media is never ingested. Fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct BlockList {
    senders: HashSet<String>,
}

impl BlockList {
    pub fn new<I, S>(senders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let senders = senders
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty() && s != UNKNOWN_SENDER)
            .collect();
        Self { senders }
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    pub fn contains(&self, sender_id: &str) -> bool {
        self.senders.contains(sender_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SenderFilter {
    block_list: BlockList,
}

impl SenderFilter {
    pub fn new(block_list: BlockList) -> Self {
        Self { block_list }
    }

    pub fn is_blocked(&self, sender_id: &str) -> bool {
        self.block_list.contains(sender_id.trim())
    }
}
