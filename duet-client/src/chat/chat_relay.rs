use duet_core::{ChatMessage, RoomId, SignalMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOrigin {
    Local,
    Remote,
}

/// One transcript line, numbered in local receipt order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub seq: u64,
    pub origin: ChatOrigin,
    pub message: ChatMessage,
}

/// Text/image chat riding the signaling connection.
///
/// The transcript lives as long as the session and is never persisted.
#[derive(Debug)]
pub struct ChatRelay {
    room_id: RoomId,
    sender: String,
    transcript: Vec<ChatEntry>,
    next_seq: u64,
}

impl ChatRelay {
    pub fn new(room_id: RoomId, sender: impl Into<String>) -> Self {
        Self {
            room_id,
            sender: sender.into(),
            transcript: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn set_sender(&mut self, sender: impl Into<String>) {
        self.sender = sender.into();
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Packages a chat envelope, or `None` when there is nothing to say.
    /// The sent message is appended to the transcript as a local entry.
    pub fn send(&mut self, text: Option<String>, image: Option<String>) -> Option<SignalMessage> {
        let message = ChatMessage::new(self.sender.clone(), text, image)?;
        self.push(ChatOrigin::Local, message.clone());

        Some(SignalMessage::Chat {
            room_id: self.room_id.clone(),
            message,
        })
    }

    pub fn on_receive(&mut self, message: ChatMessage) -> &ChatEntry {
        self.push(ChatOrigin::Remote, message)
    }

    pub fn transcript(&self) -> &[ChatEntry] {
        &self.transcript
    }

    fn push(&mut self, origin: ChatOrigin, message: ChatMessage) -> &ChatEntry {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.transcript.push(ChatEntry {
            seq,
            origin,
            message,
        });
        &self.transcript[self.transcript.len() - 1]
    }
}
