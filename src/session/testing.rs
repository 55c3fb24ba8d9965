//! In-memory channel for exercising sessions without a socket.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::session::channel::{MessageChannel, ReceiveError, WriteError};
use crate::session::closure::{classify_close, Closure};
use crate::session::message::Message;

/// One scripted receive outcome.
pub enum Inbound {
    Message(Message),
    Close(Closure),
    /// Never resolves.
    Pending,
}

/// What the session did to the channel.
#[derive(Debug, Default)]
pub struct ChannelLog {
    pub events: Vec<String>,
    pub sent: Vec<Message>,
    pub closes: usize,
}

pub struct ScriptedChannel {
    inbound: VecDeque<Inbound>,
    log: Arc<Mutex<ChannelLog>>,
    fail_sends: bool,
}

impl ScriptedChannel {
    /// An exhausted script behaves like a peer that vanished without a close frame.
    pub fn new(inbound: Vec<Inbound>) -> (Self, Arc<Mutex<ChannelLog>>) {
        let log = Arc::new(Mutex::new(ChannelLog::default()));
        let channel = Self {
            inbound: inbound.into(),
            log: Arc::clone(&log),
            fail_sends: false,
        };
        (channel, log)
    }

    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }
}

impl MessageChannel for ScriptedChannel {
    async fn recv(&mut self) -> Result<Message, ReceiveError> {
        self.log.lock().unwrap().events.push("recv".to_string());
        match self.inbound.pop_front() {
            Some(Inbound::Message(message)) => Ok(message),
            Some(Inbound::Close(closure)) => Err(classify_close(Some(
                axum::extract::ws::CloseFrame {
                    code: closure.code,
                    reason: closure.reason.into(),
                },
            ))),
            Some(Inbound::Pending) => std::future::pending().await,
            None => Err(ReceiveError::Closed(Closure::abnormal())),
        }
    }

    async fn send(&mut self, message: Message) -> Result<(), WriteError> {
        let mut log = self.log.lock().unwrap();
        let label = match &message {
            Message::Text(text) => format!("send:{}", text.as_str()),
            Message::Binary(bytes) => format!("send:{} bytes", bytes.len()),
        };
        log.events.push(label);
        if self.fail_sends {
            return Err(WriteError::new("broken pipe"));
        }
        log.sent.push(message);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), WriteError> {
        let mut log = self.log.lock().unwrap();
        log.events.push("close".to_string());
        log.closes += 1;
        Ok(())
    }
}
