//! In-memory wallet connector for tests and demos.
//!
//! `MockConnector` behaves like a browser wallet extension: it holds the
//! wallet's own account and chain, exposes them only while connected, and
//! emits [`ConnectorEvent`]s for every change. Replies to connect, disconnect
//! and switch prompts are scripted with [`Approval`]; a prompt can also be
//! held open with [`MockConnector::hold_next_switch`] (or
//! [`hold_next_connect`](MockConnector::hold_next_connect)) so a test can
//! interleave other wallet events before the user answers.

use std::sync::Arc;

use async_trait::async_trait;
use chain_eth::ChainId;
use parking_lot::Mutex;
use tokio::sync::{broadcast, oneshot, Notify};

use crate::connector::{ConnectorError, ConnectorEvent, LiveState, WalletConnector};

const EVENT_BUFFER: usize = 64;

/// How the simulated user answers a wallet prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Approval {
    Approve,
    Reject,
    Fail(String),
}

impl Approval {
    fn into_result(self) -> Result<(), ConnectorError> {
        match self {
            Approval::Approve => Ok(()),
            Approval::Reject => Err(ConnectorError::UserRejected),
            Approval::Fail(msg) => Err(ConnectorError::Provider(msg)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Prompt {
    Connect,
    Switch,
}

struct MockState {
    installed: bool,
    connected: bool,
    account: String,
    chain_id: ChainId,
    connect_reply: Approval,
    disconnect_reply: Approval,
    switch_reply: Approval,
    held_connect: Option<Hold>,
    held_switch: Option<Hold>,
    pending_switch: Option<ChainId>,
    connect_calls: usize,
    disconnect_calls: usize,
    switch_requests: Vec<ChainId>,
}

struct Hold {
    requested: Arc<Notify>,
    reply_rx: oneshot::Receiver<Result<(), ConnectorError>>,
}

pub struct MockConnector {
    state: Arc<Mutex<MockState>>,
    events: broadcast::Sender<ConnectorEvent>,
}

impl MockConnector {
    /// An installed wallet holding `account` on `chain_id`, not yet
    /// connected to the application. Every prompt is approved.
    pub fn new(account: &str, chain_id: ChainId) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            state: Arc::new(Mutex::new(MockState {
                installed: true,
                connected: false,
                account: account.to_string(),
                chain_id,
                connect_reply: Approval::Approve,
                disconnect_reply: Approval::Approve,
                switch_reply: Approval::Approve,
                held_connect: None,
                held_switch: None,
                pending_switch: None,
                connect_calls: 0,
                disconnect_calls: 0,
                switch_requests: Vec::new(),
            })),
            events,
        }
    }

    /// A wallet that already authorized the application.
    pub fn connected(account: &str, chain_id: ChainId) -> Self {
        let mock = Self::new(account, chain_id);
        mock.state.lock().connected = true;
        mock
    }

    /// No wallet extension present: every connect fails as unavailable.
    pub fn not_installed() -> Self {
        let mock = Self::new("0x0000000000000000000000000000000000000000", 1);
        mock.state.lock().installed = false;
        mock
    }

    pub fn set_connect_reply(&self, reply: Approval) {
        self.state.lock().connect_reply = reply;
    }

    pub fn set_disconnect_reply(&self, reply: Approval) {
        self.state.lock().disconnect_reply = reply;
    }

    pub fn set_switch_reply(&self, reply: Approval) {
        self.state.lock().switch_reply = reply;
    }

    /// Keeps the next connect prompt open until the returned handle answers.
    pub fn hold_next_connect(&self) -> HeldPrompt {
        let (hold, handle) = self.hold(Prompt::Connect);
        self.state.lock().held_connect = Some(hold);
        handle
    }

    /// Keeps the next switch prompt open until the returned handle answers.
    pub fn hold_next_switch(&self) -> HeldPrompt {
        let (hold, handle) = self.hold(Prompt::Switch);
        self.state.lock().held_switch = Some(hold);
        handle
    }

    /// The user moves the wallet to another chain from inside the extension.
    pub fn change_chain(&self, chain_id: ChainId) {
        self.state.lock().chain_id = chain_id;
        self.emit(ConnectorEvent::ChainChanged);
    }

    /// The user selects another account inside the extension.
    pub fn change_account(&self, account: &str) {
        self.state.lock().account = account.to_string();
        self.emit(ConnectorEvent::AccountsChanged);
    }

    /// The user revokes the application's access from inside the extension.
    pub fn disconnect_externally(&self) {
        self.state.lock().connected = false;
        self.emit(ConnectorEvent::Disconnected);
    }

    pub fn connect_calls(&self) -> usize {
        self.state.lock().connect_calls
    }

    pub fn disconnect_calls(&self) -> usize {
        self.state.lock().disconnect_calls
    }

    /// Every chain a switch was requested for, in order.
    pub fn switch_requests(&self) -> Vec<ChainId> {
        self.state.lock().switch_requests.clone()
    }

    fn hold(&self, prompt: Prompt) -> (Hold, HeldPrompt) {
        let requested = Arc::new(Notify::new());
        let (reply_tx, reply_rx) = oneshot::channel();
        let hold = Hold {
            requested: requested.clone(),
            reply_rx,
        };
        let handle = HeldPrompt {
            prompt,
            requested,
            reply_tx,
            state: self.state.clone(),
            events: self.events.clone(),
        };
        (hold, handle)
    }

    fn emit(&self, event: ConnectorEvent) {
        let _ = self.events.send(event);
    }

    fn scripted(&self, prompt: Prompt) -> Approval {
        let state = self.state.lock();
        match prompt {
            Prompt::Connect => state.connect_reply.clone(),
            Prompt::Switch => state.switch_reply.clone(),
        }
    }

    async fn answer(&self, prompt: Prompt, hold: Option<Hold>) -> Result<(), ConnectorError> {
        if let Some(hold) = hold {
            hold.requested.notify_one();
            // A dropped handle counts as the user closing the prompt.
            return hold
                .reply_rx
                .await
                .unwrap_or(Err(ConnectorError::UserRejected));
        }

        let result = self.scripted(prompt).into_result();
        if result.is_ok() {
            apply(&self.state, &self.events, prompt);
        }
        result
    }
}

/// Applies an approved prompt to the wallet state and emits its event.
fn apply(state: &Mutex<MockState>, events: &broadcast::Sender<ConnectorEvent>, prompt: Prompt) {
    let event = {
        let mut state = state.lock();
        match prompt {
            Prompt::Connect => {
                state.connected = true;
                ConnectorEvent::AccountsChanged
            }
            Prompt::Switch => {
                if let Some(target) = state.pending_switch.take() {
                    state.chain_id = target;
                }
                ConnectorEvent::ChainChanged
            }
        }
    };
    let _ = events.send(event);
}

/// A wallet prompt waiting for the simulated user.
pub struct HeldPrompt {
    prompt: Prompt,
    requested: Arc<Notify>,
    reply_tx: oneshot::Sender<Result<(), ConnectorError>>,
    state: Arc<Mutex<MockState>>,
    events: broadcast::Sender<ConnectorEvent>,
}

impl HeldPrompt {
    /// Resolves once the application has actually opened the prompt.
    pub async fn requested(&self) {
        self.requested.notified().await;
    }

    /// Answers the prompt. An approval takes effect in the wallet
    /// immediately, before the caller's request resolves.
    pub fn answer(self, approval: Approval) {
        let result = approval.into_result();
        if result.is_ok() {
            apply(&self.state, &self.events, self.prompt);
        }
        let _ = self.reply_tx.send(result);
    }
}

#[async_trait]
impl WalletConnector for MockConnector {
    async fn connect(&self) -> Result<(), ConnectorError> {
        let hold = {
            let mut state = self.state.lock();
            state.connect_calls += 1;
            if !state.installed {
                return Err(ConnectorError::Unavailable);
            }
            state.held_connect.take()
        };
        self.answer(Prompt::Connect, hold).await
    }

    async fn disconnect(&self) -> Result<(), ConnectorError> {
        let reply = {
            let mut state = self.state.lock();
            state.disconnect_calls += 1;
            state.disconnect_reply.clone()
        };
        reply.into_result()?;
        self.state.lock().connected = false;
        self.emit(ConnectorEvent::Disconnected);
        Ok(())
    }

    fn account(&self) -> Option<String> {
        let state = self.state.lock();
        state.connected.then(|| state.account.clone())
    }

    fn chain_id(&self) -> Option<ChainId> {
        let state = self.state.lock();
        state.connected.then_some(state.chain_id)
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), ConnectorError> {
        let hold = {
            let mut state = self.state.lock();
            state.switch_requests.push(chain_id);
            if !state.connected {
                return Err(ConnectorError::Provider("wallet is not connected".into()));
            }
            state.pending_switch = Some(chain_id);
            state.held_switch.take()
        };
        self.answer(Prompt::Switch, hold).await
    }

    fn subscribe(&self) -> broadcast::Receiver<ConnectorEvent> {
        self.events.subscribe()
    }

    fn live_state(&self) -> LiveState {
        let state = self.state.lock();
        if !state.connected {
            return LiveState::default();
        }
        LiveState {
            account: Some(state.account.clone()),
            chain_id: Some(state.chain_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";

    #[test]
    fn hides_account_until_connected() {
        let mock = MockConnector::new(ACCOUNT, 8453);
        assert_eq!(mock.live_state(), LiveState::default());
        assert!(mock.account().is_none());
        assert!(mock.chain_id().is_none());
    }

    #[tokio::test]
    async fn approved_connect_exposes_account() {
        let mock = MockConnector::new(ACCOUNT, 8453);
        let mut events = mock.subscribe();

        mock.connect().await.unwrap();

        assert_eq!(mock.account().as_deref(), Some(ACCOUNT));
        assert_eq!(mock.chain_id(), Some(8453));
        assert_eq!(events.try_recv().unwrap(), ConnectorEvent::AccountsChanged);
    }

    #[tokio::test]
    async fn rejected_switch_keeps_chain() {
        let mock = MockConnector::connected(ACCOUNT, 1);
        mock.set_switch_reply(Approval::Reject);

        assert_eq!(mock.switch_chain(8453).await, Err(ConnectorError::UserRejected));
        assert_eq!(mock.chain_id(), Some(1));
        assert_eq!(mock.switch_requests(), vec![8453]);
    }

    #[tokio::test]
    async fn not_installed_reports_unavailable() {
        let mock = MockConnector::not_installed();
        assert_eq!(mock.connect().await, Err(ConnectorError::Unavailable));
        assert_eq!(mock.connect_calls(), 1);
    }

    #[tokio::test]
    async fn held_switch_applies_on_answer() {
        let mock = Arc::new(MockConnector::connected(ACCOUNT, 1));
        let held = mock.hold_next_switch();

        let task = {
            let mock = mock.clone();
            tokio::spawn(async move { mock.switch_chain(8453).await })
        };
        held.requested().await;
        assert_eq!(mock.chain_id(), Some(1));

        held.answer(Approval::Approve);
        assert_eq!(mock.chain_id(), Some(8453));
        assert_eq!(task.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn dropped_hold_counts_as_rejection() {
        let mock = Arc::new(MockConnector::new(ACCOUNT, 8453));
        let held = mock.hold_next_connect();

        let task = {
            let mock = mock.clone();
            tokio::spawn(async move { mock.connect().await })
        };
        held.requested().await;
        drop(held);

        assert_eq!(task.await.unwrap(), Err(ConnectorError::UserRejected));
        assert!(mock.account().is_none());
    }

    #[test]
    fn external_disconnect_hides_account() {
        let mock = MockConnector::connected(ACCOUNT, 8453);
        let mut events = mock.subscribe();
        mock.disconnect_externally();
        assert!(mock.account().is_none());
        assert_eq!(events.try_recv().unwrap(), ConnectorEvent::Disconnected);
    }
}
