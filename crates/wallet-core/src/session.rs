//! The authoritative wallet session.
//!
//! `WalletSession` owns the published [`SessionSnapshot`]. Every change,
//! whether it comes from a user intent resolving or from a connector event,
//! goes through [`WalletSession::refresh`], which re-reads the connector's
//! live state instead of trusting anything captured when an operation began.

use std::sync::Arc;

use chain_eth::{AccountAddress, ChainId};
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::connector::{ConnectorError, LiveState, WalletConnector};
use crate::error::{WalletAction, WalletError};
use crate::notification::{Notification, NOTIFICATION_BUFFER};
use crate::policy::NetworkPolicy;
use crate::types::{ConnectionState, SessionSnapshot};

const INSTALL_WALLET_MESSAGE: &str =
    "No wallet detected. Install or enable a browser wallet extension to continue.";

pub struct WalletSession<C> {
    connector: Arc<C>,
    policy: Arc<NetworkPolicy>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    notify_tx: broadcast::Sender<Notification>,
    intents: Mutex<Intents>,
}

/// User intents that outlive a single connector call.
#[derive(Debug, Default)]
struct Intents {
    /// Bumped by every `disconnect()`. A connect that started under an older
    /// generation has been superseded.
    generation: u64,
    pending_connects: usize,
    /// Set by `disconnect()` and cleared by the next successful `connect()`.
    /// While set, refreshes publish Disconnected whatever the wallet reports.
    user_disconnected: bool,
}

/// Marks a `connect()` as in flight until dropped.
struct PendingConnect<'a> {
    intents: &'a Mutex<Intents>,
    generation: u64,
}

impl<'a> PendingConnect<'a> {
    fn begin(intents: &'a Mutex<Intents>) -> Self {
        let mut guard = intents.lock();
        guard.pending_connects += 1;
        Self {
            intents,
            generation: guard.generation,
        }
    }

    /// Settles the attempt. Returns `false` when a `disconnect()` arrived
    /// while it was pending; otherwise a successful attempt lifts the
    /// disconnect latch.
    fn settle(&self, succeeded: bool) -> bool {
        let mut intents = self.intents.lock();
        if intents.generation != self.generation {
            return false;
        }
        if succeeded {
            intents.user_disconnected = false;
        }
        true
    }
}

impl Drop for PendingConnect<'_> {
    fn drop(&mut self) {
        self.intents.lock().pending_connects -= 1;
    }
}

impl<C: WalletConnector> WalletSession<C> {
    /// Creates a session mirroring whatever the connector currently reports.
    pub fn new(connector: Arc<C>, policy: Arc<NetworkPolicy>) -> Self {
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::default());
        let (notify_tx, _) = broadcast::channel(NOTIFICATION_BUFFER);
        let session = Self {
            connector,
            policy,
            snapshot_tx,
            notify_tx,
            intents: Mutex::new(Intents::default()),
        };
        session.refresh();
        session
    }

    pub fn policy(&self) -> &Arc<NetworkPolicy> {
        &self.policy
    }

    pub fn connector(&self) -> &Arc<C> {
        &self.connector
    }

    /// Current snapshot (cloned; never held across an await).
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notify_tx.subscribe()
    }

    /// Re-reads the connector and publishes a new snapshot if anything
    /// changed. Returns whether a new version was published.
    ///
    /// The live read happens inside the channel's write lock, so two
    /// concurrent refreshes can never publish out of order. After a
    /// `disconnect()` the session stays Disconnected until `connect()`
    /// succeeds, even if the wallet still exposes an account.
    pub fn refresh(&self) -> bool {
        self.snapshot_tx.send_if_modified(|current| {
            let live = if self.intents.lock().user_disconnected {
                LiveState::default()
            } else {
                self.connector.live_state()
            };
            let (connection, chain_id) = reconcile(live);
            if current.same_state(&connection, chain_id) {
                return false;
            }

            current.connection = connection;
            current.chain_id = chain_id;
            current.version += 1;
            debug!(
                version = current.version,
                connected = current.connection.is_connected(),
                chain_id = ?current.chain_id,
                "wallet session updated"
            );
            true
        })
    }

    /// Runs the wallet's connection flow.
    ///
    /// Rejections and provider failures leave the session disconnected and
    /// surface as a notification as well as the returned error. A connect
    /// overtaken by `disconnect()` resolves to `Ok(())` and leaves the
    /// session disconnected; an approval that arrives that late is revoked.
    pub async fn connect(&self) -> Result<(), WalletError> {
        if self.snapshot().connection.is_connected() {
            debug!("connect requested while already connected");
            return Ok(());
        }

        let pending = PendingConnect::begin(&self.intents);
        info!("requesting wallet connection");
        let result = self.connector.connect().await;

        if !pending.settle(result.is_ok()) {
            match result {
                Ok(()) => {
                    info!("connect approved after a disconnect, revoking");
                    if let Err(e) = self.connector.disconnect().await {
                        warn!(error = %e, "wallet provider failed to revoke superseded connection");
                    }
                }
                Err(e) => debug!(error = %e, "superseded connect failed"),
            }
            self.refresh();
            return Ok(());
        }
        self.refresh();

        if let Err(e) = result {
            return Err(self.report_failure(WalletAction::Connect, e));
        }

        let snapshot = self.snapshot();
        match snapshot.connection.address() {
            Some(address) => {
                info!(address = %address, chain_id = ?snapshot.chain_id, "wallet connected");
                self.notify(Notification::success(format!(
                    "Wallet connected: {}",
                    address.short()
                )));
            }
            None => debug!("connect resolved but the wallet no longer exposes an account"),
        }
        Ok(())
    }

    /// Ends the session, cancelling any `connect()` still waiting on the
    /// wallet. Idempotent: when already disconnected with nothing pending,
    /// nothing is published and no notification is sent.
    ///
    /// The session ends even if the provider fails to revoke access; the
    /// failure is reported and later wallet events do not reconnect it.
    pub async fn disconnect(&self) {
        // Read before locking intents: `refresh` takes them in the other order.
        let connected = self.snapshot().connection.is_connected();
        {
            let mut intents = self.intents.lock();
            if !connected && intents.pending_connects == 0 {
                debug!("disconnect requested while already disconnected");
                return;
            }
            intents.generation += 1;
            intents.user_disconnected = true;
        }

        if let Err(e) = self.connector.disconnect().await {
            self.report_failure(WalletAction::Disconnect, e);
        }
        self.refresh();

        info!("wallet disconnected");
        self.notify(Notification::info("Wallet disconnected"));
    }

    /// Asks the wallet to move to `target`.
    ///
    /// Only the chain can change as a result; the connection state is left
    /// to the connector. `target` must be part of the policy.
    pub async fn switch_chain(&self, target: ChainId) -> Result<(), WalletError> {
        if !self.snapshot().connection.is_connected() {
            return Err(WalletError::NotConnected);
        }
        let Some(network) = self.policy.network(target) else {
            return Err(WalletError::UnsupportedChain(target));
        };
        let name = network.name.clone();

        info!(target_chain = target, "requesting network switch");
        let result = self.connector.switch_chain(target).await;
        self.refresh();

        if let Err(e) = result {
            return Err(self.report_failure(WalletAction::SwitchChain, e));
        }

        let current = self.snapshot().chain_id;
        if current == Some(target) {
            info!(chain_id = target, "network switched");
            self.notify(Notification::success(format!("Switched to {name}")));
        } else {
            debug!(
                target_chain = target,
                chain_id = ?current,
                "switch resolved after a newer chain change"
            );
        }
        Ok(())
    }

    /// Follows connector events until `shutdown_rx` turns true, its sender
    /// is dropped, or the connector closes its event stream.
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) {
        if *shutdown_rx.borrow_and_update() {
            info!("wallet session event loop not started, shutdown already requested");
            return;
        }

        let mut events = self.connector.subscribe();
        // Anything that changed before the subscription existed.
        self.refresh();
        info!("wallet session event loop started");

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("wallet session event loop stopping");
                        break;
                    }
                }

                event = events.recv() => match event {
                    Ok(event) => {
                        debug!(?event, "connector event");
                        self.refresh();
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "connector events lagged, resyncing");
                        self.refresh();
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("connector event stream closed");
                        break;
                    }
                },
            }
        }
    }

    fn report_failure(&self, action: WalletAction, err: ConnectorError) -> WalletError {
        let message = match &err {
            ConnectorError::UserRejected => {
                info!(%action, "request rejected in wallet");
                format!("{action} request rejected in wallet")
            }
            ConnectorError::Unavailable => {
                warn!(%action, "no wallet provider available");
                INSTALL_WALLET_MESSAGE.to_string()
            }
            ConnectorError::Provider(msg) => {
                warn!(%action, error = %msg, "wallet provider error");
                format!("{action} failed: {msg}")
            }
        };
        self.notify(Notification::error(message));
        WalletError::from_connector(action, err)
    }

    fn notify(&self, notification: Notification) {
        // No subscribers is fine.
        let _ = self.notify_tx.send(notification);
    }
}

/// Turns the connector's raw report into session state. A wallet that
/// reports an unparseable account is treated as disconnected.
fn reconcile(live: LiveState) -> (ConnectionState, Option<ChainId>) {
    let Some(raw) = live.account else {
        return (ConnectionState::Disconnected, None);
    };

    match AccountAddress::parse(&raw) {
        Ok(address) => (ConnectionState::Connected { address }, live.chain_id),
        Err(e) => {
            warn!(account = %raw, error = %e, "ignoring malformed wallet account");
            (ConnectionState::Disconnected, None)
        }
    }
}
