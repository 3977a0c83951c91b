//! Actor-based concurrency for the marketplace ledger
//!
//! This module implements the single-writer pattern using Tokio actors:
//! - One logical writer task serializes every mutating transition
//! - Async message passing with backpressure (bounded mailbox)
//! - Read accessors bypass the mailbox via the shared lock
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │            Callers (UI, tests, clients)               │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │               MarketHandle (Clone)                    │
//! │         Sends commands to actor mailbox               │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ mpsc::channel (bounded)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │              MarketActor (Single Task)                │
//! │     validate + apply under one write lock             │
//! │              MarketState (RwLock)                     │
//! └──────────────────────────────────────────────────────┘
//! ```

use crate::registry::MarketState;
use crate::types::{Address, Amount, TokenId};
use crate::{Error, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Command sent to the market actor
pub enum MarketMessage {
    /// Mint a new token
    Create {
        /// Token URI
        uri: String,
        /// Creator and initial owner
        creator: Address,
        /// Reply channel
        response: oneshot::Sender<Result<TokenId>>,
    },

    /// List a token for sale
    List {
        /// Token to list
        token_id: TokenId,
        /// Asking price
        price: Amount,
        /// Caller, must be the owner
        caller: Address,
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Buy a listed token
    Buy {
        /// Token to buy
        token_id: TokenId,
        /// Attached payment, must equal the listing price
        paid: Amount,
        /// Buyer
        buyer: Address,
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Cancel a listing
    Cancel {
        /// Token to delist
        token_id: TokenId,
        /// Caller, must be the seller
        caller: Address,
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Withdraw the marketplace-held balance
    Withdraw {
        /// Caller, must be the operator
        caller: Address,
        /// Reply channel, carries the withdrawn amount
        response: oneshot::Sender<Result<Amount>>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that processes market commands
pub struct MarketActor {
    /// Shared ledger state
    state: Arc<RwLock<MarketState>>,

    /// Mailbox for incoming commands
    mailbox: mpsc::Receiver<MarketMessage>,
}

impl MarketActor {
    /// Create new actor
    pub fn new(state: Arc<RwLock<MarketState>>, mailbox: mpsc::Receiver<MarketMessage>) -> Self {
        Self { state, mailbox }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                MarketMessage::Shutdown => break,
                msg => self.handle_message(msg),
            }
        }
        tracing::debug!("market actor stopped");
    }

    /// Handle a single command
    ///
    /// Each arm takes the write lock once for the whole validate-and-apply
    /// sequence, so commands never observe each other's partial effects.
    fn handle_message(&mut self, msg: MarketMessage) {
        match msg {
            MarketMessage::Create {
                uri,
                creator,
                response,
            } => {
                let token_id = self.state.write().create(uri, &creator);
                let _ = response.send(Ok(token_id));
            }

            MarketMessage::List {
                token_id,
                price,
                caller,
                response,
            } => {
                let result = self.state.write().list(token_id, price, &caller);
                let _ = response.send(result);
            }

            MarketMessage::Buy {
                token_id,
                paid,
                buyer,
                response,
            } => {
                let result = self.state.write().buy(token_id, paid, &buyer);
                let _ = response.send(result);
            }

            MarketMessage::Cancel {
                token_id,
                caller,
                response,
            } => {
                let result = self.state.write().cancel(token_id, &caller);
                let _ = response.send(result);
            }

            MarketMessage::Withdraw { caller, response } => {
                let result = self.state.write().withdraw(&caller);
                let _ = response.send(result);
            }

            MarketMessage::Shutdown => {
                // Handled in main loop
            }
        }
    }
}

/// Handle for sending commands to the actor
#[derive(Clone)]
pub struct MarketHandle {
    sender: mpsc::Sender<MarketMessage>,
}

impl MarketHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<MarketMessage>) -> Self {
        Self { sender }
    }

    /// Mint a new token
    pub async fn create(&self, uri: String, creator: Address) -> Result<TokenId> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MarketMessage::Create {
                uri,
                creator,
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("response channel closed".to_string()))?
    }

    /// List a token for sale
    pub async fn list(&self, token_id: TokenId, price: Amount, caller: Address) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MarketMessage::List {
                token_id,
                price,
                caller,
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("response channel closed".to_string()))?
    }

    /// Buy a listed token
    pub async fn buy(&self, token_id: TokenId, paid: Amount, buyer: Address) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MarketMessage::Buy {
                token_id,
                paid,
                buyer,
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("response channel closed".to_string()))?
    }

    /// Cancel a listing
    pub async fn cancel(&self, token_id: TokenId, caller: Address) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MarketMessage::Cancel {
                token_id,
                caller,
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("response channel closed".to_string()))?
    }

    /// Withdraw the marketplace-held balance
    pub async fn withdraw(&self, caller: Address) -> Result<Amount> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MarketMessage::Withdraw {
                caller,
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("response channel closed".to_string()))?
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(MarketMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("actor mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the market actor
pub fn spawn_market_actor(
    state: Arc<RwLock<MarketState>>,
    mailbox_capacity: usize,
) -> MarketHandle {
    let (tx, rx) = mpsc::channel(mailbox_capacity);
    let actor = MarketActor::new(state, rx);

    tokio::spawn(async move {
        actor.run().await;
    });

    MarketHandle::new(tx)
}
