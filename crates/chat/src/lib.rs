//! Chat Integration - gateway interface for trade request threads
//!
//! This crate provides the platform-facing layer for tradepost:
//! - **Commands** (`commands`) - `/help`, `/trade`, `/close`, `/reload` payloads,
//!   the access gate, and the command router
//! - **Embeds** (`embeds`) - rich reply builders (title, fields, color, footer)
//! - **Events** (`events`) - envelope dispatch to statically registered handlers
//! - **Gateway** (`gateway`) - transport loop with reconnection, plus the
//!   outbound platform seam (send message, create/archive/delete thread)
//! - **Threads** (`threads`) - the trade-thread lifecycle service
//!
//! # Architecture
//!
//! ```text
//! Gateway Envelopes → EventDispatcher → CommandRouter → TradeThreadService
//!                                            ↓                 ↓
//!                                      Embed Replies ← PlatformClient
//! ```
//!
//! The chat platform itself (websocket, command registration, rendering) sits
//! behind the `ChatTransport` and `PlatformClient` traits, so every policy in
//! this crate is testable against in-memory fakes.

pub mod commands;
pub mod embeds;
pub mod events;
pub mod gateway;
pub mod threads;
