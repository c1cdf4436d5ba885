//! SlideConductr sync protocol
//!
//! This crate defines the key/value protocol between the phone controller
//! (which drives the presentation) and the watch display (which mirrors it).
//! Both directions exchange dictionaries: a count followed by typed tuples.
//!
//! # Dictionary Layout
//!
//! ```text
//! ┌───────┬──────────┬──────┬────────┬─────────┬─────┐
//! │ COUNT │ KEY      │ TYPE │ LENGTH │ VALUE   │ ... │
//! │ 1B    │ 4B (LE)  │ 1B   │ 2B (LE)│ LENGTH  │     │
//! └───────┴──────────┴──────┴────────┴─────────┴─────┘
//! ```
//!
//! The controller pushes [`SyncKey`] fields to the watch; the watch answers
//! with single-tuple [`Intent`] messages (NEXT / PREV).

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod dict;
pub mod keys;
pub mod messages;

pub use dict::{
    DictError, Dictionary, DictionaryWriter, Tuple, TupleType, TupleValue, INBOUND_CAPACITY,
    OUTBOUND_CAPACITY,
};
pub use keys::{FieldType, SyncKey};
pub use messages::{Intent, SyncBatch, SyncField, INTENT_MARKER};
