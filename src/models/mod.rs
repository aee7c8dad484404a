mod client;
mod contact;

pub use client::{Client, ClientUpdate, NameChange, NewClient};
pub use contact::{ContactKind, ContactRow};
