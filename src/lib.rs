//! Terminal storefront with a persistent shopping cart.
//!
//! tshop renders a small game-goods store in the terminal: a home screen
//! with featured products, a searchable shop, a cart whose contents survive
//! restarts, and a contact form. Screen state lives in
//! [`application::App`], the cart and consent rules in [`domain`], durable
//! key-value storage in [`infrastructure`], and rendering plus key handling
//! in [`presentation`].

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use application::*;
pub use domain::*;
