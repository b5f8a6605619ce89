use rust_decimal::Decimal;
use tracing::warn;

use crate::domain::errors::StorageResult;
use crate::domain::models::{Cart, CartLine, Product, ProductId};

/// Storage key holding the serialized cart lines.
pub const CART_KEY: &str = "cart";

/// Storage key holding the recorded cookie-consent answer.
pub const CONSENT_KEY: &str = "cookiesAccepted";

/// Notification shown after a product is added to the cart.
pub const ADDED_TO_CART_MESSAGE: &str = "Product added to cart!";

/// Durable string-keyed storage.
///
/// Implementations are expected to survive process restarts; the in-memory
/// variant exists as a degraded fallback for when no writable location is
/// available. Keys are short well-known names such as [`CART_KEY`], values
/// are opaque strings chosen by the caller.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> StorageResult<()>;
    fn remove(&mut self, key: &str) -> StorageResult<()>;
}

/// Receiver for short-lived user-facing messages.
///
/// The store layer announces events through this trait without knowing how
/// they are shown; the UI queues them as transient toasts.
pub trait NotificationSink {
    fn notify(&mut self, message: &str);
}

/// The shopping cart together with its backing storage.
///
/// Construction hydrates the cart from storage, and every mutation writes
/// the new state back, so the cart a user builds up is still there on the
/// next run. Storage trouble never surfaces as an error: a failed read
/// hydrates an empty cart, a failed write keeps the in-memory state, and
/// both are logged.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use tshop::domain::{CartStore, NotificationSink, Product, ProductId};
/// use tshop::infrastructure::MemoryStore;
///
/// struct Silent;
/// impl NotificationSink for Silent {
///     fn notify(&mut self, _message: &str) {}
/// }
///
/// let product = Product {
///     id: ProductId(1),
///     name: "110 Diamonds".to_string(),
///     price: Decimal::new(149, 2),
///     image: "images/battle-pass.jpg".to_string(),
///     category: "Diamonds".to_string(),
///     description: "Starter pack.".to_string(),
///     badge: "Popular".to_string(),
/// };
///
/// let mut cart = CartStore::new(Box::new(MemoryStore::new()));
/// cart.add_item(&product, &mut Silent);
/// cart.add_item(&product, &mut Silent);
///
/// assert_eq!(cart.len(), 1);
/// assert_eq!(cart.item_count(), 2);
/// assert_eq!(cart.total(), Decimal::new(298, 2));
/// ```
pub struct CartStore {
    cart: Cart,
    storage: Box<dyn KeyValueStore>,
}

impl CartStore {
    /// Creates a cart backed by `storage`, hydrating any previously
    /// persisted lines. A missing, unreadable or malformed value starts
    /// the cart empty.
    pub fn new(storage: Box<dyn KeyValueStore>) -> Self {
        let cart = match storage.get(CART_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(cart) => cart,
                Err(err) => {
                    warn!("stored cart is malformed, starting empty: {err}");
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(err) => {
                warn!("could not read stored cart, starting empty: {err}");
                Cart::new()
            }
        };
        Self { cart, storage }
    }

    /// Adds one unit of `product`, persists the cart, and announces the
    /// addition through `sink`. Adding a product already in the cart bumps
    /// its quantity instead of creating a second line.
    pub fn add_item(&mut self, product: &Product, sink: &mut dyn NotificationSink) {
        self.cart.add(product);
        self.persist();
        sink.notify(ADDED_TO_CART_MESSAGE);
    }

    /// Removes the line for `id`, if present, and persists the cart.
    pub fn remove_item(&mut self, id: ProductId) {
        self.cart.remove(id);
        self.persist();
    }

    /// Sets the quantity for `id` and persists the cart. A quantity of zero
    /// removes the line; an unknown id changes nothing.
    pub fn update_quantity(&mut self, id: ProductId, quantity: u32) {
        self.cart.set_quantity(id, quantity);
        self.persist();
    }

    /// Empties the cart and persists the empty state.
    pub fn clear(&mut self) {
        self.cart.clear();
        self.persist();
    }

    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    pub fn len(&self) -> usize {
        self.cart.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Sum of price times quantity across all lines.
    pub fn total(&self) -> Decimal {
        self.cart.total()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u32 {
        self.cart.item_count()
    }

    fn persist(&mut self) {
        let raw = match serde_json::to_string(&self.cart) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("could not serialize cart: {err}");
                return;
            }
        };
        if let Err(err) = self.storage.set(CART_KEY, raw) {
            warn!("could not persist cart: {err}");
        }
    }
}

/// The user's answer to the cookie-consent prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieConsent {
    Unset,
    Accepted,
    Declined,
}

/// Persisted cookie-consent answer.
///
/// Either answer is remembered so the prompt only ever appears until the
/// user has answered once. The stored representation is the literal string
/// `"true"` or `"false"`; anything else is treated as unanswered.
///
/// # Examples
///
/// ```
/// use tshop::domain::{ConsentStore, CookieConsent};
/// use tshop::infrastructure::MemoryStore;
///
/// let mut consent = ConsentStore::new(Box::new(MemoryStore::new()));
/// assert_eq!(consent.consent(), CookieConsent::Unset);
///
/// consent.decline();
/// assert_eq!(consent.consent(), CookieConsent::Declined);
/// assert!(consent.is_answered());
/// ```
pub struct ConsentStore {
    consent: CookieConsent,
    storage: Box<dyn KeyValueStore>,
}

impl ConsentStore {
    pub fn new(storage: Box<dyn KeyValueStore>) -> Self {
        let consent = match storage.get(CONSENT_KEY) {
            Ok(Some(raw)) => match raw.as_str() {
                "true" => CookieConsent::Accepted,
                "false" => CookieConsent::Declined,
                other => {
                    warn!("unrecognized stored consent {other:?}, treating as unset");
                    CookieConsent::Unset
                }
            },
            Ok(None) => CookieConsent::Unset,
            Err(err) => {
                warn!("could not read stored consent: {err}");
                CookieConsent::Unset
            }
        };
        Self { consent, storage }
    }

    pub fn consent(&self) -> CookieConsent {
        self.consent
    }

    pub fn is_answered(&self) -> bool {
        self.consent != CookieConsent::Unset
    }

    pub fn accept(&mut self) {
        self.record(CookieConsent::Accepted, "true");
    }

    pub fn decline(&mut self) {
        self.record(CookieConsent::Declined, "false");
    }

    fn record(&mut self, consent: CookieConsent, raw: &str) {
        self.consent = consent;
        if let Err(err) = self.storage.set(CONSENT_KEY, raw.to_string()) {
            warn!("could not persist consent: {err}");
        }
    }
}
